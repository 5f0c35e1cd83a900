//! Error types shared by every stage of the chord n-gram pipeline.
//!
//! Individual malformed chord tokens are never errors (the normalizer simply
//! rejects them), and a single corrupt dataset row is counted as skipped by the
//! pipeline. What remains here are the conditions the caller must act on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChordGramError {
	/// Smoothing parameter outside `(0, +inf)`.
	#[error("Invalid smoothing parameter: alpha must be finite and > 0, got {0}")]
	InvalidAlpha(f64),

	/// Smoothing was requested but no chord transition was ever accumulated.
	#[error("Empty vocabulary: no chord transitions were accumulated, nothing to smooth")]
	EmptyVocabulary,

	/// `update` was called after the count tables were frozen by `normalize`.
	#[error("Model is frozen: counts cannot be updated after normalization")]
	Frozen,

	/// A configuration value failed validation.
	#[error("Invalid configuration: {0}")]
	Config(String),

	/// The dataset header does not contain any column.
	#[error("Could not find chord column in dataset: {0}")]
	NoChordColumn(String),

	/// The predictor needs the per-context totals to take backoff decisions.
	#[error("Missing metadata: context totals are required to build a predictor")]
	MissingMetadata,

	/// An order name other than `unigram`, `bigram` or `trigram`.
	#[error("Unknown model order: {0}")]
	UnknownOrder(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChordGramError>;
