//! Tunables for model building and prediction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ChordGramError, Result};

/// Parameters of a model-building run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BuildConfig {
	/// CSV dataset to read (default: `data/chordonomicon_mini.csv`)
	pub dataset: PathBuf,

	/// Directory receiving the JSON exports (default: `exports`)
	pub output_dir: PathBuf,

	/// Laplace smoothing parameter (default: 1.0, add-one smoothing)
	pub alpha: f64,

	/// Log a progress line every N processed songs (default: 10 000)
	pub progress_interval: usize,

	/// Only the first N skipped rows are reported as warnings (default: 10)
	pub max_logged_errors: usize,
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			dataset: PathBuf::from("data/chordonomicon_mini.csv"),
			output_dir: PathBuf::from("exports"),
			alpha: 1.0,
			progress_interval: 10_000,
			max_logged_errors: 10,
		}
	}
}

impl BuildConfig {
	/// Checks every value, returning the first violation found.
	pub fn validate(&self) -> Result<()> {
		validate_alpha(self.alpha)?;
		if self.progress_interval == 0 {
			return Err(ChordGramError::Config("progress interval must be > 0".to_owned()));
		}
		Ok(())
	}
}

/// Weights used to blend the three orders in interpolated prediction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct InterpolationWeights {
	pub trigram: f64,
	pub bigram: f64,
	pub unigram: f64,
}

impl Default for InterpolationWeights {
	fn default() -> Self {
		Self { trigram: 0.60, bigram: 0.30, unigram: 0.10 }
	}
}

/// Parameters of the backoff predictor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PredictorConfig {
	/// Minimum context total for a context to be considered strong (default: 3)
	pub backoff_threshold: u64,

	/// Interpolation weights (default: 0.60 / 0.30 / 0.10)
	pub weights: InterpolationWeights,
}

impl Default for PredictorConfig {
	fn default() -> Self {
		Self { backoff_threshold: 3, weights: InterpolationWeights::default() }
	}
}

impl PredictorConfig {
	pub fn validate(&self) -> Result<()> {
		let w = &self.weights;
		let all = [w.trigram, w.bigram, w.unigram];
		if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
			return Err(ChordGramError::Config("interpolation weights must be finite and >= 0".to_owned()));
		}
		if all.iter().sum::<f64>() <= 0.0 {
			return Err(ChordGramError::Config("interpolation weights must not all be zero".to_owned()));
		}
		Ok(())
	}
}

/// Rejects a smoothing parameter that is not a finite, strictly positive number.
pub fn validate_alpha(alpha: f64) -> Result<()> {
	if !alpha.is_finite() || alpha <= 0.0 {
		return Err(ChordGramError::InvalidAlpha(alpha));
	}
	Ok(())
}
