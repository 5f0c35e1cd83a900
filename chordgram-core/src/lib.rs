//! Chord n-gram model building library.
//!
//! This crate turns a corpus of song chord sequences into smoothed n-gram
//! probability tables for chord prediction:
//! - Chord token normalization and sequence tokenization
//! - Sparse transition counting for context orders 1, 2 and 3
//! - Raw and Laplace-smoothed probability tables with count metadata
//! - JSON export and a backoff predictor reading the exports
//!
//! A typical run reads songs with [`io::SongReader`], feeds them to a
//! [`model::NGramBuilder`] through [`pipeline::process_songs`], then writes
//! the tables with [`pipeline::export_models`].

/// Chord normalization and tokenization.
pub mod chord;

/// Build and prediction parameters.
pub mod config;

/// Crate-wide error type.
pub mod error;

/// Dataset reading and JSON file helpers.
pub mod io;

/// Counting, smoothing, export and prediction.
pub mod model;

/// Orchestration of a full build (read, tokenize, count, export).
pub mod pipeline;

pub use error::{ChordGramError, Result};
