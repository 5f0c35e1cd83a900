//! Chord n-gram models.
//!
//! This module provides the counting, smoothing and prediction side of the crate:
//! - Context orders (`Order`)
//! - Fixed-order sparse count tables (`NGramModel`)
//! - The three-order accumulator and its lifecycle (`NGramBuilder`)
//! - Exported tables and count metadata (`Models`, `Metadata`)
//! - A backoff predictor reading exported tables (`ChordPredictor`)

/// Three-order accumulator: update, normalize, smooth, export.
pub mod builder;

/// Exported probability tables and context-total metadata.
pub mod export;

/// Fixed-order count table.
///
/// Handles sequence ingestion, transition counting and
/// raw/smoothed probability computation.
pub mod ngram_model;

/// Context orders and context key serialization.
pub mod order;

/// Backoff and interpolated next-chord prediction.
pub mod predictor;

/// Internal representation of a single context and its transitions.
///
/// This module is not exposed publicly.
mod state;

pub use builder::{BuildStage, NGramBuilder};
pub use export::{ContextTotals, Metadata, Models, ProbabilityTable};
pub use ngram_model::NGramModel;
pub use order::Order;
pub use predictor::ChordPredictor;
