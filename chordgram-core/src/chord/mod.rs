//! Chord token handling.
//!
//! - `normalizer`: raw chord token → canonical `<Root><Quality>` string
//! - `tokenizer`: raw chord sequence → ordered list of canonical chords

/// Single chord normalization (flats to sharps, quality classification).
pub mod normalizer;

/// Sequence splitting and section-marker removal.
pub mod tokenizer;

pub use normalizer::{normalize_chord, parse_chord, Chord, Quality};
pub use tokenizer::tokenize;
