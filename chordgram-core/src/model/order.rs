use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChordGramError;

/// Length of the context window used to predict the next chord.
///
/// Export names follow the first-order Markov convention of the exported
/// files: a `Unigram` context is one chord, `Bigram` two, `Trigram` three.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Order {
	Unigram,
	Bigram,
	Trigram,
}

impl Order {
	/// Every order, shortest context first.
	pub const ALL: [Order; 3] = [Order::Unigram, Order::Bigram, Order::Trigram];

	/// Number of chords in a context of this order.
	pub fn context_len(self) -> usize {
		match self {
			Order::Unigram => 1,
			Order::Bigram => 2,
			Order::Trigram => 3,
		}
	}

	/// Position in order-indexed arrays.
	pub(crate) fn index(self) -> usize {
		self.context_len() - 1
	}

	/// Name used for the exported table (`unigram`, `bigram`, `trigram`).
	pub fn name(self) -> &'static str {
		match self {
			Order::Unigram => "unigram",
			Order::Bigram => "bigram",
			Order::Trigram => "trigram",
		}
	}

	/// Serializes context atoms into a context key.
	///
	/// A single chord is its own key, longer contexts are comma-joined
	/// (`["C", "G"]` → `"C,G"`).
	pub fn context_key<S: AsRef<str>>(atoms: &[S]) -> String {
		atoms.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
	}
}

impl fmt::Display for Order {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Order {
	type Err = ChordGramError;

	/// Parses an export name (`unigram`, `bigram`, `trigram`, any case) or a
	/// context length (`1`, `2`, `3`).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"unigram" | "1" => Ok(Order::Unigram),
			"bigram" | "2" => Ok(Order::Bigram),
			"trigram" | "3" => Ok(Order::Trigram),
			_ => Err(ChordGramError::UnknownOrder(s.to_owned())),
		}
	}
}
