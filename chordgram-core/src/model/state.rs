use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::order::Order;

/// Represents a context in an n-gram table.
///
/// A `State` corresponds to a fixed window of preceding chords (`atoms`) and
/// stores every observed transition from this window to the next chord.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - `key` is the serialized form of `atoms`
/// - Each transition count is strictly positive
/// - `total` is the sum of all transition counts, kept up to date on every insertion
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct State {
	/// Serialized context key (`"C"`, `"C,G"`, ...).
	key: String,
	/// Chords forming the context, kept so the vocabulary never re-splits `key`.
	atoms: Vec<String>,
	/// Outgoing transitions indexed by the next chord.
	/// Example: { "G" => 42, "Amin" => 3 }
	transitions: HashMap<String, u64>,
	/// Sum of `transitions` values.
	total: u64,
}

impl State {
	/// Creates a new empty state for the given context.
	pub fn new(atoms: &[String]) -> Self {
		Self {
			key: Order::context_key(atoms),
			atoms: atoms.to_vec(),
			transitions: HashMap::new(),
			total: 0,
		}
	}

	pub fn atoms(&self) -> &[String] {
		&self.atoms
	}

	pub fn transitions(&self) -> &HashMap<String, u64> {
		&self.transitions
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	/// Records an occurrence of a transition toward `next_chord`.
	pub fn add_transition(&mut self, next_chord: &str) {
		match self.transitions.get_mut(next_chord) {
			Some(count) => *count += 1,
			None => {
				self.transitions.insert(next_chord.to_owned(), 1);
			}
		}
		self.total += 1;
	}

	/// Maximum-likelihood distribution: `count / total` for every observed next chord.
	///
	/// Returns `None` for a context without observations.
	pub fn probabilities(&self) -> Option<BTreeMap<String, f64>> {
		if self.total == 0 {
			return None;
		}
		let total = self.total as f64;
		Some(
			self.transitions
				.iter()
				.map(|(next_chord, count)| (next_chord.clone(), *count as f64 / total))
				.collect(),
		)
	}

	/// Laplace-smoothed distribution over the whole vocabulary:
	/// `(count + alpha) / (total + alpha * |vocabulary|)`.
	pub fn smoothed(&self, vocabulary: &BTreeSet<String>, alpha: f64) -> BTreeMap<String, f64> {
		let denominator = self.total as f64 + alpha * vocabulary.len() as f64;
		vocabulary
			.iter()
			.map(|chord| {
				let count = self.transitions.get(chord).copied().unwrap_or(0);
				(chord.clone(), (count as f64 + alpha) / denominator)
			})
			.collect()
	}
}
