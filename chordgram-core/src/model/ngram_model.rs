use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::export::{ContextTotals, ProbabilityTable};
use super::order::Order;
use super::state::State;

/// Sparse count table for a single context order.
///
/// The `NGramModel` stores one state per observed context and, through it,
/// the next-chord counts and the context total.
///
/// # Responsibilities
/// - Accumulate transition counts from chord sequences
/// - Produce raw (maximum-likelihood) and Laplace-smoothed probability tables
/// - Report context totals for backoff decisions downstream
///
/// # Invariants
/// - Each state in `states` corresponds to a unique context of `order.context_len()` chords
/// - Only contexts that were observed at least once are present
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NGramModel {
	/// Order of the table (context length 1, 2 or 3)
	order: Order,

	/// Mapping from a context key to its corresponding state
	states: HashMap<String, State>,
}

impl NGramModel {
	/// Creates a new empty table of the given order.
	pub fn new(order: Order) -> Self {
		Self { order, states: HashMap::new() }
	}

	pub fn order(&self) -> Order {
		self.order
	}

	/// Number of distinct contexts observed.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Adds every (context, next chord) window of `sequence` to the table.
	///
	/// # Notes
	/// - A sequence shorter than `context_len + 1` contributes nothing.
	/// - The sequence itself is not retained.
	pub fn add_sequence(&mut self, sequence: &[String]) {
		let n = self.order.context_len();
		for window in sequence.windows(n + 1) {
			let (context, next_chord) = (&window[..n], &window[n]);
			let key = Order::context_key(context);

			// Get or create the state for this context
			let state = self.states.entry(key).or_insert_with(|| State::new(context));
			state.add_transition(next_chord);
		}
	}

	/// Next-chord counts observed after `context_key`, if the context exists.
	pub fn counts(&self, context_key: &str) -> Option<&HashMap<String, u64>> {
		self.states.get(context_key).map(State::transitions)
	}

	/// Total number of transitions observed after `context_key` (0 if unknown).
	pub fn context_total(&self, context_key: &str) -> u64 {
		self.states.get(context_key).map_or(0, State::total)
	}

	/// Copy of every context total.
	pub fn context_totals(&self) -> ContextTotals {
		self.states.iter().map(|(key, state)| (key.clone(), state.total())).collect()
	}

	/// Raw probability table; contexts with a zero total are omitted.
	pub fn probabilities(&self) -> ProbabilityTable {
		self.states
			.iter()
			.filter_map(|(key, state)| state.probabilities().map(|probs| (key.clone(), probs)))
			.collect()
	}

	/// Smoothed probability table: one dense row over `vocabulary` per observed context.
	///
	/// Unobserved contexts are never synthesized.
	pub fn smoothed(&self, vocabulary: &BTreeSet<String>, alpha: f64) -> ProbabilityTable {
		self.states
			.iter()
			.map(|(key, state)| (key.clone(), state.smoothed(vocabulary, alpha)))
			.collect::<BTreeMap<_, _>>()
	}

	/// Adds every context atom and next chord of this table to `vocabulary`.
	pub(crate) fn collect_vocabulary(&self, vocabulary: &mut BTreeSet<String>) {
		for state in self.states.values() {
			vocabulary.extend(state.atoms().iter().cloned());
			vocabulary.extend(state.transitions().keys().cloned());
		}
	}
}
