use std::collections::{BTreeSet, HashMap};

use crate::config::validate_alpha;
use crate::error::{ChordGramError, Result};

use super::export::{Metadata, Models, ProbabilityTable};
use super::ngram_model::NGramModel;
use super::order::Order;

/// Lifecycle stage of an [`NGramBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuildStage {
	/// Counts are still being accumulated.
	Counting,
	/// Counts are frozen and raw probability tables exist.
	Normalized,
	/// Smoothed tables exist as well, computed with the given alpha.
	Smoothed { alpha: f64 },
}

/// Tables derived from the counts, tagged by lifecycle stage.
#[derive(Debug)]
enum Tables {
	Counting,
	Normalized {
		raw: [ProbabilityTable; 3],
	},
	Smoothed {
		raw: [ProbabilityTable; 3],
		smoothed: [ProbabilityTable; 3],
		alpha: f64,
	},
}

/// Accumulates chord transition counts for orders 1, 2 and 3 and turns them
/// into probability tables.
///
/// # Lifecycle
/// 1. `update` once per song, counts are only ever incremented
/// 2. `normalize` freezes the counts and computes raw probabilities
/// 3. `apply_smoothing` computes Laplace-smoothed tables over the vocabulary
/// 4. `get_models` hands out the final tables
///
/// Builders are independent: counts from two builders are never merged.
#[derive(Debug)]
pub struct NGramBuilder {
	/// One count table per order, indexed by `Order::index`
	models: [NGramModel; 3],

	/// Derived tables and the stage they belong to
	tables: Tables,
}

impl Default for NGramBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl NGramBuilder {
	/// Creates a builder with three empty count tables.
	pub fn new() -> Self {
		Self {
			models: Order::ALL.map(NGramModel::new),
			tables: Tables::Counting,
		}
	}

	pub fn stage(&self) -> BuildStage {
		match &self.tables {
			Tables::Counting => BuildStage::Counting,
			Tables::Normalized { .. } => BuildStage::Normalized,
			Tables::Smoothed { alpha, .. } => BuildStage::Smoothed { alpha: *alpha },
		}
	}

	/// Count table of a given order.
	pub fn model(&self, order: Order) -> &NGramModel {
		&self.models[order.index()]
	}

	/// Adds the transitions of one song to every order.
	///
	/// A sequence of fewer than two chords is a no-op.
	///
	/// # Errors
	/// Returns `ChordGramError::Frozen` once `normalize` has been called.
	pub fn update(&mut self, sequence: &[String]) -> Result<()> {
		if !matches!(self.tables, Tables::Counting) {
			return Err(ChordGramError::Frozen);
		}
		if sequence.len() < 2 {
			return Ok(());
		}
		for model in &mut self.models {
			model.add_sequence(sequence);
		}
		Ok(())
	}

	/// Next-chord counts observed after `context_key` for `order`.
	pub fn counts(&self, order: Order, context_key: &str) -> Option<&HashMap<String, u64>> {
		self.model(order).counts(context_key)
	}

	/// Total number of transitions observed after `context_key` for `order`.
	pub fn context_total(&self, order: Order, context_key: &str) -> u64 {
		self.model(order).context_total(context_key)
	}

	/// Every chord seen as a context atom or a next chord, in any order.
	pub fn vocabulary(&self) -> BTreeSet<String> {
		let mut vocabulary = BTreeSet::new();
		for model in &self.models {
			model.collect_vocabulary(&mut vocabulary);
		}
		vocabulary
	}

	/// Freezes the counts and computes the raw probability tables.
	///
	/// Idempotent: only the first call does any work.
	pub fn normalize(&mut self) {
		if !matches!(self.tables, Tables::Counting) {
			return;
		}
		let raw = Order::ALL.map(|order| self.model(order).probabilities());
		for order in Order::ALL {
			log::debug!("Normalized {} table: {} contexts", order, raw[order.index()].len());
		}
		self.tables = Tables::Normalized { raw };
	}

	/// Computes add-alpha smoothed tables, normalizing first if needed.
	///
	/// Every observed context gets a dense row over the whole vocabulary,
	/// `(count + alpha) / (total + alpha * |vocabulary|)`. Contexts that were
	/// never observed are not added. Calling it again with another alpha
	/// recomputes the smoothed tables from the retained counts.
	///
	/// # Errors
	/// - `ChordGramError::InvalidAlpha` if `alpha` is not finite and > 0
	/// - `ChordGramError::EmptyVocabulary` if nothing was ever counted
	pub fn apply_smoothing(&mut self, alpha: f64) -> Result<()> {
		validate_alpha(alpha)?;
		self.normalize();

		let vocabulary = self.vocabulary();
		if vocabulary.is_empty() {
			return Err(ChordGramError::EmptyVocabulary);
		}
		log::debug!("Smoothing with alpha={} over a vocabulary of {} chords", alpha, vocabulary.len());

		let smoothed = Order::ALL.map(|order| self.model(order).smoothed(&vocabulary, alpha));
		let raw = match std::mem::replace(&mut self.tables, Tables::Counting) {
			Tables::Normalized { raw } | Tables::Smoothed { raw, .. } => raw,
			Tables::Counting => Order::ALL.map(|order| self.model(order).probabilities()),
		};
		self.tables = Tables::Smoothed { raw, smoothed, alpha };
		Ok(())
	}

	/// Raw (unsmoothed) table of `order`, normalizing first if needed.
	pub fn raw_table(&mut self, order: Order) -> &ProbabilityTable {
		self.normalize();
		match &self.tables {
			Tables::Normalized { raw } | Tables::Smoothed { raw, .. } => &raw[order.index()],
			Tables::Counting => unreachable!("normalize always leaves the Counting stage"),
		}
	}

	/// Returns the final tables: smoothed when smoothing was applied, raw otherwise.
	///
	/// With `include_counts`, the three context-total mappings are attached as metadata.
	pub fn get_models(&mut self, include_counts: bool) -> Models {
		self.normalize();

		let [unigram, bigram, trigram] = match &self.tables {
			Tables::Smoothed { smoothed, .. } => smoothed.clone(),
			Tables::Normalized { raw } => raw.clone(),
			Tables::Counting => unreachable!("normalize always leaves the Counting stage"),
		};

		let metadata = include_counts.then(|| Metadata {
			unigram_counts: self.model(Order::Unigram).context_totals(),
			bigram_counts: self.model(Order::Bigram).context_totals(),
			trigram_counts: self.model(Order::Trigram).context_totals(),
		});

		Models { unigram, bigram, trigram, metadata }
	}
}
