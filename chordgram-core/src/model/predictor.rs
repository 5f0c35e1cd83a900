use std::collections::BTreeMap;
use std::path::Path;

use rand::Rng;
use rand::prelude::IteratorRandom;

use crate::config::PredictorConfig;
use crate::error::{ChordGramError, Result};

use super::export::{Metadata, Models};
use super::order::Order;

/// Next-chord predictor reading exported probability tables.
///
/// It sits downstream of the builder: the tables are read-only here and the
/// context totals from the metadata decide when a longer context is trusted.
///
/// # Backoff
/// The longest context available in the history is used if its total count
/// reaches `backoff_threshold`; otherwise the predictor falls back to the next
/// shorter order. The single-chord context only has to exist.
#[derive(Clone, Debug)]
pub struct ChordPredictor {
	models: Models,
	metadata: Metadata,
	config: PredictorConfig,
}

impl ChordPredictor {
	/// Builds a predictor from exported models.
	///
	/// # Errors
	/// - `ChordGramError::MissingMetadata` if the models carry no context totals
	/// - `ChordGramError::Config` if `config` is invalid
	pub fn new(mut models: Models, config: PredictorConfig) -> Result<Self> {
		config.validate()?;
		let metadata = models.metadata.take().ok_or(ChordGramError::MissingMetadata)?;
		Ok(Self { models, metadata, config })
	}

	/// Loads the tables written by an export run from `dir`.
	pub fn load<P: AsRef<Path>>(dir: P, config: PredictorConfig) -> Result<Self> {
		Self::new(Models::load_from(dir)?, config)
	}

	pub fn config(&self) -> &PredictorConfig {
		&self.config
	}

	/// Whether `context_key` was observed at least `backoff_threshold` times.
	pub fn is_strong(&self, order: Order, context_key: &str) -> bool {
		self.metadata
			.totals(order)
			.get(context_key)
			.is_some_and(|total| *total >= self.config.backoff_threshold)
	}

	/// Context key made of the last `order.context_len()` chords of `history`.
	fn context_of(history: &[String], order: Order) -> Option<String> {
		let n = order.context_len();
		(history.len() >= n).then(|| Order::context_key(&history[history.len() - n..]))
	}

	/// Distribution of the next chord using backoff.
	///
	/// # Returns
	/// The order that was used and its distribution, or `None` if even the
	/// last chord of `history` is an unknown context.
	pub fn backoff_distribution(&self, history: &[String]) -> Option<(Order, &BTreeMap<String, f64>)> {
		for order in Order::ALL.into_iter().rev() {
			let Some(key) = Self::context_of(history, order) else {
				continue;
			};
			if order != Order::Unigram && !self.is_strong(order, &key) {
				continue;
			}
			if let Some(distribution) = self.models.table(order).get(&key) {
				return Some((order, distribution));
			}
		}
		None
	}

	/// Linear interpolation of the three orders.
	///
	/// Each order whose context exists contributes `weight * P(next | context)`;
	/// the result is divided by the sum of contributing weights so it still
	/// sums to 1. Empty if no context of `history` is known.
	pub fn interpolated_distribution(&self, history: &[String]) -> BTreeMap<String, f64> {
		let weights = &self.config.weights;
		let mut mixed: BTreeMap<String, f64> = BTreeMap::new();
		let mut weight_sum = 0.0;

		for order in Order::ALL {
			let weight = match order {
				Order::Unigram => weights.unigram,
				Order::Bigram => weights.bigram,
				Order::Trigram => weights.trigram,
			};
			if weight <= 0.0 {
				continue;
			}
			let Some(distribution) = Self::context_of(history, order).and_then(|key| self.models.table(order).get(&key))
			else {
				continue;
			};
			weight_sum += weight;
			for (chord, probability) in distribution {
				*mixed.entry(chord.clone()).or_insert(0.0) += weight * probability;
			}
		}

		if weight_sum > 0.0 {
			for probability in mixed.values_mut() {
				*probability /= weight_sum;
			}
		}
		mixed
	}

	/// Picks a chord with probability proportional to its weight.
	///
	/// Returns `None` for an empty distribution or one without positive mass.
	pub fn sample<R: Rng>(distribution: &BTreeMap<String, f64>, rng: &mut R) -> Option<String> {
		let total: f64 = distribution.values().filter(|p| **p > 0.0).sum();
		if total <= 0.0 {
			return None;
		}

		let mut r = rng.random_range(0.0..total);

		let mut fallback = None;
		for (chord, probability) in distribution {
			if *probability <= 0.0 {
				continue;
			}
			if r < *probability {
				return Some(chord.clone());
			}
			r -= probability;
			fallback = Some(chord);
		}

		// Rounding can leave a sliver of `r` past the last bucket
		fallback.cloned()
	}

	/// A random single-chord context, useful to start a progression.
	pub fn random_context<R: Rng>(&self, rng: &mut R) -> Option<String> {
		self.models.unigram.keys().choose(rng).cloned()
	}

	/// Extends `seed` by up to `length` chords using backoff sampling.
	///
	/// An empty seed starts from a random context. Generation stops early when
	/// the last chord has no known continuation. The returned progression
	/// includes the seed.
	pub fn generate<R: Rng>(&self, seed: &[String], length: usize, rng: &mut R) -> Vec<String> {
		let mut progression = seed.to_vec();
		if progression.is_empty() {
			match self.random_context(rng) {
				Some(chord) => progression.push(chord),
				None => return progression,
			}
		}

		for _ in 0..length {
			let Some((_, distribution)) = self.backoff_distribution(&progression) else {
				break;
			};
			match Self::sample(distribution, rng) {
				Some(chord) => progression.push(chord),
				None => break,
			}
		}
		progression
	}
}
