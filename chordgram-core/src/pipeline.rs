use std::fmt::Display;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::chord::tokenize;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::io::SongReader;
use crate::model::{NGramBuilder, Order};

/// Song counters of a processing run.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessingStats {
	/// Rows seen
	pub total: usize,
	/// Songs whose transitions were counted
	pub processed: usize,
	/// Unreadable rows, blank chord cells and sequences shorter than two chords
	pub skipped: usize,
}

/// What an export run produced.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ExportSummary {
	/// Number of contexts per order, shortest order first
	pub contexts: [usize; 3],
	pub vocabulary_size: usize,
	pub files: Vec<PathBuf>,
}

/// Feeds every song of `songs` to `builder`.
///
/// # Behavior
/// - Row errors are counted as skipped; only the first `max_logged_errors` are logged
/// - Blank chord strings and sequences with fewer than two chords are skipped
/// - A progress line is logged every `progress_interval` processed songs
///
/// # Errors
/// Only a frozen builder aborts the run; a bad row never does.
pub fn process_songs<I, E>(builder: &mut NGramBuilder, songs: I, config: &BuildConfig) -> Result<ProcessingStats>
where
	I: IntoIterator<Item = std::result::Result<String, E>>,
	E: Display,
{
	let mut stats = ProcessingStats::default();
	let mut logged_errors = 0;

	for song in songs {
		stats.total += 1;

		let chord_string = match song {
			Ok(chord_string) => chord_string,
			Err(e) => {
				stats.skipped += 1;
				if logged_errors < config.max_logged_errors {
					log::warn!("Skipped song {} due to error: {}", stats.total, e);
					logged_errors += 1;
				}
				continue;
			}
		};

		if chord_string.trim().is_empty() {
			stats.skipped += 1;
			continue;
		}

		let sequence = tokenize(&chord_string);
		if sequence.len() < 2 {
			// Need at least one transition
			stats.skipped += 1;
			continue;
		}

		builder.update(&sequence)?;
		stats.processed += 1;

		if config.progress_interval > 0 && stats.processed % config.progress_interval == 0 {
			log::info!("Processed {} songs...", stats.processed);
		}
	}

	log::info!(
		"Processing complete: {} total, {} processed, {} skipped",
		stats.total,
		stats.processed,
		stats.skipped
	);
	Ok(stats)
}

/// Normalizes, smooths and writes the builder's tables to `output_dir`.
///
/// Writes `unigram.json`, `bigram.json`, `trigram.json` and `metadata.json`.
///
/// # Errors
/// - Invalid `alpha` or an empty vocabulary (nothing was processed)
/// - Any I/O or serialization failure
pub fn export_models<P: AsRef<Path>>(builder: &mut NGramBuilder, alpha: f64, output_dir: P) -> Result<ExportSummary> {
	log::info!("Normalizing probabilities and applying smoothing...");
	builder.normalize();
	builder.apply_smoothing(alpha)?;

	let models = builder.get_models(true);
	let files = models.write_to(output_dir)?;

	Ok(ExportSummary {
		contexts: Order::ALL.map(|order| models.table(order).len()),
		vocabulary_size: builder.vocabulary().len(),
		files,
	})
}

/// Runs a whole build: read the dataset, count, smooth and export.
pub fn build_models(config: &BuildConfig) -> Result<(ProcessingStats, ExportSummary)> {
	config.validate()?;
	log::info!("Building chord probability models from: {}", config.dataset.display());

	let songs = SongReader::open(&config.dataset)?;
	let mut builder = NGramBuilder::new();
	let stats = process_songs(&mut builder, songs, config)?;
	let summary = export_models(&mut builder, config.alpha, &config.output_dir)?;

	Ok((stats, summary))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ChordGramError;

	fn ok(rows: &[&str]) -> Vec<std::result::Result<String, String>> {
		rows.iter().map(|s| Ok(s.to_string())).collect()
	}

	#[test]
	fn test_counts_processed_and_skipped() {
		let mut builder = NGramBuilder::new();
		let mut songs = ok(&["<verse_1> C G Amin F", "", "C", "x y z", "Db Eb"]);
		songs.push(Err("malformed row".to_owned()));

		let stats = process_songs(&mut builder, songs, &BuildConfig::default()).unwrap();
		assert_eq!(stats, ProcessingStats { total: 6, processed: 2, skipped: 4 });
		assert_eq!(builder.context_total(Order::Unigram, "C#"), 1);
		assert_eq!(builder.context_total(Order::Trigram, "C,G,Amin"), 1);
	}

	#[test]
	fn test_error_rows_beyond_log_cap_are_still_counted() {
		let mut builder = NGramBuilder::new();
		let mut songs: Vec<std::result::Result<String, String>> =
			(0..5).map(|i| Err(format!("malformed row {i}"))).collect();
		songs.extend(ok(&["C G", "G C", "Amin F"]));
		songs.push(Err("trailing bad row".to_owned()));

		let config = BuildConfig { max_logged_errors: 2, progress_interval: 1, ..BuildConfig::default() };
		let stats = process_songs(&mut builder, songs, &config).unwrap();
		assert_eq!(stats, ProcessingStats { total: 9, processed: 3, skipped: 6 });
		assert_eq!(builder.context_total(Order::Unigram, "C"), 1);
		assert_eq!(builder.context_total(Order::Unigram, "G"), 1);

		// No warnings at all must not change the counts either
		let mut silent = NGramBuilder::new();
		let songs = vec![Err("bad".to_owned()), Ok("C G".to_owned())];
		let config = BuildConfig { max_logged_errors: 0, ..BuildConfig::default() };
		let stats = process_songs(&mut silent, songs, &config).unwrap();
		assert_eq!(stats, ProcessingStats { total: 2, processed: 1, skipped: 1 });
	}

	#[test]
	fn test_frozen_builder_aborts() {
		let mut builder = NGramBuilder::new();
		builder.normalize();
		let err = process_songs(&mut builder, ok(&["C G"]), &BuildConfig::default()).unwrap_err();
		assert!(matches!(err, ChordGramError::Frozen));
	}

	#[test]
	fn test_export_requires_data() {
		let dir = tempfile::tempdir().unwrap();
		let mut builder = NGramBuilder::new();
		process_songs(&mut builder, ok(&["C", ""]), &BuildConfig::default()).unwrap();
		let err = export_models(&mut builder, 1.0, dir.path()).unwrap_err();
		assert!(matches!(err, ChordGramError::EmptyVocabulary));
	}

	#[test]
	fn test_export_summary() {
		let dir = tempfile::tempdir().unwrap();
		let mut builder = NGramBuilder::new();
		process_songs(&mut builder, ok(&["C G Amin F"]), &BuildConfig::default()).unwrap();
		let summary = export_models(&mut builder, 1.0, dir.path()).unwrap();
		assert_eq!(summary.contexts, [3, 2, 1]);
		assert_eq!(summary.vocabulary_size, 4);
		assert_eq!(summary.files.len(), 4);
		assert!(summary.files.iter().all(|f| f.exists()));
	}
}
