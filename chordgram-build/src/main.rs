use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use chordgram_core::chord::tokenize;
use chordgram_core::config::{BuildConfig, PredictorConfig};
use chordgram_core::model::ChordPredictor;
use chordgram_core::pipeline::build_models;

#[derive(Debug, Parser)]
#[command(name = "chordgram-build")]
#[command(about = "Build chord probability models from a CSV dataset and sample progressions from them.")]
struct Cli {
	#[command(subcommand)]
	cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Count chord transitions and export smoothed n-gram tables as JSON.
	Build {
		/// Path to the CSV dataset file.
		#[arg(long, default_value = "data/chordonomicon_mini.csv")]
		dataset: PathBuf,

		/// Output directory for the JSON files.
		#[arg(long, default_value = "exports")]
		output_dir: PathBuf,

		/// Laplace smoothing parameter (> 0).
		#[arg(long, default_value_t = 1.0)]
		alpha: f64,

		/// Log progress every N processed songs.
		#[arg(long, default_value_t = 10_000)]
		progress_interval: usize,
	},

	/// Generate a chord progression from exported tables.
	Generate {
		/// Directory holding unigram.json, bigram.json, trigram.json and metadata.json.
		#[arg(long, default_value = "exports")]
		models_dir: PathBuf,

		/// Starting chords, whitespace separated (e.g. "C G"). Random if omitted.
		#[arg(long)]
		seed: Option<String>,

		/// Number of chords to add to the seed.
		#[arg(long, default_value_t = 8)]
		length: usize,

		/// Minimum context count for a longer context to be trusted.
		#[arg(long, default_value_t = 3)]
		threshold: u64,

		/// Seed of the random generator, for reproducible output.
		#[arg(long)]
		rng_seed: Option<u64>,
	},
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	match Cli::parse().cmd {
		Command::Build { dataset, output_dir, alpha, progress_interval } => {
			if !dataset.exists() {
				return Err(format!("Dataset file not found: {}", dataset.display()).into());
			}
			let config = BuildConfig { dataset, output_dir, alpha, progress_interval, ..BuildConfig::default() };
			let (stats, summary) = build_models(&config)?;

			println!("Total songs: {}", stats.total);
			println!("Processed:   {}", stats.processed);
			println!("Skipped:     {}", stats.skipped);
			println!("Vocabulary:  {} chords", summary.vocabulary_size);
			println!(
				"Contexts:    {} unigram, {} bigram, {} trigram",
				summary.contexts[0], summary.contexts[1], summary.contexts[2]
			);
			for file in &summary.files {
				println!("Wrote {}", file.display());
			}
		}
		Command::Generate { models_dir, seed, length, threshold, rng_seed } => {
			let config = PredictorConfig { backoff_threshold: threshold, ..PredictorConfig::default() };
			let predictor = ChordPredictor::load(&models_dir, config)?;
			log::info!("Loaded models from {}", models_dir.display());

			// Seed chords go through the same normalization as the corpus
			let seed = seed.as_deref().map(tokenize).unwrap_or_default();
			let mut rng = match rng_seed {
				Some(value) => StdRng::seed_from_u64(value),
				None => StdRng::from_os_rng(),
			};

			let progression = predictor.generate(&seed, length, &mut rng);
			println!("{}", progression.join(" "));
		}
	}
	Ok(())
}
