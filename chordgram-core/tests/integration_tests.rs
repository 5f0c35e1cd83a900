//! End-to-end tests: CSV dataset → counts → JSON exports → predictor.

use std::collections::BTreeMap;
use std::fs;

use rand::SeedableRng;
use rand::rngs::StdRng;

use chordgram_core::chord::{normalize_chord, tokenize};
use chordgram_core::config::{BuildConfig, PredictorConfig};
use chordgram_core::io::read_json;
use chordgram_core::model::{ChordPredictor, Metadata, Models, NGramBuilder, Order, ProbabilityTable};
use chordgram_core::pipeline::{build_models, export_models, process_songs};

const EPS: f64 = 1e-9;

fn seq(chords: &[&str]) -> Vec<String> {
	chords.iter().map(|s| s.to_string()).collect()
}

const DATASET: &str = "\
id,chords,release_date,genres
1,<intro_1> C G Amin F <verse_1> C G Amin F <chorus_1> F C G G,2001,pop
2,<verse_1> Amin F C G <chorus_1> Amin F C G,1999,rock
3,<verse_1> Db Ab Bbm Gb,2010,pop
4,,2011,pop
5,<verse_1> E,2012,jazz
6,<verse_1> N.C. C/E Fmaj7no3d G7 C,2015,jazz
";

#[test]
fn test_normalizer_examples() {
	assert_eq!(normalize_chord("Db").as_deref(), Some("C#"));
	assert_eq!(normalize_chord("Amin").as_deref(), Some("Amin"));
	assert_eq!(normalize_chord("C").as_deref(), Some("C"));
	assert_eq!(normalize_chord("C/E").as_deref(), Some("C"));
	assert_eq!(normalize_chord("Fmaj7no3d").as_deref(), Some("Fmaj7"));
	assert_eq!(normalize_chord(""), None);
}

#[test]
fn test_tokenizer_example() {
	assert_eq!(tokenize("<verse_1> C G Amin F <chorus_1> C G"), seq(&["C", "G", "Amin", "F", "C", "G"]));
}

#[test]
fn test_single_song_raw_export() {
	let mut builder = NGramBuilder::new();
	builder.update(&seq(&["C", "G", "Amin", "F"])).unwrap();
	let models = builder.get_models(false);

	assert_eq!(models.unigram["Amin"], BTreeMap::from([("F".to_owned(), 1.0)]));
	assert_eq!(models.bigram["C,G"], BTreeMap::from([("Amin".to_owned(), 1.0)]));
	assert_eq!(models.trigram["C,G,Amin"], BTreeMap::from([("F".to_owned(), 1.0)]));
	// "F" ends the song: it is never a context
	assert!(!models.unigram.contains_key("F"));
}

#[test]
fn test_build_from_csv() {
	let dir = tempfile::tempdir().unwrap();
	let dataset = dir.path().join("songs.csv");
	fs::write(&dataset, DATASET).unwrap();
	let output_dir = dir.path().join("exports");

	let config = BuildConfig { dataset, output_dir: output_dir.clone(), ..BuildConfig::default() };
	let (stats, summary) = build_models(&config).unwrap();

	assert_eq!(stats.total, 6);
	assert_eq!(stats.processed, 4);
	assert_eq!(stats.skipped, 2);
	assert_eq!(summary.files.len(), 4);

	let unigram: ProbabilityTable = read_json(output_dir.join("unigram.json")).unwrap();
	let trigram: ProbabilityTable = read_json(output_dir.join("trigram.json")).unwrap();
	let metadata: Metadata = read_json(output_dir.join("metadata.json")).unwrap();

	// Flats were rewritten before counting
	assert!(unigram.contains_key("C#"));
	assert!(unigram.contains_key("A#min"));
	assert!(!unigram.contains_key("Db"));
	assert!(unigram.contains_key("Fmaj7"));

	// Smoothed rows are dense over the vocabulary and sum to one
	let vocabulary_size = summary.vocabulary_size;
	for table in [&unigram, &trigram] {
		for row in table.values() {
			assert_eq!(row.len(), vocabulary_size);
			assert!(row.values().all(|p| *p > 0.0));
			assert!((row.values().sum::<f64>() - 1.0).abs() < EPS);
		}
	}

	// Song 1 has C→G three times, song 2 twice, song 6 has C→Fmaj7 once
	assert_eq!(metadata.unigram_counts["C"], 6);
	assert_eq!(metadata.trigram_counts.get("X,Y,Z"), None);
	assert_eq!(
		unigram.keys().collect::<Vec<_>>(),
		metadata.unigram_counts.keys().collect::<Vec<_>>()
	);
}

#[test]
fn test_process_then_predict() {
	let dir = tempfile::tempdir().unwrap();
	let songs = DATASET.lines().skip(1).map(|line| {
		// Second field holds the chords; none of them contain commas
		Ok::<_, String>(line.split(',').nth(1).unwrap_or_default().to_owned())
	});

	let mut builder = NGramBuilder::new();
	let stats = process_songs(&mut builder, songs, &BuildConfig::default()).unwrap();
	assert_eq!(stats.processed, 4);
	export_models(&mut builder, 1.0, dir.path()).unwrap();

	let loaded = Models::load_from(dir.path()).unwrap();
	assert!(loaded.metadata.is_some());
	assert_eq!(loaded.table(Order::Bigram).len(), builder.model(Order::Bigram).len());

	let predictor = ChordPredictor::load(dir.path(), PredictorConfig::default()).unwrap();
	let (order, distribution) = predictor.backoff_distribution(&seq(&["C", "G"])).unwrap();
	assert_eq!(order, Order::Bigram);
	// Smoothed: every chord of the vocabulary is possible, Amin is the favourite
	let best = distribution.iter().max_by(|a, b| a.1.total_cmp(b.1)).unwrap();
	assert_eq!(best.0, "Amin");

	// Smoothed rows may pick a chord that never starts a context, which ends generation early
	let progression = predictor.generate(&seq(&["C"]), 5, &mut StdRng::seed_from_u64(11));
	assert!((2..=6).contains(&progression.len()));
	assert_eq!(progression[0], "C");
}
