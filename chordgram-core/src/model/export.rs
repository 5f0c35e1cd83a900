use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::{build_output_path, read_json, write_json};

use super::order::Order;

/// Context key → next chord → probability.
pub type ProbabilityTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Context key → total number of observed transitions.
pub type ContextTotals = BTreeMap<String, u64>;

/// File name (without extension) of the metadata export.
pub const METADATA_NAME: &str = "metadata";

/// Extension of an export while it is being written.
const TMP_EXTENSION: &str = "json.tmp";

/// Context totals of every order, used downstream to decide whether a
/// context is strong enough to be trusted or should back off.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
	pub unigram_counts: ContextTotals,
	pub bigram_counts: ContextTotals,
	pub trigram_counts: ContextTotals,
}

impl Metadata {
	pub fn totals(&self, order: Order) -> &ContextTotals {
		match order {
			Order::Unigram => &self.unigram_counts,
			Order::Bigram => &self.bigram_counts,
			Order::Trigram => &self.trigram_counts,
		}
	}
}

/// The three exported probability tables, plus optional count metadata.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Models {
	pub unigram: ProbabilityTable,
	pub bigram: ProbabilityTable,
	pub trigram: ProbabilityTable,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Metadata>,
}

impl Models {
	pub fn table(&self, order: Order) -> &ProbabilityTable {
		match order {
			Order::Unigram => &self.unigram,
			Order::Bigram => &self.bigram,
			Order::Trigram => &self.trigram,
		}
	}

	/// Writes one pretty-printed JSON file per order, plus `metadata.json`
	/// when metadata is present.
	///
	/// Every file is first written next to its target as `<name>.json.tmp`, and
	/// the temporary files are renamed into place only once all of them were
	/// written. A failed write removes the temporary files and leaves any
	/// previous export untouched.
	///
	/// # Returns
	/// The paths written, in order `unigram`, `bigram`, `trigram`, `metadata`.
	pub fn write_to<P: AsRef<Path>>(&self, output_dir: P) -> Result<Vec<PathBuf>> {
		let output_dir = output_dir.as_ref();
		std::fs::create_dir_all(output_dir)?;

		let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(4);
		if let Err(e) = self.stage(output_dir, &mut staged) {
			for (tmp, _) in &staged {
				let _ = std::fs::remove_file(tmp);
			}
			return Err(e);
		}

		let mut written = Vec::with_capacity(staged.len());
		for (tmp, path) in staged {
			std::fs::rename(&tmp, &path)?;
			written.push(path);
		}

		for order in Order::ALL {
			log::info!("Exported {} model: {} ({} contexts)", order, written[order.index()].display(), self.table(order).len());
		}
		if let Some(path) = written.get(Order::ALL.len()) {
			log::info!("Exported metadata: {}", path.display());
		}

		Ok(written)
	}

	/// Writes every export to its temporary name, recording `(tmp, target)` pairs.
	/// A temporary file is recorded before it is written so a partial one is cleaned up too.
	fn stage(&self, output_dir: &Path, staged: &mut Vec<(PathBuf, PathBuf)>) -> Result<()> {
		for order in Order::ALL {
			let path = build_output_path(output_dir, order.name(), "json");
			let tmp = build_output_path(output_dir, order.name(), TMP_EXTENSION);
			staged.push((tmp.clone(), path));
			write_json(&tmp, self.table(order))?;
		}

		if let Some(metadata) = &self.metadata {
			let path = build_output_path(output_dir, METADATA_NAME, "json");
			let tmp = build_output_path(output_dir, METADATA_NAME, TMP_EXTENSION);
			staged.push((tmp.clone(), path));
			write_json(&tmp, metadata)?;
		}
		Ok(())
	}

	/// Reads tables previously written by [`Models::write_to`].
	///
	/// A missing `metadata.json` leaves `metadata` empty; a missing table is an error.
	pub fn load_from<P: AsRef<Path>>(input_dir: P) -> Result<Self> {
		let input_dir = input_dir.as_ref();
		let table = |order: Order| -> Result<ProbabilityTable> {
			read_json(build_output_path(input_dir, order.name(), "json"))
		};

		let metadata_path = build_output_path(input_dir, METADATA_NAME, "json");
		let metadata = if metadata_path.exists() { Some(read_json(metadata_path)?) } else { None };

		Ok(Self {
			unigram: table(Order::Unigram)?,
			bigram: table(Order::Bigram)?,
			trigram: table(Order::Trigram)?,
			metadata,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_models() -> Models {
		let mut unigram = ProbabilityTable::new();
		unigram.insert("C".to_owned(), BTreeMap::from([("G".to_owned(), 1.0)]));
		let metadata = Metadata {
			unigram_counts: BTreeMap::from([("C".to_owned(), 4)]),
			..Metadata::default()
		};
		Models { unigram, metadata: Some(metadata), ..Models::default() }
	}

	#[test]
	fn test_metadata_json_keys() {
		let json = serde_json::to_value(sample_models().metadata.unwrap()).unwrap();
		assert_eq!(json["unigram_counts"]["C"], 4);
		assert!(json["bigram_counts"].as_object().unwrap().is_empty());
		assert!(json.get("trigram_counts").is_some());
	}

	#[test]
	fn test_write_and_load() {
		let dir = tempfile::tempdir().unwrap();
		let models = sample_models();

		let written = models.write_to(dir.path()).unwrap();
		let names: Vec<_> = written.iter().map(|p| p.file_name().unwrap().to_string_lossy().to_string()).collect();
		assert_eq!(names, vec!["unigram.json", "bigram.json", "trigram.json", "metadata.json"]);

		let loaded = Models::load_from(dir.path()).unwrap();
		assert_eq!(loaded, models);

		let leftovers: Vec<_> = std::fs::read_dir(dir.path())
			.unwrap()
			.map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
			.filter(|name| name.ends_with(".tmp"))
			.collect();
		assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
	}

	#[test]
	fn test_failed_write_leaves_no_partial_export() {
		let dir = tempfile::tempdir().unwrap();
		// A directory squatting on the trigram temp name makes that write fail
		std::fs::create_dir(dir.path().join("trigram.json.tmp")).unwrap();

		assert!(sample_models().write_to(dir.path()).is_err());
		assert!(!dir.path().join("unigram.json").exists());
		assert!(!dir.path().join("bigram.json").exists());
		assert!(!dir.path().join("unigram.json.tmp").exists());
		assert!(!dir.path().join("bigram.json.tmp").exists());
		assert!(!dir.path().join("metadata.json").exists());
	}

	#[test]
	fn test_failed_write_keeps_previous_export() {
		let dir = tempfile::tempdir().unwrap();
		let models = sample_models();
		models.write_to(dir.path()).unwrap();

		std::fs::create_dir(dir.path().join("metadata.json.tmp")).unwrap();
		let mut changed = models.clone();
		changed.unigram.insert("G".to_owned(), BTreeMap::from([("C".to_owned(), 1.0)]));
		assert!(changed.write_to(dir.path()).is_err());

		assert_eq!(Models::load_from(dir.path()).unwrap(), models);
	}

	#[test]
	fn test_load_without_metadata() {
		let dir = tempfile::tempdir().unwrap();
		let models = Models { metadata: None, ..sample_models() };
		assert_eq!(models.write_to(dir.path()).unwrap().len(), 3);
		assert!(Models::load_from(dir.path()).unwrap().metadata.is_none());
	}

	#[test]
	fn test_load_missing_table_fails() {
		let dir = tempfile::tempdir().unwrap();
		assert!(Models::load_from(dir.path()).is_err());
	}
}
