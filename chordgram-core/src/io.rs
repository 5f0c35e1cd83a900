use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ChordGramError, Result};

/// Column names searched, in order, for the chord sequence.
pub const CHORD_COLUMNS: [&str; 5] = ["chords", "chord", "progression", "chord_sequence", "chord_progression"];

/// Picks the chord column from a CSV header.
///
/// - The first known chord column name present wins
/// - Otherwise the first column is assumed to hold the chords
///
/// # Errors
/// Returns an error if the header has no columns.
pub fn detect_chord_column(headers: &csv::StringRecord) -> Result<usize> {
	for name in CHORD_COLUMNS {
		if let Some(index) = headers.iter().position(|header| header.trim() == name) {
			return Ok(index);
		}
	}
	if headers.is_empty() {
		return Err(ChordGramError::NoChordColumn("header has no columns".to_owned()));
	}
	Ok(0)
}

/// Streams the chord sequence of every row of a CSV dataset.
///
/// Rows are read one at a time, the file is never loaded entirely. Each item
/// is the raw chord string of one song; a row that cannot be decoded yields an
/// `Err` item and iteration continues with the next row. A row without a cell
/// in the chord column yields an empty string.
pub struct SongReader<R: Read> {
	records: csv::StringRecordsIntoIter<R>,
	chord_column: usize,
	column_name: String,
}

impl SongReader<File> {
	/// Opens a CSV file and detects its chord column.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_reader(File::open(path)?)
	}
}

impl<R: Read> SongReader<R> {
	/// Wraps any reader producing CSV with a header row.
	pub fn from_reader(reader: R) -> Result<Self> {
		let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
		let headers = csv_reader.headers()?.clone();
		let chord_column = detect_chord_column(&headers)?;
		let column_name = headers.get(chord_column).unwrap_or_default().to_owned();
		log::debug!("Using column '{}' (index {}) as chord sequence", column_name, chord_column);

		Ok(Self { records: csv_reader.into_records(), chord_column, column_name })
	}

	/// Name of the column the chord sequences are read from.
	pub fn chord_column(&self) -> &str {
		&self.column_name
	}
}

impl<R: Read> Iterator for SongReader<R> {
	type Item = Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		let record = self.records.next()?;
		Some(
			record
				.map(|row| row.get(self.chord_column).unwrap_or_default().to_owned())
				.map_err(ChordGramError::from),
		)
	}
}

/// Builds an output path from a directory, a base name and an extension.
///
/// Example:
/// `exports` + `"bigram"` + `"json"` → `exports/bigram.json`
pub fn build_output_path<P: AsRef<Path>>(dir: P, name: &str, extension: &str) -> PathBuf {
	let mut output = dir.as_ref().join(name);
	output.set_extension(extension);
	output
}

/// Serializes `value` to `path` as pretty-printed JSON.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
	let mut writer = BufWriter::new(File::create(path)?);
	serde_json::to_writer_pretty(&mut writer, value)?;
	writer.write_all(b"\n")?;
	writer.flush()?;
	Ok(())
}

/// Deserializes a JSON file.
pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T> {
	let reader = BufReader::new(File::open(path)?);
	Ok(serde_json::from_reader(reader)?)
}
