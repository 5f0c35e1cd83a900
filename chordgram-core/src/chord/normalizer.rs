use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NO_THIRD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)no3d").expect("valid no3d pattern"));
static ROOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-G][#b]?").expect("valid root pattern"));

/// Canonical chord quality.
///
/// `Major` is never written out: a major chord is represented by its bare root.
/// `Other` keeps any quality that none of the known patterns matched,
/// lowercased and otherwise verbatim (e.g. `maj9`, `6`, `5`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quality {
	Major,
	Minor,
	Dominant7,
	Major7,
	Minor7,
	Diminished,
	Augmented,
	Sus,
	Sus2,
	Sus4,
	Add,
	Add9,
	Add11,
	Add13,
	Other(String),
}

impl Quality {
	/// Classifies the raw text following the root.
	///
	/// The checks are ordered substring tests, most specific first. A token that
	/// matches several patterns (e.g. `7sus4`) resolves to the first one listed
	/// here, which is `Dominant7` in that case.
	pub fn classify(raw: &str) -> Self {
		if raw.contains("maj7") || raw.contains("M7") {
			Quality::Major7
		} else if raw.contains("min7") || raw.contains("m7") {
			Quality::Minor7
		} else if raw.contains('7') {
			Quality::Dominant7
		} else if raw.contains("dim") {
			Quality::Diminished
		} else if raw.contains("aug") {
			Quality::Augmented
		} else if raw.contains("sus") {
			if raw.contains("sus4") {
				Quality::Sus4
			} else if raw.contains("sus2") {
				Quality::Sus2
			} else {
				Quality::Sus
			}
		} else if raw.contains("add") {
			if raw.contains("add9") {
				Quality::Add9
			} else if raw.contains("add11") {
				Quality::Add11
			} else if raw.contains("add13") {
				Quality::Add13
			} else {
				Quality::Add
			}
		} else {
			let lower = raw.to_lowercase();
			match lower.as_str() {
				"m" | "min" | "minor" => Quality::Minor,
				// "M" can't reach this arm once lowercased: it is caught as minor above
				"maj" | "major" | "" => Quality::Major,
				_ => Quality::Other(lower),
			}
		}
	}

	/// Suffix appended to the root in the canonical chord token.
	pub fn suffix(&self) -> &str {
		match self {
			Quality::Major => "",
			Quality::Minor => "min",
			Quality::Dominant7 => "7",
			Quality::Major7 => "maj7",
			Quality::Minor7 => "min7",
			Quality::Diminished => "dim",
			Quality::Augmented => "aug",
			Quality::Sus => "sus",
			Quality::Sus2 => "sus2",
			Quality::Sus4 => "sus4",
			Quality::Add => "add",
			Quality::Add9 => "add9",
			Quality::Add11 => "add11",
			Quality::Add13 => "add13",
			Quality::Other(s) => s.as_str(),
		}
	}
}

/// A parsed chord: sharp-normalized root plus canonical quality.
///
/// Its `Display` form is the canonical chord token used as n-gram atom.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Chord {
	root: String,
	quality: Quality,
}

impl Chord {
	pub fn root(&self) -> &str {
		&self.root
	}

	pub fn quality(&self) -> &Quality {
		&self.quality
	}
}

impl fmt::Display for Chord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.root, self.quality.suffix())
	}
}

/// Rewrites a flat root to its enharmonic sharp.
///
/// Sharps and natural roots are returned unchanged, as are flats outside the
/// table (`Cb`, `Fb`).
pub fn sharpen_root(root: &str) -> &str {
	match root {
		"Db" => "C#",
		"Eb" => "D#",
		"Gb" => "F#",
		"Ab" => "G#",
		"Bb" => "A#",
		other => other,
	}
}

/// Parses a raw chord token into a [`Chord`].
///
/// Steps, in order:
/// 1. trim whitespace, reject an empty token
/// 2. strip any `no3d` marker (case-insensitive)
/// 3. drop the bass note of a slash chord (`C/E` → `C`)
/// 4. match the root (`A`-`G` with an optional `#` or `b`), reject otherwise
/// 5. rewrite flats to sharps
/// 6. classify the rest as the quality
///
/// Returns `None` when the token is rejected.
pub fn parse_chord(raw: &str) -> Option<Chord> {
	let token = raw.trim();
	if token.is_empty() {
		return None;
	}

	let stripped = NO_THIRD.replace_all(token, "");
	let token: &str = match stripped.find('/') {
		Some(slash) => &stripped[..slash],
		None => &stripped,
	};

	let root = ROOT.find(token)?;
	let quality = Quality::classify(token[root.end()..].trim());

	Some(Chord { root: sharpen_root(root.as_str()).to_owned(), quality })
}

/// Maps a raw chord token to its canonical string (`<Root><Quality>`).
///
/// Pure and deterministic; see [`parse_chord`] for the rules.
pub fn normalize_chord(raw: &str) -> Option<String> {
	parse_chord(raw).map(|chord| chord.to_string())
}
