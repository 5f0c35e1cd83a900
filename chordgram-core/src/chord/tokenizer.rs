use once_cell::sync::Lazy;
use regex::Regex;

use super::normalizer::normalize_chord;

static SECTION_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]+>").expect("valid section marker pattern"));

/// Turns a raw chord-sequence string into an ordered list of canonical chords.
///
/// - Removes section markers such as `<verse_1>` or `<chorus_2>`
/// - Splits the remainder on whitespace
/// - Normalizes every piece, silently dropping the rejected ones
///
/// An empty input, or one where no token survives, yields an empty list.
pub fn tokenize(raw_sequence: &str) -> Vec<String> {
	let stripped = SECTION_MARKER.replace_all(raw_sequence, "");
	stripped
		.split_whitespace()
		.filter_map(normalize_chord)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_strips_section_markers() {
		assert_eq!(
			tokenize("<verse_1> C G Amin F <chorus_1> C G"),
			vec!["C", "G", "Amin", "F", "C", "G"]
		);
	}

	#[test]
	fn test_marker_without_spaces() {
		assert_eq!(tokenize("<intro_1>C G <verse_1>Am"), vec!["C", "G", "Amin"]);
		// Markers are deleted, not replaced: neighbours are joined
		assert_eq!(tokenize("C<bridge>G"), vec!["Cg"]);
	}

	#[test]
	fn test_drops_invalid_tokens() {
		assert_eq!(tokenize("C N.C. x Db/F  G7"), vec!["C", "C#", "G7"]);
	}

	#[test]
	fn test_empty_results() {
		assert!(tokenize("").is_empty());
		assert!(tokenize("   \t\n").is_empty());
		assert!(tokenize("<verse_1> <chorus_1>").is_empty());
		assert!(tokenize("nothing here").is_empty());
	}
}
