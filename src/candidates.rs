//! Predicted descriptor names for a media file
//!
//! The photo export writes one JSON descriptor per media file but names it
//! inconsistently. Given a media file name this module predicts the trailing
//! part of the descriptor path under each known convention, most specific
//! first. Nothing here touches the filesystem.

use std::fmt;

use crate::paths::split_extension;

/// The naming convention that produced the primary candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamingPattern {
	/// `IMG_1667(1).jpg` has descriptor `IMG_1667.jpg(1).json`: the duplicate
	/// marker moves behind the extension
	DuplicateMarker,
	/// `photo-edited.jpg` shares the descriptor of `photo.jpg`
	EditedCopy,
	/// `photo.jpg` has descriptor `photo.jpg.json`
	FullName,
	/// `photo.jpg` has descriptor `photo.json`
	BareName,
}

impl NamingPattern {
	pub const ALL: [NamingPattern; 4] = [
		NamingPattern::DuplicateMarker,
		NamingPattern::EditedCopy,
		NamingPattern::FullName,
		NamingPattern::BareName,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			NamingPattern::DuplicateMarker => "duplicate_marker",
			NamingPattern::EditedCopy => "edited_copy",
			NamingPattern::FullName => "full_name",
			NamingPattern::BareName => "bare_name",
		}
	}
}

impl fmt::Display for NamingPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

const EDITED_SUFFIX: &str = "-edited";

/// Ordered, de-duplicated descriptor name suffixes for one media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
	/// Convention that chose the first suffix
	pub pattern: NamingPattern,
	pub suffixes: Vec<String>,
	/// Convention behind each entry of `suffixes`
	sources: Vec<NamingPattern>,
}

impl Candidates {
	pub fn primary(&self) -> &str {
		&self.suffixes[0]
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.suffixes.iter().map(String::as_str)
	}

	/// Suffixes paired with the convention that predicted them
	pub fn iter_with_pattern(&self) -> impl Iterator<Item = (NamingPattern, &str)> {
		self.sources
			.iter()
			.copied()
			.zip(self.suffixes.iter().map(String::as_str))
	}
}

/// Generate candidates for a file name using the default `.json` descriptor extension.
///
/// ```rust
/// use sidematch::candidates::candidate_suffixes;
///
/// let c = candidate_suffixes("IMG_1667(1).jpg");
/// assert_eq!(
///     c.suffixes,
///     ["IMG_1667.jpg(1).json", "IMG_1667(1).json", "IMG_1667(1).jpg.json"]
/// );
/// ```
pub fn candidate_suffixes(file_name: &str) -> Candidates {
	candidate_suffixes_with(file_name, ".json")
}

/// Generate candidates for `file_name`, with `descriptor_ext` (dot included)
/// appended to each prediction.
///
/// The order is: the primary candidate chosen by [`primary_candidate`], then
/// `basename + descriptor_ext` (exports that drop the media extension), then
/// `file_name + descriptor_ext`. Repeats keep their first position.
pub fn candidate_suffixes_with(file_name: &str, descriptor_ext: &str) -> Candidates {
	let (basename, ext) = split_extension(file_name);
	let (pattern, primary) = primary_candidate(basename, ext, descriptor_ext);

	let mut suffixes = Vec::with_capacity(3);
	let mut sources = Vec::with_capacity(3);
	for (source, candidate) in [
		(pattern, primary),
		(NamingPattern::BareName, format!("{basename}{descriptor_ext}")),
		(NamingPattern::FullName, format!("{file_name}{descriptor_ext}")),
	] {
		if !suffixes.contains(&candidate) {
			suffixes.push(candidate);
			sources.push(source);
		}
	}

	Candidates {
		pattern,
		suffixes,
		sources,
	}
}

/// Pick the most specific prediction for a basename/extension pair.
pub fn primary_candidate(
	basename: &str,
	ext: &str,
	descriptor_ext: &str,
) -> (NamingPattern, String) {
	if let Some((stem, marker)) = duplicate_marker(basename) {
		return (
			NamingPattern::DuplicateMarker,
			format!("{stem}{ext}({marker}){descriptor_ext}"),
		);
	}
	if let Some(original) = basename.strip_suffix(EDITED_SUFFIX) {
		return (
			NamingPattern::EditedCopy,
			format!("{original}{ext}{descriptor_ext}"),
		);
	}
	(
		NamingPattern::FullName,
		format!("{basename}{ext}{descriptor_ext}"),
	)
}

/// Split `IMG_1667(1)` into `("IMG_1667", "1")`.
///
/// Applies when the basename ends with `)` and contains a `(`; the marker is
/// whatever sits between the last `(` and the closing `)`. The export tool
/// always cuts exactly three characters off the basename, so the stem is the
/// basename minus its last three characters. For a single-digit marker that
/// is the whole `(n)`; wider markers leave part of it behind
/// (`IMG_1667(12)` gives stem `IMG_1667(`).
fn duplicate_marker(basename: &str) -> Option<(&str, &str)> {
	let inner = basename.strip_suffix(')')?;
	let open = inner.rfind('(')?;
	Some((drop_last_chars(basename, 3), &inner[open + 1..]))
}

/// `s` without its last `n` characters, empty when it is shorter
fn drop_last_chars(s: &str, n: usize) -> &str {
	if n == 0 {
		return s;
	}
	s.char_indices()
		.rev()
		.nth(n - 1)
		.map_or("", |(idx, _)| &s[..idx])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_duplicate_marker_moves_after_extension() {
		let c = candidate_suffixes("IMG_1667(1).jpg");
		assert_eq!(c.pattern, NamingPattern::DuplicateMarker);
		assert_eq!(c.primary(), "IMG_1667.jpg(1).json");
	}

	#[test]
	fn test_duplicate_marker_single_digit_property() {
		for n in 0..10 {
			for (base, ext) in [("IMG_1667", ".jpg"), ("a b c", ".PNG"), ("x", ".jpeg")] {
				let file_name = format!("{base}({n}){ext}");
				let basename = format!("{base}({n})");
				let expected = format!("{}{ext}({n}).json", &basename[..basename.len() - 3]);
				assert_eq!(candidate_suffixes(&file_name).primary(), expected);
			}
		}
	}

	#[test]
	fn test_duplicate_marker_cuts_three_characters() {
		let c = candidate_suffixes("IMG_1667(12).jpg");
		assert_eq!(c.pattern, NamingPattern::DuplicateMarker);
		assert_eq!(c.primary(), "IMG_1667(.jpg(12).json");

		let c = candidate_suffixes("x().png");
		assert_eq!(c.primary(), ".png().json");

		let c = candidate_suffixes("Été(7).jpg");
		assert_eq!(c.primary(), "Été.jpg(7).json");
	}

	#[test]
	fn test_drop_last_chars() {
		assert_eq!(drop_last_chars("IMG(1)", 3), "IMG");
		assert_eq!(drop_last_chars("(1)", 3), "");
		assert_eq!(drop_last_chars("()", 3), "");
		assert_eq!(drop_last_chars("àé(1)", 3), "àé");
		assert_eq!(drop_last_chars("abc", 0), "abc");
	}

	#[test]
	fn test_duplicate_marker_uses_last_parenthesis() {
		let c = candidate_suffixes("trip (day 2)(3).png");
		assert_eq!(c.primary(), "trip (day 2).png(3).json");
	}

	#[test]
	fn test_edited_copy_points_at_original() {
		let c = candidate_suffixes("Snapchat-1068254512-edited.jpg");
		assert_eq!(c.pattern, NamingPattern::EditedCopy);
		assert_eq!(c.primary(), "Snapchat-1068254512.jpg.json");
	}

	#[test]
	fn test_duplicate_marker_wins_over_edited() {
		let c = candidate_suffixes("photo-edited(1).jpg");
		assert_eq!(c.pattern, NamingPattern::DuplicateMarker);
		assert_eq!(c.primary(), "photo-edited.jpg(1).json");
	}

	#[test]
	fn test_default_pattern_appends_extension() {
		let c = candidate_suffixes("photo.jpg");
		assert_eq!(c.pattern, NamingPattern::FullName);
		assert_eq!(c.primary(), "photo.jpg.json");
	}

	#[test]
	fn test_parenthesis_not_at_end_is_default() {
		let c = candidate_suffixes("signal-2021-10-13 (2) copy.jpg");
		assert_eq!(c.pattern, NamingPattern::FullName);
	}

	#[test]
	fn test_fallbacks_always_offered_in_order() {
		let c = candidate_suffixes("Snapchat-1-edited.jpg");
		assert_eq!(
			c.suffixes,
			vec![
				"Snapchat-1.jpg.json".to_string(),
				"Snapchat-1-edited.json".to_string(),
				"Snapchat-1-edited.jpg.json".to_string(),
			]
		);
	}

	#[test]
	fn test_default_pattern_collapses_duplicate_fallback() {
		let c = candidate_suffixes("content_media_external_images_media_1000001232.jpg");
		assert_eq!(
			c.suffixes,
			vec![
				"content_media_external_images_media_1000001232.jpg.json".to_string(),
				"content_media_external_images_media_1000001232.json".to_string(),
			]
		);
	}

	#[test]
	fn test_fallback_sources() {
		let c = candidate_suffixes("IMG_1(1).jpg");
		let sources: Vec<NamingPattern> = c.iter_with_pattern().map(|(p, _)| p).collect();
		assert_eq!(
			sources,
			vec![
				NamingPattern::DuplicateMarker,
				NamingPattern::BareName,
				NamingPattern::FullName,
			]
		);
	}

	#[test]
	fn test_no_extension_collapses_to_one() {
		let c = candidate_suffixes("README");
		assert_eq!(c.suffixes, vec!["README.json".to_string()]);
	}

	#[test]
	fn test_custom_descriptor_extension() {
		let c = candidate_suffixes_with("IMG_1(1).jpg", ".supplemental-metadata.json");
		assert_eq!(c.primary(), "IMG_1.jpg(1).supplemental-metadata.json");
		assert_eq!(c.suffixes.len(), 3);
	}

	#[test]
	fn test_unicode_basename() {
		let c = candidate_suffixes("Été à Paris(2).jpeg");
		assert_eq!(c.primary(), "Été à Paris.jpeg(2).json");
	}

	#[test]
	fn test_pattern_display() {
		assert_eq!(NamingPattern::DuplicateMarker.to_string(), "duplicate_marker");
		assert_eq!(NamingPattern::EditedCopy.to_string(), "edited_copy");
		assert_eq!(NamingPattern::FullName.to_string(), "full_name");
		assert_eq!(NamingPattern::BareName.to_string(), "bare_name");
	}
}
