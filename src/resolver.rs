//! Resolve media records to their sidecar descriptors

use tracing::{trace, warn};

use crate::candidates::{NamingPattern, candidate_suffixes_with};
use crate::config::MatchSettings;
use crate::data::MediaRecord;
use crate::index::{DirectoryIndex, IndexedFile};
use crate::paths::recorded_dir;

/// Result of matching one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
	/// The record already has a capture time and was not looked at
	AlreadyResolved,
	/// Not an image; the matcher ignores it
	Ineligible,
	/// A descriptor was matched in this pass, or was already recorded
	Matched {
		descriptor: String,
		/// `None` when the descriptor came from an earlier pass
		pattern: Option<NamingPattern>,
		/// More than one descriptor satisfied the winning candidate
		ambiguous: bool,
	},
	/// Every candidate was tried without a hit
	Unmatchable,
}

impl MatchOutcome {
	pub fn descriptor(&self) -> Option<&str> {
		match self {
			MatchOutcome::Matched { descriptor, .. } => Some(descriptor),
			_ => None,
		}
	}

	pub fn is_matched(&self) -> bool {
		matches!(self, MatchOutcome::Matched { .. })
	}
}

/// Matches records against an immutable descriptor index.
///
/// Holds only shared references, so one resolver can be used from many
/// threads at once.
#[derive(Debug, Clone, Copy)]
pub struct MatchResolver<'a> {
	index: &'a DirectoryIndex,
	settings: &'a MatchSettings,
}

impl<'a> MatchResolver<'a> {
	pub fn new(index: &'a DirectoryIndex, settings: &'a MatchSettings) -> Self {
		Self { index, settings }
	}

	/// Decide the outcome for one record.
	///
	/// Records with a capture time are left alone, as are non-images. A
	/// record that already names a descriptor keeps it. Otherwise each
	/// candidate suffix is probed in order within the record's directory and
	/// the first candidate with any hit wins.
	pub fn resolve(&self, record: &MediaRecord) -> MatchOutcome {
		if record.captured_at.is_some() {
			return MatchOutcome::AlreadyResolved;
		}
		if !record.is_image(self.settings) {
			return MatchOutcome::Ineligible;
		}
		if let Some(existing) = &record.matched_descriptor {
			return MatchOutcome::Matched {
				descriptor: existing.clone(),
				pattern: None,
				ambiguous: false,
			};
		}

		let dir = recorded_dir(&record.path);
		let candidates =
			candidate_suffixes_with(&record.file_name, &self.settings.descriptor_extension);

		for (pattern, suffix) in candidates.iter_with_pattern() {
			let hits: Vec<&IndexedFile> = self.index.lookup(&dir, suffix).collect();
			let Some(chosen) = pick(&hits, suffix) else {
				continue;
			};
			let ambiguous = hits.len() > 1;
			if ambiguous {
				warn!(
					"Match: {} descriptors end with '{}' for {}; picked {}",
					hits.len(),
					suffix,
					record.path,
					chosen.path
				);
			}
			trace!("Match: {} -> {} ({})", record.path, chosen.path, pattern);
			return MatchOutcome::Matched {
				descriptor: chosen.path.clone(),
				pattern: Some(pattern),
				ambiguous,
			};
		}

		trace!("Match: no descriptor for {}", record.path);
		MatchOutcome::Unmatchable
	}
}

/// Exact file name wins, else the lexicographically first hit.
///
/// `hits` arrive sorted by file name from the index.
fn pick<'h>(hits: &[&'h IndexedFile], suffix: &str) -> Option<&'h IndexedFile> {
	hits.iter()
		.find(|f| f.file_name == suffix)
		.or_else(|| hits.first())
		.copied()
}
