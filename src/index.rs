//! Directory-scoped lookup over descriptor files
//!
//! Built once from the record store before a matching pass and never mutated
//! afterwards, so it can be shared freely between worker threads.

use std::collections::BTreeMap;

use tracing::debug;

use crate::paths::split_recorded_path;

/// One descriptor known to the index
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexedFile {
	/// Final path segment
	pub file_name: String,
	/// Path exactly as recorded in the inventory
	pub path: String,
}

/// Immutable map from directory to the descriptor files it contains.
///
/// Directories are keyed by their recorded text with separators normalised
/// to `/`, so lookups never depend on how the current platform joins paths.
/// Each directory's files are sorted by name, which makes every query result
/// come back in a stable lexicographic order.
#[derive(Debug, Clone, Default)]
pub struct DirectoryIndex {
	dirs: BTreeMap<String, Vec<IndexedFile>>,
	len: usize,
}

impl DirectoryIndex {
	/// Index every path whose file name ends with `descriptor_ext`.
	pub fn build<'a, I>(paths: I, descriptor_ext: &str) -> Self
	where
		I: IntoIterator<Item = &'a str>,
	{
		let ext = descriptor_ext.to_ascii_lowercase();
		let mut dirs: BTreeMap<String, Vec<IndexedFile>> = BTreeMap::new();
		let mut len = 0usize;
		for path in paths {
			let (dir, file_name) = split_recorded_path(path);
			if !file_name.to_ascii_lowercase().ends_with(&ext) {
				continue;
			}
			dirs.entry(dir).or_default().push(IndexedFile {
				file_name: file_name.to_string(),
				path: path.to_string(),
			});
			len += 1;
		}
		for files in dirs.values_mut() {
			files.sort();
			files.dedup();
		}
		let len_after = dirs.values().map(Vec::len).sum();
		if len_after != len {
			debug!("Index: dropped {} repeated descriptor paths", len - len_after);
		}
		debug!(
			"Index: {} descriptors in {} directories",
			len_after,
			dirs.len()
		);
		Self { dirs, len: len_after }
	}

	/// All descriptors in exactly `dir` whose file name ends with `suffix`.
	///
	/// `dir` is compared after separator normalisation. Subdirectories and
	/// sibling directories sharing a prefix are never searched.
	pub fn lookup<'a>(&'a self, dir: &str, suffix: &'a str) -> impl Iterator<Item = &'a IndexedFile> + 'a {
		let key = crate::paths::normalize_separators(dir);
		self.dirs
			.get(&key)
			.into_iter()
			.flat_map(|files| files.iter())
			.filter(move |f| f.file_name.ends_with(suffix))
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn directory_count(&self) -> usize {
		self.dirs.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn index(paths: &[&str]) -> DirectoryIndex {
		DirectoryIndex::build(paths.iter().copied(), ".json")
	}

	fn hits(index: &DirectoryIndex, dir: &str, suffix: &str) -> Vec<String> {
		index.lookup(dir, suffix).map(|f| f.path.clone()).collect()
	}

	#[test]
	fn test_only_descriptors_are_indexed() {
		let idx = index(&["a/IMG_1.jpg", "a/IMG_1.jpg.json", "a/notes.JSON", "a/clip.mp4"]);
		assert_eq!(idx.len(), 2);
		assert_eq!(idx.directory_count(), 1);
	}

	#[test]
	fn test_lookup_is_suffix_match_within_directory() {
		let idx = index(&["a/IMG_1.jpg.json", "a/XIMG_1.jpg.json", "a/IMG_2.jpg.json"]);
		assert_eq!(
			hits(&idx, "a", "IMG_1.jpg.json"),
			vec!["a/IMG_1.jpg.json".to_string(), "a/XIMG_1.jpg.json".to_string()]
		);
	}

	#[test]
	fn test_lookup_never_crosses_directories() {
		let idx = index(&["a/IMG_1.jpg.json", "a/sub/IMG_2.jpg.json", "ab/IMG_3.jpg.json"]);
		assert!(hits(&idx, "b", "IMG_1.jpg.json").is_empty());
		assert!(hits(&idx, "a", "IMG_2.jpg.json").is_empty());
		assert!(hits(&idx, "a", "IMG_3.jpg.json").is_empty());
		assert_eq!(hits(&idx, "a/sub", "IMG_2.jpg.json").len(), 1);
	}

	#[test]
	fn test_lookup_is_separator_agnostic() {
		let idx = index(&[r"E:\Takeout\Photos\IMG_1.jpg.json"]);
		assert_eq!(
			hits(&idx, "E:/Takeout/Photos", "IMG_1.jpg.json"),
			vec![r"E:\Takeout\Photos\IMG_1.jpg.json".to_string()]
		);
		assert_eq!(hits(&idx, r"E:\Takeout\Photos", "IMG_1.jpg.json").len(), 1);
	}

	#[test]
	fn test_results_are_sorted_and_deduplicated() {
		let idx = index(&["d/b.json", "d/a.json", "d/b.json"]);
		assert_eq!(
			hits(&idx, "d", ".json"),
			vec!["d/a.json".to_string(), "d/b.json".to_string()]
		);
		assert_eq!(idx.len(), 2);
	}

	#[test]
	fn test_root_level_files() {
		let idx = index(&["IMG_1.jpg.json"]);
		assert_eq!(hits(&idx, "", "IMG_1.jpg.json").len(), 1);
	}

	#[test]
	fn test_empty_index() {
		let idx = DirectoryIndex::default();
		assert!(idx.is_empty());
		assert_eq!(idx.directory_count(), 0);
		assert!(hits(&idx, "a", ".json").is_empty());
	}
}
