//! Path helpers that work on recorded path strings
//!
//! Inventory paths were recorded by whatever machine produced the export, so
//! they may use `\` or `/` regardless of the platform reading them. Nothing in
//! here touches the filesystem or uses `std::path` joining.

use std::path::PathBuf;

use dirs::config_dir;

/// Split a recorded path into its directory and final segment.
///
/// Both separator styles are accepted. The directory is returned normalised
/// to `/` so that two paths recorded with mixed separators still compare
/// equal. A path without a separator has an empty directory.
pub fn split_recorded_path(path: &str) -> (String, &str) {
	match path.rfind(['/', '\\']) {
		Some(idx) => (normalize_separators(&path[..idx]), &path[idx + 1..]),
		None => (String::new(), path),
	}
}

/// Directory part of a recorded path, normalised to `/`.
pub fn recorded_dir(path: &str) -> String {
	split_recorded_path(path).0
}

pub fn normalize_separators(path: &str) -> String {
	path.replace('\\', "/")
}

/// Split a file name into basename and extension, the extension keeping its dot.
///
/// The extension starts at the last `.`, except that leading dots belong to
/// the basename: `.hidden` has no extension and `..jpg` is all basename.
pub fn split_extension(file_name: &str) -> (&str, &str) {
	let leading = file_name.len() - file_name.trim_start_matches('.').len();
	match file_name[leading..].rfind('.') {
		Some(idx) => file_name.split_at(leading + idx),
		None => (file_name, ""),
	}
}

/// Lowercased extension without its dot, if any.
pub fn extension_lowercase(file_name: &str) -> Option<String> {
	let (_, ext) = split_extension(file_name);
	ext.strip_prefix('.').map(str::to_ascii_lowercase)
}

/// Default configuration directory for sidematch
pub fn default_config_dir() -> Option<PathBuf> {
	config_dir().map(|d| d.join("sidematch"))
}

/// Default location of the configuration file
pub fn default_config_file() -> Option<PathBuf> {
	default_config_dir().map(|d| d.join("config.toml"))
}
