//! Configuration for matching, column mapping and output shaping

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReconcileError, ReconcileResult};
use crate::paths::default_config_file;

/// Top level configuration, loadable from TOML.
///
/// Every section has defaults matching a Google Photos export that was
/// inventoried with `exiftool -csv`, so an empty file (or no file) works.
///
/// ```toml
/// [matching]
/// image_extensions = ["jpg", "jpeg", "png", "heic"]
///
/// [recovery]
/// time_zone = "utc"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
	pub matching: MatchSettings,
	pub columns: ColumnNames,
	pub recovery: RecoverySettings,
	pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
	/// Extensions (without dot, any case) that are eligible for matching
	pub image_extensions: BTreeSet<String>,
	/// Extension of the sidecar descriptors, dot included
	pub descriptor_extension: String,
}

impl Default for MatchSettings {
	fn default() -> Self {
		Self {
			image_extensions: ["jpg", "jpeg", "png"].into_iter().map(String::from).collect(),
			descriptor_extension: ".json".to_string(),
		}
	}
}

impl MatchSettings {
	pub fn is_image_extension(&self, ext: &str) -> bool {
		self.image_extensions
			.iter()
			.any(|e| e.eq_ignore_ascii_case(ext))
	}
}

/// External column names of the inventory CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
	pub path: String,
	pub file_name: String,
	pub captured_at: String,
	pub matched_descriptor: String,
}

impl Default for ColumnNames {
	fn default() -> Self {
		Self {
			path: "SourceFile".to_string(),
			file_name: "FileName".to_string(),
			captured_at: "DateTimeOriginal".to_string(),
			matched_descriptor: "JsonFile".to_string(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneSetting {
	/// Format recovered timestamps in the machine's local time zone
	#[default]
	Local,
	Utc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverySettings {
	pub time_zone: TimeZoneSetting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
	/// External columns removed from the final, recovered inventory
	pub drop_columns: Vec<String>,
}

impl Default for OutputSettings {
	fn default() -> Self {
		Self {
			drop_columns: [
				"FileName",
				"FileSize",
				"Model",
				"Flash",
				"ImageSize",
				"FocalLength",
				"ShutterSpeed",
				"Aperture",
				"ISO",
				"WhiteBalance",
			]
			.into_iter()
			.map(String::from)
			.collect(),
		}
	}
}

impl ReconcilerConfig {
	/// Parse and validate a TOML document
	pub fn from_toml_str(text: &str) -> ReconcileResult<Self> {
		let config: Self = toml::from_str(text).map_err(|e| ReconcileError::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Load a configuration file
	pub fn from_file(path: &Path) -> ReconcileResult<Self> {
		let text = std::fs::read_to_string(path)?;
		let config: Self = toml::from_str(&text).map_err(|e| ReconcileError::ConfigFile {
			path: path.to_path_buf(),
			reason: e.to_string(),
		})?;
		config.validate()?;
		debug!("Config: loaded {}", path.display());
		Ok(config)
	}

	/// Load an explicit file, or the default location if it exists, or defaults
	pub fn load(explicit: Option<&Path>) -> ReconcileResult<Self> {
		if let Some(path) = explicit {
			return Self::from_file(path);
		}
		match default_config_file() {
			Some(path) if path.is_file() => Self::from_file(&path),
			_ => {
				debug!("Config: using defaults");
				Ok(Self::default())
			}
		}
	}

	pub fn validate(&self) -> ReconcileResult<()> {
		if self.matching.image_extensions.is_empty() {
			return Err(ReconcileError::Config(
				"matching.image_extensions must not be empty".to_string(),
			));
		}
		if let Some(bad) = self
			.matching
			.image_extensions
			.iter()
			.find(|e| e.is_empty() || e.starts_with('.'))
		{
			return Err(ReconcileError::Config(format!(
				"image extension '{}' must be non-empty and given without a dot",
				bad
			)));
		}
		let desc = &self.matching.descriptor_extension;
		if desc.len() < 2 || !desc.starts_with('.') {
			return Err(ReconcileError::Config(format!(
				"descriptor_extension '{}' must start with '.'",
				desc
			)));
		}
		let cols = &self.columns;
		let names = [
			&cols.path,
			&cols.file_name,
			&cols.captured_at,
			&cols.matched_descriptor,
		];
		if names.iter().any(|n| n.is_empty()) {
			return Err(ReconcileError::Config(
				"column names must not be empty".to_string(),
			));
		}
		let unique: BTreeSet<&String> = names.into_iter().collect();
		if unique.len() != 4 {
			return Err(ReconcileError::Config(
				"column names must be distinct".to_string(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_defaults_are_valid() {
		let config = ReconcilerConfig::default();
		assert!(config.validate().is_ok());
		assert!(config.matching.is_image_extension("JPG"));
		assert!(config.matching.is_image_extension("png"));
		assert!(!config.matching.is_image_extension("mp4"));
		assert_eq!(config.columns.path, "SourceFile");
		assert_eq!(config.recovery.time_zone, TimeZoneSetting::Local);
	}

	#[test]
	fn test_partial_toml_keeps_defaults() {
		let config = ReconcilerConfig::from_toml_str(
			r#"
			[matching]
			image_extensions = ["jpg", "heic"]

			[recovery]
			time_zone = "utc"
			"#,
		)
		.unwrap();
		assert!(config.matching.is_image_extension("HEIC"));
		assert!(!config.matching.is_image_extension("png"));
		assert_eq!(config.matching.descriptor_extension, ".json");
		assert_eq!(config.recovery.time_zone, TimeZoneSetting::Utc);
		assert_eq!(config.columns, ColumnNames::default());
	}

	#[test]
	fn test_empty_extension_list_rejected() {
		let result = ReconcilerConfig::from_toml_str("[matching]\nimage_extensions = []\n");
		assert!(matches!(result, Err(ReconcileError::Config(_))));
	}

	#[test]
	fn test_dotted_image_extension_rejected() {
		let result = ReconcilerConfig::from_toml_str("[matching]\nimage_extensions = [\".jpg\"]\n");
		assert!(matches!(result, Err(ReconcileError::Config(_))));
	}

	#[test]
	fn test_descriptor_extension_needs_dot() {
		let result = ReconcilerConfig::from_toml_str("[matching]\ndescriptor_extension = \"json\"\n");
		assert!(matches!(result, Err(ReconcileError::Config(_))));
	}

	#[test]
	fn test_duplicate_column_names_rejected() {
		let result = ReconcilerConfig::from_toml_str(
			"[columns]\npath = \"FileName\"\n",
		);
		assert!(matches!(result, Err(ReconcileError::Config(_))));
	}

	#[test]
	fn test_from_file_and_load() {
		let temp_dir = TempDir::new().unwrap();
		let path = temp_dir.path().join("config.toml");
		std::fs::write(&path, "[output]\ndrop_columns = [\"Model\"]\n").unwrap();

		let config = ReconcilerConfig::load(Some(&path)).unwrap();
		assert_eq!(config.output.drop_columns, vec!["Model".to_string()]);
	}

	#[test]
	fn test_from_file_reports_path_on_parse_error() {
		let temp_dir = TempDir::new().unwrap();
		let path = temp_dir.path().join("broken.toml");
		std::fs::write(&path, "[matching\n").unwrap();

		let result = ReconcilerConfig::from_file(&path);
		assert!(matches!(result, Err(ReconcileError::ConfigFile { .. })));
	}
}
