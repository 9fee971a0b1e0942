//! Builds an inventory by walking an export folder

use async_trait::async_trait;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::config::MatchSettings;
use crate::data::{InventoryState, MediaRecord};
use crate::error::{SystemError, SystemResult};
use crate::report::Summary;
use crate::systems::{System, SystemRunner};

/// Records every file below `root`, reading the embedded capture time of images.
///
/// Produces the same store a metadata export would: one row per file, with
/// `captured_at` set when the image carries an EXIF `DateTimeOriginal`.
pub struct InventoryDiscoverySystem {
	/// Folder to scan
	pub root: PathBuf,
	/// Whether to follow symbolic links
	pub follow_links: bool,
	/// Maximum depth to scan (None for unlimited)
	pub max_depth: Option<usize>,
	pub settings: MatchSettings,
}

impl InventoryDiscoverySystem {
	pub fn new(root: impl Into<PathBuf>, settings: MatchSettings) -> Self {
		Self {
			root: root.into(),
			follow_links: false,
			max_depth: None,
			settings,
		}
	}

	/// Configure whether to follow symbolic links
	pub fn follow_links(mut self, follow: bool) -> Self {
		self.follow_links = follow;
		self
	}

	/// Set maximum scan depth
	pub fn max_depth(mut self, depth: usize) -> Self {
		self.max_depth = Some(depth);
		self
	}

	/// Walk the root and build one record per regular file, in walk order
	pub fn discover(&self) -> Vec<MediaRecord> {
		info!("Discovery: scanning {}", self.root.display());
		let mut walker = WalkDir::new(&self.root)
			.follow_links(self.follow_links)
			.sort_by_file_name();
		if let Some(max_depth) = self.max_depth {
			walker = walker.max_depth(max_depth);
		}

		let mut records = Vec::new();
		for entry in walker {
			let entry = match entry {
				Ok(e) => e,
				Err(e) => {
					warn!("Discovery walk error: {}", e);
					continue;
				}
			};
			if !entry.file_type().is_file() {
				continue;
			}

			let path = entry.path();
			let Some(path_str) = path.to_str() else {
				warn!("Skipping {} (path is not valid UTF-8)", path.display());
				continue;
			};

			let mut record = MediaRecord::new(path_str);
			if record.is_image(&self.settings)
				&& let Some(captured_at) = read_exif_capture_time(path)
			{
				record.captured_at = Some(captured_at);
			}
			trace!(
				"Discovery: found {} (captured_at: {:?})",
				record.path, record.captured_at
			);
			records.push(record);
		}

		debug!("Discovery: {} files found", records.len());
		records
	}
}

/// `DateTimeOriginal` of the primary image, as stored (`YYYY:MM:DD HH:MM:SS`)
pub fn read_exif_capture_time(path: &Path) -> Option<String> {
	let file = File::open(path).ok()?;
	let mut bufreader = BufReader::new(&file);
	let reader = exif::Reader::new().read_from_container(&mut bufreader).ok()?;
	let field = reader.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)?;
	match &field.value {
		exif::Value::Ascii(parts) => parts
			.first()
			.map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
			.filter(|s| !s.is_empty()),
		_ => None,
	}
}

#[async_trait]
impl SystemRunner for InventoryDiscoverySystem {
	async fn run(&self, state: &mut InventoryState, summary: &mut Summary) -> SystemResult<()> {
		let records = self.discover();
		state
			.add_records(records)
			.and_then(|_| summary.refresh_inventory(state, &self.settings))
			.map_err(|e| SystemError::ExecutionFailed {
				system: self.name().to_string(),
				reason: format!("Failed to add records to state: {}", e),
			})?;
		info!("Discovery: inventory now holds {} records", state.height());
		Ok(())
	}

	fn can_run(&self, _state: &InventoryState) -> bool {
		// Discovery creates the initial data
		true
	}

	fn name(&self) -> &'static str {
		"InventoryDiscovery"
	}
}

impl System for InventoryDiscoverySystem {
	fn required_columns(&self) -> &[&'static str] {
		&[]
	}

	fn description(&self) -> &'static str {
		"Walks an export folder and records each file with its embedded capture time"
	}
}
