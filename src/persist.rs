//! Inventory CSV loading and stage output writing

use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{ColumnNames, ReconcilerConfig};
use crate::data::InventoryState;
use crate::error::ReconcileResult;
use crate::query::Query;

/// Which slice of the inventory a saved file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStage {
	/// Every record with every column
	Inventory,
	/// Image records without a capture time, with the descriptor column
	Matched,
	/// Records that have a descriptor, trimmed to what a metadata writer needs
	Recovered,
}

/// Load an inventory export. Every column is read as text.
pub fn load_inventory_csv(path: &Path, names: &ColumnNames) -> ReconcileResult<InventoryState> {
	debug!("Persist: loading inventory {}", path.display());
	let data = CsvReadOptions::default()
		.with_has_header(true)
		.with_infer_schema_length(Some(0))
		.try_into_reader_with_file_path(Some(path.to_path_buf()))?
		.finish()?;
	let source_name = path
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string());
	let state = InventoryState::from_external(data, names, &source_name)?;
	info!("Persist: loaded {} records from {}", state.height(), source_name);
	Ok(state)
}

/// The table written for `stage`, with external column names
pub fn stage_frame(
	state: &InventoryState,
	config: &ReconcilerConfig,
	stage: OutputStage,
) -> ReconcileResult<DataFrame> {
	let query = Query::new(state, &config.matching);
	match stage {
		OutputStage::Inventory => state.to_external(&config.columns),
		OutputStage::Matched => {
			let rows = InventoryState {
				data: query.unresolved_images()?,
			};
			rows.to_external(&config.columns)
		}
		OutputStage::Recovered => {
			let rows = InventoryState {
				data: query.matched()?,
			};
			let mut data = rows.to_external(&config.columns)?;
			let present = data.get_column_names();
			let dropped: Vec<String> = std::iter::once(&config.columns.matched_descriptor)
				.chain(&config.output.drop_columns)
				.filter(|c| present.contains(&c.as_str()))
				.cloned()
				.collect();
			for column in &dropped {
				data = data.drop(column)?;
			}
			Ok(data)
		}
	}
}

/// Write the `stage` slice of `state` to `path` as CSV, atomically
pub fn save_inventory_csv(
	path: &Path,
	state: &InventoryState,
	config: &ReconcilerConfig,
	stage: OutputStage,
) -> ReconcileResult<()> {
	let df = stage_frame(state, config, stage)?;
	info!(
		"Persist: writing {} rows ({:?}) to {}",
		df.height(),
		stage,
		path.display()
	);
	atomic_write_csv(path.to_path_buf(), df)
}

// Write to a temp file and rename into place
fn atomic_write_csv(path: PathBuf, mut df: DataFrame) -> ReconcileResult<()> {
	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		fs::create_dir_all(parent)?;
	}
	let tmp = path.with_extension("csv.tmp");
	let mut f = File::create(&tmp)?;
	CsvWriter::new(&mut f).include_header(true).finish(&mut df)?;
	f.flush()?;
	f.sync_all()?;
	drop(f);

	#[cfg(windows)]
	{
		if path.exists() {
			fs::remove_file(&path)?;
		}
	}
	fs::rename(&tmp, &path)?;
	Ok(())
}
