//! Record store backed by a Polars DataFrame

use polars::prelude::*;

use crate::config::{ColumnNames, MatchSettings};
use crate::error::{ReconcileError, ReconcileResult};
use crate::paths::{extension_lowercase, split_recorded_path};

/// Internal column names of the record store
pub mod columns {
	pub const PATH: &str = "path";
	pub const FILE_NAME: &str = "file_name";
	pub const CAPTURED_AT: &str = "captured_at";
	pub const MATCHED_DESCRIPTOR: &str = "matched_descriptor";

	pub const CORE: [&str; 4] = [PATH, FILE_NAME, CAPTURED_AT, MATCHED_DESCRIPTOR];
}

/// One inventory entry, media file or descriptor alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
	pub path: String,
	pub file_name: String,
	/// Capture time already known from embedded metadata or recovered later
	pub captured_at: Option<String>,
	/// Descriptor resolved for this record, set at most once
	pub matched_descriptor: Option<String>,
}

impl MediaRecord {
	/// Record with the file name taken from the last path segment
	pub fn new(path: impl Into<String>) -> Self {
		let path = path.into();
		let file_name = split_recorded_path(&path).1.to_string();
		Self {
			path,
			file_name,
			captured_at: None,
			matched_descriptor: None,
		}
	}

	pub fn with_captured_at(mut self, captured_at: impl Into<String>) -> Self {
		self.captured_at = Some(captured_at.into());
		self
	}

	pub fn with_matched_descriptor(mut self, descriptor: impl Into<String>) -> Self {
		self.matched_descriptor = Some(descriptor.into());
		self
	}

	/// Whether the extension is one of the configured image extensions
	pub fn is_image(&self, settings: &MatchSettings) -> bool {
		is_image_path(&self.path, settings)
	}
}

pub(crate) fn is_image_path(path: &str, settings: &MatchSettings) -> bool {
	extension_lowercase(split_recorded_path(path).1)
		.is_some_and(|ext| settings.is_image_extension(&ext))
}

/// The inventory being reconciled.
///
/// ## DataFrame Schema
///
/// - **`path`**: recorded file path (primary key, unique)
/// - **`file_name`**: final path segment
/// - **`captured_at`**: capture time as `YYYY:MM:DD HH:MM:SS`, nullable
/// - **`matched_descriptor`**: path of the resolved descriptor, nullable
///
/// Any other column of the input inventory is carried along untouched so it
/// can be written back out. Rows are annotated in place by the matching and
/// recovery stages and are only ever filtered when writing output, never
/// deleted.
#[derive(Debug, Clone)]
pub struct InventoryState {
	pub data: DataFrame,
}

impl Default for InventoryState {
	fn default() -> Self {
		Self::new().expect("Failed to create default InventoryState")
	}
}

impl InventoryState {
	/// Create a new empty InventoryState
	pub fn new() -> ReconcileResult<Self> {
		Ok(Self {
			data: Self::create_empty_dataframe()?,
		})
	}

	fn create_empty_dataframe() -> PolarsResult<DataFrame> {
		df! {
			columns::PATH => Vec::<String>::new(),
			columns::FILE_NAME => Vec::<String>::new(),
			columns::CAPTURED_AT => Vec::<Option<String>>::new(),
			columns::MATCHED_DESCRIPTOR => Vec::<Option<String>>::new(),
		}
	}

	/// Build a store from in-memory records, keeping the first record per path
	pub fn from_records(records: Vec<MediaRecord>) -> ReconcileResult<Self> {
		let mut paths = Vec::with_capacity(records.len());
		let mut names = Vec::with_capacity(records.len());
		let mut captured = Vec::with_capacity(records.len());
		let mut matched = Vec::with_capacity(records.len());
		for r in records {
			paths.push(r.path);
			names.push(r.file_name);
			captured.push(r.captured_at);
			matched.push(r.matched_descriptor);
		}
		let data = df! {
			columns::PATH => paths,
			columns::FILE_NAME => names,
			columns::CAPTURED_AT => captured,
			columns::MATCHED_DESCRIPTOR => matched,
		}?;
		Ok(Self {
			data: dedup_by_path(data)?,
		})
	}

	/// Append records; rows already present by path keep their current values.
	///
	/// Only valid on a store that holds just the core columns, such as one
	/// produced by discovery or [`InventoryState::from_records`].
	pub fn add_records(&mut self, records: Vec<MediaRecord>) -> ReconcileResult<()> {
		if records.is_empty() {
			return Ok(());
		}
		let new = Self::from_records(records)?;
		if self.data.height() == 0 {
			self.data = new.data;
			return Ok(());
		}
		let combined = self.data.vstack(&new.data)?;
		self.data = dedup_by_path(combined)?;
		Ok(())
	}

	/// Adopt an externally loaded table, renaming mapped columns to internal names.
	///
	/// The path, file name and capture time columns are required; a missing
	/// one is a schema violation reported against `source_name`. Only the
	/// descriptor column, which this crate writes, is created empty when absent.
	pub fn from_external(
		mut data: DataFrame,
		names: &ColumnNames,
		source_name: &str,
	) -> ReconcileResult<Self> {
		for required in [&names.path, &names.file_name, &names.captured_at] {
			if data.column(required).is_err() {
				return Err(ReconcileError::MissingColumn {
					column: required.clone(),
					source_name: source_name.to_string(),
				});
			}
		}
		for internal in columns::CORE {
			let external = external_name(names, internal);
			if external != internal && data.column(internal).is_ok() {
				return Err(ReconcileError::Config(format!(
					"inventory {} already has a column named '{}'",
					source_name, internal
				)));
			}
		}

		let height = data.height();
		for internal in columns::CORE {
			let external = external_name(names, internal);
			if data.column(external).is_ok() {
				let cast = data.column(external)?.cast(&DataType::String)?;
				data.replace(external, cast)?;
				data.rename(external, internal)?;
			} else {
				tracing::debug!("Inventory {}: no '{}' column, starting empty", source_name, external);
				data.with_column(Series::full_null(internal, height, &DataType::String))?;
			}
		}

		Ok(Self {
			data: dedup_by_path(data)?,
		})
	}

	/// Copy of the table with internal columns renamed back to their external names
	pub fn to_external(&self, names: &ColumnNames) -> ReconcileResult<DataFrame> {
		let mut data = self.data.clone();
		for internal in columns::CORE {
			data.rename(internal, external_name(names, internal))?;
		}
		Ok(data)
	}

	pub fn height(&self) -> usize {
		self.data.height()
	}

	/// Borrow a string column of the store
	pub fn str_column(&self, name: &str) -> ReconcileResult<&StringChunked> {
		Ok(self.data.column(name)?.str()?)
	}

	/// Materialise every row as a [`MediaRecord`]
	pub fn records(&self) -> ReconcileResult<Vec<MediaRecord>> {
		let paths = self.str_column(columns::PATH)?;
		let names = self.str_column(columns::FILE_NAME)?;
		let captured = self.str_column(columns::CAPTURED_AT)?;
		let matched = self.str_column(columns::MATCHED_DESCRIPTOR)?;
		Ok(paths
			.into_iter()
			.zip(names)
			.zip(captured)
			.zip(matched)
			.filter_map(|(((p, n), c), m)| {
				Some(MediaRecord {
					path: p?.to_string(),
					file_name: n.map(str::to_string).unwrap_or_else(|| {
						split_recorded_path(p.unwrap_or_default()).1.to_string()
					}),
					captured_at: c.map(str::to_string),
					matched_descriptor: m.map(str::to_string),
				})
			})
			.collect())
	}

	/// Look up one record by path
	pub fn record(&self, path: &str) -> ReconcileResult<Option<MediaRecord>> {
		Ok(self.records()?.into_iter().find(|r| r.path == path))
	}

	/// Number of non-null values in a column
	pub fn count_present(&self, name: &str) -> ReconcileResult<usize> {
		let column = self.data.column(name)?;
		Ok(column.len() - column.null_count())
	}

	/// Fill `column` for the given paths, never overwriting a value already present.
	///
	/// Updates are merged with a left join on `path`; rows without an update,
	/// and rows whose value is already set, keep their current value.
	pub fn fill_missing(
		&mut self,
		column: &str,
		paths: Vec<String>,
		values: Vec<Option<String>>,
	) -> ReconcileResult<()> {
		if paths.len() != values.len() {
			return Err(ReconcileError::Config(format!(
				"{} update has {} paths but {} values",
				column,
				paths.len(),
				values.len()
			)));
		}
		if paths.is_empty() {
			return Ok(());
		}

		let right = format!("{column}_right");
		let update_df = df! {
			columns::PATH => paths,
			column => values,
		}?;

		let updated = self
			.data
			.clone()
			.lazy()
			.left_join(update_df.lazy(), col(columns::PATH), col(columns::PATH))
			.with_columns([when(col(column).is_not_null())
				.then(col(column))
				.otherwise(col(&right))
				.alias(column)])
			.select([all().exclude([right.as_str()])])
			.collect()?;

		self.data = updated;
		Ok(())
	}
}

fn external_name<'a>(names: &'a ColumnNames, internal: &str) -> &'a str {
	match internal {
		columns::PATH => &names.path,
		columns::FILE_NAME => &names.file_name,
		columns::CAPTURED_AT => &names.captured_at,
		_ => &names.matched_descriptor,
	}
}

fn dedup_by_path(data: DataFrame) -> PolarsResult<DataFrame> {
	data.lazy()
		.unique_stable(
			Some(vec![columns::PATH.to_string()]),
			UniqueKeepStrategy::First,
		)
		.collect()
}
