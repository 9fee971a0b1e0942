//! Read-only views over the record store

use polars::prelude::*;

use crate::config::MatchSettings;
use crate::data::{InventoryState, columns, is_image_path};
use crate::error::ReconcileResult;

/// Filters used for reporting and for shaping stage outputs.
///
/// Every method returns a fresh DataFrame; the store itself is never
/// modified, so a `Query` can be held alongside other readers.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
	pub state: &'a InventoryState,
	pub settings: &'a MatchSettings,
}

impl<'a> Query<'a> {
	pub fn new(state: &'a InventoryState, settings: &'a MatchSettings) -> Self {
		Self { state, settings }
	}

	/// Image rows without a capture time: the rows the matcher works on
	pub fn unresolved_images(&self) -> ReconcileResult<DataFrame> {
		self.images_where(|captured| captured.is_none())
	}

	/// Rows with a matched descriptor
	pub fn matched(&self) -> ReconcileResult<DataFrame> {
		Ok(self
			.state
			.data
			.clone()
			.lazy()
			.filter(col(columns::MATCHED_DESCRIPTOR).is_not_null())
			.collect()?)
	}

	/// Unresolved image rows for which no descriptor was found
	pub fn unmatched_images(&self) -> ReconcileResult<DataFrame> {
		Ok(self
			.unresolved_images()?
			.lazy()
			.filter(col(columns::MATCHED_DESCRIPTOR).is_null())
			.collect()?)
	}

	/// Paths of the rows in `df`, in order
	pub fn paths(df: &DataFrame) -> ReconcileResult<Vec<String>> {
		Ok(df
			.column(columns::PATH)?
			.str()?
			.into_iter()
			.flatten()
			.map(str::to_string)
			.collect())
	}

	fn images_where(&self, keep: impl Fn(Option<&str>) -> bool) -> ReconcileResult<DataFrame> {
		let paths = self.state.str_column(columns::PATH)?;
		let captured = self.state.str_column(columns::CAPTURED_AT)?;
		let mask: Vec<bool> = paths
			.into_iter()
			.zip(captured)
			.map(|(p, c)| keep(c) && p.is_some_and(|p| is_image_path(p, self.settings)))
			.collect();
		Ok(self
			.state
			.data
			.filter(&BooleanChunked::from_slice("mask", &mask))?)
	}
}
