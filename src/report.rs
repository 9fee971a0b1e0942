//! Counters describing what a reconciliation run did

use std::collections::BTreeMap;
use std::fmt;

use crate::candidates::NamingPattern;
use crate::config::MatchSettings;
use crate::data::{InventoryState, columns};
use crate::error::ReconcileResult;
use crate::resolver::MatchOutcome;
use crate::systems::recovery::RecoveryOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
	// Inventory shape
	pub total_records: usize,
	pub images: usize,
	pub images_with_time: usize,
	pub images_without_time: usize,

	// Matching
	pub matched: usize,
	pub previously_matched: usize,
	pub unmatchable: usize,
	pub ambiguous: usize,
	pub matched_by_pattern: BTreeMap<NamingPattern, usize>,

	// Recovery
	pub recovered: usize,
	pub recovery_failures: usize,
}

impl Summary {
	/// Count images with and without a capture time in the current inventory
	pub fn from_state(state: &InventoryState, settings: &MatchSettings) -> ReconcileResult<Self> {
		let mut summary = Self::default();
		summary.refresh_inventory(state, settings)?;
		Ok(summary)
	}

	/// Recompute the inventory shape counters, keeping the stage counters
	pub fn refresh_inventory(
		&mut self,
		state: &InventoryState,
		settings: &MatchSettings,
	) -> ReconcileResult<()> {
		let paths = state.str_column(columns::PATH)?;
		let captured = state.str_column(columns::CAPTURED_AT)?;
		self.total_records = state.height();
		self.images = 0;
		self.images_with_time = 0;
		for (path, time) in paths.into_iter().zip(captured) {
			if path.is_some_and(|p| crate::data::is_image_path(p, settings)) {
				self.images += 1;
				if time.is_some() {
					self.images_with_time += 1;
				}
			}
		}
		self.images_without_time = self.images - self.images_with_time;
		Ok(())
	}

	pub fn record_match(&mut self, outcome: &MatchOutcome) {
		match outcome {
			MatchOutcome::Matched {
				pattern: Some(pattern),
				ambiguous,
				..
			} => {
				self.matched += 1;
				*self.matched_by_pattern.entry(*pattern).or_insert(0) += 1;
				if *ambiguous {
					self.ambiguous += 1;
				}
			}
			MatchOutcome::Matched { pattern: None, .. } => self.previously_matched += 1,
			MatchOutcome::Unmatchable => self.unmatchable += 1,
			MatchOutcome::AlreadyResolved | MatchOutcome::Ineligible => {}
		}
	}

	pub fn record_recovery(&mut self, outcome: &RecoveryOutcome) {
		match outcome {
			RecoveryOutcome::Recovered(_) => self.recovered += 1,
			RecoveryOutcome::ReadFailure(_) => self.recovery_failures += 1,
		}
	}

	/// Images that have a descriptor, from this pass or an earlier one
	pub fn with_descriptor(&self) -> usize {
		self.matched + self.previously_matched
	}
}

impl fmt::Display for Summary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Total records: {}", self.total_records)?;
		writeln!(
			f,
			"{} photos have DateTimeOriginal.\n{} photos do not have DateTimeOriginal.",
			self.images_with_time, self.images_without_time
		)?;
		if self.with_descriptor() + self.unmatchable > 0 {
			writeln!(
				f,
				"Found matching JSON file for {} photos.\nCould not find matching JSON file for {} photos.",
				self.with_descriptor(),
				self.unmatchable
			)?;
			for pattern in NamingPattern::ALL {
				let count = self.matched_by_pattern.get(&pattern).copied().unwrap_or(0);
				writeln!(f, "  {pattern}: {count}")?;
			}
			if self.ambiguous > 0 {
				writeln!(f, "Ambiguous matches: {}", self.ambiguous)?;
			}
		}
		if self.recovered + self.recovery_failures > 0 {
			writeln!(
				f,
				"Recovered capture time for {} photos ({} descriptors unreadable).",
				self.recovered, self.recovery_failures
			)?;
		}
		Ok(())
	}
}
