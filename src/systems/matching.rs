//! Descriptor matching stage

use async_trait::async_trait;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::MatchSettings;
use crate::data::{InventoryState, columns};
use crate::error::{ReconcileResult, SystemError, SystemResult};
use crate::index::DirectoryIndex;
use crate::report::Summary;
use crate::resolver::{MatchOutcome, MatchResolver};
use crate::systems::{System, SystemRunner};

/// Annotates unresolved image records with the descriptor they pair with.
///
/// The descriptor index is built once from the inventory itself and then
/// shared read-only across the rayon pool; each record is resolved
/// independently, so results do not depend on processing order.
pub struct DescriptorMatchSystem {
	pub settings: MatchSettings,
}

impl DescriptorMatchSystem {
	pub fn new(settings: MatchSettings) -> Self {
		Self { settings }
	}

	fn match_all(&self, state: &mut InventoryState, summary: &mut Summary) -> ReconcileResult<()> {
		let records = state.records()?;
		let index = DirectoryIndex::build(
			records.iter().map(|r| r.path.as_str()),
			&self.settings.descriptor_extension,
		);
		debug!(
			"Match: indexed {} descriptors in {} directories",
			index.len(),
			index.directory_count()
		);

		let resolver = MatchResolver::new(&index, &self.settings);
		let outcomes: Vec<MatchOutcome> = records.par_iter().map(|r| resolver.resolve(r)).collect();

		let mut paths = Vec::new();
		let mut descriptors = Vec::new();
		for (record, outcome) in records.iter().zip(&outcomes) {
			summary.record_match(outcome);
			if let MatchOutcome::Matched {
				descriptor,
				pattern: Some(_),
				..
			} = outcome
			{
				paths.push(record.path.clone());
				descriptors.push(Some(descriptor.clone()));
			}
		}

		let newly_matched = paths.len();
		state.fill_missing(columns::MATCHED_DESCRIPTOR, paths, descriptors)?;
		info!(
			"Match: {} newly matched, {} previously matched, {} unmatchable",
			newly_matched, summary.previously_matched, summary.unmatchable
		);
		Ok(())
	}
}

#[async_trait]
impl SystemRunner for DescriptorMatchSystem {
	async fn run(&self, state: &mut InventoryState, summary: &mut Summary) -> SystemResult<()> {
		self.match_all(state, summary)
			.map_err(|e| SystemError::ExecutionFailed {
				system: self.name().to_string(),
				reason: e.to_string(),
			})
	}

	fn name(&self) -> &'static str {
		"DescriptorMatch"
	}
}

impl System for DescriptorMatchSystem {
	fn required_columns(&self) -> &[&'static str] {
		&columns::CORE
	}

	fn description(&self) -> &'static str {
		"Pairs each image lacking a capture time with its sidecar descriptor"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::candidates::NamingPattern;
	use crate::data::MediaRecord;

	async fn run_match(state: &mut InventoryState) -> Summary {
		let mut summary = Summary::default();
		DescriptorMatchSystem::new(MatchSettings::default())
			.run(state, &mut summary)
			.await
			.unwrap();
		summary
	}

	fn descriptor_of(state: &InventoryState, path: &str) -> Option<String> {
		state.record(path).unwrap().unwrap().matched_descriptor
	}

	#[smol_potat::test]
	async fn test_matches_duplicate_marker_and_leaves_others() {
		let mut state = InventoryState::from_records(vec![
			MediaRecord::new("a/IMG_1(1).jpg"),
			MediaRecord::new("a/IMG_1.jpg(1).json"),
			MediaRecord::new("a/IMG_1.jpg.json"),
			MediaRecord::new("b/foo.png"),
		])
		.unwrap();

		let summary = run_match(&mut state).await;

		assert_eq!(
			descriptor_of(&state, "a/IMG_1(1).jpg").as_deref(),
			Some("a/IMG_1.jpg(1).json")
		);
		assert_eq!(descriptor_of(&state, "b/foo.png"), None);
		assert_eq!(descriptor_of(&state, "a/IMG_1.jpg.json"), None);
		assert_eq!(summary.matched, 1);
		assert_eq!(summary.unmatchable, 1);
		assert_eq!(
			summary.matched_by_pattern.get(&NamingPattern::DuplicateMarker),
			Some(&1)
		);
	}

	#[smol_potat::test]
	async fn test_timestamped_rows_are_untouched() {
		let mut state = InventoryState::from_records(vec![
			MediaRecord::new("a/x.jpg").with_captured_at("2020:01:01 00:00:00"),
			MediaRecord::new("a/x.jpg.json"),
		])
		.unwrap();

		let summary = run_match(&mut state).await;
		assert_eq!(descriptor_of(&state, "a/x.jpg"), None);
		assert_eq!(summary.matched + summary.unmatchable, 0);
	}

	#[smol_potat::test]
	async fn test_second_pass_is_idempotent() {
		let mut state = InventoryState::from_records(vec![
			MediaRecord::new("s/Snapchat-1-edited.jpg"),
			MediaRecord::new("s/Snapchat-1.jpg.json"),
			MediaRecord::new("s/lonely.jpeg"),
		])
		.unwrap();

		run_match(&mut state).await;
		let first = state.records().unwrap();
		let summary = run_match(&mut state).await;

		assert_eq!(state.records().unwrap(), first);
		assert_eq!(summary.matched, 0);
		assert_eq!(summary.previously_matched, 1);
		assert_eq!(summary.unmatchable, 1);
	}

	#[smol_potat::test]
	async fn test_directories_are_isolated() {
		let mut state = InventoryState::from_records(vec![
			MediaRecord::new("x/photo.jpg.json"),
			MediaRecord::new("xy/photo.jpg"),
			MediaRecord::new("x/sub/photo.jpg"),
		])
		.unwrap();

		let summary = run_match(&mut state).await;
		assert_eq!(summary.matched, 0);
		assert_eq!(summary.unmatchable, 2);
	}

	#[smol_potat::test]
	async fn test_missing_column_is_reported_by_scheduler() {
		use crate::systems::SystemScheduler;
		use polars::prelude::*;

		let mut state = InventoryState {
			data: df! { "path" => ["a/x.jpg"], "file_name" => ["x.jpg"] }.unwrap(),
		};
		let mut scheduler = SystemScheduler::new();
		scheduler.add_system(DescriptorMatchSystem::new(MatchSettings::default()));
		let result = scheduler.run_all(&mut state, &mut Summary::default()).await;
		assert!(matches!(result, Err(SystemError::DependencyNotMet { .. })));
	}
}
