//! Main API for sidecar reconciliation

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::ReconcilerConfig;
use crate::data::InventoryState;
use crate::error::{ReconcileError, ReconcileResult};
use crate::persist::{OutputStage, load_inventory_csv, save_inventory_csv};
use crate::query::Query;
use crate::report::Summary;
use crate::systems::{
	DescriptorMatchSystem, InventoryDiscoverySystem, SystemScheduler, TimestampRecoverySystem,
};

/// An inventory together with the configuration and counters of the run working on it.
///
/// Stages queue onto the scheduler and run immediately; each method leaves
/// the inventory annotated in place and the summary updated.
pub struct Reconciler {
	pub state: InventoryState,
	pub config: ReconcilerConfig,
	pub summary: Summary,
	pub scheduler: SystemScheduler,
}

impl Reconciler {
	/// Start from an empty inventory
	pub fn new(config: ReconcilerConfig) -> ReconcileResult<Self> {
		Self::from_state(InventoryState::new()?, config)
	}

	pub fn from_state(state: InventoryState, config: ReconcilerConfig) -> ReconcileResult<Self> {
		config.validate()?;
		let summary = Summary::from_state(&state, &config.matching)?;
		Ok(Self {
			state,
			config,
			summary,
			scheduler: SystemScheduler::new(),
		})
	}

	/// Load an inventory export, mapping its columns through `config.columns`
	pub fn from_csv(path: impl AsRef<Path>, config: ReconcilerConfig) -> ReconcileResult<Self> {
		config.validate()?;
		let state = load_inventory_csv(path.as_ref(), &config.columns)?;
		Self::from_state(state, config)
	}

	/// Add every file below `path` to the inventory
	pub async fn scan_directory(&mut self, path: impl Into<PathBuf>) -> ReconcileResult<()> {
		let path = path.into();
		info!("Reconciler: scan_directory {}", path.display());
		let discovery = InventoryDiscoverySystem::new(path, self.config.matching.clone());
		self.scheduler.add_system(discovery);
		self.process().await
	}

	/// Pair unresolved images with their descriptors
	pub async fn match_descriptors(&mut self) -> ReconcileResult<()> {
		info!("Reconciler: match_descriptors over {} records", self.total_records());
		self.scheduler
			.add_system(DescriptorMatchSystem::new(self.config.matching.clone()));
		self.process().await
	}

	/// Fill capture times of matched records from their descriptors
	pub async fn recover_timestamps(&mut self) -> ReconcileResult<()> {
		info!("Reconciler: recover_timestamps");
		self.scheduler
			.add_system(TimestampRecoverySystem::new(self.config.recovery.time_zone));
		self.process().await
	}

	/// Matching followed by recovery
	pub async fn run_all(&mut self) -> ReconcileResult<()> {
		info!("Reconciler: run_all over {} records", self.total_records());
		self.scheduler
			.add_system(DescriptorMatchSystem::new(self.config.matching.clone()));
		self.scheduler
			.add_system(TimestampRecoverySystem::new(self.config.recovery.time_zone));
		self.process().await
	}

	async fn process(&mut self) -> ReconcileResult<()> {
		self.scheduler
			.run_all(&mut self.state, &mut self.summary)
			.await
			.map_err(ReconcileError::from)?;
		self.summary
			.refresh_inventory(&self.state, &self.config.matching)?;
		debug!("Reconciler: summary now {:?}", self.summary);
		Ok(())
	}

	pub fn query(&self) -> Query<'_> {
		Query::new(&self.state, &self.config.matching)
	}

	pub fn total_records(&self) -> usize {
		self.state.height()
	}

	pub fn summary(&self) -> &Summary {
		&self.summary
	}

	/// Write one slice of the inventory as CSV
	pub fn save_stage(&self, path: impl AsRef<Path>, stage: OutputStage) -> ReconcileResult<()> {
		save_inventory_csv(path.as_ref(), &self.state, &self.config, stage)
	}
}
