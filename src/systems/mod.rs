//! Processing stages of the reconciliation pipeline

use async_trait::async_trait;

use crate::data::InventoryState;
use crate::error::SystemResult;
use crate::report::Summary;

pub mod discovery;
pub mod matching;
pub mod recovery;
pub mod scheduler;

pub use discovery::InventoryDiscoverySystem;
pub use matching::DescriptorMatchSystem;
pub use recovery::TimestampRecoverySystem;
pub use scheduler::SystemScheduler;

/// Common interface for all processing stages
#[async_trait]
pub trait SystemRunner: System + Send + Sync {
	/// Run the stage on the current state, tallying what it did into `summary`
	async fn run(&self, state: &mut InventoryState, summary: &mut Summary) -> SystemResult<()>;

	/// Check if this stage can run (required columns present)
	fn can_run(&self, state: &InventoryState) -> bool {
		self.missing_column(state).is_none()
	}

	/// First required column absent from `state`, if any
	fn missing_column(&self, state: &InventoryState) -> Option<&'static str> {
		self.required_columns()
			.iter()
			.copied()
			.find(|c| state.data.column(c).is_err())
	}

	/// Stage name for logging and identification
	fn name(&self) -> &'static str;
}

/// Stage metadata interface
pub trait System {
	/// Columns required by this stage
	fn required_columns(&self) -> &[&'static str];

	/// Stage description
	fn description(&self) -> &'static str;
}
