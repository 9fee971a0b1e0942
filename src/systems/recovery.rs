//! Capture time recovery from matched descriptors

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::TimeZoneSetting;
use crate::data::{InventoryState, columns};
use crate::descriptor::read_capture_time;
use crate::error::{ReconcileResult, SystemError, SystemResult};
use crate::report::Summary;
use crate::systems::{System, SystemRunner};

/// What happened to one record during recovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
	/// Formatted capture time read from the descriptor
	Recovered(String),
	/// The descriptor could not be read or held no usable timestamp
	ReadFailure(String),
}

/// Fills `captured_at` for matched records from their descriptor's `photoTakenTime`.
///
/// A descriptor that cannot be read or parsed only affects its own record:
/// the failure is logged and counted, and the record keeps an empty capture time.
pub struct TimestampRecoverySystem {
	pub zone: TimeZoneSetting,
}

impl TimestampRecoverySystem {
	pub fn new(zone: TimeZoneSetting) -> Self {
		Self { zone }
	}

	async fn recover_all(
		&self,
		state: &mut InventoryState,
		summary: &mut Summary,
	) -> ReconcileResult<()> {
		let pending: Vec<(String, String)> = state
			.records()?
			.into_iter()
			.filter(|r| r.captured_at.is_none())
			.filter_map(|r| r.matched_descriptor.map(|d| (r.path, d)))
			.collect();
		debug!("Recovery: {} records awaiting a capture time", pending.len());

		let mut paths = Vec::with_capacity(pending.len());
		let mut values = Vec::with_capacity(pending.len());
		for (path, descriptor) in pending {
			let outcome = match read_capture_time(&descriptor, self.zone).await {
				Ok(formatted) => RecoveryOutcome::Recovered(formatted),
				Err(e) => {
					warn!("Recovery: {} keeps no capture time: {}", path, e);
					RecoveryOutcome::ReadFailure(e.to_string())
				}
			};
			summary.record_recovery(&outcome);
			if let RecoveryOutcome::Recovered(formatted) = outcome {
				paths.push(path);
				values.push(Some(formatted));
			}
		}

		let recovered = paths.len();
		state.fill_missing(columns::CAPTURED_AT, paths, values)?;
		info!(
			"Recovery: {} capture times recovered, {} descriptors unreadable",
			recovered, summary.recovery_failures
		);
		Ok(())
	}
}

#[async_trait]
impl SystemRunner for TimestampRecoverySystem {
	async fn run(&self, state: &mut InventoryState, summary: &mut Summary) -> SystemResult<()> {
		self.recover_all(state, summary)
			.await
			.map_err(|e| SystemError::ExecutionFailed {
				system: self.name().to_string(),
				reason: e.to_string(),
			})
	}

	fn name(&self) -> &'static str {
		"TimestampRecovery"
	}
}

impl System for TimestampRecoverySystem {
	fn required_columns(&self) -> &[&'static str] {
		&columns::CORE
	}

	fn description(&self) -> &'static str {
		"Reads the capture time of matched records from their descriptors"
	}
}
