//! Runs stages in the order they were added

use tracing::{debug, info};

use crate::data::InventoryState;
use crate::error::{SystemError, SystemResult};
use crate::report::Summary;
use crate::systems::SystemRunner;

pub struct SystemScheduler {
	pub systems: Vec<Box<dyn SystemRunner>>,
}

impl Default for SystemScheduler {
	fn default() -> Self {
		Self::new()
	}
}

impl SystemScheduler {
	pub fn new() -> Self {
		Self {
			systems: Vec::new(),
		}
	}

	pub fn add_system<S: SystemRunner + 'static>(&mut self, system: S) {
		debug!("Scheduler: added system {}", system.name());
		self.systems.push(Box::new(system));
	}

	pub fn len(&self) -> usize {
		self.systems.len()
	}

	pub fn is_empty(&self) -> bool {
		self.systems.is_empty()
	}

	/// Run every stage once, in insertion order, then forget them.
	///
	/// A stage whose required columns are missing fails the whole run before
	/// it touches any record; stages already run keep their effects.
	pub async fn run_all(
		&mut self,
		state: &mut InventoryState,
		summary: &mut Summary,
	) -> SystemResult<()> {
		let systems = std::mem::take(&mut self.systems);
		info!("Scheduler: running {} systems", systems.len());
		for system in systems {
			if let Some(column) = system.missing_column(state) {
				return Err(SystemError::DependencyNotMet {
					system: system.name().to_string(),
					column: column.to_string(),
				});
			}
			debug!("Scheduler: running system {}", system.name());
			system.run(state, summary).await?;
			debug!("Scheduler: completed system {}", system.name());
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::systems::System;
	use async_trait::async_trait;
	use polars::prelude::*;
	use std::sync::{Arc, Mutex};

	struct Recorder {
		name: &'static str,
		required: &'static [&'static str],
		log: Arc<Mutex<Vec<&'static str>>>,
	}

	#[async_trait]
	impl SystemRunner for Recorder {
		async fn run(&self, _state: &mut InventoryState, _summary: &mut Summary) -> SystemResult<()> {
			self.log.lock().unwrap().push(self.name);
			Ok(())
		}

		fn name(&self) -> &'static str {
			self.name
		}
	}

	impl System for Recorder {
		fn required_columns(&self) -> &[&'static str] {
			self.required
		}

		fn description(&self) -> &'static str {
			"records that it ran"
		}
	}

	#[smol_potat::test]
	async fn test_runs_in_insertion_order_once() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut scheduler = SystemScheduler::new();
		for name in ["first", "second"] {
			scheduler.add_system(Recorder {
				name,
				required: &["path"],
				log: log.clone(),
			});
		}
		assert_eq!(scheduler.len(), 2);

		let mut state = InventoryState::new().unwrap();
		let mut summary = Summary::default();
		scheduler.run_all(&mut state, &mut summary).await.unwrap();
		assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
		assert!(scheduler.is_empty());
	}

	#[smol_potat::test]
	async fn test_missing_column_fails_fast() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut scheduler = SystemScheduler::new();
		scheduler.add_system(Recorder {
			name: "needs_model",
			required: &["Model"],
			log: log.clone(),
		});

		let mut state = InventoryState {
			data: df! { "path" => ["a/x.jpg"] }.unwrap(),
		};
		let mut summary = Summary::default();
		let result = scheduler.run_all(&mut state, &mut summary).await;
		assert!(matches!(
			result,
			Err(SystemError::DependencyNotMet { ref column, .. }) if column == "Model"
		));
		assert!(log.lock().unwrap().is_empty());
	}
}
