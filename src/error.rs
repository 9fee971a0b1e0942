//! Error types for inventory reconciliation

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading, reconciling or saving an inventory.
///
/// Per-record problems never surface here. A descriptor that cannot be read
/// or parsed is a [`DescriptorError`] attached to that one record, and a
/// media file with no matching descriptor is a normal outcome, not an error.
/// `ReconcileError` is reserved for conditions that make the whole batch
/// meaningless, such as an inventory that lacks a required column.
///
/// ```rust
/// use sidematch::{ReconcileError, Reconciler, ReconcilerConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// match Reconciler::from_csv("results.csv", ReconcilerConfig::default()) {
///     Ok(reconciler) => println!("{} records loaded", reconciler.total_records()),
///     Err(ReconcileError::MissingColumn { column, .. }) => {
///         eprintln!("inventory has no '{}' column", column);
///     }
///     Err(err) => return Err(err.into()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Error)]
pub enum ReconcileError {
	/// File system I/O errors while reading or writing inventories
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Polars DataFrame operation errors
	#[error("Polars error: {0}")]
	Polars(#[from] polars::error::PolarsError),

	/// The inventory table is missing a column the matcher depends on
	#[error("Inventory {source_name} is missing required column '{column}'")]
	MissingColumn { column: String, source_name: String },

	/// Configuration validation errors with descriptive messages
	#[error("Configuration error: {0}")]
	Config(String),

	/// Configuration file could not be parsed
	#[error("Invalid configuration file {path}: {reason}")]
	ConfigFile { path: PathBuf, reason: String },

	/// A pipeline stage failed as a whole
	#[error("System error: {0}")]
	System(#[from] SystemError),
}

/// Pipeline stage errors
#[derive(Debug, Error)]
pub enum SystemError {
	#[error("System dependency not met: {system} requires column '{column}'")]
	DependencyNotMet { system: String, column: String },

	#[error("System execution failed: {system} - {reason}")]
	ExecutionFailed { system: String, reason: String },
}

/// Why a single descriptor could not yield a capture timestamp.
///
/// These are recovered at the record boundary: the record keeps an absent
/// timestamp and the batch moves on.
#[derive(Debug, Error)]
pub enum DescriptorError {
	#[error("cannot read descriptor {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed descriptor {path}: {source}")]
	Json {
		path: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("descriptor {path} has no '{field}' field")]
	MissingField { path: String, field: &'static str },

	#[error("descriptor {path} has unusable timestamp '{value}'")]
	InvalidTimestamp { path: String, value: String },
}

/// Convenience type alias for top level results.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Convenience type alias for stage results.
pub type SystemResult<T> = Result<T, SystemError>;

/// Convenience type alias for per-descriptor results.
pub type DescriptorResult<T> = Result<T, DescriptorError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test_log::test]
	fn test_reconcile_error_display() {
		let error = ReconcileError::Config("empty extension list".to_string());
		assert_eq!(error.to_string(), "Configuration error: empty extension list");

		let error = ReconcileError::MissingColumn {
			column: "SourceFile".to_string(),
			source_name: "results.csv".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"Inventory results.csv is missing required column 'SourceFile'"
		);
	}

	#[test_log::test]
	fn test_system_error_display() {
		let error = SystemError::DependencyNotMet {
			system: "TimestampRecovery".to_string(),
			column: "matched_descriptor".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"System dependency not met: TimestampRecovery requires column 'matched_descriptor'"
		);

		let error = SystemError::ExecutionFailed {
			system: "DescriptorMatch".to_string(),
			reason: "boom".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"System execution failed: DescriptorMatch - boom"
		);
	}

	#[test]
	fn test_descriptor_error_display() {
		let error = DescriptorError::MissingField {
			path: "a/IMG_1.jpg.json".to_string(),
			field: "photoTakenTime.timestamp",
		};
		assert_eq!(
			error.to_string(),
			"descriptor a/IMG_1.jpg.json has no 'photoTakenTime.timestamp' field"
		);

		let error = DescriptorError::InvalidTimestamp {
			path: "a/IMG_1.jpg.json".to_string(),
			value: "yesterday".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"descriptor a/IMG_1.jpg.json has unusable timestamp 'yesterday'"
		);
	}

	#[test]
	fn test_error_conversion() {
		let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
		let error: ReconcileError = io_error.into();
		assert!(matches!(error, ReconcileError::Io(_)));

		let system_error = SystemError::ExecutionFailed {
			system: "test".to_string(),
			reason: "test".to_string(),
		};
		let error: ReconcileError = system_error.into();
		assert!(matches!(error, ReconcileError::System(_)));
	}
}
