//! # Sidecar Descriptor Reconciliation
//!
//! Pairs the images of an exported photo library with the JSON sidecar
//! descriptors the export wrote next to them, and recovers missing capture
//! times from those descriptors. Uses a data-oriented design with the
//! inventory held in a Polars DataFrame, stages driven on the smol async
//! runtime, and matching fanned out with rayon.

pub mod candidates;
pub mod config;
pub mod data;
pub mod descriptor;
pub mod error;
pub mod index;
pub mod paths;
pub mod persist;
pub mod query;
pub mod reconciler;
pub mod report;
pub mod resolver;

pub mod systems;

// Re-export main API types
pub use candidates::{Candidates, NamingPattern, candidate_suffixes};
pub use config::ReconcilerConfig;
pub use data::{InventoryState, MediaRecord};
pub use error::{ReconcileError, ReconcileResult};
pub use persist::OutputStage;
pub use query::Query;
pub use reconciler::Reconciler;
pub use report::Summary;
pub use resolver::{MatchOutcome, MatchResolver};
