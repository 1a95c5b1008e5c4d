//! Deconfliction Core - Strategic UAV conflict detection
//!
//! This crate contains the domain models and the three-stage deconfliction
//! pipeline with no I/O dependencies: multi-tier filtering, a sparse 4D
//! occupancy grid, and physics-aware risk scoring behind a single engine
//! facade.

pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod grid;
pub mod models;
pub mod report;
pub mod risk;
pub mod spatial;
pub mod trajectory;

pub use config::EngineConfig;
pub use engine::DeconflictionEngine;
pub use error::DeconflictError;
pub use models::{AssessedConflict, CheckMetrics, CheckOutcome, Mission, Severity, Waypoint};
pub use report::generate_report;
pub use trajectory::Trajectory;
