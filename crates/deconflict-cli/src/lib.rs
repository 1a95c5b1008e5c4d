//! Deconfliction CLI - Simulation tools for the deconfliction engine.
//!
//! This crate provides the mission generators and demo binaries:
//! - run_scenario: pre-defined traffic scenarios through the engine
//! - check_mission: check mission JSON files against each other

pub mod sim;

pub use sim::{Airspace, TrafficGenerator};
