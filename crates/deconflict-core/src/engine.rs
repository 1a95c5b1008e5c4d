//! Engine facade: mission registry plus the three-stage check pipeline.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::DeconflictError;
use crate::filters::{CandidateFilter, FilterStats};
use crate::grid::OccupancyGrid;
use crate::models::{CheckMetrics, CheckOutcome, Mission, Severity};
use crate::risk::RiskScorer;
use crate::trajectory::Trajectory;

/// Strategic deconfliction engine.
///
/// Traffic missions are registered once and become immutable; each
/// `check_mission` call owns all of its transient state (trajectories,
/// occupancy grid, raw conflicts) and releases it on return. Registration
/// takes the registry's write lock, checks take it shared, so concurrent
/// checks against a quiescent registry are safe.
pub struct DeconflictionEngine {
    config: EngineConfig,
    registry: RwLock<HashMap<String, Mission>>,
    /// Snapshot of Stage 1 reductions from the most recent check.
    last_filter_stats: RwLock<FilterStats>,
}

impl Default for DeconflictionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DeconflictionEngine {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            registry: RwLock::new(HashMap::new()),
            last_filter_stats: RwLock::new(FilterStats::default()),
        }
    }

    /// Build an engine with explicit tuning parameters.
    pub fn with_config(config: EngineConfig) -> Result<Self, DeconflictError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: RwLock::new(HashMap::new()),
            last_filter_stats: RwLock::new(FilterStats::default()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of registered traffic missions.
    pub fn traffic_count(&self) -> usize {
        self.registry.read().expect("registry lock poisoned").len()
    }

    /// Register a traffic mission. Fails on validation errors or a duplicate
    /// drone_id; the registry is unchanged on failure.
    pub fn register_mission(&self, mission: Mission) -> Result<(), DeconflictError> {
        validate_mission(&mission)?;

        let mut registry = self.registry.write().expect("registry lock poisoned");
        if registry.contains_key(&mission.drone_id) {
            return Err(DeconflictError::DuplicateDroneId {
                drone_id: mission.drone_id,
            });
        }
        registry.insert(mission.drone_id.clone(), mission);
        Ok(())
    }

    /// Run the three-stage pipeline for a primary mission against all
    /// registered traffic. A registered mission sharing the primary's
    /// drone_id is excluded from the analysis.
    pub fn check_mission(&self, primary: &Mission) -> Result<CheckOutcome, DeconflictError> {
        validate_mission(primary)?;

        let total_start = Instant::now();
        let mut metrics = CheckMetrics::default();

        let registry = self.registry.read().expect("registry lock poisoned");
        let traffic: Vec<&Mission> = registry
            .values()
            .filter(|mission| mission.drone_id != primary.drone_id)
            .collect();
        metrics.input_count = traffic.len();

        let primary_traj = Trajectory::new(primary);

        // Stage 1: multi-tier filtering.
        let stage1_start = Instant::now();
        let filter = CandidateFilter::new(self.config.coarse_buffer, self.config.coarse_step);
        let (candidates, filter_stats) = filter.filter(primary, &primary_traj, &traffic);
        metrics.stage1_ms = stage1_start.elapsed().as_secs_f64() * 1000.0;
        metrics.stage1_out = candidates.len();
        drop(registry);
        *self
            .last_filter_stats
            .write()
            .expect("stats lock poisoned") = filter_stats;

        // Stage 2: occupancy grid sweep.
        let stage2_start = Instant::now();
        let grid = OccupancyGrid::build(
            &candidates,
            self.config.grid_cell_size,
            self.config.grid_time_step,
            primary.start_time,
        );
        let raw_conflicts = grid.query(
            &primary_traj,
            (primary.start_time, primary.end_time),
            &candidates,
            &self.config,
        );
        metrics.stage2_ms = stage2_start.elapsed().as_secs_f64() * 1000.0;
        metrics.stage2_raw_conflicts = raw_conflicts.len();

        // Stage 3: risk scoring.
        let stage3_start = Instant::now();
        let scorer = RiskScorer::new(&self.config);
        let conflicts = scorer.assess(primary, &primary_traj, &raw_conflicts, &candidates);
        metrics.stage3_ms = stage3_start.elapsed().as_secs_f64() * 1000.0;
        metrics.stage3_assessed = conflicts.len();

        metrics.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;

        let cleared = conflicts
            .iter()
            .all(|conflict| conflict.severity < Severity::High);

        Ok(CheckOutcome {
            cleared,
            metrics,
            conflicts,
        })
    }

    /// Stage 1 reduction counts from the most recent `check_mission` call,
    /// for reporting.
    pub fn last_filter_stats(&self) -> FilterStats {
        *self.last_filter_stats.read().expect("stats lock poisoned")
    }
}

/// Validate mission arity, monotonicity, and numeric constraints.
fn validate_mission(mission: &Mission) -> Result<(), DeconflictError> {
    if mission.waypoints.len() < 2 {
        return Err(DeconflictError::invalid_mission(
            &mission.drone_id,
            "at least two waypoints are required",
        ));
    }
    if !mission.start_time.is_finite() || !mission.end_time.is_finite() {
        return Err(DeconflictError::invalid_mission(
            &mission.drone_id,
            "start_time and end_time must be finite",
        ));
    }
    if mission.end_time < mission.start_time {
        return Err(DeconflictError::invalid_mission(
            &mission.drone_id,
            format!(
                "end_time {} precedes start_time {}",
                mission.end_time, mission.start_time
            ),
        ));
    }
    if let Some(speed) = mission.cruise_speed {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(DeconflictError::invalid_mission(
                &mission.drone_id,
                format!("cruise_speed must be positive, got {speed}"),
            ));
        }
    }
    if mission
        .waypoints
        .iter()
        .any(|wp| !wp.x.is_finite() || !wp.y.is_finite() || !wp.z.is_finite())
    {
        return Err(DeconflictError::invalid_mission(
            &mission.drone_id,
            "waypoint coordinates must be finite",
        ));
    }
    Ok(())
}
