//! Core data models for the deconfliction engine.

use serde::{Deserialize, Serialize};

/// 3D waypoint in local Cartesian coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    /// Altitude above ground. Zero for 2D usage.
    #[serde(default)]
    pub z: f64,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Euclidean distance to another waypoint.
    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        crate::spatial::distance(self.to_array(), other.to_array())
    }
}

/// A drone mission: an ordered waypoint path flown at constant cruise speed
/// over a fixed time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub drone_id: String,
    /// Mission start in seconds on the shared airspace time axis.
    pub start_time: f64,
    pub end_time: f64,
    /// Cruise speed in m/s. Derived from path length and window when absent.
    #[serde(default)]
    pub cruise_speed: Option<f64>,
    pub waypoints: Vec<Waypoint>,
}

impl Mission {
    pub fn new(
        drone_id: impl Into<String>,
        waypoints: Vec<Waypoint>,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            drone_id: drone_id.into(),
            start_time,
            end_time,
            cruise_speed: None,
            waypoints,
        }
    }

    /// Set an explicit cruise speed instead of deriving one.
    pub fn with_cruise_speed(mut self, speed_mps: f64) -> Self {
        self.cruise_speed = Some(speed_mps);
        self
    }

    /// Mission window length in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Total path length over all legs.
    pub fn total_distance(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    /// Cruise speed in m/s: the explicit speed, or total distance over the
    /// mission window. Zero for degenerate windows or zero-length paths.
    pub fn effective_cruise_speed(&self) -> f64 {
        match self.cruise_speed {
            Some(speed) => speed,
            None => {
                let duration = self.duration();
                if duration > 0.0 {
                    self.total_distance() / duration
                } else {
                    0.0
                }
            }
        }
    }

    /// Componentwise min/max over waypoints, with no inflation.
    pub fn bounding_box(&self) -> ([f64; 3], [f64; 3]) {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for wp in &self.waypoints {
            let p = wp.to_array();
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        (min, max)
    }
}

/// Conflict severity, ordered by increasing risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Safe,
    Low,
    Warning,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Safe,
        Severity::Low,
        Severity::Warning,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "SAFE",
            Severity::Low => "LOW",
            Severity::Warning => "WARNING",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assessed conflict between the primary and one traffic drone over
/// one contiguous conflict window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessedConflict {
    /// Instant of minimum separation within the window.
    pub time: f64,
    /// Midpoint between the two drones at that instant.
    pub location: Waypoint,
    pub primary_drone: String,
    pub conflicting_drone: String,
    /// Minimum separation over the window (meters).
    pub separation_distance: f64,
    /// Relative speed at the minimum-separation instant (m/s).
    pub relative_velocity: f64,
    /// Length of the conflict window (seconds).
    pub conflict_duration: f64,
    pub altitude_risk_factor: f64,
    /// Overall risk in [0, 1].
    pub risk_score: f64,
    pub severity: Severity,
    /// Closest-approach time from the window start; None when the drones are
    /// not converging.
    pub time_to_collision: Option<f64>,
    pub recommendation: String,
}

/// Per-stage timing and reduction metrics for one `check_mission` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckMetrics {
    pub stage1_ms: f64,
    pub stage2_ms: f64,
    pub stage3_ms: f64,
    pub total_ms: f64,
    /// Traffic missions considered before filtering.
    pub input_count: usize,
    /// Candidates surviving Stage 1.
    pub stage1_out: usize,
    #[serde(rename = "stage2_raw")]
    pub stage2_raw_conflicts: usize,
    pub stage3_assessed: usize,
}

/// Result of one deconfliction check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// True iff no conflict reached HIGH severity.
    pub cleared: bool,
    pub metrics: CheckMetrics,
    pub conflicts: Vec<AssessedConflict>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waypoint_distance() {
        let a = Waypoint::new(0.0, 0.0, 0.0);
        let b = Waypoint::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_effective_cruise_speed_derived() {
        let mission = Mission::new(
            "D1",
            vec![Waypoint::new(0.0, 0.0, 100.0), Waypoint::new(1000.0, 0.0, 100.0)],
            0.0,
            100.0,
        );
        assert!((mission.effective_cruise_speed() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_effective_cruise_speed_zero_distance() {
        let hover = Mission::new(
            "H1",
            vec![Waypoint::new(500.0, 0.0, 100.0), Waypoint::new(500.0, 0.0, 100.0)],
            0.0,
            100.0,
        );
        assert_eq!(hover.effective_cruise_speed(), 0.0);
    }

    #[test]
    fn test_bounding_box_spans_waypoints() {
        let mission = Mission::new(
            "D1",
            vec![
                Waypoint::new(100.0, -50.0, 120.0),
                Waypoint::new(-20.0, 400.0, 80.0),
            ],
            0.0,
            60.0,
        );
        let (min, max) = mission.bounding_box();
        assert_eq!(min, [-20.0, -50.0, 80.0]);
        assert_eq!(max, [100.0, 400.0, 120.0]);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Warning);
        assert!(Severity::Warning > Severity::Low);
        assert!(Severity::Low > Severity::Safe);
    }

    #[test]
    fn test_severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
