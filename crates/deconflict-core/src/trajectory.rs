//! Constant-velocity trajectory interpolation.
//!
//! Turns a static `Mission` (waypoints + time window) into a position
//! function over the shared time axis: piecewise-linear, constant speed
//! within each leg, each leg taking `length / cruise_speed` seconds.

use crate::models::{Mission, Waypoint};
use crate::spatial::{self, Vec3};

#[derive(Debug, Clone)]
struct Segment {
    /// Absolute start time of this leg.
    start_time: f64,
    duration: f64,
    origin: Vec3,
    /// Unit direction; zero for zero-length legs.
    direction: Vec3,
    length: f64,
}

/// Derived view of a mission that can answer "where is the drone at t?".
#[derive(Debug, Clone)]
pub struct Trajectory {
    start_time: f64,
    /// Time the final waypoint is reached (start + sum of leg durations).
    path_end_time: f64,
    cruise_speed: f64,
    total_distance: f64,
    first: Vec3,
    last: Vec3,
    bbox_min: Vec3,
    bbox_max: Vec3,
    segments: Vec<Segment>,
}

impl Trajectory {
    /// Build the segment table for a mission. The mission is assumed valid
    /// (two or more waypoints, non-negative window, positive cruise speed if
    /// explicit); the engine enforces this at the API boundary.
    pub fn new(mission: &Mission) -> Self {
        let cruise_speed = mission.effective_cruise_speed();
        let (bbox_min, bbox_max) = mission.bounding_box();
        let first = mission.waypoints[0].to_array();
        let last = mission.waypoints[mission.waypoints.len() - 1].to_array();

        let mut segments = Vec::with_capacity(mission.waypoints.len().saturating_sub(1));
        let mut current_time = mission.start_time;
        let mut total_distance = 0.0;

        if cruise_speed > 0.0 {
            for pair in mission.waypoints.windows(2) {
                let origin = pair[0].to_array();
                let end = pair[1].to_array();
                let length = spatial::distance(origin, end);
                let duration = length / cruise_speed;
                let direction = if length > 0.0 {
                    spatial::scale(spatial::sub(end, origin), 1.0 / length)
                } else {
                    [0.0; 3]
                };

                segments.push(Segment {
                    start_time: current_time,
                    duration,
                    origin,
                    direction,
                    length,
                });
                current_time += duration;
                total_distance += length;
            }
        } else {
            // Stationary: a drone with zero cruise speed holds its first
            // waypoint for the whole window.
            total_distance = mission.total_distance();
        }

        Self {
            start_time: mission.start_time,
            path_end_time: current_time,
            cruise_speed,
            total_distance,
            first,
            last,
            bbox_min,
            bbox_max,
            segments,
        }
    }

    /// Position at time `t`, clamped to the first waypoint before the start
    /// and the last waypoint after the final leg completes.
    pub fn position_at(&self, t: f64) -> Vec3 {
        if t <= self.start_time || self.segments.is_empty() {
            return self.first;
        }
        if t >= self.path_end_time {
            return self.last;
        }

        let segment = self.segment_at(t);
        let traveled = ((t - segment.start_time) * self.cruise_speed).min(segment.length);
        spatial::add(segment.origin, spatial::scale(segment.direction, traveled))
    }

    /// Velocity at time `t`; zero outside the moving portion of the path.
    pub fn velocity_at(&self, t: f64) -> Vec3 {
        if t <= self.start_time || t >= self.path_end_time || self.segments.is_empty() {
            return [0.0; 3];
        }
        let segment = self.segment_at(t);
        spatial::scale(segment.direction, self.cruise_speed)
    }

    /// Locate the leg containing `t` by binary search on leg start times.
    /// Callers guarantee `start_time < t < path_end_time`.
    fn segment_at(&self, t: f64) -> &Segment {
        let index = self
            .segments
            .partition_point(|segment| segment.start_time <= t);
        &self.segments[index.saturating_sub(1)]
    }

    /// Componentwise min/max over the mission waypoints, uninflated.
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        (self.bbox_min, self.bbox_max)
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Time at which the final waypoint is reached. Equals the mission
    /// end time when the cruise speed was derived from the window.
    pub fn path_end_time(&self) -> f64 {
        self.path_end_time
    }

    /// Time spent traversing the path.
    pub fn duration(&self) -> f64 {
        self.path_end_time - self.start_time
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn cruise_speed(&self) -> f64 {
        self.cruise_speed
    }

    /// Convenience for consumers that report positions as waypoints.
    pub fn waypoint_at(&self, t: f64) -> Waypoint {
        let [x, y, z] = self.position_at(t);
        Waypoint::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_mission() -> Mission {
        Mission::new(
            "D1",
            vec![Waypoint::new(0.0, 0.0, 100.0), Waypoint::new(1000.0, 0.0, 100.0)],
            0.0,
            100.0,
        )
    }

    #[test]
    fn test_position_interpolates_linearly() {
        let traj = Trajectory::new(&line_mission());
        assert_eq!(traj.position_at(0.0), [0.0, 0.0, 100.0]);
        assert_eq!(traj.position_at(50.0), [500.0, 0.0, 100.0]);
        assert_eq!(traj.position_at(100.0), [1000.0, 0.0, 100.0]);
    }

    #[test]
    fn test_position_clamps_outside_window() {
        let traj = Trajectory::new(&line_mission());
        assert_eq!(traj.position_at(-5.0), [0.0, 0.0, 100.0]);
        assert_eq!(traj.position_at(500.0), [1000.0, 0.0, 100.0]);
    }

    #[test]
    fn test_velocity_inside_and_outside() {
        let traj = Trajectory::new(&line_mission());
        assert_eq!(traj.velocity_at(50.0), [10.0, 0.0, 0.0]);
        assert_eq!(traj.velocity_at(-1.0), [0.0, 0.0, 0.0]);
        assert_eq!(traj.velocity_at(100.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_multi_leg_binary_search() {
        let mission = Mission::new(
            "D2",
            vec![
                Waypoint::new(0.0, 0.0, 50.0),
                Waypoint::new(100.0, 0.0, 50.0),
                Waypoint::new(100.0, 100.0, 50.0),
            ],
            0.0,
            20.0,
        );
        // Derived speed: 200 m over 20 s = 10 m/s; leg boundary at t=10.
        let traj = Trajectory::new(&mission);
        assert_eq!(traj.position_at(5.0), [50.0, 0.0, 50.0]);
        assert_eq!(traj.position_at(10.0), [100.0, 0.0, 50.0]);
        assert_eq!(traj.position_at(15.0), [100.0, 50.0, 50.0]);
        assert_eq!(traj.velocity_at(15.0), [0.0, 10.0, 0.0]);
    }

    #[test]
    fn test_zero_length_leg_takes_zero_time() {
        let mission = Mission::new(
            "D3",
            vec![
                Waypoint::new(0.0, 0.0, 50.0),
                Waypoint::new(100.0, 0.0, 50.0),
                Waypoint::new(100.0, 0.0, 50.0),
                Waypoint::new(200.0, 0.0, 50.0),
            ],
            0.0,
            20.0,
        );
        let traj = Trajectory::new(&mission);
        assert!((traj.path_end_time() - 20.0).abs() < 1e-9);
        assert_eq!(traj.position_at(10.0), [100.0, 0.0, 50.0]);
        assert_eq!(traj.position_at(15.0), [150.0, 0.0, 50.0]);
    }

    #[test]
    fn test_stationary_mission_holds_first_waypoint() {
        let hover = Mission::new(
            "H1",
            vec![Waypoint::new(500.0, 0.0, 100.0), Waypoint::new(500.0, 0.0, 100.0)],
            0.0,
            100.0,
        );
        let traj = Trajectory::new(&hover);
        assert_eq!(traj.position_at(50.0), [500.0, 0.0, 100.0]);
        assert_eq!(traj.velocity_at(50.0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_explicit_cruise_speed_finishes_early() {
        let mission = line_mission().with_cruise_speed(20.0);
        let traj = Trajectory::new(&mission);
        // 1000 m at 20 m/s: the path completes at t=50, then the drone
        // holds the final waypoint for the rest of the window.
        assert!((traj.path_end_time() - 50.0).abs() < 1e-9);
        assert_eq!(traj.position_at(25.0), [500.0, 0.0, 100.0]);
        assert_eq!(traj.position_at(75.0), [1000.0, 0.0, 100.0]);
        assert_eq!(traj.velocity_at(75.0), [0.0, 0.0, 0.0]);
    }
}
