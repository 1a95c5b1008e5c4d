//! Primary mission builders.
//!
//! Every builder derives the mission window from path length and cruise
//! speed, so the generated missions are self-consistent under the
//! constant-velocity model.

use deconflict_core::{Mission, Waypoint};
use rand::Rng;
use std::f64::consts::PI;

/// Build a mission from a waypoint path, deriving the end time from the
/// path length at the given cruise speed.
pub fn mission_from_waypoints(
    drone_id: impl Into<String>,
    waypoints: Vec<Waypoint>,
    start_time: f64,
    cruise_speed: f64,
) -> Mission {
    let distance: f64 = waypoints
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum();
    let duration = if cruise_speed > 0.0 {
        distance / cruise_speed
    } else {
        0.0
    };
    Mission::new(drone_id, waypoints, start_time, start_time + duration)
        .with_cruise_speed(cruise_speed)
}

/// Direct transit between two points.
pub fn straight_line(
    drone_id: &str,
    start: Waypoint,
    end: Waypoint,
    start_time: f64,
    cruise_speed: f64,
) -> Mission {
    mission_from_waypoints(drone_id, vec![start, end], start_time, cruise_speed)
}

/// Random waypoint tour inside an airspace volume.
pub fn multi_waypoint(
    drone_id: &str,
    num_waypoints: usize,
    airspace_x: f64,
    airspace_y: f64,
    altitude_range: (f64, f64),
    start_time: f64,
    cruise_speed: f64,
    rng: &mut impl Rng,
) -> Mission {
    let waypoints = (0..num_waypoints)
        .map(|_| {
            Waypoint::new(
                rng.gen_range(0.0..airspace_x),
                rng.gen_range(0.0..airspace_y),
                rng.gen_range(altitude_range.0..altitude_range.1),
            )
        })
        .collect();
    mission_from_waypoints(drone_id, waypoints, start_time, cruise_speed)
}

/// Serpentine survey over a rectangular area at fixed altitude.
pub fn grid_survey(
    drone_id: &str,
    origin: Waypoint,
    grid_width: f64,
    grid_height: f64,
    num_rows: usize,
    start_time: f64,
    cruise_speed: f64,
) -> Mission {
    let row_spacing = if num_rows > 1 {
        grid_height / (num_rows - 1) as f64
    } else {
        0.0
    };

    let mut waypoints = Vec::with_capacity(num_rows * 2);
    for row in 0..num_rows {
        let y = origin.y + row as f64 * row_spacing;
        if row % 2 == 0 {
            waypoints.push(Waypoint::new(origin.x, y, origin.z));
            waypoints.push(Waypoint::new(origin.x + grid_width, y, origin.z));
        } else {
            waypoints.push(Waypoint::new(origin.x + grid_width, y, origin.z));
            waypoints.push(Waypoint::new(origin.x, y, origin.z));
        }
    }
    mission_from_waypoints(drone_id, waypoints, start_time, cruise_speed)
}

/// Closed ring around a point of interest.
pub fn circular_inspection(
    drone_id: &str,
    center: Waypoint,
    radius: f64,
    num_points: usize,
    start_time: f64,
    cruise_speed: f64,
) -> Mission {
    let waypoints = (0..=num_points)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / num_points as f64;
            Waypoint::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
                center.z,
            )
        })
        .collect();
    mission_from_waypoints(drone_id, waypoints, start_time, cruise_speed)
}

/// Explicit waypoint path.
pub fn custom(
    drone_id: &str,
    coords: &[(f64, f64, f64)],
    start_time: f64,
    cruise_speed: f64,
) -> Mission {
    let waypoints = coords
        .iter()
        .map(|&(x, y, z)| Waypoint::new(x, y, z))
        .collect();
    mission_from_waypoints(drone_id, waypoints, start_time, cruise_speed)
}
