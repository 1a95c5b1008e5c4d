//! Traffic mission generation.
//!
//! Produces randomized background traffic over an airspace volume, drawing
//! uniformly from the pattern library: transits, surveillance loops,
//! inspection climbs, and holding patterns.

use deconflict_core::{Mission, Waypoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use super::patterns::mission_from_waypoints;

/// Airspace dimensions in meters.
#[derive(Debug, Clone, Copy)]
pub struct Airspace {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Airspace {
    fn default() -> Self {
        Self {
            x: 5000.0,
            y: 5000.0,
            z: 1000.0,
        }
    }
}

/// Flight patterns the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficPattern {
    Flyby,
    CircularSurveillance,
    Triangular,
    Star,
    RandomWaypoints,
    GridSurveillance,
    Mapping,
    FigureEight,
    HighriseInspection,
    LowriseInspection,
    HoldingPattern,
}

impl TrafficPattern {
    pub const ALL: [TrafficPattern; 11] = [
        TrafficPattern::Flyby,
        TrafficPattern::CircularSurveillance,
        TrafficPattern::Triangular,
        TrafficPattern::Star,
        TrafficPattern::RandomWaypoints,
        TrafficPattern::GridSurveillance,
        TrafficPattern::Mapping,
        TrafficPattern::FigureEight,
        TrafficPattern::HighriseInspection,
        TrafficPattern::LowriseInspection,
        TrafficPattern::HoldingPattern,
    ];
}

/// Seeded generator for background traffic missions.
pub struct TrafficGenerator {
    airspace: Airspace,
    cruise_speed: f64,
    rng: StdRng,
}

impl TrafficGenerator {
    pub fn new(airspace: Airspace, cruise_speed: f64, seed: u64) -> Self {
        Self {
            airspace,
            cruise_speed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate `count` traffic missions with TRAFFIC-### ids, each using a
    /// uniformly chosen pattern.
    pub fn generate(&mut self, count: usize) -> Vec<Mission> {
        (0..count)
            .map(|i| {
                let pattern =
                    TrafficPattern::ALL[self.rng.gen_range(0..TrafficPattern::ALL.len())];
                self.generate_one(&format!("TRAFFIC-{i:03}"), pattern)
            })
            .collect()
    }

    /// Generate one mission with an explicit pattern.
    pub fn generate_one(&mut self, drone_id: &str, pattern: TrafficPattern) -> Mission {
        let waypoints = match pattern {
            TrafficPattern::Flyby => self.flyby(),
            TrafficPattern::CircularSurveillance => self.circular_surveillance(),
            TrafficPattern::Triangular => self.triangular(),
            TrafficPattern::Star => self.star(),
            TrafficPattern::RandomWaypoints => self.random_waypoints(),
            TrafficPattern::GridSurveillance => self.grid_surveillance(),
            TrafficPattern::Mapping => self.mapping(),
            TrafficPattern::FigureEight => self.figure_eight(),
            TrafficPattern::HighriseInspection => self.highrise_inspection(),
            TrafficPattern::LowriseInspection => self.lowrise_inspection(),
            TrafficPattern::HoldingPattern => self.holding_pattern(),
        };
        mission_from_waypoints(drone_id, waypoints, 0.0, self.cruise_speed)
    }

    fn cruise_altitude(&mut self) -> f64 {
        self.rng.gen_range(100.0..300.0)
    }

    /// Edge-to-edge transit across the airspace.
    fn flyby(&mut self) -> Vec<Waypoint> {
        let altitude = self.cruise_altitude();
        let start_x = self.rng.gen_range(0.0..self.airspace.x * 0.2);
        let start_y = self.rng.gen_range(0.0..self.airspace.y);
        let end_x = self.rng.gen_range(self.airspace.x * 0.8..self.airspace.x);
        let end_y = self.rng.gen_range(0.0..self.airspace.y);
        vec![
            Waypoint::new(start_x, start_y, altitude),
            Waypoint::new(end_x, end_y, altitude),
        ]
    }

    fn circular_surveillance(&mut self) -> Vec<Waypoint> {
        let altitude = self.cruise_altitude();
        ring(
            self.airspace.x / 2.0,
            self.airspace.y / 2.0,
            altitude,
            500.0,
            8,
        )
    }

    fn triangular(&mut self) -> Vec<Waypoint> {
        let altitude = self.cruise_altitude();
        let cx = self.airspace.x / 2.0;
        let cy = self.airspace.y / 2.0;
        let side = 1000.0;
        let height = side * 3.0_f64.sqrt() / 2.0;
        vec![
            Waypoint::new(cx, cy + 2.0 * height / 3.0, altitude),
            Waypoint::new(cx - side / 2.0, cy - height / 3.0, altitude),
            Waypoint::new(cx + side / 2.0, cy - height / 3.0, altitude),
            Waypoint::new(cx, cy + 2.0 * height / 3.0, altitude),
        ]
    }

    fn star(&mut self) -> Vec<Waypoint> {
        let altitude = self.cruise_altitude();
        let cx = self.airspace.x / 2.0;
        let cy = self.airspace.y / 2.0;
        let outer = 600.0;
        let points = 5;
        (0..=2 * points)
            .map(|i| {
                let radius = if i % 2 == 0 { outer } else { outer / 2.0 };
                let angle = PI * i as f64 / points as f64;
                Waypoint::new(
                    cx + radius * angle.cos(),
                    cy + radius * angle.sin(),
                    altitude,
                )
            })
            .collect()
    }

    fn random_waypoints(&mut self) -> Vec<Waypoint> {
        let count = self.rng.gen_range(5..=10);
        (0..count)
            .map(|_| {
                Waypoint::new(
                    self.rng.gen_range(0.0..self.airspace.x),
                    self.rng.gen_range(0.0..self.airspace.y),
                    self.rng.gen_range(100.0..300.0),
                )
            })
            .collect()
    }

    fn grid_surveillance(&mut self) -> Vec<Waypoint> {
        let altitude = self.cruise_altitude();
        let width = 2000.0;
        let rows = 5;
        let spacing = width / (rows - 1) as f64;
        let mut waypoints = Vec::with_capacity(rows * 2);
        for row in 0..rows {
            let y = row as f64 * spacing;
            if row % 2 == 0 {
                waypoints.push(Waypoint::new(0.0, y, altitude));
                waypoints.push(Waypoint::new(width, y, altitude));
            } else {
                waypoints.push(Waypoint::new(width, y, altitude));
                waypoints.push(Waypoint::new(0.0, y, altitude));
            }
        }
        waypoints
    }

    /// Irregular ring with radial jitter, as flown for photogrammetry.
    fn mapping(&mut self) -> Vec<Waypoint> {
        let altitude = self.cruise_altitude();
        let cx = self.airspace.x / 2.0;
        let cy = self.airspace.y / 2.0;
        let size = 500.0;
        (0..8)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / 8.0;
                let radius = size * self.rng.gen_range(0.8..1.2);
                Waypoint::new(
                    cx + radius * angle.cos(),
                    cy + radius * angle.sin(),
                    altitude,
                )
            })
            .collect()
    }

    fn figure_eight(&mut self) -> Vec<Waypoint> {
        let altitude = self.cruise_altitude();
        let cx = self.airspace.x / 2.0;
        let cy = self.airspace.y / 2.0;
        let size = 500.0;
        (0..20)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / 19.0;
                Waypoint::new(
                    cx + size * t.sin(),
                    cy + size * t.sin() * t.cos(),
                    altitude,
                )
            })
            .collect()
    }

    /// Spiral of rings climbing a tall structure.
    fn highrise_inspection(&mut self) -> Vec<Waypoint> {
        let cx = self.airspace.x / 2.0;
        let cy = self.airspace.y / 2.0;
        let radius = 300.0;
        let height = 500.0;
        let levels = 5;
        let per_level = 8;
        let mut waypoints = Vec::with_capacity(levels * per_level);
        for level in 0..levels {
            let z = (height / levels as f64) * level as f64;
            for i in 0..per_level {
                let angle = 2.0 * PI * i as f64 / per_level as f64;
                waypoints.push(Waypoint::new(
                    cx + radius * angle.cos(),
                    cy + radius * angle.sin(),
                    z,
                ));
            }
        }
        waypoints
    }

    fn lowrise_inspection(&mut self) -> Vec<Waypoint> {
        let altitude = self.rng.gen_range(50.0..100.0);
        let step = 1000.0 / 20.0;
        (0..20)
            .map(|i| {
                Waypoint::new(
                    (i % 4) as f64 * step,
                    ((i / 4) % 4) as f64 * step,
                    altitude,
                )
            })
            .collect()
    }

    fn holding_pattern(&mut self) -> Vec<Waypoint> {
        let altitude = self.cruise_altitude();
        let cx = self.airspace.x / 2.0;
        let cy = self.airspace.y / 2.0;
        let width = 1000.0;
        let height = 500.0;
        vec![
            Waypoint::new(cx - width / 2.0, cy - height / 2.0, altitude),
            Waypoint::new(cx + width / 2.0, cy - height / 2.0, altitude),
            Waypoint::new(cx + width / 2.0, cy + height / 2.0, altitude),
            Waypoint::new(cx - width / 2.0, cy + height / 2.0, altitude),
            Waypoint::new(cx - width / 2.0, cy - height / 2.0, altitude),
        ]
    }
}

fn ring(cx: f64, cy: f64, altitude: f64, radius: f64, points: usize) -> Vec<Waypoint> {
    (0..=points)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / points as f64;
            Waypoint::new(cx + radius * angle.cos(), cy + radius * angle.sin(), altitude)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_requested_count() {
        let mut generator = TrafficGenerator::new(Airspace::default(), 12.0, 42);
        let missions = generator.generate(50);
        assert_eq!(missions.len(), 50);
        assert_eq!(missions[0].drone_id, "TRAFFIC-000");
        assert_eq!(missions[49].drone_id, "TRAFFIC-049");
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let mut a = TrafficGenerator::new(Airspace::default(), 12.0, 42);
        let mut b = TrafficGenerator::new(Airspace::default(), 12.0, 42);
        let left = a.generate(20);
        let right = b.generate(20);
        for (m1, m2) in left.iter().zip(right.iter()) {
            assert_eq!(m1.waypoints.len(), m2.waypoints.len());
            assert_eq!(m1.end_time, m2.end_time);
            for (w1, w2) in m1.waypoints.iter().zip(m2.waypoints.iter()) {
                assert_eq!(w1.x, w2.x);
                assert_eq!(w1.y, w2.y);
                assert_eq!(w1.z, w2.z);
            }
        }
    }

    #[test]
    fn test_every_pattern_yields_valid_mission() {
        let mut generator = TrafficGenerator::new(Airspace::default(), 12.0, 1);
        for pattern in TrafficPattern::ALL {
            let mission = generator.generate_one("T", pattern);
            assert!(mission.waypoints.len() >= 2, "{pattern:?}");
            assert!(mission.end_time >= mission.start_time, "{pattern:?}");
            assert_eq!(mission.cruise_speed, Some(12.0));
        }
    }

    #[test]
    fn test_holding_pattern_is_closed() {
        let mut generator = TrafficGenerator::new(Airspace::default(), 12.0, 3);
        let mission = generator.generate_one("T", TrafficPattern::HoldingPattern);
        let first = mission.waypoints[0];
        let last = *mission.waypoints.last().unwrap();
        assert!(first.distance_to(&last) < 1e-9);
    }
}
