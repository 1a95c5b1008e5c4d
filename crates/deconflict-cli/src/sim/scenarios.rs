//! Pre-defined demo scenarios: a primary mission plus seeded background
//! traffic, reproducible by name.

use deconflict_core::{Mission, Waypoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::patterns;
use super::traffic::{Airspace, TrafficGenerator};

const DEFAULT_SPEED: f64 = 12.0;

/// A named scenario: one primary mission and its traffic environment.
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub seed: u64,
    pub primary: Mission,
    pub traffic: Vec<Mission>,
}

/// Catalog entry for scenario listing and lookup.
pub struct ScenarioSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub default_seed: u64,
    pub default_traffic: usize,
}

pub const SCENARIOS: [ScenarioSpec; 6] = [
    ScenarioSpec {
        name: "random",
        description: "Random primary mission type with medium traffic",
        default_seed: 42,
        default_traffic: 75,
    },
    ScenarioSpec {
        name: "grid",
        description: "Grid survey mission with high traffic",
        default_seed: 123,
        default_traffic: 80,
    },
    ScenarioSpec {
        name: "circular",
        description: "Circular inspection mission with moderate traffic",
        default_seed: 456,
        default_traffic: 60,
    },
    ScenarioSpec {
        name: "straight",
        description: "Straight line mission with low traffic",
        default_seed: 789,
        default_traffic: 50,
    },
    ScenarioSpec {
        name: "multi",
        description: "Multi-waypoint mission with heavy traffic",
        default_seed: 999,
        default_traffic: 100,
    },
    ScenarioSpec {
        name: "custom",
        description: "Custom waypoint path with moderate traffic",
        default_seed: 111,
        default_traffic: 65,
    },
];

/// Build a scenario by name. Seed and traffic count fall back to the
/// catalog defaults.
pub fn build_scenario(
    name: &str,
    seed: Option<u64>,
    traffic_count: Option<usize>,
) -> Option<Scenario> {
    let spec = SCENARIOS.iter().find(|spec| spec.name == name)?;
    let seed = seed.unwrap_or(spec.default_seed);
    let traffic_count = traffic_count.unwrap_or(spec.default_traffic);

    let airspace = Airspace::default();
    let primary = build_primary(spec.name, seed, airspace);
    let mut generator = TrafficGenerator::new(airspace, DEFAULT_SPEED, seed);
    let traffic = generator.generate(traffic_count);

    Some(Scenario {
        name: spec.name,
        description: spec.description,
        seed,
        primary,
        traffic,
    })
}

fn build_primary(name: &str, seed: u64, airspace: Airspace) -> Mission {
    match name {
        "grid" => patterns::grid_survey(
            "PRIMARY",
            Waypoint::new(1000.0, 1000.0, 120.0),
            2000.0,
            2000.0,
            6,
            500.0,
            DEFAULT_SPEED,
        ),
        "circular" => patterns::circular_inspection(
            "PRIMARY",
            Waypoint::new(2500.0, 2500.0, 200.0),
            600.0,
            16,
            800.0,
            DEFAULT_SPEED,
        ),
        "straight" => patterns::straight_line(
            "PRIMARY",
            Waypoint::new(0.0, 0.0, 100.0),
            Waypoint::new(5000.0, 5000.0, 150.0),
            1200.0,
            DEFAULT_SPEED,
        ),
        "multi" => {
            let mut rng = StdRng::seed_from_u64(seed);
            patterns::multi_waypoint(
                "PRIMARY",
                7,
                airspace.x,
                airspace.y,
                (100.0, 300.0),
                200.0,
                DEFAULT_SPEED,
                &mut rng,
            )
        }
        "custom" => patterns::custom(
            "PRIMARY",
            &[
                (0.0, 0.0, 100.0),
                (1000.0, 500.0, 120.0),
                (2000.0, 1500.0, 140.0),
                (3000.0, 1000.0, 130.0),
                (4000.0, 2000.0, 150.0),
                (5000.0, 2500.0, 120.0),
            ],
            600.0,
            15.0,
        ),
        // "random": pick a primary mission type from the seed.
        _ => random_primary(seed, airspace),
    }
}

fn random_primary(seed: u64, airspace: Airspace) -> Mission {
    let mut rng = StdRng::seed_from_u64(seed);
    match rng.gen_range(0..4) {
        0 => {
            let start = Waypoint::new(
                rng.gen_range(0.0..airspace.x * 0.3),
                rng.gen_range(0.0..airspace.y * 0.3),
                rng.gen_range(50.0..200.0),
            );
            let end = Waypoint::new(
                rng.gen_range(airspace.x * 0.7..airspace.x),
                rng.gen_range(airspace.y * 0.7..airspace.y),
                rng.gen_range(50.0..200.0),
            );
            patterns::straight_line("PRIMARY", start, end, 300.0, DEFAULT_SPEED)
        }
        1 => {
            let count = rng.gen_range(3..=8);
            patterns::multi_waypoint(
                "PRIMARY",
                count,
                airspace.x,
                airspace.y,
                (100.0, 300.0),
                300.0,
                DEFAULT_SPEED,
                &mut rng,
            )
        }
        2 => {
            let origin = Waypoint::new(
                rng.gen_range(0.0..airspace.x * 0.5),
                rng.gen_range(0.0..airspace.y * 0.5),
                rng.gen_range(80.0..150.0),
            );
            let width = rng.gen_range(500.0..1500.0);
            let height = rng.gen_range(500.0..1500.0);
            let rows = rng.gen_range(3..=7);
            patterns::grid_survey("PRIMARY", origin, width, height, rows, 300.0, DEFAULT_SPEED)
        }
        _ => {
            let center = Waypoint::new(
                rng.gen_range(airspace.x * 0.3..airspace.x * 0.7),
                rng.gen_range(airspace.y * 0.3..airspace.y * 0.7),
                rng.gen_range(80.0..150.0),
            );
            let radius = rng.gen_range(300.0..800.0);
            let points = rng.gen_range(6..=12);
            patterns::circular_inspection("PRIMARY", center, radius, points, 300.0, DEFAULT_SPEED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalog_entry_builds() {
        for spec in &SCENARIOS {
            let scenario = build_scenario(spec.name, None, None).unwrap();
            assert_eq!(scenario.name, spec.name);
            assert_eq!(scenario.traffic.len(), spec.default_traffic);
            assert!(scenario.primary.waypoints.len() >= 2);
        }
    }

    #[test]
    fn test_unknown_scenario_is_none() {
        assert!(build_scenario("no-such-scenario", None, None).is_none());
    }

    #[test]
    fn test_overrides_apply() {
        let scenario = build_scenario("straight", Some(7), Some(5)).unwrap();
        assert_eq!(scenario.seed, 7);
        assert_eq!(scenario.traffic.len(), 5);
    }

    #[test]
    fn test_same_name_and_seed_reproduce_traffic() {
        let a = build_scenario("grid", None, None).unwrap();
        let b = build_scenario("grid", None, None).unwrap();
        for (m1, m2) in a.traffic.iter().zip(b.traffic.iter()) {
            assert_eq!(m1.drone_id, m2.drone_id);
            assert_eq!(m1.waypoints.len(), m2.waypoints.len());
        }
    }
}
