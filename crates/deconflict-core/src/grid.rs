//! Stage 2: sparse 4D occupancy grid.
//!
//! Candidate trajectories are rasterized into (cell_x, cell_y, cell_z,
//! time_bucket) keys; the primary is then swept against the grid and its
//! 3x3x3 spatial neighborhood probed at every sampled instant. The grid is
//! a pruning structure only: every hit is confirmed with an exact
//! separation check against the candidate trajectory.

use std::collections::{BTreeSet, HashMap};

use crate::config::EngineConfig;
use crate::filters::Candidate;
use crate::spatial::{self, Vec3};
use crate::trajectory::Trajectory;

type CellKey = (i64, i64, i64, i64);

/// A sub-buffer separation observed at one sampled instant.
#[derive(Debug, Clone)]
pub struct RawConflict {
    pub time: f64,
    pub primary_pos: Vec3,
    /// Index into the Stage 1 candidate list.
    pub candidate: usize,
    pub other_pos: Vec3,
    pub separation: f64,
}

/// Sparse occupancy index over one check call. Time buckets are anchored at
/// the primary's start time.
pub struct OccupancyGrid {
    cell_size: f64,
    time_step: f64,
    time_origin: f64,
    cells: HashMap<CellKey, Vec<u32>>,
}

impl OccupancyGrid {
    /// Rasterize every candidate into the grid. Consecutive samples whose
    /// cells differ by more than one step on any axis get the intervening
    /// voxel cells inserted as well, so a fast drone cannot tunnel between
    /// samples.
    pub fn build(
        candidates: &[Candidate],
        cell_size: f64,
        time_step: f64,
        time_origin: f64,
    ) -> Self {
        let mut grid = Self {
            cell_size,
            time_step,
            time_origin,
            cells: HashMap::new(),
        };

        for (index, candidate) in candidates.iter().enumerate() {
            grid.insert_trajectory(
                index as u32,
                candidate.mission.start_time,
                candidate.mission.end_time,
                &candidate.trajectory,
            );
        }

        grid
    }

    fn insert_trajectory(&mut self, id: u32, start: f64, end: f64, trajectory: &Trajectory) {
        let mut previous: Option<([i64; 3], i64)> = None;
        let mut k = 0u64;
        loop {
            let t = (start + k as f64 * self.time_step).min(end);
            let cell = spatial::cell_index(trajectory.position_at(t), self.cell_size);
            let bucket = spatial::time_bucket(t, self.time_origin, self.time_step);

            self.insert(cell, bucket, id);

            if let Some((prev_cell, prev_bucket)) = previous {
                let jumped = (0..3).any(|axis| (cell[axis] - prev_cell[axis]).abs() > 1);
                if jumped {
                    for crossed in spatial::voxel_line(prev_cell, cell) {
                        self.insert(crossed, prev_bucket, id);
                        self.insert(crossed, bucket, id);
                    }
                }
            }
            previous = Some((cell, bucket));

            if t >= end {
                break;
            }
            k += 1;
        }
    }

    fn insert(&mut self, cell: [i64; 3], bucket: i64, id: u32) {
        let occupants = self
            .cells
            .entry((cell[0], cell[1], cell[2], bucket))
            .or_default();
        if !occupants.contains(&id) {
            occupants.push(id);
        }
    }

    /// Sweep the primary trajectory over its mission window and emit a
    /// `RawConflict` for every sampled instant where a neighboring drone is
    /// closer than the dynamic safety buffer for the current closing speed.
    pub fn query(
        &self,
        primary_traj: &Trajectory,
        window: (f64, f64),
        candidates: &[Candidate],
        config: &EngineConfig,
    ) -> Vec<RawConflict> {
        let (start, end) = window;
        let mut conflicts = Vec::new();

        let mut k = 0u64;
        loop {
            let t = (start + k as f64 * self.time_step).min(end);
            let primary_pos = primary_traj.position_at(t);
            let cell = spatial::cell_index(primary_pos, self.cell_size);
            let bucket = spatial::time_bucket(t, self.time_origin, self.time_step);

            // Collect neighborhood occupants into an ordered set so each
            // candidate is checked once per instant, in a stable order.
            let mut nearby: BTreeSet<u32> = BTreeSet::new();
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let key = (cell[0] + dx, cell[1] + dy, cell[2] + dz, bucket);
                        if let Some(occupants) = self.cells.get(&key) {
                            nearby.extend(occupants.iter().copied());
                        }
                    }
                }
            }

            for id in nearby {
                let candidate = &candidates[id as usize];
                let other_pos = candidate.trajectory.position_at(t);
                let separation = spatial::distance(primary_pos, other_pos);

                let relative_velocity = spatial::norm(spatial::sub(
                    primary_traj.velocity_at(t),
                    candidate.trajectory.velocity_at(t),
                ));
                if separation < config.dynamic_safety_buffer(relative_velocity) {
                    conflicts.push(RawConflict {
                        time: t,
                        primary_pos,
                        candidate: id as usize,
                        other_pos,
                        separation,
                    });
                }
            }

            if t >= end {
                break;
            }
            k += 1;
        }

        conflicts
    }

    /// Number of occupied (cell, bucket) entries.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[cfg(test)]
    fn occupies(&self, cell: [i64; 3], bucket: i64) -> bool {
        self.cells
            .contains_key(&(cell[0], cell[1], cell[2], bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mission, Waypoint};

    fn candidate(mission: Mission) -> Candidate {
        let trajectory = Trajectory::new(&mission);
        Candidate {
            mission,
            trajectory,
        }
    }

    fn build(missions: Vec<Mission>) -> (OccupancyGrid, Vec<Candidate>) {
        let candidates: Vec<Candidate> = missions.into_iter().map(candidate).collect();
        let grid = OccupancyGrid::build(&candidates, 100.0, 1.0, 0.0);
        (grid, candidates)
    }

    #[test]
    fn test_build_covers_sampled_cells() {
        let (grid, _) = build(vec![Mission::new(
            "T1",
            vec![Waypoint::new(50.0, 50.0, 50.0), Waypoint::new(950.0, 50.0, 50.0)],
            0.0,
            90.0,
        )]);
        // 10 m/s along x: cell x advances every 10 s.
        assert!(grid.occupies([0, 0, 0], 0));
        assert!(grid.occupies([5, 0, 0], 50));
        assert!(grid.occupies([9, 0, 0], 90));
    }

    #[test]
    fn test_fast_mission_fills_skipped_cells() {
        // 500 m/s crosses five 100 m cells per 1 s sample; the voxel walk
        // must fill the cells between consecutive samples.
        let (grid, _) = build(vec![Mission::new(
            "FAST",
            vec![Waypoint::new(0.0, 50.0, 50.0), Waypoint::new(1000.0, 50.0, 50.0)],
            0.0,
            2.0,
        )]);
        for x in 0..=5 {
            assert!(
                grid.occupies([x, 0, 0], 0) || grid.occupies([x, 0, 0], 1),
                "cell x={x} not covered"
            );
        }
    }

    #[test]
    fn test_query_emits_conflict_below_dynamic_buffer() {
        let primary = Mission::new(
            "P",
            vec![Waypoint::new(0.0, 0.0, 100.0), Waypoint::new(1000.0, 0.0, 100.0)],
            0.0,
            100.0,
        );
        let (grid, candidates) = build(vec![Mission::new(
            "T1",
            vec![Waypoint::new(1000.0, 0.0, 100.0), Waypoint::new(0.0, 0.0, 100.0)],
            0.0,
            100.0,
        )]);
        let traj = Trajectory::new(&primary);
        let raw = grid.query(&traj, (0.0, 100.0), &candidates, &EngineConfig::default());

        assert!(!raw.is_empty());
        let closest = raw
            .iter()
            .min_by(|a, b| a.separation.total_cmp(&b.separation))
            .unwrap();
        assert!((closest.time - 50.0).abs() < 1e-9);
        assert!(closest.separation < 1.0);
    }

    #[test]
    fn test_query_ignores_drone_beyond_buffer() {
        let primary = Mission::new(
            "P",
            vec![Waypoint::new(0.0, 0.0, 100.0), Waypoint::new(1000.0, 0.0, 100.0)],
            0.0,
            100.0,
        );
        // Same heading, 180 m to the side: inside the coarse buffer but
        // outside any dynamic buffer at zero closing speed.
        let (grid, candidates) = build(vec![Mission::new(
            "SIDE",
            vec![
                Waypoint::new(0.0, 180.0, 100.0),
                Waypoint::new(1000.0, 180.0, 100.0),
            ],
            0.0,
            100.0,
        )]);
        let traj = Trajectory::new(&primary);
        let raw = grid.query(&traj, (0.0, 100.0), &candidates, &EngineConfig::default());
        assert!(raw.is_empty());
    }

    #[test]
    fn test_query_window_endpoint_is_sampled() {
        let primary = Mission::new(
            "P",
            vec![Waypoint::new(0.0, 0.0, 100.0), Waypoint::new(100.0, 0.0, 100.0)],
            0.0,
            10.5,
        );
        let (grid, candidates) = build(vec![Mission::new(
            "HOVER",
            vec![
                Waypoint::new(100.0, 0.0, 100.0),
                Waypoint::new(100.0, 0.0, 100.0),
            ],
            0.0,
            20.0,
        )]);
        let traj = Trajectory::new(&primary);
        let raw = grid.query(&traj, (0.0, 10.5), &candidates, &EngineConfig::default());
        assert!(raw.iter().any(|c| (c.time - 10.5).abs() < 1e-9));
    }
}
