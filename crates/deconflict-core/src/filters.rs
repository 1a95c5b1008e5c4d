//! Stage 1: multi-tier candidate filtering.
//!
//! Progressively eliminates traffic that cannot come near the primary:
//! temporal window overlap, inflated bounding-box intersection, then a
//! coarse sampled proximity check. Only survivors pay for trajectory
//! construction and the occupancy grid.

use crate::models::Mission;
use crate::spatial;
use crate::trajectory::Trajectory;

/// A traffic mission that survived Stage 1, with its trajectory built once
/// for the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub mission: Mission,
    pub trajectory: Trajectory,
}

/// Per-tier reduction counts for one filter run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterStats {
    pub initial: usize,
    pub after_temporal: usize,
    pub after_bbox: usize,
    pub after_coarse: usize,
}

/// Stage 1 filter. `coarse_buffer` must exceed the largest dynamic safety
/// buffer plus half the worst-case closing distance per `coarse_step`, or
/// Tier C can drop a true conflict.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    coarse_buffer: f64,
    coarse_step: f64,
}

impl CandidateFilter {
    pub fn new(coarse_buffer: f64, coarse_step: f64) -> Self {
        Self {
            coarse_buffer,
            coarse_step,
        }
    }

    /// Run all three tiers in order and return the surviving candidates
    /// with their reduction stats.
    pub fn filter(
        &self,
        primary: &Mission,
        primary_traj: &Trajectory,
        traffic: &[&Mission],
    ) -> (Vec<Candidate>, FilterStats) {
        let mut stats = FilterStats {
            initial: traffic.len(),
            ..FilterStats::default()
        };

        let temporal: Vec<&Mission> = traffic
            .iter()
            .copied()
            .filter(|mission| Self::windows_overlap(primary, mission))
            .collect();
        stats.after_temporal = temporal.len();

        let (primary_min, primary_max) = {
            let (min, max) = primary.bounding_box();
            spatial::inflate_aabb(min, max, self.coarse_buffer)
        };
        let boxed: Vec<&Mission> = temporal
            .into_iter()
            .filter(|mission| {
                let (min, max) = mission.bounding_box();
                let (min, max) = spatial::inflate_aabb(min, max, self.coarse_buffer);
                spatial::aabbs_intersect(primary_min, primary_max, min, max)
            })
            .collect();
        stats.after_bbox = boxed.len();

        let candidates: Vec<Candidate> = boxed
            .into_iter()
            .filter_map(|mission| {
                let trajectory = Trajectory::new(mission);
                self.coarse_proximity(primary, primary_traj, mission, &trajectory)
                    .then(|| Candidate {
                        mission: mission.clone(),
                        trajectory,
                    })
            })
            .collect();
        stats.after_coarse = candidates.len();

        (candidates, stats)
    }

    fn windows_overlap(primary: &Mission, other: &Mission) -> bool {
        !(other.end_time < primary.start_time || other.start_time > primary.end_time)
    }

    /// Tier C: sample both trajectories on the shared coarse time grid and
    /// keep the mission if any sample pair comes within the coarse buffer.
    /// The overlap endpoint is always sampled.
    fn coarse_proximity(
        &self,
        primary: &Mission,
        primary_traj: &Trajectory,
        other: &Mission,
        other_traj: &Trajectory,
    ) -> bool {
        let overlap_start = primary.start_time.max(other.start_time);
        let overlap_end = primary.end_time.min(other.end_time);

        let mut k = 0u64;
        loop {
            let t = (overlap_start + k as f64 * self.coarse_step).min(overlap_end);
            let separation =
                spatial::distance(primary_traj.position_at(t), other_traj.position_at(t));
            if separation <= self.coarse_buffer {
                return true;
            }
            if t >= overlap_end {
                return false;
            }
            k += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Waypoint;

    fn filter() -> CandidateFilter {
        CandidateFilter::new(200.0, 10.0)
    }

    fn primary() -> Mission {
        Mission::new(
            "PRIMARY",
            vec![Waypoint::new(0.0, 0.0, 100.0), Waypoint::new(1000.0, 0.0, 100.0)],
            0.0,
            100.0,
        )
    }

    fn run(traffic: &[Mission]) -> (Vec<Candidate>, FilterStats) {
        let primary = primary();
        let traj = Trajectory::new(&primary);
        let refs: Vec<&Mission> = traffic.iter().collect();
        filter().filter(&primary, &traj, &refs)
    }

    #[test]
    fn test_temporal_tier_rejects_disjoint_window() {
        let late = Mission::new(
            "LATE",
            vec![Waypoint::new(0.0, 0.0, 100.0), Waypoint::new(1000.0, 0.0, 100.0)],
            500.0,
            600.0,
        );
        let (candidates, stats) = run(&[late]);
        assert!(candidates.is_empty());
        assert_eq!(stats.after_temporal, 0);
    }

    #[test]
    fn test_bbox_tier_rejects_distant_track() {
        let far = Mission::new(
            "FAR",
            vec![
                Waypoint::new(0.0, 5000.0, 100.0),
                Waypoint::new(1000.0, 5000.0, 100.0),
            ],
            0.0,
            100.0,
        );
        let (candidates, stats) = run(&[far]);
        assert!(candidates.is_empty());
        assert_eq!(stats.after_temporal, 1);
        assert_eq!(stats.after_bbox, 0);
    }

    #[test]
    fn test_coarse_tier_rejects_parallel_track_beyond_buffer() {
        // 300 m lateral offset: inflated boxes still touch (two 200 m
        // inflations), so rejection must come from the proximity samples.
        let parallel = Mission::new(
            "PAR",
            vec![
                Waypoint::new(0.0, 300.0, 100.0),
                Waypoint::new(1000.0, 300.0, 100.0),
            ],
            0.0,
            100.0,
        );
        let (candidates, stats) = run(&[parallel]);
        assert!(candidates.is_empty());
        assert_eq!(stats.after_bbox, 1);
        assert_eq!(stats.after_coarse, 0);
    }

    #[test]
    fn test_coarse_tier_keeps_crossing_track() {
        let head_on = Mission::new(
            "T1",
            vec![Waypoint::new(1000.0, 0.0, 100.0), Waypoint::new(0.0, 0.0, 100.0)],
            0.0,
            100.0,
        );
        let (candidates, stats) = run(&[head_on]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(stats.after_coarse, 1);
        assert_eq!(candidates[0].mission.drone_id, "T1");
    }

    #[test]
    fn test_coarse_tier_samples_overlap_endpoint() {
        // Proximity exists only at the very end of the overlap, between the
        // 10-second sample points.
        let late_join = Mission::new(
            "END",
            vec![
                Waypoint::new(1000.0, 4000.0, 100.0),
                Waypoint::new(1000.0, 100.0, 100.0),
            ],
            0.0,
            95.0,
        );
        let (candidates, _) = run(&[late_join]);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_point_overlap_window_is_checked() {
        // Windows touch at exactly t=100.
        let touching = Mission::new(
            "TOUCH",
            vec![
                Waypoint::new(1000.0, 50.0, 100.0),
                Waypoint::new(2000.0, 50.0, 100.0),
            ],
            100.0,
            200.0,
        );
        let (candidates, stats) = run(&[touching]);
        assert_eq!(stats.after_temporal, 1);
        assert_eq!(candidates.len(), 1);
    }
}
