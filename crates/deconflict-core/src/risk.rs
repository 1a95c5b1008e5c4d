//! Stage 3: risk scoring and conflict assessment.
//!
//! Raw per-instant detections are coalesced into contiguous conflict
//! windows per traffic drone, then each window is scored from separation,
//! closing speed, duration, time-to-collision, and altitude band.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::filters::Candidate;
use crate::grid::RawConflict;
use crate::models::{AssessedConflict, Mission, Severity, Waypoint};
use crate::spatial;
use crate::trajectory::Trajectory;

/// Squared relative speeds below this are treated as non-converging.
const TTC_EPSILON: f64 = 1e-6;

/// Severity from risk score. Bucket edges are fixed; severity is a pure
/// function of the score.
pub fn severity_for_risk(risk_score: f64) -> Severity {
    if risk_score < 0.10 {
        Severity::Safe
    } else if risk_score < 0.30 {
        Severity::Low
    } else if risk_score < 0.55 {
        Severity::Warning
    } else if risk_score < 0.80 {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// Altitude risk multiplier for the conflict altitude: ground proximity and
/// the shared low-altitude band are riskier than open airspace.
pub fn altitude_risk_factor(z: f64) -> f64 {
    if z < 30.0 {
        1.0
    } else if z <= 120.0 {
        1.2
    } else if z <= 300.0 {
        1.0
    } else {
        0.9
    }
}

pub struct RiskScorer<'a> {
    config: &'a EngineConfig,
}

impl<'a> RiskScorer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Assess all raw conflicts against the candidate set. Returns one
    /// conflict per (drone, contiguous window), sorted by risk score
    /// descending with ties broken by ascending time.
    pub fn assess(
        &self,
        primary: &Mission,
        primary_traj: &Trajectory,
        raw_conflicts: &[RawConflict],
        candidates: &[Candidate],
    ) -> Vec<AssessedConflict> {
        let mut by_candidate: BTreeMap<usize, Vec<&RawConflict>> = BTreeMap::new();
        for conflict in raw_conflicts {
            by_candidate.entry(conflict.candidate).or_default().push(conflict);
        }

        let mut assessed = Vec::new();
        for (index, mut samples) in by_candidate {
            samples.sort_by(|a, b| a.time.total_cmp(&b.time));
            let candidate = &candidates[index];

            for window in split_windows(&samples, self.config.grid_time_step) {
                assessed.push(self.assess_window(primary, primary_traj, candidate, window));
            }
        }

        assessed.sort_by(|a, b| {
            b.risk_score
                .total_cmp(&a.risk_score)
                .then(a.time.total_cmp(&b.time))
        });
        assessed
    }

    fn assess_window(
        &self,
        primary: &Mission,
        primary_traj: &Trajectory,
        candidate: &Candidate,
        window: &[&RawConflict],
    ) -> AssessedConflict {
        let closest = window
            .iter()
            .min_by(|a, b| a.separation.total_cmp(&b.separation))
            .expect("conflict window is never empty");

        let window_start = window[0].time;
        let window_end = window[window.len() - 1].time;
        let conflict_duration = window_end - window_start + self.config.grid_time_step;

        let relative_velocity = spatial::norm(spatial::sub(
            primary_traj.velocity_at(closest.time),
            candidate.trajectory.velocity_at(closest.time),
        ));

        let time_to_collision =
            closest_approach_time(primary_traj, &candidate.trajectory, window_start);

        let location = spatial::midpoint(closest.primary_pos, closest.other_pos);
        let altitude_factor = altitude_risk_factor(location[2]);

        let dynamic_buffer = self.config.dynamic_safety_buffer(relative_velocity);
        let sep_score = (1.0 - closest.separation / dynamic_buffer).clamp(0.0, 1.0);
        let vel_score = (relative_velocity / self.config.v_ref).clamp(0.0, 1.0);
        let dur_score = (conflict_duration / self.config.d_ref).clamp(0.0, 1.0);
        let ttc_score = match time_to_collision {
            Some(ttc) => (1.0 - ttc / self.config.ttc_ref).clamp(0.0, 1.0),
            None => 0.0,
        };

        let raw_score =
            0.40 * sep_score + 0.25 * ttc_score + 0.20 * vel_score + 0.15 * dur_score;
        let risk_score = (raw_score * altitude_factor).clamp(0.0, 1.0);
        let severity = severity_for_risk(risk_score);

        let recommendation = recommendation_text(
            severity,
            &candidate.mission.drone_id,
            time_to_collision,
            closest.separation,
        );

        AssessedConflict {
            time: closest.time,
            location: Waypoint::new(location[0], location[1], location[2]),
            primary_drone: primary.drone_id.clone(),
            conflicting_drone: candidate.mission.drone_id.clone(),
            separation_distance: closest.separation,
            relative_velocity,
            conflict_duration,
            altitude_risk_factor: altitude_factor,
            risk_score,
            severity,
            time_to_collision,
            recommendation,
        }
    }
}

/// Split one drone's time-ordered samples into maximal contiguous windows:
/// a gap wider than the sampling step starts a new window.
fn split_windows<'a, 'b>(
    samples: &'a [&'b RawConflict],
    time_step: f64,
) -> Vec<&'a [&'b RawConflict]> {
    let mut windows = Vec::new();
    let mut window_start = 0;
    for i in 1..samples.len() {
        if samples[i].time - samples[i - 1].time > time_step + 1e-9 {
            windows.push(&samples[window_start..i]);
            window_start = i;
        }
    }
    if window_start < samples.len() {
        windows.push(&samples[window_start..]);
    }
    windows
}

/// Time of closest approach under linear extrapolation from `t0`.
/// None when the relative velocity is effectively zero.
fn closest_approach_time(
    primary: &Trajectory,
    other: &Trajectory,
    t0: f64,
) -> Option<f64> {
    let dp = spatial::sub(primary.position_at(t0), other.position_at(t0));
    let dv = spatial::sub(primary.velocity_at(t0), other.velocity_at(t0));
    let dv_sq = spatial::dot(dv, dv);
    if dv_sq < TTC_EPSILON {
        return None;
    }
    let t_star = -spatial::dot(dp, dv) / dv_sq;
    Some(t_star.max(0.0))
}

fn recommendation_text(
    severity: Severity,
    other_id: &str,
    time_to_collision: Option<f64>,
    separation: f64,
) -> String {
    let ttc_note = match time_to_collision {
        Some(ttc) => format!("TTC {ttc:.1}s, "),
        None => String::new(),
    };
    match severity {
        Severity::Critical => format!(
            "REJECT – imminent collision with {other_id} ({ttc_note}separation {separation:.1}m)"
        ),
        Severity::High => format!(
            "WARN – altitude adjustment or delay advised for {other_id} ({ttc_note}separation {separation:.1}m)"
        ),
        Severity::Warning => format!(
            "ADJUST – minor reroute recommended around {other_id} ({ttc_note}separation {separation:.1}m)"
        ),
        Severity::Low => format!(
            "MONITOR – {other_id} within watch range (separation {separation:.1}m)"
        ),
        Severity::Safe => format!("CLEAR – separation maintained with {other_id}"),
    }
}
