//! Human-readable mission analysis report.
//!
//! The section labels and ordering here are a stable interface consumed by
//! operators and downstream tooling; change them deliberately.

use chrono::{SecondsFormat, Utc};

use crate::models::{CheckOutcome, Mission, Severity};

const RULE: &str =
    "================================================================================";

/// Render the pinned text report for one check.
pub fn generate_report(primary: &Mission, outcome: &CheckOutcome, traffic_count: usize) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("UAV DECONFLICTION SYSTEM - MISSION ANALYSIS\n");
    out.push_str(&format!(
        "Generated: {}\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str("PRIMARY MISSION\n");
    out.push_str(&format!("  Drone ID:       {}\n", primary.drone_id));
    out.push_str(&format!("  Waypoints:      {}\n", primary.waypoints.len()));
    out.push_str(&format!(
        "  Time Window:    {:.1}s - {:.1}s\n",
        primary.start_time, primary.end_time
    ));
    out.push_str(&format!("  Duration:       {:.1}s\n", primary.duration()));
    out.push_str(&format!(
        "  Total Distance: {:.1}m\n",
        primary.total_distance()
    ));
    out.push_str(&format!(
        "  Cruise Speed:   {:.2} m/s\n\n",
        primary.effective_cruise_speed()
    ));

    out.push_str("TRAFFIC ENVIRONMENT\n");
    out.push_str(&format!("  Registered Missions: {traffic_count}\n\n"));

    let metrics = &outcome.metrics;
    out.push_str("DECONFLICTION ANALYSIS\n");
    out.push_str(&format!(
        "  Stage 1 (Filtering):      {:8.2}ms | {} -> {} candidates\n",
        metrics.stage1_ms, metrics.input_count, metrics.stage1_out
    ));
    out.push_str(&format!(
        "  Stage 2 (Occupancy Grid): {:8.2}ms | {} raw conflicts\n",
        metrics.stage2_ms, metrics.stage2_raw_conflicts
    ));
    out.push_str(&format!(
        "  Stage 3 (Risk Scoring):   {:8.2}ms | {} assessed conflicts\n",
        metrics.stage3_ms, metrics.stage3_assessed
    ));
    out.push_str(&format!(
        "  Total:                    {:8.2}ms\n\n",
        metrics.total_ms
    ));

    if outcome.cleared {
        out.push_str("DECISION: MISSION CLEARED\n\n");
    } else {
        out.push_str("DECISION: MISSION REJECTED\n\n");
    }

    out.push_str("CONFLICT SUMMARY\n");
    for severity in Severity::ALL.iter().rev() {
        let count = outcome
            .conflicts
            .iter()
            .filter(|conflict| conflict.severity == *severity)
            .count();
        out.push_str(&format!("  {:<9} {}\n", format!("{severity}:"), count));
    }
    out.push('\n');

    out.push_str("TOP CONFLICTS\n");
    if outcome.conflicts.is_empty() {
        out.push_str("  none\n");
    } else {
        for (rank, conflict) in outcome.conflicts.iter().take(5).enumerate() {
            out.push_str(&format!(
                "  {}. [{}] {} | risk {:.2} | sep {:.1}m | t={:.1}s\n",
                rank + 1,
                conflict.severity,
                conflict.conflicting_drone,
                conflict.risk_score,
                conflict.separation_distance,
                conflict.time
            ));
            out.push_str(&format!("     {}\n", conflict.recommendation));
        }
        if outcome.conflicts.len() > 5 {
            out.push_str(&format!(
                "  ... and {} more\n",
                outcome.conflicts.len() - 5
            ));
        }
    }

    out.push('\n');
    out.push_str(RULE);
    out.push('\n');

    out
}
