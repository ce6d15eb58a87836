use std::collections::HashMap;

use prettytable::{Cell, Row, Table};
use serde::Serialize;

use crate::solver::scope::FamilyId;

/// Per-family check counters, keyed by the family of the scope a check was
/// rooted at.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FamilyStats {
    /// Label of the first checked scope in the family, if any was labelled.
    pub label: String,
    pub checks: u64,
    pub prunings: u64,
    pub time_spent_micros: u64,
}

/// Counters accumulated over one engine instance's lifetime.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SolveStats {
    /// Worklist items processed.
    pub steps: u64,
    /// Consistency checks run (one per step that popped a scope).
    pub checks: u64,
    /// Candidate values removed across all domains.
    pub prunings: u64,
    pub family_stats: HashMap<FamilyId, FamilyStats>,
}

pub fn render_stats_table(stats: &SolveStats) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Family"),
        Cell::new("Label"),
        Cell::new("Checks"),
        Cell::new("Prunings"),
        Cell::new("Time / Check (µs)"),
        Cell::new("Total Time (ms)"),
    ]));

    let mut sorted_stats: Vec<(&FamilyId, &FamilyStats)> = stats.family_stats.iter().collect();
    sorted_stats.sort_by_key(|entry| entry.1.time_spent_micros);

    for (family, family_stats) in sorted_stats {
        let avg_time = if family_stats.checks > 0 {
            family_stats.time_spent_micros as f64 / family_stats.checks as f64
        } else {
            0.0
        };

        table.add_row(Row::new(vec![
            Cell::new(&family.to_string()),
            Cell::new(&family_stats.label),
            Cell::new(&family_stats.checks.to_string()),
            Cell::new(&family_stats.prunings.to_string()),
            Cell::new(&format!("{:.2}", avg_time)),
            Cell::new(&format!(
                "{:.2}",
                family_stats.time_spent_micros as f64 / 1000.0
            )),
        ]));
    }

    table.to_string()
}
