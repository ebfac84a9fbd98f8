use launch_history_core::{LaunchIdentity, LaunchRecord, LaunchSettings};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RankedEntry {
    pub rank: usize,
    pub aggressiveness: f64,
    pub hot: bool,
    #[serde(flatten)]
    pub record: LaunchRecord,
}

/// Expects `records` already ranked best-first.
pub fn ranked_entries(records: &[LaunchRecord]) -> Vec<RankedEntry> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| RankedEntry {
            rank: index + 1,
            aggressiveness: record.aggressiveness(),
            hot: record.is_hot(),
            record: record.clone(),
        })
        .collect()
}

pub fn render_table(entries: &[RankedEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} {:>9} {:>9} {:>8} {:>10} {:>6} {:>7} {:>9}",
        "rank", "angle", "speed", "ratio", "loss", "heat", "orbit", "target_km"
    );
    for entry in entries {
        let record = &entry.record;
        let _ = writeln!(
            out,
            "{:>4} {:>9.2} {:>9.2} {:>8.4} {:>10.1} {:>5.3}{} {:>7} {:>9.1}",
            entry.rank,
            record.turn_angle,
            record.start_speed,
            entry.aggressiveness,
            record.total_loss,
            record.max_heat,
            if entry.hot { "!" } else { " " },
            if record.launch_success { "yes" } else { "no" },
            record.destination_height
        );
    }
    out
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Recommendation {
    pub vessel: String,
    pub body: String,
    pub mode: String,
    pub found: bool,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<LaunchSettings>,
}

impl Recommendation {
    pub fn new(
        identity: &LaunchIdentity,
        mode: &str,
        records: usize,
        settings: Option<LaunchSettings>,
    ) -> Self {
        Self {
            vessel: identity.vessel.clone(),
            body: identity.body.clone(),
            mode: mode.to_string(),
            found: settings.is_some(),
            records,
            settings,
        }
    }

    /// `key=value` lines, one per field.
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "vessel={}", self.vessel);
        let _ = writeln!(out, "body={}", self.body);
        let _ = writeln!(out, "mode={}", self.mode);
        let _ = writeln!(out, "records={}", self.records);
        let _ = writeln!(out, "found={}", self.found);
        if let Some(settings) = self.settings {
            let _ = writeln!(out, "turn_angle={:.4}", settings.turn_angle);
            let _ = writeln!(out, "start_speed={:.4}", settings.start_speed);
        }
        out
    }
}
