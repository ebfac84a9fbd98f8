//! Per-(vessel, body) launch history and the parameter-guessing heuristic.


use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::Level;

use crate::constants::{
    ADJUST_MAX, ADJUST_MIN, CRITICAL_HEAT, GUARD_TOLERANCE, HEAT_MARGIN, HISTORY_FILE_EXTENSION,
    HISTORY_FILE_PREFIX, HOT_ANGLE_FACTOR, HOT_SPEED_FACTOR,
};
use crate::error::StorageError;
use crate::log::{HistoryLog, TracingLog};
use crate::record::{rank_by_quality, AttemptInputs, AttemptResults, LaunchRecord, LaunchSettings};
use crate::storage::{read_history_file, write_history_file};

/// The vessel and destination body a history belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct LaunchIdentity {
    pub vessel: String,
    pub body: String,
}

impl LaunchIdentity {
    pub fn new(vessel: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            vessel: vessel.into(),
            body: body.into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{HISTORY_FILE_PREFIX}{}_{}.{HISTORY_FILE_EXTENSION}",
            file_safe(&self.vessel),
            file_safe(&self.body)
        )
    }

    /// Recovers the identity from a history file name.
    ///
    /// Body names never contain `_`, so the split happens on the last one.
    /// Characters replaced while building the name are not restored.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name
            .strip_prefix(HISTORY_FILE_PREFIX)?
            .strip_suffix(HISTORY_FILE_EXTENSION)?
            .strip_suffix('.')?;
        let (vessel, body) = stem.rsplit_once('_')?;
        if vessel.is_empty() || body.is_empty() {
            return None;
        }
        Some(Self::new(vessel, body))
    }
}

impl fmt::Display for LaunchIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.vessel, self.body)
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// How [`LaunchHistory::record_attempt`] treated an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordChange {
    /// The identical attempt was already on file.
    Unchanged,
    /// A record with the same turn angle, start speed and target was overwritten.
    Updated,
    Inserted,
}

impl RecordChange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Updated => "updated",
            Self::Inserted => "inserted",
        }
    }
}

/// Launch attempts for one vessel/body pair.
///
/// No two records share `(turn_angle, start_speed, destination_height)`, and
/// records are never removed. Ranking reorders the records in place, so the
/// saved order and [`Self::find_least_critical_hot_entry`] see the order left
/// by the last ranking.
pub struct LaunchHistory {
    identity: LaunchIdentity,
    data_dir: PathBuf,
    records: Vec<LaunchRecord>,
    log: Box<dyn HistoryLog>,
}

impl fmt::Debug for LaunchHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchHistory")
            .field("identity", &self.identity)
            .field("data_dir", &self.data_dir)
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl LaunchHistory {
    pub fn new(identity: LaunchIdentity, data_dir: impl Into<PathBuf>) -> Self {
        Self::with_log(identity, data_dir, TracingLog)
    }

    pub fn with_log(
        identity: LaunchIdentity,
        data_dir: impl Into<PathBuf>,
        log: impl HistoryLog + 'static,
    ) -> Self {
        Self {
            identity,
            data_dir: data_dir.into(),
            records: Vec::new(),
            log: Box::new(log),
        }
    }

    /// Replaces the held records, keeping their order.
    pub fn with_records(mut self, records: Vec<LaunchRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn identity(&self) -> &LaunchIdentity {
        &self.identity
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(self.identity.file_name())
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ranks the records best-first and returns them.
    pub fn ranked(&mut self) -> &[LaunchRecord] {
        rank_by_quality(&mut self.records);
        &self.records
    }

    /// The mildest overheated attempt, found as a running best in store order:
    /// a hot record replaces the candidate only if its turn angle is smaller
    /// and its start speed larger.
    pub fn find_least_critical_hot_entry(&self) -> Option<&LaunchRecord> {
        let mut critical: Option<&LaunchRecord> = None;
        for record in self.records.iter().filter(|r| r.is_hot()) {
            let replaces = match critical {
                None => true,
                Some(current) => {
                    record.turn_angle < current.turn_angle
                        && record.start_speed > current.start_speed
                }
            };
            if replaces {
                critical = Some(record);
            }
        }
        critical
    }

    /// The first attempt, in order of increasing aggressiveness, whose loss
    /// went up compared to the attempt before it.
    ///
    /// The scan gives up at the first overheated attempt. A previous loss of
    /// exactly zero means nothing was measured and does not count.
    pub fn find_efficiency_tipping_point(&self) -> Option<&LaunchRecord> {
        if self.records.len() < 2 {
            return None;
        }

        let mut by_ratio: Vec<&LaunchRecord> = self.records.iter().collect();
        by_ratio.sort_by(|a, b| a.aggressiveness().total_cmp(&b.aggressiveness()));

        let mut previous_loss = 0.0;
        for record in by_ratio {
            if record.is_hot() {
                return None;
            }
            if previous_loss != 0.0 && record.total_loss > previous_loss {
                return Some(record);
            }
            previous_loss = record.total_loss;
        }
        None
    }

    /// Replays the best attempt, if it reached orbit without burning up.
    pub fn best_settings(&mut self) -> Option<LaunchSettings> {
        rank_by_quality(&mut self.records);
        let best = self.records.first()?;
        if best.max_heat >= CRITICAL_HEAT || !best.launch_success {
            return None;
        }
        Some(LaunchSettings::from(best))
    }

    /// Recommends settings for the next attempt from everything on file.
    pub fn guess_settings(&mut self) -> Option<LaunchSettings> {
        if self.records.is_empty() {
            return None;
        }
        rank_by_quality(&mut self.records);

        if let [only] = self.records.as_slice() {
            self.log.log(Level::INFO, "only one previous result");
            return Some(guess_from_single(only));
        }

        let best = &self.records[0];
        let second = &self.records[1];

        // Continue the trend from second-best to best.
        let mut guess = LaunchSettings {
            turn_angle: best.turn_angle + (best.turn_angle - second.turn_angle),
            start_speed: best.start_speed + (best.start_speed - second.start_speed),
        };

        if let Some(hot) = self.find_least_critical_hot_entry() {
            if guess.aggressiveness() >= hot.aggressiveness() * GUARD_TOLERANCE {
                guess = LaunchSettings::between(best, hot);
                self.log.log(
                    Level::INFO,
                    &format!("found hot run, set between {best} and {hot}"),
                );
            }
        }

        if let Some(tip) = self.find_efficiency_tipping_point() {
            if guess.aggressiveness() >= tip.aggressiveness() * GUARD_TOLERANCE {
                guess = LaunchSettings::between(best, tip);
                self.log.log(
                    Level::INFO,
                    &format!("past peak efficiency, set between {best} and {tip}"),
                );
            }
        }

        Some(guess)
    }

    /// Stores the outcome of a finished attempt.
    pub fn record_attempt(
        &mut self,
        inputs: &AttemptInputs,
        results: &AttemptResults,
    ) -> RecordChange {
        if self
            .records
            .iter()
            .any(|record| record.matches_attempt(inputs, results))
        {
            return RecordChange::Unchanged;
        }

        let (index, change) = match self
            .records
            .iter()
            .position(|record| record.matches_inputs(inputs))
        {
            Some(index) => (index, RecordChange::Updated),
            None => {
                self.records.push(LaunchRecord::default());
                (self.records.len() - 1, RecordChange::Inserted)
            }
        };

        let record = &mut self.records[index];
        record.apply_attempt(inputs, results);
        self.log.log(
            Level::DEBUG,
            &format!(
                "{} launch {record}: loss={:.1} heat={:.3} success={}",
                change.as_str(),
                record.total_loss,
                record.max_heat,
                record.launch_success
            ),
        );
        change
    }

    /// Loads the history file, replacing the held records on success.
    pub fn try_load(&mut self) -> Result<usize, StorageError> {
        let path = self.path();
        self.records = read_history_file(&path)?;
        self.log.log(
            Level::INFO,
            &format!(
                "vessel DB loaded from {} ({} records)",
                path.display(),
                self.records.len()
            ),
        );
        Ok(self.records.len())
    }

    /// Like [`Self::try_load`], but a failure is logged and leaves the held
    /// records untouched. Returns the number of records held afterwards.
    pub fn load(&mut self) -> usize {
        match self.try_load() {
            Ok(count) => count,
            Err(err) if err.is_not_found() => {
                self.log.log(
                    Level::INFO,
                    &format!("no launch history at {}", err.path().display()),
                );
                self.records.len()
            }
            Err(err) => {
                self.log
                    .log(Level::ERROR, &format!("vessel DB load error: {err}"));
                self.records.len()
            }
        }
    }

    /// Writes every record, replacing any previous file.
    pub fn save(&self) -> Result<PathBuf, StorageError> {
        let path = self.path();
        write_history_file(&path, &self.records)?;
        self.log.log(
            Level::INFO,
            &format!(
                "vessel DB saved to {} ({} records)",
                path.display(),
                self.records.len()
            ),
        );
        Ok(path)
    }
}

fn guess_from_single(record: &LaunchRecord) -> LaunchSettings {
    let heat = record.max_heat;
    if heat < HEAT_MARGIN {
        // Spend part of the remaining heat margin on a steeper turn.
        let adjust = (heat + (1.0 - heat) / 2.0).clamp(ADJUST_MIN, ADJUST_MAX);
        LaunchSettings {
            turn_angle: record.turn_angle / adjust,
            start_speed: record.start_speed * adjust,
        }
    } else if record.is_hot() {
        LaunchSettings {
            turn_angle: record.turn_angle * HOT_ANGLE_FACTOR,
            start_speed: record.start_speed * HOT_SPEED_FACTOR,
        }
    } else {
        LaunchSettings::from(record)
    }
}
