//! Recording a finished launch into the vessel's history file.

use anyhow::{Context, Result};
use launch_history_core::{
    AttemptInputs, AttemptResults, LaunchHistory, LaunchIdentity, RecordChange,
};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordOutcome {
    pub change: RecordChange,
    pub records: usize,
    pub path: PathBuf,
}

/// Loads the history for `identity` before it gets rewritten. A missing file
/// starts an empty history; any other read or parse failure is an error so
/// the file on disk is left alone.
pub fn open_for_update(data_dir: &Path, identity: LaunchIdentity) -> Result<LaunchHistory> {
    let mut history = LaunchHistory::new(identity, data_dir);
    match history.try_load() {
        Ok(_) => {}
        Err(err) if err.is_not_found() => {
            tracing::info!(path = %err.path().display(), "starting new launch history");
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("refusing to overwrite history for {}", history.identity())
            });
        }
    }
    Ok(history)
}

pub fn record_launch(
    data_dir: &Path,
    identity: LaunchIdentity,
    inputs: &AttemptInputs,
    results: &AttemptResults,
) -> Result<RecordOutcome> {
    let mut history = open_for_update(data_dir, identity)?;
    let change = history.record_attempt(inputs, results);
    let path = history
        .save()
        .with_context(|| format!("failed saving history for {}", history.identity()))?;
    Ok(RecordOutcome {
        change,
        records: history.len(),
        path,
    })
}
