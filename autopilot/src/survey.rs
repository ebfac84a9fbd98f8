//! Parallel summary of every launch history in a data directory.

use anyhow::{Context, Result};
use launch_history_core::constants::{HISTORY_FILE_EXTENSION, HISTORY_FILE_PREFIX};
use launch_history_core::{
    read_history_file, LaunchHistory, LaunchIdentity, LaunchSettings, MemoryLog,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct SurveyConfig {
    pub data_dir: PathBuf,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SurveyEntry {
    pub file: String,
    pub vessel: Option<String>,
    pub body: Option<String>,
    pub records: usize,
    pub hot_runs: usize,
    pub successes: usize,
    pub best: Option<LaunchSettings>,
    pub guess: Option<LaunchSettings>,
    /// Lines the heuristic logged while producing `guess`.
    pub notes: Vec<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurveyReport {
    pub generated_unix_s: u64,
    pub data_dir: String,
    pub files: usize,
    pub unreadable: usize,
    pub entries: Vec<SurveyEntry>,
}

/// History files in `dir`, sorted by name.
pub fn history_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed reading data dir {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed listing {}", dir.display()))?;
        let path = entry.path();
        let is_history = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| {
                name.starts_with(HISTORY_FILE_PREFIX)
                    && path.extension().and_then(|ext| ext.to_str()) == Some(HISTORY_FILE_EXTENSION)
            })
            .unwrap_or(false);
        if is_history && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Summarises one file. Read failures land in `error` rather than aborting
/// the survey.
pub fn survey_file(path: &Path) -> SurveyEntry {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let identity = LaunchIdentity::from_file_name(&file);

    let mut entry = SurveyEntry {
        file: file.clone(),
        vessel: identity.as_ref().map(|id| id.vessel.clone()),
        body: identity.as_ref().map(|id| id.body.clone()),
        records: 0,
        hot_runs: 0,
        successes: 0,
        best: None,
        guess: None,
        notes: Vec::new(),
        error: None,
    };

    let records = match read_history_file(path) {
        Ok(records) => records,
        Err(err) => {
            entry.error = Some(err.to_string());
            return entry;
        }
    };

    entry.records = records.len();
    entry.hot_runs = records.iter().filter(|r| r.is_hot()).count();
    entry.successes = records.iter().filter(|r| r.launch_success).count();

    let log = MemoryLog::new();
    let data_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut history = LaunchHistory::with_log(
        identity.unwrap_or_else(|| LaunchIdentity::new(file.clone(), "")),
        data_dir,
        log.clone(),
    )
    .with_records(records);

    entry.best = history.best_settings();
    entry.guess = history.guess_settings();
    entry.notes = log.lines().into_iter().map(|(_, line)| line).collect();
    entry
}

pub fn run_survey(config: &SurveyConfig) -> Result<SurveyReport> {
    let files = history_files(&config.data_dir)?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        files = files.len(),
        "surveying launch histories"
    );

    let entries: Vec<SurveyEntry> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| files.par_iter().map(|path| survey_file(path)).collect())
    } else {
        files.par_iter().map(|path| survey_file(path)).collect()
    };

    let unreadable = entries.iter().filter(|e| e.error.is_some()).count();
    if unreadable > 0 {
        tracing::warn!(unreadable, "some launch histories could not be read");
    }

    Ok(SurveyReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default(),
        data_dir: config.data_dir.display().to_string(),
        files: files.len(),
        unreadable,
        entries,
    })
}
