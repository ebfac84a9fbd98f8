use std::{env, path::PathBuf};

pub const DEFAULT_DATA_DIR: &str = "launch-history";

pub const ENV_DATA_DIR: &str = "GRAVITY_TURN_DATA_DIR";
pub const ENV_SURVEY_JOBS: &str = "GRAVITY_TURN_SURVEY_JOBS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutopilotConfig {
    pub data_dir: PathBuf,
    /// Worker threads for `survey`; `None` uses rayon's global pool.
    pub survey_jobs: Option<usize>,
}

impl AutopilotConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: read_env_path(ENV_DATA_DIR, DEFAULT_DATA_DIR),
            survey_jobs: read_env_optional_usize(ENV_SURVEY_JOBS),
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, survey_jobs: Option<usize>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(jobs) = survey_jobs.filter(|jobs| *jobs > 0) {
            self.survey_jobs = Some(jobs);
        }
        self
    }
}

pub(crate) fn read_env_path(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

pub(crate) fn read_env_optional_usize(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AutopilotConfig {
        AutopilotConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            survey_jobs: None,
        }
    }

    #[test]
    fn flags_override_environment() {
        let config = base().with_overrides(Some(PathBuf::from("/tmp/gt")), Some(3));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/gt"));
        assert_eq!(config.survey_jobs, Some(3));
    }

    #[test]
    fn zero_jobs_flag_is_ignored() {
        let config = base().with_overrides(None, Some(0));
        assert_eq!(config, base());
    }

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        assert_eq!(
            read_env_path("GRAVITY_TURN_TEST_UNSET_DIR", DEFAULT_DATA_DIR),
            PathBuf::from(DEFAULT_DATA_DIR)
        );
        assert_eq!(read_env_optional_usize("GRAVITY_TURN_TEST_UNSET_JOBS"), None);
    }
}
