use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gravity_autopilot::config::AutopilotConfig;
use gravity_autopilot::session::record_launch;
use gravity_autopilot::survey::{run_survey, SurveyConfig};
use gravity_autopilot::view::{ranked_entries, render_table, Recommendation};
use launch_history_core::{AttemptInputs, AttemptResults, LaunchHistory, LaunchIdentity};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gravity-turn")]
#[command(about = "Launch history and gravity-turn parameter tuning for ascent autopilots")]
struct Cli {
    /// Directory holding gt_launchdb_*.cfg files (overrides GRAVITY_TURN_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Target {
    #[arg(long)]
    vessel: String,
    #[arg(long)]
    body: String,
}

impl Target {
    fn identity(&self) -> LaunchIdentity {
        LaunchIdentity::new(self.vessel.trim(), self.body.trim())
    }

    /// Read-only commands tolerate a damaged file and work from what loaded.
    fn open(&self, config: &AutopilotConfig) -> LaunchHistory {
        let mut history = LaunchHistory::new(self.identity(), &config.data_dir);
        history.load();
        history
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record the outcome of a finished launch and save the history
    Record {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        turn_angle: f64,
        #[arg(long)]
        start_speed: f64,
        /// Target apoapsis in kilometers
        #[arg(long)]
        destination_height: f64,
        #[arg(long)]
        total_loss: f64,
        #[arg(long)]
        max_heat: f64,
        /// Achieved apoapsis in meters
        #[arg(long)]
        apoapsis: f64,
        #[arg(long, default_value_t = 0.0)]
        sensitivity: f64,
        #[arg(long, default_value_t = 0.0)]
        roll: f64,
        #[arg(long, default_value_t = 0.0)]
        pressure_cutoff: f64,
        #[arg(long, default_value_t = 0.0)]
        ap_time_start: f64,
        #[arg(long, default_value_t = 0.0)]
        ap_time_finish: f64,
    },
    /// Recommend settings for the next launch from the history
    Guess {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        json: bool,
    },
    /// Replay the best successful launch on file
    Best {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        json: bool,
    },
    /// Print the ranked history
    Show {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        json: bool,
    },
    /// Summarise every history in the data directory
    Survey {
        /// Worker threads (overrides GRAVITY_TURN_SURVEY_JOBS)
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli { data_dir, command } = Cli::parse();
    let survey_jobs = match &command {
        Commands::Survey { jobs, .. } => *jobs,
        _ => None,
    };
    let config = AutopilotConfig::from_env().with_overrides(data_dir, survey_jobs);

    match command {
        Commands::Record {
            target,
            turn_angle,
            start_speed,
            destination_height,
            total_loss,
            max_heat,
            apoapsis,
            sensitivity,
            roll,
            pressure_cutoff,
            ap_time_start,
            ap_time_finish,
        } => {
            let outcome = record_launch(
                &config.data_dir,
                target.identity(),
                &AttemptInputs {
                    turn_angle,
                    start_speed,
                    destination_height,
                    sensitivity,
                    roll,
                    pressure_cutoff,
                },
                &AttemptResults {
                    total_loss,
                    max_heat,
                    apoapsis,
                    apoapsis_time_start: ap_time_start,
                    apoapsis_time_finish: ap_time_finish,
                },
            )?;
            println!("change={}", outcome.change.as_str());
            println!("records={}", outcome.records);
            println!("path={}", outcome.path.display());
        }
        Commands::Guess { target, json } => {
            let mut history = target.open(&config);
            let settings = history.guess_settings();
            let recommendation =
                Recommendation::new(history.identity(), "guess", history.len(), settings);
            print_recommendation(&recommendation, json)?;
        }
        Commands::Best { target, json } => {
            let mut history = target.open(&config);
            let settings = history.best_settings();
            let recommendation =
                Recommendation::new(history.identity(), "best", history.len(), settings);
            print_recommendation(&recommendation, json)?;
        }
        Commands::Show { target, json } => {
            let mut history = target.open(&config);
            let entries = ranked_entries(history.ranked());
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("history={}", history.identity());
                print!("{}", render_table(&entries));
            }
        }
        Commands::Survey { output, .. } => {
            let report = run_survey(&SurveyConfig {
                data_dir: config.data_dir.clone(),
                jobs: config.survey_jobs,
            })?;
            let encoded = serde_json::to_vec_pretty(&report)?;
            if let Some(path) = output {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, encoded)
                    .with_context(|| format!("failed writing {}", path.display()))?;
                println!("wrote={}", path.display());
                println!("files={}", report.files);
                println!("unreadable={}", report.unreadable);
            } else {
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
    }

    Ok(())
}

fn print_recommendation(recommendation: &Recommendation, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(recommendation)?);
    } else {
        print!("{}", recommendation.to_lines());
    }
    Ok(())
}
