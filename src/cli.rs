use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::scenario::Profile;
use crate::telemetry::LogFormat;

/// Patient Tests API load generator
#[derive(Parser, Debug)]
#[command(name = "patient-tests-loadtest")]
#[command(about = "Weighted load scenarios against the patient tests API")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "PTLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a load test (default)
    Run(RunArgs),

    /// List profiles and the selection probability of each task
    Profiles,
}

/// Overrides for values from the configuration file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Target API base URL, e.g. https://apim.example.org/patients
    #[arg(long)]
    pub base_url: Option<String>,

    /// Subscription key sent as Ocp-Apim-Subscription-Key
    #[arg(long, env = "PTLOAD_SUBSCRIPTION_KEY", hide_env_values = true)]
    pub subscription_key: Option<String>,

    /// Workload profile
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,

    /// Number of virtual users
    #[arg(short, long)]
    pub users: Option<usize>,

    /// Virtual users started per second
    #[arg(long)]
    pub spawn_rate: Option<f64>,

    /// Test duration in seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Minimum think-time between tasks in seconds
    #[arg(long)]
    pub wait_min: Option<f64>,

    /// Maximum think-time between tasks in seconds
    #[arg(long)]
    pub wait_max: Option<f64>,

    /// Base seed for reproducible fixtures and task selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop every user after this many tasks
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Progress logging interval in seconds
    #[arg(long)]
    pub report_interval: Option<u64>,
}

impl RunArgs {
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(v) = &self.base_url {
            cfg.target.base_url = v.clone();
        }
        if let Some(v) = &self.subscription_key {
            cfg.target.subscription_key = v.clone();
        }
        if let Some(v) = self.profile {
            cfg.load.profile = v;
        }
        if let Some(v) = self.users {
            cfg.load.users = v;
        }
        if let Some(v) = self.spawn_rate {
            cfg.load.spawn_rate = v;
        }
        if let Some(v) = self.duration {
            cfg.load.duration_seconds = v;
        }
        if let Some(v) = self.wait_min {
            cfg.load.wait_min_seconds = v;
        }
        if let Some(v) = self.wait_max {
            cfg.load.wait_max_seconds = v;
        }
        if let Some(v) = self.seed {
            cfg.load.random_seed = Some(v);
        }
        if let Some(v) = self.report_interval {
            cfg.report.interval_seconds = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_overrides_config() {
        let cli = Cli::try_parse_from([
            "patient-tests-loadtest",
            "run",
            "--profile",
            "create-test",
            "--users",
            "50",
            "--wait-min",
            "0.5",
            "--wait-max",
            "2",
            "--seed",
            "9",
        ])
        .unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run command");
        };

        let mut cfg = Config::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.load.profile, Profile::CreateTest);
        assert_eq!(cfg.load.users, 50);
        assert_eq!(cfg.load.wait_min_seconds, 0.5);
        assert_eq!(cfg.load.wait_max_seconds, 2.0);
        assert_eq!(cfg.load.random_seed, Some(9));
        assert_eq!(cfg.load.duration_seconds, 60);
    }

    #[test]
    fn test_command_is_optional() {
        let cli = Cli::try_parse_from(["patient-tests-loadtest", "--verbose"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }
}
