use anyhow::{Context, Result};
use clap::Parser;
use patient_tests_loadtest::{api, cli, config, harness, scenario, state, telemetry};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cli::{Cli, Command, RunArgs};
use config::Config;
use harness::{reporter, Harness, HarnessSettings, TokioHarness};
use scenario::{Profile, Scenario};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.clone().unwrap_or(Command::Run(RunArgs::default())) {
        Command::Profiles => print_profiles(),
        Command::Run(args) => {
            telemetry::init_tracing(cli.verbose, cli.log_format);
            run(&cli, &args).await
        }
    }
}

async fn run(cli: &Cli, args: &RunArgs) -> Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    args.apply(&mut cfg);
    let cfg = cfg.validated()?;

    if cfg.target.subscription_key.is_empty() {
        warn!(
            "no subscription key configured - set PTLOAD__TARGET__SUBSCRIPTION_KEY; \
            requests through API management will be rejected"
        );
    }

    let client = api::PatientApiClient::from_config(&cfg.target)
        .context("failed to create API client")?;
    let state = Arc::new(state::ScenarioState::new());
    let scenario = Arc::new(Scenario::new(cfg.load.profile, client, state)?);

    let mut settings = HarnessSettings::from_config(&cfg)?;
    settings.iterations = args.iterations;
    let harness = TokioHarness::new(settings);

    info!(base_url = %cfg.target.base_url, profile = %cfg.load.profile, "target configured");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            telemetry::shutdown_signal().await;
            shutdown.cancel();
        });
    }

    let summary = harness.run(scenario, shutdown).await?;
    reporter::print_summary(&summary).context("failed to write summary")?;
    Ok(())
}

fn print_profiles() -> Result<()> {
    for profile in Profile::iter() {
        let set = profile.task_set()?;
        println!("{profile}");
        for (task, p) in set.probabilities() {
            println!("  {:<30} {:>6.2}%", task.to_string(), p * 100.0);
        }
    }
    Ok(())
}
