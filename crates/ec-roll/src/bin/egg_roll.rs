//! Egg roll scenario runner
//!
//! Usage:
//!   egg-roll run <scenario.yaml>    - Run a scenario file
//!   egg-roll preset <name>          - Run a built-in scenario
//!   egg-roll presets                - List built-in scenarios
//!   egg-roll check                  - Run every preset and verify expectations

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use ec_roll::presets;
use ec_roll::{RollConfig, RollEngine, RollReport, RollScenario, RollTiming, TimingProfile};

#[derive(Parser)]
#[command(name = "egg-roll", about = "Run egg roll scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Roll config file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Timing profile, overrides the config file
    #[arg(short, long, global = true, value_enum)]
    profile: Option<Profile>,

    /// Simulated seconds per frame
    #[arg(short, long, global = true, default_value_t = 1.0 / 60.0)]
    tick: f64,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Output::Summary)]
    output: Output,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file
    Run {
        /// Scenario YAML
        scenario: PathBuf,
    },
    /// Run a built-in scenario
    Preset {
        /// Preset name
        name: String,
    },
    /// List built-in scenarios
    Presets,
    /// Run every preset and verify its expectations
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Normal,
    Turbo,
    Instant,
}

impl From<Profile> for TimingProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Normal => TimingProfile::Normal,
            Profile::Turbo => TimingProfile::Turbo,
            Profile::Instant => TimingProfile::Instant,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// One-line summary
    Summary,
    /// Roll report as JSON, trace included
    Report,
    /// Stage trace as JSON
    Trace,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Run { scenario } => {
            let scenario = RollScenario::load(scenario)
                .with_context(|| format!("Failed to load scenario {}", scenario.display()))?;
            run_and_print(&scenario, &config, &cli)
        }
        Commands::Preset { name } => {
            let Some(scenario) = presets::preset(name) else {
                bail!("Unknown preset '{name}', see `egg-roll presets`");
            };
            run_and_print(&scenario, &config, &cli)
        }
        Commands::Presets => {
            for scenario in presets::all_presets() {
                println!("{:<16} {}", scenario.name, scenario.description);
            }
            Ok(())
        }
        Commands::Check => check_presets(&config, cli.tick),
    }
}

fn load_config(cli: &Cli) -> Result<RollConfig> {
    let mut config = match &cli.config {
        Some(path) => RollConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RollConfig::default(),
    };
    if let Some(profile) = cli.profile {
        config.timing = RollTiming::from_profile(profile.into());
    }
    Ok(config)
}

fn run_scenario(scenario: &RollScenario, config: &RollConfig, tick: f64) -> Result<RollReport> {
    let run = scenario
        .build()
        .with_context(|| format!("Failed to build scenario '{}'", scenario.name))?;

    let mut engine = RollEngine::new(config.clone(), run.services).with_board(&scenario.name);
    engine
        .start_roll(run.path, run.color)
        .context("Failed to start roll")?;

    log::info!("Running '{}' at {:.4}s per tick", scenario.name, tick);
    engine
        .run_with_tick(tick)
        .context("Roll ended without a report")
}

fn run_and_print(scenario: &RollScenario, config: &RollConfig, cli: &Cli) -> Result<()> {
    let report = run_scenario(scenario, config, cli.tick)?;

    match cli.output {
        Output::Summary => {
            let validation = report.trace.validate();
            let summary = report.trace.summary();
            println!(
                "{}: {:?} raw={} x{} awarded={} steps={} deleted={} spawned={} ({:.2}s)",
                scenario.name,
                summary.outcome,
                report.raw_score,
                report.multiplier,
                summary.awarded,
                report.steps,
                summary.deleted,
                summary.spawned,
                summary.duration_ms / 1000.0
            );
            println!(
                "  trace {}: {} events, {} emitted, peak x{}",
                summary.trace_id, summary.event_count, summary.emitted_count, summary.peak_multiplier
            );
            for warning in validation.warnings() {
                println!("  warning: {warning}");
            }
        }
        Output::Report => println!("{}", serde_json::to_string_pretty(&report)?),
        Output::Trace => println!("{}", report.trace.to_json()?),
    }

    let mismatches = scenario.expect.check(&report);
    if !mismatches.is_empty() {
        bail!("'{}' did not match: {}", scenario.name, mismatches.join("; "));
    }
    Ok(())
}

fn check_presets(config: &RollConfig, tick: f64) -> Result<()> {
    let mut failed = 0;

    for scenario in presets::all_presets() {
        let report = run_scenario(&scenario, config, tick)?;
        let mut problems = scenario.expect.check(&report);
        problems.extend(report.trace.validate().warnings().into_iter().map(String::from));

        if problems.is_empty() {
            println!("ok    {}", scenario.name);
        } else {
            failed += 1;
            println!("FAIL  {}: {}", scenario.name, problems.join("; "));
        }
    }

    if failed > 0 {
        bail!("{failed} preset(s) failed");
    }
    Ok(())
}
