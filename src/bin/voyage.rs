use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use voyage_twin::config::{
    DistanceModelConfig, ExtrapolationConfig, ScenarioConfig, SpeedUnit, parse_scenario,
};
use voyage_twin::output::{export_summary, export_timeseries};
use voyage_twin::scenario::build_voyage;
use voyage_twin::units::{m_to_nmi, ms_to_knots, seconds_to_minutes};
use voyage_twin::voyage::{OnStep, StepControl};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Simulate a vessel's longitudinal motion along a waypoint route"
)]
struct Cli {
    /// Scenario manifest (TOML or YAML). Other flags override its values.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Waypoint CSV (latitude, longitude, thrust)
    #[arg(long)]
    waypoints: Option<PathBuf>,

    /// Resistance CSV (speed, coefficient)
    #[arg(long)]
    resistance: Option<PathBuf>,

    /// Vessel displacement in tonnes
    #[arg(long)]
    mass_tonnes: Option<f64>,

    /// Integration step in seconds
    #[arg(long)]
    timestep: Option<f64>,

    /// Unit of the resistance table's speed column
    #[arg(long, value_enum)]
    speed_unit: Option<SpeedUnitArg>,

    /// Leg distance model
    #[arg(long, value_enum)]
    distance_model: Option<DistanceModelArg>,

    /// Resistance lookup outside the sampled speeds
    #[arg(long, value_enum)]
    extrapolation: Option<ExtrapolationArg>,

    /// Time-series CSV destination (`-` for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON summary destination (`-` for stdout)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Stop after this many steps
    #[arg(long)]
    max_steps: Option<u64>,

    /// Log progress every N steps (0 disables)
    #[arg(long, default_value_t = 0)]
    progress_every: u64,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum SpeedUnitArg {
    Knots,
    Mps,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum DistanceModelArg {
    GreatCircle,
    Ellipsoidal,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum ExtrapolationArg {
    Clamp,
    Linear,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // validated once, after flags are merged into the manifest
    let config = resolve_config(&cli)?;
    let voyage = build_voyage(&config).context("failed to set up voyage")?;

    let every = cli.progress_every;
    let mut progress = OnStep::new(|p| {
        if every > 0 && p.outcome.step % every == 0 {
            tracing::info!(
                step = p.outcome.step,
                leg = p.leg.index,
                legs = p.leg_count,
                position_m = p.outcome.state.position_m,
                velocity_kn = ms_to_knots(p.outcome.state.velocity_m_s),
                "{:.1}% complete",
                p.fraction_complete() * 100.0
            );
        }
        StepControl::Continue
    });
    let report = voyage.run_with(&mut progress);

    if let Some(path) = config.output.as_deref() {
        export_timeseries(path, &report)
            .with_context(|| format!("failed to write time series to {}", path.display()))?;
    }
    if let Some(path) = config.summary.as_deref() {
        export_summary(path, &report, config.name.as_deref())
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
    }

    // keep stdout clean when it carries an artifact
    let stdout_taken = [config.output.as_deref(), config.summary.as_deref()]
        .into_iter()
        .flatten()
        .any(|p| p.as_os_str() == "-");
    if stdout_taken {
        return Ok(());
    }

    println!("=== Voyage Summary ===");
    if let Some(name) = &config.name {
        println!("Scenario: {name}");
    }
    println!(
        "Distance: {:.1} m ({:.2} nmi) over {} legs",
        report.distance_m(),
        m_to_nmi(report.distance_m()),
        report.legs.len()
    );
    println!(
        "Duration: {:.1} s ({:.1} min), {} steps of {} s",
        report.duration_s(),
        seconds_to_minutes(report.duration_s()),
        report.steps(),
        report.timestep_s
    );
    println!(
        "Top speed: {:.3} m/s ({:.2} kn)",
        report.max_velocity_m_s(),
        ms_to_knots(report.max_velocity_m_s())
    );
    println!("Outcome: {}", report.termination);
    for warning in &report.warnings {
        println!("Warning: {warning}");
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ScenarioConfig> {
    let mut config = match &cli.scenario {
        Some(path) => parse_scenario(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => {
            let (Some(waypoints), Some(resistance), Some(mass_tonnes), Some(timestep_s)) = (
                cli.waypoints.clone(),
                cli.resistance.clone(),
                cli.mass_tonnes,
                cli.timestep,
            ) else {
                bail!(
                    "either --scenario or all of --waypoints, --resistance, --mass-tonnes and --timestep are required"
                );
            };
            ScenarioConfig {
                name: None,
                mass_tonnes,
                timestep_s,
                waypoints,
                resistance,
                speed_unit: SpeedUnit::default(),
                distance_model: DistanceModelConfig::default(),
                extrapolation: ExtrapolationConfig::default(),
                max_thrust_newtons: None,
                max_steps: None,
                output: None,
                summary: None,
            }
        }
    };

    if cli.scenario.is_some() {
        if let Some(path) = &cli.waypoints {
            config.waypoints = path.clone();
        }
        if let Some(path) = &cli.resistance {
            config.resistance = path.clone();
        }
        if let Some(mass) = cli.mass_tonnes {
            config.mass_tonnes = mass;
        }
        if let Some(dt) = cli.timestep {
            config.timestep_s = dt;
        }
    }
    if let Some(unit) = cli.speed_unit {
        config.speed_unit = match unit {
            SpeedUnitArg::Knots => SpeedUnit::Knots,
            SpeedUnitArg::Mps => SpeedUnit::MetersPerSecond,
        };
    }
    if let Some(model) = cli.distance_model {
        config.distance_model = match model {
            DistanceModelArg::GreatCircle => DistanceModelConfig::GreatCircle,
            DistanceModelArg::Ellipsoidal => DistanceModelConfig::Ellipsoidal,
        };
    }
    if let Some(policy) = cli.extrapolation {
        config.extrapolation = match policy {
            ExtrapolationArg::Clamp => ExtrapolationConfig::Clamp,
            ExtrapolationArg::Linear => ExtrapolationConfig::Linear,
        };
    }
    if cli.output.is_some() {
        config.output = cli.output.clone();
    }
    if cli.summary.is_some() {
        config.summary = cli.summary.clone();
    }
    if cli.max_steps.is_some() {
        config.max_steps = cli.max_steps;
    }

    let to_stdout = |p: &Option<PathBuf>| p.as_deref().is_some_and(|p| p.as_os_str() == "-");
    if to_stdout(&config.output) && to_stdout(&config.summary) {
        bail!("--output and --summary cannot both write to stdout");
    }
    Ok(config)
}
