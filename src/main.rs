//! Runs the OLS consistency simulation without a GUI and prints how the
//! estimates converge.
//!
//! ```bash
//! ols-sim --seed 7 --noise-level 3 --max-sample-size 20000 --every 50
//! ols-sim --config demo.toml --sampling-mode independent --json > history.json
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clap::ValueEnum;
use ols_consistency::config::SimulationConfig;
use ols_consistency::config::DEFAULT_CONFIG_PATH;
use ols_consistency::schema::HistoryPoint;
use ols_consistency::schema::SamplingMode;
use ols_consistency::simulation::format_history_table;
use ols_consistency::simulation::Simulation;
use ols_consistency::simulation::SimulationRunner;
use ols_consistency::simulation::TickOutcome;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ols-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML file with simulation settings. `config.toml` is read when present.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    true_slope: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    true_intercept: Option<f64>,

    /// Standard deviation of the error term
    #[arg(long, allow_negative_numbers = true)]
    noise_level: Option<f64>,

    /// Points added per tick
    #[arg(long)]
    batch_size: Option<usize>,

    /// Milliseconds between ticks with --realtime
    #[arg(long)]
    speed_ms: Option<u64>,

    #[arg(long)]
    min_sample_size: Option<usize>,

    #[arg(long)]
    max_sample_size: Option<usize>,

    #[arg(long, value_enum)]
    sampling_mode: Option<ModeArg>,

    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks even if the maximum sample size is not reached
    #[arg(long)]
    ticks: Option<u64>,

    /// Tick on a timer thread at the configured speed
    #[arg(long)]
    realtime: bool,

    /// Print the history as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Print every k-th history row
    #[arg(long, default_value = "1")]
    every: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Cumulative,
    Independent,
}

impl From<ModeArg> for SamplingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Cumulative => SamplingMode::Cumulative,
            ModeArg::Independent => SamplingMode::Independent,
        }
    }
}

impl Args {
    fn load_config(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load_from(path)
                .with_context(|| format!("reading {}", path.display()))?,
            None if PathBuf::from(DEFAULT_CONFIG_PATH).exists() => {
                SimulationConfig::load().context("reading config.toml")?
            }
            None => SimulationConfig::default(),
        };

        macro_rules! override_field {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    config.$field = value;
                })*
            };
        }
        override_field!(
            true_slope,
            true_intercept,
            noise_level,
            batch_size,
            speed_ms,
            min_sample_size,
            max_sample_size,
            seed
        );
        if let Some(mode) = self.sampling_mode {
            config.sampling_mode = mode.into();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,ols_consistency=info,ols_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.load_config()?;

    info!(
        true_slope = config.true_slope,
        true_intercept = config.true_intercept,
        noise_level = config.noise_level,
        batch_size = config.batch_size,
        max_sample_size = config.max_sample_size,
        sampling_mode = %config.sampling_mode,
        seed = config.seed,
        "Starting simulation"
    );

    let history = if args.realtime {
        run_realtime(config, args.ticks)?
    } else {
        run_batch(config, args.ticks)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        println!("{}", format_history_table(&history, config.noise_level, args.every));
    }
    Ok(())
}

fn run_batch(config: SimulationConfig, max_ticks: Option<u64>) -> Vec<HistoryPoint> {
    let mut simulation = Simulation::new(config);
    while max_ticks.map_or(true, |max| *simulation.ticks() < max) {
        if simulation.tick() == TickOutcome::Finished {
            break;
        }
    }
    simulation.history().iter().copied().collect()
}

fn run_realtime(
    config: SimulationConfig,
    max_ticks: Option<u64>,
) -> anyhow::Result<Vec<HistoryPoint>> {
    let runner = SimulationRunner::spawn(config)?;
    runner.start()?;
    let state = loop {
        let state = runner.wait_for(Duration::from_secs(1), |s| {
            *s.snapshot.finished() || max_ticks.map_or(false, |max| *s.snapshot.ticks() >= max)
        });
        if let Some(state) = state {
            break state;
        }
        let state = runner.state();
        info!(
            n = state.snapshot.sample_size(),
            slope = state.snapshot.result().slope,
            slope_std_err = state.snapshot.result().slope_std_err,
            "Progress"
        );
    };
    runner.pause()?;
    let mut history: Vec<HistoryPoint> = state.snapshot.history().iter().copied().collect();
    if let Some(max) = max_ticks {
        history.truncate(max as usize);
    }
    Ok(history)
}
