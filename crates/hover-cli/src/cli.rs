use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hover_core::ControllerConfig;
use hover_sim::params::{controller, craft, sensor, ParamSpec};
use hover_sim::{simulate, Arena, OverheadBar, SimParams, SimRun};
use nalgebra::Vector2;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "hover")]
#[command(about = "Autonomous hovercraft controller running on a simulated arena")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single simulation and export its telemetry
    Run {
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Repeat the simulation over a range of one controller parameter
    Sweep {
        #[arg(long, value_enum)]
        param: SweepParam,

        #[arg(long, default_value_t = 5)]
        steps: usize,

        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct SimArgs {
    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Output file format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    // ── Run ─────────────────────────────────────────────────────
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulated time including calibration (ms)
    #[arg(long, default_value_t = 60_000)]
    duration: u32,

    // ── Arena ───────────────────────────────────────────────────
    #[arg(long, default_value_t = 600.0)]
    arena_width: f64,

    #[arg(long, default_value_t = 400.0)]
    arena_height: f64,

    /// Left edge of an overhead bar (cm); no bar when omitted
    #[arg(long)]
    bar_x: Option<f64>,

    #[arg(long, default_value_t = 20.0)]
    bar_width: f64,

    #[arg(long, default_value_t = 10.0)]
    bar_clearance: f64,

    #[arg(long, default_value_t = 100.0)]
    start_x: f64,

    #[arg(long, default_value_t = 200.0)]
    start_y: f64,

    // ── Craft & sensors ─────────────────────────────────────────
    #[arg(long, default_value_t = 1.0)]
    noise_scale: f64,

    #[arg(long, default_value_t = 0.8, allow_negative_numbers = true)]
    gyro_bias: f64, // °/s

    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    disturbance: f64, // °/s²

    // ── Controller ──────────────────────────────────────────────
    #[arg(long, default_value_t = hover_core::config::DRIFT_GAIN)]
    drift_gain: f32,

    #[arg(long, default_value_t = hover_core::config::WALL_THRESHOLD)]
    wall_threshold: f32,

    #[arg(long, default_value_t = hover_core::config::BAR_THRESHOLD)]
    bar_threshold: f32,

    #[arg(long, default_value_t = hover_core::config::TURN_TIMEOUT)]
    turn_timeout: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum SweepParam {
    DriftGain,
    WallThreshold,
}

impl SweepParam {
    fn spec(self) -> ParamSpec {
        match self {
            SweepParam::DriftGain => controller::DRIFT_GAIN,
            SweepParam::WallThreshold => controller::WALL_THRESHOLD,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SweepParam::DriftGain => "drift_gain",
            SweepParam::WallThreshold => "wall_threshold",
        }
    }

    fn apply(self, config: &mut ControllerConfig, value: f64) {
        match self {
            SweepParam::DriftGain => config.drift_gain = value as f32,
            SweepParam::WallThreshold => config.wall_threshold = value as f32,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    println!("Hover Controller Simulator");
    println!("==========================\n");

    match cli.command {
        Command::Run { sim } => run_single(&sim),
        Command::Sweep { param, steps, sim } => run_sweep(&sim, param, steps),
    }
}

// ---------------------------------------------------------------------------
// Single Run
// ---------------------------------------------------------------------------
fn run_single(args: &SimArgs) -> Result<()> {
    check_bounds(args)?;
    println!("Running single simulation...");

    let params = build_sim_params(args);
    let config = build_controller_config(args);
    tracing::info!(seed = args.seed, duration_ms = args.duration, "starting simulation");
    let run = simulate(&params, &config).context("invalid simulation parameters")?;

    print_run_stats(&run);
    write_output(args, &run)?;
    write_summary(&args.output_dir, &run)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Sweep Run
// ---------------------------------------------------------------------------
fn run_sweep(args: &SimArgs, param: SweepParam, steps: usize) -> Result<()> {
    if steps == 0 {
        bail!("--steps must be at least 1");
    }
    check_bounds(args)?;
    let spec = param.spec();
    println!("Sweeping {} over {} steps", spec.label, steps);

    let params = build_sim_params(args);
    let mut rows = Vec::with_capacity(steps);

    for (i, value) in spec.sweep(steps).into_iter().enumerate() {
        let mut config = build_controller_config(args);
        param.apply(&mut config, value);
        tracing::debug!(param = param.column(), value, "sweep step");

        let run = simulate(&params, &config).context("invalid simulation parameters")?;
        println!(
            "Run {}/{} | {}: {:.2} -> turns {}, collisions {}, {:.0} cm",
            i + 1,
            steps,
            param.column(),
            value,
            run.turns.len(),
            run.final_state.collisions,
            run.distance_travelled()
        );
        rows.push((value, run));
    }

    let path = write_sweep_summary(&args.output_dir, param, &rows)?;
    println!("\nSweep complete. Summary at {:?}", path);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------
fn check_bounds(args: &SimArgs) -> Result<()> {
    for (spec, value) in [
        (craft::DISTURBANCE, args.disturbance),
        (sensor::GYRO_BIAS, args.gyro_bias),
        (sensor::NOISE_SCALE, args.noise_scale),
        (controller::DRIFT_GAIN, args.drift_gain as f64),
        (controller::WALL_THRESHOLD, args.wall_threshold as f64),
        (controller::TURN_TIMEOUT, args.turn_timeout as f64),
    ] {
        if !spec.contains(value) {
            bail!("{} = {} is outside {}..={}", spec.label, value, spec.min, spec.max);
        }
    }
    Ok(())
}

fn build_sim_params(args: &SimArgs) -> SimParams {
    let defaults = SimParams::default();

    let mut arena = Arena::new(args.arena_width, args.arena_height);
    if let Some(x) = args.bar_x {
        arena = arena.with_bar(OverheadBar {
            x_min: x,
            x_max: x + args.bar_width,
            clearance: args.bar_clearance,
        });
    }

    let mut params = SimParams {
        arena,
        start: Vector2::new(args.start_x, args.start_y),
        duration_ms: args.duration,
        ..defaults
    };
    params.craft.disturbance = args.disturbance;
    params.sensors.seed = args.seed;
    params.sensors.noise_scale = args.noise_scale;
    params.sensors.gyro_bias = args.gyro_bias;
    params
}

fn build_controller_config(args: &SimArgs) -> ControllerConfig {
    ControllerConfig {
        drift_gain: args.drift_gain,
        wall_threshold: args.wall_threshold,
        bar_threshold: args.bar_threshold,
        turn_timeout_ms: args.turn_timeout,
        ..ControllerConfig::default()
    }
}

fn print_run_stats(run: &SimRun) {
    let end_ms = run.telemetry.last().map(|s| s.time_ms).unwrap_or(0);

    println!("\nSimulation Stats:");
    println!("  Cycles:      {}", run.cycles);
    println!("  Sim Time:    {:.2} s", end_ms as f64 / 1000.0);
    println!("  Yaw Bias:    {:.3} °/s", run.yaw_bias);
    println!("  Turns:       {} ({} timed out)", run.turns.len(), run.timed_out_turns());
    println!("  Collisions:  {}", run.final_state.collisions);
    println!("  Distance:    {:.1} cm", run.distance_travelled());
    match run.halt_time_ms {
        Some(t) => println!("  Halted:      at {:.2} s", t as f64 / 1000.0),
        None => println!("  Halted:      no"),
    }
    println!("-----------------------------");
}

fn write_output(args: &SimArgs, run: &SimRun) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {:?}", args.output_dir))?;

    let path = match args.format {
        OutputFormat::Csv => {
            let path = args.output_dir.join("telemetry.csv");
            let mut wtr = csv::Writer::from_path(&path)
                .with_context(|| format!("opening {:?}", path))?;
            for sample in &run.telemetry {
                wtr.serialize(sample)?;
            }
            wtr.flush()?;
            path
        }
        OutputFormat::Json => {
            let path = args.output_dir.join("telemetry.json");
            let json = serde_json::to_string_pretty(&run.telemetry)?;
            std::fs::write(&path, json).with_context(|| format!("writing {:?}", path))?;
            path
        }
    };

    println!("Data written to {:?}", path);
    Ok(())
}

fn write_summary(dir: &Path, run: &SimRun) -> Result<PathBuf> {
    let summary = serde_json::json!({
        "cycles": run.cycles,
        "yaw_bias": run.yaw_bias,
        "halted": run.halted,
        "halt_time_ms": run.halt_time_ms,
        "collisions": run.final_state.collisions,
        "distance_cm": run.distance_travelled(),
        "final_heading": run.final_state.heading,
        "turns": run.turns,
    });

    let path = dir.join("summary.json");
    std::fs::write(&path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

fn write_sweep_summary(dir: &Path, param: SweepParam, rows: &[(f64, SimRun)]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    let path = dir.join("sweep_summary.csv");
    let mut wtr = csv::Writer::from_path(&path).with_context(|| format!("opening {:?}", path))?;

    wtr.write_record([
        param.column(),
        "turns",
        "timed_out",
        "collisions",
        "distance_cm",
        "halted",
    ])?;
    for (value, run) in rows {
        wtr.write_record([
            format!("{:.3}", value),
            format!("{}", run.turns.len()),
            format!("{}", run.timed_out_turns()),
            format!("{}", run.final_state.collisions),
            format!("{:.1}", run.distance_travelled()),
            format!("{}", run.halted),
        ])?;
    }
    wtr.flush()?;
    Ok(path)
}
