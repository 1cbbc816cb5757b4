use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use pl_app::{
    AppResult, ConfigFormat, ConfigOverrides, ExportFormat, LoopMetrics, MetricsOptions,
    Observation, RunRequest, SweepDefinition, SweepParameter, config_service, run_service,
    run_sweep, write_result,
};
use pl_sim::{SimProgress, SimulationConfig};

#[derive(Parser)]
#[command(name = "pl-cli")]
#[command(about = "Pitchloop CLI - single-axis attitude PID simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and report the step response
    Run {
        /// Configuration file (YAML or JSON); reference defaults if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: OverrideArgs,
        /// Noise seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Write samples to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sample file format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        config_path: PathBuf,
    },
    /// Print the reference configuration
    Defaults {
        /// Output format (yaml or json)
        #[arg(long, default_value = "yaml")]
        format: String,
    },
    /// Vary one parameter over a range and compare responses
    Sweep {
        /// Parameter to vary (kp, ki, kd, inertia, saturation_limit, noise_level)
        #[arg(long)]
        param: String,
        /// First value
        #[arg(long)]
        from: f64,
        /// Last value
        #[arg(long)]
        to: f64,
        /// Number of points including both ends
        #[arg(long, default_value_t = 5)]
        steps: usize,
        /// Base configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: OverrideArgs,
        /// Base seed; point i uses seed + i
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the troubleshooting matrix
    Matrix,
}

#[derive(Args, Debug, Default)]
struct OverrideArgs {
    /// Rotational inertia
    #[arg(long)]
    inertia: Option<f64>,
    /// Proportional gain
    #[arg(long)]
    kp: Option<f64>,
    /// Integral gain
    #[arg(long)]
    ki: Option<f64>,
    /// Derivative gain
    #[arg(long)]
    kd: Option<f64>,
    /// Maximum torque magnitude
    #[arg(long)]
    saturation_limit: Option<f64>,
    /// Measurement noise standard deviation
    #[arg(long)]
    noise_level: Option<f64>,
    /// Anti-windup on or off
    #[arg(long, value_name = "on|off", value_parser = parse_on_off)]
    anti_windup: Option<bool>,
    /// Target position
    #[arg(long, allow_negative_numbers = true)]
    reference: Option<f64>,
    /// Tick duration in seconds
    #[arg(long)]
    time_step: Option<f64>,
    /// Simulated span in seconds
    #[arg(long)]
    total_time: Option<f64>,
}

impl OverrideArgs {
    fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            inertia: self.inertia,
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            saturation_limit: self.saturation_limit,
            noise_level: self.noise_level,
            anti_windup_enabled: self.anti_windup,
            reference: self.reference,
            time_step: self.time_step,
            total_time: self.total_time,
        }
    }
}

fn main() -> AppResult<()> {
    // Initialize tracing
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            overrides,
            seed,
            output,
            format,
        } => cmd_run(config.as_deref(), &overrides, seed, output.as_deref(), &format),
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Defaults { format } => cmd_defaults(&format),
        Commands::Sweep {
            param,
            from,
            to,
            steps,
            config,
            overrides,
            seed,
        } => cmd_sweep(&param, from, to, steps, config.as_deref(), &overrides, seed),
        Commands::Matrix => {
            cmd_matrix();
            Ok(())
        }
    }
}

fn parse_on_off(s: &str) -> Result<bool, String> {
    match s {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => Err(format!("expected 'on' or 'off', got '{other}'")),
    }
}

/// `RUST_LOG` directives when set, warnings only otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    match directives {
        Some(d) if !d.trim().is_empty() => EnvFilter::new(d),
        _ => EnvFilter::new("warn"),
    }
}

fn resolve_config(path: Option<&Path>, overrides: &OverrideArgs) -> AppResult<SimulationConfig> {
    let base = match path {
        Some(path) => config_service::load_config(path)?,
        None => SimulationConfig::default(),
    };
    let config = overrides.to_overrides().apply(&base);
    config.validate()?;
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn cmd_run(
    config_path: Option<&Path>,
    overrides: &OverrideArgs,
    seed: Option<u64>,
    output: Option<&Path>,
    format: &str,
) -> AppResult<()> {
    let format: ExportFormat = format.parse()?;
    let config = resolve_config(config_path, overrides)?;
    println!(
        "Running simulation: kp={} ki={} kd={} limit={} noise={} anti-windup={}",
        config.kp,
        config.ki,
        config.kd,
        config.saturation_limit,
        config.noise_level,
        if config.anti_windup_enabled { "on" } else { "off" }
    );

    let request = RunRequest {
        config,
        seed,
        ..RunRequest::default()
    };

    let mut last_emit = Instant::now();
    let response = run_service::execute_with_progress(
        &request,
        Some(&mut |p: &SimProgress| {
            if last_emit.elapsed().as_millis() >= 100 || p.fraction_complete >= 1.0 {
                render_cli_progress(p);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    println!("✓ Simulation completed");
    println!("  Samples: {}", response.result.len());
    if let Some(seed) = response.result.seed {
        println!("  Seed: {}", seed);
    }
    if let Some(last) = response.result.final_sample() {
        println!(
            "  Final position: {:.4} rad at t={:.2}s (reference {:.4})",
            last.position,
            last.time,
            response.result.reference()
        );
    }

    print_metrics(&response.metrics);

    if response.findings.is_empty() {
        println!("\nNo tuning issues detected");
    } else {
        println!("\nTroubleshooting:");
        for finding in &response.findings {
            println!(
                "  {} ({}) -> {}",
                finding.observation,
                finding.detail,
                finding.correction()
            );
        }
    }

    println!(
        "\nTiming: setup {:.3}s, simulate {:.3}s, analyze {:.3}s, total {:.3}s",
        response.timing.setup_time_s,
        response.timing.simulate_time_s,
        response.timing.analyze_time_s,
        response.timing.total_time_s
    );

    if let Some(path) = output {
        write_result(path, &response.result, format)?;
        println!(
            "✓ Exported {} samples to {}",
            response.result.len(),
            path.display()
        );
    }

    Ok(())
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = config_service::load_config(config_path)?;
    println!("✓ Configuration is valid ({} ticks)", config.tick_count()?);
    Ok(())
}

fn cmd_defaults(format: &str) -> AppResult<()> {
    let format: ConfigFormat = format.parse()?;
    let text = config_service::to_config_string(&SimulationConfig::default(), format)?;
    println!("{}", text.trim_end());
    Ok(())
}

fn cmd_sweep(
    param: &str,
    from: f64,
    to: f64,
    steps: usize,
    config_path: Option<&Path>,
    overrides: &OverrideArgs,
    seed: Option<u64>,
) -> AppResult<()> {
    let parameter: SweepParameter = param.parse()?;
    let definition = SweepDefinition::new(parameter, from, to, steps)?;
    let base = resolve_config(config_path, overrides)?;

    let start = Instant::now();
    let sweep = run_sweep(&base, &definition, seed, &MetricsOptions::default());

    println!(
        "Sweep of {} ({} points, {:.3}s):",
        parameter,
        sweep.points.len(),
        start.elapsed().as_secs_f64()
    );
    println!(
        "  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}",
        parameter.name(),
        "overshoot%",
        "settle_s",
        "ss_error",
        "sat%"
    );
    for point in &sweep.points {
        match (&point.metrics, &point.error) {
            (Some(m), _) => println!(
                "  {:>10.4}  {:>10}  {:>10}  {:>10}  {:>10}",
                point.value,
                fmt_opt(m.overshoot_pct, 2),
                fmt_opt(m.settling_time_s, 2),
                fmt_opt(m.steady_state_error, 4),
                fmt_opt(m.saturation_pct, 1)
            ),
            (None, Some(e)) => println!("  {:>10.4}  rejected: {}", point.value, e),
            (None, None) => {}
        }
    }
    if sweep.num_failed > 0 {
        println!("  {} of {} points rejected", sweep.num_failed, sweep.points.len());
    }
    Ok(())
}

fn cmd_matrix() {
    println!("{:<20}  Correction", "Observation");
    for observation in Observation::ALL {
        println!("{:<20}  {}", observation.label(), observation.correction());
    }
}

fn print_metrics(m: &LoopMetrics) {
    println!("\nStep response:");
    println!("  Rise time 10%:      {} s", fmt_opt(m.rise_time_10_s, 3));
    println!("  Rise time 90%:      {} s", fmt_opt(m.rise_time_90_s, 3));
    println!("  Settling time (2%): {} s", fmt_opt(m.settling_time_s, 3));
    println!("  Overshoot:          {} %", fmt_opt(m.overshoot_pct, 2));
    println!("  Steady-state error: {}", fmt_opt(m.steady_state_error, 5));
    println!("  Peak |command|:     {}", fmt_opt(m.max_abs_command, 3));
    println!("  Saturated ticks:    {} %", fmt_opt(m.saturation_pct, 1));
    println!("  Peak |integral|:    {}", fmt_opt(m.max_abs_error_integral, 3));
    if !m.finite {
        println!("  Response diverged to a non-finite value");
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();
}

fn render_cli_progress(p: &SimProgress) {
    let width = 28usize;
    let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    print!(
        "\r[{}] {:>6.2}%  t={:.3}s  tick={}/{}",
        bar,
        p.fraction_complete * 100.0,
        p.sim_time,
        p.tick,
        p.tick_count
    );
    let _ = io::stdout().flush();
}
