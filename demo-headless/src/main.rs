use clap::Parser;
use landevo_core::{run_model, ModelConfig, RunSummary};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Landscape evolution demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "landevo-demo")]
#[command(about = "Landscape evolution forward model", long_about = None)]
struct Args {
    /// Stream power law coefficient
    k_sp: f64,

    /// Hillslope diffusivity (m^2/yr)
    k_diff: f64,

    /// Uplift rate (m/yr)
    u_rate: f64,

    /// Grid size in x (i.e., number of columns)
    #[arg(long, default_value_t = 601)]
    x_size: usize,

    /// Grid size in y (i.e., number of rows)
    #[arg(long, default_value_t = 401)]
    y_size: usize,

    /// Uniform grid spacing in x and y (m)
    #[arg(long, default_value_t = 200.0)]
    spacing: f64,

    /// Drainage area exponent of the stream power law
    #[arg(long, default_value_t = 0.4)]
    m_exp: f64,

    /// Slope exponent of the stream power law
    #[arg(long, default_value_t = 1.0)]
    n_exp: f64,

    /// Simulation time step (yr)
    #[arg(long, default_value_t = 1e5)]
    time_step: f64,

    /// Total simulation duration (yr)
    #[arg(long, default_value_t = 1e7)]
    time_total: f64,

    /// Seed for the initial surface perturbation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output filename for the elevation array (raw little-endian f64,
    /// row-major)
    #[arg(long, default_value = "out.bin")]
    output: PathBuf,

    /// Optional JSON file for run parameters and statistics
    #[arg(long)]
    metadata: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunMetadata {
    config: ModelConfig,
    summary: RunSummary,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = ModelConfig {
        nx: args.x_size,
        ny: args.y_size,
        spacing: args.spacing,
        erodibility: args.k_sp,
        area_exponent: args.m_exp,
        slope_exponent: args.n_exp,
        diffusivity: args.k_diff,
        uplift_rate: args.u_rate,
        time_step: args.time_step,
        total_time: args.time_total,
        seed: args.seed,
        ..Default::default()
    };

    println!("=== Landscape Evolution Demo ===");
    println!(
        "{}x{} grid, {:.0} m spacing, {:.3e} yr in steps of {:.3e} yr",
        config.nx, config.ny, config.spacing, config.total_time, config.time_step
    );

    let output = run_model(config.clone())?;

    println!(
        "done: {} steps, elevation {:.2}..{:.2} m (mean {:.2} m), {} Newton fallbacks",
        output.summary.steps,
        output.summary.min_elevation,
        output.summary.max_elevation,
        output.summary.mean_elevation,
        output.summary.newton_fallbacks
    );

    write_binary(&args.output, &output.elevations)?;
    println!(
        "wrote {} ({} x {} cells)",
        args.output.display(),
        output.nx,
        output.ny
    );

    if let Some(path) = &args.metadata {
        let metadata = RunMetadata {
            config,
            summary: output.summary,
        };
        std::fs::write(path, serde_json::to_string_pretty(&metadata)?)?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

/// Write the elevation field as raw little-endian f64 values, row-major.
fn write_binary(path: &Path, elevations: &[f64]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for value in elevations {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()
}
