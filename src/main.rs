use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glacier_melt::config::Config;
use glacier_melt::pipeline::{self, PipelineError};
use glacier_melt::report;

#[derive(Parser, Debug)]
#[command(name = "glacier-melt")]
#[command(about = "Estimate glacier melt with a degree-day model and compare it to observed discharge", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = "GLACIER_MELT_CONFIG", default_value = "glacier-melt.toml")]
    config: PathBuf,

    /// Override the degree-day factor (mm w.e. per °C per day)
    #[arg(long)]
    degree_day_factor: Option<f64>,

    /// Override the output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the summary without writing report files
    #[arg(long)]
    dry_run: bool,
}

#[instrument]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,glacier_melt=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(factor) = cli.degree_day_factor {
        config.degree_day_factor = factor;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    info!("Starting glacier melt analysis with config: {:?}", config);

    let output = match pipeline::run(&config) {
        Ok(output) => output,
        Err(e) => {
            error!("Analysis aborted: {e}");
            return Err(e.into());
        }
    };

    println!("{}", report::render_summary(&output));

    if cli.dry_run {
        info!("Dry run, no report files written");
        return Ok(());
    }

    let paths = report::write_reports(&output, &config.output_dir).map_err(PipelineError::from)?;
    info!(
        "Monthly table: {}, year summary: {}, summary: {}",
        paths.monthly.display(),
        paths.yearly.display(),
        paths.summary.display()
    );

    Ok(())
}
