use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "riskwatch",
    about = "Per-employee security incident risk aggregation",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (read API + scheduled cache refresh)
    Serve {
        /// Bind address override
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run one fetch/aggregate cycle and print a summary
    FetchOnce {
        /// Directory for raw payload dumps
        #[arg(long)]
        dump_dir: Option<PathBuf>,

        /// Print the full aggregate as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = riskwatch::config::Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.server.bind = bind;
            }
            tracing::info!(bind = %settings.server.bind, "Starting riskwatch daemon");
            riskwatch::serve(settings).await?;
        }
        Commands::FetchOnce { dump_dir, json } => {
            if dump_dir.is_some() {
                settings.dump_dir = dump_dir;
            }
            let pipeline = riskwatch::build_pipeline(&settings)?;
            let report = pipeline.run().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report.aggregate)?);
            } else {
                println!("\nriskwatch aggregation run {}", report.run_id);
                println!("{:<12} | {}", "employees", report.aggregate.len());
                println!("{:<12} | {}", "incidents", report.total_incidents);
                println!("{:<12} | {}", "skipped", report.skipped.len());
                println!("{:<12} | {}", "degraded", report.degraded.len());
                for d in &report.degraded {
                    println!(" - {} dropped: {}", d.category, d.error);
                }
                println!();
            }
        }
    }

    Ok(())
}
