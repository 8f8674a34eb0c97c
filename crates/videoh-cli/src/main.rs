//! vide-oh packaging hook CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "videoh-bundle")]
#[command(about = "Build and collect the vide-oh front end for asset packaging", long_about = None)]
struct Cli {
    /// Hook configuration file (defaults to ./bundle.kdl when present)
    #[arg(long, global = true, env = "VIDEOH_BUNDLE_CONFIG")]
    config: Option<PathBuf>,

    /// AWS region for control-plane queries
    #[arg(long, global = true, env = "AWS_REGION")]
    region: Option<String>,

    /// AWS CLI profile for control-plane queries
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the packaging hook into an output directory
    Bundle {
        /// Directory the packaging step collects
        output_dir: PathBuf,
    },
    /// Resolve a single stack output
    Output {
        /// Stack name
        stack: String,
        /// Output key
        key: String,
    },
    /// Print the configuration that would be generated, secrets masked
    Render,
    /// Validate a hook configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "bundle.kdl")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let aws = commands::AwsOverrides {
        region: cli.region,
        profile: cli.profile,
    };

    match cli.command {
        Commands::Bundle { output_dir } => {
            let hook = commands::load_hook(cli.config.as_deref(), &aws)?;
            commands::bundle::run(hook, &output_dir).await?;
        }
        Commands::Output { stack, key } => {
            let hook = commands::load_hook(cli.config.as_deref(), &aws)?;
            commands::output(hook, &stack, &key).await?;
        }
        Commands::Render => {
            let hook = commands::load_hook(cli.config.as_deref(), &aws)?;
            commands::bundle::render(hook).await?;
        }
        Commands::Validate { path } => {
            commands::validate(&path)?;
        }
    }

    Ok(())
}
