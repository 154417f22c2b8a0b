//! NAQLA - idea clustering CLI
//!
//! Reads a JSON array of ideas, clusters them with the configured language
//! model and prints the clusters as JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use naqla::{
    clustering::{ClusterEngine, Idea},
    config::AppConfig,
    llm::create_provider,
    logging,
};

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Cluster ideas from a JSON file
    Cluster {
        /// JSON array of ideas ({id, title, description, category?, keywords?})
        input: PathBuf,
        /// Target number of clusters (default: max(3, ceil(n / 5)))
        #[arg(long)]
        clusters: Option<usize>,
        /// Seed for centroid initialization
        #[arg(long)]
        seed: Option<u64>,
        /// Write clusters here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigCmd {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Destination (default: ~/.config/naqla/config.{NAQLA_ENV}.json)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "naqla")]
#[command(version)]
#[command(about = "LLM-assisted idea clustering", long_about = None)]
struct Args {
    /// Configuration file path (overrides defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Append logs to a file instead of stderr (bare flag: default log path)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        value_name = "PATH"
    )]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut app_config = AppConfig::load(args.config.as_deref())?;

    let log_file = logging::resolve_log_file(args.log_file);
    logging::init_logging(args.verbose || app_config.debug, log_file.as_deref())?;

    match args.command {
        Command::Cluster {
            input,
            clusters,
            seed,
            output,
        } => {
            if seed.is_some() {
                app_config.clustering.seed = seed;
            }
            run_cluster(&app_config, &input, clusters, output.as_deref()).await
        }
        Command::Config { cmd } => match cmd {
            ConfigCmd::Show => {
                println!("{}", serde_json::to_string_pretty(&app_config.redacted())?);
                Ok(())
            }
            ConfigCmd::Init { path, force } => {
                let path = path
                    .or_else(AppConfig::default_path)
                    .context("Could not determine config directory")?;
                if path.exists() && !force {
                    anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
                }
                AppConfig::default().save_to_file(&path)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
        },
    }
}

async fn run_cluster(
    config: &AppConfig,
    input: &std::path::Path,
    target_clusters: Option<usize>,
    output: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let ideas: Vec<Idea> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of ideas", input.display()))?;

    tracing::info!(
        "Clustering {} ideas with {} model {}",
        ideas.len(),
        config.model.provider,
        config.model.model
    );

    let model = create_provider(config.model.clone())?;
    let engine = ClusterEngine::from_app_config(model, config);

    let run = engine.cluster_ideas(&ideas, target_clusters);
    let clusters = match config.run_timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .with_context(|| format!("Clustering did not finish within {}s", secs))??,
        None => run.await?,
    };

    let json = serde_json::to_string_pretty(&clusters)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} cluster(s) to {}", clusters.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
