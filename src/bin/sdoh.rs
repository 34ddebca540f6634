use clap::{Parser, Subcommand};
use sdoh::lens::utils::OutputFormat;
use sdoh::SdohConfig;
use tracing::Level;

mod commands;

use commands::config::ConfigArgs;
use commands::load::LoadArgs;
use commands::pull::PullArgs;
use commands::query::QueryArgs;
use commands::setup::SetupArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.sdoh/sdoh.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// SQLite store path, overrides the configured db_path
    #[clap(long, global = true)]
    db: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or reset the store schema
    Setup(SetupArgs),

    /// Load SVI or PLACES data from a local file or the CDC APIs
    Load(LoadArgs),

    /// Pull SVI data for every state
    Pull(PullArgs),

    /// Show stored SVI scores and PLACES measures for a location
    Query(QueryArgs),

    /// Show table row counts and last update times
    Stats,

    /// List the registered data sources
    Sources,

    /// Show configuration and store status
    Config(ConfigArgs),
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match SdohConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: unable to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let format = cli.format;
    match cli.command {
        Commands::Setup(args) => commands::setup::run(&config, args, format),
        Commands::Load(args) => commands::load::run(&config, args, format),
        Commands::Pull(args) => commands::pull::run(&config, args, format),
        Commands::Query(args) => commands::query::run(&config, args, format),
        Commands::Stats => commands::stats::run(&config, format),
        Commands::Sources => commands::sources::run(&config, format),
        Commands::Config(args) => commands::config::run(&config, args, format),
    }
}
