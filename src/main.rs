use clap::Parser;
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use offline_queue::cli::args::{Cli, Commands};
use offline_queue::cli::commands;
use offline_queue::config::Config;
use offline_queue::error::OfflineError;
use offline_queue::storage::Database;
use offline_queue::OfflineContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over the configured filter.
fn init_logging(configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run() -> Result<(), OfflineError> {
    let cli = Cli::parse();
    let config = Config::load()?;

    init_logging(&config.logging.filter);
    config.general.color.apply();

    let format = cli.output.unwrap_or(config.general.default_output);
    let db = match &cli.db {
        Some(path) => Database::open_at(path)?,
        None => Database::open()?,
    };
    let ctx = OfflineContext::from_config(db, &config);

    let output = match cli.command {
        Commands::Status => commands::status(&ctx, format)?,
        Commands::List { entity_type, limit } => {
            commands::list(&ctx, entity_type.as_deref(), limit, format)?
        }
        Commands::Show { id } => commands::show(&ctx, id, format)?,
        Commands::Remove { id } => commands::remove(&ctx, id, format)?,
        Commands::Clear { force } => commands::clear(&ctx, force, format)?,
        Commands::Bookmarks => commands::bookmarks(&ctx, format)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
