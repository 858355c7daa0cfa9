//! eferro-picks - static pages for curated talks
//!
//! A batch CLI that reads the resources dataset, keeps the five-star
//! English talks and writes the by-speaker and by-topic HTML pages plus
//! JSON summaries.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (bad arguments, config, load, parse or write error)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod report;
mod source;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("eferro-picks v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_generate(&args) {
        error!("Generation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .picks.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to change the dataset, filters, output paths and page text.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG`, when set, wins over the verbosity flags.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the whole generation for the given arguments.
fn run_generate(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(args)?;
    config.merge_with_args(args);

    if !args.quiet {
        println!("📥 Loading talks from {}", config.source.path().display());
    }

    let summary = match pipeline::run(&config, args.dry_run) {
        Ok(summary) => summary,
        Err(e) => {
            let context = format!(
                "{} while generating from {}",
                e.kind(),
                config.source.path().display()
            );
            return Err(anyhow::Error::new(e).context(context));
        }
    };

    if args.quiet {
        return Ok(());
    }

    println!("\n📊 Summary:");
    println!(
        "   Talks selected: {} of {} records",
        summary.talks_selected, summary.records_read
    );
    println!(
        "   Speakers: {} ({} with their own section)",
        summary.speakers, summary.repeat_speakers
    );
    println!("   Topics: {}", summary.topics);
    println!("   Duration: {:.2}s", start_time.elapsed().as_secs_f64());

    if args.dry_run {
        println!("\n✅ Dry run complete. No files were written.");
    } else {
        println!("\n📝 Files written:");
        for path in &summary.outputs {
            println!("   {}", path.display());
        }
        println!("\n✅ Done!");
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// A config file that is present but broken stops the run.
fn load_config(args: &Args) -> Result<Config> {
    Config::resolve(args.config.as_deref(), std::path::Path::new(DEFAULT_CONFIG_FILE))
}
