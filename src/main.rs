//! Binary entrypoint for the Tickforge CLI.
//!
//! Commands:
//! - `play` - start an interactive session on stdin/stdout
//! - `init` - create a starter `config.toml`
//! - `status` - print the loaded configuration and seed data summary
//! - `check-data [--dir <path>]` - load and validate seed data, print counts
//!
//! See the library crate docs for module-level details: `tickforge::`.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use tickforge::config::Config;
use tickforge::console::markup::RenderStyle;
use tickforge::shell::Shell;
use tickforge::world::{Catalog, ItemCategory};

#[derive(Parser)]
#[command(name = "tickforge")]
#[command(about = "A tick-driven crafting and gathering engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Play,
    /// Write a default configuration file
    Init,
    /// Show configuration and seed data summary
    Status,
    /// Load and validate seed data
    CheckData {
        /// Seed directory to check instead of the configured one
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => match Config::load(&cli.config).await {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("{}; using defaults", e);
                None
            }
        },
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Play => {
            let config = pre_config.unwrap_or_default();
            info!("Starting Tickforge v{}", env!("CARGO_PKG_VERSION"));
            let catalog = Arc::new(load_catalog(&config, None)?);
            let style = if config.console.color && atty::is(atty::Stream::Stdout) {
                RenderStyle::Ansi
            } else {
                RenderStyle::Plain
            };
            let shell = Shell::new(&config, catalog)?;
            shell.run_stdin(style).await?;
        }
        Commands::Init => {
            if std::path::Path::new(&cli.config).exists() {
                warn!("{} already exists; not overwriting", cli.config);
                return Ok(());
            }
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            println!("Wrote {}. Run `tickforge play` to start.", cli.config);
        }
        Commands::Status => {
            let config = pre_config.unwrap_or_default();
            let catalog = load_catalog(&config, None)?;
            println!("Tickforge v{}", env!("CARGO_PKG_VERSION"));
            println!("Tick: {}ms", config.engine.tick_ms);
            println!(
                "Player: stamina {}/{} (+{}/tick)",
                config.player.stamina, config.player.max_stamina, config.player.stamina_regen
            );
            println!(
                "World: land {}, power {}/{} (+{}/tick)",
                config.world.land, config.world.power, config.world.max_power, config.world.power_regen
            );
            match &config.data.seeds_dir {
                Some(dir) => println!("Seeds: {}", dir.display()),
                None => println!("Seeds: embedded"),
            }
            print_counts(&catalog);
        }
        Commands::CheckData { dir } => {
            let config = pre_config.unwrap_or_default();
            let catalog = load_catalog(&config, dir.as_ref())?;
            println!("Seed data OK.");
            print_counts(&catalog);
        }
    }

    Ok(())
}

fn load_catalog(config: &Config, dir: Option<&PathBuf>) -> Result<Catalog> {
    match dir.or(config.data.seeds_dir.as_ref()) {
        Some(dir) => Catalog::load_dir(dir)
            .with_context(|| format!("Failed to load seed data from {}", dir.display())),
        None => Catalog::embedded().context("Embedded seed data is invalid"),
    }
}

fn print_counts(catalog: &Catalog) {
    let devices = catalog
        .items
        .iter()
        .filter(|item| item.category == ItemCategory::Device)
        .count();
    let tools = catalog.items.iter().filter(|item| item.is_tool()).count();
    println!(
        "Items: {} ({} tools, {} devices)",
        catalog.items.len(),
        tools,
        devices
    );
    println!("Recipes: {}", catalog.recipes.len());
    println!("Gather specifiers: {}", catalog.gathers.len());
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Interactive play writes to the terminal, so only echo log lines
        // there when stdout is a TTY
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    builder.init();
}
