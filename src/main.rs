//! Binary entrypoint for the Emberward CLI.
//!
//! Commands:
//! - `start [--data-dir <path>]` - run the simulation loop until Ctrl-C
//! - `init` - create a starter `config.toml` and seed data under `data/`
//! - `status` - print config, seed counts, and world-clock settings
//!
//! See the library crate docs for module-level details: `emberward::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};

use emberward::config::Config;
use emberward::engine::GameEngine;
use emberward::world::{load_characters, load_item_catalog, write_starter_seeds};

#[derive(Parser)]
#[command(name = "emberward")]
#[command(about = "A small persistent game-world simulation kernel")]
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
    /// Start the simulation loop
    Start {
        /// Seed data directory (overrides [seeds].data_dir)
        #[arg(short, long)]
        data_dir: Option<String>,
    },
    /// Initialize a new configuration and starter seed data
    Init,
    /// Show configuration and world summary
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init, which writes
    // the default config itself).
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Some(Config::load(&cli.config).await?),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Start { data_dir } => {
            let mut config = pre_config.unwrap_or_default();
            if let Some(dir) = data_dir {
                config.seeds.data_dir = dir;
            }

            let mut engine = GameEngine::new(config);
            engine.initialize()?;
            engine.run().await?;
        }
        Commands::Init => {
            if std::path::Path::new(&cli.config).exists() {
                warn!("{} already exists; leaving it untouched", cli.config);
            } else {
                Config::create_default(&cli.config).await?;
                println!("Created {}", cli.config);
            }

            let config = Config::load(&cli.config).await?;
            write_starter_seeds(&config.seeds.data_dir)?;
            println!(
                "Starter seeds written under {} (items/, characters/)",
                config.seeds.data_dir
            );
            println!("Run `emberward start` to bring the world up.");
        }
        Commands::Status => {
            let config = pre_config.unwrap_or_default();
            let catalog = load_item_catalog(config.seeds.items_dir())?;
            let characters = load_characters(config.seeds.characters_dir(), &catalog)?;
            let npcs = characters.iter().filter(|c| c.is_npc()).count();
            let players = characters.len() - npcs;

            println!("{} - {}", config.game.name, config.game.description);
            println!("Config file:   {}", cli.config);
            println!("Seed data:     {}", config.seeds.data_dir);
            println!("Item records:  {}", catalog.len());
            println!("Characters:    {} NPCs, {} players", npcs, players);
            println!(
                "World clock:   starts {}, time scale x{}",
                config.world.clock().display(),
                config.world.time_scale
            );
            println!(
                "Tick cadence:  every {:.1}s",
                config.game.tick_seconds
            );
            info!("status inspection complete");
        }
    }

    Ok(())
}

/// Configure env_logger: CLI verbosity wins over the config level, records go
/// to the log file when one is set (echoed to the console only when stdout is
/// a TTY), and records logged under the `events` target are additionally
/// appended to the game-events file.
fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;

    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    let events_file = config.as_ref().and_then(|c| c.logging.events_file.clone());

    if let Some(path) = log_file {
        match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                let file = std::sync::Arc::new(std::sync::Mutex::new(file));
                let is_tty = atty::is(atty::Stream::Stdout);

                builder.format(move |fmt, record| {
                    let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                    let line = format!("{} [{}] {}", ts, record.level(), record.args());

                    if let Ok(mut guard) = file.lock() {
                        let _ = writeln!(guard, "{}", line);
                    }

                    // Game-event records also land in their own file.
                    if record.target() == "events" {
                        if let Some(ref events_path) = events_file {
                            if let Ok(mut ef) = std::fs::OpenOptions::new()
                                .create(true)
                                .append(true)
                                .open(events_path)
                            {
                                let _ = writeln!(ef, "{}", line);
                            }
                        }
                    }

                    if is_tty {
                        writeln!(fmt, "{}", line)
                    } else {
                        Ok(())
                    }
                });
            }
            Err(err) => {
                eprintln!("Could not open log file {}: {}", path, err);
                builder.format(default_format);
            }
        }
    } else {
        builder.format(default_format);
    }

    builder.init();
}

fn default_format(
    fmt: &mut env_logger::fmt::Formatter,
    record: &log::Record<'_>,
) -> std::io::Result<()> {
    use std::io::Write;
    writeln!(
        fmt,
        "{} [{}] {}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
        record.level(),
        record.args()
    )
}
