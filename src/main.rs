//! hamconf - inspect and edit INI-style configuration files
//!
//! Run with `hamconf --help` for usage.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use hamconf::{APP_NAME, ConfigStore, FileTree, Settings, VERSION};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "Inspect and edit INI-style configuration files")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// INI file to operate on (defaults to the `default_file` setting)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Reject malformed lines instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a value
    Get {
        /// Section name
        section: String,

        /// Key name
        key: String,

        /// Value to print when the key is absent
        #[arg(long)]
        default: Option<String>,
    },

    /// Set a value and save the file
    Set {
        /// Section name
        section: String,

        /// Key name
        key: String,

        /// New value
        value: String,
    },

    /// Remove a key, or a whole section, and save the file
    Remove {
        /// Section name
        section: String,

        /// Key name (omit to remove the section)
        key: Option<String>,
    },

    /// Print the file in canonical form
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the file for malformed lines
    Check,

    /// List every file under a directory
    Files {
        /// Top-level directory
        dir: PathBuf,

        /// Sort entries by name
        #[arg(short, long)]
        sorted: bool,
    },

    /// Show tool settings
    Config {
        /// Initialize settings file with defaults
        #[arg(long)]
        init: bool,
    },
}

fn setup_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(file).with_target(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    }

    Ok(())
}

/// Resolve the target INI file from the CLI or settings
fn target_file(cli_file: Option<PathBuf>, settings: &Settings) -> Result<PathBuf> {
    settings.resolve_file(cli_file).ok_or_else(|| {
        eyre!("No INI file given; pass --file or set `default_file` in the settings")
    })
}

/// Load an existing store, or start an empty one bound to `path` when editing
fn open_store(path: &Path, strict: bool, create: bool) -> Result<ConfigStore> {
    match ConfigStore::load_with(path, strict) {
        Ok(store) => Ok(store),
        Err(e) if create && e.is_not_found() => {
            info!("Creating new configuration file {}", path.display());
            Ok(ConfigStore::new().with_strict(strict))
        }
        Err(e) => Err(e).wrap_err_with(|| format!("Failed to load {}", path.display())),
    }
}

fn main() -> Result<()> {
    // Install color-eyre error hooks
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load settings
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load settings, using defaults: {}", e);
        Settings::default()
    });

    setup_logging(cli.debug || settings.debug, settings.log_file.as_deref())?;
    debug!("Starting {} v{}", APP_NAME, VERSION);

    let strict = cli.strict || settings.strict;

    match cli.command {
        Commands::Get {
            section,
            key,
            default,
        } => {
            let path = target_file(cli.file, &settings)?;
            let store = open_store(&path, strict, false)?;

            match (store.get(&section, &key), default) {
                (Some(value), _) => println!("{}", value),
                (None, Some(default)) => println!("{}", default),
                (None, None) => {
                    store
                        .require(&section, &key)
                        .wrap_err_with(|| format!("in {}", path.display()))?;
                }
            }
        }

        Commands::Set {
            section,
            key,
            value,
        } => {
            let path = target_file(cli.file, &settings)?;
            let mut store = open_store(&path, strict, true)?;

            store.set(&section, &key, &value)?;
            store.save_to(&path)?;
            info!("Set [{}] {} = {}", section, key, value);
        }

        Commands::Remove { section, key } => {
            let path = target_file(cli.file, &settings)?;
            let mut store = open_store(&path, strict, false)?;

            let removed = match &key {
                Some(key) => store.remove_key(&section, key),
                None => store.remove_section(&section),
            };

            if removed {
                store.save()?;
                info!("Removed from {}", path.display());
            } else {
                println!("Nothing to remove.");
            }
        }

        Commands::Show { json } => {
            let path = target_file(cli.file, &settings)?;
            let store = open_store(&path, strict, false)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&store)?);
            } else {
                print!("{}", store);
            }
        }

        Commands::Check => {
            let path = target_file(cli.file, &settings)?;
            let store = ConfigStore::load_strict(&path)
                .wrap_err_with(|| format!("{} failed the check", path.display()))?;

            println!(
                "{}: OK ({} sections)",
                path.display(),
                store.section_count()
            );
        }

        Commands::Files { dir, sorted } => {
            if !dir.is_dir() {
                bail!("Not a directory: {}", dir.display());
            }

            let mut count = 0;
            for file in FileTree::new(&dir).sorted(sorted).files() {
                println!("{}", file?.display());
                count += 1;
            }
            println!("{} files found.", count);
        }

        Commands::Config { init } => {
            if init {
                Settings::default().save()?;
                println!(
                    "Settings initialized at {:?}",
                    Settings::config_file_path()?
                );
            } else {
                println!("Settings:");
                println!("{}", toml::to_string_pretty(&settings)?);
                println!("\nSettings file: {:?}", Settings::config_file_path()?);
            }
        }
    }

    Ok(())
}
