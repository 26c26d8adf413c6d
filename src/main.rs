use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use pkgident::{
    config::{Config, IgnoreConfig},
    output::{format_result_to_string, print_result, OutputFormat},
    Inventory, SourceType,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "pkgident")]
#[command(
    author,
    version,
    about = "Resolve extracted packages into the identities vulnerability matching uses"
)]
struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the packages in one or more inventory files or directories
    Resolve {
        /// Inventory JSON files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep packages matched by the ignore rules in the config file
        #[arg(long)]
        include_ignored: bool,
    },

    /// List source types and the extractors that map onto them
    Sources,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!("{err:#}; using default configuration");
        Config::default()
    });

    match cli.command {
        Commands::Resolve {
            paths,
            format,
            output,
            include_ignored,
        } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let ignore = if include_ignored {
                IgnoreConfig::default()
            } else {
                config.ignore.clone()
            };

            run_resolve(&paths, &format_str, output, &ignore, config.show_locations)
        }
        Commands::Sources => {
            list_sources();
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(&config, init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_resolve(
    paths: &[PathBuf],
    format: &str,
    output_file: Option<PathBuf>,
    ignore: &IgnoreConfig,
    show_locations: bool,
) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;

    let mut inventory = Inventory::default();
    for path in paths {
        let loaded = Inventory::load(path)
            .with_context(|| format!("Failed to load inventory from {}", path.display()))?;
        inventory.merge(loaded);
    }
    tracing::info!(
        packages = inventory.packages.len(),
        findings = inventory.generic_findings.len(),
        "loaded inventory"
    );

    let result = inventory.resolve(ignore);

    if let Some(path) = output_file {
        let content = format_result_to_string(&result, format, show_locations)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if format == OutputFormat::Table {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_result(&result, format, show_locations)?;
    }

    Ok(exit_codes::SUCCESS)
}

fn list_sources() {
    println!("Source types (first match wins, in this order):");
    println!();

    for source in SourceType::ALL {
        println!(
            "  {:<10} {:<12}",
            source.as_str(),
            source.display_name()
        );
        let extractors = source.extractors();
        if extractors.is_empty() {
            let note = match source {
                SourceType::ProjectPackage => "any other extractor",
                _ => "no extractor recorded",
            };
            println!("  {:<10} Extractors: {}", "", note);
        } else {
            println!("  {:<10} Extractors: {}", "", extractors.join(", "));
        }
        println!();
    }
}

fn handle_config(config: &Config, init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
    } else if init {
        if config_path.exists() {
            println!("{} already exists; leaving it untouched.", config_path.display());
        } else {
            Config::default().save()?;
            println!("Wrote default configuration to {}", config_path.display());
            println!();
            print!("{}", Config::generate_default_config());
        }
    } else {
        let origin = if config_path.exists() {
            config_path.display().to_string()
        } else {
            "built-in defaults (run 'pkgident config --init' to create a file)".to_string()
        };
        println!("# Effective configuration from {}", origin);
        print!("{}", toml::to_string_pretty(config)?);
    }

    Ok(())
}
