mod cli;

use flvmeta::config::{self, UpdateOverrides};
use flvmeta::exit;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The config may turn on verbose logging, so it is read before the
    // subscriber is installed. Errors are reported once logging is up.
    let loaded = config::load_config_or_default(cli.config.as_deref());
    let verbose = cli.verbose || loaded.as_ref().is_ok_and(|c| c.verbose);

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "flvmeta=debug,flvmeta_media=debug,flvmeta_probe=debug".to_string()
        } else {
            "flvmeta=info,flvmeta_media=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Update {
            input,
            output,
            error_handling,
            fields,
            preserve,
        } => loaded.and_then(|config| {
            let overrides = UpdateOverrides {
                error_handling,
                fields,
                preserve,
            };
            run_update(&config, &input, &output, overrides)
        }),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("flvmeta {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit::code_for(&e))
        }
    }
}

fn run_update(
    config: &config::Config,
    input: &Path,
    output: &Path,
    overrides: UpdateOverrides,
) -> Result<()> {
    let options = config.update_options(input, output, overrides);
    tracing::debug!("Update options: {:?}", options);

    let report = flvmeta_media::update_metadata(&options)
        .with_context(|| format!("Failed to update {:?}", input))?;

    println!("Output: {}", output.display());
    println!("Tags: {}", report.tags);
    println!("Keyframes: {}", report.keyframes);
    println!("Duration: {:.3}s", report.duration);
    println!("File size: {} bytes", report.filesize);
    if report.replaced_existing {
        println!("Replaced existing onMetaData");
    }
    if report.marker_inserted {
        println!("Inserted onLastSecond");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => config::find_default_config(),
    };

    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(&p)?;
            println!("✓ Configuration is valid");
            println!("  Verbose: {}", config.verbose);
            println!("  Error handling: {:?}", config.error_handling);
            println!("  Preserve metadata: {}", config.preserve_metadata);
            println!("  Metadata fields: {}", config.metadata.len());
        }
        None => {
            println!("No config file found, using defaults");
            let config = config::Config::default();
            println!("  Error handling: {:?}", config.error_handling);
        }
    }

    Ok(())
}
