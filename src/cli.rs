use clap::{Parser, Subcommand};
use flvmeta::config::{parse_metadata_field, ErrorHandlingMode};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flvmeta")]
#[command(author, version, about = "FLV metadata injector")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a copy of an FLV file with computed onMetaData and onLastSecond tags
    Update {
        /// FLV file to read
        #[arg(required = true)]
        input: PathBuf,

        /// File to write; must differ from the input
        #[arg(required = true)]
        output: PathBuf,

        /// How to treat tags that are not audio, video or script data
        #[arg(long, value_enum)]
        error_handling: Option<ErrorHandlingMode>,

        /// Add a metadata field (repeatable)
        #[arg(long = "add", value_name = "KEY=VALUE", value_parser = parse_metadata_field)]
        fields: Vec<(String, Value)>,

        /// Keep the fields of an existing onMetaData tag
        #[arg(long)]
        preserve: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
