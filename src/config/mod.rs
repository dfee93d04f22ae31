mod types;

pub use types::*;

use anyhow::{Context, Result};
use flvmeta_amf::json::properties_from_json;
use flvmeta_media::UpdateOptions;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Default config locations, in search order.
pub const DEFAULT_PATHS: [&str; 2] = ["./flvmeta.toml", "~/.config/flvmeta/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// First default config location that exists
pub fn find_default_config() -> Option<PathBuf> {
    DEFAULT_PATHS.iter().find_map(|path_str| {
        let path = PathBuf::from(shellexpand::tilde(path_str).as_ref());
        path.exists().then_some(path)
    })
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    match find_default_config() {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    for (name, value) in &config.metadata {
        if name.is_empty() {
            anyhow::bail!("Metadata field names cannot be empty");
        }
        if name.len() > u16::MAX as usize {
            let prefix: String = name.chars().take(32).collect();
            anyhow::bail!("Metadata field name '{}...' is too long", prefix);
        }
        if value.is_null() {
            tracing::warn!("Metadata field '{}' is null", name);
        }
    }

    Ok(())
}

/// Parse a `key=value` metadata field. Values that read as booleans or
/// finite numbers become those types, anything else is a string.
pub fn parse_metadata_field(s: &str) -> std::result::Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid field '{s}': expected key=value"))?;
    if key.is_empty() {
        return Err(format!("invalid field '{s}': empty key"));
    }

    let value = match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::from(n),
            _ => Value::String(raw.to_string()),
        },
    };
    Ok((key.to_string(), value))
}

/// Command-line settings layered over a [`Config`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOverrides {
    pub error_handling: Option<ErrorHandlingMode>,
    pub fields: Vec<(String, Value)>,
    pub preserve: bool,
}

impl Config {
    /// Build update options, with command-line settings taking precedence.
    pub fn update_options(
        &self,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        overrides: UpdateOverrides,
    ) -> UpdateOptions {
        let mut fields = self.metadata.clone();
        fields.extend(overrides.fields);

        let mut options = UpdateOptions::new(input, output);
        options.error_handling = overrides
            .error_handling
            .unwrap_or(self.error_handling)
            .into();
        options.preserve_metadata = overrides.preserve || self.preserve_metadata;
        options.metadata = (!fields.is_empty()).then(|| properties_from_json(&fields));
        options
    }
}
