use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,

    /// Policy for tags that are not audio, video or script data
    #[serde(default)]
    pub error_handling: ErrorHandlingMode,

    /// Keep the fields of an existing onMetaData tag
    #[serde(default)]
    pub preserve_metadata: bool,

    /// Extra fields written into onMetaData
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ErrorHandlingMode {
    /// Stop at the first invalid tag
    #[default]
    Strict,
    /// Warn and copy invalid tags unchanged
    Tolerant,
    /// Same as tolerant
    Fix,
}

impl From<ErrorHandlingMode> for flvmeta_media::ErrorHandling {
    fn from(mode: ErrorHandlingMode) -> Self {
        match mode {
            ErrorHandlingMode::Strict => Self::Strict,
            ErrorHandlingMode::Tolerant => Self::Tolerant,
            ErrorHandlingMode::Fix => Self::Fix,
        }
    }
}
