use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub tool: ToolConfig,
    pub split: SplitConfig,
    pub retry: RetryConfig,
}

/// Data tree layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of normalized source recordings.
    pub raw_audio: PathBuf,
    /// Per-source segment subdirectories live here.
    pub chunks: PathBuf,
    /// Root of the external tool's output trees.
    pub separated: PathBuf,
    /// Merged transcripts (and per-segment transcript dirs for repair).
    pub transcripts: PathBuf,
}

/// External per-segment tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    /// Executable invoked once per segment.
    pub program: String,
    /// Model identifier, passed as `-n <model>`.
    pub model: String,
    /// Inference device, passed as `--device <device>`.
    pub device: String,
    /// Internal chunking hint, passed as `--segment <hint>`.
    pub segment_hint: u32,
    /// Result file the tool is expected to produce under its output tree.
    pub result_file: String,
    /// Extra arguments prepended verbatim to the invocation.
    pub extra_args: Vec<String>,
}

/// Segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    /// Target segment duration in seconds; the final segment is shorter.
    pub nominal_secs: f64,
}

/// Retry policy for per-segment tool invocations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_audio: PathBuf::from(defaults::RAW_AUDIO_DIR),
            chunks: PathBuf::from(defaults::CHUNKS_DIR),
            separated: PathBuf::from(defaults::SEPARATED_DIR),
            transcripts: PathBuf::from(defaults::TRANSCRIPTS_DIR),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: defaults::TOOL_PROGRAM.to_string(),
            model: defaults::TOOL_MODEL.to_string(),
            device: defaults::TOOL_DEVICE.to_string(),
            segment_hint: defaults::TOOL_SEGMENT_HINT,
            result_file: defaults::TOOL_RESULT_FILE.to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            nominal_secs: defaults::NOMINAL_SEGMENT_SECS,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_TOOL_ATTEMPTS,
            delay_secs: defaults::RETRY_DELAY_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CHUNKSCRIBE_MODEL → tool.model
    /// - CHUNKSCRIBE_DEVICE → tool.device
    /// - CHUNKSCRIBE_PROGRAM → tool.program
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("CHUNKSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.tool.model = model;
        }

        if let Ok(device) = std::env::var("CHUNKSCRIBE_DEVICE")
            && !device.is_empty()
        {
            self.tool.device = device;
        }

        if let Ok(program) = std::env::var("CHUNKSCRIBE_PROGRAM")
            && !program.is_empty()
        {
            self.tool.program = program;
        }

        self
    }

    /// Serialize the configuration as TOML.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write this configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/chunkscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("chunkscribe")
            .join("config.toml")
    }
}
