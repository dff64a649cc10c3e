//! kovl.toml configuration
//!
//! Optional per-project settings, looked up next to the build root and in
//! the working directory. Unknown keys warn with a suggestion instead of
//! failing, and `KOVL_*` environment variables override file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KovlError, KovlResult};
use crate::resolver::{LegacyBases, DEFAULT_MAX_DEPTH};
use crate::suggest::suggest_key;

/// File name looked up next to the build root
pub const CONFIG_FILE_NAME: &str = "kovl.toml";

/// Keys kovl.toml may carry; used for typo suggestions.
const KNOWN_KEYS: &[&str] = &[
    "build",
    "legacy_bases",
    "max_depth",
    "output",
    "color",
    "unicode",
];

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Resolution behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    /// Accept the legacy `bases:` field (with a deprecation warning)
    #[serde(default = "default_true")]
    pub legacy_bases: bool,

    /// Recursion limit for nested unit references
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            legacy_bases: default_true(),
            max_depth: default_max_depth(),
        }
    }
}

/// Terminal output behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// auto / always / never
    #[serde(default)]
    pub color: ColorMode,

    /// Use Unicode icons (ASCII fallback otherwise)
    #[serde(default = "default_true")]
    pub unicode: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::default(),
            unicode: default_true(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(s) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", s)?;
        }
        Ok(())
    }
}

impl Config {
    /// The resolver mode this config asks for.
    pub fn legacy_bases_mode(&self) -> LegacyBases {
        if self.build.legacy_bases {
            LegacyBases::Warn
        } else {
            LegacyBases::Deny
        }
    }

    /// Load configuration from a file, collecting unknown-key warnings.
    pub fn load(path: &Path) -> KovlResult<(Config, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path)?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let config: Config = serde_ignored::deserialize(deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| KovlError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .into_iter()
            .map(|path_str| {
                let key = path_str
                    .split('.')
                    .next_back()
                    .unwrap_or(path_str.as_str())
                    .to_string();
                let suggestion = suggest_key(&key, KNOWN_KEYS);
                ConfigWarning {
                    key,
                    file: path.to_path_buf(),
                    suggestion,
                }
            })
            .collect();

        Ok((config, warnings))
    }

    /// Load from `<root>/kovl.toml`, the working directory, or defaults.
    pub fn load_or_default(root: &Path) -> KovlResult<(Config, Vec<ConfigWarning>)> {
        for dir in [root, Path::new(".")] {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                let (config, warnings) = Config::load(&candidate)?;
                return Ok((with_env_overrides(config), warnings));
            }
        }
        Ok((with_env_overrides(Config::default()), Vec::new()))
    }
}

/// Apply environment variable overrides (KOVL_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("KOVL_LEGACY_BASES") {
        config.build.legacy_bases = val.to_lowercase() != "false" && val != "0";
    }

    if let Ok(val) = std::env::var("KOVL_MAX_DEPTH") {
        if let Ok(depth) = val.parse::<usize>() {
            config.build.max_depth = depth;
        }
    }

    if let Ok(val) = std::env::var("KOVL_COLOR") {
        config.output.color = match val.to_lowercase().as_str() {
            "always" => ColorMode::Always,
            "never" => ColorMode::Never,
            _ => ColorMode::Auto,
        };
    }

    config
}
