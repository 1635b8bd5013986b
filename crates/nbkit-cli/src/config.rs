//! `.nbkit.toml` configuration files
//!
//! Precedence order (highest to lowest):
//! 1. Command-line arguments (--strict, --stderr, --html, ...)
//! 2. File passed with --config
//! 3. Project config (./.nbkit.toml)
//! 4. User config (~/.nbkit.toml)
//! 5. Built-in defaults

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of user and project config files
pub const CONFIG_FILE_NAME: &str = ".nbkit.toml";

/// Template written by `nbkit config init`
pub const CONFIG_TEMPLATE: &str = r#"# nbkit Configuration File

# Loading of .ipynb files
[load]
# Fail on cell types other than markdown and code (e.g. raw) instead of skipping them
# strict = false

# Default selection for the streams command
[streams]
# stdout = true
# stderr = false

# Defaults for the interactive command
[interactive]
# Emit a standalone HTML page instead of the script
# html = false

# Defaults for the import command
[import]
# Script format: percent or interactive
# format = "percent"

# nbformat version recorded on imported notebooks
# version = "4.5"
"#;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings for reading notebooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadConfig>,

    /// Default settings for the streams command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streams: Option<StreamsConfig>,

    /// Default settings for the interactive command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveConfig>,

    /// Default settings for the import command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Reject unknown cell types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamsConfig {
    /// Include standard output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<bool>,

    /// Include standard error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveConfig {
    /// Emit HTML instead of the script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Script format (percent or interactive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Notebook version (major.minor)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Replace `base` values with those set in `overlay`
macro_rules! overlay_fields {
    ($base:expr, $overlay:expr, $($field:ident),+) => {{
        let mut merged = $base.unwrap_or_default();
        $(
            if let Some(value) = $overlay.$field {
                merged.$field = Some(value);
            }
        )+
        Some(merged)
    }};
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            eprintln!(
                "{} Failed to parse config file: {}",
                "Error:".red().bold(),
                path.display()
            );
            eprintln!("{} {}", "Parse error:".yellow().bold(), e);
            eprintln!();
            eprintln!("{} Configuration file syntax:", "Help:".cyan().bold());
            eprintln!("  [load]");
            eprintln!("  strict = true");
            eprintln!();
            eprintln!("  Run `nbkit config init` for a complete template");
            anyhow::anyhow!("Failed to parse config file: {e}")
        })?;

        Ok(config)
    }

    /// Path of the user config (~/.nbkit.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Path of the project config (./.nbkit.toml)
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Find and load configuration files
    /// Returns (`user_config`, `project_config`)
    pub fn discover_configs() -> (Option<Self>, Option<Self>) {
        let user_config = Self::user_config_path().and_then(|path| Self::load_optional(&path, "user"));
        let project_config = Self::load_optional(&Self::project_config_path(), "project");
        (user_config, project_config)
    }

    /// Load a discovered config, warning instead of failing when it is broken
    fn load_optional(path: &Path, kind: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => {
                log::debug!("Loaded {kind} config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                eprintln!(
                    "{} Failed to load {kind} config from {}: {}",
                    "Warning:".yellow().bold(),
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Load the effective configuration
    ///
    /// An explicit `--config` file must exist and parse; discovered files are
    /// skipped with a warning when broken.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let (user_config, project_config) = Self::discover_configs();
        let explicit_config = explicit.map(Self::load_from_file).transpose()?;
        Ok(Self::merge([user_config, project_config, explicit_config]))
    }

    /// Merge configs field by field, later entries taking precedence
    pub fn merge(configs: impl IntoIterator<Item = Option<Self>>) -> Self {
        configs.into_iter().flatten().fold(Self::default(), Self::overlay)
    }

    /// Apply `other` on top of `self`
    fn overlay(self, other: Self) -> Self {
        Self {
            load: match other.load {
                Some(load) => overlay_fields!(self.load, load, strict),
                None => self.load,
            },
            streams: match other.streams {
                Some(streams) => overlay_fields!(self.streams, streams, stdout, stderr),
                None => self.streams,
            },
            interactive: match other.interactive {
                Some(interactive) => overlay_fields!(self.interactive, interactive, html),
                None => self.interactive,
            },
            import: match other.import {
                Some(import) => overlay_fields!(self.import, import, format, version),
                None => self.import,
            },
        }
    }

    /// Resolve strict loading from CLI flag or config
    pub fn strict(&self, cli_value: bool) -> bool {
        cli_value
            || self
                .load
                .as_ref()
                .and_then(|load| load.strict)
                .unwrap_or(false)
    }

    /// Resolve the stream selection from CLI flags or config
    ///
    /// Passing either flag on the command line ignores the config entirely.
    pub fn stream_flags(&self, cli_stdout: bool, cli_stderr: bool) -> (bool, bool) {
        if cli_stdout || cli_stderr {
            return (cli_stdout, cli_stderr);
        }
        let streams = self.streams.clone().unwrap_or_default();
        (
            streams.stdout.unwrap_or(true),
            streams.stderr.unwrap_or(false),
        )
    }

    /// Resolve HTML output for the interactive command
    pub fn html(&self, cli_value: bool) -> bool {
        cli_value
            || self
                .interactive
                .as_ref()
                .and_then(|interactive| interactive.html)
                .unwrap_or(false)
    }

    /// Configured import format, if any
    pub fn import_format(&self) -> Option<&str> {
        self.import.as_ref()?.format.as_deref()
    }

    /// Configured import version, if any
    pub fn import_version(&self) -> Option<&str> {
        self.import.as_ref()?.version.as_deref()
    }
}
