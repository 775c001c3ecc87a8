//! Project configuration management for `modserve.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── serve      # [serve]
//! │   └── transform  # [transform]
//! ├── error          # ConfigError
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section        | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | `[serve]`      | Development server (interface, ports, watch)   |
//! | `[transform]`  | HTML transform (mode, response cache size)     |
//!
//! The file is optional. Values come from defaults, then the file, then the
//! command line.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{ServeSection, TransformSection};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::ServeArgs;
use crate::log;

/// Config file name, looked up in the project root.
pub const CONFIG_FILE: &str = "modserve.toml";

/// Root configuration structure representing modserve.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project root directory served at `/` (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Path of the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeSection,

    /// HTML transform settings
    #[serde(default)]
    pub transform: TransformSection,
}

impl ProjectConfig {
    /// Load configuration for the `serve` command.
    ///
    /// Reads `modserve.toml` from the project root when present, then applies
    /// command-line overrides and validates the result.
    pub fn load(args: &ServeArgs) -> Result<Self, ConfigError> {
        let root = args
            .root
            .canonicalize()
            .map_err(|err| ConfigError::Io(args.root.clone(), err))?;
        if !root.is_dir() {
            return Err(ConfigError::Validation(format!(
                "project root `{}` is not a directory",
                root.display()
            )));
        }

        let config_path = root.join(CONFIG_FILE);
        let mut config = if config_path.is_file() {
            let mut config = Self::from_path(&config_path)?;
            config.config_path = Some(config_path);
            config
        } else {
            Self::default()
        };
        config.root = root;

        config.apply_serve_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "ignoring unknown fields in {}: {}", CONFIG_FILE, ignored.join(", "));
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Apply serve-specific command-line options.
    fn apply_serve_args(&mut self, args: &ServeArgs) {
        Self::update_option(&mut self.serve.interface, args.interface.as_ref());
        Self::update_option(&mut self.serve.port, args.port.as_ref());
        Self::update_option(&mut self.serve.hmr_port, args.hmr_port.as_ref());
        Self::update_option(&mut self.serve.watch, args.watch.as_ref());
        Self::update_option(&mut self.transform.mode, args.mode.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Check values that deserialize fine but cannot be served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transform.mode.trim().is_empty() {
            return Err(ConfigError::Validation(
                "[transform] mode must not be empty".into(),
            ));
        }
        if self.transform.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "[transform] cache_capacity must be at least 1".into(),
            ));
        }
        if self.serve.watch && self.serve.port != 0 && self.serve.port == self.serve.hmr_port {
            return Err(ConfigError::Validation(format!(
                "[serve] port and hmr_port must differ (both are {})",
                self.serve.port
            )));
        }
        Ok(())
    }
}

/// Parse config and fail on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
