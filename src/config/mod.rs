//! Configuration loading.
//!
//! This module turns a Hyprland-style config file into what the engine
//! needs: the list of bindings and the handful of options the engine reads.
//!
//! - **Bindings**: every `bind*` line, in file order, tagged with the
//!   `submap = ...` section it appears in
//! - **Options**: `binds:scroll_event_delay`, `binds:disable_keybind_grabbing`
//!   and the `input:kb_*` layout options; everything else is ignored
//! - **Variables**: `$name = value` definitions are substituted first
//!
//! # Example
//!
//! ```no_run
//! use hypr_bind_engine::config::ConfigManager;
//!
//! let manager = ConfigManager::new("~/.config/hypr/hyprland.conf".into())?;
//! let loaded = manager.load()?;
//!
//! println!("{} bindings", loaded.bindings.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod watcher;

pub use error::ConfigError;
pub use watcher::FileWatcher;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::parser::{parse_config, OptionEntry};
use crate::core::translator::LayoutSpec;
use crate::core::types::Binding;

/// Default debounce between wheel events, in milliseconds
pub const DEFAULT_SCROLL_EVENT_DELAY_MS: u64 = 300;

/// Options the engine reads.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// `binds:scroll_event_delay`
    pub scroll_event_delay_ms: u64,
    /// `binds:disable_keybind_grabbing`: shortcut inhibitors are ignored
    pub disable_keybind_grabbing: bool,
    /// `input:kb_*`
    pub layout: LayoutSpec,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scroll_event_delay_ms: DEFAULT_SCROLL_EVENT_DELAY_MS,
            disable_keybind_grabbing: false,
            layout: LayoutSpec::default(),
        }
    }
}

impl EngineConfig {
    /// Applies one option line. Options the engine does not read are skipped.
    pub fn apply_option(&mut self, entry: &OptionEntry) -> Result<(), ConfigError> {
        let value = entry.value.trim();
        let invalid = || ConfigError::InvalidValue {
            key: entry.key.clone(),
            value: entry.value.clone(),
            line: entry.line,
        };

        match entry.key.as_str() {
            "binds:scroll_event_delay" => {
                self.scroll_event_delay_ms = value.parse().map_err(|_| invalid())?;
            }
            "binds:disable_keybind_grabbing" => {
                self.disable_keybind_grabbing = parse_bool(value).ok_or_else(invalid)?;
            }
            "input:kb_file" => {
                self.layout.file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(shellexpand::tilde(value).as_ref()))
                };
            }
            "input:kb_rules" => self.layout.rules = value.to_string(),
            "input:kb_model" => self.layout.model = value.to_string(),
            "input:kb_layout" => self.layout.layout = value.to_string(),
            "input:kb_variant" => self.layout.variant = value.to_string(),
            "input:kb_options" => self.layout.options = value.to_string(),
            _ => return Ok(()),
        }

        debug!("Config option {} = {}", entry.key, value);
        Ok(())
    }
}

/// Hyprland accepts several spellings for booleans
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Everything a config file provides to the engine
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: EngineConfig,
    pub bindings: Vec<Binding>,
}

/// Parses config text into options and bindings.
pub fn load_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    let parsed = parse_config(content)?;

    let mut config = EngineConfig::default();
    for entry in &parsed.options {
        config.apply_option(entry)?;
    }

    Ok(LoadedConfig {
        config,
        bindings: parsed.bindings,
    })
}

/// Reads a Hyprland config file from disk.
#[derive(Debug)]
pub struct ConfigManager {
    /// Path to the config file, tilde-expanded.
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the given config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist and
    /// `ConfigError::InvalidPath` if the path cannot be expanded.
    pub fn new(config_path: PathBuf) -> Result<Self, ConfigError> {
        let raw = config_path
            .to_str()
            .ok_or_else(|| ConfigError::InvalidPath(config_path.clone()))?;
        let config_path = PathBuf::from(shellexpand::tilde(raw).as_ref());

        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path));
        }

        // Allowed, but worth knowing about when a reload does not pick up edits
        if config_path.read_link().is_ok() {
            warn!("Config file is a symlink: {}", config_path.display());
        }

        Ok(Self { config_path })
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the current configuration file content.
    pub fn read_config(&self) -> Result<String, ConfigError> {
        Ok(fs::read_to_string(&self.config_path)?)
    }

    /// Reads and parses the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for syntax errors (with the line
    /// number) and `ConfigError::InvalidValue` for unusable option values.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let content = self.read_config()?;
        let loaded = load_from_str(&content)?;

        debug!(
            "Loaded {} bindings from {}",
            loaded.bindings.len(),
            self.config_path.display()
        );

        Ok(loaded)
    }
}

#[cfg(test)]
mod tests;
