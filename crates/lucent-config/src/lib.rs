//! Configuration management for lucent.
//!
//! Parses `lucent.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [parse]
//! footnotes = true
//! assign_ids = false
//!
//! [render]
//! sanitize = true
//! heading_anchor = true
//! link_base = "${DOCS_BASE:-/docs/}"
//! ```
//!
//! `[parse]` maps onto [`ParseOptions`] and `[render]` onto [`Options`]; any
//! field left out keeps its default. CLI settings are applied during load
//! via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `render.link_base`
//! - `render.link_path`

mod expand;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lucent_ast::ParseOptions;
use lucent_render::Options;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "lucent.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub sanitize: Option<bool>,
    pub code_syntax_highlight: Option<bool>,
    pub auto_space: Option<bool>,
    pub link_base: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser options.
    pub parse: ParseOptions,
    /// Renderer options.
    pub render: Options,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`render.link_base`").
        field: String,
        /// Error message (e.g., "${`DOCS_BASE`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `lucent.toml` in the current directory and its parents, falling
    /// back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Search for a config file in `start` and its parents.
    #[must_use]
    pub fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(sanitize) = settings.sanitize {
            self.render.sanitize = sanitize;
        }
        if let Some(highlight) = settings.code_syntax_highlight {
            self.render.code_syntax_highlight = highlight;
        }
        if let Some(auto_space) = settings.auto_space {
            self.render.auto_space = auto_space;
        }
        if let Some(link_base) = &settings.link_base {
            self.render.link_base.clone_from(link_base);
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.node_index_start == 0 {
            return Err(ConfigError::Validation(
                "render.node_index_start must be greater than 0".to_owned(),
            ));
        }
        require_non_empty(
            &self.render.kramdown_ial_id_render_name,
            "render.kramdown_ial_id_render_name",
        )?;
        require_non_empty(
            &self.render.code_syntax_highlight_style_name,
            "render.code_syntax_highlight_style_name",
        )?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.render.link_base = expand::expand_env(&self.render.link_base, "render.link_base")?;
        self.render.link_path = expand::expand_env(&self.render.link_path, "render.link_path")?;
        Ok(())
    }

    /// Renderer options ready to share between backends.
    #[must_use]
    pub fn render_options(&self) -> Arc<Options> {
        Arc::new(self.render.clone())
    }
}
