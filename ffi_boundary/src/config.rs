//! Runtime configuration. Read once, on first use, from the TOML file
//! named by `FFI_BOUNDARY_CONFIG`. A host that never sets the variable
//! gets the defaults.

use crate::lifecycle::LogFormat;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;

/// Environment variable holding the path of the configuration file.
pub const CONFIG_ENV_VAR: &str = "FFI_BOUNDARY_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BoundaryConfig {
    /// Log output.
    pub logging: LoggingConfig,
    /// Handle table limits.
    pub handles: HandleConfig,
}

/// Log output settings, applied by `setup`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"ffi_boundary=debug"`. `RUST_LOG` wins if set.
    pub filter: String,
    /// Format used when the host passes no preference of its own.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Maximum number of live handles per table. Hitting a limit aborts, so
/// these are leak detectors rather than tuning knobs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HandleConfig {
    /// Returned strings not yet released.
    pub max_live_strings: usize,
    /// Aggregates (per aggregate type) not yet dropped.
    pub max_live_structs: usize,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            max_live_strings: 65_536,
            max_live_structs: 65_536,
        }
    }
}

impl BoundaryConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid boundary configuration")
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In {}", path.display()))
    }

    /// Load from [`CONFIG_ENV_VAR`], falling back to defaults. There is
    /// nobody to return an error to across the boundary, so a bad file
    /// is logged and ignored.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("{e:#}; using default configuration");
            eprintln!("(RUST) {e:#}; using default configuration");
            Self::default()
        })
    }
}

static CONFIG: Lazy<BoundaryConfig> = Lazy::new(BoundaryConfig::from_env);

/// The process-wide configuration.
pub fn config() -> &'static BoundaryConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = BoundaryConfig::from_toml_str("").unwrap();
        assert_eq!(config, BoundaryConfig::default());
        assert_eq!(config.handles.max_live_strings, 65_536);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = BoundaryConfig::from_toml_str(
            r#"
            [logging]
            format = "json"

            [handles]
            max_live_structs = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.handles.max_live_structs, 8);
        assert_eq!(config.handles.max_live_strings, 65_536);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = BoundaryConfig::from_toml_str("[handles]\nmax_live_widgets = 1\n").unwrap_err();
        assert!(format!("{err:#}").contains("max_live_widgets"));
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nfilter = \"ffi_boundary=trace\"").unwrap();
        let config = BoundaryConfig::load(file.path()).unwrap();
        assert_eq!(config.logging.filter, "ffi_boundary=trace");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = BoundaryConfig::load("/nonexistent/boundary.toml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/boundary.toml"));
    }
}
