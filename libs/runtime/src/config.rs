use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::resolve_home_dir;

/// Environment prefix for layered overrides,
/// e.g. `LICENSE_SWITCH__MODULES__LICENSE_SWITCH__GRAPH__TENANT`.
pub const ENV_PREFIX: &str = "LICENSE_SWITCH__";

const DEFAULT_SUBDIR: &str = ".license-switch";

/// Main application configuration with strongly-typed global sections
/// and a flexible per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base directory for relative log paths; normalized to an absolute path on load.
    #[serde(default)]
    pub home_dir: String,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
    /// Per-module configuration bag: module_name → arbitrary JSON/YAML value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/license-switch.log", empty disables the file sink
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>, // How many rotated files to keep
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/license-switch.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // Empty => $HOME/.license-switch (%APPDATA% on Windows)
            home_dir: String::new(),
            logging: Some(default_logging_config()),
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `home_dir` into an absolute path and creates the directory.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let path = config_path.as_ref();
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }

        // Optional sections stay None unless YAML/ENV provide them.
        let base = AppConfig {
            home_dir: String::new(),
            logging: None,
            modules: HashMap::new(),
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| format!("Failed to parse yaml config {}", path.display()))?;

        config.normalize_home_dir()?;
        Ok(config)
    }

    /// Load configuration from file or fall back to defaults layered with environment variables.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        use figment::{
            providers::{Env, Serialized},
            Figment,
        };

        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c: AppConfig = Figment::new()
                    .merge(Serialized::defaults(Self::default()))
                    .merge(Env::prefixed(ENV_PREFIX).split("__"))
                    .extract()
                    .context("Failed to extract config from environment")?;
                c.normalize_home_dir()?;
                Ok(c)
            }
        }
    }

    /// Serialize configuration to YAML with secret-looking values masked.
    pub fn to_yaml(&self) -> Result<String> {
        let mut redacted = self.clone();
        for value in redacted.modules.values_mut() {
            redact_secrets(value);
        }
        serde_yaml::to_string(&redacted).context("Failed to serialize config to YAML")
    }

    /// Typed view of one module's section; a missing section yields `T::default()`.
    pub fn module_config<T>(&self, module_name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(module_name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("Invalid configuration for module '{module_name}'")),
            None => Ok(T::default()),
        }
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            default_section.console_level = match args.verbose {
                0 => default_section.console_level.clone(), // keep
                1 => "debug".to_string(),
                _ => "trace".to_string(),
            };
        }
    }

    fn normalize_home_dir(&mut self) -> Result<()> {
        let opt = if self.home_dir.trim().is_empty() {
            None
        } else {
            Some(self.home_dir.clone())
        };

        let resolved: PathBuf = resolve_home_dir(opt, DEFAULT_SUBDIR, /*create*/ true)
            .context("home_dir normalization failed")?;

        self.home_dir = resolved.to_string_lossy().to_string();
        Ok(())
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

fn redact_secrets(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                let k = key.to_ascii_lowercase();
                if k.contains("secret") || k.contains("password") {
                    *v = serde_json::Value::String("***".to_string());
                } else {
                    redact_secrets(v);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_secrets),
        _ => {}
    }
}
