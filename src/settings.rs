/* Configuration management */
use crate::catalog::{CatalogItem, builtin_catalog};
use crate::cli::Cli;
use crate::proxy::Proxies;
use crate::{DEFAULT_OUTPUT_DIR, DEFAULT_THROTTLE_MS, DEFAULT_TIMEOUT_SECS};
use config::Config;
use directories::BaseDirs;
use log::{debug, error, warn};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

const CONFIG_FILENAME: &str = "eid.toml";

/// Stores settings read from a configuration file, the environment
/// and the command line. Every field is optional: a missing value
/// falls back to the compiled in default.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub output_dir: Option<String>,
    /// milliseconds
    pub throttle: Option<u64>,
    /// seconds
    pub timeout: Option<u64>,
    pub proxies: Option<Proxies>,
    pub catalog: Option<Vec<CatalogItem>>,
}

// Configuration file to read: the one given on the command
// line or eid.toml in the user's configuration directory.
fn config_filename(cli: &Cli) -> Option<String> {
    match &cli.config {
        Some(config) => match shellexpand::full(config) {
            Ok(conf) => Some(conf.into_owned()),
            Err(e) => {
                error!("Error expanding {config}: {e}");
                exit(1);
            }
        },
        None => match BaseDirs::new() {
            Some(base_dirs) => Some(base_dirs.config_dir().join(CONFIG_FILENAME).to_string_lossy().into_owned()),
            None => {
                warn!("Unable to get $HOME directory: no configuration file used");
                None
            }
        },
    }
}

impl Settings {
    /// Deserializes (if possible) the whole configuration file that
    /// may have been specified in the command line, then applies
    /// `EID_*` environment variables and command line options.
    #[must_use]
    pub fn from_config(cli: &Cli) -> Self {
        let mut builder = Config::builder();
        if let Some(config_filename) = config_filename(cli) {
            debug!("Reading configuration from {config_filename}");
            builder = builder.add_source(config::File::with_name(&config_filename).required(false));
        }

        let config = match builder.add_source(config::Environment::with_prefix("EID")).build() {
            Ok(conf) => conf,
            Err(e) => {
                error!("Error: {e}");
                exit(1);
            }
        };

        let mut settings = match config.try_deserialize::<Settings>() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Error deserializing: {e}");
                exit(1);
            }
        };

        // To give the command line options the latest word
        if let Some(output_dir) = &cli.output_dir {
            settings.output_dir = Some(output_dir.to_string());
        }
        if let Some(throttle) = cli.throttle {
            settings.throttle = Some(throttle);
        }
        if let Some(timeout) = cli.timeout {
            settings.timeout = Some(timeout);
        }

        settings
    }

    /// Output directory with `~` and environment variables expanded
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        let output_dir = self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR);
        match shellexpand::full(output_dir) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                warn!("Error expanding {output_dir}: {e}");
                PathBuf::from(output_dir)
            }
        }
    }

    #[must_use]
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle.unwrap_or(DEFAULT_THROTTLE_MS))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Proxies from the configuration file, or from the environment
    /// when the file does not declare any
    #[must_use]
    pub fn proxies(&self) -> Proxies {
        match &self.proxies {
            Some(proxies) if !proxies.is_empty() => proxies.clone(),
            _ => Proxies::from_env(),
        }
    }

    /// The configured catalog, or the built-in one
    #[must_use]
    pub fn catalog(&self) -> Vec<CatalogItem> {
        match &self.catalog {
            Some(catalog) => catalog.clone(),
            None => builtin_catalog(),
        }
    }
}

#[cfg(test)]
fn test_cli(config: &str, output_dir: Option<&str>, throttle: Option<u64>) -> Cli {
    use clap_verbosity_flag::Verbosity;

    Cli {
        config: Some(config.to_string()),
        output_dir: output_dir.map(str::to_string),
        throttle,
        timeout: None,
        verbose: Verbosity::new(0, 0),
    }
}

// Tests that the test configuration has been correctly parsed
#[test]
fn test_settings_from_config() {
    let cli = test_cli("test_data/eid.toml", None, None);

    let settings = Settings::from_config(&cli);

    assert_eq!(settings.output_dir, Some("/var/tmp/eid".to_string()));
    assert_eq!(settings.throttle(), Duration::from_millis(250));
    assert_eq!(settings.timeout(), Duration::from_secs(10));

    let catalog = settings.catalog();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[1].id, "item2");
    assert_eq!(catalog[1].images.len(), 2);

    let proxies = settings.proxies();
    assert_eq!(proxies.https, Some("http://proxy.example.com:3128".to_string()));
}

// Tests cli precedence
#[test]
fn test_output_dir_settings_from_cli() {
    let cli = test_cli("test_data/eid.toml", Some("/srv/images"), Some(0));

    let settings = Settings::from_config(&cli);
    assert_eq!(settings.output_dir(), PathBuf::from("/srv/images"));
    assert_eq!(settings.throttle(), Duration::ZERO);
}

// Tests defaults
#[test]
fn test_settings_default() {
    let cli = test_cli("test_data/empty.toml", None, None);

    let settings = Settings::from_config(&cli);
    assert_eq!(settings.output_dir(), PathBuf::from(DEFAULT_OUTPUT_DIR));
    assert_eq!(settings.throttle(), Duration::from_millis(500));
    assert_eq!(settings.timeout(), Duration::from_secs(30));
    assert_eq!(settings.catalog(), builtin_catalog());
}
