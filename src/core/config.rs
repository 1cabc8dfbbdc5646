//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.ridetag/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use uuid::Uuid;

use crate::ReaderKind;
use crate::core::messages::MessageTemplates;
use crate::nfc::hex::parse_hex;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RidetagConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub pcsc: PcscConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub reader: Option<ReaderKind>,
    pub return_delay_secs: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub device_id: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MessagesConfig {
    pub not_sent: Option<String>,
    pub sent: Option<String>,
    pub failed: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SimulatorConfig {
    pub present: Option<bool>,
    pub enabled: Option<bool>,
    pub settings_available: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PcscConfig {
    pub reader: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ENDPOINT_URL: &str = "https://iot-dojo-bus.appspot.com/api/ride_record/";
pub const DEFAULT_DEVICE_ID: &str = "4ac74819-d310-4f74-860b-70dff5063527";
pub const DEFAULT_RETURN_DELAY_SECS: f64 = 3.0;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SIMULATED_TAGS: [&str; 2] = ["deadbeef", "04a32b"];

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorSettings {
    pub present: bool,
    pub enabled: bool,
    pub settings_available: bool,
    pub tags: Vec<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub reader: ReaderKind,
    pub endpoint_url: String,
    pub device_id: Uuid,
    pub request_timeout: Duration,
    pub return_delay: Duration,
    pub messages: MessageTemplates,
    pub simulator: SimulatorSettings,
    pub pcsc_reader: Option<String>,
}

/// Values taken from CLI flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub reader: Option<ReaderKind>,
    pub endpoint: Option<String>,
    pub device_id: Option<String>,
    pub return_delay_secs: Option<f64>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidDeviceId(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::InvalidDeviceId(id) => write!(f, "device id is not a UUID: {id}"),
            ConfigError::InvalidValue(msg) => write!(f, "invalid config value: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.ridetag/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ridetag").join("config.toml"))
}

/// Load config from an explicit path, or from `~/.ridetag/config.toml`.
///
/// An explicit path must exist. The default path is generated (commented out)
/// when missing, and `RidetagConfig::default()` is returned.
pub fn load_config(explicit: Option<&Path>) -> Result<RidetagConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(RidetagConfig::default());
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(RidetagConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: RidetagConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# ridetag Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# reader = "simulated"               # "simulated" or "pcsc"
# return_delay_secs = 3              # Or set RIDETAG_RETURN_DELAY_SECS

# [endpoint]
# url = "https://iot-dojo-bus.appspot.com/api/ride_record/"   # Or RIDETAG_ENDPOINT
# device_id = "4ac74819-d310-4f74-860b-70dff5063527"          # Or RIDETAG_DEVICE_ID
# timeout_secs = 10

# [messages]
# Placeholders: {id} {status} {reason} {delay} {time}
# not_sent = "Not sent yet"
# sent = "Sent: {id} (HTTP {status})\nReturning in {delay}s"
# failed = "Send failed: {id} ({reason})\nReturning in {delay}s"

# [simulator]
# present = true
# enabled = true
# settings_available = true
# tags = ["deadbeef", "04a32b"]

# [pcsc]
# reader = "ACR122"                  # Substring of the PC/SC reader name
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RidetagConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// `resolve()` with the environment supplied by `env`.
pub fn resolve_with_env<E>(
    config: &RidetagConfig,
    cli: &CliOverrides,
    env: E,
) -> Result<ResolvedConfig, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    // Reader: CLI → env → config → default
    let reader = match cli.reader {
        Some(reader) => reader,
        None => match env("RIDETAG_READER") {
            Some(name) => ReaderKind::from_str(&name, true)
                .map_err(|_| ConfigError::InvalidValue(format!("unknown reader '{name}'")))?,
            None => config.general.reader.unwrap_or_default(),
        },
    };

    // Endpoint: CLI → env → config → default
    let endpoint_url = cli
        .endpoint
        .clone()
        .or_else(|| env("RIDETAG_ENDPOINT"))
        .or_else(|| config.endpoint.url.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string());

    // Device id: CLI → env → config → default
    let device_id_text = cli
        .device_id
        .clone()
        .or_else(|| env("RIDETAG_DEVICE_ID"))
        .or_else(|| config.endpoint.device_id.clone())
        .unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string());
    let device_id = Uuid::parse_str(device_id_text.trim())
        .map_err(|_| ConfigError::InvalidDeviceId(device_id_text.clone()))?;

    // Return delay: CLI → env → config → default
    let env_delay = match env("RIDETAG_RETURN_DELAY_SECS") {
        Some(text) => Some(text.trim().parse::<f64>().map_err(|_| {
            ConfigError::InvalidValue(format!("RIDETAG_RETURN_DELAY_SECS='{text}'"))
        })?),
        None => None,
    };
    let delay_secs = cli
        .return_delay_secs
        .or(env_delay)
        .or(config.general.return_delay_secs)
        .unwrap_or(DEFAULT_RETURN_DELAY_SECS);
    let return_delay = Duration::try_from_secs_f64(delay_secs)
        .map_err(|_| ConfigError::InvalidValue(format!("return delay {delay_secs}")))?;

    let defaults = MessageTemplates::default();
    let messages = MessageTemplates {
        not_sent: config.messages.not_sent.clone().unwrap_or(defaults.not_sent),
        sent: config.messages.sent.clone().unwrap_or(defaults.sent),
        failed: config.messages.failed.clone().unwrap_or(defaults.failed),
    };

    Ok(ResolvedConfig {
        reader,
        endpoint_url,
        device_id,
        request_timeout: Duration::from_secs(
            config.endpoint.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
        return_delay,
        messages,
        simulator: resolve_simulator(&config.simulator)?,
        pcsc_reader: config.pcsc.reader.clone(),
    })
}

fn resolve_simulator(config: &SimulatorConfig) -> Result<SimulatorSettings, ConfigError> {
    let tags = match &config.tags {
        Some(tags) => tags
            .iter()
            .map(|t| {
                parse_hex(t).ok_or_else(|| ConfigError::InvalidValue(format!("tag uid '{t}'")))
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => DEFAULT_SIMULATED_TAGS
            .iter()
            .filter_map(|t| parse_hex(t))
            .collect(),
    };
    Ok(SimulatorSettings {
        present: config.present.unwrap_or(true),
        enabled: config.enabled.unwrap_or(true),
        settings_available: config.settings_available.unwrap_or(true),
        tags,
    })
}
