//! Shared configuration for natsboard consoles.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation to the `natsboard-api` transport settings. Any host
//! embedding the tree engine loads its connection profile through this
//! crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use natsboard_api::{TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}' in the config")]
    UnknownProfile { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults applied to every profile.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named control-plane profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Page size for listing endpoints.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Stream-listing cache TTL in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    10_000
}
fn default_cache_ttl() -> u64 {
    5 * 60
}

/// A named control-plane profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Control-plane base URL (e.g., "https://console.example.com").
    pub control_plane: String,

    /// Cluster to open on startup.
    pub cluster: Option<String>,

    /// Bearer token (plaintext — prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override page size.
    pub page_size: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "natsboard", "natsboard").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("natsboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let config = figment_for(&config_path()).extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NATSBOARD_").split("_"))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Pick a profile by explicit name, falling back to the configured
/// default, then to "default".
pub fn select_profile<'a>(
    config: &'a Config,
    name: Option<&str>,
) -> Result<(&'a str, &'a Profile), ConfigError> {
    let name = name
        .or(config.default_profile.as_deref())
        .unwrap_or("default");
    config
        .profiles
        .get_key_value(name)
        .map(|(k, v)| (k.as_str(), v))
        .ok_or_else(|| ConfigError::UnknownProfile {
            profile: name.into(),
        })
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a bearer token from the credential chain:
/// env var named by the profile, then system keyring, then plaintext.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.token_env
        && let Ok(val) = std::env::var(env_name)
    {
        return Ok(SecretString::from(val));
    }

    if let Ok(entry) = keyring::Entry::new("natsboard", &format!("{profile_name}/token"))
        && let Ok(secret) = entry.get_password()
    {
        return Ok(SecretString::from(secret));
    }

    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Resolution to client settings ───────────────────────────────────

/// A profile resolved against defaults and the credential chain,
/// ready to hand to the API client.
#[derive(Debug)]
pub struct ResolvedProfile {
    pub base_url: url::Url,
    pub cluster: Option<String>,
    pub token: SecretString,
    pub transport: TransportConfig,
    pub page_size: u32,
    pub cache_ttl: Duration,
}

/// Resolve one profile into concrete client settings.
pub fn resolve_profile(
    config: &Config,
    profile: &Profile,
    profile_name: &str,
) -> Result<ResolvedProfile, ConfigError> {
    let base_url: url::Url = profile
        .control_plane
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "control_plane".into(),
            reason: format!("invalid URL: {}", profile.control_plane),
        })?;

    let token = resolve_token(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(config.defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(config.defaults.timeout));

    Ok(ResolvedProfile {
        base_url,
        cluster: profile.cluster.clone(),
        token,
        transport: TransportConfig { tls, timeout },
        page_size: profile.page_size.unwrap_or(config.defaults.page_size),
        cache_ttl: Duration::from_secs(config.defaults.cache_ttl),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml_str: &str) -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml_str))
            .extract()
            .unwrap()
    }

    const SAMPLE: &str = r#"
        default_profile = "prod"

        [defaults]
        timeout = 10

        [profiles.prod]
        control_plane = "https://console.example.com"
        cluster = "cl-1"
        token = "shh"

        [profiles.lab]
        control_plane = "https://lab.example.com"
        insecure = true
        token = "lab-token"
    "#;

    #[test]
    fn defaults_fill_unset_fields() {
        let config = parse(SAMPLE);
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.defaults.page_size, 10_000);
        assert_eq!(config.defaults.cache_ttl, 300);
    }

    #[test]
    fn select_profile_prefers_explicit_name() {
        let config = parse(SAMPLE);
        let (name, _) = select_profile(&config, Some("lab")).unwrap();
        assert_eq!(name, "lab");
    }

    #[test]
    fn select_profile_falls_back_to_default() {
        let config = parse(SAMPLE);
        let (name, profile) = select_profile(&config, None).unwrap();
        assert_eq!(name, "prod");
        assert_eq!(profile.cluster.as_deref(), Some("cl-1"));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = parse(SAMPLE);
        let err = select_profile(&config, Some("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { .. }));
    }

    #[test]
    fn resolve_profile_applies_overrides_and_defaults() {
        let config = parse(SAMPLE);
        let (name, profile) = select_profile(&config, Some("prod")).unwrap();
        let resolved = resolve_profile(&config, profile, name).unwrap();

        assert_eq!(resolved.base_url.as_str(), "https://console.example.com/");
        assert_eq!(resolved.transport.timeout, Duration::from_secs(10));
        assert_eq!(resolved.page_size, 10_000);
        assert!(matches!(resolved.transport.tls, TlsMode::System));
    }

    #[test]
    fn insecure_profile_disables_verification() {
        let config = parse(SAMPLE);
        let (name, profile) = select_profile(&config, Some("lab")).unwrap();
        let resolved = resolve_profile(&config, profile, name).unwrap();
        assert!(matches!(
            resolved.transport.tls,
            TlsMode::DangerAcceptInvalid
        ));
    }

    #[test]
    fn invalid_control_plane_url_is_rejected() {
        let config = parse(
            r#"
            [profiles.bad]
            control_plane = "not a url"
            token = "t"
        "#,
        );
        let err = resolve_profile(&config, &config.profiles["bad"], "bad").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn missing_credentials_are_an_error() {
        let config = parse(
            r#"
            [profiles.blank]
            control_plane = "https://console.example.com"
        "#,
        );
        let err = resolve_token(&config.profiles["blank"], "blank").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = parse(SAMPLE);
        let serialized = toml::to_string_pretty(&config).unwrap();
        let reparsed = parse(&serialized);
        assert_eq!(
            reparsed.default_profile.as_deref(),
            config.default_profile.as_deref()
        );
        assert_eq!(reparsed.profiles.len(), config.profiles.len());
    }

    #[test]
    fn config_file_on_disk_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config: Config = figment_for(&path).extract().unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("prod"));
    }
}
