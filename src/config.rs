//! Gateway configuration loaded from TOML.
//!
//! Every field has a default, so a missing file or a partial file is valid.
//! Lookup order for the default file:
//! 1. `$XDG_CONFIG_HOME/request-gateway/config.toml`
//! 2. `$HOME/.config/request-gateway/config.toml`

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::auth::DEFAULT_TOKEN_KEY;
use crate::envelope::ResultCodes;
use crate::request::ScopeId;
use crate::scope::{DEFAULT_ALLOW_LIST, DEFAULT_SCOPE_ID, DEFAULT_SCOPE_PARAM, ScopePolicy};
use crate::session::ConfirmOptions;

const APP_DIR: &str = "request-gateway";
const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Settings shared by the gateway, the downloader and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// API base URL every relative request path is joined onto.
    pub base_url: String,
    /// JSON API request timeout.
    pub timeout_ms: u64,
    /// Download request timeout.
    pub download_timeout_ms: u64,
    /// Send cookies with download requests.
    pub with_credentials: bool,
    /// Token store key holding the access token.
    pub token_key: String,
    /// Name of the injected scope parameter.
    pub scope_param: String,
    /// Scope id used when no workspace is selected.
    pub default_scope_id: ScopeId,
    /// Paths exempt from scope injection.
    pub scope_allow_list: Vec<String>,
    /// Envelope success sentinel.
    pub success_code: i64,
    /// Envelope code for invalid or expired credentials.
    pub token_invalid_code: i64,
    /// Message shown when the server gives none.
    pub generic_error_message: String,
    pub session_expired_title: String,
    pub session_expired_message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let codes = ResultCodes::default();
        let options = ConfirmOptions::default();
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 50_000,
            download_timeout_ms: 10_000,
            with_credentials: true,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            scope_param: DEFAULT_SCOPE_PARAM.to_string(),
            default_scope_id: DEFAULT_SCOPE_ID,
            scope_allow_list: DEFAULT_ALLOW_LIST.iter().map(ToString::to_string).collect(),
            success_code: codes.success,
            token_invalid_code: codes.token_invalid,
            generic_error_message: "System error".to_string(),
            session_expired_title: "Notice".to_string(),
            session_expired_message: "This page has expired, please sign in again".to_string(),
            confirm_label: options.confirm_label,
            cancel_label: options.cancel_label,
        }
    }
}

impl GatewayConfig {
    /// Loads `path`, or the default config file when `path` is `None`.
    ///
    /// A missing default file yields defaults; an explicit path must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (resolve_default_config_path(), false),
        };
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !required && !path.exists() {
            debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        config.validate()?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Checks values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::invalid("base_url", format!("{}: {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "base_url",
                format!("expected http or https, got {}", base.scheme()),
            ));
        }
        validate_timeout("timeout_ms", self.timeout_ms)?;
        validate_timeout("download_timeout_ms", self.download_timeout_ms)?;
        if self.scope_param.trim().is_empty() {
            return Err(ConfigError::invalid("scope_param", "must not be empty"));
        }
        if self.token_key.trim().is_empty() {
            return Err(ConfigError::invalid("token_key", "must not be empty"));
        }
        if self.success_code == self.token_invalid_code {
            return Err(ConfigError::invalid(
                "token_invalid_code",
                "must differ from success_code",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }

    #[must_use]
    pub fn result_codes(&self) -> ResultCodes {
        ResultCodes {
            success: self.success_code,
            token_invalid: self.token_invalid_code,
        }
    }

    #[must_use]
    pub fn scope_policy(&self) -> ScopePolicy {
        ScopePolicy::new(
            self.scope_param.clone(),
            self.default_scope_id,
            self.scope_allow_list.iter().cloned(),
        )
    }

    #[must_use]
    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            confirm_label: self.confirm_label.clone(),
            cancel_label: self.cancel_label.clone(),
            ..ConfirmOptions::default()
        }
    }
}

fn validate_timeout(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if !(1..=MAX_TIMEOUT_MS).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("{value}. Expected range: 1..={MAX_TIMEOUT_MS}"),
        ));
    }
    Ok(())
}

/// Resolves the default config file path.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolves the default persisted token file path.
#[must_use]
pub fn resolve_default_token_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("tokens.json"))
}

fn config_dir() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join(APP_DIR))
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}
