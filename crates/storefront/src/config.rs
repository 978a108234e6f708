//! Storefront configuration, read once from the environment at startup.
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `STOREFRONT_DATABASE_URL` | required | falls back to `DATABASE_URL` |
//! | `STOREFRONT_BASE_URL` | required | `https://` turns on secure cookies |
//! | `STOREFRONT_SESSION_SECRET` | required | signs the session cookie, at least 64 bytes |
//! | `STOREFRONT_HOST` | `127.0.0.1` | |
//! | `STOREFRONT_PORT` | `3000` | |
//! | `ORDER_STATUS_POLICY` | `permissive` | or `strict` |
//! | `ORDER_RESTOCK_ON_CANCEL` | `true` | |
//! | `LOG_FORMAT` | `text` | or `json` |
//! | `SENTRY_DSN` | unset | Sentry stays off without it |
//! | `SENTRY_ENVIRONMENT` | unset | |
//! | `SENTRY_SAMPLE_RATE` | `1.0` | |
//! | `SENTRY_TRACES_SAMPLE_RATE` | `0.0` | |
//!
//! Blank values count as unset.

use std::collections::HashMap;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use chirag_core::StatusPolicy;
use secrecy::SecretString;
use thiserror::Error;

const DATABASE_URL_VAR: &str = "STOREFRONT_DATABASE_URL";
const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Signed cookies need a 64-byte key.
pub const MIN_SESSION_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret copied from a template.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {var}: {reason}")]
    InvalidEnvVar { var: &'static str, reason: String },
    #[error("Insecure secret in {var}: {reason}")]
    InsecureSecret { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public URL the storefront is served from.
    pub base_url: String,
    pub session_secret: SecretString,
    pub orders: OrderConfig,
    pub log_format: LogFormat,
    /// `None` unless `SENTRY_DSN` is set.
    pub sentry: Option<SentryConfig>,
}

/// Order workflow settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderConfig {
    /// How admin status changes are checked
    pub status_policy: StatusPolicy,
    /// Return line quantities to stock when an order is cancelled
    pub restock_on_cancel: bool,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            status_policy: StatusPolicy::Permissive,
            restock_on_cancel: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: String,
    pub environment: Option<String>,
    /// Fraction of error events sent
    pub sample_rate: f32,
    /// Fraction of requests traced
    pub traces_sample_rate: f32,
}

/// Shape of the log lines written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// One flattened JSON object per event, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected text or json, got '{other}'")),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the session secret looks weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: database_url_from_env()?,
            host: parse_or("STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or("STOREFRONT_PORT", 3000)?,
            base_url: required("STOREFRONT_BASE_URL")?,
            session_secret: session_secret("STOREFRONT_SESSION_SECRET")?,
            orders: OrderConfig::from_env()?,
            log_format: parse_or("LOG_FORMAT", LogFormat::Text)?,
            sentry: SentryConfig::from_env()?,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl OrderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let restock_on_cancel = match optional("ORDER_RESTOCK_ON_CANCEL") {
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::InvalidEnvVar {
                var: "ORDER_RESTOCK_ON_CANCEL",
                reason: format!("expected true or false, got '{value}'"),
            })?,
            None => defaults.restock_on_cancel,
        };

        Ok(Self {
            status_policy: parse_or("ORDER_STATUS_POLICY", defaults.status_policy)?,
            restock_on_cancel,
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(dsn) = optional("SENTRY_DSN") else {
            return Ok(None);
        };

        Ok(Some(Self {
            dsn,
            environment: optional("SENTRY_ENVIRONMENT"),
            sample_rate: sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        }))
    }
}

/// The storefront database URL, shared with the CLI.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither `STOREFRONT_DATABASE_URL`
/// nor `DATABASE_URL` is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    optional(DATABASE_URL_VAR)
        .or_else(|| optional(FALLBACK_DATABASE_URL_VAR))
        .map(SecretString::from)
        .ok_or(ConfigError::MissingEnvVar(DATABASE_URL_VAR))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::MissingEnvVar(var))
}

fn parse_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    optional(var).map_or(Ok(default), |value| {
        value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar {
            var,
            reason: e.to_string(),
        })
    })
}

/// `true/false`, `1/0`, `yes/no` or `on/off`.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn sample_rate(var: &'static str, default: f32) -> Result<f32, ConfigError> {
    let rate: f32 = parse_or(var, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar {
            var,
            reason: format!("must be between 0.0 and 1.0 (got {rate})"),
        })
    }
}

fn session_secret(var: &'static str) -> Result<SecretString, ConfigError> {
    let value = required(var)?;
    check_secret_strength(&value).map_err(|reason| ConfigError::InsecureSecret { var, reason })?;
    Ok(SecretString::from(value))
}

/// Length first, then template leftovers, then character entropy.
fn check_secret_strength(secret: &str) -> Result<(), String> {
    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(format!(
            "must be at least {MIN_SESSION_SECRET_LENGTH} bytes (got {})",
            secret.len()
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(format!("appears to be a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}); \
             generate one with `openssl rand -base64 48`"
        ));
    }

    Ok(())
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum()
}
