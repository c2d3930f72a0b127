//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 5000)
//! - `APP_ENV` - `development` or `production` (default: development)
//! - `JWT_EXPIRY_DAYS` - Token lifetime in days (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TOKEN_LIFETIME_DAYS: u32 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(&'static str, String),
}

/// Deployment environment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl Environment {
    /// Name used in logs and Sentry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    pub environment: Environment,
    /// Bearer token signing secret
    pub jwt_secret: SecretString,
    pub token_lifetime_days: u32,
    pub sentry_dsn: Option<String>,
}

impl ApiConfig {
    /// Load configuration from the process environment and `.env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails [`SecretPolicy`] checks.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let database_url = env
            .first_of(&["API_DATABASE_URL", "DATABASE_URL"])
            .map(SecretString::from)
            .ok_or(ConfigError::MissingEnvVar("API_DATABASE_URL"))?;

        let jwt_secret = env
            .get("JWT_SECRET")
            .map(SecretString::from)
            .ok_or(ConfigError::MissingEnvVar("JWT_SECRET"))?;
        SecretPolicy::default().check("JWT_SECRET", &jwt_secret)?;

        let token_lifetime_days = env.parsed("JWT_EXPIRY_DAYS")?.unwrap_or(DEFAULT_TOKEN_LIFETIME_DAYS);
        if token_lifetime_days == 0 {
            return Err(ConfigError::InvalidEnvVar("JWT_EXPIRY_DAYS", "must be at least 1".to_owned()));
        }

        Ok(Self {
            database_url,
            host: env.parsed("API_HOST")?.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: env.parsed("PORT")?.unwrap_or(DEFAULT_PORT),
            environment: env.parsed("APP_ENV")?.unwrap_or_default(),
            jwt_secret,
            token_lifetime_days,
            sentry_dsn: env.get("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Variable reader; blank values count as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }

    fn parsed<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key, e.to_string()))
            })
            .transpose()
    }
}

/// Minimum bar for signing secrets.
#[derive(Debug, Clone, Copy)]
pub struct SecretPolicy {
    pub min_length: usize,
    /// Shannon entropy, bits per character.
    pub min_entropy: f64,
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self {
            min_length: 32,
            min_entropy: 3.3,
        }
    }
}

impl SecretPolicy {
    /// Substrings that mark a copied sample value (case-insensitive).
    const PLACEHOLDERS: &'static [&'static str] = &[
        "your-",
        "changeme",
        "replace",
        "placeholder",
        "example",
        "secret",
        "password",
        "xxx",
        "todo",
        "insert",
    ];

    /// Reject short, placeholder and low-entropy secrets.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InsecureSecret` naming the first failed rule.
    pub fn check(&self, name: &'static str, secret: &SecretString) -> Result<(), ConfigError> {
        let value = secret.expose_secret();
        let insecure = |reason: String| Err(ConfigError::InsecureSecret(name, reason));

        let length = value.chars().count();
        if length < self.min_length {
            return insecure(format!("must be at least {} characters (got {length})", self.min_length));
        }

        let lower = value.to_lowercase();
        if let Some(pattern) = Self::PLACEHOLDERS.iter().find(|p| lower.contains(**p)) {
            return insecure(format!("appears to be a placeholder (contains '{pattern}')"));
        }

        let entropy = shannon_entropy(value);
        if entropy < self.min_entropy {
            return insecure(format!(
                "entropy too low ({entropy:.2} bits/char, need >= {:.1}); generate it randomly",
                self.min_entropy
            ));
        }
        Ok(())
    }
}

fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}
