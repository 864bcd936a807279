// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database, token, image storage, and CORS settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use crate::constants::{auth, ports, storage};
use anyhow::{anyhow, Context, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string. Bare paths are treated as `SQLite` files.
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` schemes
    pub fn parse_url(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains("://") && !s.starts_with("sqlite://") {
            return Err(anyhow!("Unsupported database URL scheme: {s}"));
        }
        let path_str = s
            .strip_prefix("sqlite://")
            .or_else(|| s.strip_prefix("sqlite:"))
            .unwrap_or(s);
        if path_str == ":memory:" {
            Ok(Self::Memory)
        } else if path_str.is_empty() {
            Err(anyhow!("DATABASE_URL is empty"))
        } else {
            Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            })
        }
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/recipes.db"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// Token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Whether the secret was generated for this process only
    pub ephemeral_secret: bool,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("ephemeral_secret", &self.ephemeral_secret)
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .finish()
    }
}

/// Which image store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageStoreKind {
    /// Files under a local media directory
    #[default]
    Local,
    /// Process memory (tests and demos)
    Memory,
}

impl ImageStoreKind {
    /// Parse from string
    ///
    /// # Errors
    ///
    /// Returns an error for unknown backends
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "fs" | "filesystem" => Ok(Self::Local),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(anyhow!("Unknown IMAGE_STORE backend: {other}")),
        }
    }
}

impl fmt::Display for ImageStoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Image upload and storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Storage backend
    pub store: ImageStoreKind,
    /// Directory for the local backend
    pub media_root: PathBuf,
    /// URL prefix stored images are served under
    pub url_prefix: String,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

/// Cross-origin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins; empty disables CORS headers, `*` allows any
    pub cors_origins: Vec<String>,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token configuration
    pub auth: AuthConfig,
    /// Image configuration
    pub images: ImageConfig,
    /// Security settings
    pub security: SecurityConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or a production requirement
    /// is not met
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }

        let environment = Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let http_port = env_var_or("HTTP_PORT", &ports::DEFAULT_HTTP_PORT.to_string())
            .parse()
            .context("Invalid HTTP_PORT value")?;

        let database = DatabaseConfig {
            url: DatabaseUrl::parse_url(&env_var_or(
                "DATABASE_URL",
                storage::DEFAULT_DATABASE_URL,
            ))?,
        };

        let auth = AuthConfig::from_env(environment)?;

        let images = ImageConfig {
            store: ImageStoreKind::parse(&env_var_or("IMAGE_STORE", "local"))?,
            media_root: PathBuf::from(env_var_or("MEDIA_ROOT", storage::DEFAULT_MEDIA_ROOT)),
            url_prefix: normalize_url_prefix(&env_var_or(
                "MEDIA_URL_PREFIX",
                storage::DEFAULT_MEDIA_URL_PREFIX,
            )),
            max_upload_bytes: env_var_or(
                "MAX_IMAGE_UPLOAD_BYTES",
                &storage::DEFAULT_MAX_IMAGE_UPLOAD_BYTES.to_string(),
            )
            .parse()
            .context("Invalid MAX_IMAGE_UPLOAD_BYTES value")?,
        };

        let security = SecurityConfig {
            cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "")),
        };

        let config = Self {
            http_port,
            environment,
            database,
            auth,
            images,
            security,
        };
        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Configuration suitable for tests: in-memory database and image store
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            http_port: 0,
            environment: Environment::Testing,
            database: DatabaseConfig {
                url: DatabaseUrl::Memory,
            },
            auth: AuthConfig {
                jwt_secret: generate_secret(),
                ephemeral_secret: true,
                jwt_expiry_hours: auth::DEFAULT_JWT_EXPIRY_HOURS,
            },
            images: ImageConfig {
                store: ImageStoreKind::Memory,
                media_root: PathBuf::from(storage::DEFAULT_MEDIA_ROOT),
                url_prefix: storage::DEFAULT_MEDIA_URL_PREFIX.to_owned(),
                max_upload_bytes: storage::DEFAULT_MAX_IMAGE_UPLOAD_BYTES,
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated constraint
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }
        if self.auth.jwt_secret.len() < auth::MIN_JWT_SECRET_LEN {
            return Err(anyhow!(
                "JWT_SECRET must be at least {} bytes",
                auth::MIN_JWT_SECRET_LEN
            ));
        }
        if self.environment.is_production() && self.auth.ephemeral_secret {
            return Err(anyhow!("JWT_SECRET is required in production"));
        }
        if self.images.max_upload_bytes == 0 {
            return Err(anyhow!("MAX_IMAGE_UPLOAD_BYTES must be positive"));
        }
        if self.images.url_prefix == "/" || self.images.url_prefix.starts_with("/api") {
            return Err(anyhow!(
                "MEDIA_URL_PREFIX must not be the root path or overlap /api"
            ));
        }
        if self.environment.is_production() && self.database.url.is_memory() {
            warn!("In-memory database configured in production; data will not persist");
        }
        if self.environment.is_production() && self.images.store == ImageStoreKind::Memory {
            warn!("In-memory image store configured in production; images will not persist");
        }
        Ok(())
    }

    /// Human-readable summary without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Recipe API Server Configuration:\n\
             - Environment: {}\n\
             - HTTP Port: {}\n\
             - Database: {}\n\
             - JWT Secret: {}\n\
             - JWT Expiry: {}h\n\
             - Image Store: {} ({})\n\
             - Media URL Prefix: {}\n\
             - Max Upload: {} bytes\n\
             - CORS Origins: {}",
            self.environment,
            self.http_port,
            self.database.url.to_connection_string(),
            if self.auth.ephemeral_secret {
                "ephemeral"
            } else {
                "configured"
            },
            self.auth.jwt_expiry_hours,
            self.images.store,
            self.images.media_root.display(),
            self.images.url_prefix,
            self.images.max_upload_bytes,
            if self.security.cors_origins.is_empty() {
                "disabled".to_owned()
            } else {
                self.security.cors_origins.join(", ")
            },
        )
    }
}

impl AuthConfig {
    fn from_env(environment: Environment) -> Result<Self> {
        let jwt_expiry_hours = env_var_or(
            "JWT_EXPIRY_HOURS",
            &auth::DEFAULT_JWT_EXPIRY_HOURS.to_string(),
        )
        .parse()
        .context("Invalid JWT_EXPIRY_HOURS value")?;

        let (jwt_secret, ephemeral_secret) = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => (secret, false),
            _ if environment.is_production() => {
                return Err(anyhow!("JWT_SECRET is required in production"));
            }
            _ => {
                warn!("JWT_SECRET not set; generated an ephemeral secret, tokens will not survive a restart");
                (generate_secret(), true)
            }
        };

        Ok(Self {
            jwt_secret,
            ephemeral_secret,
            jwt_expiry_hours,
        })
    }
}

/// Generate a random hex-encoded 256-bit secret
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Ensure a URL prefix has one leading slash and no trailing slash
fn normalize_url_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    format!("/{trimmed}")
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
