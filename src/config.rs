use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::models::BreakdownMode;

/// Configuration for the kudos ledger service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Caller authentication
    pub auth: AuthConfig,
    /// Kudos reporting behaviour
    pub kudos: KudosConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, uses in-memory store)
    pub postgres_enabled: bool,
    /// Connection pool size
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Emit span open/close events for requests
    pub log_requests: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// (login, token) pairs accepted as bearer tokens
    #[serde(skip_serializing)]
    pub tokens: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KudosConfig {
    /// Shape of the per-skill sponsor breakdown on proof summaries
    pub breakdown_mode: BreakdownMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: "postgresql://localhost:5432/kudos".to_string(),
            postgres_enabled: false,
            max_connections: 10,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                log_requests: false,
            },
            auth: AuthConfig::default(),
            kudos: KudosConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("KUDOS_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = env::var("KUDOS_PORT") {
            config.server.port = port.parse().context("Invalid KUDOS_PORT value")?;
        }

        if let Ok(url) = env::var("KUDOS_POSTGRES_URL") {
            config.database.postgres_url = url;
        }

        if let Ok(enabled) = env::var("KUDOS_POSTGRES_ENABLED") {
            config.database.postgres_enabled = enabled
                .parse()
                .context("Invalid KUDOS_POSTGRES_ENABLED value")?;
        }

        if let Ok(max) = env::var("KUDOS_POSTGRES_MAX_CONNECTIONS") {
            config.database.max_connections = max
                .parse()
                .context("Invalid KUDOS_POSTGRES_MAX_CONNECTIONS value")?;
        }

        if let Ok(level) = env::var("KUDOS_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(log_requests) = env::var("KUDOS_LOG_REQUESTS") {
            config.logging.log_requests = log_requests
                .parse()
                .context("Invalid KUDOS_LOG_REQUESTS value")?;
        }

        if let Ok(tokens) = env::var("KUDOS_API_TOKENS") {
            config.auth.tokens =
                parse_token_pairs(&tokens).context("Invalid KUDOS_API_TOKENS value")?;
        }

        if let Ok(mode) = env::var("KUDOS_BREAKDOWN_MODE") {
            config.kudos.breakdown_mode = mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid KUDOS_BREAKDOWN_MODE value")?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Log settings that are legal but probably not intended
    pub fn warn_on_risky_settings(&self) {
        if self.auth.tokens.is_empty() {
            warn!("No API tokens configured - every authenticated call will be rejected");
        }
        if self.kudos.breakdown_mode == BreakdownMode::ByAmount {
            warn!("Amount-keyed kudos breakdown enabled - equal awards per skill collapse");
        }
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(anyhow::anyhow!("Server host cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be non-zero"));
        }

        if self.database.postgres_enabled {
            if self.database.postgres_url.is_empty() {
                return Err(anyhow::anyhow!("PostgreSQL URL cannot be empty"));
            }
            if self.database.max_connections == 0 {
                return Err(anyhow::anyhow!("PostgreSQL pool size must be non-zero"));
            }
        }

        for (login, token) in &self.auth.tokens {
            if token.len() < 16 {
                return Err(anyhow::anyhow!(
                    "Token for {} is too short (minimum 16 characters)",
                    login
                ));
            }
        }

        Ok(())
    }
}

/// Parse `login:token` pairs separated by commas
pub fn parse_token_pairs(raw: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (login, token) = entry.split_once(':').ok_or_else(|| {
            anyhow::anyhow!("expected login:token, got {}", sanitize_for_logging(entry))
        })?;
        let (login, token) = (login.trim(), token.trim());
        if login.is_empty() || token.is_empty() {
            return Err(anyhow::anyhow!(
                "empty login or token in entry {}",
                sanitize_for_logging(entry)
            ));
        }
        pairs.push((login.to_string(), token.to_string()));
    }
    Ok(pairs)
}

/// Mask a secret for logging
pub fn sanitize_for_logging(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
