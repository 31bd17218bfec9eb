use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Development-only fallbacks, matching what the web front end signs with locally
pub const DEFAULT_JWT_SECRET: &str = "default-secret";
pub const DEFAULT_JWT_ISSUER: &str = "default-issuer";
pub const DEFAULT_JWT_AUDIENCE: &str = "default-audience";
pub const DEFAULT_SESSION_COOKIE: &str = "auth-token";

/// Longest session lifetime accepted from configuration (one year)
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
    pub partitions: PartitionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// YAML partition table; the built-in cartuner table is used when unset
    pub table_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingSecret,
    #[error("JWT_SECRET must not use the development default in {0:?}")]
    DefaultSecret(Environment),
    #[error("session cookie name must not be empty")]
    EmptyCookieName,
    #[error("token lifetime must be greater than zero")]
    ZeroTokenTtl,
    #[error("token lifetime of {0}s exceeds the {max}s maximum", max = MAX_TOKEN_TTL_SECS)]
    TokenTtlTooLarge(u64),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("CARTUNER_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("CARTUNER_BIND") {
            self.server.bind_host = v;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v.trim().to_string();
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ISSUER") {
            self.security.jwt_issuer = v;
        }
        if let Ok(v) = env::var("JWT_AUDIENCE") {
            self.security.jwt_audience = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRATION_TIME") {
            match parse_ttl(&v) {
                Some(secs) => self.security.token_ttl_secs = secs,
                None => tracing::warn!("ignoring unparseable or out-of-range JWT_EXPIRATION_TIME '{}'", v),
            }
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Partition table override
        if let Ok(v) = env::var("PARTITION_TABLE_PATH") {
            if !v.trim().is_empty() {
                self.partitions.table_path = Some(PathBuf::from(v.trim()));
            }
        }

        self
    }

    /// Check the settings the gate cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.environment != Environment::Development
            && self.security.jwt_secret == DEFAULT_JWT_SECRET
        {
            return Err(ConfigError::DefaultSecret(self.environment));
        }
        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::EmptyCookieName);
        }
        if self.security.token_ttl_secs == 0 {
            return Err(ConfigError::ZeroTokenTtl);
        }
        if self.security.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::TokenTtlTooLarge(self.security.token_ttl_secs));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
                enable_request_logging: true,
            },
            session: SessionConfig {
                cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_issuer: DEFAULT_JWT_ISSUER.to_string(),
                jwt_audience: DEFAULT_JWT_AUDIENCE.to_string(),
                token_ttl_secs: 60 * 60, // 1 hour
            },
            partitions: PartitionConfig { table_path: None },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
                enable_request_logging: true,
            },
            session: SessionConfig {
                cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.cartuner.app".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: "cartuner-staging".to_string(),
                jwt_audience: "cartuner-web".to_string(),
                token_ttl_secs: 60 * 60,
            },
            partitions: PartitionConfig { table_path: None },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
                enable_request_logging: false,
            },
            session: SessionConfig {
                cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://cartuner.app".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: "cartuner".to_string(),
                jwt_audience: "cartuner-web".to_string(),
                token_ttl_secs: 60 * 60,
            },
            partitions: PartitionConfig { table_path: None },
        }
    }
}

/// Parse `30s`, `15m`, `1h`, `7d` or a bare number of seconds.
///
/// Zero and anything above [`MAX_TOKEN_TTL_SECS`] are rejected.
pub fn parse_ttl(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits.parse().ok()?;

    let multiplier = match unit.trim() {
        "" | "s" | "sec" | "secs" => 1,
        "m" | "min" | "mins" => 60,
        "h" | "hr" | "hrs" => 60 * 60,
        "d" | "day" | "days" => 24 * 60 * 60,
        _ => return None,
    };

    amount
        .checked_mul(multiplier)
        .filter(|secs| (1..=MAX_TOKEN_TTL_SECS).contains(secs))
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
