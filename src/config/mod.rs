use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Address of the GraphQL endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/graphql";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: Url,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the persisted token; `None` means the per-user default
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub default_filter: String,
    /// Log every GraphQL error entry, not only the classification
    pub log_graphql_errors: bool,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
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
        // API overrides
        if let Ok(v) = env::var("FERRETERIA_API_URL") {
            match Url::parse(&v) {
                Ok(url) => self.api.endpoint = url,
                Err(e) => tracing::warn!("Ignoring FERRETERIA_API_URL '{}': {}", v, e),
            }
        }
        if let Ok(v) = env::var("FERRETERIA_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("FERRETERIA_CLI_CONFIG_DIR") {
            self.session.store_dir = Some(PathBuf::from(v));
        }

        // Logging overrides
        if let Ok(v) = env::var("FERRETERIA_LOG_GRAPHQL_ERRORS") {
            self.logging.log_graphql_errors = v.parse().unwrap_or(self.logging.log_graphql_errors);
        }

        self
    }

    fn base(environment: Environment, timeout_secs: u64, filter: &str, log_errors: bool) -> Self {
        Self {
            environment,
            api: ApiConfig {
                endpoint: default_endpoint(),
                timeout_secs,
                user_agent: format!("ferre/{}", env!("CARGO_PKG_VERSION")),
            },
            session: SessionConfig { store_dir: None },
            logging: LoggingConfig {
                default_filter: filter.to_string(),
                log_graphql_errors: log_errors,
            },
        }
    }

    pub fn development() -> Self {
        Self::base(Environment::Development, 30, "ferreteria_console=debug,ferre=debug", true)
    }

    pub fn staging() -> Self {
        Self::base(Environment::Staging, 15, "ferreteria_console=info", true)
    }

    pub fn production() -> Self {
        Self::base(Environment::Production, 10, "ferreteria_console=warn", false)
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
