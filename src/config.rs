use serde::{Deserialize, Serialize};

use crate::search::SearchConfig;
use crate::sync::RetryPolicy;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search index configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Event queue retry policy
    #[serde(default)]
    pub queue: RetryPolicy,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: JOB_SEARCH_)
            .add_source(
                config::Environment::with_prefix("JOB_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            queue: RetryPolicy::default(),
        }
    }
}

/// Initialize tracing with an env-filter falling back to crate-level info
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobboard_search=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::BackoffStrategy;

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("embedded defaults must parse");

        assert_eq!(config.search.max_results, 1000);
        assert_eq!(config.search.suggest_limit, 8);
        assert_eq!(config.queue.max_attempts, 5);
        assert_eq!(config.queue.backoff, BackoffStrategy::Exponential);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.search.realtime_indexing);
        assert_eq!(config.queue.base_delay_ms, 500);
    }
}
