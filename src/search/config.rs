//! Search configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_writer_heap_size() -> usize {
    50_000_000
}

fn default_max_results() -> usize {
    1000
}

fn default_suggest_limit() -> usize {
    8
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_realtime_indexing() -> bool {
    true
}

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Path to the search index directory
    pub index_path: PathBuf,

    /// Index writer heap size in bytes (default: 50MB)
    #[serde(default = "default_writer_heap_size")]
    pub writer_heap_size: usize,

    /// Commit after every write so documents are immediately searchable
    #[serde(default = "default_realtime_indexing")]
    pub realtime_indexing: bool,

    /// Maximum candidate results considered per search
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Maximum completion suggestions returned
    #[serde(default = "default_suggest_limit")]
    pub suggest_limit: usize,

    /// Upper bound on any single engine call
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./data/search_index"),
            writer_heap_size: default_writer_heap_size(),
            realtime_indexing: default_realtime_indexing(),
            max_results: default_max_results(),
            suggest_limit: default_suggest_limit(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn index_path(mut self, path: PathBuf) -> Self {
        self.config.index_path = path;
        self
    }

    pub fn writer_heap_size(mut self, size: usize) -> Self {
        self.config.writer_heap_size = size;
        self
    }

    pub fn realtime_indexing(mut self, enabled: bool) -> Self {
        self.config.realtime_indexing = enabled;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max;
        self
    }

    pub fn suggest_limit(mut self, limit: usize) -> Self {
        self.config.suggest_limit = limit;
        self
    }

    pub fn request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.request_timeout_ms = timeout_ms;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = SearchConfigBuilder::new()
            .index_path(PathBuf::from("/tmp/idx"))
            .max_results(100)
            .realtime_indexing(false)
            .build();

        assert_eq!(config.index_path, PathBuf::from("/tmp/idx"));
        assert_eq!(config.max_results, 100);
        assert!(!config.realtime_indexing);
        assert_eq!(config.suggest_limit, default_suggest_limit());
    }
}
