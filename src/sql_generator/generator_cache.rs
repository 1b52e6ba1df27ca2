/// Memoising source of generated aggregate queries
///
/// Generated SQL depends only on the aggregate definition and the generator
/// configuration, so it is computed once per aggregate and shared.
///
/// # Concurrency
///
/// Lookups take a read lock. Generation runs outside any lock, so two
/// threads missing on the same aggregate may both generate; the first
/// insert wins and both callers receive that entry.
///
/// # Configuration
///
/// Environment variables:
/// - `AGGREGATE_SQL_CACHE_ENABLED` (default: true)
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use log::{debug, trace};

use super::errors::GeneratorError;
use super::{AnalyticSqlGenerator, GeneratedQuery};
use crate::aggregate_catalog::aggregate_schema::AggregateSchema;

/// Configuration for the generator cache
#[derive(Debug, Clone)]
pub struct GeneratorCacheConfig {
    /// Enable or disable caching
    pub enabled: bool,
}

impl Default for GeneratorCacheConfig {
    fn default() -> Self {
        GeneratorCacheConfig { enabled: true }
    }
}

impl GeneratorCacheConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("AGGREGATE_SQL_CACHE_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);

        GeneratorCacheConfig { enabled }
    }
}

/// Generated queries are keyed by aggregate name only. A schema whose
/// definition changed under the same name keeps receiving the old SQL until
/// that name is passed to [`SqlGeneratorSource::invalidate`] or the cache is
/// cleared.
pub struct SqlGeneratorSource {
    generator: AnalyticSqlGenerator,
    /// Generated queries keyed by aggregate name
    cache: RwLock<HashMap<String, Arc<GeneratedQuery>>>,
    config: GeneratorCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SqlGeneratorSource {
    pub fn new(generator: AnalyticSqlGenerator, config: GeneratorCacheConfig) -> Self {
        SqlGeneratorSource {
            generator,
            cache: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a source with the default generator and cache configuration
    pub fn with_defaults() -> Self {
        Self::new(AnalyticSqlGenerator::default(), GeneratorCacheConfig::default())
    }

    pub fn generator(&self) -> &AnalyticSqlGenerator {
        &self.generator
    }

    /// Cached query for the aggregate, generated on first access
    ///
    /// The lookup key is `schema.name()`; the rest of the definition is not
    /// compared against the cached entry.
    pub fn get_or_generate(
        &self,
        schema: &AggregateSchema,
    ) -> Result<Arc<GeneratedQuery>, GeneratorError> {
        if !self.config.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::new(self.generator.generate(schema)?));
        }

        if let Some(cached) = self.get(schema.name()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("SqlGeneratorSource: hit for {}", schema.name());
            return Ok(cached);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("SqlGeneratorSource: miss for {}, generating", schema.name());
        let generated = Arc::new(self.generator.generate(schema)?);

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        let entry = cache
            .entry(schema.name().to_string())
            .or_insert(generated);
        Ok(Arc::clone(entry))
    }

    /// Cached query for the aggregate, without generating
    pub fn get(&self, aggregate: &str) -> Option<Arc<GeneratedQuery>> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache.get(aggregate).cloned()
    }

    /// Drop the cached query of one aggregate, e.g. after its mapping changed
    pub fn invalidate(&self, aggregate: &str) -> bool {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.remove(aggregate).is_some()
    }

    /// Clear entire cache
    pub fn clear(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    /// Get cache metrics
    pub fn metrics(&self) -> CacheMetrics {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: cache.len(),
        }
    }
}

/// Cache metrics for monitoring
#[derive(Debug, Clone, PartialEq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheMetrics {
    /// Calculate cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
