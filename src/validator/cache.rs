//! Thread-safe cache of compiled JSON Schema validators.
//!
//! Compiling a validator is far more expensive than running it, so every
//! schema in the spec is compiled once when the middleware is constructed
//! and shared behind `Arc` for the life of the process. The specification
//! is immutable after construction, so entries never need invalidation.
//!
//! Set `OASGATE_SCHEMA_CACHE=off` to compile on demand instead (useful when
//! bisecting validation behavior).

use crate::spec::RouteMeta;
use jsonschema::Validator;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

#[derive(Clone)]
pub struct ValidatorCache {
    /// Key format: `{operation_key}:{kind}` where kind is `body` or
    /// `param:{location}:{name}`
    cache: Arc<RwLock<HashMap<String, Arc<Validator>>>>,
    enabled: bool,
}

impl ValidatorCache {
    pub fn new(enabled: bool) -> Self {
        info!(enabled = enabled, "Initializing JSON Schema validator cache");
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            enabled,
        }
    }

    /// Read the `OASGATE_SCHEMA_CACHE` environment knob (anything but
    /// `off`/`0`/`false` keeps the cache on).
    #[must_use]
    pub fn from_env() -> Self {
        let enabled = !matches!(
            std::env::var("OASGATE_SCHEMA_CACHE").as_deref(),
            Ok("off") | Ok("0") | Ok("false")
        );
        Self::new(enabled)
    }

    /// Cache key for a route's request-body validator.
    #[must_use]
    pub fn body_key(route: &RouteMeta) -> String {
        format!("{}:body", route.operation_key())
    }

    /// Cache key for one parameter's validator.
    #[must_use]
    pub fn param_key(route: &RouteMeta, location: &str, name: &str) -> String {
        format!("{}:param:{}:{}", route.operation_key(), location, name)
    }

    /// Get a cached validator or compile and cache one.
    ///
    /// Compilation errors are returned, not swallowed; after a successful
    /// [`ValidatorCache::precompile`] they cannot occur on the request path.
    pub fn get_or_compile(&self, key: &str, schema: &Value) -> anyhow::Result<Arc<Validator>> {
        if !self.enabled {
            let compiled = jsonschema::validator_for(schema)
                .map_err(|e| anyhow::anyhow!("failed to compile schema for {key}: {e}"))?;
            return Ok(Arc::new(compiled));
        }

        {
            let cache = self.cache.read().expect("validator cache lock poisoned");
            if let Some(validator) = cache.get(key) {
                debug!(cache_key = %key, "Schema validator cache hit");
                return Ok(Arc::clone(validator));
            }
        }

        let compiled = jsonschema::validator_for(schema)
            .map_err(|e| anyhow::anyhow!("failed to compile schema for {key}: {e}"))?;
        let validator = Arc::new(compiled);
        let mut cache = self.cache.write().expect("validator cache lock poisoned");
        // Another thread may have compiled while we waited for the lock.
        if let Some(existing) = cache.get(key) {
            return Ok(Arc::clone(existing));
        }
        cache.insert(key.to_string(), Arc::clone(&validator));
        debug!(cache_key = %key, cache_size = cache.len(), "Schema validator compiled and cached");
        Ok(validator)
    }

    /// Number of validators currently cached.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.read().expect("validator cache lock poisoned").len()
    }

    /// Compile every schema the routes declare.
    ///
    /// Called at middleware construction: an invalid schema becomes a
    /// constructor error so the host can refuse to start, and the request
    /// path never pays compilation cost.
    ///
    /// Returns the number of schemas compiled.
    pub fn precompile(&self, routes: &[RouteMeta]) -> anyhow::Result<usize> {
        let mut compiled_count = 0;

        for route in routes {
            if let Some(ref schema) = route.request_schema {
                self.get_or_compile(&Self::body_key(route), schema)?;
                compiled_count += 1;
            }
            for param in &route.parameters {
                if let Some(ref schema) = param.schema {
                    let key = Self::param_key(route, &param.location.to_string(), &param.name);
                    self.get_or_compile(&key, schema)?;
                    compiled_count += 1;
                }
            }
        }

        info!(
            compiled_count = compiled_count,
            cache_size = self.size(),
            routes_count = routes.len(),
            "Precompiled schemas at startup"
        );

        Ok(compiled_count)
    }
}
