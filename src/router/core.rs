use crate::request::ParamVec;
use crate::spec::RouteMeta;
use http::Method;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a request could not be resolved to a spec operation.
///
/// Both variants are surfaced to the client as HTTP 400 with the resolver's
/// error text as the body.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no matching operation was found for {method} {path}")]
    NotFound { method: Method, path: String },
    #[error("method {method} is not allowed for {path}")]
    MethodNotAllowed { method: Method, path: String },
}

/// Result of successfully matching a request path to an operation.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched operation metadata (Arc to avoid expensive clones)
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `"123"`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: if duplicate parameter names exist
    /// at different path depths, the deepest occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Matches HTTP requests against the spec's path templates.
///
/// Each template (`/pets/{id}`) is compiled into an anchored regex once at
/// construction. The router owns no per-request state and is safe for
/// unlimited concurrent lookups.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<(Method, Regex, Arc<RouteMeta>, Vec<Arc<str>>)>,
    base_path: String,
}

impl Router {
    /// Build a router from the spec's route metadata.
    ///
    /// Returns an error if a path template cannot be compiled, so a
    /// malformed spec is caught at startup rather than at request time.
    pub fn new(routes: Vec<RouteMeta>) -> anyhow::Result<Self> {
        let supported_methods = [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
            Method::HEAD,
            Method::TRACE,
        ];

        let routes: Vec<RouteMeta> = routes
            .into_iter()
            .filter(|r| supported_methods.contains(&r.method))
            .collect();

        let base_path = routes
            .first()
            .map(|r| r.base_path.clone())
            .unwrap_or_default();

        let mut compiled = Vec::with_capacity(routes.len());
        for route in routes {
            let full_path = format!("{}{}", base_path, route.path_pattern);
            let (regex, param_names) = Self::path_to_regex(&full_path)?;
            let method = route.method.clone();
            compiled.push((method, regex, Arc::new(route), param_names));
        }

        info!(
            routes_count = compiled.len(),
            base_path = %base_path,
            "Routing table loaded"
        );

        Ok(Self {
            routes: compiled,
            base_path,
        })
    }

    /// Number of routable operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a request to an operation, extracting path parameters.
    ///
    /// A path that matches some template with a different method reports
    /// `MethodNotAllowed`; a path matching nothing reports `NotFound`.
    pub fn find_route(&self, method: &Method, path: &str) -> Result<RouteMatch, RouteError> {
        debug!(method = %method, path = %path, "Route match attempt");

        let mut path_matched = false;
        for (route_method, regex, meta, param_names) in &self.routes {
            let caps = match regex.captures(path) {
                Some(c) => c,
                None => continue,
            };
            path_matched = true;
            if route_method != method {
                continue;
            }

            let mut path_params = ParamVec::new();
            for (i, name) in param_names.iter().enumerate() {
                if let Some(m) = caps.get(i + 1) {
                    path_params.push((Arc::clone(name), m.as_str().to_string()));
                }
            }

            info!(
                method = %method,
                path = %path,
                route_pattern = %meta.path_pattern,
                path_params = ?path_params,
                "Route matched"
            );
            return Ok(RouteMatch {
                route: Arc::clone(meta),
                path_params,
            });
        }

        warn!(
            method = %method,
            path = %path,
            path_matched = path_matched,
            "No route matched"
        );
        if path_matched {
            Err(RouteError::MethodNotAllowed {
                method: method.clone(),
                path: path.to_string(),
            })
        } else {
            Err(RouteError::NotFound {
                method: method.clone(),
                path: path.to_string(),
            })
        }
    }

    /// Convert a path template like `/users/{id}` into an anchored regex
    /// `^/users/([^/]+)$` and the ordered parameter names `["id"]`.
    ///
    /// Literal segments are regex-escaped so template text can never be
    /// interpreted as a pattern.
    pub(crate) fn path_to_regex(path: &str) -> anyhow::Result<(Regex, Vec<Arc<str>>)> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 5);
        pattern.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') {
                let param_name = segment.trim_start_matches('{').trim_end_matches('}');
                pattern.push_str("/([^/]+)");
                param_names.push(Arc::from(param_name));
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        let regex = Regex::new(&pattern)?;

        Ok((regex, param_names))
    }
}
