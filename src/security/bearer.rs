use super::{SecurityProvider, SecurityRequest};
use crate::spec::SecurityScheme;

/// Static bearer token provider for `http`/`bearer` schemes.
///
/// Reads the token from the `Authorization` header, or from a cookie when
/// one is configured.
pub struct BearerProvider {
    token: String,
    cookie_name: Option<String>,
}

impl BearerProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            cookie_name: None,
        }
    }

    /// Also accept the token from the named cookie.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = Some(name.into());
        self
    }

    fn extract_token<'a>(&self, req: &'a SecurityRequest) -> Option<&'a str> {
        if let Some(name) = &self.cookie_name {
            if let Some(t) = req.get_cookie(name) {
                return Some(t);
            }
        }
        req.get_header("authorization")
            .and_then(|h| h.strip_prefix("Bearer "))
    }
}

impl SecurityProvider for BearerProvider {
    fn validate(&self, scheme: &SecurityScheme, _scopes: &[String], req: &SecurityRequest) -> bool {
        match scheme {
            SecurityScheme::Http { scheme, .. } if scheme.eq_ignore_ascii_case("bearer") => {}
            _ => return false,
        }
        self.extract_token(req) == Some(self.token.as_str())
    }
}
