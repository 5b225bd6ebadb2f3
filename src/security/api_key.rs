use super::{SecurityProvider, SecurityRequest};
use crate::spec::SecurityScheme;

/// Static API key provider for `apiKey` schemes.
///
/// Reads the credential from the header, query parameter, or cookie the
/// scheme names and compares it against the configured key.
pub struct ApiKeyProvider {
    key: String,
}

impl ApiKeyProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl SecurityProvider for ApiKeyProvider {
    fn validate(&self, scheme: &SecurityScheme, _scopes: &[String], req: &SecurityRequest) -> bool {
        let (name, location) = match scheme {
            SecurityScheme::ApiKey { name, location, .. } => (name.as_str(), location.as_str()),
            _ => return false,
        };
        let presented = match location {
            "header" => req.get_header(name),
            "query" => req.get_query(name),
            "cookie" => req.get_cookie(name),
            _ => None,
        };
        presented == Some(self.key.as_str())
    }
}
