use subtle::ConstantTimeEq;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-heyhi-key";

/// Outcome of comparing a provided secret with the configured key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Granted,
    Denied,
    /// No key is configured; the route policy decides what that means
    NotConfigured,
}

/// How a route treats authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Never authenticated
    Public,
    /// Authenticated only when an API key is configured
    IfConfigured,
    /// Always authenticated; an unconfigured key rejects every request
    Required,
}

impl AuthPolicy {
    pub fn admits(self, outcome: AuthOutcome) -> bool {
        match (self, outcome) {
            (AuthPolicy::Public, _) => true,
            (_, AuthOutcome::Granted) => true,
            (AuthPolicy::IfConfigured, AuthOutcome::NotConfigured) => true,
            (AuthPolicy::Required, AuthOutcome::NotConfigured) => false,
            (_, AuthOutcome::Denied) => false,
        }
    }
}

/// Compare the provided secret against the configured key in constant time
///
/// A missing header is passed as `None` and behaves like an empty secret.
/// Surrounding whitespace of the provided value is ignored.
pub fn authenticate(provided: Option<&str>, configured: &str) -> AuthOutcome {
    if configured.is_empty() {
        return AuthOutcome::NotConfigured;
    }
    let provided = provided.map(str::trim).unwrap_or_default();
    if bool::from(provided.as_bytes().ct_eq(configured.as_bytes())) {
        AuthOutcome::Granted
    } else {
        AuthOutcome::Denied
    }
}

/// Extract the `X-HeyHi-Key` header value, if present and valid UTF-8
pub fn provided_key(headers: &http::HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        use AuthOutcome::*;
        assert!(AuthPolicy::Public.admits(Denied));
        assert!(AuthPolicy::IfConfigured.admits(NotConfigured));
        assert!(!AuthPolicy::IfConfigured.admits(Denied));
        assert!(!AuthPolicy::Required.admits(NotConfigured));
        assert!(AuthPolicy::Required.admits(Granted));
    }

    #[test]
    fn test_header_whitespace_is_trimmed() {
        assert_eq!(authenticate(Some("  key-1 "), "key-1"), AuthOutcome::Granted);
        assert_eq!(authenticate(Some(""), "key-1"), AuthOutcome::Denied);
    }
}
