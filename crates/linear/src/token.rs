//! API token wrapper.

use zeroize::Zeroizing;

/// A Linear API token.
///
/// Sent verbatim as the `Authorization` header value. `Debug` never prints
/// the secret, and its memory is zeroized when the token is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(Zeroizing<String>);

impl ApiToken {
    /// Wraps `token`, returning `None` if it is blank.
    ///
    /// The untrimmed input is zeroized as well.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let raw = Zeroizing::new(token.into());
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(Zeroizing::new(trimmed.to_string())))
        }
    }

    /// Returns the raw token for use in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiToken").field(&"[REDACTED]").finish()
    }
}
