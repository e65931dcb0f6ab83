//! Domain newtype
//!
//! Keeps bare domain names apart from full addresses at the type level.
//! Node paths, JIDs and domains are all strings on the wire; mixing them up
//! is the classic way a locality check ends up comparing the wrong thing.

use std::{
    fmt::{self, Display},
    ops::Deref,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

/// A domain name such as `shakespeare.lit`
///
/// # Examples
///
/// ```
/// use tidings_common::Domain;
///
/// let domain = Domain::new("shakespeare.lit");
/// assert_eq!(domain.as_str(), "shakespeare.lit");
/// assert!(domain.matches("Shakespeare.LIT"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Domain(Arc<str>);

impl Domain {
    #[must_use]
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another domain name
    ///
    /// DNS names compare without regard to ASCII case, so `Example.COM` and
    /// `example.com` name the same authority.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Domain {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for Domain {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&str> for Domain {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<Arc<str>> for Domain {
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_from_str() {
        let domain: Domain = "channels.shakespeare.lit".into();
        assert_eq!(domain.as_str(), "channels.shakespeare.lit");
    }

    #[test]
    fn test_domain_matches_ignores_case() {
        let domain = Domain::new("shakespeare.lit");
        assert!(domain.matches("SHAKESPEARE.lit"));
        assert!(!domain.matches("denmark.lit"));
        assert!(!domain.matches("shakespeare.lit."));
    }

    #[test]
    fn test_domain_equality_is_exact() {
        assert_eq!(Domain::new("example.com"), Domain::new("example.com"));
        assert_ne!(Domain::new("example.com"), Domain::new("Example.com"));
    }

    #[test]
    fn test_domain_serde_transparent() {
        let domain = Domain::new("serde.example.com");
        let serialized = serde_json::to_string(&domain).unwrap();
        assert_eq!(serialized, "\"serde.example.com\"");

        let deserialized: Domain = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, domain);
    }

    #[test]
    fn test_domain_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        let domain = Domain::new("hash.example.com");
        map.insert(domain.clone(), 42);

        assert_eq!(map.get(&domain), Some(&42));
    }
}
