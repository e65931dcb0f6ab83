//! Local domain configuration
//!
//! The server may be authoritative for more than one domain: the user domain
//! (`shakespeare.lit`), a separate channel-service domain
//! (`channels.shakespeare.lit`) and any legacy aliases. All of them count as
//! local for delivery purposes.
//!
//! ```ron
//! (
//!     server: "shakespeare.lit",
//!     channels: "channels.shakespeare.lit",
//!     aliases: ["legacy.shakespeare.lit"],
//! )
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Domain;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A configured domain is unusable.
    #[error("Invalid domain for {field}: {reason}")]
    InvalidDomain { field: &'static str, reason: String },
}

/// The set of domains this server instance is authoritative for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDomains {
    /// The user-facing server domain
    pub server: Domain,

    /// A distinct domain for the channel service, if the deployment uses one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub channels: Option<Domain>,

    /// Further domains that should also be treated as local
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub aliases: Vec<Domain>,
}

impl LocalDomains {
    #[must_use]
    pub fn new(server: impl Into<Domain>) -> Self {
        Self {
            server: server.into(),
            channels: None,
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_channels(mut self, channels: impl Into<Domain>) -> Self {
        self.channels = Some(channels.into());
        self
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<Domain>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Parse from RON, allowing `channels: "..."` without an explicit `Some(...)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid RON or a domain is empty.
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let domains: Self = ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .from_str(s)?;
        domains.validate()?;
        Ok(domains)
    }

    /// # Errors
    ///
    /// Returns an error if any configured domain is empty or contains an address separator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_domain("server", &self.server)?;
        if let Some(channels) = &self.channels {
            check_domain("channels", channels)?;
        }
        for alias in &self.aliases {
            check_domain("aliases", alias)?;
        }
        Ok(())
    }

    /// Whether `domain` is one of the configured local domains
    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.server.matches(domain)
            || self.channels.as_ref().is_some_and(|c| c.matches(domain))
            || self.aliases.iter().any(|a| a.matches(domain))
    }
}

fn check_domain(field: &'static str, domain: &Domain) -> Result<(), ConfigError> {
    if domain.trim().is_empty() {
        return Err(ConfigError::InvalidDomain {
            field,
            reason: "domain is empty".to_string(),
        });
    }

    if domain.contains(['@', '/']) {
        return Err(ConfigError::InvalidDomain {
            field,
            reason: format!("'{domain}' is an address, not a domain"),
        });
    }

    Ok(())
}

/// Shared, runtime-reconfigurable handle on [`LocalDomains`]
///
/// Clones share the same underlying configuration, so a reconfiguration made
/// through one handle is visible to every locality check on the next call.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    inner: Arc<RwLock<LocalDomains>>,
}

impl DomainRegistry {
    #[must_use]
    pub fn new(domains: LocalDomains) -> Self {
        Self {
            inner: Arc::new(RwLock::new(domains)),
        }
    }

    /// A point-in-time copy of the current configuration
    #[must_use]
    pub fn snapshot(&self) -> LocalDomains {
        self.inner.read().clone()
    }

    /// Check a domain against the live configuration
    #[must_use]
    pub fn is_local_domain(&self, domain: &str) -> bool {
        self.inner.read().contains(domain)
    }

    /// # Errors
    ///
    /// Returns an error, leaving the current configuration in place, if `domains` is invalid.
    pub fn replace(&self, domains: LocalDomains) -> Result<(), ConfigError> {
        domains.validate()?;
        *self.inner.write() = domains;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error, leaving the current configuration in place, if `server` is invalid.
    pub fn set_server(&self, server: impl Into<Domain>) -> Result<(), ConfigError> {
        let server = server.into();
        check_domain("server", &server)?;
        self.inner.write().server = server;
        Ok(())
    }
}

impl From<LocalDomains> for DomainRegistry {
    fn from(value: LocalDomains) -> Self {
        Self::new(value)
    }
}
