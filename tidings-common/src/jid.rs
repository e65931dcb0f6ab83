//! Recipient addresses
//!
//! A [`Jid`] is `[node@]domain[/resource]`. Only the domain takes part in
//! routing decisions here; the node and resource are carried through unchanged.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Domain;

/// Errors produced while parsing a [`Jid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JidError {
    #[error("Address is empty")]
    Empty,

    #[error("Address has an empty domain: {0}")]
    EmptyDomain(String),

    #[error("Address has an empty local part before '@': {0}")]
    EmptyNode(String),

    #[error("Address has an empty resource after '/': {0}")]
    EmptyResource(String),

    #[error("Address has an invalid domain: {0}")]
    InvalidDomain(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Jid {
    node: Option<String>,
    domain: Domain,
    resource: Option<String>,
}

impl Jid {
    /// Build an address from its parts. The domain is lowercased.
    #[must_use]
    pub fn new(node: Option<&str>, domain: &str, resource: Option<&str>) -> Self {
        Self {
            node: node.map(str::to_string),
            domain: Domain::from(domain.to_ascii_lowercase()),
            resource: resource.map(str::to_string),
        }
    }

    #[must_use]
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    #[must_use]
    pub const fn domain(&self) -> &Domain {
        &self.domain
    }

    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// The same address without its resource part
    #[must_use]
    pub fn bare(&self) -> Self {
        Self {
            node: self.node.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(JidError::Empty);
        }

        // The resource may itself contain '@' or '/', so split it off first
        let (rest, resource) = match s.split_once('/') {
            Some((_, "")) => return Err(JidError::EmptyResource(s.to_string())),
            Some((rest, resource)) => (rest, Some(resource)),
            None => (s, None),
        };

        let (node, domain) = match rest.split_once('@') {
            Some(("", _)) => return Err(JidError::EmptyNode(s.to_string())),
            Some((node, domain)) => (Some(node), domain),
            None => (None, rest),
        };

        if domain.is_empty() {
            return Err(JidError::EmptyDomain(s.to_string()));
        }

        if domain.contains(|c: char| c == '@' || c.is_whitespace()) {
            return Err(JidError::InvalidDomain(s.to_string()));
        }

        Ok(Self::new(node, domain, resource))
    }
}

impl TryFrom<String> for Jid {
    type Error = JidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Jid> for String {
    fn from(value: Jid) -> Self {
        value.to_string()
    }
}

impl Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(node) = &self.node {
            write!(f, "{node}@")?;
        }
        write!(f, "{}", self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}
