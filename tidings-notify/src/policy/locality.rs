//! Whether a recipient is ours to deliver to
//!
//! Remote recipients are not an error: they belong to a federation component
//! that this engine does not implement, so they are simply not enqueued.

use tidings_common::{DomainRegistry, Jid, LocalDomains};

/// Locality check against the live domain configuration
///
/// Every call consults the [`DomainRegistry`] afresh; reconfiguring the
/// registry takes effect on the very next check.
#[derive(Debug, Clone)]
pub struct LocalityCheck {
    domains: DomainRegistry,
}

impl LocalityCheck {
    #[must_use]
    pub const fn new(domains: DomainRegistry) -> Self {
        Self { domains }
    }

    #[must_use]
    pub fn is_local(&self, address: &Jid) -> bool {
        self.domains.is_local_domain(address.domain())
    }

    /// The registry this check reads from
    #[must_use]
    pub const fn domains(&self) -> &DomainRegistry {
        &self.domains
    }
}

impl From<LocalDomains> for LocalityCheck {
    fn from(value: LocalDomains) -> Self {
        Self::new(DomainRegistry::new(value))
    }
}
