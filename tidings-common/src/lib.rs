//! Shared vocabulary for the tidings notification engine: addresses, domains,
//! local domain configuration and logging.

pub mod config;
pub mod domain;
pub mod jid;
pub mod logging;

pub use config::{ConfigError, DomainRegistry, LocalDomains};
pub use domain::Domain;
pub use jid::{Jid, JidError};
pub use tracing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
    Finalised,
}
