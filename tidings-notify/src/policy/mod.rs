//! Recipient filtering policies
//!
//! Both policies are stateless and safe to evaluate concurrently from any
//! number of dispatch tasks:
//!
//! - [`allows`]: the affiliation/subscription/scheme decision
//! - [`LocalityCheck`]: whether a recipient belongs to a domain this server serves

pub mod authorization;
pub mod locality;

pub use authorization::allows;
pub use locality::LocalityCheck;
