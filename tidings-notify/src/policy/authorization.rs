//! Who may receive a notification
//!
//! The subscription gate runs first and unconditionally: no affiliation can
//! make up for an incomplete subscribe handshake. Only then does the scheme
//! decide which affiliations qualify.

use crate::{
    model::{Affiliation, Subscription},
    types::Scheme,
};

/// Decide whether a member with this subscription and affiliation may receive
/// a notification published under `scheme`.
///
/// | scheme        | subscribed members allowed        |
/// |---------------|-----------------------------------|
/// | `Broadcast`   | everyone except outcasts          |
/// | `Moderators`  | moderators and owners             |
/// | `Unknown(_)`  | nobody                            |
#[must_use]
pub const fn allows(subscription: Subscription, affiliation: Affiliation, scheme: Scheme) -> bool {
    match subscription {
        Subscription::Subscribed => {}
        Subscription::None
        | Subscription::Pending
        | Subscription::Unconfigured
        | Subscription::Invited => return false,
    }

    match scheme {
        Scheme::Broadcast => match affiliation {
            Affiliation::Outcast => false,
            Affiliation::None
            | Affiliation::Member
            | Affiliation::Publisher
            | Affiliation::Moderator
            | Affiliation::Owner => true,
        },
        Scheme::Moderators => match affiliation {
            Affiliation::Moderator | Affiliation::Owner => true,
            Affiliation::None
            | Affiliation::Outcast
            | Affiliation::Member
            | Affiliation::Publisher => false,
        },
        Scheme::Unknown(_) => false,
    }
}
