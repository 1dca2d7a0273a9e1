//! IP ban registry with lazy expiry.

use std::{collections::HashMap, net::IpAddr, time::Duration};

use super::value_object::Timestamp;

/// Address → expiry store.
///
/// Expired entries are never purged actively; they simply stop matching
/// once `now >= expiry`.
#[derive(Debug, Default)]
pub struct BanRegistry {
    bans: HashMap<IpAddr, Timestamp>,
}

impl BanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining ban time for `ip`, if a ban is still in effect.
    pub fn is_banned(&self, ip: &IpAddr, now: Timestamp) -> Option<Duration> {
        self.bans.get(ip).and_then(|expiry| now.until(*expiry))
    }

    /// Ban `ip` until `now + duration`, replacing any earlier entry.
    pub fn ban(&mut self, ip: IpAddr, duration: Duration, now: Timestamp) -> Timestamp {
        let expiry = now.plus(duration);
        self.bans.insert(ip, expiry);
        expiry
    }
}
