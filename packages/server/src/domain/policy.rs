//! Moderation timings.

use std::time::Duration;

/// Timings that drive voting, cooldown, bans and forced disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationPolicy {
    /// How long a ballot stays open before it is resolved
    pub vote_duration: Duration,
    /// Quiet period after a resolution before a new vote may start
    pub cooldown: Duration,
    /// How long a kicked participant's address stays banned
    pub ban_duration: Duration,
    /// Delay between the kick notice and the forced disconnect
    pub kick_grace: Duration,
    /// Delay between the ban notice and the disconnect of a rejected connection
    pub ban_rejection_grace: Duration,
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self {
            vote_duration: Duration::from_secs(30),
            cooldown: Duration::from_secs(60),
            ban_duration: Duration::from_secs(5 * 60),
            kick_grace: Duration::from_millis(200),
            ban_rejection_grace: Duration::from_secs(1),
        }
    }
}
