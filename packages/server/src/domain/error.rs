//! Domain error types.
//!
//! `Display` of the coordination errors is the notice text delivered to the
//! offending connection.

use thiserror::Error;

/// Invalid value object input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{kind} must be at most {max} characters")]
    TooLong { kind: &'static str, max: usize },
}

/// Request rejected because it refers to something invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("User '{0}' is not in this room")]
    UnknownPeer(String),

    #[error("Peer '{0}' is already present in this room")]
    PeerAlreadyPresent(String),

    #[error("{0}")]
    InvalidInput(#[from] ValueObjectError),
}

/// Request rejected by a moderation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("You must wait {remaining_secs}s before starting another vote.")]
    CooldownActive { remaining_secs: u64 },

    #[error("A vote is already in progress.")]
    BallotInProgress,

    #[error("You cannot start a vote against yourself.")]
    SelfTarget,

    #[error("The target of a vote cannot cast a ballot.")]
    TargetCannotVote,

    #[error("You have already voted.")]
    AlreadyVoted,
}

/// Any rejection produced by the room coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("You have been removed from this room. Try again in {remaining_minutes} minute(s).")]
    Banned { remaining_minutes: u64 },
}

/// Room catalog access failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room catalog is malformed: {0}")]
    Malformed(String),
}

/// Outbound delivery failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Client '{0}' not found")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_message_names_remaining_seconds() {
        // テスト項目: クールダウン中のエラーメッセージに残り秒数が含まれる
        let error = CoordinationError::from(PolicyError::CooldownActive { remaining_secs: 42 });

        assert_eq!(
            error.to_string(),
            "You must wait 42s before starting another vote."
        );
    }

    #[test]
    fn test_validation_error_wraps_value_object_error() {
        let error = ValidationError::from(ValueObjectError::Empty("peer id"));

        assert_eq!(error.to_string(), "peer id must not be empty");
    }

    #[test]
    fn test_ban_message_names_remaining_minutes() {
        let error = CoordinationError::Banned {
            remaining_minutes: 5,
        };

        assert!(error.to_string().contains("5 minute(s)"));
    }
}
