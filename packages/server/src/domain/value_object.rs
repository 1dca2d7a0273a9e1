//! Value objects of the room coordination domain.
//!
//! Identifiers are validated once at the boundary (`new` / `TryFrom`) and
//! are plain strings afterwards.

use std::{fmt, time::Duration};

use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_ID_LENGTH: usize = 128;
const MAX_DISPLAY_NAME_LENGTH: usize = 64;

fn validate(kind: &'static str, value: &str, max: usize) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(kind));
    }
    if value.chars().count() > max {
        return Err(ValueObjectError::TooLong { kind, max });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate($kind, &value, $max)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Transport connection handle, unique per socket.
    ConnectionId,
    "connection id",
    MAX_ID_LENGTH
);
string_id!(
    /// Room identifier as published by the room catalog.
    RoomId,
    "room id",
    MAX_ID_LENGTH
);
string_id!(
    /// Caller supplied peer identifier (the media peer's id).
    PeerId,
    "peer id",
    MAX_ID_LENGTH
);
string_id!(
    /// Display name shown to the other room members.
    DisplayName,
    "display name",
    MAX_DISPLAY_NAME_LENGTH
);

impl ConnectionId {
    /// Generate a fresh random connection id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl DisplayName {
    /// The desired name with a numeric suffix, e.g. `Alice_42`.
    ///
    /// Suffixed names are server generated and skip the length check.
    pub fn with_suffix(&self, suffix: u32) -> Self {
        Self(format!("{}_{}", self.0, suffix))
    }

    /// Name used for notices authored by the server itself.
    pub fn system() -> Self {
        Self("System".to_string())
    }
}

/// Point in time as Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn plus(&self, duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Time left until `deadline`, or `None` once `self >= deadline`.
    pub fn until(&self, deadline: Timestamp) -> Option<Duration> {
        if self.0 >= deadline.0 {
            return None;
        }
        let millis = u64::try_from(deadline.0 - self.0).unwrap_or(u64::MAX);
        Some(Duration::from_millis(millis))
    }
}

/// Current time as seen by one event handler: the instant plus the
/// pre-formatted clock label attached to chat notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTime {
    pub at: Timestamp,
    pub label: String,
}

impl EventTime {
    pub fn new(at: Timestamp, label: impl Into<String>) -> Self {
        Self {
            at,
            label: label.into(),
        }
    }
}

/// Round a duration up to whole units of `unit`.
pub fn ceil_units(duration: Duration, unit: Duration) -> u64 {
    let unit_millis = unit.as_millis().max(1);
    let millis = duration.as_millis();
    u64::try_from(millis.div_ceil(unit_millis)).unwrap_or(u64::MAX)
}
