//! Server configuration.
//!
//! Built by the binary from its command line; every field has a default so
//! the server runs without any flags.

use std::path::PathBuf;

use crate::domain::ModerationPolicy;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Room catalog file; `None` serves the single open `lobby`
    pub rooms_file: Option<PathBuf>,
    pub policy: ModerationPolicy,
    /// Take the client address from `cf-connecting-ip` / `x-forwarded-for`
    pub trust_forwarded_headers: bool,
    /// Offset of the `HH:MM` label on chat messages
    pub utc_offset_hours: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            rooms_file: None,
            policy: ModerationPolicy::default(),
            trust_forwarded_headers: false,
            utc_offset_hours: 3,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
