//! Room coordination server for a peer-to-peer video chat.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomkeeper-server
//! cargo run --bin roomkeeper-server -- --host 0.0.0.0 --port 3000 --rooms-file config/rooms.json
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use roomkeeper_server::{config::ServerConfig, domain::ModerationPolicy, ui::Server};
use roomkeeper_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "roomkeeper-server")]
#[command(about = "Room presence, screen-share and vote-kick coordination over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3000")]
    port: u16,

    /// JSON room catalog (`[{"id", "name", "password"}]`); defaults to a single open lobby
    #[arg(long)]
    rooms_file: Option<PathBuf>,

    /// How long a vote-kick ballot stays open
    #[arg(long, default_value = "30")]
    vote_duration_secs: u64,

    /// Wait between two ballots in the same room
    #[arg(long, default_value = "60")]
    cooldown_secs: u64,

    /// How long a kicked address stays banned
    #[arg(long, default_value = "300")]
    ban_duration_secs: u64,

    /// Take client addresses from cf-connecting-ip / x-forwarded-for (behind a proxy only)
    #[arg(long)]
    trust_forwarded_headers: bool,

    /// UTC offset of the chat clock label
    #[arg(long, default_value = "3", allow_hyphen_values = true)]
    utc_offset_hours: i32,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            rooms_file: args.rooms_file,
            policy: ModerationPolicy {
                vote_duration: Duration::from_secs(args.vote_duration_secs),
                cooldown: Duration::from_secs(args.cooldown_secs),
                ban_duration: Duration::from_secs(args.ban_duration_secs),
                ..ModerationPolicy::default()
            },
            trust_forwarded_headers: args.trust_forwarded_headers,
            utc_offset_hours: args.utc_offset_hours,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::from(Args::parse());
    tracing::info!(
        "Moderation: vote {:?}, cooldown {:?}, ban {:?}",
        config.policy.vote_duration,
        config.policy.cooldown,
        config.policy.ban_duration
    );

    let server = Server::from_config(&config);
    if let Err(e) = server.run(&config.bind_address()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
