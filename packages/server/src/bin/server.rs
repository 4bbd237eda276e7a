//! Parley relay server.
//!
//! Rooms, chat delivery tracking, call coordination and WebRTC signaling
//! over a single WebSocket endpoint.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parley-server
//! cargo run --bin parley-server -- --host 0.0.0.0 --port 3001 --allowed-origin ""
//! ```

use clap::Parser;
use parley_server::{
    ServerConfig,
    config::{DEFAULT_ALLOWED_ORIGIN, DEFAULT_MAX_CONNECTIONS},
    domain::DEFAULT_LEDGER_CAPACITY,
    ui::Server,
};
use parley_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "parley-server")]
#[command(about = "Room coordination and WebRTC signaling relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "PARLEY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PARLEY_PORT", default_value = "3001")]
    port: u16,

    /// Browser origin allowed to connect (empty disables the check)
    #[arg(long, env = "PARLEY_ALLOWED_ORIGIN", default_value = DEFAULT_ALLOWED_ORIGIN)]
    allowed_origin: String,

    /// Maximum number of simultaneous connections
    #[arg(long, env = "PARLEY_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Message delivery states tracked per room
    #[arg(long, env = "PARLEY_MESSAGE_LEDGER_CAPACITY", default_value_t = DEFAULT_LEDGER_CAPACITY)]
    message_ledger_capacity: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            host: args.host,
            port: args.port,
            allowed_origin: None,
            max_connections: args.max_connections,
            message_ledger_capacity: args.message_ledger_capacity,
        }
        .with_allowed_origin(args.allowed_origin)
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ServerConfig::from(args);
    tracing::debug!("Starting with {:?}", config);

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
