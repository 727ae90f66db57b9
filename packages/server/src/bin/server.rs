//! roomcast chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server -- --port 8080
//! ```

use clap::Parser;
use roomcast_server::ServerConfig;
use roomcast_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = roomcast_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
