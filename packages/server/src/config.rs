//! Server configuration from command-line flags.

use clap::Parser;

/// roomcast chat server
#[derive(Debug, Clone, Parser)]
#[command(name = "roomcast-server", version, about)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Frames queued per connection before new events are dropped for it
    #[arg(long, default_value_t = 256)]
    pub outbound_buffer: usize,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            outbound_buffer: 256,
            log_level: "info".to_string(),
        }
    }
}
