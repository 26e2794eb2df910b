//! Environment-based configuration for the two network endpoints the core
//! needs: where to listen for orders, and where to send results.

use std::env;

/// Network configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the inbound order listener binds to.
    pub listen_addr: String,
    /// Address of the downstream MLLP receiver for composed results.
    pub downstream_addr: String,
}

impl Config {
    /// Reads `LISTEN_HOST`, `LISTEN_PORT` and `MLLP_SERVER_ADDRESS`, with
    /// defaults for each. An unparseable port falls back to the default.
    pub fn from_env() -> Config {
        let host = env::var("LISTEN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("LISTEN_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(2575);
        let downstream_addr =
            env::var("MLLP_SERVER_ADDRESS").unwrap_or_else(|_| "localhost:2577".to_string());

        Config {
            listen_addr: format!("{}:{}", host, port),
            downstream_addr,
        }
    }
}
