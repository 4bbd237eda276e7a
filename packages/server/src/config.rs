//! Server configuration.

use crate::domain::DEFAULT_LEDGER_CAPACITY;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origin allowed to open WebSocket connections. `None` admits
    /// every origin.
    pub allowed_origin: Option<String>,
    pub max_connections: usize,
    /// Per-room bound on tracked message delivery states.
    pub message_ledger_capacity: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Treat an empty origin as "no origin check".
    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        self.allowed_origin = if origin.trim().is_empty() {
            None
        } else {
            Some(origin)
        };
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origin: Some(DEFAULT_ALLOWED_ORIGIN.to_string()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            message_ledger_capacity: DEFAULT_LEDGER_CAPACITY,
        }
    }
}
