use tracing::warn;

use crate::roster::Roster;

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server listen port.
    pub port: u16,
    /// Server bind host.
    pub host: String,
    /// Who may log in.
    pub roster: Roster,
    /// Chat messages kept per room.
    pub history_limit: usize,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            roster: match std::env::var("CHESS_CHAT_USERS") {
                Ok(users) => Roster::parse(&users).unwrap_or_else(|e| {
                    warn!("ignoring CHESS_CHAT_USERS: {e}");
                    defaults.roster
                }),
                Err(_) => defaults.roster,
            },
            history_limit: std::env::var("CHESS_CHAT_HISTORY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.history_limit),
        }
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: 8082,
            host: "0.0.0.0".to_string(),
            roster: Roster::default(),
            history_limit: 500,
        }
    }
}
