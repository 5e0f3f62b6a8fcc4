//! Command line and environment configuration.

use clap::Parser;
use shared::{DEFAULT_TIMER_SECS, MAX_TIMER_SECS, TICK_INTERVAL_MS};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Pixel art guessing game server")]
pub struct ServerConfig {
    /// Server IP address to bind to
    #[arg(short = 'H', long, env = "PIXEL_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to listen on
    #[arg(short, long, env = "PIXEL_PORT", default_value = "8080")]
    pub port: u16,

    /// JSON file with the pattern catalog
    #[arg(short, long, env = "PIXEL_MODELS", default_value = "data/pixel_model.json")]
    pub models: PathBuf,

    /// JSON file the winner history is stored in
    #[arg(long, env = "PIXEL_HISTORY", default_value = "data/history.json")]
    pub history: PathBuf,

    /// Keep the history in memory only
    #[arg(long, env = "PIXEL_NO_PERSIST")]
    pub no_persist: bool,

    /// Round duration in seconds
    #[arg(short, long, env = "PIXEL_TIMER", default_value_t = DEFAULT_TIMER_SECS)]
    pub timer: u64,

    /// How often the round deadline is checked, in milliseconds
    #[arg(long, env = "PIXEL_TICK_MS", default_value_t = TICK_INTERVAL_MS)]
    pub tick_ms: u64,

    /// Admin login
    #[arg(long, env = "PIXEL_ADMIN_USER", default_value = "admin")]
    pub admin_user: String,

    /// Admin password
    #[arg(long, env = "PIXEL_ADMIN_PASSWORD", default_value = "password", hide_env_values = true)]
    pub admin_password: String,

    /// Directory holding the HTML pages
    #[arg(long, env = "PIXEL_PAGES", default_value = "templates")]
    pub pages: PathBuf,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Round duration, never above [`MAX_TIMER_SECS`].
    pub fn timer_duration(&self) -> Duration {
        Duration::from_secs(self.timer.min(MAX_TIMER_SECS))
    }

    /// Tick period, never below one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
