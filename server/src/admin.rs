//! Administrative actions
//!
//! Thin layer between the admin routes and the engine: clamps the timer to
//! the allowed range, checks pattern indices and logs every request. It holds no
//! state of its own.

use crate::error::GameError;
use crate::game::GameEngine;
use log::info;
use shared::{MAX_TIMER_SECS, MIN_TIMER_SECS};
use std::sync::Arc;
use std::time::Duration;

/// Converts a requested timer length to a duration between
/// [`MIN_TIMER_SECS`] and [`MAX_TIMER_SECS`].
pub fn clamp_timer(duration_sec: i64) -> Duration {
    let secs = u64::try_from(duration_sec)
        .unwrap_or(0)
        .clamp(MIN_TIMER_SECS, MAX_TIMER_SECS);
    Duration::from_secs(secs)
}

#[derive(Clone)]
pub struct AdminService {
    game: Arc<GameEngine>,
}

impl AdminService {
    pub fn new(game: Arc<GameEngine>) -> Self {
        Self { game }
    }

    /// Sets and restarts the round timer. Returns the duration actually applied.
    pub async fn set_timer(&self, duration_sec: i64) -> Duration {
        let duration = clamp_timer(duration_sec);
        info!(
            "ADMIN: timer set to {}s (requested {}s)",
            duration.as_secs(),
            duration_sec
        );
        self.game.set_timer_duration(duration).await;
        duration
    }

    pub async fn set_auto_switch(&self, enabled: bool) {
        info!("ADMIN: auto-switch set to {}", enabled);
        self.game.set_auto_switch(enabled).await;
    }

    pub async fn force_model(&self, index: i64) -> Result<(), GameError> {
        info!("ADMIN: force model index {}", index);
        let index = usize::try_from(index).map_err(|_| GameError::InvalidIndex {
            index,
            total: self.game.catalog().len(),
        })?;
        self.game.force_pattern(index).await
    }

    /// Skips to the next pattern. Returns its index.
    pub async fn skip_model(&self) -> usize {
        info!("ADMIN: skip model requested");
        self.game.force_next_round().await
    }
}
