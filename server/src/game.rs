//! Round lifecycle engine
//!
//! Owns the single current round: which pattern is active, whether it has
//! been solved and by whom, when the next automatic switch happens and
//! whether a correct answer switches immediately. Every read and write goes
//! through one mutex so snapshots are never torn and only one submission is
//! judged against a given round at a time.
//!
//! Transitions:
//! - a correct submission moves an open round to solved, and straight on to
//!   the next pattern when auto-switch is on
//! - timer expiry and admin skip move to the next pattern, wrapping
//! - admin force moves to a chosen pattern
//! - admin retime only moves the deadline
//!
//! Every transition to a new round clears the solved state and re-arms the
//! deadline at `now + timer_duration`.

use crate::catalog::PatternCatalog;
use crate::error::GameError;
use crate::history::HistoryStore;
use chrono::Utc;
use log::{debug, error, info, warn};
use shared::{
    normalize_grid, ActionResponse, ColorGrid, HistoryEntry, Pattern, StateResponse,
    LEADERBOARD_LEN, MAX_TIMER_SECS, RECENT_HISTORY_LEN,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, Instant, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundStatus {
    Open,
    Solved { winner: String, grid: ColorGrid },
}

/// Result of judging one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Correct; the round stays solved until the timer or an admin moves on.
    Accepted { winner: String },
    /// Correct, and auto-switch already started the round for `next_index`.
    AcceptedAndAdvanced { winner: String, next_index: usize },
    /// Somebody else got there first.
    AlreadySolved { winner: String },
    Incorrect,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::Accepted { .. } | SubmitOutcome::AcceptedAndAdvanced { .. }
        )
    }

    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Accepted { winner } => format!("BRAVO {} ! Validé !", winner),
            SubmitOutcome::AcceptedAndAdvanced { winner, .. } => {
                format!("BRAVO {} ! (Passage automatique au suivant)", winner)
            }
            SubmitOutcome::AlreadySolved { winner } => {
                format!("Déjà trouvé par {} ! Attends le prochain dessin.", winner)
            }
            SubmitOutcome::Incorrect => "Incorrect. Vérifie le modèle.".to_string(),
        }
    }
}

impl From<SubmitOutcome> for ActionResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        ActionResponse {
            success: outcome.is_success(),
            message: outcome.message(),
        }
    }
}

/// The mutable state of the current round.
///
/// Methods take `now` explicitly so the state machine can be driven without a
/// clock; [`GameEngine`] supplies the time and the locking.
#[derive(Debug, Clone)]
pub struct Round {
    pattern_index: usize,
    status: RoundStatus,
    timer_duration: Duration,
    deadline: Instant,
    auto_switch: bool,
    submission_count: u64,
}

impl Round {
    /// Timers longer than [`MAX_TIMER_SECS`] are capped.
    pub fn new(timer_duration: Duration, now: Instant) -> Self {
        let timer_duration = cap_timer(timer_duration);
        Self {
            pattern_index: 0,
            status: RoundStatus::Open,
            timer_duration,
            deadline: deadline_after(now, timer_duration),
            auto_switch: false,
            submission_count: 0,
        }
    }

    pub fn pattern_index(&self) -> usize {
        self.pattern_index
    }

    pub fn status(&self) -> &RoundStatus {
        &self.status
    }

    pub fn timer_duration(&self) -> Duration {
        self.timer_duration
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn auto_switch(&self) -> bool {
        self.auto_switch
    }

    pub fn submission_count(&self) -> u64 {
        self.submission_count
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.status, RoundStatus::Solved { .. })
    }

    /// Time until the next switch, zero once the deadline has passed.
    pub fn time_left(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Starts a fresh round on `index`.
    pub fn select(&mut self, index: usize, now: Instant) {
        self.pattern_index = index;
        self.status = RoundStatus::Open;
        self.deadline = deadline_after(now, self.timer_duration);
    }

    /// Replaces the timer and re-arms the deadline. Durations are capped at
    /// [`MAX_TIMER_SECS`]; if the deadline still cannot be represented the
    /// round is left as it was and `None` is returned.
    pub fn retime(&mut self, duration: Duration, now: Instant) -> Option<Duration> {
        let duration = cap_timer(duration);
        let deadline = now.checked_add(duration)?;
        self.timer_duration = duration;
        self.deadline = deadline;
        Some(duration)
    }

    pub fn set_auto_switch(&mut self, enabled: bool) {
        self.auto_switch = enabled;
    }

    fn mark_solved(&mut self, winner: String, grid: ColorGrid) {
        self.status = RoundStatus::Solved { winner, grid };
        self.submission_count += 1;
    }
}

fn cap_timer(duration: Duration) -> Duration {
    duration.min(Duration::from_secs(MAX_TIMER_SECS))
}

fn deadline_after(now: Instant, duration: Duration) -> Instant {
    now.checked_add(duration)
        .or_else(|| now.checked_add(Duration::from_secs(MAX_TIMER_SECS)))
        .unwrap_or(now)
}

pub struct GameEngine {
    catalog: Arc<PatternCatalog>,
    history: Arc<HistoryStore>,
    round: Mutex<Round>,
}

impl GameEngine {
    /// Starts on the first pattern with the deadline armed.
    pub fn new(
        catalog: Arc<PatternCatalog>,
        history: Arc<HistoryStore>,
        timer_duration: Duration,
    ) -> Self {
        Self {
            catalog,
            history,
            round: Mutex::new(Round::new(timer_duration, Instant::now())),
        }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Copy of the raw round state, mostly for tests and diagnostics.
    pub async fn round(&self) -> Round {
        self.round.lock().await.clone()
    }

    pub async fn snapshot(&self) -> StateResponse {
        let round = self.round.lock().await;
        let now = Instant::now();

        let (solved_by, solved_grid) = match &round.status {
            RoundStatus::Open => (String::new(), None),
            RoundStatus::Solved { winner, grid } => (winner.clone(), Some(grid.clone())),
        };

        StateResponse {
            time_left: round.time_left(now).as_secs_f64(),
            is_solved: round.is_solved(),
            solved_by,
            target_grid: self.current_pattern(&round).clone(),
            solved_grid,
            current_model: round.pattern_index,
            total_models: self.catalog.len(),
            submission_count: round.submission_count,
            recent_history: self.history.recent(RECENT_HISTORY_LEN).await,
            auto_switch: round.auto_switch,
            leaderboard: self.history.leaderboard(LEADERBOARD_LEN).await,
        }
    }

    /// Judges a submission against the pattern that is current right now.
    ///
    /// A win is only recorded once the history entry is durably stored; if
    /// that fails the round is left open and the error is returned.
    pub async fn submit(&self, grid: ColorGrid, name: String) -> Result<SubmitOutcome, GameError> {
        let mut round = self.round.lock().await;

        if let RoundStatus::Solved { winner, .. } = &round.status {
            return Ok(SubmitOutcome::AlreadySolved {
                winner: winner.clone(),
            });
        }

        if !self.current_pattern(&round).matches(&grid) {
            debug!("Incorrect submission from {:?}", name);
            return Ok(SubmitOutcome::Incorrect);
        }

        let normalized = normalize_grid(&grid);
        let entry = HistoryEntry {
            name: name.clone(),
            grid: normalized.clone(),
            timestamp: Utc::now(),
            model_id: round.pattern_index,
        };

        if let Err(e) = self.history.append(entry).await {
            error!("Could not record win by {:?}: {}", name, e);
            return Err(e.into());
        }

        info!("Pattern {} solved by {:?}", round.pattern_index, name);
        round.mark_solved(name.clone(), normalized);

        if round.auto_switch {
            let next_index = self.advance(&mut round, Instant::now());
            return Ok(SubmitOutcome::AcceptedAndAdvanced {
                winner: name,
                next_index,
            });
        }

        Ok(SubmitOutcome::Accepted { winner: name })
    }

    /// Replaces the round timer and restarts the countdown from now.
    pub async fn set_timer_duration(&self, duration: Duration) {
        let mut round = self.round.lock().await;
        match round.retime(duration, Instant::now()) {
            Some(applied) => info!("Timer set to {}s", applied.as_secs()),
            None => warn!(
                "Timer of {}s rejected, keeping {}s",
                duration.as_secs(),
                round.timer_duration.as_secs()
            ),
        }
    }

    pub async fn set_auto_switch(&self, enabled: bool) {
        self.round.lock().await.set_auto_switch(enabled);
    }

    pub async fn force_pattern(&self, index: usize) -> Result<(), GameError> {
        let mut round = self.round.lock().await;

        if index >= self.catalog.len() {
            return Err(GameError::InvalidIndex {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                total: self.catalog.len(),
            });
        }

        round.select(index, Instant::now());
        info!("Forced pattern {} ({})", index, self.pattern_name(index));
        Ok(())
    }

    /// Moves to the next pattern immediately. Returns the new index.
    pub async fn force_next_round(&self) -> usize {
        let mut round = self.round.lock().await;
        self.advance(&mut round, Instant::now())
    }

    /// One ticker step: expires the round if its deadline has passed.
    ///
    /// At most one transition happens per call, however late it runs.
    pub async fn tick(&self) -> bool {
        let mut round = self.round.lock().await;
        let now = Instant::now();

        if !round.is_due(now) {
            return false;
        }

        let next = self.advance(&mut round, now);
        info!("Timer expired, new pattern {} ({})", next, self.pattern_name(next));
        true
    }

    /// Runs [`GameEngine::tick`] every `period`, forever.
    pub async fn run_ticker(self: Arc<Self>, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Skip the first tick since it fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    fn advance(&self, round: &mut Round, now: Instant) -> usize {
        let next = self.catalog.next_index(round.pattern_index);
        round.select(next, now);
        next
    }

    fn current_pattern(&self, round: &Round) -> &Pattern {
        self.catalog.pattern(round.pattern_index)
    }

    fn pattern_name(&self, index: usize) -> &str {
        self.catalog.get(index).map_or("?", |p| p.name.as_str())
    }
}
