use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMER_SECS: u64 = 60;
pub const MIN_TIMER_SECS: u64 = 10;
/// One day. Longer rounds are cut down to this.
pub const MAX_TIMER_SECS: u64 = 24 * 60 * 60;
pub const TICK_INTERVAL_MS: u64 = 1000;
pub const RECENT_HISTORY_LEN: usize = 10;
pub const LEADERBOARD_LEN: usize = 10;
pub const EMPTY_COLOR: &str = "#ffffff";

/// A submitted drawing: rows of CSS color strings.
pub type ColorGrid = Vec<Vec<String>>;

/// One cell of a target pattern. Encoded as `0`/`1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Cell {
    Empty,
    Filled,
}

impl Cell {
    /// Whether a submitted color is a correct answer for this cell.
    pub fn accepts(self, color: &str) -> bool {
        match self {
            Cell::Filled => !is_empty_color(color),
            Cell::Empty => is_empty_color(color),
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::Filled),
            other => Err(format!("invalid cell value {other}, expected 0 or 1")),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => 0,
            Cell::Filled => 1,
        }
    }
}

/// A target grid players have to reproduce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    rows: Vec<Vec<Cell>>,
}

impl Pattern {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Row index of the first row whose length differs from the first one.
    pub fn ragged_row(&self) -> Option<usize> {
        let width = self.width();
        self.rows.iter().position(|row| row.len() != width)
    }

    /// Checks a submission cell by cell.
    ///
    /// Dimensions must match exactly: a missing or extra row, or a row of the
    /// wrong width, makes the submission incorrect.
    pub fn matches(&self, grid: &[Vec<String>]) -> bool {
        if grid.len() != self.rows.len() {
            return false;
        }

        self.rows.iter().zip(grid).all(|(row, submitted)| {
            row.len() == submitted.len()
                && row
                    .iter()
                    .zip(submitted)
                    .all(|(cell, color)| cell.accepts(color))
        })
    }
}

/// `""`, `transparent` and white all count as an unpainted cell.
pub fn is_empty_color(color: &str) -> bool {
    color.is_empty() || color == "transparent" || color == EMPTY_COLOR
}

pub fn normalize_color(color: &str) -> String {
    if is_empty_color(color) {
        EMPTY_COLOR.to_string()
    } else {
        color.to_string()
    }
}

/// Rewrites every empty-equivalent cell to [`EMPTY_COLOR`].
pub fn normalize_grid(grid: &[Vec<String>]) -> ColorGrid {
    grid.iter()
        .map(|row| row.iter().map(|color| normalize_color(color)).collect())
        .collect()
}

/// A winning submission, as stored in the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    pub grid: ColorGrid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "modelId")]
    pub model_id: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

/// Public view of the current round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub time_left: f64,
    pub is_solved: bool,
    pub solved_by: String,
    pub target_grid: Pattern,
    pub solved_grid: Option<ColorGrid>,
    pub current_model: usize,
    pub total_models: usize,
    pub submission_count: u64,
    pub recent_history: Vec<HistoryEntry>,
    pub auto_switch: bool,
    pub leaderboard: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub grid: ColorGrid,
    #[serde(default)]
    pub name: String,
}

/// `{success, message}` reply used by the submit route and admin actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRequest {
    #[serde(rename = "durationSec", alias = "duration")]
    pub duration_sec: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    #[serde(rename = "modelIndex")]
    pub model_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSwitchRequest {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn grid(rows: &[&[&str]]) -> ColorGrid {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn pattern(rows: &[&[u8]]) -> Pattern {
        Pattern::new(
            rows.iter()
                .map(|row| row.iter().map(|&v| Cell::try_from(v).unwrap()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_empty_color_equivalents() {
        assert!(is_empty_color(""));
        assert!(is_empty_color("transparent"));
        assert!(is_empty_color("#ffffff"));
        assert!(!is_empty_color("#000000"));
        assert!(!is_empty_color("red"));
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color(""), EMPTY_COLOR);
        assert_eq!(normalize_color("transparent"), EMPTY_COLOR);
        assert_eq!(normalize_color("#ffffff"), EMPTY_COLOR);
        assert_eq!(normalize_color("#ff0000"), "#ff0000");
    }

    #[test]
    fn test_normalize_grid_is_idempotent() {
        let original = grid(&[&["", "#123456"], &["transparent", "#ffffff"]]);
        let once = normalize_grid(&original);
        let twice = normalize_grid(&once);

        assert_eq!(once, twice);
        assert_eq!(once, grid(&[&["#ffffff", "#123456"], &["#ffffff", "#ffffff"]]));
    }

    #[test]
    fn test_normalize_keeps_ragged_shape() {
        let original = grid(&[&["", "a", "b"], &["c"]]);
        let normalized = normalize_grid(&original);
        assert_eq!(normalized[0].len(), 3);
        assert_eq!(normalized[1].len(), 1);
    }

    #[test]
    fn test_cell_wire_values() {
        assert_eq!(Cell::try_from(0).unwrap(), Cell::Empty);
        assert_eq!(Cell::try_from(1).unwrap(), Cell::Filled);
        assert!(Cell::try_from(2).is_err());
        assert_eq!(u8::from(Cell::Filled), 1);
    }

    #[test]
    fn test_pattern_deserializes_from_ints() {
        let parsed: Pattern = serde_json::from_str("[[0,1],[1,0]]").unwrap();
        assert_eq!(parsed, pattern(&[&[0, 1], &[1, 0]]));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "[[0,1],[1,0]]");

        let bad: Result<Pattern, _> = serde_json::from_str("[[0,3]]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_pattern_dimensions() {
        let p = pattern(&[&[0, 1, 0], &[1, 1, 1]]);
        assert_eq!(p.height(), 2);
        assert_eq!(p.width(), 3);
        assert_eq!(p.ragged_row(), None);

        let ragged = pattern(&[&[0, 1, 0], &[1]]);
        assert_eq!(ragged.ragged_row(), Some(1));
    }

    #[test]
    fn test_matching_submission() {
        let p = pattern(&[&[0, 1], &[1, 0]]);
        assert!(p.matches(&grid(&[&["", "#ff0000"], &["blue", "transparent"]])));
        assert!(p.matches(&grid(&[&["#ffffff", "x"], &["y", ""]])));
    }

    #[test]
    fn test_wrong_cell_fails() {
        let p = pattern(&[&[0, 1], &[1, 0]]);
        // filled where the pattern is empty
        assert!(!p.matches(&grid(&[&["red", "red"], &["red", ""]])));
        // empty where the pattern is filled
        assert!(!p.matches(&grid(&[&["", ""], &["red", ""]])));
    }

    #[test]
    fn test_dimension_mismatch_fails() {
        let p = pattern(&[&[0, 1], &[1, 0]]);
        // missing row
        assert!(!p.matches(&grid(&[&["", "red"]])));
        // extra row, even if empty
        assert!(!p.matches(&grid(&[&["", "red"], &["red", ""], &["", ""]])));
        // short row
        assert!(!p.matches(&grid(&[&["", "red"], &["red"]])));
        // long row
        assert!(!p.matches(&grid(&[&["", "red", ""], &["red", ""]])));
        assert!(!p.matches(&[]));
    }

    #[test]
    fn test_history_entry_wire_format() {
        let entry = HistoryEntry {
            name: "alice".to_string(),
            grid: grid(&[&["#ffffff", "red"]]),
            timestamp: "2024-05-01T12:00:00Z".parse().unwrap(),
            model_id: 3,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["modelId"], 3);
        assert_eq!(json["name"], "alice");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");

        let back: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_state_response_field_names() {
        let state = StateResponse {
            time_left: 12.5,
            is_solved: false,
            solved_by: String::new(),
            target_grid: pattern(&[&[1]]),
            solved_grid: None,
            current_model: 1,
            total_models: 2,
            submission_count: 4,
            recent_history: vec![],
            auto_switch: true,
            leaderboard: vec![],
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_approx_eq!(json["timeLeft"].as_f64().unwrap(), 12.5, 1e-9);
        assert_eq!(json["isSolved"], false);
        assert_eq!(json["solvedBy"], "");
        assert_eq!(json["targetGrid"], serde_json::json!([[1]]));
        assert!(json["solvedGrid"].is_null());
        assert_eq!(json["currentModel"], 1);
        assert_eq!(json["totalModels"], 2);
        assert_eq!(json["submissionCount"], 4);
        assert_eq!(json["autoSwitch"], true);
    }

    #[test]
    fn test_timer_request_accepts_both_keys() {
        let new_key: TimerRequest = serde_json::from_str(r#"{"durationSec": 30}"#).unwrap();
        let old_key: TimerRequest = serde_json::from_str(r#"{"duration": 45}"#).unwrap();
        assert_eq!(new_key.duration_sec, 30);
        assert_eq!(old_key.duration_sec, 45);
    }

    #[test]
    fn test_submit_request_name_defaults_to_empty() {
        let req: SubmitRequest = serde_json::from_str(r#"{"grid": [["red"]]}"#).unwrap();
        assert_eq!(req.name, "");
        assert_eq!(req.grid, grid(&[&["red"]]));
    }

    #[test]
    fn test_action_response_constructors() {
        assert_eq!(
            ActionResponse::ok("done"),
            ActionResponse {
                success: true,
                message: "done".to_string()
            }
        );
        assert!(!ActionResponse::failed("nope").success);
    }
}
