// Winner board: the view model handed to the UI for rendering.

use serde::Serialize;

use prizedraw_core::draw::{Winner, WinnerSelection};
use prizedraw_core::Record;

use crate::session::DrawSession;

pub const GRAND_PRIZE_LABEL: &str = "Grand Prize Winner";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEntry {
    pub label: String,
    pub display_name: String,
    pub pool_index: usize,
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinnerBoard {
    pub file_name: Option<String>,
    pub round: usize,
    pub grand_prize: BoardEntry,
    pub runners_up: Vec<BoardEntry>,
    /// Entries still eligible for a further draw.
    pub remaining: usize,
}

impl WinnerBoard {
    pub fn build(
        selection: &WinnerSelection,
        display_columns: &[String],
        file_name: Option<&str>,
        round: usize,
        remaining: usize,
    ) -> Self {
        let grand = selection.grand_prize();
        WinnerBoard {
            file_name: file_name.map(str::to_string),
            round,
            grand_prize: entry(GRAND_PRIZE_LABEL.to_string(), grand, display_columns),
            runners_up: selection
                .runners_up()
                .iter()
                .enumerate()
                .map(|(i, w)| entry(format!("Runner-up #{}", i + 1), w, display_columns))
                .collect(),
            remaining,
        }
    }

    /// Board for the session's current selection, if a draw has happened.
    pub fn from_session(session: &DrawSession) -> Option<Self> {
        let selection = session.current()?;
        Some(Self::build(
            selection,
            &session.config().roster.display_columns,
            session.file_name(),
            session.history().len(),
            session.remaining(),
        ))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Values of `columns` joined by a space; absent or empty values are skipped.
pub fn display_name(record: &Record, columns: &[String]) -> String {
    columns
        .iter()
        .filter_map(|c| record.get_text(c))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn entry(label: String, winner: &Winner, columns: &[String]) -> BoardEntry {
    BoardEntry {
        label,
        display_name: display_name(&winner.record, columns),
        pool_index: winner.pool_index,
        record: winner.record.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use prizedraw_core::DrawRng;

    fn session_with_draw() -> DrawSession {
        let mut session = DrawSession::with_rng(Config::default(), DrawRng::from_seed(5));
        session
            .upload(
                "friends.csv",
                "Order,First_Name,Last_Name\n1,Ada,Lovelace\n2,Grace,Hopper\n3,Alan,Turing\n4,Edsger,Dijkstra\n5,Barbara,Liskov\n6,Donald,\n",
            )
            .unwrap();
        session.draw().unwrap();
        session
    }

    #[test]
    fn labels_and_names() {
        let session = session_with_draw();
        let board = WinnerBoard::from_session(&session).unwrap();

        assert_eq!(board.grand_prize.label, "Grand Prize Winner");
        let labels: Vec<&str> = board.runners_up.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Runner-up #1", "Runner-up #2", "Runner-up #3", "Runner-up #4"]
        );
        assert_eq!(board.round, 1);
        assert_eq!(board.remaining, 1);
        assert_eq!(board.file_name.as_deref(), Some("friends.csv"));

        let selection = session.current().unwrap();
        assert_eq!(board.grand_prize.pool_index, selection.grand_prize().pool_index);
        assert_eq!(
            board.grand_prize.display_name,
            display_name(&selection.grand_prize().record, &session.config().roster.display_columns)
        );
    }

    #[test]
    fn display_name_skips_missing_and_empty() {
        let session = session_with_draw();
        let pool = session.pool();
        let cols = vec!["First_Name".to_string(), "Nickname".into(), "Last_Name".into()];
        assert_eq!(display_name(&pool[0], &cols), "Ada Lovelace");
        assert_eq!(display_name(&pool[5], &cols), "Donald");
    }

    #[test]
    fn no_board_before_first_draw() {
        let session = DrawSession::with_rng(Config::default(), DrawRng::from_seed(5));
        assert!(WinnerBoard::from_session(&session).is_none());
    }

    #[test]
    fn json_shape() {
        let session = session_with_draw();
        let board = WinnerBoard::from_session(&session).unwrap();
        let value: serde_json::Value = serde_json::from_str(&board.to_json().unwrap()).unwrap();
        assert_eq!(value["grand_prize"]["label"], "Grand Prize Winner");
        assert_eq!(value["runners_up"].as_array().unwrap().len(), 4);
        assert!(value["grand_prize"]["record"]["Order"].is_i64());
    }
}
