//! Output formatting utilities for CLI.

use serde::Serialize;
use skirmish::MatchResult;

/// JSON-serializable match result.
#[derive(Debug, Serialize)]
pub(super) struct JsonMatchResult {
    /// Winning player (0 = tie).
    pub(super) winner: u8,
    /// End reason name.
    pub(super) reason: &'static str,
    /// Live tank counts, player 1 first.
    pub(super) remaining_tanks: [usize; 2],
    /// Ticks played.
    pub(super) rounds: u32,
    /// Final board, one string per row.
    pub(super) final_map: Vec<String>,
}

impl JsonMatchResult {
    /// Create from a match result.
    pub(super) fn from_result(result: &MatchResult) -> Self {
        Self {
            winner: result.winner,
            reason: result.reason.as_str(),
            remaining_tanks: result.remaining_tanks,
            rounds: result.rounds,
            final_map: result.final_view.lines(),
        }
    }
}

/// Format a match result as human-readable text.
pub(super) fn format_text(result: &MatchResult, name1: &str, name2: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Players: {name1} vs {name2}\n"));
    output.push_str(&format!("Result: {}\n", result.message()));
    output.push_str(&format!(
        "Remaining tanks: player 1 has {}, player 2 has {}\n",
        result.remaining_tanks[0], result.remaining_tanks[1]
    ));
    output.push_str(&format!("Rounds: {}\n\n", result.rounds));
    output.push_str("Final board:\n");
    for line in result.final_view.lines() {
        output.push_str(&format!("|{line}|\n"));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish::game::{BoardView, EndReason};

    fn sample() -> MatchResult {
        MatchResult {
            winner: 1,
            reason: EndReason::AllTanksDead,
            remaining_tanks: [2, 0],
            final_view: BoardView::blank(2, 2),
            rounds: 17,
        }
    }

    #[test]
    fn test_text_format_mentions_result() {
        let text = format_text(&sample(), "hybrid", "idle");
        assert!(text.contains("Player 1 won: ALL_TANKS_DEAD"));
        assert!(text.contains("Rounds: 17"));
    }

    #[test]
    fn test_json_round_trips_through_serde() {
        let json = serde_json::to_string(&JsonMatchResult::from_result(&sample())).unwrap();
        assert!(json.contains("\"winner\":1"));
        assert!(json.contains("ALL_TANKS_DEAD"));
    }
}
