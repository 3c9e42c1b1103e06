use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{GameResult, ResultReporter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStats {
    pub games: u32,
    pub wins: u32,
}

/// Running totals for one player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub games_played: u32,
    pub total_score: u64,
    /// Highest final score in a won game
    pub best_score: u32,
    pub game_modes: BTreeMap<String, ModeStats>,
}

impl PlayerStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.games_played)
        }
    }
}

/// Ranking order for `Leaderboard::sorted`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    /// Wins, then win rate
    #[default]
    Wins,
    /// Win rate, then wins
    WinRate,
    GamesPlayed,
    BestScore,
}

/// In-memory player rankings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    players: BTreeMap<String, PlayerStats>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &GameResult) -> &PlayerStats {
        let player = self
            .players
            .entry(result.player_name.clone())
            .or_insert_with(|| PlayerStats::new(&result.player_name));

        player.games_played += 1;
        if result.won {
            player.wins += 1;
            player.best_score = player.best_score.max(result.final_score);
        } else {
            player.losses += 1;
        }
        player.total_score += u64::from(result.final_score);

        let mode = player.game_modes.entry(result.mode.clone()).or_default();
        mode.games += 1;
        if result.won {
            mode.wins += 1;
        }

        debug!(
            player = %result.player_name,
            won = result.won,
            mode = %result.mode,
            "result recorded"
        );
        player
    }

    pub fn player(&self, name: &str) -> Option<&PlayerStats> {
        self.players.get(name)
    }

    /// Best first; ties keep name order
    pub fn sorted(&self, sort_by: SortBy) -> Vec<&PlayerStats> {
        let mut players: Vec<&PlayerStats> = self.players.values().collect();
        players.sort_by(|a, b| match sort_by {
            SortBy::Wins => b
                .wins
                .cmp(&a.wins)
                .then_with(|| b.win_rate().total_cmp(&a.win_rate())),
            SortBy::WinRate => b
                .win_rate()
                .total_cmp(&a.win_rate())
                .then_with(|| b.wins.cmp(&a.wins)),
            SortBy::GamesPlayed => b.games_played.cmp(&a.games_played),
            SortBy::BestScore => b.best_score.cmp(&a.best_score),
        });
        players
    }

    pub fn top(&self, n: usize, sort_by: SortBy) -> Vec<&PlayerStats> {
        let mut players = self.sorted(sort_by);
        players.truncate(n);
        players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }
}

impl ResultReporter for Leaderboard {
    fn report(&mut self, result: &GameResult) {
        self.record(result);
    }
}
