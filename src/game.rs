//! Game-level state: the current position plus the hashes of every
//! position reached in the actual game. The search reads the history only
//! for repetition detection above its own tree.

use crate::board::{Color, Position};

#[derive(Debug, Clone, Default)]
pub struct Game {
    history: Vec<u64>,
    current: Position,
    valid: bool,
}

impl Game {
    pub fn new() -> Game {
        Game::default()
    }

    /// Adopts `position` as current and appends its hash to the history.
    pub fn record_position(&mut self, position: Position) {
        self.current = position;
        self.history.push(position.hash);
        self.valid = true;
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.valid = false;
    }

    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline(always)]
    pub fn current_position(&self) -> Position {
        self.current
    }

    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.current.side_to_move
    }

    #[inline(always)]
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    pub fn check_repetition(&self, hash: u64) -> bool {
        self.history.iter().rev().any(|&h| h == hash)
    }
}
