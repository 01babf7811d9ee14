//! Per-search state: the preallocated stack of per-ply nodes, node
//! counters and the stop machinery. Nothing here allocates during the
//! search itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::board::Position;
use crate::moves::types::Move;
use crate::search::MAX_SEARCH_DEPTH;
use crate::search::limits::SearchLimits;
use crate::search::ordering::OrderingTables;
use crate::search::tt::TranspositionTable;

/// The best line found under a node: the move played at each ply onward.
#[derive(Debug, Clone, Copy)]
pub struct PvLine {
    pub moves: [Move; MAX_SEARCH_DEPTH],
    pub len: usize,
}

impl Default for PvLine {
    fn default() -> Self {
        PvLine {
            moves: [Move::INVALID; MAX_SEARCH_DEPTH],
            len: 0,
        }
    }
}

impl PvLine {
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// This node's line becomes `mv` followed by the child's line.
    pub fn load(&mut self, mv: Move, child: &PvLine) {
        self.moves[0] = mv;
        for i in 0..child.len {
            self.moves[i + 1] = child.moves[i];
        }
        self.len = child.len + 1;
    }

    pub fn best_move(&self) -> Move {
        if self.len == 0 { Move::INVALID } else { self.moves[0] }
    }
}

/// One stack slot per ply; the search indexes slot `ply + 1` for the child.
#[derive(Debug, Clone, Copy)]
pub struct NodeData {
    pub position: Position,
    pub in_check: bool,
    pub alpha: i32,
    pub beta: i32,
    pub depth: i32,
    pub ply: u16,
    pub pv: PvLine,
    /// Move that produced this node; `NULL` after a null move, `INVALID`
    /// at the root.
    pub previous_move: Move,
}

impl Default for NodeData {
    fn default() -> Self {
        NodeData {
            position: Position::default(),
            in_check: false,
            alpha: 0,
            beta: 0,
            depth: 0,
            ply: 0,
            pv: PvLine::default(),
            previous_move: Move::INVALID,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub negamax_nodes: u64,
    pub quiescence_nodes: u64,
}

impl SearchStats {
    #[inline(always)]
    pub fn total_nodes(&self) -> u64 {
        self.negamax_nodes + self.quiescence_nodes
    }
}

/// Everything one search invocation touches. The transposition table and
/// ordering tables are borrowed from the engine-lifetime shared state; the
/// game history is read-only.
pub struct SearchContext<'a> {
    pub stack: Vec<NodeData>,
    pub stats: SearchStats,
    pub limits: SearchLimits,
    pub stop: &'a AtomicBool,
    /// Local latch so a tripped stop is not re-polled on every node.
    pub stopped: bool,
    pub tt: &'a mut TranspositionTable,
    pub ordering: &'a mut OrderingTables,
    pub game_history: &'a [u64],
}

impl<'a> SearchContext<'a> {
    pub fn new(
        limits: SearchLimits,
        stop: &'a AtomicBool,
        tt: &'a mut TranspositionTable,
        ordering: &'a mut OrderingTables,
        game_history: &'a [u64],
    ) -> SearchContext<'a> {
        SearchContext {
            stack: vec![NodeData::default(); MAX_SEARCH_DEPTH],
            stats: SearchStats::default(),
            limits,
            stop,
            stopped: false,
            tt,
            ordering,
            game_history,
        }
    }

    /// Node-entry abort check: the atomic stop flag on every call, the
    /// deadline once every 2048 visited nodes.
    pub fn should_abort(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.stop.load(Ordering::Relaxed) {
            self.stopped = true;
            return true;
        }
        if self.stats.total_nodes() & 2047 == 0 {
            if let Some(deadline) = self.limits.deadline {
                if Instant::now() >= deadline {
                    self.stop.store(true, Ordering::Relaxed);
                    self.stopped = true;
                    return true;
                }
            }
        }
        false
    }
}
