//! Iterative-deepening negamax with fail-soft alpha-beta, quiescence and
//! the usual pruning set: aspiration windows, transposition cutoffs,
//! reverse futility, null move, late-move pruning and reductions. A single
//! worker thread runs the search; the control thread only flips the atomic
//! stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::board::{PieceType, Position};
use crate::game::Game;
use crate::moves::movegen::legal_moves;
use crate::moves::types::Move;
use crate::search::context::{SearchContext, SearchStats};
use crate::search::eval::{evaluate, insufficient_material};
use crate::search::limits::SearchLimits;
use crate::search::ordering::OrderingTables;
use crate::search::picker::MovePicker;
use crate::search::tt::{Bound, TranspositionTable, score_from_tt, score_to_tt};
use crate::search::{
    CHECKMATE_IN_MAX_PLY, CHECKMATE_VALUE, DRAW_VALUE, INF_VALUE, INVALID_SCORE, MAX_SEARCH_DEPTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Root,
    Pv,
    NonPv,
}

// Aspiration windows
const ASPIRATION_MIN_DEPTH: i32 = 4;
const ASPIRATION_DELTA: i32 = 20;

// Reverse futility pruning
const RFP_MAX_DEPTH: i32 = 8;
const RFP_MARGIN_BASE: i32 = 10;
const RFP_MARGIN_PER_DEPTH: i32 = 75;

// Null-move pruning
const NMP_MIN_DEPTH: i32 = 2;

// Late-move pruning
const LMP_BASE: u32 = 3;
const LMP_PER_DEPTH: u32 = 8;

/// `LMR[depth][move_count] = clamp(1 + 0.5 ln(d) ln(i), 0, 64)`, with the
/// first two depth rows and the first move column forced to zero.
static LMR_TABLE: Lazy<[[i32; 64]; 64]> = Lazy::new(|| {
    let mut table = [[0i32; 64]; 64];
    for depth in 2..64 {
        for count in 1..64 {
            let r = 1.0 + 0.5 * (depth as f64).ln() * (count as f64).ln();
            table[depth][count] = r.clamp(0.0, 64.0) as i32;
        }
    }
    table
});

#[inline]
fn lmr_reduction(depth: i32, move_count: u32) -> i32 {
    LMR_TABLE[depth.clamp(0, 63) as usize][move_count.min(63) as usize]
}

/// Engine-lifetime search state: the transposition table persists across
/// `go` commands, the ordering tables across moves of one game.
pub struct SharedTables {
    pub tt: TranspositionTable,
    pub ordering: OrderingTables,
}

/// Search driver owning the worker thread. `start_search` spawns a worker
/// that locks the shared tables for the duration of one search;
/// `stop_search` flips the stop flag and joins.
pub struct Search {
    stop: Arc<AtomicBool>,
    shared: Arc<Mutex<SharedTables>>,
    worker: Option<JoinHandle<()>>,
}

impl Search {
    pub fn new(tt_bytes: usize) -> Search {
        Search {
            stop: Arc::new(AtomicBool::new(false)),
            shared: Arc::new(Mutex::new(SharedTables {
                tt: TranspositionTable::new(tt_bytes),
                ordering: OrderingTables::new(),
            })),
            worker: None,
        }
    }

    /// Launches the worker; any previous search is stopped first.
    pub fn start_search(&mut self, game: &Game, limits: SearchLimits) {
        self.stop_search();
        self.stop.store(false, Ordering::Relaxed);

        let stop = Arc::clone(&self.stop);
        let shared = Arc::clone(&self.shared);
        let game = game.clone();

        self.worker = Some(std::thread::spawn(move || {
            let mut guard = shared.lock().unwrap();
            let tables = &mut *guard;
            let mut ctx = SearchContext::new(
                limits,
                stop.as_ref(),
                &mut tables.tt,
                &mut tables.ordering,
                game.history(),
            );
            iterative_deepening(&mut ctx, game.current_position());
        }));
    }

    /// Signals the worker and joins it. Idempotent.
    pub fn stop_search(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Runs a search on the calling thread; used by `bench` and tests.
    pub fn run_blocking(&mut self, game: &Game, limits: SearchLimits) -> (i32, Move, SearchStats) {
        self.stop_search();
        self.stop.store(false, Ordering::Relaxed);

        let shared = Arc::clone(&self.shared);
        let mut guard = shared.lock().unwrap();
        let tables = &mut *guard;
        let mut ctx = SearchContext::new(
            limits,
            self.stop.as_ref(),
            &mut tables.tt,
            &mut tables.ordering,
            game.history(),
        );
        let (score, best_move) = iterative_deepening(&mut ctx, game.current_position());
        let stats = ctx.stats;
        (score, best_move, stats)
    }

    /// `ucinewgame`: drop the transposition table and ordering history.
    pub fn new_game(&mut self) {
        self.stop_search();
        let mut guard = self.shared.lock().unwrap();
        guard.tt.clear();
        guard.ordering.clear();
    }

    pub fn set_tt_size(&mut self, bytes: usize) {
        self.stop_search();
        self.shared.lock().unwrap().tt.resize(bytes);
    }
}

impl Drop for Search {
    fn drop(&mut self) {
        self.stop_search();
    }
}

/// Depth 1, 2, 3, ... until the limit or the clock ends the loop; each
/// depth runs under an aspiration window centred on the previous score.
/// Reports an info line per completed depth and `bestmove` at the end.
pub fn iterative_deepening(ctx: &mut SearchContext, root: Position) -> (i32, Move) {
    ctx.stack[0].position = root;
    ctx.stack[0].previous_move = Move::INVALID;
    ctx.stack[0].ply = 0;

    let mut best_move = Move::INVALID;
    let mut best_score = 0;
    let mut previous_score = 0;

    for depth in 1..=ctx.limits.depth_limit as i32 {
        let score = aspiration_search(ctx, depth, previous_score);
        if ctx.stopped {
            break;
        }

        previous_score = score;
        best_score = score;
        best_move = ctx.stack[0].pv.best_move();
        report_info(ctx, depth, score);
    }

    if !best_move.is_valid() {
        // stopped before depth 1 completed; fall back to any legal move
        best_move = legal_moves(&root).first().copied().unwrap_or(Move::INVALID);
    }
    println!("bestmove {}", best_move.to_uci());
    (best_score, best_move)
}

/// Searches one depth with a window centred on the previous score, widening
/// on failure: beta grows upward on fail-high; on fail-low alpha drops and
/// beta is pulled toward it.
fn aspiration_search(ctx: &mut SearchContext, depth: i32, previous_score: i32) -> i32 {
    let mut delta = ASPIRATION_DELTA;
    let (mut alpha, mut beta) = if depth < ASPIRATION_MIN_DEPTH {
        (-INF_VALUE, INF_VALUE)
    } else {
        (
            (previous_score - delta).max(-INF_VALUE),
            (previous_score + delta).min(INF_VALUE),
        )
    };

    loop {
        let root = &mut ctx.stack[0];
        root.alpha = alpha;
        root.beta = beta;
        root.depth = depth;

        let score = negamax(ctx, 0, NodeKind::Root);
        if ctx.stopped {
            return score;
        }

        if score >= beta {
            beta = (beta + delta).min(INF_VALUE);
        } else if score <= alpha {
            alpha = (alpha - delta).max(-INF_VALUE);
            beta = (alpha + beta + 1) / 2;
        } else {
            return score;
        }
        delta += delta / 2;
        debug!(depth, alpha, beta, "aspiration re-search");
    }
}

fn negamax(ctx: &mut SearchContext, ply: usize, kind: NodeKind) -> i32 {
    if ctx.should_abort() {
        return INVALID_SCORE;
    }
    ctx.stats.negamax_nodes += 1;

    let is_root = kind == NodeKind::Root;
    let is_pv = kind != NodeKind::NonPv;

    let pos = ctx.stack[ply].position;
    let mut alpha = ctx.stack[ply].alpha;
    let beta = ctx.stack[ply].beta;
    let depth = ctx.stack[ply].depth;
    let old_alpha = alpha;
    ctx.stack[ply].pv.clear();

    if !is_root
        && (pos.half_move_counter >= 100 || insufficient_material(&pos) || is_repetition(ctx, ply))
    {
        return DRAW_VALUE;
    }

    let in_check = pos.is_in_check(pos.side_to_move);
    ctx.stack[ply].in_check = in_check;

    if depth <= 0 {
        return quiescence(ctx, ply);
    }
    if ply >= MAX_SEARCH_DEPTH - 1 {
        return evaluate(&pos);
    }

    let mut tt_move = Move::INVALID;
    if let Some(entry) = ctx.tt.probe(pos.hash) {
        tt_move = entry.mv;
        if !is_root && entry.depth as i32 >= depth {
            let score = score_from_tt(entry.score as i32, ply as i32);
            match entry.bound {
                Bound::Exact => return score,
                Bound::Lower if score >= beta => return score,
                Bound::Upper if score <= alpha => return score,
                _ => {}
            }
        }
    }

    if kind == NodeKind::NonPv && !in_check {
        let static_eval = evaluate(&pos);

        // reverse futility: statically far enough above beta
        if depth <= RFP_MAX_DEPTH
            && static_eval - (RFP_MARGIN_BASE + RFP_MARGIN_PER_DEPTH * depth) >= beta
        {
            return static_eval;
        }

        // null move: hand over the turn and verify beta still holds
        if depth >= NMP_MIN_DEPTH
            && !ctx.stack[ply].previous_move.is_null()
            && pos.has_non_pawn_material(pos.side_to_move)
            && static_eval >= beta
        {
            let mut null_pos = pos;
            null_pos.make_null_move();

            let child = &mut ctx.stack[ply + 1];
            child.position = null_pos;
            child.previous_move = Move::NULL;
            child.ply = (ply + 1) as u16;
            child.alpha = -beta;
            child.beta = -beta + 1;
            child.depth = depth - (depth / 4 + 4);

            let score = -negamax(ctx, ply + 1, NodeKind::NonPv);
            if ctx.stopped {
                return INVALID_SCORE;
            }
            if score >= beta {
                // a null-move mate proves nothing
                return if score >= CHECKMATE_IN_MAX_PLY { beta } else { score };
            }
        }
    }

    let mut picker = MovePicker::new(
        &pos,
        tt_move,
        ctx.ordering.killers(ply),
        ctx.ordering.counter_for(ctx.stack[ply].previous_move),
    );

    let mut best_score = -INF_VALUE;
    let mut best_move = Move::INVALID;
    let mut move_count: u32 = 0;
    let mut quiet_move_count: u32 = 0;
    let mut skip_quiet = false;

    while let Some(mv) = picker.next(ctx.ordering, skip_quiet, false) {
        let mut child_pos = pos;
        if !child_pos.make_move(mv) {
            continue;
        }
        move_count += 1;
        if mv.is_quiet() {
            quiet_move_count += 1;
        }

        // late-move pruning: enough quiets tried, the rest are noise
        if kind == NodeKind::NonPv
            && !in_check
            && quiet_move_count >= LMP_BASE + LMP_PER_DEPTH * depth as u32
        {
            skip_quiet = true;
        }

        let mut reduction = lmr_reduction(depth, move_count);
        if !mv.is_quiet() {
            reduction /= 2;
        }

        {
            let child = &mut ctx.stack[ply + 1];
            child.position = child_pos;
            child.previous_move = mv;
            child.ply = (ply + 1) as u16;
        }

        let mut score;
        if is_pv && move_count == 1 {
            set_window(ctx, ply + 1, -beta, -alpha, depth - 1);
            score = -negamax(ctx, ply + 1, NodeKind::Pv);
        } else {
            // null window, reduced first when late
            let null_window_depth = if reduction > 0 { depth - reduction - 1 } else { depth - 1 };
            set_window(ctx, ply + 1, -(alpha + 1), -alpha, null_window_depth);
            score = -negamax(ctx, ply + 1, NodeKind::NonPv);
            if ctx.stopped {
                return INVALID_SCORE;
            }

            if reduction > 0 && score > alpha {
                set_window(ctx, ply + 1, -(alpha + 1), -alpha, depth - 1);
                score = -negamax(ctx, ply + 1, NodeKind::NonPv);
                if ctx.stopped {
                    return INVALID_SCORE;
                }
            }

            if is_pv && score > alpha && (is_root || score < beta) {
                set_window(ctx, ply + 1, -beta, -alpha, depth - 1);
                score = -negamax(ctx, ply + 1, NodeKind::Pv);
            }
        }
        if ctx.stopped {
            return INVALID_SCORE;
        }

        if score > best_score {
            best_score = score;
        }
        if score > alpha {
            alpha = score;
            best_move = mv;

            let child_pv = ctx.stack[ply + 1].pv;
            ctx.stack[ply].pv.load(mv, &child_pv);

            if score >= beta {
                break;
            }
        }
    }

    if move_count == 0 {
        return if in_check {
            -(CHECKMATE_VALUE - ply as i32)
        } else {
            DRAW_VALUE
        };
    }

    // a quiet refutation feeds every quiet-ordering heuristic
    if best_score >= beta && best_move.is_valid() && best_move.is_quiet() {
        ctx.ordering.update_history(pos.side_to_move, best_move, depth);
        ctx.ordering.update_killers(ply, best_move);
        ctx.ordering
            .update_counter(ctx.stack[ply].previous_move, best_move);
    }

    if !ctx.stopped {
        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score > old_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        ctx.tt.write(
            pos.hash,
            depth as i16,
            score_to_tt(best_score, ply as i32),
            best_move,
            bound,
        );
    }

    best_score
}

/// Capture-only search below the horizon, fail-soft from the stand-pat
/// evaluation. Probes and stores the transposition table at depth 0.
fn quiescence(ctx: &mut SearchContext, ply: usize) -> i32 {
    if ctx.should_abort() {
        return INVALID_SCORE;
    }
    ctx.stats.quiescence_nodes += 1;

    let pos = ctx.stack[ply].position;
    let mut alpha = ctx.stack[ply].alpha;
    let beta = ctx.stack[ply].beta;
    let old_alpha = alpha;

    let stand_pat = evaluate(&pos);
    if ply >= MAX_SEARCH_DEPTH - 1 {
        return stand_pat;
    }

    let mut tt_move = Move::INVALID;
    if let Some(entry) = ctx.tt.probe(pos.hash) {
        tt_move = entry.mv;
        let score = score_from_tt(entry.score as i32, ply as i32);
        match entry.bound {
            Bound::Exact => return score,
            Bound::Lower if score >= beta => return score,
            Bound::Upper if score <= alpha => return score,
            _ => {}
        }
    }

    let mut best_score = stand_pat;
    if best_score >= beta {
        return stand_pat;
    }
    if alpha < best_score {
        alpha = best_score;
    }

    let mut best_move = Move::INVALID;
    let mut picker = MovePicker::new_quiescence(&pos, tt_move);

    while let Some(mv) = picker.next(ctx.ordering, true, false) {
        let mut child_pos = pos;
        if !child_pos.make_move(mv) {
            continue;
        }

        {
            let child = &mut ctx.stack[ply + 1];
            child.position = child_pos;
            child.previous_move = mv;
            child.ply = (ply + 1) as u16;
            child.alpha = -beta;
            child.beta = -alpha;
        }

        let score = -quiescence(ctx, ply + 1);
        if ctx.stopped {
            return INVALID_SCORE;
        }

        if score > best_score {
            best_score = score;
        }
        if score > alpha {
            alpha = score;
            best_move = mv;
            if score >= beta {
                break;
            }
        }
    }

    if !ctx.stopped {
        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score > old_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        ctx.tt
            .write(pos.hash, 0, score_to_tt(best_score, ply as i32), best_move, bound);
    }

    best_score
}

#[inline]
fn set_window(ctx: &mut SearchContext, ply: usize, alpha: i32, beta: i32, depth: i32) {
    let node = &mut ctx.stack[ply];
    node.alpha = alpha;
    node.beta = beta;
    node.depth = depth;
}

/// Walks the search stack toward the root over reversible moves, comparing
/// hashes at every second ply (same side to move); past an irreversible
/// move nothing earlier can match. Falls back to the game history, where a
/// single prior occurrence already counts as a repetition draw.
fn is_repetition(ctx: &SearchContext, ply: usize) -> bool {
    let current_hash = ctx.stack[ply].position.hash;

    let mut p = ply;
    while p > 0 {
        let mv = ctx.stack[p].previous_move;
        if !mv.is_null() && (mv.is_capture() || mv.piece().piece_type() == PieceType::Pawn) {
            return false;
        }
        p -= 1;
        if (ply - p) % 2 == 0 && ctx.stack[p].position.hash == current_hash {
            return true;
        }
    }

    ctx.game_history.iter().rev().any(|&h| h == current_hash)
}

fn report_info(ctx: &SearchContext, depth: i32, score: i32) {
    let nodes = ctx.stats.total_nodes();
    let elapsed = Instant::now()
        .duration_since(ctx.limits.start_time)
        .as_millis()
        .max(1) as u64;
    let nps = nodes * 1000 / elapsed;

    let score_text = if score > CHECKMATE_IN_MAX_PLY {
        format!("mate {}", (CHECKMATE_VALUE - score + 1) / 2)
    } else if score < -CHECKMATE_IN_MAX_PLY {
        format!("mate -{}", (CHECKMATE_VALUE + score + 1) / 2)
    } else {
        format!("cp {score}")
    };

    let pv = &ctx.stack[0].pv;
    let mut pv_text = String::new();
    for i in 0..pv.len {
        if i > 0 {
            pv_text.push(' ');
        }
        pv_text.push_str(&pv.moves[i].to_uci());
    }

    println!(
        "info depth {depth} nodes {nodes} time {elapsed}ms nps {nps} score {score_text} pv {pv_text}"
    );
}
