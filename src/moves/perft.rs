//! Perft: counts leaf nodes of the legal move tree to a fixed depth. The
//! one validation tool that exercises the generator, make_move and the
//! legality filter together.

use std::time::Instant;

use tracing::{debug, instrument};

use crate::board::Position;
use crate::moves::movegen::{MoveFilter, generate_moves};
use crate::moves::types::MoveList;

pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut list = MoveList::new();
    generate_moves(MoveFilter::All, position, &mut list);

    let mut nodes = 0;
    for mv in list.iter() {
        let mut next = *position;
        if !next.make_move(mv) {
            continue;
        }
        nodes += if depth == 1 { 1 } else { perft(&next, depth - 1) };
    }
    nodes
}

/// Perft with a per-root-move breakdown printed to stdout, plus time and
/// NPS totals. This is what the `perft` UCI command runs.
#[instrument(skip(position))]
pub fn perft_divide(position: &Position, depth: u32) -> u64 {
    let start = Instant::now();

    let mut list = MoveList::new();
    generate_moves(MoveFilter::All, position, &mut list);

    let mut total = 0;
    for mv in list.iter() {
        let mut next = *position;
        if !next.make_move(mv) {
            continue;
        }
        let nodes = if depth <= 1 { 1 } else { perft(&next, depth - 1) };
        debug!(%mv, nodes, "divide");
        println!("{mv}: {nodes}");
        total += nodes;
    }

    let elapsed = start.elapsed().as_millis().max(1) as u64;
    println!();
    println!("Nodes: {total}");
    println!("Time: {elapsed}ms");
    println!("NPS: {}", 1000 * total / elapsed);
    total
}
