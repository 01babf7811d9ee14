//! UCI front end: reads commands from stdin, drives the engine, and prints
//! protocol replies on stdout. Malformed input is ignored or answered with
//! an `info string error`; the engine never dies on bad input.

use std::io::{self, BufRead};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use peregrine::board::Position;
use peregrine::game::Game;
use peregrine::moves::movegen::legal_moves;
use peregrine::moves::perft::perft_divide;
use peregrine::moves::types::Move;
use peregrine::search::eval::evaluate;
use peregrine::search::limits::{SearchLimits, TimeControl, allocate_time};
use peregrine::search::search::Search;
use peregrine::search::tt::TranspositionTable;
use peregrine::board::Color;

const ENGINE_NAME: &str = "Peregrine 0.1";
const ENGINE_AUTHOR: &str = "the Peregrine authors";

const HASH_MIN_MB: usize = 1;
const HASH_MAX_MB: usize = 1024;

const BENCH_DEPTH: u8 = 5;
const BENCH_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "r1bq1rk1/pp2ppbp/2np1np1/8/2PNP3/2N1B3/PP2BPPP/R2QK2R w KQ - 0 9",
    "2rq1rk1/pb1nbppp/1p2pn2/2p5/2BP4/1PN1PN2/PB2QPPP/R2R2K1 w - - 0 12",
    "8/8/1p1k4/p4p2/P2K1P2/1P6/8/8 w - - 0 1",
    "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
];

struct Uci {
    game: Game,
    search: Search,
}

impl Uci {
    fn new() -> Uci {
        Uci {
            game: Game::new(),
            search: Search::new(TranspositionTable::DEFAULT_SIZE_MB * 1024 * 1024),
        }
    }

    fn run(&mut self) {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(&command) = tokens.first() else {
                continue;
            };

            match command {
                "uci" => {
                    println!("id name {ENGINE_NAME}");
                    println!("id author {ENGINE_AUTHOR}");
                    println!(
                        "option name Hash type spin default {} min {HASH_MIN_MB} max {HASH_MAX_MB}",
                        TranspositionTable::DEFAULT_SIZE_MB
                    );
                    println!("uciok");
                }
                "isready" => println!("readyok"),
                "ucinewgame" => self.search.new_game(),
                "setoption" => self.handle_setoption(&tokens),
                "position" => self.handle_position(&tokens),
                "go" => self.handle_go(&tokens),
                "stop" => self.search.stop_search(),
                "bench" => self.bench(),
                "perft" => self.handle_perft(&tokens),
                "eval" => self.handle_eval(),
                "d" => {
                    if self.game.is_valid() {
                        println!("{}", self.game.current_position());
                    }
                }
                "quit" => break,
                _ => {}
            }
        }
        self.search.stop_search();
    }

    fn handle_setoption(&mut self, tokens: &[&str]) {
        // setoption name Hash value N
        let name = tokens.iter().position(|&t| t == "name").map(|i| tokens.get(i + 1));
        let value = tokens.iter().position(|&t| t == "value").map(|i| tokens.get(i + 1));
        match (name, value) {
            (Some(Some(&"Hash")), Some(Some(value))) => match value.parse::<usize>() {
                Ok(mb) => {
                    let mb = mb.clamp(HASH_MIN_MB, HASH_MAX_MB);
                    self.search.set_tt_size(mb * 1024 * 1024);
                }
                Err(_) => println!("info string error: invalid Hash value"),
            },
            _ => println!("info string error: unknown option"),
        }
    }

    fn handle_position(&mut self, tokens: &[&str]) {
        self.game.reset();

        let mut position = Position::default();
        let mut moves_index = None;

        match tokens.get(1) {
            Some(&"startpos") => {
                position = Position::startpos();
                moves_index = tokens.iter().position(|&t| t == "moves");
            }
            Some(&"fen") => {
                let fen_end = tokens
                    .iter()
                    .position(|&t| t == "moves")
                    .unwrap_or(tokens.len());
                let fen = tokens[2..fen_end].join(" ");
                match Position::from_fen(&fen) {
                    Ok(parsed) => position = parsed,
                    Err(_) => {
                        println!("info string error: invalid command");
                        return;
                    }
                }
                if fen_end < tokens.len() {
                    moves_index = Some(fen_end);
                }
            }
            _ => {
                println!("info string error: invalid command");
                return;
            }
        }

        self.game.record_position(position);

        if let Some(index) = moves_index {
            for text in &tokens[index + 1..] {
                // an unknown move ends the list; the position so far stands
                let Some(mv) = parse_uci_move(&position, text) else {
                    break;
                };
                let mut next = position;
                if !next.make_move(mv) {
                    break;
                }
                position = next;
                self.game.record_position(position);
            }
        }
    }

    fn handle_go(&mut self, tokens: &[&str]) {
        if !self.game.is_valid() {
            println!("info string error: position not set");
            return;
        }

        let mut depth: Option<u8> = None;
        let mut control = TimeControl::default();
        let mut wtime = None;
        let mut btime = None;
        let mut winc = None;
        let mut binc = None;

        let mut iter = tokens.iter().skip(1);
        while let Some(&token) = iter.next() {
            let mut next_number = || iter.next().and_then(|t| t.parse::<u64>().ok());
            match token {
                "depth" => depth = next_number().map(|d| d.min(255) as u8),
                "wtime" => wtime = next_number().map(Duration::from_millis),
                "btime" => btime = next_number().map(Duration::from_millis),
                "winc" => winc = next_number().map(Duration::from_millis),
                "binc" => binc = next_number().map(Duration::from_millis),
                "movestogo" => control.moves_to_go = next_number().map(|n| n as u32),
                "movetime" => control.move_time = next_number().map(Duration::from_millis),
                "infinite" => {}
                _ => {}
            }
        }

        match self.game.side_to_move() {
            Color::White => {
                control.remaining = wtime;
                control.increment = winc;
            }
            Color::Black => {
                control.remaining = btime;
                control.increment = binc;
            }
        }

        let mut limits = match depth {
            Some(d) => SearchLimits::depth(d),
            None => SearchLimits::infinite(),
        };
        if let Some(budget) = allocate_time(&control) {
            limits.deadline = Some(limits.start_time + budget);
        }

        self.search.start_search(&self.game, limits);
    }

    fn handle_perft(&mut self, tokens: &[&str]) {
        if !self.game.is_valid() {
            println!("info string error: position not set");
            return;
        }
        let depth = tokens
            .iter()
            .position(|&t| t == "depth")
            .and_then(|i| tokens.get(i + 1))
            .or_else(|| tokens.get(1))
            .and_then(|t| t.parse::<u32>().ok())
            .unwrap_or(5);
        perft_divide(&self.game.current_position(), depth);
    }

    fn handle_eval(&self) {
        if !self.game.is_valid() {
            println!("info string error: position not set");
            return;
        }
        println!(
            "Evaluation value: {}",
            evaluate(&self.game.current_position())
        );
    }

    /// Fixed-depth sweep over the bench positions, fresh tables for each,
    /// reporting total nodes and NPS at the end.
    fn bench(&mut self) {
        let bar = ProgressBar::new(BENCH_FENS.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("bench [{bar:30}] {pos}/{len}")
                .expect("valid template")
                .progress_chars("=> "),
        );

        let start = Instant::now();
        let mut total_nodes = 0u64;

        for fen in BENCH_FENS {
            let position = Position::from_fen(fen).expect("bench FEN is valid");
            let mut game = Game::new();
            game.record_position(position);

            self.search.new_game();
            let (_, _, stats) = self
                .search
                .run_blocking(&game, SearchLimits::depth(BENCH_DEPTH));
            total_nodes += stats.total_nodes();
            bar.inc(1);
        }
        bar.finish_and_clear();

        let elapsed = start.elapsed().as_millis().max(1) as u64;
        let nps = 1000 * total_nodes / elapsed;
        println!("===========================");
        println!("Total time (ms) : {elapsed}");
        println!("Nodes searched  : {total_nodes}");
        println!("Nodes/second    : {nps}");
        println!("{total_nodes} nodes {nps} nps");
    }
}

/// Resolves long-algebraic move text against the legal moves of `position`.
fn parse_uci_move(position: &Position, text: &str) -> Option<Move> {
    let text = text.to_ascii_lowercase();
    legal_moves(position).into_iter().find(|mv| mv.to_uci() == text)
}

fn main() {
    if std::env::var_os("PEREGRINE_LOG").is_some() {
        peregrine::logger::init_logging("logs/peregrine.log", "peregrine=debug,info");
    }

    let args: Vec<String> = std::env::args().collect();
    let mut uci = Uci::new();

    if args.get(1).map(String::as_str) == Some("bench") {
        uci.bench();
        return;
    }
    uci.run();
}
