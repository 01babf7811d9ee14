//! Draw detection inside the search: fifty-move rule, insufficient
//! material, and repetitions both within the tree and against the game
//! history.

use peregrine::board::Position;
use peregrine::game::Game;
use peregrine::moves::movegen::legal_moves;
use peregrine::search::limits::SearchLimits;
use peregrine::search::search::Search;

fn search_game(game: &Game, depth: u8) -> i32 {
    let mut search = Search::new(1024 * 1024);
    let (score, _, _) = search.run_blocking(game, SearchLimits::depth(depth));
    score
}

fn game_from(fen: &str) -> Game {
    let mut game = Game::new();
    game.record_position(Position::from_fen(fen).unwrap());
    game
}

#[test]
fn fifty_move_rule_neutralises_a_winning_position() {
    // a rook up, but every non-capturing move trips the hundred-ply clock
    let game = game_from("4k3/8/8/8/8/8/R7/4K3 w - - 99 1");
    assert_eq!(search_game(&game, 3), 0);

    // with a fresh clock the same position is clearly winning
    let game = game_from("4k3/8/8/8/8/8/R7/4K3 w - - 0 1");
    assert!(search_game(&game, 3) > 300);
}

#[test]
fn bare_minors_score_zero() {
    let game = game_from("4k3/8/8/8/8/8/8/2N1K3 w - - 0 1");
    assert_eq!(search_game(&game, 4), 0);

    let game = game_from("2b1k3/8/8/8/8/8/8/4K3 b - - 0 1");
    assert_eq!(search_game(&game, 4), 0);
}

#[test]
fn repetition_against_the_game_history_is_a_draw() {
    // build a game where the current position already occurred once
    let mut game = Game::new();
    let mut position = Position::startpos();
    game.record_position(position);

    for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        let mv = legal_moves(&position)
            .into_iter()
            .find(|m| m.to_uci() == uci)
            .unwrap();
        assert!(position.make_move(mv));
        game.record_position(position);
    }
    assert_eq!(position.hash, Position::startpos().hash);

    // any line that shuffles back to a position already in the history is
    // scored as a draw inside the search; the engine still must produce a
    // legal move
    let mut search = Search::new(1024 * 1024);
    let (_, best_move, _) = search.run_blocking(&game, SearchLimits::depth(4));
    assert!(legal_moves(&position).contains(&best_move));
}

#[test]
fn in_tree_repetition_is_seen_without_game_history() {
    // KQ vs KR fortress-ish shuffle: the search must not score a line that
    // repeats its own earlier position as progress. Just assert stability:
    // the search completes and yields a legal move at a depth deep enough
    // to contain repeated positions.
    let game = game_from("3k4/3q4/8/8/8/8/3Q4/3K4 w - - 0 1");
    let mut search = Search::new(1024 * 1024);
    let (_, best_move, _) = search.run_blocking(&game, SearchLimits::depth(6));
    assert!(
        legal_moves(&game.current_position()).contains(&best_move),
        "search returned an illegal move"
    );
}
