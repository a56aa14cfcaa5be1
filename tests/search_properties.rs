//! Property-based tests using proptest.

use proptest::prelude::*;

use tictactoe_minimax::board::{Board, Move, Symbol};
use tictactoe_minimax::search::{Algorithm, SearchConfig, find_best_move};
use tictactoe_minimax::trace::NoopRecorder;

/// A position reached by alternating X and O through `order`, stopping after
/// `plies` moves or at the end of the game. Returns the board and the side to
/// move.
fn play_out(size: usize, order: &[Move], plies: usize) -> (Board, Symbol) {
    let mut board = Board::new(size);
    let mut symbol = Symbol::X;
    for &mv in order.iter().take(plies) {
        if board.check_winner().is_some() {
            break;
        }
        assert!(board.make_move(mv, symbol));
        symbol = symbol.opponent();
    }
    (board, symbol)
}

/// Board size, a shuffled move order, and how many plies to play.
fn position_strategy(sizes: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = (usize, Vec<Move>, usize)> {
    sizes.prop_flat_map(|n| {
        let cells: Vec<Move> = (1..=n * n).collect();
        (Just(n), Just(cells).prop_shuffle(), 0..=n * n)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: make_move followed by undo_move restores the board exactly
    #[test]
    fn prop_make_undo_restores_board(
        (size, order, plies) in position_strategy(3..=5),
        pick in any::<prop::sample::Index>(),
        o_moves in any::<bool>(),
    ) {
        let (mut board, _) = play_out(size, &order, plies);
        let moves = board.get_available_moves();
        prop_assume!(!moves.is_empty());

        let before = board.clone();
        let mv = moves[pick.index(moves.len())];
        let symbol = if o_moves { Symbol::O } else { Symbol::X };
        prop_assert!(board.make_move(mv, symbol));
        prop_assert!(!board.is_valid_move(mv));
        board.undo_move(mv);
        prop_assert_eq!(board, before);
    }

    /// Property: an occupied cell never accepts a second move
    #[test]
    fn prop_occupied_move_rejected((size, order, plies) in position_strategy(3..=4)) {
        let (mut board, _) = play_out(size, &order, plies.max(1));
        let before = board.clone();
        prop_assert!(!board.make_move(order[0], Symbol::O));
        prop_assert_eq!(board, before);
    }

    /// Property: available moves are ascending and exactly the empty cells
    #[test]
    fn prop_available_moves_sorted((size, order, plies) in position_strategy(3..=5)) {
        let (board, _) = play_out(size, &order, plies);
        let moves = board.get_available_moves();
        prop_assert!(moves.windows(2).all(|w| w[0] < w[1]));
        for mv in 1..=board.area() {
            prop_assert_eq!(moves.contains(&mv), board.is_valid_move(mv));
        }
    }

    /// Property: alpha-beta picks the same move and score as minimax and
    /// leaves the board untouched
    #[test]
    fn prop_alpha_beta_equals_minimax((size, order, plies) in position_strategy(3..=4)) {
        // Keep at most 7 empty cells so plain minimax stays fast.
        let plies = plies.max(size * size - 7);
        let (mut board, to_move) = play_out(size, &order, plies);
        prop_assume!(board.check_winner().is_none());

        let before = board.clone();
        let plain = find_best_move(&mut board, to_move, &SearchConfig::new(Algorithm::Minimax), NoopRecorder)
            .unwrap();
        let pruned = find_best_move(&mut board, to_move, &SearchConfig::new(Algorithm::AlphaBeta), NoopRecorder)
            .unwrap();

        prop_assert_eq!(&board, &before);
        prop_assert!(board.is_valid_move(pruned.mv));
        prop_assert_eq!(plain.mv, pruned.mv);
        prop_assert_eq!(plain.score, pruned.score);
        prop_assert!(pruned.stats.nodes <= plain.stats.nodes);
    }
}
