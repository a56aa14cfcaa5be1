//! Turn loop: two players alternate on one board until a win or a tie.

use std::io::Write;

use anyhow::{Result, bail, ensure};
use tracing::info;

use crate::board::{Board, Move, Outcome, Symbol};
use crate::player::Player;

/// How a finished game went.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub outcome: Outcome,
    /// Name of the winning player, if any.
    pub winner: Option<String>,
    /// Moves in the order played.
    pub moves: Vec<(Symbol, Move)>,
}

pub struct Game {
    board: Board,
    players: [Box<dyn Player>; 2],
}

impl Game {
    /// `first` moves first. The players must hold different symbols.
    pub fn new(size: usize, first: Box<dyn Player>, second: Box<dyn Player>) -> Result<Self> {
        ensure!(size > 0, "board size must be positive");
        ensure!(
            first.symbol() != second.symbol(),
            "both players use {}",
            first.symbol()
        );
        Ok(Self {
            board: Board::new(size),
            players: [first, second],
        })
    }

    /// When nobody at the keyboard is playing, toss a coin for who starts.
    pub fn with_random_start(mut self) -> Self {
        if !self.players.iter().any(|p| p.is_interactive()) && fastrand::bool() {
            self.players.swap(0, 1);
        }
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Box<dyn Player>; 2] {
        &self.players
    }

    /// Play to the end, writing the board and results to `out`.
    pub fn play<W: Write>(&mut self, out: &mut W) -> Result<GameRecord> {
        let size = self.board.size();
        writeln!(out, "Starting game with {size}x{size} grid")?;
        writeln!(out, "Enter moves using numbers 1-{}", self.board.area())?;

        let mut moves = Vec::new();
        let mut turn = 0;
        loop {
            writeln!(out, "{}", self.board)?;

            let player = &mut self.players[turn % 2];
            let symbol = player.symbol();
            let mv = player.choose_move(&mut self.board)?;
            if !self.board.make_move(mv, symbol) {
                bail!("{} played illegal move {mv}", player.name());
            }
            moves.push((symbol, mv));
            writeln!(out, "{} plays {mv}", player.name())?;
            if let Some(report) = player.report() {
                writeln!(out, "{report}")?;
            }

            if let Some(outcome) = self.board.check_winner() {
                writeln!(out, "{}", self.board)?;
                let winner = match outcome {
                    Outcome::Win(_) => {
                        let p = &self.players[turn % 2];
                        writeln!(
                            out,
                            "{} wins! ({:.6} seconds.)",
                            p.name(),
                            p.thinking_time().as_secs_f64()
                        )?;
                        Some(p.name().to_string())
                    }
                    Outcome::Tie => {
                        writeln!(out, "It's a tie!")?;
                        for p in &self.players {
                            writeln!(
                                out,
                                "({} took {:.6} seconds)",
                                p.name(),
                                p.thinking_time().as_secs_f64()
                            )?;
                        }
                        None
                    }
                };
                info!(%outcome, winner = winner.as_deref(), plies = moves.len(), "game over");
                return Ok(GameRecord {
                    outcome,
                    winner,
                    moves,
                });
            }

            turn += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Algorithm;
    use crate::player::{AiPlayer, HumanPlayer};
    use std::io::Cursor;

    /// Plays a fixed list of moves, legal or not.
    struct Scripted {
        symbol: Symbol,
        moves: Vec<Move>,
    }

    impl Player for Scripted {
        fn name(&self) -> &str {
            "Scripted"
        }

        fn symbol(&self) -> Symbol {
            self.symbol
        }

        fn choose_move(&mut self, _board: &mut Board) -> Result<Move> {
            Ok(self.moves.remove(0))
        }
    }

    fn scripted(symbol: Symbol, moves: &[Move]) -> Box<dyn Player> {
        Box::new(Scripted {
            symbol,
            moves: moves.to_vec(),
        })
    }

    #[test]
    fn test_same_symbol_rejected() {
        let game = Game::new(3, scripted(Symbol::X, &[]), scripted(Symbol::X, &[]));
        assert!(game.is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        let game = Game::new(0, scripted(Symbol::X, &[]), scripted(Symbol::O, &[]));
        let err = game.err().unwrap();
        assert!(err.to_string().contains("board size"));
    }

    #[test]
    fn test_scripted_win() {
        let mut game = Game::new(3, scripted(Symbol::X, &[1, 2, 3]), scripted(Symbol::O, &[4, 5])).unwrap();
        let mut out = Vec::new();
        let record = game.play(&mut out).unwrap();
        assert_eq!(record.outcome, Outcome::Win(Symbol::X));
        assert_eq!(record.winner.as_deref(), Some("Scripted"));
        assert_eq!(record.moves.len(), 5);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Scripted wins!"));
    }

    #[test]
    fn test_illegal_move_is_error() {
        let mut game = Game::new(3, scripted(Symbol::X, &[1]), scripted(Symbol::O, &[1])).unwrap();
        let err = game.play(&mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("illegal move 1"));
    }

    #[test]
    fn test_human_vs_ai_blocked_is_tie() {
        // The human's lines all get blocked; the AI never loses.
        let human = HumanPlayer::new(
            "Player 1",
            Symbol::X,
            Cursor::new(b"5\n1\n3\n4\n8\n2\n6\n7\n9\n".to_vec()),
            Vec::new(),
        );
        let ai = AiPlayer::new("AI (Alpha-Beta)", Symbol::O, Algorithm::AlphaBeta);
        let mut game = Game::new(3, Box::new(human), Box::new(ai)).unwrap();
        let record = game.play(&mut Vec::new()).unwrap();
        assert_ne!(record.outcome, Outcome::Win(Symbol::X));
    }

    #[test]
    fn test_random_start_keeps_human_first() {
        for _ in 0..8 {
            let human = HumanPlayer::new("Player 1", Symbol::X, Cursor::new(Vec::new()), Vec::new());
            let ai = AiPlayer::new("AI", Symbol::O, Algorithm::Minimax);
            let game = Game::new(3, Box::new(human), Box::new(ai))
                .unwrap()
                .with_random_start();
            assert_eq!(game.players()[0].symbol(), Symbol::X);
        }
    }
}
