//! Minimax and alpha-beta game-tree search.
//!
//! Both searches work on one shared [`Board`], applying and undoing moves as
//! they recurse. Every move made inside a call is undone before that call
//! returns, including when the search is cut short by a deadline, so the
//! board a caller hands in comes back unchanged.
//!
//! Scores are from the point of view of the owning symbol: `WIN_SCORE - depth`
//! for a win, `depth - WIN_SCORE` for a loss, 0 for a tie. Subtracting depth
//! makes the search take the quickest win and put off a loss.
//!
//! A deadline is checked when each call starts. Once it has passed the
//! search returns [`SearchAborted`] all the way up; [`find_best_move`] then
//! keeps the best fully searched root move.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::board::{Board, Move, Outcome, Symbol};
use crate::constants::{INFINITY, Score, WIN_SCORE};
use crate::trace::{NodeId, NodeState, NoopRecorder, Recorder};

/// Which decision procedure to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Algorithm {
    Minimax,
    #[default]
    AlphaBeta,
}

/// The search deadline passed before the search finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("search deadline exceeded")]
pub struct SearchAborted;

/// Counters collected during a search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search calls made (internal and terminal positions).
    pub nodes: u64,
    /// Terminal positions scored.
    pub leaves: u64,
    /// Alpha-beta cutoffs taken.
    pub cutoffs: u64,
}

/// Search state shared by one decision.
pub struct Search<R = NoopRecorder> {
    owner: Symbol,
    deadline: Option<Instant>,
    recorder: R,
    stats: SearchStats,
}

impl Search<NoopRecorder> {
    /// Search on behalf of `owner`, with no deadline and no tracing.
    pub fn new(owner: Symbol) -> Self {
        Self::with_recorder(owner, NoopRecorder)
    }
}

impl<R: Recorder> Search<R> {
    pub fn with_recorder(owner: Symbol, recorder: R) -> Self {
        Self {
            owner,
            deadline: None,
            recorder,
            stats: SearchStats::default(),
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn owner(&self) -> Symbol {
        self.owner
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn recorder_mut(&mut self) -> &mut R {
        &mut self.recorder
    }

    /// True once the deadline, if any, has passed.
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn check_deadline(&self) -> Result<(), SearchAborted> {
        if self.expired() {
            Err(SearchAborted)
        } else {
            Ok(())
        }
    }

    /// Score a finished position, or `None` if play goes on.
    pub fn terminal_score(&self, board: &Board, depth: u32) -> Option<Score> {
        let depth = depth as Score;
        match board.check_winner()? {
            Outcome::Win(s) if s == self.owner => Some(WIN_SCORE - depth),
            Outcome::Win(_) => Some(depth - WIN_SCORE),
            Outcome::Tie => Some(0),
        }
    }

    /// The symbol that moves at this level.
    #[inline]
    fn mover(&self, maximizing: bool) -> Symbol {
        if maximizing {
            self.owner
        } else {
            self.owner.opponent()
        }
    }

    /// Full-width minimax.
    pub fn minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        maximizing: bool,
    ) -> Result<Score, SearchAborted> {
        self.check_deadline()?;
        self.stats.nodes += 1;

        if let Some(score) = self.terminal_score(board, depth) {
            self.stats.leaves += 1;
            return Ok(score);
        }

        let symbol = self.mover(maximizing);
        let mut best = if maximizing { -INFINITY } else { INFINITY };
        for mv in board.get_available_moves() {
            board.make_move(mv, symbol);
            let result = self.minimax(board, depth + 1, !maximizing);
            board.undo_move(mv);
            let score = result?;

            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }
        Ok(best)
    }

    /// Minimax with alpha-beta pruning.
    ///
    /// `parent` is the trace node this call hangs under.
    pub fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
        parent: Option<NodeId>,
    ) -> Result<Score, SearchAborted> {
        self.check_deadline()?;
        self.stats.nodes += 1;

        let node = self.recorder.add_node(
            NodeState::Board(board),
            depth + 1,
            maximizing,
            alpha,
            beta,
            parent,
        );

        if let Some(score) = self.terminal_score(board, depth) {
            self.stats.leaves += 1;
            self.recorder.set_node_value(node, score);
            return Ok(score);
        }

        let symbol = self.mover(maximizing);
        let moves = board.get_available_moves();
        let mut best = if maximizing { -INFINITY } else { INFINITY };
        for (i, &mv) in moves.iter().enumerate() {
            board.make_move(mv, symbol);
            let result = self.alpha_beta(board, depth + 1, alpha, beta, !maximizing, Some(node));
            board.undo_move(mv);
            let score = result?;

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if beta <= alpha {
                self.stats.cutoffs += 1;
                for &skipped in &moves[i + 1..] {
                    let child = self.recorder.add_node(
                        NodeState::Pruned(skipped),
                        depth + 2,
                        !maximizing,
                        alpha,
                        beta,
                        Some(node),
                    );
                    self.recorder.mark_pruned(node, child);
                }
                break;
            }
        }

        self.recorder.set_node_value(node, best);
        Ok(best)
    }
}

/// How to pick a move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    /// Wall-clock budget per decision. `None` searches to the end.
    pub time_budget: Option<Duration>,
}

impl SearchConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            time_budget: None,
        }
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

/// Result of one top-level decision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub mv: Move,
    /// Score of `mv`, or `None` when no root move was fully searched.
    pub score: Option<Score>,
    /// False when the deadline cut the search short.
    pub completed: bool,
    pub stats: SearchStats,
}

/// Pick the best move for `owner`.
///
/// Root moves are tried in [`Board::get_available_moves`] order and a later
/// move must score strictly higher to replace an earlier one. If the
/// deadline passes, the best fully searched move is kept, or the first
/// available move if none finished. Returns `None` only when the board has
/// no empty cell. The board is unchanged on return.
pub fn find_best_move<R: Recorder>(
    board: &mut Board,
    owner: Symbol,
    config: &SearchConfig,
    mut recorder: R,
) -> Option<Decision> {
    let moves = board.get_available_moves();
    let first = *moves.first()?;

    recorder.reset();
    let root = recorder.add_node(NodeState::Board(board), 0, true, -INFINITY, INFINITY, None);

    let mut search = Search::with_recorder(owner, recorder);
    if let Some(budget) = config.time_budget {
        search = search.with_deadline(Instant::now() + budget);
    }

    let mut best_score = -INFINITY;
    let mut best_move = None;
    let mut completed = true;

    for mv in moves {
        if search.expired() {
            completed = false;
            break;
        }

        board.make_move(mv, owner);
        let result = match config.algorithm {
            Algorithm::Minimax => search.minimax(board, 0, false),
            Algorithm::AlphaBeta => search.alpha_beta(board, 0, -INFINITY, INFINITY, false, Some(root)),
        };
        board.undo_move(mv);

        let Ok(score) = result else {
            completed = false;
            break;
        };
        debug!(%owner, mv, score, "root move scored");

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
    }

    let score = best_move.map(|_| best_score);
    if let Some(score) = score {
        search.recorder_mut().set_node_value(root, score);
    }

    let stats = search.stats();
    let mv = match best_move {
        Some(mv) => mv,
        None => {
            warn!(%owner, fallback = first, "no root move finished, using first available");
            first
        }
    };
    if !completed {
        warn!(%owner, mv, "search deadline reached, returning best move so far");
    }
    info!(
        %owner,
        mv,
        score,
        nodes = stats.nodes,
        cutoffs = stats.cutoffs,
        "move chosen"
    );

    Some(Decision {
        mv,
        score,
        completed,
        stats,
    })
}
