//! Constants for board dimensions, scoring, and tracing.
//!
//! Scores are plain integers: a win found at search depth `d` is worth
//! `WIN_SCORE - d` to the searching player, a loss `d - WIN_SCORE`, a tie 0.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size (NxN).
pub const DEFAULT_SIZE: usize = 3;

/// Smallest board size the CLI accepts.
pub const MIN_SIZE: usize = 3;

/// Largest board size the CLI accepts.
pub const MAX_SIZE: usize = 15;

// =============================================================================
// Search Scoring
// =============================================================================

/// Search score type.
pub type Score = i32;

/// Base score for a win. Depth is subtracted so faster wins score higher.
pub const WIN_SCORE: Score = 10;

/// Stand-in for an unbounded alpha/beta. Negated for the lower bound, so it
/// must not be `Score::MIN`.
pub const INFINITY: Score = Score::MAX;

/// Per-move budget the CLI gives search players on boards larger than the
/// default, where an exhaustive search would not finish.
pub const LARGE_BOARD_TIME_BUDGET: Duration = Duration::from_secs(2);

// =============================================================================
// Tracing
// =============================================================================

/// Tree depth shown by the text renderer unless configured otherwise.
pub const DEFAULT_RENDER_DEPTH: u32 = 2;
