//! Tictactoe-Minimax: play tic-tac-toe against minimax and alpha-beta players.
//!
//! ## Usage
//!
//! - `tictactoe-minimax` - Minimax vs alpha-beta on a 3x3 board
//! - `tictactoe-minimax play --x human --o alpha-beta` - Play a game
//! - `tictactoe-minimax trace-demo` - Show a small pruned search tree
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tictactoe_minimax::board::Symbol;
use tictactoe_minimax::constants::{
    DEFAULT_RENDER_DEPTH, DEFAULT_SIZE, LARGE_BOARD_TIME_BUDGET, MAX_SIZE, MIN_SIZE,
};
use tictactoe_minimax::game::Game;
use tictactoe_minimax::player::{AiPlayer, CommandClient, HumanPlayer, ModelPlayer, Player};
use tictactoe_minimax::search::Algorithm;
use tictactoe_minimax::trace::{Recorder, TreeRecorder, demo_tree};

/// Tictactoe-Minimax: N×N tic-tac-toe with game-tree search
#[derive(Parser)]
#[command(name = "tictactoe-minimax")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Play(PlayArgs),
    /// Minimax vs alpha-beta on a 3x3 board
    Demo,
    /// Print a hand-built search tree with one pruned branch
    TraceDemo {
        /// Also write the tree as Graphviz DOT
        #[arg(long)]
        dot: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct PlayArgs {
    /// Grid side length
    #[arg(long, default_value_t = DEFAULT_SIZE,
          value_parser = clap::value_parser!(u16).range(MIN_SIZE as i64..=MAX_SIZE as i64).map(usize::from))]
    size: usize,

    /// Who plays X
    #[arg(long, value_enum, default_value_t = PlayerKind::Human)]
    x: PlayerKind,

    /// Who plays O
    #[arg(long, value_enum, default_value_t = PlayerKind::AlphaBeta)]
    o: PlayerKind,

    /// Per-move time budget for search players, in milliseconds
    /// (2000 by default on boards larger than 3x3)
    #[arg(long)]
    time_budget_ms: Option<u64>,

    /// Print the alpha-beta search tree after each search move
    #[arg(long)]
    trace: bool,

    /// Depth of the printed search tree
    #[arg(long, default_value_t = DEFAULT_RENDER_DEPTH)]
    trace_depth: u32,

    /// Command used by `model` players; it gets the prompt on stdin
    #[arg(long)]
    model_cmd: Option<String>,
}

impl PlayArgs {
    /// Budget for search players: the flag if given, otherwise a default
    /// that keeps boards above 3x3 from searching forever.
    fn time_budget(&self) -> Option<Duration> {
        match self.time_budget_ms {
            Some(ms) => Some(Duration::from_millis(ms)),
            None if self.size > DEFAULT_SIZE => Some(LARGE_BOARD_TIME_BUDGET),
            None => None,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PlayerKind {
    Human,
    Minimax,
    AlphaBeta,
    Model,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Play(args)) => run_play(&args),
        Some(Commands::TraceDemo { dot }) => run_trace_demo(dot),
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn make_player(kind: PlayerKind, symbol: Symbol, args: &PlayArgs) -> Result<Box<dyn Player>> {
    let seat = match symbol {
        Symbol::X => "Player 1",
        Symbol::O => "Player 2",
    };
    let player: Box<dyn Player> = match kind {
        PlayerKind::Human => Box::new(HumanPlayer::stdio(seat, symbol)),
        PlayerKind::Minimax | PlayerKind::AlphaBeta => {
            let (algorithm, label) = if kind == PlayerKind::Minimax {
                (Algorithm::Minimax, "AI (Minimax)")
            } else {
                (Algorithm::AlphaBeta, "AI (Alpha-Beta)")
            };
            let mut ai = AiPlayer::new(label, symbol, algorithm);
            if let Some(budget) = args.time_budget() {
                ai = ai.with_time_budget(budget);
            }
            if args.trace && algorithm == Algorithm::AlphaBeta {
                boxed(ai.with_recorder(TreeRecorder::with_render_depth(args.trace_depth)))
            } else {
                boxed(ai)
            }
        }
        PlayerKind::Model => {
            let command = args
                .model_cmd
                .as_deref()
                .context("a model player needs --model-cmd")?;
            let client = CommandClient::parse(command).context("--model-cmd is empty")?;
            Box::new(ModelPlayer::new("Model", symbol, client))
        }
    };
    Ok(player)
}

fn boxed<R: Recorder + 'static>(ai: AiPlayer<R>) -> Box<dyn Player> {
    Box::new(ai)
}

fn run_play(args: &PlayArgs) -> Result<()> {
    println!("Welcome to Tic-Tac-Toe!");
    let x = make_player(args.x, Symbol::X, args)?;
    let o = make_player(args.o, Symbol::O, args)?;
    let mut game = Game::new(args.size, x, o)?.with_random_start();
    if game.players().iter().all(|p| !p.is_interactive()) {
        println!("{} moves first", game.players()[0].name());
    }
    game.play(&mut io::stdout())?;
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Tictactoe-Minimax: minimax vs alpha-beta\n");
    let x = AiPlayer::new("AI (Minimax)", Symbol::X, Algorithm::Minimax);
    let o = AiPlayer::new("AI (Alpha-Beta)", Symbol::O, Algorithm::AlphaBeta);
    let mut game = Game::new(DEFAULT_SIZE, Box::new(x), Box::new(o))?.with_random_start();
    println!("{} moves first", game.players()[0].name());
    let record = game.play(&mut io::stdout())?;
    println!("Result: {}", record.outcome);
    Ok(())
}

fn run_trace_demo(dot: Option<PathBuf>) -> Result<()> {
    let tree = demo_tree();
    if let Some(text) = tree.render("Alpha-Beta Pruning Demo") {
        print!("{text}");
    }
    println!();
    println!("MAX nodes pick the largest child value, MIN nodes the smallest.");
    println!("Child 2 is abandoned after Leaf 3: MIN can hold it to 3, below the 5 MAX already has.");

    if let Some(path) = dot {
        fs::write(&path, tree.to_dot("Alpha-Beta Pruning Demo"))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Tree written to {}", path.display());
    }
    Ok(())
}
