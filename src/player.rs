//! Players: anything that, given a board, returns a legal move.
//!
//! - [`HumanPlayer`] reads move numbers from a line-oriented input.
//! - [`AiPlayer`] runs the minimax / alpha-beta decision.
//! - [`ModelPlayer`] asks an external model through a [`ModelClient`].

use std::io::{self, BufRead, Stdin, Stdout, Write};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, warn};

use crate::board::{Board, Move, Symbol};
use crate::search::{Algorithm, SearchConfig, find_best_move};
use crate::trace::{NoopRecorder, Recorder};

/// Trait for players that can make moves.
pub trait Player {
    fn name(&self) -> &str;

    fn symbol(&self) -> Symbol;

    /// Pick a move for the current board.
    ///
    /// The board is borrowed mutably so searches can explore in place; it
    /// must be left as it was found. The returned move is legal.
    fn choose_move(&mut self, board: &mut Board) -> Result<Move>;

    /// Total time spent in [`Player::choose_move`] so far.
    fn thinking_time(&self) -> Duration {
        Duration::ZERO
    }

    /// Whether a person is answering for this player.
    fn is_interactive(&self) -> bool {
        false
    }

    /// Extra output to show after this player's move.
    fn report(&self) -> Option<String> {
        None
    }
}

// =============================================================================
// Human
// =============================================================================

/// Source of typed lines.
pub trait LineInput {
    /// Append one line to `buf`. Returns the bytes read, 0 at end of input.
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl<B: BufRead> LineInput for B {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// The process's stdin, locked only for the duration of each read so that
/// both seats of a two-human game can read from it.
pub struct StdinInput(Stdin);

impl LineInput for StdinInput {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        self.0.read_line(buf)
    }
}

/// Player reading move numbers from `input`, prompting on `output`.
pub struct HumanPlayer<R, W> {
    name: String,
    symbol: Symbol,
    input: R,
    output: W,
}

impl<R: LineInput, W: Write> HumanPlayer<R, W> {
    pub fn new(name: impl Into<String>, symbol: Symbol, input: R, output: W) -> Self {
        Self {
            name: name.into(),
            symbol,
            input,
            output,
        }
    }
}

impl HumanPlayer<StdinInput, Stdout> {
    /// A human at the terminal.
    pub fn stdio(name: impl Into<String>, symbol: Symbol) -> Self {
        Self::new(name, symbol, StdinInput(io::stdin()), io::stdout())
    }
}

impl<R: LineInput, W: Write> Player for HumanPlayer<R, W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> Symbol {
        self.symbol
    }

    fn choose_move(&mut self, board: &mut Board) -> Result<Move> {
        let max = board.area();
        loop {
            write!(self.output, "{}, enter number (1-{max}): ", self.name)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!("input closed while waiting for {}'s move", self.name);
            }

            match line.trim().parse::<Move>() {
                Ok(mv) if (1..=max).contains(&mv) && board.is_valid_move(mv) => return Ok(mv),
                Ok(_) => writeln!(self.output, "Invalid move! Try again.")?,
                Err(_) => writeln!(self.output, "Please enter a number between 1 and {max}!")?,
            }
        }
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

// =============================================================================
// Search
// =============================================================================

/// Player backed by the game-tree search.
pub struct AiPlayer<R = NoopRecorder> {
    name: String,
    symbol: Symbol,
    config: SearchConfig,
    recorder: R,
    thinking: Duration,
}

impl AiPlayer<NoopRecorder> {
    pub fn new(name: impl Into<String>, symbol: Symbol, algorithm: Algorithm) -> Self {
        Self {
            name: name.into(),
            symbol,
            config: SearchConfig::new(algorithm),
            recorder: NoopRecorder,
            thinking: Duration::ZERO,
        }
    }
}

impl<R: Recorder> AiPlayer<R> {
    /// Stop each decision after `budget` and play the best move found.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.config = self.config.with_time_budget(budget);
        self
    }

    /// Record each decision's search tree.
    pub fn with_recorder<T: Recorder>(self, recorder: T) -> AiPlayer<T> {
        AiPlayer {
            name: self.name,
            symbol: self.symbol,
            config: self.config,
            recorder,
            thinking: self.thinking,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }
}

impl<R: Recorder> Player for AiPlayer<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> Symbol {
        self.symbol
    }

    fn choose_move(&mut self, board: &mut Board) -> Result<Move> {
        let start = Instant::now();
        let decision = find_best_move(board, self.symbol, &self.config, &mut self.recorder)
            .ok_or_else(|| anyhow!("{} has no move on a full board", self.name))?;
        let elapsed = start.elapsed();
        self.thinking += elapsed;
        debug!(
            player = %self.name,
            elapsed_ms = elapsed.as_millis() as u64,
            total_ms = self.thinking.as_millis() as u64,
            "search finished"
        );
        Ok(decision.mv)
    }

    fn thinking_time(&self) -> Duration {
        self.thinking
    }

    fn report(&self) -> Option<String> {
        self.recorder
            .render(&format!("{} search tree", self.name))
    }
}

// =============================================================================
// Remote model
// =============================================================================

/// Prompt/response access to an external model.
pub trait ModelClient {
    fn complete(&mut self, prompt: &str) -> Result<String>;
}

/// Client that runs a command, writes the prompt to its stdin and reads the
/// reply from its stdout.
pub struct CommandClient {
    program: String,
    args: Vec<String>,
}

impl CommandClient {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace. Returns `None` for an empty line.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl ModelClient for CommandClient {
    fn complete(&mut self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start `{}`", self.program))?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(prompt.as_bytes()).map_err(anyhow::Error::from),
            None => Err(anyhow!("model command has no stdin")),
        };
        if let Err(err) = written {
            let _ = child.kill();
            let _ = child.wait();
            return Err(err.context(format!("failed to send the prompt to `{}`", self.program)));
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            bail!("`{}` exited with {}", self.program, output.status);
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Player that asks a model for each move, falling back to the first
/// available move when the reply is unusable.
pub struct ModelPlayer<C> {
    name: String,
    symbol: Symbol,
    client: C,
    thinking: Duration,
}

impl<C: ModelClient> ModelPlayer<C> {
    pub fn new(name: impl Into<String>, symbol: Symbol, client: C) -> Self {
        Self {
            name: name.into(),
            symbol,
            client,
            thinking: Duration::ZERO,
        }
    }
}

impl<C: ModelClient> Player for ModelPlayer<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> Symbol {
        self.symbol
    }

    fn choose_move(&mut self, board: &mut Board) -> Result<Move> {
        let start = Instant::now();
        let moves = board.get_available_moves();
        let Some(&fallback) = moves.first() else {
            bail!("{} has no move on a full board", self.name);
        };

        let prompt = build_prompt(board, self.symbol, &moves);
        let mv = match self.client.complete(&prompt) {
            Ok(reply) => {
                debug!(player = %self.name, reply = reply.trim(), "model replied");
                parse_reply(&reply, &moves).unwrap_or_else(|| {
                    warn!(player = %self.name, fallback, "model reply has no available move");
                    fallback
                })
            }
            Err(err) => {
                warn!(player = %self.name, fallback, error = %err, "model request failed");
                fallback
            }
        };

        self.thinking += start.elapsed();
        info!(player = %self.name, mv, "model move");
        Ok(mv)
    }

    fn thinking_time(&self) -> Duration {
        self.thinking
    }
}

/// Board as plain rows for a prompt: cells joined by ` | `, rows split by
/// a dash line.
pub fn format_board_for_prompt(board: &Board) -> String {
    let n = board.size();
    let divider = "-".repeat(n * 3 + (n - 1) * 2);
    let mut out = String::new();
    for row in 0..n {
        let cells: Vec<String> = (0..n)
            .map(|col| board.get(row, col).map_or(' ', Symbol::to_char).to_string())
            .collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
        if row + 1 < n {
            out.push_str(&divider);
            out.push('\n');
        }
    }
    out
}

pub fn build_prompt(board: &Board, symbol: Symbol, moves: &[Move]) -> String {
    format!(
        "You are playing tic-tac-toe as '{symbol}' against '{opponent}'.\n\
         \n\
         Board:\n\
         {grid}\n\
         Available moves: {moves:?}\n\
         \n\
         Choose by these priorities, in order:\n\
         1. Win now if you can.\n\
         2. Block an opponent line that would win next turn.\n\
         3. Take the center.\n\
         4. Create a fork (two winning threats).\n\
         5. Block the opponent's fork.\n\
         6. Take a corner.\n\
         7. Take a side.\n\
         \n\
         Reply with only the number of your move (1-{max}).\n",
        opponent = symbol.opponent(),
        grid = format_board_for_prompt(board),
        max = board.area(),
    )
}

/// First whitespace-separated all-digit token naming an available move.
pub fn parse_reply(reply: &str, moves: &[Move]) -> Option<Move> {
    reply
        .split_whitespace()
        .filter(|w| !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|w| w.parse::<Move>().ok())
        .find(|mv| moves.contains(mv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Canned(Result<String, String>);

    impl ModelClient for Canned {
        fn complete(&mut self, _prompt: &str) -> Result<String> {
            self.0.clone().map_err(|e| anyhow!(e))
        }
    }

    fn human(input: &str) -> HumanPlayer<Cursor<Vec<u8>>, Vec<u8>> {
        HumanPlayer::new("Player 1", Symbol::X, Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_human_reprompts_until_valid() {
        let mut board = Board::new(3);
        board.make_move(5, Symbol::O);
        let mut player = human("abc\n12\n5\n7\n");
        assert_eq!(player.choose_move(&mut board).unwrap(), 7);

        let out = String::from_utf8(player.output.clone()).unwrap();
        assert!(out.contains("Please enter a number between 1 and 9!"));
        assert_eq!(out.matches("Invalid move! Try again.").count(), 2);
        assert_eq!(out.matches("Player 1, enter number (1-9): ").count(), 4);
    }

    #[test]
    fn test_human_eof_is_error() {
        let mut board = Board::new(3);
        let mut player = human("");
        assert!(player.choose_move(&mut board).is_err());
        assert!(player.is_interactive());
    }

    #[test]
    fn test_ai_player_accumulates_time_and_restores_board() {
        let mut board = Board::new(3);
        board.make_move(1, Symbol::X);
        let before = board.clone();
        let mut player = AiPlayer::new("AI", Symbol::O, Algorithm::AlphaBeta);
        let mv = player.choose_move(&mut board).unwrap();
        assert_eq!(board, before);
        assert!(board.is_valid_move(mv));
        // Only the center holds the draw against a corner opening.
        assert_eq!(mv, 5);
        assert!(player.thinking_time() > Duration::ZERO);
        assert!(player.report().is_none());
    }

    #[test]
    fn test_ai_player_with_tree_recorder_reports() {
        use crate::trace::TreeRecorder;

        let mut board = Board::new(3);
        for (mv, s) in [(1, Symbol::X), (5, Symbol::O), (9, Symbol::X)] {
            board.make_move(mv, s);
        }
        let mut player =
            AiPlayer::new("AI", Symbol::O, Algorithm::AlphaBeta).with_recorder(TreeRecorder::new());
        player.choose_move(&mut board).unwrap();
        let report = player.report().unwrap();
        assert!(report.starts_with("AI search tree\n"));
        assert!(player.recorder().stats().nodes > 1);
    }

    #[test]
    fn test_parse_reply() {
        let moves = [2, 4, 6];
        assert_eq!(parse_reply("I pick 4", &moves), Some(4));
        assert_eq!(parse_reply("5 then 6", &moves), Some(6));
        assert_eq!(parse_reply("move: 4.", &moves), None);
        assert_eq!(parse_reply("", &moves), None);
    }

    #[test]
    fn test_model_player_uses_reply() {
        let mut board = Board::new(3);
        let mut player = ModelPlayer::new("Model", Symbol::O, Canned(Ok(" 5 \n".into())));
        assert_eq!(player.choose_move(&mut board).unwrap(), 5);
    }

    #[test]
    fn test_model_player_falls_back_to_first_move() {
        let mut board = Board::new(3);
        board.make_move(1, Symbol::X);

        let mut garbled = ModelPlayer::new("Model", Symbol::O, Canned(Ok("center!".into())));
        assert_eq!(garbled.choose_move(&mut board).unwrap(), 2);

        let mut taken = ModelPlayer::new("Model", Symbol::O, Canned(Ok("1".into())));
        assert_eq!(taken.choose_move(&mut board).unwrap(), 2);

        let mut failing = ModelPlayer::new("Model", Symbol::O, Canned(Err("timeout".into())));
        assert_eq!(failing.choose_move(&mut board).unwrap(), 2);
    }

    #[test]
    fn test_prompt_contents() {
        let mut board = Board::new(3);
        board.make_move(1, Symbol::X);
        let grid = format_board_for_prompt(&board);
        assert_eq!(grid.lines().next(), Some("X |   |  "));
        assert_eq!(grid.lines().nth(1), Some("-".repeat(13).as_str()));

        let prompt = build_prompt(&board, Symbol::O, &board.get_available_moves());
        assert!(prompt.contains("as 'O' against 'X'"));
        assert!(prompt.contains("Available moves: [2, 3, 4, 5, 6, 7, 8, 9]"));
        assert!(prompt.contains("(1-9)"));
    }

    #[test]
    fn test_two_stdio_humans_can_coexist() {
        use std::sync::mpsc;
        use std::thread;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let first = HumanPlayer::stdio("Player 1", Symbol::X);
            let second = HumanPlayer::stdio("Player 2", Symbol::O);
            let _ = tx.send((first.name().to_string(), second.name().to_string()));
        });
        let names = rx
            .recv_timeout(Duration::from_secs(3))
            .expect("building two stdin players blocked");
        assert_eq!(names, ("Player 1".to_string(), "Player 2".to_string()));
    }

    #[test]
    fn test_command_client_reports_exit_status() {
        let mut ok = CommandClient::new("cat", Vec::new());
        assert_eq!(ok.complete("5\n").unwrap(), "5\n");

        let mut failing = CommandClient::new("false", Vec::new());
        assert!(failing.complete("5").is_err());

        let mut missing = CommandClient::new("no-such-model-command-xyz", Vec::new());
        assert!(missing.complete("5").is_err());
    }

    #[test]
    fn test_command_client_survives_closed_stdin() {
        // `true` exits without reading, so a large prompt hits a broken pipe.
        let mut client = CommandClient::new("true", Vec::new());
        let prompt = "1 ".repeat(1 << 20);
        let _ = client.complete(&prompt);
        // The child was reaped either way; a second call still works.
        assert!(client.complete("").is_ok());
    }

    #[test]
    fn test_command_client_parse() {
        assert!(CommandClient::parse("   ").is_none());
        let client = CommandClient::parse("llm -m small").unwrap();
        assert_eq!(client.program, "llm");
        assert_eq!(client.args, vec!["-m", "small"]);
    }
}
