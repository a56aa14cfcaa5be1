//! N×N tic-tac-toe board.
//!
//! Moves are numbered `1..=size*size` in row-major order, matching what the
//! board prints in empty cells. The same board is shared by the whole search
//! and mutated in place, so [`Board::make_move`] and [`Board::undo_move`]
//! must stay exact inverses.

use std::fmt;

/// A move: 1-based, row-major cell number.
pub type Move = usize;

/// One of the two symbols in play.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The other symbol.
    #[inline]
    pub fn opponent(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Symbol::X => 'X',
            Symbol::O => 'O',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Final state of a finished game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win(Symbol),
    Tie,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(s) => write!(f, "{s}"),
            Outcome::Tie => write!(f, "Tie"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Symbol>>,
}

impl Board {
    /// Create an empty `size`×`size` board.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "board size must be positive");
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells, which is also the largest move number.
    #[inline]
    pub fn area(&self) -> usize {
        self.size * self.size
    }

    /// Convert a move to `(row, col)`. Returns `None` when out of range.
    pub fn coords(&self, mv: Move) -> Option<(usize, usize)> {
        if mv == 0 || mv > self.area() {
            return None;
        }
        Some(((mv - 1) / self.size, (mv - 1) % self.size))
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells[self.idx(row, col)]
    }

    /// True iff the move is on the board and its cell is empty.
    pub fn is_valid_move(&self, mv: Move) -> bool {
        match self.coords(mv) {
            Some((row, col)) => self.get(row, col).is_none(),
            None => false,
        }
    }

    /// Place `symbol` at `mv`. Returns `false` and leaves the board untouched
    /// if the move is not valid.
    pub fn make_move(&mut self, mv: Move, symbol: Symbol) -> bool {
        if !self.is_valid_move(mv) {
            return false;
        }
        self.cells[mv - 1] = Some(symbol);
        true
    }

    /// Clear the cell at `mv`. No legality check: only undo moves you made.
    pub fn undo_move(&mut self, mv: Move) {
        debug_assert!(self.coords(mv).is_some(), "undo of off-board move {mv}");
        if let Some(cell) = self.cells.get_mut(mv.wrapping_sub(1)) {
            *cell = None;
        }
    }

    /// All empty cells in increasing move order.
    ///
    /// The order is the search's move ordering, so it decides which of
    /// several equally scored moves gets picked.
    pub fn get_available_moves(&self) -> Vec<Move> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Rows first, then columns, then the main diagonal, then the
    /// anti-diagonal. A full board without a line is a tie.
    pub fn check_winner(&self) -> Option<Outcome> {
        let n = self.size;

        for row in 0..n {
            if let Some(s) = self.uniform_line((0..n).map(|col| (row, col))) {
                return Some(Outcome::Win(s));
            }
        }
        for col in 0..n {
            if let Some(s) = self.uniform_line((0..n).map(|row| (row, col))) {
                return Some(Outcome::Win(s));
            }
        }
        if let Some(s) = self.uniform_line((0..n).map(|i| (i, i))) {
            return Some(Outcome::Win(s));
        }
        if let Some(s) = self.uniform_line((0..n).map(|i| (i, n - 1 - i))) {
            return Some(Outcome::Win(s));
        }

        if self.cells.iter().all(Option::is_some) {
            return Some(Outcome::Tie);
        }
        None
    }

    /// The symbol filling every cell of the line, if there is one.
    fn uniform_line(&self, mut line: impl Iterator<Item = (usize, usize)>) -> Option<Symbol> {
        let (r, c) = line.next()?;
        let first = self.get(r, c)?;
        line.all(|(r, c)| self.get(r, c) == Some(first))
            .then_some(first)
    }

    /// One-line snapshot, e.g. `X_O/_X_/O__`.
    pub fn compact(&self) -> String {
        self.cells
            .chunks(self.size)
            .map(|row| {
                row.iter()
                    .map(|c| c.map_or('_', Symbol::to_char))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn cell_width(&self) -> usize {
        self.area().to_string().len().max(3)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.cell_width();
        for (r, row) in self.cells.chunks(self.size).enumerate() {
            let rendered: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(c, cell)| match cell {
                    Some(s) => format!("{:^width$}", s.to_char()),
                    None => format!("{:>width$}", self.idx(r, c) + 1),
                })
                .collect();
            writeln!(f, "{}", rendered.join(" | "))?;
            if r + 1 < self.size {
                writeln!(f, "{}", "-".repeat(self.size * (width + 3) - 1))?;
            }
        }
        Ok(())
    }
}
