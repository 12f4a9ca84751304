//! Rhombic Hex board with row/column coordinates

use serde::{Deserialize, Serialize};

use crate::cell::{color_of, CellState, Player};
use crate::error::{HexError, Result};

/// Largest supported board edge
pub const MAX_BOARDSIZE: usize = 32;

/// Neighbour offsets (drow, dcol) on the rhombic grid
pub const NEIGHBOURS: [(isize, isize); 6] = [
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
];

/// Row/column position, row 0 at the top
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position of a row-major linear index
    pub fn from_index(index: usize, boardsize: usize) -> Self {
        Self::new(index / boardsize, index % boardsize)
    }

    /// Row-major linear index
    pub fn index(&self, boardsize: usize) -> usize {
        self.row * boardsize + self.col
    }

    pub fn is_valid(&self, boardsize: usize) -> bool {
        self.row < boardsize && self.col < boardsize
    }

    pub fn transposed(&self) -> Self {
        Self::new(self.col, self.row)
    }

    /// The six neighbours, each coordinate clamped onto the board.
    ///
    /// At an edge a clamped offset lands on the cell itself or on another
    /// real neighbour, never on a non-adjacent cell.
    pub fn neighbours(&self, boardsize: usize) -> [Pos; 6] {
        let last = boardsize as isize - 1;
        NEIGHBOURS.map(|(dr, dc)| {
            let row = (self.row as isize + dr).clamp(0, last);
            let col = (self.col as isize + dc).clamp(0, last);
            Pos::new(row as usize, col as usize)
        })
    }
}

/// Square grid of cell states
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<CellState>,
}

impl Board {
    /// Create an empty board
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![CellState::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, pos: Pos) -> CellState {
        self.cells[pos.index(self.size)]
    }

    pub fn set(&mut self, pos: Pos, state: CellState) {
        let idx = pos.index(self.size);
        self.cells[idx] = state;
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn clear(&mut self) {
        self.cells.fill(CellState::Empty);
    }

    /// Number of stones on the board
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Positions holding a stone
    pub fn stones(&self) -> impl Iterator<Item = Pos> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(move |(i, _)| Pos::from_index(i, size))
    }

    /// Whether any stone of either colour is in a winning state
    pub fn winner(&self) -> Option<Player> {
        self.cells.iter().find(|c| c.is_win()).and_then(|&c| color_of(c))
    }

    /// Transposed copy with colours swapped
    pub fn mirrored(&self) -> Self {
        let mut out = Board::new(self.size);
        for row in 0..self.size {
            for col in 0..self.size {
                let pos = Pos::new(row, col);
                out.set(pos.transposed(), self.get(pos).mirrored());
            }
        }
        out
    }

    /// Build a board from numeric state codes, one slice per row
    pub fn from_codes(rows: &[&[u8]]) -> Result<Self> {
        let size = rows.len();
        let mut board = Board::new(size);
        for (row, codes) in rows.iter().enumerate() {
            if codes.len() != size {
                return Err(HexError::ParseBoard {
                    line: row + 1,
                    reason: format!("expected {} cells, found {}", size, codes.len()),
                });
            }
            for (col, &code) in codes.iter().enumerate() {
                let state = CellState::try_from(code).map_err(|c| HexError::ParseBoard {
                    line: row + 1,
                    reason: format!("unknown cell code {}", c),
                })?;
                board.set(Pos::new(row, col), state);
            }
        }
        Ok(board)
    }

    /// Parse a board drawn with state characters.
    ///
    /// Blank lines and whitespace inside a line are ignored, so both packed
    /// rows (`b.w`) and the indented output of [`Board::render`] parse.
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<(usize, Vec<char>)> = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>()))
            .filter(|(_, chars)| !chars.is_empty())
            .collect();

        let size = rows.len();
        if size == 0 || size > MAX_BOARDSIZE {
            return Err(HexError::ParseBoard {
                line: 0,
                reason: format!("board must have 1..={} rows, found {}", MAX_BOARDSIZE, size),
            });
        }

        let mut board = Board::new(size);
        for (row, (line, chars)) in rows.iter().enumerate() {
            if chars.len() != size {
                return Err(HexError::ParseBoard {
                    line: *line,
                    reason: format!("expected {} cells, found {}", size, chars.len()),
                });
            }
            for (col, &c) in chars.iter().enumerate() {
                let state = CellState::from_char(c).ok_or_else(|| HexError::ParseBoard {
                    line: *line,
                    reason: format!("unknown cell character {:?}", c),
                })?;
                board.set(Pos::new(row, col), state);
            }
        }
        Ok(board)
    }

    /// Text dump, each row shifted one space further to show the rhombus
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.size * (3 * self.size + 1));
        for row in 0..self.size {
            if row > 0 {
                out.push('\n');
            }
            out.push_str(&" ".repeat(row));
            for col in 0..self.size {
                if col > 0 {
                    out.push(' ');
                }
                out.push(self.get(Pos::new(row, col)).to_char());
            }
        }
        out
    }

    /// Numeric codes, one vector per row
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }
}

impl AsMut<Board> for Board {
    fn as_mut(&mut self) -> &mut Board {
        self
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let pos = Pos::from_index(7, 3);
        assert_eq!(pos, Pos::new(2, 1));
        assert_eq!(pos.index(3), 7);
    }

    #[test]
    fn test_interior_neighbours() {
        let ns = Pos::new(2, 2).neighbours(5);
        assert_eq!(
            ns,
            [
                Pos::new(1, 2),
                Pos::new(1, 3),
                Pos::new(2, 1),
                Pos::new(2, 3),
                Pos::new(3, 1),
                Pos::new(3, 2),
            ]
        );
    }

    #[test]
    fn test_corner_neighbours_clamp_onto_board() {
        let origin = Pos::new(0, 0);
        let ns = origin.neighbours(3);
        assert_eq!(ns.iter().filter(|&&p| p == origin).count(), 2);
        assert!(ns.contains(&Pos::new(0, 1)));
        assert!(ns.contains(&Pos::new(1, 0)));
        assert!(ns.iter().all(|p| p.is_valid(3)));
    }

    #[test]
    fn test_clamped_neighbours_stay_adjacent() {
        let n = 4;
        for i in 0..n * n {
            let pos = Pos::from_index(i, n);
            for nb in pos.neighbours(n) {
                let dr = nb.row as isize - pos.row as isize;
                let dc = nb.col as isize - pos.col as isize;
                assert!(nb == pos || NEIGHBOURS.contains(&(dr, dc)), "{:?} -> {:?}", pos, nb);
            }
        }
    }

    #[test]
    fn test_parse_and_render() {
        let board = Board::parse("b.w\n.^.\n<..").unwrap();
        assert_eq!(board.size(), 3);
        assert_eq!(board.get(Pos::new(0, 2)), CellState::WhiteStone);
        assert_eq!(board.get(Pos::new(2, 0)), CellState::WhiteWestConnected);
        assert_eq!(board.render(), "b . w\n . ^ .\n  < . .");
        assert_eq!(Board::parse(&board.render()).unwrap(), board);
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = Board::parse("b.\n...").unwrap_err();
        assert!(matches!(err, HexError::ParseBoard { line: 2, .. }));
    }

    #[test]
    fn test_from_codes() {
        let board = Board::from_codes(&[&[0, 6], &[1, 2]]).unwrap();
        assert_eq!(board.get(Pos::new(0, 1)), CellState::WhiteEastConnected);
        assert_eq!(board.to_codes(), vec![vec![0, 6], vec![1, 2]]);
        assert!(Board::from_codes(&[&[0, 9], &[0, 0]]).is_err());
    }

    #[test]
    fn test_mirrored_transposes() {
        let board = Board::parse("^.\n..").unwrap();
        let mirror = board.mirrored();
        assert_eq!(mirror.get(Pos::new(0, 0)), CellState::WhiteWestConnected);
        let board = Board::parse(".b\n..").unwrap();
        assert_eq!(board.mirrored().get(Pos::new(1, 0)), CellState::WhiteStone);
    }
}
