//! Cell state model
//!
//! Every board cell holds one of nine states. A stone's state records its
//! colour together with the board sides its group already touches, so the
//! win check never has to walk the board.

use serde::{Deserialize, Serialize};

use crate::board::Pos;

// ============================================================================
// PLAYERS AND SIDES
// ============================================================================

/// Player colour, doubling as the seat index (Black = seat 0)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Black = 0,
    White = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Seat index (0 or 1)
    pub fn seat(self) -> usize {
        self as usize
    }

    pub fn from_seat(seat: usize) -> Option<Self> {
        match seat {
            0 => Some(Player::Black),
            1 => Some(Player::White),
            _ => None,
        }
    }

    /// The two sides this player must connect
    pub fn goal(self) -> Sides {
        match self {
            Player::Black => Sides::NORTH.union(Sides::SOUTH),
            Player::White => Sides::WEST.union(Sides::EAST),
        }
    }
}

/// A board boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Row 0
    North,
    /// Row N-1
    South,
    /// Column 0
    West,
    /// Column N-1
    East,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::South, Side::West, Side::East];

    /// Which player's goal this side belongs to
    pub fn owner(self) -> Player {
        match self {
            Side::North | Side::South => Player::Black,
            Side::West | Side::East => Player::White,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Side::North => 0b0001,
            Side::South => 0b0010,
            Side::West => 0b0100,
            Side::East => 0b1000,
        }
    }
}

/// Set of connected sides, stored as a 4-bit mask
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sides(u8);

impl Sides {
    pub const NONE: Sides = Sides(0);
    pub const NORTH: Sides = Sides(0b0001);
    pub const SOUTH: Sides = Sides(0b0010);
    pub const WEST: Sides = Sides(0b0100);
    pub const EAST: Sides = Sides(0b1000);

    pub const fn union(self, other: Sides) -> Sides {
        Sides(self.0 | other.0)
    }

    pub const fn intersection(self, other: Sides) -> Sides {
        Sides(self.0 & other.0)
    }

    pub fn contains(self, other: Sides) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn has(self, side: Side) -> bool {
        self.0 & side.bit() != 0
    }

    pub fn with(self, side: Side) -> Sides {
        Sides(self.0 | side.bit())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Side> {
        Side::ALL.into_iter().filter(move |&s| self.has(s))
    }
}

impl std::ops::BitOr for Sides {
    type Output = Sides;

    fn bitor(self, rhs: Sides) -> Sides {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for Sides {
    fn bitor_assign(&mut self, rhs: Sides) {
        *self = self.union(rhs);
    }
}

// ============================================================================
// CELL STATE
// ============================================================================

/// State of a single board cell.
///
/// Discriminants are the stable numeric codes used by fixtures and external
/// tensors. Colours alternate at the low end so `1`/`2` are the bare stones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    #[default]
    Empty = 0,
    BlackStone = 1,
    WhiteStone = 2,
    BlackNorthConnected = 3,
    BlackSouthConnected = 4,
    WhiteWestConnected = 5,
    WhiteEastConnected = 6,
    BlackWin = 7,
    WhiteWin = 8,
}

/// Display characters, indexed by code
const CHARS: [char; 9] = ['.', 'b', 'w', '^', 'v', '<', '>', 'B', 'W'];

const ALL_STATES: [CellState; 9] = [
    CellState::Empty,
    CellState::BlackStone,
    CellState::WhiteStone,
    CellState::BlackNorthConnected,
    CellState::BlackSouthConnected,
    CellState::WhiteWestConnected,
    CellState::WhiteEastConnected,
    CellState::BlackWin,
    CellState::WhiteWin,
];

impl CellState {
    /// Build the state for a `player` stone whose group touches `flags`.
    ///
    /// Sides belonging to the other player are ignored.
    pub fn with_flags(player: Player, flags: Sides) -> Self {
        let own = flags.intersection(player.goal());
        match player {
            Player::Black => match (own.has(Side::North), own.has(Side::South)) {
                (false, false) => CellState::BlackStone,
                (true, false) => CellState::BlackNorthConnected,
                (false, true) => CellState::BlackSouthConnected,
                (true, true) => CellState::BlackWin,
            },
            Player::White => match (own.has(Side::West), own.has(Side::East)) {
                (false, false) => CellState::WhiteStone,
                (true, false) => CellState::WhiteWestConnected,
                (false, true) => CellState::WhiteEastConnected,
                (true, true) => CellState::WhiteWin,
            },
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_empty(self) -> bool {
        self == CellState::Empty
    }

    pub fn is_win(self) -> bool {
        matches!(self, CellState::BlackWin | CellState::WhiteWin)
    }

    pub fn to_char(self) -> char {
        CHARS[self as usize]
    }

    pub fn from_char(c: char) -> Option<Self> {
        CHARS.iter().position(|&x| x == c).map(|i| ALL_STATES[i])
    }

    /// The same stone seen on a transposed board with colours swapped.
    ///
    /// North/South map onto West/East because transposition turns rows into
    /// columns.
    pub fn mirrored(self) -> Self {
        match color_of(self) {
            None => CellState::Empty,
            Some(player) => {
                let flags = connection_flags(self);
                let mut swapped = Sides::NONE;
                for side in flags.iter() {
                    swapped = swapped.with(match side {
                        Side::North => Side::West,
                        Side::South => Side::East,
                        Side::West => Side::North,
                        Side::East => Side::South,
                    });
                }
                CellState::with_flags(player.opponent(), swapped)
            }
        }
    }
}

impl TryFrom<u8> for CellState {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        ALL_STATES.get(code as usize).copied().ok_or(code)
    }
}

impl std::fmt::Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

// ============================================================================
// DECODERS AND PREDICATES
// ============================================================================

/// Owning colour of a cell, `None` when empty
pub fn color_of(state: CellState) -> Option<Player> {
    match state {
        CellState::Empty => None,
        CellState::BlackStone
        | CellState::BlackNorthConnected
        | CellState::BlackSouthConnected
        | CellState::BlackWin => Some(Player::Black),
        CellState::WhiteStone
        | CellState::WhiteWestConnected
        | CellState::WhiteEastConnected
        | CellState::WhiteWin => Some(Player::White),
    }
}

/// Sides the cell's group is already known to reach
pub fn connection_flags(state: CellState) -> Sides {
    match state {
        CellState::Empty | CellState::BlackStone | CellState::WhiteStone => Sides::NONE,
        CellState::BlackNorthConnected => Sides::NORTH,
        CellState::BlackSouthConnected => Sides::SOUTH,
        CellState::BlackWin => Sides::NORTH | Sides::SOUTH,
        CellState::WhiteWestConnected => Sides::WEST,
        CellState::WhiteEastConnected => Sides::EAST,
        CellState::WhiteWin => Sides::WEST | Sides::EAST,
    }
}

/// True iff `pos` lies on `side` and that side is one of `player`'s goals
pub fn is_edge(player: Player, side: Side, pos: Pos, boardsize: usize) -> bool {
    if side.owner() != player {
        return false;
    }
    let last = boardsize.saturating_sub(1);
    match side {
        Side::North => pos.row == 0,
        Side::South => pos.row == last,
        Side::West => pos.col == 0,
        Side::East => pos.col == last,
    }
}

/// All of `player`'s goal sides that `pos` touches directly
pub fn edge_sides(player: Player, pos: Pos, boardsize: usize) -> Sides {
    Side::ALL
        .into_iter()
        .filter(|&side| is_edge(player, side, pos, boardsize))
        .fold(Sides::NONE, Sides::with)
}

// ============================================================================
// TESTS
// ============================================================================
