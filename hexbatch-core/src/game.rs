//! Single game instance and move application

use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos};
use crate::cell::{CellState, Player};
use crate::connectivity::{placed_state, Flood};
use crate::error::{HexError, IllegalReason, Result};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Result of applying one move
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub terminal: bool,
    pub winner: Option<Player>,
}

/// One board plus the seat to move
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInstance {
    board: Board,
    seat: Player,
}

impl GameInstance {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board, Black to move
    pub fn new(boardsize: usize) -> Self {
        Self {
            board: Board::new(boardsize),
            seat: Player::Black,
        }
    }

    /// Start from an existing position
    pub fn from_board(board: Board, seat: Player) -> Self {
        Self { board, seat }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seat to move
    pub fn seat(&self) -> Player {
        self.seat
    }

    pub fn boardsize(&self) -> usize {
        self.board.size()
    }

    // ========================================================================
    // MOVE APPLICATION
    // ========================================================================

    /// Check that `pos` is an empty cell on this board
    pub fn check(&self, pos: Pos) -> std::result::Result<(), IllegalReason> {
        if !pos.is_valid(self.board.size()) {
            return Err(IllegalReason::OutOfRange);
        }
        if !self.board.get(pos).is_empty() {
            return Err(IllegalReason::Occupied);
        }
        Ok(())
    }

    /// Place the mover's stone with its initial flags, without propagating.
    ///
    /// Callers must follow up with [`Flood::propagate`] seeded at `pos` and
    /// then [`GameInstance::finish`] with the returned state.
    pub(crate) fn place(&mut self, pos: Pos) -> CellState {
        let state = placed_state(&self.board, pos, self.seat);
        self.board.set(pos, state);
        state
    }

    /// Resolve a placed stone: reset on a win, otherwise pass the turn
    pub(crate) fn finish(&mut self, placed: CellState) -> MoveOutcome {
        if placed.is_win() {
            let winner = self.seat;
            self.reset();
            MoveOutcome {
                terminal: true,
                winner: Some(winner),
            }
        } else {
            self.seat = self.seat.opponent();
            MoveOutcome::default()
        }
    }

    /// Apply a move at true board coordinates.
    ///
    /// An illegal move leaves the instance untouched and reports instance 0
    /// in the error; batch callers supply their own index.
    pub fn apply(&mut self, pos: Pos, flood: &mut Flood) -> Result<MoveOutcome> {
        let size = self.board.size();
        self.check(pos).map_err(|reason| match reason {
            IllegalReason::OutOfRange => HexError::off_board(0, pos, size),
            reason => HexError::illegal(0, pos.index(size), reason),
        })?;

        let placed = self.place(pos);
        flood.propagate(std::slice::from_mut(self), &[(0, pos)]);
        Ok(self.finish(placed))
    }

    /// Clear the board and hand the move to Black
    pub fn reset(&mut self) {
        self.board.clear();
        self.seat = Player::Black;
    }
}

impl AsMut<Board> for GameInstance {
    fn as_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_instance() {
        let game = GameInstance::new(5);
        assert_eq!(game.seat(), Player::Black);
        assert_eq!(game.board().occupied(), 0);
        assert_eq!(game.boardsize(), 5);
    }

    #[test]
    fn test_apply_alternates_seat() {
        let mut game = GameInstance::new(3);
        let mut flood = Flood::new();
        let outcome = game.apply(Pos::new(1, 1), &mut flood).unwrap();
        assert!(!outcome.terminal);
        assert_eq!(game.seat(), Player::White);
        assert_eq!(game.board().get(Pos::new(1, 1)), CellState::BlackStone);

        game.apply(Pos::new(0, 0), &mut flood).unwrap();
        assert_eq!(game.seat(), Player::Black);
        assert_eq!(game.board().get(Pos::new(0, 0)), CellState::WhiteWestConnected);
    }

    #[test]
    fn test_occupied_cell_is_rejected_without_mutation() {
        let mut game = GameInstance::new(3);
        let mut flood = Flood::new();
        game.apply(Pos::new(1, 1), &mut flood).unwrap();
        let before = game.clone();

        let err = game.apply(Pos::new(1, 1), &mut flood).unwrap_err();
        assert!(matches!(
            err,
            HexError::IllegalMove {
                action: 4,
                reason: IllegalReason::Occupied,
                ..
            }
        ));
        assert_eq!(game, before);
    }

    #[test]
    fn test_off_board_is_rejected() {
        let mut game = GameInstance::new(3);
        let mut flood = Flood::new();
        let err = game.apply(Pos::new(3, 0), &mut flood).unwrap_err();
        assert!(matches!(
            err,
            HexError::IllegalMove {
                reason: IllegalReason::OutOfRange,
                ..
            }
        ));
    }

    #[test]
    fn test_win_resets_instance() {
        let board = Board::parse(
            "
            ^..
            ...
            v..
            ",
        )
        .unwrap();
        let mut game = GameInstance::from_board(board, Player::Black);
        let mut flood = Flood::new();
        let outcome = game.apply(Pos::new(1, 0), &mut flood).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome {
                terminal: true,
                winner: Some(Player::Black),
            }
        );
        assert_eq!(game.board().occupied(), 0);
        assert_eq!(game.seat(), Player::Black);
    }

    #[test]
    fn test_white_win_resets_to_black() {
        let board = Board::parse(
            "
            ...
            <.>
            ...
            ",
        )
        .unwrap();
        let mut game = GameInstance::from_board(board, Player::White);
        let mut flood = Flood::new();
        let outcome = game.apply(Pos::new(1, 1), &mut flood).unwrap();
        assert_eq!(outcome.winner, Some(Player::White));
        assert_eq!(game.seat(), Player::Black);
        assert_eq!(game.board().occupied(), 0);
    }

    #[test]
    fn test_one_cell_board_is_won_immediately() {
        let mut game = GameInstance::new(1);
        let mut flood = Flood::new();
        let outcome = game.apply(Pos::new(0, 0), &mut flood).unwrap();
        assert!(outcome.terminal);
        assert_eq!(outcome.winner, Some(Player::Black));
    }
}
