//! Seat-relative coordinate frame
//!
//! Whoever is to move sees the board as Black does: White's view is the
//! transpose of the true board with the colours swapped, which turns White's
//! west-east goal into a north-south one. The same pair of functions maps
//! observations into the frame and actions back out of it.

use crate::board::Pos;
use crate::cell::Player;

/// True board position -> position as seen by `seat`
pub fn to_canonical(seat: Player, pos: Pos) -> Pos {
    match seat {
        Player::Black => pos,
        Player::White => pos.transposed(),
    }
}

/// Position as seen by `seat` -> true board position
pub fn from_canonical(seat: Player, pos: Pos) -> Pos {
    // Transposition is its own inverse
    to_canonical(seat, pos)
}

/// Linear action in `seat`'s frame -> true board position
pub fn action_to_pos(seat: Player, action: usize, boardsize: usize) -> Pos {
    from_canonical(seat, Pos::from_index(action, boardsize))
}

/// True board position -> linear action in `seat`'s frame
pub fn pos_to_action(seat: Player, pos: Pos, boardsize: usize) -> usize {
    to_canonical(seat, pos).index(boardsize)
}

/// Occupancy plane `seat` sees for stones of `owner`
pub fn canonical_plane(seat: Player, owner: Player) -> usize {
    if owner == seat {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_frame_is_identity() {
        let pos = Pos::new(1, 2);
        assert_eq!(to_canonical(Player::Black, pos), pos);
        assert_eq!(action_to_pos(Player::Black, 5, 3), pos);
    }

    #[test]
    fn test_white_frame_transposes() {
        assert_eq!(action_to_pos(Player::White, 5, 3), Pos::new(2, 1));
        assert_eq!(pos_to_action(Player::White, Pos::new(2, 1), 3), 5);
    }

    #[test]
    fn test_roundtrip_every_cell() {
        let n = 4;
        for seat in [Player::Black, Player::White] {
            for action in 0..n * n {
                let pos = action_to_pos(seat, action, n);
                assert_eq!(pos_to_action(seat, pos, n), action);
            }
        }
    }

    #[test]
    fn test_planes_follow_the_mover() {
        assert_eq!(canonical_plane(Player::Black, Player::Black), 0);
        assert_eq!(canonical_plane(Player::White, Player::White), 0);
        assert_eq!(canonical_plane(Player::White, Player::Black), 1);
    }
}
