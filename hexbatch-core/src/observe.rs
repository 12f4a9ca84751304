//! Observation builder
//!
//! Observations are always in the mover's canonical frame (see
//! [`crate::canonical`]): plane 0 holds the mover's stones, plane 1 the
//! opponent's, and the legality mask is indexed by canonical action.

use serde::{Deserialize, Serialize};

use crate::board::Pos;
use crate::canonical::{canonical_plane, from_canonical, to_canonical};
use crate::cell::{color_of, Player};
use crate::game::GameInstance;

/// Number of occupancy planes per cell
pub const PLANES: usize = 2;

/// One instance's view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceObservation {
    pub seat: Player,
    pub boardsize: usize,
    /// `[row][col][plane]`, row-major, canonical frame
    pub occupancy: Vec<bool>,
    /// `[row * boardsize + col]`, canonical frame
    pub legal: Vec<bool>,
}

impl InstanceObservation {
    pub fn occupied(&self, pos: Pos, plane: usize) -> bool {
        self.occupancy[pos.index(self.boardsize) * PLANES + plane]
    }

    /// Canonical actions that are currently legal
    pub fn legal_actions(&self) -> Vec<usize> {
        self.legal
            .iter()
            .enumerate()
            .filter(|(_, ok)| **ok)
            .map(|(i, _)| i)
            .collect()
    }

    /// Swap back to the true board frame: untranspose and, for White,
    /// swap planes so plane 0 is Black again
    pub fn to_board_frame(&self) -> InstanceObservation {
        let n = self.boardsize;
        let mut occupancy = vec![false; n * n * PLANES];
        let mut legal = vec![false; n * n];
        for idx in 0..n * n {
            let canon = Pos::from_index(idx, n);
            let truth = from_canonical(self.seat, canon).index(n);
            legal[truth] = self.legal[idx];
            for plane in 0..PLANES {
                let owner = if plane == 0 { self.seat } else { self.seat.opponent() };
                occupancy[truth * PLANES + owner.seat()] = self.occupancy[idx * PLANES + plane];
            }
        }
        InstanceObservation {
            seat: self.seat,
            boardsize: n,
            occupancy,
            legal,
        }
    }
}

/// Observation of a whole batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub boardsize: usize,
    pub instances: Vec<InstanceObservation>,
}

impl Observation {
    pub fn batch_size(&self) -> usize {
        self.instances.len()
    }

    pub fn seats(&self) -> Vec<Player> {
        self.instances.iter().map(|o| o.seat).collect()
    }

    /// Occupancy of every instance as `[batch][row][col][plane]` floats
    pub fn occupancy_f32(&self) -> Vec<f32> {
        self.instances
            .iter()
            .flat_map(|o| o.occupancy.iter().map(|&b| if b { 1.0 } else { 0.0 }))
            .collect()
    }

    /// Legality of every instance as `[batch][action]`
    pub fn legal_mask(&self) -> Vec<bool> {
        self.instances.iter().flat_map(|o| o.legal.iter().copied()).collect()
    }
}

/// Build `instance`'s canonical view
pub fn observe(instance: &GameInstance) -> InstanceObservation {
    let board = instance.board();
    let n = board.size();
    let seat = instance.seat();
    let mut occupancy = vec![false; n * n * PLANES];
    let mut legal = vec![false; n * n];

    for (idx, &state) in board.cells().iter().enumerate() {
        let canon = to_canonical(seat, Pos::from_index(idx, n)).index(n);
        match color_of(state) {
            None => legal[canon] = true,
            Some(owner) => occupancy[canon * PLANES + canonical_plane(seat, owner)] = true,
        }
    }

    InstanceObservation {
        seat,
        boardsize: n,
        occupancy,
        legal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn fixture() -> Board {
        Board::parse(
            "
            .b.
            w..
            ..v
            ",
        )
        .unwrap()
    }

    #[test]
    fn test_black_view_matches_board() {
        let game = GameInstance::from_board(fixture(), Player::Black);
        let obs = observe(&game);
        assert_eq!(obs.seat, Player::Black);
        assert!(obs.occupied(Pos::new(0, 1), 0));
        assert!(obs.occupied(Pos::new(2, 2), 0));
        assert!(obs.occupied(Pos::new(1, 0), 1));
        assert!(!obs.occupied(Pos::new(1, 0), 0));
        assert_eq!(obs.legal_actions(), vec![0, 2, 4, 5, 6, 7]);
    }

    #[test]
    fn test_white_view_is_transposed_and_swapped() {
        let game = GameInstance::from_board(fixture(), Player::White);
        let obs = observe(&game);
        // White stone at (1, 0) appears at (0, 1) on the mover's plane
        assert!(obs.occupied(Pos::new(0, 1), 0));
        // Black stone at (0, 1) appears at (1, 0) on the opponent plane
        assert!(obs.occupied(Pos::new(1, 0), 1));
        assert!(obs.occupied(Pos::new(2, 2), 1));
        assert!(!obs.legal[1]);
        assert!(!obs.legal[3]);
        assert_eq!(obs.legal.iter().filter(|&&ok| ok).count(), 6);
    }

    #[test]
    fn test_legal_iff_planes_empty() {
        for seat in [Player::Black, Player::White] {
            let obs = observe(&GameInstance::from_board(fixture(), seat));
            for idx in 0..9 {
                let pos = Pos::from_index(idx, 3);
                let empty = !obs.occupied(pos, 0) && !obs.occupied(pos, 1);
                assert_eq!(obs.legal[idx], empty);
            }
        }
    }

    #[test]
    fn test_white_view_equals_black_view_of_mirror() {
        let board = fixture();
        let white = observe(&GameInstance::from_board(board.clone(), Player::White));
        let black = observe(&GameInstance::from_board(board.mirrored(), Player::Black));
        assert_eq!(white.occupancy, black.occupancy);
        assert_eq!(white.legal, black.legal);
    }

    #[test]
    fn test_to_board_frame_undoes_canonicalisation() {
        let board = fixture();
        let white = observe(&GameInstance::from_board(board.clone(), Player::White));
        let black = observe(&GameInstance::from_board(board, Player::Black));
        let restored = white.to_board_frame();
        assert_eq!(restored.occupancy, black.occupancy);
        assert_eq!(restored.legal, black.legal);
    }
}
