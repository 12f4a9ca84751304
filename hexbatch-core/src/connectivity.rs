//! Incremental edge-connectivity propagation
//!
//! Each stone records which of its owner's goal sides its group touches.
//! Placing a stone seeds it with the union of its same-colour neighbours'
//! flags and its own edges; [`Flood::propagate`] then pushes that union out
//! through the group until nothing changes. Flags only ever grow, so each
//! cell changes at most twice and the queue always drains.
//!
//! The queue holds `(board, position)` pairs so that many boards can be
//! flooded together in lockstep rounds, the way the batch steps them.

use crate::board::{Board, Pos};
use crate::cell::{color_of, connection_flags, edge_sides, CellState, Player, Sides};

/// Flags a new `player` stone at `pos` starts with
pub fn initial_flags(board: &Board, pos: Pos, player: Player) -> Sides {
    let size = board.size();
    pos.neighbours(size)
        .iter()
        .map(|&n| board.get(n))
        .filter(|&state| color_of(state) == Some(player))
        .fold(edge_sides(player, pos, size), |acc, state| acc | connection_flags(state))
}

/// State a new `player` stone at `pos` would be written with
pub fn placed_state(board: &Board, pos: Pos, player: Player) -> CellState {
    CellState::with_flags(player, initial_flags(board, pos, player))
}

/// Reusable work queue for flag propagation.
///
/// Buffers are kept between calls so a long-running batch does not allocate
/// per step once the queue has grown to its working size.
#[derive(Clone, Debug, Default)]
pub struct Flood {
    pending: Vec<(usize, Pos)>,
    next: Vec<(usize, Pos)>,
    /// Per-cell "already in `next`" marks, indexed board-major
    queued: Vec<bool>,
    rounds: usize,
}

impl Flood {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rounds used by the last propagation
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Spread connection flags outward from `seeds`.
    ///
    /// Every seed must hold a stone whose flags are already final for its
    /// own position. Returns the number of cells upgraded.
    pub fn propagate<B: AsMut<Board>>(&mut self, boards: &mut [B], seeds: &[(usize, Pos)]) -> usize {
        self.rounds = 0;
        if seeds.is_empty() || boards.is_empty() {
            return 0;
        }

        let size = boards[0].as_mut().size();
        let cells = size * size;
        self.queued.clear();
        self.queued.resize(boards.len() * cells, false);

        self.pending.clear();
        self.pending.extend_from_slice(seeds);

        let mut upgraded = 0;
        while !self.pending.is_empty() {
            self.rounds += 1;
            self.next.clear();

            for &(b, pos) in &self.pending {
                let board = boards[b].as_mut();
                let state = board.get(pos);
                let player = match color_of(state) {
                    Some(p) => p,
                    None => continue,
                };
                let flags = connection_flags(state);

                for n in pos.neighbours(size) {
                    let theirs = board.get(n);
                    if color_of(theirs) != Some(player) {
                        continue;
                    }
                    let have = connection_flags(theirs);
                    if have.contains(flags) {
                        continue;
                    }
                    board.set(n, CellState::with_flags(player, have | flags));
                    upgraded += 1;

                    let slot = b * cells + n.index(size);
                    if !self.queued[slot] {
                        self.queued[slot] = true;
                        self.next.push((b, n));
                    }
                }
            }

            for &(b, pos) in &self.next {
                self.queued[b * cells + pos.index(size)] = false;
            }
            std::mem::swap(&mut self.pending, &mut self.next);
        }

        upgraded
    }

    /// Re-derive every stone's flags from scratch on one board.
    ///
    /// Adds each stone's own edge sides, then propagates from all stones.
    /// On a board produced by normal play this changes nothing.
    pub fn converge(&mut self, board: &mut Board) -> usize {
        let size = board.size();
        let mut changed = 0;
        let stones: Vec<Pos> = board.stones().collect();

        for &pos in &stones {
            let state = board.get(pos);
            if let Some(player) = color_of(state) {
                let flags = connection_flags(state) | edge_sides(player, pos, size);
                let updated = CellState::with_flags(player, flags);
                if updated != state {
                    board.set(pos, updated);
                    changed += 1;
                }
            }
        }

        let seeds: Vec<(usize, Pos)> = stones.into_iter().map(|p| (0, p)).collect();
        changed + self.propagate(std::slice::from_mut(board), &seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board, flood: &mut Flood, pos: Pos, player: Player) -> CellState {
        let state = placed_state(board, pos, player);
        board.set(pos, state);
        flood.propagate(std::slice::from_mut(board), &[(0, pos)]);
        state
    }

    #[test]
    fn test_edge_stone_gets_edge_flag() {
        let board = Board::new(3);
        assert_eq!(placed_state(&board, Pos::new(0, 1), Player::Black), CellState::BlackNorthConnected);
        assert_eq!(placed_state(&board, Pos::new(2, 1), Player::Black), CellState::BlackSouthConnected);
        assert_eq!(placed_state(&board, Pos::new(1, 1), Player::Black), CellState::BlackStone);
        assert_eq!(placed_state(&board, Pos::new(1, 2), Player::White), CellState::WhiteEastConnected);
    }

    #[test]
    fn test_flags_flow_through_group() {
        let mut board = Board::parse(
            "
            ...
            bbb
            .w.
            ",
        )
        .unwrap();
        let mut flood = Flood::new();
        let state = place(&mut board, &mut flood, Pos::new(2, 0), Player::Black);
        assert_eq!(state, CellState::BlackSouthConnected);
        assert_eq!(
            board,
            Board::parse(
                "
                ...
                vvv
                vw.
                "
            )
            .unwrap()
        );
    }

    #[test]
    fn test_bridge_upgrades_existing_group() {
        let mut board = Board::parse(
            "
            .^...
            .^...
            .....
            .bb..
            .....
            ",
        )
        .unwrap();
        let mut flood = Flood::new();
        let state = place(&mut board, &mut flood, Pos::new(2, 1), Player::Black);
        assert_eq!(state, CellState::BlackNorthConnected);
        assert_eq!(board.get(Pos::new(3, 1)), CellState::BlackNorthConnected);
        assert_eq!(board.get(Pos::new(3, 2)), CellState::BlackNorthConnected);
    }

    #[test]
    fn test_bridge_between_goals_wins() {
        let mut board = Board::parse(
            "
            .^...
            .^...
            ....b
            .v...
            .vw..
            ",
        )
        .unwrap();
        let mut flood = Flood::new();
        let state = place(&mut board, &mut flood, Pos::new(2, 1), Player::Black);
        assert_eq!(state, CellState::BlackWin);
        for pos in [Pos::new(0, 1), Pos::new(1, 1), Pos::new(3, 1), Pos::new(4, 1)] {
            assert_eq!(board.get(pos), CellState::BlackWin, "{:?}", pos);
        }
        assert_eq!(board.get(Pos::new(2, 4)), CellState::BlackStone);
        assert_eq!(board.get(Pos::new(4, 2)), CellState::WhiteStone);
    }

    #[test]
    fn test_other_colour_blocks_propagation() {
        let mut board = Board::parse(
            "
            .w.
            b..
            ...
            ",
        )
        .unwrap();
        let mut flood = Flood::new();
        place(&mut board, &mut flood, Pos::new(0, 0), Player::Black);
        assert_eq!(board.get(Pos::new(1, 0)), CellState::BlackNorthConnected);
        assert_eq!(board.get(Pos::new(0, 1)), CellState::WhiteStone);
    }

    #[test]
    fn test_converge_is_idempotent_after_play() {
        let mut board = Board::new(4);
        let mut flood = Flood::new();
        let moves = [
            (Pos::new(0, 1), Player::Black),
            (Pos::new(1, 1), Player::White),
            (Pos::new(1, 0), Player::Black),
            (Pos::new(1, 2), Player::White),
            (Pos::new(2, 0), Player::Black),
            (Pos::new(1, 3), Player::White),
        ];
        for (pos, player) in moves {
            place(&mut board, &mut flood, pos, player);
        }
        let before = board.clone();
        assert_eq!(flood.converge(&mut board), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_converge_repairs_stale_fixture() {
        let mut board = Board::parse(
            "
            b..
            b..
            b..
            ",
        )
        .unwrap();
        let mut flood = Flood::new();
        assert!(flood.converge(&mut board) > 0);
        assert_eq!(board.winner(), Some(Player::Black));
    }

    #[test]
    fn test_batched_propagation_keeps_boards_apart() {
        let mut boards = vec![Board::parse("...\nbb.\n...").unwrap(), Board::parse("...\nbb.\n...").unwrap()];
        let seed = Pos::new(2, 0);
        let state = placed_state(&boards[1], seed, Player::Black);
        boards[1].set(seed, state);
        let mut flood = Flood::new();
        assert_eq!(flood.propagate(&mut boards, &[(1, seed)]), 2);
        assert_eq!(boards[0].get(Pos::new(1, 1)), CellState::BlackStone);
        assert_eq!(boards[1].get(Pos::new(1, 1)), CellState::BlackSouthConnected);
        assert_eq!(flood.rounds(), 2);
    }
}
