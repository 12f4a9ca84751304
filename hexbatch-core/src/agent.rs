//! Action selection interface and two trivial agents
//!
//! Real agents (search, networks) live outside this crate; these exist to
//! drive the environment in tests, benchmarks and as built-in opponents.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::observe::InstanceObservation;

/// Anything that can pick a canonical action from an observation
pub trait Agent {
    /// Choose a legal canonical action for one instance
    fn select_action(&mut self, obs: &InstanceObservation) -> usize;

    /// Choose an action for every instance of a batch
    fn select_actions(&mut self, obs: &[InstanceObservation]) -> Vec<usize> {
        obs.iter().map(|o| self.select_action(o)).collect()
    }
}

/// Always plays the lowest-numbered legal action
#[derive(Clone, Copy, Debug, Default)]
pub struct LazyAgent;

impl Agent for LazyAgent {
    fn select_action(&mut self, obs: &InstanceObservation) -> usize {
        obs.legal.iter().position(|&ok| ok).unwrap_or(0)
    }
}

/// Uniform over legal actions
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    /// Seeded for reproducibility, or from entropy when `seed` is `None`
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, obs: &InstanceObservation) -> usize {
        let legal = obs.legal_actions();
        legal.choose(&mut self.rng).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::cell::Player;
    use crate::game::GameInstance;
    use crate::observe::observe;

    fn partial() -> InstanceObservation {
        let board = Board::parse("bw.\n...\n...").unwrap();
        observe(&GameInstance::from_board(board, Player::Black))
    }

    #[test]
    fn test_lazy_picks_first_empty() {
        assert_eq!(LazyAgent.select_action(&partial()), 2);
    }

    #[test]
    fn test_random_is_legal_and_reproducible() {
        let obs = partial();
        let mut a = RandomAgent::new(Some(7));
        let mut b = RandomAgent::new(Some(7));
        for _ in 0..20 {
            let x = a.select_action(&obs);
            assert!(obs.legal[x]);
            assert_eq!(x, b.select_action(&obs));
        }
    }
}
