//! One-seat view of a batch with a built-in opponent
//!
//! The caller always plays `seat`; whenever a step leaves an instance with
//! the other seat to move (including the opening move of a fresh game when
//! the caller plays White) the opponent answers until the caller is to move
//! again everywhere.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::batch::BatchedEnv;
use crate::cell::Player;
use crate::config::EnvConfig;
use crate::error::Result;
use crate::observe::Observation;

/// Per-instance results from the caller's point of view
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SolitaireTransition {
    /// Whether any game finished in this instance during the step
    pub terminal: Vec<bool>,
    /// Caller's reward summed over its move and the opponent's replies
    pub rewards: Vec<f32>,
}

impl SolitaireTransition {
    fn new(n: usize) -> Self {
        Self {
            terminal: vec![false; n],
            rewards: vec![0.0; n],
        }
    }
}

/// Batch where one seat is played by a fixed opponent
pub struct Solitaire<O> {
    env: BatchedEnv,
    seat: Player,
    opponent: O,
}

impl<O: Agent> Solitaire<O> {
    /// Create the batch and let the opponent open if it plays Black
    pub fn create(config: EnvConfig, seat: Player, opponent: O) -> Result<Self> {
        let env = BatchedEnv::create(config)?;
        let mut solitaire = Self { env, seat, opponent };
        let mut scratch = SolitaireTransition::new(solitaire.env.batch_size());
        let obs = solitaire.env.observe();
        solitaire.reply(obs, &mut scratch)?;
        Ok(solitaire)
    }

    pub fn seat(&self) -> Player {
        self.seat
    }

    pub fn env(&self) -> &BatchedEnv {
        &self.env
    }

    pub fn observe(&self) -> Observation {
        self.env.observe()
    }

    /// Play the caller's actions, then the opponent's replies
    pub fn step(&mut self, actions: &[usize]) -> Result<(SolitaireTransition, Observation)> {
        let (transition, obs) = self.env.step(actions)?;
        let seat = self.seat.seat();
        let mut result = SolitaireTransition {
            terminal: transition.terminal,
            rewards: transition.rewards.iter().map(|r| r[seat]).collect(),
        };
        let obs = self.reply(obs, &mut result)?;
        Ok((result, obs))
    }

    /// Let the opponent move wherever it is its turn, until none remain
    fn reply(&mut self, mut obs: Observation, acc: &mut SolitaireTransition) -> Result<Observation> {
        let seat = self.seat;
        loop {
            let opponent = &mut self.opponent;
            let actions: Vec<Option<usize>> = obs
                .instances
                .iter()
                .map(|o| (o.seat != seat).then(|| opponent.select_action(o)))
                .collect();
            if actions.iter().all(Option::is_none) {
                return Ok(obs);
            }

            let (transition, next) = self.env.step_masked(&actions)?;
            for (i, (terminal, reward)) in transition.terminal.iter().zip(&transition.rewards).enumerate() {
                acc.terminal[i] |= *terminal;
                acc.rewards[i] += reward[seat.seat()];
            }
            obs = next;
        }
    }
}
