//! Dice sources for rolling choices.

use rand::Rng;

/// Source of dice rolls.
pub trait DiceRoller: Send + Sync {
    /// Draw one integer uniformly from `1..=sides`. `sides` is at least 1.
    fn roll(&self, sides: u32) -> u32;
}

/// Rolls with the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDice;

impl DiceRoller for ThreadDice {
    fn roll(&self, sides: u32) -> u32 {
        rand::rng().random_range(1..=sides.max(1))
    }
}

/// Always rolls the same face, capped at the number of sides.
#[derive(Debug, Clone, Copy)]
pub struct FixedRoll(pub u32);

impl DiceRoller for FixedRoll {
    fn roll(&self, sides: u32) -> u32 {
        self.0.clamp(1, sides.max(1))
    }
}
