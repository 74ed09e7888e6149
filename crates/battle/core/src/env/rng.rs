//! Random number oracles.
//!
//! Every probabilistic roll in the rules (hit, crit, block, effect chance,
//! ordering coin flip, bot choice) goes through [`RngOracle`], so a seeded
//! oracle replays a battle exactly.

use std::collections::VecDeque;

pub trait RngOracle: Send {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `[0, 1)`.
    fn roll(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform index in `0..len`. Returns 0 for empty or single ranges.
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.roll() * len as f64) as usize).min(len - 1)
    }

    /// Unweighted coin flip.
    fn coin_flip(&mut self) -> bool {
        self.roll() < 0.5
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.state = Self::pcg_step(seed.wrapping_add(Self::INCREMENT));
        rng
    }

    /// `state' = state * multiplier + increment (mod 2^64)`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        Self::pcg_output(old)
    }
}

/// Replays a scripted list of rolls, then repeats `fallback` forever.
#[derive(Clone, Debug)]
pub struct SequenceRng {
    rolls: VecDeque<f64>,
    fallback: f64,
}

impl SequenceRng {
    pub fn new(rolls: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback,
        }
    }

    /// Every roll returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new([], value)
    }
}

impl RngOracle for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        (self.roll() * (f64::from(u32::MAX) + 1.0)) as u32
    }

    fn roll(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.fallback).clamp(0.0, 0.999_999_999)
    }
}

/// Mixes a base seed with a battle id and turn into a per-step seed.
pub fn compute_seed(base_seed: u64, battle: u64, turn: u32) -> u64 {
    let mut hash = base_seed;
    hash ^= battle.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(turn).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_is_deterministic_per_seed() {
        let mut a = PcgRng::new(42);
        let mut b = PcgRng::new(42);
        let mut c = PcgRng::new(43);
        let run_a: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let run_b: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        let run_c: Vec<u32> = (0..8).map(|_| c.next_u32()).collect();
        assert_eq!(run_a, run_b);
        assert_ne!(run_a, run_c);
    }

    #[test]
    fn rolls_stay_in_unit_interval() {
        let mut rng = PcgRng::new(7);
        for _ in 0..1_000 {
            let roll = rng.roll();
            assert!((0.0..1.0).contains(&roll));
        }
    }

    #[test]
    fn pick_covers_range() {
        let mut rng = PcgRng::new(99);
        let mut seen = [false; 3];
        for _ in 0..200 {
            seen[rng.pick(3)] = true;
        }
        assert_eq!(seen, [true, true, true]);
        assert_eq!(rng.pick(0), 0);
    }

    #[test]
    fn sequence_replays_then_falls_back() {
        let mut rng = SequenceRng::new([0.1, 0.9], 0.5);
        assert!((rng.roll() - 0.1).abs() < 1e-12);
        assert!((rng.roll() - 0.9).abs() < 1e-12);
        assert!((rng.roll() - 0.5).abs() < 1e-12);
        assert!(!rng.coin_flip());
        assert_eq!(SequenceRng::new([0.7], 0.0).pick(2), 1);
    }
}
