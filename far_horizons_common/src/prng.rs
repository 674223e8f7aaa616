// Copyright 2025 Justin Hu
//
// This file is part of Far Horizons.
//
// Far Horizons is free software: you can redistribute it and/or modify it under
// the terms of the GNU Affero General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Far Horizons is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with Far Horizons. If not, see <https://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The game's random number generator
//!
//! Every chance roll in the game goes through [`Prng::roll`], and players
//! check results against each other, so the sequence for a given seed is a
//! compatibility contract: do not "improve" the arithmetic here.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::SpeciesId;

/// Congruential and shift-register generators combined with exclusive-or
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Prng {
    state: u64,
}

impl Prng {
    /// State used when nothing has been seeded
    pub const DEFAULT_SEED: u64 = 1_924_085_713;

    /// A generator seeded with `seed`, warm-up included
    pub fn new(seed: u64) -> Self {
        let mut prng = Self {
            state: Self::DEFAULT_SEED,
        };
        prng.seed(seed);
        prng
    }

    /// The generator for one species' share of a turn
    pub fn for_species(global_seed: u64, species: SpeciesId) -> Self {
        Self::new(global_seed.wrapping_add(u64::from(species.get())))
    }

    /// Re-seed, then discard a seed-dependent number of outputs so that
    /// nearby seeds don't produce nearby sequences
    pub fn seed(&mut self, seed: u64) {
        self.state = seed;
        let discard = self.roll(100) + self.roll(200) + self.roll(300);
        for _ in 0..discard {
            self.roll(10);
        }
    }

    /// A number in `1..=max`; `max` of zero always yields 1
    pub fn roll(&mut self, max: u32) -> u32 {
        self.step();
        let middle = (self.state >> 32) & 0xFFFF;
        ((middle * u64::from(max)) >> 16) as u32 + 1
    }

    /// Percent chance check: true with probability `percent`/100
    pub fn chance(&mut self, percent: u32) -> bool {
        self.roll(100) <= percent
    }

    fn step(&mut self) {
        let s = self.state;
        let congruential = s.wrapping_add(s << 5).wrapping_add(s << 14);
        let mut shift_register = (s >> 15) ^ s;
        shift_register ^= shift_register << 17;
        self.state = congruential ^ shift_register;
    }
}

impl Default for Prng {
    fn default() -> Self {
        Self {
            state: Self::DEFAULT_SEED,
        }
    }
}

impl RngCore for Prng {
    fn next_u32(&mut self) -> u32 {
        self.step();
        (self.state >> 16) as u32
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn step_matches_hand_computation() {
        let mut prng = Prng { state: 1 };
        prng.step();
        // 1 + 32 + 16384, xor (1 ^ (1 << 17))
        assert_eq!(prng.state, 16417 ^ (1 | 1 << 17));
    }

    #[test]
    fn roll_uses_upper_half_of_middle_word() {
        let mut prng = Prng { state: 0 };
        // an all-zero state stays zero
        assert_eq!(prng.roll(100), 1);
        assert_eq!(prng.state, 0);

        let mut prng = Prng { state: 1 };
        let rolled = prng.roll(65536);
        assert_eq!(rolled as u64, ((prng.state >> 32) & 0xFFFF) + 1);
    }

    #[test]
    fn rolls_stay_in_range() {
        let mut prng = Prng::new(42);
        for max in [1, 2, 6, 100, 10000] {
            for _ in 0..500 {
                let n = prng.roll(max);
                assert!((1..=max).contains(&n), "{n} not in 1..={max}");
            }
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Prng::new(7);
        let mut b = Prng::new(7);
        let a: Vec<u32> = (0..64).map(|_| a.roll(1000)).collect();
        let b: Vec<u32> = (0..64).map(|_| b.roll(1000)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn seeding_discards_warm_up_outputs() {
        let mut unwarmed = Prng { state: 99 };
        let warmed = Prng::new(99);
        let discard = unwarmed.roll(100) + unwarmed.roll(200) + unwarmed.roll(300);
        for _ in 0..discard {
            unwarmed.roll(10);
        }
        assert_eq!(unwarmed, warmed);
    }

    #[test]
    fn species_generators_are_independent() {
        let a = Prng::for_species(1000, SpeciesId::new(1).expect("nonzero"));
        let b = Prng::for_species(1000, SpeciesId::new(2).expect("nonzero"));
        assert_ne!(a, b);
        assert_eq!(a, Prng::new(1001));
    }

    #[test]
    fn works_as_rand_source() {
        let mut a = Prng::new(5);
        let mut b = Prng::new(5);
        let x: u64 = a.random();
        let y: u64 = b.random();
        assert_eq!(x, y);
        assert!(a.random_range(1..=6) <= 6);
    }
}
