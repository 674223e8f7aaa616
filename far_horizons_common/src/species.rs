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

//! Species: the players of the game

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};

use crate::{
    Coords, SpeciesId,
    celestial::Gas,
    colony::Colony,
    record::{CONTACT_WORDS, NUM_TECHS},
    ship::Ship,
};

/// The six technologies
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
    EnumCount,
    FromRepr,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum Tech {
    /// Mining
    MI,
    /// Manufacturing
    MA,
    /// Military
    ML,
    /// Gravitics
    GV,
    /// Life support
    LS,
    /// Biology
    BI,
}

const _: () = assert!(Tech::COUNT == NUM_TECHS);

impl Tech {
    /// Index into per-tech arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// The abbreviation used in orders and reports
    pub fn abbr(self) -> &'static str {
        self.into()
    }
}

/// Levels of all six technologies
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct TechLevels(pub [i16; NUM_TECHS]);

impl TechLevels {
    /// Level of one technology
    pub fn get(&self, tech: Tech) -> i16 {
        self.0[tech.index()]
    }

    /// Mutable level of one technology
    pub fn get_mut(&mut self, tech: Tech) -> &mut i16 {
        &mut self.0[tech.index()]
    }
}

/// A set of species numbers, stored in the files as a bit set
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SpeciesSet(BTreeSet<SpeciesId>);

impl SpeciesSet {
    /// Unpack from bit-set words; bit `n - 1` stands for species `n`
    pub fn from_words(words: [u32; CONTACT_WORDS]) -> Self {
        let mut set = BTreeSet::new();
        for (w, word) in words.iter().enumerate() {
            for bit in 0..32 {
                if word & (1 << bit) != 0 {
                    if let Some(species) = SpeciesId::new((w * 32 + bit + 1) as u8) {
                        set.insert(species);
                    }
                }
            }
        }
        Self(set)
    }

    /// Pack into bit-set words
    pub fn to_words(&self) -> [u32; CONTACT_WORDS] {
        let mut words = [0; CONTACT_WORDS];
        for species in &self.0 {
            let bit = usize::from(species.get() - 1);
            if let Some(word) = words.get_mut(bit / 32) {
                *word |= 1 << (bit % 32);
            }
        }
        words
    }

    /// Whether a species is in the set
    pub fn contains(&self, species: SpeciesId) -> bool {
        self.0.contains(&species)
    }

    /// Add a species; returns whether it was newly added
    pub fn insert(&mut self, species: SpeciesId) -> bool {
        self.0.insert(species)
    }

    /// Remove a species
    pub fn remove(&mut self, species: SpeciesId) -> bool {
        self.0.remove(&species)
    }

    /// Members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.0.iter().copied()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A species and everything it owns
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Species {
    /// Species number, 1-based
    pub id: SpeciesId,
    /// Name
    pub name: String,
    /// Government name
    pub govt_name: String,
    /// Government type
    pub govt_type: String,
    /// System of the homeworld
    pub home: Coords,
    /// Orbit of the homeworld
    pub home_orbit: u8,
    /// Gas the species breathes
    pub required_gas: Gas,
    /// Minimum acceptable percentage of the required gas
    pub required_gas_min: u8,
    /// Maximum acceptable percentage of the required gas
    pub required_gas_max: u8,
    /// Gases that neither help nor hurt
    pub neutral_gases: Vec<Gas>,
    /// Gases that are poisonous
    pub poison_gases: Vec<Gas>,
    /// Whether the engine generates orders for under-specified colonies and transports
    pub auto_orders: bool,
    /// Current usable tech levels
    pub tech_levels: TechLevels,
    /// Tech levels at the start of the game
    pub init_tech_levels: TechLevels,
    /// Knowledge levels: known but not yet applied
    pub tech_knowledge: TechLevels,
    /// Research spending not yet turned into levels
    pub tech_eps: [i32; NUM_TECHS],
    /// Economic base of the homeworld when the game started
    pub hp_original_base: i32,
    /// Banked economic units
    pub econ_units: i32,
    /// Fleet maintenance cost last turn
    pub fleet_cost: i32,
    /// Fleet maintenance, in hundredths of a percent of production
    pub fleet_percent_cost: i32,
    /// Species met
    pub contacts: SpeciesSet,
    /// Declared allies
    pub allies: SpeciesSet,
    /// Declared enemies
    pub enemies: SpeciesSet,
    /// Colonies; index 0 is the homeworld
    pub colonies: Vec<Colony>,
    /// Ships
    pub ships: Vec<Ship>,
    /// Unused bytes of the file header and after the last ship
    pub reserved: SpeciesReserved,
}

/// Bytes of a species file with no meaning to the engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SpeciesReserved {
    pub reserved3: u8,
    pub reserved4: i16,
    pub reserved5: u8,
    /// Header padding
    pub padding: [u8; 12],
    /// Bytes after the last ship
    pub trailer: Vec<u8>,
}

impl Species {
    /// The homeworld colony
    pub fn homeworld(&self) -> Option<&Colony> {
        self.colonies.first()
    }

    /// Find a colony by name, ignoring case
    pub fn colony_by_name(&self, name: &str) -> Option<usize> {
        self.colonies
            .iter()
            .position(|colony| colony.name.eq_ignore_ascii_case(name))
    }

    /// Find a colony at a planet
    pub fn colony_at(&self, coords: Coords, orbit: u8) -> Option<usize> {
        self.colonies
            .iter()
            .position(|colony| colony.coords == coords && colony.orbit == orbit)
    }

    /// Find a ship by name, ignoring case
    pub fn ship_by_name(&self, name: &str) -> Option<usize> {
        self.ships
            .iter()
            .position(|ship| ship.name.eq_ignore_ascii_case(name))
    }

    /// Whether the species treats another as an enemy
    pub fn is_enemy(&self, other: SpeciesId) -> bool {
        self.enemies.contains(other)
    }

    /// Set a relationship, keeping ally and enemy exclusive
    pub fn set_relation(&mut self, other: SpeciesId, relation: Relation) {
        match relation {
            Relation::Ally => {
                self.enemies.remove(other);
                self.allies.insert(other);
            }
            Relation::Enemy => {
                self.allies.remove(other);
                self.enemies.insert(other);
            }
            Relation::Neutral => {
                self.allies.remove(other);
                self.enemies.remove(other);
            }
        }
    }
}

/// Diplomatic stance towards another species
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// ALLY
    Ally,
    /// ENEMY
    Enemy,
    /// NEUTRAL
    Neutral,
}
