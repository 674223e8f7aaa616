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

//! Named planets: a species' claim on a planet

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{Coords, item::Inventory};

bitflags! {
    /// Status of a colony
    ///
    /// The bits are independent. `HOME_PLANET` and `COLONY` may both be set;
    /// the legacy files do that for some homeworlds and the engine keeps it.
    #[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ColonyStatus: u16 {
        /// The species' homeworld
        const HOME_PLANET = 1;
        /// Any colony
        const COLONY = 2;
        /// Has population
        const POPULATED = 8;
        /// Mining colony
        const MINING_COLONY = 16;
        /// Resort colony
        const RESORT_COLONY = 32;
        /// Disbanded by its owner
        const DISBANDED = 64;
        /// Ordered to hide this turn
        const HIDING = 1 << 8;
        /// Hid successfully
        const HIDDEN = 1 << 9;
    }
}

impl ColonyStatus {
    /// Split into the legacy status, hiding and hidden bytes
    pub fn to_legacy(self) -> (u8, u8, u8) {
        (
            (self.bits() & 0xFF) as u8,
            u8::from(self.contains(Self::HIDING)),
            u8::from(self.contains(Self::HIDDEN)),
        )
    }

    /// Fold the legacy status, hiding and hidden bytes together
    pub fn from_legacy(status: u8, hiding: u8, hidden: u8) -> Self {
        let mut flags = Self::from_bits_retain(u16::from(status));
        flags.set(Self::HIDING, hiding != 0);
        flags.set(Self::HIDDEN, hidden != 0);
        flags
    }
}

/// A reference to one of a species' colonies, as stored in ship loading and
/// unloading points
///
/// The files can't store index 0 because 0 means "none", so the homeworld is
/// written as 9999. This is the only place that translation happens.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanetRef(pub usize);

impl PlanetRef {
    /// Stored value meaning "the homeworld"
    pub const HOME_SENTINEL: i16 = 9999;

    /// The homeworld
    pub const HOME: Self = Self(0);

    /// Decode a stored loading or unloading point
    pub fn from_legacy(value: i16) -> Option<Self> {
        match value {
            Self::HOME_SENTINEL => Some(Self::HOME),
            n if n > 0 => Some(Self(n as usize)),
            _ => None,
        }
    }

    /// Encode for storage
    pub fn to_legacy(point: Option<Self>) -> i16 {
        match point {
            None => 0,
            Some(Self(0)) => Self::HOME_SENTINEL,
            Some(Self(n)) => n as i16,
        }
    }

    /// Colony index
    pub fn index(self) -> usize {
        self.0
    }

    /// Whether this refers to the homeworld
    pub fn is_home(self) -> bool {
        self.0 == 0
    }
}

/// A colony
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Colony {
    /// Name given by the owner
    pub name: String,
    /// System
    pub coords: Coords,
    /// Orbit within the system, counting from 1
    pub orbit: u8,
    /// Status flags
    pub status: ColonyStatus,
    /// Index into [`crate::Galaxy::planets`]
    pub planet_index: usize,
    /// Siege effectiveness, percent
    pub siege_eff: i16,
    /// Number of shipyards
    pub shipyards: i16,
    /// Manufacturing units wanted
    pub ius_needed: i32,
    /// Mining units wanted
    pub aus_needed: i32,
    /// Manufacturing units to install automatically
    pub auto_ius: i32,
    /// Mining units to install automatically
    pub auto_aus: i32,
    /// Manufacturing units ordered installed
    pub ius_to_install: i32,
    /// Mining units ordered installed
    pub aus_to_install: i32,
    /// Mining base, tenths of a unit
    pub mi_base: i32,
    /// Manufacturing base, tenths of a unit
    pub ma_base: i32,
    /// Available population units
    pub pop_units: i32,
    /// Stored items
    pub inventory: Inventory,
    /// Units to use on ambushes
    pub use_on_ambush: i32,
    /// Message attached to the colony
    pub message: i32,
    /// Legacy scratch word, persisted as found
    pub special: i32,
    /// Unused bytes
    pub reserved: ColonyReserved,
}

/// Bytes of a colony record with no meaning to the engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ColonyReserved {
    pub reserved1: u8,
    pub pad: [u8; 2],
    pub reserved4: i32,
    pub reserved5: i32,
    pub reserved6: i32,
    pub padding: [u8; 28],
}

impl Colony {
    /// Economic base above which colonies aren't developed automatically, in tenths
    pub const DEVELOPMENT_CEILING: i32 = 2000;

    /// A freshly claimed, empty colony
    pub fn new(name: String, coords: Coords, orbit: u8, planet_index: usize) -> Self {
        Self {
            name,
            coords,
            orbit,
            status: ColonyStatus::COLONY,
            planet_index,
            siege_eff: 0,
            shipyards: 0,
            ius_needed: 0,
            aus_needed: 0,
            auto_ius: 0,
            auto_aus: 0,
            ius_to_install: 0,
            aus_to_install: 0,
            mi_base: 0,
            ma_base: 0,
            pop_units: 0,
            inventory: Inventory::default(),
            use_on_ambush: 0,
            message: 0,
            special: 0,
            reserved: ColonyReserved::default(),
        }
    }

    /// Combined mining and manufacturing base
    pub fn economic_base(&self) -> i32 {
        self.mi_base + self.ma_base
    }

    /// Whether the colony has population
    pub fn is_populated(&self) -> bool {
        self.status.contains(ColonyStatus::POPULATED)
    }

    /// Whether the colony is the homeworld
    pub fn is_home(&self) -> bool {
        self.status.contains(ColonyStatus::HOME_PLANET)
    }

    /// Whether the colony can run a production center
    pub fn is_producing(&self) -> bool {
        !self.status.contains(ColonyStatus::DISBANDED) && self.economic_base() > 0
    }

    /// Whether the colony is hidden from aliens this turn
    pub fn is_hidden(&self) -> bool {
        self.status.contains(ColonyStatus::HIDDEN)
    }

    /// Set or clear the populated flag from the current population and base
    pub fn refresh_populated(&mut self) {
        let populated = self.pop_units > 0 || self.economic_base() > 0;
        self.status.set(ColonyStatus::POPULATED, populated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_sentinel_round_trips() {
        assert_eq!(PlanetRef::from_legacy(9999), Some(PlanetRef::HOME));
        assert_eq!(PlanetRef::from_legacy(0), None);
        assert_eq!(PlanetRef::from_legacy(-4), None);
        assert_eq!(PlanetRef::from_legacy(3), Some(PlanetRef(3)));
        assert_eq!(PlanetRef::to_legacy(Some(PlanetRef::HOME)), 9999);
        assert_eq!(PlanetRef::to_legacy(Some(PlanetRef(3))), 3);
        assert_eq!(PlanetRef::to_legacy(None), 0);
    }

    #[test]
    fn home_and_colony_bits_may_overlap() {
        let status = ColonyStatus::from_legacy(1 | 2 | 8, 0, 1);
        assert!(status.contains(ColonyStatus::HOME_PLANET | ColonyStatus::COLONY));
        assert!(status.contains(ColonyStatus::HIDDEN));
        assert_eq!(status.to_legacy(), (11, 0, 1));
    }

    #[test]
    fn unknown_status_bits_survive() {
        let status = ColonyStatus::from_legacy(4 | 128, 0, 0);
        assert_eq!(status.to_legacy().0, 132);
    }
}
