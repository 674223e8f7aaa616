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

//! Star systems and planets

use serde::{Deserialize, Serialize};
use strum::{FromRepr, IntoStaticStr};

use crate::{Coords, SpeciesId, species::SpeciesSet};

/// A star system
///
/// Systems never move. The legacy files record a wormhole on only one of
/// its two ends; [`crate::Galaxy::wormhole_exit`] resolves either end.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct System {
    /// Position in the galaxy
    pub coords: Coords,
    /// Star type code
    pub star_type: u8,
    /// Star color code
    pub color: u8,
    /// Star size, 0 to 9
    pub size: u8,
    /// Whether the system is a good potential home system
    pub home_system: bool,
    /// Where the wormhole recorded on this side leads
    pub wormhole: Option<Coords>,
    /// Indexes into [`crate::Galaxy::planets`], innermost orbit first
    pub planets: Vec<usize>,
    /// Species that have been here
    pub visited_by: SpeciesSet,
    /// Message attached to the system
    pub message: i32,
    /// Unused words
    pub reserved: (i16, i16, [u8; 2], [i32; 3]),
}

impl System {
    /// Planet index for an orbit, counting from 1
    pub fn planet_in_orbit(&self, orbit: u8) -> Option<usize> {
        usize::from(orbit)
            .checked_sub(1)
            .and_then(|slot| self.planets.get(slot))
            .copied()
    }

    /// Whether a species has been here
    pub fn visited(&self, species: SpeciesId) -> bool {
        self.visited_by.contains(species)
    }
}

/// One of the gases a planet's atmosphere may contain
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum Gas {
    /// No gas in this slot
    None,
    /// Hydrogen
    H2,
    /// Methane
    CH4,
    /// Helium
    He,
    /// Ammonia
    NH3,
    /// Nitrogen
    N2,
    /// Carbon dioxide
    CO2,
    /// Oxygen
    O2,
    /// Hydrogen chloride
    HCl,
    /// Chlorine
    Cl2,
    /// Fluorine
    F2,
    /// Steam
    H2O,
    /// Sulfur dioxide
    SO2,
    /// Hydrogen sulfide
    H2S,
}

impl Gas {
    /// Decode a gas code, treating unknown codes as empty
    pub fn from_code(code: u8) -> Self {
        Self::from_repr(code).unwrap_or(Self::None)
    }

    /// Legacy gas code
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Planets the galaxy generator marked out
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum PlanetSpecial {
    /// Nothing special
    None,
    /// Ideal home planet
    IdealHome,
    /// Ideal colony planet
    IdealColony,
    /// Radioactive hellhole
    Radioactive,
}

/// A planet, at a fixed orbit of one system
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Planet {
    /// Temperature class
    pub temperature_class: u8,
    /// Pressure class
    pub pressure_class: u8,
    /// Special marking
    pub special: PlanetSpecial,
    /// Atmosphere: up to four gases with percentages summing to 100
    pub atmosphere: Vec<(Gas, u8)>,
    /// Thousands of kilometres
    pub diameter: i16,
    /// Earth gravity times 100
    pub gravity: i16,
    /// Times 100
    pub mining_difficulty: i16,
    /// Increase in mining difficulty per turn mined
    pub md_increase: i16,
    /// Percent
    pub econ_efficiency: i16,
    /// Message attached to the planet
    pub message: i32,
    /// Unused words
    pub reserved: (u8, i16, [i32; 3]),
}

impl Planet {
    /// Percentage of a gas in the atmosphere
    pub fn gas_percent(&self, gas: Gas) -> u8 {
        self.atmosphere
            .iter()
            .filter(|(g, _)| *g == gas)
            .map(|(_, percent)| *percent)
            .sum()
    }
}
