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

//! Ships

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, FromRepr, IntoStaticStr};

use crate::{
    Coords,
    colony::PlanetRef,
    item::{Inventory, Item},
};

/// Orbit stored for ships in deep space
pub const DEEP_SPACE_ORBIT: u8 = 99;

/// Hull classes
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    FromRepr,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum ShipClass {
    /// Picketboat
    PB,
    /// Corvette
    CT,
    /// Escort
    ES,
    /// Frigate
    FF,
    /// Destroyer
    DD,
    /// Light cruiser
    CL,
    /// Strike cruiser
    CS,
    /// Heavy cruiser
    CA,
    /// Command cruiser
    CC,
    /// Battlecruiser
    BC,
    /// Battleship
    BS,
    /// Dreadnought
    DN,
    /// Super dreadnought
    SD,
    /// Battlemoon
    BM,
    /// Battleworld
    BW,
    /// Battlestar
    BR,
    /// Starbase
    BA,
    /// Transport
    TR,
}

impl ShipClass {
    /// The abbreviation used in orders and reports
    pub fn abbr(self) -> &'static str {
        self.into()
    }

    /// Fixed tonnage, in units of 10,000 tons; transports and starbases are built to order
    pub fn fixed_tonnage(self) -> Option<i16> {
        use ShipClass::*;
        match self {
            PB => Some(1),
            CT => Some(2),
            ES => Some(5),
            FF => Some(10),
            DD => Some(15),
            CL => Some(20),
            CS => Some(25),
            CA => Some(30),
            CC => Some(35),
            BC => Some(40),
            BS => Some(45),
            DN => Some(50),
            SD => Some(55),
            BM => Some(60),
            BW => Some(65),
            BR => Some(70),
            BA | TR => None,
        }
    }

    /// Whether the class carries cargo for a living
    pub fn is_transport(self) -> bool {
        self == Self::TR
    }

    /// Whether the class is a starbase
    pub fn is_starbase(self) -> bool {
        self == Self::BA
    }

    /// Cost to build, in economic units; sub-light drives and starbases
    /// come at a quarter off
    pub fn build_cost(self, tonnage: i16, ship_type: ShipType) -> i32 {
        let cost = 100 * i32::from(tonnage);
        match ship_type {
            ShipType::Ftl => cost,
            ShipType::SubLight | ShipType::Starbase => cost * 3 / 4,
        }
    }
}

/// Drive type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ShipType {
    /// Can jump
    Ftl,
    /// Can only move a parsec at a time
    SubLight,
    /// Can't move under its own power
    Starbase,
}

/// Where a ship is and what it's doing
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ShipStatus {
    /// Not finished
    UnderConstruction,
    /// Landed on a planet
    OnSurface,
    /// In orbit around a planet
    InOrbit,
    /// In a system but not near any planet
    InDeepSpace,
    /// Withdrew from combat; must jump to its haven
    JumpedInCombat,
    /// Forced to jump by an enemy
    ForcedJump,
}

impl ShipStatus {
    /// Whether the Jump phase must move the ship regardless of orders
    pub fn must_jump(self) -> bool {
        matches!(self, Self::JumpedInCombat | Self::ForcedJump)
    }
}

/// What the turn's phases have decided about a ship so far
///
/// Cleared at the start of every turn.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnAnnotation {
    /// Nothing pending
    #[default]
    Idle,
    /// Carrying cargo to this colony, to be unloaded
    PendingUnload(PlanetRef),
    /// Back at its loading point; cargo for this colony should be developed
    PendingDevelop(PlanetRef),
}

/// A ship
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ship {
    /// Name given by the owner
    pub name: String,
    /// Hull class
    pub class: ShipClass,
    /// Drive type
    pub ship_type: ShipType,
    /// Size, in units of 10,000 tons
    pub tonnage: i16,
    /// Status
    pub status: ShipStatus,
    /// Current system
    pub coords: Coords,
    /// Orbit, or [`DEEP_SPACE_ORBIT`]
    pub orbit: u8,
    /// Where the ship has been told to go
    pub destination: Option<Coords>,
    /// Turns since completion
    pub age: i16,
    /// Cost left to pay while under construction
    pub remaining_cost: i16,
    /// Cargo
    pub inventory: Inventory,
    /// Where transports pick up colonists
    pub loading_point: Option<PlanetRef>,
    /// Where transports drop colonists off
    pub unloading_point: Option<PlanetRef>,
    /// Whether the ship moved during this turn's Jump phase
    pub just_jumped: bool,
    /// Whether the last jump went through a wormhole
    pub arrived_via_wormhole: bool,
    /// Per-turn bookkeeping, never saved
    #[serde(skip)]
    pub annotation: TurnAnnotation,
    /// Legacy scratch word, persisted as found
    pub special: i32,
    /// Unused bytes
    pub reserved: ShipReserved,
}

/// Bytes of a ship record with no meaning to the engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ShipReserved {
    pub reserved: [u8; 3],
    pub pad: u8,
    pub reserved4: i16,
    pub padding: [u8; 28],
}

impl Ship {
    /// Most of one item a ship can hold; each item has a 16-bit save-file slot
    pub const MAX_CARGO: i32 = i16::MAX as i32;

    /// A new ship with an empty hold
    pub fn new(
        name: String,
        class: ShipClass,
        ship_type: ShipType,
        tonnage: i16,
        coords: Coords,
        orbit: u8,
    ) -> Self {
        Self {
            name,
            class,
            ship_type,
            tonnage,
            status: ShipStatus::InOrbit,
            coords,
            orbit,
            destination: None,
            age: 0,
            remaining_cost: 0,
            inventory: Inventory::default(),
            loading_point: None,
            unloading_point: None,
            just_jumped: false,
            arrived_via_wormhole: false,
            annotation: TurnAnnotation::Idle,
            special: 0,
            reserved: ShipReserved::default(),
        }
    }

    /// Name as written in orders and reports, e.g. `TR10 Mule` or `DDS Hunter`
    pub fn full_name(&self) -> String {
        let tonnage = if self.class.fixed_tonnage().is_none() {
            self.tonnage.to_string()
        } else {
            String::new()
        };
        let sublight = if self.ship_type == ShipType::SubLight {
            "S"
        } else {
            ""
        };
        format!("{}{tonnage}{sublight} {}", self.class.abbr(), self.name)
    }

    /// Whether the ship is in deep space rather than at a planet
    pub fn in_deep_space(&self) -> bool {
        self.orbit == DEEP_SPACE_ORBIT
    }

    /// Whether the ship has a working jump drive
    pub fn can_jump(&self) -> bool {
        self.ship_type == ShipType::Ftl && self.status != ShipStatus::UnderConstruction
    }

    /// Cargo space
    pub fn capacity(&self) -> i32 {
        let tonnage = i32::from(self.tonnage);
        match self.class {
            ShipClass::TR => (10 + tonnage / 2) * tonnage,
            ShipClass::BA => 10 * tonnage,
            _ => tonnage,
        }
    }

    /// Cargo space left
    pub fn free_capacity(&self) -> i32 {
        self.capacity() - self.inventory.carried_weight()
    }

    /// How many more of an item fit in its save-file slot
    pub fn slot_room(&self, item: Item) -> i32 {
        (Self::MAX_CARGO - self.inventory.get(item)).max(0)
    }

    /// Whether the ship sits at a particular planet
    pub fn is_at(&self, coords: Coords, orbit: u8) -> bool {
        self.coords == coords && self.orbit == orbit
    }

    /// Move to a new system, arriving at an orbit or in deep space
    pub fn arrive(&mut self, coords: Coords, orbit: Option<u8>) {
        self.coords = coords;
        match orbit {
            Some(orbit) => {
                self.orbit = orbit;
                self.status = ShipStatus::InOrbit;
            }
            None => {
                self.orbit = DEEP_SPACE_ORBIT;
                self.status = ShipStatus::InDeepSpace;
            }
        }
        self.destination = None;
        self.just_jumped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    #[test]
    fn full_names() {
        let mut ship = Ship::new(
            "Mule".to_string(),
            ShipClass::TR,
            ShipType::Ftl,
            10,
            Coords::new(0, 0, 0),
            1,
        );
        assert_eq!(ship.full_name(), "TR10 Mule");
        ship.class = ShipClass::DD;
        ship.ship_type = ShipType::SubLight;
        assert_eq!(ship.full_name(), "DDS Mule");
    }

    #[test]
    fn transport_capacity() {
        let mut ship = Ship::new(
            "Mule".to_string(),
            ShipClass::TR,
            ShipType::Ftl,
            4,
            Coords::new(0, 0, 0),
            1,
        );
        assert_eq!(ship.capacity(), 48);
        ship.inventory.add(Item::CU, 40);
        ship.inventory.add(Item::PD, 2);
        assert_eq!(ship.free_capacity(), 2);
    }

    #[test]
    fn build_costs() {
        assert_eq!(ShipClass::DD.build_cost(15, ShipType::Ftl), 1500);
        assert_eq!(ShipClass::DD.build_cost(15, ShipType::SubLight), 1125);
        assert_eq!(ShipClass::BA.build_cost(4, ShipType::Starbase), 300);
    }

    #[test]
    fn arrival_in_deep_space() {
        let mut ship = Ship::new(
            "Scout".to_string(),
            ShipClass::PB,
            ShipType::Ftl,
            1,
            Coords::new(0, 0, 0),
            1,
        );
        ship.arrive(Coords::new(3, 4, 5), None);
        assert!(ship.in_deep_space());
        assert_eq!(ship.status, ShipStatus::InDeepSpace);
        assert!(ship.just_jumped);
    }
}
