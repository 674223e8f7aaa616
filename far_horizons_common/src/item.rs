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

//! Items that colonies produce and ships carry

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};

use crate::{record::MAX_ITEMS, species::Tech};

/// An item, by its legacy inventory slot
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
pub enum Item {
    /// Raw material units
    RM,
    /// Planetary defense units
    PD,
    /// Starbase units
    SU,
    /// Damage repair units
    DR,
    /// Colonist units
    CU,
    /// Colonial manufacturing units
    IU,
    /// Colonial mining units
    AU,
    /// Fail-safe jump units
    FS,
    /// Jump portal units
    JP,
    /// Forced misjump units
    FM,
    /// Forced jump units
    FJ,
    /// Gravitic telescope units
    GT,
    /// Field distortion units
    FD,
    /// Terraforming plants
    TP,
    /// Germ warfare bombs
    GW,
    SG1,
    SG2,
    SG3,
    SG4,
    SG5,
    SG6,
    SG7,
    SG8,
    SG9,
    GU1,
    GU2,
    GU3,
    GU4,
    GU5,
    GU6,
    GU7,
    GU8,
    GU9,
    X1,
    X2,
    X3,
    X4,
    X5,
}

const _: () = assert!(Item::COUNT == MAX_ITEMS);

impl Item {
    /// The two-to-three letter abbreviation used in orders and reports
    pub fn abbr(self) -> &'static str {
        self.into()
    }

    /// Inventory slot in the save files
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Cost to build one unit, in economic units
    pub fn cost(self) -> i32 {
        use Item::*;
        match self {
            RM | CU | IU | AU => 1,
            PD | DR | FD => 50,
            SU => 110,
            FS => 25,
            JP | FM | X1 | X2 | X3 | X4 | X5 => 100,
            FJ => 125,
            GT => 500,
            TP => 50_000,
            GW => 1000,
            shield_or_gun => 250 * i32::from(shield_or_gun.mark()),
        }
    }

    /// Cargo space one unit takes up
    pub fn carry_weight(self) -> i32 {
        use Item::*;
        match self {
            RM | DR | CU | IU | AU | FS | FD => 1,
            PD => 3,
            FM | FJ => 5,
            JP => 10,
            SU | GT => 20,
            TP | GW | X1 | X2 | X3 | X4 | X5 => 100,
            shield_or_gun => 5 * i32::from(shield_or_gun.mark()),
        }
    }

    /// Tech level needed to build it, if any
    pub fn required_tech(self) -> Option<(Tech, i16)> {
        use Item::*;
        match self {
            RM | CU | IU | AU | PD => None,
            SU => Some((Tech::MA, 20)),
            DR => Some((Tech::MA, 30)),
            FS | JP | FM | FJ => Some((Tech::GV, 20)),
            GT => Some((Tech::GV, 25)),
            FD => Some((Tech::LS, 20)),
            TP => Some((Tech::BI, 40)),
            GW => Some((Tech::BI, 50)),
            X1 | X2 | X3 | X4 | X5 => Some((Tech::ML, 100)),
            shield_or_gun => Some((Tech::ML, 10 * i16::from(shield_or_gun.mark()))),
        }
    }

    /// Mark of a shield generator or gun unit, 0 for anything else
    fn mark(self) -> u8 {
        let slot = self as u8;
        match self {
            Item::SG1
            | Item::SG2
            | Item::SG3
            | Item::SG4
            | Item::SG5
            | Item::SG6
            | Item::SG7
            | Item::SG8
            | Item::SG9 => slot - Item::SG1 as u8 + 1,
            Item::GU1
            | Item::GU2
            | Item::GU3
            | Item::GU4
            | Item::GU5
            | Item::GU6
            | Item::GU7
            | Item::GU8
            | Item::GU9 => slot - Item::GU1 as u8 + 1,
            _ => 0,
        }
    }
}

/// Item quantities held by a colony or a ship
///
/// Only nonzero quantities are stored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Inventory(BTreeMap<Item, i32>);

impl Inventory {
    /// Build from legacy inventory slots
    pub fn from_slots(slots: impl IntoIterator<Item = i32>) -> Self {
        Self(
            slots
                .into_iter()
                .enumerate()
                .filter(|&(_, quantity)| quantity != 0)
                .filter_map(|(slot, quantity)| {
                    Item::from_repr(slot as u8).map(|item| (item, quantity))
                })
                .collect(),
        )
    }

    /// Legacy inventory slots
    pub fn to_slots(&self) -> Vec<i32> {
        let mut slots = vec![0; MAX_ITEMS];
        for (&item, &quantity) in &self.0 {
            slots[item.slot()] = quantity;
        }
        slots
    }

    /// How many of an item are held
    pub fn get(&self, item: Item) -> i32 {
        self.0.get(&item).copied().unwrap_or(0)
    }

    /// Add (or with a negative amount, remove) some units
    pub fn add(&mut self, item: Item, amount: i32) {
        let quantity = self.get(item).saturating_add(amount);
        self.set(item, quantity);
    }

    /// Remove up to `amount` units, returning how many were removed
    pub fn take(&mut self, item: Item, amount: i32) -> i32 {
        let taken = amount.clamp(0, self.get(item).max(0));
        self.add(item, -taken);
        taken
    }

    /// Overwrite the quantity held
    pub fn set(&mut self, item: Item, quantity: i32) {
        if quantity == 0 {
            self.0.remove(&item);
        } else {
            self.0.insert(item, quantity);
        }
    }

    /// Nonzero quantities, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Item, i32)> + '_ {
        self.0.iter().map(|(&item, &quantity)| (item, quantity))
    }

    /// Whether nothing is held
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cargo space used
    pub fn carried_weight(&self) -> i32 {
        self.iter()
            .map(|(item, quantity)| item.carry_weight() * quantity)
            .sum()
    }
}
