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

//! Where each species is present, and what it can see there

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Coords, Galaxy, SpeciesId, ship::ShipStatus};

/// Systems each species is present in
///
/// Recomputed from colonies and ships; never saved.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Locations(BTreeMap<Coords, BTreeSet<SpeciesId>>);

impl Locations {
    /// Presence from populated colonies and ships that aren't under
    /// construction or being forced out of the system
    pub fn compute(galaxy: &Galaxy) -> Self {
        let mut locations: BTreeMap<Coords, BTreeSet<SpeciesId>> = BTreeMap::new();
        for (&id, species) in &galaxy.species {
            let colonies = species
                .colonies
                .iter()
                .filter(|colony| colony.is_populated())
                .map(|colony| colony.coords);
            let ships = species
                .ships
                .iter()
                .filter(|ship| ship.status != ShipStatus::UnderConstruction && !ship.status.must_jump())
                .map(|ship| ship.coords);
            for coords in colonies.chain(ships) {
                locations.entry(coords).or_default().insert(id);
            }
        }
        Self(locations)
    }

    /// Species present at a system
    pub fn at(&self, coords: Coords) -> impl Iterator<Item = SpeciesId> + '_ {
        self.0.get(&coords).into_iter().flatten().copied()
    }

    /// Systems a species is present in
    pub fn of(&self, species: SpeciesId) -> impl Iterator<Item = Coords> + '_ {
        self.0
            .iter()
            .filter(move |(_, present)| present.contains(&species))
            .map(|(&coords, _)| coords)
    }

    /// Whether a species is present at a system
    pub fn contains(&self, coords: Coords, species: SpeciesId) -> bool {
        self.0
            .get(&coords)
            .is_some_and(|present| present.contains(&species))
    }

    /// Pairs of distinct species sharing a system
    pub fn meetings(&self) -> impl Iterator<Item = (SpeciesId, SpeciesId)> + '_ {
        self.0.values().flat_map(|present| {
            present.iter().flat_map(move |&a| {
                present
                    .iter()
                    .filter(move |&&b| b != a)
                    .map(move |&b| (a, b))
            })
        })
    }
}

/// Something one species sees of another
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Sighting {
    /// An alien colony
    Colony {
        /// Owner
        species: SpeciesId,
        /// Colony name
        name: String,
        /// System
        coords: Coords,
        /// Orbit
        orbit: u8,
        /// Economic base, tenths
        base: i32,
    },
    /// An alien ship
    Ship {
        /// Owner
        species: SpeciesId,
        /// Name with class, as written in orders
        name: String,
        /// System
        coords: Coords,
        /// Orbit, or deep space
        orbit: u8,
    },
}

/// Everything alien a species can see
///
/// A hidden colony is only seen by a species holding a colony at the same
/// orbit; nothing else about the viewer matters. Ships are listed once each.
pub fn sightings(galaxy: &Galaxy, locations: &Locations, viewer: SpeciesId) -> Vec<Sighting> {
    let Some(me) = galaxy.species(viewer) else {
        return Vec::new();
    };
    let mut seen = Vec::new();
    let mut listed_ships = BTreeSet::new();
    for coords in locations.of(viewer) {
        for (&id, alien) in galaxy.species.iter().filter(|&(&id, _)| id != viewer) {
            for colony in alien.colonies.iter().filter(|colony| colony.coords == coords) {
                if colony.is_hidden() && me.colony_at(coords, colony.orbit).is_none() {
                    continue;
                }
                if !colony.is_populated() && colony.economic_base() == 0 {
                    continue;
                }
                seen.push(Sighting::Colony {
                    species: id,
                    name: colony.name.clone(),
                    coords,
                    orbit: colony.orbit,
                    base: colony.economic_base(),
                });
            }
            for (index, ship) in alien.ships.iter().enumerate() {
                if ship.coords != coords || ship.status == ShipStatus::UnderConstruction {
                    continue;
                }
                if listed_ships.insert((id, index)) {
                    seen.push(Sighting::Ship {
                        species: id,
                        name: ship.full_name(),
                        coords,
                        orbit: ship.orbit,
                    });
                }
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        colony::{Colony, ColonyStatus},
        ship::{Ship, ShipClass, ShipType},
        tests::{galaxy, id},
    };

    fn scout(coords: Coords) -> Ship {
        Ship::new(
            "Scout".to_string(),
            ShipClass::PB,
            ShipType::Ftl,
            1,
            coords,
            2,
        )
    }

    #[test]
    fn presence_from_colonies_and_ships() {
        let mut galaxy = galaxy();
        let home_of_2 = Coords::new(20, 10, 10);
        galaxy
            .species
            .get_mut(&id(1))
            .expect("species 1")
            .ships
            .push(scout(home_of_2));
        let locations = Locations::compute(&galaxy);
        assert_eq!(locations.at(home_of_2).collect::<Vec<_>>(), vec![id(1), id(2)]);
        assert_eq!(locations.meetings().count(), 2);
        assert!(locations.contains(Coords::new(10, 10, 10), id(1)));
        assert!(!locations.contains(Coords::new(10, 10, 10), id(2)));
    }

    #[test]
    fn hidden_colony_needs_a_neighbour_in_the_same_orbit() {
        let mut galaxy = galaxy();
        let home_of_2 = Coords::new(20, 10, 10);
        {
            let two = galaxy.species.get_mut(&id(2)).expect("species 2");
            let mut outpost = Colony::new("Outpost".to_string(), home_of_2, 3, 5);
            outpost.status |= ColonyStatus::POPULATED | ColonyStatus::HIDDEN;
            outpost.ma_base = 10;
            two.colonies.push(outpost);
        }
        galaxy
            .species
            .get_mut(&id(1))
            .expect("species 1")
            .ships
            .push(scout(home_of_2));

        let locations = Locations::compute(&galaxy);
        let colonies = |seen: &[Sighting]| {
            seen.iter()
                .filter(|s| matches!(s, Sighting::Colony { .. }))
                .count()
        };
        assert_eq!(colonies(&sightings(&galaxy, &locations, id(1))), 1);

        let mut neighbour = Colony::new("Neighbour".to_string(), home_of_2, 3, 5);
        neighbour.status |= ColonyStatus::POPULATED;
        neighbour.pop_units = 1;
        galaxy
            .species
            .get_mut(&id(1))
            .expect("species 1")
            .colonies
            .push(neighbour);
        let locations = Locations::compute(&galaxy);
        assert_eq!(colonies(&sightings(&galaxy, &locations, id(1))), 2);

        // the rule isn't mutual: hiding species 2 still sees species 1's colony
        assert_eq!(colonies(&sightings(&galaxy, &locations, id(2))), 1);
    }

    #[test]
    fn ships_are_listed_once() {
        let mut galaxy = galaxy();
        let home_of_2 = Coords::new(20, 10, 10);
        galaxy
            .species
            .get_mut(&id(2))
            .expect("species 2")
            .ships
            .push(scout(home_of_2));
        let locations = Locations::compute(&galaxy);
        let seen = sightings(&galaxy, &locations, id(1));
        assert!(seen.is_empty());

        galaxy
            .species
            .get_mut(&id(1))
            .expect("species 1")
            .ships
            .push(scout(home_of_2));
        let locations = Locations::compute(&galaxy);
        let seen = sightings(&galaxy, &locations, id(1));
        let ships: Vec<_> = seen
            .iter()
            .filter(|s| matches!(s, Sighting::Ship { .. }))
            .collect();
        assert_eq!(ships.len(), 1);
    }
}
