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

//! Automatic orders: installing, unloading and developing for species that
//! leave routine colonisation logistics to the engine
//!
//! The same helpers back the explicit INSTALL and DEVELOP orders.

use serde::{Deserialize, Serialize};

use crate::{
    colony::{Colony, ColonyStatus, PlanetRef},
    economy::develop_amount,
    item::{Inventory, Item},
    order::OrderError,
    species::Species,
};

/// Units installed into a colony's base
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Installed {
    /// IU or AU
    pub item: Item,
    /// Units installed
    pub amount: i32,
}

/// Cargo a transport put down at a colony
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Unloaded {
    /// Colony index
    pub colony: usize,
    /// What was moved
    pub cargo: Inventory,
}

/// Colonists and industry produced for a colony
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Developed {
    /// Colony being developed
    pub target: usize,
    /// Units of CU produced, and of IU or AU
    pub units: i32,
    /// IU or AU
    pub item: Item,
    /// Economic units spent
    pub cost: i32,
    /// Ship the units were loaded onto
    pub ship: Option<usize>,
}

/// Install IUs or AUs, each needing one colonist unit
///
/// `requested` of `None` installs as many as possible.
pub fn install(colony: &mut Colony, item: Item, requested: Option<i32>) -> Result<Installed, OrderError> {
    if !matches!(item, Item::IU | Item::AU) {
        return Err(OrderError::MissingArgument("IU or AU"));
    }
    let available = colony.inventory.get(item).min(colony.inventory.get(Item::CU));
    let amount = match requested {
        Some(amount) if amount > available => {
            let short = if colony.inventory.get(item) < amount { item } else { Item::CU };
            return Err(OrderError::NotEnough {
                item: short,
                have: colony.inventory.get(short),
                wanted: amount,
            });
        }
        Some(amount) => amount.max(0),
        None => available,
    };

    colony.inventory.take(item, amount);
    colony.inventory.take(Item::CU, amount);
    match item {
        Item::AU => colony.mi_base += amount,
        _ => colony.ma_base += amount,
    }
    colony.refresh_populated();
    Ok(Installed { item, amount })
}

/// Install what an earlier DEVELOP set aside, as far as the colony's stock allows
pub fn auto_install(colony: &mut Colony) -> Vec<Installed> {
    let mut installed = Vec::new();
    for item in [Item::IU, Item::AU] {
        let pending = match item {
            Item::IU => colony.auto_ius,
            _ => colony.auto_aus,
        };
        let amount = pending
            .min(colony.inventory.get(item))
            .min(colony.inventory.get(Item::CU));
        if amount <= 0 {
            continue;
        }
        if let Ok(done) = install(colony, item, Some(amount)) {
            match item {
                Item::IU => colony.auto_ius -= done.amount,
                _ => colony.auto_aus -= done.amount,
            }
            installed.push(done);
        }
    }
    installed
}

/// Unload a transport's colonists at the colony it sits at
///
/// Fires only for a transport carrying CUs at a colony outside the home
/// system that is unpopulated or still below the development ceiling. The
/// ship remembers the colony as its unloading point, and the homeworld as
/// its loading point unless it already had one.
pub fn auto_unload(species: &mut Species, ship: usize) -> Option<Unloaded> {
    let home = species.home;
    let vessel = species.ships.get(ship)?;
    if !vessel.class.is_transport()
        || vessel.inventory.get(Item::CU) <= 0
        || vessel.in_deep_space()
    {
        return None;
    }
    let index = species.colony_at(vessel.coords, vessel.orbit)?;
    let colony = &species.colonies[index];
    if index == PlanetRef::HOME.index()
        || colony.coords == home
        || (colony.is_populated() && colony.economic_base() >= Colony::DEVELOPMENT_CEILING)
    {
        return None;
    }

    let vessel = &mut species.ships[ship];
    let colony = &mut species.colonies[index];
    let mut cargo = Inventory::default();
    for item in [Item::CU, Item::IU, Item::AU] {
        let moved = vessel.inventory.take(item, vessel.inventory.get(item));
        if moved > 0 {
            colony.inventory.add(item, moved);
            cargo.add(item, moved);
        }
    }
    vessel.unloading_point = Some(PlanetRef(index));
    vessel.loading_point.get_or_insert(PlanetRef::HOME);
    Some(Unloaded {
        colony: index,
        cargo,
    })
}

/// Spend economic units at a production center to develop a colony
///
/// Every unit takes one population unit from the center and costs two EUs:
/// a colonist unit plus an IU (or an AU for mining colonies). With a ship,
/// the units are loaded onto it and the ship is routed between the two
/// colonies; otherwise they're stored at the center. Either way the target
/// will install them automatically once they reach it.
pub fn develop(
    species: &mut Species,
    center: usize,
    target: usize,
    amount: i32,
    ship: Option<usize>,
) -> Result<Developed, OrderError> {
    let units = amount / 2;
    if units <= 0 {
        return Err(OrderError::OutOfRange {
            what: "development amount",
            min: 2,
            max: i64::from(i32::MAX),
        });
    }
    let source = species
        .colonies
        .get(center)
        .ok_or(OrderError::NoProductionCenter)?;
    let destination = species
        .colonies
        .get(target)
        .ok_or_else(|| OrderError::UnknownColony(format!("#{target}")))?;
    if source.pop_units < units {
        return Err(OrderError::NoPopulation {
            colony: source.name.clone(),
            needed: units,
            available: source.pop_units,
        });
    }
    let item = if destination.status.contains(ColonyStatus::MINING_COLONY) {
        Item::AU
    } else {
        Item::IU
    };

    if let Some(ship) = ship {
        let vessel = species
            .ships
            .get(ship)
            .ok_or_else(|| OrderError::UnknownShip(format!("#{ship}")))?;
        if !vessel.is_at(source.coords, source.orbit) {
            return Err(OrderError::NotAtColony(vessel.full_name()));
        }
        let weight = units * (Item::CU.carry_weight() + item.carry_weight());
        if vessel.free_capacity() < weight {
            return Err(OrderError::NoCargoSpace(vessel.full_name()));
        }
    }

    species.colonies[center].pop_units -= units;
    let hold = match ship {
        Some(ship) => {
            let vessel = &mut species.ships[ship];
            vessel.loading_point = Some(PlanetRef(center));
            vessel.unloading_point = Some(PlanetRef(target));
            &mut vessel.inventory
        }
        None => &mut species.colonies[center].inventory,
    };
    hold.add(Item::CU, units);
    hold.add(item, units);

    let destination = &mut species.colonies[target];
    match item {
        Item::AU => destination.auto_aus += units,
        _ => destination.auto_ius += units,
    }
    Ok(Developed {
        target,
        units,
        item,
        cost: units * (Item::CU.cost() + item.cost()),
        ship,
    })
}

/// Pick the colony a transport back at its loading point should develop
///
/// The transport's unloading point comes first; once that has reached the
/// ceiling, its sibling colonies in the same system are tried in order. The
/// homeworld is never a development target.
pub fn development_target(species: &Species, primary: PlanetRef) -> Option<usize> {
    let below_ceiling = |index: usize| {
        index != PlanetRef::HOME.index()
            && species
                .colonies
                .get(index)
                .is_some_and(|colony| colony.economic_base() < Colony::DEVELOPMENT_CEILING)
    };
    if below_ceiling(primary.index()) {
        return Some(primary.index());
    }
    let system = species.colonies.get(primary.index())?.coords;
    (1..species.colonies.len())
        .filter(|&index| index != primary.index())
        .find(|&index| species.colonies[index].coords == system && below_ceiling(index))
}

/// Develop a colony for a transport waiting at a production center, spending
/// no more than `budget`
pub fn auto_develop(
    species: &mut Species,
    center: usize,
    ship: usize,
    primary: PlanetRef,
    budget: i32,
) -> Option<Developed> {
    let target = development_target(species, primary)?;
    let population = species.colonies.get(center)?.pop_units;
    let base = species.colonies[target].economic_base();
    let vessel = species.ships.get(ship)?;
    let room = [Item::CU, Item::IU, Item::AU]
        .into_iter()
        .map(|item| vessel.slot_room(item))
        .fold(vessel.free_capacity().max(0), i32::min);

    let amount = develop_amount(population, base).min(budget.max(0)).min(room);
    develop(species, center, target, amount & !1, Some(ship)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Coords,
        ship::{Ship, ShipClass, ShipType},
        tests::species,
    };

    fn transport(coords: Coords, orbit: u8) -> Ship {
        Ship::new(
            "Mule".to_string(),
            ShipClass::TR,
            ShipType::Ftl,
            10,
            coords,
            orbit,
        )
    }

    fn with_colony(base: i32) -> Species {
        let mut species = species(1);
        let mut colony = Colony::new("Colony".to_string(), Coords::new(13, 14, 10), 2, 7);
        colony.ma_base = base;
        colony.refresh_populated();
        species.colonies.push(colony);
        species
    }

    #[test]
    fn transport_unloads_at_an_empty_colony() {
        let mut species = with_colony(0);
        let mut ship = transport(Coords::new(13, 14, 10), 2);
        ship.inventory.add(Item::CU, 50);
        species.ships.push(ship);

        let unloaded = auto_unload(&mut species, 0).expect("unloads");
        assert_eq!(unloaded.colony, 1);
        assert_eq!(unloaded.cargo.get(Item::CU), 50);
        assert_eq!(species.ships[0].inventory.get(Item::CU), 0);
        assert_eq!(species.colonies[1].inventory.get(Item::CU), 50);
        assert_eq!(species.ships[0].unloading_point, Some(PlanetRef(1)));
        assert_eq!(species.ships[0].loading_point, Some(PlanetRef::HOME));
        assert_eq!(PlanetRef::to_legacy(species.ships[0].loading_point), 9999);
    }

    #[test]
    fn no_unload_at_home_or_developed_colonies() {
        let mut species = with_colony(Colony::DEVELOPMENT_CEILING);
        let mut ship = transport(Coords::new(13, 14, 10), 2);
        ship.inventory.add(Item::CU, 50);
        species.ships.push(ship.clone());
        assert_eq!(auto_unload(&mut species, 0), None);

        ship.coords = species.home;
        ship.orbit = 1;
        species.ships.push(ship);
        assert_eq!(auto_unload(&mut species, 1), None);
    }

    #[test]
    fn installs_what_develop_set_aside() {
        let mut species = with_colony(0);
        let colony = &mut species.colonies[1];
        colony.auto_ius = 30;
        colony.inventory.add(Item::CU, 50);
        colony.inventory.add(Item::IU, 20);
        let installed = auto_install(colony);
        assert_eq!(
            installed,
            vec![Installed {
                item: Item::IU,
                amount: 20
            }]
        );
        assert_eq!(colony.ma_base, 20);
        assert_eq!(colony.auto_ius, 10);
        assert_eq!(colony.inventory.get(Item::CU), 30);
        assert!(colony.is_populated());
    }

    #[test]
    fn install_order_needs_colonists() {
        let mut species = with_colony(0);
        let colony = &mut species.colonies[1];
        colony.inventory.add(Item::AU, 10);
        colony.inventory.add(Item::CU, 4);
        assert_eq!(
            install(colony, Item::AU, Some(5)),
            Err(OrderError::NotEnough {
                item: Item::CU,
                have: 4,
                wanted: 5
            })
        );
        assert_eq!(
            install(colony, Item::AU, None),
            Ok(Installed {
                item: Item::AU,
                amount: 4
            })
        );
        assert_eq!(colony.mi_base, 4);
    }

    #[test]
    fn develop_loads_a_transport() {
        let mut species = with_colony(0);
        species.ships.push(transport(species.home, 1));
        let developed = develop(&mut species, 0, 1, 40, Some(0)).expect("develops");
        assert_eq!(developed.units, 20);
        assert_eq!(developed.cost, 40);
        assert_eq!(species.colonies[0].pop_units, 30);
        assert_eq!(species.colonies[1].auto_ius, 20);
        let ship = &species.ships[0];
        assert_eq!(ship.inventory.get(Item::CU), 20);
        assert_eq!(ship.inventory.get(Item::IU), 20);
        assert_eq!(ship.loading_point, Some(PlanetRef::HOME));
        assert_eq!(ship.unloading_point, Some(PlanetRef(1)));
    }

    #[test]
    fn auto_develop_respects_the_ceiling_and_skips_home() {
        let mut species = with_colony(1990);
        let mut sibling = Colony::new("Sibling".to_string(), Coords::new(13, 14, 10), 3, 8);
        sibling.ma_base = 2000;
        species.colonies.push(sibling);
        species.ships.push(transport(species.home, 1));

        let developed = auto_develop(&mut species, 0, 0, PlanetRef(1), 1000).expect("develops");
        assert_eq!(developed.target, 1);
        assert_eq!(developed.units, 10);

        species.colonies[1].ma_base = 2000;
        assert_eq!(development_target(&species, PlanetRef(1)), None);
        assert_eq!(development_target(&species, PlanetRef::HOME), None);

        species.colonies[2].ma_base = 100;
        assert_eq!(development_target(&species, PlanetRef(1)), Some(2));
    }
}
