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

//! Pre-Departure and Post-Arrival phases: housekeeping, diplomacy and cargo

use tracing::debug;

use crate::{
    SpeciesId,
    auto::{self, Installed},
    celestial::System,
    colony::{Colony, ColonyStatus},
    item::Item,
    order::{Arg, Command, Order, OrderError, Section},
    ship::{DEEP_SPACE_ORBIT, Ship, ShipStatus, TurnAnnotation},
    species::{Relation, Species},
    turn::{
        Phase, ReceivedMessage, Scope, Turn, check_section, find_colony, find_ship, find_species,
    },
};

pub(super) fn pre_departure(turn: &mut Turn) {
    run(turn, Section::PreDeparture, Phase::PreDeparture);
}

pub(super) fn post_arrival(turn: &mut Turn) {
    run(turn, Section::PostArrival, Phase::PostArrival);
}

fn run(turn: &mut Turn, section: Section, phase: Phase) {
    let mut mail = Vec::new();
    for id in turn.species_ids() {
        let orders = turn.orders_for(id, section);
        let sent = turn.with_species(id, phase, |species, mut scope| {
            let mut sent = Vec::new();
            for order in &orders {
                let result = execute(species, &mut scope, section, order, &mut sent);
                scope.outcome(order, result);
            }
            if species.auto_orders {
                scope.auto = true;
            }
            if scope.auto {
                match section {
                    Section::PreDeparture => unload_and_install(species, &mut scope),
                    _ => unload_arrivals(species, &mut scope),
                }
            }
            sent
        });
        mail.extend(sent.into_iter().flatten());
    }

    for (from, to, text) in mail {
        turn.log_mut(to).messages.push(ReceivedMessage { from, text });
    }
}

/// Carry out one order; returns what the player is told
fn execute(
    species: &mut Species,
    scope: &mut Scope<'_>,
    section: Section,
    order: &Order,
    sent: &mut Vec<(SpeciesId, SpeciesId, String)>,
) -> Result<String, OrderError> {
    check_section(order, section)?;
    match order.command {
        Command::Auto => {
            species.auto_orders = true;
            Ok("Automatic orders are on.".to_string())
        }
        Command::Ally | Command::Enemy | Command::Neutral => {
            let name = Order::require(order.species_name(), "species name")?;
            let other = find_species(scope.galaxy, name)?;
            let (relation, word) = match order.command {
                Command::Ally => (Relation::Ally, "an ally"),
                Command::Enemy => (Relation::Enemy, "an enemy"),
                _ => (Relation::Neutral, "neutral"),
            };
            species.set_relation(other, relation);
            Ok(format!("SP {} is now {word}.", scope.species_name(other)))
        }
        Command::Name => name_planet(species, scope, order),
        Command::Disband => {
            let colony = planet_order_target(species, order)?;
            species.colonies[colony].status.insert(ColonyStatus::DISBANDED);
            Ok(format!("PL {} has been disbanded.", species.colonies[colony].name))
        }
        Command::Hide => {
            let colony = planet_order_target(species, order)?;
            species.colonies[colony].status.insert(ColonyStatus::HIDING);
            Ok(format!("PL {} is hiding.", species.colonies[colony].name))
        }
        Command::Install => {
            let item = Order::require(order.item(), "IU or AU")?;
            let name = Order::require(order.planet_name(), "planet name")?;
            let colony = find_colony(species, name)?;
            let requested = order.number().map(clamp_amount);
            let Installed { item, amount } =
                auto::install(&mut species.colonies[colony], item, requested)?;
            Ok(format!(
                "Installed {amount} {item} on PL {}.",
                species.colonies[colony].name
            ))
        }
        Command::Unload => {
            let name = Order::require(order.ship(), "ship name")?;
            let ship = find_ship(species, name)?;
            let vessel = &species.ships[ship];
            let colony = species
                .colony_at(vessel.coords, vessel.orbit)
                .ok_or_else(|| OrderError::NotAtColony(vessel.full_name()))?;
            let cargo = std::mem::take(&mut species.ships[ship].inventory);
            let mut moved = Vec::new();
            for (item, amount) in cargo.iter() {
                species.colonies[colony].inventory.add(item, amount);
                moved.push(format!("{amount} {item}"));
            }
            if moved.is_empty() {
                moved.push("nothing".to_string());
            }
            Ok(format!(
                "{} unloaded {} on PL {}.",
                species.ships[ship].full_name(),
                moved.join(", "),
                species.colonies[colony].name
            ))
        }
        Command::Load => {
            let amount = clamp_amount(Order::require(order.number(), "amount")?);
            let item = Order::require(order.item(), "item")?;
            let name = Order::require(order.ship(), "ship name")?;
            let ship = find_ship(species, name)?;
            let vessel = &species.ships[ship];
            let colony = species
                .colony_at(vessel.coords, vessel.orbit)
                .ok_or_else(|| OrderError::NotAtColony(vessel.full_name()))?;
            move_cargo(species, colony, ship, item, amount, Direction::ToShip)
        }
        Command::Transfer => {
            let amount = clamp_amount(Order::require(order.number(), "amount")?);
            let item = Order::require(order.item(), "item")?;
            let name = Order::require(order.ship(), "ship name")?;
            let planet = Order::require(order.planet_name(), "planet name")?;
            let ship = find_ship(species, name)?;
            let colony = find_colony(species, planet)?;
            let target = &species.colonies[colony];
            if !species.ships[ship].is_at(target.coords, target.orbit) {
                return Err(OrderError::NotAtColony(species.ships[ship].full_name()));
            }
            // whichever of the two is named first gives up the cargo
            let direction = match order
                .args
                .iter()
                .find(|arg| matches!(arg, Arg::Ship(_) | Arg::Planet(_)))
            {
                Some(Arg::Ship(_)) => Direction::ToColony,
                _ => Direction::ToShip,
            };
            move_cargo(species, colony, ship, item, amount, direction)
        }
        Command::Land | Command::Orbit | Command::Deep => reposition(species, scope, order),
        Command::Message | Command::Send => {
            let name = Order::require(order.species_name(), "species name")?;
            let to = find_species(scope.galaxy, name)?;
            let text = order.message().unwrap_or_default().to_string();
            sent.push((scope.id, to, text));
            Ok(format!("Message sent to SP {}.", scope.species_name(to)))
        }
        Command::Scan => {
            let name = Order::require(order.ship(), "ship name")?;
            let ship = find_ship(species, name)?;
            let vessel = &species.ships[ship];
            Ok(scan(scope, vessel.coords, &vessel.full_name()))
        }
        command => Err(OrderError::WrongSection { command, section }),
    }
}

fn clamp_amount(value: i64) -> i32 {
    i32::try_from(value.max(0)).unwrap_or(i32::MAX)
}

/// A colony named by `PL`, which mustn't be the homeworld
fn planet_order_target(species: &Species, order: &Order) -> Result<usize, OrderError> {
    let name = Order::require(order.planet_name(), "planet name")?;
    let colony = find_colony(species, name)?;
    if colony == 0 {
        return Err(OrderError::Homeworld);
    }
    Ok(colony)
}

/// NAME x y z #orbit PL name: claim a planet in a system the species is at
fn name_planet(
    species: &mut Species,
    scope: &mut Scope<'_>,
    order: &Order,
) -> Result<String, OrderError> {
    let (coords, orbit) = match order.destination() {
        Some((coords, Some(orbit))) => (coords, orbit),
        _ => return Err(OrderError::MissingArgument("planet coordinates")),
    };
    let name = Order::require(order.planet_name(), "planet name")?;
    if !scope.locations.contains(coords, scope.id) {
        return Err(OrderError::NoPresence(coords));
    }
    let planet_index = scope
        .galaxy
        .planet_index_at(coords, orbit)
        .ok_or(OrderError::UnknownPlanet { coords, orbit })?;
    if species.colony_at(coords, orbit).is_some() {
        return Err(OrderError::AlreadyColonized { coords, orbit });
    }
    if species.colony_by_name(name).is_some() {
        return Err(OrderError::NameTaken(name.to_string()));
    }
    species
        .colonies
        .push(Colony::new(name.to_string(), coords, orbit, planet_index));
    Ok(format!("Named the planet at {coords} #{orbit} PL {name}."))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    ToShip,
    ToColony,
}

fn move_cargo(
    species: &mut Species,
    colony: usize,
    ship: usize,
    item: Item,
    amount: i32,
    direction: Direction,
) -> Result<String, OrderError> {
    let vessel = &mut species.ships[ship];
    let planet = &mut species.colonies[colony];
    let ship_name = vessel.full_name();
    if direction == Direction::ToShip {
        let weight = amount.checked_mul(item.carry_weight());
        if weight.is_none_or(|weight| vessel.free_capacity() < weight) {
            return Err(OrderError::NoCargoSpace(ship_name));
        }
        if vessel.slot_room(item) < amount {
            return Err(OrderError::OutOfRange {
                what: "ship cargo",
                min: 0,
                max: i64::from(Ship::MAX_CARGO),
            });
        }
    }
    let (from, to) = match direction {
        Direction::ToShip => (&mut planet.inventory, &mut vessel.inventory),
        Direction::ToColony => (&mut vessel.inventory, &mut planet.inventory),
    };
    let have = from.get(item);
    if have < amount {
        return Err(OrderError::NotEnough {
            item,
            have,
            wanted: amount,
        });
    }
    let moved = from.take(item, amount);
    to.add(item, moved);
    debug!(%item, moved, ?direction, "cargo moved");
    Ok(match direction {
        Direction::ToShip => format!("Loaded {moved} {item} from PL {} onto {ship_name}.", planet.name),
        Direction::ToColony => format!("Unloaded {moved} {item} from {ship_name} onto PL {}.", planet.name),
    })
}

/// LAND, ORBIT and DEEP
fn reposition(
    species: &mut Species,
    scope: &mut Scope<'_>,
    order: &Order,
) -> Result<String, OrderError> {
    let name = Order::require(order.ship(), "ship name")?;
    let ship = find_ship(species, name)?;
    let vessel = &mut species.ships[ship];
    if vessel.status == ShipStatus::UnderConstruction {
        return Err(OrderError::CannotJump {
            ship: vessel.full_name(),
            reason: "it is still under construction",
        });
    }
    if vessel.status.must_jump() {
        return Err(OrderError::CannotJump {
            ship: vessel.full_name(),
            reason: "it must withdraw",
        });
    }
    let system = scope.galaxy.system(vessel.coords);
    let planet_exists = |orbit: u8| system.and_then(|s: &System| s.planet_in_orbit(orbit)).is_some();

    match order.command {
        Command::Deep => {
            vessel.orbit = DEEP_SPACE_ORBIT;
            vessel.status = ShipStatus::InDeepSpace;
            Ok(format!("{} moved into deep space.", vessel.full_name()))
        }
        Command::Land => {
            let orbit = match order.number() {
                Some(orbit) => orbit_number(orbit)?,
                None if !vessel.in_deep_space() => vessel.orbit,
                None => return Err(OrderError::MissingArgument("orbit")),
            };
            if !planet_exists(orbit) {
                return Err(OrderError::UnknownPlanet {
                    coords: vessel.coords,
                    orbit,
                });
            }
            vessel.orbit = orbit;
            vessel.status = ShipStatus::OnSurface;
            Ok(format!("{} landed on the planet in orbit {orbit}.", vessel.full_name()))
        }
        _ => {
            let orbit = match order.number() {
                Some(orbit) => orbit_number(orbit)?,
                None if !vessel.in_deep_space() => vessel.orbit,
                None => return Err(OrderError::MissingArgument("orbit")),
            };
            if !planet_exists(orbit) {
                return Err(OrderError::UnknownPlanet {
                    coords: vessel.coords,
                    orbit,
                });
            }
            vessel.orbit = orbit;
            vessel.status = ShipStatus::InOrbit;
            Ok(format!("{} is now orbiting planet {orbit}.", vessel.full_name()))
        }
    }
}

fn orbit_number(value: i64) -> Result<u8, OrderError> {
    u8::try_from(value)
        .ok()
        .filter(|orbit| (1..=9).contains(orbit))
        .ok_or(OrderError::OutOfRange {
            what: "orbit",
            min: 1,
            max: 9,
        })
}

/// What a ship sees around it
fn scan(scope: &Scope<'_>, coords: crate::Coords, ship: &str) -> String {
    let planets = scope
        .galaxy
        .system(coords)
        .map_or(0, |system| system.planets.len());
    let aliens: Vec<String> = scope
        .locations
        .at(coords)
        .filter(|&other| other != scope.id)
        .map(|other| format!("SP {}", scope.species_name(other)))
        .collect();
    let aliens = if aliens.is_empty() {
        "no other species".to_string()
    } else {
        aliens.join(", ")
    };
    format!("{ship} scanned {coords}: {planets} planets, {aliens}.")
}

/// Automatic unloading of every transport, then installation at every colony
fn unload_and_install(species: &mut Species, scope: &mut Scope<'_>) {
    for ship in 0..species.ships.len() {
        if let Some(unloaded) = auto::auto_unload(species, ship) {
            let text = format!(
                "{} automatically unloaded {} CU on PL {}.",
                species.ships[ship].full_name(),
                unloaded.cargo.get(Item::CU),
                species.colonies[unloaded.colony].name
            );
            scope.event(text);
        }
    }
    for colony in &mut species.colonies {
        for Installed { item, amount } in auto::auto_install(colony) {
            scope.event(format!(
                "Automatically installed {amount} {item} on PL {}.",
                colony.name
            ));
        }
    }
}

/// Transports that arrived loaded at their unloading point drop their cargo
fn unload_arrivals(species: &mut Species, scope: &mut Scope<'_>) {
    for ship in 0..species.ships.len() {
        if !matches!(species.ships[ship].annotation, TurnAnnotation::PendingUnload(_)) {
            continue;
        }
        if let Some(unloaded) = auto::auto_unload(species, ship) {
            let text = format!(
                "{} automatically unloaded {} CU on PL {}.",
                species.ships[ship].full_name(),
                unloaded.cargo.get(Item::CU),
                species.colonies[unloaded.colony].name
            );
            scope.event(text);
        }
        species.ships[ship].annotation = TurnAnnotation::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::{
        Coords, Galaxy,
        colony::{Colony, ColonyStatus},
        item::Item,
        order::{OrderError, Reason},
        ship::{Ship, ShipClass, ShipStatus, ShipType},
        tests::{galaxy, id},
        turn::{Phase, Turn, TurnConfig},
    };

    fn turn_through_pre_departure(galaxy: &Galaxy, orders: &[u8]) -> Turn {
        let texts = BTreeMap::from([(id(1), orders.to_vec())]);
        let mut turn = Turn::new(galaxy, &texts, TurnConfig::default()).expect("turn");
        while turn.phase() != Phase::Jumps {
            turn.step().expect("phase runs");
        }
        turn
    }

    fn with_transport(galaxy: &mut Galaxy) {
        let species = galaxy.species.get_mut(&id(1)).expect("species 1");
        species.colonies[0].inventory.add(Item::CU, 100);
        species.ships.push(Ship::new(
            "Mule".to_string(),
            ShipClass::TR,
            ShipType::Ftl,
            4,
            Coords::new(10, 10, 10),
            1,
        ));
    }

    #[test]
    fn load_and_transfer() {
        let mut galaxy = galaxy();
        with_transport(&mut galaxy);
        let turn = turn_through_pre_departure(
            &galaxy,
            b"START PRE-DEPARTURE\nLOAD 30 CU TR4 Mule\nTRANSFER 10 CU TR4 Mule, PL Home1\nLOAD 500 CU TR4 Mule\nEND\n",
        );
        let species = &turn.galaxy().species[&id(1)];
        assert_eq!(species.ships[0].inventory.get(Item::CU), 20);
        assert_eq!(species.colonies[0].inventory.get(Item::CU), 80);
        let log = turn.log(id(1)).expect("log");
        assert_eq!(log.diagnostics.len(), 1);
        assert!(matches!(
            log.diagnostics[0].reason,
            Reason::Order(OrderError::NoCargoSpace(_))
        ));
    }

    #[test]
    fn naming_needs_presence() {
        let galaxy = galaxy();
        let turn = turn_through_pre_departure(
            &galaxy,
            b"START PRE-DEPARTURE\nNAME 10 10 10 #2 PL Second\nNAME 20 10 10 #2 PL Far\nNAME 10 10 10 #1 PL Again\nEND\n",
        );
        let species = &turn.galaxy().species[&id(1)];
        assert_eq!(species.colonies.len(), 2);
        assert_eq!(species.colonies[1].name, "Second");
        assert_eq!(species.colonies[1].planet_index, 1);
        let reasons: Vec<_> = turn
            .log(id(1))
            .expect("log")
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.reason.clone())
            .collect();
        assert_eq!(
            reasons,
            vec![
                Reason::Order(OrderError::NoPresence(Coords::new(20, 10, 10))),
                Reason::Order(OrderError::AlreadyColonized {
                    coords: Coords::new(10, 10, 10),
                    orbit: 1
                }),
            ]
        );
    }

    #[test]
    fn homeworld_cannot_be_disbanded_or_hidden() {
        let galaxy = galaxy();
        let turn = turn_through_pre_departure(
            &galaxy,
            b"START PRE-DEPARTURE\nDISBAND PL Home1\nHIDE PL Home1\nEND\n",
        );
        let log = turn.log(id(1)).expect("log");
        assert_eq!(log.diagnostics.len(), 2);
        assert!(log
            .diagnostics
            .iter()
            .all(|diagnostic| diagnostic.reason == Reason::Order(OrderError::Homeworld)));
    }

    #[test]
    fn messages_reach_the_recipient() {
        let galaxy = galaxy();
        let turn = turn_through_pre_departure(
            &galaxy,
            b"START PRE-DEPARTURE\nSEND SP Species2\nWe come in peace.\nzzz\nALLY SP Species2\nEND\n",
        );
        let log = turn.log(id(2)).expect("recipient log");
        assert_eq!(log.messages.len(), 1);
        assert_eq!(log.messages[0].from, id(1));
        assert_eq!(log.messages[0].text, "We come in peace.");
        assert!(turn.galaxy().species[&id(1)].allies.contains(id(2)));
    }

    #[test]
    fn automatic_unload_and_install() {
        let mut galaxy = galaxy();
        let species = galaxy.species.get_mut(&id(1)).expect("species 1");
        species.auto_orders = true;
        let mut colony = Colony::new("Outpost".to_string(), Coords::new(20, 10, 10), 3, 5);
        colony.auto_ius = 10;
        species.colonies.push(colony);
        let mut ship = Ship::new(
            "Mule".to_string(),
            ShipClass::TR,
            ShipType::Ftl,
            4,
            Coords::new(20, 10, 10),
            3,
        );
        ship.inventory.add(Item::CU, 20);
        ship.inventory.add(Item::IU, 10);
        species.ships.push(ship);

        let turn = turn_through_pre_departure(&galaxy, b"");
        let species = &turn.galaxy().species[&id(1)];
        let outpost = &species.colonies[1];
        assert_eq!(outpost.ma_base, 10);
        assert_eq!(outpost.inventory.get(Item::CU), 10);
        assert_eq!(outpost.auto_ius, 0);
        assert!(outpost.status.contains(ColonyStatus::POPULATED));
        assert!(species.ships[0].inventory.is_empty());
        assert_eq!(species.ships[0].status, ShipStatus::InOrbit);
    }

    #[test]
    fn landing_needs_a_planet() {
        let mut galaxy = galaxy();
        with_transport(&mut galaxy);
        let turn = turn_through_pre_departure(
            &galaxy,
            b"START PRE-DEPARTURE\nLAND TR4 Mule\nORBIT TR4 Mule, 7\nEND\n",
        );
        let species = &turn.galaxy().species[&id(1)];
        assert_eq!(species.ships[0].status, ShipStatus::OnSurface);
        assert_eq!(
            turn.log(id(1)).expect("log").diagnostics[0].reason,
            Reason::Order(OrderError::UnknownPlanet {
                coords: Coords::new(10, 10, 10),
                orbit: 7
            })
        );
    }

    #[test]
    fn enormous_loads_are_refused() {
        let mut galaxy = galaxy();
        with_transport(&mut galaxy);
        let turn = turn_through_pre_departure(
            &galaxy,
            b"START PRE-DEPARTURE\nLOAD 1000000000 GT TR4 Mule\nTRANSFER 2000000000 CU PL Home1, TR4 Mule\nEND\n",
        );
        let species = &turn.galaxy().species[&id(1)];
        assert!(species.ships[0].inventory.is_empty());
        let log = turn.log(id(1)).expect("log");
        assert_eq!(log.diagnostics.len(), 2);
        assert!(log.diagnostics.iter().all(|diagnostic| matches!(
            diagnostic.reason,
            Reason::Order(OrderError::NoCargoSpace(_))
        )));
    }

    #[test]
    fn holds_stop_at_the_save_file_slot() {
        let mut galaxy = galaxy();
        let species = galaxy.species.get_mut(&id(1)).expect("species 1");
        species.colonies[0].inventory.add(Item::CU, 40_000);
        species.ships.push(Ship::new(
            "Ark".to_string(),
            ShipClass::TR,
            ShipType::Ftl,
            300,
            Coords::new(10, 10, 10),
            1,
        ));
        let turn = turn_through_pre_departure(
            &galaxy,
            b"START PRE-DEPARTURE\nLOAD 30000 CU TR300 Ark\nLOAD 5000 CU TR300 Ark\nLOAD 2767 CU TR300 Ark\nEND\n",
        );
        let species = &turn.galaxy().species[&id(1)];
        let ark = &species.ships[0];
        assert!(ark.free_capacity() > 0);
        assert_eq!(ark.inventory.get(Item::CU), Ship::MAX_CARGO);
        assert_eq!(ark.slot_room(Item::CU), 0);
        let log = turn.log(id(1)).expect("log");
        assert_eq!(log.diagnostics.len(), 1);
        assert_eq!(
            log.diagnostics[0].reason,
            Reason::Order(OrderError::OutOfRange {
                what: "ship cargo",
                min: 0,
                max: i64::from(Ship::MAX_CARGO)
            })
        );
    }

    #[test]
    fn withdrawing_ships_cannot_be_repositioned() {
        let mut galaxy = galaxy();
        let species = galaxy.species.get_mut(&id(1)).expect("species 1");
        let mut runner = Ship::new(
            "Runner".to_string(),
            ShipClass::DD,
            ShipType::Ftl,
            4,
            Coords::new(10, 10, 10),
            1,
        );
        runner.status = ShipStatus::JumpedInCombat;
        runner.destination = Some(Coords::new(13, 14, 10));
        species.ships.push(runner);

        let texts = BTreeMap::from([(
            id(1),
            b"START PRE-DEPARTURE\nORBIT DD Runner\nDEEP DD Runner\nEND\n".to_vec(),
        )]);
        let mut turn = Turn::new(&galaxy, &texts, TurnConfig::default()).expect("turn");
        while turn.phase() != Phase::Production {
            turn.step().expect("phase runs");
        }
        let log = turn.log(id(1)).expect("log");
        assert_eq!(log.diagnostics.len(), 2);
        assert!(log.diagnostics.iter().all(|diagnostic| diagnostic.reason
            == Reason::Order(OrderError::CannotJump {
                ship: "DD Runner".to_string(),
                reason: "it must withdraw",
            })));
        let runner = &turn.galaxy().species[&id(1)].ships[0];
        assert_eq!(runner.coords, Coords::new(13, 14, 10));
        assert_eq!(runner.status, ShipStatus::InDeepSpace);
    }
}
