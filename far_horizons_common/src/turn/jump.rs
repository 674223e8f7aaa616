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

//! Jump phase: ship movement

use std::collections::BTreeSet;

use crate::{
    Coords,
    colony::PlanetRef,
    economy::{format_chance, mishap_chance},
    item::Item,
    order::{Command, Order, OrderError, Section},
    ship::{Ship, ShipStatus, TurnAnnotation},
    species::{Species, Tech},
    turn::{Phase, Scope, Turn, check_section, find_colony, find_ship},
};

/// Notice heading the ships moved without orders
pub const FORCED_JUMP_NOTICE: &str = "Withdrawals and forced jumps during combat";

pub(super) fn run(turn: &mut Turn) {
    let mut visits = Vec::new();

    for id in turn.species_ids() {
        if let Some(species) = turn.galaxy.species.get_mut(&id) {
            for ship in &mut species.ships {
                ship.just_jumped = false;
            }
        }
        let orders = turn.orders_for(id, Section::Jumps);
        let forced = turn
            .galaxy
            .species(id)
            .is_some_and(|species| species.ships.iter().any(|ship| ship.status.must_jump()));
        if orders.is_empty() && !forced {
            continue;
        }
        turn.with_species(id, Phase::Jumps, |species, mut scope| {
            for order in &orders {
                let result = jump(species, &mut scope, order).map(|(ship, text)| {
                    visits.push((id, species.ships[ship].coords));
                    text
                });
                scope.outcome(order, result);
            }
        });
    }

    for id in turn.species_ids() {
        turn.with_species(id, Phase::Jumps, |species, mut scope| {
            let mut noticed = false;
            for ship in 0..species.ships.len() {
                let vessel = &species.ships[ship];
                if !vessel.status.must_jump() || vessel.just_jumped {
                    continue;
                }
                if !noticed {
                    scope.event(format!("{FORCED_JUMP_NOTICE}:"));
                    noticed = true;
                }
                let destination = vessel.destination.unwrap_or(vessel.coords);
                let text = format!("    {}", move_ship(species, ship, destination, None));
                visits.push((id, destination));
                scope.event(text);
            }
        });
    }

    for (id, coords) in visits {
        if let Some(system) = turn.galaxy.system_mut(coords) {
            system.visited_by.insert(id);
        }
    }
}

/// Carry out one movement order; returns the ship that moved and the line
/// for the report
fn jump(
    species: &mut Species,
    scope: &mut Scope<'_>,
    order: &Order,
) -> Result<(usize, String), OrderError> {
    check_section(order, Section::Jumps)?;
    let name = Order::require(order.ship(), "ship name")?;
    let ship = find_ship(species, name)?;
    let vessel = &species.ships[ship];
    if vessel.just_jumped {
        return Err(OrderError::AlreadyJumped(vessel.full_name()));
    }
    if vessel.status == ShipStatus::UnderConstruction {
        return Err(cannot_jump(vessel, "it is still under construction"));
    }
    if vessel.class.is_starbase() {
        return Err(cannot_jump(vessel, "starbases cannot move"));
    }

    match order.command {
        Command::Jump => {
            if !vessel.can_jump() {
                return Err(cannot_jump(vessel, "it has no jump drive"));
            }
            let (coords, orbit) = target(species, order)?;
            check_orbit(scope, coords, orbit)?;
            Ok((ship, move_ship(species, ship, coords, orbit)))
        }
        Command::Move => {
            let (coords, orbit) = Order::require(order.destination(), "destination")?;
            if !vessel.coords.adjacent(coords) {
                return Err(OrderError::TooFar(vessel.full_name()));
            }
            check_orbit(scope, coords, orbit)?;
            Ok((ship, move_ship(species, ship, coords, orbit)))
        }
        Command::PJump => {
            let portal = order
                .ships()
                .nth(1)
                .ok_or(OrderError::MissingArgument("jump portal ship"))?;
            let portal = find_ship(species, portal)?;
            let gate = &species.ships[portal];
            if portal == ship
                || gate.coords != vessel.coords
                || gate.inventory.get(Item::GW) <= 0
                || gate.status == ShipStatus::UnderConstruction
            {
                return Err(OrderError::NoJumpPortal(gate.full_name()));
            }
            let (coords, orbit) = target(species, order)?;
            check_orbit(scope, coords, orbit)?;
            Ok((ship, move_ship(species, ship, coords, orbit)))
        }
        Command::Visited => {
            if !vessel.can_jump() {
                return Err(cannot_jump(vessel, "it has no jump drive"));
            }
            let coords = nearest_unvisited(scope, vessel.coords)?;
            Ok((ship, move_ship(species, ship, coords, None)))
        }
        Command::Wormhole => {
            let exit = scope
                .galaxy
                .wormhole_exit(vessel.coords)
                .ok_or(OrderError::NoWormhole(vessel.coords))?;
            let orbit = match order.number() {
                Some(orbit) => Some(u8::try_from(orbit).map_err(|_| OrderError::OutOfRange {
                    what: "orbit",
                    min: 1,
                    max: 9,
                })?),
                None => None,
            };
            check_orbit(scope, exit, orbit)?;
            let text = move_ship(species, ship, exit, orbit);
            species.ships[ship].arrived_via_wormhole = true;
            Ok((ship, text))
        }
        command => Err(OrderError::WrongSection {
            command,
            section: Section::Jumps,
        }),
    }
}

fn cannot_jump(ship: &Ship, reason: &'static str) -> OrderError {
    OrderError::CannotJump {
        ship: ship.full_name(),
        reason,
    }
}

/// Coordinates, or one of the species' own colonies by name
fn target(species: &Species, order: &Order) -> Result<(Coords, Option<u8>), OrderError> {
    if let Some(destination) = order.destination() {
        return Ok(destination);
    }
    let name = Order::require(order.planet_name(), "destination")?;
    let colony = &species.colonies[find_colony(species, name)?];
    Ok((colony.coords, Some(colony.orbit)))
}

fn check_orbit(scope: &Scope<'_>, coords: Coords, orbit: Option<u8>) -> Result<(), OrderError> {
    match orbit {
        Some(orbit) if scope.galaxy.planet_index_at(coords, orbit).is_none() => {
            Err(OrderError::UnknownPlanet { coords, orbit })
        }
        _ => Ok(()),
    }
}

/// The closest system the species hasn't been to, ties broken by coordinates
fn nearest_unvisited(scope: &Scope<'_>, from: Coords) -> Result<Coords, OrderError> {
    let visited: BTreeSet<Coords> = scope.locations.of(scope.id).collect();
    scope
        .galaxy
        .systems
        .iter()
        .filter(|system| !system.visited(scope.id) && !visited.contains(&system.coords))
        .map(|system| (from.distance_squared(system.coords), system.coords))
        .min()
        .map(|(_, coords)| coords)
        .ok_or(OrderError::NothingUnvisited)
}

/// Move a ship and note what its owner will do with it on arrival
///
/// Returns a line for the report naming the destination and the mishap
/// chance, which is only ever informative.
fn move_ship(species: &mut Species, ship: usize, coords: Coords, orbit: Option<u8>) -> String {
    let gv = species.tech_levels.get(Tech::GV);
    let vessel = &mut species.ships[ship];
    let chance = mishap_chance(gv, vessel.coords.distance_squared(coords), vessel.age);
    vessel.arrive(coords, orbit);
    vessel.arrived_via_wormhole = false;
    annotate(species, ship);

    let vessel = &species.ships[ship];
    let place = if vessel.in_deep_space() {
        "is in deep space".to_string()
    } else {
        format!("is orbiting planet {}", vessel.orbit)
    };
    format!(
        "{} jumped to {} and {place} (mishap chance {}).",
        vessel.full_name(),
        vessel.coords,
        format_chance(chance)
    )
}

/// Set up the automatic orders a transport's arrival calls for
///
/// An empty transport back at its loading point will be loaded for its
/// unloading point; a loaded one at its unloading point will unload there.
fn annotate(species: &mut Species, ship: usize) {
    let vessel = &species.ships[ship];
    let (Some(loading), Some(unloading)) = (vessel.loading_point, vessel.unloading_point) else {
        return;
    };
    if !vessel.class.is_transport() {
        return;
    }
    let at = |point: PlanetRef| {
        species
            .colonies
            .get(point.index())
            .is_some_and(|colony| vessel.is_at(colony.coords, colony.orbit))
    };
    let annotation = if vessel.inventory.is_empty() && at(loading) {
        TurnAnnotation::PendingDevelop(unloading)
    } else if !vessel.inventory.is_empty() && at(unloading) {
        TurnAnnotation::PendingUnload(unloading)
    } else {
        return;
    };
    species.ships[ship].annotation = annotation;
}
