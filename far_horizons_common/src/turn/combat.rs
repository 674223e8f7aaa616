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

//! Combat and Strike phases
//!
//! Battles bring the species involved into contact and give their ships a
//! chance to withdraw to a haven. Weapons aren't resolved.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::{
    Coords, SpeciesId,
    colony::ColonyStatus,
    location::Locations,
    order::{Command, Order, OrderError, Section},
    ship::ShipStatus,
    species::{Relation, Species},
    turn::{Phase, Scope, Turn, check_section, find_colony, find_ship, find_species},
};

/// What a species declared for the phase
#[derive(Debug, Default)]
struct Declaration {
    battles: Vec<Coords>,
    targets: BTreeSet<SpeciesId>,
    /// Withdrawal percentages for transports and for everything else
    withdraw: (u32, u32),
    haven: Option<Coords>,
    hidden_ships: BTreeSet<usize>,
}

pub(super) fn run(turn: &mut Turn, section: Section, phase: Phase) {
    turn.locations = Locations::compute(&turn.galaxy);

    let mut declarations = BTreeMap::new();
    for id in turn.species_ids() {
        let orders = turn.orders_for(id, section);
        if orders.is_empty() {
            continue;
        }
        let declaration = turn.with_species(id, phase, |species, mut scope| {
            let mut declaration = Declaration::default();
            for order in &orders {
                let result = declare(species, &mut scope, &mut declaration, section, order);
                scope.outcome(order, result);
            }
            declaration
        });
        if let Some(declaration) = declaration {
            declarations.insert(id, declaration);
        }
    }

    let battles = find_battles(turn, &declarations, phase);
    withdraw(turn, &declarations, &battles, phase);
}

fn declare(
    species: &mut Species,
    scope: &mut Scope<'_>,
    declaration: &mut Declaration,
    section: Section,
    order: &Order,
) -> Result<String, OrderError> {
    check_section(order, section)?;
    match order.command {
        Command::Battle => {
            let (coords, _) = Order::require(order.destination(), "battle location")?;
            declaration.battles.push(coords);
            Ok(format!("Battle declared at {coords}."))
        }
        Command::Attack => {
            let name = Order::require(order.species_name(), "species name")?;
            let target = find_species(scope.galaxy, name)?;
            species.set_relation(target, Relation::Enemy);
            declaration.targets.insert(target);
            Ok(format!("Attacking SP {}.", scope.species_name(target)))
        }
        Command::Withdraw => {
            let mut numbers = order.numbers();
            let transports = Order::require(numbers.next(), "withdrawal percentage")?;
            let warships = numbers.next().unwrap_or(transports);
            let check = |value: i64| {
                u32::try_from(value)
                    .ok()
                    .filter(|&value| value <= 100)
                    .ok_or(OrderError::OutOfRange {
                        what: "withdrawal percentage",
                        min: 0,
                        max: 100,
                    })
            };
            declaration.withdraw = (check(transports)?, check(warships)?);
            Ok(format!(
                "Transports withdraw at {}%, warships at {}%.",
                declaration.withdraw.0, declaration.withdraw.1
            ))
        }
        Command::Haven => {
            let (coords, _) = Order::require(order.destination(), "haven location")?;
            declaration.haven = Some(coords);
            Ok(format!("Haven set to {coords}."))
        }
        Command::Hide => {
            if let Some(name) = order.ship() {
                let ship = find_ship(species, name)?;
                declaration.hidden_ships.insert(ship);
                Ok(format!("{} will stay out of the fighting.", species.ships[ship].full_name()))
            } else {
                let name = Order::require(order.planet_name(), "ship or planet name")?;
                let colony = find_colony(species, name)?;
                if colony == 0 {
                    return Err(OrderError::Homeworld);
                }
                species.colonies[colony].status.insert(ColonyStatus::HIDING);
                Ok(format!("PL {} is hiding.", species.colonies[colony].name))
            }
        }
        Command::Engage => {
            let option = Order::require(order.number(), "engagement option")?;
            if !(0..=7).contains(&option) {
                return Err(OrderError::OutOfRange {
                    what: "engagement option",
                    min: 0,
                    max: 7,
                });
            }
            Ok(format!("Engagement option {option}."))
        }
        Command::Summary => Ok("Only a summary of combat will be reported.".to_string()),
        command => Err(OrderError::WrongSection { command, section }),
    }
}

/// Battle sites and everyone present at each
fn find_battles(
    turn: &mut Turn,
    declarations: &BTreeMap<SpeciesId, Declaration>,
    phase: Phase,
) -> BTreeMap<Coords, BTreeSet<SpeciesId>> {
    let mut battles: BTreeMap<Coords, BTreeSet<SpeciesId>> = BTreeMap::new();
    for (&id, declaration) in declarations {
        let Some(enemies) = turn.galaxy.species(id).map(|species| species.enemies.clone()) else {
            continue;
        };
        for &coords in &declaration.battles {
            let has_opponent = turn.locations.at(coords).any(|other| {
                other != id && (declaration.targets.contains(&other) || enemies.contains(other))
            });
            if !turn.locations.contains(coords, id) || !has_opponent {
                turn.log_mut(id)
                    .event(phase, format!("There was no one to fight at {coords}."));
                continue;
            }
            battles
                .entry(coords)
                .or_default()
                .extend(turn.locations.at(coords));
        }
    }

    for (&coords, present) in &battles {
        debug!(%coords, species = present.len(), "battle");
        let names: Vec<String> = present
            .iter()
            .filter_map(|&id| turn.galaxy.species(id).map(|species| format!("SP {}", species.name)))
            .collect();
        for &id in present {
            if let Some(species) = turn.galaxy.species.get_mut(&id) {
                for &other in present.iter().filter(|&&other| other != id) {
                    species.contacts.insert(other);
                }
            }
            turn.log_mut(id).event(
                phase,
                format!("Battle at {coords} involving {}.", names.join(", ")),
            );
        }
    }
    battles
}

/// Roll for every ship at a battle whose owner named a haven
fn withdraw(
    turn: &mut Turn,
    declarations: &BTreeMap<SpeciesId, Declaration>,
    battles: &BTreeMap<Coords, BTreeSet<SpeciesId>>,
    phase: Phase,
) {
    for (&id, declaration) in declarations {
        let Some(haven) = declaration.haven else {
            continue;
        };
        let (transports, warships) = declaration.withdraw;
        turn.with_species(id, phase, |species, mut scope| {
            for (index, ship) in species.ships.iter_mut().enumerate() {
                let at_battle = battles
                    .get(&ship.coords)
                    .is_some_and(|present| present.contains(&id));
                if !at_battle
                    || ship.class.is_starbase()
                    || ship.status == ShipStatus::UnderConstruction
                    || ship.status.must_jump()
                    || declaration.hidden_ships.contains(&index)
                {
                    continue;
                }
                let percent = if ship.class.is_transport() {
                    transports
                } else {
                    warships
                };
                if scope.rng.chance(percent) {
                    ship.status = ShipStatus::JumpedInCombat;
                    ship.destination = Some(haven);
                    let text = format!(
                        "{} withdrew from the battle at {} towards {haven}.",
                        ship.full_name(),
                        ship.coords
                    );
                    scope.event(text);
                }
            }
        });
    }
}
