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

//! Production phase: budgets, building, research and development

use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    auto,
    colony::{Colony, PlanetRef},
    economy::{colony_yield, fleet_maintenance},
    item::Item,
    order::{Command, Order, OrderError, Section, ShipName},
    ship::{Ship, ShipClass, ShipStatus, ShipType, TurnAnnotation},
    species::{Species, Tech},
    turn::{Phase, Scope, Turn, check_section, find_colony, find_ship, find_species},
};

/// Cost of an ESTIMATE order
const ESTIMATE_COST: i32 = 25;

pub(super) fn run(turn: &mut Turn) {
    for id in turn.species_ids() {
        let orders = turn.orders_for(id, Section::Production);
        turn.with_species(id, Phase::Production, |species, mut scope| {
            produce(species, &mut scope, &orders);
        });
    }
}

fn produce(species: &mut Species, scope: &mut Scope<'_>, orders: &[Order]) {
    let mut budgets = budgets(species, scope);

    for order in orders {
        if order.command != Command::Production {
            let error = match check_section(order, Section::Production) {
                Err(error) => error,
                Ok(()) => OrderError::NoProductionCenter,
            };
            scope.log.reject(order, error);
            continue;
        }
        let center = match open_center(species, order) {
            Ok(center) => center,
            Err(error) => {
                scope.log.reject(order, error);
                for sub_order in &order.sub_orders {
                    scope.log.reject(sub_order, OrderError::NoProductionCenter);
                }
                continue;
            }
        };
        scope.event(format!(
            "Production at PL {}: {} available.",
            species.colonies[center].name, budgets[center]
        ));
        for sub_order in &order.sub_orders {
            let result = execute(species, scope, center, &mut budgets[center], sub_order);
            scope.outcome(sub_order, result);
        }
    }

    if scope.auto || species.auto_orders {
        develop_for_waiting_transports(species, scope, &mut budgets);
    }

    let unspent: i32 = budgets.iter().sum();
    species.econ_units += unspent;
    debug!(species = %scope.id, unspent, "production banked");
    if unspent > 0 {
        scope.event(format!("{unspent} economic units were banked."));
    }
}

/// What every colony can spend this turn
///
/// A colony turns raw material, freshly mined and in stock, into economic
/// units up to its manufacturing capacity; raw material it can't use stays
/// in stock. Fleet maintenance comes off the top, and the homeworld gets
/// last turn's bank.
fn budgets(species: &mut Species, scope: &mut Scope<'_>) -> Vec<i32> {
    let bank = std::mem::take(&mut species.econ_units);
    let mut maintenance = 0;
    let mut budgets = Vec::with_capacity(species.colonies.len());
    for index in 0..species.colonies.len() {
        let colony = &species.colonies[index];
        if !colony.is_producing() {
            budgets.push(0);
            continue;
        }
        let output = colony_yield(species, &scope.galaxy.planets, colony);
        let raw_material = output.raw_material + colony.inventory.get(Item::RM);
        let produced = raw_material.min(output.capacity).max(0);
        let fee = fleet_maintenance(produced, species.fleet_percent_cost);
        maintenance += fee;
        species.colonies[index]
            .inventory
            .set(Item::RM, raw_material - produced);
        budgets.push(produced - fee);
    }
    if let Some(home) = budgets.first_mut() {
        *home += bank;
    }
    species.fleet_cost = maintenance;
    if maintenance > 0 {
        scope.event(format!("Fleet maintenance cost {maintenance} economic units."));
    }
    budgets
}

fn open_center(species: &Species, order: &Order) -> Result<usize, OrderError> {
    let name = Order::require(order.planet_name(), "planet name")?;
    let center = find_colony(species, name)?;
    if !species.colonies[center].is_producing() {
        return Err(OrderError::NotProducing(species.colonies[center].name.clone()));
    }
    Ok(center)
}

fn spend(budget: &mut i32, cost: i32) -> Result<(), OrderError> {
    if cost > *budget {
        return Err(OrderError::InsufficientFunds {
            needed: cost,
            available: *budget,
        });
    }
    *budget -= cost;
    Ok(())
}

fn amount(order: &Order, what: &'static str) -> Result<i32, OrderError> {
    let value = Order::require(order.number(), what)?;
    i32::try_from(value)
        .ok()
        .filter(|&value| value > 0)
        .ok_or(OrderError::OutOfRange {
            what,
            min: 1,
            max: i64::from(i32::MAX),
        })
}

fn execute(
    species: &mut Species,
    scope: &mut Scope<'_>,
    center: usize,
    budget: &mut i32,
    order: &Order,
) -> Result<String, OrderError> {
    check_section(order, Section::Production)?;
    match order.command {
        Command::Build => match order.ship() {
            Some(name) => build_ship(species, center, budget, name),
            None => build_items(species, center, budget, order),
        },
        Command::Develop => {
            let amount = amount(order, "development amount")?;
            let target = match order.planet_name() {
                Some(name) => find_colony(species, name)?,
                None => center,
            };
            if target == PlanetRef::HOME.index() {
                return Err(OrderError::Homeworld);
            }
            let ship = order.ship().map(|name| find_ship(species, name)).transpose()?;
            let cost = amount & !1;
            if cost > *budget {
                return Err(OrderError::InsufficientFunds {
                    needed: cost,
                    available: *budget,
                });
            }
            let developed = auto::develop(species, center, target, amount, ship)?;
            *budget -= developed.cost;
            Ok(format!(
                "Developed {} CU and {} {} for PL {}.",
                developed.units,
                developed.units,
                developed.item,
                species.colonies[target].name
            ))
        }
        Command::Recycle => {
            let quantity = amount(order, "amount")?;
            let item = Order::require(order.item(), "item")?;
            let colony = &mut species.colonies[center];
            let have = colony.inventory.get(item);
            if have < quantity {
                return Err(OrderError::NotEnough {
                    item,
                    have,
                    wanted: quantity,
                });
            }
            colony.inventory.take(item, quantity);
            let refund = quantity * item.cost() / 2;
            *budget += refund;
            Ok(format!("Recycled {quantity} {item} for {refund} economic units."))
        }
        Command::Research => {
            let points = amount(order, "research amount")?;
            let tech = Order::require(order.tech(), "tech")?;
            spend(budget, points)?;
            species.tech_eps[tech.index()] += points;
            Ok(format!("Spent {points} on {tech} research."))
        }
        Command::Shipyard => {
            let cost = 10 * i32::from(species.tech_levels.get(Tech::MA));
            spend(budget, cost)?;
            let colony = &mut species.colonies[center];
            colony.shipyards += 1;
            Ok(format!(
                "PL {} now has {} shipyards.",
                colony.name, colony.shipyards
            ))
        }
        Command::Estimate => {
            let name = Order::require(order.species_name(), "species name")?;
            let other = find_species(scope.galaxy, name)?;
            spend(budget, ESTIMATE_COST)?;
            let levels = scope
                .galaxy
                .species(other)
                .map(|alien| {
                    Tech::iter()
                        .map(|tech| format!("{tech} {}", alien.tech_levels.get(tech)))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            Ok(format!(
                "Estimate of SP {}: {levels}.",
                scope.species_name(other)
            ))
        }
        Command::Upgrade => {
            let name = Order::require(order.ship(), "ship name")?;
            let ship = find_ship(species, name)?;
            let colony = &species.colonies[center];
            let vessel = &species.ships[ship];
            if !vessel.is_at(colony.coords, colony.orbit) {
                return Err(OrderError::NotAtColony(vessel.full_name()));
            }
            if vessel.status == ShipStatus::UnderConstruction {
                return Err(OrderError::CannotJump {
                    ship: vessel.full_name(),
                    reason: "it is still under construction",
                });
            }
            let cost = vessel.class.build_cost(vessel.tonnage, vessel.ship_type)
                * i32::from(vessel.age)
                / 40;
            spend(budget, cost)?;
            let vessel = &mut species.ships[ship];
            vessel.age = 0;
            Ok(format!("{} upgraded for {cost}.", vessel.full_name()))
        }
        Command::Production => Err(OrderError::NoProductionCenter),
        command => Err(OrderError::WrongSection {
            command,
            section: Section::Production,
        }),
    }
}

fn build_items(
    species: &mut Species,
    center: usize,
    budget: &mut i32,
    order: &Order,
) -> Result<String, OrderError> {
    let quantity = amount(order, "amount")?;
    let item = Order::require(order.item(), "item or ship")?;
    if let Some((tech, needed)) = item.required_tech() {
        let have = species.tech_levels.get(tech);
        if have < needed {
            return Err(OrderError::TechTooLow { tech, needed, have });
        }
    }
    let colony = &species.colonies[center];
    if item == Item::CU && colony.pop_units < quantity {
        return Err(OrderError::NoPopulation {
            colony: colony.name.clone(),
            needed: quantity,
            available: colony.pop_units,
        });
    }
    spend(budget, quantity.saturating_mul(item.cost()))?;
    let colony = &mut species.colonies[center];
    if item == Item::CU {
        colony.pop_units -= quantity;
    }
    colony.inventory.add(item, quantity);
    Ok(format!("Built {quantity} {item} on PL {}.", colony.name))
}

/// Lay down a new ship, or pay towards one already under construction
fn build_ship(
    species: &mut Species,
    center: usize,
    budget: &mut i32,
    name: &ShipName,
) -> Result<String, OrderError> {
    if let Some(existing) = species.ship_by_name(&name.name) {
        let vessel = &mut species.ships[existing];
        if vessel.status != ShipStatus::UnderConstruction || vessel.class != name.class {
            return Err(OrderError::NameTaken(name.name.clone()));
        }
        let paid = vessel.remaining_cost.min(affordable(*budget));
        *budget -= i32::from(paid);
        vessel.remaining_cost -= paid;
        return Ok(format!(
            "Paid {paid} towards {}; {} still owed.",
            vessel.full_name(),
            vessel.remaining_cost
        ));
    }

    let tonnage = match (name.class.fixed_tonnage(), name.tonnage) {
        (Some(tonnage), _) => tonnage,
        (None, Some(tonnage)) if tonnage > 0 => tonnage,
        (None, _) => return Err(OrderError::MissingArgument("tonnage")),
    };
    let ship_type = if name.class == ShipClass::BA {
        ShipType::Starbase
    } else if name.sublight {
        ShipType::SubLight
    } else {
        ShipType::Ftl
    };
    let colony = &species.colonies[center];
    if ship_type != ShipType::Starbase && colony.shipyards <= 0 {
        return Err(OrderError::NoShipyard(colony.name.clone()));
    }
    // the amount owed is stored in a 16-bit field
    let Ok(cost) = i16::try_from(name.class.build_cost(tonnage, ship_type)) else {
        return Err(OrderError::OutOfRange {
            what: "ship cost",
            min: 1,
            max: i64::from(i16::MAX),
        });
    };
    if *budget <= 0 {
        return Err(OrderError::InsufficientFunds {
            needed: i32::from(cost),
            available: *budget,
        });
    }
    let paid = cost.min(affordable(*budget));
    *budget -= i32::from(paid);

    let mut ship = Ship::new(
        name.name.clone(),
        name.class,
        ship_type,
        tonnage,
        colony.coords,
        colony.orbit,
    );
    ship.status = ShipStatus::UnderConstruction;
    ship.remaining_cost = cost - paid;
    let text = if ship.remaining_cost > 0 {
        format!(
            "Started building {} for {cost}; {} still owed.",
            ship.full_name(),
            ship.remaining_cost
        )
    } else {
        format!("Built {} for {cost}.", ship.full_name())
    };
    species.ships.push(ship);
    Ok(text)
}

/// The most of a budget that can go towards a ship's cost
fn affordable(budget: i32) -> i16 {
    i16::try_from(budget.max(0)).unwrap_or(i16::MAX)
}

/// Load transports waiting at their loading point for the colony they serve
fn develop_for_waiting_transports(
    species: &mut Species,
    scope: &mut Scope<'_>,
    budgets: &mut [i32],
) {
    for ship in 0..species.ships.len() {
        let TurnAnnotation::PendingDevelop(target) = species.ships[ship].annotation else {
            continue;
        };
        species.ships[ship].annotation = TurnAnnotation::Idle;
        let vessel = &species.ships[ship];
        let Some(center) = species
            .colonies
            .iter()
            .position(|colony: &Colony| vessel.is_at(colony.coords, colony.orbit) && colony.is_producing())
        else {
            continue;
        };
        if let Some(developed) = auto::auto_develop(species, center, ship, target, budgets[center]) {
            budgets[center] -= developed.cost;
            let text = format!(
                "{} was loaded with {} CU and {} {} for PL {}.",
                species.ships[ship].full_name(),
                developed.units,
                developed.units,
                developed.item,
                species.colonies[developed.target].name
            );
            scope.event(text);
        }
    }
}
