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

//! Finish phase: the bookkeeping that closes a turn

use std::collections::BTreeSet;

use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    colony::ColonyStatus,
    economy::research_cost,
    location::Locations,
    ship::ShipStatus,
    species::{Species, Tech},
    turn::{Phase, Scope, Turn},
};

pub(super) fn run(turn: &mut Turn) {
    deepen_mines(turn);

    for id in turn.species_ids() {
        turn.with_species(id, Phase::Finish, |species, mut scope| {
            finish_ships(species, &mut scope);
            research(species, &mut scope);
            for colony in &mut species.colonies {
                let hiding = colony.status.contains(ColonyStatus::HIDING);
                colony.status.set(ColonyStatus::HIDDEN, hiding);
            }
        });
    }

    turn.locations = Locations::compute(&turn.galaxy);
    for id in turn.species_ids() {
        let present: Vec<_> = turn.locations.of(id).collect();
        for coords in present {
            if let Some(system) = turn.galaxy.system_mut(coords) {
                system.visited_by.insert(id);
            }
        }
    }
    let meetings: Vec<_> = turn.locations.meetings().collect();
    for (species, other) in meetings {
        if let Some(species) = turn.galaxy.species.get_mut(&species) {
            species.contacts.insert(other);
        }
    }

    turn.galaxy.turn += 1;
    debug!(turn = turn.galaxy.turn, "turn finished");
}

/// Every mined planet gets harder to mine, once however many colonies mine it
fn deepen_mines(turn: &mut Turn) {
    let mined: BTreeSet<usize> = turn
        .galaxy
        .species
        .values()
        .flat_map(|species| species.colonies.iter())
        .filter(|colony| colony.mi_base > 0)
        .map(|colony| colony.planet_index)
        .collect();
    for index in mined {
        if let Some(planet) = turn.galaxy.planets.get_mut(index) {
            planet.mining_difficulty = planet.mining_difficulty.saturating_add(planet.md_increase);
        }
    }
}

/// Complete paid-up ships and age the rest
fn finish_ships(species: &mut Species, scope: &mut Scope<'_>) {
    for ship in &mut species.ships {
        if ship.status == ShipStatus::UnderConstruction {
            if ship.remaining_cost <= 0 {
                ship.remaining_cost = 0;
                ship.status = ShipStatus::InOrbit;
                scope.event(format!("{} has been completed.", ship.full_name()));
            }
        } else {
            ship.age = ship.age.saturating_add(1);
        }
    }
}

/// Turn experience points into levels, then let knowledge pull levels up
fn research(species: &mut Species, scope: &mut Scope<'_>) {
    for tech in Tech::iter() {
        let index = tech.index();
        loop {
            let level = species.tech_levels.get(tech);
            let cost = research_cost(level);
            if species.tech_eps[index] < cost {
                break;
            }
            species.tech_eps[index] -= cost;
            *species.tech_levels.get_mut(tech) += 1;
            scope.event(format!("{tech} rose to level {}.", level + 1));
        }

        let level = species.tech_levels.get(tech);
        let knowledge = species.tech_knowledge.get(tech);
        if knowledge <= level {
            *species.tech_knowledge.get_mut(tech) = level;
            continue;
        }
        let gap = u32::try_from(knowledge - level).unwrap_or(0);
        if scope.rng.roll(100) <= 10 * gap {
            *species.tech_levels.get_mut(tech) += 1;
            scope.event(format!(
                "{tech} rose to level {} through knowledge.",
                level + 1
            ));
        }
    }
}
