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

//! Economic formulas
//!
//! Integer arithmetic throughout; the truncation points are part of the game
//! rules and match the results players compute by hand.

use serde::{Deserialize, Serialize};

use crate::{
    celestial::{Gas, Planet},
    colony::Colony,
    species::{Species, Tech},
};

/// Mishap chance that means "certain", in hundredths of a percent
pub const CERTAIN_MISHAP: i64 = 10_000;

/// What a colony produces in a turn
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColonyYield {
    /// Life support points the colony needs
    pub ls_needed: i32,
    /// Production lost to life support shortfall, percent
    pub ls_penalty: i32,
    /// Raw material units mined
    pub raw_material: i32,
    /// Production capacity
    pub capacity: i32,
}

/// Raw material units mined from a mining base
pub fn raw_material_units(mi_level: i16, mi_base: i32, mining_difficulty: i16) -> i32 {
    if mining_difficulty <= 0 {
        return 0;
    }
    10 * i32::from(mi_level) * mi_base / i32::from(mining_difficulty)
}

/// Production capacity of a manufacturing base
pub fn production_capacity(ma_level: i16, ma_base: i32) -> i32 {
    i32::from(ma_level) * ma_base / 10
}

/// Life support the species needs on a planet, compared to its homeworld
pub fn life_support_needed(species: &Species, home: &Planet, planet: &Planet) -> i32 {
    let temperature = (i32::from(planet.temperature_class) - i32::from(home.temperature_class)).abs();
    let pressure = (i32::from(planet.pressure_class) - i32::from(home.pressure_class)).abs();
    let mut needed = 3 * temperature + 3 * pressure + 3;

    if species.required_gas != Gas::None {
        let percent = planet.gas_percent(species.required_gas);
        if percent > 0
            && (species.required_gas_min..=species.required_gas_max).contains(&percent)
        {
            needed -= 3;
        }
    }
    let poisons = planet
        .atmosphere
        .iter()
        .filter(|(gas, percent)| *percent > 0 && species.poison_gases.contains(gas))
        .count();
    needed + 3 * poisons as i32
}

/// Percentage of production lost to a life support shortfall
pub fn life_support_penalty(ls_needed: i32, ls_level: i16) -> i32 {
    if ls_needed <= 0 {
        0
    } else if ls_level <= 0 {
        100
    } else {
        (100 * ls_needed / i32::from(ls_level)).min(100)
    }
}

/// Reduce a value by a percentage penalty
pub fn apply_penalty(value: i32, penalty: i32) -> i32 {
    value - penalty * value / 100
}

/// Scale a value by an efficiency percentage, rounding halves up
pub fn scale_by_efficiency(value: i32, efficiency: i16) -> i32 {
    (i32::from(efficiency) * value + 50) / 100
}

/// What a colony produces this turn
///
/// The homeworld never suffers a life support penalty.
pub fn colony_yield(species: &Species, planets: &[Planet], colony: &Colony) -> ColonyYield {
    let Some(planet) = planets.get(colony.planet_index) else {
        return ColonyYield::default();
    };
    let home = species
        .homeworld()
        .and_then(|home| planets.get(home.planet_index))
        .unwrap_or(planet);

    let ls_needed = if colony.is_home() {
        0
    } else {
        life_support_needed(species, home, planet)
    };
    let ls_penalty = life_support_penalty(ls_needed, species.tech_levels.get(Tech::LS));

    let raw_material = raw_material_units(
        species.tech_levels.get(Tech::MI),
        colony.mi_base,
        planet.mining_difficulty,
    );
    let capacity = production_capacity(species.tech_levels.get(Tech::MA), colony.ma_base);

    ColonyYield {
        ls_needed,
        ls_penalty,
        raw_material: scale_by_efficiency(
            apply_penalty(raw_material, ls_penalty),
            planet.econ_efficiency,
        ),
        capacity: scale_by_efficiency(apply_penalty(capacity, ls_penalty), planet.econ_efficiency),
    }
}

/// Chance of a jump going wrong, in hundredths of a percent
///
/// Grows with the square of the distance and falls with gravitics; old
/// ships are less reliable. Purely informative.
pub fn mishap_chance(gv_level: i16, distance_squared: i64, age: i16) -> i64 {
    let mut chance = if gv_level <= 0 {
        CERTAIN_MISHAP
    } else {
        100 * distance_squared / i64::from(gv_level)
    };
    if age > 0 && chance < CERTAIN_MISHAP {
        chance += (CERTAIN_MISHAP - chance) * i64::from(age) / 50;
    }
    chance.min(CERTAIN_MISHAP)
}

/// Format a mishap chance as a percentage with two decimals
pub fn format_chance(chance: i64) -> String {
    format!("{}.{:02}%", chance / 100, chance % 100)
}

/// Economic units to spend developing a colony
///
/// Each unit of base costs two EUs (a colonist unit and an industrial unit)
/// and one unit of population, and development stops at
/// [`Colony::DEVELOPMENT_CEILING`].
pub fn develop_amount(population: i32, base: i32) -> i32 {
    let room = Colony::DEVELOPMENT_CEILING - base;
    if room <= 0 || population <= 0 {
        return 0;
    }
    2 * population.min(room)
}

/// Research points needed to raise a tech from `level` to the next
pub fn research_cost(level: i16) -> i32 {
    let level = i32::from(level);
    (level * level).max(1)
}

/// Fleet maintenance for a production budget
///
/// `percent_cost` is in hundredths of a percent.
pub fn fleet_maintenance(budget: i32, percent_cost: i32) -> i32 {
    (i64::from(budget) * i64::from(percent_cost.clamp(0, 10_000)) / 10_000) as i32
}
