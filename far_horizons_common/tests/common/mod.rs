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

//! A small two-species galaxy for driving whole turns

#![allow(dead_code)]

use std::collections::BTreeMap;

use far_horizons_common::{
    Coords, Galaxy, SpeciesId,
    celestial::{Gas, Planet, PlanetSpecial, System},
    colony::{Colony, ColonyStatus},
    ship::{Ship, ShipClass, ShipType},
    species::{Species, SpeciesReserved, SpeciesSet, TechLevels},
};

pub fn id(n: u8) -> SpeciesId {
    SpeciesId::new(n).expect("valid species number")
}

pub fn planet(mining_difficulty: i16) -> Planet {
    Planet {
        temperature_class: 10,
        pressure_class: 5,
        special: PlanetSpecial::None,
        atmosphere: vec![(Gas::N2, 70), (Gas::O2, 30)],
        diameter: 12,
        gravity: 100,
        mining_difficulty,
        md_increase: 5,
        econ_efficiency: 100,
        message: 0,
        reserved: Default::default(),
    }
}

pub fn system(coords: Coords, planets: Vec<usize>) -> System {
    System {
        coords,
        star_type: 1,
        color: 2,
        size: 3,
        home_system: planets.len() > 1,
        wormhole: None,
        planets,
        visited_by: SpeciesSet::default(),
        message: 0,
        reserved: Default::default(),
    }
}

/// Species `n` lives at orbit 1 of system (10n, 10, 10), planet 3(n-1)
pub fn species(n: u8) -> Species {
    let home = Coords::new(n * 10, 10, 10);
    let mut homeworld = Colony::new(format!("Home{n}"), home, 1, usize::from(n - 1) * 3);
    homeworld.status = ColonyStatus::HOME_PLANET | ColonyStatus::POPULATED;
    homeworld.mi_base = 150;
    homeworld.ma_base = 150;
    homeworld.pop_units = 400;
    homeworld.shipyards = 1;
    let levels = TechLevels([10, 10, 10, 10, 5, 5]);
    Species {
        id: id(n),
        name: format!("Folk{n}"),
        govt_name: format!("Assembly{n}"),
        govt_type: "Republic".to_string(),
        home,
        home_orbit: 1,
        required_gas: Gas::O2,
        required_gas_min: 10,
        required_gas_max: 40,
        neutral_gases: vec![Gas::N2],
        poison_gases: vec![Gas::Cl2],
        auto_orders: false,
        tech_levels: levels,
        init_tech_levels: levels,
        tech_knowledge: levels,
        tech_eps: [0; 6],
        hp_original_base: 300,
        econ_units: 500,
        fleet_cost: 0,
        fleet_percent_cost: 0,
        contacts: SpeciesSet::default(),
        allies: SpeciesSet::default(),
        enemies: SpeciesSet::default(),
        colonies: vec![homeworld],
        ships: Vec::new(),
        reserved: SpeciesReserved::default(),
    }
}

/// Two species with three-planet home systems, and a one-planet system between
pub fn galaxy() -> Galaxy {
    let planets = (0..7).map(|_| planet(200)).collect();
    let systems = vec![
        system(Coords::new(10, 10, 10), vec![0, 1, 2]),
        system(Coords::new(20, 10, 10), vec![3, 4, 5]),
        system(Coords::new(15, 12, 10), vec![6]),
    ];
    let species = [species(1), species(2)]
        .into_iter()
        .map(|species| (species.id, species))
        .collect();
    Galaxy::new(12, 30, 2, systems, planets, species)
}

/// A colony at the lone planet of the middle system
pub fn outpost() -> Colony {
    Colony::new("Outpost".to_string(), OUTPOST, 1, 6)
}

pub const OUTPOST: Coords = Coords::new(15, 12, 10);

pub fn ship(name: &str, class: ShipClass, tonnage: i16, coords: Coords, orbit: u8) -> Ship {
    Ship::new(name.to_string(), class, ShipType::Ftl, tonnage, coords, orbit)
}

pub fn orders(entries: &[(u8, &str)]) -> BTreeMap<SpeciesId, Vec<u8>> {
    entries
        .iter()
        .map(|&(n, text)| (id(n), text.as_bytes().to_vec()))
        .collect()
}
