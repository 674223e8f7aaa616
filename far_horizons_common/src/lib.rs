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

//! Turn engine for a play-by-mail space conquest game
//!
//! Loads a galaxy from the legacy save files, parses each species' orders,
//! runs the turn's phases and writes the galaxy back out. File and network
//! I/O belong to the caller; everything here works on in-memory buffers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    celestial::{Gas, Planet, PlanetSpecial, System},
    codec::{ByteOrder, CodecError, FixedName, Record},
    colony::{Colony, ColonyReserved, ColonyStatus, PlanetRef},
    item::Inventory,
    record::{
        GalaxyRecord, NamedPlanetRecord, PlanetRecord, ShipRecord, SpeciesFile, SpeciesRecord,
        StarRecord,
    },
    ship::{Ship, ShipClass, ShipReserved, ShipStatus, ShipType, TurnAnnotation},
    species::{Species, SpeciesReserved, SpeciesSet, TechLevels},
};

pub mod auto;
pub mod celestial;
pub mod codec;
pub mod colony;
pub mod economy;
pub mod item;
pub mod location;
pub mod order;
pub mod prng;
#[allow(missing_docs)]
pub mod record;
pub mod report;
pub mod ship;
pub mod species;
pub mod turn;

pub use report::Report;
pub use turn::{Phase, Turn, TurnConfig, TurnError, TurnOutcome, process_turn};

/// The galaxy: every system, planet and species
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Galaxy {
    /// Current turn
    pub turn: i32,
    /// Radius in parsecs
    pub radius: i32,
    /// Number of species the galaxy was designed for
    pub design_species: i32,
    /// Star systems
    pub systems: Vec<System>,
    /// Planets of all systems; systems refer to them by index
    pub planets: Vec<Planet>,
    /// Species by number
    pub species: BTreeMap<SpeciesId, Species>,
    /// Wormhole exits keyed by the end not recorded in the files
    #[serde(skip)]
    wormhole_reverse: HashMap<Coords, Coords>,
}

/// The raw contents of a galaxy's save files
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GalaxyFiles {
    /// `galaxy.dat`
    pub galaxy: Vec<u8>,
    /// `stars.dat`
    pub stars: Vec<u8>,
    /// `planets.dat`
    pub planets: Vec<u8>,
    /// `spNN.dat` by species number
    pub species: BTreeMap<SpeciesId, Vec<u8>>,
}

/// Structural problems in a galaxy
///
/// These abort a turn: they mean the data is broken, not that a player made a mistake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    /// A save file couldn't be decoded
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The species files don't match the galaxy header
    #[error("galaxy header lists {expected} species but {found} species files were given")]
    SpeciesCountMismatch {
        /// Count in the galaxy header
        expected: i32,
        /// Files supplied
        found: usize,
    },
    /// A species number outside 1..=64
    #[error("species number {species} is out of range")]
    SpeciesOutOfRange {
        /// The offending number
        species: u32,
    },
    /// A species has no colonies at all
    #[error("species {species} has no homeworld")]
    MissingHomeworld {
        /// The species
        species: SpeciesId,
    },
    /// Colony 0 isn't flagged as the homeworld
    #[error("species {species} colony 0 is not flagged as the homeworld")]
    HomeworldNotFirst {
        /// The species
        species: SpeciesId,
    },
    /// A record points at a planet that doesn't exist
    #[error("{owner} refers to planet #{index}, but only {count} planets exist")]
    PlanetIndexOutOfRange {
        /// What holds the reference
        owner: String,
        /// The index stored
        index: i64,
        /// Number of planets
        count: usize,
    },
    /// A ship status code the engine doesn't know
    #[error("species {species} ship #{ship} has impossible status code {code}")]
    InvalidShipStatus {
        /// Owner
        species: SpeciesId,
        /// Position in the species' ship list
        ship: usize,
        /// Stored code
        code: u8,
    },
    /// A ship class code the engine doesn't know
    #[error("species {species} ship #{ship} has unknown class code {code}")]
    InvalidShipClass {
        /// Owner
        species: SpeciesId,
        /// Position in the species' ship list
        ship: usize,
        /// Stored code
        code: u8,
    },
    /// A ship type code the engine doesn't know
    #[error("species {species} ship #{ship} has unknown type code {code}")]
    InvalidShipType {
        /// Owner
        species: SpeciesId,
        /// Position in the species' ship list
        ship: usize,
        /// Stored code
        code: u8,
    },
}

impl Galaxy {
    /// Species numbers can't exceed the width of the contact bit sets
    pub const MAX_SPECIES: u8 = 64;

    /// Assemble a galaxy, building the wormhole reverse index
    pub fn new(
        turn: i32,
        radius: i32,
        design_species: i32,
        systems: Vec<System>,
        planets: Vec<Planet>,
        species: BTreeMap<SpeciesId, Species>,
    ) -> Self {
        let mut galaxy = Self {
            turn,
            radius,
            design_species,
            systems,
            planets,
            species,
            wormhole_reverse: HashMap::new(),
        };
        galaxy.index_wormholes();
        galaxy
    }

    /// Rebuild the reverse wormhole index; needed after editing system wormholes
    pub fn index_wormholes(&mut self) {
        self.wormhole_reverse = self
            .systems
            .iter()
            .filter_map(|system| system.wormhole.map(|exit| (exit, system.coords)))
            .collect();
    }

    /// Where a wormhole at a system leads, whichever end the files recorded it on
    pub fn wormhole_exit(&self, coords: Coords) -> Option<Coords> {
        self.system(coords)
            .and_then(|system| system.wormhole)
            .or_else(|| self.wormhole_reverse.get(&coords).copied())
    }

    /// The system at some coordinates
    pub fn system(&self, coords: Coords) -> Option<&System> {
        self.systems.iter().find(|system| system.coords == coords)
    }

    /// Mutable system at some coordinates
    pub fn system_mut(&mut self, coords: Coords) -> Option<&mut System> {
        self.systems.iter_mut().find(|system| system.coords == coords)
    }

    /// Planet index of an orbit in a system
    pub fn planet_index_at(&self, coords: Coords, orbit: u8) -> Option<usize> {
        self.system(coords)
            .and_then(|system| system.planet_in_orbit(orbit))
    }

    /// Look up a species
    pub fn species(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id)
    }

    /// Check the invariants the turn phases rely on
    pub fn validate(&self) -> Result<(), DataError> {
        for (&id, species) in &self.species {
            match species.homeworld() {
                None => return Err(DataError::MissingHomeworld { species: id }),
                Some(home) if !home.is_home() => {
                    return Err(DataError::HomeworldNotFirst { species: id });
                }
                Some(_) => {}
            }
            for colony in &species.colonies {
                if colony.planet_index >= self.planets.len() {
                    return Err(DataError::PlanetIndexOutOfRange {
                        owner: format!("species {id} colony {}", colony.name),
                        index: colony.planet_index as i64,
                        count: self.planets.len(),
                    });
                }
            }
        }
        for system in &self.systems {
            if let Some(&index) = system.planets.iter().find(|&&i| i >= self.planets.len()) {
                return Err(DataError::PlanetIndexOutOfRange {
                    owner: format!("system {}", system.coords),
                    index: index as i64,
                    count: self.planets.len(),
                });
            }
        }
        Ok(())
    }

    /// Decode a galaxy from its save files
    pub fn decode(files: &GalaxyFiles, order: ByteOrder) -> Result<Self, DataError> {
        let header = GalaxyRecord::decode(&files.galaxy, order)?;
        let stars = record::decode_array::<StarRecord>(&files.stars, order)?;
        let planet_records = record::decode_array::<PlanetRecord>(&files.planets, order)?;
        if usize::try_from(header.num_species).ok() != Some(files.species.len()) {
            return Err(DataError::SpeciesCountMismatch {
                expected: header.num_species,
                found: files.species.len(),
            });
        }

        let planets: Vec<Planet> = planet_records.iter().map(planet_from_record).collect();
        let systems = stars
            .iter()
            .map(|star| system_from_record(star, planets.len()))
            .collect::<Result<Vec<_>, _>>()?;
        let species = files
            .species
            .iter()
            .map(|(&id, bytes)| {
                let file = SpeciesFile::decode(bytes, order)?;
                species_from_file(id, file, planets.len()).map(|species| (id, species))
            })
            .collect::<Result<BTreeMap<_, _>, DataError>>()?;

        let galaxy = Self::new(
            header.turn_number,
            header.radius,
            header.design_species,
            systems,
            planets,
            species,
        );
        galaxy.validate()?;
        Ok(galaxy)
    }

    /// Encode the galaxy into save files
    pub fn encode(&self, order: ByteOrder) -> GalaxyFiles {
        let header = GalaxyRecord {
            design_species: self.design_species,
            num_species: self.species.len() as i32,
            radius: self.radius,
            turn_number: self.turn,
        };
        let stars: Vec<StarRecord> = self.systems.iter().map(system_to_record).collect();
        let planets: Vec<PlanetRecord> = self.planets.iter().map(planet_to_record).collect();
        GalaxyFiles {
            galaxy: header.encode(order),
            stars: record::encode_array(&stars, order),
            planets: record::encode_array(&planets, order),
            species: self
                .species
                .iter()
                .map(|(&id, species)| (id, species_to_file(species).encode(order)))
                .collect(),
        }
    }
}

fn system_from_record(star: &StarRecord, planet_count: usize) -> Result<System, DataError> {
    let coords = Coords::new(star.x, star.y, star.z);
    let first = usize::try_from(star.planet_index).ok();
    let planets: Vec<usize> = match first {
        Some(first) => (first..first + usize::from(star.num_planets)).collect(),
        None if star.num_planets == 0 => Vec::new(),
        None => {
            return Err(DataError::PlanetIndexOutOfRange {
                owner: format!("system {coords}"),
                index: i64::from(star.planet_index),
                count: planet_count,
            });
        }
    };
    if let Some(&last) = planets.last() {
        if last >= planet_count {
            return Err(DataError::PlanetIndexOutOfRange {
                owner: format!("system {coords}"),
                index: last as i64,
                count: planet_count,
            });
        }
    }
    Ok(System {
        coords,
        star_type: star.star_type,
        color: star.color,
        size: star.size,
        home_system: star.home_system != 0,
        wormhole: (star.worm_here != 0).then(|| Coords::new(star.worm_x, star.worm_y, star.worm_z)),
        planets,
        visited_by: SpeciesSet::from_words(star.visited_by),
        message: star.message,
        reserved: (star.reserved1, star.reserved2, star.pad, star.reserved),
    })
}

fn system_to_record(system: &System) -> StarRecord {
    let worm = system.wormhole.unwrap_or_default();
    let (reserved1, reserved2, pad, reserved) = system.reserved;
    StarRecord {
        x: system.coords.x,
        y: system.coords.y,
        z: system.coords.z,
        star_type: system.star_type,
        color: system.color,
        size: system.size,
        num_planets: system.planets.len() as u8,
        home_system: u8::from(system.home_system),
        worm_here: u8::from(system.wormhole.is_some()),
        worm_x: worm.x,
        worm_y: worm.y,
        worm_z: worm.z,
        reserved1,
        reserved2,
        planet_index: system.planets.first().map_or(-1, |&i| i as i16),
        pad,
        message: system.message,
        visited_by: system.visited_by.to_words(),
        reserved,
    }
}

fn planet_from_record(record: &PlanetRecord) -> Planet {
    Planet {
        temperature_class: record.temperature_class,
        pressure_class: record.pressure_class,
        special: PlanetSpecial::from_repr(record.special).unwrap_or(PlanetSpecial::None),
        atmosphere: record
            .gas
            .iter()
            .zip(record.gas_percent)
            .filter(|&(&gas, percent)| gas != 0 && percent != 0)
            .map(|(&gas, percent)| (Gas::from_code(gas), percent))
            .collect(),
        diameter: record.diameter,
        gravity: record.gravity,
        mining_difficulty: record.mining_difficulty,
        md_increase: record.md_increase,
        econ_efficiency: record.econ_efficiency,
        message: record.message,
        reserved: (record.reserved1, record.reserved2, record.reserved),
    }
}

fn planet_to_record(planet: &Planet) -> PlanetRecord {
    let mut gas = [0; 4];
    let mut gas_percent = [0; 4];
    for (slot, &(g, percent)) in planet.atmosphere.iter().take(4).enumerate() {
        gas[slot] = g.code();
        gas_percent[slot] = percent;
    }
    let (reserved1, reserved2, reserved) = planet.reserved;
    PlanetRecord {
        temperature_class: planet.temperature_class,
        pressure_class: planet.pressure_class,
        special: planet.special as u8,
        reserved1,
        gas,
        gas_percent,
        reserved2,
        diameter: planet.diameter,
        gravity: planet.gravity,
        mining_difficulty: planet.mining_difficulty,
        econ_efficiency: planet.econ_efficiency,
        md_increase: planet.md_increase,
        message: planet.message,
        reserved,
    }
}

fn species_from_file(id: SpeciesId, file: SpeciesFile, planet_count: usize) -> Result<Species, DataError> {
    let header = file.species;
    let gases = |codes: &[u8]| -> Vec<Gas> {
        codes
            .iter()
            .filter(|&&code| code != 0)
            .map(|&code| Gas::from_code(code))
            .collect()
    };

    let colonies = file
        .named_planets
        .into_iter()
        .map(|record| {
            let planet_index = usize::try_from(record.planet_index)
                .ok()
                .filter(|&index| index < planet_count)
                .ok_or_else(|| DataError::PlanetIndexOutOfRange {
                    owner: format!("species {id} colony {}", record.name.as_string()),
                    index: i64::from(record.planet_index),
                    count: planet_count,
                })?;
            Ok(colony_from_record(record, planet_index))
        })
        .collect::<Result<Vec<_>, DataError>>()?;
    if colonies.is_empty() {
        return Err(DataError::MissingHomeworld { species: id });
    }

    let ships = file
        .ships
        .into_iter()
        .enumerate()
        .map(|(index, record)| ship_from_record(id, index, record))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Species {
        id,
        name: header.name.as_string(),
        govt_name: header.govt_name.as_string(),
        govt_type: header.govt_type.as_string(),
        home: Coords::new(header.x, header.y, header.z),
        home_orbit: header.pn,
        required_gas: Gas::from_code(header.required_gas),
        required_gas_min: header.required_gas_min,
        required_gas_max: header.required_gas_max,
        neutral_gases: gases(&header.neutral_gas),
        poison_gases: gases(&header.poison_gas),
        auto_orders: header.auto_orders != 0,
        tech_levels: TechLevels(header.tech_level),
        init_tech_levels: TechLevels(header.init_tech_level),
        tech_knowledge: TechLevels(header.tech_knowledge),
        tech_eps: header.tech_eps,
        hp_original_base: header.hp_original_base,
        econ_units: header.econ_units,
        fleet_cost: header.fleet_cost,
        fleet_percent_cost: header.fleet_percent_cost,
        contacts: SpeciesSet::from_words(header.contact),
        allies: SpeciesSet::from_words(header.ally),
        enemies: SpeciesSet::from_words(header.enemy),
        colonies,
        ships,
        reserved: SpeciesReserved {
            reserved3: header.reserved3,
            reserved4: header.reserved4,
            reserved5: header.reserved5,
            padding: header.padding,
            trailer: file.trailer,
        },
    })
}

fn species_to_file(species: &Species) -> SpeciesFile {
    let gases = |list: &[Gas]| -> [u8; 6] {
        let mut codes = [0; 6];
        for (slot, gas) in list.iter().take(6).enumerate() {
            codes[slot] = gas.code();
        }
        codes
    };
    SpeciesFile {
        species: SpeciesRecord {
            name: FixedName::new(&species.name),
            govt_name: FixedName::new(&species.govt_name),
            govt_type: FixedName::new(&species.govt_type),
            x: species.home.x,
            y: species.home.y,
            z: species.home.z,
            pn: species.home_orbit,
            required_gas: species.required_gas.code(),
            required_gas_min: species.required_gas_min,
            required_gas_max: species.required_gas_max,
            reserved5: species.reserved.reserved5,
            neutral_gas: gases(&species.neutral_gases),
            poison_gas: gases(&species.poison_gases),
            auto_orders: u8::from(species.auto_orders),
            reserved3: species.reserved.reserved3,
            reserved4: species.reserved.reserved4,
            tech_level: species.tech_levels.0,
            init_tech_level: species.init_tech_levels.0,
            tech_knowledge: species.tech_knowledge.0,
            num_namplanets: species.colonies.len() as i32,
            num_ships: species.ships.len() as i32,
            tech_eps: species.tech_eps,
            hp_original_base: species.hp_original_base,
            econ_units: species.econ_units,
            fleet_cost: species.fleet_cost,
            fleet_percent_cost: species.fleet_percent_cost,
            contact: species.contacts.to_words(),
            ally: species.allies.to_words(),
            enemy: species.enemies.to_words(),
            padding: species.reserved.padding,
        },
        named_planets: species.colonies.iter().map(colony_to_record).collect(),
        ships: species.ships.iter().map(ship_to_record).collect(),
        trailer: species.reserved.trailer.clone(),
    }
}

fn colony_from_record(record: NamedPlanetRecord, planet_index: usize) -> Colony {
    Colony {
        name: record.name.as_string(),
        coords: Coords::new(record.x, record.y, record.z),
        orbit: record.pn,
        status: ColonyStatus::from_legacy(record.status, record.hiding, record.hidden),
        planet_index,
        siege_eff: record.siege_eff,
        shipyards: record.shipyards,
        ius_needed: record.ius_needed,
        aus_needed: record.aus_needed,
        auto_ius: record.auto_ius,
        auto_aus: record.auto_aus,
        ius_to_install: record.ius_to_install,
        aus_to_install: record.aus_to_install,
        mi_base: record.mi_base,
        ma_base: record.ma_base,
        pop_units: record.pop_units,
        inventory: Inventory::from_slots(record.item_quantity.iter().copied()),
        use_on_ambush: record.use_on_ambush,
        message: record.message,
        special: record.special,
        reserved: ColonyReserved {
            reserved1: record.reserved1,
            pad: record.pad,
            reserved4: record.reserved4,
            reserved5: record.reserved5,
            reserved6: record.reserved6,
            padding: record.padding,
        },
    }
}

fn colony_to_record(colony: &Colony) -> NamedPlanetRecord {
    let (status, hiding, hidden) = colony.status.to_legacy();
    NamedPlanetRecord {
        name: FixedName::new(&colony.name),
        x: colony.coords.x,
        y: colony.coords.y,
        z: colony.coords.z,
        pn: colony.orbit,
        status,
        reserved1: colony.reserved.reserved1,
        hiding,
        hidden,
        planet_index: colony.planet_index as i16,
        siege_eff: colony.siege_eff,
        shipyards: colony.shipyards,
        pad: colony.reserved.pad,
        reserved4: colony.reserved.reserved4,
        ius_needed: colony.ius_needed,
        aus_needed: colony.aus_needed,
        auto_ius: colony.auto_ius,
        auto_aus: colony.auto_aus,
        reserved5: colony.reserved.reserved5,
        ius_to_install: colony.ius_to_install,
        aus_to_install: colony.aus_to_install,
        mi_base: colony.mi_base,
        ma_base: colony.ma_base,
        pop_units: colony.pop_units,
        item_quantity: colony.inventory.to_slots(),
        reserved6: colony.reserved.reserved6,
        use_on_ambush: colony.use_on_ambush,
        message: colony.message,
        special: colony.special,
        padding: colony.reserved.padding,
    }
}

fn ship_from_record(species: SpeciesId, index: usize, record: ShipRecord) -> Result<Ship, DataError> {
    let status = ShipStatus::from_repr(record.status).ok_or(DataError::InvalidShipStatus {
        species,
        ship: index,
        code: record.status,
    })?;
    let class = ShipClass::from_repr(record.class).ok_or(DataError::InvalidShipClass {
        species,
        ship: index,
        code: record.class,
    })?;
    let ship_type = ShipType::from_repr(record.ship_type).ok_or(DataError::InvalidShipType {
        species,
        ship: index,
        code: record.ship_type,
    })?;
    let destination = Coords::new(record.dest_x, record.dest_y, record.dest_z);
    Ok(Ship {
        name: record.name.as_string(),
        class,
        ship_type,
        tonnage: record.tonnage,
        status,
        coords: Coords::new(record.x, record.y, record.z),
        orbit: record.pn,
        destination: (destination != Coords::default()).then_some(destination),
        age: record.age,
        remaining_cost: record.remaining_cost,
        inventory: Inventory::from_slots(record.item_quantity.iter().map(|&q| i32::from(q))),
        loading_point: PlanetRef::from_legacy(record.loading_point),
        unloading_point: PlanetRef::from_legacy(record.unloading_point),
        just_jumped: record.just_jumped != 0,
        arrived_via_wormhole: record.arrived_via_wormhole != 0,
        annotation: TurnAnnotation::Idle,
        special: record.special,
        reserved: ShipReserved {
            reserved: record.reserved,
            pad: record.pad,
            reserved4: record.reserved4,
            padding: record.padding,
        },
    })
}

fn ship_to_record(ship: &Ship) -> ShipRecord {
    let destination = ship.destination.unwrap_or_default();
    ShipRecord {
        name: FixedName::new(&ship.name),
        x: ship.coords.x,
        y: ship.coords.y,
        z: ship.coords.z,
        pn: ship.orbit,
        status: ship.status as u8,
        ship_type: ship.ship_type as u8,
        dest_x: destination.x,
        dest_y: destination.y,
        dest_z: destination.z,
        just_jumped: u8::from(ship.just_jumped),
        arrived_via_wormhole: u8::from(ship.arrived_via_wormhole),
        reserved: ship.reserved.reserved,
        class: ship.class as u8,
        pad: ship.reserved.pad,
        tonnage: ship.tonnage,
        item_quantity: ship
            .inventory
            .to_slots()
            .into_iter()
            // loading keeps each item within Ship::MAX_CARGO
            .map(|q| q.clamp(i32::from(i16::MIN), Ship::MAX_CARGO) as i16)
            .collect(),
        age: ship.age,
        remaining_cost: ship.remaining_cost,
        reserved4: ship.reserved.reserved4,
        loading_point: PlanetRef::to_legacy(ship.loading_point),
        unloading_point: PlanetRef::to_legacy(ship.unloading_point),
        special: ship.special,
        padding: ship.reserved.padding,
    }
}

/// Refers to a species
///
/// Species are numbered from 1; 0 is never a valid species.
#[repr(transparent)]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpeciesId(u8);

impl SpeciesId {
    /// A species number, if it is in 1..=64
    pub fn new(n: u8) -> Option<Self> {
        (1..=Galaxy::MAX_SPECIES).contains(&n).then_some(Self(n))
    }

    /// The species number
    pub fn get(self) -> u8 {
        self.0
    }

    /// Name of the species' save file
    pub fn file_name(self) -> String {
        format!("sp{:02}.dat", self.0)
    }
}

impl TryFrom<u32> for SpeciesId {
    type Error = DataError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(DataError::SpeciesOutOfRange { species: value })
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a star system
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Coords {
    /// X
    pub x: u8,
    /// Y
    pub y: u8,
    /// Z
    pub z: u8,
}

impl Coords {
    /// Coordinates from components
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Square of the distance in parsecs
    pub fn distance_squared(self, other: Self) -> i64 {
        let d = other - self;
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    /// Whether another system is at most one parsec away along every axis
    pub fn adjacent(self, other: Self) -> bool {
        let d = other - self;
        d.x.abs() <= 1 && d.y.abs() <= 1 && d.z.abs() <= 1
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// Displacement between two systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    /// X
    pub x: i64,
    /// Y
    pub y: i64,
    /// Z
    pub z: i64,
}

impl Sub for Coords {
    type Output = Offset;

    fn sub(self, rhs: Self) -> Self::Output {
        Offset {
            x: i64::from(self.x) - i64::from(rhs.x),
            y: i64::from(self.y) - i64::from(rhs.y),
            z: i64::from(self.z) - i64::from(rhs.z),
        }
    }
}

impl Add<Offset> for Coords {
    type Output = Option<Coords>;

    fn add(self, rhs: Offset) -> Self::Output {
        let axis = |c: u8, d: i64| u8::try_from(i64::from(c) + d).ok();
        Some(Coords::new(
            axis(self.x, rhs.x)?,
            axis(self.y, rhs.y)?,
            axis(self.z, rhs.z)?,
        ))
    }
}
