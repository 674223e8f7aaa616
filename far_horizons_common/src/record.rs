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

//! Fixed-layout records of the legacy save files
//!
//! Field order and widths follow the C structures the files were written
//! from, including the alignment gaps a 32-bit compiler inserted; those gaps
//! are kept as explicit `pad` fields so a decoded record re-encodes to the
//! same bytes. Single-byte fields are unsigned.

use serde::{Deserialize, Serialize};

use crate::codec::{ByteOrder, CodecError, FixedName, Reader, Record, Writer};

/// Number of inventory slots on colonies and ships
pub const MAX_ITEMS: usize = 38;
/// Number of technologies
pub const NUM_TECHS: usize = 6;
/// Number of 32-bit words in a species bit set
pub const CONTACT_WORDS: usize = 2;

/// `galaxy.dat`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct GalaxyRecord {
    /// Number of species the galaxy was designed for
    pub design_species: i32,
    /// Number of species actually present
    pub num_species: i32,
    /// Galactic radius in parsecs
    pub radius: i32,
    /// Current turn
    pub turn_number: i32,
}

impl Record for GalaxyRecord {
    const NAME: &'static str = "galaxy";
    const SIZE: usize = 16;

    fn read_fields(r: &mut Reader<'_>) -> Self {
        Self {
            design_species: r.i32(),
            num_species: r.i32(),
            radius: r.i32(),
            turn_number: r.i32(),
        }
    }

    fn write_fields(&self, w: &mut Writer) {
        w.i32(self.design_species);
        w.i32(self.num_species);
        w.i32(self.radius);
        w.i32(self.turn_number);
    }
}

/// One entry of `stars.dat`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct StarRecord {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub star_type: u8,
    pub color: u8,
    pub size: u8,
    pub num_planets: u8,
    pub home_system: u8,
    pub worm_here: u8,
    pub worm_x: u8,
    pub worm_y: u8,
    pub worm_z: u8,
    pub reserved1: i16,
    pub reserved2: i16,
    /// Index into `planets.dat` of the innermost planet
    pub planet_index: i16,
    pub pad: [u8; 2],
    pub message: i32,
    pub visited_by: [u32; CONTACT_WORDS],
    pub reserved: [i32; 3],
}

impl Record for StarRecord {
    const NAME: &'static str = "star";
    const SIZE: usize = 44;

    fn read_fields(r: &mut Reader<'_>) -> Self {
        Self {
            x: r.u8(),
            y: r.u8(),
            z: r.u8(),
            star_type: r.u8(),
            color: r.u8(),
            size: r.u8(),
            num_planets: r.u8(),
            home_system: r.u8(),
            worm_here: r.u8(),
            worm_x: r.u8(),
            worm_y: r.u8(),
            worm_z: r.u8(),
            reserved1: r.i16(),
            reserved2: r.i16(),
            planet_index: r.i16(),
            pad: r.bytes(),
            message: r.i32(),
            visited_by: r.u32s(),
            reserved: r.i32s(),
        }
    }

    fn write_fields(&self, w: &mut Writer) {
        for b in [
            self.x,
            self.y,
            self.z,
            self.star_type,
            self.color,
            self.size,
            self.num_planets,
            self.home_system,
            self.worm_here,
            self.worm_x,
            self.worm_y,
            self.worm_z,
        ] {
            w.u8(b);
        }
        w.i16(self.reserved1);
        w.i16(self.reserved2);
        w.i16(self.planet_index);
        w.raw(&self.pad);
        w.i32(self.message);
        w.u32s(&self.visited_by);
        w.i32s(&self.reserved);
    }
}

/// One entry of `planets.dat`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanetRecord {
    pub temperature_class: u8,
    pub pressure_class: u8,
    /// 0 ordinary, 1 ideal home, 2 ideal colony, 3 radioactive hellhole
    pub special: u8,
    pub reserved1: u8,
    pub gas: [u8; 4],
    pub gas_percent: [u8; 4],
    pub reserved2: i16,
    /// Thousands of kilometres
    pub diameter: i16,
    /// Earth gravity times 100
    pub gravity: i16,
    /// Times 100
    pub mining_difficulty: i16,
    /// Percent
    pub econ_efficiency: i16,
    pub md_increase: i16,
    pub message: i32,
    pub reserved: [i32; 3],
}

impl Record for PlanetRecord {
    const NAME: &'static str = "planet";
    const SIZE: usize = 40;

    fn read_fields(r: &mut Reader<'_>) -> Self {
        Self {
            temperature_class: r.u8(),
            pressure_class: r.u8(),
            special: r.u8(),
            reserved1: r.u8(),
            gas: r.bytes(),
            gas_percent: r.bytes(),
            reserved2: r.i16(),
            diameter: r.i16(),
            gravity: r.i16(),
            mining_difficulty: r.i16(),
            econ_efficiency: r.i16(),
            md_increase: r.i16(),
            message: r.i32(),
            reserved: r.i32s(),
        }
    }

    fn write_fields(&self, w: &mut Writer) {
        w.u8(self.temperature_class);
        w.u8(self.pressure_class);
        w.u8(self.special);
        w.u8(self.reserved1);
        w.raw(&self.gas);
        w.raw(&self.gas_percent);
        w.i16s(&[
            self.reserved2,
            self.diameter,
            self.gravity,
            self.mining_difficulty,
            self.econ_efficiency,
            self.md_increase,
        ]);
        w.i32(self.message);
        w.i32s(&self.reserved);
    }
}

/// Header of a `spNN.dat` file
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeciesRecord {
    pub name: FixedName,
    pub govt_name: FixedName,
    pub govt_type: FixedName,
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub pn: u8,
    pub required_gas: u8,
    pub required_gas_min: u8,
    pub required_gas_max: u8,
    pub reserved5: u8,
    pub neutral_gas: [u8; 6],
    pub poison_gas: [u8; 6],
    pub auto_orders: u8,
    pub reserved3: u8,
    pub reserved4: i16,
    pub tech_level: [i16; NUM_TECHS],
    pub init_tech_level: [i16; NUM_TECHS],
    pub tech_knowledge: [i16; NUM_TECHS],
    pub num_namplanets: i32,
    pub num_ships: i32,
    pub tech_eps: [i32; NUM_TECHS],
    pub hp_original_base: i32,
    pub econ_units: i32,
    pub fleet_cost: i32,
    pub fleet_percent_cost: i32,
    pub contact: [u32; CONTACT_WORDS],
    pub ally: [u32; CONTACT_WORDS],
    pub enemy: [u32; CONTACT_WORDS],
    pub padding: [u8; 12],
}

impl Record for SpeciesRecord {
    const NAME: &'static str = "species";
    const SIZE: usize = 240;

    fn read_fields(r: &mut Reader<'_>) -> Self {
        Self {
            name: FixedName(r.bytes()),
            govt_name: FixedName(r.bytes()),
            govt_type: FixedName(r.bytes()),
            x: r.u8(),
            y: r.u8(),
            z: r.u8(),
            pn: r.u8(),
            required_gas: r.u8(),
            required_gas_min: r.u8(),
            required_gas_max: r.u8(),
            reserved5: r.u8(),
            neutral_gas: r.bytes(),
            poison_gas: r.bytes(),
            auto_orders: r.u8(),
            reserved3: r.u8(),
            reserved4: r.i16(),
            tech_level: r.i16s(),
            init_tech_level: r.i16s(),
            tech_knowledge: r.i16s(),
            num_namplanets: r.i32(),
            num_ships: r.i32(),
            tech_eps: r.i32s(),
            hp_original_base: r.i32(),
            econ_units: r.i32(),
            fleet_cost: r.i32(),
            fleet_percent_cost: r.i32(),
            contact: r.u32s(),
            ally: r.u32s(),
            enemy: r.u32s(),
            padding: r.bytes(),
        }
    }

    fn write_fields(&self, w: &mut Writer) {
        w.raw(&self.name.0);
        w.raw(&self.govt_name.0);
        w.raw(&self.govt_type.0);
        for b in [
            self.x,
            self.y,
            self.z,
            self.pn,
            self.required_gas,
            self.required_gas_min,
            self.required_gas_max,
            self.reserved5,
        ] {
            w.u8(b);
        }
        w.raw(&self.neutral_gas);
        w.raw(&self.poison_gas);
        w.u8(self.auto_orders);
        w.u8(self.reserved3);
        w.i16(self.reserved4);
        w.i16s(&self.tech_level);
        w.i16s(&self.init_tech_level);
        w.i16s(&self.tech_knowledge);
        w.i32(self.num_namplanets);
        w.i32(self.num_ships);
        w.i32s(&self.tech_eps);
        w.i32(self.hp_original_base);
        w.i32(self.econ_units);
        w.i32(self.fleet_cost);
        w.i32(self.fleet_percent_cost);
        w.u32s(&self.contact);
        w.u32s(&self.ally);
        w.u32s(&self.enemy);
        w.raw(&self.padding);
    }
}

/// A colony entry of a `spNN.dat` file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NamedPlanetRecord {
    pub name: FixedName,
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub pn: u8,
    pub status: u8,
    pub reserved1: u8,
    pub hiding: u8,
    pub hidden: u8,
    pub planet_index: i16,
    pub siege_eff: i16,
    pub shipyards: i16,
    pub pad: [u8; 2],
    pub reserved4: i32,
    pub ius_needed: i32,
    pub aus_needed: i32,
    pub auto_ius: i32,
    pub auto_aus: i32,
    pub reserved5: i32,
    pub ius_to_install: i32,
    pub aus_to_install: i32,
    /// Tenths of a unit
    pub mi_base: i32,
    /// Tenths of a unit
    pub ma_base: i32,
    pub pop_units: i32,
    pub item_quantity: Vec<i32>,
    pub reserved6: i32,
    pub use_on_ambush: i32,
    pub message: i32,
    pub special: i32,
    pub padding: [u8; 28],
}

impl Default for NamedPlanetRecord {
    fn default() -> Self {
        Self {
            name: FixedName::default(),
            x: 0,
            y: 0,
            z: 0,
            pn: 0,
            status: 0,
            reserved1: 0,
            hiding: 0,
            hidden: 0,
            planet_index: 0,
            siege_eff: 0,
            shipyards: 0,
            pad: [0; 2],
            reserved4: 0,
            ius_needed: 0,
            aus_needed: 0,
            auto_ius: 0,
            auto_aus: 0,
            reserved5: 0,
            ius_to_install: 0,
            aus_to_install: 0,
            mi_base: 0,
            ma_base: 0,
            pop_units: 0,
            item_quantity: vec![0; MAX_ITEMS],
            reserved6: 0,
            use_on_ambush: 0,
            message: 0,
            special: 0,
            padding: [0; 28],
        }
    }
}

impl Record for NamedPlanetRecord {
    const NAME: &'static str = "named planet";
    const SIZE: usize = 288;

    fn read_fields(r: &mut Reader<'_>) -> Self {
        Self {
            name: FixedName(r.bytes()),
            x: r.u8(),
            y: r.u8(),
            z: r.u8(),
            pn: r.u8(),
            status: r.u8(),
            reserved1: r.u8(),
            hiding: r.u8(),
            hidden: r.u8(),
            planet_index: r.i16(),
            siege_eff: r.i16(),
            shipyards: r.i16(),
            pad: r.bytes(),
            reserved4: r.i32(),
            ius_needed: r.i32(),
            aus_needed: r.i32(),
            auto_ius: r.i32(),
            auto_aus: r.i32(),
            reserved5: r.i32(),
            ius_to_install: r.i32(),
            aus_to_install: r.i32(),
            mi_base: r.i32(),
            ma_base: r.i32(),
            pop_units: r.i32(),
            item_quantity: r.i32s::<MAX_ITEMS>().to_vec(),
            reserved6: r.i32(),
            use_on_ambush: r.i32(),
            message: r.i32(),
            special: r.i32(),
            padding: r.bytes(),
        }
    }

    fn write_fields(&self, w: &mut Writer) {
        w.raw(&self.name.0);
        for b in [
            self.x,
            self.y,
            self.z,
            self.pn,
            self.status,
            self.reserved1,
            self.hiding,
            self.hidden,
        ] {
            w.u8(b);
        }
        w.i16(self.planet_index);
        w.i16(self.siege_eff);
        w.i16(self.shipyards);
        w.raw(&self.pad);
        w.i32s(&[
            self.reserved4,
            self.ius_needed,
            self.aus_needed,
            self.auto_ius,
            self.auto_aus,
            self.reserved5,
            self.ius_to_install,
            self.aus_to_install,
            self.mi_base,
            self.ma_base,
            self.pop_units,
        ]);
        write_slots(w, &self.item_quantity, |w, q| w.i32(q));
        w.i32s(&[
            self.reserved6,
            self.use_on_ambush,
            self.message,
            self.special,
        ]);
        w.raw(&self.padding);
    }
}

/// A ship entry of a `spNN.dat` file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShipRecord {
    pub name: FixedName,
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub pn: u8,
    pub status: u8,
    pub ship_type: u8,
    pub dest_x: u8,
    pub dest_y: u8,
    pub dest_z: u8,
    pub just_jumped: u8,
    pub arrived_via_wormhole: u8,
    pub reserved: [u8; 3],
    pub class: u8,
    pub pad: u8,
    pub tonnage: i16,
    pub item_quantity: Vec<i16>,
    pub age: i16,
    pub remaining_cost: i16,
    pub reserved4: i16,
    pub loading_point: i16,
    pub unloading_point: i16,
    pub special: i32,
    pub padding: [u8; 28],
}

impl Default for ShipRecord {
    fn default() -> Self {
        Self {
            name: FixedName::default(),
            x: 0,
            y: 0,
            z: 0,
            pn: 0,
            status: 0,
            ship_type: 0,
            dest_x: 0,
            dest_y: 0,
            dest_z: 0,
            just_jumped: 0,
            arrived_via_wormhole: 0,
            reserved: [0; 3],
            class: 0,
            pad: 0,
            tonnage: 0,
            item_quantity: vec![0; MAX_ITEMS],
            age: 0,
            remaining_cost: 0,
            reserved4: 0,
            loading_point: 0,
            unloading_point: 0,
            special: 0,
            padding: [0; 28],
        }
    }
}

impl Record for ShipRecord {
    const NAME: &'static str = "ship";
    const SIZE: usize = 168;

    fn read_fields(r: &mut Reader<'_>) -> Self {
        Self {
            name: FixedName(r.bytes()),
            x: r.u8(),
            y: r.u8(),
            z: r.u8(),
            pn: r.u8(),
            status: r.u8(),
            ship_type: r.u8(),
            dest_x: r.u8(),
            dest_y: r.u8(),
            dest_z: r.u8(),
            just_jumped: r.u8(),
            arrived_via_wormhole: r.u8(),
            reserved: r.bytes(),
            class: r.u8(),
            pad: r.u8(),
            tonnage: r.i16(),
            item_quantity: r.i16s::<MAX_ITEMS>().to_vec(),
            age: r.i16(),
            remaining_cost: r.i16(),
            reserved4: r.i16(),
            loading_point: r.i16(),
            unloading_point: r.i16(),
            special: r.i32(),
            padding: r.bytes(),
        }
    }

    fn write_fields(&self, w: &mut Writer) {
        w.raw(&self.name.0);
        for b in [
            self.x,
            self.y,
            self.z,
            self.pn,
            self.status,
            self.ship_type,
            self.dest_x,
            self.dest_y,
            self.dest_z,
            self.just_jumped,
            self.arrived_via_wormhole,
        ] {
            w.u8(b);
        }
        w.raw(&self.reserved);
        w.u8(self.class);
        w.u8(self.pad);
        w.i16(self.tonnage);
        write_slots(w, &self.item_quantity, |w, q| w.i16(q));
        w.i16s(&[
            self.age,
            self.remaining_cost,
            self.reserved4,
            self.loading_point,
            self.unloading_point,
        ]);
        w.i32(self.special);
        w.raw(&self.padding);
    }
}

/// Writes exactly [`MAX_ITEMS`] slots, zero-filling or dropping as needed
fn write_slots<T: Copy + Default>(w: &mut Writer, slots: &[T], mut put: impl FnMut(&mut Writer, T)) {
    for i in 0..MAX_ITEMS {
        put(w, slots.get(i).copied().unwrap_or_default());
    }
}

/// A whole `spNN.dat` file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct SpeciesFile {
    pub species: SpeciesRecord,
    pub named_planets: Vec<NamedPlanetRecord>,
    pub ships: Vec<ShipRecord>,
    /// Bytes after the last ship, kept as found
    pub trailer: Vec<u8>,
}

impl SpeciesFile {
    /// Decode a species file; the array lengths come from the header
    pub fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes, order);
        let species: SpeciesRecord = reader.record(0)?;
        let named_planets = reader.records(count(NamedPlanetRecord::NAME, species.num_namplanets)?)?;
        let ships = reader.records(count(ShipRecord::NAME, species.num_ships)?)?;
        let trailer = reader.rest().to_vec();
        Ok(Self {
            species,
            named_planets,
            ships,
            trailer,
        })
    }

    /// Encode a species file; the header counts are written from the array lengths
    pub fn encode(&self, order: ByteOrder) -> Vec<u8> {
        let mut writer = Writer::with_capacity(
            order,
            SpeciesRecord::SIZE
                + self.named_planets.len() * NamedPlanetRecord::SIZE
                + self.ships.len() * ShipRecord::SIZE
                + self.trailer.len(),
        );
        let header = SpeciesRecord {
            num_namplanets: self.named_planets.len() as i32,
            num_ships: self.ships.len() as i32,
            ..self.species
        };
        writer.record(&header);
        for named_planet in &self.named_planets {
            writer.record(named_planet);
        }
        for ship in &self.ships {
            writer.record(ship);
        }
        writer.raw(&self.trailer);
        writer.into_bytes()
    }
}

fn count(record: &'static str, count: i32) -> Result<usize, CodecError> {
    usize::try_from(count).map_err(|_| CodecError::InvalidCount { record, count })
}

/// Decode `stars.dat` or `planets.dat`: a count followed by that many records
pub fn decode_array<R: Record>(bytes: &[u8], order: ByteOrder) -> Result<Vec<R>, CodecError> {
    let mut reader = Reader::new(bytes, order);
    let n = reader.count(R::NAME)?;
    reader.records(n)
}

/// Encode `stars.dat` or `planets.dat`
pub fn encode_array<R: Record>(records: &[R], order: ByteOrder) -> Vec<u8> {
    let mut writer = Writer::with_capacity(order, 4 + records.len() * R::SIZE);
    writer.counted(records);
    writer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_star() -> StarRecord {
        StarRecord {
            x: 10,
            y: 20,
            z: 30,
            star_type: 3,
            color: 5,
            size: 7,
            num_planets: 4,
            home_system: 1,
            worm_here: 1,
            worm_x: 1,
            worm_y: 2,
            worm_z: 3,
            reserved1: -1,
            reserved2: 512,
            planet_index: 77,
            pad: [0xAB, 0xCD],
            message: 12345,
            visited_by: [0b1010, 1 << 31],
            reserved: [1, -2, 3],
        }
    }

    fn sample_ship() -> ShipRecord {
        let mut items = vec![0; MAX_ITEMS];
        items[4] = 50;
        items[37] = -2;
        ShipRecord {
            name: FixedName::new("Mule"),
            x: 1,
            y: 2,
            z: 3,
            pn: 99,
            status: 3,
            ship_type: 0,
            dest_x: 4,
            dest_y: 5,
            dest_z: 6,
            just_jumped: 1,
            arrived_via_wormhole: 0,
            reserved: [7, 8, 9],
            class: 17,
            pad: 0xEE,
            tonnage: 10,
            item_quantity: items,
            age: 3,
            remaining_cost: 0,
            reserved4: 0,
            loading_point: 9999,
            unloading_point: 2,
            special: -7,
            padding: [0x5A; 28],
        }
    }

    #[test]
    fn record_sizes_match_layout() {
        assert_eq!(GalaxyRecord::default().encode(ByteOrder::Little).len(), 16);
        assert_eq!(sample_star().encode(ByteOrder::Little).len(), 44);
        assert_eq!(PlanetRecord::default().encode(ByteOrder::Big).len(), 40);
        assert_eq!(SpeciesRecord::default().encode(ByteOrder::Big).len(), 240);
        assert_eq!(NamedPlanetRecord::default().encode(ByteOrder::Little).len(), 288);
        assert_eq!(sample_ship().encode(ByteOrder::Little).len(), 168);
    }

    #[test]
    fn star_round_trips_in_both_orders() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let star = sample_star();
            assert_eq!(StarRecord::decode(&star.encode(order), order), Ok(star));
        }
    }

    #[test]
    fn star_field_offsets() {
        let bytes = sample_star().encode(ByteOrder::Big);
        assert_eq!(&bytes[0..3], &[10, 20, 30]);
        assert_eq!(&bytes[16..18], &77_i16.to_be_bytes());
        assert_eq!(&bytes[18..20], &[0xAB, 0xCD]);
        assert_eq!(&bytes[20..24], &12345_i32.to_be_bytes());
    }

    #[test]
    fn species_file_round_trips_with_trailer() {
        let mut colony = NamedPlanetRecord {
            name: FixedName::new("Home"),
            status: 1 | 8,
            mi_base: 300,
            ma_base: 250,
            pop_units: 40,
            padding: [3; 28],
            ..Default::default()
        };
        colony.item_quantity[5] = 20;
        let file = SpeciesFile {
            species: SpeciesRecord {
                name: FixedName::new("Zorn"),
                tech_level: [10, 10, 5, 3, 2, 1],
                contact: [0b110, 0],
                padding: [9; 12],
                ..Default::default()
            },
            named_planets: vec![colony],
            ships: vec![sample_ship(), ShipRecord::default()],
            trailer: vec![1, 2, 3],
        };
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let bytes = file.encode(order);
            let decoded = SpeciesFile::decode(&bytes, order).expect("decodes");
            assert_eq!(decoded.species.num_namplanets, 1);
            assert_eq!(decoded.species.num_ships, 2);
            assert_eq!(decoded.named_planets, file.named_planets);
            assert_eq!(decoded.ships, file.ships);
            assert_eq!(decoded.trailer, vec![1, 2, 3]);
            assert_eq!(decoded.encode(order), bytes);
        }
    }

    #[test]
    fn truncated_ship_array_is_rejected() {
        let file = SpeciesFile {
            species: SpeciesRecord::default(),
            named_planets: vec![NamedPlanetRecord::default()],
            ships: vec![sample_ship()],
            trailer: Vec::new(),
        };
        let mut bytes = file.encode(ByteOrder::Little);
        bytes.truncate(bytes.len() - 1);
        assert_eq!(
            SpeciesFile::decode(&bytes, ByteOrder::Little),
            Err(CodecError::TruncatedRecord {
                record: "ship",
                index: 0,
                offset: 240 + 288,
                needed: 168,
                available: 167,
            })
        );
    }

    #[test]
    fn array_file_round_trips() {
        let planets = vec![
            PlanetRecord {
                gas: [1, 7, 0, 0],
                gas_percent: [80, 20, 0, 0],
                mining_difficulty: 150,
                econ_efficiency: 100,
                ..Default::default()
            },
            PlanetRecord::default(),
        ];
        let bytes = encode_array(&planets, ByteOrder::Big);
        assert_eq!(bytes.len(), 4 + 2 * 40);
        assert_eq!(decode_array::<PlanetRecord>(&bytes, ByteOrder::Big), Ok(planets));
    }

    #[test]
    fn array_count_beyond_data_is_truncation() {
        let mut bytes = encode_array(&[sample_star()], ByteOrder::Little);
        bytes[0] = 2;
        assert!(matches!(
            decode_array::<StarRecord>(&bytes, ByteOrder::Little),
            Err(CodecError::TruncatedRecord { record: "star", index: 1, .. })
        ));
    }
}
