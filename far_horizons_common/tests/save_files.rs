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

//! A processed turn survives the trip through the legacy save files

mod common;

use far_horizons_common::{
    DataError, Galaxy, GalaxyFiles, TurnConfig,
    codec::ByteOrder,
    colony::PlanetRef,
    item::Item,
    process_turn,
    ship::ShipClass,
};

use common::{OUTPOST, galaxy, id, orders, outpost, ship};

fn played_galaxy() -> Galaxy {
    let mut galaxy = galaxy();
    let species = galaxy.species.get_mut(&id(1)).expect("species 1");
    species.auto_orders = true;
    species.colonies.push(outpost());
    let mut mule = ship("Mule", ShipClass::TR, 10, OUTPOST, 1);
    mule.inventory.add(Item::CU, 30);
    species.ships.push(mule);
    let home = species.home;
    species.ships.push(ship("Scout", ShipClass::PB, 1, home, 1));

    let text = "START JUMPS\nJUMP PB Scout, 15 12 10\nEND\n\
                START PRODUCTION\nPRODUCTION PL Home1\nBUILD 10 CU\nEND\n";
    process_turn(&galaxy, &orders(&[(1, text)]), &TurnConfig::default())
        .expect("turn runs")
        .galaxy
}

#[test]
fn played_turn_round_trips() {
    let galaxy = played_galaxy();
    for order in [ByteOrder::Little, ByteOrder::Big] {
        let files = galaxy.encode(order);
        assert_eq!(files.species.len(), 2);
        let decoded = Galaxy::decode(&files, order).expect("decodes");
        assert_eq!(decoded, galaxy);
        assert_eq!(decoded.encode(order), files);
    }

    let species = &galaxy.species[&id(1)];
    assert_eq!(species.ships[0].unloading_point, Some(PlanetRef(1)));
    assert!(species.ships[1].just_jumped);
}

#[test]
fn decoded_galaxy_plays_on() {
    let galaxy = played_galaxy();
    let files = galaxy.encode(ByteOrder::Little);
    let decoded = Galaxy::decode(&files, ByteOrder::Little).expect("decodes");
    let config = TurnConfig::default();
    let from_memory = process_turn(&galaxy, &orders(&[]), &config).expect("turn runs");
    let from_files = process_turn(&decoded, &orders(&[]), &config).expect("turn runs");
    assert_eq!(from_memory.galaxy, from_files.galaxy);
}

#[test]
fn missing_species_file_is_refused() {
    let mut files: GalaxyFiles = played_galaxy().encode(ByteOrder::Little);
    files.species.remove(&id(2));
    assert!(matches!(
        Galaxy::decode(&files, ByteOrder::Little),
        Err(DataError::SpeciesCountMismatch {
            expected: 2,
            found: 1
        })
    ));
}

#[test]
fn wrong_byte_order_is_not_silently_accepted() {
    let files = played_galaxy().encode(ByteOrder::Little);
    assert!(Galaxy::decode(&files, ByteOrder::Big).is_err());
}
