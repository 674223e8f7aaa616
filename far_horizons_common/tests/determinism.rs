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

//! Turns are reproducible from the galaxy, the orders and the seed

mod common;

use far_horizons_common::{
    Galaxy, TurnConfig, TurnOutcome, process_turn,
    ship::ShipClass,
    species::{TechLevels, Tech},
};

use common::{OUTPOST, galaxy, id, orders, ship};

fn contested_galaxy() -> Galaxy {
    let mut galaxy = galaxy();
    for n in [1, 2] {
        let species = galaxy.species.get_mut(&id(n)).expect("species");
        // knowledge ahead of every level, so research rolls for each tech
        species.tech_knowledge = TechLevels([15; 6]);
        let home = species.home;
        species.ships.push(ship("Scout", ShipClass::PB, 1, home, 1));
        species.ships.push(ship("Guard", ShipClass::DD, 4, OUTPOST, 1));
    }
    galaxy
}

const ORDERS_1: &str = "START COMBAT\n\
                        BATTLE 15 12 10\n\
                        ATTACK SP Folk2\n\
                        WITHDRAW 50 50\n\
                        HAVEN 10 10 10\n\
                        END\n\
                        START JUMPS\n\
                        VISITED PB Scout\n\
                        END\n\
                        START PRODUCTION\n\
                        PRODUCTION PL Home1\n\
                        RESEARCH 40 GV\n\
                        END\n";

const ORDERS_2: &str = "START COMBAT\n\
                        BATTLE 15 12 10\n\
                        WITHDRAW 80 80\n\
                        HAVEN 20 10 10\n\
                        END\n";

fn run(galaxy: &Galaxy, seed: u64) -> TurnOutcome {
    let config = TurnConfig {
        seed,
        ..TurnConfig::default()
    };
    process_turn(galaxy, &orders(&[(1, ORDERS_1), (2, ORDERS_2)]), &config).expect("turn runs")
}

#[test]
fn same_inputs_same_turn() {
    let galaxy = contested_galaxy();
    let first = run(&galaxy, 99);
    let second = run(&galaxy, 99);
    assert_eq!(first, second);
    assert!(first.galaxy.species[&id(1)].contacts.contains(id(2)));
}

#[test]
fn species_draw_from_their_own_streams() {
    let galaxy = contested_galaxy();
    let config = TurnConfig::default();
    let alone = process_turn(&galaxy, &orders(&[(1, ORDERS_1)]), &config).expect("turn runs");
    let together = run(&galaxy, config.seed);

    let levels = |outcome: &TurnOutcome| {
        let species = &outcome.galaxy.species[&id(1)];
        [Tech::MI, Tech::MA, Tech::ML, Tech::GV, Tech::LS, Tech::BI]
            .map(|tech| species.tech_levels.get(tech))
    };
    assert_eq!(levels(&alone), levels(&together));
}

#[test]
fn chained_turns_are_reproducible() {
    let chain = || {
        let mut galaxy = contested_galaxy();
        for seed in 1..=3 {
            galaxy = run(&galaxy, seed).galaxy;
        }
        galaxy
    };
    let galaxy = chain();
    assert_eq!(galaxy.turn, 15);
    assert_eq!(galaxy, chain());
}
