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

//! Turn reports and the default orders that go out with them

use std::fmt::{self, Display, Formatter, Write};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    Galaxy, SpeciesId,
    colony::{Colony, PlanetRef},
    economy::colony_yield,
    item::Item,
    location::{Locations, Sighting, sightings},
    order::Section,
    ship::{Ship, ShipStatus},
    species::{Species, SpeciesSet, Tech},
    turn::{Phase, SpeciesLog},
};

/// What a species gets back after a turn
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Report {
    /// Who it's for
    pub species: SpeciesId,
    /// The report proper
    pub text: String,
    /// Suggested orders for next turn, ready to edit and send back
    pub orders: String,
}

/// Render a species' report; `None` if the species doesn't exist
pub fn render(
    galaxy: &Galaxy,
    locations: &Locations,
    id: SpeciesId,
    log: &SpeciesLog,
) -> Option<Report> {
    let species = galaxy.species(id)?;
    let view = ReportView {
        galaxy,
        species,
        log,
        sightings: sightings(galaxy, locations, id),
    };
    let orders = default_orders(galaxy, species);
    let text = format!("{view}\nOrders for next turn:\n\n{orders}");
    Some(Report {
        species: id,
        text,
        orders,
    })
}

struct ReportView<'a> {
    galaxy: &'a Galaxy,
    species: &'a Species,
    log: &'a SpeciesLog,
    sightings: Vec<Sighting>,
}

impl ReportView<'_> {
    fn name_of(&self, id: SpeciesId) -> String {
        self.galaxy
            .species(id)
            .map_or_else(|| format!("#{id}"), |species| species.name.clone())
    }

    fn names(&self, set: &SpeciesSet) -> String {
        if set.is_empty() {
            return "none".to_string();
        }
        set.iter()
            .map(|id| format!("SP {}", self.name_of(id)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn colony(&self, f: &mut Formatter<'_>, colony: &Colony) -> fmt::Result {
        let flags: Vec<&str> = colony.status.iter_names().map(|(name, _)| name).collect();
        writeln!(
            f,
            "PL {} at {} #{} [{}]",
            colony.name,
            colony.coords,
            colony.orbit,
            flags.join(" ")
        )?;
        let output = colony_yield(self.species, &self.galaxy.planets, colony);
        writeln!(
            f,
            "    Mining base {}.{}, manufacturing base {}.{}, population {}",
            colony.mi_base / 10,
            colony.mi_base % 10,
            colony.ma_base / 10,
            colony.ma_base % 10,
            colony.pop_units
        )?;
        writeln!(
            f,
            "    Raw material {}, production capacity {}, life support needed {} ({}% penalty)",
            output.raw_material, output.capacity, output.ls_needed, output.ls_penalty
        )?;
        if colony.shipyards > 0 {
            writeln!(f, "    Shipyards: {}", colony.shipyards)?;
        }
        if !colony.inventory.is_empty() {
            writeln!(f, "    Inventory: {}", cargo(colony.inventory.iter()))?;
        }
        Ok(())
    }

    fn ship(&self, f: &mut Formatter<'_>, ship: &Ship) -> fmt::Result {
        let place = match ship.status {
            ShipStatus::UnderConstruction => format!(
                "under construction at {} #{}, {} still owed",
                ship.coords, ship.orbit, ship.remaining_cost
            ),
            ShipStatus::OnSurface => format!("landed at {} #{}", ship.coords, ship.orbit),
            ShipStatus::InOrbit => format!("orbiting {} #{}", ship.coords, ship.orbit),
            ShipStatus::InDeepSpace => format!("in deep space at {}", ship.coords),
            ShipStatus::JumpedInCombat | ShipStatus::ForcedJump => {
                format!("forced out of {}", ship.coords)
            }
        };
        write!(f, "{}: {place}, age {}", ship.full_name(), ship.age)?;
        if ship.inventory.is_empty() {
            writeln!(f)
        } else {
            writeln!(
                f,
                ", carrying {} of {}",
                cargo(ship.inventory.iter()),
                ship.capacity()
            )
        }
    }
}

fn cargo(items: impl Iterator<Item = (Item, i32)>) -> String {
    items
        .map(|(item, amount)| format!("{amount} {item}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for ReportView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let species = self.species;
        writeln!(
            f,
            "Turn {} report for species #{}, SP {}",
            self.galaxy.turn, species.id, species.name
        )?;
        writeln!(f, "Government: {} ({})", species.govt_name, species.govt_type)?;

        if !self.log.diagnostics.is_empty() {
            writeln!(f, "\nErrors in your orders:")?;
            for diagnostic in &self.log.diagnostics {
                writeln!(f, "{diagnostic}")?;
            }
        }

        for phase in Phase::iter() {
            let mut events = self.log.events_in(phase).peekable();
            if events.peek().is_none() {
                continue;
            }
            writeln!(f, "\n{phase}:")?;
            for event in events {
                writeln!(f, "  {event}")?;
            }
        }

        writeln!(f, "\nEconomic units: {}", species.econ_units)?;
        writeln!(
            f,
            "Fleet maintenance: {} ({}.{:02}% of production)",
            species.fleet_cost,
            species.fleet_percent_cost / 100,
            species.fleet_percent_cost % 100
        )?;

        writeln!(f, "\nTech levels:")?;
        for tech in Tech::iter() {
            writeln!(
                f,
                "  {tech}: {} (knowledge {}, experience {})",
                species.tech_levels.get(tech),
                species.tech_knowledge.get(tech),
                species.tech_eps[tech.index()]
            )?;
        }

        writeln!(f, "\nContacts: {}", self.names(&species.contacts))?;
        writeln!(f, "Allies: {}", self.names(&species.allies))?;
        writeln!(f, "Enemies: {}", self.names(&species.enemies))?;

        writeln!(f, "\nPlanets:")?;
        for colony in &species.colonies {
            self.colony(f, colony)?;
        }

        if !species.ships.is_empty() {
            writeln!(f, "\nShips:")?;
            for ship in &species.ships {
                self.ship(f, ship)?;
            }
        }

        if !self.sightings.is_empty() {
            writeln!(f, "\nAliens:")?;
            for sighting in &self.sightings {
                match sighting {
                    Sighting::Colony {
                        species,
                        name,
                        coords,
                        orbit,
                        base,
                    } => writeln!(
                        f,
                        "  SP {}: PL {name} at {coords} #{orbit}, economic base {}.{}",
                        self.name_of(*species),
                        base / 10,
                        base % 10
                    )?,
                    Sighting::Ship {
                        species,
                        name,
                        coords,
                        orbit,
                    } => writeln!(
                        f,
                        "  SP {}: {name} at {coords} #{orbit}",
                        self.name_of(*species)
                    )?,
                }
            }
        }

        if !self.log.messages.is_empty() {
            writeln!(f, "\nMessages:")?;
            for message in &self.log.messages {
                writeln!(f, "From SP {}:", self.name_of(message.from))?;
                writeln!(f, "{}", message.text)?;
            }
        }
        Ok(())
    }
}

/// Orders for next turn that keep things ticking over
///
/// Transports shuttling between a loading and an unloading point are sent on
/// their next leg, and every producing colony gets a production center with
/// its expected budget noted.
pub fn default_orders(galaxy: &Galaxy, species: &Species) -> String {
    let mut out = String::new();
    for section in Section::iter() {
        // writing to a String can't fail
        let _ = writeln!(out, "START {section}");
        match section {
            Section::PreDeparture => {
                for ship in &species.ships {
                    if at_point(species, ship, ship.unloading_point) && !ship.inventory.is_empty() {
                        let _ = writeln!(out, "UNLOAD {}", ship.full_name());
                    }
                }
            }
            Section::Jumps => {
                for ship in species.ships.iter().filter(|ship| ship.can_jump()) {
                    let leg = if ship.inventory.is_empty() {
                        ship.loading_point
                    } else {
                        ship.unloading_point
                    };
                    let destination = leg.and_then(|point| species.colonies.get(point.index()));
                    match destination {
                        Some(colony) if !ship.is_at(colony.coords, colony.orbit) => {
                            let _ = writeln!(out, "JUMP {}, PL {}", ship.full_name(), colony.name);
                        }
                        _ => {
                            let _ = writeln!(out, "; JUMP {}, x y z", ship.full_name());
                        }
                    }
                }
            }
            Section::Production => {
                for (index, colony) in species.colonies.iter().enumerate() {
                    if !colony.is_producing() {
                        continue;
                    }
                    let output = colony_yield(species, &galaxy.planets, colony);
                    let mut budget = output
                        .raw_material
                        .saturating_add(colony.inventory.get(Item::RM))
                        .min(output.capacity);
                    if index == 0 {
                        budget += species.econ_units;
                    }
                    let _ = writeln!(out, "PRODUCTION PL {}", colony.name);
                    let _ = writeln!(out, "; about {budget} economic units available");
                }
            }
            Section::Combat | Section::PostArrival | Section::Strikes => {}
        }
        let _ = writeln!(out, "END\n");
    }
    out
}

fn at_point(species: &Species, ship: &Ship, point: Option<PlanetRef>) -> bool {
    point
        .and_then(|point| species.colonies.get(point.index()))
        .is_some_and(|colony| ship.is_at(colony.coords, colony.orbit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Coords,
        order::parse,
        ship::{ShipClass, ShipType},
        tests::{galaxy, id},
        turn::ReceivedMessage,
    };

    fn transport(galaxy: &mut Galaxy) {
        let species = galaxy.species.get_mut(&id(1)).expect("species 1");
        species
            .colonies
            .push(Colony::new("Outpost".to_string(), Coords::new(10, 10, 10), 3, 2));
        let mut mule = Ship::new(
            "Mule".to_string(),
            ShipClass::TR,
            ShipType::Ftl,
            10,
            Coords::new(10, 10, 10),
            1,
        );
        mule.loading_point = Some(PlanetRef::HOME);
        mule.unloading_point = Some(PlanetRef(1));
        mule.inventory.add(Item::CU, 20);
        species.ships.push(mule);
    }

    #[test]
    fn default_orders_parse_cleanly() {
        let mut galaxy = galaxy();
        transport(&mut galaxy);
        let species = &galaxy.species[&id(1)];
        let orders = default_orders(&galaxy, species);
        assert!(orders.contains("JUMP TR10 Mule, PL Outpost"));
        assert!(orders.contains("PRODUCTION PL Home1\n; about 233 economic units available"));

        let parsed = parse(orders.as_bytes());
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.tree.sections.len(), 6);
    }

    #[test]
    fn report_blocks() {
        let mut galaxy = galaxy();
        transport(&mut galaxy);
        let locations = Locations::compute(&galaxy);
        let mut log = SpeciesLog::default();
        log.event(Phase::Jumps, "TR10 Mule jumped.");
        log.messages.push(ReceivedMessage {
            from: id(2),
            text: "Hello there".to_string(),
        });
        let report = render(&galaxy, &locations, id(1), &log).expect("species exists");
        let text = &report.text;
        assert!(text.starts_with("Turn 5 report for species #1, SP Species1"));
        assert!(text.contains("\nJumps:\n  TR10 Mule jumped.\n"));
        assert!(text.contains("PL Outpost at 10 10 10 #3"));
        assert!(text.contains("TR10 Mule: orbiting 10 10 10 #1, age 0, carrying 20 CU of 150"));
        assert!(text.contains("From SP Species2:\nHello there"));
        assert!(!text.contains("Aliens:"));
        assert!(text.ends_with(&format!("Orders for next turn:\n\n{}", report.orders)));
        assert!(render(&galaxy, &locations, id(9), &log).is_none());
    }
}
