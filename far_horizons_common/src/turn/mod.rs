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

//! The turn: a fixed sequence of phases applied to a copy of the galaxy
//!
//! Species go through every phase in ascending order of species number, and
//! each phase finishes for every species before the next begins. Player
//! mistakes end up in the species' report; only broken data stops a turn.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use thiserror::Error;
use tracing::{debug, error, info, info_span};

use crate::{
    DataError, Galaxy, SpeciesId,
    codec::ByteOrder,
    colony::ColonyStatus,
    location::Locations,
    order::{Diagnostic, Order, OrderError, OrderTree, Section, ShipName, parse_all},
    prng::Prng,
    report::{self, Report},
    ship::TurnAnnotation,
    species::Species,
};

mod combat;
mod finish;
mod jump;
mod logistics;
mod production;

pub use jump::FORCED_JUMP_NOTICE;

/// Settings for running turns
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TurnConfig {
    /// Global random seed; each species' generator is derived from it
    pub seed: u64,
    /// Byte order of the save files
    pub byte_order: ByteOrder,
    /// Run automatic orders even for species that haven't asked for them
    pub auto_default: bool,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            seed: Prng::DEFAULT_SEED,
            byte_order: ByteOrder::default(),
            auto_default: false,
        }
    }
}

/// Phases of a turn, in order
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter)]
pub enum Phase {
    /// Validation, order parsing, per-turn resets
    NoOrders,
    /// Battles declared in COMBAT
    Combat,
    /// PRE-DEPARTURE orders and automatic unloading and installing
    PreDeparture,
    /// Movement
    Jumps,
    /// Spending
    Production,
    /// POST-ARRIVAL orders
    PostArrival,
    /// Battles declared in STRIKES
    Strike,
    /// Construction, research, ageing, bookkeeping
    Finish,
    /// Reports
    Report,
}

impl Phase {
    /// The phase after this one
    pub fn next(self) -> Option<Self> {
        use Phase::*;
        match self {
            NoOrders => Some(Combat),
            Combat => Some(PreDeparture),
            PreDeparture => Some(Jumps),
            Jumps => Some(Production),
            Production => Some(PostArrival),
            PostArrival => Some(Strike),
            Strike => Some(Finish),
            Finish => Some(Report),
            Report => None,
        }
    }

    /// The order section the phase carries out
    pub fn section(self) -> Option<Section> {
        match self {
            Self::Combat => Some(Section::Combat),
            Self::PreDeparture => Some(Section::PreDeparture),
            Self::Jumps => Some(Section::Jumps),
            Self::Production => Some(Section::Production),
            Self::PostArrival => Some(Section::PostArrival),
            Self::Strike => Some(Section::Strikes),
            Self::NoOrders | Self::Finish | Self::Report => None,
        }
    }
}

/// Why a turn couldn't be run
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    /// The galaxy is broken
    #[error(transparent)]
    Data(#[from] DataError),
    /// Stepping a turn that has already finished
    #[error("the turn has already finished its {phase} phase")]
    PhaseOutOfOrder {
        /// Last phase run
        phase: Phase,
    },
    /// Orders for a species that isn't in the galaxy
    #[error("orders were given for species {species}, which does not exist")]
    UnknownSpecies {
        /// Species number on the orders
        species: SpeciesId,
    },
}

/// Something that happened to a species during a phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// When
    pub phase: Phase,
    /// What, in words
    pub text: String,
}

/// A message from another species
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Sender
    pub from: SpeciesId,
    /// Text
    pub text: String,
}

/// Everything a species will be told about its turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpeciesLog {
    /// Rejected order lines
    pub diagnostics: Vec<Diagnostic>,
    /// What happened, phase by phase
    pub events: Vec<Event>,
    /// Messages received
    pub messages: Vec<ReceivedMessage>,
}

impl SpeciesLog {
    /// Record an event
    pub fn event(&mut self, phase: Phase, text: impl Into<String>) {
        self.events.push(Event {
            phase,
            text: text.into(),
        });
    }

    /// Record an order that couldn't be carried out
    pub fn reject(&mut self, order: &Order, error: OrderError) {
        tracing::warn!(line = order.line, %error, "order rejected");
        self.diagnostics.push(Diagnostic::for_order(order, error));
    }

    /// Events of one phase
    pub fn events_in(&self, phase: Phase) -> impl Iterator<Item = &str> {
        self.events
            .iter()
            .filter(move |event| event.phase == phase)
            .map(|event| event.text.as_str())
    }
}

/// The result of a turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The galaxy after the turn
    pub galaxy: Galaxy,
    /// One report per species
    pub reports: BTreeMap<SpeciesId, Report>,
    /// What each species was told, for callers that render their own reports
    pub logs: BTreeMap<SpeciesId, SpeciesLog>,
}

/// A turn in progress
///
/// Works on its own copy of the galaxy, so the caller's galaxy is untouched
/// whether or not the turn succeeds.
#[derive(Debug)]
pub struct Turn {
    phase: Phase,
    complete: bool,
    config: TurnConfig,
    galaxy: Galaxy,
    texts: BTreeMap<SpeciesId, Vec<u8>>,
    orders: BTreeMap<SpeciesId, OrderTree>,
    logs: BTreeMap<SpeciesId, SpeciesLog>,
    rngs: BTreeMap<SpeciesId, Prng>,
    locations: Locations,
    reports: BTreeMap<SpeciesId, Report>,
}

impl Turn {
    /// Prepare a turn from the galaxy and each species' raw order text
    pub fn new(
        galaxy: &Galaxy,
        texts: &BTreeMap<SpeciesId, Vec<u8>>,
        config: TurnConfig,
    ) -> Result<Self, TurnError> {
        if let Some(&species) = texts.keys().find(|id| !galaxy.species.contains_key(id)) {
            return Err(TurnError::UnknownSpecies { species });
        }
        Ok(Self {
            phase: Phase::NoOrders,
            complete: false,
            config,
            galaxy: galaxy.clone(),
            texts: texts.clone(),
            orders: BTreeMap::new(),
            logs: BTreeMap::new(),
            rngs: BTreeMap::new(),
            locations: Locations::default(),
            reports: BTreeMap::new(),
        })
    }

    /// The phase the next [`Turn::step`] will run
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether every phase has run
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The galaxy as the phases so far have left it
    pub fn galaxy(&self) -> &Galaxy {
        &self.galaxy
    }

    /// What a species has been told so far
    pub fn log(&self, species: SpeciesId) -> Option<&SpeciesLog> {
        self.logs.get(&species)
    }

    /// Run the current phase and move on to the next; returns the phase run
    pub fn step(&mut self) -> Result<Phase, TurnError> {
        if self.complete {
            return Err(TurnError::PhaseOutOfOrder { phase: self.phase });
        }
        let phase = self.phase;
        let span = info_span!("phase", name = %phase);
        let _guard = span.enter();
        info!(species = self.galaxy.species.len(), "starting");

        match phase {
            Phase::NoOrders => self.no_orders()?,
            Phase::Combat => combat::run(self, Section::Combat, Phase::Combat),
            Phase::PreDeparture => logistics::pre_departure(self),
            Phase::Jumps => jump::run(self),
            Phase::Production => production::run(self),
            Phase::PostArrival => logistics::post_arrival(self),
            Phase::Strike => combat::run(self, Section::Strikes, Phase::Strike),
            Phase::Finish => finish::run(self),
            Phase::Report => self.report(),
        }

        match phase.next() {
            Some(next) => self.phase = next,
            None => self.complete = true,
        }
        Ok(phase)
    }

    /// Run every remaining phase
    pub fn run(mut self) -> Result<TurnOutcome, TurnError> {
        while !self.complete {
            self.step()?;
        }
        Ok(TurnOutcome {
            galaxy: self.galaxy,
            reports: self.reports,
            logs: self.logs,
        })
    }

    fn no_orders(&mut self) -> Result<(), TurnError> {
        if let Err(e) = self.galaxy.validate() {
            error!(%e, "galaxy failed validation");
            return Err(e.into());
        }

        for species in self.galaxy.species.values_mut() {
            for ship in &mut species.ships {
                ship.annotation = TurnAnnotation::Idle;
            }
            for colony in &mut species.colonies {
                colony.status.remove(ColonyStatus::HIDING);
            }
        }

        let parsed = parse_all(&self.texts);
        for &id in self.galaxy.species.keys() {
            let parsed = parsed.get(&id).cloned().unwrap_or_default();
            self.orders.insert(id, parsed.tree);
            self.logs.entry(id).or_default().diagnostics = parsed.diagnostics;
            self.rngs.insert(id, Prng::for_species(self.config.seed, id));
        }
        self.locations = Locations::compute(&self.galaxy);
        Ok(())
    }

    fn report(&mut self) {
        for &id in self.galaxy.species.keys() {
            let log = self.logs.entry(id).or_default();
            if let Some(report) = report::render(&self.galaxy, &self.locations, id, log) {
                self.reports.insert(id, report);
            }
        }
    }

    /// Orders a species gave for a section
    fn orders_for(&self, species: SpeciesId, section: Section) -> Vec<Order> {
        self.orders
            .get(&species)
            .map(|tree| tree.orders(section).to_vec())
            .unwrap_or_default()
    }

    fn log_mut(&mut self, species: SpeciesId) -> &mut SpeciesLog {
        self.logs.entry(species).or_default()
    }

    fn auto_orders(&self, species: &Species) -> bool {
        species.auto_orders || self.config.auto_default
    }

    /// Run `f` on one species with the rest of the galaxy readable alongside
    ///
    /// The species is taken out of the galaxy for the duration, so `f` sees
    /// every other species but not this one.
    fn with_species<R>(
        &mut self,
        id: SpeciesId,
        phase: Phase,
        f: impl FnOnce(&mut Species, Scope<'_>) -> R,
    ) -> Option<R> {
        let mut species = self.galaxy.species.remove(&id)?;
        let auto = self.auto_orders(&species);
        let seed = self.config.seed;
        let scope = Scope {
            id,
            phase,
            auto,
            galaxy: &self.galaxy,
            locations: &self.locations,
            log: self.logs.entry(id).or_default(),
            rng: self
                .rngs
                .entry(id)
                .or_insert_with(|| Prng::for_species(seed, id)),
        };
        let result = f(&mut species, scope);
        self.galaxy.species.insert(id, species);
        Some(result)
    }

    fn species_ids(&self) -> Vec<SpeciesId> {
        self.galaxy.species.keys().copied().collect()
    }
}

/// What a phase sees while working on one species
struct Scope<'a> {
    id: SpeciesId,
    phase: Phase,
    auto: bool,
    galaxy: &'a Galaxy,
    locations: &'a Locations,
    log: &'a mut SpeciesLog,
    rng: &'a mut Prng,
}

impl Scope<'_> {
    fn event(&mut self, text: impl Into<String>) {
        self.log.event(self.phase, text);
    }

    /// Record the outcome of one order
    fn outcome(&mut self, order: &Order, result: Result<String, OrderError>) {
        match result {
            Ok(text) => {
                debug!(species = %self.id, line = order.line, command = %order.command, "order carried out");
                self.event(text);
            }
            Err(error) => self.log.reject(order, error),
        }
    }

    fn species_name(&self, id: SpeciesId) -> String {
        self.galaxy
            .species(id)
            .map_or_else(|| format!("species {id}"), |species| species.name.clone())
    }
}

/// Run a whole turn
pub fn process_turn(
    galaxy: &Galaxy,
    texts: &BTreeMap<SpeciesId, Vec<u8>>,
    config: &TurnConfig,
) -> Result<TurnOutcome, TurnError> {
    Turn::new(galaxy, texts, config.clone())?.run()
}

/// Reject an order given in the wrong section
fn check_section(order: &Order, section: Section) -> Result<(), OrderError> {
    if order.command.allowed_in(section) {
        Ok(())
    } else {
        Err(OrderError::WrongSection {
            command: order.command,
            section,
        })
    }
}

/// Find one of the species' ships by its name as written in an order
fn find_ship(species: &Species, name: &ShipName) -> Result<usize, OrderError> {
    species
        .ship_by_name(&name.name)
        .filter(|&index| species.ships[index].class == name.class)
        .ok_or_else(|| OrderError::UnknownShip(name.to_string()))
}

/// Find one of the species' colonies by name
fn find_colony(species: &Species, name: &str) -> Result<usize, OrderError> {
    species
        .colony_by_name(name)
        .ok_or_else(|| OrderError::UnknownColony(name.to_string()))
}

/// Find another species by name
fn find_species(galaxy: &Galaxy, name: &str) -> Result<SpeciesId, OrderError> {
    galaxy
        .species
        .iter()
        .find(|(_, species)| species.name.eq_ignore_ascii_case(name))
        .map(|(&id, _)| id)
        .ok_or_else(|| OrderError::UnknownSpecies(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::ByteOrder,
        tests::{galaxy, id},
    };

    #[test]
    fn phases_run_in_order_then_stop() {
        let galaxy = galaxy();
        let mut turn = Turn::new(&galaxy, &BTreeMap::new(), TurnConfig::default()).expect("turn");
        let mut ran = Vec::new();
        while !turn.is_complete() {
            ran.push(turn.step().expect("phase runs"));
        }
        assert_eq!(
            ran,
            vec![
                Phase::NoOrders,
                Phase::Combat,
                Phase::PreDeparture,
                Phase::Jumps,
                Phase::Production,
                Phase::PostArrival,
                Phase::Strike,
                Phase::Finish,
                Phase::Report,
            ]
        );
        assert_eq!(
            turn.step(),
            Err(TurnError::PhaseOutOfOrder {
                phase: Phase::Report
            })
        );
    }

    #[test]
    fn input_galaxy_is_untouched() {
        let galaxy = galaxy();
        let outcome = process_turn(&galaxy, &BTreeMap::new(), &TurnConfig::default()).expect("turn");
        assert_eq!(galaxy.turn, 5);
        assert_eq!(outcome.galaxy.turn, 6);
        assert_eq!(outcome.reports.len(), 2);
    }

    #[test]
    fn orders_for_missing_species_are_refused() {
        let galaxy = galaxy();
        let texts = BTreeMap::from([(id(7), b"START JUMPS\nEND\n".to_vec())]);
        assert_eq!(
            Turn::new(&galaxy, &texts, TurnConfig::default()).err(),
            Some(TurnError::UnknownSpecies { species: id(7) })
        );
    }

    #[test]
    fn broken_galaxy_aborts_the_turn() {
        let mut galaxy = galaxy();
        galaxy
            .species
            .get_mut(&id(1))
            .expect("species 1")
            .colonies
            .clear();
        assert_eq!(
            process_turn(&galaxy, &BTreeMap::new(), &TurnConfig::default()).err(),
            Some(TurnError::Data(DataError::MissingHomeworld { species: id(1) }))
        );
    }

    #[test]
    fn wrong_section_is_reported() {
        let galaxy = galaxy();
        let texts = BTreeMap::from([(id(1), b"START JUMPS\nBUILD 5 CU\nEND\n".to_vec())]);
        let outcome = process_turn(&galaxy, &texts, &TurnConfig::default()).expect("turn");
        let log = &outcome.logs[&id(1)];
        assert_eq!(log.diagnostics.len(), 1);
        assert_eq!(log.diagnostics[0].line, 2);
    }

    #[test]
    fn config_defaults() {
        let config = TurnConfig::default();
        assert_eq!(config.seed, Prng::DEFAULT_SEED);
        assert_eq!(config.byte_order, ByteOrder::Little);
    }
}
