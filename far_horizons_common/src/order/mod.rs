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

//! Orders given by players
//!
//! Players write orders as free-form text. [`parse`] turns that text into an
//! [`OrderTree`] of sections holding orders, keeping whatever it can and
//! describing the rest as [`Diagnostic`]s.

use std::{collections::BTreeMap, fmt};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::{Coords, SpeciesId, item::Item, ship::ShipClass, species::Tech};

mod token;
mod tree;

pub use token::normalize;
pub use tree::parse;

/// Sections of an order file, in the order the turn runs them
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE", ascii_case_insensitive)]
pub enum Section {
    /// Battles before movement
    Combat,
    /// Housekeeping before ships move
    PreDeparture,
    /// Ship movement
    Jumps,
    /// Spending
    Production,
    /// Housekeeping after ships arrive
    PostArrival,
    /// Battles after movement
    #[strum(to_string = "STRIKES", serialize = "STRIKE")]
    Strikes,
}

/// Order keywords
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum Command {
    Auto,
    Ally,
    Enemy,
    Neutral,
    Name,
    Disband,
    Install,
    Unload,
    Load,
    Land,
    Orbit,
    Deep,
    Message,
    Send,
    Scan,
    Hide,
    Transfer,
    Jump,
    Move,
    #[strum(to_string = "PJUMP")]
    PJump,
    Visited,
    Wormhole,
    Production,
    Build,
    Develop,
    Recycle,
    Research,
    Shipyard,
    Estimate,
    Upgrade,
    Battle,
    Attack,
    Engage,
    Withdraw,
    Haven,
    Summary,
}

impl Command {
    /// Sections the command may be given in
    pub fn sections(self) -> &'static [Section] {
        use Command::*;
        use Section::*;
        match self {
            Auto | Ally | Enemy | Neutral | Name | Unload | Load | Land | Orbit | Deep
            | Message | Send | Scan | Transfer => &[PreDeparture, PostArrival],
            Disband | Install => &[PreDeparture],
            Hide => &[Combat, PreDeparture, Strikes],
            Jump | Move | PJump | Visited | Wormhole => &[Jumps],
            Command::Production
            | Build
            | Develop
            | Recycle
            | Research
            | Shipyard
            | Estimate
            | Upgrade => &[Section::Production],
            Battle | Attack | Engage | Withdraw | Haven | Summary => &[Combat, Strikes],
        }
    }

    /// Whether the command may be given in a section
    pub fn allowed_in(self, section: Section) -> bool {
        self.sections().contains(&section)
    }

    /// Whether the command opens a message block
    pub fn takes_message(self) -> bool {
        matches!(self, Self::Message | Self::Send)
    }
}

/// A ship as named in orders: `TR10 Mule`, `DD Hunter`, `BAS12 Base`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShipName {
    /// Hull class
    pub class: ShipClass,
    /// Tonnage, for classes built to order
    pub tonnage: Option<i16>,
    /// Whether the `S` suffix was given
    pub sublight: bool,
    /// The name proper
    pub name: String,
}

impl fmt::Display for ShipName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class.abbr())?;
        if let Some(tonnage) = self.tonnage {
            write!(f, "{tonnage}")?;
        }
        if self.sublight {
            write!(f, "S")?;
        }
        write!(f, " {}", self.name)
    }
}

/// An argument of an order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Item abbreviation
    Item(Item),
    /// Tech abbreviation
    Tech(Tech),
    /// `SP name`
    Species(String),
    /// `PL name`
    Planet(String),
    /// Ship name
    Ship(ShipName),
    /// `x y z`
    System(Coords),
    /// `x y z orbit` or `x y z #orbit`
    PlanetCoords(Coords, u8),
    /// Any other number
    Number(i64),
    /// Text of a message block
    Message(String),
}

/// One order and its arguments
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Order {
    /// Keyword
    pub command: Command,
    /// Arguments in the order written
    pub args: Vec<Arg>,
    /// Line number, counting from 1
    pub line: usize,
    /// The line as written
    pub text: String,
    /// Orders nested under a production center
    pub sub_orders: Vec<Order>,
}

impl Order {
    /// Ship arguments
    pub fn ships(&self) -> impl Iterator<Item = &ShipName> {
        self.args.iter().filter_map(|arg| match arg {
            Arg::Ship(ship) => Some(ship),
            _ => None,
        })
    }

    /// First ship argument
    pub fn ship(&self) -> Option<&ShipName> {
        self.ships().next()
    }

    /// Plain numbers; a system coordinate triple counts as three numbers
    pub fn numbers(&self) -> impl Iterator<Item = i64> + '_ {
        self.args.iter().flat_map(|arg| match *arg {
            Arg::Number(n) => vec![n],
            Arg::System(c) => vec![i64::from(c.x), i64::from(c.y), i64::from(c.z)],
            _ => Vec::new(),
        })
    }

    /// First number
    pub fn number(&self) -> Option<i64> {
        self.numbers().next()
    }

    /// First item argument
    pub fn item(&self) -> Option<Item> {
        self.args.iter().find_map(|arg| match *arg {
            Arg::Item(item) => Some(item),
            _ => None,
        })
    }

    /// First tech argument
    pub fn tech(&self) -> Option<Tech> {
        self.args.iter().find_map(|arg| match *arg {
            Arg::Tech(tech) => Some(tech),
            _ => None,
        })
    }

    /// First `SP` argument
    pub fn species_name(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            Arg::Species(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// First `PL` argument
    pub fn planet_name(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            Arg::Planet(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// First coordinates, with the orbit if one was given
    pub fn destination(&self) -> Option<(Coords, Option<u8>)> {
        self.args.iter().find_map(|arg| match *arg {
            Arg::System(coords) => Some((coords, None)),
            Arg::PlanetCoords(coords, orbit) => Some((coords, Some(orbit))),
            _ => None,
        })
    }

    /// Text of the message block
    pub fn message(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            Arg::Message(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Turn a missing argument into an error
    pub fn require<T>(value: Option<T>, what: &'static str) -> Result<T, OrderError> {
        value.ok_or(OrderError::MissingArgument(what))
    }
}

/// One section of an order file, merged over every time it was declared
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SectionNode {
    /// Which section
    pub section: Section,
    /// Orders in submission order
    pub orders: Vec<Order>,
}

/// A species' orders for one turn
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct OrderTree {
    /// Sections in the order first declared
    pub sections: Vec<SectionNode>,
}

impl OrderTree {
    /// A section, if it was declared
    pub fn section(&self, section: Section) -> Option<&SectionNode> {
        self.sections.iter().find(|node| node.section == section)
    }

    /// Orders of a section; empty if it wasn't declared
    pub fn orders(&self, section: Section) -> &[Order] {
        self.section(section)
            .map_or(&[], |node| node.orders.as_slice())
    }
}

/// Problems found while reading order text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    /// A line starting with something that isn't a command
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    /// An argument that couldn't be read
    #[error("unknown or invalid argument '{0}'")]
    UnknownArgument(String),
    /// An order before any START
    #[error("{0} given outside of any section")]
    OrderOutsideSection(Command),
    /// End of file inside a message block
    #[error("message not ended by a 'zzz' line")]
    UnterminatedMessage,
    /// END without START
    #[error("END without a matching START")]
    UnexpectedEnd,
    /// START with an unknown section name
    #[error("unknown section '{0}'")]
    UnknownSection(String),
}

/// Problems found while carrying out an order
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Command given in a section that doesn't take it
    #[error("{command} is not allowed in the {section} section")]
    WrongSection {
        /// The command
        command: Command,
        /// Where it was given
        section: Section,
    },
    /// A required argument wasn't given
    #[error("missing {0}")]
    MissingArgument(&'static str),
    /// No such ship
    #[error("you have no ship named {0}")]
    UnknownShip(String),
    /// No such colony
    #[error("you have no planet named {0}")]
    UnknownColony(String),
    /// No such species
    #[error("there is no species named {0}")]
    UnknownSpecies(String),
    /// No planet at the coordinates
    #[error("there is no planet at {coords} #{orbit}")]
    UnknownPlanet {
        /// System
        coords: Coords,
        /// Orbit
        orbit: u8,
    },
    /// A name already in use
    #[error("the name {0} is already in use")]
    NameTaken(String),
    /// Claiming a planet the species already holds
    #[error("you already have a colony at {coords} #{orbit}")]
    AlreadyColonized {
        /// System
        coords: Coords,
        /// Orbit
        orbit: u8,
    },
    /// No ships or colonies in the system
    #[error("you have nothing at {0}")]
    NoPresence(Coords),
    /// Not enough of an item
    #[error("only {have} {item} available, {wanted} wanted")]
    NotEnough {
        /// The item
        item: Item,
        /// Quantity available
        have: i32,
        /// Quantity wanted
        wanted: i32,
    },
    /// Ship hold full
    #[error("{0} has no room for more cargo")]
    NoCargoSpace(String),
    /// Ship isn't at one of the species' colonies
    #[error("{0} is not at one of your planets")]
    NotAtColony(String),
    /// Ship can't jump
    #[error("{ship} cannot jump: {reason}")]
    CannotJump {
        /// The ship
        ship: String,
        /// Why
        reason: &'static str,
    },
    /// Ship moved already this turn
    #[error("{0} has already jumped this turn")]
    AlreadyJumped(String),
    /// Sub-light move more than one parsec
    #[error("{0} can only move one parsec per axis")]
    TooFar(String),
    /// No wormhole where the ship is
    #[error("there is no wormhole at {0}")]
    NoWormhole(Coords),
    /// PJUMP without a usable jump portal
    #[error("{0} cannot act as a jump portal")]
    NoJumpPortal(String),
    /// VISITED with nowhere left
    #[error("there are no unvisited systems")]
    NothingUnvisited,
    /// Production order outside a production center
    #[error("no PRODUCTION order precedes this order")]
    NoProductionCenter,
    /// PRODUCTION naming a colony that can't produce
    #[error("{0} has no production")]
    NotProducing(String),
    /// Spending more than the budget
    #[error("costs {needed} but only {available} is available")]
    InsufficientFunds {
        /// Cost
        needed: i32,
        /// Budget left
        available: i32,
    },
    /// Tech level too low to build something
    #[error("needs {tech} level {needed}, you have {have}")]
    TechTooLow {
        /// Tech
        tech: Tech,
        /// Level needed
        needed: i16,
        /// Level held
        have: i16,
    },
    /// Building a ship without a shipyard
    #[error("{0} has no shipyard")]
    NoShipyard(String),
    /// Not enough population for colonists
    #[error("{colony} has only {available} population units, {needed} needed")]
    NoPopulation {
        /// Colony
        colony: String,
        /// Units needed
        needed: i32,
        /// Units available
        available: i32,
    },
    /// The homeworld can't be given this order
    #[error("this order cannot be given to your homeworld")]
    Homeworld,
    /// Value out of range
    #[error("{what} must be between {min} and {max}")]
    OutOfRange {
        /// Which value
        what: &'static str,
        /// Lowest allowed
        min: i64,
        /// Highest allowed
        max: i64,
    },
}

/// Why an order line was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// It couldn't be read
    Parse(ParseIssue),
    /// It couldn't be carried out
    Order(OrderError),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(issue) => issue.fmt(f),
            Self::Order(error) => error.fmt(f),
        }
    }
}

/// An order line echoed back to the player with what went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Line number, counting from 1
    pub line: usize,
    /// The line as written
    pub text: String,
    /// What went wrong
    pub reason: Reason,
}

impl Diagnostic {
    /// A diagnostic for an order that couldn't be carried out
    pub fn for_order(order: &Order, error: OrderError) -> Self {
        Self {
            line: order.line,
            text: order.text.clone(),
            reason: Reason::Order(error),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}\n    {}", self.line, self.text, self.reason)
    }
}

/// A parsed order file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedOrders {
    /// The orders that could be read
    pub tree: OrderTree,
    /// Lines that couldn't, in file order
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse every species' orders
///
/// Species don't share anything while parsing, so they're parsed in parallel.
pub fn parse_all(texts: &BTreeMap<SpeciesId, Vec<u8>>) -> BTreeMap<SpeciesId, ParsedOrders> {
    texts
        .par_iter()
        .map(|(&species, text)| (species, parse(text)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn section_names() {
        assert_eq!(Section::from_str("pre-departure"), Ok(Section::PreDeparture));
        assert_eq!(Section::from_str("POST-ARRIVAL"), Ok(Section::PostArrival));
        assert_eq!(Section::from_str("strike"), Ok(Section::Strikes));
        assert_eq!(Section::Strikes.to_string(), "STRIKES");
        assert_eq!(Section::PreDeparture.to_string(), "PRE-DEPARTURE");
    }

    #[test]
    fn command_sections() {
        assert_eq!(Command::from_str("pjump"), Ok(Command::PJump));
        assert_eq!(Command::PJump.to_string(), "PJUMP");
        assert!(Command::Jump.allowed_in(Section::Jumps));
        assert!(!Command::Jump.allowed_in(Section::PreDeparture));
        assert!(Command::Hide.allowed_in(Section::Combat));
        assert!(Command::Develop.allowed_in(Section::Production));
        assert_eq!(Command::Production.sections(), &[Section::Production]);
        assert_eq!(Command::Battle.sections(), &[Section::Combat, Section::Strikes]);
    }

    #[test]
    fn ship_names_print_like_orders() {
        let name = ShipName {
            class: ShipClass::TR,
            tonnage: Some(10),
            sublight: false,
            name: "Mule".to_string(),
        };
        assert_eq!(name.to_string(), "TR10 Mule");
    }
}
