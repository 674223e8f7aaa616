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

//! Splitting order text into lines and tokens

use std::str::FromStr;

use crate::{
    Coords,
    item::Item,
    order::{Arg, Command, ParseIssue, Section, ShipName},
    ship::ShipClass,
    species::Tech,
};

/// Split raw order bytes into lines
///
/// CR, LF, CR LF and LF CR each end one line. Each run of bytes that isn't
/// valid UTF-8 becomes a single U+FFFD.
pub fn normalize(bytes: &[u8]) -> Vec<String> {
    let mut text = String::with_capacity(bytes.len());
    let mut after_invalid = false;
    for chunk in bytes.utf8_chunks() {
        let valid = chunk.valid();
        if !valid.is_empty() {
            text.push_str(valid);
            after_invalid = false;
        }
        if !chunk.invalid().is_empty() && !after_invalid {
            text.push(char::REPLACEMENT_CHARACTER);
            after_invalid = true;
        }
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' | '\n' => {
                let partner = if c == '\r' { '\n' } else { '\r' };
                if chars.peek() == Some(&partner) {
                    chars.next();
                }
                lines.push(std::mem::take(&mut line));
            }
            c => line.push(c),
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Everything before a `;`
pub(crate) fn strip_comment(line: &str) -> &str {
    line.split_once(';').map_or(line, |(code, _)| code)
}

/// How a line begins
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LineStart<'a> {
    /// Nothing but whitespace
    Blank,
    /// `START` and a section name, or the name that wasn't recognised
    Start(Result<Section, String>),
    /// `END`
    End,
    /// A command keyword and the rest of the line
    Command(Command, &'a str),
    /// Arguments continuing the previous line's order
    Arguments(&'a str),
    /// Anything else; holds the first word
    Unknown(String),
}

/// Work out what a line (comment already stripped) starts with
pub(crate) fn classify(line: &str) -> LineStart<'_> {
    let line = line.trim();
    let (word, rest) = split_word(line);
    if word.is_empty() {
        return LineStart::Blank;
    }
    if word.eq_ignore_ascii_case("START") {
        let (name, _) = split_word(rest.trim_start());
        return LineStart::Start(Section::from_str(name).map_err(|_| name.to_string()));
    }
    if word.eq_ignore_ascii_case("END") {
        return LineStart::End;
    }
    if let Ok(command) = Command::from_str(word) {
        return LineStart::Command(command, rest);
    }
    if starts_argument(word, rest) {
        return LineStart::Arguments(line);
    }
    LineStart::Unknown(word.to_string())
}

/// Read a run of arguments, stopping at the first that can't be read
pub(crate) fn arguments(text: &str) -> Result<Vec<Arg>, ParseIssue> {
    let mut args = Vec::new();
    let mut numbers: Vec<Number<'_>> = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start_matches(separator);
        let (word, after) = split_word(rest);
        if word.is_empty() {
            break;
        }

        if let Some(number) = Number::read(word) {
            numbers.push(number);
            rest = after;
            continue;
        }
        flush_numbers(&mut numbers, &mut args)?;

        if word.eq_ignore_ascii_case("SP") || word.eq_ignore_ascii_case("PL") {
            let (name, after) = split_name(after);
            if name.is_empty() {
                return Err(ParseIssue::UnknownArgument(word.to_string()));
            }
            args.push(if word.eq_ignore_ascii_case("SP") {
                Arg::Species(name.to_string())
            } else {
                Arg::Planet(name.to_string())
            });
            rest = after;
        } else if let Ok(item) = Item::from_str(word) {
            args.push(Arg::Item(item));
            rest = after;
        } else if let Ok(tech) = Tech::from_str(word) {
            args.push(Arg::Tech(tech));
            rest = after;
        } else if let Some((class, tonnage, sublight)) = ship_prefix(word) {
            let (name, after) = split_name(after);
            if name.is_empty() {
                return Err(ParseIssue::UnknownArgument(word.to_string()));
            }
            args.push(Arg::Ship(ShipName {
                class,
                tonnage,
                sublight,
                name: name.to_string(),
            }));
            rest = after;
        } else {
            return Err(ParseIssue::UnknownArgument(word.to_string()));
        }
    }
    flush_numbers(&mut numbers, &mut args)?;
    Ok(args)
}

fn separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn split_word(text: &str) -> (&str, &str) {
    let end = text.find(separator).unwrap_or(text.len());
    text.split_at(end)
}

/// A name runs to the next comma or the end of the line
fn split_name(text: &str) -> (&str, &str) {
    let end = text.find(',').unwrap_or(text.len());
    let (name, rest) = text.split_at(end);
    (name.trim(), rest)
}

fn starts_argument(word: &str, rest: &str) -> bool {
    Number::read(word).is_some()
        || word.eq_ignore_ascii_case("SP")
        || word.eq_ignore_ascii_case("PL")
        || Item::from_str(word).is_ok()
        || Tech::from_str(word).is_ok()
        || (ship_prefix(word).is_some() && !rest.trim().is_empty())
}

/// Class, tonnage and sub-light flag of a ship name's first word
fn ship_prefix(word: &str) -> Option<(ShipClass, Option<i16>, bool)> {
    let class = ShipClass::from_str(word.get(..2)?).ok()?;
    let mut suffix = &word[2..];
    let mut sublight = false;
    let mut tonnage = None;
    for _ in 0..2 {
        let digits = suffix.len() - suffix.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 && tonnage.is_none() {
            tonnage = Some(suffix[..digits].parse().ok()?);
            suffix = &suffix[digits..];
        }
        if !sublight && suffix.starts_with(['S', 's']) {
            sublight = true;
            suffix = &suffix[1..];
        }
    }
    suffix.is_empty().then_some((class, tonnage, sublight))
}

/// A word of a run of numbers
#[derive(Debug, Clone, Copy)]
struct Number<'a> {
    word: &'a str,
    value: i64,
    orbit_mark: bool,
}

impl<'a> Number<'a> {
    fn read(word: &'a str) -> Option<Self> {
        let (digits, orbit_mark) = match word.strip_prefix('#') {
            Some(digits) => (digits, true),
            None => (word, false),
        };
        let unsigned = digits.strip_prefix('-').unwrap_or(digits);
        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            word,
            value: digits.parse().unwrap_or(i64::MAX),
            orbit_mark,
        })
    }
}

/// Turn a run of numbers into arguments
///
/// Three numbers are a system; three and an orbit are a planet. Anything
/// else is plain numbers, and an orbit mark out of place is an error.
fn flush_numbers(numbers: &mut Vec<Number<'_>>, args: &mut Vec<Arg>) -> Result<(), ParseIssue> {
    let run = std::mem::take(numbers);
    if let Some(bad) = run.iter().find(|n| n.value < 0 || n.value == i64::MAX) {
        return Err(ParseIssue::UnknownArgument(bad.word.to_string()));
    }
    let coords = |run: &[Number<'_>]| -> Option<Coords> {
        let axis = |n: &Number<'_>| (!n.orbit_mark).then(|| u8::try_from(n.value).ok()).flatten();
        Some(Coords::new(axis(&run[0])?, axis(&run[1])?, axis(&run[2])?))
    };

    match run.len() {
        3 => {
            if let Some(coords) = coords(&run) {
                args.push(Arg::System(coords));
                return Ok(());
            }
        }
        4 => {
            let orbit = u8::try_from(run[3].value).ok();
            if let (Some(coords), Some(orbit)) = (coords(&run), orbit) {
                args.push(Arg::PlanetCoords(coords, orbit));
                return Ok(());
            }
        }
        _ => {}
    }
    if let Some(stray) = run.iter().find(|n| n.orbit_mark) {
        return Err(ParseIssue::UnknownArgument(stray.word.to_string()));
    }
    args.extend(run.iter().map(|n| Arg::Number(n.value)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_line_break_style_counts_once() {
        let lines = normalize(b"a\r\nb\n\rc\rd\ne");
        assert_eq!(lines, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(normalize(b"a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn invalid_bytes_become_one_placeholder() {
        let lines = normalize(b"JUMP \xff\xfe\xfd TR1 Sam\n\xc3");
        assert_eq!(lines, vec!["JUMP \u{FFFD} TR1 Sam", "\u{FFFD}"]);
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(strip_comment("JUMP TR1 Sam ; go"), "JUMP TR1 Sam ");
        assert_eq!(classify(strip_comment("   ; just a comment")), LineStart::Blank);
    }

    #[test]
    fn line_starts() {
        assert_eq!(classify("start jumps"), LineStart::Start(Ok(Section::Jumps)));
        assert_eq!(
            classify("START NOWHERE"),
            LineStart::Start(Err("NOWHERE".to_string()))
        );
        assert_eq!(classify("End"), LineStart::End);
        assert_eq!(
            classify("jump TR1 Sam, 1 2 3"),
            LineStart::Command(Command::Jump, " TR1 Sam, 1 2 3")
        );
        assert_eq!(classify("10 CU"), LineStart::Arguments("10 CU"));
        assert_eq!(classify("FROB it"), LineStart::Unknown("FROB".to_string()));
    }

    #[test]
    fn coordinates_and_numbers() {
        assert_eq!(
            arguments("1 2 3"),
            Ok(vec![Arg::System(Coords::new(1, 2, 3))])
        );
        assert_eq!(
            arguments("1 2 3 4"),
            Ok(vec![Arg::PlanetCoords(Coords::new(1, 2, 3), 4)])
        );
        assert_eq!(
            arguments("1 2 3 #4, PL Haven"),
            Ok(vec![
                Arg::PlanetCoords(Coords::new(1, 2, 3), 4),
                Arg::Planet("Haven".to_string())
            ])
        );
        assert_eq!(
            arguments("50, 50"),
            Ok(vec![Arg::Number(50), Arg::Number(50)])
        );
        assert_eq!(
            arguments("1000 2 3"),
            Ok(vec![Arg::Number(1000), Arg::Number(2), Arg::Number(3)])
        );
    }

    #[test]
    fn names_run_to_comma() {
        assert_eq!(
            arguments("TR10 Big Mule, SP Klingons , 5 iu"),
            Ok(vec![
                Arg::Ship(ShipName {
                    class: ShipClass::TR,
                    tonnage: Some(10),
                    sublight: false,
                    name: "Big Mule".to_string(),
                }),
                Arg::Species("Klingons".to_string()),
                Arg::Number(5),
                Arg::Item(Item::IU),
            ])
        );
    }

    #[test]
    fn ship_prefixes() {
        assert_eq!(ship_prefix("DD"), Some((ShipClass::DD, None, false)));
        assert_eq!(ship_prefix("DDS"), Some((ShipClass::DD, None, true)));
        assert_eq!(ship_prefix("TR10"), Some((ShipClass::TR, Some(10), false)));
        assert_eq!(ship_prefix("BAS12"), Some((ShipClass::BA, Some(12), true)));
        assert_eq!(ship_prefix("TR10S"), Some((ShipClass::TR, Some(10), true)));
        assert_eq!(ship_prefix("TRX"), None);
        assert_eq!(ship_prefix("ZZ1"), None);
    }

    #[test]
    fn bad_arguments() {
        assert_eq!(
            arguments("TR1 Sam, -5 2 3"),
            Err(ParseIssue::UnknownArgument("-5".to_string()))
        );
        assert_eq!(
            arguments("wibble"),
            Err(ParseIssue::UnknownArgument("wibble".to_string()))
        );
        assert_eq!(
            arguments("PL"),
            Err(ParseIssue::UnknownArgument("PL".to_string()))
        );
        assert_eq!(
            arguments("5 #2"),
            Err(ParseIssue::UnknownArgument("#2".to_string()))
        );
    }
}
