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

//! Building the order tree

use tracing::warn;

use crate::order::{
    Arg, Command, Diagnostic, Order, OrderTree, ParseIssue, ParsedOrders, Reason, Section,
    SectionNode,
    token::{LineStart, arguments, classify, normalize, strip_comment},
};

/// Parse one species' order text
///
/// Never fails: lines that can't be read become diagnostics and parsing
/// carries on with the next line.
pub fn parse(text: &[u8]) -> ParsedOrders {
    let mut parser = Parser::default();
    for (index, line) in normalize(text).iter().enumerate() {
        parser.line(index + 1, line);
    }
    parser.finish()
}

/// Which order arguments go to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderCursor {
    /// Last order of the section
    Section,
    /// Last sub-order of the production center
    Center,
}

#[derive(Debug, Default)]
struct Parser {
    tree: OrderTree,
    diagnostics: Vec<Diagnostic>,
    section: Option<usize>,
    center: Option<usize>,
    order: Option<OrderCursor>,
    message: Option<Message>,
}

#[derive(Debug)]
struct Message {
    line: usize,
    text: String,
    lines: Vec<String>,
}

impl Parser {
    fn line(&mut self, number: usize, raw: &str) {
        if let Some(message) = &mut self.message {
            if raw.trim().eq_ignore_ascii_case("zzz") {
                self.close_message();
            } else {
                message.lines.push(raw.to_string());
            }
            return;
        }

        let code = strip_comment(raw);
        match classify(code) {
            LineStart::Blank => {}
            LineStart::Start(Ok(section)) => self.open_section(section),
            LineStart::Start(Err(name)) => {
                self.issue(number, raw, ParseIssue::UnknownSection(name));
                self.close_section();
            }
            LineStart::End => {
                if self.section.is_none() {
                    self.issue(number, raw, ParseIssue::UnexpectedEnd);
                }
                self.close_section();
            }
            LineStart::Command(command, rest) => {
                match arguments(rest) {
                    Ok(args) => self.open_order(number, raw, command, args),
                    Err(issue) => {
                        self.issue(number, raw, issue);
                        self.order = None;
                    }
                }
                // the body is read up to zzz even when the order itself is rejected
                if command.takes_message() {
                    self.open_message(number, raw);
                }
            }
            LineStart::Arguments(text) => match arguments(text) {
                Ok(args) => {
                    if let Some(order) = self.current_order() {
                        order.args.extend(args);
                    }
                }
                Err(issue) => {
                    self.issue(number, raw, issue);
                    self.order = None;
                }
            },
            LineStart::Unknown(word) => {
                self.issue(number, raw, ParseIssue::UnknownCommand(word));
                self.order = None;
            }
        }
    }

    fn finish(mut self) -> ParsedOrders {
        if let Some(message) = &self.message {
            let (line, text) = (message.line, message.text.clone());
            self.issue(line, &text, ParseIssue::UnterminatedMessage);
            self.close_message();
        }
        self.close_section();
        ParsedOrders {
            tree: self.tree,
            diagnostics: self.diagnostics,
        }
    }

    fn issue(&mut self, line: usize, text: &str, issue: ParseIssue) {
        warn!(line, %issue, "order line rejected");
        self.diagnostics.push(Diagnostic {
            line,
            text: text.trim_end().to_string(),
            reason: Reason::Parse(issue),
        });
    }

    /// Re-declaring a section appends to it
    fn open_section(&mut self, section: Section) {
        let index = match self
            .tree
            .sections
            .iter()
            .position(|node| node.section == section)
        {
            Some(index) => index,
            None => {
                self.tree.sections.push(SectionNode {
                    section,
                    orders: Vec::new(),
                });
                self.tree.sections.len() - 1
            }
        };
        self.section = Some(index);
        self.center = None;
        self.order = None;
    }

    fn close_section(&mut self) {
        self.section = None;
        self.center = None;
        self.order = None;
    }

    fn open_order(&mut self, line: usize, raw: &str, command: Command, args: Vec<Arg>) {
        let Some(section) = self.section else {
            self.issue(line, raw, ParseIssue::OrderOutsideSection(command));
            self.order = None;
            return;
        };
        let node = &mut self.tree.sections[section];
        let order = Order {
            command,
            args,
            line,
            text: raw.trim_end().to_string(),
            sub_orders: Vec::new(),
        };

        if command == Command::Production && node.section == Section::Production {
            node.orders.push(order);
            self.center = Some(node.orders.len() - 1);
            self.order = Some(OrderCursor::Section);
        } else if let Some(center) = self.center {
            node.orders[center].sub_orders.push(order);
            self.order = Some(OrderCursor::Center);
        } else {
            node.orders.push(order);
            self.order = Some(OrderCursor::Section);
        }
    }

    fn open_message(&mut self, line: usize, raw: &str) {
        self.message = Some(Message {
            line,
            text: raw.trim_end().to_string(),
            lines: Vec::new(),
        });
    }

    fn current_order(&mut self) -> Option<&mut Order> {
        let node = &mut self.tree.sections[self.section?];
        match self.order? {
            OrderCursor::Section => node.orders.last_mut(),
            OrderCursor::Center => node.orders[self.center?].sub_orders.last_mut(),
        }
    }

    fn close_message(&mut self) {
        if let Some(message) = self.message.take() {
            let text = message.lines.join("\n");
            if let Some(order) = self.current_order() {
                order.args.push(Arg::Message(text));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coords, item::Item};

    fn commands(orders: &[Order]) -> Vec<Command> {
        orders.iter().map(|order| order.command).collect()
    }

    #[test]
    fn redeclared_sections_accumulate() {
        let parsed = parse(
            b"START JUMPS\nJUMP TR1 Sam, 1 2 3\nEND\n\
              START PRODUCTION\nEND\n\
              START JUMPS\nMOVE DDS Slow, 2 2 3\nEND\n",
        );
        assert!(parsed.diagnostics.is_empty());
        assert_eq!(parsed.tree.sections.len(), 2);
        assert_eq!(
            commands(parsed.tree.orders(Section::Jumps)),
            vec![Command::Jump, Command::Move]
        );
    }

    #[test]
    fn malformed_lines_never_merge_into_orders() {
        let parsed = parse(
            b"START PRE-DEPARTURE\n\
              UNLOAD TR1 Sam\n\
              FROBNICATE everything\n\
              LOAD 10 CU TR1 Sam\n\
              LOAD -3 CU TR1 Sam\n\
              10 IU\n\
              ALLY SP Friends\n\
              END\n",
        );
        let orders = parsed.tree.orders(Section::PreDeparture);
        assert_eq!(
            commands(orders),
            vec![Command::Unload, Command::Load, Command::Ally]
        );
        assert_eq!(parsed.diagnostics.len(), 2);
        assert_eq!(parsed.diagnostics[0].line, 3);
        assert_eq!(
            parsed.diagnostics[0].reason,
            Reason::Parse(ParseIssue::UnknownCommand("FROBNICATE".to_string()))
        );
        assert_eq!(
            parsed.diagnostics[1].reason,
            Reason::Parse(ParseIssue::UnknownArgument("wibble".to_string()))
        );
        // "10 IU" followed the rejected line, so it has no order to join
        assert_eq!(orders[1].args.len(), 3);
    }

    #[test]
    fn continuation_lines_attach_to_the_open_order() {
        let parsed = parse(b"START PRE-DEPARTURE\nLOAD TR1 Sam\n  10 CU\nEND\n");
        let orders = parsed.tree.orders(Section::PreDeparture);
        assert_eq!(orders[0].number(), Some(10));
        assert_eq!(orders[0].item(), Some(Item::CU));
    }

    #[test]
    fn arguments_without_an_order_are_dropped() {
        let parsed = parse(b"START JUMPS\n1 2 3\nEND\n10 CU\n");
        assert!(parsed.diagnostics.is_empty());
        assert!(parsed.tree.orders(Section::Jumps).is_empty());
    }

    #[test]
    fn production_centers_nest_sub_orders() {
        let parsed = parse(
            b"START PRODUCTION\n\
              RESEARCH 10 GV\n\
              PRODUCTION PL Home\n\
              BUILD 5 CU\n\
              DEVELOP 100 PL Colony\n\
              PRODUCTION PL Colony\n\
              SHIPYARD\n\
              END\n",
        );
        let orders = parsed.tree.orders(Section::Production);
        assert_eq!(
            commands(orders),
            vec![Command::Research, Command::Production, Command::Production]
        );
        assert_eq!(orders[1].planet_name(), Some("Home"));
        assert_eq!(
            commands(&orders[1].sub_orders),
            vec![Command::Build, Command::Develop]
        );
        assert_eq!(commands(&orders[2].sub_orders), vec![Command::Shipyard]);
    }

    #[test]
    fn production_outside_its_section_is_a_plain_order() {
        let parsed = parse(b"START POST-ARRIVAL\nPRODUCTION PL Home\nLAND TR1 Sam\nEND\n");
        let orders = parsed.tree.orders(Section::PostArrival);
        assert_eq!(orders.len(), 2);
        assert!(orders[0].sub_orders.is_empty());
    }

    #[test]
    fn messages_run_to_zzz() {
        let parsed = parse(
            b"START PRE-DEPARTURE\n\
              MESSAGE SP Neighbours\n\
              Hello; this is not a comment\n\
              START COMBAT\n\
              zzz\n\
              AUTO\n\
              END\n",
        );
        assert!(parsed.diagnostics.is_empty());
        let orders = parsed.tree.orders(Section::PreDeparture);
        assert_eq!(commands(orders), vec![Command::Message, Command::Auto]);
        assert_eq!(orders[0].species_name(), Some("Neighbours"));
        assert_eq!(
            orders[0].message(),
            Some("Hello; this is not a comment\nSTART COMBAT")
        );
    }

    #[test]
    fn rejected_messages_still_swallow_their_body() {
        let parsed = parse(
            b"SEND SP Early\n\
              JUMP TR10 Mule, 1 2 3\n\
              zzz\n\
              START PRE-DEPARTURE\n\
              MESSAGE wibble\n\
              UNLOAD TR10 Mule\n\
              zzz\n\
              AUTO\n\
              END\n",
        );
        assert_eq!(parsed.diagnostics.len(), 2);
        assert_eq!(parsed.diagnostics[0].line, 1);
        assert_eq!(
            parsed.diagnostics[0].reason,
            Reason::Parse(ParseIssue::OrderOutsideSection(Command::Send))
        );
        assert_eq!(
            parsed.diagnostics[1].reason,
            Reason::Parse(ParseIssue::UnknownArgument("wibble".to_string()))
        );
        assert!(parsed.tree.orders(Section::Jumps).is_empty());
        assert_eq!(
            commands(parsed.tree.orders(Section::PreDeparture)),
            vec![Command::Auto]
        );
    }

    #[test]
    fn unterminated_message_keeps_its_text() {
        let parsed = parse(b"START PRE-DEPARTURE\nSEND SP Them\nGoodbye\n");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(
            parsed.diagnostics[0].reason,
            Reason::Parse(ParseIssue::UnterminatedMessage)
        );
        assert_eq!(
            parsed.tree.orders(Section::PreDeparture)[0].message(),
            Some("Goodbye")
        );
    }

    #[test]
    fn orders_outside_sections_and_stray_ends() {
        let parsed = parse(b"JUMP TR1 Sam, 1 2 3\nEND\nSTART NOWHERE\nAUTO\n");
        let reasons: Vec<_> = parsed
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.reason.clone())
            .collect();
        assert_eq!(
            reasons,
            vec![
                Reason::Parse(ParseIssue::OrderOutsideSection(Command::Jump)),
                Reason::Parse(ParseIssue::UnexpectedEnd),
                Reason::Parse(ParseIssue::UnknownSection("NOWHERE".to_string())),
                Reason::Parse(ParseIssue::OrderOutsideSection(Command::Auto)),
            ]
        );
        assert!(parsed.tree.sections.is_empty());
    }

    #[test]
    fn jump_targets() {
        let parsed = parse(b"start jumps\njump tr10 Mule, 3 4 5 #2\nend");
        let order = &parsed.tree.orders(Section::Jumps)[0];
        assert_eq!(order.destination(), Some((Coords::new(3, 4, 5), Some(2))));
        assert_eq!(order.ship().map(|ship| ship.name.as_str()), Some("Mule"));
        assert_eq!(order.line, 2);
    }
}
