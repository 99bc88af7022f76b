//! Reader for the text instance format.
//!
//! An instance starts with `Key: value` header lines (`Capacity:`, `Depot Node:` and
//! `#Nodes:` are required, `Name:` is optional, anything else is ignored) followed by
//! row sections. Each section is introduced by a header line and runs until a blank
//! line or a line whose first token does not carry the section's row label.
//!
//! | section | row                                                        |
//! |---------|------------------------------------------------------------|
//! | `ReN.`  | `N<vertex> <demand> <cost>`                                |
//! | `ReE.`  | `E<id> <from> <to> <traversal> <demand> <cost>`            |
//! | `ReA.`  | `A<id> <from> <to> <traversal> <demand> <cost>`            |
//! | `EDGE`  | `NrE<id> <from> <to> <cost>` (or `E<id>`)                  |
//! | `ARC`   | `NrA<id> <from> <to> <cost>` (or `A<id>`)                  |

use crate::error::{CarpError, Result};
use crate::problem::{Cost, Demand, Link, Problem, Service};
use log::debug;
use std::iter::Peekable;
use std::str::FromStr;

/// One data row of a section: its 1-based line number, label and remaining tokens.
struct Row<'a> {
    line: usize,
    label: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> Row<'a> {
    fn field<T: FromStr>(&self, index: usize, what: &str) -> Result<T> {
        let token = self.fields.get(index).ok_or_else(|| {
            CarpError::malformed(self.line, format!("truncated row, missing {}", what))
        })?;
        parse_token(self.line, token, what)
    }

    /// The numeric part of the label, e.g. `4` for `N4`.
    fn label_number(&self, prefix: &str) -> Result<usize> {
        let digits = self.label.strip_prefix(prefix).unwrap_or(self.label);
        parse_token(self.line, digits, "label number")
    }
}

#[derive(Default)]
struct Headers {
    name: Option<String>,
    capacity: Option<Demand>,
    depot: Option<usize>,
    vertices: Option<usize>,
}

/// Parse an instance. `fallback_name` is used when the text has no `Name:` line.
pub fn parse_instance(fallback_name: &str, text: &str) -> Result<Problem> {
    let mut headers = Headers::default();
    let mut services: Vec<(usize, Service)> = Vec::new();
    let mut links: Vec<(usize, Link)> = Vec::new();

    let mut lines = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .peekable();

    while let Some((number, raw)) = lines.next() {
        let line = raw.trim();

        if let Some(value) = line.strip_prefix("Name:") {
            headers.name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Capacity:") {
            headers.capacity = Some(parse_token(number, value.trim(), "capacity")?);
        } else if let Some(value) = line.strip_prefix("Depot Node:") {
            headers.depot = Some(parse_token(number, value.trim(), "depot node")?);
        } else if let Some(value) = line.strip_prefix("#Nodes:") {
            headers.vertices = Some(parse_token(number, value.trim(), "node count")?);
        } else if line.starts_with("ReN.") {
            for row in take_rows(&mut lines, &["N"]) {
                let vertex = row.label_number("N")?;
                let demand = row.field(0, "demand")?;
                let cost = Cost::from(row.field::<u32>(1, "service cost")?);
                services.push((row.line, Service::node(vertex, demand, cost)));
            }
        } else if line.starts_with("ReE.") {
            for row in take_rows(&mut lines, &["E"]) {
                let (from, to, traversal, demand, cost) = required_link_fields(&row)?;
                services.push((row.line, Service::edge(from, to, traversal, demand, cost)));
            }
        } else if line.starts_with("ReA.") {
            for row in take_rows(&mut lines, &["A"]) {
                let (from, to, traversal, demand, cost) = required_link_fields(&row)?;
                services.push((row.line, Service::arc(from, to, traversal, demand, cost)));
            }
        } else if line.starts_with("EDGE") {
            for row in take_rows(&mut lines, &["NrE", "E"]) {
                let (from, to, cost) = optional_link_fields(&row)?;
                links.push((row.line, Link::edge(from, to, cost)));
            }
        } else if line.starts_with("ARC") {
            for row in take_rows(&mut lines, &["NrA", "A"]) {
                let (from, to, cost) = optional_link_fields(&row)?;
                links.push((row.line, Link::arc(from, to, cost)));
            }
        }
    }

    let capacity = headers
        .capacity
        .ok_or(CarpError::MissingHeader("Capacity:"))?;
    let depot = headers.depot.ok_or(CarpError::MissingHeader("Depot Node:"))?;
    let vertex_count = headers.vertices.ok_or(CarpError::MissingHeader("#Nodes:"))?;

    let in_range = |line: usize, vertex: usize| -> Result<()> {
        if vertex == 0 || vertex > vertex_count {
            Err(CarpError::malformed(
                line,
                format!("vertex {} outside 1..={}", vertex, vertex_count),
            ))
        } else {
            Ok(())
        }
    };
    for (line, service) in &services {
        in_range(*line, service.origin)?;
        in_range(*line, service.destination)?;
    }
    for (line, link) in &links {
        in_range(*line, link.from)?;
        in_range(*line, link.to)?;
    }

    let name = headers
        .name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback_name.to_string());
    debug!(
        "parsed {}: {} required elements, {} optional links",
        name,
        services.len(),
        links.len()
    );

    Problem::new(
        name,
        vertex_count,
        depot,
        capacity,
        services.into_iter().map(|(_, service)| service).collect(),
        links.into_iter().map(|(_, link)| link).collect(),
    )
}

fn parse_token<T: FromStr>(line: usize, token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| CarpError::malformed(line, format!("invalid {} `{}`", what, token)))
}

fn required_link_fields(row: &Row<'_>) -> Result<(usize, usize, Cost, Demand, Cost)> {
    let from = row.field(0, "origin")?;
    let to = row.field(1, "destination")?;
    let traversal = row.field::<u32>(2, "traversal cost")?;
    let demand = row.field(3, "demand")?;
    let cost = row.field::<u32>(4, "service cost")?;
    Ok((from, to, Cost::from(traversal), demand, Cost::from(cost)))
}

fn optional_link_fields(row: &Row<'_>) -> Result<(usize, usize, Cost)> {
    let from = row.field(0, "origin")?;
    let to = row.field(1, "destination")?;
    let cost = row.field::<u32>(2, "traversal cost")?;
    Ok((from, to, Cost::from(cost)))
}

/// Whether `label` is one of `prefixes` followed by a number.
fn has_row_label(label: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| {
        label
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with(|c: char| c.is_ascii_digit()))
    })
}

/// Consume the rows of the current section, leaving the terminating line in place.
fn take_rows<'a, I>(lines: &mut Peekable<I>, prefixes: &[&str]) -> Vec<Row<'a>>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut rows = Vec::new();
    while let Some(&(line, raw)) = lines.peek() {
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some(label) if has_row_label(label, prefixes) => {
                rows.push(Row {
                    line,
                    label,
                    fields: tokens.collect(),
                });
                lines.next();
            }
            _ => break,
        }
    }
    rows
}
