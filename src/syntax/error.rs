//! Syntax errors raised by the grammar engine.
//!
//! A [`SyntaxError`] always carries a precise [`Location`]: start and end
//! positions, each with a 1-based line and column and a 0-based byte offset.
//! Zero-width failures reported by pest are widened to the offending
//! character so that the context renderer always has something to point at.

use pest::error::{Error, ErrorVariant, InputLocation};
use serde::Serialize;
use thiserror::Error;

use super::parser::Rule;

/// A position inside the report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// 0-based byte offset.
    pub offset: usize,
}

impl Position {
    /// Computes the line and column of `offset` within `text`.
    ///
    /// Offsets past the end of the text are clamped to it.
    pub fn at(text: &str, offset: usize) -> Self {
        let offset = clamp_to_boundary(text, offset);
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;

        Self {
            line,
            column,
            offset,
        }
    }
}

/// The span of text a syntax error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn new(text: &str, start: usize, end: usize) -> Self {
        let start = Position::at(text, start);
        let end = Position::at(text, end.max(start.offset));
        Self { start, end }
    }

    /// Byte length of the span.
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The report text does not conform to the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} (line {}, column {})", location.start.line, location.start.column)]
pub struct SyntaxError {
    pub message: String,
    pub location: Location,
}

impl SyntaxError {
    /// Converts a pest failure into a syntax error over `text`.
    pub(crate) fn from_pest(error: Error<Rule>, text: &str) -> Self {
        let error = error.renamed_rules(describe_rule);
        let (start, end) = match error.location {
            InputLocation::Pos(pos) => (pos, widen(text, pos)),
            InputLocation::Span((start, end)) => (start, end),
        };
        let message = match &error.variant {
            ErrorVariant::CustomError { message } => message.clone(),
            variant => variant.message().into_owned(),
        };

        Self {
            message,
            location: Location::new(text, start, end),
        }
    }
}

/// Extends a zero-width position to cover the character found there.
fn widen(text: &str, pos: usize) -> usize {
    text.get(pos..)
        .and_then(|rest| rest.chars().next())
        .map_or(pos, |c| pos + c.len_utf8())
}

/// Largest char boundary of `text` at or before `offset`.
pub(crate) fn clamp_to_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Human-readable names for the rules reported in "expected ..." messages.
fn describe_rule(rule: &Rule) -> String {
    let name = match rule {
        Rule::report => "an auto-scan report",
        Rule::EOI => "end of file",
        Rule::header => "the report header",
        Rule::timestamp_line => "the scan date line (e.g. `Monday,15,January,2024,10:23:45`)",
        Rule::weekday => "a weekday name",
        Rule::month => "a month name",
        Rule::version_line => "the `VCDS Version:` line",
        Rule::data_version_line => "the `Data version:` line",
        Rule::shop_line => "a `Shop #:` line",
        Rule::vehicle => "the vehicle block",
        Rule::vin_line => "the `VIN:` line",
        Rule::license_plate => "a license plate",
        Rule::mileage_line => "the `Mileage:` line",
        Rule::mileage => "a mileage (`<n>km-<m>miles`, `<n>km` or `<m>miles`)",
        Rule::km => "a distance in km",
        Rule::miles => "a distance in miles",
        Rule::chassis_line => "the `Chassis Type:` line",
        Rule::modules => "a module block",
        Rule::module => "a module block",
        Rule::module_header => "a module header (`Address <dd>: <name> -- Status: ...`)",
        Rule::module_status => "a module status (` -- Status: <description> <flags>`)",
        Rule::address => "a two-digit module address",
        Rule::status_flags => "four status flag digits",
        Rule::info => "a module info block",
        Rule::labels_line => "a `Labels:` line",
        Rule::part_number_line => "a `Part No SW: ... HW: ...` line",
        Rule::component_line => "a `Component:` line",
        Rule::revision_line => "a `Revision: ... Serial number: ...` line",
        Rule::coding_line => "a `Coding:` line",
        Rule::workshop_line => "a `Shop #: WSC ...` line",
        Rule::vcid_line => "a `VCID:` line",
        Rule::vinid_line => "a `VINID:` line",
        Rule::readiness_line => "a `Readiness:` line",
        Rule::subsystem => "a subsystem block",
        Rule::subsystem_header => "a `Subsystem <n> - Part No: ...` line",
        Rule::faults => "a fault section",
        Rule::no_faults => "`No fault code found.`",
        Rule::fault_list => "a fault list (`<n> Faults Found:`)",
        Rule::fault => "a fault",
        Rule::fault_header => "a fault header (`<code> - <subject>`)",
        Rule::fault_detail => "a fault description (`[<code> - ]<nnn> - <description>`)",
        Rule::fault_conditions => "a fault condition line",
        Rule::freeze_frame => "a freeze frame",
        Rule::frame_status => "a `Fault Status:` line",
        Rule::frame_priority => "a `Fault Priority:` line",
        Rule::frame_frequency => "a `Fault Frequency:` line",
        Rule::frame_reset_counter => "a `Reset counter:` line",
        Rule::frame_mileage => "a freeze frame `Mileage:` line",
        Rule::frame_time_indication => "a `Time Indication:` line",
        Rule::footer => "the closing `End-----(Elapsed Time: mm:ss)-----` line",
        other => return format!("{other:?}"),
    };
    name.to_string()
}
