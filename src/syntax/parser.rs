//! Auto-scan report parser.
//!
//! Converts report text into a [`RawTree`]: untyped nested JSON data shaped
//! like the document model. The grammar is compiled at build time by
//! `pest_derive`; the parser holds no state, so [`parse`] is reentrant and
//! can run on several reports at once.
//!
//! The tree builder performs the few semantic actions the grammar cannot
//! express (date normalization, mileage unit derivation, fault count check).
//! Failures there are reported as syntax errors spanning the offending text.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::{Parser, Span};
use pest_derive::Parser;
use serde_json::{json, Value};

use super::error::{Location, SyntaxError};
use crate::model::Mileage;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct ReportParser;

/// Untyped, grammar-produced representation of a report.
pub type RawTree = Value;

type BuildResult<T> = Result<T, Error<Rule>>;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses auto-scan report text into a raw tree.
///
/// Fails on the first unrecoverable mismatch; no partial tree is produced.
pub fn parse(text: &str) -> Result<RawTree, SyntaxError> {
    let mut pairs =
        ReportParser::parse(Rule::report, text).map_err(|e| SyntaxError::from_pest(e, text))?;

    let report = pairs.next().ok_or_else(|| SyntaxError {
        message: "internal parser error: empty parse result".to_string(),
        location: Location::new(text, 0, 0),
    })?;

    build_report(report).map_err(|e| SyntaxError::from_pest(e, text))
}

// ============================================================================
// TREE BUILDERS
// ============================================================================

fn build_report(pair: Pair<Rule>) -> BuildResult<Value> {
    let mut children = Children::of(pair);
    let header = children.next(Rule::header)?;
    let vehicle = children.next(Rule::vehicle)?;
    let modules = children.next(Rule::modules)?;
    let footer = children.next(Rule::footer)?;

    let header = build_header(header)?;
    let mut seen = HashSet::new();
    let mut built = Vec::new();
    for module in modules.into_inner() {
        let address = Children::of(Children::of(module.clone()).next(Rule::module_header)?)
            .next(Rule::address)?;
        if !seen.insert(address.as_str()) {
            return Err(custom(
                address.as_span(),
                format!("duplicate module address {}", address.as_str()),
            ));
        }
        built.push(build_module(module)?);
    }

    Ok(json!({
        "date": header.date,
        "duration": build_duration(footer)?,
        "shop": header.shop,
        "software": header.software,
        "vehicle": build_vehicle(vehicle)?,
        "modules": built,
    }))
}

struct Header {
    date: String,
    shop: Option<String>,
    software: Value,
}

fn build_header(pair: Pair<Rule>) -> BuildResult<Header> {
    let mut children = Children::of(pair);
    let date = build_timestamp(children.next(Rule::timestamp_line)?)?;

    let mut version = Children::of(children.next(Rule::version_line)?);
    let software_version = version.text(Rule::version)?;
    let platform = version.text(Rule::platform)?;

    let mut data = Children::of(children.next(Rule::data_version_line)?);
    let data_date = data.next(Rule::data_date)?;
    let data_version_date = NaiveDate::parse_from_str(data_date.as_str(), "%Y%m%d")
        .map_err(|_| custom(data_date.as_span(), "invalid data version date"))?;
    let data_version = data.text(Rule::data_version)?;

    let shop = children
        .optional(Rule::shop_line)
        .map(line_value)
        .transpose()?;

    Ok(Header {
        date,
        shop,
        software: json!({
            "version": software_version,
            "platform": platform,
            "dataVersion": data_version,
            "dataVersionDate": data_version_date.format("%Y-%m-%d").to_string(),
        }),
    })
}

fn build_timestamp(pair: Pair<Rule>) -> BuildResult<String> {
    let span = pair.as_span();
    let mut children = Children::of(pair);
    children.next(Rule::weekday)?;
    let day: u32 = integer(&children.next(Rule::day)?)?;
    let month = month_number(children.next(Rule::month)?.as_str());
    let year: i32 = integer(&children.next(Rule::year)?)?;
    let clock = children.next(Rule::clock)?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| custom(span, "invalid scan date"))?;
    let time = NaiveTime::parse_from_str(clock.as_str(), "%H:%M:%S")
        .map_err(|_| custom(clock.as_span(), "invalid scan time"))?;

    Ok(date.and_time(time).format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn build_duration(pair: Pair<Rule>) -> BuildResult<Value> {
    let mut elapsed = Children::of(Children::of(pair).next(Rule::elapsed)?);
    let minutes: u32 = integer(&elapsed.next(Rule::number)?)?;
    let seconds: u8 = integer(&elapsed.next(Rule::seconds)?)?;

    Ok(json!({ "minutes": minutes, "seconds": seconds }))
}

fn build_vehicle(pair: Pair<Rule>) -> BuildResult<Value> {
    let mut children = Children::of(pair);

    let mut vin_line = Children::of(children.next(Rule::vin_line)?);
    let vin = vin_line.text(Rule::vin)?;
    let license_plate = vin_line.optional_text(Rule::license_plate);

    let mut mileage_line = Children::of(children.next(Rule::mileage_line)?);
    let mileage = build_mileage(mileage_line.next(Rule::mileage)?)?;

    let mut chassis_line = Children::of(children.next(Rule::chassis_line)?);
    let chassis = chassis_line.text(Rule::chassis)?;
    let vehicle_type = chassis_line.text(Rule::vehicle_type)?;

    Ok(json!({
        "vin": vin,
        "licensePlate": license_plate,
        "chassis": chassis,
        "type": vehicle_type,
        "mileage": mileage,
    }))
}

/// Builds a mileage holding both units.
///
/// A single printed unit is converted; when both are printed they are kept
/// as the scan tool wrote them.
fn build_mileage(pair: Pair<Rule>) -> BuildResult<Value> {
    let span = pair.as_span();
    let mut children = Children::of(pair);
    let km = children.optional(Rule::km).map(distance).transpose()?;
    let miles = children.optional(Rule::miles).map(distance).transpose()?;

    let mileage = match (km, miles) {
        (Some((km, _)), Some((miles, _))) => return Ok(json!({ "km": km, "miles": miles })),
        (Some((km, _)), None) => Mileage::from_km(km),
        (None, Some((miles, miles_span))) => Mileage::from_miles(miles)
            .ok_or_else(|| custom(miles_span, "distance out of range"))?,
        (None, None) => return Err(custom(span, "internal parser error: mileage without distance")),
    };

    Ok(json!({ "km": mileage.km(), "miles": mileage.miles() }))
}

/// A distance and the span it was read from.
fn distance(pair: Pair<Rule>) -> BuildResult<(u32, Span)> {
    let distance = Children::of(pair).next(Rule::distance)?;
    let value = integer(&distance)
        .map_err(|_| custom(distance.as_span(), "distance out of range"))?;
    Ok((value, distance.as_span()))
}

fn build_module(pair: Pair<Rule>) -> BuildResult<Value> {
    let mut children = Children::of(pair);

    let mut header = Children::of(children.next(Rule::module_header)?);
    let address = header.text(Rule::address)?;
    let name = header.text(Rule::module_name)?;
    let mut status = Children::of(header.next(Rule::module_status)?);
    let description = status.text(Rule::status_description)?;
    let flags = status.text(Rule::status_flags)?;

    let info = children.optional(Rule::info).map(build_info).transpose()?;
    let mut indices = HashSet::new();
    let mut subsystems = Vec::new();
    for subsystem in children.repeated(Rule::subsystem) {
        let index = Children::of(Children::of(subsystem.clone()).next(Rule::subsystem_header)?)
            .next(Rule::number)?;
        if !indices.insert(index.as_str().trim_start_matches('0')) {
            return Err(custom(
                index.as_span(),
                format!("duplicate subsystem index {}", index.as_str()),
            ));
        }
        subsystems.push(build_subsystem(subsystem)?);
    }
    let faults = match children.optional(Rule::faults) {
        Some(faults) => build_faults(faults)?,
        None => Vec::new(),
    };

    Ok(json!({
        "address": address,
        "name": name,
        "isReachable": info.is_some(),
        "status": { "flags": flags, "description": description },
        "info": info,
        "subsystems": subsystems,
        "faults": faults,
    }))
}

fn build_info(pair: Pair<Rule>) -> BuildResult<Value> {
    let mut children = Children::of(pair);
    let labels_file = line_value(children.next(Rule::labels_line)?)?;

    let mut part_number = Children::of(children.next(Rule::part_number_line)?);
    let software = part_number.text(Rule::cell)?;
    let hardware = part_number.text(Rule::value)?;

    let component = line_value(children.next(Rule::component_line)?)?;

    let mut revision_line = Children::of(children.next(Rule::revision_line)?);
    let revision = revision_line.text(Rule::cell)?;
    let serial = revision_line.text(Rule::value)?;

    let coding = line_value(children.next(Rule::coding_line)?)?;
    let wsc = line_value(children.next(Rule::workshop_line)?)?;
    let vcid = line_value(children.next(Rule::vcid_line)?)?;
    let vinid = line_value(children.next(Rule::vinid_line)?)?;
    let readiness = children
        .optional(Rule::readiness_line)
        .map(line_value)
        .transpose()?;

    Ok(json!({
        "labelsFile": labels_file,
        "partNumber": { "software": software, "hardware": hardware },
        "component": component,
        "revision": revision,
        "serial": serial,
        "coding": { "value": coding, "wsc": wsc },
        "vcid": vcid,
        "vinid": vinid,
        "readiness": readiness,
    }))
}

fn build_subsystem(pair: Pair<Rule>) -> BuildResult<Value> {
    let mut children = Children::of(pair);

    let mut header = Children::of(children.next(Rule::subsystem_header)?);
    let index: u8 = integer(&header.next(Rule::number)?)?;
    let part_number = header.text(Rule::value)?;

    let component = line_value(children.next(Rule::component_line)?)?;
    let labels_file = children.optional(Rule::labels_line).map(line_value).transpose()?;
    let coding = children.optional(Rule::coding_line).map(line_value).transpose()?;
    let wsc = children.optional(Rule::workshop_line).map(line_value).transpose()?;

    Ok(json!({
        "index": index,
        "partNumber": part_number,
        "component": component,
        "labelsFile": labels_file,
        "coding": coding,
        "wsc": wsc,
    }))
}

fn build_faults(pair: Pair<Rule>) -> BuildResult<Vec<Value>> {
    let mut children = Children::of(pair);
    if children.optional(Rule::no_faults).is_some() {
        return Ok(Vec::new());
    }

    let mut list = Children::of(children.next(Rule::fault_list)?);
    let count = list.next(Rule::number)?;
    let faults = list
        .repeated(Rule::fault)
        .into_iter()
        .map(build_fault)
        .collect::<BuildResult<Vec<_>>>()?;

    let announced: usize = integer(&count)?;
    if announced != faults.len() {
        return Err(custom(
            count.as_span(),
            format!(
                "announced {announced} fault(s) but {} fault block(s) follow",
                faults.len()
            ),
        ));
    }

    Ok(faults)
}

fn build_fault(pair: Pair<Rule>) -> BuildResult<Value> {
    let mut children = Children::of(pair);

    let mut header = Children::of(children.next(Rule::fault_header)?);
    let code = header.text(Rule::fault_code)?;
    let subject = header.text(Rule::value)?;

    let mut detail = Children::of(children.next(Rule::fault_detail)?);
    let error_code = detail.optional_text(Rule::error_code);
    let description_code = detail.text(Rule::description_code)?;
    let description = detail.text(Rule::value)?;

    let conditions: Vec<String> = children
        .optional(Rule::fault_conditions)
        .map(|line| {
            line.into_inner()
                .map(|condition| condition.as_str().trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    let freeze_frame = children
        .optional(Rule::freeze_frame)
        .map(build_freeze_frame)
        .transpose()?;

    Ok(json!({
        "code": code,
        "subject": subject,
        "errorCode": error_code,
        "descriptionCode": description_code,
        "description": description,
        "conditions": conditions,
        "freezeFrame": freeze_frame,
    }))
}

fn build_freeze_frame(pair: Pair<Rule>) -> BuildResult<Value> {
    let mut children = Children::of(pair);

    let status = Children::of(children.next(Rule::frame_status)?).text(Rule::frame_bits)?;
    let priority = line_number(children.next(Rule::frame_priority)?)?;
    let frequency = line_number(children.next(Rule::frame_frequency)?)?;
    let reset_counter = line_number(children.next(Rule::frame_reset_counter)?)?;
    let mileage = build_mileage(Children::of(children.next(Rule::frame_mileage)?).next(Rule::mileage)?)?;
    let time_indication = line_number(children.next(Rule::frame_time_indication)?)?;

    let date = match children.optional(Rule::frame_date) {
        Some(line) => {
            let date = Children::of(line).next(Rule::dotted_date)?;
            let parsed = NaiveDate::parse_from_str(date.as_str(), "%Y.%m.%d")
                .map_err(|_| custom(date.as_span(), "invalid freeze frame date"))?;
            Some(parsed.format("%Y-%m-%d").to_string())
        }
        None => None,
    };
    let time = match children.optional(Rule::frame_time) {
        Some(line) => {
            let clock = Children::of(line).next(Rule::clock)?;
            NaiveTime::parse_from_str(clock.as_str(), "%H:%M:%S")
                .map_err(|_| custom(clock.as_span(), "invalid freeze frame time"))?;
            Some(clock.as_str().to_string())
        }
        None => None,
    };

    Ok(json!({
        "status": status,
        "priority": priority,
        "frequency": frequency,
        "resetCounter": reset_counter,
        "mileage": mileage,
        "timeIndication": time_indication,
        "date": date,
        "time": time,
    }))
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Cursor over the children of a pair, checked against the expected rules.
struct Children<'i> {
    span: Span<'i>,
    pairs: Pairs<'i, Rule>,
}

impl<'i> Children<'i> {
    fn of(pair: Pair<'i, Rule>) -> Self {
        Self {
            span: pair.as_span(),
            pairs: pair.into_inner(),
        }
    }

    fn next(&mut self, rule: Rule) -> BuildResult<Pair<'i, Rule>> {
        match self.pairs.next() {
            Some(pair) if pair.as_rule() == rule => Ok(pair),
            Some(pair) => Err(custom(
                pair.as_span(),
                format!(
                    "internal parser error: expected {rule:?}, found {:?}",
                    pair.as_rule()
                ),
            )),
            None => Err(custom(
                self.span,
                format!("internal parser error: missing {rule:?}"),
            )),
        }
    }

    fn optional(&mut self, rule: Rule) -> Option<Pair<'i, Rule>> {
        match self.pairs.peek() {
            Some(pair) if pair.as_rule() == rule => self.pairs.next(),
            _ => None,
        }
    }

    fn repeated(&mut self, rule: Rule) -> Vec<Pair<'i, Rule>> {
        std::iter::from_fn(|| self.optional(rule)).collect()
    }

    fn text(&mut self, rule: Rule) -> BuildResult<String> {
        Ok(self.next(rule)?.as_str().trim().to_string())
    }

    fn optional_text(&mut self, rule: Rule) -> Option<String> {
        self.optional(rule).map(|pair| pair.as_str().trim().to_string())
    }
}

/// Trimmed `value` of a `<label>: <value>` line.
fn line_value(pair: Pair<Rule>) -> BuildResult<String> {
    Children::of(pair).text(Rule::value)
}

/// Integer `number` of a `<label>: <number>` line.
fn line_number(pair: Pair<Rule>) -> BuildResult<u32> {
    integer(&Children::of(pair).next(Rule::number)?)
}

/// Parses a digit run into `T`, failing on values `T` cannot hold.
fn integer<T: TryFrom<u64>>(pair: &Pair<Rule>) -> BuildResult<T> {
    pair.as_str()
        .parse::<u64>()
        .ok()
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| custom(pair.as_span(), "number out of range"))
}

fn month_number(name: &str) -> u32 {
    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    MONTHS
        .iter()
        .position(|month| *month == name)
        .map_or(0, |index| index as u32 + 1)
}

fn custom(span: Span, message: impl Into<String>) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: message.into(),
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_map_to_calendar_numbers() {
        assert_eq!(month_number("January"), 1);
        assert_eq!(month_number("December"), 12);
        assert_eq!(month_number("Smarch"), 0);
    }

    #[test]
    fn rejects_empty_input() {
        let error = parse("").unwrap_err();
        assert_eq!(error.location.start.line, 1);
        assert_eq!(error.location.start.offset, 0);
    }

    #[test]
    fn mileage_in_km_only_derives_miles() {
        let pair = ReportParser::parse(Rule::mileage, "100000km")
            .unwrap()
            .next()
            .unwrap();
        let mileage = build_mileage(pair).unwrap();
        assert_eq!(mileage, json!({ "km": 100000, "miles": 62137 }));
    }

    #[test]
    fn mileage_in_miles_only_derives_km() {
        let pair = ReportParser::parse(Rule::mileage, "62137miles")
            .unwrap()
            .next()
            .unwrap();
        let mileage = build_mileage(pair).unwrap();
        assert_eq!(mileage["miles"], json!(62137));
        assert_eq!(mileage["km"], json!(99999));
    }

    #[test]
    fn mileage_with_both_units_is_kept_verbatim() {
        let pair = ReportParser::parse(Rule::mileage, "123456km-76712miles")
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(
            build_mileage(pair).unwrap(),
            json!({ "km": 123456, "miles": 76712 })
        );
    }

    #[test]
    fn header_skips_the_emulator_banner() {
        let text = "Monday,15,January,2024,10:23:45:12345\n\
                    VCDS -- Windows Based VAG/VAS Emulator Running on Windows 10 x64\n\
                    VCDS Version: Release 23.11.0 (x64)\n\
                    Data version: 20231120 DS370.0\n\
                    www.Ross-Tech.com\n\
                    \n";
        let pair = ReportParser::parse(Rule::header, text)
            .unwrap()
            .next()
            .unwrap();

        let header = build_header(pair).unwrap();
        assert_eq!(header.date, "2024-01-15T10:23:45");
        assert_eq!(header.software["version"], json!("23.11.0"));
        assert_eq!(header.shop, None);
    }

    #[test]
    fn mileage_in_miles_beyond_km_range_is_rejected() {
        let text = "3000000000miles";
        let pair = ReportParser::parse(Rule::mileage, text)
            .unwrap()
            .next()
            .unwrap();
        let error = SyntaxError::from_pest(build_mileage(pair).unwrap_err(), text);

        assert_eq!(error.message, "distance out of range");
        assert_eq!(error.location.start.offset, 0);
        assert_eq!(error.location.end.offset, 10);
    }

    #[test]
    fn numbers_wider_than_their_field_are_rejected() {
        let text = "    Fault Priority: 99999999999\n";
        let pair = ReportParser::parse(Rule::frame_priority, text)
            .unwrap()
            .next()
            .unwrap();
        let error = SyntaxError::from_pest(line_number(pair).unwrap_err(), text);

        assert_eq!(error.message, "number out of range");
        assert_eq!(error.location.start.offset, 20);
    }
}
