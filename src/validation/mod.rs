//! Schema validation of hydrated reports.
//!
//! The schema is declarative data bundled with the crate
//! (`resources/autoscan.schema.json`), independent of the hydration
//! templates. It expresses the constraints plain hydration cannot, such as
//! value ranges and string patterns.
//!
//! Validation is a read-only pass over the serialized document that never
//! stops at the first problem: every violation is collected. For a fixed
//! schema the violations always come out in the same order.

use std::fmt;

use jsonschema::{Draft, Validator};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::Report;

const BUNDLED_SCHEMA: &str = include_str!("../../resources/autoscan.schema.json");

static SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema: Value =
        serde_json::from_str(BUNDLED_SCHEMA).expect("bundled report schema must be JSON");
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .expect("bundled report schema must compile")
});

/// One failed schema constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Pointer to the failed keyword, e.g. `#/properties/duration/$ref/properties/seconds/maximum`.
    pub schema_path: String,
    /// JSON pointer to the offending value in the document.
    pub document_path: String,
    pub message: String,
    pub value: Value,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.document_path.is_empty() {
            "/"
        } else {
            &self.document_path
        };
        write!(f, "from schema {}:\n  {at}: {}", self.schema_path, self.message)
    }
}

impl From<jsonschema::ValidationError<'_>> for Violation {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        Self {
            schema_path: format!("#{}", error.schema_path),
            document_path: error.instance_path.to_string(),
            message: error.to_string(),
            value: error.instance.clone().into_owned(),
        }
    }
}

/// Every violation found in a document.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("report violates the schema ({} violation(s))", violations.len())]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

/// The compiled bundled schema.
pub fn schema() -> &'static Validator {
    &SCHEMA
}

/// Validates a hydrated report against the bundled schema.
pub fn validate(report: &Report) -> Result<(), ValidationError> {
    let document = serde_json::to_value(report).map_err(|error| ValidationError {
        violations: vec![Violation {
            schema_path: "#".to_string(),
            document_path: String::new(),
            message: format!("cannot be serialized: {error}"),
            value: Value::Null,
        }],
    })?;
    validate_value(&document)
}

/// Validates any document against the bundled schema.
pub fn validate_value(document: &Value) -> Result<(), ValidationError> {
    let violations: Vec<Violation> = schema().iter_errors(document).map(Violation::from).collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document() -> Value {
        json!({
            "date": "2024-01-15T10:23:45",
            "duration": { "minutes": 3, "seconds": 12 },
            "shop": null,
            "software": {
                "version": "23.11.0",
                "platform": "x64",
                "dataVersion": "DS370.0",
                "dataVersionDate": "2023-11-20",
            },
            "vehicle": {
                "vin": "WVWZZZ1KZ8W123456",
                "licensePlate": null,
                "chassis": "1K0",
                "type": "1K - VW Golf/Jetta V PQ35",
                "mileage": { "km": 123456, "miles": 76712 },
            },
            "modules": [],
        })
    }

    #[test]
    fn bundled_schema_compiles() {
        assert!(schema().is_valid(&document()));
    }

    #[test]
    fn accepts_valid_document() {
        assert_eq!(validate_value(&document()), Ok(()));
    }

    #[test]
    fn reports_every_violation() {
        let mut document = document();
        document["duration"]["seconds"] = json!(75);
        document["vehicle"]["mileage"]["km"] = json!(-1);

        let error = validate_value(&document).unwrap_err();
        let paths: Vec<&str> = error
            .violations
            .iter()
            .map(|v| v.document_path.as_str())
            .collect();

        assert_eq!(paths, ["/duration/seconds", "/vehicle/mileage/km"]);
        assert!(
            error.violations[1].schema_path.ends_with("/km/minimum"),
            "{}",
            error.violations[1].schema_path
        );
        assert_eq!(error.violations[1].value, json!(-1));
        assert_eq!(validate_value(&document), Err(error));
    }

    #[test]
    fn null_is_accepted_where_a_value_is_optional() {
        let mut document = document();
        document["shop"] = json!("WSC 01357 011 00200");
        document["vehicle"]["licensePlate"] = json!("AB-123-CD");
        assert_eq!(validate_value(&document), Ok(()));

        document["shop"] = json!("");
        let error = validate_value(&document).unwrap_err();
        assert_eq!(error.violations[0].document_path, "/shop");
    }

    #[test]
    fn violation_display_names_both_paths() {
        let violation = Violation {
            schema_path: "#/properties/status/$ref/properties/flags/pattern".into(),
            document_path: "/modules/0/status/flags".into(),
            message: "\"0201\" does not match \"^[01]{4}$\"".into(),
            value: json!("0201"),
        };
        assert_eq!(
            violation.to_string(),
            "from schema #/properties/status/$ref/properties/flags/pattern:\n  /modules/0/status/flags: \"0201\" does not match \"^[01]{4}$\""
        );
    }
}
