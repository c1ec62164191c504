use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::Mileage;
use crate::hydrate::{Document, Fields, HydrationError};

/// A diagnostic trouble code stored by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fault {
    code: String,
    subject: String,
    error_code: Option<String>,
    description_code: String,
    description: String,
    conditions: Vec<String>,
    freeze_frame: Option<FreezeFrame>,
}

impl Fault {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// OBD error code, e.g. `P0301`, when the module reports one.
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn description_code(&self) -> &str {
        &self.description_code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Qualifiers such as `Intermittent` or `Confirmed`.
    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn is_intermittent(&self) -> bool {
        self.conditions
            .iter()
            .any(|condition| condition.eq_ignore_ascii_case("intermittent"))
    }

    pub fn freeze_frame(&self) -> Option<&FreezeFrame> {
        self.freeze_frame.as_ref()
    }
}

impl Document for Fault {
    const TEMPLATE: &'static str = "Fault";
    const KEYS: &'static [&'static str] = &[
        "code",
        "subject",
        "errorCode",
        "descriptionCode",
        "description",
        "conditions",
        "freezeFrame",
    ];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            code: fields.required("code")?,
            subject: fields.required("subject")?,
            error_code: fields.optional("errorCode")?,
            description_code: fields.required("descriptionCode")?,
            description: fields.required("description")?,
            conditions: fields.scalars("conditions")?,
            freeze_frame: fields.optional_document("freezeFrame")?,
        })
    }
}

/// Vehicle conditions captured when a fault was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezeFrame {
    status: String,
    priority: u32,
    frequency: u32,
    reset_counter: u32,
    mileage: Mileage,
    time_indication: u32,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

impl FreezeFrame {
    /// Fault status bits as printed.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn reset_counter(&self) -> u32 {
        self.reset_counter
    }

    pub fn mileage(&self) -> Mileage {
        self.mileage
    }

    pub fn time_indication(&self) -> u32 {
        self.time_indication
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }
}

impl Document for FreezeFrame {
    const TEMPLATE: &'static str = "FreezeFrame";
    const KEYS: &'static [&'static str] = &[
        "status",
        "priority",
        "frequency",
        "resetCounter",
        "mileage",
        "timeIndication",
        "date",
        "time",
    ];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            status: fields.required("status")?,
            priority: fields.required("priority")?,
            frequency: fields.required("frequency")?,
            reset_counter: fields.required("resetCounter")?,
            mileage: fields.document("mileage")?,
            time_indication: fields.required("timeIndication")?,
            date: fields.optional("date")?,
            time: fields.optional("time")?,
        })
    }
}
