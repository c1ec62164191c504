use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::{Mileage, Module};
use crate::hydrate::{Document, Fields, HydrationError};

/// One auto-scan of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    date: NaiveDateTime,
    duration: Duration,
    shop: Option<String>,
    software: Software,
    vehicle: Vehicle,
    modules: Vec<Module>,
}

impl Report {
    /// When the scan started.
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn shop(&self) -> Option<&str> {
        self.shop.as_deref()
    }

    pub fn software(&self) -> &Software {
        &self.software
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// Modules ordered by decimal address.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Looks a module up by its decimal address.
    pub fn module(&self, address: u8) -> Option<&Module> {
        self.modules
            .binary_search_by_key(&address, Module::decimal_address)
            .ok()
            .map(|index| &self.modules[index])
    }

    /// Whether any module reported a fault.
    pub fn has_faults(&self) -> bool {
        self.modules.iter().any(Module::has_faults)
    }

    pub fn faulty_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|module| module.is_faulty())
    }
}

impl Document for Report {
    const TEMPLATE: &'static str = "Report";
    const KEYS: &'static [&'static str] = &[
        "date", "duration", "shop", "software", "vehicle", "modules",
    ];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        let mut modules: Vec<Module> = fields.documents("modules")?;
        modules.sort_by_key(Module::decimal_address);
        if let Some(pair) = modules
            .windows(2)
            .find(|pair| pair[0].decimal_address() == pair[1].decimal_address())
        {
            return Err(HydrationError::DuplicateEntry {
                path: fields.path_of("modules"),
                entry: "module address",
                key: pair[1].address().to_string(),
            });
        }

        Ok(Self {
            date: fields.required("date")?,
            duration: fields.document("duration")?,
            shop: fields.optional("shop")?,
            software: fields.document("software")?,
            vehicle: fields.document("vehicle")?,
            modules,
        })
    }
}

/// How long the scan took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Duration {
    minutes: u32,
    seconds: u8,
}

impl Duration {
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn as_std(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.minutes) * 60 + u64::from(self.seconds))
    }
}

impl Document for Duration {
    const TEMPLATE: &'static str = "Duration";
    const KEYS: &'static [&'static str] = &["minutes", "seconds"];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            minutes: fields.required("minutes")?,
            seconds: fields.required("seconds")?,
        })
    }
}

/// The scan tool that produced the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Software {
    version: String,
    platform: String,
    data_version: String,
    data_version_date: NaiveDate,
}

impl Software {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn data_version(&self) -> &str {
        &self.data_version
    }

    pub fn data_version_date(&self) -> NaiveDate {
        self.data_version_date
    }
}

impl Document for Software {
    const TEMPLATE: &'static str = "Software";
    const KEYS: &'static [&'static str] = &["version", "platform", "dataVersion", "dataVersionDate"];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            version: fields.required("version")?,
            platform: fields.required("platform")?,
            data_version: fields.required("dataVersion")?,
            data_version_date: fields.required("dataVersionDate")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    vin: String,
    license_plate: Option<String>,
    chassis: String,
    #[serde(rename = "type")]
    vehicle_type: String,
    mileage: Mileage,
}

impl Vehicle {
    pub fn vin(&self) -> &str {
        &self.vin
    }

    pub fn license_plate(&self) -> Option<&str> {
        self.license_plate.as_deref()
    }

    pub fn chassis(&self) -> &str {
        &self.chassis
    }

    pub fn vehicle_type(&self) -> &str {
        &self.vehicle_type
    }

    pub fn mileage(&self) -> Mileage {
        self.mileage
    }
}

impl Document for Vehicle {
    const TEMPLATE: &'static str = "Vehicle";
    const KEYS: &'static [&'static str] = &["vin", "licensePlate", "chassis", "type", "mileage"];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            vin: fields.required("vin")?,
            license_plate: fields.optional("licensePlate")?,
            chassis: fields.required("chassis")?,
            vehicle_type: fields.required("type")?,
            mileage: fields.document("mileage")?,
        })
    }
}
