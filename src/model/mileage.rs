use serde::Serialize;

use crate::hydrate::{Document, Fields, HydrationError};

/// Miles per kilometer.
pub const KM_TO_MILES: f64 = 0.62137119223733;

/// A distance known in both kilometers and miles.
///
/// Both fields are fixed together at construction; there is no way to
/// change one without the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Mileage {
    km: u32,
    miles: u32,
}

impl Mileage {
    /// Derives the distance in miles, truncated.
    pub fn from_km(km: u32) -> Self {
        Self {
            km,
            miles: (f64::from(km) * KM_TO_MILES).trunc() as u32,
        }
    }

    /// Derives the distance in kilometers, truncated.
    ///
    /// Returns `None` when the distance in kilometers does not fit in a `u32`.
    pub fn from_miles(miles: u32) -> Option<Self> {
        let km = (f64::from(miles) / KM_TO_MILES).trunc();
        let km = u32::try_from(km as u64).ok()?;
        Some(Self { km, miles })
    }

    pub fn km(&self) -> u32 {
        self.km
    }

    pub fn miles(&self) -> u32 {
        self.miles
    }
}

impl Document for Mileage {
    const TEMPLATE: &'static str = "Mileage";
    const KEYS: &'static [&'static str] = &["km", "miles"];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            km: fields.required("km")?,
            miles: fields.required("miles")?,
        })
    }
}
