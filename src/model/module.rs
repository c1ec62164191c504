use serde::Serialize;

use super::Fault;
use crate::hydrate::{Document, Fields, HydrationError};

/// Status flags of a module without any problem.
pub const OK_PATTERN: &str = "0000";

/// One electronic control unit of the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    address: String,
    #[serde(skip)]
    decimal_address: u8,
    name: String,
    is_reachable: bool,
    status: ModuleStatus,
    info: Option<ModuleInfo>,
    subsystems: Vec<Subsystem>,
    faults: Vec<Fault>,
}

impl Module {
    /// Address as printed, e.g. `"01"`.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn decimal_address(&self) -> u8 {
        self.decimal_address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_reachable(&self) -> bool {
        self.is_reachable
    }

    pub fn status(&self) -> &ModuleStatus {
        &self.status
    }

    pub fn is_faulty(&self) -> bool {
        self.status.flags != OK_PATTERN
    }

    /// Identification data; absent exactly when the module was unreachable.
    pub fn info(&self) -> Option<&ModuleInfo> {
        self.info.as_ref()
    }

    /// Subsystems ordered by index.
    pub fn subsystems(&self) -> &[Subsystem] {
        &self.subsystems
    }

    pub fn has_subsystems(&self) -> bool {
        !self.subsystems.is_empty()
    }

    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    pub fn has_faults(&self) -> bool {
        !self.faults.is_empty()
    }
}

impl Document for Module {
    const TEMPLATE: &'static str = "Module";
    const KEYS: &'static [&'static str] = &[
        "address",
        "name",
        "isReachable",
        "status",
        "info",
        "subsystems",
        "faults",
    ];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        let address: String = fields.required("address")?;
        let decimal_address = parse_address(&address).ok_or_else(|| HydrationError::InvalidValue {
            path: fields.path_of("address"),
            reason: format!("`{address}` is not a two-digit decimal address"),
        })?;

        let is_reachable: bool = fields.required("isReachable")?;
        let info: Option<ModuleInfo> = fields.optional_document("info")?;
        if is_reachable != info.is_some() {
            return Err(HydrationError::Inconsistent {
                path: fields.path().to_string(),
                template: Self::TEMPLATE,
                reason: format!(
                    "isReachable is {is_reachable} but the info block is {}",
                    if info.is_some() { "present" } else { "absent" }
                ),
            });
        }

        let mut subsystems: Vec<Subsystem> = fields.documents("subsystems")?;
        subsystems.sort_by_key(Subsystem::index);
        if let Some(pair) = subsystems.windows(2).find(|pair| pair[0].index == pair[1].index) {
            return Err(HydrationError::DuplicateEntry {
                path: fields.path_of("subsystems"),
                entry: "subsystem index",
                key: pair[1].index.to_string(),
            });
        }

        Ok(Self {
            address,
            decimal_address,
            name: fields.required("name")?,
            is_reachable,
            status: fields.document("status")?,
            info,
            subsystems,
            faults: fields.documents("faults")?,
        })
    }
}

fn parse_address(address: &str) -> Option<u8> {
    if address.len() == 2 && address.bytes().all(|b| b.is_ascii_digit()) {
        address.parse().ok()
    } else {
        None
    }
}

/// Classification of the known status flag patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    Ok,
    Malfunction,
    Unreachable,
    CommunicationError,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStatus {
    flags: String,
    description: String,
}

impl ModuleStatus {
    /// The 4-bit flag field as printed, e.g. `"0010"`.
    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The flag field as a number, if it is a valid bit pattern.
    pub fn bits(&self) -> Option<u8> {
        u8::from_str_radix(&self.flags, 2).ok()
    }

    pub fn kind(&self) -> StatusKind {
        match self.flags.as_str() {
            OK_PATTERN => StatusKind::Ok,
            "0010" => StatusKind::Malfunction,
            "1100" => StatusKind::Unreachable,
            "1000" => StatusKind::CommunicationError,
            _ => StatusKind::Other,
        }
    }
}

impl Document for ModuleStatus {
    const TEMPLATE: &'static str = "ModuleStatus";
    const KEYS: &'static [&'static str] = &["flags", "description"];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            flags: fields.required("flags")?,
            description: fields.required("description")?,
        })
    }
}

/// Identification data of a reachable module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    labels_file: String,
    part_number: PartNumber,
    component: String,
    revision: String,
    serial: String,
    coding: Coding,
    vcid: String,
    vinid: String,
    readiness: Option<String>,
}

impl ModuleInfo {
    pub fn labels_file(&self) -> &str {
        &self.labels_file
    }

    pub fn part_number(&self) -> &PartNumber {
        &self.part_number
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn coding(&self) -> &Coding {
        &self.coding
    }

    pub fn vcid(&self) -> &str {
        &self.vcid
    }

    pub fn vinid(&self) -> &str {
        &self.vinid
    }

    pub fn readiness(&self) -> Option<&str> {
        self.readiness.as_deref()
    }
}

impl Document for ModuleInfo {
    const TEMPLATE: &'static str = "ModuleInfo";
    const KEYS: &'static [&'static str] = &[
        "labelsFile",
        "partNumber",
        "component",
        "revision",
        "serial",
        "coding",
        "vcid",
        "vinid",
        "readiness",
    ];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            labels_file: fields.required("labelsFile")?,
            part_number: fields.document("partNumber")?,
            component: fields.required("component")?,
            revision: fields.required("revision")?,
            serial: fields.required("serial")?,
            coding: fields.document("coding")?,
            vcid: fields.required("vcid")?,
            vinid: fields.required("vinid")?,
            readiness: fields.optional("readiness")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartNumber {
    software: String,
    hardware: String,
}

impl PartNumber {
    pub fn software(&self) -> &str {
        &self.software
    }

    pub fn hardware(&self) -> &str {
        &self.hardware
    }
}

impl Document for PartNumber {
    const TEMPLATE: &'static str = "PartNumber";
    const KEYS: &'static [&'static str] = &["software", "hardware"];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            software: fields.required("software")?,
            hardware: fields.required("hardware")?,
        })
    }
}

/// A coding value and the workshop code of whoever applied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coding {
    value: String,
    wsc: String,
}

impl Coding {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn wsc(&self) -> &str {
        &self.wsc
    }
}

impl Document for Coding {
    const TEMPLATE: &'static str = "Coding";
    const KEYS: &'static [&'static str] = &["value", "wsc"];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            value: fields.required("value")?,
            wsc: fields.required("wsc")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsystem {
    index: u8,
    part_number: String,
    component: String,
    labels_file: Option<String>,
    coding: Option<String>,
    wsc: Option<String>,
}

impl Subsystem {
    /// 1-based position within the module.
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn part_number(&self) -> &str {
        &self.part_number
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn labels_file(&self) -> Option<&str> {
        self.labels_file.as_deref()
    }

    pub fn coding(&self) -> Option<&str> {
        self.coding.as_deref()
    }

    pub fn wsc(&self) -> Option<&str> {
        self.wsc.as_deref()
    }
}

impl Document for Subsystem {
    const TEMPLATE: &'static str = "Subsystem";
    const KEYS: &'static [&'static str] = &[
        "index",
        "partNumber",
        "component",
        "labelsFile",
        "coding",
        "wsc",
    ];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError> {
        Ok(Self {
            index: fields.required("index")?,
            part_number: fields.required("partNumber")?,
            component: fields.required("component")?,
            labels_file: fields.optional("labelsFile")?,
            coding: fields.optional("coding")?,
            wsc: fields.optional("wsc")?,
        })
    }
}
