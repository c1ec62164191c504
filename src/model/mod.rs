//! The auto-scan document model.
//!
//! Every type is built once by the hydrator and never changes afterwards:
//! fields are private and only exposed through getters. The report owns its
//! modules, each module owns its subsystems and faults, and each fault owns
//! at most one freeze frame.
//!
//! Serializing a document yields the same shape as the raw tree it was
//! hydrated from; derived values such as [`Module::decimal_address`] are
//! not serialized.

mod fault;
mod mileage;
mod module;
mod report;

pub use fault::{Fault, FreezeFrame};
pub use mileage::{Mileage, KM_TO_MILES};
pub use module::{
    Coding, Module, ModuleInfo, ModuleStatus, PartNumber, StatusKind, Subsystem, OK_PATTERN,
};
pub use report::{Duration, Report, Software, Vehicle};
