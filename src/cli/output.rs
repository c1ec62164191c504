//! Handles all user-facing output for the CLI.
//!
//! Text output is colorized with `termcolor` when the stream is a terminal;
//! JSON output mirrors the serialized document and error shapes.

use std::io;

use serde_json::{json, Value};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::ReportError;
use crate::model::{Module, Report, StatusKind};
use crate::pipeline::ReportFile;

/// Standard output, colored only when attached to a terminal.
pub fn stdout() -> StandardStream {
    StandardStream::stdout(color_choice(atty::Stream::Stdout))
}

pub fn stderr() -> StandardStream {
    StandardStream::stderr(color_choice(atty::Stream::Stderr))
}

fn color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

// ============================================================================
// TEXT OUTPUT
// ============================================================================

/// Prints a summary of a report and its modules.
pub fn print_report(out: &mut impl WriteColor, filename: &str, report: &Report) -> io::Result<()> {
    colored(out, Color::Green, true, filename)?;
    writeln!(out)?;

    let duration = report.duration();
    writeln!(
        out,
        "  Date:      {} (took {}:{:02})",
        report.date().format("%Y-%m-%d %H:%M:%S"),
        duration.minutes(),
        duration.seconds()
    )?;
    let software = report.software();
    writeln!(
        out,
        "  Software:  VCDS {} ({}), data {} of {}",
        software.version(),
        software.platform(),
        software.data_version(),
        software.data_version_date()
    )?;
    if let Some(shop) = report.shop() {
        writeln!(out, "  Shop:      {shop}")?;
    }

    let vehicle = report.vehicle();
    write!(out, "  Vehicle:   {}", vehicle.vin())?;
    if let Some(plate) = vehicle.license_plate() {
        write!(out, " [{plate}]")?;
    }
    writeln!(out, ", {} ({})", vehicle.chassis(), vehicle.vehicle_type())?;
    writeln!(
        out,
        "  Mileage:   {} km / {} miles",
        vehicle.mileage().km(),
        vehicle.mileage().miles()
    )?;

    let faulty = report.faulty_modules().count();
    let faults: usize = report.modules().iter().map(|m| m.faults().len()).sum();
    writeln!(
        out,
        "  Modules:   {} ({faulty} faulty, {faults} fault(s))",
        report.modules().len()
    )?;
    writeln!(out)?;

    for module in report.modules() {
        print_module(out, module)?;
    }
    Ok(())
}

fn print_module(out: &mut impl WriteColor, module: &Module) -> io::Result<()> {
    let status = module.status();
    let color = match status.kind() {
        StatusKind::Ok => Color::Green,
        StatusKind::Unreachable => Color::Cyan,
        _ => Color::Red,
    };

    write!(out, "  {} {:<24} ", module.address(), module.name())?;
    colored(out, color, false, &format!("{} {}", status.flags(), status.description()))?;
    writeln!(out)?;

    if let Some(info) = module.info() {
        writeln!(
            out,
            "       {} / {}, coding {}",
            info.part_number().software(),
            info.component(),
            info.coding().value()
        )?;
    }
    for subsystem in module.subsystems() {
        writeln!(
            out,
            "       subsystem {}: {} {}",
            subsystem.index(),
            subsystem.part_number(),
            subsystem.component()
        )?;
    }
    for fault in module.faults() {
        write!(out, "       ")?;
        colored(out, Color::Yellow, true, fault.code())?;
        write!(out, " {}", fault.subject())?;
        if let Some(code) = fault.error_code() {
            write!(out, " [{code}]")?;
        }
        if !fault.conditions().is_empty() {
            write!(out, " ({})", fault.conditions().join(", "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Prints a pipeline error: the rendered context, the violations, or the
/// parser-defect warning.
pub fn print_error(out: &mut impl WriteColor, error: &ReportError) -> io::Result<()> {
    let (color, title) = match error {
        ReportError::Syntax { .. } => (Color::Red, "SYNTAX ERROR"),
        ReportError::Hydration { .. } => (Color::Magenta, "PARSER DEFECT"),
        ReportError::Validation { .. } => (Color::Yellow, "INVALID REPORT"),
    };
    colored(out, color, true, title)?;
    writeln!(out, " {error}")?;

    match error {
        ReportError::Syntax {
            rendered_context, ..
        } => writeln!(out, "{rendered_context}")?,
        ReportError::Hydration { .. } => writeln!(
            out,
            "This is NOT related to the vehicle: this is a problem with the parser.\n\
             Please report it along with the report file."
        )?,
        ReportError::Validation { .. } => {
            for violation in error.violations() {
                writeln!(out, "{violation}")?;
                writeln!(out, "  value: {}", violation.value)?;
            }
        }
    }
    Ok(())
}

/// Prints one line per file of a batch.
pub fn print_batch_line(out: &mut impl WriteColor, file: &ReportFile) -> io::Result<()> {
    match file.outcome() {
        Ok(report) => {
            colored(out, Color::Green, false, &format!("{:>9} km", report.vehicle().mileage().km()))?;
            writeln!(
                out,
                "  {}  {}  {} module(s), {} faulty",
                file.filename(),
                report.vehicle().vin(),
                report.modules().len(),
                report.faulty_modules().count()
            )
        }
        Err(error) => {
            let label = if error.is_defect() { "   DEFECT" } else { "   FAILED" };
            colored(out, Color::Red, true, &format!("{label}   "))?;
            writeln!(out, "  {error}")
        }
    }
}

fn colored(out: &mut impl WriteColor, color: Color, bold: bool, text: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
    write!(out, "{text}")?;
    out.reset()
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

/// JSON view of one processed file.
pub fn file_json(file: &ReportFile) -> Value {
    match file.outcome() {
        Ok(report) => json!({
            "filename": file.filename(),
            "ok": true,
            "report": report,
        }),
        Err(error) => json!({
            "filename": file.filename(),
            "ok": false,
            "error": error,
        }),
    }
}
