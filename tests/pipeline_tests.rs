mod common;

use autoscan::{process, process_all, sort_by_mileage, ReportError, Stage};

use common::{fixture, golf, golf_with};

#[test]
fn valid_report_goes_through_every_stage() {
    let file = process("golf.txt", &golf());

    assert_eq!(file.filename(), "golf.txt");
    assert!(file.is_ok());
    assert_eq!(file.report().unwrap().vehicle().vin(), "WVWZZZ1KZ8W123456");
}

#[test]
fn syntax_error_stops_at_parsing() {
    let file = process("truncated.txt", &fixture("truncated.txt"));
    let error = file.error().unwrap();

    assert_eq!(error.stage(), Stage::Parsing);
    assert_eq!(error.filename(), "truncated.txt");
    assert!(!error.is_defect());
    assert!(matches!(error, ReportError::Syntax { .. }));

    let context = error.rendered_context().unwrap();
    assert!(context.starts_with("from line 67 column 24"), "{context}");
    assert!(context.contains("Address 17: Instruments"), "{context}");
}

#[test]
fn schema_violations_stop_at_validation() {
    let file = process("invalid.txt", &fixture("invalid.txt"));
    let error = file.error().unwrap();

    assert_eq!(error.stage(), Stage::Validating);
    assert!(!error.is_defect());
    assert_eq!(error.violations().len(), 2);
    assert!(error.rendered_context().is_none());
}

#[test]
fn batch_preserves_input_order() {
    let files = vec![
        ("truncated.txt".to_string(), fixture("truncated.txt")),
        ("golf.txt".to_string(), golf()),
        ("invalid.txt".to_string(), fixture("invalid.txt")),
    ];

    let results = process_all(&files, 2).unwrap();
    let names: Vec<&str> = results.iter().map(|file| file.filename()).collect();
    let ok: Vec<bool> = results.iter().map(|file| file.is_ok()).collect();

    assert_eq!(names, ["truncated.txt", "golf.txt", "invalid.txt"]);
    assert_eq!(ok, [false, true, false]);
}

#[test]
fn batch_on_the_global_pool() {
    let files = vec![("golf.txt".to_string(), golf())];
    let results = process_all(&files, 0).unwrap();
    assert!(results[0].is_ok());
}

#[test]
fn sorting_puts_highest_mileage_first_and_failures_last() {
    let low = golf_with("Mileage: 123456km-76712miles", "Mileage: 1000km");
    let high = golf_with("Mileage: 123456km-76712miles", "Mileage: 200000km");
    let files = vec![
        ("broken.txt".to_string(), fixture("truncated.txt")),
        ("b.txt".to_string(), golf()),
        ("low.txt".to_string(), low),
        ("a.txt".to_string(), golf()),
        ("high.txt".to_string(), high),
        ("bad.txt".to_string(), fixture("invalid.txt")),
    ];

    let mut results = process_all(&files, 2).unwrap();
    sort_by_mileage(&mut results);
    let names: Vec<&str> = results.iter().map(|file| file.filename()).collect();

    assert_eq!(
        names,
        ["high.txt", "a.txt", "b.txt", "low.txt", "bad.txt", "broken.txt"]
    );
}

#[test]
fn duplicate_module_address_is_a_syntax_error() {
    let text = golf_with("Address 03:", "Address 01:");
    let file = process("dup.txt", &text);
    let error = file.error().unwrap();

    assert_eq!(error.stage(), Stage::Parsing);
    assert!(!error.is_defect());
    let ReportError::Syntax { error: syntax, .. } = error else {
        panic!("expected a syntax error, got {error:?}");
    };
    assert_eq!(syntax.message, "duplicate module address 01");
    assert_eq!(syntax.location.start.offset, text.find("Address 01: ABS").unwrap() + 8);
}

#[test]
fn subsystem_index_zero_is_a_validation_error() {
    let file = process("zero.txt", &golf_with("Subsystem 1 -", "Subsystem 0 -"));
    let error = file.error().unwrap();

    assert_eq!(error.stage(), Stage::Validating);
    assert!(!error.is_defect());
    assert!(error.violations()[0].document_path.ends_with("/index"));
}

#[test]
fn oversized_freeze_frame_number_is_a_syntax_error() {
    let file = process(
        "wide.txt",
        &golf_with("Fault Priority: 2", "Fault Priority: 99999999999"),
    );
    let error = file.error().unwrap();

    assert_eq!(error.stage(), Stage::Parsing);
    assert!(!error.is_defect());
    assert!(matches!(error, ReportError::Syntax { .. }));
    assert!(error.rendered_context().unwrap().contains("99999999999"));
}

#[test]
fn mileage_in_miles_beyond_km_range_is_a_syntax_error() {
    let file = process(
        "far.txt",
        &golf_with("Mileage: 123456km-76712miles", "Mileage: 3000000000miles"),
    );
    let error = file.error().unwrap();

    assert_eq!(error.stage(), Stage::Parsing);
    assert!(!error.is_defect());
    let ReportError::Syntax { error: syntax, .. } = error else {
        panic!("expected a syntax error, got {error:?}");
    };
    assert_eq!(syntax.message, "distance out of range");
}
