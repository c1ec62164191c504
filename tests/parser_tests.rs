// tests/parser_tests.rs

mod common;

use autoscan::syntax::parse;
use serde_json::json;

use common::{fixture, golf, golf_with};

#[test]
fn parses_header_and_vehicle() {
    let tree = parse(&golf()).unwrap();

    assert_eq!(tree["date"], json!("2024-01-15T10:23:45"));
    assert_eq!(tree["duration"], json!({ "minutes": 3, "seconds": 12 }));
    assert_eq!(tree["shop"], json!("WSC 01357 011 00200"));
    assert_eq!(
        tree["software"],
        json!({
            "version": "23.11.0",
            "platform": "x64",
            "dataVersion": "DS370.0",
            "dataVersionDate": "2023-11-20",
        })
    );
    assert_eq!(
        tree["vehicle"],
        json!({
            "vin": "WVWZZZ1KZ8W123456",
            "licensePlate": "AB-123-CD",
            "chassis": "1K0",
            "type": "1K - VW Golf/Jetta V PQ35",
            "mileage": { "km": 123456, "miles": 76712 },
        })
    );
}

#[test]
fn parses_every_module_block() {
    let tree = parse(&golf()).unwrap();
    let addresses: Vec<&str> = tree["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|module| module["address"].as_str().unwrap())
        .collect();

    assert_eq!(addresses, ["01", "03", "09", "17"]);
}

#[test]
fn parses_module_info() {
    let tree = parse(&golf()).unwrap();
    let engine = &tree["modules"][0];

    assert_eq!(engine["name"], json!("Engine"));
    assert_eq!(engine["isReachable"], json!(true));
    assert_eq!(
        engine["status"],
        json!({ "flags": "0010", "description": "Malfunction" })
    );
    assert_eq!(
        engine["info"]["partNumber"],
        json!({ "software": "03C 906 056 DP", "hardware": "03C 906 056 CP" })
    );
    assert_eq!(engine["info"]["component"], json!("R4 1,4L EPI  G   0010"));
    assert_eq!(engine["info"]["revision"], json!("5AH11001"));
    assert_eq!(engine["info"]["serial"], json!("VWX7Z0H5KL1234"));
    assert_eq!(
        engine["info"]["coding"],
        json!({ "value": "0000074", "wsc": "01357 011 00200" })
    );
    assert_eq!(engine["info"]["readiness"], json!("0110 0101"));
}

#[test]
fn unreachable_module_has_no_info() {
    let tree = parse(&golf()).unwrap();
    let abs = &tree["modules"][1];

    assert_eq!(abs["isReachable"], json!(false));
    assert_eq!(abs["info"], json!(null));
    assert_eq!(abs["subsystems"], json!([]));
    assert_eq!(abs["faults"], json!([]));
    assert_eq!(abs["status"]["description"], json!("Cannot be reached"));
}

#[test]
fn parses_subsystems() {
    let tree = parse(&golf()).unwrap();
    let subsystems = &tree["modules"][2]["subsystems"];

    assert_eq!(
        subsystems[0],
        json!({
            "index": 1,
            "partNumber": "1K1955119F",
            "component": "Wiper Motor     H05 0503",
            "labelsFile": null,
            "coding": "00064",
            "wsc": "01357 011 00200",
        })
    );
    assert_eq!(subsystems[1]["index"], json!(2));
    assert_eq!(subsystems[1]["coding"], json!(null));
    assert_eq!(tree["modules"][2]["faults"], json!([]));
}

#[test]
fn parses_faults_and_freeze_frames() {
    let tree = parse(&golf()).unwrap();
    let faults = tree["modules"][0]["faults"].as_array().unwrap();

    assert_eq!(faults.len(), 2);
    assert_eq!(faults[0]["code"], json!("16684"));
    assert_eq!(faults[0]["errorCode"], json!("P0300"));
    assert_eq!(faults[0]["descriptionCode"], json!("002"));
    assert_eq!(faults[0]["description"], json!("Upper Limit Exceeded"));
    assert_eq!(
        faults[0]["conditions"],
        json!(["Intermittent", "Confirmed", "Tested Since Memory Clear"])
    );
    assert_eq!(
        faults[0]["freezeFrame"],
        json!({
            "status": "01101111",
            "priority": 2,
            "frequency": 1,
            "resetCounter": 255,
            "mileage": { "km": 123400, "miles": 76677 },
            "timeIndication": 0,
            "date": "2024-01-10",
            "time": "08:15:30",
        })
    );

    assert_eq!(faults[1]["subject"], json!("Supply Voltage B+"));
    assert_eq!(faults[1]["errorCode"], json!(null));
    assert_eq!(faults[1]["conditions"], json!([]));
    assert_eq!(faults[1]["freezeFrame"], json!(null));
}

#[test]
fn crlf_line_endings_produce_the_same_tree() {
    let unix = parse(&golf()).unwrap();
    let windows = parse(&golf().replace('\n', "\r\n")).unwrap();
    assert_eq!(unix, windows);
}

#[test]
fn trailing_spaces_are_tolerated() {
    let text = golf_with("Coding: 0000074\n", "Coding: 0000074   \n");
    let tree = parse(&text).unwrap();
    assert_eq!(tree["modules"][0]["info"]["coding"]["value"], json!("0000074"));
}

#[test]
fn single_mileage_unit_is_converted() {
    let tree = parse(&golf_with("Mileage: 123456km-76712miles", "Mileage: 76712miles")).unwrap();
    assert_eq!(
        tree["vehicle"]["mileage"],
        json!({ "km": 123455, "miles": 76712 })
    );
}

#[test]
fn missing_shop_and_plate_are_null() {
    let text = golf_with("Shop #: WSC 01357 011 00200\n\nVIN", "VIN")
        .replacen("   License Plate: AB-123-CD", "", 1);
    let tree = parse(&text).unwrap();
    assert_eq!(tree["shop"], json!(null));
    assert_eq!(tree["vehicle"]["licensePlate"], json!(null));
}

#[test]
fn truncated_module_reports_the_truncation_point() {
    let error = parse(&fixture("truncated.txt")).unwrap_err();

    assert_eq!(error.location.start.line, 67);
    assert_eq!(error.location.start.column, 24);
    assert_eq!(error.location.start.offset, 2282);
    assert!(error.message.contains("module status"), "{}", error.message);
}

#[test]
fn fault_count_must_match_fault_blocks() {
    let error = parse(&golf_with("2 Faults Found:", "3 Faults Found:")).unwrap_err();

    assert_eq!(error.message, "announced 3 fault(s) but 2 fault block(s) follow");
    assert_eq!(error.location.start.line, 26);
    assert_eq!(error.location.start.column, 1);
    assert_eq!(error.location.len(), 1);
}

#[test]
fn impossible_dates_are_syntax_errors() {
    let error = parse(&golf_with("Monday,15,January,2024", "Monday,30,February,2024")).unwrap_err();
    assert_eq!(error.message, "invalid scan date");
    assert_eq!(error.location.start.line, 1);
}

#[test]
fn garbage_fails_on_the_first_line() {
    let error = parse("this is not a report\n").unwrap_err();
    assert_eq!(error.location.start.line, 1);
    assert_eq!(error.location.start.column, 1);
}

#[test]
fn duplicate_subsystem_index_is_rejected() {
    let text = golf_with("Subsystem 2 -", "Subsystem 1 -");
    let error = parse(&text).unwrap_err();

    assert_eq!(error.message, "duplicate subsystem index 1");
    assert_eq!(error.location.start.line, 61);
}
