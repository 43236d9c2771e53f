use gcodesend_gcode::{EstimateReport, TimeEstimator, TravelOptimizer};
use proptest::prelude::*;
use std::io::Cursor;

const PROGRAM: &str = "\
; calibration square
G28
G90
G1 Z0.3 F600
G0 X10 Y10 F6000
G0 X20
G1 X20 Y20 E1.5 F1200
G1 X10 Y20 E3.0
M83
G1 X10 Y10 E1.5
";

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_estimate_program() {
    let report = TimeEstimator::estimate_reader(Cursor::new(PROGRAM)).unwrap();

    assert_eq!(report.moves, 7);
    // 0.3 + sqrt(200) + 10 + 10 + 10 + 10 mm
    let expected_mm = 0.3 + 200f64.sqrt() + 40.0;
    assert!(approx(report.distance_m, expected_mm / 1000.0));
    assert!(approx(report.filament_m, 0.0045));

    let expected_s = 0.3 / 600.0 * 60.0
        + (200f64.sqrt() + 10.0) / 6000.0 * 60.0
        + 30.0 / 1200.0 * 60.0;
    assert!(approx(report.time_s, expected_s));
}

#[test]
fn test_estimate_report_json() {
    let report = EstimateReport {
        distance_m: 1.5,
        time_s: 90.0,
        filament_m: 0.25,
        moves: 3,
    };
    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["moves"], 3);
    assert_eq!(json["time_s"], 90.0);
}

#[test]
fn test_estimate_display() {
    let report = EstimateReport {
        distance_m: 0.0,
        time_s: 3661.0,
        filament_m: 0.0,
        moves: 0,
    };
    assert!(report.to_string().contains("(1:01:01)"));
}

#[test]
fn test_optimize_program() {
    let mut out = Vec::new();
    let stats = TravelOptimizer::optimize(Cursor::new(PROGRAM), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("G0 F6000 X20 Y10 ; opt 2 lines\r\n"));
    assert!(text.starts_with("; calibration square\r\nG28\r\n"));
    assert!(text.ends_with("G1 X10 Y10 E1.5\r\n"));
    assert_eq!(stats.lines_in, 10);
    assert_eq!(stats.lines_out, 9);
    assert_eq!(stats.merged, 1);
}

#[test]
fn test_optimize_accepts_crlf_input() {
    let mut out = Vec::new();
    TravelOptimizer::optimize(Cursor::new("G0 X1\r\nG0 X2\r\nG1 X3\r\n"), &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "G0 X2 ; opt 2 lines\r\nG1 X3\r\n"
    );
}

fn program_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..100i32, 0..100i32).prop_map(|(x, y)| format!("G0 X{} Y{}", x, y)),
        (0..100i32).prop_map(|z| format!("G0 Z{}", z)),
        (0..100i32, 1..10i32).prop_map(|(x, e)| format!("G1 X{} E{}", x, e)),
        Just("G90".to_string()),
        Just("G91".to_string()),
        Just("; note".to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_non_travel_lines_survive_in_order(lines in prop::collection::vec(program_line(), 0..40)) {
        let mut optimizer = TravelOptimizer::new();
        let mut out = Vec::new();
        for line in &lines {
            out.extend(optimizer.process_line(line).unwrap());
        }
        out.extend(optimizer.flush());

        let kept: Vec<&String> = lines
            .iter()
            .filter(|l| !(l.starts_with("G0 X")))
            .collect();
        let emitted: Vec<&String> = out.iter().filter(|l| !l.contains("; opt ")).collect();
        prop_assert_eq!(kept, emitted);
        prop_assert!(out.len() <= lines.len());
    }
}
