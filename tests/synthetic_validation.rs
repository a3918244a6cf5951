//! Integration tests validating the detector against synthetic scenes.
//!
//! Each case in `tests/data/scenarios.json` describes a rendered disk scene,
//! the detector radius and the expected particle centers.

use ringcorr::synth::{render_disks, Disk};
use ringcorr::{DetectConfig, Detector, KernelShape};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Position tolerance in pixels unless the case overrides it.
const POSITION_TOLERANCE_PX: f32 = 1.0;

#[derive(Debug, Deserialize)]
struct Manifest {
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct DiskSpec {
    row: f32,
    col: f32,
    radius: f32,
    #[serde(default = "unit_value")]
    value: f32,
}

fn unit_value() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct DetectSpec {
    radius: f32,
    #[serde(default)]
    threshold: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct Center {
    row: f32,
    col: f32,
}

#[derive(Debug, Deserialize)]
struct Case {
    case_id: String,
    height: usize,
    width: usize,
    disks: Vec<DiskSpec>,
    detect: DetectSpec,
    expected: Vec<Center>,
    #[serde(default)]
    tolerance_px: Option<f32>,
}

fn load_manifest() -> Manifest {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/scenarios.json");
    let text = fs::read_to_string(&path).expect("Failed to read scenario manifest");
    serde_json::from_str(&text).expect("Failed to parse scenario manifest")
}

/// Runs a single synthetic case.
fn run_case(case: &Case) -> Result<(), String> {
    let disks: Vec<Disk> = case
        .disks
        .iter()
        .map(|d| Disk::new(d.row, d.col, d.radius).with_value(d.value))
        .collect();
    let image = render_disks(case.height, case.width, &disks)
        .map_err(|e| format!("Failed to render scene: {}", e))?;

    let defaults = DetectConfig::default();
    let detector = Detector::new(DetectConfig {
        shape: KernelShape::Ring {
            radius: case.detect.radius,
            width: 1.5,
        },
        threshold: case.detect.threshold.unwrap_or(defaults.threshold),
        ..defaults
    });
    let detection = detector
        .detect_grid(&image)
        .map_err(|e| format!("Detection failed: {}", e))?;

    if detection.centers.len() != case.expected.len() {
        return Err(format!(
            "expected {} centers, got {}: {:?}",
            case.expected.len(),
            detection.centers.len(),
            detection.centers
        ));
    }

    let tolerance = case.tolerance_px.unwrap_or(POSITION_TOLERANCE_PX);
    for expected in &case.expected {
        let err = detection
            .centers
            .iter()
            .map(|c| (c.row - expected.row).hypot(c.col - expected.col))
            .fold(f32::INFINITY, f32::min);
        if err > tolerance {
            return Err(format!(
                "center error: {:.2} > {:.1} at ({:.1}, {:.1})",
                err, tolerance, expected.row, expected.col
            ));
        }
    }

    Ok(())
}

#[test]
fn test_synthetic_cases() {
    let manifest = load_manifest();
    assert!(!manifest.cases.is_empty());

    let mut passed = 0;
    let mut failures: Vec<(String, String)> = vec![];

    for case in &manifest.cases {
        match run_case(case) {
            Ok(()) => {
                passed += 1;
                println!("PASS: {}", case.case_id);
            }
            Err(e) => {
                println!("FAIL: {} - {}", case.case_id, e);
                failures.push((case.case_id.clone(), e));
            }
        }
    }

    println!("\n--- Summary ---");
    println!("Passed: {}/{}", passed, manifest.cases.len());

    if !failures.is_empty() {
        println!("\nFailures:");
        for (case_id, error) in &failures {
            println!("  {}: {}", case_id, error);
        }
        panic!("{} test case(s) failed", failures.len());
    }
}
