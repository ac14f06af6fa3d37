use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

fn write(dir: &Path, name: &str, body: &str) {
    let mut file = File::create(dir.join(name)).expect("create input");
    file.write_all(body.as_bytes()).expect("write input");
}

/// Two legs along the equator, roughly 110 m and 55 m.
fn scenario_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "waypoints.csv",
        "Latitude (deg),Longitude (deg),Thrust (N)\n0.0,0.0,1000\n0.0,0.001,500\n0.0,0.0015,0\n",
    );
    write(
        dir.path(),
        "resistance.csv",
        "Speed (m/s),Resistance (N)\n0,0\n10,100\n",
    );
    write(
        dir.path(),
        "scenario.toml",
        "name = \"equator trial\"\nmass_tonnes = 1.0\ntimestep_s = 1.0\nwaypoints = \"waypoints.csv\"\nresistance = \"resistance.csv\"\nspeed_unit = \"meters_per_second\"\noutput = \"out/series.csv\"\nsummary = \"out/summary.json\"\n",
    );
    dir
}

#[test]
fn scenario_run_writes_series_and_summary() {
    let dir = scenario_dir();

    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--scenario")
        .arg(dir.path().join("scenario.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Voyage Summary ==="))
        .stdout(predicate::str::contains("Outcome: completed"));

    let series = fs::read_to_string(dir.path().join("out/series.csv")).expect("series csv");
    let mut lines = series.lines();
    assert!(lines.next().unwrap().starts_with("step,time_s,time_min,"));
    assert!(lines.next().unwrap().starts_with("0,0,"));

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("out/summary.json")).expect("summary json"),
    )
    .expect("valid json");
    assert_eq!(summary["name"], "equator trial");
    assert_eq!(summary["termination"], "completed");
    assert_eq!(summary["legs"].as_array().unwrap().len(), 2);
    assert_eq!(summary["waypoint_markers"].as_array().unwrap().len(), 3);
}

#[test]
fn explicit_flags_stream_csv_to_stdout() {
    let dir = scenario_dir();

    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--waypoints")
        .arg(dir.path().join("waypoints.csv"))
        .arg("--resistance")
        .arg(dir.path().join("resistance.csv"))
        .args(["--mass-tonnes", "1", "--timestep", "1", "--speed-unit", "mps"])
        .args(["--output", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("step,time_s,"))
        .stdout(predicate::str::contains("Voyage Summary").not());
}

#[test]
fn step_limit_is_reported() {
    let dir = scenario_dir();

    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--scenario")
        .arg(dir.path().join("scenario.toml"))
        .args(["--max-steps", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("step limit reached during leg 0"));
}

#[test]
fn zero_mass_fails_before_running() {
    let dir = scenario_dir();

    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--scenario")
        .arg(dir.path().join("scenario.toml"))
        .args(["--mass-tonnes", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mass_tonnes"));
    assert!(!dir.path().join("out/series.csv").exists());
}

#[test]
fn missing_inputs_are_an_error() {
    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .args(["--mass-tonnes", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--scenario"));
}

#[test]
fn flags_override_an_invalid_manifest_value() {
    let dir = scenario_dir();
    write(
        dir.path(),
        "zero.toml",
        "mass_tonnes = 0.0\ntimestep_s = 1.0\nwaypoints = \"waypoints.csv\"\nresistance = \"resistance.csv\"\nspeed_unit = \"meters_per_second\"\n",
    );

    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--scenario")
        .arg(dir.path().join("zero.toml"))
        .args(["--mass-tonnes", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Outcome: completed"));
}

#[test]
fn manifest_summary_dash_goes_to_stdout() {
    let dir = scenario_dir();
    write(
        dir.path(),
        "stdout.toml",
        "mass_tonnes = 1.0\ntimestep_s = 1.0\nwaypoints = \"waypoints.csv\"\nresistance = \"resistance.csv\"\nspeed_unit = \"meters_per_second\"\nsummary = \"-\"\n",
    );

    let assert = Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--scenario")
        .arg(dir.path().join("stdout.toml"))
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&stdout).expect("summary json on stdout");
    assert_eq!(summary["termination"], "completed");
    assert!(!dir.path().join("-").exists());
}

#[test]
fn both_artifacts_on_stdout_is_rejected() {
    let dir = scenario_dir();

    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--scenario")
        .arg(dir.path().join("scenario.toml"))
        .args(["--output", "-", "--summary", "-"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot both write to stdout"));
}

#[test]
fn progress_is_logged_without_changing_results() {
    let dir = scenario_dir();
    let quiet = dir.path().join("quiet.json");
    let chatty = dir.path().join("chatty.json");

    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--scenario")
        .arg(dir.path().join("scenario.toml"))
        .arg("--summary")
        .arg(&quiet)
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains("% complete").not());

    Command::cargo_bin("voyage")
        .expect("voyage bin")
        .arg("--scenario")
        .arg(dir.path().join("scenario.toml"))
        .arg("--summary")
        .arg(&chatty)
        .args(["--progress-every", "5"])
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains("% complete"))
        .stderr(predicate::str::contains("step=5"));

    let read = |p: &Path| -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(p).expect("summary")).expect("json")
    };
    assert_eq!(read(&quiet), read(&chatty));
}
