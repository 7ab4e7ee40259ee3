use std::io::Write;
use std::process::{Command, Output, Stdio};

use intersection_sim::simulation::NetworkConfig;

fn run_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_intersection_sim"))
        .args(args)
        .env("RUST_LOG", "warn,intersection_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that a seeded run completes and prints the report
#[test]
fn test_simulation_runs_to_completion() {
    let output = run_sim(&["200", "10", "--seed", "3"]);

    assert!(
        output.status.success(),
        "Simulation failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(stdout.contains("FINAL REPORT"), "Missing report. stdout: {}", stdout);
    assert!(stdout.contains("Sources"), "Missing source lanes");
    assert!(stdout.contains("W1east"), "Missing lane rows");
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that the completion summary carries the vehicle counts
#[test]
fn test_simulation_statistics_logged() {
    let output = run_sim(&["300", "15", "--seed", "11"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    for statistic in [
        "Final time:",
        "Events executed:",
        "Vehicles created:",
        "Vehicles removed:",
        "Vehicles in system:",
        "Retries:",
    ] {
        assert!(stderr.contains(statistic), "Missing '{}' statistic", statistic);
    }

    let created_line = stderr
        .lines()
        .find(|line| line.contains("Vehicles created:"))
        .expect("Could not find 'Vehicles created' line");
    let created: u64 = created_line
        .split("Vehicles created:")
        .nth(1)
        .and_then(|s| s.trim().parse().ok())
        .expect("Could not parse created count");
    assert!(created > 0, "No vehicles were created during simulation");
}

/// Test that the same seed reproduces the same report
#[test]
fn test_seeded_runs_print_identical_reports() {
    let first = run_sim(&["250", "20", "--seed", "42"]);
    let second = run_sim(&["250", "20", "--seed", "42"]);

    assert!(first.status.success() && second.status.success());
    assert_eq!(first.stdout, second.stdout);
}

/// Test that an invalid horizon is reported and the process fails
#[test]
fn test_invalid_parameters_are_rejected() {
    let output = run_sim(&["0", "10"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("total time must be at least 1"),
        "Unexpected error output: {}",
        stderr
    );

    let output = run_sim(&["100", "-2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("semaphore frequency must be at least 1"));
}

/// Test that parameters are read from stdin when not given on the command line
#[test]
fn test_parameters_prompted_on_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_intersection_sim"))
        .args(["--seed", "5"])
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start simulation");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"120\n10\n")
        .expect("Failed to write parameters");

    let output = child.wait_with_output().expect("Simulation did not finish");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total simulation time"));
    assert!(stdout.contains("Semaphore frequency"));
    assert!(stdout.contains("FINAL REPORT"));
}

/// Test that the dumped network is valid input for --network
#[test]
fn test_dumped_network_round_trips_through_file() {
    let output = run_sim(&["--dump-network"]);
    assert!(output.status.success());

    let json = String::from_utf8(output.stdout).expect("Network dump is not UTF-8");
    let parsed = NetworkConfig::from_json(&json).expect("Network dump does not parse");
    assert_eq!(parsed, NetworkConfig::two_intersections());

    let path = std::env::temp_dir().join(format!("intersection_sim_{}.json", std::process::id()));
    std::fs::write(&path, &json).expect("Failed to write network file");

    let from_file = run_sim(&["150", "10", "--seed", "8", "--network", path.to_str().unwrap()]);
    let built_in = run_sim(&["150", "10", "--seed", "8"]);
    let _ = std::fs::remove_file(&path);

    assert!(from_file.status.success());
    assert_eq!(from_file.stdout, built_in.stdout);
}
