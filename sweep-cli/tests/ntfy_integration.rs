// adder-sweep/tests/ntfy_integration.rs
//
// Notification problems must never stop a sweep.

#![cfg(unix)]

use adder_sweep::{parse_cli_from, run_sweep_command};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_unusable_ntfy_topic_does_not_stop_the_sweep() {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path();
    fs::create_dir(root.join("data")).unwrap();
    fs::write(root.join("data/clipA"), b"aedat").unwrap();
    fs::write(root.join("data/manifest.txt"), "clipA\n").unwrap();
    fs::write(root.join("fake.sh"), "exit 0\n").unwrap();

    let path = |rel: &str| root.join(rel).to_string_lossy().into_owned();
    let cli = parse_cli_from([
        "adder-sweep".to_string(),
        path("data"),
        path("data/manifest.txt"),
        path("out"),
        "10".to_string(),
        path("scratch"),
        "--transcoder".to_string(),
        "/bin/sh".to_string(),
        "--transcoder-arg".to_string(),
        path("fake.sh"),
        "--cooldown-secs".to_string(),
        "0".to_string(),
        "--progress-json".to_string(),
        "--ntfy".to_string(),
        "http://localhost:1".to_string(),
    ])
    .expect("arguments should parse");

    let report = run_sweep_command(&cli.sweep, None).expect("sweep should run");

    assert_eq!(report.total_invocations(), 2);
    assert_eq!(report.succeeded(), 2);
    assert!(root.join("out/clipA/0_1000000.txt").exists());
}
