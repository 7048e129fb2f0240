// adder-sweep/tests/cli_integration.rs
//
// Drives the compiled binary with a shell script standing in for the
// transcoder. The script is run as `/bin/sh <script>` so it never needs to
// be executable.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const FAKE_TRANSCODER: &str = r#"
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --output-events-filename) out="$2"; shift 2 ;;
    *) echo "arg $1"; shift ;;
  esac
done
printf 'events' > "$out"
exit ${EXIT_CODE:-0}
"#;

struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new(manifest: &str) -> Result<Self, Box<dyn Error>> {
        let root = tempdir()?;
        fs::create_dir(root.path().join("data"))?;
        for asset in manifest.lines().map(str::trim).filter(|l| !l.is_empty()) {
            fs::write(root.path().join("data").join(asset), b"aedat")?;
        }
        fs::write(root.path().join("data/manifest.txt"), manifest)?;
        fs::write(root.path().join("fake.sh"), FAKE_TRANSCODER)?;
        Ok(Self { root })
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// The binary with the five positionals, the fake transcoder and no cooldown.
    fn cmd(&self, max_threshold: &str) -> Command {
        self.cmd_with_transcoder(max_threshold, "/bin/sh")
    }

    fn cmd_with_transcoder(&self, max_threshold: &str, program: &str) -> Command {
        let mut cmd = Command::cargo_bin("adder-sweep").expect("Failed to find adder-sweep binary");
        cmd.env_remove("ADDER_SWEEP_TRANSCODER")
            .env_remove("ADDER_SWEEP_COOLDOWN_SECS")
            .env_remove("ADDER_SWEEP_NTFY_TOPIC")
            .arg(self.path("data"))
            .arg(self.path("data/manifest.txt"))
            .arg(self.path("out"))
            .arg(max_threshold)
            .arg(self.path("scratch"))
            .arg("--transcoder")
            .arg(program)
            .arg("--transcoder-arg")
            .arg(self.path("fake.sh"))
            .arg("--cooldown-secs")
            .arg("0");
        cmd
    }
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_sweep_writes_one_log_per_pair() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\nclipB\n")?;

    sandbox
        .cmd("20")
        .assert()
        .success()
        .stdout(contains("Asset: clipA  Threshold: 0"))
        .stdout(contains("Asset: clipB  Threshold: 20"));

    let out = entries(&sandbox.path("out"));
    assert_eq!(out.len(), 3);
    assert_eq!(&out[..2], ["clipA", "clipB"]);
    assert!(out[2].starts_with("adder_sweep_run_"));
    for asset in ["clipA", "clipB"] {
        assert_eq!(
            entries(&sandbox.path("out").join(asset)),
            vec!["0_1000000.txt", "10_1000000.txt", "20_1000000.txt"]
        );
    }
    let log = fs::read_to_string(sandbox.path("out/clipA/10_1000000.txt"))?;
    assert!(log.contains("arg --c-thresh-pos"));
    assert!(log.contains("arg --write-out"));
    Ok(())
}

#[test]
fn test_exit_zero_when_every_invocation_fails() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\nclipB\n")?;

    sandbox.cmd("10").env("EXIT_CODE", "2").assert().success();

    assert!(sandbox.path("out/clipB/10_1000000.txt").exists());
    Ok(())
}

#[test]
fn test_missing_manifest_fails() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\n")?;
    fs::remove_file(sandbox.path("data/manifest.txt"))?;

    sandbox
        .cmd("10")
        .assert()
        .failure()
        .stderr(contains("manifest.txt"));

    assert!(!sandbox.path("out/clipA").exists());
    Ok(())
}

#[test]
fn test_asset_named_logs_keeps_only_its_run_logs() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("logs
")?;

    sandbox.cmd("10").assert().success();

    assert_eq!(
        entries(&sandbox.path("out/logs")),
        vec!["0_1000000.txt", "10_1000000.txt"]
    );
    Ok(())
}

#[test]
fn test_failed_setup_creates_no_log_directory() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA
")?;
    fs::remove_file(sandbox.path("data/manifest.txt"))?;
    let log_dir = sandbox.path("controller-logs");

    sandbox
        .cmd("10")
        .arg("--log-dir")
        .arg(&log_dir)
        .assert()
        .failure()
        .stderr(contains("manifest.txt"));

    assert!(!log_dir.exists());
    assert!(!sandbox.path("out").exists());
    Ok(())
}

#[test]
fn test_missing_transcoder_fails() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\n")?;

    sandbox
        .cmd_with_transcoder("10", "adder-sweep-no-such-transcoder")
        .assert()
        .failure()
        .stderr(contains("adder-sweep-no-such-transcoder"));
    Ok(())
}

#[test]
fn test_controller_log_is_written() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\n")?;
    let log_dir = sandbox.path("controller-logs");

    sandbox.cmd("0").arg("--log-dir").arg(&log_dir).assert().success();

    let logs = entries(&log_dir);
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("adder_sweep_run_"));
    let contents = fs::read_to_string(log_dir.join(&logs[0]))?;
    assert!(contents.contains("Asset: clipA  Threshold: 0"));
    Ok(())
}

#[test]
fn test_no_log_skips_controller_log() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\n")?;

    sandbox.cmd("0").arg("--no-log").assert().success();

    assert_eq!(entries(&sandbox.path("out")), vec!["clipA"]);
    Ok(())
}

#[test]
fn test_summary_json() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\n")?;
    let summary = sandbox.path("summary.json");

    sandbox
        .cmd("25")
        .arg("--summary-json")
        .arg(&summary)
        .assert()
        .success();

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary)?)?;
    assert_eq!(parsed["thresholds"], serde_json::json!([0, 10, 20, 25]));
    assert_eq!(parsed["assets"][0]["asset"], "clipA");
    assert_eq!(parsed["assets"][0]["status"], "completed");
    assert_eq!(parsed["assets"][0]["invocations"].as_array().unwrap().len(), 4);
    Ok(())
}

#[test]
fn test_progress_json_lines_on_stdout() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\n")?;

    let output = sandbox.cmd("10").arg("--progress-json").output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    let types: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert_eq!(types.first(), Some(&"sweep_started"));
    assert_eq!(types.last(), Some(&"sweep_finished"));
    assert_eq!(types.iter().filter(|t| **t == "invocation_finished").count(), 2);

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Asset: clipA  Threshold: 10"));
    Ok(())
}

#[test]
fn test_per_run_scratch_leaves_no_events_files() -> Result<(), Box<dyn Error>> {
    let sandbox = Sandbox::new("clipA\n")?;

    sandbox.cmd("20").arg("--per-run-scratch").assert().success();

    assert!(entries(&sandbox.path("scratch")).is_empty());
    Ok(())
}
