//! Machine-readable progress: one JSON object per line.

use super::{AssetContext, AssetReport, InvocationRecord, Reporter, SweepPlan, SweepReport};
use crate::external::RunConfiguration;

use serde_json::json;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Reporter writing newline-delimited JSON events.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporter {
    /// Writes events to stdout.
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, mut value: serde_json::Value) {
        if let Some(object) = value.as_object_mut() {
            object.insert("timestamp".to_string(), json!(Self::timestamp()));
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }
}

impl Reporter for JsonReporter {
    fn sweep_started(&self, plan: &SweepPlan) {
        self.write_value(json!({
            "type": "sweep_started",
            "assets": plan.assets,
            "thresholds": plan.thresholds,
            "total_invocations": plan.total_invocations(),
            "output_root": plan.output_root,
            "scratch_dir": plan.scratch_dir,
            "cooldown_secs": plan.cooldown.as_secs(),
        }));
    }

    fn asset_started(&self, context: &AssetContext<'_>) {
        self.write_value(json!({
            "type": "asset_started",
            "asset": context.asset.as_str(),
            "position": context.position,
            "total": context.total,
        }));
    }

    fn invocation_started(&self, run: &RunConfiguration, log_path: &Path) {
        self.write_value(json!({
            "type": "invocation_started",
            "asset": run.asset.as_str(),
            "threshold": run.threshold,
            "log_path": log_path,
            "events_path": run.events_path,
        }));
    }

    fn invocation_finished(&self, record: &InvocationRecord) {
        self.write_value(json!({
            "type": "invocation_finished",
            "record": record,
        }));
    }

    fn asset_finished(&self, report: &AssetReport) {
        self.write_value(json!({
            "type": "asset_finished",
            "asset": report.asset,
            "status": report.status,
            "succeeded": report.succeeded(),
            "failed": report.failed(),
        }));
    }

    fn cooldown_started(&self, duration: Duration) {
        self.write_value(json!({
            "type": "cooldown_started",
            "duration_secs": duration.as_secs_f64(),
        }));
    }

    fn sweep_finished(&self, report: &SweepReport) {
        self.write_value(json!({
            "type": "sweep_finished",
            "total_invocations": report.total_invocations(),
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "completed_assets": report.completed_assets(),
            "aborted_assets": report.aborted_assets(),
            "skipped_assets": report.skipped_assets(),
            "duration_secs": report.duration_secs,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScratchMode;
    use crate::reporting::InvocationOutcome;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn lines(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_events_are_json_lines() {
        let buffer = SharedBuffer::default();
        let reporter = JsonReporter::with_writer(Box::new(buffer.clone()));

        reporter.sweep_started(&SweepPlan {
            assets: vec!["clipA".to_string(), "clipB".to_string()],
            thresholds: vec![0, 10, 20],
            output_root: PathBuf::from("/out"),
            scratch_dir: PathBuf::from("/scratch"),
            scratch_mode: ScratchMode::Shared,
            cooldown: Duration::from_secs(60),
        });
        reporter.invocation_finished(&InvocationRecord {
            asset: "clipA".to_string(),
            threshold: 10,
            log_path: PathBuf::from("/out/clipA/10_1000000.txt"),
            outcome: InvocationOutcome::Failed { exit_code: Some(1) },
            elapsed_secs: 2.0,
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "sweep_started");
        assert_eq!(lines[0]["total_invocations"], 6);
        assert!(lines[0]["timestamp"].is_u64());
        assert_eq!(lines[1]["type"], "invocation_finished");
        assert_eq!(lines[1]["record"]["outcome"]["status"], "failed");
    }
}
