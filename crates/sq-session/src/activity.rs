//! Fire-and-forget activity telemetry
//!
//! `track` must never block or raise into a tool's code path: delivery
//! failures are counted and logged, nothing more. Records land in a
//! buffered JSONL sink next to the session store files.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::SecondsFormat;
use serde::Serialize;
use sq_core::Tool;
use tracing::warn;

use crate::identity::IdentityStore;
use crate::store::SessionStore;

const ACTIVITY_SCHEMA_VERSION: u8 = 1;
const FLUSH_SIZE_BYTES: usize = 16 * 1024;
const FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// One discrete user action reported by a tool.
#[derive(Debug, Clone)]
pub struct Activity {
    pub action: String,
    pub tool: Tool,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityLogStats {
    pub lines_written: u64,
    pub bytes_written: u64,
    pub write_failures: u64,
}

#[derive(Serialize)]
struct JsonlActivity<'a> {
    v: u8,
    seq: u64,
    ts: String,
    action: &'a str,
    tool: &'a str,
    identity_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
}

/// Buffered JSONL sink for activity records.
#[derive(Debug)]
pub struct ActivityLog {
    output_path: PathBuf,
    writer: Option<BufWriter<File>>,
    pending: Vec<u8>,
    pending_lines: u64,
    seq: u64,
    lines_written: u64,
    bytes_written: u64,
    write_failures: u64,
    last_flush: Instant,
}

impl ActivityLog {
    pub fn new(output_path: &Path) -> Self {
        let (writer, write_failures) = match open_log_file(output_path) {
            Ok(file) => (Some(BufWriter::new(file)), 0),
            Err(err) => {
                warn!(
                    path = %output_path.display(),
                    error = %err,
                    "failed to initialize activity log writer"
                );
                (None, 1)
            }
        };

        Self {
            output_path: output_path.to_path_buf(),
            writer,
            pending: Vec::new(),
            pending_lines: 0,
            seq: 0,
            lines_written: 0,
            bytes_written: 0,
            write_failures,
            last_flush: Instant::now(),
        }
    }

    pub fn append(&mut self, identity_id: &str, project_id: Option<&str>, activity: &Activity) {
        let payload = JsonlActivity {
            v: ACTIVITY_SCHEMA_VERSION,
            seq: self.seq,
            ts: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            action: &activity.action,
            tool: activity.tool.as_str(),
            identity_id,
            project_id,
            data: activity.data.as_ref(),
        };

        match serde_json::to_vec(&payload) {
            Ok(mut line) => {
                self.seq = self.seq.saturating_add(1);
                line.push(b'\n');
                self.pending.extend_from_slice(&line);
                self.pending_lines = self.pending_lines.saturating_add(1);
                if self.should_flush() {
                    self.flush_internal();
                }
            }
            Err(err) => {
                self.write_failures = self.write_failures.saturating_add(1);
                warn!(
                    path = %self.output_path.display(),
                    seq = self.seq,
                    error = %err,
                    "failed to serialize activity record"
                );
            }
        }
    }

    pub fn flush(&mut self) {
        self.flush_internal();
    }

    pub fn stats(&self) -> ActivityLogStats {
        ActivityLogStats {
            lines_written: self.lines_written,
            bytes_written: self.bytes_written,
            write_failures: self.write_failures,
        }
    }

    fn should_flush(&self) -> bool {
        self.pending.len() >= FLUSH_SIZE_BYTES || self.last_flush.elapsed() >= FLUSH_INTERVAL
    }

    fn flush_internal(&mut self) {
        if self.pending.is_empty() {
            self.last_flush = Instant::now();
            return;
        }

        let Some(writer) = self.writer.as_mut() else {
            self.write_failures = self.write_failures.saturating_add(1);
            self.pending.clear();
            self.pending_lines = 0;
            self.last_flush = Instant::now();
            warn!(
                path = %self.output_path.display(),
                "dropping buffered activity records because writer is unavailable"
            );
            return;
        };

        let pending_bytes = self.pending.len() as u64;
        let pending_lines = self.pending_lines;
        let write_result = writer.write_all(&self.pending).and_then(|_| writer.flush());

        self.last_flush = Instant::now();
        match write_result {
            Ok(()) => {
                self.bytes_written = self.bytes_written.saturating_add(pending_bytes);
                self.lines_written = self.lines_written.saturating_add(pending_lines);
            }
            Err(err) => {
                self.write_failures = self.write_failures.saturating_add(1);
                warn!(
                    path = %self.output_path.display(),
                    error = %err,
                    "failed to flush activity log buffer"
                );
            }
        }

        self.pending.clear();
        self.pending_lines = 0;
    }
}

impl Drop for ActivityLog {
    fn drop(&mut self) {
        self.flush_internal();
    }
}

/// Tracks discrete user actions against the current identity/project.
#[derive(Debug)]
pub struct ActivityEmitter {
    store: SessionStore,
    log: ActivityLog,
}

impl ActivityEmitter {
    pub fn new(store: SessionStore) -> Self {
        let log = ActivityLog::new(&store.activity_log_path());
        Self { store, log }
    }

    /// Bump the identity's `last_active_at` and emit a telemetry record.
    ///
    /// No-op when no identity exists yet. Never blocks or raises.
    pub fn track(&mut self, activity: &Activity) {
        let Some(identity) = IdentityStore::new(self.store.clone()).touch() else {
            return;
        };
        let project_id = self.store.load_project().map(|project| project.id);

        self.log
            .append(&identity.id, project_id.as_deref(), activity);
    }

    pub fn flush(&mut self) {
        self.log.flush();
    }

    pub fn stats(&self) -> ActivityLogStats {
        self.log.stats()
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}
