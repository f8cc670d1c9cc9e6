use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;

/// Access JSONL sink.
///
/// Active file: <log_dir>/access.jsonl, rolled hourly by tracing-appender.
/// One line per request, blocked requests included (metadata only, never
/// the body).
#[derive(Clone)]
pub struct ObsSink {
    log_dir: PathBuf,
    access: NonBlocking,
}

// Must outlive every writer, or buffered lines are lost on exit.
static ACCESS_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct AccessLog {
    pub ts: DateTime<Utc>,
    pub request_id: String,
    pub action: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub latency_ms: u64,
    pub user_agent: Option<String>,
    pub payload_kind: Option<String>,
}

#[derive(Serialize)]
struct AccessLine<'a> {
    #[serde(rename = "@timestamp")]
    ts: &'a DateTime<Utc>,
    dataset: &'static str,
    request_id: &'a str,
    action: &'a str,
    method: &'a str,
    path: &'a str,
    status: u16,
    latency_ms: u64,
    user_agent: &'a Option<String>,
    payload_kind: &'a Option<String>,
}

impl<'a> From<&'a AccessLog> for AccessLine<'a> {
    fn from(rec: &'a AccessLog) -> Self {
        Self {
            ts: &rec.ts,
            dataset: "access",
            request_id: &rec.request_id,
            action: &rec.action,
            method: &rec.method,
            path: &rec.path,
            status: rec.status,
            latency_ms: rec.latency_ms,
            user_agent: &rec.user_agent,
            payload_kind: &rec.payload_kind,
        }
    }
}

impl ObsSink {
    pub fn new(log_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("create log_dir failed: {}", log_dir.display()))?;

        let appender = tracing_appender::rolling::hourly(log_dir, "access.jsonl");
        let (access, guard) = tracing_appender::non_blocking(appender);
        let _ = ACCESS_GUARD.set(guard);

        Ok(Self {
            log_dir: log_dir.to_path_buf(),
            access,
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Write one access JSONL line. `dataset` is injected here.
    pub fn write_access(&self, rec: &AccessLog) {
        match serde_json::to_string(&AccessLine::from(rec)) {
            Ok(json) => {
                let mut w = self.access.make_writer();
                let _ = w.write_all(json.as_bytes());
                let _ = w.write_all(b"\n");
            }
            Err(e) => tracing::warn!("access line encode failed: {}", e),
        }
    }
}
