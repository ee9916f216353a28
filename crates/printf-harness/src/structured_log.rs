//! Structured logging for decode and verify runs.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required and optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file or a buffer.
//! - [`validate_log_line`]: checks a single JSONL line against the schema.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Test/verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
    Error,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    /// Format string or fixture case the event is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_refs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            symbol: None,
            outcome: None,
            errno: None,
            artifact_refs: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_errno(mut self, errno: i32) -> Self {
        self.errno = Some(errno);
        self
    }

    /// Add artifact references.
    #[must_use]
    pub fn with_artifacts(mut self, refs: Vec<String>) -> Self {
        self.artifact_refs = Some(refs);
        self
    }

    /// Set free-form details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

/// Writes structured JSONL log entries.
pub struct LogEmitter<W: Write> {
    writer: W,
    seq: u64,
    run_id: String,
}

impl<W: Write> LogEmitter<W> {
    pub fn new(writer: W, run_id: &str) -> Self {
        Self {
            writer,
            seq: 0,
            run_id: run_id.to_string(),
        }
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{:03}", self.run_id, self.seq)
    }

    /// Emit a bare entry with an auto-generated trace id.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let entry = LogEntry::new(self.next_trace_id(), level, event);
        self.write_line(&entry)?;
        Ok(entry)
    }

    /// Emit a fully-populated entry. An empty trace id is filled in.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        self.write_line(&entry)
    }

    fn write_line(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl LogEmitter<std::io::BufWriter<std::fs::File>> {
    /// Create an emitter that writes to a file.
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(std::io::BufWriter::new(file), run_id))
    }
}

impl LogEmitter<Vec<u8>> {
    /// Create an emitter that writes to an in-memory buffer.
    #[must_use]
    pub fn to_buffer(run_id: &str) -> Self {
        Self::new(Vec::new(), run_id)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line_number}: field '{field}': {message}")]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl LogValidationError {
    fn new(line_number: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            line_number,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
        vec![LogValidationError::new(
            line_number,
            "<json>",
            format!("invalid JSON: {e}"),
        )]
    })?;
    let Some(obj) = value.as_object() else {
        return Err(vec![LogValidationError::new(
            line_number,
            "<root>",
            "expected JSON object",
        )]);
    };

    let mut errors = Vec::new();
    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            errors.push(LogValidationError::new(
                line_number,
                field,
                "required field missing",
            ));
        }
    }

    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !["trace", "debug", "info", "warn", "error"].contains(&level)
    {
        errors.push(LogValidationError::new(
            line_number,
            "level",
            format!("invalid level: '{level}'"),
        ));
    }

    if let Some(outcome) = obj.get("outcome").and_then(|v| v.as_str())
        && !["pass", "fail", "skip", "error"].contains(&outcome)
    {
        errors.push(LogValidationError::new(
            line_number,
            "outcome",
            format!("invalid outcome: '{outcome}'"),
        ));
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && !trace_id.contains("::")
    {
        errors.push(LogValidationError::new(
            line_number,
            "trace_id",
            "expected '<run>::<seq>'",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    serde_json::from_value(value)
        .map_err(|e| vec![LogValidationError::new(line_number, "<schema>", e.to_string())])
}

/// Validate every non-empty line of a JSONL document.
pub fn validate_log_text(text: &str) -> Result<Vec<LogEntry>, Vec<LogValidationError>> {
    let mut entries = Vec::new();
    let mut errors = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match validate_log_line(line, i + 1) {
            Ok(entry) => entries.push(entry),
            Err(mut errs) => errors.append(&mut errs),
        }
    }
    if errors.is_empty() {
        Ok(entries)
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(duration.as_secs(), duration.subsec_millis())
}

/// RFC 3339 UTC timestamp with millisecond precision.
fn format_utc(secs: u64, millis: u32) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
    )
}

// Howard Hinnant's days-to-civil conversion.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
