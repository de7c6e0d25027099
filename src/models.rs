use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use thiserror::Error;

/// One fully parsed access-log line.
///
/// A record is only ever constructed with every field populated; a line that
/// cannot supply all fields becomes a [`ParseFailure`] instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub ip: String,
    pub remote_log_name: String,
    pub user_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub status: u16,
    pub bytes_sent: u64,
    pub referrer: String,
    pub user_agent_raw: String,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub response_time_ms: u64,
}

impl LogRecord {
    /// Whether the response counts as a success (anything below 400).
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Why a line failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    /// Line does not match the access-log grammar at all.
    LineFormat,
    /// Timestamp field present but not a valid `%d/%b/%Y:%H:%M:%S %z` value.
    TimestampFormat,
    /// Status, bytes or response-time field not a valid non-negative integer.
    NumericField,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::LineFormat => write!(f, "line does not match log format"),
            ParseErrorKind::TimestampFormat => write!(f, "malformed timestamp"),
            ParseErrorKind::NumericField => write!(f, "malformed numeric field"),
        }
    }
}

/// A line that failed to parse, kept alongside the records so dropped input
/// stays observable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseFailure {
    /// 1-based line number in the original input.
    pub line_number: usize,
    pub line: String,
    pub kind: ParseErrorKind,
}

/// Errors from aggregation operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("no records to aggregate")]
    EmptyDataset,
}

/// Configuration errors in the generator. These abort the generation call,
/// unlike per-line parse failures which are recorded and skipped.
#[derive(Debug, Error, PartialEq)]
pub enum GenError {
    #[error("invalid weighted distribution: {0}")]
    InvalidDistribution(String),
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),
}
