use chrono::DateTime;
use regex::Regex;

use crate::models::{LogRecord, ParseErrorKind};
use crate::user_agent::{HeuristicClassifier, UserAgentClassifier};

/// Combined-format line grammar with a trailing response-time field:
/// `IP - - [timestamp] "METHOD PATH PROTOCOL" STATUS BYTES "REFERRER" "UA" RT`
const LINE_PATTERN: &str = r#"^(\S+) (\S+) (\S+) \[([\w:/]+\s[+\-]\d{4})\] "(\S+) (\S+) (\S+)" (\d{3}) (\d+) "([^"]*)" "([^"]*)" (\d+)$"#;

pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Parses one raw log line into a [`LogRecord`].
///
/// The grammar regex is compiled once at construction; user-agent
/// classification is delegated to whatever [`UserAgentClassifier`] the parser
/// was built with.
pub struct LineParser {
    pattern: Regex,
    classifier: Box<dyn UserAgentClassifier + Send + Sync>,
}

impl LineParser {
    pub fn new() -> Self {
        Self::with_classifier(Box::new(HeuristicClassifier))
    }

    pub fn with_classifier(classifier: Box<dyn UserAgentClassifier + Send + Sync>) -> Self {
        LineParser {
            // Pattern is a constant, so compilation cannot fail at runtime.
            pattern: Regex::new(LINE_PATTERN).expect("invalid log line pattern"),
            classifier,
        }
    }

    /// Parse a single line. Never panics on bad input; every failure mode maps
    /// to a [`ParseErrorKind`] so the caller can record it and move on.
    pub fn parse(&self, line: &str) -> Result<LogRecord, ParseErrorKind> {
        let caps = self
            .pattern
            .captures(line)
            .ok_or(ParseErrorKind::LineFormat)?;

        let timestamp = DateTime::parse_from_str(&caps[4], TIMESTAMP_FORMAT)
            .map_err(|_| ParseErrorKind::TimestampFormat)?;

        let status: u16 = caps[8].parse().map_err(|_| ParseErrorKind::NumericField)?;
        let bytes_sent: u64 = caps[9].parse().map_err(|_| ParseErrorKind::NumericField)?;
        let response_time_ms: u64 = caps[12].parse().map_err(|_| ParseErrorKind::NumericField)?;

        let user_agent_raw = caps[11].to_string();
        let ua = self.classifier.classify(&user_agent_raw);

        Ok(LogRecord {
            ip: caps[1].to_string(),
            remote_log_name: caps[2].to_string(),
            user_id: caps[3].to_string(),
            timestamp,
            method: caps[5].to_string(),
            path: caps[6].to_string(),
            protocol: caps[7].to_string(),
            status,
            bytes_sent,
            referrer: caps[10].to_string(),
            user_agent_raw,
            browser: ua.browser,
            os: ua.os,
            device: ua.device,
            response_time_ms,
        })
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}
