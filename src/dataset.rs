use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::models::{LogRecord, ParseFailure};
use crate::parser::LineParser;

/// An ordered collection of parsed records plus the lines that failed to
/// parse. Records keep input-line order; failures are tracked separately so
/// dropped lines stay observable ("N of M lines unparsed").
///
/// Append-only during construction, immutable afterwards; `filter` returns a
/// new dataset.
#[derive(Debug, Clone, Default)]
pub struct LogDataset {
    records: Vec<LogRecord>,
    failures: Vec<ParseFailure>,
}

/// Filter parameters, matching the presentation layer's controls: an inclusive
/// date range plus the sets of selected status codes and methods.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub statuses: HashSet<u16>,
    pub methods: HashSet<String>,
}

impl LogDataset {
    /// Build a dataset by applying the parser to each line in order.
    ///
    /// Blank (whitespace-only) lines are skipped and counted in neither
    /// bucket. A malformed line is recorded as a failure and never aborts
    /// processing of the following lines.
    pub fn build<I, S>(lines: I, parser: &LineParser) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dataset = LogDataset::default();
        for (idx, line) in lines.into_iter().enumerate() {
            dataset.push_line(idx + 1, line.as_ref(), parser);
        }
        dataset
    }

    /// Read a log file and build a dataset from its lines, streaming through
    /// the reader so peak memory stays at one line.
    pub fn from_path(path: &Path, parser: &LineParser) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open log file: {:?}", path))?;

        let mut dataset = LogDataset::default();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read log file: {:?}", path))?;
            dataset.push_line(idx + 1, &line, parser);
        }
        Ok(dataset)
    }

    fn push_line(&mut self, line_number: usize, line: &str, parser: &LineParser) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match parser.parse(line) {
            Ok(record) => self.records.push(record),
            Err(kind) => {
                debug!(line_number, %kind, "skipping unparseable line");
                self.failures.push(ParseFailure {
                    line_number,
                    line: line.to_string(),
                    kind,
                });
            }
        }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn failures(&self) -> &[ParseFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep records whose timestamp's date lies in the inclusive range and
    /// whose status and method are both in the selected sets.
    ///
    /// An empty status or method set selects nothing (a vacuous filter, not
    /// "no filter"). Failures carry over unchanged so the unparsed-line count
    /// survives filtering.
    pub fn filter(&self, spec: &FilterSpec) -> LogDataset {
        let records = self
            .records
            .iter()
            .filter(|r| {
                let date = r.timestamp.date_naive();
                date >= spec.start_date
                    && date <= spec.end_date
                    && spec.statuses.contains(&r.status)
                    && spec.methods.contains(&r.method)
            })
            .cloned()
            .collect();

        LogDataset {
            records,
            failures: self.failures.clone(),
        }
    }

    /// Dataset with pre-parsed records, used by aggregation tests.
    #[cfg(test)]
    pub(crate) fn from_records(records: Vec<LogRecord>) -> Self {
        LogDataset {
            records,
            failures: Vec::new(),
        }
    }
}
