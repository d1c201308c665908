//! Riverwatcher log parser.
//!
//! A log export is a sectioned text file. Only the `[data]` section matters:
//! an optional folder stamp line `YY MM DD HH MM` followed by one line per
//! detection:
//!
//! ```text
//! <id> <m1> <m2> <month> <day> <hour> <minute> <+/-> <m3>
//! ```
//!
//! Lines that do not fit are skipped and reported; a file without a `[data]`
//! section is an error.

use crate::errors::{AppError, AppResult};
use crate::models::diagnostics::Diagnostic;
use crate::models::event::{EventRecord, RawFields, Sign};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

const DATA_FIELDS: usize = 9;
const STAMP_FIELDS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Year used when the log carries no folder stamp. `None` → current year.
    pub default_year: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub events: Vec<EventRecord>,
    pub folder_stamp: Option<String>,
    pub warnings: Vec<Diagnostic>,
}

/// First `*.log` (any case) in the project root, by file name.
pub fn find_log_file(project_root: &Path) -> AppResult<PathBuf> {
    let mut logs: Vec<PathBuf> = fs::read_dir(project_root)
        .map_err(|_| AppError::LogNotFound(project_root.to_path_buf()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("log"))
                .unwrap_or(false)
        })
        .collect();

    logs.sort();
    logs.into_iter()
        .next()
        .ok_or_else(|| AppError::LogNotFound(project_root.to_path_buf()))
}

/// Read and parse a log file. Invalid UTF-8 is replaced, not rejected.
pub fn parse_log_file(path: &Path, opts: &ParseOptions) -> AppResult<ParsedLog> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    parse_log(&text, &path.display().to_string(), opts)
}

pub fn parse_log(text: &str, source: &str, opts: &ParseOptions) -> AppResult<ParsedLog> {
    let mut out = ParsedLog::default();
    let mut in_data = false;
    let mut saw_data = false;
    let mut base_year: Option<i32> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            in_data = line.eq_ignore_ascii_case("[data]");
            saw_data |= in_data;
            continue;
        }

        if !in_data {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        // folder stamp: only before the first event
        if parts.len() == STAMP_FIELDS
            && base_year.is_none()
            && out.events.is_empty()
            && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit()))
        {
            if let Ok(yy) = parts[0].parse::<i32>()
                && (0..=99).contains(&yy)
            {
                base_year = Some(2000 + yy);
                out.folder_stamp = Some(parts.join(" "));
                continue;
            }
        }

        let year = base_year
            .or(opts.default_year)
            .unwrap_or_else(|| Local::now().year());

        match parse_data_line(&parts, year, line_no) {
            Ok(ev) => out.events.push(ev),
            Err(reason) => out.warnings.push(Diagnostic::ParseWarning {
                line: line_no,
                content: line.to_string(),
                reason,
            }),
        }
    }

    if !saw_data {
        return Err(AppError::MissingSection(source.to_string()));
    }

    Ok(out)
}

/// Parse one tokenised data line. The error is the human readable reason.
fn parse_data_line(parts: &[&str], year: i32, line: usize) -> Result<EventRecord, String> {
    if parts.len() != DATA_FIELDS {
        return Err(format!(
            "expected {DATA_FIELDS} fields, found {}",
            parts.len()
        ));
    }

    let id = parts[0].to_string();
    let m1 = int_field(parts[1], "m1")?;
    let m2 = int_field(parts[2], "m2")?;
    let month = uint_field(parts[3], "month")?;
    let day = uint_field(parts[4], "day")?;
    let hour = uint_field(parts[5], "hour")?;
    let minute = uint_field(parts[6], "minute")?;
    let sign = Sign::from_token(parts[7]).ok_or_else(|| format!("invalid sign '{}'", parts[7]))?;
    let m3 = int_field(parts[8], "m3")?;

    let timestamp = build_timestamp(year, month, day, hour, minute).ok_or_else(|| {
        format!("invalid date/time {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")
    })?;

    Ok(EventRecord {
        id,
        timestamp,
        raw: RawFields { m1, m2, m3 },
        sign,
        line,
    })
}

fn build_timestamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

fn int_field(s: &str, name: &str) -> Result<i64, String> {
    s.parse::<i64>()
        .map_err(|_| format!("{name} is not an integer: '{s}'"))
}

fn uint_field(s: &str, name: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("{name} is not a number: '{s}'"))
}
