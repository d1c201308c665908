use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;

/// Sign column of a data line.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Sign::Plus),
            "-" => Some(Sign::Minus),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The `m1 m2 m3` measurement columns. Kept verbatim; their meaning is
/// counter-specific.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RawFields {
    pub m1: i64,
    pub m2: i64,
    pub m3: i64,
}

/// One detection from the `[data]` section of a Riverwatcher log.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventRecord {
    pub id: String,               // ⇔ column 1
    pub timestamp: NaiveDateTime, // ⇔ base year + month/day/hour/minute
    pub raw: RawFields,           // ⇔ columns 2, 3, 9
    pub sign: Sign,               // ⇔ column 8
    pub line: usize,              // 1-based line in the source file
}

impl EventRecord {
    pub fn timestamp_str(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Re-serialise the record as a data line
    /// (`id m1 m2 month day hour minute sign m3`).
    pub fn to_data_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {} {}",
            self.id,
            self.raw.m1,
            self.raw.m2,
            self.timestamp.month(),
            self.timestamp.day(),
            self.timestamp.hour(),
            self.timestamp.minute(),
            self.sign,
            self.raw.m3
        )
    }
}
