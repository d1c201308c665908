use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Movement of a fish through the counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Direction {
    Up,
    Down,
    Stay,
    #[default]
    Unset,
}

impl Direction {
    /// Parse operator input. `x` is the quick-entry shortcut for Stay.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "up" | "u" => Ok(Self::Up),
            "down" | "d" => Ok(Self::Down),
            "stay" | "x" | "s" => Ok(Self::Stay),
            "" | "unset" | "none" => Ok(Self::Unset),
            other => Err(AppError::InvalidDirection(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Stay => "Stay",
            Direction::Unset => "",
        }
    }

    /// Short upper-case label used in tallies ("1 Coho UP").
    pub fn short(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Stay => "STAY",
            Direction::Unset => "-",
        }
    }

    /// Convert enum → DB value (`NULL` for Unset)
    pub fn to_db(&self) -> Option<&'static str> {
        match self {
            Direction::Unset => None,
            other => Some(other.as_str()),
        }
    }

    /// Convert DB value → enum
    pub fn from_db(s: Option<&str>) -> Option<Self> {
        match s {
            None | Some("") => Some(Direction::Unset),
            Some("Up") => Some(Direction::Up),
            Some("Down") => Some(Direction::Down),
            Some("Stay") => Some(Direction::Stay),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Direction::Unset)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quick_entry_codes() {
        assert_eq!(Direction::parse("UP").unwrap(), Direction::Up);
        assert_eq!(Direction::parse("d").unwrap(), Direction::Down);
        assert_eq!(Direction::parse("x").unwrap(), Direction::Stay);
        assert_eq!(Direction::parse("").unwrap(), Direction::Unset);
        assert!(Direction::parse("sideways").is_err());
    }

    #[test]
    fn db_mapping_keeps_unset_as_null() {
        assert_eq!(Direction::Unset.to_db(), None);
        assert_eq!(Direction::from_db(None), Some(Direction::Unset));
        assert_eq!(Direction::from_db(Some("Stay")), Some(Direction::Stay));
        assert_eq!(Direction::from_db(Some("bogus")), None);
    }
}
