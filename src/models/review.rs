//! Review decisions: the only durable state of a project.

use super::direction::Direction;
use serde::Serialize;
use std::collections::BTreeMap;

/// Operator decision for one event, as stored in the `reviews` table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct ReviewDecision {
    pub species: Option<String>,
    pub direction: Direction,
    pub reviewed_at: Option<String>, // RFC 3339, local time
    pub notes: String,
    pub false_trigger: bool,
    /// Set by reconcile when the id is no longer in the log.
    pub orphaned: bool,
}

impl ReviewDecision {
    pub fn species_str(&self) -> &str {
        self.species.as_deref().unwrap_or("")
    }

    pub fn is_reviewed(&self) -> bool {
        self.reviewed_at.is_some()
    }
}

/// Partial update applied by `ReviewStore::upsert`.
/// `None` leaves the stored value untouched; `Some("")` clears species/notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub species: Option<String>,
    pub direction: Option<Direction>,
    pub notes: Option<String>,
    pub false_trigger: Option<bool>,
}

impl ReviewUpdate {
    pub fn is_empty(&self) -> bool {
        self.species.is_none()
            && self.direction.is_none()
            && self.notes.is_none()
            && self.false_trigger.is_none()
    }

    /// Merge onto an existing decision (or a blank one).
    pub fn apply_to(&self, base: Option<ReviewDecision>) -> ReviewDecision {
        let mut d = base.unwrap_or_default();
        if let Some(species) = &self.species {
            let s = species.trim();
            d.species = if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            };
        }
        if let Some(direction) = self.direction {
            d.direction = direction;
        }
        if let Some(notes) = &self.notes {
            d.notes = notes.clone();
        }
        if let Some(ft) = self.false_trigger {
            d.false_trigger = ft;
        }
        d
    }
}

/// Fish counted for one event, keyed by (species, direction). Zero counts are
/// never kept.
pub type Counts = BTreeMap<(String, Direction), u32>;

/// Human readable tally, e.g. `1 Chinook UP, 2 Rainbow DOWN`.
pub fn format_counts(counts: &Counts) -> String {
    let parts: Vec<String> = counts
        .iter()
        .filter(|(_, ct)| **ct > 0)
        .map(|((species, dir), ct)| format!("{ct} {species} {}", dir.short()))
        .collect();

    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_touches_provided_fields() {
        let existing = ReviewDecision {
            species: Some("Coho".into()),
            direction: Direction::Up,
            reviewed_at: Some("2025-11-01T10:00:00+00:00".into()),
            notes: "clear view".into(),
            false_trigger: false,
            orphaned: false,
        };

        let update = ReviewUpdate {
            notes: Some("murky".into()),
            ..Default::default()
        };
        let merged = update.apply_to(Some(existing.clone()));

        assert_eq!(merged.species.as_deref(), Some("Coho"));
        assert_eq!(merged.direction, Direction::Up);
        assert_eq!(merged.notes, "murky");
    }

    #[test]
    fn blank_species_clears_it() {
        let update = ReviewUpdate {
            species: Some("  ".into()),
            ..Default::default()
        };
        let merged = update.apply_to(Some(ReviewDecision {
            species: Some("Brown".into()),
            ..Default::default()
        }));
        assert_eq!(merged.species, None);
    }

    #[test]
    fn formats_counts_sorted_by_species() {
        let mut counts = Counts::new();
        counts.insert(("Rainbow".into(), Direction::Down), 2);
        counts.insert(("Chinook".into(), Direction::Up), 1);
        assert_eq!(format_counts(&counts), "1 Chinook UP, 2 Rainbow DOWN");
        assert_eq!(format_counts(&Counts::new()), "(none)");
    }
}
