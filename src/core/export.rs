//! Flattened report rows. Pure: building rows never touches the filesystem;
//! writing them out is `export::ExportLogic`.

use crate::models::event_id::normalize_id;
use crate::models::matched::MatchedEvent;
use crate::models::review::{Counts, ReviewDecision};
use serde::Serialize;
use std::collections::HashMap;

/// One row per log event, in match order.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ExportRow {
    pub id: String,
    pub timestamp: String,
    pub species: String,
    pub direction: String,
    #[serde(rename = "videoPath")]
    pub video_path: String,
    pub notes: String,
}

/// One row per counted fish.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CountRow {
    pub id: String,
    pub timestamp: String,
    pub species: String,
    pub direction: String,
}

/// `decisions` is keyed by normalised id (see `ReviewSession::decisions`).
pub fn build_rows(
    matched: &[MatchedEvent],
    decisions: &HashMap<String, ReviewDecision>,
) -> Vec<ExportRow> {
    matched
        .iter()
        .map(|m| {
            let decision = decisions.get(&normalize_id(m.id()));
            ExportRow {
                id: m.id().to_string(),
                timestamp: m.event.timestamp_str(),
                species: decision.map(|d| d.species_str().to_string()).unwrap_or_default(),
                direction: decision
                    .map(|d| d.direction.as_str().to_string())
                    .unwrap_or_default(),
                video_path: m.video_path(),
                notes: decision.map(|d| d.notes.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Expand stored counts to one row per fish. `counts` is keyed by normalised
/// id, like `decisions`.
pub fn build_count_rows(
    matched: &[MatchedEvent],
    counts: &HashMap<String, Counts>,
) -> Vec<CountRow> {
    let mut rows = Vec::new();

    for m in matched {
        let Some(event_counts) = counts.get(&normalize_id(m.id())) else {
            continue;
        };
        for ((species, direction), n) in event_counts {
            for _ in 0..*n {
                rows.push(CountRow {
                    id: m.id().to_string(),
                    timestamp: m.event.timestamp_str(),
                    species: species.clone(),
                    direction: direction.as_str().to_string(),
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::direction::Direction;
    use crate::models::event::{EventRecord, RawFields, Sign};
    use crate::models::video::VideoEntry;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn event(id: &str, minute: u32) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2025, 10, 31)
                .unwrap()
                .and_hms_opt(8, minute, 0)
                .unwrap(),
            raw: RawFields { m1: 1, m2: 2, m3: 3 },
            sign: Sign::Plus,
            line: 1,
        }
    }

    fn matched() -> Vec<MatchedEvent> {
        vec![
            MatchedEvent::new(event("1001", 15), None),
            MatchedEvent::new(
                event("1002", 16),
                Some(VideoEntry {
                    id: "1002".into(),
                    absolute_path: PathBuf::from("/videos/clips/1002.mp4"),
                    relative_path: PathBuf::from("clips/1002.mp4"),
                }),
            ),
        ]
    }

    #[test]
    fn one_row_per_event_with_blanks_for_missing_data() {
        let mut decisions = HashMap::new();
        decisions.insert(
            "1002".to_string(),
            ReviewDecision {
                species: Some("Coho".into()),
                direction: Direction::Up,
                reviewed_at: Some("2025-11-01T09:00:00+00:00".into()),
                ..Default::default()
            },
        );

        let rows = build_rows(&matched(), &decisions);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].id, "1001");
        assert_eq!(rows[0].timestamp, "2025-10-31 08:15:00");
        assert_eq!(rows[0].species, "");
        assert_eq!(rows[0].direction, "");
        assert_eq!(rows[0].video_path, "");

        assert_eq!(rows[1].species, "Coho");
        assert_eq!(rows[1].direction, "Up");
        assert_eq!(rows[1].video_path, "clips/1002.mp4");
    }

    #[test]
    fn no_reviews_still_yields_every_event() {
        let rows = build_rows(&matched(), &HashMap::new());
        assert_eq!(rows.len(), 2);
        assert!(build_rows(&[], &HashMap::new()).is_empty());
    }

    #[test]
    fn counts_expand_to_one_row_per_fish() {
        let mut c = Counts::new();
        c.insert(("Chinook".into(), Direction::Up), 2);
        c.insert(("Rainbow".into(), Direction::Down), 1);
        let mut counts = HashMap::new();
        counts.insert("1001".to_string(), c);

        let rows = build_count_rows(&matched(), &counts);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.id == "1001"));
        assert_eq!(rows[2].species, "Rainbow");
        assert_eq!(rows[2].direction, "Down");
    }
}
