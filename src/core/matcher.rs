use crate::core::indexer::VideoIndex;
use crate::models::event::EventRecord;
use crate::models::event_id::compare_ids;
use crate::models::matched::MatchedEvent;

/// Join events with their clips. Output is sorted by timestamp, then id.
pub fn match_events(events: &[EventRecord], videos: &VideoIndex) -> Vec<MatchedEvent> {
    let mut out: Vec<MatchedEvent> = events
        .iter()
        .map(|ev| MatchedEvent::new(ev.clone(), videos.get(&ev.id).cloned()))
        .collect();

    out.sort_by(|a, b| {
        a.event
            .timestamp
            .cmp(&b.event.timestamp)
            .then_with(|| compare_ids(&a.event.id, &b.event.id))
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{RawFields, Sign};
    use crate::models::event_id::normalize_id;
    use crate::models::matched::MatchStatus;
    use crate::models::video::VideoEntry;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn ev(id: &str, hour: u32) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2025, 11, 2)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            raw: RawFields { m1: 1, m2: 2, m3: 3 },
            sign: Sign::Plus,
            line: 1,
        }
    }

    fn index(ids: &[&str]) -> VideoIndex {
        let mut idx = VideoIndex::default();
        for id in ids {
            let path = PathBuf::from(format!("/clips/{id}.mp4"));
            idx.entries.insert(
                normalize_id(id),
                VideoEntry {
                    id: id.to_string(),
                    absolute_path: path.clone(),
                    relative_path: path,
                },
            );
        }
        idx
    }

    #[test]
    fn orders_by_time_then_id() {
        let events = vec![ev("20", 9), ev("3", 9), ev("100", 7)];
        let matched = match_events(&events, &VideoIndex::default());
        let ids: Vec<&str> = matched.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["100", "3", "20"]);
    }

    #[test]
    fn marks_missing_videos() {
        let events = vec![ev("1001", 8), ev("1002", 8)];
        let matched = match_events(&events, &index(&["01001"]));

        assert_eq!(matched[0].status, MatchStatus::Matched);
        assert_eq!(matched[0].video_path(), "/clips/01001.mp4");
        assert_eq!(matched[1].status, MatchStatus::MissingVideo);
        assert_eq!(matched[1].video_path(), "");
    }

    #[test]
    fn is_pure_over_inputs() {
        let events = vec![ev("5", 1), ev("4", 2)];
        let videos = index(&["4"]);
        assert_eq!(match_events(&events, &videos), match_events(&events, &videos));
    }
}
