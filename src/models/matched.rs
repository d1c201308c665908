use super::event::EventRecord;
use super::video::VideoEntry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum MatchStatus {
    Matched,
    MissingVideo,
}

/// An event joined with its clip, if any. Derived on every re-index, never stored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchedEvent {
    pub event: EventRecord,
    pub video: Option<VideoEntry>,
    pub status: MatchStatus,
}

impl MatchedEvent {
    pub fn new(event: EventRecord, video: Option<VideoEntry>) -> Self {
        let status = if video.is_some() {
            MatchStatus::Matched
        } else {
            MatchStatus::MissingVideo
        };
        Self {
            event,
            video,
            status,
        }
    }

    pub fn id(&self) -> &str {
        &self.event.id
    }

    pub fn has_video(&self) -> bool {
        self.status == MatchStatus::Matched
    }

    /// Relative video path, empty when unmatched.
    pub fn video_path(&self) -> String {
        self.video
            .as_ref()
            .map(|v| v.display_path())
            .unwrap_or_default()
    }
}
