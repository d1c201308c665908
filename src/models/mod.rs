pub mod diagnostics;
pub mod direction;
pub mod event;
pub mod event_id;
pub mod matched;
pub mod review;
pub mod video;
