//! Pure helper logic with no database dependencies.
mod ids;
pub mod overlap;

pub use ids::fresh_id;
pub use overlap::{date_overlap, location_overlap, photo_visible_at, schedule_overlap, ScheduleMatch};
