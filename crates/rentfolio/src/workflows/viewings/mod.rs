//! Agent-led property tours, including the reschedule-by-new-row history
//! policy.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{
    NewViewing, ViewingConflict, ViewingSchedule, ViewingStatus, ViewingValidation,
    MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
pub use repository::ViewingStore;
pub use service::{ViewingError, ViewingScheduler};
