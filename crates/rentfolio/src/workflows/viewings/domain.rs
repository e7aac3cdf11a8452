use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::ids::{ApplicationId, PropertyId, UserId, ViewingId};

pub const MIN_DURATION_MINUTES: u32 = 15;
pub const MAX_DURATION_MINUTES: u32 = 120;

const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewingStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl ViewingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
        }
    }
}

impl std::fmt::Display for ViewingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Request payload for a new tour appointment. The applicant is optional so
/// agents can run open viewings.
#[derive(Clone, Debug, Deserialize)]
pub struct NewViewing {
    pub property_id: PropertyId,
    pub applicant_id: Option<ApplicationId>,
    pub agent_id: UserId,
    pub scheduled_date: DateTime<Utc>,
    #[serde(default = "NewViewing::default_duration")]
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

impl NewViewing {
    pub(crate) fn default_duration() -> u32 {
        DEFAULT_DURATION_MINUTES
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ViewingValidation> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            return Err(ViewingValidation::DurationOutOfBounds(self.duration_minutes));
        }
        if self.scheduled_date <= now {
            return Err(ViewingValidation::ScheduledInPast(self.scheduled_date));
        }
        Ok(())
    }
}

/// A tour appointment. Rescheduling never mutates `scheduled_date` in place:
/// the replacement row carries `rescheduled_from` back to this one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewingSchedule {
    pub id: ViewingId,
    pub property_id: PropertyId,
    pub applicant_id: Option<ApplicationId>,
    pub agent_id: UserId,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub status: ViewingStatus,
    pub notes: Option<String>,
    pub agent_notes: Option<String>,
    pub rescheduled_from: Option<ViewingId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl ViewingSchedule {
    /// A viewing can be marked completed at or after its scheduled time only.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), ViewingConflict> {
        if self.status != ViewingStatus::Scheduled {
            return Err(ViewingConflict::NotScheduled {
                id: self.id.clone(),
                status: self.status,
            });
        }
        if at < self.scheduled_date {
            return Err(ViewingConflict::CompletedBeforeTour {
                id: self.id.clone(),
                scheduled_date: self.scheduled_date,
            });
        }
        self.status = ViewingStatus::Completed;
        self.completed_at = Some(at);
        Ok(())
    }

    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), ViewingConflict> {
        if self.status != ViewingStatus::Scheduled {
            return Err(ViewingConflict::NotScheduled {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = ViewingStatus::Cancelled;
        self.cancelled_at = Some(at);
        Ok(())
    }

    /// Mark this viewing as replaced by a new appointment.
    pub fn supersede(&mut self) -> Result<(), ViewingConflict> {
        if self.status != ViewingStatus::Scheduled {
            return Err(ViewingConflict::NotScheduled {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = ViewingStatus::Rescheduled;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ViewingValidation {
    #[error(
        "duration of {0} minutes is outside \
         {MIN_DURATION_MINUTES}..={MAX_DURATION_MINUTES}"
    )]
    DurationOutOfBounds(u32),
    #[error("scheduled date {0} is not in the future")]
    ScheduledInPast(DateTime<Utc>),
}

#[derive(Debug, thiserror::Error)]
pub enum ViewingConflict {
    #[error("viewing {id} is {status}, not scheduled")]
    NotScheduled { id: ViewingId, status: ViewingStatus },
    #[error("viewing {id} cannot be completed before its tour at {scheduled_date}")]
    CompletedBeforeTour {
        id: ViewingId,
        scheduled_date: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn viewing(scheduled: DateTime<Utc>) -> ViewingSchedule {
        ViewingSchedule {
            id: ViewingId("view-000001".to_string()),
            property_id: PropertyId("prop-000001".to_string()),
            applicant_id: None,
            agent_id: UserId("agent-1".to_string()),
            scheduled_date: scheduled,
            duration_minutes: 30,
            status: ViewingStatus::Scheduled,
            notes: None,
            agent_notes: None,
            rescheduled_from: None,
            completed_at: None,
            cancelled_at: None,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn completion_before_the_tour_is_rejected() {
        let mut v = viewing(at(14));
        let err = v.complete(at(13)).unwrap_err();
        assert!(matches!(err, ViewingConflict::CompletedBeforeTour { .. }));
        assert_eq!(v.status, ViewingStatus::Scheduled);
        assert!(v.completed_at.is_none());
    }

    #[test]
    fn completion_at_the_scheduled_time_succeeds() {
        let mut v = viewing(at(14));
        v.complete(at(14)).unwrap();
        assert_eq!(v.status, ViewingStatus::Completed);
        assert_eq!(v.completed_at, Some(at(14)));
    }

    #[test]
    fn cancelled_viewing_cannot_complete() {
        let mut v = viewing(at(14));
        v.cancel(at(12)).unwrap();
        let err = v.complete(at(15)).unwrap_err();
        assert!(matches!(err, ViewingConflict::NotScheduled { .. }));
    }

    #[test]
    fn duration_bounds_are_enforced() {
        let mut new = NewViewing {
            property_id: PropertyId("prop-000001".to_string()),
            applicant_id: None,
            agent_id: UserId("agent-1".to_string()),
            scheduled_date: at(14),
            duration_minutes: 10,
            notes: None,
        };
        assert!(new.validate(at(9)).is_err());
        new.duration_minutes = 121;
        assert!(new.validate(at(9)).is_err());
        new.duration_minutes = 45;
        assert!(new.validate(at(9)).is_ok());
    }

    #[test]
    fn scheduling_in_the_past_is_rejected() {
        let new = NewViewing {
            property_id: PropertyId("prop-000001".to_string()),
            applicant_id: None,
            agent_id: UserId("agent-1".to_string()),
            scheduled_date: at(9),
            duration_minutes: 30,
            notes: None,
        };
        assert!(new.validate(at(14)).is_err());
    }
}
