use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{NewViewing, ViewingConflict, ViewingSchedule, ViewingStatus, ViewingValidation};
use super::repository::ViewingStore;
use crate::store::RepositoryError;
use crate::workflows::catalog::CatalogStore;
use crate::workflows::ids::{PropertyId, ViewingId};

/// Books, completes, cancels, and reschedules property tours.
pub struct ViewingScheduler<S> {
    store: Arc<S>,
}

static VIEWING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_viewing_id() -> ViewingId {
    let id = VIEWING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ViewingId(format!("view-{id:06}"))
}

impl<S> ViewingScheduler<S>
where
    S: ViewingStore + CatalogStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn schedule(
        &self,
        new: NewViewing,
        now: DateTime<Utc>,
    ) -> Result<ViewingSchedule, ViewingError> {
        new.validate(now)?;
        if self.store.fetch_property(&new.property_id)?.is_none() {
            return Err(ViewingError::PropertyNotFound(new.property_id));
        }
        let viewing = ViewingSchedule {
            id: next_viewing_id(),
            property_id: new.property_id,
            applicant_id: new.applicant_id,
            agent_id: new.agent_id,
            scheduled_date: new.scheduled_date,
            duration_minutes: new.duration_minutes,
            status: ViewingStatus::Scheduled,
            notes: new.notes,
            agent_notes: None,
            rescheduled_from: None,
            completed_at: None,
            cancelled_at: None,
        };
        let stored = self.store.insert_viewing(viewing)?;
        info!(
            viewing = %stored.id,
            property = %stored.property_id,
            scheduled = %stored.scheduled_date,
            "viewing scheduled"
        );
        Ok(stored)
    }

    pub fn complete(
        &self,
        id: &ViewingId,
        at: DateTime<Utc>,
        agent_notes: Option<String>,
    ) -> Result<ViewingSchedule, ViewingError> {
        let mut viewing = self.get(id)?;
        viewing.complete(at)?;
        if agent_notes.is_some() {
            viewing.agent_notes = agent_notes;
        }
        self.store.update_viewing(viewing.clone())?;
        info!(viewing = %viewing.id, "viewing completed");
        Ok(viewing)
    }

    pub fn cancel(&self, id: &ViewingId, at: DateTime<Utc>) -> Result<ViewingSchedule, ViewingError> {
        let mut viewing = self.get(id)?;
        viewing.cancel(at)?;
        self.store.update_viewing(viewing.clone())?;
        info!(viewing = %viewing.id, "viewing cancelled");
        Ok(viewing)
    }

    /// Replace a scheduled viewing with a new appointment. The original row
    /// keeps its date and is marked rescheduled; the replacement carries the
    /// back-reference.
    pub fn reschedule(
        &self,
        id: &ViewingId,
        scheduled_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<ViewingSchedule, ViewingError> {
        let mut original = self.get(id)?;
        if original.status != ViewingStatus::Scheduled {
            return Err(ViewingConflict::NotScheduled {
                id: original.id,
                status: original.status,
            }
            .into());
        }
        if scheduled_date <= now {
            return Err(ViewingValidation::ScheduledInPast(scheduled_date).into());
        }

        let replacement = ViewingSchedule {
            id: next_viewing_id(),
            property_id: original.property_id.clone(),
            applicant_id: original.applicant_id.clone(),
            agent_id: original.agent_id.clone(),
            scheduled_date,
            duration_minutes: original.duration_minutes,
            status: ViewingStatus::Scheduled,
            notes: original.notes.clone(),
            agent_notes: None,
            rescheduled_from: Some(original.id.clone()),
            completed_at: None,
            cancelled_at: None,
        };
        let stored = self.store.insert_viewing(replacement)?;
        original.supersede()?;
        self.store.update_viewing(original.clone())?;
        info!(
            viewing = %stored.id,
            replaces = %original.id,
            "viewing rescheduled"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &ViewingId) -> Result<ViewingSchedule, ViewingError> {
        self.store
            .fetch_viewing(id)?
            .ok_or_else(|| ViewingError::ViewingNotFound(id.clone()))
    }

    pub fn for_property(&self, id: &PropertyId) -> Result<Vec<ViewingSchedule>, ViewingError> {
        Ok(self.store.viewings_for_property(id)?)
    }
}

/// Error raised by the viewing scheduler.
#[derive(Debug, thiserror::Error)]
pub enum ViewingError {
    #[error(transparent)]
    Validation(#[from] ViewingValidation),
    #[error(transparent)]
    StateConflict(#[from] ViewingConflict),
    #[error("viewing {0} not found")]
    ViewingNotFound(ViewingId),
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
