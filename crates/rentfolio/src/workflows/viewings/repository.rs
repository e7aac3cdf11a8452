use super::domain::ViewingSchedule;
use crate::store::RepositoryError;
use crate::workflows::ids::{PropertyId, ViewingId};

/// Storage abstraction for tour appointments.
pub trait ViewingStore: Send + Sync {
    fn insert_viewing(&self, viewing: ViewingSchedule) -> Result<ViewingSchedule, RepositoryError>;
    fn update_viewing(&self, viewing: ViewingSchedule) -> Result<(), RepositoryError>;
    fn fetch_viewing(&self, id: &ViewingId) -> Result<Option<ViewingSchedule>, RepositoryError>;
    fn viewings_for_property(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<ViewingSchedule>, RepositoryError>;
}
