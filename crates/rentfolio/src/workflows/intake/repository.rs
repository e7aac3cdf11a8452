use super::domain::{BookingRequest, RentalApplication};
use crate::store::RepositoryError;
use crate::workflows::ids::{ApplicationId, BookingId, PropertyId};

/// Storage abstraction for short-term booking requests.
pub trait BookingStore: Send + Sync {
    fn insert_booking(&self, booking: BookingRequest) -> Result<BookingRequest, RepositoryError>;
    fn update_booking(&self, booking: BookingRequest) -> Result<(), RepositoryError>;
    fn fetch_booking(&self, id: &BookingId) -> Result<Option<BookingRequest>, RepositoryError>;
    fn bookings_for_property(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<BookingRequest>, RepositoryError>;
}

/// Storage abstraction for long-term rental applications.
pub trait ApplicationStore: Send + Sync {
    fn insert_application(
        &self,
        application: RentalApplication,
    ) -> Result<RentalApplication, RepositoryError>;
    fn update_application(&self, application: RentalApplication) -> Result<(), RepositoryError>;
    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<RentalApplication>, RepositoryError>;
    fn applications_for_property(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<RentalApplication>, RepositoryError>;
}
