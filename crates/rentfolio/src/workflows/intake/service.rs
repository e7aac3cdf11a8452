use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::domain::{
    ApplicationStatus, BookingRequest, BookingStatus, IntakeConflict, IntakeValidation,
    NewApplication, NewBooking, RentalApplication,
};
use super::pricing;
use super::repository::{ApplicationStore, BookingStore};
use crate::store::RepositoryError;
use crate::workflows::catalog::{CatalogStore, Property, PropertyType, ShortTermTerms};
use crate::workflows::ids::{ApplicationId, BookingId, PropertyId, UserId};

/// Service composing the catalog reads, pricing, and intake persistence.
pub struct IntakeService<S> {
    store: Arc<S>,
}

static BOOKING_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_booking_id() -> BookingId {
    let id = BOOKING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BookingId(format!("bkg-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<S> IntakeService<S>
where
    S: CatalogStore + BookingStore + ApplicationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Price and record a short-term stay request. The property must be an
    /// active short-term listing, open on every night of the stay, with no
    /// overlapping pending/confirmed booking holding the dates.
    pub fn request_booking(
        &self,
        guest_id: UserId,
        new: NewBooking,
    ) -> Result<BookingRequest, IntakeError> {
        new.validate()?;
        let property = self.active_property(&new.property_id)?;
        if property.property_type != PropertyType::ShortTerm {
            return Err(IntakeValidation::NotShortTerm(property.id).into());
        }
        let nightly_rate = property
            .nightly_rate()
            .ok_or_else(|| IntakeValidation::NotShortTerm(property.id.clone()))?;
        let terms = self
            .store
            .short_term_terms(&property.id)?
            .unwrap_or_else(|| ShortTermTerms::standard(property.id.clone()));

        let nights = new.nights();
        pricing::check_stay_length(nights, &terms)?;

        let mut date = new.check_in_date;
        while date < new.check_out_date {
            if !self.store.is_available(&property.id, date)? {
                return Err(IntakeValidation::Unavailable {
                    property_id: property.id,
                    date,
                }
                .into());
            }
            date = date + Duration::days(1);
        }

        let held = self.store.bookings_for_property(&property.id)?;
        if let Some(existing) = held
            .iter()
            .find(|b| b.holds_dates() && b.overlaps(new.check_in_date, new.check_out_date))
        {
            return Err(IntakeValidation::DatesTaken(existing.id.clone()).into());
        }

        let total_amount = pricing::booking_total(
            nightly_rate,
            nights as u32,
            new.num_guests,
            new.num_pets,
            &terms,
        );
        let booking = BookingRequest {
            id: next_booking_id(),
            property_id: new.property_id,
            guest_id,
            check_in_date: new.check_in_date,
            check_out_date: new.check_out_date,
            num_guests: new.num_guests,
            num_pets: new.num_pets,
            total_amount,
            status: BookingStatus::Pending,
            special_requests: new.special_requests,
            confirmed_at: None,
            cancelled_at: None,
        };
        let stored = self.store.insert_booking(booking)?;
        info!(
            booking = %stored.id,
            property = %stored.property_id,
            total = %stored.total_amount,
            "booking requested"
        );
        Ok(stored)
    }

    pub fn transition_booking(
        &self,
        id: &BookingId,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<BookingRequest, IntakeError> {
        let mut booking = self
            .store
            .fetch_booking(id)?
            .ok_or_else(|| IntakeError::BookingNotFound(id.clone()))?;
        booking.transition(to, at)?;
        self.store.update_booking(booking.clone())?;
        info!(booking = %booking.id, status = booking.status.label(), "booking updated");
        Ok(booking)
    }

    pub fn get_booking(&self, id: &BookingId) -> Result<BookingRequest, IntakeError> {
        self.store
            .fetch_booking(id)?
            .ok_or_else(|| IntakeError::BookingNotFound(id.clone()))
    }

    /// Record a long-term application against an active long-term listing.
    pub fn submit_application(
        &self,
        applicant_id: UserId,
        new: NewApplication,
    ) -> Result<RentalApplication, IntakeError> {
        new.validate()?;
        let property = self.active_property(&new.property_id)?;
        if property.property_type != PropertyType::LongTerm {
            return Err(IntakeValidation::NotLongTerm(property.id).into());
        }

        let application = RentalApplication {
            id: next_application_id(),
            property_id: new.property_id,
            applicant_id,
            status: ApplicationStatus::Submitted,
            personal: new.personal,
            employment: new.employment,
            financial: new.financial,
            background_check_consent: new.background_check_consent,
            credit_check_consent: new.credit_check_consent,
            move_in_date: new.move_in_date,
            lease_term_requested: new.lease_term_requested,
            reviewed_at: None,
            decided_at: None,
        };
        let stored = self.store.insert_application(application)?;
        info!(application = %stored.id, property = %stored.property_id, "application submitted");
        Ok(stored)
    }

    pub fn transition_application(
        &self,
        id: &ApplicationId,
        to: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<RentalApplication, IntakeError> {
        let mut application = self
            .store
            .fetch_application(id)?
            .ok_or_else(|| IntakeError::ApplicationNotFound(id.clone()))?;
        application.transition(to, at)?;
        self.store.update_application(application.clone())?;
        info!(
            application = %application.id,
            status = application.status.label(),
            "application updated"
        );
        Ok(application)
    }

    pub fn get_application(&self, id: &ApplicationId) -> Result<RentalApplication, IntakeError> {
        self.store
            .fetch_application(id)?
            .ok_or_else(|| IntakeError::ApplicationNotFound(id.clone()))
    }

    fn active_property(&self, id: &PropertyId) -> Result<Property, IntakeError> {
        let property = self
            .store
            .fetch_property(id)?
            .ok_or_else(|| IntakeError::PropertyNotFound(id.clone()))?;
        if !property.is_active {
            return Err(IntakeValidation::Inactive(property.id).into());
        }
        Ok(property)
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] IntakeValidation),
    #[error(transparent)]
    StateConflict(#[from] IntakeConflict),
    #[error("booking {0} not found")]
    BookingNotFound(BookingId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
