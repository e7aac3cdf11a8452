//! Booking and application intake: short-term stay requests priced off the
//! listing's fee schedule, and structured long-term rental applications.

pub mod domain;
pub mod pricing;
pub mod repository;
pub mod service;

pub use domain::{
    ApplicationStatus, BookingRequest, BookingStatus, EmploymentDetails, FinancialDetails,
    IntakeConflict, IntakeValidation, NewApplication, NewBooking, PersonalDetails,
    RentalApplication,
};
pub use repository::{ApplicationStore, BookingStore};
pub use service::{IntakeError, IntakeService};
