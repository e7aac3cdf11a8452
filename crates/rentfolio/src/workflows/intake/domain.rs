use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflows::catalog::PropertyAddress;
use crate::workflows::ids::{ApplicationId, BookingId, PropertyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inbound short-term stay request, before pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub property_id: PropertyId,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub num_guests: u32,
    #[serde(default)]
    pub num_pets: u32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl NewBooking {
    pub fn validate(&self) -> Result<(), IntakeValidation> {
        if self.check_out_date <= self.check_in_date {
            return Err(IntakeValidation::CheckOutNotAfterCheckIn {
                check_in: self.check_in_date,
                check_out: self.check_out_date,
            });
        }
        if self.num_guests == 0 {
            return Err(IntakeValidation::NoGuests);
        }
        Ok(())
    }

    pub fn nights(&self) -> i64 {
        (self.check_out_date - self.check_in_date).num_days()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: BookingId,
    pub property_id: PropertyId,
    pub guest_id: UserId,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub num_guests: u32,
    pub num_pets: u32,
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl BookingRequest {
    /// Half-open date overlap: check-out day itself does not block.
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in_date < check_out && check_in < self.check_out_date
    }

    /// Whether this booking still blocks the requested dates.
    pub fn holds_dates(&self) -> bool {
        matches!(self.status, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Move along pending -> confirmed -> completed, or cancel while the
    /// booking is still pending/confirmed.
    pub fn transition(
        &mut self,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<(), IntakeConflict> {
        let allowed = matches!(
            (self.status, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        );
        if !allowed {
            return Err(IntakeConflict::Booking {
                from: self.status,
                to,
            });
        }
        match to {
            BookingStatus::Confirmed => self.confirmed_at = Some(at),
            BookingStatus::Cancelled => self.cancelled_at = Some(at),
            _ => {}
        }
        self.status = to;
        Ok(())
    }
}

/// Applicant identity section; the source system held this as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone: String,
    pub current_address: PropertyAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentDetails {
    pub employer_name: String,
    pub job_title: String,
    pub monthly_income: Decimal,
    pub employment_start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialDetails {
    pub monthly_income: Decimal,
    pub other_income: Option<Decimal>,
    pub monthly_debts: Option<Decimal>,
    pub credit_score: Option<u16>,
    pub bankruptcy_history: bool,
    pub eviction_history: bool,
}

/// Inbound long-term rental application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
    pub property_id: PropertyId,
    pub personal: PersonalDetails,
    #[serde(default)]
    pub employment: Option<EmploymentDetails>,
    #[serde(default)]
    pub financial: Option<FinancialDetails>,
    #[serde(default)]
    pub background_check_consent: bool,
    #[serde(default)]
    pub credit_check_consent: bool,
    #[serde(default)]
    pub move_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub lease_term_requested: Option<u32>,
}

impl NewApplication {
    pub fn validate(&self) -> Result<(), IntakeValidation> {
        if let Some(score) = self.financial.as_ref().and_then(|f| f.credit_score) {
            if !(300..=850).contains(&score) {
                return Err(IntakeValidation::CreditScoreOutOfRange(score));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalApplication {
    pub id: ApplicationId,
    pub property_id: PropertyId,
    pub applicant_id: UserId,
    pub status: ApplicationStatus,
    pub personal: PersonalDetails,
    pub employment: Option<EmploymentDetails>,
    pub financial: Option<FinancialDetails>,
    pub background_check_consent: bool,
    pub credit_check_consent: bool,
    pub move_in_date: Option<NaiveDate>,
    pub lease_term_requested: Option<u32>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl RentalApplication {
    /// submitted -> under_review -> approved/rejected; withdrawn is open to
    /// the applicant until a decision lands.
    pub fn transition(
        &mut self,
        to: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<(), IntakeConflict> {
        let allowed = matches!(
            (self.status, to),
            (ApplicationStatus::Submitted, ApplicationStatus::UnderReview)
                | (ApplicationStatus::Submitted, ApplicationStatus::Withdrawn)
                | (ApplicationStatus::UnderReview, ApplicationStatus::Approved)
                | (ApplicationStatus::UnderReview, ApplicationStatus::Rejected)
                | (ApplicationStatus::UnderReview, ApplicationStatus::Withdrawn)
        );
        if !allowed {
            return Err(IntakeConflict::Application {
                from: self.status,
                to,
            });
        }
        match to {
            ApplicationStatus::UnderReview => self.reviewed_at = Some(at),
            ApplicationStatus::Approved | ApplicationStatus::Rejected => {
                self.decided_at = Some(at)
            }
            _ => {}
        }
        self.status = to;
        Ok(())
    }
}

/// Malformed intake input, rejected before anything is persisted.
#[derive(Debug, thiserror::Error)]
pub enum IntakeValidation {
    #[error("check_out_date {check_out} must fall after check_in_date {check_in}")]
    CheckOutNotAfterCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("bookings require at least one guest")]
    NoGuests,
    #[error("stay of {nights} nights is outside the listing's allowed length")]
    StayLengthOutOfBounds {
        nights: i64,
        minimum: u32,
        maximum: Option<u32>,
    },
    #[error("property {0} does not accept short-term bookings")]
    NotShortTerm(PropertyId),
    #[error("property {0} does not accept rental applications")]
    NotLongTerm(PropertyId),
    #[error("property {0} is not an active listing")]
    Inactive(PropertyId),
    #[error("property {property_id} is unavailable on {date}")]
    Unavailable {
        property_id: PropertyId,
        date: NaiveDate,
    },
    #[error("requested dates collide with booking {0}")]
    DatesTaken(BookingId),
    #[error("credit score {0} is outside the 300..=850 reporting range")]
    CreditScoreOutOfRange(u16),
}

/// Transition rejected because it is not reachable from the current status.
#[derive(Debug, thiserror::Error)]
pub enum IntakeConflict {
    #[error("booking cannot move from {from} to {to}")]
    Booking {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("application cannot move from {from} to {to}")]
    Application {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}
