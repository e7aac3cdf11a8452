use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::catalog::AvailabilityWindow;
use crate::workflows::ids::{ApplicationId, ContractId, PropertyId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Sent,
    PartiallySigned,
    Completed,
    Expired,
}

impl ContractStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::PartiallySigned => "partially_signed",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningParty {
    Tenant,
    Landlord,
}

impl SigningParty {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Landlord => "landlord",
        }
    }
}

impl std::fmt::Display for SigningParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn default_contract_type() -> String {
    "lease_agreement".to_string()
}

/// Request payload for a new draft lease.
#[derive(Clone, Debug, Deserialize)]
pub struct NewContract {
    pub property_id: PropertyId,
    pub tenant_id: UserId,
    pub landlord_id: UserId,
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    #[serde(default = "default_contract_type")]
    pub contract_type: String,
    pub monthly_rent: Decimal,
    #[serde(default)]
    pub security_deposit: Option<Decimal>,
    pub lease_start_date: NaiveDate,
    pub lease_end_date: NaiveDate,
    pub lease_term_months: u32,
}

/// A lease agreement moving draft → sent → partially_signed → completed,
/// with expiry reachable while signatures are outstanding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub property_id: PropertyId,
    pub tenant_id: UserId,
    pub landlord_id: UserId,
    pub application_id: Option<ApplicationId>,
    pub contract_type: String,
    pub status: ContractStatus,
    pub envelope_id: Option<String>,
    pub monthly_rent: Decimal,
    pub security_deposit: Option<Decimal>,
    pub lease_start_date: NaiveDate,
    pub lease_end_date: NaiveDate,
    pub lease_term_months: u32,
    pub tenant_signed_at: Option<DateTime<Utc>>,
    pub landlord_signed_at: Option<DateTime<Utc>>,
    pub fully_executed_at: Option<DateTime<Utc>>,
}

/// Signals consumed by [`Contract::apply`]. Dispatch and signature completion
/// come from the e-signature collaborator; deadline expiry comes from a
/// background policy job.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContractEvent {
    Dispatched {
        envelope_id: String,
    },
    PartySigned {
        party: SigningParty,
        signed_at: DateTime<Utc>,
    },
    DeadlineElapsed,
}

impl ContractEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dispatched { .. } => "dispatched",
            Self::PartySigned { .. } => "party_signed",
            Self::DeadlineElapsed => "deadline_elapsed",
        }
    }
}

/// Side effect owed by the caller after a successful transition. Entering
/// `completed` is the only transition that produces one, and the status
/// update must not land without it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionEffect {
    None,
    PropertyLeased(AvailabilityWindow),
}

impl Contract {
    pub fn draft(id: ContractId, new: NewContract) -> Result<Self, ContractValidation> {
        if new.lease_end_date <= new.lease_start_date {
            return Err(ContractValidation::LeaseEndsBeforeStart {
                start: new.lease_start_date,
                end: new.lease_end_date,
            });
        }
        if new.monthly_rent <= Decimal::ZERO {
            return Err(ContractValidation::NonPositiveRent(new.monthly_rent));
        }
        Ok(Self {
            id,
            property_id: new.property_id,
            tenant_id: new.tenant_id,
            landlord_id: new.landlord_id,
            application_id: new.application_id,
            contract_type: new.contract_type,
            status: ContractStatus::Draft,
            envelope_id: None,
            monthly_rent: new.monthly_rent,
            security_deposit: new.security_deposit,
            lease_start_date: new.lease_start_date,
            lease_end_date: new.lease_end_date,
            lease_term_months: new.lease_term_months,
            tenant_signed_at: None,
            landlord_signed_at: None,
            fully_executed_at: None,
        })
    }

    /// Advance the state machine. On the transition into `completed` the
    /// returned effect carries the leased availability window the caller must
    /// persist atomically with the contract.
    pub fn apply(&mut self, event: ContractEvent) -> Result<TransitionEffect, TransitionError> {
        match event {
            ContractEvent::Dispatched { envelope_id } => {
                if self.status != ContractStatus::Draft {
                    return Err(self.not_allowed("dispatched"));
                }
                self.status = ContractStatus::Sent;
                self.envelope_id = Some(envelope_id);
                Ok(TransitionEffect::None)
            }
            ContractEvent::PartySigned { party, signed_at } => {
                if !matches!(
                    self.status,
                    ContractStatus::Sent | ContractStatus::PartiallySigned
                ) {
                    return Err(self.not_allowed("party_signed"));
                }
                let slot = match party {
                    SigningParty::Tenant => &mut self.tenant_signed_at,
                    SigningParty::Landlord => &mut self.landlord_signed_at,
                };
                if slot.is_some() {
                    return Err(TransitionError::AlreadySigned(party));
                }
                *slot = Some(signed_at);

                if self.tenant_signed_at.is_some() && self.landlord_signed_at.is_some() {
                    self.status = ContractStatus::Completed;
                    self.fully_executed_at = Some(signed_at);
                    Ok(TransitionEffect::PropertyLeased(AvailabilityWindow::leased(
                        self.property_id.clone(),
                        self.lease_start_date,
                        self.lease_end_date,
                    )))
                } else {
                    self.status = ContractStatus::PartiallySigned;
                    Ok(TransitionEffect::None)
                }
            }
            ContractEvent::DeadlineElapsed => {
                if !matches!(
                    self.status,
                    ContractStatus::Sent | ContractStatus::PartiallySigned
                ) {
                    return Err(self.not_allowed("deadline_elapsed"));
                }
                self.status = ContractStatus::Expired;
                Ok(TransitionEffect::None)
            }
        }
    }

    fn not_allowed(&self, event: &'static str) -> TransitionError {
        TransitionError::NotAllowed {
            status: self.status,
            event,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContractValidation {
    #[error("lease end {end} is not after lease start {start}")]
    LeaseEndsBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("monthly rent {0} must be positive")]
    NonPositiveRent(Decimal),
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("event {event} is not allowed while the contract is {status}")]
    NotAllowed {
        status: ContractStatus,
        event: &'static str,
    },
    #[error("the {0} has already signed")]
    AlreadySigned(SigningParty),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::catalog::LEASED_REASON;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn signed_at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, day, 12, 0, 0).unwrap()
    }

    fn new_contract() -> NewContract {
        NewContract {
            property_id: PropertyId("prop-000001".to_string()),
            tenant_id: UserId("tenant-1".to_string()),
            landlord_id: UserId("landlord-1".to_string()),
            application_id: None,
            contract_type: default_contract_type(),
            monthly_rent: dec!(2200.00),
            security_deposit: Some(dec!(4400.00)),
            lease_start_date: date(2026, 4, 1),
            lease_end_date: date(2027, 3, 31),
            lease_term_months: 12,
        }
    }

    fn draft() -> Contract {
        Contract::draft(ContractId("ctr-000001".to_string()), new_contract()).expect("valid draft")
    }

    #[test]
    fn inverted_lease_dates_are_rejected() {
        let mut new = new_contract();
        new.lease_end_date = new.lease_start_date;
        let err = Contract::draft(ContractId("ctr-000001".to_string()), new).unwrap_err();
        assert!(matches!(
            err,
            ContractValidation::LeaseEndsBeforeStart { .. }
        ));
    }

    #[test]
    fn zero_rent_is_rejected() {
        let mut new = new_contract();
        new.monthly_rent = Decimal::ZERO;
        let err = Contract::draft(ContractId("ctr-000001".to_string()), new).unwrap_err();
        assert!(matches!(err, ContractValidation::NonPositiveRent(_)));
    }

    #[test]
    fn full_signature_path_leases_the_property() {
        let mut contract = draft();

        let effect = contract
            .apply(ContractEvent::Dispatched {
                envelope_id: "env-42".to_string(),
            })
            .unwrap();
        assert_eq!(effect, TransitionEffect::None);
        assert_eq!(contract.status, ContractStatus::Sent);
        assert_eq!(contract.envelope_id.as_deref(), Some("env-42"));

        let effect = contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Tenant,
                signed_at: signed_at(10),
            })
            .unwrap();
        assert_eq!(effect, TransitionEffect::None);
        assert_eq!(contract.status, ContractStatus::PartiallySigned);
        assert!(contract.fully_executed_at.is_none());

        let effect = contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Landlord,
                signed_at: signed_at(12),
            })
            .unwrap();
        assert_eq!(contract.status, ContractStatus::Completed);
        assert_eq!(contract.fully_executed_at, Some(signed_at(12)));

        match effect {
            TransitionEffect::PropertyLeased(window) => {
                assert_eq!(window.property_id, contract.property_id);
                assert_eq!(window.available_from, date(2026, 4, 1));
                assert_eq!(window.available_to, Some(date(2027, 3, 31)));
                assert!(!window.is_available);
                assert_eq!(window.reason.as_deref(), Some(LEASED_REASON));
            }
            other => panic!("expected leased window, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_signature_is_a_conflict() {
        let mut contract = draft();
        contract
            .apply(ContractEvent::Dispatched {
                envelope_id: "env-42".to_string(),
            })
            .unwrap();
        contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Tenant,
                signed_at: signed_at(10),
            })
            .unwrap();

        let err = contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Tenant,
                signed_at: signed_at(11),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TransitionError::AlreadySigned(SigningParty::Tenant)
        ));
        assert_eq!(contract.status, ContractStatus::PartiallySigned);
        assert_eq!(contract.tenant_signed_at, Some(signed_at(10)));
    }

    #[test]
    fn draft_cannot_collect_signatures_or_expire() {
        let mut contract = draft();
        let err = contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Tenant,
                signed_at: signed_at(10),
            })
            .unwrap_err();
        assert!(matches!(err, TransitionError::NotAllowed { .. }));

        let err = contract.apply(ContractEvent::DeadlineElapsed).unwrap_err();
        assert!(matches!(err, TransitionError::NotAllowed { .. }));
        assert_eq!(contract.status, ContractStatus::Draft);
    }

    #[test]
    fn deadline_expires_outstanding_contracts() {
        let mut contract = draft();
        contract
            .apply(ContractEvent::Dispatched {
                envelope_id: "env-42".to_string(),
            })
            .unwrap();
        contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Landlord,
                signed_at: signed_at(10),
            })
            .unwrap();

        let effect = contract.apply(ContractEvent::DeadlineElapsed).unwrap();
        assert_eq!(effect, TransitionEffect::None);
        assert_eq!(contract.status, ContractStatus::Expired);

        let err = contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Tenant,
                signed_at: signed_at(11),
            })
            .unwrap_err();
        assert!(matches!(err, TransitionError::NotAllowed { .. }));
    }

    #[test]
    fn completed_contract_rejects_further_events() {
        let mut contract = draft();
        contract
            .apply(ContractEvent::Dispatched {
                envelope_id: "env-42".to_string(),
            })
            .unwrap();
        contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Tenant,
                signed_at: signed_at(10),
            })
            .unwrap();
        contract
            .apply(ContractEvent::PartySigned {
                party: SigningParty::Landlord,
                signed_at: signed_at(12),
            })
            .unwrap();

        let err = contract.apply(ContractEvent::DeadlineElapsed).unwrap_err();
        assert!(matches!(
            err,
            TransitionError::NotAllowed {
                status: ContractStatus::Completed,
                ..
            }
        ));
    }
}
