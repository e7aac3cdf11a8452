use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::ids::{CommissionId, ContractId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Processing,
    Paid,
    Failed,
}

impl CommissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn default_commission_type() -> String {
    "listing".to_string()
}

/// Caller-supplied terms for a commission. The stored amount is never taken
/// from the caller; it is always derived from rate and base.
#[derive(Clone, Debug, Deserialize)]
pub struct CommissionTerms {
    pub contract_id: ContractId,
    pub agent_id: UserId,
    #[serde(default = "default_commission_type")]
    pub commission_type: String,
    pub commission_rate: Decimal,
    pub base_amount: Decimal,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl CommissionTerms {
    pub fn validate(&self) -> Result<(), CommissionValidation> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate > Decimal::ONE {
            return Err(CommissionValidation::RateOutOfRange(self.commission_rate));
        }
        if self.base_amount < Decimal::ZERO {
            return Err(CommissionValidation::NegativeBase(self.base_amount));
        }
        Ok(())
    }
}

/// Agent payout owed under a contract. `commission_amount` is a pure function
/// of base and rate, recomputed on every write.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommissionRecord {
    pub id: CommissionId,
    pub contract_id: ContractId,
    pub agent_id: UserId,
    pub commission_type: String,
    pub commission_rate: Decimal,
    pub commission_amount: Decimal,
    pub base_amount: Decimal,
    pub status: CommissionStatus,
    pub transfer_reference: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
}

fn derive_amount(base_amount: Decimal, commission_rate: Decimal) -> Decimal {
    (base_amount * commission_rate).round_dp(2)
}

impl CommissionRecord {
    pub fn from_terms(id: CommissionId, terms: CommissionTerms) -> Result<Self, CommissionValidation> {
        terms.validate()?;
        Ok(Self {
            id,
            contract_id: terms.contract_id,
            agent_id: terms.agent_id,
            commission_type: terms.commission_type,
            commission_rate: terms.commission_rate,
            commission_amount: derive_amount(terms.base_amount, terms.commission_rate),
            base_amount: terms.base_amount,
            status: CommissionStatus::Pending,
            transfer_reference: None,
            due_date: terms.due_date,
            paid_at: None,
        })
    }

    /// Re-apply terms to an existing record, recomputing the amount.
    pub fn apply_terms(&mut self, terms: CommissionTerms) -> Result<(), CommissionValidation> {
        terms.validate()?;
        self.commission_type = terms.commission_type;
        self.commission_rate = terms.commission_rate;
        self.base_amount = terms.base_amount;
        self.commission_amount = derive_amount(terms.base_amount, terms.commission_rate);
        self.due_date = terms.due_date;
        Ok(())
    }

    /// Status progression is driven by the payment collaborator; nothing here
    /// advances automatically.
    pub fn advance(
        &mut self,
        to: CommissionStatus,
        at: DateTime<Utc>,
        transfer_reference: Option<String>,
    ) -> Result<(), CommissionConflict> {
        let allowed = matches!(
            (self.status, to),
            (CommissionStatus::Pending, CommissionStatus::Processing)
                | (CommissionStatus::Processing, CommissionStatus::Paid)
                | (CommissionStatus::Pending, CommissionStatus::Failed)
                | (CommissionStatus::Processing, CommissionStatus::Failed)
        );
        if !allowed {
            return Err(CommissionConflict::NotAllowed {
                id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        if to == CommissionStatus::Paid {
            self.paid_at = Some(at);
        }
        if transfer_reference.is_some() {
            self.transfer_reference = transfer_reference;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommissionValidation {
    #[error("commission rate {0} is outside 0..=1")]
    RateOutOfRange(Decimal),
    #[error("base amount {0} must not be negative")]
    NegativeBase(Decimal),
}

#[derive(Debug, thiserror::Error)]
pub enum CommissionConflict {
    #[error("commission {id} cannot move from {from} to {to}")]
    NotAllowed {
        id: CommissionId,
        from: CommissionStatus,
        to: CommissionStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn terms() -> CommissionTerms {
        CommissionTerms {
            contract_id: ContractId("ctr-000001".to_string()),
            agent_id: UserId("agent-1".to_string()),
            commission_type: default_commission_type(),
            commission_rate: dec!(0.03),
            base_amount: dec!(10000.00),
            due_date: None,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn amount_is_base_times_rate() {
        let record =
            CommissionRecord::from_terms(CommissionId("com-000001".to_string()), terms()).unwrap();
        assert_eq!(record.commission_amount, dec!(300.00));
        assert_eq!(record.status, CommissionStatus::Pending);
    }

    #[test]
    fn reapplied_terms_recompute_the_amount() {
        let mut record =
            CommissionRecord::from_terms(CommissionId("com-000001".to_string()), terms()).unwrap();

        let mut updated = terms();
        updated.commission_rate = dec!(0.05);
        updated.base_amount = dec!(24000.00);
        record.apply_terms(updated).unwrap();

        assert_eq!(record.commission_amount, dec!(1200.00));
    }

    #[test]
    fn rate_outside_unit_interval_is_rejected() {
        let mut bad = terms();
        bad.commission_rate = dec!(1.5);
        assert!(matches!(
            bad.validate(),
            Err(CommissionValidation::RateOutOfRange(_))
        ));

        bad.commission_rate = dec!(-0.01);
        assert!(matches!(
            bad.validate(),
            Err(CommissionValidation::RateOutOfRange(_))
        ));
    }

    #[test]
    fn negative_base_is_rejected() {
        let mut bad = terms();
        bad.base_amount = dec!(-1.00);
        assert!(matches!(
            bad.validate(),
            Err(CommissionValidation::NegativeBase(_))
        ));
    }

    #[test]
    fn fractional_amounts_round_to_cents() {
        let mut odd = terms();
        odd.commission_rate = dec!(0.0333);
        odd.base_amount = dec!(1234.56);
        let record =
            CommissionRecord::from_terms(CommissionId("com-000001".to_string()), odd).unwrap();
        assert_eq!(record.commission_amount, dec!(41.11));
    }

    #[test]
    fn payout_path_sets_paid_at_and_reference() {
        let mut record =
            CommissionRecord::from_terms(CommissionId("com-000001".to_string()), terms()).unwrap();

        record
            .advance(CommissionStatus::Processing, at(), None)
            .unwrap();
        record
            .advance(
                CommissionStatus::Paid,
                at(),
                Some("tr_9f3k".to_string()),
            )
            .unwrap();

        assert_eq!(record.status, CommissionStatus::Paid);
        assert_eq!(record.paid_at, Some(at()));
        assert_eq!(record.transfer_reference.as_deref(), Some("tr_9f3k"));
    }

    #[test]
    fn paid_is_terminal_and_pending_cannot_jump_to_paid() {
        let mut record =
            CommissionRecord::from_terms(CommissionId("com-000001".to_string()), terms()).unwrap();

        let err = record
            .advance(CommissionStatus::Paid, at(), None)
            .unwrap_err();
        assert!(matches!(err, CommissionConflict::NotAllowed { .. }));

        record
            .advance(CommissionStatus::Processing, at(), None)
            .unwrap();
        record.advance(CommissionStatus::Paid, at(), None).unwrap();
        let err = record
            .advance(CommissionStatus::Failed, at(), None)
            .unwrap_err();
        assert!(matches!(err, CommissionConflict::NotAllowed { .. }));
    }
}
