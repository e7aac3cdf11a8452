use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::commission::{
    CommissionConflict, CommissionRecord, CommissionStatus, CommissionTerms, CommissionValidation,
};
use super::domain::{
    Contract, ContractEvent, ContractValidation, NewContract, SigningParty, TransitionEffect,
    TransitionError,
};
use super::repository::{CommissionStore, ContractStore};
use crate::store::RepositoryError;
use crate::workflows::ids::{CommissionId, ContractId, PropertyId};

static CONTRACT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static COMMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_contract_id() -> ContractId {
    let id = CONTRACT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ContractId(format!("ctr-{id:06}"))
}

fn next_commission_id() -> CommissionId {
    let id = COMMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CommissionId(format!("com-{id:06}"))
}

/// Drives the lease signing state machine and its completion side effect.
pub struct ContractService<S> {
    store: Arc<S>,
}

impl<S> ContractService<S>
where
    S: ContractStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_draft(&self, new: NewContract) -> Result<Contract, ContractError> {
        let property_id = new.property_id.clone();
        let contract = Contract::draft(next_contract_id(), new)?;
        let stored = self
            .store
            .insert_contract(contract)
            .map_err(|err| match err {
                RepositoryError::NotFound => ContractError::PropertyNotFound(property_id),
                other => ContractError::Repository(other),
            })?;
        info!(contract = %stored.id, property = %stored.property_id, "contract drafted");
        Ok(stored)
    }

    pub fn dispatch(&self, id: &ContractId, envelope_id: String) -> Result<Contract, ContractError> {
        self.apply_event(id, ContractEvent::Dispatched { envelope_id })
    }

    pub fn record_signature(
        &self,
        id: &ContractId,
        party: SigningParty,
        signed_at: DateTime<Utc>,
    ) -> Result<Contract, ContractError> {
        self.apply_event(id, ContractEvent::PartySigned { party, signed_at })
    }

    pub fn expire(&self, id: &ContractId) -> Result<Contract, ContractError> {
        self.apply_event(id, ContractEvent::DeadlineElapsed)
    }

    /// Apply a lifecycle event. A failed completion commit leaves the stored
    /// contract untouched, so the caller may retry the same event safely.
    pub fn apply_event(
        &self,
        id: &ContractId,
        event: ContractEvent,
    ) -> Result<Contract, ContractError> {
        let mut contract = self.get(id)?;
        let event_name = event.name();
        let effect = contract.apply(event)?;
        match effect {
            TransitionEffect::None => self.store.update_contract(contract.clone())?,
            TransitionEffect::PropertyLeased(claim) => {
                self.store.commit_completion(contract.clone(), claim)?;
            }
        }
        info!(
            contract = %contract.id,
            status = contract.status.label(),
            event = event_name,
            "contract transitioned"
        );
        Ok(contract)
    }

    pub fn get(&self, id: &ContractId) -> Result<Contract, ContractError> {
        self.store
            .fetch_contract(id)?
            .ok_or_else(|| ContractError::ContractNotFound(id.clone()))
    }
}

/// Error raised by the contract service.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error(transparent)]
    Validation(#[from] ContractValidation),
    #[error(transparent)]
    StateConflict(#[from] TransitionError),
    #[error("contract {0} not found")]
    ContractNotFound(ContractId),
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Maintains agent payouts keyed by `(contract, agent)`.
pub struct CommissionService<S> {
    store: Arc<S>,
}

impl<S> CommissionService<S>
where
    S: CommissionStore + ContractStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create or update the commission for `(terms.contract_id,
    /// terms.agent_id)`. The stored amount is recomputed from the terms on
    /// both paths; a caller-supplied amount never survives.
    pub fn upsert(&self, terms: CommissionTerms) -> Result<CommissionRecord, CommissionError> {
        if self.store.fetch_contract(&terms.contract_id)?.is_none() {
            return Err(CommissionError::ContractNotFound(terms.contract_id));
        }

        let existing = self
            .store
            .find_commission(&terms.contract_id, &terms.agent_id)?;
        let record = match existing {
            Some(mut record) => {
                record.apply_terms(terms)?;
                self.store.update_commission(record.clone())?;
                record
            }
            None => {
                let record = CommissionRecord::from_terms(next_commission_id(), terms)?;
                self.store.insert_commission(record)?
            }
        };
        info!(
            commission = %record.id,
            contract = %record.contract_id,
            amount = %record.commission_amount,
            "commission recorded"
        );
        Ok(record)
    }

    pub fn advance(
        &self,
        id: &CommissionId,
        to: CommissionStatus,
        at: DateTime<Utc>,
        transfer_reference: Option<String>,
    ) -> Result<CommissionRecord, CommissionError> {
        let mut record = self.get(id)?;
        record.advance(to, at, transfer_reference)?;
        self.store.update_commission(record.clone())?;
        info!(commission = %record.id, status = record.status.label(), "commission updated");
        Ok(record)
    }

    pub fn get(&self, id: &CommissionId) -> Result<CommissionRecord, CommissionError> {
        self.store
            .fetch_commission(id)?
            .ok_or_else(|| CommissionError::CommissionNotFound(id.clone()))
    }

    pub fn for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<CommissionRecord>, CommissionError> {
        Ok(self.store.commissions_for_contract(contract_id)?)
    }
}

/// Error raised by the commission service.
#[derive(Debug, thiserror::Error)]
pub enum CommissionError {
    #[error(transparent)]
    Validation(#[from] CommissionValidation),
    #[error(transparent)]
    StateConflict(#[from] CommissionConflict),
    #[error("commission {0} not found")]
    CommissionNotFound(CommissionId),
    #[error("contract {0} not found")]
    ContractNotFound(ContractId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
