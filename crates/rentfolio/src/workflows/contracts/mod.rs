//! Lease contract lifecycle and the agent commission ledger.
//!
//! Completion is the one transition with a side effect: the contract row and
//! the leased availability window are committed as a single unit of work, and
//! the commission amount is always derived from `base_amount ×
//! commission_rate` rather than trusted from the caller.

pub mod commission;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use commission::{
    CommissionConflict, CommissionRecord, CommissionStatus, CommissionTerms, CommissionValidation,
};
pub use domain::{
    Contract, ContractEvent, ContractStatus, ContractValidation, NewContract, SigningParty,
    TransitionEffect, TransitionError,
};
pub use repository::{CommissionStore, ContractStore};
pub use router::{commission_router, contract_router};
pub use service::{CommissionError, CommissionService, ContractError, ContractService};
