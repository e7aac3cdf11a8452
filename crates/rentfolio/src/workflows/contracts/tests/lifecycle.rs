use std::sync::Arc;

use chrono::NaiveDate;

use super::common::*;
use crate::store::RepositoryError;
use crate::workflows::catalog::{CatalogStore, LEASED_REASON};
use crate::workflows::contracts::{
    ContractError, ContractService, ContractStatus, SigningParty,
};
use crate::workflows::ids::PropertyId;

#[test]
fn completed_contract_blocks_the_lease_window() {
    let store = marketplace_with_listing("prop-1");
    let service = ContractService::new(store.clone());

    let contract = service
        .create_draft(new_contract("prop-1"))
        .expect("draft created");
    service
        .dispatch(&contract.id, "env-42".to_string())
        .expect("dispatched");
    service
        .record_signature(&contract.id, SigningParty::Tenant, signed_at(10))
        .expect("tenant signs");
    let completed = service
        .record_signature(&contract.id, SigningParty::Landlord, signed_at(12))
        .expect("landlord signs");

    assert_eq!(completed.status, ContractStatus::Completed);
    assert_eq!(completed.fully_executed_at, Some(signed_at(12)));

    let property_id = PropertyId("prop-1".to_string());
    let mid_lease = NaiveDate::from_ymd_opt(2026, 9, 15).unwrap();
    assert!(!store.is_available(&property_id, mid_lease).expect("query"));

    let windows = store.availability_for(&property_id).expect("snapshot");
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].available_from, lease_start());
    assert_eq!(windows[0].available_to, Some(lease_end()));
    assert_eq!(windows[0].reason.as_deref(), Some(LEASED_REASON));
}

#[test]
fn failed_completion_commit_rolls_back_and_retries_cleanly() {
    let store = Arc::new(FlakyStore::failing(1));
    store
        .inner
        .insert_property(long_term_listing("prop-1"))
        .expect("seed listing");
    let service = ContractService::new(store.clone());

    let contract = service
        .create_draft(new_contract("prop-1"))
        .expect("draft created");
    service
        .dispatch(&contract.id, "env-42".to_string())
        .expect("dispatched");
    service
        .record_signature(&contract.id, SigningParty::Tenant, signed_at(10))
        .expect("tenant signs");

    let err = service
        .record_signature(&contract.id, SigningParty::Landlord, signed_at(12))
        .expect_err("commit fails");
    assert!(matches!(
        err,
        ContractError::Repository(RepositoryError::Unavailable(_))
    ));

    // Nothing from the failed attempt is visible.
    let stored = service.get(&contract.id).expect("still fetchable");
    assert_eq!(stored.status, ContractStatus::PartiallySigned);
    assert!(stored.landlord_signed_at.is_none());
    assert!(stored.fully_executed_at.is_none());
    let property_id = PropertyId("prop-1".to_string());
    assert!(store
        .inner
        .availability_for(&property_id)
        .expect("snapshot")
        .is_empty());

    // The same event retried lands exactly once.
    let completed = service
        .record_signature(&contract.id, SigningParty::Landlord, signed_at(12))
        .expect("retry succeeds");
    assert_eq!(completed.status, ContractStatus::Completed);
    assert_eq!(
        store
            .inner
            .availability_for(&property_id)
            .expect("snapshot")
            .len(),
        1
    );
}

#[test]
fn drafting_against_a_missing_property_is_not_found() {
    let store = marketplace_with_listing("prop-1");
    let service = ContractService::new(store);

    let err = service
        .create_draft(new_contract("prop-999"))
        .expect_err("missing property");
    assert!(matches!(err, ContractError::PropertyNotFound(_)));
}

#[test]
fn expiry_halts_a_partially_signed_contract() {
    let store = marketplace_with_listing("prop-1");
    let service = ContractService::new(store.clone());

    let contract = service
        .create_draft(new_contract("prop-1"))
        .expect("draft created");
    service
        .dispatch(&contract.id, "env-42".to_string())
        .expect("dispatched");
    service
        .record_signature(&contract.id, SigningParty::Tenant, signed_at(10))
        .expect("tenant signs");

    let expired = service.expire(&contract.id).expect("expired");
    assert_eq!(expired.status, ContractStatus::Expired);

    let err = service
        .record_signature(&contract.id, SigningParty::Landlord, signed_at(12))
        .expect_err("no signatures after expiry");
    assert!(matches!(err, ContractError::StateConflict(_)));

    // Expiry never touches availability.
    let property_id = PropertyId("prop-1".to_string());
    assert!(store
        .availability_for(&property_id)
        .expect("snapshot")
        .is_empty());
}

#[test]
fn repeated_completion_claims_converge_on_one_window() {
    let store = marketplace_with_listing("prop-1");

    // Two contracts over the same lease window, completed one after the
    // other: the (property, available_from) key deduplicates the claims.
    let service = ContractService::new(store.clone());
    for _ in 0..2 {
        let contract = service
            .create_draft(new_contract("prop-1"))
            .expect("draft created");
        service
            .dispatch(&contract.id, "env-42".to_string())
            .expect("dispatched");
        service
            .record_signature(&contract.id, SigningParty::Tenant, signed_at(10))
            .expect("tenant signs");
        service
            .record_signature(&contract.id, SigningParty::Landlord, signed_at(12))
            .expect("landlord signs");
    }

    let property_id = PropertyId("prop-1".to_string());
    assert_eq!(
        store
            .availability_for(&property_id)
            .expect("snapshot")
            .len(),
        1
    );
}
