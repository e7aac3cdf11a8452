use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::store::{MemoryMarketplace, RepositoryError};
use crate::workflows::catalog::{
    AvailabilityWindow, CatalogStore, NewProperty, Property, PropertyAddress, PropertyType,
};
use crate::workflows::contracts::domain::{Contract, NewContract};
use crate::workflows::contracts::repository::ContractStore;
use crate::workflows::ids::{ContractId, PropertyId, UserId};

pub(super) fn lease_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date")
}

pub(super) fn lease_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 3, 31).expect("valid date")
}

pub(super) fn signed_at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, day, 12, 0, 0).unwrap()
}

pub(super) fn long_term_listing(id: &str) -> Property {
    Property::from_new(
        PropertyId(id.to_string()),
        NewProperty {
            account_id: UserId("acct-1".to_string()),
            title: "Court Avenue Loft".to_string(),
            description: None,
            property_type: PropertyType::LongTerm,
            address: PropertyAddress {
                street: "118 Court Ave".to_string(),
                city: "Des Moines".to_string(),
                state: "IA".to_string(),
                country: "US".to_string(),
                postal_code: "50309".to_string(),
            },
            price_per_night: None,
            price_per_month: Some(dec!(1650.00)),
            bedrooms: Some(2),
            square_feet: None,
            amenities: Vec::new(),
            listing_agent_id: Some(UserId("agent-1".to_string())),
        },
    )
    .expect("valid listing")
}

pub(super) fn new_contract(property_id: &str) -> NewContract {
    serde_json::from_value(serde_json::json!({
        "property_id": property_id,
        "tenant_id": "tenant-1",
        "landlord_id": "landlord-1",
        "monthly_rent": "1650.00",
        "security_deposit": "3300.00",
        "lease_start_date": lease_start(),
        "lease_end_date": lease_end(),
        "lease_term_months": 12,
    }))
    .expect("valid contract payload")
}

pub(super) fn marketplace_with_listing(property_id: &str) -> Arc<MemoryMarketplace> {
    let store = Arc::new(MemoryMarketplace::new());
    store
        .insert_property(long_term_listing(property_id))
        .expect("seed listing");
    store
}

/// Fails the next `failures` completion commits, then behaves normally.
/// Everything else delegates to the wrapped marketplace.
pub(super) struct FlakyStore {
    pub(super) inner: MemoryMarketplace,
    remaining_failures: AtomicUsize,
}

impl FlakyStore {
    pub(super) fn failing(failures: usize) -> Self {
        Self {
            inner: MemoryMarketplace::new(),
            remaining_failures: AtomicUsize::new(failures),
        }
    }
}

impl ContractStore for FlakyStore {
    fn insert_contract(&self, contract: Contract) -> Result<Contract, RepositoryError> {
        self.inner.insert_contract(contract)
    }

    fn update_contract(&self, contract: Contract) -> Result<(), RepositoryError> {
        self.inner.update_contract(contract)
    }

    fn fetch_contract(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError> {
        self.inner.fetch_contract(id)
    }

    fn commit_completion(
        &self,
        contract: Contract,
        claim: AvailabilityWindow,
    ) -> Result<(), RepositoryError> {
        if self.remaining_failures.load(Ordering::SeqCst) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::SeqCst);
            return Err(RepositoryError::Unavailable(
                "simulated commit failure".to_string(),
            ));
        }
        self.inner.commit_completion(contract, claim)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
