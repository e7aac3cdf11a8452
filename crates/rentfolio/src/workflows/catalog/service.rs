use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::availability::{AvailabilityRecord, AvailabilityWindow, WindowError};
use super::domain::{
    LongTermTerms, NewProperty, PricingError, Property, PropertyType, ShortTermTerms,
};
use super::repository::CatalogStore;
use crate::store::RepositoryError;
use crate::workflows::ids::PropertyId;

/// Service owning listing setup and the availability ledger boundary.
pub struct CatalogService<S> {
    store: Arc<S>,
}

static PROPERTY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_property_id() -> PropertyId {
    let id = PROPERTY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PropertyId(format!("prop-{id:06}"))
}

impl<S> CatalogService<S>
where
    S: CatalogStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List a property, installing standard terms for its rental type.
    pub fn list_property(&self, new: NewProperty) -> Result<Property, CatalogError> {
        let property = Property::from_new(next_property_id(), new)?;
        let stored = self.store.insert_property(property)?;
        match stored.property_type {
            PropertyType::ShortTerm => self
                .store
                .put_short_term_terms(ShortTermTerms::standard(stored.id.clone()))?,
            PropertyType::LongTerm => self
                .store
                .put_long_term_terms(LongTermTerms::standard(stored.id.clone()))?,
        }
        info!(property = %stored.id, kind = stored.property_type.label(), "property listed");
        Ok(stored)
    }

    pub fn get(&self, id: &PropertyId) -> Result<Property, CatalogError> {
        self.store
            .fetch_property(id)?
            .ok_or_else(|| CatalogError::PropertyNotFound(id.clone()))
    }

    /// Replace the listing details, re-checking the pricing invariant.
    /// The active flag survives the update; use `deactivate` to flip it.
    pub fn update(&self, id: &PropertyId, new: NewProperty) -> Result<Property, CatalogError> {
        let existing = self.get(id)?;
        let mut property = Property::from_new(id.clone(), new)?;
        property.is_active = existing.is_active;
        self.store.update_property(property.clone())?;
        info!(property = %property.id, "property updated");
        Ok(property)
    }

    /// Inactive listings accept no new intake but keep their history.
    pub fn deactivate(&self, id: &PropertyId) -> Result<Property, CatalogError> {
        let mut property = self.get(id)?;
        property.is_active = false;
        self.store.update_property(property.clone())?;
        info!(property = %property.id, "property deactivated");
        Ok(property)
    }

    /// Delete the property and everything that hangs off it.
    pub fn remove(&self, id: &PropertyId) -> Result<(), CatalogError> {
        self.get(id)?;
        self.store.remove_property(id)?;
        info!(property = %id, "property removed with dependents");
        Ok(())
    }

    pub fn set_short_term_terms(&self, terms: ShortTermTerms) -> Result<(), CatalogError> {
        let property = self.get(&terms.property_id)?;
        if property.property_type != PropertyType::ShortTerm {
            return Err(CatalogError::TermsMismatch {
                property_type: property.property_type,
            });
        }
        Ok(self.store.put_short_term_terms(terms)?)
    }

    pub fn set_long_term_terms(&self, terms: LongTermTerms) -> Result<(), CatalogError> {
        let property = self.get(&terms.property_id)?;
        if property.property_type != PropertyType::LongTerm {
            return Err(CatalogError::TermsMismatch {
                property_type: property.property_type,
            });
        }
        Ok(self.store.put_long_term_terms(terms)?)
    }

    /// Record or overwrite one availability window, keyed by
    /// `(property, available_from)`.
    pub fn record_availability(
        &self,
        window: AvailabilityWindow,
    ) -> Result<AvailabilityRecord, CatalogError> {
        window.validate()?;
        self.get(&window.property_id)?;
        let record = self.store.upsert_availability(window)?;
        info!(
            property = %record.property_id,
            from = %record.available_from,
            available = record.is_available,
            "availability window recorded"
        );
        Ok(record)
    }

    pub fn is_available(&self, id: &PropertyId, date: NaiveDate) -> Result<bool, CatalogError> {
        self.get(id)?;
        Ok(self.store.is_available(id, date)?)
    }

    pub fn availability(&self, id: &PropertyId) -> Result<Vec<AvailabilityRecord>, CatalogError> {
        self.get(id)?;
        Ok(self.store.availability_for(id)?)
    }
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),
    #[error("terms do not match a {property_type} property")]
    TermsMismatch { property_type: PropertyType },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
