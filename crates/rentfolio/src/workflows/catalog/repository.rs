use chrono::NaiveDate;

use super::availability::{AvailabilityRecord, AvailabilityWindow};
use super::domain::{LongTermTerms, Property, ShortTermTerms};
use crate::store::RepositoryError;
use crate::workflows::ids::PropertyId;

/// Storage abstraction for listings, their terms, and the availability
/// ledger. Windows passed to `upsert_availability` are validated by the
/// caller.
pub trait CatalogStore: Send + Sync {
    fn insert_property(&self, property: Property) -> Result<Property, RepositoryError>;
    fn update_property(&self, property: Property) -> Result<(), RepositoryError>;
    fn fetch_property(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;
    /// Remove a property and cascade to its terms, availability windows,
    /// bookings, applications, viewings, contracts, and commissions.
    fn remove_property(&self, id: &PropertyId) -> Result<(), RepositoryError>;

    fn put_short_term_terms(&self, terms: ShortTermTerms) -> Result<(), RepositoryError>;
    fn short_term_terms(&self, id: &PropertyId)
        -> Result<Option<ShortTermTerms>, RepositoryError>;
    fn put_long_term_terms(&self, terms: LongTermTerms) -> Result<(), RepositoryError>;
    fn long_term_terms(&self, id: &PropertyId) -> Result<Option<LongTermTerms>, RepositoryError>;

    fn upsert_availability(
        &self,
        window: AvailabilityWindow,
    ) -> Result<AvailabilityRecord, RepositoryError>;
    fn availability_for(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<AvailabilityRecord>, RepositoryError>;
    fn is_available(&self, id: &PropertyId, date: NaiveDate) -> Result<bool, RepositoryError>;
}
