//! Property catalog: listing identity, type-specific terms, and the
//! availability ledger consumed by intake (reader) and contract completion
//! (writer).

pub mod availability;
pub mod domain;
pub mod repository;
pub mod service;

pub use availability::{
    AvailabilityLedger, AvailabilityRecord, AvailabilityWindow, WindowError, LEASED_REASON,
};
pub use domain::{
    LongTermTerms, NewProperty, PricingError, Property, PropertyAddress, PropertyType,
    ShortTermTerms,
};
pub use repository::CatalogStore;
pub use service::{CatalogError, CatalogService};
