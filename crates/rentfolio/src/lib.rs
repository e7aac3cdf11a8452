//! Core leasing workflows for the rentfolio rental marketplace.
//!
//! The crate owns the property catalog, the availability ledger, booking and
//! application intake, viewing scheduling, the contract signature lifecycle,
//! and the commission ledger derived from completed contracts. Persistence
//! goes through per-workflow store traits; [`store::MemoryMarketplace`] is the
//! reference implementation used by the API shell and the test suites.

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
