//! Workflow modules, one per leasing concern.

pub mod catalog;
pub mod contracts;
pub mod ids;
pub mod intake;
pub mod viewings;
