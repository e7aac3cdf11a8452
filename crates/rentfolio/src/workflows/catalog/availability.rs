use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::ids::PropertyId;

/// Reason recorded when contract completion blocks out the lease dates.
pub const LEASED_REASON: &str = "leased";

/// Inbound payload for a single availability interval. The end date is
/// optional; an open-ended window runs forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub property_id: PropertyId,
    pub available_from: NaiveDate,
    #[serde(default)]
    pub available_to: Option<NaiveDate>,
    pub is_available: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AvailabilityWindow {
    /// The window written when a contract reaches `completed`.
    pub fn leased(property_id: PropertyId, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            property_id,
            available_from: from,
            available_to: Some(to),
            is_available: false,
            reason: Some(LEASED_REASON.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), WindowError> {
        if let Some(to) = self.available_to {
            if to < self.available_from {
                return Err(WindowError::EndsBeforeStart {
                    from: self.available_from,
                    to,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("available_to {to} precedes available_from {from}")]
    EndsBeforeStart { from: NaiveDate, to: NaiveDate },
}

/// Stored interval plus the revision stamp used for last-write-wins reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub property_id: PropertyId,
    pub available_from: NaiveDate,
    pub available_to: Option<NaiveDate>,
    pub is_available: bool,
    pub reason: Option<String>,
    pub revision: u64,
}

impl AvailabilityRecord {
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.available_from && self.available_to.map_or(true, |to| date <= to)
    }
}

/// Interval set for every property, keyed by `(property, available_from)`.
///
/// Overlapping windows may coexist; readers resolve conflicts by taking the
/// window written most recently. Upserting an existing key overwrites the
/// stored values, so redelivered writes converge on a single row.
#[derive(Debug, Default, Clone)]
pub struct AvailabilityLedger {
    windows: BTreeMap<(PropertyId, NaiveDate), AvailabilityRecord>,
    revision: u64,
}

impl AvailabilityLedger {
    /// Insert or overwrite the window stored under
    /// `(property_id, available_from)`.
    pub fn upsert(&mut self, window: AvailabilityWindow) -> Result<AvailabilityRecord, WindowError> {
        window.validate()?;
        self.revision += 1;
        let record = AvailabilityRecord {
            property_id: window.property_id,
            available_from: window.available_from,
            available_to: window.available_to,
            is_available: window.is_available,
            reason: window.reason,
            revision: self.revision,
        };
        self.windows.insert(
            (record.property_id.clone(), record.available_from),
            record.clone(),
        );
        Ok(record)
    }

    /// Whether the property may be booked on `date`. The latest writer wins
    /// when windows overlap; absent coverage means bookable.
    pub fn is_available(&self, property_id: &PropertyId, date: NaiveDate) -> bool {
        self.windows_for(property_id)
            .filter(|record| record.covers(date))
            .max_by_key(|record| record.revision)
            .map_or(true, |record| record.is_available)
    }

    pub fn windows_for<'a>(
        &'a self,
        property_id: &'a PropertyId,
    ) -> impl Iterator<Item = &'a AvailabilityRecord> {
        self.windows
            .values()
            .filter(move |record| &record.property_id == property_id)
    }

    pub fn snapshot_for(&self, property_id: &PropertyId) -> Vec<AvailabilityRecord> {
        self.windows_for(property_id).cloned().collect()
    }

    pub fn remove_property(&mut self, property_id: &PropertyId) {
        self.windows
            .retain(|_, record| &record.property_id != property_id);
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
