use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::RepositoryError;
use crate::workflows::catalog::{
    AvailabilityLedger, AvailabilityRecord, AvailabilityWindow, CatalogStore, LongTermTerms,
    Property, ShortTermTerms,
};
use crate::workflows::contracts::{
    CommissionRecord, CommissionStore, Contract, ContractStore,
};
use crate::workflows::ids::{
    ApplicationId, BookingId, CommissionId, ContractId, PropertyId, UserId, ViewingId,
};
use crate::workflows::intake::{
    ApplicationStore, BookingRequest, BookingStore, RentalApplication,
};
use crate::workflows::viewings::{ViewingSchedule, ViewingStore};

#[derive(Default)]
struct MarketplaceState {
    properties: HashMap<PropertyId, Property>,
    short_term_terms: HashMap<PropertyId, ShortTermTerms>,
    long_term_terms: HashMap<PropertyId, LongTermTerms>,
    availability: AvailabilityLedger,
    bookings: HashMap<BookingId, BookingRequest>,
    applications: HashMap<ApplicationId, RentalApplication>,
    viewings: HashMap<ViewingId, ViewingSchedule>,
    contracts: HashMap<ContractId, Contract>,
    commissions: HashMap<CommissionId, CommissionRecord>,
}

impl MarketplaceState {
    fn require_property(&self, id: &PropertyId) -> Result<(), RepositoryError> {
        if self.properties.contains_key(id) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn require_contract(&self, id: &ContractId) -> Result<(), RepositoryError> {
        if self.contracts.contains_key(id) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}

/// In-memory backing store shared by every workflow. All tables live behind
/// one mutex, so a multi-table write such as contract completion is atomic
/// with respect to every reader.
#[derive(Default)]
pub struct MemoryMarketplace {
    state: Mutex<MarketplaceState>,
}

impl MemoryMarketplace {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MarketplaceState> {
        self.state.lock().expect("marketplace mutex poisoned")
    }
}

impl CatalogStore for MemoryMarketplace {
    fn insert_property(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut state = self.lock();
        if state.properties.contains_key(&property.id) {
            return Err(RepositoryError::Conflict);
        }
        state.properties.insert(property.id.clone(), property.clone());
        Ok(property)
    }

    fn update_property(&self, property: Property) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        state.require_property(&property.id)?;
        state.properties.insert(property.id.clone(), property);
        Ok(())
    }

    fn fetch_property(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        Ok(self.lock().properties.get(id).cloned())
    }

    fn remove_property(&self, id: &PropertyId) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if state.properties.remove(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.short_term_terms.remove(id);
        state.long_term_terms.remove(id);
        state.availability.remove_property(id);
        state.bookings.retain(|_, booking| &booking.property_id != id);
        state
            .applications
            .retain(|_, application| &application.property_id != id);
        state.viewings.retain(|_, viewing| &viewing.property_id != id);

        let removed: Vec<ContractId> = state
            .contracts
            .values()
            .filter(|contract| &contract.property_id == id)
            .map(|contract| contract.id.clone())
            .collect();
        state
            .contracts
            .retain(|_, contract| &contract.property_id != id);
        state
            .commissions
            .retain(|_, record| !removed.contains(&record.contract_id));
        Ok(())
    }

    fn put_short_term_terms(&self, terms: ShortTermTerms) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        state.require_property(&terms.property_id)?;
        state.short_term_terms.insert(terms.property_id.clone(), terms);
        Ok(())
    }

    fn short_term_terms(
        &self,
        id: &PropertyId,
    ) -> Result<Option<ShortTermTerms>, RepositoryError> {
        Ok(self.lock().short_term_terms.get(id).cloned())
    }

    fn put_long_term_terms(&self, terms: LongTermTerms) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        state.require_property(&terms.property_id)?;
        state.long_term_terms.insert(terms.property_id.clone(), terms);
        Ok(())
    }

    fn long_term_terms(&self, id: &PropertyId) -> Result<Option<LongTermTerms>, RepositoryError> {
        Ok(self.lock().long_term_terms.get(id).cloned())
    }

    fn upsert_availability(
        &self,
        window: AvailabilityWindow,
    ) -> Result<AvailabilityRecord, RepositoryError> {
        let mut state = self.lock();
        state.require_property(&window.property_id)?;
        state
            .availability
            .upsert(window)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))
    }

    fn availability_for(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<AvailabilityRecord>, RepositoryError> {
        Ok(self.lock().availability.snapshot_for(id))
    }

    fn is_available(&self, id: &PropertyId, date: NaiveDate) -> Result<bool, RepositoryError> {
        Ok(self.lock().availability.is_available(id, date))
    }
}

impl BookingStore for MemoryMarketplace {
    fn insert_booking(&self, booking: BookingRequest) -> Result<BookingRequest, RepositoryError> {
        let mut state = self.lock();
        state.require_property(&booking.property_id)?;
        if state.bookings.contains_key(&booking.id) {
            return Err(RepositoryError::Conflict);
        }
        state.bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    fn update_booking(&self, booking: BookingRequest) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if !state.bookings.contains_key(&booking.id) {
            return Err(RepositoryError::NotFound);
        }
        state.bookings.insert(booking.id.clone(), booking);
        Ok(())
    }

    fn fetch_booking(&self, id: &BookingId) -> Result<Option<BookingRequest>, RepositoryError> {
        Ok(self.lock().bookings.get(id).cloned())
    }

    fn bookings_for_property(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<BookingRequest>, RepositoryError> {
        Ok(self
            .lock()
            .bookings
            .values()
            .filter(|booking| &booking.property_id == id)
            .cloned()
            .collect())
    }
}

impl ApplicationStore for MemoryMarketplace {
    fn insert_application(
        &self,
        application: RentalApplication,
    ) -> Result<RentalApplication, RepositoryError> {
        let mut state = self.lock();
        state.require_property(&application.property_id)?;
        if state.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        state
            .applications
            .insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update_application(&self, application: RentalApplication) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if !state.applications.contains_key(&application.id) {
            return Err(RepositoryError::NotFound);
        }
        state.applications.insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<RentalApplication>, RepositoryError> {
        Ok(self.lock().applications.get(id).cloned())
    }

    fn applications_for_property(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<RentalApplication>, RepositoryError> {
        Ok(self
            .lock()
            .applications
            .values()
            .filter(|application| &application.property_id == id)
            .cloned()
            .collect())
    }
}

impl ViewingStore for MemoryMarketplace {
    fn insert_viewing(&self, viewing: ViewingSchedule) -> Result<ViewingSchedule, RepositoryError> {
        let mut state = self.lock();
        state.require_property(&viewing.property_id)?;
        if state.viewings.contains_key(&viewing.id) {
            return Err(RepositoryError::Conflict);
        }
        state.viewings.insert(viewing.id.clone(), viewing.clone());
        Ok(viewing)
    }

    fn update_viewing(&self, viewing: ViewingSchedule) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if !state.viewings.contains_key(&viewing.id) {
            return Err(RepositoryError::NotFound);
        }
        state.viewings.insert(viewing.id.clone(), viewing);
        Ok(())
    }

    fn fetch_viewing(&self, id: &ViewingId) -> Result<Option<ViewingSchedule>, RepositoryError> {
        Ok(self.lock().viewings.get(id).cloned())
    }

    fn viewings_for_property(
        &self,
        id: &PropertyId,
    ) -> Result<Vec<ViewingSchedule>, RepositoryError> {
        Ok(self
            .lock()
            .viewings
            .values()
            .filter(|viewing| &viewing.property_id == id)
            .cloned()
            .collect())
    }
}

impl ContractStore for MemoryMarketplace {
    fn insert_contract(&self, contract: Contract) -> Result<Contract, RepositoryError> {
        let mut state = self.lock();
        state.require_property(&contract.property_id)?;
        if state.contracts.contains_key(&contract.id) {
            return Err(RepositoryError::Conflict);
        }
        state.contracts.insert(contract.id.clone(), contract.clone());
        Ok(contract)
    }

    fn update_contract(&self, contract: Contract) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        state.require_contract(&contract.id)?;
        state.contracts.insert(contract.id.clone(), contract);
        Ok(())
    }

    fn fetch_contract(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError> {
        Ok(self.lock().contracts.get(id).cloned())
    }

    // Availability lands before the contract row; if the upsert fails the
    // old contract state stays visible and the commit can be retried.
    fn commit_completion(
        &self,
        contract: Contract,
        claim: AvailabilityWindow,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        state.require_contract(&contract.id)?;
        state.require_property(&claim.property_id)?;
        state
            .availability
            .upsert(claim)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        state.contracts.insert(contract.id.clone(), contract);
        Ok(())
    }
}

impl CommissionStore for MemoryMarketplace {
    fn insert_commission(
        &self,
        record: CommissionRecord,
    ) -> Result<CommissionRecord, RepositoryError> {
        let mut state = self.lock();
        state.require_contract(&record.contract_id)?;
        if state.commissions.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        state.commissions.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update_commission(&self, record: CommissionRecord) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if !state.commissions.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        state.commissions.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch_commission(
        &self,
        id: &CommissionId,
    ) -> Result<Option<CommissionRecord>, RepositoryError> {
        Ok(self.lock().commissions.get(id).cloned())
    }

    fn find_commission(
        &self,
        contract_id: &ContractId,
        agent_id: &UserId,
    ) -> Result<Option<CommissionRecord>, RepositoryError> {
        Ok(self
            .lock()
            .commissions
            .values()
            .find(|record| &record.contract_id == contract_id && &record.agent_id == agent_id)
            .cloned())
    }

    fn commissions_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<CommissionRecord>, RepositoryError> {
        Ok(self
            .lock()
            .commissions
            .values()
            .filter(|record| &record.contract_id == contract_id)
            .cloned()
            .collect())
    }
}
