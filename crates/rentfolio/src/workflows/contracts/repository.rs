use super::commission::CommissionRecord;
use super::domain::Contract;
use crate::store::RepositoryError;
use crate::workflows::catalog::AvailabilityWindow;
use crate::workflows::ids::{CommissionId, ContractId, UserId};

/// Storage abstraction for lease contracts.
///
/// `commit_completion` is the serialization point for the completion side
/// effect: the contract row and the leased availability window land together
/// or not at all. Implementations must key the availability write by
/// `(property, available_from)` so a retried commit converges instead of
/// duplicating rows.
pub trait ContractStore: Send + Sync {
    fn insert_contract(&self, contract: Contract) -> Result<Contract, RepositoryError>;
    fn update_contract(&self, contract: Contract) -> Result<(), RepositoryError>;
    fn fetch_contract(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError>;
    fn commit_completion(
        &self,
        contract: Contract,
        claim: AvailabilityWindow,
    ) -> Result<(), RepositoryError>;
}

/// Storage abstraction for agent commission records.
pub trait CommissionStore: Send + Sync {
    fn insert_commission(
        &self,
        record: CommissionRecord,
    ) -> Result<CommissionRecord, RepositoryError>;
    fn update_commission(&self, record: CommissionRecord) -> Result<(), RepositoryError>;
    fn fetch_commission(
        &self,
        id: &CommissionId,
    ) -> Result<Option<CommissionRecord>, RepositoryError>;
    fn find_commission(
        &self,
        contract_id: &ContractId,
        agent_id: &UserId,
    ) -> Result<Option<CommissionRecord>, RepositoryError>;
    fn commissions_for_contract(
        &self,
        contract_id: &ContractId,
    ) -> Result<Vec<CommissionRecord>, RepositoryError>;
}
