use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rentfolio::store::MemoryMarketplace;
use rentfolio::workflows::catalog::CatalogService;
use rentfolio::workflows::contracts::{CommissionService, ContractService};
use rentfolio::workflows::intake::IntakeService;
use rentfolio::workflows::viewings::ViewingScheduler;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// All workflow services wired over one shared marketplace store.
pub(crate) struct Services {
    pub(crate) catalog: CatalogService<MemoryMarketplace>,
    pub(crate) intake: IntakeService<MemoryMarketplace>,
    pub(crate) viewings: ViewingScheduler<MemoryMarketplace>,
    pub(crate) contracts: Arc<ContractService<MemoryMarketplace>>,
    pub(crate) commissions: Arc<CommissionService<MemoryMarketplace>>,
}

impl Services {
    pub(crate) fn in_memory() -> Self {
        let store = Arc::new(MemoryMarketplace::new());
        Self {
            catalog: CatalogService::new(store.clone()),
            intake: IntakeService::new(store.clone()),
            viewings: ViewingScheduler::new(store.clone()),
            contracts: Arc::new(ContractService::new(store.clone())),
            commissions: Arc::new(CommissionService::new(store)),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
