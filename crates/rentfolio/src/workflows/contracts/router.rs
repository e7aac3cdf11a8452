use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::commission::{CommissionStatus, CommissionTerms};
use super::domain::{NewContract, SigningParty};
use super::repository::{CommissionStore, ContractStore};
use super::service::{CommissionError, CommissionService, ContractError, ContractService};
use crate::store::RepositoryError;
use crate::workflows::ids::{CommissionId, ContractId, UserId};

/// Router builder exposing the lease signing endpoints.
pub fn contract_router<S>(service: Arc<ContractService<S>>) -> Router
where
    S: ContractStore + 'static,
{
    Router::new()
        .route("/api/v1/contracts", post(create_handler::<S>))
        .route("/api/v1/contracts/:contract_id", get(get_handler::<S>))
        .route(
            "/api/v1/contracts/:contract_id/dispatch",
            post(dispatch_handler::<S>),
        )
        .route(
            "/api/v1/contracts/:contract_id/signatures",
            post(signature_handler::<S>),
        )
        .route(
            "/api/v1/contracts/:contract_id/expire",
            post(expire_handler::<S>),
        )
        .with_state(service)
}

/// Router builder exposing the commission ledger endpoints.
pub fn commission_router<S>(service: Arc<CommissionService<S>>) -> Router
where
    S: CommissionStore + ContractStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/contracts/:contract_id/commission",
            put(upsert_commission_handler::<S>),
        )
        .route(
            "/api/v1/contracts/:contract_id/commissions",
            get(list_commissions_handler::<S>),
        )
        .route(
            "/api/v1/commissions/:commission_id/status",
            post(commission_status_handler::<S>),
        )
        .with_state(service)
}

fn contract_error(error: ContractError) -> Response {
    let status = match &error {
        ContractError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ContractError::StateConflict(_) => StatusCode::CONFLICT,
        ContractError::ContractNotFound(_) | ContractError::PropertyNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ContractError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ContractError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ContractError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn commission_error(error: CommissionError) -> Response {
    let status = match &error {
        CommissionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CommissionError::StateConflict(_) => StatusCode::CONFLICT,
        CommissionError::CommissionNotFound(_) | CommissionError::ContractNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        CommissionError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CommissionError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CommissionError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<ContractService<S>>>,
    axum::Json(new): axum::Json<NewContract>,
) -> Response
where
    S: ContractStore + 'static,
{
    match service.create_draft(new) {
        Ok(contract) => (StatusCode::CREATED, axum::Json(contract)).into_response(),
        Err(error) => contract_error(error),
    }
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<ContractService<S>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    S: ContractStore + 'static,
{
    match service.get(&ContractId(contract_id)) {
        Ok(contract) => (StatusCode::OK, axum::Json(contract)).into_response(),
        Err(error) => contract_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct DispatchBody {
    envelope_id: String,
}

pub(crate) async fn dispatch_handler<S>(
    State(service): State<Arc<ContractService<S>>>,
    Path(contract_id): Path<String>,
    axum::Json(body): axum::Json<DispatchBody>,
) -> Response
where
    S: ContractStore + 'static,
{
    match service.dispatch(&ContractId(contract_id), body.envelope_id) {
        Ok(contract) => (StatusCode::OK, axum::Json(contract)).into_response(),
        Err(error) => contract_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct SignatureBody {
    party: SigningParty,
    signed_at: DateTime<Utc>,
}

pub(crate) async fn signature_handler<S>(
    State(service): State<Arc<ContractService<S>>>,
    Path(contract_id): Path<String>,
    axum::Json(body): axum::Json<SignatureBody>,
) -> Response
where
    S: ContractStore + 'static,
{
    match service.record_signature(&ContractId(contract_id), body.party, body.signed_at) {
        Ok(contract) => (StatusCode::OK, axum::Json(contract)).into_response(),
        Err(error) => contract_error(error),
    }
}

pub(crate) async fn expire_handler<S>(
    State(service): State<Arc<ContractService<S>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    S: ContractStore + 'static,
{
    match service.expire(&ContractId(contract_id)) {
        Ok(contract) => (StatusCode::OK, axum::Json(contract)).into_response(),
        Err(error) => contract_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct CommissionBody {
    agent_id: UserId,
    #[serde(default)]
    commission_type: Option<String>,
    commission_rate: Decimal,
    base_amount: Decimal,
    #[serde(default)]
    due_date: Option<chrono::NaiveDate>,
}

pub(crate) async fn upsert_commission_handler<S>(
    State(service): State<Arc<CommissionService<S>>>,
    Path(contract_id): Path<String>,
    axum::Json(body): axum::Json<CommissionBody>,
) -> Response
where
    S: CommissionStore + ContractStore + 'static,
{
    let terms = CommissionTerms {
        contract_id: ContractId(contract_id),
        agent_id: body.agent_id,
        commission_type: body
            .commission_type
            .unwrap_or_else(|| "listing".to_string()),
        commission_rate: body.commission_rate,
        base_amount: body.base_amount,
        due_date: body.due_date,
    };
    match service.upsert(terms) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => commission_error(error),
    }
}

pub(crate) async fn list_commissions_handler<S>(
    State(service): State<Arc<CommissionService<S>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    S: CommissionStore + ContractStore + 'static,
{
    match service.for_contract(&ContractId(contract_id)) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => commission_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct CommissionStatusBody {
    status: CommissionStatus,
    at: DateTime<Utc>,
    #[serde(default)]
    transfer_reference: Option<String>,
}

pub(crate) async fn commission_status_handler<S>(
    State(service): State<Arc<CommissionService<S>>>,
    Path(commission_id): Path<String>,
    axum::Json(body): axum::Json<CommissionStatusBody>,
) -> Response
where
    S: CommissionStore + ContractStore + 'static,
{
    match service.advance(
        &CommissionId(commission_id),
        body.status,
        body.at,
        body.transfer_reference,
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => commission_error(error),
    }
}
