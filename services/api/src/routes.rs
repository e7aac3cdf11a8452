use crate::infra::{AppState, Services};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use rentfolio::store::RepositoryError;
use rentfolio::workflows::catalog::{AvailabilityWindow, CatalogError, NewProperty};
use rentfolio::workflows::contracts::{commission_router, contract_router};
use rentfolio::workflows::ids::{ApplicationId, BookingId, PropertyId, UserId, ViewingId};
use rentfolio::workflows::intake::{
    ApplicationStatus, BookingStatus, IntakeError, NewApplication, NewBooking,
};
use rentfolio::workflows::viewings::{NewViewing, ViewingError};

/// Full application router: workflow endpoints plus the operational trio.
pub(crate) fn app_router(services: Arc<Services>) -> Router {
    Router::new()
        .route("/api/v1/properties", post(create_property))
        .route(
            "/api/v1/properties/:property_id",
            get(get_property).put(update_property).delete(remove_property),
        )
        .route(
            "/api/v1/properties/:property_id/deactivate",
            post(deactivate_property),
        )
        .route(
            "/api/v1/properties/:property_id/availability",
            put(record_availability).get(list_availability),
        )
        .route(
            "/api/v1/properties/:property_id/availability/:date",
            get(check_availability),
        )
        .route("/api/v1/bookings", post(create_booking))
        .route("/api/v1/bookings/:booking_id", get(get_booking))
        .route("/api/v1/bookings/:booking_id/status", post(booking_status))
        .route("/api/v1/applications", post(create_application))
        .route("/api/v1/applications/:application_id", get(get_application))
        .route(
            "/api/v1/applications/:application_id/status",
            post(application_status),
        )
        .route("/api/v1/viewings", post(create_viewing))
        .route("/api/v1/viewings/:viewing_id", get(get_viewing))
        .route(
            "/api/v1/viewings/:viewing_id/complete",
            post(complete_viewing),
        )
        .route("/api/v1/viewings/:viewing_id/cancel", post(cancel_viewing))
        .route(
            "/api/v1/viewings/:viewing_id/reschedule",
            post(reschedule_viewing),
        )
        .with_state(services.clone())
        .merge(contract_router(services.contracts.clone()))
        .merge(commission_router(services.commissions.clone()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn catalog_error(error: CatalogError) -> Response {
    let status = match &error {
        CatalogError::Pricing(_) | CatalogError::Window(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::PropertyNotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::TermsMismatch { .. } => StatusCode::CONFLICT,
        CatalogError::Repository(err) => repository_status(err),
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn intake_error(error: IntakeError) -> Response {
    let status = match &error {
        IntakeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IntakeError::StateConflict(_) => StatusCode::CONFLICT,
        IntakeError::BookingNotFound(_)
        | IntakeError::ApplicationNotFound(_)
        | IntakeError::PropertyNotFound(_) => StatusCode::NOT_FOUND,
        IntakeError::Repository(err) => repository_status(err),
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn viewing_error(error: ViewingError) -> Response {
    let status = match &error {
        ViewingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ViewingError::StateConflict(_) => StatusCode::CONFLICT,
        ViewingError::ViewingNotFound(_) | ViewingError::PropertyNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ViewingError::Repository(err) => repository_status(err),
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

pub(crate) async fn create_property(
    State(services): State<Arc<Services>>,
    Json(new): Json<NewProperty>,
) -> Response {
    match services.catalog.list_property(new) {
        Ok(property) => (StatusCode::CREATED, Json(property)).into_response(),
        Err(error) => catalog_error(error),
    }
}

pub(crate) async fn get_property(
    State(services): State<Arc<Services>>,
    Path(property_id): Path<String>,
) -> Response {
    match services.catalog.get(&PropertyId(property_id)) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => catalog_error(error),
    }
}

pub(crate) async fn update_property(
    State(services): State<Arc<Services>>,
    Path(property_id): Path<String>,
    Json(new): Json<NewProperty>,
) -> Response {
    match services.catalog.update(&PropertyId(property_id), new) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => catalog_error(error),
    }
}

pub(crate) async fn deactivate_property(
    State(services): State<Arc<Services>>,
    Path(property_id): Path<String>,
) -> Response {
    match services.catalog.deactivate(&PropertyId(property_id)) {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => catalog_error(error),
    }
}

pub(crate) async fn remove_property(
    State(services): State<Arc<Services>>,
    Path(property_id): Path<String>,
) -> Response {
    match services.catalog.remove(&PropertyId(property_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => catalog_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct AvailabilityBody {
    available_from: NaiveDate,
    #[serde(default)]
    available_to: Option<NaiveDate>,
    is_available: bool,
    #[serde(default)]
    reason: Option<String>,
}

pub(crate) async fn record_availability(
    State(services): State<Arc<Services>>,
    Path(property_id): Path<String>,
    Json(body): Json<AvailabilityBody>,
) -> Response {
    let window = AvailabilityWindow {
        property_id: PropertyId(property_id),
        available_from: body.available_from,
        available_to: body.available_to,
        is_available: body.is_available,
        reason: body.reason,
    };
    match services.catalog.record_availability(window) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => catalog_error(error),
    }
}

pub(crate) async fn list_availability(
    State(services): State<Arc<Services>>,
    Path(property_id): Path<String>,
) -> Response {
    match services.catalog.availability(&PropertyId(property_id)) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => catalog_error(error),
    }
}

pub(crate) async fn check_availability(
    State(services): State<Arc<Services>>,
    Path((property_id, date)): Path<(String, NaiveDate)>,
) -> Response {
    let id = PropertyId(property_id);
    match services.catalog.is_available(&id, date) {
        Ok(is_available) => (
            StatusCode::OK,
            Json(json!({
                "property_id": id.0,
                "date": date,
                "is_available": is_available,
            })),
        )
            .into_response(),
        Err(error) => catalog_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct BookingBody {
    guest_id: UserId,
    #[serde(flatten)]
    booking: NewBooking,
}

pub(crate) async fn create_booking(
    State(services): State<Arc<Services>>,
    Json(body): Json<BookingBody>,
) -> Response {
    match services.intake.request_booking(body.guest_id, body.booking) {
        Ok(booking) => (StatusCode::CREATED, Json(booking)).into_response(),
        Err(error) => intake_error(error),
    }
}

pub(crate) async fn get_booking(
    State(services): State<Arc<Services>>,
    Path(booking_id): Path<String>,
) -> Response {
    match services.intake.get_booking(&BookingId(booking_id)) {
        Ok(booking) => (StatusCode::OK, Json(booking)).into_response(),
        Err(error) => intake_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct BookingStatusBody {
    status: BookingStatus,
    #[serde(default)]
    at: Option<DateTime<Utc>>,
}

pub(crate) async fn booking_status(
    State(services): State<Arc<Services>>,
    Path(booking_id): Path<String>,
    Json(body): Json<BookingStatusBody>,
) -> Response {
    let at = body.at.unwrap_or_else(Utc::now);
    match services
        .intake
        .transition_booking(&BookingId(booking_id), body.status, at)
    {
        Ok(booking) => (StatusCode::OK, Json(booking)).into_response(),
        Err(error) => intake_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct ApplicationBody {
    applicant_id: UserId,
    #[serde(flatten)]
    application: NewApplication,
}

pub(crate) async fn create_application(
    State(services): State<Arc<Services>>,
    Json(body): Json<ApplicationBody>,
) -> Response {
    match services
        .intake
        .submit_application(body.applicant_id, body.application)
    {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(error) => intake_error(error),
    }
}

pub(crate) async fn get_application(
    State(services): State<Arc<Services>>,
    Path(application_id): Path<String>,
) -> Response {
    match services
        .intake
        .get_application(&ApplicationId(application_id))
    {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => intake_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct ApplicationStatusBody {
    status: ApplicationStatus,
    #[serde(default)]
    at: Option<DateTime<Utc>>,
}

pub(crate) async fn application_status(
    State(services): State<Arc<Services>>,
    Path(application_id): Path<String>,
    Json(body): Json<ApplicationStatusBody>,
) -> Response {
    let at = body.at.unwrap_or_else(Utc::now);
    match services
        .intake
        .transition_application(&ApplicationId(application_id), body.status, at)
    {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => intake_error(error),
    }
}

pub(crate) async fn create_viewing(
    State(services): State<Arc<Services>>,
    Json(new): Json<NewViewing>,
) -> Response {
    match services.viewings.schedule(new, Utc::now()) {
        Ok(viewing) => (StatusCode::CREATED, Json(viewing)).into_response(),
        Err(error) => viewing_error(error),
    }
}

pub(crate) async fn get_viewing(
    State(services): State<Arc<Services>>,
    Path(viewing_id): Path<String>,
) -> Response {
    match services.viewings.get(&ViewingId(viewing_id)) {
        Ok(viewing) => (StatusCode::OK, Json(viewing)).into_response(),
        Err(error) => viewing_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct CompleteViewingBody {
    #[serde(default)]
    at: Option<DateTime<Utc>>,
    #[serde(default)]
    agent_notes: Option<String>,
}

pub(crate) async fn complete_viewing(
    State(services): State<Arc<Services>>,
    Path(viewing_id): Path<String>,
    Json(body): Json<CompleteViewingBody>,
) -> Response {
    let at = body.at.unwrap_or_else(Utc::now);
    match services
        .viewings
        .complete(&ViewingId(viewing_id), at, body.agent_notes)
    {
        Ok(viewing) => (StatusCode::OK, Json(viewing)).into_response(),
        Err(error) => viewing_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct CancelViewingBody {
    #[serde(default)]
    at: Option<DateTime<Utc>>,
}

pub(crate) async fn cancel_viewing(
    State(services): State<Arc<Services>>,
    Path(viewing_id): Path<String>,
    Json(body): Json<CancelViewingBody>,
) -> Response {
    let at = body.at.unwrap_or_else(Utc::now);
    match services.viewings.cancel(&ViewingId(viewing_id), at) {
        Ok(viewing) => (StatusCode::OK, Json(viewing)).into_response(),
        Err(error) => viewing_error(error),
    }
}

#[derive(Deserialize)]
pub(crate) struct RescheduleViewingBody {
    scheduled_date: DateTime<Utc>,
}

pub(crate) async fn reschedule_viewing(
    State(services): State<Arc<Services>>,
    Path(viewing_id): Path<String>,
    Json(body): Json<RescheduleViewingBody>,
) -> Response {
    match services
        .viewings
        .reschedule(&ViewingId(viewing_id), body.scheduled_date, Utc::now())
    {
        Ok(viewing) => (StatusCode::OK, Json(viewing)).into_response(),
        Err(error) => viewing_error(error),
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
