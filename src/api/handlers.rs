use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::{CatalogError, Delta, LessonId, LessonRecord};
use crate::http::request::{limit_param, parse_json};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::LogEntry;
use crate::orders::{CheckoutRequest, Order};

#[derive(Serialize)]
pub struct ServiceStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LessonEnvelope {
    pub lesson: LessonRecord,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggedInUser {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoggedInUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderCreated {
    pub message: String,
    pub order: Order,
}

pub async fn get_health() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

pub async fn list_lessons(State(state): State<AppState>) -> Json<Vec<LessonRecord>> {
    Json(state.catalog.list())
}

pub async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LessonRecord>, ApiError> {
    let id = parse_lesson_id(&id)?;
    Ok(Json(state.catalog.find_by_id(id)?))
}

pub async fn adjust_spaces(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LessonEnvelope>, ApiError> {
    let id = parse_lesson_id(&id)?;
    let payload: Value = parse_json(&headers, &body)?;
    let delta = Delta::from_json(&payload)?;

    let lesson = state.inventory.adjust_spaces(id, delta)?;
    Ok(Json(LessonEnvelope { lesson }))
}

/// Accepts any well-formed credentials; there are no accounts.
pub async fn login(headers: HeaderMap, body: Bytes) -> Result<Json<LoginResponse>, ApiError> {
    let request: LoginRequest = parse_json(&headers, &body)?;
    let email = request.email.trim();

    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    if request.password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: LoggedInUser {
            email: email.to_string(),
        },
    }))
}

pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<OrderCreated>), ApiError> {
    let request: CheckoutRequest = parse_json(&headers, &body)?;
    let order = state.orders.checkout(request)?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreated {
            message: "Order placed".to_string(),
            order,
        }),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::not_found(format!("Order {id} not found")))?;
    Ok(Json(state.orders.get(id)?))
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Json<Vec<LogEntry>> {
    let limit = limit_param(&query);
    Json(state.observer.log().recent(limit))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LogEntry>, ApiError> {
    Uuid::parse_str(&id)
        .ok()
        .and_then(|uuid| state.observer.log().get(uuid))
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Log entry {id} not found")))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

fn parse_lesson_id(raw: &str) -> Result<LessonId, CatalogError> {
    raw.parse()
        .map_err(|_| CatalogError::InvalidInput(format!("'{raw}' is not a lesson id")))
}
