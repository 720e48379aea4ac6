//! Open Service Broker endpoints: catalog, provision, bind and their inverses.

use super::{basic_credentials, AppState};
use crate::error::{BrokerError, Result};
use crate::ledger::{BindOutcome, ProvisionOutcome};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use broker_api::{Catalog, LifecycleQuery, ProvisionRequest, ProvisionResponse};

pub async fn info(State(state): State<AppState>) -> String {
    format!(
        "OSB API Sample DB Broker\n\
         ------------------------\n\
         User: {}\n\
         Auth: {}\n\
         DBs: {}\n\
         Services: {}\n\
         Instances: {}\n",
        state.guard.admin_user(),
        if state.guard.is_disabled() { "disabled" } else { "enabled" },
        state.registry.len(),
        state.catalog.services.len(),
        state.ledger.len(),
    )
}

pub async fn catalog(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Catalog>> {
    state.guard.verify_admin(basic_credentials(&headers).as_ref())?;
    Ok(Json(state.catalog.as_ref().clone()))
}

pub async fn provision(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    state.guard.verify_admin(basic_credentials(&headers).as_ref())?;

    let request: ProvisionRequest =
        serde_json::from_slice(&body).map_err(|e| BrokerError::Validation(e.to_string()))?;

    let status = match state
        .ledger
        .provision(&instance_id, request, &state.host(&headers))?
    {
        ProvisionOutcome::Created => StatusCode::CREATED,
        ProvisionOutcome::AlreadyProvisioned => StatusCode::OK,
    };
    Ok((status, Json(ProvisionResponse::default())).into_response())
}

pub async fn deprovision(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    Query(query): Query<LifecycleQuery>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    state.guard.verify_admin(basic_credentials(&headers).as_ref())?;

    state.ledger.deprovision(
        &instance_id,
        query.service_id.as_deref(),
        query.plan_id.as_deref(),
    )?;
    Ok(Json(serde_json::json!({})))
}

/// The bind body is accepted but not inspected.
pub async fn bind(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    state.guard.verify_admin(basic_credentials(&headers).as_ref())?;

    let response = match state.ledger.bind(&instance_id, &binding_id)? {
        BindOutcome::Created(credentials) => (StatusCode::CREATED, Json(credentials)).into_response(),
        BindOutcome::AlreadyBound => (StatusCode::OK, Json(serde_json::json!({}))).into_response(),
    };
    Ok(response)
}

pub async fn unbind(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    Query(query): Query<LifecycleQuery>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    state.guard.verify_admin(basic_credentials(&headers).as_ref())?;

    state.ledger.unbind(
        &instance_id,
        &binding_id,
        query.service_id.as_deref(),
        query.plan_id.as_deref(),
    )?;
    Ok(Json(serde_json::json!({})))
}
