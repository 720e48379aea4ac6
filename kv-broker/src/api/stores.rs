//! Direct store API under `/db`.
//!
//! Per-store handlers look the store up once, check the caller against it
//! and then act on that same store, never on whatever the id maps to later.

use super::{basic_credentials, AppState};
use crate::error::Result;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use broker_api::StoreView;

pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<StoreView>>> {
    state.guard.verify_admin(basic_credentials(&headers).as_ref())?;

    let stores = state.registry.list_stores();
    Ok(Json(stores.iter().map(|s| s.view()).collect()))
}

pub async fn create(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    create_store(&state, None, &headers)
}

pub async fn create_with_id(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    create_store(&state, Some(&store_id), &headers)
}

fn create_store(state: &AppState, store_id: Option<&str>, headers: &HeaderMap) -> Result<Response> {
    state.guard.verify_admin(basic_credentials(headers).as_ref())?;

    let store = state.registry.create_store(store_id, &state.host(headers))?;
    let location = format!("/db/{}", store.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(store.view()),
    )
        .into_response())
}

pub async fn get_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StoreView>> {
    let store = state.registry.get_store(&store_id)?;
    state
        .guard
        .verify_store(basic_credentials(&headers).as_ref(), &store)?;
    Ok(Json(store.view()))
}

pub async fn delete_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let store = state.registry.get_store(&store_id)?;
    state
        .guard
        .verify_store_or_admin(basic_credentials(&headers).as_ref(), &store)?;
    state.registry.remove_if_same(&store)?;
    Ok(StatusCode::OK)
}

pub async fn get_value(
    State(state): State<AppState>,
    Path((store_id, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    let store = state.registry.get_store(&store_id)?;
    state
        .guard
        .verify_store(basic_credentials(&headers).as_ref(), &store)?;

    let value = store.value(&key)?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        value,
    )
        .into_response())
}

pub async fn set_value(
    State(state): State<AppState>,
    Path((store_id, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let store = state.registry.get_store(&store_id)?;
    state
        .guard
        .verify_store(basic_credentials(&headers).as_ref(), &store)?;

    store.set_value(&key, body.to_vec())?;
    Ok(StatusCode::OK)
}

pub async fn delete_value(
    State(state): State<AppState>,
    Path((store_id, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let store = state.registry.get_store(&store_id)?;
    state
        .guard
        .verify_store(basic_credentials(&headers).as_ref(), &store)?;

    store.delete_value(&key)?;
    Ok(StatusCode::OK)
}
