//! HTTP endpoint handlers
//!
//! Handlers decode the request, hand the fields to `Chirpy` on the blocking
//! pool, and encode whatever comes back.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use chirpy_core::{Chirp, ChirpId, Chirpy, PublicUser, Session, UserId, WebhookEvent};

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Run a core operation off the async workers
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Chirpy) -> chirpy_core::Result<T> + Send + 'static,
{
    let state = state.clone();
    Ok(tokio::task::spawn_blocking(move || f(&state.chirpy)).await??)
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(v)| v)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn path_param<T>(path: Result<Path<T>, PathRejection>) -> ApiResult<T> {
    path.map(|Path(v)| v)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(v)| v)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Email and password pair used by signup, login, and account update
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn healthz() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}

// Users

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let req = json_body(body)?;
    let user = blocking(&state, move |c| c.create_user(&req.email, &req.password)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<PublicUser>> {
    let auth = authorization(&headers);
    let req = json_body(body)?;
    let user = blocking(&state, move |c| {
        c.update_user(auth.as_deref(), &req.email, &req.password)
    })
    .await?;
    Ok(Json(user))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let req = json_body(body)?;
    let session = blocking(&state, move |c| c.login(&req.email, &req.password)).await?;
    Ok(Json(session))
}

// Tokens

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<TokenResponse>> {
    let auth = authorization(&headers);
    let token = blocking(&state, move |c| c.refresh(auth.as_deref())).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn revoke(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let auth = authorization(&headers);
    blocking(&state, move |c| c.revoke(auth.as_deref())).await?;
    Ok(StatusCode::OK)
}

// Chirps

pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Chirp>)> {
    let auth = authorization(&headers);
    let req = json_body(body)?;
    let chirp = blocking(&state, move |c| c.create_chirp(auth.as_deref(), &req.body)).await?;
    Ok((StatusCode::CREATED, Json(chirp)))
}

pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListChirpsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Chirp>>> {
    let query = query_params(query)?;
    let author = query.author_id.map(UserId);
    let chirps = blocking(&state, move |c| c.list_chirps(author)).await?;
    Ok(Json(chirps))
}

pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Chirp>> {
    let id = path_param(id)?;
    let chirp = blocking(&state, move |c| c.get_chirp(ChirpId(id))).await?;
    Ok(Json(chirp))
}

pub async fn delete_chirp(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let id = path_param(id)?;
    let auth = authorization(&headers);
    blocking(&state, move |c| c.delete_chirp(auth.as_deref(), ChirpId(id))).await?;
    Ok(StatusCode::OK)
}

// Billing

pub async fn polka_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<WebhookEvent>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let auth = authorization(&headers);
    let event = json_body(body)?;
    blocking(&state, move |c| c.handle_webhook(auth.as_deref(), &event)).await?;
    Ok(StatusCode::OK)
}

// Admin

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("Hits: {}", state.chirpy.hits().hits()),
    )
}

pub async fn reset(State(state): State<Arc<AppState>>) -> StatusCode {
    state.chirpy.hits().reset();
    tracing::info!("reset file server hits");
    StatusCode::OK
}
