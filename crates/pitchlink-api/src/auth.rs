use std::sync::Arc;

use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::{Value, json};

use pitchlink_db::Database;
use pitchlink_db::queries::users;
use pitchlink_types::api::{
    AuthResponse, Claims, LoginRequest, SendOtpRequest, SendOtpResponse, UserResponse, VerifyOtpAndSignupRequest,
};

use crate::credentials::TokenIssuer;
use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::mailer::Mailer;
use crate::signup;
use crate::storage::Storage;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenIssuer,
    pub mailer: Box<dyn Mailer>,
    pub storage: Storage,
}

/// Run blocking work (SQLite, argon2, SMTP) off the async executor.
pub(crate) async fn blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&AppStateInner) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state)).await?
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "PitchLink API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<SendOtpRequest>,
) -> ApiResult<Json<SendOtpResponse>> {
    blocking(&state, move |s| signup::request_otp(&s.db, s.mailer.as_ref(), &req.email, Utc::now()))
        .await
        .map(Json)
}

pub async fn verify_otp_and_signup(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpAndSignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = blocking(&state, move |s| signup::verify_and_signup(&s.db, &s.tokens, &req, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(auth)))
}

pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<Json<AuthResponse>> {
    blocking(&state, move |s| signup::login(&s.db, &s.tokens, &req, Utc::now()))
        .await
        .map(Json)
}

/// The account behind the presented token. A token that outlives its user is rejected.
pub async fn me(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> ApiResult<Json<UserResponse>> {
    let user = blocking(&state, move |s| {
        Ok(s.db.with_conn(|conn| users::by_id(conn, &claims.sub.to_string()))?)
    })
    .await?;
    user.map(|row| Json(row.into()))
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))
}
