//! Pitch-deck applications and investor interest.
//!
//! A (startup, investor) pair has at most one application and at most one
//! interest record. Applications are created at `sent` and snapshot the
//! startup's pitch deck reference at that moment; interest is an upsert.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use pitchlink_db::queries::applications::{self, NewApplication};
use pitchlink_db::queries::{interests, investors, startups, users};
use pitchlink_db::{Database, timestamp};
use pitchlink_types::api::{
    ApplicationLogResponse, ApplicationResponse, Claims, InterestStatusResponse, SendPitchDeckRequest,
    UpdateInterestRequest,
};
use pitchlink_types::models::{ApplicationStatus, InterestLevel, Role};

use crate::auth::{AppState, blocking};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Path};
use crate::files::attachment;

const ALREADY_SENT: &str = "Pitch deck already sent to this investor";

pub fn send_pitch_deck(
    db: &Database,
    caller: &Claims,
    investor_id: Uuid,
    now: DateTime<Utc>,
) -> ApiResult<ApplicationResponse> {
    if caller.role != Role::Startup {
        return Err(ApiError::Forbidden("Only startups can send pitch decks".into()));
    }
    let startup_id = caller.sub.to_string();
    let investor_id = investor_id.to_string();
    let now = timestamp(now);

    let row = db.with_tx(|conn| {
        let startup = startups::by_user_id(conn, &startup_id)?
            .ok_or_else(|| ApiError::NotFound("Startup profile not found".into()))?;
        let investor = investors::by_user_id(conn, &investor_id)?
            .ok_or_else(|| ApiError::NotFound("Investor profile not found".into()))?;

        if applications::exists_for_pair(conn, &startup_id, &investor_id)? {
            return Err(ApiError::Conflict(ALREADY_SENT.into()));
        }

        let id = Uuid::new_v4().to_string();
        let log = format!("{} sent pitch deck to {}", startup.company_name, investor.full_name);
        applications::insert(
            conn,
            &NewApplication {
                id: &id,
                startup_id: &startup_id,
                investor_id: &investor_id,
                pitch_deck_filename: startup.pitch_deck_filename.as_deref(),
                pitch_deck_file_path: startup.pitch_deck_file_path.as_deref(),
                status: ApplicationStatus::Sent.as_str(),
                log: Some(&log),
            },
            &now,
        )
        .map_err(|e| ApiError::conflict_on_unique(e, ALREADY_SENT))?;
        applications::insert_log(
            conn,
            &Uuid::new_v4().to_string(),
            &id,
            ApplicationStatus::Sent.as_str(),
            &startup_id,
            startup.pitch_deck_filename.as_deref(),
            &now,
        )?;

        applications::by_id(conn, &id)?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("application {id} vanished after insert")))
    })?;

    info!("Application {} sent: startup {} -> investor {}", row.id, row.startup_id, row.investor_id);
    Ok(row.into())
}

pub fn update_interest(
    db: &Database,
    caller: &Claims,
    startup_id: Uuid,
    status: InterestLevel,
    now: DateTime<Utc>,
) -> ApiResult<InterestStatusResponse> {
    if caller.role != Role::Investor {
        return Err(ApiError::Forbidden("Only investors can update interest status".into()));
    }
    let startup_id = startup_id.to_string();
    let investor_id = caller.sub.to_string();
    let now = timestamp(now);

    let row = db.with_tx(|conn| {
        match users::by_id(conn, &startup_id)? {
            Some(user) if user.role == Role::Startup.as_str() => {}
            _ => return Err(ApiError::NotFound("Startup not found".into())),
        }
        interests::upsert(conn, &Uuid::new_v4().to_string(), &startup_id, &investor_id, status.as_str(), &now)?;
        interests::by_pair(conn, &startup_id, &investor_id)?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("interest record vanished after upsert")))
    })?;

    info!("Investor {} marked startup {} as {}", investor_id, startup_id, status.as_str());
    Ok(row.into())
}

fn require_self(caller: &Claims, path_id: Uuid, what: &str) -> ApiResult<String> {
    if caller.sub != path_id {
        return Err(ApiError::Forbidden(format!("Can only view your own {what}")));
    }
    Ok(path_id.to_string())
}

pub fn sent_by_startup(db: &Database, caller: &Claims, startup_id: Uuid) -> ApiResult<Vec<ApplicationResponse>> {
    let id = require_self(caller, startup_id, "applications")?;
    let rows = db.with_conn(|conn| applications::list_by_startup(conn, &id))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub fn received_by_investor(db: &Database, caller: &Claims, investor_id: Uuid) -> ApiResult<Vec<ApplicationResponse>> {
    let id = require_self(caller, investor_id, "received pitch decks")?;
    let rows = db.with_conn(|conn| applications::list_by_investor(conn, &id))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub fn interest_by_investor(db: &Database, caller: &Claims, investor_id: Uuid) -> ApiResult<Vec<InterestStatusResponse>> {
    let id = require_self(caller, investor_id, "interest statuses")?;
    let rows = db.with_conn(|conn| interests::list_by_investor(conn, &id))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub fn interest_by_startup(db: &Database, caller: &Claims, startup_id: Uuid) -> ApiResult<Vec<InterestStatusResponse>> {
    let id = require_self(caller, startup_id, "interest statuses")?;
    let rows = db.with_conn(|conn| interests::list_by_startup(conn, &id))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Load an application the caller takes part in.
fn participant_application(
    db: &Database,
    caller: &Claims,
    application_id: Uuid,
) -> ApiResult<pitchlink_db::models::ApplicationRow> {
    let app = db
        .with_conn(|conn| applications::by_id(conn, &application_id.to_string()))?
        .ok_or_else(|| ApiError::NotFound("Application not found".into()))?;

    let caller_id = caller.sub.to_string();
    if app.startup_id != caller_id && app.investor_id != caller_id {
        return Err(ApiError::Forbidden("You are not a participant in this application".into()));
    }
    Ok(app)
}

pub fn application_logs(db: &Database, caller: &Claims, application_id: Uuid) -> ApiResult<Vec<ApplicationLogResponse>> {
    let app = participant_application(db, caller, application_id)?;
    let rows = db.with_conn(|conn| applications::logs_for(conn, &app.id))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// The snapshot `(filename, stored_path)` of an application's pitch deck.
pub fn pitch_deck_reference(db: &Database, caller: &Claims, application_id: Uuid) -> ApiResult<(String, String)> {
    let app = participant_application(db, caller, application_id)?;
    let path = app
        .pitch_deck_file_path
        .ok_or_else(|| ApiError::NotFound("Pitch deck file path not found".into()))?;
    let filename = app.pitch_deck_filename.unwrap_or_else(|| {
        std::path::Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pitch_deck".into())
    });
    Ok((filename, path))
}

// -- Handlers --

pub async fn send_pitch_deck_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendPitchDeckRequest>,
) -> ApiResult<impl IntoResponse> {
    let app = blocking(&state, move |s| send_pitch_deck(&s.db, &claims, req.investor_id, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

pub async fn sent_pitch_decks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(startup_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ApplicationResponse>>> {
    blocking(&state, move |s| sent_by_startup(&s.db, &claims, startup_id)).await.map(Json)
}

pub async fn received_pitch_decks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(investor_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ApplicationResponse>>> {
    blocking(&state, move |s| received_by_investor(&s.db, &claims, investor_id)).await.map(Json)
}

pub async fn update_interest_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateInterestRequest>,
) -> ApiResult<Json<InterestStatusResponse>> {
    blocking(&state, move |s| update_interest(&s.db, &claims, req.startup_id, req.status, Utc::now()))
        .await
        .map(Json)
}

pub async fn investor_interest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(investor_id): Path<Uuid>,
) -> ApiResult<Json<Vec<InterestStatusResponse>>> {
    blocking(&state, move |s| interest_by_investor(&s.db, &claims, investor_id)).await.map(Json)
}

pub async fn startup_interest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(startup_id): Path<Uuid>,
) -> ApiResult<Json<Vec<InterestStatusResponse>>> {
    blocking(&state, move |s| interest_by_startup(&s.db, &claims, startup_id)).await.map(Json)
}

pub async fn logs_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ApplicationLogResponse>>> {
    blocking(&state, move |s| application_logs(&s.db, &claims, application_id)).await.map(Json)
}

pub async fn download_pitch_deck(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
) -> ApiResult<Response> {
    let (filename, path) = blocking(&state, move |s| pitch_deck_reference(&s.db, &claims, application_id)).await?;
    attachment(&state, &filename, &path).await
}
