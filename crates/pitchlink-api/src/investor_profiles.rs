use axum::{
    Extension,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use pitchlink_db::convert::investor_fields;
use pitchlink_db::models::FileRef;
use pitchlink_db::queries::{investors, users};
use pitchlink_db::{Database, timestamp};
use pitchlink_types::api::{
    Claims, InvestorProfileFields, InvestorProfileResponse, UpdateInvestorProfileRequest, UploadResponse,
};
use pitchlink_types::models::Role;

use crate::auth::{AppState, blocking};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Path};
use crate::files::{attachment, read_upload};
use crate::storage::FileKind;

const PROFILE_EXISTS: &str = "Investor profile already exists for this user";
const PROFILE_MISSING: &str = "Investor profile not found";

pub fn create(
    db: &Database,
    caller: &Claims,
    fields: InvestorProfileFields,
    now: DateTime<Utc>,
) -> ApiResult<InvestorProfileResponse> {
    if caller.role != Role::Investor {
        return Err(ApiError::Forbidden("Only investors can create investor profiles".into()));
    }
    let user_id = caller.sub.to_string();
    let now = timestamp(now);

    let row = db.with_tx(|conn| {
        if investors::by_user_id(conn, &user_id)?.is_some() {
            return Err(ApiError::ProfileExists(PROFILE_EXISTS.into()));
        }
        investors::insert(conn, &Uuid::new_v4().to_string(), &user_id, &fields, &now)
            .map_err(|e| ApiError::on_unique(e, ApiError::ProfileExists(PROFILE_EXISTS.into())))?;
        users::mark_profile_completed(conn, &user_id, &now)?;
        investors::by_user_id(conn, &user_id)?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("investor profile vanished after insert")))
    })?;

    info!("Investor profile {} created for user {}", row.id, user_id);
    Ok(row.into())
}

pub fn list_all(db: &Database) -> ApiResult<Vec<InvestorProfileResponse>> {
    let rows = db.with_conn(investors::list_all)?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub fn get(db: &Database, user_id: Uuid) -> ApiResult<InvestorProfileResponse> {
    db.with_conn(|conn| investors::by_user_id(conn, &user_id.to_string()))?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound(PROFILE_MISSING.into()))
}

pub fn get_own(db: &Database, caller: &Claims, user_id: Uuid) -> ApiResult<InvestorProfileResponse> {
    if caller.sub != user_id {
        return Err(ApiError::Forbidden("You can only access your own investor profile".into()));
    }
    get(db, user_id)
}

fn merge(fields: &mut InvestorProfileFields, patch: UpdateInvestorProfileRequest) {
    macro_rules! set {
        ($($f:ident),*) => { $( if let Some(v) = patch.$f { fields.$f = v; } )* };
    }
    macro_rules! set_optional {
        ($($f:ident),*) => { $( if let Some(v) = patch.$f { fields.$f = Some(v); } )* };
    }
    set!(
        full_name, email, country, state, district, linkedin_profile, investor_type,
        investment_experience, years_of_investment_experience, professional_background,
        investment_stages, check_size_range, geographic_focus, industry_focus,
        investment_philosophy, decision_timeline, post_investment_involvement,
        areas_of_expertise, profile_visibility, contact_permissions
    );
    set_optional!(
        phone_number, firm_name, previous_experience, number_of_portfolio_companies,
        notable_investments, successful_exits, investment_thesis, additional_info
    );
}

pub fn update(
    db: &Database,
    caller: &Claims,
    user_id: Uuid,
    patch: UpdateInvestorProfileRequest,
    now: DateTime<Utc>,
) -> ApiResult<InvestorProfileResponse> {
    if caller.sub != user_id {
        return Err(ApiError::Forbidden("You can only update your own investor profile".into()));
    }
    let user_id = user_id.to_string();
    let now = timestamp(now);

    let row = db.with_tx(|conn| {
        let row = investors::by_user_id(conn, &user_id)?
            .ok_or_else(|| ApiError::NotFound(PROFILE_MISSING.into()))?;
        let mut fields = investor_fields(&row);
        merge(&mut fields, patch);
        investors::update_fields(conn, &row.id, &fields, &now)?;
        investors::by_user_id(conn, &user_id)?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("investor profile vanished during update")))
    })?;

    info!("Investor profile {} updated", row.id);
    Ok(row.into())
}

pub fn attach_photo(db: &Database, caller: &Claims, file: &FileRef, now: DateTime<Utc>) -> ApiResult<()> {
    let user_id = caller.sub.to_string();
    let now = timestamp(now);
    db.with_tx(|conn| {
        let row = investors::by_user_id(conn, &user_id)?
            .ok_or_else(|| ApiError::NotFound(PROFILE_MISSING.into()))?;
        investors::set_photo(conn, &row.id, file, &now)?;
        Ok(())
    })
}

fn require_investor_profile(db: &Database, caller: &Claims) -> ApiResult<()> {
    if caller.role != Role::Investor {
        return Err(ApiError::Forbidden("Only investors can upload profile photos".into()));
    }
    db.with_conn(|conn| investors::by_user_id(conn, &caller.sub.to_string()))?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Create your investor profile before uploading a photo".into()))
}

// -- Handlers --

pub async fn create_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(fields): Json<InvestorProfileFields>,
) -> ApiResult<impl IntoResponse> {
    let profile = blocking(&state, move |s| create(&s.db, &claims, fields, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn list_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<InvestorProfileResponse>>> {
    blocking(&state, |s| list_all(&s.db)).await.map(Json)
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<InvestorProfileResponse>> {
    blocking(&state, move |s| get(&s.db, user_id)).await.map(Json)
}

pub async fn get_own_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<InvestorProfileResponse>> {
    blocking(&state, move |s| get_own(&s.db, &claims, user_id)).await.map(Json)
}

pub async fn update_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(patch): Json<UpdateInvestorProfileRequest>,
) -> ApiResult<Json<InvestorProfileResponse>> {
    blocking(&state, move |s| update(&s.db, &claims, user_id, patch, Utc::now())).await.map(Json)
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let check = claims.clone();
    blocking(&state, move |s| require_investor_profile(&s.db, &check)).await?;

    let upload = read_upload(multipart, "photo").await?;
    if !upload.content_type.starts_with("image/") {
        return Err(ApiError::Validation("Only image files are allowed".into()));
    }

    let stored = state
        .storage
        .store(FileKind::ProfilePhoto, &upload.filename, &upload.bytes)
        .await?;
    let file = FileRef {
        filename: stored.filename,
        file_path: stored.relative_path,
        file_size: stored.size,
        content_type: upload.content_type,
    };

    let recorded = file.clone();
    blocking(&state, move |s| attach_photo(&s.db, &claims, &recorded, Utc::now())).await?;

    Ok(Json(UploadResponse {
        message: "Profile photo uploaded successfully".into(),
        filename: file.filename,
        file_path: file.file_path,
        file_size: file.file_size,
        content_type: file.content_type,
    }))
}

pub async fn download_photo(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> ApiResult<Response> {
    let profile = blocking(&state, move |s| get(&s.db, user_id)).await?;
    let path = profile
        .profile_photo_file_path
        .ok_or_else(|| ApiError::NotFound("No profile photo uploaded".into()))?;
    let filename = profile.profile_photo_filename.unwrap_or_else(|| "photo".into());
    attachment(&state, &filename, &path).await
}
