use axum::{
    Extension,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use pitchlink_db::models::FileRef;
use pitchlink_db::queries::{startups, users};
use pitchlink_db::{Database, timestamp};
use pitchlink_types::api::{
    Claims, CreateStartupProfileRequest, FundUsageInput, FundUsagePatch, RevenueMetricsInput, RevenueMetricsPatch,
    StartupProfileFields, StartupProfileResponse, UpdateStartupProfileRequest, UploadResponse,
};
use pitchlink_types::models::Role;

use crate::auth::{AppState, blocking};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Path};
use crate::files::{Upload, attachment, multipart_error, read_upload, upload_from_field};
use crate::storage::FileKind;

const PROFILE_EXISTS: &str = "Startup profile already exists for this user";
const PROFILE_MISSING: &str = "Startup profile not found";

pub const PITCH_DECK_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Each share in 0..=100 and the four summing to 100 (±0.01).
pub fn validate_fund_usage(usage: &FundUsageInput) -> ApiResult<()> {
    let shares = [
        usage.product_development_percentage,
        usage.marketing_percentage,
        usage.team_expansion_percentage,
        usage.operations_percentage,
    ];
    if shares.iter().any(|p| !(0.0..=100.0).contains(p)) {
        return Err(ApiError::Validation("Fund usage percentages must be between 0 and 100".into()));
    }
    let total: f64 = shares.iter().sum();
    if (total - 100.0).abs() > 0.01 {
        return Err(ApiError::Validation(format!(
            "Fund usage percentages must sum to 100, got {total}"
        )));
    }
    Ok(())
}

pub fn create(
    db: &Database,
    caller: &Claims,
    req: CreateStartupProfileRequest,
    now: DateTime<Utc>,
) -> ApiResult<StartupProfileResponse> {
    create_with_deck(db, caller, req, None, now)
}

/// Create the profile and, when given, record an already stored pitch deck
/// in the same transaction.
pub fn create_with_deck(
    db: &Database,
    caller: &Claims,
    req: CreateStartupProfileRequest,
    deck: Option<&FileRef>,
    now: DateTime<Utc>,
) -> ApiResult<StartupProfileResponse> {
    require_startup(caller)?;
    validate_fund_usage(&req.fund_usage)?;

    let user_id = caller.sub.to_string();
    let now = timestamp(now);

    let agg = db.with_tx(|conn| {
        if startups::by_user_id(conn, &user_id)?.is_some() {
            return Err(ApiError::ProfileExists(PROFILE_EXISTS.into()));
        }
        let profile_id = Uuid::new_v4().to_string();
        startups::insert_profile(conn, &profile_id, &user_id, &req.fields, &now)
            .map_err(|e| ApiError::on_unique(e, ApiError::ProfileExists(PROFILE_EXISTS.into())))?;
        startups::replace_founders(conn, &profile_id, &req.founders)?;
        startups::upsert_revenue_metrics(conn, &profile_id, &req.revenue_metrics)?;
        startups::upsert_fund_usage(conn, &profile_id, &req.fund_usage)?;
        if let Some(file) = deck {
            startups::set_pitch_deck(conn, &profile_id, file, &now)?;
        }
        users::mark_profile_completed(conn, &user_id, &now)?;

        startups::aggregate_by_user_id(conn, &user_id)?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("startup profile vanished after insert")))
    })?;

    info!("Startup profile {} created for user {}", agg.profile.id, user_id);
    Ok(agg.into())
}

fn require_startup(caller: &Claims) -> ApiResult<()> {
    if caller.role != Role::Startup {
        return Err(ApiError::Forbidden("Only startups can create startup profiles".into()));
    }
    Ok(())
}

/// Checks a create can succeed before any file is written for it.
fn ensure_no_profile(db: &Database, caller: &Claims) -> ApiResult<()> {
    require_startup(caller)?;
    match db.with_conn(|conn| startups::by_user_id(conn, &caller.sub.to_string()))? {
        Some(_) => Err(ApiError::ProfileExists(PROFILE_EXISTS.into())),
        None => Ok(()),
    }
}

fn check_pitch_deck_type(upload: &Upload) -> ApiResult<()> {
    if !PITCH_DECK_TYPES.contains(&upload.content_type.as_str()) {
        return Err(ApiError::Validation("Only PDF, PPT, and PPTX files are allowed".into()));
    }
    Ok(())
}

async fn store_pitch_deck(state: &AppState, upload: Upload) -> ApiResult<FileRef> {
    let stored = state
        .storage
        .store(FileKind::PitchDeck, &upload.filename, &upload.bytes)
        .await?;
    Ok(FileRef {
        filename: stored.filename,
        file_path: stored.relative_path,
        file_size: stored.size,
        content_type: upload.content_type,
    })
}

pub fn list_all(db: &Database) -> ApiResult<Vec<StartupProfileResponse>> {
    let aggs = db.with_conn(startups::list_aggregates)?;
    Ok(aggs.into_iter().map(Into::into).collect())
}

pub fn get(db: &Database, user_id: Uuid) -> ApiResult<StartupProfileResponse> {
    db.with_conn(|conn| startups::aggregate_by_user_id(conn, &user_id.to_string()))?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound(PROFILE_MISSING.into()))
}

fn require_owner(caller: &Claims, user_id: Uuid) -> ApiResult<()> {
    if caller.sub != user_id {
        return Err(ApiError::Forbidden("You can only access your own startup profile".into()));
    }
    Ok(())
}

pub fn get_own(db: &Database, caller: &Claims, user_id: Uuid) -> ApiResult<StartupProfileResponse> {
    require_owner(caller, user_id)?;
    get(db, user_id)
}

macro_rules! apply {
    ($target:expr, $patch:expr; $($field:ident),* $(,)?) => {
        $( if let Some(v) = &$patch.$field { $target.$field = v.clone(); } )*
    };
}

macro_rules! apply_optional {
    ($target:expr, $patch:expr; $($field:ident),* $(,)?) => {
        $( if let Some(v) = &$patch.$field { $target.$field = Some(v.clone()); } )*
    };
}

fn merge_fields(fields: &mut StartupProfileFields, patch: &UpdateStartupProfileRequest) {
    apply!(fields, patch;
        company_name, industry, company_description, founding_date, team_size, district, state,
        business_model_description, total_paying_customers, competitive_advantage,
        product_demo_video_link, pre_money_valuation, amount_seeking, investment_type,
        max_equity_percentage, funding_stage, total_funding_raised, last_round_amount,
        last_round_date, key_previous_investors,
    );
    apply_optional!(fields, patch;
        website_link, social_media_1, social_media_2, monthly_customer_growth_rate,
        customer_acquisition_cost, customer_lifetime_value,
    );
}

fn merge_metrics(current: Option<RevenueMetricsInput>, patch: RevenueMetricsPatch) -> ApiResult<RevenueMetricsInput> {
    let mut metrics = match current {
        Some(m) => m,
        None => RevenueMetricsInput {
            monthly_recurring_revenue: patch.monthly_recurring_revenue.ok_or_else(missing_metrics)?,
            annual_recurring_revenue: patch.annual_recurring_revenue.ok_or_else(missing_metrics)?,
            revenue_growth_rate: None,
            monthly_burn_rate: None,
            current_cash_runway: None,
            projected_revenue_12_months: None,
            profitability_timeline: patch.profitability_timeline.clone().ok_or_else(missing_metrics)?,
            investment_timeline: patch.investment_timeline.clone().ok_or_else(missing_metrics)?,
        },
    };
    apply!(metrics, patch;
        monthly_recurring_revenue, annual_recurring_revenue, profitability_timeline, investment_timeline,
    );
    apply_optional!(metrics, patch;
        revenue_growth_rate, monthly_burn_rate, current_cash_runway, projected_revenue_12_months,
    );
    Ok(metrics)
}

fn missing_metrics() -> ApiError {
    ApiError::Validation(
        "revenue_metrics needs monthly_recurring_revenue, annual_recurring_revenue, \
         profitability_timeline and investment_timeline to be created"
            .into(),
    )
}

fn merge_fund_usage(current: Option<FundUsageInput>, patch: FundUsagePatch) -> ApiResult<FundUsageInput> {
    let mut usage = match current {
        Some(u) => u,
        None => {
            let missing = || ApiError::Validation("fund_usage needs all four percentages to be created".into());
            FundUsageInput {
                product_development_percentage: patch.product_development_percentage.ok_or_else(missing)?,
                marketing_percentage: patch.marketing_percentage.ok_or_else(missing)?,
                team_expansion_percentage: patch.team_expansion_percentage.ok_or_else(missing)?,
                operations_percentage: patch.operations_percentage.ok_or_else(missing)?,
            }
        }
    };
    apply!(usage, patch;
        product_development_percentage, marketing_percentage, team_expansion_percentage, operations_percentage,
    );
    validate_fund_usage(&usage)?;
    Ok(usage)
}

/// Owner-only partial update. Absent fields are left alone; `founders`
/// replaces the whole list when present.
pub fn update(
    db: &Database,
    caller: &Claims,
    user_id: Uuid,
    patch: UpdateStartupProfileRequest,
    now: DateTime<Utc>,
) -> ApiResult<StartupProfileResponse> {
    require_owner(caller, user_id)?;
    let user_id = user_id.to_string();
    let now = timestamp(now);

    let agg = db.with_tx(|conn| {
        let agg = startups::aggregate_by_user_id(conn, &user_id)?
            .ok_or_else(|| ApiError::NotFound(PROFILE_MISSING.into()))?;
        let profile_id = agg.profile.id.clone();
        let current: StartupProfileResponse = agg.into();

        let mut fields = current.fields;
        merge_fields(&mut fields, &patch);
        startups::update_fields(conn, &profile_id, &fields, &now)?;

        if let Some(founders) = &patch.founders {
            startups::replace_founders(conn, &profile_id, founders)?;
        }
        if let Some(metrics) = patch.revenue_metrics {
            let merged = merge_metrics(current.revenue_metrics.map(|m| m.metrics), metrics)?;
            startups::upsert_revenue_metrics(conn, &profile_id, &merged)?;
        }
        if let Some(usage) = patch.fund_usage {
            let merged = merge_fund_usage(current.fund_usage.map(|f| f.allocation), usage)?;
            startups::upsert_fund_usage(conn, &profile_id, &merged)?;
        }

        startups::aggregate_by_user_id(conn, &user_id)?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("startup profile vanished during update")))
    })?;

    info!("Startup profile {} updated", agg.profile.id);
    Ok(agg.into())
}

/// Record a newly stored pitch deck on the caller's profile.
pub fn attach_pitch_deck(db: &Database, caller: &Claims, file: &FileRef, now: DateTime<Utc>) -> ApiResult<()> {
    let user_id = caller.sub.to_string();
    let now = timestamp(now);
    db.with_tx(|conn| {
        let profile = startups::by_user_id(conn, &user_id)?
            .ok_or_else(|| ApiError::NotFound(PROFILE_MISSING.into()))?;
        startups::set_pitch_deck(conn, &profile.id, file, &now)?;
        Ok(())
    })
}

fn require_startup_profile(db: &Database, caller: &Claims) -> ApiResult<()> {
    if caller.role != Role::Startup {
        return Err(ApiError::Forbidden("Only startups can upload pitch decks".into()));
    }
    db.with_conn(|conn| startups::by_user_id(conn, &caller.sub.to_string()))?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Create your startup profile before uploading a pitch deck".into()))
}

// -- Handlers --

pub async fn create_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateStartupProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = blocking(&state, move |s| create(&s.db, &claims, req, Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn list_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<StartupProfileResponse>>> {
    blocking(&state, |s| list_all(&s.db)).await.map(Json)
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<StartupProfileResponse>> {
    blocking(&state, move |s| get(&s.db, user_id)).await.map(Json)
}

pub async fn get_own_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<StartupProfileResponse>> {
    blocking(&state, move |s| get_own(&s.db, &claims, user_id)).await.map(Json)
}

pub async fn update_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(patch): Json<UpdateStartupProfileRequest>,
) -> ApiResult<Json<StartupProfileResponse>> {
    blocking(&state, move |s| update(&s.db, &claims, user_id, patch, Utc::now())).await.map(Json)
}

/// Serves both the first upload and later replacements. Earlier files stay
/// on disk for applications that still reference them.
pub async fn upload_pitch_deck(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let check = claims.clone();
    blocking(&state, move |s| require_startup_profile(&s.db, &check)).await?;

    let upload = read_upload(multipart, "pitch_deck").await?;
    check_pitch_deck_type(&upload)?;
    let file = store_pitch_deck(&state, upload).await?;

    let recorded = file.clone();
    blocking(&state, move |s| attach_pitch_deck(&s.db, &claims, &recorded, Utc::now())).await?;

    Ok(Json(UploadResponse {
        message: "Pitch deck uploaded successfully".into(),
        filename: file.filename,
        file_path: file.file_path,
        file_size: file.file_size,
        content_type: file.content_type,
    }))
}

/// Multipart create: a `profile_data` JSON part plus an optional
/// `pitch_deck` file part.
pub async fn create_with_files(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let check = claims.clone();
    blocking(&state, move |s| ensure_no_profile(&s.db, &check)).await?;

    let mut profile_data = None;
    let mut deck = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("profile_data") => profile_data = Some(field.text().await.map_err(multipart_error)?),
            // An empty file input arrives as a part with an empty filename.
            Some("pitch_deck") if field.file_name().is_some_and(|n| !n.is_empty()) => {
                deck = Some(upload_from_field(field, "pitch_deck").await?);
            }
            _ => {}
        }
    }

    let profile_data = profile_data.ok_or_else(|| ApiError::Validation("Missing form field 'profile_data'".into()))?;
    let req: CreateStartupProfileRequest = serde_json::from_str(&profile_data)
        .map_err(|e| ApiError::Validation(format!("Invalid profile_data: {e}")))?;
    validate_fund_usage(&req.fund_usage)?;

    let file = match deck {
        Some(upload) => {
            check_pitch_deck_type(&upload)?;
            Some(store_pitch_deck(&state, upload).await?)
        }
        None => None,
    };

    let profile = blocking(&state, move |s| create_with_deck(&s.db, &claims, req, file.as_ref(), Utc::now())).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn download_pitch_deck(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Response> {
    let profile = blocking(&state, move |s| get_own(&s.db, &claims, user_id)).await?;
    let path = profile
        .pitch_deck_file_path
        .ok_or_else(|| ApiError::NotFound("No pitch deck uploaded".into()))?;
    let filename = profile.pitch_deck_filename.unwrap_or_else(|| "pitch_deck".into());
    attachment(&state, &filename, &path).await
}

#[cfg(test)]
mod tests {
    use pitchlink_types::api::FounderInput;

    use super::*;
    use crate::test_support as fx;

    fn claims(id: Uuid, role: Role) -> Claims {
        Claims { sub: id, email: format!("{id}@example.com"), role, exp: usize::MAX }
    }

    fn usage(a: f64, b: f64, c: f64, d: f64) -> FundUsageInput {
        FundUsageInput {
            product_development_percentage: a,
            marketing_percentage: b,
            team_expansion_percentage: c,
            operations_percentage: d,
        }
    }

    fn request(name: &str) -> CreateStartupProfileRequest {
        CreateStartupProfileRequest {
            fields: fx::startup_fields(name),
            founders: vec![FounderInput {
                name: "Ada".into(),
                educational_qualification: "MSc".into(),
                previous_work_experience: "Payments engineer".into(),
                linkedin_profile: "https://linkedin.com/in/ada".into(),
                photo_url: String::new(),
            }],
            revenue_metrics: RevenueMetricsInput {
                monthly_recurring_revenue: 40_000,
                annual_recurring_revenue: 480_000,
                revenue_growth_rate: Some(6.0),
                monthly_burn_rate: None,
                current_cash_runway: Some(14),
                projected_revenue_12_months: None,
                profitability_timeline: "18 months".into(),
                investment_timeline: "Q3".into(),
            },
            fund_usage: fx::even_split(),
        }
    }

    fn startup_user(db: &Database) -> Claims {
        let id = Uuid::new_v4();
        db.with_conn(|conn| {
            fx::user(conn, &id.to_string(), "startup");
            Ok(())
        })
        .unwrap();
        claims(id, Role::Startup)
    }

    #[test]
    fn fund_usage_must_total_one_hundred() {
        assert!(validate_fund_usage(&usage(25.0, 25.0, 25.0, 25.0)).is_ok());
        assert!(validate_fund_usage(&usage(33.33, 33.33, 33.34, 0.0)).is_ok());
        assert!(matches!(validate_fund_usage(&usage(25.0, 25.0, 25.0, 30.0)), Err(ApiError::Validation(_))));
        assert!(matches!(validate_fund_usage(&usage(120.0, -20.0, 0.0, 0.0)), Err(ApiError::Validation(_))));
    }

    #[test]
    fn create_writes_whole_aggregate_and_completes_user() {
        let db = Database::open_in_memory().unwrap();
        let caller = startup_user(&db);

        let profile = create(&db, &caller, request("Acme"), Utc::now()).unwrap();
        assert_eq!(profile.user_id, caller.sub);
        assert_eq!(profile.founders.len(), 1);
        assert_eq!(profile.revenue_metrics.unwrap().metrics.annual_recurring_revenue, 480_000);
        assert_eq!(profile.fund_usage.unwrap().allocation, fx::even_split());

        let user = db.with_conn(|conn| users::by_id(conn, &caller.sub.to_string())).unwrap().unwrap();
        assert!(user.profile_completed);

        assert!(matches!(create(&db, &caller, request("Acme"), Utc::now()), Err(ApiError::ProfileExists(_))));
    }

    #[test]
    fn create_with_deck_records_the_file_on_the_new_profile() {
        let db = Database::open_in_memory().unwrap();
        let caller = startup_user(&db);
        let deck = FileRef {
            filename: "acme.pdf".into(),
            file_path: "uploads/pitch_decks/abc.pdf".into(),
            file_size: 8,
            content_type: "application/pdf".into(),
        };

        assert!(ensure_no_profile(&db, &caller).is_ok());
        let profile = create_with_deck(&db, &caller, request("Acme"), Some(&deck), Utc::now()).unwrap();
        assert_eq!(profile.pitch_deck_filename.as_deref(), Some("acme.pdf"));
        assert_eq!(profile.pitch_deck_file_path.as_deref(), Some("uploads/pitch_decks/abc.pdf"));
        assert_eq!(profile.pitch_deck_file_size, Some(8));
        assert!(matches!(ensure_no_profile(&db, &caller), Err(ApiError::ProfileExists(_))));
    }

    #[test]
    fn bad_fund_usage_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let caller = startup_user(&db);
        let mut req = request("Acme");
        req.fund_usage = usage(25.0, 25.0, 25.0, 30.0);

        assert!(matches!(create(&db, &caller, req, Utc::now()), Err(ApiError::Validation(_))));
        assert!(list_all(&db).unwrap().is_empty());
    }

    #[test]
    fn investors_cannot_create_startup_profiles() {
        let db = Database::open_in_memory().unwrap();
        let caller = claims(Uuid::new_v4(), Role::Investor);
        assert!(matches!(create(&db, &caller, request("Acme"), Utc::now()), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn patch_touches_only_given_fields() {
        let db = Database::open_in_memory().unwrap();
        let caller = startup_user(&db);
        create(&db, &caller, request("Acme"), Utc::now()).unwrap();

        let patch = UpdateStartupProfileRequest {
            team_size: Some(20),
            website_link: Some("https://acme.example".into()),
            founders: Some(vec![]),
            fund_usage: Some(FundUsagePatch {
                marketing_percentage: Some(15.0),
                operations_percentage: Some(35.0),
                ..Default::default()
            }),
            revenue_metrics: Some(RevenueMetricsPatch {
                monthly_burn_rate: Some(9_000),
                ..Default::default()
            }),
            ..Default::default()
        };
        let updated = update(&db, &caller, caller.sub, patch, Utc::now()).unwrap();
        assert_eq!(updated.fields.team_size, 20);
        assert_eq!(updated.fields.company_name, "Acme");
        assert_eq!(updated.fields.website_link.as_deref(), Some("https://acme.example"));
        assert!(updated.founders.is_empty());
        assert_eq!(updated.fund_usage.unwrap().allocation, usage(25.0, 15.0, 25.0, 35.0));
        let metrics = updated.revenue_metrics.unwrap().metrics;
        assert_eq!(metrics.monthly_burn_rate, Some(9_000));
        assert_eq!(metrics.current_cash_runway, Some(14));
    }

    #[test]
    fn patch_revalidates_fund_usage() {
        let db = Database::open_in_memory().unwrap();
        let caller = startup_user(&db);
        create(&db, &caller, request("Acme"), Utc::now()).unwrap();

        let patch = UpdateStartupProfileRequest {
            team_size: Some(99),
            fund_usage: Some(FundUsagePatch { marketing_percentage: Some(30.0), ..Default::default() }),
            ..Default::default()
        };
        assert!(matches!(update(&db, &caller, caller.sub, patch, Utc::now()), Err(ApiError::Validation(_))));
        // rolled back with the rest of the update
        assert_eq!(get(&db, caller.sub).unwrap().fields.team_size, 12);
    }

    #[test]
    fn only_the_owner_may_edit_or_fetch_for_editing() {
        let db = Database::open_in_memory().unwrap();
        let owner = startup_user(&db);
        create(&db, &owner, request("Acme"), Utc::now()).unwrap();
        let other = startup_user(&db);

        assert!(matches!(get_own(&db, &other, owner.sub), Err(ApiError::Forbidden(_))));
        assert!(matches!(
            update(&db, &other, owner.sub, UpdateStartupProfileRequest::default(), Utc::now()),
            Err(ApiError::Forbidden(_))
        ));
        assert_eq!(get(&db, owner.sub).unwrap().fields.company_name, "Acme");
        assert!(matches!(get(&db, other.sub), Err(ApiError::NotFound(_))));
    }
}
