use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ApplicationStatus, InterestLevel, Role};

// -- JWT Claims --

/// Access-token claims. Canonical definition shared by the credential
/// service and the bearer middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendOtpResponse {
    pub message: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyOtpAndSignupRequest {
    pub email: String,
    pub otp: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
}

// -- Startup profiles --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FounderInput {
    pub name: String,
    pub educational_qualification: String,
    pub previous_work_experience: String,
    pub linkedin_profile: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Founder {
    pub id: Uuid,
    pub startup_profile_id: Uuid,
    #[serde(flatten)]
    pub details: FounderInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueMetricsInput {
    pub monthly_recurring_revenue: i64,
    pub annual_recurring_revenue: i64,
    pub revenue_growth_rate: Option<f64>,
    pub monthly_burn_rate: Option<i64>,
    pub current_cash_runway: Option<i64>,
    pub projected_revenue_12_months: Option<i64>,
    pub profitability_timeline: String,
    pub investment_timeline: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevenueMetricsPatch {
    pub monthly_recurring_revenue: Option<i64>,
    pub annual_recurring_revenue: Option<i64>,
    pub revenue_growth_rate: Option<f64>,
    pub monthly_burn_rate: Option<i64>,
    pub current_cash_runway: Option<i64>,
    pub projected_revenue_12_months: Option<i64>,
    pub profitability_timeline: Option<String>,
    pub investment_timeline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueMetrics {
    pub id: Uuid,
    pub startup_profile_id: Uuid,
    #[serde(flatten)]
    pub metrics: RevenueMetricsInput,
}

/// Planned allocation of raised funds, in percent. Must total 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundUsageInput {
    pub product_development_percentage: f64,
    pub marketing_percentage: f64,
    pub team_expansion_percentage: f64,
    pub operations_percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct FundUsagePatch {
    pub product_development_percentage: Option<f64>,
    pub marketing_percentage: Option<f64>,
    pub team_expansion_percentage: Option<f64>,
    pub operations_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundUsage {
    pub id: Uuid,
    pub startup_profile_id: Uuid,
    #[serde(flatten)]
    pub allocation: FundUsageInput,
}

/// Company, business and funding fields of a startup profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupProfileFields {
    pub company_name: String,
    pub website_link: Option<String>,
    pub industry: String,
    pub company_description: String,
    pub founding_date: NaiveDate,
    pub team_size: i64,
    pub district: String,
    pub state: String,
    pub social_media_1: Option<String>,
    pub social_media_2: Option<String>,
    pub business_model_description: String,
    pub total_paying_customers: i64,
    pub monthly_customer_growth_rate: Option<f64>,
    pub customer_acquisition_cost: Option<f64>,
    pub customer_lifetime_value: Option<f64>,
    pub competitive_advantage: String,
    pub product_demo_video_link: String,
    pub pre_money_valuation: i64,
    pub amount_seeking: i64,
    pub investment_type: String,
    pub max_equity_percentage: f64,
    pub funding_stage: String,
    pub total_funding_raised: i64,
    pub last_round_amount: i64,
    pub last_round_date: NaiveDate,
    pub key_previous_investors: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStartupProfileRequest {
    #[serde(flatten)]
    pub fields: StartupProfileFields,
    pub founders: Vec<FounderInput>,
    pub revenue_metrics: RevenueMetricsInput,
    pub fund_usage: FundUsageInput,
}

/// Partial update. Absent fields are left untouched; `founders` replaces
/// the whole list when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStartupProfileRequest {
    pub company_name: Option<String>,
    pub website_link: Option<String>,
    pub industry: Option<String>,
    pub company_description: Option<String>,
    pub founding_date: Option<NaiveDate>,
    pub team_size: Option<i64>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub social_media_1: Option<String>,
    pub social_media_2: Option<String>,
    pub business_model_description: Option<String>,
    pub total_paying_customers: Option<i64>,
    pub monthly_customer_growth_rate: Option<f64>,
    pub customer_acquisition_cost: Option<f64>,
    pub customer_lifetime_value: Option<f64>,
    pub competitive_advantage: Option<String>,
    pub product_demo_video_link: Option<String>,
    pub pre_money_valuation: Option<i64>,
    pub amount_seeking: Option<i64>,
    pub investment_type: Option<String>,
    pub max_equity_percentage: Option<f64>,
    pub funding_stage: Option<String>,
    pub total_funding_raised: Option<i64>,
    pub last_round_amount: Option<i64>,
    pub last_round_date: Option<NaiveDate>,
    pub key_previous_investors: Option<String>,
    pub founders: Option<Vec<FounderInput>>,
    pub revenue_metrics: Option<RevenueMetricsPatch>,
    pub fund_usage: Option<FundUsagePatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: StartupProfileFields,
    pub pitch_deck_filename: Option<String>,
    pub pitch_deck_file_path: Option<String>,
    pub pitch_deck_file_size: Option<i64>,
    pub pitch_deck_content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub founders: Vec<Founder>,
    pub revenue_metrics: Option<RevenueMetrics>,
    pub fund_usage: Option<FundUsage>,
}

// -- Investor profiles --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorProfileFields {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub country: String,
    pub state: String,
    pub district: String,
    pub linkedin_profile: String,
    pub investor_type: String,
    pub firm_name: Option<String>,
    pub investment_experience: String,
    pub years_of_investment_experience: String,
    pub professional_background: Vec<String>,
    pub previous_experience: Option<String>,
    pub investment_stages: Vec<String>,
    pub check_size_range: String,
    pub geographic_focus: Vec<String>,
    pub industry_focus: Vec<String>,
    pub investment_philosophy: String,
    pub decision_timeline: String,
    pub number_of_portfolio_companies: Option<String>,
    pub notable_investments: Option<String>,
    pub successful_exits: Option<String>,
    pub post_investment_involvement: String,
    pub areas_of_expertise: Vec<String>,
    pub investment_thesis: Option<String>,
    pub additional_info: Option<String>,
    pub profile_visibility: String,
    pub contact_permissions: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvestorProfileRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub linkedin_profile: Option<String>,
    pub investor_type: Option<String>,
    pub firm_name: Option<String>,
    pub investment_experience: Option<String>,
    pub years_of_investment_experience: Option<String>,
    pub professional_background: Option<Vec<String>>,
    pub previous_experience: Option<String>,
    pub investment_stages: Option<Vec<String>>,
    pub check_size_range: Option<String>,
    pub geographic_focus: Option<Vec<String>>,
    pub industry_focus: Option<Vec<String>>,
    pub investment_philosophy: Option<String>,
    pub decision_timeline: Option<String>,
    pub number_of_portfolio_companies: Option<String>,
    pub notable_investments: Option<String>,
    pub successful_exits: Option<String>,
    pub post_investment_involvement: Option<String>,
    pub areas_of_expertise: Option<Vec<String>>,
    pub investment_thesis: Option<String>,
    pub additional_info: Option<String>,
    pub profile_visibility: Option<String>,
    pub contact_permissions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: InvestorProfileFields,
    pub profile_photo_filename: Option<String>,
    pub profile_photo_file_path: Option<String>,
    pub profile_photo_file_size: Option<i64>,
    pub profile_photo_content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Uploads --

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub content_type: String,
}

// -- Applications --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendPitchDeckRequest {
    pub investor_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub startup_id: Uuid,
    pub investor_id: Uuid,
    pub pitch_deck_filename: Option<String>,
    pub pitch_deck_file_path: Option<String>,
    pub status: ApplicationStatus,
    pub log: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub startup_name: Option<String>,
    pub investor_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationLogResponse {
    pub id: Uuid,
    pub application_id: Uuid,
    pub action: String,
    pub actor_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInterestRequest {
    pub startup_id: Uuid,
    pub status: InterestLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestStatusResponse {
    pub id: Uuid,
    pub startup_id: Uuid,
    pub investor_id: Uuid,
    pub status: InterestLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub startup_name: Option<String>,
    pub investor_name: Option<String>,
}
