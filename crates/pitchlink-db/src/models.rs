/// Database row types. These map directly to SQLite rows.
/// Distinct from pitchlink-types API models to keep the DB layer independent;
/// the one mapping from each row to its wire shape lives in `convert`.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub role: String,
    pub password: String,
    pub is_verified: bool,
    pub profile_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct OtpRow {
    pub id: String,
    pub email: String,
    pub code: String,
    pub expires_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct StartupProfileRow {
    pub id: String,
    pub user_id: String,
    pub company_name: String,
    pub website_link: Option<String>,
    pub industry: String,
    pub company_description: String,
    pub founding_date: String,
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
    pub pitch_deck_filename: Option<String>,
    pub pitch_deck_file_path: Option<String>,
    pub pitch_deck_file_size: Option<i64>,
    pub pitch_deck_content_type: Option<String>,
    pub product_demo_video_link: String,
    pub pre_money_valuation: i64,
    pub amount_seeking: i64,
    pub investment_type: String,
    pub max_equity_percentage: f64,
    pub funding_stage: String,
    pub total_funding_raised: i64,
    pub last_round_amount: i64,
    pub last_round_date: String,
    pub key_previous_investors: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct FounderRow {
    pub id: String,
    pub startup_profile_id: String,
    pub name: String,
    pub educational_qualification: String,
    pub previous_work_experience: String,
    pub linkedin_profile: String,
    pub photo_url: String,
}

#[derive(Debug, Clone)]
pub struct RevenueMetricsRow {
    pub id: String,
    pub startup_profile_id: String,
    pub monthly_recurring_revenue: i64,
    pub annual_recurring_revenue: i64,
    pub revenue_growth_rate: Option<f64>,
    pub monthly_burn_rate: Option<i64>,
    pub current_cash_runway: Option<i64>,
    pub projected_revenue_12_months: Option<i64>,
    pub profitability_timeline: String,
    pub investment_timeline: String,
}

#[derive(Debug, Clone)]
pub struct FundUsageRow {
    pub id: String,
    pub startup_profile_id: String,
    pub product_development_percentage: f64,
    pub marketing_percentage: f64,
    pub team_expansion_percentage: f64,
    pub operations_percentage: f64,
}

/// A startup profile with its child rows loaded.
#[derive(Debug, Clone)]
pub struct StartupAggregate {
    pub profile: StartupProfileRow,
    pub founders: Vec<FounderRow>,
    pub revenue_metrics: Option<RevenueMetricsRow>,
    pub fund_usage: Option<FundUsageRow>,
}

/// Multi-select columns hold JSON arrays as text.
#[derive(Debug, Clone)]
pub struct InvestorProfileRow {
    pub id: String,
    pub user_id: String,
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
    pub professional_background: String,
    pub previous_experience: Option<String>,
    pub investment_stages: String,
    pub check_size_range: String,
    pub geographic_focus: String,
    pub industry_focus: String,
    pub investment_philosophy: String,
    pub decision_timeline: String,
    pub number_of_portfolio_companies: Option<String>,
    pub notable_investments: Option<String>,
    pub successful_exits: Option<String>,
    pub post_investment_involvement: String,
    pub areas_of_expertise: String,
    pub investment_thesis: Option<String>,
    pub additional_info: Option<String>,
    pub profile_visibility: String,
    pub contact_permissions: String,
    pub profile_photo_filename: Option<String>,
    pub profile_photo_file_path: Option<String>,
    pub profile_photo_file_size: Option<i64>,
    pub profile_photo_content_type: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Application row joined with both parties' display names.
#[derive(Debug, Clone)]
pub struct ApplicationRow {
    pub id: String,
    pub startup_id: String,
    pub investor_id: String,
    pub pitch_deck_filename: Option<String>,
    pub pitch_deck_file_path: Option<String>,
    pub status: String,
    pub sent_at: String,
    pub updated_at: String,
    pub log: Option<String>,
    pub startup_name: Option<String>,
    pub investor_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApplicationLogRow {
    pub id: String,
    pub application_id: String,
    pub action: String,
    pub actor_id: String,
    pub timestamp: String,
    pub details: Option<String>,
}

/// Interest row joined with both parties' display names.
#[derive(Debug, Clone)]
pub struct InterestRow {
    pub id: String,
    pub startup_id: String,
    pub investor_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub startup_name: Option<String>,
    pub investor_name: Option<String>,
}

/// Reference to a file written by the storage layer.
#[derive(Debug, Clone)]
pub struct FileRef {
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub content_type: String,
}
