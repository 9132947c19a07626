//! Row → wire conversions. Stored values that fail to parse are logged and
//! replaced with a default rather than failing the whole request.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;
use uuid::Uuid;

use pitchlink_types::api::{
    ApplicationLogResponse, ApplicationResponse, Founder, FounderInput, FundUsage, FundUsageInput,
    InterestStatusResponse, InvestorProfileFields, InvestorProfileResponse, RevenueMetrics,
    RevenueMetricsInput, StartupProfileFields, StartupProfileResponse, UserResponse,
};
use pitchlink_types::models::{ApplicationStatus, InterestLevel, Role};

use crate::models::{
    ApplicationLogRow, ApplicationRow, FounderRow, FundUsageRow, InterestRow, InvestorProfileRow,
    RevenueMetricsRow, StartupAggregate, UserRow,
};

fn uuid(raw: &str, what: &str, owner: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on '{}': {}", what, raw, owner, e);
        Uuid::default()
    })
}

fn ts(raw: &str, what: &str, owner: &str) -> DateTime<Utc> {
    crate::parse_timestamp(raw).unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on '{}': {}", what, raw, owner, e);
        DateTime::default()
    })
}

fn date(raw: &str, what: &str, owner: &str) -> NaiveDate {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on '{}': {}", what, raw, owner, e);
        NaiveDate::default()
    })
}

/// Decode a multi-select column. Anything that is not a JSON array of
/// strings reads back as an empty list.
pub fn parse_multi_select(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Malformed multi-select value '{}': {}", raw, e);
        Vec::new()
    })
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        let role = row.role.parse().unwrap_or_else(|e| {
            warn!("{} on user '{}'", e, row.id);
            Role::Startup
        });
        UserResponse {
            id: uuid(&row.id, "id", &row.id),
            created_at: ts(&row.created_at, "created_at", &row.id),
            email: row.email,
            role,
            is_verified: row.is_verified,
            profile_completed: row.profile_completed,
        }
    }
}

impl From<FounderRow> for Founder {
    fn from(row: FounderRow) -> Self {
        Founder {
            id: uuid(&row.id, "id", &row.id),
            startup_profile_id: uuid(&row.startup_profile_id, "startup_profile_id", &row.id),
            details: FounderInput {
                name: row.name,
                educational_qualification: row.educational_qualification,
                previous_work_experience: row.previous_work_experience,
                linkedin_profile: row.linkedin_profile,
                photo_url: row.photo_url,
            },
        }
    }
}

impl From<RevenueMetricsRow> for RevenueMetrics {
    fn from(row: RevenueMetricsRow) -> Self {
        RevenueMetrics {
            id: uuid(&row.id, "id", &row.id),
            startup_profile_id: uuid(&row.startup_profile_id, "startup_profile_id", &row.id),
            metrics: RevenueMetricsInput {
                monthly_recurring_revenue: row.monthly_recurring_revenue,
                annual_recurring_revenue: row.annual_recurring_revenue,
                revenue_growth_rate: row.revenue_growth_rate,
                monthly_burn_rate: row.monthly_burn_rate,
                current_cash_runway: row.current_cash_runway,
                projected_revenue_12_months: row.projected_revenue_12_months,
                profitability_timeline: row.profitability_timeline,
                investment_timeline: row.investment_timeline,
            },
        }
    }
}

impl From<FundUsageRow> for FundUsage {
    fn from(row: FundUsageRow) -> Self {
        FundUsage {
            id: uuid(&row.id, "id", &row.id),
            startup_profile_id: uuid(&row.startup_profile_id, "startup_profile_id", &row.id),
            allocation: FundUsageInput {
                product_development_percentage: row.product_development_percentage,
                marketing_percentage: row.marketing_percentage,
                team_expansion_percentage: row.team_expansion_percentage,
                operations_percentage: row.operations_percentage,
            },
        }
    }
}

impl From<StartupAggregate> for StartupProfileResponse {
    fn from(agg: StartupAggregate) -> Self {
        let p = agg.profile;
        StartupProfileResponse {
            id: uuid(&p.id, "id", &p.id),
            user_id: uuid(&p.user_id, "user_id", &p.id),
            created_at: ts(&p.created_at, "created_at", &p.id),
            updated_at: ts(&p.updated_at, "updated_at", &p.id),
            fields: StartupProfileFields {
                founding_date: date(&p.founding_date, "founding_date", &p.id),
                last_round_date: date(&p.last_round_date, "last_round_date", &p.id),
                company_name: p.company_name,
                website_link: p.website_link,
                industry: p.industry,
                company_description: p.company_description,
                team_size: p.team_size,
                district: p.district,
                state: p.state,
                social_media_1: p.social_media_1,
                social_media_2: p.social_media_2,
                business_model_description: p.business_model_description,
                total_paying_customers: p.total_paying_customers,
                monthly_customer_growth_rate: p.monthly_customer_growth_rate,
                customer_acquisition_cost: p.customer_acquisition_cost,
                customer_lifetime_value: p.customer_lifetime_value,
                competitive_advantage: p.competitive_advantage,
                product_demo_video_link: p.product_demo_video_link,
                pre_money_valuation: p.pre_money_valuation,
                amount_seeking: p.amount_seeking,
                investment_type: p.investment_type,
                max_equity_percentage: p.max_equity_percentage,
                funding_stage: p.funding_stage,
                total_funding_raised: p.total_funding_raised,
                last_round_amount: p.last_round_amount,
                key_previous_investors: p.key_previous_investors,
            },
            pitch_deck_filename: p.pitch_deck_filename,
            pitch_deck_file_path: p.pitch_deck_file_path,
            pitch_deck_file_size: p.pitch_deck_file_size,
            pitch_deck_content_type: p.pitch_deck_content_type,
            founders: agg.founders.into_iter().map(Founder::from).collect(),
            revenue_metrics: agg.revenue_metrics.map(RevenueMetrics::from),
            fund_usage: agg.fund_usage.map(FundUsage::from),
        }
    }
}

impl From<InvestorProfileRow> for InvestorProfileResponse {
    fn from(row: InvestorProfileRow) -> Self {
        InvestorProfileResponse {
            id: uuid(&row.id, "id", &row.id),
            user_id: uuid(&row.user_id, "user_id", &row.id),
            created_at: ts(&row.created_at, "created_at", &row.id),
            updated_at: ts(&row.updated_at, "updated_at", &row.id),
            fields: investor_fields(&row),
            profile_photo_filename: row.profile_photo_filename,
            profile_photo_file_path: row.profile_photo_file_path,
            profile_photo_file_size: row.profile_photo_file_size,
            profile_photo_content_type: row.profile_photo_content_type,
        }
    }
}

/// The editable part of an investor row, with multi-select columns decoded.
pub fn investor_fields(row: &InvestorProfileRow) -> InvestorProfileFields {
    InvestorProfileFields {
        full_name: row.full_name.clone(),
        email: row.email.clone(),
        phone_number: row.phone_number.clone(),
        country: row.country.clone(),
        state: row.state.clone(),
        district: row.district.clone(),
        linkedin_profile: row.linkedin_profile.clone(),
        investor_type: row.investor_type.clone(),
        firm_name: row.firm_name.clone(),
        investment_experience: row.investment_experience.clone(),
        years_of_investment_experience: row.years_of_investment_experience.clone(),
        professional_background: parse_multi_select(&row.professional_background),
        previous_experience: row.previous_experience.clone(),
        investment_stages: parse_multi_select(&row.investment_stages),
        check_size_range: row.check_size_range.clone(),
        geographic_focus: parse_multi_select(&row.geographic_focus),
        industry_focus: parse_multi_select(&row.industry_focus),
        investment_philosophy: row.investment_philosophy.clone(),
        decision_timeline: row.decision_timeline.clone(),
        number_of_portfolio_companies: row.number_of_portfolio_companies.clone(),
        notable_investments: row.notable_investments.clone(),
        successful_exits: row.successful_exits.clone(),
        post_investment_involvement: row.post_investment_involvement.clone(),
        areas_of_expertise: parse_multi_select(&row.areas_of_expertise),
        investment_thesis: row.investment_thesis.clone(),
        additional_info: row.additional_info.clone(),
        profile_visibility: row.profile_visibility.clone(),
        contact_permissions: row.contact_permissions.clone(),
    }
}

impl From<ApplicationRow> for ApplicationResponse {
    fn from(row: ApplicationRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            warn!("{} on application '{}'", e, row.id);
            ApplicationStatus::Sent
        });
        ApplicationResponse {
            id: uuid(&row.id, "id", &row.id),
            startup_id: uuid(&row.startup_id, "startup_id", &row.id),
            investor_id: uuid(&row.investor_id, "investor_id", &row.id),
            sent_at: ts(&row.sent_at, "sent_at", &row.id),
            updated_at: ts(&row.updated_at, "updated_at", &row.id),
            pitch_deck_filename: row.pitch_deck_filename,
            pitch_deck_file_path: row.pitch_deck_file_path,
            status,
            log: row.log,
            startup_name: row.startup_name,
            investor_name: row.investor_name,
        }
    }
}

impl From<ApplicationLogRow> for ApplicationLogResponse {
    fn from(row: ApplicationLogRow) -> Self {
        ApplicationLogResponse {
            id: uuid(&row.id, "id", &row.id),
            application_id: uuid(&row.application_id, "application_id", &row.id),
            actor_id: uuid(&row.actor_id, "actor_id", &row.id),
            timestamp: ts(&row.timestamp, "timestamp", &row.id),
            action: row.action,
            details: row.details,
        }
    }
}

impl From<InterestRow> for InterestStatusResponse {
    fn from(row: InterestRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            warn!("{} on interest record '{}'", e, row.id);
            InterestLevel::NotInterested
        });
        InterestStatusResponse {
            id: uuid(&row.id, "id", &row.id),
            startup_id: uuid(&row.startup_id, "startup_id", &row.id),
            investor_id: uuid(&row.investor_id, "investor_id", &row.id),
            created_at: ts(&row.created_at, "created_at", &row.id),
            updated_at: ts(&row.updated_at, "updated_at", &row.id),
            status,
            startup_name: row.startup_name,
            investor_name: row.investor_name,
        }
    }
}
