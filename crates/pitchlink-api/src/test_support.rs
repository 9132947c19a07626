use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::Connection;

use pitchlink_db::queries::{investors, startups, users};
use pitchlink_types::api::{FundUsageInput, InvestorProfileFields, StartupProfileFields};

use crate::mailer::Mailer;

pub const NOW: &str = "2025-06-01 10:00:00";

/// Captures every code instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn last_code(&self) -> String {
        self.sent.lock().unwrap().last().unwrap().1.clone()
    }
}

impl Mailer for RecordingMailer {
    fn send_otp(&self, to: &str, code: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((to.to_string(), code.to_string()));
        Ok(())
    }
}

pub fn startup_fields(company_name: &str) -> StartupProfileFields {
    StartupProfileFields {
        company_name: company_name.to_string(),
        website_link: None,
        industry: "Fintech".into(),
        company_description: "Payments for small merchants".into(),
        founding_date: NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(),
        team_size: 12,
        district: "Central".into(),
        state: "Karnataka".into(),
        social_media_1: None,
        social_media_2: None,
        business_model_description: "Per-transaction fee".into(),
        total_paying_customers: 340,
        monthly_customer_growth_rate: None,
        customer_acquisition_cost: None,
        customer_lifetime_value: None,
        competitive_advantage: "Offline-first terminals".into(),
        product_demo_video_link: "https://video.example.com/demo".into(),
        pre_money_valuation: 4_000_000,
        amount_seeking: 750_000,
        investment_type: "Equity".into(),
        max_equity_percentage: 15.0,
        funding_stage: "Seed".into(),
        total_funding_raised: 250_000,
        last_round_amount: 250_000,
        last_round_date: NaiveDate::from_ymd_opt(2023, 9, 15).unwrap(),
        key_previous_investors: "Angel syndicate".into(),
    }
}

pub fn investor_fields(full_name: &str) -> InvestorProfileFields {
    InvestorProfileFields {
        full_name: full_name.to_string(),
        email: "ivy@fund.example".into(),
        phone_number: None,
        country: "India".into(),
        state: "Maharashtra".into(),
        district: "Mumbai".into(),
        linkedin_profile: "https://linkedin.com/in/ivy".into(),
        investor_type: "Angel".into(),
        firm_name: None,
        investment_experience: "Experienced".into(),
        years_of_investment_experience: "5-10".into(),
        professional_background: vec!["Operator".into()],
        previous_experience: None,
        investment_stages: vec!["Seed".into()],
        check_size_range: "25k-100k".into(),
        geographic_focus: vec!["South Asia".into()],
        industry_focus: vec!["Fintech".into()],
        investment_philosophy: "Back founders early".into(),
        decision_timeline: "2-4 weeks".into(),
        number_of_portfolio_companies: None,
        notable_investments: None,
        successful_exits: None,
        post_investment_involvement: "Advisory".into(),
        areas_of_expertise: vec!["Go-to-market".into()],
        investment_thesis: None,
        additional_info: None,
        profile_visibility: "public".into(),
        contact_permissions: "all".into(),
    }
}

pub fn even_split() -> FundUsageInput {
    FundUsageInput {
        product_development_percentage: 25.0,
        marketing_percentage: 25.0,
        team_expansion_percentage: 25.0,
        operations_percentage: 25.0,
    }
}

pub fn user(conn: &Connection, id: &str, role: &str) {
    users::insert(conn, id, &format!("{id}@example.com"), role, "hash", NOW).unwrap();
}

pub fn startup_with_profile(conn: &Connection, user_id: &str, company_name: &str) {
    user(conn, user_id, "startup");
    startups::insert_profile(conn, &uuid::Uuid::new_v4().to_string(), user_id, &startup_fields(company_name), NOW)
        .unwrap();
}

pub fn investor_with_profile(conn: &Connection, user_id: &str, full_name: &str) {
    user(conn, user_id, "investor");
    investors::insert(conn, &uuid::Uuid::new_v4().to_string(), user_id, &investor_fields(full_name), NOW).unwrap();
}
