use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{Connection, Row, named_params};
use uuid::Uuid;

use pitchlink_types::api::{FounderInput, FundUsageInput, RevenueMetricsInput, StartupProfileFields};

use super::OptionalExt;
use crate::models::{FileRef, FounderRow, FundUsageRow, RevenueMetricsRow, StartupAggregate, StartupProfileRow};

const PROFILE_COLUMNS: &str = "id, user_id, company_name, website_link, industry, company_description,
    founding_date, team_size, district, state, social_media_1, social_media_2,
    business_model_description, total_paying_customers, monthly_customer_growth_rate,
    customer_acquisition_cost, customer_lifetime_value, competitive_advantage,
    pitch_deck_filename, pitch_deck_file_path, pitch_deck_file_size, pitch_deck_content_type,
    product_demo_video_link, pre_money_valuation, amount_seeking, investment_type,
    max_equity_percentage, funding_stage, total_funding_raised, last_round_amount,
    last_round_date, key_previous_investors, created_at, updated_at";

pub fn insert_profile(
    conn: &Connection,
    id: &str,
    user_id: &str,
    fields: &StartupProfileFields,
    now: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO startup_profiles (
            id, user_id, company_name, website_link, industry, company_description,
            founding_date, team_size, district, state, social_media_1, social_media_2,
            business_model_description, total_paying_customers, monthly_customer_growth_rate,
            customer_acquisition_cost, customer_lifetime_value, competitive_advantage,
            product_demo_video_link, pre_money_valuation, amount_seeking, investment_type,
            max_equity_percentage, funding_stage, total_funding_raised, last_round_amount,
            last_round_date, key_previous_investors, created_at, updated_at
        ) VALUES (
            :id, :user_id, :company_name, :website_link, :industry, :company_description,
            :founding_date, :team_size, :district, :state, :social_media_1, :social_media_2,
            :business_model_description, :total_paying_customers, :monthly_customer_growth_rate,
            :customer_acquisition_cost, :customer_lifetime_value, :competitive_advantage,
            :product_demo_video_link, :pre_money_valuation, :amount_seeking, :investment_type,
            :max_equity_percentage, :funding_stage, :total_funding_raised, :last_round_amount,
            :last_round_date, :key_previous_investors, :now, :now
        )",
        named_params! {
            ":id": id,
            ":user_id": user_id,
            ":company_name": fields.company_name,
            ":website_link": fields.website_link,
            ":industry": fields.industry,
            ":company_description": fields.company_description,
            ":founding_date": fields.founding_date.to_string(),
            ":team_size": fields.team_size,
            ":district": fields.district,
            ":state": fields.state,
            ":social_media_1": fields.social_media_1,
            ":social_media_2": fields.social_media_2,
            ":business_model_description": fields.business_model_description,
            ":total_paying_customers": fields.total_paying_customers,
            ":monthly_customer_growth_rate": fields.monthly_customer_growth_rate,
            ":customer_acquisition_cost": fields.customer_acquisition_cost,
            ":customer_lifetime_value": fields.customer_lifetime_value,
            ":competitive_advantage": fields.competitive_advantage,
            ":product_demo_video_link": fields.product_demo_video_link,
            ":pre_money_valuation": fields.pre_money_valuation,
            ":amount_seeking": fields.amount_seeking,
            ":investment_type": fields.investment_type,
            ":max_equity_percentage": fields.max_equity_percentage,
            ":funding_stage": fields.funding_stage,
            ":total_funding_raised": fields.total_funding_raised,
            ":last_round_amount": fields.last_round_amount,
            ":last_round_date": fields.last_round_date.to_string(),
            ":key_previous_investors": fields.key_previous_investors,
            ":now": now,
        },
    )?;
    Ok(())
}

pub fn update_fields(conn: &Connection, id: &str, fields: &StartupProfileFields, now: &str) -> Result<()> {
    conn.execute(
        "UPDATE startup_profiles SET
            company_name = :company_name, website_link = :website_link, industry = :industry,
            company_description = :company_description, founding_date = :founding_date,
            team_size = :team_size, district = :district, state = :state,
            social_media_1 = :social_media_1, social_media_2 = :social_media_2,
            business_model_description = :business_model_description,
            total_paying_customers = :total_paying_customers,
            monthly_customer_growth_rate = :monthly_customer_growth_rate,
            customer_acquisition_cost = :customer_acquisition_cost,
            customer_lifetime_value = :customer_lifetime_value,
            competitive_advantage = :competitive_advantage,
            product_demo_video_link = :product_demo_video_link,
            pre_money_valuation = :pre_money_valuation, amount_seeking = :amount_seeking,
            investment_type = :investment_type, max_equity_percentage = :max_equity_percentage,
            funding_stage = :funding_stage, total_funding_raised = :total_funding_raised,
            last_round_amount = :last_round_amount, last_round_date = :last_round_date,
            key_previous_investors = :key_previous_investors, updated_at = :now
         WHERE id = :id",
        named_params! {
            ":id": id,
            ":company_name": fields.company_name,
            ":website_link": fields.website_link,
            ":industry": fields.industry,
            ":company_description": fields.company_description,
            ":founding_date": fields.founding_date.to_string(),
            ":team_size": fields.team_size,
            ":district": fields.district,
            ":state": fields.state,
            ":social_media_1": fields.social_media_1,
            ":social_media_2": fields.social_media_2,
            ":business_model_description": fields.business_model_description,
            ":total_paying_customers": fields.total_paying_customers,
            ":monthly_customer_growth_rate": fields.monthly_customer_growth_rate,
            ":customer_acquisition_cost": fields.customer_acquisition_cost,
            ":customer_lifetime_value": fields.customer_lifetime_value,
            ":competitive_advantage": fields.competitive_advantage,
            ":product_demo_video_link": fields.product_demo_video_link,
            ":pre_money_valuation": fields.pre_money_valuation,
            ":amount_seeking": fields.amount_seeking,
            ":investment_type": fields.investment_type,
            ":max_equity_percentage": fields.max_equity_percentage,
            ":funding_stage": fields.funding_stage,
            ":total_funding_raised": fields.total_funding_raised,
            ":last_round_amount": fields.last_round_amount,
            ":last_round_date": fields.last_round_date.to_string(),
            ":key_previous_investors": fields.key_previous_investors,
            ":now": now,
        },
    )?;
    Ok(())
}

/// Replace the founder list wholesale, preserving the given order.
pub fn replace_founders(conn: &Connection, profile_id: &str, founders: &[FounderInput]) -> Result<()> {
    conn.execute("DELETE FROM founders WHERE startup_profile_id = ?1", [profile_id])?;

    let mut stmt = conn.prepare(
        "INSERT INTO founders (id, startup_profile_id, name, educational_qualification,
            previous_work_experience, linkedin_profile, photo_url, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for (position, founder) in founders.iter().enumerate() {
        stmt.execute(rusqlite::params![
            Uuid::new_v4().to_string(),
            profile_id,
            founder.name,
            founder.educational_qualification,
            founder.previous_work_experience,
            founder.linkedin_profile,
            founder.photo_url,
            position as i64,
        ])?;
    }
    Ok(())
}

pub fn upsert_revenue_metrics(conn: &Connection, profile_id: &str, metrics: &RevenueMetricsInput) -> Result<()> {
    conn.execute(
        "INSERT INTO startup_revenue_metrics (
            id, startup_profile_id, monthly_recurring_revenue, annual_recurring_revenue,
            revenue_growth_rate, monthly_burn_rate, current_cash_runway,
            projected_revenue_12_months, profitability_timeline, investment_timeline
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(startup_profile_id) DO UPDATE SET
            monthly_recurring_revenue = excluded.monthly_recurring_revenue,
            annual_recurring_revenue = excluded.annual_recurring_revenue,
            revenue_growth_rate = excluded.revenue_growth_rate,
            monthly_burn_rate = excluded.monthly_burn_rate,
            current_cash_runway = excluded.current_cash_runway,
            projected_revenue_12_months = excluded.projected_revenue_12_months,
            profitability_timeline = excluded.profitability_timeline,
            investment_timeline = excluded.investment_timeline",
        rusqlite::params![
            Uuid::new_v4().to_string(),
            profile_id,
            metrics.monthly_recurring_revenue,
            metrics.annual_recurring_revenue,
            metrics.revenue_growth_rate,
            metrics.monthly_burn_rate,
            metrics.current_cash_runway,
            metrics.projected_revenue_12_months,
            metrics.profitability_timeline,
            metrics.investment_timeline,
        ],
    )?;
    Ok(())
}

pub fn upsert_fund_usage(conn: &Connection, profile_id: &str, usage: &FundUsageInput) -> Result<()> {
    conn.execute(
        "INSERT INTO fund_usage (
            id, startup_profile_id, product_development_percentage, marketing_percentage,
            team_expansion_percentage, operations_percentage
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(startup_profile_id) DO UPDATE SET
            product_development_percentage = excluded.product_development_percentage,
            marketing_percentage = excluded.marketing_percentage,
            team_expansion_percentage = excluded.team_expansion_percentage,
            operations_percentage = excluded.operations_percentage",
        rusqlite::params![
            Uuid::new_v4().to_string(),
            profile_id,
            usage.product_development_percentage,
            usage.marketing_percentage,
            usage.team_expansion_percentage,
            usage.operations_percentage,
        ],
    )?;
    Ok(())
}

pub fn set_pitch_deck(conn: &Connection, id: &str, file: &FileRef, now: &str) -> Result<()> {
    conn.execute(
        "UPDATE startup_profiles SET
            pitch_deck_filename = ?2, pitch_deck_file_path = ?3,
            pitch_deck_file_size = ?4, pitch_deck_content_type = ?5, updated_at = ?6
         WHERE id = ?1",
        rusqlite::params![id, file.filename, file.file_path, file.file_size, file.content_type, now],
    )?;
    Ok(())
}

pub fn by_user_id(conn: &Connection, user_id: &str) -> Result<Option<StartupProfileRow>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM startup_profiles WHERE user_id = ?1");
    conn.query_row(&sql, [user_id], map_profile).optional()
}

pub fn aggregate_by_user_id(conn: &Connection, user_id: &str) -> Result<Option<StartupAggregate>> {
    let Some(profile) = by_user_id(conn, user_id)? else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT id, startup_profile_id, name, educational_qualification, previous_work_experience,
                linkedin_profile, photo_url
         FROM founders WHERE startup_profile_id = ?1 ORDER BY position",
    )?;
    let founders = stmt
        .query_map([&profile.id], map_founder)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let revenue_metrics = conn
        .query_row(
            "SELECT id, startup_profile_id, monthly_recurring_revenue, annual_recurring_revenue,
                    revenue_growth_rate, monthly_burn_rate, current_cash_runway,
                    projected_revenue_12_months, profitability_timeline, investment_timeline
             FROM startup_revenue_metrics WHERE startup_profile_id = ?1",
            [&profile.id],
            map_revenue_metrics,
        )
        .optional()?;

    let fund_usage = conn
        .query_row(
            "SELECT id, startup_profile_id, product_development_percentage, marketing_percentage,
                    team_expansion_percentage, operations_percentage
             FROM fund_usage WHERE startup_profile_id = ?1",
            [&profile.id],
            map_fund_usage,
        )
        .optional()?;

    Ok(Some(StartupAggregate {
        profile,
        founders,
        revenue_metrics,
        fund_usage,
    }))
}

/// Every profile with its children, batch-loaded (one query per table).
pub fn list_aggregates(conn: &Connection) -> Result<Vec<StartupAggregate>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM startup_profiles ORDER BY created_at, id");
    let mut stmt = conn.prepare(&sql)?;
    let profiles = stmt
        .query_map([], map_profile)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut founders: HashMap<String, Vec<FounderRow>> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT id, startup_profile_id, name, educational_qualification, previous_work_experience,
                linkedin_profile, photo_url
         FROM founders ORDER BY startup_profile_id, position",
    )?;
    for founder in stmt.query_map([], map_founder)? {
        let founder = founder?;
        founders.entry(founder.startup_profile_id.clone()).or_default().push(founder);
    }

    let mut metrics: HashMap<String, RevenueMetricsRow> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT id, startup_profile_id, monthly_recurring_revenue, annual_recurring_revenue,
                revenue_growth_rate, monthly_burn_rate, current_cash_runway,
                projected_revenue_12_months, profitability_timeline, investment_timeline
         FROM startup_revenue_metrics",
    )?;
    for row in stmt.query_map([], map_revenue_metrics)? {
        let row = row?;
        metrics.insert(row.startup_profile_id.clone(), row);
    }

    let mut usage: HashMap<String, FundUsageRow> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT id, startup_profile_id, product_development_percentage, marketing_percentage,
                team_expansion_percentage, operations_percentage
         FROM fund_usage",
    )?;
    for row in stmt.query_map([], map_fund_usage)? {
        let row = row?;
        usage.insert(row.startup_profile_id.clone(), row);
    }

    Ok(profiles
        .into_iter()
        .map(|profile| StartupAggregate {
            founders: founders.remove(&profile.id).unwrap_or_default(),
            revenue_metrics: metrics.remove(&profile.id),
            fund_usage: usage.remove(&profile.id),
            profile,
        })
        .collect())
}

fn map_profile(row: &Row<'_>) -> rusqlite::Result<StartupProfileRow> {
    Ok(StartupProfileRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        company_name: row.get(2)?,
        website_link: row.get(3)?,
        industry: row.get(4)?,
        company_description: row.get(5)?,
        founding_date: row.get(6)?,
        team_size: row.get(7)?,
        district: row.get(8)?,
        state: row.get(9)?,
        social_media_1: row.get(10)?,
        social_media_2: row.get(11)?,
        business_model_description: row.get(12)?,
        total_paying_customers: row.get(13)?,
        monthly_customer_growth_rate: row.get(14)?,
        customer_acquisition_cost: row.get(15)?,
        customer_lifetime_value: row.get(16)?,
        competitive_advantage: row.get(17)?,
        pitch_deck_filename: row.get(18)?,
        pitch_deck_file_path: row.get(19)?,
        pitch_deck_file_size: row.get(20)?,
        pitch_deck_content_type: row.get(21)?,
        product_demo_video_link: row.get(22)?,
        pre_money_valuation: row.get(23)?,
        amount_seeking: row.get(24)?,
        investment_type: row.get(25)?,
        max_equity_percentage: row.get(26)?,
        funding_stage: row.get(27)?,
        total_funding_raised: row.get(28)?,
        last_round_amount: row.get(29)?,
        last_round_date: row.get(30)?,
        key_previous_investors: row.get(31)?,
        created_at: row.get(32)?,
        updated_at: row.get(33)?,
    })
}

fn map_founder(row: &Row<'_>) -> rusqlite::Result<FounderRow> {
    Ok(FounderRow {
        id: row.get(0)?,
        startup_profile_id: row.get(1)?,
        name: row.get(2)?,
        educational_qualification: row.get(3)?,
        previous_work_experience: row.get(4)?,
        linkedin_profile: row.get(5)?,
        photo_url: row.get(6)?,
    })
}

fn map_revenue_metrics(row: &Row<'_>) -> rusqlite::Result<RevenueMetricsRow> {
    Ok(RevenueMetricsRow {
        id: row.get(0)?,
        startup_profile_id: row.get(1)?,
        monthly_recurring_revenue: row.get(2)?,
        annual_recurring_revenue: row.get(3)?,
        revenue_growth_rate: row.get(4)?,
        monthly_burn_rate: row.get(5)?,
        current_cash_runway: row.get(6)?,
        projected_revenue_12_months: row.get(7)?,
        profitability_timeline: row.get(8)?,
        investment_timeline: row.get(9)?,
    })
}

fn map_fund_usage(row: &Row<'_>) -> rusqlite::Result<FundUsageRow> {
    Ok(FundUsageRow {
        id: row.get(0)?,
        startup_profile_id: row.get(1)?,
        product_development_percentage: row.get(2)?,
        marketing_percentage: row.get(3)?,
        team_expansion_percentage: row.get(4)?,
        operations_percentage: row.get(5)?,
    })
}
