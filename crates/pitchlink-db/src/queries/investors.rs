use anyhow::Result;
use rusqlite::{Connection, Row, named_params};

use pitchlink_types::api::InvestorProfileFields;

use super::OptionalExt;
use crate::models::{FileRef, InvestorProfileRow};

const PROFILE_COLUMNS: &str = "id, user_id, full_name, email, phone_number, country, state, district,
    linkedin_profile, investor_type, firm_name, investment_experience,
    years_of_investment_experience, professional_background, previous_experience,
    investment_stages, check_size_range, geographic_focus, industry_focus,
    investment_philosophy, decision_timeline, number_of_portfolio_companies,
    notable_investments, successful_exits, post_investment_involvement, areas_of_expertise,
    investment_thesis, additional_info, profile_visibility, contact_permissions,
    profile_photo_filename, profile_photo_file_path, profile_photo_file_size,
    profile_photo_content_type, created_at, updated_at";

/// Multi-select lists serialize as JSON arrays.
struct EncodedLists {
    professional_background: String,
    investment_stages: String,
    geographic_focus: String,
    industry_focus: String,
    areas_of_expertise: String,
}

impl EncodedLists {
    fn encode(fields: &InvestorProfileFields) -> Result<Self> {
        Ok(Self {
            professional_background: serde_json::to_string(&fields.professional_background)?,
            investment_stages: serde_json::to_string(&fields.investment_stages)?,
            geographic_focus: serde_json::to_string(&fields.geographic_focus)?,
            industry_focus: serde_json::to_string(&fields.industry_focus)?,
            areas_of_expertise: serde_json::to_string(&fields.areas_of_expertise)?,
        })
    }
}

pub fn insert(conn: &Connection, id: &str, user_id: &str, fields: &InvestorProfileFields, now: &str) -> Result<()> {
    let lists = EncodedLists::encode(fields)?;
    conn.execute(
        "INSERT INTO investor_profiles (
            id, user_id, full_name, email, phone_number, country, state, district,
            linkedin_profile, investor_type, firm_name, investment_experience,
            years_of_investment_experience, professional_background, previous_experience,
            investment_stages, check_size_range, geographic_focus, industry_focus,
            investment_philosophy, decision_timeline, number_of_portfolio_companies,
            notable_investments, successful_exits, post_investment_involvement, areas_of_expertise,
            investment_thesis, additional_info, profile_visibility, contact_permissions,
            created_at, updated_at
        ) VALUES (
            :id, :user_id, :full_name, :email, :phone_number, :country, :state, :district,
            :linkedin_profile, :investor_type, :firm_name, :investment_experience,
            :years_of_investment_experience, :professional_background, :previous_experience,
            :investment_stages, :check_size_range, :geographic_focus, :industry_focus,
            :investment_philosophy, :decision_timeline, :number_of_portfolio_companies,
            :notable_investments, :successful_exits, :post_investment_involvement, :areas_of_expertise,
            :investment_thesis, :additional_info, :profile_visibility, :contact_permissions,
            :now, :now
        )",
        named_params! {
            ":id": id,
            ":user_id": user_id,
            ":full_name": fields.full_name,
            ":email": fields.email,
            ":phone_number": fields.phone_number,
            ":country": fields.country,
            ":state": fields.state,
            ":district": fields.district,
            ":linkedin_profile": fields.linkedin_profile,
            ":investor_type": fields.investor_type,
            ":firm_name": fields.firm_name,
            ":investment_experience": fields.investment_experience,
            ":years_of_investment_experience": fields.years_of_investment_experience,
            ":professional_background": lists.professional_background,
            ":previous_experience": fields.previous_experience,
            ":investment_stages": lists.investment_stages,
            ":check_size_range": fields.check_size_range,
            ":geographic_focus": lists.geographic_focus,
            ":industry_focus": lists.industry_focus,
            ":investment_philosophy": fields.investment_philosophy,
            ":decision_timeline": fields.decision_timeline,
            ":number_of_portfolio_companies": fields.number_of_portfolio_companies,
            ":notable_investments": fields.notable_investments,
            ":successful_exits": fields.successful_exits,
            ":post_investment_involvement": fields.post_investment_involvement,
            ":areas_of_expertise": lists.areas_of_expertise,
            ":investment_thesis": fields.investment_thesis,
            ":additional_info": fields.additional_info,
            ":profile_visibility": fields.profile_visibility,
            ":contact_permissions": fields.contact_permissions,
            ":now": now,
        },
    )?;
    Ok(())
}

pub fn update_fields(conn: &Connection, id: &str, fields: &InvestorProfileFields, now: &str) -> Result<()> {
    let lists = EncodedLists::encode(fields)?;
    conn.execute(
        "UPDATE investor_profiles SET
            full_name = :full_name, email = :email, phone_number = :phone_number,
            country = :country, state = :state, district = :district,
            linkedin_profile = :linkedin_profile, investor_type = :investor_type,
            firm_name = :firm_name, investment_experience = :investment_experience,
            years_of_investment_experience = :years_of_investment_experience,
            professional_background = :professional_background,
            previous_experience = :previous_experience, investment_stages = :investment_stages,
            check_size_range = :check_size_range, geographic_focus = :geographic_focus,
            industry_focus = :industry_focus, investment_philosophy = :investment_philosophy,
            decision_timeline = :decision_timeline,
            number_of_portfolio_companies = :number_of_portfolio_companies,
            notable_investments = :notable_investments, successful_exits = :successful_exits,
            post_investment_involvement = :post_investment_involvement,
            areas_of_expertise = :areas_of_expertise, investment_thesis = :investment_thesis,
            additional_info = :additional_info, profile_visibility = :profile_visibility,
            contact_permissions = :contact_permissions, updated_at = :now
         WHERE id = :id",
        named_params! {
            ":id": id,
            ":full_name": fields.full_name,
            ":email": fields.email,
            ":phone_number": fields.phone_number,
            ":country": fields.country,
            ":state": fields.state,
            ":district": fields.district,
            ":linkedin_profile": fields.linkedin_profile,
            ":investor_type": fields.investor_type,
            ":firm_name": fields.firm_name,
            ":investment_experience": fields.investment_experience,
            ":years_of_investment_experience": fields.years_of_investment_experience,
            ":professional_background": lists.professional_background,
            ":previous_experience": fields.previous_experience,
            ":investment_stages": lists.investment_stages,
            ":check_size_range": fields.check_size_range,
            ":geographic_focus": lists.geographic_focus,
            ":industry_focus": lists.industry_focus,
            ":investment_philosophy": fields.investment_philosophy,
            ":decision_timeline": fields.decision_timeline,
            ":number_of_portfolio_companies": fields.number_of_portfolio_companies,
            ":notable_investments": fields.notable_investments,
            ":successful_exits": fields.successful_exits,
            ":post_investment_involvement": fields.post_investment_involvement,
            ":areas_of_expertise": lists.areas_of_expertise,
            ":investment_thesis": fields.investment_thesis,
            ":additional_info": fields.additional_info,
            ":profile_visibility": fields.profile_visibility,
            ":contact_permissions": fields.contact_permissions,
            ":now": now,
        },
    )?;
    Ok(())
}

pub fn set_photo(conn: &Connection, id: &str, file: &FileRef, now: &str) -> Result<()> {
    conn.execute(
        "UPDATE investor_profiles SET
            profile_photo_filename = ?2, profile_photo_file_path = ?3,
            profile_photo_file_size = ?4, profile_photo_content_type = ?5, updated_at = ?6
         WHERE id = ?1",
        rusqlite::params![id, file.filename, file.file_path, file.file_size, file.content_type, now],
    )?;
    Ok(())
}

pub fn by_user_id(conn: &Connection, user_id: &str) -> Result<Option<InvestorProfileRow>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM investor_profiles WHERE user_id = ?1");
    conn.query_row(&sql, [user_id], map_profile).optional()
}

pub fn list_all(conn: &Connection) -> Result<Vec<InvestorProfileRow>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM investor_profiles ORDER BY created_at, id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], map_profile)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_profile(row: &Row<'_>) -> rusqlite::Result<InvestorProfileRow> {
    Ok(InvestorProfileRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
        country: row.get(5)?,
        state: row.get(6)?,
        district: row.get(7)?,
        linkedin_profile: row.get(8)?,
        investor_type: row.get(9)?,
        firm_name: row.get(10)?,
        investment_experience: row.get(11)?,
        years_of_investment_experience: row.get(12)?,
        professional_background: row.get(13)?,
        previous_experience: row.get(14)?,
        investment_stages: row.get(15)?,
        check_size_range: row.get(16)?,
        geographic_focus: row.get(17)?,
        industry_focus: row.get(18)?,
        investment_philosophy: row.get(19)?,
        decision_timeline: row.get(20)?,
        number_of_portfolio_companies: row.get(21)?,
        notable_investments: row.get(22)?,
        successful_exits: row.get(23)?,
        post_investment_involvement: row.get(24)?,
        areas_of_expertise: row.get(25)?,
        investment_thesis: row.get(26)?,
        additional_info: row.get(27)?,
        profile_visibility: row.get(28)?,
        contact_permissions: row.get(29)?,
        profile_photo_filename: row.get(30)?,
        profile_photo_file_path: row.get(31)?,
        profile_photo_file_size: row.get(32)?,
        profile_photo_content_type: row.get(33)?,
        created_at: row.get(34)?,
        updated_at: row.get(35)?,
    })
}
