use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                  TEXT PRIMARY KEY,
            email               TEXT NOT NULL UNIQUE,
            role                TEXT NOT NULL,
            password            TEXT NOT NULL,
            is_verified         INTEGER NOT NULL DEFAULT 0,
            profile_completed   INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

        CREATE TABLE IF NOT EXISTS otps (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL,
            code        TEXT NOT NULL,
            expires_at  TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_otps_email ON otps(email);

        CREATE TABLE IF NOT EXISTS startup_profiles (
            id                              TEXT PRIMARY KEY,
            user_id                         TEXT NOT NULL UNIQUE REFERENCES users(id),
            company_name                    TEXT NOT NULL,
            website_link                    TEXT,
            industry                        TEXT NOT NULL,
            company_description             TEXT NOT NULL,
            founding_date                   TEXT NOT NULL,
            team_size                       INTEGER NOT NULL,
            district                        TEXT NOT NULL,
            state                           TEXT NOT NULL,
            social_media_1                  TEXT,
            social_media_2                  TEXT,
            business_model_description      TEXT NOT NULL,
            total_paying_customers          INTEGER NOT NULL,
            monthly_customer_growth_rate    REAL,
            customer_acquisition_cost       REAL,
            customer_lifetime_value         REAL,
            competitive_advantage           TEXT NOT NULL,
            pitch_deck_filename             TEXT,
            pitch_deck_file_path            TEXT,
            pitch_deck_file_size            INTEGER,
            pitch_deck_content_type         TEXT,
            product_demo_video_link         TEXT NOT NULL,
            pre_money_valuation             INTEGER NOT NULL,
            amount_seeking                  INTEGER NOT NULL,
            investment_type                 TEXT NOT NULL,
            max_equity_percentage           REAL NOT NULL,
            funding_stage                   TEXT NOT NULL,
            total_funding_raised            INTEGER NOT NULL,
            last_round_amount               INTEGER NOT NULL,
            last_round_date                 TEXT NOT NULL,
            key_previous_investors          TEXT NOT NULL,
            created_at                      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at                      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_startup_profiles_industry ON startup_profiles(industry);
        CREATE INDEX IF NOT EXISTS idx_startup_profiles_stage ON startup_profiles(funding_stage);

        CREATE TABLE IF NOT EXISTS founders (
            id                          TEXT PRIMARY KEY,
            startup_profile_id          TEXT NOT NULL REFERENCES startup_profiles(id) ON DELETE CASCADE,
            name                        TEXT NOT NULL,
            educational_qualification   TEXT NOT NULL,
            previous_work_experience    TEXT NOT NULL,
            linkedin_profile            TEXT NOT NULL,
            photo_url                   TEXT NOT NULL,
            position                    INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_founders_profile ON founders(startup_profile_id, position);

        CREATE TABLE IF NOT EXISTS startup_revenue_metrics (
            id                          TEXT PRIMARY KEY,
            startup_profile_id          TEXT NOT NULL UNIQUE REFERENCES startup_profiles(id) ON DELETE CASCADE,
            monthly_recurring_revenue   INTEGER NOT NULL,
            annual_recurring_revenue    INTEGER NOT NULL,
            revenue_growth_rate         REAL,
            monthly_burn_rate           INTEGER,
            current_cash_runway         INTEGER,
            projected_revenue_12_months INTEGER,
            profitability_timeline      TEXT NOT NULL,
            investment_timeline         TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS fund_usage (
            id                              TEXT PRIMARY KEY,
            startup_profile_id              TEXT NOT NULL UNIQUE REFERENCES startup_profiles(id) ON DELETE CASCADE,
            product_development_percentage  REAL NOT NULL,
            marketing_percentage            REAL NOT NULL,
            team_expansion_percentage       REAL NOT NULL,
            operations_percentage           REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS investor_profiles (
            id                              TEXT PRIMARY KEY,
            user_id                         TEXT NOT NULL UNIQUE REFERENCES users(id),
            full_name                       TEXT NOT NULL,
            email                           TEXT NOT NULL,
            phone_number                    TEXT,
            country                         TEXT NOT NULL,
            state                           TEXT NOT NULL,
            district                        TEXT NOT NULL,
            linkedin_profile                TEXT NOT NULL,
            investor_type                   TEXT NOT NULL,
            firm_name                       TEXT,
            investment_experience           TEXT NOT NULL,
            years_of_investment_experience  TEXT NOT NULL,
            professional_background         TEXT NOT NULL,
            previous_experience             TEXT,
            investment_stages               TEXT NOT NULL,
            check_size_range                TEXT NOT NULL,
            geographic_focus                TEXT NOT NULL,
            industry_focus                  TEXT NOT NULL,
            investment_philosophy           TEXT NOT NULL,
            decision_timeline               TEXT NOT NULL,
            number_of_portfolio_companies   TEXT,
            notable_investments             TEXT,
            successful_exits                TEXT,
            post_investment_involvement     TEXT NOT NULL,
            areas_of_expertise              TEXT NOT NULL,
            investment_thesis               TEXT,
            additional_info                 TEXT,
            profile_visibility              TEXT NOT NULL,
            contact_permissions             TEXT NOT NULL,
            profile_photo_filename          TEXT,
            profile_photo_file_path         TEXT,
            profile_photo_file_size         INTEGER,
            profile_photo_content_type      TEXT,
            created_at                      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at                      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS applications (
            id                      TEXT PRIMARY KEY,
            startup_id              TEXT NOT NULL REFERENCES users(id),
            investor_id             TEXT NOT NULL REFERENCES users(id),
            pitch_deck_filename     TEXT,
            pitch_deck_file_path    TEXT,
            status                  TEXT NOT NULL DEFAULT 'sent',
            sent_at                 TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at              TEXT NOT NULL DEFAULT (datetime('now')),
            log                     TEXT
        );

        -- Backstop for the application-level duplicate check
        CREATE UNIQUE INDEX IF NOT EXISTS idx_applications_pair
            ON applications(startup_id, investor_id);
        CREATE INDEX IF NOT EXISTS idx_applications_investor
            ON applications(investor_id);

        CREATE TABLE IF NOT EXISTS application_logs (
            id              TEXT PRIMARY KEY,
            application_id  TEXT NOT NULL REFERENCES applications(id),
            action          TEXT NOT NULL,
            actor_id        TEXT NOT NULL REFERENCES users(id),
            timestamp       TEXT NOT NULL DEFAULT (datetime('now')),
            details         TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_application_logs_application
            ON application_logs(application_id, timestamp);

        CREATE TABLE IF NOT EXISTS interest_status (
            id          TEXT PRIMARY KEY,
            startup_id  TEXT NOT NULL REFERENCES users(id),
            investor_id TEXT NOT NULL REFERENCES users(id),
            status      TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(startup_id, investor_id)
        );

        CREATE INDEX IF NOT EXISTS idx_interest_status_investor
            ON interest_status(investor_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
