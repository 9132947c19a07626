use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::InterestRow;

const SELECT_JOINED: &str = "SELECT s.id, s.startup_id, s.investor_id, s.status, s.created_at, s.updated_at,
        sp.company_name, ip.full_name
     FROM interest_status s
     LEFT JOIN startup_profiles sp ON sp.user_id = s.startup_id
     LEFT JOIN investor_profiles ip ON ip.user_id = s.investor_id";

/// Create or overwrite the single record for this pair. `id` is only used
/// when the row is new; `created_at` survives updates.
pub fn upsert(
    conn: &Connection,
    id: &str,
    startup_id: &str,
    investor_id: &str,
    status: &str,
    now: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO interest_status (id, startup_id, investor_id, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(startup_id, investor_id) DO UPDATE SET
            status = excluded.status,
            updated_at = excluded.updated_at",
        (id, startup_id, investor_id, status, now),
    )?;
    Ok(())
}

pub fn by_pair(conn: &Connection, startup_id: &str, investor_id: &str) -> Result<Option<InterestRow>> {
    let sql = format!("{SELECT_JOINED} WHERE s.startup_id = ?1 AND s.investor_id = ?2");
    conn.query_row(&sql, [startup_id, investor_id], map_interest).optional()
}

pub fn list_by_investor(conn: &Connection, investor_id: &str) -> Result<Vec<InterestRow>> {
    let sql = format!("{SELECT_JOINED} WHERE s.investor_id = ?1 ORDER BY s.updated_at DESC, s.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([investor_id], map_interest)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_by_startup(conn: &Connection, startup_id: &str) -> Result<Vec<InterestRow>> {
    let sql = format!("{SELECT_JOINED} WHERE s.startup_id = ?1 ORDER BY s.updated_at DESC, s.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([startup_id], map_interest)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_interest(row: &Row<'_>) -> rusqlite::Result<InterestRow> {
    Ok(InterestRow {
        id: row.get(0)?,
        startup_id: row.get(1)?,
        investor_id: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        startup_name: row.get(6)?,
        investor_name: row.get(7)?,
    })
}
