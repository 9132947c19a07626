use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::UserRow;

const USER_COLUMNS: &str =
    "id, email, role, password, is_verified, profile_completed, created_at, updated_at";

/// Users only come into existence through a consumed OTP, so they start verified.
pub fn insert(
    conn: &Connection,
    id: &str,
    email: &str,
    role: &str,
    password_hash: &str,
    now: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, role, password, is_verified, profile_completed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, 0, ?5, ?5)",
        (id, email, role, password_hash, now),
    )?;
    Ok(())
}

pub fn by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
    conn.query_row(&sql, [email], map_user).optional()
}

pub fn by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    conn.query_row(&sql, [id], map_user).optional()
}

pub fn mark_profile_completed(conn: &Connection, id: &str, now: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET profile_completed = 1, updated_at = ?2 WHERE id = ?1",
        (id, now),
    )?;
    Ok(())
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        role: row.get(2)?,
        password: row.get(3)?,
        is_verified: row.get(4)?,
        profile_completed: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
