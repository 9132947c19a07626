use anyhow::Result;
use rusqlite::Connection;

use super::OptionalExt;
use crate::models::OtpRow;

pub fn delete_for_email(conn: &Connection, email: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM otps WHERE email = ?1", [email])?)
}

pub fn insert(
    conn: &Connection,
    id: &str,
    email: &str,
    code: &str,
    expires_at: &str,
    created_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO otps (id, email, code, expires_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        (id, email, code, expires_at, created_at),
    )?;
    Ok(())
}

/// An OTP matches only while `expires_at` is strictly after `now`.
pub fn find_valid(conn: &Connection, email: &str, code: &str, now: &str) -> Result<Option<OtpRow>> {
    conn.query_row(
        "SELECT id, email, code, expires_at, created_at FROM otps
         WHERE email = ?1 AND code = ?2 AND expires_at > ?3
         ORDER BY created_at DESC
         LIMIT 1",
        (email, code, now),
        |row| {
            Ok(OtpRow {
                id: row.get(0)?,
                email: row.get(1)?,
                code: row.get(2)?,
                expires_at: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()
}

pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM otps WHERE id = ?1", [id])?;
    Ok(())
}

pub fn count_for_email(conn: &Connection, email: &str) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM otps WHERE email = ?1", [email], |r| r.get(0))?)
}

/// Remove every OTP that can no longer verify. Nothing schedules this.
pub fn purge_expired(conn: &Connection, now: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM otps WHERE expires_at <= ?1", [now])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[test]
    fn expiry_boundary_is_exclusive() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            insert(conn, "o1", "a@x.com", "123456", "2025-06-01 10:02:00", "2025-06-01 10:00:00")?;

            assert!(find_valid(conn, "a@x.com", "123456", "2025-06-01 10:01:59")?.is_some());
            assert!(find_valid(conn, "a@x.com", "123456", "2025-06-01 10:02:00")?.is_none());
            assert!(find_valid(conn, "a@x.com", "654321", "2025-06-01 10:00:30")?.is_none());
            assert!(find_valid(conn, "b@x.com", "123456", "2025-06-01 10:00:30")?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn purge_only_touches_expired_rows() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            insert(conn, "old", "a@x.com", "111111", "2025-06-01 09:00:00", "2025-06-01 08:58:00")?;
            insert(conn, "live", "b@x.com", "222222", "2025-06-01 10:02:00", "2025-06-01 10:00:00")?;

            assert_eq!(purge_expired(conn, "2025-06-01 10:00:00")?, 1);
            assert_eq!(count_for_email(conn, "a@x.com")?, 0);
            assert_eq!(count_for_email(conn, "b@x.com")?, 1);
            Ok(())
        })
        .unwrap();
    }
}
