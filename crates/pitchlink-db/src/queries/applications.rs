use anyhow::Result;
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::models::{ApplicationLogRow, ApplicationRow};

/// Applications joined with the startup's company name and the investor's
/// full name. Either side may not have a profile yet, hence LEFT JOIN.
const SELECT_JOINED: &str = "SELECT a.id, a.startup_id, a.investor_id, a.pitch_deck_filename,
        a.pitch_deck_file_path, a.status, a.sent_at, a.updated_at, a.log,
        sp.company_name, ip.full_name
     FROM applications a
     LEFT JOIN startup_profiles sp ON sp.user_id = a.startup_id
     LEFT JOIN investor_profiles ip ON ip.user_id = a.investor_id";

pub struct NewApplication<'a> {
    pub id: &'a str,
    pub startup_id: &'a str,
    pub investor_id: &'a str,
    pub pitch_deck_filename: Option<&'a str>,
    pub pitch_deck_file_path: Option<&'a str>,
    pub status: &'a str,
    pub log: Option<&'a str>,
}

pub fn insert(conn: &Connection, app: &NewApplication<'_>, now: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO applications (id, startup_id, investor_id, pitch_deck_filename,
            pitch_deck_file_path, status, sent_at, updated_at, log)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8)",
        rusqlite::params![
            app.id,
            app.startup_id,
            app.investor_id,
            app.pitch_deck_filename,
            app.pitch_deck_file_path,
            app.status,
            now,
            app.log,
        ],
    )?;
    Ok(())
}

pub fn exists_for_pair(conn: &Connection, startup_id: &str, investor_id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM applications WHERE startup_id = ?1 AND investor_id = ?2",
            [startup_id, investor_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn by_id(conn: &Connection, id: &str) -> Result<Option<ApplicationRow>> {
    let sql = format!("{SELECT_JOINED} WHERE a.id = ?1");
    conn.query_row(&sql, [id], map_application).optional()
}

pub fn list_by_startup(conn: &Connection, startup_id: &str) -> Result<Vec<ApplicationRow>> {
    let sql = format!("{SELECT_JOINED} WHERE a.startup_id = ?1 ORDER BY a.sent_at DESC, a.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([startup_id], map_application)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_by_investor(conn: &Connection, investor_id: &str) -> Result<Vec<ApplicationRow>> {
    let sql = format!("{SELECT_JOINED} WHERE a.investor_id = ?1 ORDER BY a.sent_at DESC, a.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([investor_id], map_application)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_log(
    conn: &Connection,
    id: &str,
    application_id: &str,
    action: &str,
    actor_id: &str,
    details: Option<&str>,
    now: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO application_logs (id, application_id, action, actor_id, timestamp, details)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![id, application_id, action, actor_id, now, details],
    )?;
    Ok(())
}

pub fn logs_for(conn: &Connection, application_id: &str) -> Result<Vec<ApplicationLogRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, application_id, action, actor_id, timestamp, details
         FROM application_logs WHERE application_id = ?1
         ORDER BY timestamp, rowid",
    )?;
    let rows = stmt
        .query_map([application_id], |row| {
            Ok(ApplicationLogRow {
                id: row.get(0)?,
                application_id: row.get(1)?,
                action: row.get(2)?,
                actor_id: row.get(3)?,
                timestamp: row.get(4)?,
                details: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_application(row: &Row<'_>) -> rusqlite::Result<ApplicationRow> {
    Ok(ApplicationRow {
        id: row.get(0)?,
        startup_id: row.get(1)?,
        investor_id: row.get(2)?,
        pitch_deck_filename: row.get(3)?,
        pitch_deck_file_path: row.get(4)?,
        status: row.get(5)?,
        sent_at: row.get(6)?,
        updated_at: row.get(7)?,
        log: row.get(8)?,
        startup_name: row.get(9)?,
        investor_name: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::queries::fixtures::{NOW, user};
    use crate::queries::{investors, startups};

    fn application<'a>(id: &'a str, startup_id: &'a str, investor_id: &'a str) -> NewApplication<'a> {
        NewApplication {
            id,
            startup_id,
            investor_id,
            pitch_deck_filename: None,
            pitch_deck_file_path: None,
            status: "sent",
            log: None,
        }
    }

    #[test]
    fn pair_is_unique() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            user(conn, "s1", "startup");
            user(conn, "i1", "investor");
            assert!(!exists_for_pair(conn, "s1", "i1")?);

            insert(conn, &application("a1", "s1", "i1"), NOW)?;
            assert!(exists_for_pair(conn, "s1", "i1")?);
            assert!(!exists_for_pair(conn, "i1", "s1")?);
            assert!(insert(conn, &application("a2", "s1", "i1"), NOW).is_err());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn listings_join_display_names() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            user(conn, "s1", "startup");
            user(conn, "i1", "investor");
            user(conn, "i2", "investor");
            startups::insert_profile(conn, "p1", "s1", &startups::tests::sample_fields("Acme"), NOW)?;
            investors::insert(conn, "ip1", "i1", &investors::tests::sample_fields("Ivy"), NOW)?;

            insert(conn, &application("a1", "s1", "i1"), NOW)?;
            insert(conn, &application("a2", "s1", "i2"), "2025-06-01 11:00:00")?;

            let sent = list_by_startup(conn, "s1")?;
            assert_eq!(sent.len(), 2);
            // newest first
            assert_eq!(sent[0].id, "a2");
            assert_eq!(sent[0].investor_name, None);
            assert_eq!(sent[1].investor_name.as_deref(), Some("Ivy"));

            let received = list_by_investor(conn, "i1")?;
            assert_eq!(received.len(), 1);
            assert_eq!(received[0].startup_name.as_deref(), Some("Acme"));
            assert!(list_by_investor(conn, "s1")?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn logs_come_back_in_order() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            user(conn, "s1", "startup");
            user(conn, "i1", "investor");
            insert(conn, &application("a1", "s1", "i1"), NOW)?;
            insert_log(conn, "l1", "a1", "sent", "s1", Some("first"), NOW)?;
            insert_log(conn, "l2", "a1", "viewed", "i1", None, "2025-06-01 12:00:00")?;

            let logs = logs_for(conn, "a1")?;
            let actions: Vec<_> = logs.iter().map(|l| l.action.as_str()).collect();
            assert_eq!(actions, vec!["sent", "viewed"]);
            assert_eq!(logs[0].details.as_deref(), Some("first"));
            Ok(())
        })
        .unwrap();
    }
}
