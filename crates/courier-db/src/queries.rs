use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use courier_core::store::{Store, UserRecord};
use courier_types::models::{
    Message, MessageDetail, ProfileCard, ReceivedMessage, SentMessage, UserSummary,
};

use crate::Database;

impl Store for Database {
    // -- Users --

    fn insert_user(&self, user: &UserRecord) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, first_name, last_name, phone, joined_at, last_login_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.username,
                    user.password_digest,
                    user.first_name,
                    user.last_name,
                    user.phone,
                    user.joined_at,
                    user.last_login_at,
                ],
            )?;
            Ok(())
        })
    }

    fn user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    fn list_users(&self) -> Result<Vec<UserSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, first_name, last_name
                 FROM users
                 ORDER BY last_name, first_name",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(UserSummary {
                        username: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn set_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET last_login_at = ?1 WHERE username = ?2",
                params![at, username],
            )?;
            Ok(updated > 0)
        })
    }

    // -- Messages --

    fn insert_message(
        &self,
        from_username: &str,
        to_username: &str,
        body: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Message> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (from_username, to_username, body, sent_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![from_username, to_username, body, sent_at],
            )?;
            Ok(Message {
                id: conn.last_insert_rowid(),
                from_username: from_username.to_string(),
                to_username: to_username.to_string(),
                body: body.to_string(),
                sent_at,
                read_at: None,
            })
        })
    }

    fn message_by_id(&self, id: i64) -> Result<Option<MessageDetail>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.body, m.sent_at, m.read_at,
                        f.username, f.first_name, f.last_name, f.phone,
                        t.username, t.first_name, t.last_name, t.phone
                 FROM messages m
                 JOIN users f ON m.from_username = f.username
                 JOIN users t ON m.to_username = t.username
                 WHERE m.id = ?1",
            )?;
            let row = stmt
                .query_row([id], |row| {
                    Ok(MessageDetail {
                        id: row.get(0)?,
                        body: row.get(1)?,
                        sent_at: row.get(2)?,
                        read_at: row.get(3)?,
                        from_user: card_at(row, 4)?,
                        to_user: card_at(row, 8)?,
                    })
                })
                .optional()?;
            Ok(row)
        })
    }

    fn messages_sent_by(&self, username: &str) -> Result<Vec<SentMessage>> {
        self.with_conn(|conn| {
            // JOIN users to attach the recipient card in a single query
            let mut stmt = conn.prepare(
                "SELECT m.id, m.body, m.sent_at, m.read_at,
                        t.username, t.first_name, t.last_name, t.phone
                 FROM messages m
                 JOIN users t ON m.to_username = t.username
                 WHERE m.from_username = ?1
                 ORDER BY m.id",
            )?;
            let rows = stmt
                .query_map([username], |row| {
                    Ok(SentMessage {
                        id: row.get(0)?,
                        body: row.get(1)?,
                        sent_at: row.get(2)?,
                        read_at: row.get(3)?,
                        to_user: card_at(row, 4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn messages_received_by(&self, username: &str) -> Result<Vec<ReceivedMessage>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.body, m.sent_at, m.read_at,
                        f.username, f.first_name, f.last_name, f.phone
                 FROM messages m
                 JOIN users f ON m.from_username = f.username
                 WHERE m.to_username = ?1
                 ORDER BY m.id",
            )?;
            let rows = stmt
                .query_map([username], |row| {
                    Ok(ReceivedMessage {
                        id: row.get(0)?,
                        body: row.get(1)?,
                        sent_at: row.get(2)?,
                        read_at: row.get(3)?,
                        from_user: card_at(row, 4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn mark_read(&self, id: i64, read_at: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        self.with_conn(|conn| {
            // Single guarded UPDATE: an already-read message is untouched.
            conn.execute(
                "UPDATE messages SET read_at = ?1 WHERE id = ?2 AND read_at IS NULL",
                params![read_at, id],
            )?;
            let effective: Option<Option<DateTime<Utc>>> = conn
                .query_row("SELECT read_at FROM messages WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(effective.flatten())
        })
    }
}

fn card_at(row: &Row<'_>, base: usize) -> rusqlite::Result<ProfileCard> {
    Ok(ProfileCard {
        username: row.get(base)?,
        first_name: row.get(base + 1)?,
        last_name: row.get(base + 2)?,
        phone: row.get(base + 3)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRecord>> {
    let mut stmt = conn.prepare(
        "SELECT username, password, first_name, last_name, phone, joined_at, last_login_at
         FROM users
         WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRecord {
                username: row.get(0)?,
                password_digest: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                phone: row.get(4)?,
                joined_at: row.get(5)?,
                last_login_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}
