use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

use courier_types::models::{
    Message, MessageDetail, ProfileCard, ReceivedMessage, SentMessage, UserSummary,
};

/// A user as persisted. Carries the password digest, so this type never
/// crosses the API boundary; callers serialize the view types from
/// courier-types instead.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub username: String,
    pub password_digest: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn card(&self) -> ProfileCard {
        ProfileCard {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Row-level persistence for users and messages. The core owns every
/// domain rule; implementations only store and fetch. Timestamps are
/// passed in by the caller so the store stays clock-free.
pub trait Store: Send + Sync {
    /// Fails if the username is already present.
    fn insert_user(&self, user: &UserRecord) -> Result<()>;

    fn user_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Full population, ordered by (last_name, first_name) ascending.
    fn list_users(&self) -> Result<Vec<UserSummary>>;

    /// Returns false when the username does not exist.
    fn set_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<bool>;

    /// Assigns the next monotonic id and returns the stored message.
    fn insert_message(
        &self,
        from_username: &str,
        to_username: &str,
        body: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Message>;

    fn message_by_id(&self, id: i64) -> Result<Option<MessageDetail>>;

    fn messages_sent_by(&self, username: &str) -> Result<Vec<SentMessage>>;

    fn messages_received_by(&self, username: &str) -> Result<Vec<ReceivedMessage>>;

    /// Stamps `read_at` if it is still unset; an already-read message is
    /// left untouched. Returns the effective `read_at`, or None when no
    /// such message exists.
    fn mark_read(&self, id: i64, read_at: DateTime<Utc>) -> Result<Option<DateTime<Utc>>>;
}

/// In-memory [`Store`] backed by maps. The test double the core's own
/// tests run against; also handy for demos without a database file.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserRecord>,
    messages: BTreeMap<i64, Message>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn card(&self, username: &str) -> Result<ProfileCard> {
        match self.users.get(username) {
            Some(user) => Ok(user.card()),
            None => bail!("dangling username on message: {username}"),
        }
    }
}

impl Store for MemoryStore {
    fn insert_user(&self, user: &UserRecord) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.contains_key(&user.username) {
            bail!("duplicate username: {}", user.username);
        }
        inner.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    fn user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(username).cloned())
    }

    fn list_users(&self) -> Result<Vec<UserSummary>> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<UserSummary> = inner
            .users
            .values()
            .map(|u| UserSummary {
                username: u.username.clone(),
                first_name: u.first_name.clone(),
                last_name: u.last_name.clone(),
            })
            .collect();
        users.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        Ok(users)
    }

    fn set_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.get_mut(username) {
            Some(user) => {
                user.last_login_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_message(
        &self,
        from_username: &str,
        to_username: &str,
        body: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Message> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let message = Message {
            id: inner.next_id,
            from_username: from_username.to_string(),
            to_username: to_username.to_string(),
            body: body.to_string(),
            sent_at,
            read_at: None,
        };
        inner.messages.insert(message.id, message.clone());
        Ok(message)
    }

    fn message_by_id(&self, id: i64) -> Result<Option<MessageDetail>> {
        let inner = self.inner.lock().unwrap();
        let Some(m) = inner.messages.get(&id) else {
            return Ok(None);
        };
        Ok(Some(MessageDetail {
            id: m.id,
            body: m.body.clone(),
            sent_at: m.sent_at,
            read_at: m.read_at,
            from_user: inner.card(&m.from_username)?,
            to_user: inner.card(&m.to_username)?,
        }))
    }

    fn messages_sent_by(&self, username: &str) -> Result<Vec<SentMessage>> {
        let inner = self.inner.lock().unwrap();
        inner
            .messages
            .values()
            .filter(|m| m.from_username == username)
            .map(|m| {
                Ok(SentMessage {
                    id: m.id,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                    to_user: inner.card(&m.to_username)?,
                })
            })
            .collect()
    }

    fn messages_received_by(&self, username: &str) -> Result<Vec<ReceivedMessage>> {
        let inner = self.inner.lock().unwrap();
        inner
            .messages
            .values()
            .filter(|m| m.to_username == username)
            .map(|m| {
                Ok(ReceivedMessage {
                    id: m.id,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                    from_user: inner.card(&m.from_username)?,
                })
            })
            .collect()
    }

    fn mark_read(&self, id: i64, read_at: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.messages.get_mut(&id) {
            Some(message) => {
                let effective = *message.read_at.get_or_insert(read_at);
                Ok(Some(effective))
            }
            None => Ok(None),
        }
    }
}
