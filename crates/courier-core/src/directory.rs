use std::sync::Arc;

use courier_types::models::{ReceivedMessage, SentMessage, UserProfile, UserSummary};

use crate::error::{Error, Result};
use crate::store::Store;

/// Read-side view over user records: the coarse listing, full profiles
/// and per-user message lists. Nothing here mutates.
pub struct UserDirectory {
    store: Arc<dyn Store>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Everyone, ordered by (last_name, first_name) ascending.
    pub fn list_all(&self) -> Result<Vec<UserSummary>> {
        Ok(self.store.list_users()?)
    }

    /// Full profile, digest excluded.
    pub fn get_by_username(&self, username: &str) -> Result<UserProfile> {
        let user = self
            .store
            .user_by_username(username)?
            .ok_or_else(|| Error::NotFound(format!("username: {username}")))?;
        Ok(UserProfile {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            joined_at: user.joined_at,
            last_login_at: user.last_login_at,
        })
    }

    /// Outbox: messages this user sent, each with the recipient's card.
    pub fn messages_sent_by(&self, username: &str) -> Result<Vec<SentMessage>> {
        self.require(username)?;
        Ok(self.store.messages_sent_by(username)?)
    }

    /// Inbox: messages this user received, each with the sender's card.
    pub fn messages_received_by(&self, username: &str) -> Result<Vec<ReceivedMessage>> {
        self.require(username)?;
        Ok(self.store.messages_received_by(username)?)
    }

    fn require(&self, username: &str) -> Result<()> {
        if self.store.user_by_username(username)?.is_none() {
            return Err(Error::NotFound(format!("username: {username}")));
        }
        Ok(())
    }
}
