use std::sync::Arc;

use chrono::Utc;

use courier_types::models::{Message, MessageDetail};

use crate::access;
use crate::error::{Error, Result};
use crate::store::Store;

/// Owns message records and the two transitions they ever make:
/// create and mark-read. Read access goes through [`view`], which
/// applies the participant visibility rule before the body leaves.
///
/// [`view`]: MessageLedger::view
pub struct MessageLedger {
    store: Arc<dyn Store>,
}

impl MessageLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Records a new message from `from_username` to `to_username`.
    /// Both users must exist, the two must differ, and the body must be
    /// non-empty. The id is assigned by the store; `read_at` starts unset.
    pub fn create(&self, from_username: &str, to_username: &str, body: &str) -> Result<Message> {
        if from_username == to_username {
            return Err(Error::Validation(
                "cannot send a message to yourself".into(),
            ));
        }
        if body.trim().is_empty() {
            return Err(Error::Validation("message body must not be empty".into()));
        }
        if self.store.user_by_username(from_username)?.is_none() {
            return Err(Error::NotFound(format!("username: {from_username}")));
        }
        if self.store.user_by_username(to_username)?.is_none() {
            return Err(Error::NotFound(format!("username: {to_username}")));
        }

        let message = self
            .store
            .insert_message(from_username, to_username, body, Utc::now())?;
        tracing::debug!(id = message.id, %from_username, %to_username, "message created");
        Ok(message)
    }

    /// Fetches a message for `requester`. Unknown ids are NotFound;
    /// an existing message a non-participant asks for is Forbidden —
    /// the two cases stay distinct.
    pub fn view(&self, requester: &str, id: i64) -> Result<MessageDetail> {
        let message = self.fetch(id)?;
        access::ensure_participant(requester, &message)?;
        Ok(message)
    }

    /// Recipient-only read acknowledgement. Re-marking an already-read
    /// message is a no-op that keeps the original `read_at`.
    pub fn mark_read(&self, requester: &str, id: i64) -> Result<MessageDetail> {
        let mut message = self.fetch(id)?;
        access::ensure_recipient(requester, &message)?;

        let effective = self
            .store
            .mark_read(id, Utc::now())?
            .ok_or_else(|| Error::NotFound(format!("message: {id}")))?;
        message.read_at = Some(effective);
        Ok(message)
    }

    fn fetch(&self, id: i64) -> Result<MessageDetail> {
        self.store
            .message_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("message: {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialStore;
    use crate::store::MemoryStore;
    use courier_types::api::RegisterRequest;

    fn setup(usernames: &[&str]) -> (Arc<MemoryStore>, MessageLedger) {
        let store = Arc::new(MemoryStore::new());
        let creds = CredentialStore::new(store.clone());
        for username in usernames {
            creds
                .register(&RegisterRequest {
                    username: username.to_string(),
                    password: "a strong password".into(),
                    first_name: format!("{username}-first"),
                    last_name: format!("{username}-last"),
                    phone: "+15550000000".into(),
                })
                .unwrap();
        }
        let ledger = MessageLedger::new(store.clone());
        (store, ledger)
    }

    #[test]
    fn create_assigns_monotonic_ids() {
        let (_, ledger) = setup(&["alice", "bob"]);
        let m1 = ledger.create("alice", "bob", "first").unwrap();
        let m2 = ledger.create("bob", "alice", "second").unwrap();
        assert!(m2.id > m1.id);
        assert!(m1.read_at.is_none());
    }

    #[test]
    fn self_addressed_message_rejected() {
        let (_, ledger) = setup(&["alice"]);
        assert!(matches!(
            ledger.create("alice", "alice", "hi"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn empty_body_rejected() {
        let (_, ledger) = setup(&["alice", "bob"]);
        assert!(matches!(
            ledger.create("alice", "bob", "   "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn unknown_endpoints_rejected() {
        let (_, ledger) = setup(&["alice"]);
        assert!(matches!(
            ledger.create("alice", "ghost", "hi"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            ledger.create("ghost", "alice", "hi"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn visibility_is_participants_only() {
        let (_, ledger) = setup(&["alice", "bob", "carol"]);
        let m = ledger.create("alice", "bob", "between us").unwrap();

        assert_eq!(ledger.view("alice", m.id).unwrap().id, m.id);
        assert_eq!(ledger.view("bob", m.id).unwrap().id, m.id);
        assert!(matches!(ledger.view("carol", m.id), Err(Error::Forbidden)));
    }

    #[test]
    fn missing_and_forbidden_stay_distinct() {
        let (_, ledger) = setup(&["alice", "bob", "carol"]);
        let m = ledger.create("alice", "bob", "between us").unwrap();

        assert!(matches!(
            ledger.view("carol", m.id + 100),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(ledger.view("carol", m.id), Err(Error::Forbidden)));
    }

    #[test]
    fn only_recipient_marks_read() {
        let (store, ledger) = setup(&["alice", "bob", "carol"]);
        let m = ledger.create("alice", "bob", "read me").unwrap();

        assert!(matches!(
            ledger.mark_read("alice", m.id),
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            ledger.mark_read("carol", m.id),
            Err(Error::Forbidden)
        ));
        // Failed attempts must not have stamped anything.
        assert!(store.message_by_id(m.id).unwrap().unwrap().read_at.is_none());

        let read = ledger.mark_read("bob", m.id).unwrap();
        assert!(read.read_at.is_some());
    }

    #[test]
    fn mark_read_is_idempotent() {
        let (_, ledger) = setup(&["alice", "bob"]);
        let m = ledger.create("alice", "bob", "read me").unwrap();

        let first = ledger.mark_read("bob", m.id).unwrap();
        let second = ledger.mark_read("bob", m.id).unwrap();
        assert_eq!(first.read_at, second.read_at);
    }

    #[test]
    fn mark_read_unknown_id() {
        let (_, ledger) = setup(&["alice", "bob"]);
        assert!(matches!(
            ledger.mark_read("bob", 999),
            Err(Error::NotFound(_))
        ));
    }
}
