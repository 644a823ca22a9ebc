use courier_types::models::MessageDetail;

use crate::error::{Error, Result};

// Pure authorization checks. Each takes the authenticated username and
// the resource being touched and rejects with Error::Forbidden. None of
// them fetch anything, so callers decide the fetch-then-check order,
// which is what keeps NotFound and Forbidden distinct.

/// Full profiles and per-user message lists are self-only.
pub fn ensure_self(requester: &str, username: &str) -> Result<()> {
    if requester != username {
        return Err(Error::Forbidden);
    }
    Ok(())
}

/// A message body is visible only to its sender and its recipient.
pub fn ensure_participant(requester: &str, message: &MessageDetail) -> Result<()> {
    if requester != message.from_user.username && requester != message.to_user.username {
        return Err(Error::Forbidden);
    }
    Ok(())
}

/// Only the recipient may acknowledge read.
pub fn ensure_recipient(requester: &str, message: &MessageDetail) -> Result<()> {
    if requester != message.to_user.username {
        return Err(Error::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use courier_types::models::ProfileCard;

    fn card(username: &str) -> ProfileCard {
        ProfileCard {
            username: username.into(),
            first_name: "First".into(),
            last_name: "Last".into(),
            phone: "+15550000000".into(),
        }
    }

    fn message(from: &str, to: &str) -> MessageDetail {
        MessageDetail {
            id: 1,
            body: "hello".into(),
            sent_at: Utc::now(),
            read_at: None,
            from_user: card(from),
            to_user: card(to),
        }
    }

    #[test]
    fn self_only() {
        assert!(ensure_self("alice", "alice").is_ok());
        assert!(matches!(ensure_self("alice", "bob"), Err(Error::Forbidden)));
    }

    #[test]
    fn participants_only() {
        let m = message("alice", "bob");
        assert!(ensure_participant("alice", &m).is_ok());
        assert!(ensure_participant("bob", &m).is_ok());
        assert!(matches!(
            ensure_participant("carol", &m),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn recipient_only() {
        let m = message("alice", "bob");
        assert!(ensure_recipient("bob", &m).is_ok());
        assert!(matches!(
            ensure_recipient("alice", &m),
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            ensure_recipient("carol", &m),
            Err(Error::Forbidden)
        ));
    }
}
