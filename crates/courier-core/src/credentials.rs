use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};

use courier_types::api::RegisterRequest;

use crate::error::{Error, Result};
use crate::store::{Store, UserRecord};

/// Owns the username → salted digest mapping. Verification never leaves
/// this module; the digest is never handed outward.
pub struct CredentialStore {
    store: Arc<dyn Store>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Registers a new user with an Argon2id digest of the password.
    /// A freshly registered user counts as logged in, so `last_login_at`
    /// is stamped alongside `joined_at`.
    pub fn register(&self, req: &RegisterRequest) -> Result<UserRecord> {
        if req.username.len() < 3 || req.username.len() > 32 {
            return Err(Error::Validation(
                "username must be 3-32 characters".into(),
            ));
        }
        if req.password.len() < 8 {
            return Err(Error::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        if self.store.user_by_username(&req.username)?.is_some() {
            return Err(Error::Conflict(req.username.clone()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_digest = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {e}"))?
            .to_string();

        let now = Utc::now();
        let user = UserRecord {
            username: req.username.clone(),
            password_digest,
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            phone: req.phone.clone(),
            joined_at: now,
            last_login_at: Some(now),
        };
        self.store.insert_user(&user)?;

        tracing::info!(username = %user.username, "registered user");
        Ok(user)
    }

    /// Checks a password against the stored digest. An unknown username
    /// and a wrong password both come back as plain `false` so the two
    /// cases are indistinguishable to the caller; the digest comparison
    /// itself is constant-time inside the argon2 crate.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool> {
        let Some(user) = self.store.user_by_username(username)? else {
            return Ok(false);
        };

        let parsed = PasswordHash::new(&user.password_digest)
            .map_err(|e| anyhow!("stored digest unreadable for {username}: {e}"))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Stamps `last_login_at` with the current instant.
    pub fn record_login(&self, username: &str) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        if !self.store.set_last_login(username, now)? {
            return Err(Error::NotFound(format!("username: {username}")));
        }
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn request(username: &str, first: &str, last: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: "correct horse".into(),
            first_name: first.into(),
            last_name: last.into(),
            phone: "+15551234567".into(),
        }
    }

    fn credentials() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn register_then_verify() {
        let creds = credentials();
        creds.register(&request("alice", "Alice", "Ames")).unwrap();

        assert!(creds.verify("alice", "correct horse").unwrap());
        assert!(!creds.verify("alice", "wrong horse").unwrap());
        assert!(!creds.verify("nobody", "correct horse").unwrap());
    }

    #[test]
    fn digest_is_not_the_password() {
        let creds = credentials();
        let user = creds.register(&request("alice", "Alice", "Ames")).unwrap();
        assert_ne!(user.password_digest, "correct horse");
        assert!(user.password_digest.starts_with("$argon2"));
    }

    #[test]
    fn duplicate_username_conflicts_without_clobbering() {
        let creds = credentials();
        let first = creds.register(&request("alice", "Alice", "Ames")).unwrap();

        let mut again = request("alice", "Mallory", "Mims");
        again.password = "another secret".into();
        match creds.register(&again) {
            Err(Error::Conflict(name)) => assert_eq!(name, "alice"),
            other => panic!("expected Conflict, got {other:?}"),
        }

        // Original record is untouched, including its credential.
        assert!(creds.verify("alice", "correct horse").unwrap());
        assert!(!creds.verify("alice", "another secret").unwrap());
        let kept = creds.store.user_by_username("alice").unwrap().unwrap();
        assert_eq!(kept.first_name, "Alice");
        assert_eq!(kept.joined_at, first.joined_at);
    }

    #[test]
    fn registration_stamps_last_login() {
        let creds = credentials();
        let user = creds.register(&request("alice", "Alice", "Ames")).unwrap();
        assert_eq!(user.last_login_at, Some(user.joined_at));
    }

    #[test]
    fn record_login_updates_timestamp() {
        let creds = credentials();
        let user = creds.register(&request("alice", "Alice", "Ames")).unwrap();

        let at = creds.record_login("alice").unwrap();
        assert!(at >= user.joined_at);

        let reloaded = creds.store.user_by_username("alice").unwrap().unwrap();
        assert_eq!(reloaded.last_login_at, Some(at));
    }

    #[test]
    fn record_login_unknown_user() {
        let creds = credentials();
        assert!(matches!(
            creds.record_login("nobody"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn short_password_rejected() {
        let creds = credentials();
        let mut req = request("alice", "Alice", "Ames");
        req.password = "short".into();
        assert!(matches!(creds.register(&req), Err(Error::Validation(_))));
    }

    #[test]
    fn short_username_rejected() {
        let creds = credentials();
        assert!(matches!(
            creds.register(&request("al", "Alice", "Ames")),
            Err(Error::Validation(_))
        ));
    }
}
