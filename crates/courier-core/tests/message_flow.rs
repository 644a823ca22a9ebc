//! Full conversation flow over the in-memory store: register two users,
//! authenticate, exchange a message and acknowledge it.

use std::sync::Arc;

use courier_core::store::MemoryStore;
use courier_core::{CredentialStore, MessageLedger, TokenIssuer, UserDirectory};
use courier_types::api::RegisterRequest;

fn register_request(username: &str, first: &str, last: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.into(),
        password: "a strong password".into(),
        first_name: first.into(),
        last_name: last.into(),
        phone: "+15550000000".into(),
    }
}

#[test]
fn register_send_read_acknowledge() {
    let store = Arc::new(MemoryStore::new());
    let credentials = CredentialStore::new(store.clone());
    let directory = UserDirectory::new(store.clone());
    let ledger = MessageLedger::new(store);
    let issuer = TokenIssuer::with_default_ttl("integration-secret");

    credentials
        .register(&register_request("alice", "Alice", "Ames"))
        .unwrap();
    credentials
        .register(&register_request("bob", "Bob", "Berg"))
        .unwrap();

    // Alice logs in: verify, stamp, mint, and the token round-trips.
    assert!(credentials.verify("alice", "a strong password").unwrap());
    credentials.record_login("alice").unwrap();
    let token = issuer.issue("alice").unwrap();
    let authed = issuer.verify(&token).unwrap();
    assert_eq!(authed, "alice");

    // Alice sends, acting as the identity the token asserted.
    let message = ledger.create(&authed, "bob", "hello").unwrap();

    // Bob's inbox shows one unread message from alice.
    let inbox = directory.messages_received_by("bob").unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].from_user.username, "alice");
    assert_eq!(inbox[0].body, "hello");
    assert!(inbox[0].read_at.is_none());

    // Alice's outbox mirrors it, with bob's card attached.
    let outbox = directory.messages_sent_by("alice").unwrap();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to_user.username, "bob");

    // Bob acknowledges; the inbox now shows the read stamp.
    let read = ledger.mark_read("bob", message.id).unwrap();
    assert!(read.read_at.is_some());

    let inbox = directory.messages_received_by("bob").unwrap();
    assert_eq!(inbox[0].read_at, read.read_at);
}
