//! Courier core: credential verification, token issuance and the
//! access-control rules around private messages. Everything here is
//! transport-agnostic; persistence goes through the [`store::Store`]
//! trait so the HTTP layer and the tests can plug in different backends.

pub mod access;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod store;
pub mod tokens;

pub use credentials::CredentialStore;
pub use directory::UserDirectory;
pub use error::{AuthError, Error, Result};
pub use ledger::MessageLedger;
pub use tokens::TokenIssuer;
