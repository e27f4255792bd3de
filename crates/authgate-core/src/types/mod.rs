//! Domain types shared by the credential and session layers.

pub mod credential;
pub mod session;

pub use credential::{PublicUser, UserCredential};
pub use session::{SessionChanges, SessionData, SessionId, SessionRecord};
