//! Session handling and authorization.
//!
//! - [`guard`] rejects requests without a valid bearer credential.
//! - [`session`] rebuilds the typed [`session::Session`] for handlers.
//! - [`membership`] answers "may this session act on this company/user".
//! - [`directory`] loads stored identities for credential issuance.

pub mod directory;
pub mod guard;
pub mod membership;
pub mod session;

pub use guard::require_credential;
pub use membership::{check_belonging, check_session, MembershipError};
pub use session::{Session, SessionError};
