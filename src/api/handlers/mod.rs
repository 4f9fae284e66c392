//! API handlers and the helpers they share.
//!
//! Every JSON response goes through [`envelope`]; list endpoints resolve
//! paging through [`pagination`].

pub mod auth;
pub mod envelope;
pub mod health;
pub mod pagination;
pub mod requests;
pub mod root;
