//! Employee request endpoints: advance salaries, exit permissions, leaves and
//! loans.
//!
//! Companies are the tenant boundary. Every route sits behind the credential
//! guard, and every handler confirms company membership before it reads or
//! writes. A request that lives in another company answers `404`, the same as
//! one that does not exist.
//!
//! The four kinds share one lifecycle. They differ only in their columns, so
//! the kind modules own validation and inserts while `flow` and `storage`
//! implement reads, listing, review and withdrawal once.
//!
//! Flow Overview:
//! 1) Authenticate via bearer credential (guard, then `Session` extractor).
//! 2) Parse path ids and validate the body.
//! 3) Check membership for the company or user being addressed.
//! 4) Perform the scoped query.

use axum::Router;

pub(crate) mod advance_salaries;
pub(crate) mod exit_permissions;
mod flow;
pub(crate) mod leaves;
pub(crate) mod loans;
mod storage;
pub(crate) mod types;
mod validate;

const MAX_REASON_CHARS: usize = 1000;
const MAX_INSTALLMENTS: i32 = 120;

/// All request routes. The caller is expected to wrap them with the guard.
pub fn routes() -> Router {
    Router::new()
        .merge(advance_salaries::routes())
        .merge(exit_permissions::routes())
        .merge(leaves::routes())
        .merge(loans::routes())
}

#[cfg(test)]
mod tests;
