//! # hrdesk (HR operations backend)
//!
//! `hrdesk` serves employee requests (advance salary, exit permission, leave
//! and loan) for many companies from a single deployment. Every request walks
//! the same lifecycle: it is created `pending` by an employee and later
//! `approved` or `rejected` by someone holding a role in the same company.
//!
//! ## Sessions
//!
//! Callers authenticate with a stateless HS256 bearer token (see [`token`])
//! carrying the user id, the company id and the user's role assignments. The
//! signing secret and token duration are read once at startup; nothing about
//! a session is stored server-side.
//!
//! ## Tenant boundary
//!
//! Companies are the tenant boundary. Handlers confirm that the acting user
//! belongs to the company named by the session before reading or mutating
//! anything, and a resource owned by another company is reported as not
//! found.

pub mod api;
pub mod cli;
pub mod token;

#[cfg(test)]
mod test_support;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
