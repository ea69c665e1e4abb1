//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request headers
//!     → headers.rs (strip host/connection/content-length/authorization)
//!     → credential.rs (inject server-held bearer)
//!     → Outgoing request headers
//! ```
//!
//! # Design Decisions
//! - The caller never supplies the upstream credential
//! - The credential is never formatted into logs

pub mod credential;
pub mod headers;

pub use credential::BearerCredential;
pub use headers::{filter_request_headers, inject_credential};
