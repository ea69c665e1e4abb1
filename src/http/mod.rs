//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! caller request
//!     → server.rs (Axum router, request ID, tracing span)
//!     → request.rs (build upstream request: headers, credential, body)
//!     → hyper-util client
//!     → response.rs (relay status, headers, live body)
//!     → caller
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
