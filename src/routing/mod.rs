//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     UpstreamConfig
//!     → upstream.rs (parse base URL, compile credential)
//!     → UpstreamSettings (immutable, shared via Arc)
//!
//! Per request:
//!     request URI under the mount path
//!     → target.rs (path remainder + filtered query + token)
//!     → UpstreamTarget
//! ```
//!
//! # Design Decisions
//! - Deterministic: the same request URI always yields the same target
//! - No state kept between requests

pub mod target;
pub mod upstream;

pub use target::UpstreamTarget;
pub use upstream::UpstreamSettings;
