//! Request rate limiting for the public HTTP endpoints.
//!
//! Keyed token buckets with a pluggable backend:
//! - In-memory (default, single process)
//!
//! The sampling and search core does no throttling itself; the limiter
//! sits in front of it as HTTP middleware.

mod backend;
mod config;
mod memory;

pub use backend::{Decision, RateLimitBackend, RateLimitError, RateLimitResult};
pub use config::RateLimitConfig;
pub use memory::InMemoryRateLimitBackend;
