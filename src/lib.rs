//! brainbase - question base for quiz games.
//!
//! Stores "Что-где-когда", "Брейн-ринг" and "Своя игра" questions and serves
//! random selections, whole tournament packages and full-text search results
//! to game organizers.

// Model types use `from_str` methods that return Option<Self>,
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod repository;
pub mod sampling;
pub mod schema;
pub mod search;
pub mod server;
pub mod services;
