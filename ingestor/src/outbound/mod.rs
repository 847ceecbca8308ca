//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **openweather**: reqwest client for the upstream current-weather API
//! - **quota**: Redis-backed budget counter
//! - **persistence**: PostgreSQL observation store using Diesel
//!
//! Adapters are thin translators between domain types and wire or storage
//! representations; they contain no pipeline logic.

pub mod openweather;
pub mod persistence;
pub mod quota;
