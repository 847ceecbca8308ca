//! PostgreSQL persistence adapter using the Diesel ORM.

mod diesel_observation_repository;
pub mod pool;
pub mod schema;

pub use diesel_observation_repository::DieselObservationRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
