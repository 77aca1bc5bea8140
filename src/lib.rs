//! # Fleet Ledger
//!
//! Data-integrity core of a fleet management system: vehicle catalog,
//! vehicle registry, per-vehicle odometer ledger and recharge card ledger.
//!
//! ## Architecture
//!
//! - **domain**: entities, pure projections and repository traits
//! - **application**: services enforcing the invariants, per-key locks
//! - **infrastructure**: in-memory and SeaORM record stores, migrations
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors, retry, deadlines, validators, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, FleetSettings};

// Re-export database types for easy access
pub use infrastructure::{
    init_database, run_migrations, DatabaseConfig, InMemoryRepositoryProvider,
    SeaOrmRepositoryProvider,
};

// Re-export API router
pub use interfaces::http::{create_api_router, AppState};
