pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmRepositoryProvider;

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migrator::Migrator;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./fleet.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./fleet.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Create config for SQLite
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
        }
    }

    /// Create config from environment variable
    pub fn from_env() -> Self {
        std::env::var("DATABASE_URL")
            .map(|url| Self { url })
            .unwrap_or_default()
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}", config.url);
    let db = Database::connect(&config.url).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Apply every pending migration
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}
