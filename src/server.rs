//! Server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database connection,
//! migrations, service wiring, REST API and graceful shutdown.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the server.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// Handle to a running fleet ledger server.
///
/// ```rust,no_run
/// use fleet_ledger::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Repository provider backing every service.
    pub repos: Arc<dyn RepositoryProvider>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Port the API is listening on.
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Connect the database, apply migrations (unless disabled), wire the
    /// services and start serving the REST API.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting fleet ledger...");

        let db_config = DatabaseConfig {
            url: app_cfg.database.url.clone(),
        };
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            run_migrations(&db).await?;
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let state = AppState::new(repos.clone(), app_cfg.fleet_settings());
        info!(
            currency = %app_cfg.fleet.currency,
            odometer_order = %app_cfg.fleet.odometer_order,
            "Services initialised"
        );

        let shutdown = ShutdownCoordinator::new();
        let api_shutdown = shutdown.signal();

        let api_port = app_cfg.server.port;
        let api_addr = app_cfg.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        info!("REST API listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_server = axum::serve(listener, create_api_router(state)).with_graceful_shutdown(
            async move {
                api_shutdown.wait().await;
                info!("REST API received shutdown signal");
            },
        );

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            repos,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Wait for the server to stop, then close the database.
    pub async fn wait(self) {
        match self.api_task.await {
            Ok(()) => info!("REST API server stopped"),
            Err(e) => error!("REST API server task panicked: {}", e),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("Fleet ledger shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        self.shutdown.signal().trigger();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
