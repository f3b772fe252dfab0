use crate::config::AppConfig;
use crate::entities::payment_signal;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema,
};
use std::time::Duration;
use tracing::info;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool to the payment-signal store.
pub async fn establish_connection(cfg: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(cfg.database_url.clone());
    options
        .max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_connections)
        .connect_timeout(Duration::from_secs(cfg.db_connect_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.db_idle_timeout_secs))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("database connection established");
    Ok(db)
}

/// Creates the `payment_signals` table when absent. Used on startup with
/// `auto_migrate` and by tests running against `sqlite::memory:`.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(payment_signal::Entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}
