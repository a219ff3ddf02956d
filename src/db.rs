//! Process-global database connection pool.

use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connects to the relational store and holds the pool for the lifetime of
/// the process.
/// Panics
pub async fn init_db(database_url: String) {
    let pool = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database.");

    DB_POOL
        .set(pool)
        .expect("init_db() must only be called once.");
}

pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("Database pool is not initialized.")
}
