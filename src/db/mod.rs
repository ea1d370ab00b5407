pub mod clients;
pub mod schema;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{Client, ClientFilter, ClientRow, ClientUpdate, DeleteOutcome, NewClient, Phone};

/// Database connection pool
///
/// Each operation method runs in its own transaction and commits before
/// returning. To group several operations into one unit, call [`Database::begin`]
/// and use the functions in [`clients`] and [`schema`] directly; the transaction
/// rolls back if it is dropped without `commit`.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Start a scoped transaction.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    // Schema operations
    pub async fn initialize_schema(&self) -> Result<()> {
        let mut tx = self.begin().await?;
        schema::initialize_schema(&mut tx).await?;
        tx.commit().await?;

        Ok(())
    }

    // Client operations
    pub async fn add_client(&self, client: &NewClient) -> Result<i32> {
        let mut tx = self.begin().await?;
        let id = clients::add_client(&mut tx, client).await?;
        tx.commit().await?;

        Ok(id)
    }

    pub async fn add_phone(&self, client_id: i32, phone: &str) -> Result<i32> {
        let mut tx = self.begin().await?;
        let id = clients::add_phone(&mut tx, client_id, phone).await?;
        tx.commit().await?;

        Ok(id)
    }

    pub async fn update_client(&self, client_id: i32, update: &ClientUpdate) -> Result<()> {
        let mut tx = self.begin().await?;
        clients::update_client(&mut tx, client_id, update).await?;
        tx.commit().await?;

        Ok(())
    }

    pub async fn delete_phone(&self, client_id: i32, phone: &str) -> Result<u64> {
        let mut tx = self.begin().await?;
        let removed = clients::delete_phone(&mut tx, client_id, phone).await?;
        tx.commit().await?;

        Ok(removed)
    }

    pub async fn delete_client(&self, client_id: i32) -> Result<DeleteOutcome> {
        let mut tx = self.begin().await?;
        let outcome = clients::delete_client(&mut tx, client_id).await?;
        tx.commit().await?;

        Ok(outcome)
    }

    // Read operations
    pub async fn find_client(&self, filter: &ClientFilter) -> Result<Vec<ClientRow>> {
        let mut conn = self.pool.acquire().await?;
        clients::find_client(&mut conn, filter).await
    }

    pub async fn get_client(&self, client_id: i32) -> Result<Option<Client>> {
        let mut conn = self.pool.acquire().await?;
        clients::get_client(&mut conn, client_id).await
    }

    pub async fn get_phones(&self, client_id: i32) -> Result<Vec<Phone>> {
        let mut conn = self.pool.acquire().await?;
        clients::get_phones(&mut conn, client_id).await
    }
}

/// Initialize the database connection pool
pub async fn init(config: &DatabaseConfig) -> Result<Database> {
    let db = Database::new(config).await?;
    info!(
        max_connections = config.max_connections,
        "database connection established"
    );

    Ok(db)
}
