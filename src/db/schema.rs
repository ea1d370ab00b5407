use sqlx::PgConnection;
use tracing::{debug, info};

use crate::error::Result;

const CREATE_CLIENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS clients (
        id SERIAL PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL
    )
"#;

const CREATE_PHONES: &str = r#"
    CREATE TABLE IF NOT EXISTS phones (
        id SERIAL PRIMARY KEY,
        client_id INTEGER REFERENCES clients(id) ON DELETE CASCADE,
        phone TEXT
    )
"#;

/// Drop both tables if present. `phones` goes first since it references `clients`.
pub async fn drop_schema(conn: &mut PgConnection) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS phones")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS clients")
        .execute(&mut *conn)
        .await?;

    debug!("dropped phones and clients tables");
    Ok(())
}

/// Recreate an empty `clients`/`phones` schema, destroying any existing data.
pub async fn initialize_schema(conn: &mut PgConnection) -> Result<()> {
    drop_schema(conn).await?;

    sqlx::query(CREATE_CLIENTS).execute(&mut *conn).await?;
    sqlx::query(CREATE_PHONES).execute(&mut *conn).await?;

    info!("initialized clients schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phones_cascade_on_client_delete() {
        assert!(CREATE_PHONES.contains("REFERENCES clients(id) ON DELETE CASCADE"));
    }

    #[test]
    fn client_fields_are_required() {
        for column in ["first_name TEXT NOT NULL", "last_name TEXT NOT NULL", "email TEXT NOT NULL"] {
            assert!(CREATE_CLIENTS.contains(column), "missing {column}");
        }
    }
}
