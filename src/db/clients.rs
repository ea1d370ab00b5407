use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{
    provided, Client, ClientFilter, ClientRow, ClientUpdate, DeleteOutcome, NewClient, Phone,
};

const FIND_CLIENTS_BASE: &str = r#"
    SELECT clients.id, clients.first_name, clients.last_name, clients.email, phones.phone
    FROM clients
    LEFT JOIN phones ON clients.id = phones.client_id
    WHERE TRUE"#;

async fn insert_phones(conn: &mut PgConnection, client_id: i32, phones: &[String]) -> Result<()> {
    for phone in phones {
        sqlx::query("INSERT INTO phones (client_id, phone) VALUES ($1, $2)")
            .bind(client_id)
            .bind(phone)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Insert a client and its initial phones, returning the generated client id.
pub async fn add_client(conn: &mut PgConnection, client: &NewClient) -> Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO clients (first_name, last_name, email)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&client.first_name)
    .bind(&client.last_name)
    .bind(&client.email)
    .fetch_one(&mut *conn)
    .await?;

    insert_phones(conn, id, &client.phones).await?;

    info!(client_id = id, phones = client.phones.len(), "added client");
    Ok(id)
}

/// Attach a phone to a client. A missing client surfaces as a foreign-key violation.
pub async fn add_phone(conn: &mut PgConnection, client_id: i32, phone: &str) -> Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO phones (client_id, phone) VALUES ($1, $2) RETURNING id",
    )
    .bind(client_id)
    .bind(phone)
    .fetch_one(&mut *conn)
    .await?;

    debug!(client_id, phone_id = id, "added phone");
    Ok(id)
}

pub async fn update_client(
    conn: &mut PgConnection,
    client_id: i32,
    update: &ClientUpdate,
) -> Result<()> {
    if update.has_field_changes() {
        sqlx::query(
            r#"
            UPDATE clients
            SET first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                email = COALESCE($3, email)
            WHERE id = $4
            "#,
        )
        .bind(provided(&update.first_name))
        .bind(provided(&update.last_name))
        .bind(provided(&update.email))
        .bind(client_id)
        .execute(&mut *conn)
        .await?;

        debug!(client_id, "updated client fields");
    }

    if let Some(phones) = update.replacement_phones() {
        sqlx::query("DELETE FROM phones WHERE client_id = $1")
            .bind(client_id)
            .execute(&mut *conn)
            .await?;

        insert_phones(conn, client_id, phones).await?;

        debug!(client_id, phones = phones.len(), "replaced client phones");
    }

    Ok(())
}

/// Remove every phone of `client_id` whose number equals `phone`. Returns the number removed.
pub async fn delete_phone(conn: &mut PgConnection, client_id: i32, phone: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM phones WHERE client_id = $1 AND phone = $2")
        .bind(client_id)
        .bind(phone)
        .execute(&mut *conn)
        .await?;

    debug!(client_id, removed = result.rows_affected(), "deleted phone");
    Ok(result.rows_affected())
}

/// Delete a client and, through the cascade, all of its phones.
///
/// An unknown id is reported with a warning and leaves the database untouched.
pub async fn delete_client(conn: &mut PgConnection, client_id: i32) -> Result<DeleteOutcome> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM clients WHERE id = $1")
        .bind(client_id)
        .fetch_one(&mut *conn)
        .await?;

    if count == 0 {
        warn!(client_id, "client not found, nothing deleted");
        return Ok(DeleteOutcome::NotFound);
    }

    sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(client_id)
        .execute(&mut *conn)
        .await?;

    info!(client_id, "deleted client");
    Ok(DeleteOutcome::Deleted)
}

/// Build the search statement for `filter`, binding every value.
pub fn build_find_query(filter: &ClientFilter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new(FIND_CLIENTS_BASE);

    for (column, value) in filter.conditions() {
        query.push(" AND ");
        query.push(column);
        query.push(" = ");
        query.push_bind(value);
    }

    query.push(" ORDER BY clients.id, phones.id");
    query
}

/// Search clients joined with their phones. See [`ClientRow`] for row multiplicity.
pub async fn find_client(conn: &mut PgConnection, filter: &ClientFilter) -> Result<Vec<ClientRow>> {
    let mut query = build_find_query(filter);
    let rows = query
        .build_query_as::<ClientRow>()
        .fetch_all(&mut *conn)
        .await?;

    debug!(matches = rows.len(), "searched clients");
    Ok(rows)
}

pub async fn get_client(conn: &mut PgConnection, client_id: i32) -> Result<Option<Client>> {
    let client = sqlx::query_as::<_, Client>(
        "SELECT id, first_name, last_name, email FROM clients WHERE id = $1",
    )
    .bind(client_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(client)
}

pub async fn get_phones(conn: &mut PgConnection, client_id: i32) -> Result<Vec<Phone>> {
    let phones = sqlx::query_as::<_, Phone>(
        "SELECT id, client_id, phone FROM phones WHERE client_id = $1 ORDER BY id ASC",
    )
    .bind(client_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(phones)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ClientFilter::new();
        let query = build_find_query(&filter);

        assert_eq!(
            normalized(query.sql()),
            "SELECT clients.id, clients.first_name, clients.last_name, clients.email, phones.phone \
             FROM clients LEFT JOIN phones ON clients.id = phones.client_id \
             WHERE TRUE ORDER BY clients.id, phones.id"
        );
    }

    #[test]
    fn each_field_adds_a_bound_condition() {
        let filter = ClientFilter::new()
            .first_name("Vasily")
            .last_name("Terkin")
            .email("terkin23@mail.ru")
            .phone("+7 992 345 99 99");
        let query = build_find_query(&filter);

        assert!(normalized(query.sql()).ends_with(
            "WHERE TRUE AND clients.first_name = $1 AND clients.last_name = $2 \
             AND clients.email = $3 AND phones.phone = $4 ORDER BY clients.id, phones.id"
        ));
    }

    #[test]
    fn values_never_appear_in_sql_text() {
        let filter = ClientFilter::new().last_name("O'Brien; DROP TABLE clients");
        let query = build_find_query(&filter);

        let sql = query.sql();
        assert!(!sql.contains("O'Brien"));
        assert!(normalized(sql).contains("AND clients.last_name = $1"));
    }

    #[test]
    fn phone_only_filter_uses_first_placeholder() {
        let filter = ClientFilter::new().phone("+7 990 888 88 88");
        let query = build_find_query(&filter);

        assert!(normalized(query.sql()).contains("WHERE TRUE AND phones.phone = $1 ORDER BY"));
        assert!(!query.sql().contains("$2"));
    }
}
