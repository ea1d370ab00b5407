use serde::Serialize;

/// A phone number owned by a client. Both columns are nullable in the schema.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub id: i32,
    pub client_id: Option<i32>,
    pub phone: Option<String>,
}
