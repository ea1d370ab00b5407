use serde::Serialize;

use super::provided;

/// Search criteria for clients. Every present field must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ClientFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    /// Column/value pairs to match, in query order. Empty values are skipped.
    pub fn conditions(&self) -> Vec<(&'static str, &str)> {
        [
            ("clients.first_name", &self.first_name),
            ("clients.last_name", &self.last_name),
            ("clients.email", &self.email),
            ("phones.phone", &self.phone),
        ]
        .into_iter()
        .filter_map(|(column, value)| provided(value).map(|v| (column, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions().is_empty()
    }
}

/// One row of a client search: a client joined with one of its phones.
///
/// Clients with several phones appear once per phone; clients without
/// phones appear once with `phone` set to `None`.
#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientRow {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}
