use serde::Serialize;

use super::provided;

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Input for creating a client together with its initial phones.
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phones: Vec<String>,
}

impl NewClient {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phones: Vec::new(),
        }
    }

    pub fn with_phones<I, S>(mut self, phones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phones = phones.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial change to an existing client.
///
/// Name and email fields left as `None` (or empty) keep their stored value.
/// A non-empty `phones` list replaces every phone the client currently has.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phones: Option<Vec<String>>,
}

impl ClientUpdate {
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

    pub fn phones<I, S>(mut self, phones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phones = Some(phones.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the coalescing UPDATE on `clients` has to run at all.
    pub fn has_field_changes(&self) -> bool {
        provided(&self.first_name).is_some()
            || provided(&self.last_name).is_some()
            || provided(&self.email).is_some()
    }

    /// The phone list to install, if any. An empty list leaves phones untouched.
    pub fn replacement_phones(&self) -> Option<&[String]> {
        self.phones
            .as_deref()
            .filter(|phones| !phones.is_empty())
    }
}

/// Result of deleting a client by id.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}
