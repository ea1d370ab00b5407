use thiserror::Error;

/// SQLSTATE raised when a row references a missing parent.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// SQLSTATE raised when a required column receives NULL.
const NOT_NULL_VIOLATION: &str = "23502";

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] envy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    fn sqlstate(&self) -> Option<String> {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().map(|code| code.into_owned())
            }
            _ => None,
        }
    }

    /// True when the database rejected a phone for a client that does not exist.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.sqlstate().as_deref() == Some(FOREIGN_KEY_VIOLATION)
    }

    pub fn is_not_null_violation(&self) -> bool {
        self.sqlstate().as_deref() == Some(NOT_NULL_VIOLATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_constraint_violations() {
        let err = Error::Database(sqlx::Error::RowNotFound);
        assert!(!err.is_foreign_key_violation());
        assert!(!err.is_not_null_violation());
    }

    #[test]
    fn database_errors_display_unchanged() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
    }
}
