mod client;
mod filter;
mod phone;

pub use client::{Client, ClientUpdate, DeleteOutcome, NewClient};
pub use filter::{ClientFilter, ClientRow};
pub use phone::Phone;

/// Treats `None` and empty strings alike as "not provided".
pub(crate) fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
