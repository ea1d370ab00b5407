pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;

pub use db::Database;
pub use error::{Error, Result};
pub use models::{Client, ClientFilter, ClientRow, ClientUpdate, DeleteOutcome, NewClient, Phone};
