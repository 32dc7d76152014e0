/// Item Service Library
///
/// Link-sharing and discussion service: submit links, comment, like,
/// bookmark. Feed listing is keyset-paginated in three modes (recency,
/// trending score, historical window) and comment threads are rebuilt
/// from flat rows with soft-delete redaction.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for items, comments, likes, bookmarks
/// - `services`: Business logic layer (ranking, pagination, threads)
/// - `db`: Database access layer and repositories
/// - `workers`: Background counter/score maintenance queue
/// - `search`: Best-effort search index notification
/// - `middleware`: Caller identity extraction
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod search;
pub mod services;
pub mod workers;

pub use config::Config;
pub use error::{AppError, Result};
