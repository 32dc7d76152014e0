/// HTTP request handlers
///
/// Thin adapters: decode params, resolve caller identity, delegate to
/// the service layer, serialize the response.
pub mod bookmarks;
pub mod comments;
pub mod items;

pub use bookmarks::*;
pub use comments::*;
pub use items::*;
