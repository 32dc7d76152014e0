/// Business logic layer
///
/// Service types are stateless and constructed per request with an
/// injected pool (plus the maintenance queue handle where mutations
/// need background follow-up work).
pub mod bookmarks;
pub mod comments;
pub mod cursor;
pub mod items;
pub mod ranking;

pub use bookmarks::BookmarkService;
pub use comments::CommentService;
pub use items::ItemService;
