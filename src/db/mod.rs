/// Database access layer
///
/// Repository functions per entity, operating on `&PgPool`. Counter
/// updates always recompute from the authoritative like/comment rows in
/// a single statement, which keeps concurrent mutations safe without
/// explicit locking.
pub mod bookmark_repo;
pub mod comment_like_repo;
pub mod comment_repo;
pub mod item_like_repo;
pub mod item_repo;
pub mod item_stats_repo;
pub mod publisher_repo;
