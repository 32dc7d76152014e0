/// Data models for item-service
///
/// Entity structs mirror table rows (`sqlx::FromRow`); the `*Record`
/// structs are denormalized join rows used by the read paths; the
/// response structs are the JSON shapes produced for callers.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Item entity - a submitted link
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub link: String,
    pub author: Option<String>,
    pub user_id: i64,
    pub publisher_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// ItemStats entity - denormalized counters, one row per item.
/// Always derived from like/comment rows, never hand-set.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemStats {
    pub item_id: i64,
    pub likes: i64,
    pub comments_count: i64,
    pub score: f64,
}

/// Publisher entity - the site a link points at, keyed by domain
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Publisher {
    pub id: i64,
    pub domain: String,
    pub name: String,
    pub favicon: Option<String>,
}

/// Comment entity. `parent_comment_id`, when set, always references a
/// root comment (depth is capped at 2 on the write path).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub item_id: i64,
    pub user_id: i64,
    pub parent_comment_id: Option<i64>,
    pub mention_user_id: Option<i64>,
    pub text: String,
    pub likes: i64,
    pub sub_comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Denormalized item row: item joined with author username, publisher
/// and stats. Produced by the listing/lookup queries in `db::item_repo`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRecord {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub link: String,
    pub author: Option<String>,
    pub user_id: i64,
    pub username: String,
    pub publisher_id: i64,
    pub publisher_domain: String,
    pub publisher_name: String,
    pub publisher_favicon: Option<String>,
    pub likes: i64,
    pub comments_count: i64,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized comment row: comment joined with author and mention
/// usernames. Includes soft-deleted rows; redaction happens when the
/// row is turned into a [`CommentNode`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: i64,
    pub item_id: i64,
    pub user_id: i64,
    pub username: String,
    pub parent_comment_id: Option<i64>,
    pub mention_user_id: Option<i64>,
    pub mention_username: Option<String>,
    pub text: String,
    pub likes: i64,
    pub sub_comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Bookmark row joined with the bookmarked item
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookmarkRecord {
    pub bookmark_id: i64,
    pub bookmarked_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub item: ItemRecord,
}

/// Minimal user reference embedded in responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

/// Publisher reference embedded in responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherRef {
    pub id: i64,
    pub domain: String,
    pub name: String,
    pub favicon: Option<String>,
}

/// Counter pair exposed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatsBody {
    pub likes: i64,
    pub comments_count: i64,
}

/// Item as serialized for callers, with per-caller flags
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub link: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserRef,
    pub publisher: PublisherRef,
    pub item_stats: ItemStatsBody,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

impl ItemResponse {
    pub fn from_record(record: ItemRecord, is_liked: bool, is_bookmarked: bool) -> Self {
        ItemResponse {
            id: record.id,
            title: record.title,
            body: record.body,
            link: record.link,
            author: record.author,
            created_at: record.created_at,
            updated_at: record.updated_at,
            user: UserRef {
                id: record.user_id,
                username: record.username,
            },
            publisher: PublisherRef {
                id: record.publisher_id,
                domain: record.publisher_domain,
                name: record.publisher_name,
                favicon: record.publisher_favicon,
            },
            item_stats: ItemStatsBody {
                likes: record.likes,
                comments_count: record.comments_count,
            },
            is_liked,
            is_bookmarked,
        }
    }
}

/// Comment as serialized for callers. Root comments carry their live
/// replies in `sub_comments`; replies leave it unset.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    pub id: i64,
    pub item_id: i64,
    pub parent_comment_id: Option<i64>,
    pub text: String,
    pub likes: i64,
    pub sub_comments_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserRef,
    pub mention_user: Option<UserRef>,
    pub is_deleted: bool,
    pub is_liked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_comments: Option<Vec<CommentNode>>,
}

impl CommentNode {
    /// Turn a stored row into its caller-visible shape, applying the
    /// soft-delete redaction up front so no later step branches on
    /// delete state again.
    pub fn from_record(record: CommentRecord, is_liked: bool) -> Self {
        if record.deleted_at.is_some() {
            return CommentNode {
                id: record.id,
                item_id: record.item_id,
                parent_comment_id: record.parent_comment_id,
                text: String::new(),
                likes: 0,
                sub_comments_count: 0,
                created_at: DateTime::<Utc>::UNIX_EPOCH,
                updated_at: DateTime::<Utc>::UNIX_EPOCH,
                user: UserRef {
                    id: -1,
                    username: "deleted".to_string(),
                },
                mention_user: None,
                is_deleted: true,
                is_liked: false,
                sub_comments: None,
            };
        }

        let mention_user = match (record.mention_user_id, record.mention_username) {
            (Some(id), Some(username)) => Some(UserRef { id, username }),
            _ => None,
        };

        CommentNode {
            id: record.id,
            item_id: record.item_id,
            parent_comment_id: record.parent_comment_id,
            text: record.text,
            likes: record.likes,
            sub_comments_count: record.sub_comments_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
            user: UserRef {
                id: record.user_id,
                username: record.username,
            },
            mention_user,
            is_deleted: false,
            is_liked,
            sub_comments: None,
        }
    }
}

/// Bookmark as serialized for callers
#[derive(Debug, Clone, Serialize)]
pub struct BookmarkResponse {
    pub id: i64,
    pub bookmarked_at: DateTime<Utc>,
    pub item: ItemResponse,
}

/// Response to an item like/unlike mutation
#[derive(Debug, Clone, Serialize)]
pub struct ItemLikeResponse {
    pub id: i64,
    pub item_stats: ItemStatsBody,
    pub is_liked: bool,
}

/// Response to a comment like/unlike mutation
#[derive(Debug, Clone, Serialize)]
pub struct CommentLikeResponse {
    pub id: i64,
    pub likes: i64,
}

/// Cursor-paginated page
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total_count: i64,
    pub page_info: PageInfo,
}

/// Keyset page boundary. `end_cursor` is only set when another page
/// exists.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    pub fn new(list: Vec<T>, total_count: i64, end_cursor: Option<String>, has_next_page: bool) -> Self {
        Page {
            list,
            total_count,
            page_info: PageInfo {
                end_cursor: if has_next_page { end_cursor } else { None },
                has_next_page,
            },
        }
    }
}
