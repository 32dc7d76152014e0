/// Comment service - thread reconstruction and comment mutations
///
/// Threads are two levels deep by construction: the write path collapses
/// a reply-to-a-reply onto the original root, so the read path only ever
/// partitions roots from direct replies.
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};

use crate::db::{comment_like_repo, comment_repo, item_repo};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentLikeResponse, CommentNode};
use crate::workers::{MaintenanceQueue, MaintenanceTask};

pub struct CommentService {
    pool: PgPool,
    queue: MaintenanceQueue,
}

impl CommentService {
    pub fn new(pool: PgPool, queue: MaintenanceQueue) -> Self {
        Self { pool, queue }
    }

    /// The full thread for an item: flat rows in, redacted two-level
    /// tree out.
    pub async fn list_thread(
        &self,
        item_id: i64,
        user_id: Option<i64>,
    ) -> Result<Vec<CommentNode>> {
        let records = comment_repo::list_by_item(&self.pool, item_id).await?;

        let liked = match user_id {
            Some(uid) => {
                let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
                comment_like_repo::batch_check_liked(&self.pool, uid, &ids).await?
            }
            None => HashSet::new(),
        };

        let nodes = records
            .into_iter()
            .map(|record| {
                let is_liked = liked.contains(&record.id);
                CommentNode::from_record(record, is_liked)
            })
            .collect();

        Ok(build_thread(nodes))
    }

    /// Fetch one live comment, optionally with its live replies.
    /// Soft-deleted comments fetched directly are not found.
    pub async fn get_comment(
        &self,
        comment_id: i64,
        user_id: Option<i64>,
        with_sub_comments: bool,
    ) -> Result<CommentNode> {
        let record = comment_repo::find_record_by_id(&self.pool, comment_id)
            .await?
            .filter(|r| r.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} does not exist")))?;

        let is_liked = match user_id {
            Some(uid) => comment_like_repo::check_user_liked(&self.pool, comment_id, uid).await?,
            None => false,
        };

        let mut node = CommentNode::from_record(record, is_liked);
        if with_sub_comments {
            node.sub_comments = Some(self.get_sub_comments(comment_id, user_id).await?);
        }

        Ok(node)
    }

    /// Live replies under a root comment
    pub async fn get_sub_comments(
        &self,
        comment_id: i64,
        user_id: Option<i64>,
    ) -> Result<Vec<CommentNode>> {
        let records = comment_repo::list_live_replies(&self.pool, comment_id).await?;

        let liked = match user_id {
            Some(uid) => {
                let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
                comment_like_repo::batch_check_liked(&self.pool, uid, &ids).await?
            }
            None => HashSet::new(),
        };

        Ok(records
            .into_iter()
            .map(|record| {
                let is_liked = liked.contains(&record.id);
                CommentNode::from_record(record, is_liked)
            })
            .collect())
    }

    /// Create a root comment or a reply. Replies to replies are
    /// re-parented onto the original root so depth never exceeds 2;
    /// in that case the immediate parent's author is mentioned, unless
    /// they are the replier.
    pub async fn create_comment(
        &self,
        item_id: i64,
        user_id: i64,
        text: &str,
        parent_comment_id: Option<i64>,
    ) -> Result<CommentNode> {
        item_repo::find_item_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id} does not exist")))?;

        let parent = match parent_comment_id {
            Some(parent_id) => {
                let parent = comment_repo::find_by_id(&self.pool, parent_id)
                    .await?
                    .filter(|c| c.deleted_at.is_none())
                    .ok_or_else(|| {
                        AppError::NotFound(format!("comment {parent_id} does not exist"))
                    })?;
                if parent.item_id != item_id {
                    return Err(AppError::BadRequest(
                        "parent comment belongs to another item".to_string(),
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let (target_parent_id, mention_user_id) = match &parent {
            Some(parent) => {
                let (target, mention) = resolve_reply_target(parent, user_id);
                (Some(target), mention)
            }
            None => (None, None),
        };

        let comment = comment_repo::create_comment(
            &self.pool,
            item_id,
            user_id,
            text,
            target_parent_id,
            mention_user_id,
        )
        .await?;

        // Fresh count, never an increment.
        if let Some(root_id) = target_parent_id {
            comment_repo::recount_replies(&self.pool, root_id).await?;
        }
        self.queue
            .enqueue(MaintenanceTask::RefreshItemCommentCount { item_id });

        let record = comment_repo::find_record_by_id(&self.pool, comment.id)
            .await?
            .ok_or_else(|| AppError::Internal("created comment vanished".to_string()))?;

        let mut node = CommentNode::from_record(record, false);
        node.sub_comments = Some(Vec::new());
        Ok(node)
    }

    /// Edit comment text. Author only.
    pub async fn update_comment(
        &self,
        comment_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<CommentNode> {
        let comment = self.find_live(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "comment belongs to another user".to_string(),
            ));
        }

        comment_repo::update_text(&self.pool, comment_id, text).await?;
        self.get_comment(comment_id, Some(user_id), true).await
    }

    /// Soft-delete a comment. Author only; the row stays for thread
    /// integrity and is redacted on read.
    pub async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<()> {
        let comment = self.find_live(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "comment belongs to another user".to_string(),
            ));
        }

        comment_repo::soft_delete(&self.pool, comment_id).await?;
        if let Some(root_id) = comment.parent_comment_id {
            comment_repo::recount_replies(&self.pool, root_id).await?;
        }
        self.queue.enqueue(MaintenanceTask::RefreshItemCommentCount {
            item_id: comment.item_id,
        });

        Ok(())
    }

    /// Idempotent comment like followed by a fresh count-and-store
    pub async fn like_comment(&self, comment_id: i64, user_id: i64) -> Result<CommentLikeResponse> {
        self.find_live(comment_id).await?;

        comment_like_repo::create_like(&self.pool, comment_id, user_id).await?;
        let likes = comment_repo::recount_likes(&self.pool, comment_id)
            .await?
            .unwrap_or(0);

        Ok(CommentLikeResponse {
            id: comment_id,
            likes,
        })
    }

    /// Idempotent comment unlike followed by a fresh count-and-store
    pub async fn unlike_comment(
        &self,
        comment_id: i64,
        user_id: i64,
    ) -> Result<CommentLikeResponse> {
        self.find_live(comment_id).await?;

        comment_like_repo::delete_like(&self.pool, comment_id, user_id).await?;
        let likes = comment_repo::recount_likes(&self.pool, comment_id)
            .await?
            .unwrap_or(0);

        Ok(CommentLikeResponse {
            id: comment_id,
            likes,
        })
    }

    async fn find_live(&self, comment_id: i64) -> Result<Comment> {
        comment_repo::find_by_id(&self.pool, comment_id)
            .await?
            .filter(|c| c.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} does not exist")))
    }
}

/// Where a new reply attaches, and who gets mentioned.
///
/// Replying to a root attaches to it directly with no mention.
/// Replying to a reply collapses onto the original root and mentions
/// the immediate parent's author, unless the replier is that author.
pub(crate) fn resolve_reply_target(parent: &Comment, author_id: i64) -> (i64, Option<i64>) {
    match parent.parent_comment_id {
        Some(root_id) => {
            let mention = if parent.user_id != author_id {
                Some(parent.user_id)
            } else {
                None
            };
            (root_id, mention)
        }
        None => (parent.id, None),
    }
}

/// Partition redacted nodes into roots with attached reply groups.
///
/// Input nodes are already redacted, so this never inspects delete
/// state beyond the `is_deleted` flag: deleted replies are dropped from
/// their groups, and a deleted root survives only while it still has a
/// live reply underneath it.
pub(crate) fn build_thread(nodes: Vec<CommentNode>) -> Vec<CommentNode> {
    let mut reply_groups: HashMap<i64, Vec<CommentNode>> = HashMap::new();
    let mut roots: Vec<CommentNode> = Vec::new();

    for node in nodes {
        match node.parent_comment_id {
            Some(parent_id) => {
                if !node.is_deleted {
                    reply_groups.entry(parent_id).or_default().push(node);
                }
            }
            None => roots.push(node),
        }
    }

    roots
        .into_iter()
        .filter_map(|mut root| {
            let sub_comments = reply_groups.remove(&root.id).unwrap_or_default();
            if root.is_deleted && sub_comments.is_empty() {
                return None;
            }
            root.sub_comments = Some(sub_comments);
            Some(root)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommentRecord;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn record(id: i64, user_id: i64, parent: Option<i64>, deleted: bool) -> CommentRecord {
        CommentRecord {
            id,
            item_id: 1,
            user_id,
            username: format!("user{user_id}"),
            parent_comment_id: parent,
            mention_user_id: None,
            mention_username: None,
            text: format!("comment {id}"),
            likes: 3,
            sub_comments_count: 1,
            created_at: at(1_700_000_000 + id),
            updated_at: at(1_700_000_000 + id),
            deleted_at: deleted.then(|| at(1_700_100_000)),
        }
    }

    fn comment(id: i64, user_id: i64, parent: Option<i64>) -> Comment {
        Comment {
            id,
            item_id: 1,
            user_id,
            parent_comment_id: parent,
            mention_user_id: None,
            text: format!("comment {id}"),
            likes: 0,
            sub_comments_count: 0,
            created_at: at(1_700_000_000),
            updated_at: at(1_700_000_000),
            deleted_at: None,
        }
    }

    fn nodes(records: Vec<CommentRecord>) -> Vec<CommentNode> {
        records
            .into_iter()
            .map(|r| CommentNode::from_record(r, false))
            .collect()
    }

    #[test]
    fn replies_attach_under_their_roots() {
        let thread = build_thread(nodes(vec![
            record(1, 10, None, false),
            record(2, 11, Some(1), false),
            record(3, 10, None, false),
            record(4, 12, Some(1), false),
            record(5, 13, Some(3), false),
        ]));

        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, 1);
        let subs: Vec<i64> = thread[0]
            .sub_comments
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(subs, vec![2, 4]);
        assert_eq!(thread[1].sub_comments.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn deleted_replies_are_dropped_from_groups() {
        let thread = build_thread(nodes(vec![
            record(1, 10, None, false),
            record(2, 11, Some(1), true),
            record(3, 12, Some(1), false),
        ]));

        let subs: Vec<i64> = thread[0]
            .sub_comments
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(subs, vec![3]);
    }

    #[test]
    fn deleted_root_without_live_replies_is_omitted() {
        let thread = build_thread(nodes(vec![
            record(1, 10, None, true),
            record(2, 11, Some(1), true),
            record(3, 12, None, false),
        ]));

        let ids: Vec<i64> = thread.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn deleted_root_with_live_reply_is_kept_redacted() {
        let thread = build_thread(nodes(vec![
            record(1, 10, None, true),
            record(2, 11, Some(1), false),
        ]));

        assert_eq!(thread.len(), 1);
        let root = &thread[0];
        assert!(root.is_deleted);
        assert_eq!(root.text, "");
        assert_eq!(root.likes, 0);
        assert_eq!(root.sub_comments_count, 0);
        assert_eq!(root.user.id, -1);
        assert_eq!(root.user.username, "deleted");
        assert_eq!(root.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert!(root.mention_user.is_none());
        assert_eq!(root.sub_comments.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn redaction_applies_before_partitioning() {
        // A deleted reply never leaks its content even if the grouping
        // logic changes: the node is redacted at construction time.
        let node = CommentNode::from_record(record(9, 42, Some(1), true), true);
        assert!(node.is_deleted);
        assert_eq!(node.text, "");
        assert!(!node.is_liked);
    }

    #[test]
    fn reply_to_root_attaches_directly_without_mention() {
        let root = comment(1, 10, None);
        assert_eq!(resolve_reply_target(&root, 20), (1, None));
    }

    #[test]
    fn reply_to_reply_collapses_to_root_and_mentions_parent_author() {
        // C2 is a reply to root C1; U1 wrote C2; U2 replies to C2.
        let c2 = comment(2, 1, Some(1));
        assert_eq!(resolve_reply_target(&c2, 2), (1, Some(1)));
    }

    #[test]
    fn self_reply_records_no_mention() {
        let c2 = comment(2, 1, Some(1));
        assert_eq!(resolve_reply_target(&c2, 1), (1, None));
    }
}
