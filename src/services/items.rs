/// Item service - submission, feed listing and like mutations
///
/// Feed listing runs in three keyset-paginated modes. Every page query
/// is a pure function of the cursor token, so concurrent writers can
/// shift unvisited rows but never duplicate or skip rows already behind
/// the cursor boundary.
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgPool;
use std::collections::HashSet;
use url::Url;

use crate::config::RankingConfig;
use crate::db::{bookmark_repo, item_like_repo, item_repo, item_stats_repo, publisher_repo};
use crate::error::{AppError, Result};
use crate::models::{ItemLikeResponse, ItemRecord, ItemResponse, ItemStatsBody, Page};
use crate::services::cursor::{LikesCursor, RankCursor, RecencyCursor};
use crate::workers::{MaintenanceQueue, MaintenanceTask};

static DATE_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid")
});

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Maximum inclusive span of the historical window, in days
const MAX_WINDOW_DAYS: i64 = 6;

/// Feed listing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    #[default]
    Recent,
    Trending,
    Past,
}

/// Parameters of a feed listing request
#[derive(Debug, Clone)]
pub struct ListItemsQuery {
    pub mode: ListMode,
    pub cursor: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: i64,
}

pub struct ItemService {
    pool: PgPool,
    queue: MaintenanceQueue,
    ranking: RankingConfig,
}

impl ItemService {
    pub fn new(pool: PgPool, queue: MaintenanceQueue, ranking: RankingConfig) -> Self {
        Self {
            pool,
            queue,
            ranking,
        }
    }

    /// Create an item with its stats row, then notify the search index
    /// in the background.
    pub async fn create_item(
        &self,
        user_id: i64,
        title: &str,
        body: &str,
        link: &str,
        author: Option<&str>,
    ) -> Result<ItemResponse> {
        let (link, domain) = normalize_link(link)?;
        let publisher = publisher_repo::get_or_create(&self.pool, &domain, &domain).await?;

        let item = item_repo::create_item(
            &self.pool,
            user_id,
            publisher.id,
            title,
            body,
            &link,
            author,
        )
        .await?;

        self.queue
            .enqueue(MaintenanceTask::SyncSearchDocument { item_id: item.id });

        self.get_item(item.id, Some(user_id)).await
    }

    /// Fetch a single item with the caller's like/bookmark flags
    pub async fn get_item(&self, item_id: i64, user_id: Option<i64>) -> Result<ItemResponse> {
        let record = item_repo::find_record_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id} does not exist")))?;

        let (is_liked, is_bookmarked) = match user_id {
            Some(uid) => tokio::try_join!(
                item_like_repo::check_user_liked(&self.pool, item_id, uid),
                bookmark_repo::check_user_bookmarked(&self.pool, item_id, uid),
            )?,
            None => (false, false),
        };

        Ok(ItemResponse::from_record(record, is_liked, is_bookmarked))
    }

    /// Edit title/body. Owner only.
    pub async fn update_item(
        &self,
        item_id: i64,
        user_id: i64,
        title: &str,
        body: &str,
    ) -> Result<ItemResponse> {
        let item = item_repo::find_item_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id} does not exist")))?;

        if item.user_id != user_id {
            return Err(AppError::Forbidden("item belongs to another user".into()));
        }

        item_repo::update_item(&self.pool, item_id, title, body).await?;
        self.queue
            .enqueue(MaintenanceTask::SyncSearchDocument { item_id });

        self.get_item(item_id, Some(user_id)).await
    }

    /// Delete an item. Owner only; dependents cascade in the store.
    pub async fn delete_item(&self, item_id: i64, user_id: i64) -> Result<()> {
        let item = item_repo::find_item_by_id(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id} does not exist")))?;

        if item.user_id != user_id {
            return Err(AppError::Forbidden("item belongs to another user".into()));
        }

        item_repo::delete_item(&self.pool, item_id).await?;
        self.queue
            .enqueue(MaintenanceTask::DeleteSearchDocument { item_id });

        Ok(())
    }

    /// Idempotent like: a duplicate create is absorbed. The like
    /// counter is recounted from the like rows before responding; the
    /// score refresh rides the maintenance queue.
    pub async fn like_item(&self, item_id: i64, user_id: i64) -> Result<ItemLikeResponse> {
        let stats = item_stats_repo::find_by_item(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id} does not exist")))?;

        item_like_repo::create_like(&self.pool, item_id, user_id).await?;
        let likes = item_stats_repo::recount_likes(&self.pool, item_id)
            .await?
            .unwrap_or(stats.likes);

        self.queue
            .enqueue(MaintenanceTask::RefreshItemScore { item_id });

        Ok(ItemLikeResponse {
            id: item_id,
            item_stats: ItemStatsBody {
                likes,
                comments_count: stats.comments_count,
            },
            is_liked: true,
        })
    }

    /// Idempotent unlike: a missing like row is a no-op.
    pub async fn unlike_item(&self, item_id: i64, user_id: i64) -> Result<ItemLikeResponse> {
        let stats = item_stats_repo::find_by_item(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item {item_id} does not exist")))?;

        item_like_repo::delete_like(&self.pool, item_id, user_id).await?;
        let likes = item_stats_repo::recount_likes(&self.pool, item_id)
            .await?
            .unwrap_or(stats.likes);

        self.queue
            .enqueue(MaintenanceTask::RefreshItemScore { item_id });

        Ok(ItemLikeResponse {
            id: item_id,
            item_stats: ItemStatsBody {
                likes,
                comments_count: stats.comments_count,
            },
            is_liked: false,
        })
    }

    /// Feed listing, dispatched by mode
    pub async fn list_items(
        &self,
        query: ListItemsQuery,
        user_id: Option<i64>,
    ) -> Result<Page<ItemResponse>> {
        let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

        let (records, total_count, end_cursor, has_next_page) = match query.mode {
            ListMode::Recent => self.list_recent(query.cursor.as_deref(), limit).await?,
            ListMode::Trending => self.list_trending(query.cursor.as_deref(), limit).await?,
            ListMode::Past => {
                self.list_past(
                    query.cursor.as_deref(),
                    query.start_date.as_deref(),
                    query.end_date.as_deref(),
                    limit,
                )
                .await?
            }
        };

        let list = self.serialize_records(records, user_id).await?;
        Ok(Page::new(list, total_count, end_cursor, has_next_page))
    }

    async fn list_recent(
        &self,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<(Vec<ItemRecord>, i64, Option<String>, bool)> {
        let cursor = cursor.map(RecencyCursor::decode).transpose()?;

        let (total_count, records) = tokio::try_join!(
            item_repo::count_items(&self.pool),
            item_repo::list_recent(&self.pool, cursor.map(|c| c.id), limit),
        )?;

        let (end_cursor, has_next_page) = match records.last() {
            Some(last) => {
                let end = RecencyCursor { id: last.id };
                let more = item_repo::has_recent_after(&self.pool, last.id).await?;
                (Some(end.encode()), more)
            }
            None => (None, false),
        };

        Ok((records, total_count, end_cursor, has_next_page))
    }

    async fn list_trending(
        &self,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<(Vec<ItemRecord>, i64, Option<String>, bool)> {
        let min_score = self.ranking.trending_min_score;
        let cursor = cursor.map(RankCursor::decode).transpose()?;

        let (total_count, records) = tokio::try_join!(
            item_stats_repo::count_trending(&self.pool, min_score),
            item_repo::list_trending(
                &self.pool,
                min_score,
                cursor.map(|c| (c.score, c.id)),
                limit,
            ),
        )?;

        let (end_cursor, has_next_page) = match records.last() {
            Some(last) => {
                let end = RankCursor {
                    score: last.score,
                    id: last.id,
                };
                let more =
                    item_repo::has_trending_after(&self.pool, min_score, last.score, last.id)
                        .await?;
                (Some(end.encode()), more)
            }
            None => (None, false),
        };

        Ok((records, total_count, end_cursor, has_next_page))
    }

    async fn list_past(
        &self,
        cursor: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: i64,
    ) -> Result<(Vec<ItemRecord>, i64, Option<String>, bool)> {
        let (from, to) = validate_window(start_date, end_date)?;
        let cursor = cursor.map(LikesCursor::decode).transpose()?;

        let (total_count, records) = tokio::try_join!(
            item_repo::count_items_in_window(&self.pool, from, to),
            item_repo::list_past(
                &self.pool,
                from,
                to,
                cursor.map(|c| (c.likes, c.id)),
                limit,
            ),
        )?;

        let (end_cursor, has_next_page) = match records.last() {
            Some(last) => {
                let end = LikesCursor {
                    likes: last.likes,
                    id: last.id,
                };
                let more =
                    item_repo::has_past_after(&self.pool, from, to, last.likes, last.id).await?;
                (Some(end.encode()), more)
            }
            None => (None, false),
        };

        Ok((records, total_count, end_cursor, has_next_page))
    }

    /// Attach per-caller like/bookmark flags with two batched lookups
    async fn serialize_records(
        &self,
        records: Vec<ItemRecord>,
        user_id: Option<i64>,
    ) -> Result<Vec<ItemResponse>> {
        let (liked, bookmarked) = match user_id {
            Some(uid) => {
                let item_ids: Vec<i64> = records.iter().map(|r| r.id).collect();
                tokio::try_join!(
                    item_like_repo::batch_check_liked(&self.pool, uid, &item_ids),
                    bookmark_repo::batch_check_bookmarked(&self.pool, uid, &item_ids),
                )?
            }
            None => (HashSet::new(), HashSet::new()),
        };

        Ok(records
            .into_iter()
            .map(|record| {
                let is_liked = liked.contains(&record.id);
                let is_bookmarked = bookmarked.contains(&record.id);
                ItemResponse::from_record(record, is_liked, is_bookmarked)
            })
            .collect())
    }
}

/// Ensure the link parses as a URL (prefixing https:// when no scheme
/// was given) and extract its domain for the publisher lookup.
fn normalize_link(link: &str) -> Result<(String, String)> {
    let candidate = if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{link}")
    };

    let url = Url::parse(&candidate)
        .map_err(|_| AppError::BadRequest("link is not a valid URL".to_string()))?;
    let domain = url
        .host_str()
        .ok_or_else(|| AppError::BadRequest("link is not a valid URL".to_string()))?
        .to_string();

    Ok((candidate, domain))
}

/// Validate the historical-window bounds: both present, strict
/// YYYY-MM-DD, span at most 6 days inclusive. Returns the inclusive
/// [start 00:00:00, end 23:59:59] UTC range.
fn validate_window(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = match (start_date, end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(AppError::BadRequest(
                "start_date or end_date is missing".to_string(),
            ))
        }
    };

    if !DATE_FORMAT.is_match(start) || !DATE_FORMAT.is_match(end) {
        return Err(AppError::BadRequest(
            "Date format should be YYYY-MM-DD".to_string(),
        ));
    }

    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Date format should be YYYY-MM-DD".to_string()))?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Date format should be YYYY-MM-DD".to_string()))?;

    if (end - start).num_days() > MAX_WINDOW_DAYS {
        return Err(AppError::BadRequest(
            "Date range should be less than 7 days".to_string(),
        ));
    }

    let from = NaiveDateTime::new(start, NaiveTime::MIN).and_utc();
    let to = NaiveDateTime::new(end, NaiveTime::MIN).and_utc() + Duration::seconds(86_399);

    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_requires_both_bounds() {
        assert!(matches!(
            validate_window(Some("2024-01-01"), None),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_window(None, Some("2024-01-01")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_window(None, None),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn window_rejects_malformed_dates() {
        for bad in ["2024/01/01", "2024-1-1", "20240101", "yesterday", ""] {
            assert!(
                matches!(
                    validate_window(Some(bad), Some("2024-01-02")),
                    Err(AppError::BadRequest(_))
                ),
                "accepted malformed date {bad:?}"
            );
        }
    }

    #[test]
    fn window_rejects_ten_day_span() {
        assert!(matches!(
            validate_window(Some("2024-01-01"), Some("2024-01-10")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn window_accepts_six_day_span_inclusive() {
        let (from, to) = validate_window(Some("2024-01-01"), Some("2024-01-07")).unwrap();
        assert_eq!(from.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2024-01-07T23:59:59+00:00");
    }

    #[test]
    fn window_accepts_single_day() {
        let (from, to) = validate_window(Some("2024-03-05"), Some("2024-03-05")).unwrap();
        assert!(from < to);
    }

    #[test]
    fn link_without_scheme_gets_https() {
        let (link, domain) = normalize_link("news.example.com/story").unwrap();
        assert_eq!(link, "https://news.example.com/story");
        assert_eq!(domain, "news.example.com");
    }

    #[test]
    fn link_with_scheme_is_kept() {
        let (link, domain) = normalize_link("http://example.com/a").unwrap();
        assert_eq!(link, "http://example.com/a");
        assert_eq!(domain, "example.com");
    }

    #[test]
    fn unparseable_link_is_rejected() {
        assert!(normalize_link("http://").is_err());
        assert!(normalize_link("").is_err());
    }

    // In-memory model of the trending/past keyset walk: the predicate
    // and ordering here mirror the SQL in `db::item_repo` so page
    // stitching can be exercised without a database.
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Row {
        id: i64,
        rank: f64,
    }

    fn fetch_page(rows: &[Row], min: f64, cursor: Option<(f64, i64)>, limit: usize) -> Vec<Row> {
        let mut eligible: Vec<Row> = rows
            .iter()
            .copied()
            .filter(|r| r.rank >= min)
            .filter(|r| match cursor {
                Some((rank, id)) => (r.rank, r.id) < (rank, id),
                None => true,
            })
            .collect();
        eligible.sort_by(|a, b| {
            b.rank
                .partial_cmp(&a.rank)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.id.cmp(&a.id))
        });
        eligible.truncate(limit);
        eligible
    }

    #[test]
    fn keyset_walk_visits_each_eligible_row_exactly_once() {
        // Heavy ties on rank, plus rows below the floor.
        let rows: Vec<Row> = vec![
            Row { id: 1, rank: 0.5 },
            Row { id: 2, rank: 0.5 },
            Row { id: 3, rank: 0.5 },
            Row { id: 4, rank: 2.0 },
            Row { id: 5, rank: 0.0005 },
            Row { id: 6, rank: 1.0 },
            Row { id: 7, rank: 0.5 },
            Row { id: 8, rank: 2.0 },
            Row { id: 9, rank: 0.001 },
        ];

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = fetch_page(&rows, 0.001, cursor, 2);
            if page.is_empty() {
                break;
            }
            let last = page[page.len() - 1];
            cursor = Some((last.rank, last.id));
            seen.extend(page);
        }

        let expected: Vec<i64> = vec![8, 4, 6, 7, 3, 2, 1, 9];
        let visited: Vec<i64> = seen.iter().map(|r| r.id).collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn rank_drift_between_pages_never_reshows_visited_rows() {
        let mut rows: Vec<Row> = (1..=8).map(|id| Row { id, rank: 1.0 }).collect();

        let first = fetch_page(&rows, 0.001, None, 3);
        let first_ids: Vec<i64> = first.iter().map(|r| r.id).collect();
        assert_eq!(first_ids, vec![8, 7, 6]);
        let last = first[first.len() - 1];

        // An unvisited row gains rank between requests.
        rows[0].rank = 5.0;

        let second = fetch_page(&rows, 0.001, Some((last.rank, last.id)), 3);
        for row in &second {
            assert!(
                !first_ids.contains(&row.id),
                "row {} appeared on two pages",
                row.id
            );
        }
    }
}
