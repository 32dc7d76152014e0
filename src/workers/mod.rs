/// Background counter/score maintenance
///
/// Mutation handlers enqueue a task after their primary write has been
/// acknowledged; a single worker loop executes them. Failures are
/// logged and never retried — every task recomputes from authoritative
/// rows, so a missed refresh is repaired by the next mutation of the
/// same kind.
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::RankingConfig;
use crate::db::{item_repo, item_stats_repo};
use crate::search::{SearchClient, SearchDocument};
use crate::services::ranking::calculate_score;

/// Deferred follow-up work for a completed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceTask {
    /// Recount likes and refresh the ranking score of an item
    RefreshItemScore { item_id: i64 },
    /// Recompute an item's comment counter from its comment rows
    RefreshItemCommentCount { item_id: i64 },
    /// Push the item document to the search index
    SyncSearchDocument { item_id: i64 },
    /// Remove the item document from the search index
    DeleteSearchDocument { item_id: i64 },
}

/// Clonable handle for enqueueing maintenance work. Sending never
/// blocks the mutation path.
#[derive(Clone)]
pub struct MaintenanceQueue {
    tx: mpsc::UnboundedSender<MaintenanceTask>,
}

impl MaintenanceQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MaintenanceTask>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MaintenanceQueue { tx }, rx)
    }

    pub fn enqueue(&self, task: MaintenanceTask) {
        if self.tx.send(task).is_err() {
            warn!(?task, "Maintenance queue closed, dropping task");
        }
    }
}

/// Drain the queue until every sender is gone. Spawned from `main`.
pub async fn run_maintenance_worker(
    mut rx: mpsc::UnboundedReceiver<MaintenanceTask>,
    pool: PgPool,
    ranking: RankingConfig,
    search: SearchClient,
) {
    info!("Maintenance worker started");

    while let Some(task) = rx.recv().await {
        if let Err(e) = execute(&pool, &ranking, &search, task).await {
            warn!(?task, "Maintenance task failed: {e:#}");
        }
    }

    info!("Maintenance worker stopped");
}

async fn execute(
    pool: &PgPool,
    ranking: &RankingConfig,
    search: &SearchClient,
    task: MaintenanceTask,
) -> anyhow::Result<()> {
    match task {
        MaintenanceTask::RefreshItemScore { item_id } => {
            refresh_item_score(pool, ranking, item_id).await
        }
        MaintenanceTask::RefreshItemCommentCount { item_id } => {
            let count = item_stats_repo::recount_comments(pool, item_id).await?;
            if count.is_none() {
                debug!(item_id, "Skipping comment recount for vanished item");
            }
            Ok(())
        }
        MaintenanceTask::SyncSearchDocument { item_id } => {
            let Some(record) = item_repo::find_record_by_id(pool, item_id).await? else {
                debug!(item_id, "Skipping search sync for vanished item");
                return Ok(());
            };
            search.sync_item(&SearchDocument::from_record(&record)).await
        }
        MaintenanceTask::DeleteSearchDocument { item_id } => search.delete_item(item_id).await,
    }
}

/// Recount likes from the like rows, then recompute and store the
/// score from the item's current age.
async fn refresh_item_score(
    pool: &PgPool,
    ranking: &RankingConfig,
    item_id: i64,
) -> anyhow::Result<()> {
    let Some(item) = item_repo::find_item_by_id(pool, item_id).await? else {
        debug!(item_id, "Skipping score refresh for vanished item");
        return Ok(());
    };

    let Some(likes) = item_stats_repo::recount_likes(pool, item_id).await? else {
        debug!(item_id, "Skipping score refresh: stats row missing");
        return Ok(());
    };

    let age_hours = (Utc::now() - item.created_at).num_seconds() as f64 / 3600.0;
    let score = calculate_score(ranking, likes, age_hours);
    item_stats_repo::set_score(pool, item_id, score).await?;

    debug!(item_id, likes, score, "Refreshed item score");
    Ok(())
}
