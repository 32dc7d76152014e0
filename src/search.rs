/// Search index notification
///
/// The search index is a downstream consumer only: it is told about
/// item create/update/delete, best effort, from the maintenance worker.
/// Ranking and pagination never consult it.
use serde::Serialize;
use std::time::Duration;

use crate::models::ItemRecord;

/// Flattened item document as the index ingests it
#[derive(Debug, Clone, Serialize)]
pub struct SearchDocument {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub link: String,
    pub author: Option<String>,
    pub publisher: String,
    pub username: String,
    pub created_at: String,
}

impl SearchDocument {
    pub fn from_record(record: &ItemRecord) -> Self {
        SearchDocument {
            id: record.id,
            title: record.title.clone(),
            body: record.body.clone(),
            link: record.link.clone(),
            author: record.author.clone(),
            publisher: record.publisher_name.clone(),
            username: record.username.clone(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl SearchClient {
    pub fn new(endpoint: Option<String>) -> Self {
        SearchClient {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(8))
                .build()
                .unwrap_or_default(),
            endpoint,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    pub async fn sync_item(&self, doc: &SearchDocument) -> anyhow::Result<()> {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(item_id = doc.id, "Search index not configured, skipping sync");
            return Ok(());
        };

        self.http
            .put(format!("{}/documents/{}", endpoint, doc.id))
            .json(doc)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    pub async fn delete_item(&self, item_id: i64) -> anyhow::Result<()> {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(item_id, "Search index not configured, skipping delete");
            return Ok(());
        };

        self.http
            .delete(format!("{}/documents/{}", endpoint, item_id))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
