//! Cursor-paged recursive deletion
//!
//! Two states:
//!
//! ```text
//! Paging{cursor} --keys-only page, delete keys--> Paging{end_cursor}  (page non-empty, more results)
//! Paging{cursor} ------------------------------> Done                (empty page, or no more results)
//! ```
//!
//! Pages run strictly one after another. An empty page always ends the drop,
//! even when the store still claims more results.

use serde::Serialize;

use super::errors::{BulkError, BulkResult, DropStage};
use crate::observability::{Event, Logger, MetricsRegistry, ObservationScope, ScopeEvents};
use crate::store::{Cursor, Entity, Key, StoreClient, StoreError};

const DROP_EVENTS: ScopeEvents = ScopeEvents {
    begin: None,
    complete: Event::DropComplete,
    failed: Event::DropFailed,
};

/// Deleter state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropState {
    /// Fetch the next page, from the start when `cursor` is `None`
    Paging { cursor: Option<Cursor> },
    Done,
}

/// Work done by one drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropSummary {
    pub kind: String,
    /// Non-empty pages deleted
    pub pages: u64,
    /// Entities deleted
    pub deleted: u64,
}

/// Deletes every entity of a kind, one keys-only page at a time
pub struct RecursiveDeleter<'a> {
    client: &'a dyn StoreClient,
    page_size: u32,
    metrics: &'a MetricsRegistry,
}

impl<'a> RecursiveDeleter<'a> {
    pub fn new(client: &'a dyn StoreClient, page_size: u32, metrics: &'a MetricsRegistry) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
            metrics,
        }
    }

    /// Drain `kind` completely
    pub async fn drop_all(&self, kind: &str) -> BulkResult<DropSummary> {
        let page_size = self.page_size.to_string();
        let scope = ObservationScope::begin(
            DROP_EVENTS,
            &[("kind", kind), ("page_size", page_size.as_str())],
        );

        let mut summary = DropSummary {
            kind: kind.to_string(),
            pages: 0,
            deleted: 0,
        };
        let mut state = DropState::Paging { cursor: None };

        while let DropState::Paging { cursor } = state {
            state = match self.step(cursor, &mut summary).await {
                Ok(next) => next,
                Err(err) => {
                    self.metrics.increment_store_failures();
                    scope.fail(&err.to_string());
                    return Err(err);
                }
            };
        }

        scope.complete(&[
            ("pages", summary.pages.to_string().as_str()),
            ("deleted", summary.deleted.to_string().as_str()),
        ]);
        Ok(summary)
    }

    /// Fetch one page, delete it, and pick the next state
    async fn step(&self, cursor: Option<Cursor>, summary: &mut DropSummary) -> BulkResult<DropState> {
        let mut query = self
            .client
            .create_query(&summary.kind)
            .keys_only()
            .limit(u64::from(self.page_size));
        if let Some(cursor) = cursor {
            query = query.start(cursor);
        }

        let page = self
            .client
            .run_query(query)
            .await
            .map_err(|e| failure(summary, DropStage::Query, e))?;

        let keys: Vec<Key> = page
            .entities
            .into_iter()
            .flatten()
            .map(Entity::into_key)
            .collect();

        if keys.is_empty() {
            if page.info.more_results.has_more() {
                Logger::warn(
                    Event::DropStaleCursor,
                    &[("kind", summary.kind.as_str()), ("pages", summary.pages.to_string().as_str())],
                );
            }
            return Ok(DropState::Done);
        }

        let count = keys.len() as u64;
        self.client
            .delete(keys)
            .await
            .map_err(|e| failure(summary, DropStage::Delete, e))?;

        summary.pages += 1;
        summary.deleted += count;
        self.metrics.increment_drop_pages();
        self.metrics.add_entities_deleted(count);
        Logger::info(
            Event::DropPage,
            &[
                ("kind", summary.kind.as_str()),
                ("page", summary.pages.to_string().as_str()),
                ("deleted", count.to_string().as_str()),
            ],
        );

        match page.info.end_cursor {
            Some(end) if page.info.more_results.has_more() => Ok(DropState::Paging { cursor: Some(end) }),
            _ => Ok(DropState::Done),
        }
    }
}

fn failure(summary: &DropSummary, stage: DropStage, source: StoreError) -> BulkError {
    BulkError {
        kind: summary.kind.clone(),
        stage,
        pages: summary.pages,
        deleted: summary.deleted,
        source,
    }
}
