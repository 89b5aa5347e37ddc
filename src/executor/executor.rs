//! Concurrent query fan-out
//!
//! Every compiled query is issued at once and polled on the calling task.
//! The first failure fails the call; sibling queries are dropped without
//! being awaited further.
//!
//! A store may end a batch before the query's limit with `NotFinished`.
//! Each query then re-runs from its end cursor until the store reports
//! otherwise, so one query's batches stay together in the merge.

use futures_util::future::try_join_all;

use super::errors::{ExecutorError, ExecutorResult};
use super::result::ResultSet;
use crate::observability::{Event, Logger, MetricsRegistry, ObservationScope, ScopeEvents};
use crate::planner::CompiledQuery;
use crate::store::{Entity, MoreResults, StoreClient, StoreError, StoreQuery, StoreResult};

const FANOUT_EVENTS: ScopeEvents = ScopeEvents {
    begin: Some(Event::QueryFanOutBegin),
    complete: Event::QueryFanOutComplete,
    failed: Event::QueryFanOutFailed,
};

/// Runs compiled queries against a store client
pub struct QueryExecutor<'a> {
    client: &'a dyn StoreClient,
    metrics: &'a MetricsRegistry,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(client: &'a dyn StoreClient, metrics: &'a MetricsRegistry) -> Self {
        Self { client, metrics }
    }

    /// Execute all queries concurrently and merge their pages
    pub async fn execute(&self, queries: Vec<CompiledQuery>) -> ExecutorResult<ResultSet> {
        let total = queries.len();
        let kind = queries
            .first()
            .map(|q| q.query().kind.clone())
            .unwrap_or_default();
        let total_field = total.to_string();
        let scope = ObservationScope::begin(
            FANOUT_EVENTS,
            &[("kind", kind.as_str()), ("queries", total_field.as_str())],
        );
        self.metrics.add_queries_issued(total as u64);

        let client = self.client;
        let pending = queries.into_iter().enumerate().map(|(index, compiled)| async move {
            drain(client, compiled.into_query())
                .await
                .map_err(|source: StoreError| (index, source))
        });

        let drained = match try_join_all(pending).await {
            Ok(drained) => drained,
            Err((index, source)) => {
                self.metrics.increment_store_failures();
                scope.fail(&source.to_string());
                return Err(ExecutorError {
                    kind,
                    index,
                    total,
                    source,
                });
            }
        };

        let mut entities = Vec::new();
        let mut placeholders = 0usize;
        let mut batches = 0usize;
        for query in drained {
            batches += query.batches;
            for slot in query.slots {
                match slot {
                    Some(entity) => entities.push(entity),
                    None => placeholders += 1,
                }
            }
        }

        if placeholders > 0 {
            Logger::info(
                Event::PlaceholderFiltered,
                &[
                    ("kind", kind.as_str()),
                    ("count", placeholders.to_string().as_str()),
                ],
            );
            self.metrics.add_placeholders_filtered(placeholders as u64);
        }
        self.metrics.add_entities_returned(entities.len() as u64);
        scope.complete(&[
            ("entities", entities.len().to_string().as_str()),
            ("batches", batches.to_string().as_str()),
        ]);

        Ok(ResultSet {
            entities,
            queries_issued: total,
            batches_run: batches,
            placeholders_filtered: placeholders,
        })
    }
}

/// Every batch of one query, in store order
struct DrainedQuery {
    slots: Vec<Option<Entity>>,
    batches: usize,
}

/// Run `query` to completion, following `NotFinished` cursors.
///
/// Stops once the store reports anything other than `NotFinished`, the
/// query's own limit is met, or a batch comes back empty.
async fn drain(client: &dyn StoreClient, query: StoreQuery) -> StoreResult<DrainedQuery> {
    let mut remaining = query.limit;
    let mut next = query.clone();
    let mut drained = DrainedQuery {
        slots: Vec::new(),
        batches: 0,
    };

    loop {
        let page = client.run_query(next).await?;
        drained.batches += 1;
        let fetched = page.entities.len() as u64;
        drained.slots.extend(page.entities);

        remaining = remaining.map(|limit| limit.saturating_sub(fetched));
        let cursor = match page.info.end_cursor {
            Some(cursor) if page.info.more_results == MoreResults::NotFinished => cursor,
            _ => break,
        };
        if fetched == 0 || remaining == Some(0) {
            break;
        }

        Logger::trace(
            Event::QueryContinued,
            &[
                ("kind", query.kind.as_str()),
                ("batch", drained.batches.to_string().as_str()),
                ("fetched", drained.slots.len().to_string().as_str()),
            ],
        );

        // The cursor already sits past the skipped prefix.
        next = query.clone();
        next.offset = None;
        next.limit = remaining;
        next = next.start(cursor);
    }

    Ok(drained)
}
