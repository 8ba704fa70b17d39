//! Full export of eligible questions into the search index.

use std::sync::Arc;

use tracing::{info, warn};

use super::index::SearchIndex;
use super::query::IndexDocument;
use crate::error::CoreResult;
use crate::repository::QuestionRepository;

/// Primary key span exported per bulk request.
pub const DEFAULT_BATCH_SPAN: i32 = 10_000;

/// Outcome of a completed export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexStats {
    pub batches: u32,
    pub documents: u64,
}

/// Progress after each exported batch.
#[derive(Debug, Clone, Copy)]
pub struct ReindexProgress {
    /// Highest id covered so far.
    pub through_id: i32,
    pub max_id: i32,
    pub documents: u64,
}

/// Rebuilds the index contents from the store in primary key ranges.
pub struct Reindexer {
    repo: QuestionRepository,
    index: Arc<dyn SearchIndex>,
    batch_span: i32,
}

impl Reindexer {
    pub fn new(repo: QuestionRepository, index: Arc<dyn SearchIndex>) -> Self {
        Self {
            repo,
            index,
            batch_span: DEFAULT_BATCH_SPAN,
        }
    }

    pub fn with_batch_span(mut self, batch_span: i32) -> Self {
        self.batch_span = batch_span.max(1);
        self
    }

    /// Export everything, creating the index if needed.
    ///
    /// The index is cleared first. If a batch fails the index is cleared
    /// again, so searches never run against a partial export, and the
    /// error is returned.
    pub async fn run<F>(&self, mut on_progress: F) -> CoreResult<ReindexStats>
    where
        F: FnMut(&ReindexProgress),
    {
        if !self.index.exists().await? {
            self.index.create_index().await?;
        }
        self.index.clear().await?;

        let Some(max_id) = self.repo.max_id().await? else {
            info!("No questions to export");
            return Ok(ReindexStats::default());
        };

        let mut stats = ReindexStats::default();
        let mut first = 1;
        while first <= max_id {
            let last = first.saturating_add(self.batch_span - 1).min(max_id);
            match self.export_range(first, last).await {
                Ok(count) => {
                    stats.batches += 1;
                    stats.documents += count;
                    on_progress(&ReindexProgress {
                        through_id: last,
                        max_id,
                        documents: stats.documents,
                    });
                }
                Err(e) => {
                    warn!("Export of ids {}..={} failed, clearing index: {}", first, last, e);
                    if let Err(clear_err) = self.index.clear().await {
                        warn!("Failed to clear index after export error: {}", clear_err);
                    }
                    return Err(e);
                }
            }
            if last == max_id {
                break;
            }
            first = last + 1;
        }

        info!(
            "Exported {} questions in {} batches",
            stats.documents, stats.batches
        );
        Ok(stats)
    }

    async fn export_range(&self, first: i32, last: i32) -> CoreResult<u64> {
        let questions = self.repo.eligible_in_id_range(first, last).await?;
        let docs: Vec<IndexDocument> = questions.iter().map(IndexDocument::from).collect();
        self.index.bulk_index(&docs).await?;
        Ok(docs.len() as u64)
    }
}
