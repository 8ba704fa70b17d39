//! Full-text and fuzzy question search through an external index.
//!
//! The index ranks, the store supplies content: hits are mapped back to
//! eligible records in ranking order by [`reconcile`].

pub mod index;
pub mod query;
pub mod reconcile;
pub mod reindex;
pub mod service;

pub use index::{
    ElasticsearchIndex, SearchIndex, DEFAULT_INDEX_NAME, DEFAULT_INDEX_TIMEOUT, DEFAULT_SEARCH_URL,
};
pub use query::{IndexDocument, SearchHit, SearchRequest, MIN_SEARCH_LENGTH};
pub use reconcile::{fetch_in_order, reconcile};
pub use reindex::{ReindexProgress, ReindexStats, Reindexer, DEFAULT_BATCH_SPAN};
pub use service::SearchService;
