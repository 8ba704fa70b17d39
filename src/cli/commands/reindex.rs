//! Search index rebuild command.

use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::search::Reindexer;

use super::helpers::open_db;

/// Rebuild the search index from eligible questions.
pub async fn cmd_reindex(settings: &Settings, batch_span: i32) -> anyhow::Result<()> {
    let ctx = open_db(settings).await?;
    let index = settings.create_search_index()?;

    println!(
        "{} Rebuilding {} at {}",
        style("→").cyan(),
        settings.search_index,
        settings.search_url
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
            .progress_chars("█▓░"),
    );

    let reindexer = Reindexer::new(ctx.questions(), Arc::new(index)).with_batch_span(batch_span);
    let result = reindexer
        .run(|progress| {
            pb.set_length(progress.max_id as u64);
            pb.set_position(progress.through_id as u64);
            pb.set_message(format!("{} documents", progress.documents));
        })
        .await;
    pb.finish_and_clear();

    let stats = result?;
    println!(
        "{} Indexed {} questions in {} batches",
        style("✓").green(),
        stats.documents,
        stats.batches
    );

    Ok(())
}
