//! Question count summary.

use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::sampling::{CountCache, QuestionSampler};

use super::helpers::open_db;

/// Show eligible counts per category and the moderation backlog.
pub async fn cmd_stats(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let ctx = open_db(settings).await?;
    let repo = ctx.questions();

    let sampler = QuestionSampler::new(Arc::new(repo.clone()), Arc::new(CountCache::global()));
    let counts = sampler.counts().await?;
    let unpublished = repo.count_unpublished().await?;

    if json {
        let mut value = serde_json::to_value(&counts)?;
        value["unpublished"] = serde_json::json!(unpublished);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("\n{}", style("Questions").bold());
    println!("{}", "-".repeat(40));
    for (category, count) in &counts.by_category {
        println!("{:<6} {:<28} {:>6}", category.code(), category.label(), count);
    }
    println!("{}", "-".repeat(40));
    println!("{:<35} {:>6}", "Eligible", counts.by_category.values().sum::<u64>());
    println!("{:<35} {:>6}", "Awaiting moderation", unpublished);
    if let Some(total) = counts.total {
        println!("{:<35} {:>6}", "All rows", total);
    }

    Ok(())
}
