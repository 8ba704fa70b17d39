//! Random question and package draws.

use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::sampling::{CountCache, QuestionSampler};

use super::helpers::{category_arg, open_db, print_questions};

fn sampler(settings: &Settings, ctx: &crate::repository::DbContext) -> QuestionSampler {
    QuestionSampler::new(Arc::new(ctx.questions()), Arc::new(CountCache::global()))
        .with_window_size(settings.window_size)
        .with_max_quantity(settings.max_quantity)
}

/// Draw random questions.
pub async fn cmd_random(
    settings: &Settings,
    quantity: Option<u32>,
    category: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let category = category_arg(category)?;
    let ctx = open_db(settings).await?;

    let quantity = quantity.unwrap_or(settings.default_quantity);
    let questions = sampler(settings, &ctx)
        .random_questions(category, quantity)
        .await?;

    print_questions(&questions, json)
}

/// Draw one random package.
pub async fn cmd_package(
    settings: &Settings,
    category: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let category = category_arg(category)?;
    let ctx = open_db(settings).await?;

    let draw = sampler(settings, &ctx).random_package(category).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&draw)?);
        return Ok(());
    }

    println!(
        "\n{} {} ({} questions)\n",
        style("Package:").bold(),
        style(&draw.package).cyan(),
        draw.questions.len()
    );
    print_questions(&draw.questions, false)
}
