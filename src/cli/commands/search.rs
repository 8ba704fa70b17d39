//! Search command.

use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::error::CoreError;
use crate::search::SearchService;

use super::helpers::{category_arg, open_db, print_questions};

/// Search the index, falling back to a substring scan of the database.
pub async fn cmd_search(
    settings: &Settings,
    text: &str,
    fuzzy: bool,
    category: Option<&str>,
    quantity: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let category = category_arg(category)?;
    let ctx = open_db(settings).await?;
    let repo = ctx.questions();

    let service = SearchService::new(
        Arc::new(settings.create_search_index()?),
        Arc::new(repo.clone()),
    )
    .with_max_quantity(settings.max_quantity);

    let quantity = quantity.unwrap_or(settings.default_quantity);
    let request = service.build_request(text, category, fuzzy, quantity)?;

    let questions = match service.run(&request).await {
        Ok(questions) => questions,
        Err(CoreError::IndexUnavailable(e)) => {
            if !json {
                eprintln!(
                    "{} {}; searching the database instead",
                    style("!").yellow(),
                    e
                );
            }
            repo.search_text(&request.text, request.category, request.size)
                .await?
        }
        Err(e) => return Err(e.into()),
    };

    if questions.is_empty() && !json {
        println!("{} Nothing found for '{}'", style("!").yellow(), request.text);
        return Ok(());
    }

    print_questions(&questions, json)
}
