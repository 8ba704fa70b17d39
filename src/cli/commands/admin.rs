//! Question maintenance commands.

use std::io::{self, Write};
use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::models::{NewQuestion, QuestionStatus, QuestionUpdate};
use crate::services::QuestionService;

use super::helpers::{open_db, print_question, read_json, LOCAL_ADMIN};

async fn service(settings: &Settings) -> anyhow::Result<QuestionService> {
    Ok(QuestionService::new(open_db(settings).await?.questions()))
}

/// Add a question from a JSON file.
pub async fn cmd_add(settings: &Settings, file: &Path, publish: bool) -> anyhow::Result<()> {
    let question: NewQuestion = read_json(file)?;
    let service = service(settings).await?;

    let mut created = service.submit(&question, None).await?;
    if publish {
        let status = QuestionStatus {
            is_published: Some(true),
            ..Default::default()
        };
        created = service.set_status(created.id, status, &LOCAL_ADMIN).await?;
    }

    println!(
        "{} Added question #{} ({})",
        style("✓").green(),
        created.id,
        if created.is_published {
            "published"
        } else {
            "awaiting moderation"
        }
    );
    Ok(())
}

/// Apply a partial update from a JSON file.
pub async fn cmd_edit(settings: &Settings, id: i32, file: &Path) -> anyhow::Result<()> {
    let update: QuestionUpdate = read_json(file)?;
    let edited = service(settings)
        .await?
        .edit(id, &update, &LOCAL_ADMIN)
        .await?;

    println!("{} Updated question #{}", style("✓").green(), id);
    print_question(&edited);
    Ok(())
}

/// Change moderation flags.
pub async fn cmd_status(settings: &Settings, id: i32, status: QuestionStatus) -> anyhow::Result<()> {
    if status.is_published.is_none() && status.is_condemned.is_none() {
        anyhow::bail!("Nothing to change: pass --publish, --unpublish, --condemn or --uncondemn");
    }

    let question = service(settings)
        .await?
        .set_status(id, status, &LOCAL_ADMIN)
        .await?;

    println!(
        "{} Question #{}: published={}, condemned={}",
        style("✓").green(),
        id,
        question.is_published,
        question.is_condemned
    );
    Ok(())
}

/// Delete a question.
pub async fn cmd_delete(settings: &Settings, id: i32, yes: bool) -> anyhow::Result<()> {
    if !yes {
        print!("Delete question #{}? [y/N] ", id);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = service(settings).await?.delete(id, &LOCAL_ADMIN).await?;
    println!(
        "{} Deleted question #{}: {}",
        style("✓").green(),
        id,
        super::helpers::truncate(&deleted.question, 60)
    );
    Ok(())
}
