//! Shared helper functions for CLI commands.

use std::path::Path;

use console::style;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::models::{Category, Question, Requester};
use crate::repository::DbContext;
use crate::sampling::parse_filter;

/// The CLI acts with full rights on the local database.
pub const LOCAL_ADMIN: Requester = Requester {
    user_id: 0,
    is_superuser: true,
};

/// Open the configured database, pointing at `init` if it is missing.
pub async fn open_db(settings: &Settings) -> anyhow::Result<DbContext> {
    if !settings.database_exists() {
        anyhow::bail!(
            "No database at {}. Run 'brainbase init' first.",
            settings.database_path().display()
        );
    }
    settings
        .create_db_context_validated()
        .await
        .map_err(anyhow::Error::msg)
}

/// Parse a `--category` argument.
pub fn category_arg(raw: Option<&str>) -> anyhow::Result<Option<Category>> {
    Ok(parse_filter(raw)?)
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid JSON in {}: {}", path.display(), e))
}

/// Shorten to `max` characters, counting chars rather than bytes.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Print one question as a card.
pub fn print_question(question: &Question) {
    let mut header = format!("#{} {}", question.id, question.category);
    if let Some(ref package) = question.package {
        header.push_str(&format!(" | {}", truncate(package, 40)));
    }
    if let Some(number) = question.number {
        header.push_str(&format!(" | №{}", number));
    }

    println!("{}", style(header).bold());
    println!("{}", question.question);
    println!("  {} {}", style("Ответ:").green(), question.answer);
    if let Some(ref criteria) = question.pass_criteria {
        println!("  {} {}", style("Зачёт:").cyan(), criteria);
    }
    if let Some(ref comments) = question.comments {
        println!("  {} {}", style("Комментарий:").dim(), comments);
    }
    println!();
}

/// Print questions as cards or as a JSON array.
pub fn print_questions(questions: &[Question], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(questions)?);
    } else {
        for question in questions {
            print_question(question);
        }
    }
    Ok(())
}
