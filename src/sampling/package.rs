//! Random whole-package draws.

use serde::Serialize;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::models::{Category, Question};
use crate::repository::QuestionStore;

/// One drawn package and all of its eligible questions.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDraw {
    pub package: String,
    pub questions: Vec<Question>,
}

/// Picks a package uniformly among distinct package names, not weighted
/// by package size, then returns every eligible question in it.
pub async fn select_package<S>(store: &S, category: Option<Category>) -> CoreResult<PackageDraw>
where
    S: QuestionStore + ?Sized,
{
    let package = store
        .random_package_name(category)
        .await?
        .ok_or_else(|| CoreError::EmptyResultSet(no_packages(category)))?;

    let questions = store.fetch_package(category, &package).await?;
    if questions.is_empty() {
        // The package was emptied between the two queries
        return Err(CoreError::EmptyResultSet(no_packages(category)));
    }

    debug!("Drew package '{}' with {} questions", package, questions.len());
    Ok(PackageDraw { package, questions })
}

fn no_packages(category: Option<Category>) -> String {
    match category {
        Some(category) => format!("no packages with questions of type '{}'", category),
        None => "no packages available".to_string(),
    }
}
