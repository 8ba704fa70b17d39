//! Random sampling over the eligible question set.
//!
//! A draw reads cached counts ([`CountCache`]), fetches one bounded window
//! at a random offset ([`WindowSampler`]) and samples inside it. Package
//! draws skip the counts and go straight to [`select_package`].

pub mod counts;
pub mod package;
pub mod refresh;
pub mod sampler;
pub mod window;

pub use counts::{CategoryCounts, CountCache};
pub use package::{select_package, PackageDraw};
pub use refresh::{RefreshPolicy, DEFAULT_REFRESH_INTERVAL};
pub use sampler::{QuestionSampler, DEFAULT_QUANTITY, MAX_QUANTITY};
pub use window::{choose_offset, sample, Window, WindowSampler, DEFAULT_WINDOW_SIZE};

use crate::error::{CoreError, CoreResult};
use crate::models::Category;

/// Parse an optional category filter. Blank means no filter; anything
/// else must be a known code or label.
pub fn parse_filter(raw: Option<&str>) -> CoreResult<Option<Category>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Category::from_str(value)
            .map(Some)
            .ok_or_else(|| CoreError::InvalidFilter(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter(None).unwrap(), None);
        assert_eq!(parse_filter(Some("  ")).unwrap(), None);
        assert_eq!(parse_filter(Some("Я")).unwrap(), Some(Category::OwnGame));
        assert_eq!(
            parse_filter(Some("Что-где-когда")).unwrap(),
            Some(Category::WhatWhereWhen)
        );
        assert!(matches!(
            parse_filter(Some("XX")),
            Err(CoreError::InvalidFilter(_))
        ));
    }
}
