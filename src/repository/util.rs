//! Repository utilities.

/// Check whether a URL points at a PostgreSQL server.
pub fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

/// Validate that a database URL can be served by this build.
///
/// Only SQLite is supported; anything else is rejected before a
/// connection is attempted.
pub fn validate_database_url(url: &str) -> Result<(), String> {
    if is_postgres_url(url) {
        return Err(format!(
            "DATABASE_URL '{}' points at PostgreSQL, which this build does not support",
            url
        ));
    }
    if let Some((scheme, _)) = url.split_once("://") {
        if scheme != "sqlite" {
            return Err(format!("Unsupported database scheme '{}'", scheme));
        }
    }
    Ok(())
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
pub fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
