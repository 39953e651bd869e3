//! Query validation for the search engine's entry point (§4.E).

use ghss_domain::error::{Error, Result};

const SQL_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "alter", "create", "truncate",
];

const STRUCTURED_FILTER_PREFIXES: &[&str] = &[
    "language:", "lang:", "stars:", "star:", "forks:", "fork:", "topic:", "topics:", "user:",
    "org:", "created:", "updated:",
];

/// §4.E validation, applied at the engine boundary before any store call:
/// minimum length, SQL-keyword rejection, and structured-filter-prefix
/// rejection.
pub fn validate_query(query: &str) -> Result<()> {
    let trimmed = query.trim();
    if trimmed.chars().count() < 2 {
        return Err(Error::validation("query must be at least 2 characters"));
    }

    let lower = trimmed.to_lowercase();
    if let Some(first_token) = lower.split_whitespace().next() {
        if SQL_KEYWORDS.contains(&first_token) {
            return Err(Error::validation("SQL queries are not supported"));
        }
    }

    if let Some(prefix) = STRUCTURED_FILTER_PREFIXES
        .iter()
        .find(|prefix| lower.contains(*prefix))
    {
        return Err(Error::validation(format!(
            "structured filters like '{prefix}' are not supported here; use plain-text search"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_character_query_is_rejected() {
        assert!(validate_query("a").is_err());
    }

    #[test]
    fn sql_keyword_as_first_token_is_rejected() {
        let err = validate_query("SELECT * FROM repositories").unwrap_err();
        assert!(err.to_string().contains("SQL queries are not supported"));
    }

    #[test]
    fn sql_keyword_mid_query_is_not_rejected() {
        assert!(validate_query("a tool to select colors").is_ok());
    }

    #[test]
    fn structured_filter_prefix_is_rejected() {
        assert!(validate_query("language:rust parser").is_err());
    }

    #[test]
    fn plain_query_passes() {
        assert!(validate_query("http client").is_ok());
    }
}
