// ABOUTME: Search Orchestrator (C5) input validation — query length/charset, empty-input shortcuts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::SearchRequest;

/// Characters that, alone, make a query meaningless (§4.5).
const ONLY_PUNCTUATION: &str = "!@#$%^&*()-_+=[]{}|\\:\";'<>?,./~`";

/// Outcome of validating a [`SearchRequest`] before any I/O runs.
pub enum Validation {
    /// Proceed with the fan-out.
    Proceed,
    /// Short-circuit to an empty, non-error response.
    EmptyQuery,
    /// Short-circuit to an empty response carrying one optimisation hint.
    NoDatabases,
}

/// # Errors
///
/// Returns `QUERY_TOO_LONG` or `QUERY_INVALID_CHARS` when the query fails
/// those specific checks; empty/whitespace queries and an empty `databases[]`
/// are not errors (§4.5) and are reported via [`Validation`] instead.
pub fn validate(request: &SearchRequest) -> AppResult<Validation> {
    if request.databases.is_empty() {
        return Ok(Validation::NoDatabases);
    }

    if request.query.trim().is_empty() {
        return Ok(Validation::EmptyQuery);
    }

    if request.query.chars().count() > crate::constants::search::MAX_QUERY_LEN {
        return Err(AppError::new(ErrorCode::QueryTooLong, "query exceeds 1000 characters"));
    }

    if request.query.chars().all(|c| ONLY_PUNCTUATION.contains(c)) {
        return Err(AppError::new(
            ErrorCode::QueryInvalidChars,
            "query must contain at least one alphanumeric character",
        ));
    }

    if request.limit == 0 || request.limit > crate::constants::search::MAX_LIMIT {
        return Err(AppError::new(
            ErrorCode::InvalidInput,
            "limit must be in [1, 100]",
        ));
    }

    Ok(Validation::Proceed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn base_request(query: &str, databases: Vec<String>) -> SearchRequest {
        SearchRequest {
            query: query.to_owned(),
            user_id: Uuid::new_v4(),
            databases,
            tables: None,
            columns: None,
            search_mode: crate::models::SearchMode::Natural,
            limit: 20,
            offset: 0,
            include_analytics: false,
        }
    }

    #[test]
    fn blank_query_short_circuits() {
        assert!(matches!(
            validate(&base_request("   ", vec!["db".into()])).unwrap(),
            Validation::EmptyQuery
        ));
    }

    #[test]
    fn overlong_query_is_rejected() {
        let query = "a".repeat(1001);
        let err = validate(&base_request(&query, vec!["db".into()])).unwrap_err();
        assert_eq!(err.code, ErrorCode::QueryTooLong);
    }

    #[test]
    fn boundary_length_1000_is_accepted() {
        let query = "a".repeat(1000);
        assert!(matches!(
            validate(&base_request(&query, vec!["db".into()])).unwrap(),
            Validation::Proceed
        ));
    }

    #[test]
    fn punctuation_only_query_is_rejected() {
        let err = validate(&base_request("!@#$%", vec!["db".into()])).unwrap_err();
        assert_eq!(err.code, ErrorCode::QueryInvalidChars);
    }

    #[test]
    fn empty_databases_short_circuits() {
        assert!(matches!(
            validate(&base_request("alpha", vec![])).unwrap(),
            Validation::NoDatabases
        ));
    }

    #[test]
    fn empty_databases_wins_over_empty_query() {
        assert!(matches!(
            validate(&base_request("", vec![])).unwrap(),
            Validation::NoDatabases
        ));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let mut request = base_request("alpha", vec!["db".into()]);
        request.limit = 0;
        let err = validate(&request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn limit_of_100_is_accepted() {
        let mut request = base_request("alpha", vec!["db".into()]);
        request.limit = 100;
        assert!(matches!(validate(&request).unwrap(), Validation::Proceed));
    }

    #[test]
    fn limit_over_100_is_rejected() {
        let mut request = base_request("alpha", vec!["db".into()]);
        request.limit = 101;
        let err = validate(&request).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
}
