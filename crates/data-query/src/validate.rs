//! Validation functions for data queries.

use crate::{DataQuery, QueryError};

/// Maximum allowed length of a separated query string, in bytes.
pub const MAX_QUERY_LENGTH: usize = 1024;

/// Maximum allowed query depth.
pub const MAX_QUERY_DEPTH: usize = 256;

/// Validate a query's depth.
///
/// # Errors
///
/// Returns [`QueryError::TooDeep`] if the query has more than
/// [`MAX_QUERY_DEPTH`] segments.
///
/// # Example
///
/// ```
/// use sponge_data_query::{validate_query, DataQuery};
///
/// validate_query(&DataQuery::from("foo.bar")).unwrap();
/// validate_query(&DataQuery::of((0..300).map(|i| i.to_string()))).unwrap_err();
/// ```
pub fn validate_query(query: &DataQuery) -> Result<(), QueryError> {
    if query.len() > MAX_QUERY_DEPTH {
        return Err(QueryError::TooDeep {
            depth: query.len(),
            max: MAX_QUERY_DEPTH,
        });
    }
    Ok(())
}

/// Validate the text form of a query before splitting it.
///
/// # Errors
///
/// Returns [`QueryError::TooLong`] if the text exceeds [`MAX_QUERY_LENGTH`]
/// bytes.
pub fn validate_separated(text: &str) -> Result<(), QueryError> {
    if text.len() > MAX_QUERY_LENGTH {
        return Err(QueryError::TooLong {
            len: text.len(),
            max: MAX_QUERY_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_query() {
        assert!(validate_query(&DataQuery::empty()).is_ok());
        assert!(validate_separated("").is_ok());
    }

    #[test]
    fn test_validate_long_text() {
        let long = "a".repeat(2000);
        assert_eq!(
            validate_separated(&long),
            Err(QueryError::TooLong { len: 2000, max: MAX_QUERY_LENGTH })
        );
    }

    #[test]
    fn test_validate_deep_query() {
        let query = DataQuery::of((0..300).map(|i| i.to_string()));
        assert_eq!(
            validate_query(&query),
            Err(QueryError::TooDeep { depth: 300, max: MAX_QUERY_DEPTH })
        );
    }

    #[test]
    fn test_validate_max_depth_query() {
        let query = DataQuery::of((0..256).map(|i| i.to_string()));
        assert!(validate_query(&query).is_ok());
    }
}
