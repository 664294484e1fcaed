//! Data queries.
//!
//! A [`DataQuery`] addresses a location inside a hierarchical data view the
//! same way a filesystem path addresses a file: an ordered list of segments,
//! each naming one level of nesting.
//!
//! # Example
//!
//! ```
//! use sponge_data_query::DataQuery;
//!
//! let query = DataQuery::of_separated('.', "player.stats.health");
//! assert_eq!(query.parts(), ["player", "stats", "health"]);
//!
//! let stats = DataQuery::of(["player", "stats"]);
//! assert_eq!(stats.then_key("health"), query);
//! assert_eq!(query.pop_first().to_string(), "stats.health");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

mod util;
pub mod validate;
pub use util::{escape_segment, split_segments, ESCAPE};
pub use validate::{validate_query, validate_separated, MAX_QUERY_DEPTH, MAX_QUERY_LENGTH};

/// Separator used by [`Display`](fmt::Display), [`FromStr`] and the string
/// conversions.
pub const DEFAULT_SEPARATOR: char = '.';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("NO_PARENT")]
    NoParent,
    #[error("query is {depth} segments deep, the limit is {max}")]
    TooDeep { depth: usize, max: usize },
    #[error("query text is {len} bytes long, the limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// An ordered sequence of string segments identifying a node in a data tree.
///
/// The empty query addresses the view it is applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataQuery {
    parts: Vec<String>,
}

impl DataQuery {
    /// The empty query.
    pub fn empty() -> Self {
        Self { parts: Vec::new() }
    }

    /// Builds a query from individual segments, taken verbatim.
    ///
    /// ```
    /// use sponge_data_query::DataQuery;
    ///
    /// let q = DataQuery::of(["a.b", "c"]);
    /// assert_eq!(q.len(), 2);
    /// ```
    pub fn of<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits `path` on `separator`. A backslash makes the next character
    /// literal, so `\.` keeps a separator inside a segment.
    ///
    /// The empty string yields the empty query; every other input keeps
    /// empty segments as they appear.
    ///
    /// ```
    /// use sponge_data_query::DataQuery;
    ///
    /// assert!(DataQuery::of_separated('.', "").is_empty());
    /// assert_eq!(DataQuery::of_separated('/', "a/b").parts(), ["a", "b"]);
    /// assert_eq!(DataQuery::of_separated('.', "a..b").parts(), ["a", "", "b"]);
    /// assert_eq!(DataQuery::of_separated('.', r"a\.b.c").parts(), ["a.b", "c"]);
    /// ```
    pub fn of_separated(separator: char, path: &str) -> Self {
        if path.is_empty() {
            return Self::empty();
        }
        Self {
            parts: split_segments(path, separator),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Concatenates `other` onto the end of this query.
    pub fn then(&self, other: &DataQuery) -> DataQuery {
        let mut parts = Vec::with_capacity(self.parts.len() + other.parts.len());
        parts.extend_from_slice(&self.parts);
        parts.extend_from_slice(&other.parts);
        DataQuery { parts }
    }

    /// Appends a single segment.
    pub fn then_key(&self, key: impl Into<String>) -> DataQuery {
        let mut parts = self.parts.clone();
        parts.push(key.into());
        DataQuery { parts }
    }

    /// Drops the first segment. The empty query stays empty.
    pub fn pop_first(&self) -> DataQuery {
        DataQuery {
            parts: self.parts.iter().skip(1).cloned().collect(),
        }
    }

    /// Drops the last segment. The empty query stays empty.
    pub fn pop_last(&self) -> DataQuery {
        let end = self.parts.len().saturating_sub(1);
        DataQuery {
            parts: self.parts[..end].to_vec(),
        }
    }

    /// Each segment as its own one-segment query.
    pub fn query_parts(&self) -> Vec<DataQuery> {
        self.parts
            .iter()
            .map(|part| DataQuery {
                parts: vec![part.clone()],
            })
            .collect()
    }

    /// The query without its last segment.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NoParent`] for the empty query.
    pub fn parent(&self) -> Result<DataQuery, QueryError> {
        if self.parts.is_empty() {
            return Err(QueryError::NoParent);
        }
        Ok(self.pop_last())
    }

    /// Whether `parent` is a strict prefix of this query.
    ///
    /// ```
    /// use sponge_data_query::DataQuery;
    ///
    /// let parent = DataQuery::from("a");
    /// assert!(DataQuery::from("a.b").is_child_of(&parent));
    /// assert!(!parent.is_child_of(&parent));
    /// ```
    pub fn is_child_of(&self, parent: &DataQuery) -> bool {
        parent.parts.len() < self.parts.len() && self.parts.starts_with(&parent.parts)
    }

    /// Renders the segments joined by `separator`, escaping separators and
    /// backslashes inside segments so [`of_separated`](Self::of_separated)
    /// reads the same query back.
    pub fn as_string(&self, separator: char) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(&escape_segment(part, separator));
        }
        out
    }
}

impl fmt::Display for DataQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string(DEFAULT_SEPARATOR))
    }
}

impl FromStr for DataQuery {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_separated(s)?;
        let query = DataQuery::of_separated(DEFAULT_SEPARATOR, s);
        validate_query(&query)?;
        Ok(query)
    }
}

impl From<&str> for DataQuery {
    fn from(path: &str) -> Self {
        DataQuery::of_separated(DEFAULT_SEPARATOR, path)
    }
}

impl From<String> for DataQuery {
    fn from(path: String) -> Self {
        DataQuery::of_separated(DEFAULT_SEPARATOR, &path)
    }
}

impl From<&String> for DataQuery {
    fn from(path: &String) -> Self {
        DataQuery::of_separated(DEFAULT_SEPARATOR, path)
    }
}

impl From<Vec<String>> for DataQuery {
    fn from(parts: Vec<String>) -> Self {
        DataQuery { parts }
    }
}

impl<const N: usize> From<[&str; N]> for DataQuery {
    fn from(parts: [&str; N]) -> Self {
        DataQuery::of(parts)
    }
}

impl From<&DataQuery> for DataQuery {
    fn from(query: &DataQuery) -> Self {
        query.clone()
    }
}

impl Serialize for DataQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
