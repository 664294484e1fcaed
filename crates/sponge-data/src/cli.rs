//! Logic behind the `data-query` binary: load a JSON document into a
//! container and look up a dot-separated query in it.

use clap::Parser;
use serde_json::Value;
use sponge_data_query::{DataQuery, QueryError};
use thiserror::Error;

use crate::error::DataError;
use crate::json::to_json;
use crate::safety::SafetyMode;
use crate::value::DataValue;
use crate::view::DataContainer;

/// Command line of `data-query`.
#[derive(Debug, Parser)]
#[command(name = "data-query")]
#[command(about = "Look up a dot-separated query in a JSON document read from stdin")]
#[command(version)]
pub struct Cli {
    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Dot-separated data query; `\.` keeps a dot inside a segment
    pub query: String,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Data(#[from] DataError),
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("NOT_FOUND")]
    NotFound,
}

/// Looks up `query` in the JSON document `doc_json` and returns the value
/// found there as pretty-printed JSON.
pub fn lookup_query(doc_json: &str, query: &str) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let query: DataQuery = query.parse()?;
    let container = DataContainer::from_json(&doc, SafetyMode::NoDataCloned)?;
    log::debug!("loaded {} top-level keys", container.len());

    let value = match container.get(&query).ok_or(CliError::NotFound)? {
        DataValue::View(view) => to_json(&view)?,
        other => serde_json::to_value(&other)?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"player": {"name": "alex", "stats": {"hp": 20}}, "tags": ["a", "b"]}"#;

    #[test]
    fn test_lookup_leaf() {
        assert_eq!(lookup_query(DOC, "player.name").unwrap(), "\"alex\"");
        assert_eq!(lookup_query(DOC, "player.stats.hp").unwrap(), "20");
        assert_eq!(lookup_query(r#"{"a.b": {"c": 1}}"#, r"a\.b.c").unwrap(), "1");
    }

    #[test]
    fn test_lookup_view() {
        let out = lookup_query(DOC, "player.stats").unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"hp": 20}));
    }

    #[test]
    fn test_empty_query_returns_document() {
        let out = lookup_query(DOC, "").unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::from_str::<Value>(DOC).unwrap());
    }

    #[test]
    fn test_args_count_verbosity_in_any_form() {
        let cli = Cli::try_parse_from(["data-query", "a.b"]).unwrap();
        assert_eq!((cli.verbose, cli.query.as_str()), (0, "a.b"));
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);

        let cli = Cli::try_parse_from(["data-query", "-vvv", "a.b"]).unwrap();
        assert_eq!((cli.verbose, cli.query.as_str()), (3, "a.b"));
        assert_eq!(cli.log_level(), log::LevelFilter::Trace);

        let cli = Cli::try_parse_from(["data-query", "--verbose", "a.b"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);

        let cli = Cli::try_parse_from(["data-query", "a.b", "-v", "-v"]).unwrap();
        assert_eq!((cli.verbose, cli.query.as_str()), (2, "a.b"));
    }

    #[test]
    fn test_args_require_exactly_one_query() {
        assert!(Cli::try_parse_from(["data-query"]).is_err());
        assert!(Cli::try_parse_from(["data-query", "a", "b"]).is_err());
        assert!(Cli::try_parse_from(["data-query", "--loud", "a"]).is_err());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(lookup_query(DOC, "player.age"), Err(CliError::NotFound)));
        assert_eq!(lookup_query(DOC, "nope").unwrap_err().to_string(), "NOT_FOUND");
        assert!(matches!(lookup_query("[1]", "a"), Err(CliError::Data(DataError::NotAnObject(_)))));
        assert!(matches!(lookup_query("{", "a"), Err(CliError::Json(_))));
    }
}
