use std::fmt;

use sponge_data_query::{DataQuery, QueryError};
use thiserror::Error;

/// The collaborators a view consults while normalizing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    Registry,
    DataManager,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::Registry => f.write_str("registry lookup"),
            Collaborator::DataManager => f.write_str("data manager"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("the path is empty")]
    EmptyPath,

    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("cannot store a data view within itself (at `{path}`)")]
    SelfReference { path: DataQuery },

    #[error("no {collaborator} is configured to represent a value of type {type_name}")]
    CollaboratorUnavailable {
        collaborator: Collaborator,
        type_name: &'static str,
    },

    #[error("no registry or translator can represent a value of type {0}")]
    Unrepresentable(&'static str),

    #[error("expected a JSON object at the document root, found {0}")]
    NotAnObject(&'static str),

    #[error("missing data at `{0}`")]
    MissingData(DataQuery),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}
