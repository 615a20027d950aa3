use std::{io, path::PathBuf};

use thiserror::Error;

/// Boxed cause carried by errors whose origin is a host-provided collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`Connection`](crate::catalog::Connection).
///
/// The host owns the driver, so only the message survives the boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConnectionError {
    message: String,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while inspecting, planning or cleaning a schema.
///
/// None of these are retried at this layer. A failed clean may leave the
/// schema half-cleaned; deciding what to do next belongs to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog metadata for the schema could not be read. Nothing was planned.
    #[error("catalog of schema {schema:?} is unavailable: {source}")]
    CatalogUnavailable {
        schema: String,
        #[source]
        source: BoxError,
    },

    /// A catalog row carried a kind the planner does not know how to drop.
    #[error("catalog object {name:?} has unrecognized kind {kind:?}")]
    InvalidObjectKind { name: String, kind: String },

    /// The engine rejected a planned statement. Statements before `index`
    /// were executed; nothing after it was attempted.
    #[error("statement #{index} failed ({statement}): {source}")]
    Execution {
        index: usize,
        statement: String,
        #[source]
        source: ConnectionError,
    },

    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("unexpected result for query {query:?}: {detail}")]
    UnexpectedResult { query: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid catalog snapshot {path:?}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to walk snapshot directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub(crate) fn catalog_unavailable(schema: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::CatalogUnavailable {
            schema: schema.into(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
