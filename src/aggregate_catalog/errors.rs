use thiserror::Error;

use crate::query_planner::errors::StructureError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Failed to read aggregate definition: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse aggregate definition: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid aggregate `{aggregate}`: {message}")]
    InvalidConfig { aggregate: String, message: String },
    #[error("Unknown entity path `{path}` in aggregate `{aggregate}`")]
    UnknownEntity { aggregate: String, path: String },
    #[error(transparent)]
    Structure(#[from] StructureError),
}
