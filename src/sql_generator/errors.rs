use thiserror::Error;

use crate::aggregate_catalog::errors::CatalogError;
use crate::config::ConfigError;
use crate::query_planner::errors::StructureError;
use crate::render_plan::errors::RenderBuildError;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Aggregate error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("Render error: {0}")]
    Render(#[from] RenderBuildError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
