//! Aggregate mapping metadata and the walker that turns it into an
//! analytic structure.

pub mod aggregate_schema;
pub mod aggregate_to_structure;
pub mod config;
pub mod errors;

pub use aggregate_schema::{AggregateSchema, ColumnRef, EntityMapping, EntityPath};
pub use aggregate_to_structure::{AggregateStructure, AggregateToStructure};
pub use config::{AggregateConfig, ChildDefinition, EntityDefinition};
pub use errors::CatalogError;
