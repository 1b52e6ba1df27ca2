use log::debug;

use super::aggregate_schema::{AggregateSchema, ColumnRef, EntityMapping, EntityPath};
use super::errors::CatalogError;
use crate::query_planner::structure::{AnalyticStructure, Multiplicity};
use crate::query_planner::structure_builder::AnalyticStructureBuilder;
use crate::query_planner::table_definition::TableDefinition;

pub type AggregateStructure = AnalyticStructure<EntityPath, ColumnRef>;

/// Drives the structure builder from an aggregate schema.
///
/// Entities are visited parent first, siblings in definition order, so
/// every `add_child_to` finds its parent already registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateToStructure;

impl AggregateToStructure {
    pub fn create_structure(
        &self,
        schema: &AggregateSchema,
    ) -> Result<AggregateStructure, CatalogError> {
        let root = schema.root();
        let mut builder = AnalyticStructureBuilder::new()
            .add_table(root.path.clone(), |td| configure(root, td))?;

        for entity in &schema.entities()[1..] {
            let parent = entity
                .path
                .parent()
                .ok_or_else(|| CatalogError::UnknownEntity {
                    aggregate: schema.name().to_string(),
                    path: entity.path.to_string(),
                })?;

            debug!(
                "AggregateToStructure: {} {} -> {} ({:?})",
                schema.name(),
                parent,
                entity.path,
                entity.multiplicity
            );

            builder = match entity.multiplicity {
                Multiplicity::Multiple => {
                    builder.add_child_to(&parent, entity.path.clone(), |td| configure(entity, td))?
                }
                Multiplicity::Single => builder
                    .add_single_child_to(&parent, entity.path.clone(), |td| configure(entity, td))?,
            };
        }

        Ok(builder.build()?)
    }
}

fn configure(
    entity: &EntityMapping,
    mut definition: TableDefinition<EntityPath, ColumnRef>,
) -> TableDefinition<EntityPath, ColumnRef> {
    if let Some(id) = entity.id() {
        definition = definition.with_id(id);
    }
    definition = definition.with_columns(entity.column_refs());
    if let Some(key) = entity.key() {
        definition = definition.with_key_column(key);
    }
    definition
}
