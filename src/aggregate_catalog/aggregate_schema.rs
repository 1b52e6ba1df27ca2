//! Validated in-memory form of an aggregate definition.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::{AggregateConfig, EntityDefinition};
use super::errors::CatalogError;
use crate::query_planner::structure::Multiplicity;
use crate::render_plan::errors::RenderBuildError;
use crate::render_plan::plan_builder::SqlNames;

/// Dot-joined property path from the aggregate root; the root itself is the
/// empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityPath(String);

impl EntityPath {
    pub fn root() -> Self {
        EntityPath(String::new())
    }

    pub fn parse(path: &str) -> Self {
        EntityPath(path.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn child(&self, property: &str) -> Self {
        if self.is_root() {
            EntityPath(property.to_string())
        } else {
            EntityPath(format!("{}.{}", self.0, property))
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind('.') {
            Some(dot) => EntityPath(self.0[..dot].to_string()),
            None => EntityPath::root(),
        })
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A column of the table mapped at `entity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    pub entity: EntityPath,
    pub column: String,
}

impl ColumnRef {
    pub fn new(entity: &EntityPath, column: &str) -> Self {
        ColumnRef {
            entity: entity.clone(),
            column: column.to_string(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entity.is_root() {
            write!(f, "{}", self.column)
        } else {
            write!(f, "{}.{}", self.entity, self.column)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityMapping {
    pub path: EntityPath,
    pub table: String,
    pub id_column: Option<String>,
    pub columns: Vec<String>,
    pub key_column: Option<String>,
    /// Column holding the parent's id; `None` only for the root.
    pub back_reference: Option<String>,
    pub multiplicity: Multiplicity,
}

impl EntityMapping {
    pub fn id(&self) -> Option<ColumnRef> {
        self.id_column.as_deref().map(|c| ColumnRef::new(&self.path, c))
    }

    pub fn column_refs(&self) -> Vec<ColumnRef> {
        self.columns
            .iter()
            .map(|c| ColumnRef::new(&self.path, c))
            .collect()
    }

    pub fn key(&self) -> Option<ColumnRef> {
        self.key_column.as_deref().map(|c| ColumnRef::new(&self.path, c))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSchema {
    name: String,
    /// Pre-order: every parent precedes its children, siblings keep their
    /// definition order.
    entities: Vec<EntityMapping>,
    by_path: HashMap<EntityPath, usize>,
}

impl AggregateSchema {
    pub fn build(config: AggregateConfig) -> Result<Self, CatalogError> {
        let mut schema = AggregateSchema {
            name: config.name,
            entities: Vec::new(),
            by_path: HashMap::new(),
        };
        if schema.name.trim().is_empty() {
            return Err(schema.invalid("aggregate name cannot be empty"));
        }
        if config.root.id_column.is_none() && !config.root.children.is_empty() {
            return Err(schema.invalid(format!(
                "root table {} has no id column and can't have children",
                config.root.table
            )));
        }

        schema.add_entity(EntityPath::root(), &config.root, None, Multiplicity::Single, None)?;
        Ok(schema)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::build(AggregateConfig::from_yaml_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::build(AggregateConfig::from_json_str(json)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &EntityMapping {
        &self.entities[0]
    }

    /// All entities, parents before children.
    pub fn entities(&self) -> &[EntityMapping] {
        &self.entities
    }

    pub fn entity(&self, path: &EntityPath) -> Option<&EntityMapping> {
        self.by_path.get(path).map(|&index| &self.entities[index])
    }

    pub fn require_entity(&self, path: &EntityPath) -> Result<&EntityMapping, CatalogError> {
        self.entity(path).ok_or_else(|| CatalogError::UnknownEntity {
            aggregate: self.name.clone(),
            path: path.to_string(),
        })
    }

    fn add_entity(
        &mut self,
        path: EntityPath,
        definition: &EntityDefinition,
        key_column: Option<String>,
        multiplicity: Multiplicity,
        back_reference: Option<String>,
    ) -> Result<(), CatalogError> {
        if definition.table.trim().is_empty() {
            return Err(self.invalid(format!("entity {} has an empty table name", path)));
        }

        self.by_path.insert(path.clone(), self.entities.len());
        self.entities.push(EntityMapping {
            path: path.clone(),
            table: definition.table.clone(),
            id_column: definition.id_column.clone(),
            columns: definition.columns.clone(),
            key_column,
            back_reference,
            multiplicity,
        });

        let mut seen = HashSet::new();
        for child in &definition.children {
            if child.property.is_empty() || child.property.contains('.') {
                return Err(self.invalid(format!(
                    "invalid property name `{}` below {}",
                    child.property, path
                )));
            }
            if !seen.insert(child.property.as_str()) {
                return Err(self.invalid(format!(
                    "duplicate property `{}` below {}",
                    child.property, path
                )));
            }

            let back_reference = child
                .back_reference
                .clone()
                .unwrap_or_else(|| format!("{}_id", definition.table));
            self.add_entity(
                path.child(&child.property),
                &child.entity,
                child.key_column.clone(),
                child.multiplicity,
                Some(back_reference),
            )?;
        }
        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> CatalogError {
        CatalogError::InvalidConfig {
            aggregate: self.name.clone(),
            message: message.into(),
        }
    }
}

impl SqlNames<EntityPath, ColumnRef> for AggregateSchema {
    fn table_name(&self, table: &EntityPath) -> Result<String, RenderBuildError> {
        self.entity(table)
            .map(|e| e.table.clone())
            .ok_or_else(|| RenderBuildError::UnknownTable(table.to_string()))
    }

    fn column_name(&self, column: &ColumnRef) -> String {
        column.column.clone()
    }

    /// A copied ancestor id is stored under the back reference of `owner`,
    /// even when it reaches `owner` through an id-less parent; any other
    /// copied column as `<table>_<column>`.
    fn foreign_key_column_name(
        &self,
        owner: &EntityPath,
        referenced: &ColumnRef,
    ) -> Result<String, RenderBuildError> {
        let owner_entity = self
            .entity(owner)
            .ok_or_else(|| RenderBuildError::UnknownTable(owner.to_string()))?;
        let referenced_entity = self
            .entity(&referenced.entity)
            .ok_or_else(|| RenderBuildError::UnknownTable(referenced.entity.to_string()))?;

        let is_id = referenced_entity.id_column.as_deref() == Some(referenced.column.as_str());
        if is_id && is_ancestor(&referenced.entity, owner) {
            if let Some(back_reference) = &owner_entity.back_reference {
                return Ok(back_reference.clone());
            }
        }

        Ok(format!("{}_{}", referenced_entity.table, referenced.column))
    }
}

fn is_ancestor(ancestor: &EntityPath, path: &EntityPath) -> bool {
    let mut current = path.parent();
    while let Some(parent) = current {
        if &parent == ancestor {
            return true;
        }
        current = parent.parent();
    }
    false
}
