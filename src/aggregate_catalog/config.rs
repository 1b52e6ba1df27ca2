//! Serde model of aggregate mapping definitions.
//!
//! An aggregate is a root entity with nested children. Each child names the
//! property under which it hangs off its parent, and may override the
//! foreign-key column that points back to the parent:
//!
//! ```yaml
//! name: customer
//! root:
//!   table: customer
//!   id_column: id
//!   columns: [name]
//!   children:
//!     - property: addresses
//!       table: address
//!       id_column: id
//!       columns: [street]
//!     - property: orders
//!       table: purchase_order
//!       multiplicity: multiple
//!       key_column: order_index
//!       back_reference: customer
//! ```
//!
//! Definitions are validated when turned into an
//! [`AggregateSchema`](super::aggregate_schema::AggregateSchema).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use crate::query_planner::structure::Multiplicity;

/// Aggregate definition loaded from YAML/JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// Aggregate name, also the key of cached queries
    pub name: String,
    /// The aggregate root
    pub root: EntityDefinition,
}

/// Table mapping shared by the root and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Table name
    pub table: String,
    /// Identifier column, if the table has one
    #[serde(default)]
    pub id_column: Option<String>,
    /// Plain columns, in select order
    #[serde(default)]
    pub columns: Vec<String>,
    /// Nested children, in join order
    #[serde(default)]
    pub children: Vec<ChildDefinition>,
}

/// A child entity and how it hangs off its parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDefinition {
    /// Property name on the parent; unique among siblings
    pub property: String,
    /// `single` (one-to-one) or `multiple` (one-to-many, default)
    #[serde(default = "default_multiplicity")]
    pub multiplicity: Multiplicity,
    /// List index or map key column of keyed collections
    #[serde(default)]
    pub key_column: Option<String>,
    /// Column of this table holding the parent's id.
    /// Defaults to `<parent table>_id`.
    #[serde(default)]
    pub back_reference: Option<String>,
    #[serde(flatten)]
    pub entity: EntityDefinition,
}

fn default_multiplicity() -> Multiplicity {
    Multiplicity::Multiple
}

impl AggregateConfig {
    /// Load an aggregate definition from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| CatalogError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse an aggregate definition from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Parse an aggregate definition from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }
}
