//! Aggregate schema in, SQL out.
//!
//! [`AnalyticSqlGenerator`] chains the metadata walker, the structure
//! builder, the lowering to a [`SqlSelect`] and the ANSI rendering.
//! [`generator_cache::SqlGeneratorSource`] memoises the result per aggregate.

use log::debug;
use validator::Validate;

use crate::aggregate_catalog::aggregate_schema::AggregateSchema;
use crate::aggregate_catalog::aggregate_to_structure::{AggregateStructure, AggregateToStructure};
use crate::config::{ConfigError, GeneratorConfig};
use crate::render_plan::alias_factory::AliasFactory;
use crate::render_plan::plan_builder::StructureToSelect;
use crate::render_plan::SqlSelect;

pub mod errors;
pub mod generator_cache;
pub mod to_sql;

pub use errors::GeneratorError;
pub use to_sql::ToSql;

/// Everything produced for one aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuery {
    pub aggregate: String,
    pub select: SqlSelect,
    pub sql: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticSqlGenerator {
    config: GeneratorConfig,
}

impl AnalyticSqlGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        AnalyticSqlGenerator { config }
    }

    /// Like [`new`](Self::new), rejecting out-of-range settings.
    pub fn try_new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn create_structure(
        &self,
        schema: &AggregateSchema,
    ) -> Result<AggregateStructure, GeneratorError> {
        Ok(AggregateToStructure.create_structure(schema)?)
    }

    /// The statement loading every instance of the aggregate.
    pub fn create_select(&self, schema: &AggregateSchema) -> Result<SqlSelect, GeneratorError> {
        let structure = self.create_structure(schema)?;
        let aliases = AliasFactory::new(&self.config);
        let select = StructureToSelect::with_aliases(&structure, schema, aliases).create_select()?;
        Ok(select)
    }

    /// [`create_select`](Self::create_select) rendered as ANSI SQL text.
    pub fn find_all(&self, schema: &AggregateSchema) -> Result<String, GeneratorError> {
        Ok(self.create_select(schema)?.to_sql())
    }

    pub fn generate(&self, schema: &AggregateSchema) -> Result<GeneratedQuery, GeneratorError> {
        let select = self.create_select(schema)?;
        let sql = select.to_sql();
        debug!(
            "AnalyticSqlGenerator: generated {} bytes of SQL for aggregate {}",
            sql.len(),
            schema.name()
        );
        Ok(GeneratedQuery {
            aggregate: schema.name().to_string(),
            select,
            sql,
        })
    }
}
