//! Memoised alias assignment for tables, columns and synthetic nodes.
//!
//! Aliases come from an ordered set of rules:
//! - generator rules own a prefix and a counter (`T`, `C`, `FK`, `V`, `J`,
//!   `RN`, `GT`, `MO`) and may append a readable hint;
//! - delegating rules have no identity of their own: a table scan uses the
//!   alias of its table token, a base column the alias of its column token,
//!   a derived column the alias of the column it re-exposes.
//!
//! Every key gets its alias once; later lookups return the same string.

use std::collections::HashMap;

use log::trace;

use super::errors::RenderBuildError;
use super::plan_builder::SqlNames;
use crate::config::GeneratorConfig;
use crate::query_planner::structure::{
    AnalyticColumn, AnalyticStructure, ColumnId, GreatestRole, Select, SelectId,
};
use crate::query_planner::Token;
use crate::utils::alias_naming::{format_alias, sanitize_hint};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AliasKey<T, C> {
    Table(T),
    ColumnToken(C),
    Select(SelectId),
    Column(ColumnId),
}

/// Alias source for one structure. Handles are structure-local, so a
/// factory must not be shared between structures.
#[derive(Debug, Clone)]
pub struct AliasFactory<T, C> {
    cache: HashMap<AliasKey<T, C>, String>,
    counters: HashMap<&'static str, usize>,
    counter_width: usize,
    max_hint_length: usize,
    name_hints: bool,
}

impl<T: Token, C: Token> Default for AliasFactory<T, C> {
    fn default() -> Self {
        Self::new(&GeneratorConfig::default())
    }
}

impl<T: Token, C: Token> AliasFactory<T, C> {
    pub fn new(config: &GeneratorConfig) -> Self {
        AliasFactory {
            cache: HashMap::new(),
            counters: HashMap::new(),
            counter_width: config.alias_counter_width,
            max_hint_length: config.max_name_hint_length,
            name_hints: config.name_hints,
        }
    }

    pub fn alias_for<N: SqlNames<T, C>>(
        &mut self,
        key: AliasKey<T, C>,
        structure: &AnalyticStructure<T, C>,
        names: &N,
    ) -> Result<String, RenderBuildError> {
        if let Some(alias) = self.cache.get(&key) {
            return Ok(alias.clone());
        }

        let alias = match &key {
            AliasKey::Table(table) => self.next("T", &names.table_name(table)?),
            AliasKey::ColumnToken(column) => self.next("C", &names.column_name(column)),
            AliasKey::Select(select) => self.select_alias(*select, structure, names)?,
            AliasKey::Column(column) => self.column_alias(*column, structure, names)?,
        };

        trace!("AliasFactory: {:?} -> {}", key, alias);
        self.cache.insert(key, alias.clone());
        Ok(alias)
    }

    /// Number of aliases handed out so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn select_alias<N: SqlNames<T, C>>(
        &mut self,
        select: SelectId,
        structure: &AnalyticStructure<T, C>,
        names: &N,
    ) -> Result<String, RenderBuildError> {
        match structure.select(select) {
            Select::Table(scan) => {
                self.alias_for(AliasKey::Table(scan.table.clone()), structure, names)
            }
            Select::View(_) => Ok(self.next("V", "")),
            Select::Join(_) => Ok(self.next("J", "")),
        }
    }

    fn column_alias<N: SqlNames<T, C>>(
        &mut self,
        column: ColumnId,
        structure: &AnalyticStructure<T, C>,
        names: &N,
    ) -> Result<String, RenderBuildError> {
        match structure.column(column) {
            AnalyticColumn::Base(token) => {
                self.alias_for(AliasKey::ColumnToken(token.clone()), structure, names)
            }
            AnalyticColumn::Derived(inner) => {
                self.alias_for(AliasKey::Column(*inner), structure, names)
            }
            AnalyticColumn::ForeignKey { owner, .. } => {
                let name = foreign_key_column_name(column, *owner, structure, names)?;
                Ok(self.next("FK", &name))
            }
            AnalyticColumn::RowNumber { .. } => Ok(self.next("RN", "")),
            AnalyticColumn::Greatest { role, .. } => {
                let hint = match role {
                    GreatestRole::RowNumber => "RN",
                    GreatestRole::Identity => "FK",
                };
                Ok(self.next("GT", hint))
            }
            AnalyticColumn::MaxOver { .. } => Ok(self.next("MO", "")),
            AnalyticColumn::Literal(value) => Err(RenderBuildError::NoAlias(value.to_string())),
        }
    }

    fn next(&mut self, prefix: &'static str, raw_hint: &str) -> String {
        let counter = self.counters.entry(prefix).or_insert(0);
        *counter += 1;
        let hint = if self.name_hints {
            sanitize_hint(raw_hint, self.max_hint_length)
        } else {
            String::new()
        };
        format_alias(prefix, *counter, self.counter_width, &hint)
    }
}

/// SQL name of the column storing a foreign key in its owning table.
pub(crate) fn foreign_key_column_name<T, C, N: SqlNames<T, C>>(
    column: ColumnId,
    owner: SelectId,
    structure: &AnalyticStructure<T, C>,
    names: &N,
) -> Result<String, RenderBuildError> {
    let referenced = structure
        .source_column(column)
        .ok_or_else(|| RenderBuildError::MissingSourceColumn(format!("{:?}", column)))?;
    names.foreign_key_column_name(structure.table_of(owner), referenced)
}
