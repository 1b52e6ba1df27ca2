//! Lowering of an [`AnalyticStructure`] into a [`SqlSelect`].
//!
//! Every SELECT level keeps a scope that maps canonical column handles to
//! the expression under which the level's sources expose them: `alias.column`
//! for a table scan, `subquery_alias.column_alias` for an inline query.
//! Synthetic columns that no source provides (GREATEST, ROW_NUMBER,
//! MAX ... OVER, literals) are computed inline from scoped operands.

use std::collections::HashMap;
use std::fmt::Display;

use log::debug;

use super::alias_factory::{foreign_key_column_name, AliasFactory, AliasKey};
use super::errors::RenderBuildError;
use super::render_expr::{ColumnAlias, Literal, RenderExpr, ScalarFnCall, WindowFnCall};
use super::{
    FromTable, Join, JoinItems, JoinType, OrderByItem, OrderByItems, OrderByOrder, SelectItem,
    SelectItems, SqlSelect,
};
use crate::query_planner::structure::{
    AnalyticColumn, AnalyticStructure, ColumnId, Select, SelectId, TableScan,
};
use crate::query_planner::Token;

/// SQL names of the tokens used in a structure.
///
/// Table lookups fail with [`RenderBuildError::UnknownTable`] for tokens the
/// naming source does not know.
pub trait SqlNames<T, C> {
    fn table_name(&self, table: &T) -> Result<String, RenderBuildError>;

    fn column_name(&self, column: &C) -> String;

    /// Column of `owner` that stores a copy of `referenced`.
    fn foreign_key_column_name(&self, owner: &T, referenced: &C)
        -> Result<String, RenderBuildError>;
}

/// Uses the tokens' `Display` output as SQL names; a foreign key is named
/// after the column it references.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayNames;

impl<T: Display, C: Display> SqlNames<T, C> for DisplayNames {
    fn table_name(&self, table: &T) -> Result<String, RenderBuildError> {
        Ok(table.to_string())
    }

    fn column_name(&self, column: &C) -> String {
        column.to_string()
    }

    fn foreign_key_column_name(
        &self,
        _owner: &T,
        referenced: &C,
    ) -> Result<String, RenderBuildError> {
        Ok(referenced.to_string())
    }
}

/// How a source of the current SELECT level exposes a column.
#[derive(Debug, Clone)]
struct ScopeEntry {
    expression: RenderExpr,
    /// Already named by its alias, so re-selecting it needs no `AS`.
    aliased: bool,
}

type Scope = HashMap<ColumnId, ScopeEntry>;

pub struct StructureToSelect<'s, T, C, N> {
    structure: &'s AnalyticStructure<T, C>,
    names: &'s N,
    aliases: AliasFactory<T, C>,
}

impl<'s, T: Token, C: Token, N: SqlNames<T, C>> StructureToSelect<'s, T, C, N> {
    pub fn new(structure: &'s AnalyticStructure<T, C>, names: &'s N) -> Self {
        Self::with_aliases(structure, names, AliasFactory::default())
    }

    pub fn with_aliases(
        structure: &'s AnalyticStructure<T, C>,
        names: &'s N,
        aliases: AliasFactory<T, C>,
    ) -> Self {
        StructureToSelect {
            structure,
            names,
            aliases,
        }
    }

    /// Alias of any table, column or select of the structure, as used in the
    /// generated statement.
    pub fn alias_for(&mut self, key: AliasKey<T, C>) -> Result<String, RenderBuildError> {
        self.aliases.alias_for(key, self.structure, self.names)
    }

    /// Lowers the whole structure. A join at the top is ordered by its
    /// composite id (the `Greatest` identity columns) followed by its
    /// composite row number, so all rows of one root stay adjacent.
    pub fn create_select(&mut self) -> Result<SqlSelect, RenderBuildError> {
        let structure = self.structure;
        let root = structure.root();
        let mut select = self.lower(root)?;

        if let Select::Join(join) = structure.select(root) {
            let mut order_by = Vec::with_capacity(join.identity.len() + 1);
            for &id in join.identity.iter().chain(std::iter::once(&join.row_number)) {
                order_by.push(OrderByItem {
                    expression: RenderExpr::ColumnAlias(ColumnAlias(self.column_alias(id)?)),
                    order: OrderByOrder::Asc,
                });
            }
            select.order_by = OrderByItems(order_by);
        }

        debug!(
            "StructureToSelect: {} select items, {} joins at top level",
            select.select.0.len(),
            select.joins.0.len()
        );
        Ok(select)
    }

    fn lower(&mut self, select: SelectId) -> Result<SqlSelect, RenderBuildError> {
        let structure = self.structure;
        match structure.select(select) {
            Select::Table(scan) => {
                let (from, scope) = self.table_source(select, scan)?;
                let items = self.select_items(&scan.all_columns(), &scope)?;
                Ok(simple_select(items, from))
            }
            Select::View(view) => {
                let scan = structure
                    .table_scan(view.table)
                    .ok_or_else(|| RenderBuildError::ColumnNotInScope(format!("{:?}", view.table)))?;
                let (from, scope) = self.table_source(view.table, scan)?;
                let mut columns = scan.all_columns();
                columns.push(view.row_number);
                let items = self.select_items(&columns, &scope)?;
                Ok(simple_select(items, from))
            }
            Select::Join(join) => {
                let (from, mut scope) = match structure.select(join.parent) {
                    Select::Table(scan) => self.table_source(join.parent, scan)?,
                    _ => self.subquery_source(join.parent)?,
                };
                let (child, child_scope) = self.subquery_source(join.child)?;
                scope.extend(child_scope);

                let mut joining_on = Vec::with_capacity(join.conditions.len());
                for condition in &join.conditions {
                    joining_on.push(RenderExpr::equal(
                        self.expression(condition.left, &scope)?,
                        self.expression(condition.right, &scope)?,
                    ));
                }

                let items = self.select_items(&join.columns, &scope)?;
                Ok(SqlSelect {
                    select: items,
                    from,
                    joins: JoinItems(vec![Join {
                        source: child,
                        joining_on,
                        join_type: JoinType::FullOuter,
                    }]),
                    order_by: OrderByItems(Vec::new()),
                })
            }
        }
    }

    /// A table scan used directly: `table AS alias`.
    fn table_source(
        &mut self,
        select: SelectId,
        scan: &TableScan<T>,
    ) -> Result<(FromTable, Scope), RenderBuildError> {
        let alias = self.alias_for(AliasKey::Select(select))?;
        let mut scope = Scope::new();
        for column in scan.all_columns() {
            let name = match self.structure.column(column) {
                AnalyticColumn::Base(token) => self.names.column_name(token),
                AnalyticColumn::ForeignKey { owner, .. } => {
                    foreign_key_column_name(column, *owner, self.structure, self.names)?
                }
                _ => continue,
            };
            scope.insert(
                column,
                ScopeEntry {
                    expression: RenderExpr::property(&alias, &name),
                    aliased: false,
                },
            );
        }

        let from = FromTable::Table {
            name: self.names.table_name(&scan.table)?,
            alias,
        };
        Ok((from, scope))
    }

    /// Any select rendered as an aliased inline query.
    fn subquery_source(&mut self, select: SelectId) -> Result<(FromTable, Scope), RenderBuildError> {
        let query = self.lower(select)?;
        let alias = self.alias_for(AliasKey::Select(select))?;

        let mut scope = Scope::new();
        for column in self.structure.columns_of(select) {
            let column_alias = self.column_alias(column)?;
            scope.insert(
                self.structure.canonical(column),
                ScopeEntry {
                    expression: RenderExpr::property(&alias, &column_alias),
                    aliased: true,
                },
            );
        }

        let from = FromTable::Subquery {
            query: Box::new(query),
            alias,
        };
        Ok((from, scope))
    }

    fn select_items(
        &mut self,
        columns: &[ColumnId],
        scope: &Scope,
    ) -> Result<SelectItems, RenderBuildError> {
        let mut items = Vec::with_capacity(columns.len());
        for &column in columns {
            let canonical = self.structure.canonical(column);
            let item = match scope.get(&canonical) {
                Some(entry) if entry.aliased => SelectItem {
                    expression: entry.expression.clone(),
                    col_alias: None,
                },
                _ => SelectItem {
                    expression: self.expression(column, scope)?,
                    col_alias: Some(ColumnAlias(self.column_alias(column)?)),
                },
            };
            items.push(item);
        }
        Ok(SelectItems(items))
    }

    fn expression(&mut self, column: ColumnId, scope: &Scope) -> Result<RenderExpr, RenderBuildError> {
        let structure = self.structure;
        let canonical = structure.canonical(column);
        if let Some(entry) = scope.get(&canonical) {
            return Ok(entry.expression.clone());
        }

        match structure.column(canonical) {
            AnalyticColumn::Literal(value) => Ok(RenderExpr::Literal(Literal::Integer(*value))),
            AnalyticColumn::Greatest { left, right, .. } => {
                Ok(RenderExpr::ScalarFnCall(ScalarFnCall {
                    name: "GREATEST".to_string(),
                    args: vec![
                        self.expression(*left, scope)?,
                        self.expression(*right, scope)?,
                    ],
                }))
            }
            AnalyticColumn::RowNumber { partition_by } => {
                Ok(RenderExpr::WindowFnCall(WindowFnCall {
                    name: "ROW_NUMBER".to_string(),
                    args: Vec::new(),
                    partition_by: self.expressions(partition_by, scope)?,
                }))
            }
            AnalyticColumn::MaxOver {
                column,
                partition_by,
            } => Ok(RenderExpr::WindowFnCall(WindowFnCall {
                name: "MAX".to_string(),
                args: vec![self.expression(*column, scope)?],
                partition_by: self.expressions(partition_by, scope)?,
            })),
            AnalyticColumn::Base(_)
            | AnalyticColumn::Derived(_)
            | AnalyticColumn::ForeignKey { .. } => Err(RenderBuildError::ColumnNotInScope(
                format!("{:?}", canonical),
            )),
        }
    }

    fn expressions(
        &mut self,
        columns: &[ColumnId],
        scope: &Scope,
    ) -> Result<Vec<RenderExpr>, RenderBuildError> {
        columns
            .iter()
            .map(|&column| self.expression(column, scope))
            .collect()
    }

    fn column_alias(&mut self, column: ColumnId) -> Result<String, RenderBuildError> {
        self.alias_for(AliasKey::Column(column))
    }
}

fn simple_select(items: SelectItems, from: FromTable) -> SqlSelect {
    SqlSelect {
        select: items,
        from,
        joins: JoinItems(Vec::new()),
        order_by: OrderByItems(Vec::new()),
    }
}
