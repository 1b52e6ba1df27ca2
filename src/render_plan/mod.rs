//! Dialect-agnostic SQL statement produced from an analytic structure.

use render_expr::{ColumnAlias, OperatorApplication, RenderExpr};

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod alias_factory;
pub mod errors;
pub mod plan_builder;
pub mod render_expr;

pub use alias_factory::{AliasFactory, AliasKey};
pub use plan_builder::{DisplayNames, SqlNames, StructureToSelect};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SqlSelect {
    pub select: SelectItems,
    pub from: FromTable,
    pub joins: JoinItems,
    pub order_by: OrderByItems,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SelectItems(pub Vec<SelectItem>);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SelectItem {
    pub expression: RenderExpr,
    pub col_alias: Option<ColumnAlias>,
}

impl SelectItem {
    /// Name under which the item appears in the result set.
    pub fn output_name(&self) -> Option<&str> {
        match (&self.col_alias, &self.expression) {
            (Some(alias), _) => Some(&alias.0),
            (None, RenderExpr::PropertyAccessExp(access)) => Some(&access.column.0),
            (None, RenderExpr::ColumnAlias(alias)) => Some(&alias.0),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum FromTable {
    Table { name: String, alias: String },
    Subquery { query: Box<SqlSelect>, alias: String },
}

impl FromTable {
    pub fn alias(&self) -> &str {
        match self {
            FromTable::Table { alias, .. } | FromTable::Subquery { alias, .. } => alias,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct JoinItems(pub Vec<Join>);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Join {
    pub source: FromTable,
    /// AND-ed equalities
    pub joining_on: Vec<OperatorApplication>,
    pub join_type: JoinType,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum JoinType {
    FullOuter,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OrderByItems(pub Vec<OrderByItem>);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expression: RenderExpr,
    pub order: OrderByOrder,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum OrderByOrder {
    Asc,
    Desc,
}

impl SqlSelect {
    /// Output names of the select list, in order.
    pub fn output_names(&self) -> Vec<&str> {
        self.select.0.iter().filter_map(SelectItem::output_name).collect()
    }
}

impl fmt::Display for SqlSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---- SqlSelect ----")?;
        writeln!(f, "\nSELECT:")?;
        for item in &self.select.0 {
            writeln!(f, "  {:?}", item)?;
        }
        writeln!(f, "\nFROM:\n  {}", self.from.alias())?;
        writeln!(f, "\nJOINS:")?;
        for join in &self.joins.0 {
            writeln!(
                f,
                "  {:?} {} ON {} conditions",
                join.join_type,
                join.source.alias(),
                join.joining_on.len()
            )?;
        }
        writeln!(f, "\nORDER BY:")?;
        for item in &self.order_by.0 {
            writeln!(f, "  {:?} {:?}", item.expression, item.order)?;
        }
        writeln!(f, "-------------------")
    }
}
