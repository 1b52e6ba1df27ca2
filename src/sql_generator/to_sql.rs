//! Reference ANSI rendering of the SQL AST.
//!
//! Keywords are upper-case and identifiers are emitted as-is, without
//! quoting. Dialects that need quoting or lack FULL OUTER JOIN render the
//! AST themselves.

use crate::render_plan::render_expr::{Literal, Operator, OperatorApplication, RenderExpr};
use crate::render_plan::{
    FromTable, Join, JoinItems, JoinType, OrderByItems, OrderByOrder, SelectItems, SqlSelect,
};

pub trait ToSql {
    fn to_sql(&self) -> String;
}

impl ToSql for SqlSelect {
    fn to_sql(&self) -> String {
        let mut sql = self.select.to_sql();
        sql.push_str(" FROM ");
        sql.push_str(&self.from.to_sql());
        sql.push_str(&self.joins.to_sql());
        sql.push_str(&self.order_by.to_sql());
        sql
    }
}

impl ToSql for SelectItems {
    fn to_sql(&self) -> String {
        let items: Vec<String> = self
            .0
            .iter()
            .map(|item| match &item.col_alias {
                Some(alias) => format!("{} AS {}", item.expression.to_sql(), alias.0),
                None => item.expression.to_sql(),
            })
            .collect();
        format!("SELECT {}", items.join(", "))
    }
}

impl ToSql for FromTable {
    fn to_sql(&self) -> String {
        match self {
            FromTable::Table { name, alias } => format!("{} AS {}", name, alias),
            FromTable::Subquery { query, alias } => format!("({}) AS {}", query.to_sql(), alias),
        }
    }
}

impl ToSql for JoinItems {
    fn to_sql(&self) -> String {
        let mut sql = String::new();
        for join in &self.0 {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }
        sql
    }
}

impl ToSql for Join {
    fn to_sql(&self) -> String {
        let conditions: Vec<String> = self.joining_on.iter().map(ToSql::to_sql).collect();
        format!(
            "{} {} ON {}",
            self.join_type.to_sql(),
            self.source.to_sql(),
            conditions.join(" AND ")
        )
    }
}

impl ToSql for JoinType {
    fn to_sql(&self) -> String {
        match self {
            JoinType::FullOuter => "FULL OUTER JOIN".to_string(),
        }
    }
}

impl ToSql for OrderByItems {
    fn to_sql(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let items: Vec<String> = self
            .0
            .iter()
            .map(|item| format!("{} {}", item.expression.to_sql(), item.order.to_sql()))
            .collect();
        format!(" ORDER BY {}", items.join(", "))
    }
}

impl ToSql for OrderByOrder {
    fn to_sql(&self) -> String {
        match self {
            OrderByOrder::Asc => "ASC".to_string(),
            OrderByOrder::Desc => "DESC".to_string(),
        }
    }
}

impl ToSql for OperatorApplication {
    fn to_sql(&self) -> String {
        let operands: Vec<String> = self.operands.iter().map(ToSql::to_sql).collect();
        match self.operator {
            Operator::Equal => operands.join(" = "),
        }
    }
}

impl ToSql for RenderExpr {
    fn to_sql(&self) -> String {
        match self {
            RenderExpr::Literal(Literal::Integer(value)) => value.to_string(),
            RenderExpr::ColumnAlias(alias) => alias.0.clone(),
            RenderExpr::PropertyAccessExp(access) => {
                format!("{}.{}", access.table_alias.0, access.column.0)
            }
            RenderExpr::ScalarFnCall(call) => {
                let args: Vec<String> = call.args.iter().map(ToSql::to_sql).collect();
                format!("{}({})", call.name, args.join(", "))
            }
            RenderExpr::WindowFnCall(call) => {
                let args: Vec<String> = call.args.iter().map(ToSql::to_sql).collect();
                let partition: Vec<String> = call.partition_by.iter().map(ToSql::to_sql).collect();
                if partition.is_empty() {
                    format!("{}({}) OVER ()", call.name, args.join(", "))
                } else {
                    format!(
                        "{}({}) OVER (PARTITION BY {})",
                        call.name,
                        args.join(", "),
                        partition.join(", ")
                    )
                }
            }
            RenderExpr::OperatorApplicationExp(op) => op.to_sql(),
        }
    }
}
