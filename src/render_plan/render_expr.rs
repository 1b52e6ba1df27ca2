use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum RenderExpr {
    Literal(Literal),

    /// Bare reference to a select-list alias, as used in ORDER BY
    ColumnAlias(ColumnAlias),

    /// `table_alias.column`
    PropertyAccessExp(PropertyAccess),

    ScalarFnCall(ScalarFnCall),

    /// `name(args) OVER (PARTITION BY ...)`
    WindowFnCall(WindowFnCall),

    OperatorApplicationExp(OperatorApplication),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TableAlias(pub String);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ColumnAlias(pub String);

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Column(pub String);

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Operator {
    Equal,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OperatorApplication {
    pub operator: Operator,
    pub operands: Vec<RenderExpr>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PropertyAccess {
    pub table_alias: TableAlias,
    pub column: Column,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ScalarFnCall {
    pub name: String,
    pub args: Vec<RenderExpr>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct WindowFnCall {
    pub name: String,
    pub args: Vec<RenderExpr>,
    pub partition_by: Vec<RenderExpr>,
}

impl RenderExpr {
    pub fn property(table_alias: &str, column: &str) -> Self {
        RenderExpr::PropertyAccessExp(PropertyAccess {
            table_alias: TableAlias(table_alias.to_string()),
            column: Column(column.to_string()),
        })
    }

    pub fn equal(left: RenderExpr, right: RenderExpr) -> OperatorApplication {
        OperatorApplication {
            operator: Operator::Equal,
            operands: vec![left, right],
        }
    }
}
