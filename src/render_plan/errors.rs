use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RenderBuildError {
    #[error("Literal column {0} has no alias.")]
    NoAlias(String),

    #[error("Column {0} is neither available from a source nor computable at this level.")]
    ColumnNotInScope(String),

    #[error("Table {0} is not known to the naming source.")]
    UnknownTable(String),

    #[error("Foreign key {0} does not reference a table column.")]
    MissingSourceColumn(String),
}
