use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StructureError {
    #[error("No root table. add_table must be called before adding children.")]
    MissingRoot,

    #[error("Root table already defined as {0}")]
    RootAlreadyDefined(String),

    #[error("Unknown table {0}")]
    UnknownTable(String),

    #[error("Table {0} is already part of the structure")]
    DuplicateTable(String),

    #[error("Table {0} has neither id nor key column and can't have further children")]
    MissingIdentity(String),
}
