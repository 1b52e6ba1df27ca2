/// Configuration of one table scan, handed to the builder callbacks.
///
/// ```
/// use aggregate_sql::TableDefinition;
///
/// let person = TableDefinition::new("person")
///     .with_id("person_id")
///     .with_columns(["value", "lastname"])
///     .with_columns(["value"]);
///
/// assert_eq!(person.columns(), &["value", "lastname"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition<T, C> {
    table: T,
    id: Option<C>,
    columns: Vec<C>,
    key_column: Option<C>,
}

impl<T, C: PartialEq> TableDefinition<T, C> {
    pub fn new(table: T) -> Self {
        TableDefinition {
            table,
            id: None,
            columns: Vec::new(),
            key_column: None,
        }
    }

    pub fn with_id(mut self, id: C) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds plain columns. Columns already present are skipped, so repeated
    /// calls accumulate instead of duplicating.
    pub fn with_columns<I: IntoIterator<Item = C>>(mut self, columns: I) -> Self {
        for column in columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self
    }

    /// Ordinal or map key of a keyed collection.
    pub fn with_key_column(mut self, key_column: C) -> Self {
        self.key_column = Some(key_column);
        self
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn id(&self) -> Option<&C> {
        self.id.as_ref()
    }

    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    pub fn key_column(&self) -> Option<&C> {
        self.key_column.as_ref()
    }

    /// True when the table can identify its rows without foreign keys.
    pub fn has_identity(&self) -> bool {
        self.id.is_some() || self.key_column.is_some()
    }
}
