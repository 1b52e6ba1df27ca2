//! Immutable result model of the structure builder.
//!
//! All nodes live in two arenas owned by [`AnalyticStructure`] and refer to
//! each other through [`SelectId`] and [`ColumnId`] handles. Handles are only
//! meaningful for the structure that produced them.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Handle of a [`Select`] inside its [`AnalyticStructure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectId(pub(crate) usize);

/// Handle of an [`AnalyticColumn`] inside its [`AnalyticStructure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    /// one-to-one
    Single,
    /// one-to-many
    Multiple,
}

/// Why a [`AnalyticColumn::Greatest`] exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GreatestRole {
    /// Combines a parent id column with the matching child foreign key.
    Identity,
    /// Combines the row numbers of both sides of a join.
    RowNumber,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticColumn<C> {
    /// A column of the underlying table.
    Base(C),
    /// Re-exposes another column one join level up.
    Derived(ColumnId),
    /// Copy of an ancestor id column stored in the table `owner`.
    ForeignKey { references: ColumnId, owner: SelectId },
    /// `ROW_NUMBER() OVER (PARTITION BY ...)`
    RowNumber { partition_by: Vec<ColumnId> },
    /// NULL-safe maximum of two columns.
    Greatest {
        left: ColumnId,
        right: ColumnId,
        role: GreatestRole,
    },
    /// `MAX(column) OVER (PARTITION BY ...)`, spreads an ancestor foreign key
    /// over all rows of a joined branch.
    MaxOver {
        column: ColumnId,
        partition_by: Vec<ColumnId>,
    },
    Literal(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinCondition {
    pub left: ColumnId,
    pub right: ColumnId,
}

/// One table scan.
#[derive(Debug, Clone, PartialEq)]
pub struct TableScan<T> {
    pub table: T,
    pub id: Option<ColumnId>,
    pub columns: Vec<ColumnId>,
    pub foreign_keys: Vec<ColumnId>,
    pub key_column: Option<ColumnId>,
    /// Always a literal `1`.
    pub row_number: ColumnId,
}

impl<T> TableScan<T> {
    /// id, plain columns, foreign keys, key column.
    pub fn all_columns(&self) -> Vec<ColumnId> {
        let mut result = Vec::with_capacity(self.columns.len() + self.foreign_keys.len() + 2);
        result.extend(self.id);
        result.extend(self.columns.iter().copied());
        result.extend(self.foreign_keys.iter().copied());
        result.extend(self.key_column);
        result
    }

    /// The declared id, or the foreign keys followed by the key column.
    pub fn id_columns(&self) -> Vec<ColumnId> {
        match self.id {
            Some(id) => vec![id],
            None => {
                let mut derived = self.foreign_keys.clone();
                derived.extend(self.key_column);
                derived
            }
        }
    }
}

/// A table scan extended by a row number partitioned by its foreign keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticView {
    pub table: SelectId,
    pub row_number: ColumnId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticJoin {
    pub parent: SelectId,
    pub child: SelectId,
    pub multiplicity: Multiplicity,
    pub conditions: Vec<JoinCondition>,
    /// The parent's id, re-exposed.
    pub id: Vec<ColumnId>,
    /// One `Greatest(parent id, child foreign key)` per parent id column.
    pub identity: Vec<ColumnId>,
    /// `Greatest(parent row number, child row number)`
    pub row_number: ColumnId,
    /// Foreign keys towards the ancestor, one `MaxOver` per incoming id column.
    pub foreign_keys: Vec<ColumnId>,
    pub columns: Vec<ColumnId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Select<T> {
    Table(TableScan<T>),
    View(AnalyticView),
    Join(AnalyticJoin),
}

/// The finished, immutable query structure.
#[derive(Debug, Clone)]
pub struct AnalyticStructure<T, C> {
    pub(crate) selects: Vec<Select<T>>,
    pub(crate) columns: Vec<AnalyticColumn<C>>,
    pub(crate) root: SelectId,
}

impl<T, C> AnalyticStructure<T, C> {
    pub fn root(&self) -> SelectId {
        self.root
    }

    /// Panics when `id` was produced by another structure.
    pub fn select(&self, id: SelectId) -> &Select<T> {
        &self.selects[id.0]
    }

    pub fn get_select(&self, id: SelectId) -> Option<&Select<T>> {
        self.selects.get(id.0)
    }

    /// Panics when `id` was produced by another structure.
    pub fn column(&self, id: ColumnId) -> &AnalyticColumn<C> {
        &self.columns[id.0]
    }

    pub fn get_column(&self, id: ColumnId) -> Option<&AnalyticColumn<C>> {
        self.columns.get(id.0)
    }

    pub fn select_count(&self) -> usize {
        self.selects.len()
    }

    pub fn columns_of(&self, select: SelectId) -> Vec<ColumnId> {
        columns_in(&self.selects, select)
    }

    pub fn id_of(&self, select: SelectId) -> Vec<ColumnId> {
        ids_in(&self.selects, select)
    }

    pub fn row_number_of(&self, select: SelectId) -> ColumnId {
        row_number_in(&self.selects, select)
    }

    pub fn foreign_keys_of(&self, select: SelectId) -> Vec<ColumnId> {
        foreign_keys_in(&self.selects, select)
    }

    /// The table scan behind a table or view.
    pub fn table_scan(&self, select: SelectId) -> Option<&TableScan<T>> {
        match self.select(select) {
            Select::Table(scan) => Some(scan),
            Select::View(view) => self.table_scan(view.table),
            Select::Join(_) => None,
        }
    }

    /// The table a select belongs to; for joins the table of the parent side.
    pub fn table_of(&self, select: SelectId) -> &T {
        match self.select(select) {
            Select::Table(scan) => &scan.table,
            Select::View(view) => self.table_of(view.table),
            Select::Join(join) => self.table_of(join.parent),
        }
    }

    /// Strips any number of `Derived` wrappers.
    pub fn canonical(&self, mut column: ColumnId) -> ColumnId {
        while let AnalyticColumn::Derived(inner) = self.column(column) {
            column = *inner;
        }
        column
    }

    /// The table column a column ultimately reads, looking through derived
    /// columns and foreign keys.
    pub fn source_column(&self, column: ColumnId) -> Option<&C> {
        match self.column(column) {
            AnalyticColumn::Base(c) => Some(c),
            AnalyticColumn::Derived(inner) => self.source_column(*inner),
            AnalyticColumn::ForeignKey { references, .. } => self.source_column(*references),
            _ => None,
        }
    }
}

impl<T: Display, C: Display> AnalyticStructure<T, C> {
    /// Compact textual form of a select, e.g.
    /// `AJ{TD{parent}, AV{TD{child}}, eq(id, FK(child, id)), eq(lit(1), RN(FK(child, id)))}`.
    pub fn describe_select(&self, select: SelectId) -> String {
        match self.select(select) {
            Select::Table(scan) => format!("TD{{{}}}", scan.table),
            Select::View(view) => format!("AV{{{}}}", self.describe_select(view.table)),
            Select::Join(join) => {
                let mut parts = vec![
                    self.describe_select(join.parent),
                    self.describe_select(join.child),
                ];
                parts.extend(join.conditions.iter().map(|condition| {
                    format!(
                        "eq({}, {})",
                        self.describe_column(condition.left),
                        self.describe_column(condition.right)
                    )
                }));
                format!("AJ{{{}}}", parts.join(", "))
            }
        }
    }

    pub fn describe_column(&self, column: ColumnId) -> String {
        match self.column(column) {
            AnalyticColumn::Base(c) => c.to_string(),
            AnalyticColumn::Derived(inner) => self.describe_column(*inner),
            AnalyticColumn::ForeignKey { references, owner } => format!(
                "FK({}, {})",
                self.table_of(*owner),
                self.describe_column(*references)
            ),
            AnalyticColumn::RowNumber { partition_by } => {
                format!("RN({})", self.describe_columns(partition_by))
            }
            AnalyticColumn::Greatest { left, right, .. } => format!(
                "greatest({}, {})",
                self.describe_column(*left),
                self.describe_column(*right)
            ),
            AnalyticColumn::MaxOver {
                column,
                partition_by,
            } => format!(
                "maxOver({}, {})",
                self.describe_column(*column),
                self.describe_columns(partition_by)
            ),
            AnalyticColumn::Literal(value) => format!("lit({})", value),
        }
    }

    pub fn describe_columns(&self, columns: &[ColumnId]) -> String {
        columns
            .iter()
            .map(|c| self.describe_column(*c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<T: Display, C: Display> Display for AnalyticStructure<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe_select(self.root))
    }
}

pub(crate) fn columns_in<T>(selects: &[Select<T>], select: SelectId) -> Vec<ColumnId> {
    match &selects[select.0] {
        Select::Table(scan) => scan.all_columns(),
        Select::View(view) => {
            let mut columns = columns_in(selects, view.table);
            columns.push(view.row_number);
            columns
        }
        Select::Join(join) => join.columns.clone(),
    }
}

pub(crate) fn ids_in<T>(selects: &[Select<T>], select: SelectId) -> Vec<ColumnId> {
    match &selects[select.0] {
        Select::Table(scan) => scan.id_columns(),
        Select::View(view) => ids_in(selects, view.table),
        Select::Join(join) => join.id.clone(),
    }
}

pub(crate) fn row_number_in<T>(selects: &[Select<T>], select: SelectId) -> ColumnId {
    match &selects[select.0] {
        Select::Table(scan) => scan.row_number,
        Select::View(view) => view.row_number,
        Select::Join(join) => join.row_number,
    }
}

pub(crate) fn foreign_keys_in<T>(selects: &[Select<T>], select: SelectId) -> Vec<ColumnId> {
    match &selects[select.0] {
        Select::Table(scan) => scan.foreign_keys.clone(),
        Select::View(view) => foreign_keys_in(selects, view.table),
        Select::Join(join) => join.foreign_keys.clone(),
    }
}
