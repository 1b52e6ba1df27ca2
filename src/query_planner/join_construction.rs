//! Lowering of the logical join tree into the analytic structure.
//!
//! A join `J(P, C)` is lowered with the id columns `I` of the ancestor it
//! will be joined to (empty on the root spine). Foreign keys for `I` land in
//! the left-most table of `P`; `C` receives one foreign key per id column of
//! `P`. The join then exposes
//! - `Greatest(id(P)_i, fk(C)_i)` as its identity towards further ancestors,
//! - `Greatest(rn(P), rn(C))` as its row number,
//! - `MaxOver(fk(P)_k, identity)` as its own foreign keys, so the ancestor
//!   reference reaches every row of the branch including child-only rows.

use log::{debug, trace};

use super::errors::StructureError;
use super::structure::{
    self, AnalyticColumn, AnalyticJoin, AnalyticStructure, AnalyticView, ColumnId, GreatestRole,
    JoinCondition, Multiplicity, Select, SelectId, TableScan,
};
use super::structure_builder::{LogicalNode, NodeId};
use super::table_definition::TableDefinition;
use super::Token;

/// A lowered subtree and the foreign keys it offers to its ancestor.
struct Lowered {
    select: SelectId,
    foreign_keys: Vec<ColumnId>,
}

pub(crate) struct JoinConstruction<'a, T, C> {
    nodes: &'a [LogicalNode<T, C>],
    selects: Vec<Select<T>>,
    columns: Vec<AnalyticColumn<C>>,
}

impl<'a, T: Token, C: Token> JoinConstruction<'a, T, C> {
    pub(crate) fn new(nodes: &'a [LogicalNode<T, C>]) -> Self {
        JoinConstruction {
            nodes,
            selects: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, root: NodeId) -> Result<AnalyticStructure<T, C>, StructureError> {
        let lowered = self.lower(root, &[])?;
        debug!(
            "JoinConstruction: {} selects, {} columns",
            self.selects.len(),
            self.columns.len()
        );
        Ok(AnalyticStructure {
            selects: self.selects,
            columns: self.columns,
            root: lowered.select,
        })
    }

    /// Lowers a node used as the parent operand (or the root). Tables stay bare.
    fn lower(&mut self, node: NodeId, incoming: &[ColumnId]) -> Result<Lowered, StructureError> {
        let nodes = self.nodes;
        match &nodes[node.0] {
            LogicalNode::Table(definition) => Ok(self.lower_table(definition, incoming)),
            LogicalNode::Join {
                parent,
                child,
                multiplicity,
                owner,
            } => self.lower_join(*parent, *child, *multiplicity, owner, incoming),
        }
    }

    /// Lowers a node used as the child operand. Tables get wrapped in a view.
    fn lower_child(
        &mut self,
        node: NodeId,
        incoming: &[ColumnId],
    ) -> Result<Lowered, StructureError> {
        let nodes = self.nodes;
        match &nodes[node.0] {
            LogicalNode::Table(definition) => {
                let table = self.lower_table(definition, incoming);
                let row_number = self.push_column(AnalyticColumn::RowNumber {
                    partition_by: table.foreign_keys.clone(),
                });
                let view = self.push_select(Select::View(AnalyticView {
                    table: table.select,
                    row_number,
                }));
                Ok(Lowered {
                    select: view,
                    foreign_keys: table.foreign_keys,
                })
            }
            LogicalNode::Join { .. } => self.lower(node, incoming),
        }
    }

    fn lower_table(&mut self, definition: &TableDefinition<T, C>, incoming: &[ColumnId]) -> Lowered {
        // The scan is pushed last, so this is its handle.
        let select = SelectId(self.selects.len());

        let id = definition
            .id()
            .map(|c| self.push_column(AnalyticColumn::Base(c.clone())));
        let columns = definition
            .columns()
            .iter()
            .map(|c| self.push_column(AnalyticColumn::Base(c.clone())))
            .collect();
        let foreign_keys: Vec<ColumnId> = incoming
            .iter()
            .map(|&references| {
                self.push_column(AnalyticColumn::ForeignKey {
                    references,
                    owner: select,
                })
            })
            .collect();
        let key_column = definition
            .key_column()
            .map(|c| self.push_column(AnalyticColumn::Base(c.clone())));
        let row_number = self.push_column(AnalyticColumn::Literal(1));

        trace!(
            "JoinConstruction: table {:?} with {} foreign keys",
            definition.table(),
            foreign_keys.len()
        );

        self.selects.push(Select::Table(TableScan {
            table: definition.table().clone(),
            id,
            columns,
            foreign_keys: foreign_keys.clone(),
            key_column,
            row_number,
        }));

        Lowered {
            select,
            foreign_keys,
        }
    }

    fn lower_join(
        &mut self,
        parent: NodeId,
        child: NodeId,
        multiplicity: Multiplicity,
        owner: &T,
        incoming: &[ColumnId],
    ) -> Result<Lowered, StructureError> {
        let parent = self.lower(parent, incoming)?;
        let parent_ids = structure::ids_in(&self.selects, parent.select);
        if parent_ids.is_empty() {
            return Err(StructureError::MissingIdentity(owner.to_string()));
        }

        let child = self.lower_child(child, &parent_ids)?;

        let mut conditions = Vec::with_capacity(parent_ids.len() + 1);
        let mut identity = Vec::with_capacity(parent_ids.len());
        for (&id, &foreign_key) in parent_ids.iter().zip(&child.foreign_keys) {
            conditions.push(JoinCondition {
                left: id,
                right: foreign_key,
            });
            identity.push(self.push_column(AnalyticColumn::Greatest {
                left: id,
                right: foreign_key,
                role: GreatestRole::Identity,
            }));
        }

        let parent_row_number = structure::row_number_in(&self.selects, parent.select);
        let child_row_number = structure::row_number_in(&self.selects, child.select);
        conditions.push(JoinCondition {
            left: parent_row_number,
            right: child_row_number,
        });
        let row_number = self.push_column(AnalyticColumn::Greatest {
            left: parent_row_number,
            right: child_row_number,
            role: GreatestRole::RowNumber,
        });

        let foreign_keys: Vec<ColumnId> = parent
            .foreign_keys
            .iter()
            .map(|&column| {
                self.push_column(AnalyticColumn::MaxOver {
                    column,
                    partition_by: identity.clone(),
                })
            })
            .collect();

        let id = parent_ids
            .iter()
            .map(|&c| self.push_column(AnalyticColumn::Derived(c)))
            .collect();

        let mut columns = Vec::new();
        for select in [parent.select, child.select] {
            for column in structure::columns_in(&self.selects, select) {
                columns.push(self.push_column(AnalyticColumn::Derived(column)));
            }
        }
        columns.extend(identity.iter().copied());
        columns.push(row_number);
        columns.extend(foreign_keys.iter().copied());

        debug!(
            "JoinConstruction: {:?} join for {:?}, {} conditions",
            multiplicity,
            owner,
            conditions.len()
        );

        let select = self.push_select(Select::Join(AnalyticJoin {
            parent: parent.select,
            child: child.select,
            multiplicity,
            conditions,
            id,
            identity,
            row_number,
            foreign_keys: foreign_keys.clone(),
            columns,
        }));

        Ok(Lowered {
            select,
            foreign_keys,
        })
    }

    fn push_column(&mut self, column: AnalyticColumn<C>) -> ColumnId {
        self.columns.push(column);
        ColumnId(self.columns.len() - 1)
    }

    fn push_select(&mut self, select: Select<T>) -> SelectId {
        self.selects.push(select);
        SelectId(self.selects.len() - 1)
    }
}
