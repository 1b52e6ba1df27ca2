use std::collections::HashMap;

use log::debug;

use super::errors::StructureError;
use super::join_construction::JoinConstruction;
use super::structure::{AnalyticStructure, Multiplicity};
use super::table_definition::TableDefinition;
use super::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

/// Node of the logical join tree assembled before `build()`.
#[derive(Debug, Clone)]
pub(crate) enum LogicalNode<T, C> {
    Table(TableDefinition<T, C>),
    Join {
        parent: NodeId,
        child: NodeId,
        multiplicity: Multiplicity,
        /// Table whose children this join attaches.
        owner: T,
    },
}

/// Assembles the analytic structure of an aggregate, root first.
///
/// ```
/// use aggregate_sql::AnalyticStructureBuilder;
///
/// let structure = AnalyticStructureBuilder::<&str, &str>::new()
///     .add_table("parent", |td| td.with_id("parentId").with_columns(["a", "b"]))?
///     .add_child_to(&"parent", "child", |td| td.with_columns(["c", "d"]))?
///     .build()?;
///
/// assert_eq!(
///     structure.to_string(),
///     "AJ{TD{parent}, AV{TD{child}}, eq(parentId, FK(child, parentId)), eq(lit(1), RN(FK(child, parentId)))}"
/// );
/// # Ok::<(), aggregate_sql::query_planner::errors::StructureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AnalyticStructureBuilder<T, C> {
    nodes: Vec<LogicalNode<T, C>>,
    /// Structural parent of every node that is an operand of a join.
    node_parents: HashMap<NodeId, NodeId>,
    tables: HashMap<T, NodeId>,
    root_table: Option<NodeId>,
    root: Option<NodeId>,
}

impl<T: Token, C: Token> Default for AnalyticStructureBuilder<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token, C: Token> AnalyticStructureBuilder<T, C> {
    pub fn new() -> Self {
        AnalyticStructureBuilder {
            nodes: Vec::new(),
            node_parents: HashMap::new(),
            tables: HashMap::new(),
            root_table: None,
            root: None,
        }
    }

    /// Defines the aggregate root.
    pub fn add_table<F>(mut self, table: T, configure: F) -> Result<Self, StructureError>
    where
        F: FnOnce(TableDefinition<T, C>) -> TableDefinition<T, C>,
    {
        if let Some(root_table) = self.root_table {
            return Err(StructureError::RootAlreadyDefined(
                self.owner(root_table).to_string(),
            ));
        }

        debug!("AnalyticStructureBuilder: root table {:?}", table);
        let node = self.push_table(table, configure);
        self.root_table = Some(node);
        self.root = Some(node);
        Ok(self)
    }

    /// Adds a one-to-many child below `parent`.
    pub fn add_child_to<F>(self, parent: &T, child: T, configure: F) -> Result<Self, StructureError>
    where
        F: FnOnce(TableDefinition<T, C>) -> TableDefinition<T, C>,
    {
        self.graft(parent, child, configure, Multiplicity::Multiple)
    }

    /// Adds a one-to-one child below `parent`.
    pub fn add_single_child_to<F>(
        self,
        parent: &T,
        child: T,
        configure: F,
    ) -> Result<Self, StructureError>
    where
        F: FnOnce(TableDefinition<T, C>) -> TableDefinition<T, C>,
    {
        self.graft(parent, child, configure, Multiplicity::Single)
    }

    /// Lowers the logical tree into the finished structure.
    pub fn build(self) -> Result<AnalyticStructure<T, C>, StructureError> {
        let root = self.root.ok_or(StructureError::MissingRoot)?;
        JoinConstruction::new(&self.nodes).run(root)
    }

    fn graft<F>(
        mut self,
        parent: &T,
        child: T,
        configure: F,
        multiplicity: Multiplicity,
    ) -> Result<Self, StructureError>
    where
        F: FnOnce(TableDefinition<T, C>) -> TableDefinition<T, C>,
    {
        let root_table = self.root_table.ok_or(StructureError::MissingRoot)?;
        let parent_node = *self
            .tables
            .get(parent)
            .ok_or_else(|| StructureError::UnknownTable(parent.to_string()))?;
        if self.tables.contains_key(&child) {
            return Err(StructureError::DuplicateTable(child.to_string()));
        }
        if parent_node == root_table {
            if let LogicalNode::Table(definition) = &self.nodes[parent_node.0] {
                if !definition.has_identity() {
                    return Err(StructureError::MissingIdentity(parent.to_string()));
                }
            }
        }

        let attachment = self.find_attachment_point(parent, parent_node);
        let previous_parent = self.node_parents.get(&attachment).copied();

        debug!(
            "AnalyticStructureBuilder: {:?} child {:?} of {:?} attached at node {}",
            multiplicity, child, parent, attachment.0
        );

        let child_node = self.push_table(child, configure);
        let join = self.push(LogicalNode::Join {
            parent: attachment,
            child: child_node,
            multiplicity,
            owner: parent.clone(),
        });
        self.node_parents.insert(attachment, join);
        self.node_parents.insert(child_node, join);

        match previous_parent {
            Some(structural_parent) => {
                self.replace_operand(structural_parent, attachment, join);
                self.node_parents.insert(join, structural_parent);
            }
            None => self.root = Some(join),
        }
        Ok(self)
    }

    /// Walks up from the table node while the structural parent still
    /// belongs to the same aggregate table.
    fn find_attachment_point(&self, table: &T, start: NodeId) -> NodeId {
        let mut node = start;
        while let Some(&structural_parent) = self.node_parents.get(&node) {
            if self.owner(structural_parent) != table {
                break;
            }
            node = structural_parent;
        }
        node
    }

    fn owner(&self, node: NodeId) -> &T {
        match &self.nodes[node.0] {
            LogicalNode::Table(definition) => definition.table(),
            LogicalNode::Join { owner, .. } => owner,
        }
    }

    fn replace_operand(&mut self, join: NodeId, old: NodeId, new: NodeId) {
        if let LogicalNode::Join { parent, child, .. } = &mut self.nodes[join.0] {
            if *child == old {
                *child = new;
            } else if *parent == old {
                *parent = new;
            }
        }
    }

    fn push_table<F>(&mut self, table: T, configure: F) -> NodeId
    where
        F: FnOnce(TableDefinition<T, C>) -> TableDefinition<T, C>,
    {
        let definition = configure(TableDefinition::new(table.clone()));
        let node = self.push(LogicalNode::Table(definition));
        self.tables.insert(table, node);
        node
    }

    fn push(&mut self, node: LogicalNode<T, C>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}
