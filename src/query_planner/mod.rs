//! Builds the analytic structure of an aggregate query.
//!
//! Callers describe the aggregate top-down through
//! [`structure_builder::AnalyticStructureBuilder`]; `build()` lowers the
//! logical join tree into an immutable [`structure::AnalyticStructure`] in
//! which every join carries the synthetic foreign-key, row-number and
//! greatest columns needed to regroup a flat result set into the original
//! tree.

use std::fmt::{Debug, Display};
use std::hash::Hash;

pub mod errors;
mod join_construction;
pub mod structure;
pub mod structure_builder;
pub mod table_definition;

/// Anything usable as a table or column token.
///
/// Tokens are pure identity: the builder only clones, hashes and compares
/// them. `Display` names them in error messages.
pub trait Token: Clone + Eq + Hash + Debug + Display {}

impl<X: Clone + Eq + Hash + Debug + Display> Token for X {}
