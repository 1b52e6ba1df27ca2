//! aggregate-sql - single-query loading of nested aggregates
//!
//! This crate turns the description of an aggregate (a root table plus
//! arbitrarily deep one-to-one / one-to-many child tables) into one analytic
//! SQL statement through:
//! - A structure builder that shapes the aggregate into a tree of full outer
//!   joins annotated with synthetic identity and row-number columns
//! - An alias factory that gives every table, column and synthetic node a
//!   stable short name
//! - A lowering step that turns the finished tree into a SQL AST
//! - ANSI text rendering of that AST, plus a cached generator facade driven
//!   by YAML/JSON aggregate definitions

pub mod utils;

pub mod aggregate_catalog;
pub mod config;
pub mod query_planner;
pub mod render_plan;
pub mod sql_generator;

pub use aggregate_catalog::aggregate_schema::AggregateSchema;
pub use config::GeneratorConfig;
pub use query_planner::structure::AnalyticStructure;
pub use query_planner::structure_builder::AnalyticStructureBuilder;
pub use query_planner::table_definition::TableDefinition;
pub use sql_generator::AnalyticSqlGenerator;
