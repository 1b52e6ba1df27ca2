//! Integration tests - the public generator API driven by aggregate definitions
//!
//! These tests run without a database; they check the generated SQL text.

mod aggregate_sql_tests;
