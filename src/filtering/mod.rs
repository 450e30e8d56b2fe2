//! # Filtering, Selection & Ordering
//!
//! Translates the declarative parts of a request into Sea-ORM query pieces without touching
//! the database.
//!
//! ## Main Components
//!
//! - **[`Operator`]**: closed set of comparison operators with their wire tokens
//! - **[`build_filter_condition`]**: filter request (OR of AND-clauses) to `Condition`
//! - **[`build_equality_condition`]**: `field -> value` map to `Condition`
//! - **[`json_to_value`]**: JSON operand to the column's exact `Value` variant
//! - **[`resolve_fields`] / [`resolve_relations`]**: selection validation
//! - **[`resolve_order`]**: explicit search order with a primary key tail
//!
//! ## Filter Wire Format
//!
//! ```json
//! [
//!   { "name": { "operator": "ILIKE", "operand": "%rust%" },
//!     "score": { "operator": "BETWEEN", "operand": [1, 5] } },
//!   { "deleted_at": { "operator": "NULL", "not": true } }
//! ]
//! ```
//!
//! The first clause matches records whose name contains "rust" (any case) AND whose score is
//! between 1 and 5; the second matches soft-deleted records. A record matches the request when
//! either clause does. Unknown fields, unsupported operator/type pairs and malformed operands
//! are rejected with [`CrudError::Validation`](crate::CrudError::Validation).

pub mod conditions;
pub mod operator;
pub mod selection;
pub mod sort;
pub mod values;

// Re-export commonly used items
pub use conditions::{
    FilterClause, FilterCondition, FilterRequest, build_equality_condition, build_filter_condition,
};
pub use operator::Operator;
pub use selection::{key_columns, resolve_fields, resolve_relations};
pub use sort::{OrderBy, Sort, primary_key_order, resolve_order};
pub use values::{FieldKind, column_kind, json_to_value, now_value, utc_timestamp};
