use sea_orm::{IdenStatic, Order};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::{CrudResource, ResourceColumn};
use crate::errors::CrudError;

/// Sort direction for primary-key ordering and explicit search orders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sort {
    Asc,
    #[default]
    Desc,
}

impl From<Sort> for Order {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Asc => Order::Asc,
            Sort::Desc => Order::Desc,
        }
    }
}

/// One entry of an explicit search order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub sort: Sort,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, sort: Sort) -> Self {
        Self {
            field: field.into(),
            sort,
        }
    }
}

/// Order by every primary key column in the same direction
#[must_use]
pub fn primary_key_order<R: CrudResource>(sort: Sort) -> Vec<(ResourceColumn<R>, Order)> {
    R::primary_key_columns()
        .into_iter()
        .map(|column| (column, Order::from(sort)))
        .collect()
}

/// Resolve an explicit search order, falling back to primary-key order when it is empty.
///
/// # Errors
///
/// Returns `CrudError::Validation` naming every field that is not a column of the resource.
pub fn resolve_order<R: CrudResource>(
    order: &[OrderBy],
    fallback: Sort,
) -> Result<Vec<(ResourceColumn<R>, Order)>, CrudError> {
    if order.is_empty() {
        return Ok(primary_key_order::<R>(fallback));
    }

    let mut resolved = Vec::with_capacity(order.len());
    let mut unknown = Vec::new();
    for entry in order {
        match R::find_column(&entry.field) {
            Some(column) => resolved.push((column, Order::from(entry.sort))),
            None => unknown.push(format!("cannot order by unknown field '{}'", entry.field)),
        }
    }
    if !unknown.is_empty() {
        return Err(CrudError::validation_many(unknown));
    }

    // Deterministic tail: primary key columns not already ordered on.
    for column in R::primary_key_columns() {
        if !resolved.iter().any(|(c, _)| c.as_str() == column.as_str()) {
            resolved.push((column, Order::from(fallback)));
        }
    }
    Ok(resolved)
}
