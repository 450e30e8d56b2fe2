use sea_orm::IdenStatic;

use crate::core::{CrudResource, ResourceColumn};
use crate::errors::CrudError;

/// Resolve a requested field list into columns.
///
/// `None` or an empty list selects every column. Duplicates are dropped, request order is
/// kept.
///
/// # Errors
///
/// Returns `CrudError::Validation` naming every field that is not a column of the resource.
pub fn resolve_fields<R: CrudResource>(
    fields: Option<&[String]>,
) -> Result<Vec<ResourceColumn<R>>, CrudError> {
    let Some(fields) = fields.filter(|fields| !fields.is_empty()) else {
        return Ok(R::columns());
    };

    let mut columns: Vec<ResourceColumn<R>> = Vec::with_capacity(fields.len());
    let mut unknown = Vec::new();
    for field in fields {
        match R::find_column(field) {
            Some(column) => {
                if !columns.iter().any(|c| c.as_str() == column.as_str()) {
                    columns.push(column);
                }
            }
            None => unknown.push(format!("cannot select unknown field '{field}'")),
        }
    }

    if unknown.is_empty() {
        Ok(columns)
    } else {
        Err(CrudError::validation_many(unknown))
    }
}

/// Columns a mutation lookup needs when the full entity is not returned
#[must_use]
pub fn key_columns<R: CrudResource>() -> Vec<ResourceColumn<R>> {
    let mut columns = R::primary_key_columns();
    if let Some(marker) = R::soft_delete_column() {
        if !columns.iter().any(|c| c.as_str() == marker.as_str()) {
            columns.push(marker);
        }
    }
    columns
}

/// Resolve the relations to load after a read.
///
/// `None` loads every declared relation.
///
/// # Errors
///
/// Returns `CrudError::Validation` naming every relation the resource does not declare.
pub fn resolve_relations<R: CrudResource>(
    requested: Option<&[String]>,
) -> Result<Vec<String>, CrudError> {
    let declared = R::declared_relations();
    let Some(requested) = requested else {
        return Ok(declared.into_iter().map(str::to_string).collect());
    };

    let unknown: Vec<String> = requested
        .iter()
        .filter(|name| !declared.contains(&name.as_str()))
        .map(|name| format!("unknown relation '{name}' for {}", R::RESOURCE_NAME))
        .collect();
    if !unknown.is_empty() {
        return Err(CrudError::validation_many(unknown));
    }

    let mut relations: Vec<String> = Vec::with_capacity(requested.len());
    for name in requested {
        if !relations.contains(name) {
            relations.push(name.clone());
        }
    }
    Ok(relations)
}
