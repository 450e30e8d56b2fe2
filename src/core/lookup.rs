use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, IdenStatic, QueryFilter, QuerySelect,
    Select, Value,
};
use serde_json::Value as JsonValue;

use super::traits::{CrudResource, ResourceColumn};
use crate::errors::CrudError;
use crate::filtering::json_to_value;
use crate::models::JsonMap;

/// Typed primary key of one record, in primary key order
pub type KeyValues<R> = Vec<(ResourceColumn<R>, Value)>;

/// Resolve a primary key map into a condition addressing exactly one record.
///
/// # Errors
///
/// Returns `CrudError::Conflict` when the resource has no primary key and
/// `CrudError::Validation` when `params` is not exactly the primary key.
pub fn key_condition<R: CrudResource>(
    params: &JsonMap,
) -> Result<(Condition, KeyValues<R>), CrudError> {
    let primary_key = R::primary_key_columns();
    if primary_key.is_empty() {
        return Err(CrudError::conflict("cannot resolve primary key"));
    }

    let mut errors: Vec<String> = params
        .keys()
        .filter(|field| !primary_key.iter().any(|c| c.as_str() == field.as_str()))
        .map(|field| format!("'{field}' is not a primary key field"))
        .collect();

    let mut condition = Condition::all();
    let mut values = Vec::with_capacity(primary_key.len());
    for column in primary_key {
        match params.get(column.as_str()) {
            None | Some(JsonValue::Null) => {
                errors.push(format!("missing primary key field '{}'", column.as_str()));
            }
            Some(json) => match json_to_value(column, json) {
                Ok(value) => {
                    condition = condition.add(column.eq(value.clone()));
                    values.push((column, value));
                }
                Err(CrudError::Validation { errors: messages }) => errors.extend(messages),
                Err(other) => return Err(other),
            },
        }
    }

    if errors.is_empty() {
        Ok((condition, values))
    } else {
        Err(CrudError::validation_many(errors))
    }
}

/// Projection of `columns`, hiding soft-deleted records unless `with_deleted`
#[must_use]
pub fn visible_select<R: CrudResource>(
    columns: &[ResourceColumn<R>],
    with_deleted: bool,
) -> Select<R::EntityType> {
    let select = R::EntityType::find()
        .select_only()
        .columns(columns.iter().copied());
    match R::soft_delete_column() {
        Some(marker) if !with_deleted => select.filter(marker.is_null()),
        _ => select,
    }
}

/// Fetch the record addressed by `condition`
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_record<R, C>(
    db: &C,
    condition: Condition,
    columns: &[ResourceColumn<R>],
    with_deleted: bool,
) -> Result<Option<JsonValue>, CrudError>
where
    R: CrudResource,
    C: ConnectionTrait,
{
    Ok(visible_select::<R>(columns, with_deleted)
        .filter(condition)
        .into_json()
        .one(db)
        .await?)
}

/// Render a primary key map for error messages
#[must_use]
pub fn render_key(params: &JsonMap) -> String {
    JsonValue::Object(params.clone()).to_string()
}

/// Whether a retrieved record carries a soft-delete timestamp
#[must_use]
pub fn is_soft_deleted<R: CrudResource>(record: &JsonValue) -> bool {
    R::soft_delete_column().is_some_and(|marker| {
        record
            .get(marker.as_str())
            .is_some_and(|value| !value.is_null())
    })
}
