use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, IdenStatic, QueryFilter, QueryOrder, QuerySelect,
    Select, Value,
};
use serde_json::Value as JsonValue;

use super::codec::{decode, decode_opt, encode};
use super::metadata::cursor_metadata;
use crate::core::{CrudResource, ResourceColumn};
use crate::errors::CrudError;
use crate::filtering::{Sort, build_equality_condition, json_to_value, primary_key_order};
use crate::models::{JsonMap, PaginationResponse};

/// Records strictly after the key tuple in the given direction.
///
/// For keys `(k1, k2, k3)` this is
/// `k1 op v1 OR (k1 = v1 AND k2 op v2) OR (k1 = v1 AND k2 = v2 AND k3 op v3)`
/// with `op` being `<` for descending and `>` for ascending order.
#[must_use]
pub fn keyset_condition<C: ColumnTrait>(keys: &[(C, Value)], sort: Sort) -> Condition {
    let mut any = Condition::any();
    for (index, (column, value)) in keys.iter().enumerate() {
        let mut all = Condition::all();
        for (prefix_column, prefix_value) in &keys[..index] {
            all = all.add(prefix_column.eq(prefix_value.clone()));
        }
        all = all.add(match sort {
            Sort::Asc => column.gt(value.clone()),
            Sort::Desc => column.lt(value.clone()),
        });
        any = any.add(all);
    }
    any
}

/// Typed primary key tuple of a decoded cursor, in primary key order.
///
/// # Errors
///
/// Returns `CrudError::Validation` when the cursor holds a field outside the primary key,
/// misses a primary key field, or holds a value of the wrong type.
pub fn cursor_keys<R: CrudResource>(
    cursor: &JsonMap,
) -> Result<Vec<(ResourceColumn<R>, Value)>, CrudError> {
    let primary_key = R::primary_key_columns();
    let mut errors: Vec<String> = cursor
        .keys()
        .filter(|field| !primary_key.iter().any(|c| c.as_str() == field.as_str()))
        .map(|field| format!("cursor field '{field}' is not part of the primary key"))
        .collect();

    let mut keys = Vec::with_capacity(primary_key.len());
    for column in primary_key {
        match cursor.get(column.as_str()) {
            Some(JsonValue::Null) | None => errors.push(format!(
                "cursor is missing primary key field '{}'",
                column.as_str()
            )),
            Some(json) => match json_to_value(column, json) {
                Ok(value) => keys.push((column, value)),
                Err(CrudError::Validation { errors: messages }) => errors.extend(messages),
                Err(other) => return Err(other),
            },
        }
    }

    if errors.is_empty() {
        Ok(keys)
    } else {
        Err(CrudError::validation_many(errors))
    }
}

/// The primary key fields of a record, as used in cursor tokens
#[must_use]
pub fn primary_key_of<R: CrudResource>(record: &JsonValue) -> JsonMap {
    R::primary_key_columns()
        .iter()
        .filter_map(|column| {
            record
                .get(column.as_str())
                .map(|value| (column.as_str().to_string(), value.clone()))
        })
        .collect()
}

/// Inputs of one cursor page
#[derive(Debug, Clone, Copy)]
pub struct CursorPage<'a> {
    pub next_cursor: Option<&'a str>,
    pub query: Option<&'a str>,
    pub equality: &'a JsonMap,
    pub sort: Sort,
    pub limit: u64,
}

/// Fetch one page by keyset pagination over the primary key.
///
/// `select` carries the projection and soft-delete visibility. The first page (no
/// `next_cursor`) filters by `equality`; later pages recover the first page's filter from the
/// `query` token and continue strictly after the cursor.
///
/// # Errors
///
/// Returns `CrudError::Validation` for malformed tokens and a database error if the query
/// fails.
pub async fn paginate_cursor<R, C>(
    db: &C,
    select: Select<R::EntityType>,
    page: CursorPage<'_>,
) -> Result<PaginationResponse, CrudError>
where
    R: CrudResource,
    C: ConnectionTrait,
{
    let (filter, keys) = match page.next_cursor {
        Some(token) => {
            let cursor = decode(token)?;
            let filter = decode_opt(page.query)?;
            if cursor.is_empty() {
                // The previous page was already empty.
                let query = page.query.map_or_else(|| encode(&filter), str::to_string);
                return Ok(PaginationResponse {
                    data: Vec::new(),
                    metadata: cursor_metadata(encode(&JsonMap::new()), page.limit, query),
                });
            }
            (filter, Some(cursor_keys::<R>(&cursor)?))
        }
        None => (page.equality.clone(), None),
    };

    let mut condition = build_equality_condition::<R>(&filter)?;
    if let Some(keys) = &keys {
        condition = condition.add(keyset_condition(keys, page.sort));
    }

    let mut query = select.filter(condition);
    for (column, order) in primary_key_order::<R>(page.sort) {
        query = query.order_by(column, order);
    }
    let records = query.limit(page.limit).into_json().all(db).await?;

    let next_cursor = records
        .last()
        .map_or_else(JsonMap::new, primary_key_of::<R>);
    let metadata_query = page.query.map_or_else(|| encode(&filter), str::to_string);
    tracing::trace!(
        resource = R::RESOURCE_NAME,
        returned = records.len(),
        "cursor page fetched"
    );

    Ok(PaginationResponse {
        data: records,
        metadata: cursor_metadata(encode(&next_cursor), page.limit, metadata_query),
    })
}
