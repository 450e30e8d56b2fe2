use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// What a mutation or read returns for each affected record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponsePolicy {
    /// Nothing
    None,
    /// An object with exactly the primary key fields
    PrimaryKeyOnly,
    /// The record as retrieved
    #[default]
    FullEntity,
}

/// Shape one record according to the policy
#[must_use]
pub fn shape(record: JsonValue, policy: ResponsePolicy, primary_key: &[String]) -> Option<JsonValue> {
    match policy {
        ResponsePolicy::None => None,
        ResponsePolicy::FullEntity => Some(record),
        ResponsePolicy::PrimaryKeyOnly => Some(JsonValue::Object(
            primary_key
                .iter()
                .filter_map(|field| record.get(field).map(|value| (field.clone(), value.clone())))
                .collect(),
        )),
    }
}

/// Shape a batch of records; `None` for [`ResponsePolicy::None`]
#[must_use]
pub fn shape_many(
    records: Vec<JsonValue>,
    policy: ResponsePolicy,
    primary_key: &[String],
) -> Option<Vec<JsonValue>> {
    match policy {
        ResponsePolicy::None => None,
        _ => Some(
            records
                .into_iter()
                .filter_map(|record| shape(record, policy, primary_key))
                .collect(),
        ),
    }
}
