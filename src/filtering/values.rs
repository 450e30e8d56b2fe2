//! JSON → Sea-ORM value coercion driven by the column's declared type.
//!
//! Request payloads, filter operands and decoded cursors all arrive as JSON. Before they can be
//! bound into a query or set on an active model they are converted to the `Value` variant the
//! column type implies. Timestamp-with-time-zone columns back both `DateTime<FixedOffset>` and
//! `DateTime<Utc>` fields; [`utc_timestamp`] gives the second form when a field rejects the first.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{ColumnTrait, ColumnType, Value, sea_query::Nullable};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::CrudError;

/// Coarse classification of a column type used to decide which operators apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Text,
    Boolean,
    Uuid,
    Temporal,
    Json,
    Unsupported,
}

impl FieldKind {
    #[must_use]
    pub fn of(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned => Self::Integer,
            ColumnType::Float | ColumnType::Double => Self::Float,
            ColumnType::Char(_)
            | ColumnType::String(_)
            | ColumnType::Text
            | ColumnType::Enum { .. } => Self::Text,
            ColumnType::Boolean => Self::Boolean,
            ColumnType::Uuid => Self::Uuid,
            ColumnType::DateTime
            | ColumnType::Timestamp
            | ColumnType::TimestampWithTimeZone
            | ColumnType::Date
            | ColumnType::Time => Self::Temporal,
            ColumnType::Json | ColumnType::JsonBinary => Self::Json,
            _ => Self::Unsupported,
        }
    }

    /// Kinds with a meaningful total order (ranges, BETWEEN)
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Text | Self::Temporal
        )
    }
}

/// Kind of a Sea-ORM column
#[must_use]
pub fn column_kind<C: ColumnTrait>(column: C) -> FieldKind {
    FieldKind::of(column.def().get_column_type())
}

/// Convert a JSON value into the `Value` variant matching `column`'s type.
///
/// `null` becomes the typed SQL NULL of that column.
///
/// # Errors
///
/// Returns `CrudError::Validation` when the JSON cannot represent a value of the column type,
/// or when the column type is not supported.
pub fn json_to_value<C: ColumnTrait>(column: C, json: &JsonValue) -> Result<Value, CrudError> {
    let field = column.as_str();
    match column.def().get_column_type() {
        ColumnType::TinyInteger => integer::<i8>(field, json),
        ColumnType::SmallInteger => integer::<i16>(field, json),
        ColumnType::Integer => integer::<i32>(field, json),
        ColumnType::BigInteger => integer::<i64>(field, json),
        ColumnType::TinyUnsigned => integer::<u8>(field, json),
        ColumnType::SmallUnsigned => integer::<u16>(field, json),
        ColumnType::Unsigned => integer::<u32>(field, json),
        ColumnType::BigUnsigned => integer::<u64>(field, json),
        ColumnType::Float => float(field, json).map(|value| {
            #[allow(clippy::cast_possible_truncation)]
            value.map(|v| v as f32).into()
        }),
        ColumnType::Double => float(field, json).map(Value::from),
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text | ColumnType::Enum { .. } => {
            text(field, json)
        }
        ColumnType::Boolean => boolean(field, json),
        ColumnType::Uuid => parsed::<Uuid>(field, json, "a UUID"),
        ColumnType::TimestampWithTimeZone => timestamp_tz(field, json),
        ColumnType::DateTime | ColumnType::Timestamp => naive_datetime(field, json),
        ColumnType::Date => parsed::<NaiveDate>(field, json, "a date (YYYY-MM-DD)"),
        ColumnType::Time => parsed::<NaiveTime>(field, json, "a time (HH:MM:SS)"),
        ColumnType::Json | ColumnType::JsonBinary => Ok(if json.is_null() {
            Value::Json(None)
        } else {
            Value::from(json.clone())
        }),
        other => Err(CrudError::validation(format!(
            "field '{field}' has unsupported column type {other:?}"
        ))),
    }
}

/// The current time as a value of `column`'s timestamp type
#[must_use]
pub fn now_value<C: ColumnTrait>(column: C) -> Value {
    let now = Utc::now();
    match column.def().get_column_type() {
        ColumnType::TimestampWithTimeZone => Value::from(now.fixed_offset()),
        ColumnType::DateTime | ColumnType::Timestamp => Value::from(now.naive_utc()),
        _ => Value::from(now),
    }
}

/// The `DateTime<Utc>` form of a timezone-aware timestamp value, null included
#[must_use]
pub fn utc_timestamp(value: &Value) -> Option<Value> {
    match value {
        Value::ChronoDateTimeWithTimeZone(timestamp) => Some(Value::from(
            timestamp
                .as_ref()
                .map(|timestamp| timestamp.with_timezone(&Utc)),
        )),
        _ => None,
    }
}

fn mismatch(field: &str, expected: &str, json: &JsonValue) -> CrudError {
    CrudError::validation(format!("field '{field}' expects {expected}, got {json}"))
}

fn integer<T>(field: &str, json: &JsonValue) -> Result<Value, CrudError>
where
    T: TryFrom<i64> + TryFrom<u64> + FromStr + Into<Value> + Nullable,
{
    let parsed: Option<T> = match json {
        JsonValue::Null => return Ok(Value::from(None::<T>)),
        JsonValue::Number(number) => number
            .as_i64()
            .and_then(|v| T::try_from(v).ok())
            .or_else(|| number.as_u64().and_then(|v| T::try_from(v).ok())),
        JsonValue::String(s) => s.trim().parse::<T>().ok(),
        _ => None,
    };
    parsed
        .map(Into::into)
        .ok_or_else(|| mismatch(field, "an integer in range", json))
}

fn float(field: &str, json: &JsonValue) -> Result<Option<f64>, CrudError> {
    match json {
        JsonValue::Null => Ok(None),
        JsonValue::Number(number) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| mismatch(field, "a number", json)),
        JsonValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| mismatch(field, "a number", json)),
        _ => Err(mismatch(field, "a number", json)),
    }
}

fn text(field: &str, json: &JsonValue) -> Result<Value, CrudError> {
    match json {
        JsonValue::Null => Ok(Value::from(None::<String>)),
        JsonValue::String(s) => Ok(Value::from(s.clone())),
        _ => Err(mismatch(field, "a string", json)),
    }
}

fn boolean(field: &str, json: &JsonValue) -> Result<Value, CrudError> {
    match json {
        JsonValue::Null => Ok(Value::from(None::<bool>)),
        JsonValue::Bool(b) => Ok(Value::from(*b)),
        JsonValue::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::from(true)),
        JsonValue::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::from(false)),
        _ => Err(mismatch(field, "a boolean", json)),
    }
}

fn parsed<T>(field: &str, json: &JsonValue, expected: &str) -> Result<Value, CrudError>
where
    T: FromStr + Into<Value> + Nullable,
{
    match json {
        JsonValue::Null => Ok(Value::from(None::<T>)),
        JsonValue::String(s) => s
            .trim()
            .parse::<T>()
            .map(Into::into)
            .map_err(|_| mismatch(field, expected, json)),
        _ => Err(mismatch(field, expected, json)),
    }
}

fn timestamp_tz(field: &str, json: &JsonValue) -> Result<Value, CrudError> {
    match json {
        JsonValue::Null => Ok(Value::from(None::<DateTime<FixedOffset>>)),
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(Value::from)
            .map_err(|_| mismatch(field, "an RFC 3339 timestamp", json)),
        _ => Err(mismatch(field, "an RFC 3339 timestamp", json)),
    }
}

fn naive_datetime(field: &str, json: &JsonValue) -> Result<Value, CrudError> {
    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    match json {
        JsonValue::Null => Ok(Value::from(None::<NaiveDateTime>)),
        JsonValue::String(s) => FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(s.trim(), format).ok())
            .map(Value::from)
            .ok_or_else(|| mismatch(field, "a date-time (YYYY-MM-DDTHH:MM:SS)", json)),
        _ => Err(mismatch(field, "a date-time (YYYY-MM-DDTHH:MM:SS)", json)),
    }
}
