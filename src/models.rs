//! Request and response models for every CRUD operation.
//!
//! Requests arrive already parsed by the host application (HTTP layer, queue consumer, test).
//! Every request struct implements `Default`, so callers only fill in what they need:
//!
//! ```rust,ignore
//! let request = ReadManyRequest {
//!     pagination: PaginationRequest::Offset { offset: Some(20), limit: Some(20), query: None },
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::filtering::{FilterRequest, OrderBy, Sort};
use crate::response::ResponsePolicy;

/// A record or field map, keyed by column name
pub type JsonMap = serde_json::Map<String, JsonValue>;

/// How read-many walks through the matching records
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaginationRequest {
    Offset {
        /// Records to skip
        offset: Option<u64>,
        /// Page size
        limit: Option<u64>,
        /// Filter token returned with the previous page
        query: Option<String>,
    },
    Cursor {
        /// Last seen primary key token returned with the previous page
        #[serde(rename = "nextCursor")]
        next_cursor: Option<String>,
        /// Filter token returned with the previous page
        query: Option<String>,
    },
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self::Cursor {
            next_cursor: None,
            query: None,
        }
    }
}

/// Pagination state returned with every read-many page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PageMetadata {
    Offset {
        /// 1-based page number
        page: u64,
        /// Page count for the current total
        pages: u64,
        /// Records matching the filter
        total: u64,
        /// Offset of the next page
        offset: u64,
        query: String,
    },
    Cursor {
        #[serde(rename = "nextCursor")]
        next_cursor: String,
        limit: u64,
        query: String,
    },
}

impl PageMetadata {
    /// Filter token to send back with the next page request
    #[must_use]
    pub fn query(&self) -> &str {
        match self {
            Self::Offset { query, .. } | Self::Cursor { query, .. } => query,
        }
    }

    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        match self {
            Self::Offset { .. } => None,
            Self::Cursor { next_cursor, .. } => Some(next_cursor),
        }
    }
}

/// One read-many page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaginationResponse {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<JsonValue>,
    pub metadata: PageMetadata,
}

/// Search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadOneRequest {
    /// Primary key of the record
    #[schema(value_type = Object)]
    pub params: JsonMap,
    /// Columns to return; all when absent
    pub fields: Option<Vec<String>>,
    /// Include soft-deleted records; policy default when absent
    pub soft_deleted: Option<bool>,
    /// Relations to load; the declared relations when absent
    pub relations: Option<Vec<String>>,
    pub response: Option<ResponsePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadManyRequest {
    /// Equality filter of the first page
    #[schema(value_type = Object)]
    pub query: JsonMap,
    pub pagination: PaginationRequest,
    /// Primary key order; policy default when absent
    pub sort: Option<Sort>,
    /// Page size; policy default when absent
    pub take: Option<u64>,
    pub soft_deleted: Option<bool>,
    pub relations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
    /// Columns to return; all when absent
    pub select: Option<Vec<String>>,
    /// Any clause matches, all conditions within a clause match
    #[serde(rename = "where")]
    #[schema(value_type = Vec<Object>)]
    pub filter: FilterRequest,
    /// Explicit order; primary key order when empty
    pub order: Vec<OrderBy>,
    pub take: Option<u64>,
    pub with_deleted: Option<bool>,
    pub relations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateRequest {
    #[schema(value_type = Object)]
    pub body: JsonMap,
    pub response: Option<ResponsePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateManyRequest {
    #[schema(value_type = Vec<Object>)]
    pub bodies: Vec<JsonMap>,
    pub response: Option<ResponsePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateRequest {
    #[schema(value_type = Object)]
    pub params: JsonMap,
    /// Fields to change; absent fields keep their stored value
    #[schema(value_type = Object)]
    pub body: JsonMap,
    /// Allow updating a soft-deleted record
    pub soft_deleted: Option<bool>,
    pub response: Option<ResponsePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpsertRequest {
    #[schema(value_type = Object)]
    pub params: JsonMap,
    #[schema(value_type = Object)]
    pub body: JsonMap,
    pub response: Option<ResponsePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteRequest {
    #[schema(value_type = Object)]
    pub params: JsonMap,
    /// `Some(false)` forces a hard delete; soft when the resource has a marker otherwise
    pub soft_deleted: Option<bool>,
    pub response: Option<ResponsePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RecoverRequest {
    #[schema(value_type = Object)]
    pub params: JsonMap,
    pub response: Option<ResponsePolicy>,
}
