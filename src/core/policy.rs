use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CrudError;
use crate::filtering::Sort;
use crate::response::ResponsePolicy;

/// The operations a [`CrudService`](crate::CrudService) exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    ReadOne,
    ReadMany,
    Search,
    Create,
    CreateMany,
    Update,
    Upsert,
    Delete,
    Recover,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOne => "read_one",
            Self::ReadMany => "read_many",
            Self::Search => "search",
            Self::Create => "create",
            Self::CreateMany => "create_many",
            Self::Update => "update",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
            Self::Recover => "recover",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defaults applied when a request leaves an option unset.
///
/// Can be deserialized from application config; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudPolicy {
    /// Page size for read-many and search when the request gives none
    pub default_take: u64,
    /// Largest page size a request may ask for
    pub max_take: u64,
    /// Primary-key ordering direction for read-many and search
    pub default_sort: Sort,
    /// Response policy for every operation when the request gives none
    pub default_response: ResponsePolicy,
    /// Whether reads include soft-deleted records by default
    pub read_soft_deleted: bool,
}

impl Default for CrudPolicy {
    fn default() -> Self {
        Self {
            default_take: 20,
            max_take: 100,
            default_sort: Sort::Desc,
            default_response: ResponsePolicy::FullEntity,
            read_soft_deleted: false,
        }
    }
}

impl CrudPolicy {
    /// Page size for a request.
    ///
    /// # Errors
    ///
    /// Returns `CrudError::Validation` when the requested size is zero or above `max_take`.
    pub fn take(&self, requested: Option<u64>) -> Result<u64, CrudError> {
        let take = requested.unwrap_or(self.default_take);
        if take == 0 {
            return Err(CrudError::validation("limit must be at least 1"));
        }
        if take > self.max_take {
            return Err(CrudError::validation(format!(
                "limit must not exceed {}",
                self.max_take
            )));
        }
        Ok(take)
    }

    #[must_use]
    pub fn response(&self, requested: Option<ResponsePolicy>) -> ResponsePolicy {
        requested.unwrap_or(self.default_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_take() {
        let policy = CrudPolicy::default();
        assert_eq!(policy.take(None).unwrap(), 20);
        assert_eq!(policy.take(Some(100)).unwrap(), 100);
    }

    #[test]
    fn test_take_bounds() {
        let policy = CrudPolicy::default();
        assert!(policy.take(Some(0)).unwrap_err().is_validation());
        assert!(policy.take(Some(101)).unwrap_err().is_validation());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let policy: CrudPolicy = serde_json::from_str(r#"{"default_take": 5}"#).unwrap();
        assert_eq!(policy.default_take, 5);
        assert_eq!(policy.max_take, 100);
        assert_eq!(policy.default_sort, Sort::Desc);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::ReadMany.to_string(), "read_many");
        assert_eq!(Method::Recover.as_str(), "recover");
    }
}
