use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::values::FieldKind;

/// Comparison operators accepted in a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Operator {
    /// Equality (=)
    #[serde(rename = "=")]
    Eq,
    /// Not equal (!=)
    #[serde(rename = "!=")]
    Ne,
    /// Greater than (>)
    #[serde(rename = ">")]
    Gt,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    Gte,
    /// Less than (<)
    #[serde(rename = "<")]
    Lt,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    Lte,
    /// LIKE pattern matching, wildcards supplied by the caller
    #[serde(rename = "LIKE")]
    Like,
    /// Case-insensitive LIKE
    #[serde(rename = "ILIKE")]
    ILike,
    /// Inclusive range, operand is `[low, high]`
    #[serde(rename = "BETWEEN")]
    Between,
    /// Membership, operand is a non-empty array
    #[serde(rename = "IN")]
    In,
    /// IS NULL, operand ignored
    #[serde(rename = "NULL")]
    Null,
}

impl Operator {
    /// Wire token of the operator
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::Null => "NULL",
        }
    }

    /// Whether the operator can be applied to a field of the given kind
    #[must_use]
    pub const fn accepts(self, kind: FieldKind) -> bool {
        match self {
            Self::Null => true,
            Self::Eq | Self::Ne | Self::In => {
                !matches!(kind, FieldKind::Json | FieldKind::Unsupported)
            }
            Self::Gt | Self::Gte | Self::Lt | Self::Lte | Self::Between => kind.is_ordered(),
            Self::Like | Self::ILike => matches!(kind, FieldKind::Text),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
