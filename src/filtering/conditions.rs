use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{BinOper, Expr, Func, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use super::operator::Operator;
use super::values::{column_kind, json_to_value};
use crate::core::CrudResource;
use crate::errors::CrudError;
use crate::models::JsonMap;

/// A single predicate: `<field> <operator> <operand>`, optionally negated
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: Operator,
    pub operand: JsonValue,
    pub not: bool,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: Operator, operand: JsonValue) -> Self {
        Self {
            field: field.into(),
            operator,
            operand,
            not: false,
        }
    }

    /// Negate the condition
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.not = !self.not;
        self
    }
}

/// Wire body of one condition inside a [`FilterClause`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionBody {
    operator: Operator,
    #[serde(default)]
    operand: JsonValue,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    not: bool,
}

/// Conjunction of conditions.
///
/// On the wire a clause is an object keyed by field name:
/// `{"title": {"operator": "LIKE", "operand": "%rust%"}, "id": {"operator": ">", "operand": 3}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ConditionBody>",
    into = "BTreeMap<String, ConditionBody>"
)]
pub struct FilterClause {
    pub conditions: Vec<FilterCondition>,
}

impl FilterClause {
    #[must_use]
    pub fn new(conditions: Vec<FilterCondition>) -> Self {
        Self { conditions }
    }
}

impl From<BTreeMap<String, ConditionBody>> for FilterClause {
    fn from(map: BTreeMap<String, ConditionBody>) -> Self {
        let conditions = map
            .into_iter()
            .map(|(field, body)| FilterCondition {
                field,
                operator: body.operator,
                operand: body.operand,
                not: body.not,
            })
            .collect();
        Self { conditions }
    }
}

// Conditions repeating a field keep the last one when serialized.
impl From<FilterClause> for BTreeMap<String, ConditionBody> {
    fn from(clause: FilterClause) -> Self {
        clause
            .conditions
            .into_iter()
            .map(|condition| {
                (
                    condition.field,
                    ConditionBody {
                        operator: condition.operator,
                        operand: condition.operand,
                        not: condition.not,
                    },
                )
            })
            .collect()
    }
}

/// Disjunction of clauses: a record matches when any clause matches
pub type FilterRequest = Vec<FilterClause>;

/// Translate a filter request into a Sea-ORM condition.
///
/// An empty request is the always-true condition. Every invalid condition is reported, not
/// just the first one.
///
/// # Errors
///
/// Returns `CrudError::Validation` for unknown fields, operators that do not apply to the
/// field's type, and operands of the wrong shape or type.
pub fn build_filter_condition<R: CrudResource>(
    filter: &[FilterClause],
) -> Result<Condition, CrudError> {
    if filter.is_empty() {
        return Ok(Condition::all());
    }

    let mut errors = Vec::new();
    let mut any = Condition::any();
    for clause in filter {
        let mut all = Condition::all();
        for condition in &clause.conditions {
            match translate::<R>(condition) {
                Ok(translated) => all = all.add(translated),
                Err(CrudError::Validation { errors: messages }) => errors.extend(messages),
                Err(other) => return Err(other),
            }
        }
        any = any.add(all);
    }

    if errors.is_empty() {
        Ok(any)
    } else {
        Err(CrudError::validation_many(errors))
    }
}

/// Translate an equality map (`field -> value`, `null` meaning IS NULL) into a conjunction.
///
/// # Errors
///
/// Returns `CrudError::Validation` for unknown fields and values that do not fit the column.
pub fn build_equality_condition<R: CrudResource>(query: &JsonMap) -> Result<Condition, CrudError> {
    let mut errors = Vec::new();
    let mut condition = Condition::all();
    for (field, value) in query {
        let operator = if value.is_null() {
            Operator::Null
        } else {
            Operator::Eq
        };
        match translate::<R>(&FilterCondition::new(field.clone(), operator, value.clone())) {
            Ok(translated) => condition = condition.add(translated),
            Err(CrudError::Validation { errors: messages }) => errors.extend(messages),
            Err(other) => return Err(other),
        }
    }

    if errors.is_empty() {
        Ok(condition)
    } else {
        Err(CrudError::validation_many(errors))
    }
}

fn translate<R: CrudResource>(condition: &FilterCondition) -> Result<Condition, CrudError> {
    let column = R::find_column(&condition.field).ok_or_else(|| {
        CrudError::validation(format!("cannot filter by unknown field '{}'", condition.field))
    })?;
    if !condition.operator.accepts(column_kind(column)) {
        return Err(CrudError::validation(format!(
            "operator {} is not supported on field '{}'",
            condition.operator, condition.field
        )));
    }

    let operand = &condition.operand;
    let expr: SimpleExpr = match condition.operator {
        Operator::Eq => column.eq(json_to_value(column, operand)?),
        Operator::Ne => column.ne(json_to_value(column, operand)?),
        Operator::Gt => column.gt(json_to_value(column, operand)?),
        Operator::Gte => column.gte(json_to_value(column, operand)?),
        Operator::Lt => column.lt(json_to_value(column, operand)?),
        Operator::Lte => column.lte(json_to_value(column, operand)?),
        Operator::Like => column.like(pattern(condition)?),
        Operator::ILike => SimpleExpr::FunctionCall(Func::upper(Expr::col((
            column.entity_name(),
            column,
        ))))
        .binary(
            BinOper::Like,
            SimpleExpr::FunctionCall(Func::upper(Expr::val(pattern(condition)?))),
        ),
        Operator::Between => match operand.as_array().map(Vec::as_slice) {
            Some([low, high]) => {
                column.between(json_to_value(column, low)?, json_to_value(column, high)?)
            }
            _ => {
                return Err(CrudError::validation(format!(
                    "BETWEEN on field '{}' expects a two-element array",
                    condition.field
                )));
            }
        },
        Operator::In => match operand.as_array() {
            Some(items) if !items.is_empty() => column.is_in(
                items
                    .iter()
                    .map(|item| json_to_value(column, item))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => {
                return Err(CrudError::validation(format!(
                    "IN on field '{}' expects a non-empty array",
                    condition.field
                )));
            }
        },
        Operator::Null => column.is_null(),
    };

    let translated = Condition::all().add(expr);
    Ok(if condition.not {
        translated.not()
    } else {
        translated
    })
}

fn pattern(condition: &FilterCondition) -> Result<String, CrudError> {
    condition.operand.as_str().map(str::to_string).ok_or_else(|| {
        CrudError::validation(format!(
            "{} on field '{}' expects a string pattern",
            condition.operator, condition.field
        ))
    })
}
