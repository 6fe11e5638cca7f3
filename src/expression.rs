//! Conditional expressions for style resolution
//!
//! An expression is an ordered list of conditions with an `else` fallback:
//!
//! ```json
//! { "if": [ { "variable": "weight", "gt": 50, "then": "red" } ], "else": "blue" }
//! ```
//!
//! Conditions are tested in declared order against the variables bound from
//! a fact; the `then` value of the first condition that holds wins.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Variable bindings of a node or edge: template variable name -> fact argument
pub type Variables = BTreeMap<String, String>;

/// Errors raised while evaluating an expression
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// A condition does not carry exactly one comparison operator
    #[error(
        "invalid condition on variable '{variable}': expected exactly one of {}",
        Operator::names().join(", ")
    )]
    InvalidCondition { variable: String },
}

/// Comparison operators available in conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Matches,
    IMatches,
    Contains,
    IContains,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Matches,
        Operator::IMatches,
        Operator::Contains,
        Operator::IContains,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
    ];

    /// Key used for this operator in template documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Matches => "matches",
            Operator::IMatches => "imatches",
            Operator::Contains => "contains",
            Operator::IContains => "icontains",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == key)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Operator::as_str).collect()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Number(f64),
}

impl Operand {
    /// Convert a JSON value; `null` means "no operand", anything else non-scalar is rejected.
    pub fn from_json(value: &Value) -> Result<Option<Self>, String> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(Operand::Text(s.clone()))),
            Value::Number(n) => n
                .as_f64()
                .map(|n| Some(Operand::Number(n)))
                .ok_or_else(|| format!("number {} is out of range", n)),
            _ => Err("must be string, number or null".to_string()),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Operand::Text(s) => Some(s),
            Operand::Number(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Text(s) => f.write_str(s),
            Operand::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Operand::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Operator plus operand of a condition
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub operator: Operator,
    /// `None` when the operator key is present but its value is null
    pub operand: Option<Operand>,
}

impl Comparison {
    pub fn new(operator: Operator, operand: impl Into<Operand>) -> Self {
        Self {
            operator,
            operand: Some(operand.into()),
        }
    }

    /// Test a bound value against this comparison.
    ///
    /// Mismatched operand types and absent operands make the comparison
    /// false rather than failing.
    pub fn holds(&self, value: &str) -> bool {
        let Some(operand) = &self.operand else {
            return false;
        };

        match self.operator {
            Operator::Matches => match operand {
                Operand::Text(expected) => value == expected,
                Operand::Number(expected) => parse_number(value) == Some(*expected),
            },
            Operator::IMatches => operand
                .as_text()
                .is_some_and(|expected| value.to_lowercase() == expected.to_lowercase()),
            Operator::Contains => value.contains(&operand.to_string()),
            Operator::IContains => operand
                .as_text()
                .is_some_and(|needle| value.to_lowercase().contains(&needle.to_lowercase())),
            Operator::Lt => compare(value, operand).is_some_and(|o| o.is_lt()),
            Operator::Lte => compare(value, operand).is_some_and(|o| o.is_le()),
            Operator::Gt => compare(value, operand).is_some_and(|o| o.is_gt()),
            Operator::Gte => compare(value, operand).is_some_and(|o| o.is_ge()),
        }
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Text(s)
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl From<i32> for Operand {
    fn from(n: i32) -> Self {
        Operand::Number(n as f64)
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Numbers compare numerically, text compares lexicographically.
fn compare(value: &str, operand: &Operand) -> Option<std::cmp::Ordering> {
    match operand {
        Operand::Number(n) => parse_number(value)?.partial_cmp(n),
        Operand::Text(s) => Some(value.cmp(s.as_str())),
    }
}

/// A single `if` branch
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawCondition")]
pub struct Condition {
    /// Name of the bound variable to test
    pub variable: String,
    /// `None` unless the condition names exactly one operator; evaluating it is an error
    pub comparison: Option<Comparison>,
    /// Value produced when the comparison holds
    pub then: String,
}

impl Condition {
    pub fn new(variable: impl Into<String>, comparison: Comparison, then: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            comparison: Some(comparison),
            then: then.into(),
        }
    }

    /// Evaluate against a set of bindings. An unbound variable never matches.
    pub fn evaluate(&self, variables: &Variables) -> Result<bool, ExpressionError> {
        let comparison = self
            .comparison
            .as_ref()
            .ok_or_else(|| ExpressionError::InvalidCondition {
                variable: self.variable.clone(),
            })?;

        Ok(variables
            .get(&self.variable)
            .is_some_and(|value| comparison.holds(value)))
    }
}

/// Document form of a condition: every operator is an optional key and
/// unknown keys are ignored.
#[derive(Deserialize)]
struct RawCondition {
    variable: String,
    then: String,
    #[serde(default, deserialize_with = "present")]
    matches: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    imatches: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    contains: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    icontains: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    lt: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    lte: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    gt: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    gte: Option<Value>,
}

/// Keeps an explicit `null` distinct from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawCondition> for Condition {
    type Error = String;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let candidates = [
            (Operator::Matches, raw.matches),
            (Operator::IMatches, raw.imatches),
            (Operator::Contains, raw.contains),
            (Operator::IContains, raw.icontains),
            (Operator::Lt, raw.lt),
            (Operator::Lte, raw.lte),
            (Operator::Gt, raw.gt),
            (Operator::Gte, raw.gte),
        ];

        let mut comparisons = Vec::new();
        for (operator, value) in candidates {
            let Some(value) = value else { continue };
            let operand = Operand::from_json(&value).map_err(|e| format!("{}: {}", operator, e))?;
            comparisons.push(Comparison { operator, operand });
        }

        // Anything but exactly one operator is left for evaluation to reject
        let comparison = match comparisons.len() {
            1 => comparisons.pop(),
            _ => None,
        };

        Ok(Condition {
            variable: raw.variable,
            comparison,
            then: raw.then,
        })
    }
}

/// An `if`/`else` expression producing a literal
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Expression {
    #[serde(rename = "if")]
    pub conditions: Vec<Condition>,
    #[serde(rename = "else")]
    pub else_value: String,
}

impl Expression {
    pub fn new(conditions: Vec<Condition>, else_value: impl Into<String>) -> Self {
        Self {
            conditions,
            else_value: else_value.into(),
        }
    }

    /// Return the `then` value of the first condition that holds, or the `else` value.
    ///
    /// Fails on the first condition without an operator that is reached.
    pub fn evaluate(&self, variables: &Variables) -> Result<&str, ExpressionError> {
        for condition in &self.conditions {
            if condition.evaluate(variables)? {
                return Ok(&condition.then);
            }
        }
        Ok(&self.else_value)
    }
}
