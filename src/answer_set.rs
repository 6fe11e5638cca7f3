//! Answer sets and their validation
//!
//! Solvers emit answer sets as JSON records:
//!
//! ```json
//! [ { "as": ["node(a)", "node(b)", "edge(a,b,5)"], "cost": "1@2" } ]
//! ```
//!
//! A bare array of fact strings is accepted in place of a record.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::{format_validation_errors, ValidationError};

/// Errors that make an answer-set collection unusable
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnswerSetError {
    #[error("Answer sets are not valid: {}", format_validation_errors(.0))]
    Schema(Vec<ValidationError>),

    #[error("Answer set list is empty")]
    EmptyAnswerSetList,
}

/// One solver model: an ordered list of ground facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerSet {
    pub facts: Vec<String>,
    /// Optimization cost as reported by the solver, e.g. `1@2`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
}

impl AnswerSet {
    pub fn new<S: Into<String>>(facts: impl IntoIterator<Item = S>) -> Self {
        Self {
            facts: facts.into_iter().map(Into::into).collect(),
            cost: None,
        }
    }

    pub fn with_cost(mut self, cost: impl Into<String>) -> Self {
        self.cost = Some(cost.into());
        self
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Validate a raw answer-set document.
///
/// The document has to be a non-empty array of records; every structural
/// problem is reported with a JSON pointer.
pub fn validate_answer_sets(raw: &Value) -> Result<Vec<AnswerSet>, AnswerSetError> {
    let Some(records) = raw.as_array() else {
        return Err(AnswerSetError::Schema(vec![ValidationError::new(
            "",
            "must be array",
        )]));
    };

    let mut errors = Vec::new();
    let mut answer_sets = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if let Some(answer_set) = check_record(record, &format!("/{}", index), &mut errors) {
            answer_sets.push(answer_set);
        }
    }

    if !errors.is_empty() {
        return Err(AnswerSetError::Schema(errors));
    }
    if answer_sets.is_empty() {
        return Err(AnswerSetError::EmptyAnswerSetList);
    }

    tracing::debug!(count = answer_sets.len(), "answer sets accepted");
    Ok(answer_sets)
}

fn check_record(
    record: &Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<AnswerSet> {
    match record {
        Value::Array(facts) => check_facts(facts, path, errors).map(AnswerSet::new),
        Value::Object(fields) => {
            let facts = match fields.get("as") {
                Some(Value::Array(facts)) => check_facts(facts, &format!("{}/as", path), errors),
                Some(_) => {
                    errors.push(ValidationError::new(format!("{}/as", path), "must be array"));
                    None
                }
                None => {
                    errors.push(ValidationError::new(path, "must have required property 'as'"));
                    None
                }
            };

            let cost = match fields.get("cost") {
                None | Some(Value::Null) => None,
                Some(Value::String(cost)) => Some(cost.clone()),
                Some(Value::Number(cost)) => Some(cost.to_string()),
                Some(_) => {
                    errors.push(ValidationError::new(
                        format!("{}/cost", path),
                        "must be string or number",
                    ));
                    None
                }
            };

            facts.map(|facts| AnswerSet { facts, cost })
        }
        _ => {
            errors.push(ValidationError::new(path, "must be object or array"));
            None
        }
    }
}

fn check_facts(
    facts: &[Value],
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Vec<String>> {
    let before = errors.len();
    let strings: Vec<String> = facts
        .iter()
        .enumerate()
        .filter_map(|(index, fact)| match fact {
            Value::String(fact) => Some(fact.clone()),
            _ => {
                errors.push(ValidationError::new(
                    format!("{}/{}", path, index),
                    "must be string",
                ));
                None
            }
        })
        .collect();

    (errors.len() == before).then_some(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_records_with_cost() {
        let sets = validate_answer_sets(&json!([
            {"as": ["node(a)", "node(b)"], "cost": "1@2"},
            {"as": ["node(7)"]}
        ]))
        .expect("Should validate");

        assert_eq!(
            sets,
            vec![
                AnswerSet::new(["node(a)", "node(b)"]).with_cost("1@2"),
                AnswerSet::new(["node(7)"]),
            ]
        );
    }

    #[test]
    fn test_bare_fact_arrays() {
        let sets = validate_answer_sets(&json!([["node(a)"], []])).expect("Should validate");
        assert_eq!(sets.len(), 2);
        assert!(sets[1].is_empty());
    }

    #[test]
    fn test_empty_list() {
        let err = validate_answer_sets(&json!([])).unwrap_err();
        assert_eq!(err, AnswerSetError::EmptyAnswerSetList);
        insta::assert_snapshot!(err.to_string(), @"Answer set list is empty");
    }

    #[test]
    fn test_not_an_array() {
        let err = validate_answer_sets(&json!({"as": []})).unwrap_err();
        assert_eq!(
            err,
            AnswerSetError::Schema(vec![ValidationError::new("", "must be array")])
        );
    }

    #[test]
    fn test_structural_errors_are_collected() {
        let err = validate_answer_sets(&json!([
            {"cost": "1"},
            {"as": ["node(a)", 3]},
            {"as": "node(a)", "cost": true},
            42
        ]))
        .unwrap_err();

        let AnswerSetError::Schema(errors) = err else {
            panic!("expected schema errors");
        };
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "/0 must have required property 'as'",
                "/1/as/1 must be string",
                "/2/as must be array",
                "/2/cost must be string or number",
                "/3 must be object or array"
            ]
        );
    }
}
