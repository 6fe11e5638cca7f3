//! ASP Graph - styled graphs from Answer Set Programming solver output
//!
//! A JSON template says which predicates of an answer set are nodes and which
//! are edges, how their arguments are named, and how colors are derived. Each
//! answer set is turned into one [`Graph`] ready for a renderer.
//!
//! # Example
//!
//! ```rust
//! use asp_graph::resolve_json;
//! use serde_json::json;
//!
//! let template = json!({
//!     "nodes": [{ "atom": { "name": "node", "variables": ["label"] } }],
//!     "edges": [{ "atom": { "name": "edge", "variables": ["from", "to", "weight"] } }]
//! });
//! let answer_sets = json!([{ "as": ["node(a)", "node(b)", "edge(a,b,5)"] }]);
//!
//! let graphs = resolve_json(&template, &answer_sets).unwrap();
//! assert_eq!(graphs[0].labels(), vec!["a", "b"]);
//! assert_eq!(graphs[0].edges[0].weight.as_deref(), Some("5"));
//! ```

pub mod answer_set;
pub mod error;
pub mod expression;
pub mod fact;
pub mod graph;
pub mod input;
pub mod style;
pub mod template;

pub use answer_set::{validate_answer_sets, AnswerSet, AnswerSetError};
pub use error::{GraphError, ValidationError};
pub use expression::{Expression, ExpressionError, Variables};
pub use fact::{extract_facts_by_atom_name, FactError};
pub use graph::{Edge, Graph, GraphResolver, Node};
pub use input::{parse_document, read_document, DocumentFormat, InputError};
pub use style::{ColorSpec, Role, RoleColors};
pub use template::{validate_template, Layout, Template, TemplateError};

use serde_json::Value;

/// Validate both documents and resolve every answer set, stopping at the
/// first failure.
///
/// # Example
///
/// ```rust
/// use asp_graph::{resolve_json, GraphError};
/// use serde_json::json;
///
/// let template = json!({
///     "nodes": [{ "atom": { "name": "node", "variables": ["label"] } }],
///     "edges": []
/// });
///
/// let err = resolve_json(&template, &json!([])).unwrap_err();
/// assert!(matches!(err, GraphError::InvalidAnswerSets(_)));
/// ```
pub fn resolve_json(template: &Value, answer_sets: &Value) -> Result<Vec<Graph>, GraphError> {
    GraphResolver::from_json(template, answer_sets)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn template() -> Value {
        json!({
            "template": "graph",
            "layout": "avsdf",
            "nodes": [{ "atom": { "name": "node", "variables": ["label"] } }],
            "edges": [{ "atom": { "name": "edge", "variables": ["from", "to", "weight"] } }]
        })
    }

    #[test]
    fn test_resolve_json_one_graph_per_answer_set() {
        let graphs = resolve_json(
            &template(),
            &json!([
                {"as": ["node(a)", "node(b)", "edge(a,b,5)"], "cost": "1@2"},
                {"as": ["node(c)"]}
            ]),
        )
        .unwrap();

        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[0].cost.as_deref(), Some("1@2"));
        assert_eq!(graphs[0].layout, Layout::Avsdf);
        assert_eq!(graphs[1].labels(), vec!["c"]);
        assert!(graphs[1].edges.is_empty());
    }

    #[test]
    fn test_resolve_json_is_repeatable() {
        let answer_sets = json!([["node(a)", "node(b)", "edge(a,b,5)"]]);
        let resolver = GraphResolver::from_json(&template(), &answer_sets).unwrap();
        assert_eq!(resolver.parse().unwrap(), resolver.parse().unwrap());
    }

    #[test]
    fn test_resolve_json_rejects_bad_template() {
        let err = resolve_json(
            &json!({"nodes": [{"atom": {"name": "atom", "variables": []}}], "edges": []}),
            &json!([["atom(a)"]]),
        )
        .unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"Template is not valid: /nodes/0/atom/variables must NOT have fewer than 1 items"
        );
    }

    #[test]
    fn test_graph_serializes_camel_case() {
        let graphs = resolve_json(&template(), &json!([["node(a)", "edge(a,a,1)"]])).unwrap();
        let value = serde_json::to_value(&graphs[0]).unwrap();
        assert_eq!(value["layout"], json!("avsdf"));
        assert_eq!(value["nodes"][0]["sourceTemplateIndex"], json!(0));
        assert_eq!(value["edges"][0]["oriented"], json!(true));
        assert!(value.get("cost").is_none());
    }
}
