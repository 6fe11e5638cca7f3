//! Turn matched facts into nodes and edges

use crate::expression::Variables;
use crate::template::{EdgeTemplate, NodeTemplate};

use super::{Edge, Node};

/// Bind each variable name to the argument at the same position.
///
/// Arity is checked by the caller; surplus names or arguments are ignored.
pub fn bind_variables(names: &[String], arguments: &[&str]) -> Variables {
    names
        .iter()
        .zip(arguments)
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect()
}

/// Build a node from the arguments of one of its template's facts
pub fn build_node(arguments: &[&str], template: &NodeTemplate, template_index: usize) -> Node {
    let variables = bind_variables(&template.atom.variables, arguments);
    Node {
        label: variables.get("label").cloned().unwrap_or_default(),
        color: variables.get("color").cloned(),
        variables,
        source_template_index: template_index,
    }
}

/// Build an edge from the arguments of one of its template's facts
pub fn build_edge(arguments: &[&str], template: &EdgeTemplate, template_index: usize) -> Edge {
    let variables = bind_variables(&template.atom.variables, arguments);
    Edge {
        from: variables.get("from").cloned().unwrap_or_default(),
        to: variables.get("to").cloned().unwrap_or_default(),
        weight: variables.get("weight").cloned(),
        color: variables.get("color").cloned(),
        oriented: template.style.oriented,
        variables,
        source_template_index: template_index,
    }
}
