//! Resolved graphs
//!
//! One [`Graph`] is produced per answer set. Nodes and edges keep every
//! variable bound from their fact so styles can be computed from them.

mod builder;
mod resolver;

use std::fmt;

use serde::Serialize;

use crate::expression::Variables;
use crate::template::Layout;

pub use builder::{build_edge, build_node, bind_variables};
pub use resolver::GraphResolver;

/// Which end of an edge a check refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    From,
    To,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::From => write!(f, "from"),
            Endpoint::To => write!(f, "to"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub label: String,
    pub color: Option<String>,
    pub variables: Variables,
    /// Index of the node template that produced this node
    pub source_template_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub weight: Option<String>,
    pub color: Option<String>,
    pub oriented: bool,
    pub variables: Variables,
    /// Index of the edge template that produced this edge
    pub source_template_index: usize,
}

impl Edge {
    pub fn endpoint(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::From => &self.from,
            Endpoint::To => &self.to,
        }
    }
}

/// A fully resolved graph, ready for a renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub layout: Layout,
    /// Cost of the answer set this graph was built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
}

impl Graph {
    pub fn node(&self, label: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }
}
