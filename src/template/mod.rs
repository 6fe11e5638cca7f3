//! Graph templates
//!
//! A template says which predicates of an answer set are nodes and which are
//! edges, how their arguments are named, and how default colors are derived.
//!
//! # Example
//!
//! ```json
//! {
//!     "layout": "dagre",
//!     "nodes": [
//!         { "atom": { "name": "node", "variables": ["label"] },
//!           "style": { "color": { "root": "yellow", "leaf": "purple", "all": "blue" } } }
//!     ],
//!     "edges": [
//!         { "atom": { "name": "edge", "variables": ["from", "to", "weight"] },
//!           "style": { "color": "green", "oriented": true } }
//!     ]
//! }
//! ```

mod validator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{format_validation_errors, ValidationError};
use crate::style::{ColorSpec, RoleColors};

pub use validator::{validate_template, ATOM_NAME_PATTERN};

/// Errors that make a template unusable
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    /// The document does not have the template shape
    #[error("Template is not valid: {}", format_validation_errors(.0))]
    Schema(Vec<ValidationError>),

    /// An atom lacks one of the variables its entity kind requires
    #[error(
        "Variables provided: \"{}\" must contain \"{}\"",
        .provided.join(","),
        .mandatory.join(",")
    )]
    MissingVariables {
        kind: EntityKind,
        provided: Vec<String>,
        missing: Vec<String>,
        mandatory: Vec<String>,
    },
}

/// Whether a template entry describes nodes or edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Edge,
}

impl EntityKind {
    /// Variables every atom of this kind has to bind
    pub fn mandatory_variables(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Node => &["label"],
            EntityKind::Edge => &["from", "to"],
        }
    }

    pub fn default_atom_name(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
        }
    }

    pub fn min_variables(&self) -> usize {
        self.mandatory_variables().len()
    }
}

/// Layout hint handed to the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Dagre,
    Avsdf,
}

impl Layout {
    pub const NAMES: [&'static str; 2] = ["dagre", "avsdf"];
}

/// Predicate name plus the ordered names of its arguments
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AtomTemplate {
    pub name: String,
    pub variables: Vec<String>,
}

impl AtomTemplate {
    pub fn new<S: Into<String>>(name: impl Into<String>, variables: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.variables.len()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Fail unless every mandatory variable of `kind` is declared
    pub fn check_mandatory(&self, kind: EntityKind) -> Result<(), TemplateError> {
        let mandatory = kind.mandatory_variables();
        let missing: Vec<String> = mandatory
            .iter()
            .filter(|name| !self.has_variable(name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        Err(TemplateError::MissingVariables {
            kind,
            provided: self.variables.clone(),
            missing,
            mandatory: mandatory.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeStyle {
    #[serde(default)]
    pub color: Option<RoleColors>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeStyle {
    #[serde(default)]
    pub color: Option<ColorSpec>,
    #[serde(default = "default_oriented")]
    pub oriented: bool,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            color: None,
            oriented: true,
        }
    }
}

fn default_oriented() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeTemplate {
    pub atom: AtomTemplate,
    #[serde(default)]
    pub style: NodeStyle,
}

impl NodeTemplate {
    pub fn new(atom: AtomTemplate) -> Self {
        Self {
            atom,
            style: NodeStyle::default(),
        }
    }

    pub fn with_colors(mut self, colors: RoleColors) -> Self {
        self.style.color = Some(colors);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeTemplate {
    pub atom: AtomTemplate,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl EdgeTemplate {
    pub fn new(atom: AtomTemplate) -> Self {
        Self {
            atom,
            style: EdgeStyle::default(),
        }
    }

    pub fn with_color(mut self, color: ColorSpec) -> Self {
        self.style.color = Some(color);
        self
    }

    pub fn with_oriented(mut self, oriented: bool) -> Self {
        self.style.oriented = oriented;
        self
    }
}

/// A validated, defaulted template
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    /// Free-form kind tag, e.g. "graph"
    #[serde(default, rename = "template")]
    pub kind: Option<String>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(rename = "nodes")]
    pub node_templates: Vec<NodeTemplate>,
    #[serde(rename = "edges")]
    pub edge_templates: Vec<EdgeTemplate>,
}

impl Template {
    pub fn new(node_templates: Vec<NodeTemplate>, edge_templates: Vec<EdgeTemplate>) -> Self {
        Self {
            kind: None,
            layout: Layout::default(),
            node_templates,
            edge_templates,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Check that node atoms bind `label` and edge atoms bind `from` and `to`
    pub fn check_mandatory_variables(&self) -> Result<(), TemplateError> {
        for node in &self.node_templates {
            node.atom.check_mandatory(EntityKind::Node)?;
        }
        for edge in &self.edge_templates {
            edge.atom.check_mandatory(EntityKind::Edge)?;
        }
        Ok(())
    }
}
