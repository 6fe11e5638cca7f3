//! Color specifications and role-based fallback
//!
//! A color in a template is either a literal (`"red"`) or an expression that
//! is evaluated against the variables bound from a fact. Node colors are keyed
//! by the node's role in its graph, with `all` as the shared fallback.

use std::fmt;

use serde::Deserialize;

use crate::expression::{Expression, ExpressionError, Variables};

/// A literal color or a conditional expression, decided when the template is loaded
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Literal(String),
    Conditional(Expression),
}

impl ColorSpec {
    pub fn literal(color: impl Into<String>) -> Self {
        ColorSpec::Literal(color.into())
    }

    /// Resolve to a concrete color for an entity with the given bindings
    pub fn resolve(&self, variables: &Variables) -> Result<String, ExpressionError> {
        match self {
            ColorSpec::Literal(color) => Ok(color.clone()),
            ColorSpec::Conditional(expression) => expression.evaluate(variables).map(str::to_string),
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(color: &str) -> Self {
        ColorSpec::literal(color)
    }
}

impl From<Expression> for ColorSpec {
    fn from(expression: Expression) -> Self {
        ColorSpec::Conditional(expression)
    }
}

/// Topological role of a node within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// No edge points at the node
    Root,
    /// No edge leaves the node
    Leaf,
    NonRoot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Root => write!(f, "root"),
            Role::Leaf => write!(f, "leaf"),
            Role::NonRoot => write!(f, "nonRoot"),
        }
    }
}

/// Node colors keyed by role
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleColors {
    #[serde(default)]
    pub root: Option<ColorSpec>,
    #[serde(default)]
    pub leaf: Option<ColorSpec>,
    #[serde(default)]
    pub non_root: Option<ColorSpec>,
    #[serde(default)]
    pub all: Option<ColorSpec>,
}

impl RoleColors {
    pub const KEYS: [&'static str; 4] = ["root", "leaf", "nonRoot", "all"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, color: impl Into<ColorSpec>) -> Self {
        self.root = Some(color.into());
        self
    }

    pub fn with_leaf(mut self, color: impl Into<ColorSpec>) -> Self {
        self.leaf = Some(color.into());
        self
    }

    pub fn with_non_root(mut self, color: impl Into<ColorSpec>) -> Self {
        self.non_root = Some(color.into());
        self
    }

    pub fn with_all(mut self, color: impl Into<ColorSpec>) -> Self {
        self.all = Some(color.into());
        self
    }

    /// Color spec for a role, falling back to `all`
    pub fn for_role(&self, role: Role) -> Option<&ColorSpec> {
        let specific = match role {
            Role::Root => self.root.as_ref(),
            Role::Leaf => self.leaf.as_ref(),
            Role::NonRoot => self.non_root.as_ref(),
        };
        specific.or(self.all.as_ref())
    }
}
