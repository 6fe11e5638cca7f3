//! Error types for validation and graph resolution

use std::fmt;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::answer_set::AnswerSetError;
use crate::expression::ExpressionError;
use crate::fact::{arguments_span, FactError};
use crate::graph::Endpoint;
use crate::template::TemplateError;

/// A single structural problem found in an input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// JSON pointer to the offending value, empty for the document root
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} {}", self.path, self.message)
        }
    }
}

pub(crate) fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while turning answer sets into graphs
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    InvalidTemplate(#[from] TemplateError),

    #[error(transparent)]
    InvalidAnswerSets(#[from] AnswerSetError),

    #[error(transparent)]
    MalformedFact(#[from] FactError),

    /// A fact's argument count disagrees with its template
    #[error("fact \"{fact}\" has {actual} arguments but atom '{atom}' expects {expected}")]
    ArityMismatch {
        fact: String,
        atom: String,
        actual: usize,
        expected: usize,
    },

    /// An edge endpoint names no node of the same graph
    #[error("edge ({from}, {to}) references missing {endpoint} node \"{missing}\"")]
    DanglingEdge {
        from: String,
        to: String,
        endpoint: Endpoint,
        missing: String,
    },

    #[error(transparent)]
    InvalidCondition(#[from] ExpressionError),
}

impl GraphError {
    pub fn arity_mismatch(
        fact: impl Into<String>,
        atom: impl Into<String>,
        actual: usize,
        expected: usize,
    ) -> Self {
        Self::ArityMismatch {
            fact: fact.into(),
            atom: atom.into(),
            actual,
            expected,
        }
    }

    pub fn dangling(from: &str, to: &str, endpoint: Endpoint) -> Self {
        let missing = match endpoint {
            Endpoint::From => from,
            Endpoint::To => to,
        };
        Self::DanglingEdge {
            from: from.to_string(),
            to: to.to_string(),
            endpoint,
            missing: missing.to_string(),
        }
    }

    /// The fact this error was raised on, if any
    pub fn fact(&self) -> Option<&str> {
        match self {
            Self::ArityMismatch { fact, .. } => Some(fact),
            Self::MalformedFact(FactError::Malformed { fact }) => Some(fact),
            _ => None,
        }
    }

    /// Format the error, pointing into the offending fact when there is one
    pub fn format(&self, source_name: &str) -> String {
        let Some(fact) = self.fact() else {
            return format!("Error: {}", self);
        };

        let label = match self {
            Self::ArityMismatch { expected, .. } => format!("expected {} arguments here", expected),
            _ => "argument list starts here".to_string(),
        };
        let span = arguments_span(fact);

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, source_name, span.start)
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(
                Label::new((source_name, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((source_name, Source::from(fact)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("Error: {}", self),
        }
    }
}
