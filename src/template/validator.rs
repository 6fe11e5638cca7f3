//! Structural validation and defaulting of template documents
//!
//! Walks the raw JSON value, collects every structural problem with a JSON
//! pointer to it, and fills in defaults as it goes. Only a document with no
//! problems is deserialized into a [`Template`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::ValidationError;
use crate::expression::{Operand, Operator};
use crate::style::RoleColors;

use super::{EntityKind, Layout, Template, TemplateError};

/// Atom names accepted in templates
pub const ATOM_NAME_PATTERN: &str = "^[A-Za-z][A-Za-z0-9_]*$";

static ATOM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ATOM_NAME_PATTERN).expect("atom name pattern should compile"));

/// Validate a raw template document and return the defaulted template.
///
/// Structural problems are reported together. A structurally valid template
/// whose atoms lack mandatory variables fails with
/// [`TemplateError::MissingVariables`].
pub fn validate_template(raw: &Value) -> Result<Template, TemplateError> {
    let mut document = raw.clone();
    let mut errors = Vec::new();
    check_document(&mut document, &mut errors);

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "template rejected");
        return Err(TemplateError::Schema(errors));
    }

    let template: Template = serde_json::from_value(document)
        .map_err(|e| TemplateError::Schema(vec![ValidationError::new("", e.to_string())]))?;
    template.check_mandatory_variables()?;

    tracing::debug!(
        nodes = template.node_templates.len(),
        edges = template.edge_templates.len(),
        layout = ?template.layout,
        "template accepted"
    );
    Ok(template)
}

fn push(errors: &mut Vec<ValidationError>, path: &str, message: impl Into<String>) {
    errors.push(ValidationError::new(path, message));
}

fn check_document(document: &mut Value, errors: &mut Vec<ValidationError>) {
    let Some(root) = document.as_object_mut() else {
        push(errors, "", "must be object");
        return;
    };

    if let Some(kind) = root.get("template") {
        if !kind.is_string() {
            push(errors, "/template", "must be string");
        }
    }

    match root.get("layout") {
        None => {
            root.insert("layout".to_string(), json!("dagre"));
        }
        Some(Value::String(name)) if Layout::NAMES.contains(&name.as_str()) => {}
        Some(_) => push(
            errors,
            "/layout",
            format!("must be equal to one of the allowed values: {}", Layout::NAMES.join(", ")),
        ),
    }

    check_entries(root, "nodes", EntityKind::Node, errors);
    check_entries(root, "edges", EntityKind::Edge, errors);
}

fn check_entries(
    root: &mut Map<String, Value>,
    key: &str,
    kind: EntityKind,
    errors: &mut Vec<ValidationError>,
) {
    let path = format!("/{}", key);
    match root.get_mut(key) {
        None => push(errors, "", format!("must have required property '{}'", key)),
        Some(Value::Array(entries)) => {
            for (index, entry) in entries.iter_mut().enumerate() {
                check_entry(entry, &format!("{}/{}", path, index), kind, errors);
            }
        }
        Some(_) => push(errors, &path, "must be array"),
    }
}

fn check_entry(entry: &mut Value, path: &str, kind: EntityKind, errors: &mut Vec<ValidationError>) {
    let Some(entry) = entry.as_object_mut() else {
        push(errors, path, "must be object");
        return;
    };

    match entry.get_mut("atom") {
        None => push(errors, path, "must have required property 'atom'"),
        Some(atom) => check_atom(atom, &format!("{}/atom", path), kind, errors),
    }

    let style = entry
        .entry("style")
        .or_insert_with(|| Value::Object(Map::new()));
    check_style(style, &format!("{}/style", path), kind, errors);
}

fn check_atom(atom: &mut Value, path: &str, kind: EntityKind, errors: &mut Vec<ValidationError>) {
    let Some(atom) = atom.as_object_mut() else {
        push(errors, path, "must be object");
        return;
    };

    match atom.get("name") {
        None => {
            atom.insert("name".to_string(), json!(kind.default_atom_name()));
        }
        Some(Value::String(name)) if !ATOM_NAME.is_match(name) => push(
            errors,
            &format!("{}/name", path),
            format!("must match pattern \"{}\"", ATOM_NAME_PATTERN),
        ),
        Some(Value::String(_)) => {}
        Some(_) => push(errors, &format!("{}/name", path), "must be string"),
    }

    match atom.get("variables") {
        None => {
            atom.insert("variables".to_string(), json!(kind.mandatory_variables()));
        }
        Some(Value::Array(items)) => {
            check_variables(items, &format!("{}/variables", path), kind, errors)
        }
        Some(_) => push(errors, &format!("{}/variables", path), "must be array"),
    }
}

fn check_variables(items: &[Value], path: &str, kind: EntityKind, errors: &mut Vec<ValidationError>) {
    if items.len() < kind.min_variables() {
        push(
            errors,
            path,
            format!("must NOT have fewer than {} items", kind.min_variables()),
        );
    }

    for (index, item) in items.iter().enumerate() {
        if !item.is_string() {
            push(errors, &format!("{}/{}", path, index), "must be string");
        }
    }

    'outer: for later in 1..items.len() {
        for earlier in 0..later {
            if items[earlier] == items[later] {
                push(
                    errors,
                    path,
                    format!(
                        "must NOT have duplicate items (items ## {} and {} are identical)",
                        later, earlier
                    ),
                );
                break 'outer;
            }
        }
    }
}

fn check_style(style: &mut Value, path: &str, kind: EntityKind, errors: &mut Vec<ValidationError>) {
    let Some(style) = style.as_object_mut() else {
        push(errors, path, "must be object");
        return;
    };

    if let Some(color) = style.get("color") {
        let color_path = format!("{}/color", path);
        match kind {
            EntityKind::Node => check_role_colors(color, &color_path, errors),
            EntityKind::Edge => check_color_spec(color, &color_path, errors),
        }
    }

    if kind == EntityKind::Edge {
        match style.get("oriented") {
            None => {
                style.insert("oriented".to_string(), Value::Bool(true));
            }
            Some(Value::Bool(_)) => {}
            Some(_) => push(errors, &format!("{}/oriented", path), "must be boolean"),
        }
    }
}

fn check_role_colors(colors: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let colors = match colors {
        Value::Null => return,
        Value::Object(colors) => colors,
        _ => {
            push(errors, path, "must be object");
            return;
        }
    };

    for (role, spec) in colors {
        if RoleColors::KEYS.contains(&role.as_str()) {
            check_color_spec(spec, &format!("{}/{}", path, role), errors);
        } else {
            push(
                errors,
                path,
                format!(
                    "must NOT have additional property '{}' (expected one of {})",
                    role,
                    RoleColors::KEYS.join(", ")
                ),
            );
        }
    }
}

fn check_color_spec(spec: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let expression = match spec {
        Value::Null | Value::String(_) => return,
        Value::Object(expression) => expression,
        _ => {
            push(errors, path, "must be string or expression object");
            return;
        }
    };

    match expression.get("else") {
        Some(Value::String(_)) => {}
        Some(_) => push(errors, &format!("{}/else", path), "must be string"),
        None => push(errors, path, "must have required property 'else'"),
    }

    match expression.get("if") {
        Some(Value::Array(conditions)) => {
            for (index, condition) in conditions.iter().enumerate() {
                check_condition(condition, &format!("{}/if/{}", path, index), errors);
            }
        }
        Some(_) => push(errors, &format!("{}/if", path), "must be array"),
        None => push(errors, path, "must have required property 'if'"),
    }

    for key in expression.keys() {
        if key != "if" && key != "else" {
            push(errors, path, format!("must NOT have additional property '{}'", key));
        }
    }
}

/// Operator count is not checked here: a condition without exactly one
/// known operator loads and fails when evaluated.
fn check_condition(condition: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(condition) = condition.as_object() else {
        push(errors, path, "must be object");
        return;
    };

    for required in ["variable", "then"] {
        match condition.get(required) {
            Some(Value::String(_)) => {}
            Some(_) => push(errors, &format!("{}/{}", path, required), "must be string"),
            None => push(
                errors,
                path,
                format!("must have required property '{}'", required),
            ),
        }
    }

    for (key, operand) in condition {
        if Operator::from_key(key).is_none() {
            continue;
        }
        if let Err(message) = Operand::from_json(operand) {
            push(errors, &format!("{}/{}", path, key), message);
        }
    }
}
