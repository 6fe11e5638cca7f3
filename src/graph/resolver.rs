//! Graph resolution - turns answer sets into styled graphs

use std::collections::HashSet;

use serde_json::Value;

use crate::answer_set::{validate_answer_sets, AnswerSet, AnswerSetError};
use crate::error::GraphError;
use crate::fact::{arguments, extract_facts_by_atom_name};
use crate::style::Role;
use crate::template::{validate_template, AtomTemplate, Template};

use super::builder::{build_edge, build_node};
use super::{Edge, Endpoint, Graph, Node};

/// Resolves every answer set of a run against one template
#[derive(Debug, Clone)]
pub struct GraphResolver {
    template: Template,
    answer_sets: Vec<AnswerSet>,
}

/// Facts of one atom template, already split and arity-checked
struct Matched<'a> {
    template_index: usize,
    arguments: Vec<Vec<&'a str>>,
}

impl GraphResolver {
    /// Create a resolver, rejecting templates without mandatory variables
    /// and empty answer-set lists.
    pub fn new(template: Template, answer_sets: Vec<AnswerSet>) -> Result<Self, GraphError> {
        template.check_mandatory_variables()?;
        if answer_sets.is_empty() {
            return Err(AnswerSetError::EmptyAnswerSetList.into());
        }
        Ok(Self {
            template,
            answer_sets,
        })
    }

    /// Validate raw template and answer-set documents, then create a resolver
    pub fn from_json(template: &Value, answer_sets: &Value) -> Result<Self, GraphError> {
        let template = validate_template(template)?;
        let answer_sets = validate_answer_sets(answer_sets)?;
        Self::new(template, answer_sets)
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn answer_sets(&self) -> &[AnswerSet] {
        &self.answer_sets
    }

    /// Resolve every answer set, stopping at the first failure
    pub fn parse(&self) -> Result<Vec<Graph>, GraphError> {
        self.answer_sets.iter().map(|set| self.resolve(set)).collect()
    }

    /// Resolve every answer set independently, one result per answer set
    pub fn parse_each(&self) -> Vec<Result<Graph, GraphError>> {
        self.answer_sets.iter().map(|set| self.resolve(set)).collect()
    }

    /// Resolve a single answer set into a graph.
    ///
    /// Runs in two passes: all nodes and edges are built and connected
    /// first, then default colors are derived, since a node's role depends
    /// on the complete edge set.
    pub fn resolve(&self, answer_set: &AnswerSet) -> Result<Graph, GraphError> {
        let facts = &answer_set.facts;

        // Every fact is arity-checked before anything is built
        let node_facts = self
            .template
            .node_templates
            .iter()
            .enumerate()
            .map(|(index, node)| match_facts(facts, &node.atom, index))
            .collect::<Result<Vec<_>, _>>()?;
        let edge_facts = self
            .template
            .edge_templates
            .iter()
            .enumerate()
            .map(|(index, edge)| match_facts(facts, &edge.atom, index))
            .collect::<Result<Vec<_>, _>>()?;

        let nodes: Vec<Node> = node_facts
            .iter()
            .flat_map(|matched| {
                let template = &self.template.node_templates[matched.template_index];
                matched
                    .arguments
                    .iter()
                    .map(move |args| build_node(args, template, matched.template_index))
            })
            .collect();
        let edges: Vec<Edge> = edge_facts
            .iter()
            .flat_map(|matched| {
                let template = &self.template.edge_templates[matched.template_index];
                matched
                    .arguments
                    .iter()
                    .map(move |args| build_edge(args, template, matched.template_index))
            })
            .collect();

        check_connectivity(&nodes, &edges)?;

        let roles = Roles::new(&edges);
        let nodes = nodes
            .into_iter()
            .map(|node| self.style_node(node, &roles))
            .collect::<Result<Vec<_>, _>>()?;
        let edges = edges
            .into_iter()
            .map(|edge| self.style_edge(edge))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            cost = answer_set.cost.as_deref(),
            "resolved graph"
        );

        Ok(Graph {
            nodes,
            edges,
            layout: self.template.layout,
            cost: answer_set.cost.clone(),
        })
    }

    /// Fill in a node's default color; a color bound from the fact wins
    fn style_node(&self, node: Node, roles: &Roles) -> Result<Node, GraphError> {
        if node.color.is_some() {
            return Ok(node);
        }
        let Some(colors) = &self.template.node_templates[node.source_template_index]
            .style
            .color
        else {
            return Ok(node);
        };

        let role = roles.role_of(&node.label);
        let color = colors
            .for_role(role)
            .map(|spec| spec.resolve(&node.variables))
            .transpose()?;
        tracing::trace!(label = %node.label, %role, color = color.as_deref(), "node color");

        Ok(Node { color, ..node })
    }

    fn style_edge(&self, edge: Edge) -> Result<Edge, GraphError> {
        if edge.color.is_some() {
            return Ok(edge);
        }
        let color = self.template.edge_templates[edge.source_template_index]
            .style
            .color
            .as_ref()
            .map(|spec| spec.resolve(&edge.variables))
            .transpose()?;

        Ok(Edge { color, ..edge })
    }
}

/// Extract the facts of one atom and split their arguments, failing on the
/// first fact whose arity differs from the template's.
fn match_facts<'a>(
    facts: &'a [String],
    atom: &AtomTemplate,
    template_index: usize,
) -> Result<Matched<'a>, GraphError> {
    let mut matched = Vec::new();
    for fact in extract_facts_by_atom_name(facts, &atom.name) {
        let args = arguments(fact)?;
        if args.len() != atom.arity() {
            return Err(GraphError::arity_mismatch(
                fact,
                &atom.name,
                args.len(),
                atom.arity(),
            ));
        }
        matched.push(args);
    }

    Ok(Matched {
        template_index,
        arguments: matched,
    })
}

/// Every edge endpoint has to be the label of a node in the same graph
fn check_connectivity(nodes: &[Node], edges: &[Edge]) -> Result<(), GraphError> {
    let labels: HashSet<&str> = nodes.iter().map(|n| n.label.as_str()).collect();

    for edge in edges {
        for endpoint in [Endpoint::From, Endpoint::To] {
            if !labels.contains(edge.endpoint(endpoint)) {
                return Err(GraphError::dangling(&edge.from, &edge.to, endpoint));
            }
        }
    }
    Ok(())
}

/// Which labels appear as edge sources and targets
struct Roles<'a> {
    sources: HashSet<&'a str>,
    targets: HashSet<&'a str>,
}

impl<'a> Roles<'a> {
    fn new(edges: &'a [Edge]) -> Self {
        Self {
            sources: edges.iter().map(|e| e.from.as_str()).collect(),
            targets: edges.iter().map(|e| e.to.as_str()).collect(),
        }
    }

    /// A node nothing points at is a root, even when it is also isolated
    fn role_of(&self, label: &str) -> Role {
        if !self.targets.contains(label) {
            Role::Root
        } else if !self.sources.contains(label) {
            Role::Leaf
        } else {
            Role::NonRoot
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ExpressionError;
    use crate::style::RoleColors;
    use crate::template::{EdgeTemplate, Layout, NodeTemplate, TemplateError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn simple_template() -> Template {
        Template::new(
            vec![NodeTemplate::new(AtomTemplate::new("node", ["label"]))],
            vec![EdgeTemplate::new(AtomTemplate::new(
                "edge",
                ["from", "to", "weight"],
            ))],
        )
    }

    fn resolve_one(template: Template, facts: &[&str]) -> Result<Graph, GraphError> {
        let resolver = GraphResolver::new(template, vec![AnswerSet::new(facts.iter().copied())])?;
        resolver.resolve(&resolver.answer_sets()[0])
    }

    #[test]
    fn test_simple_graph() {
        let graph = resolve_one(simple_template(), &["node(a)", "node(b)", "edge(a,b,5)"]).unwrap();
        assert_eq!(graph.labels(), vec!["a", "b"]);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].from, "a");
        assert_eq!(graph.edges[0].to, "b");
        assert_eq!(graph.edges[0].weight.as_deref(), Some("5"));
    }

    #[test]
    fn test_dangling_edge() {
        let err = resolve_one(simple_template(), &["node(a)", "node(b)", "edge(a,c,5)"]).unwrap_err();
        match err {
            GraphError::DanglingEdge {
                from,
                to,
                endpoint,
                missing,
            } => {
                assert_eq!((from.as_str(), to.as_str()), ("a", "c"));
                assert_eq!(endpoint, Endpoint::To);
                assert_eq!(missing, "c");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_dangling_source_is_reported_first() {
        let err = resolve_one(simple_template(), &["node(a)", "edge(x,y,1)"]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::DanglingEdge {
                endpoint: Endpoint::From,
                ..
            }
        ));
    }

    #[test]
    fn test_arity_mismatch_before_build() {
        // the edge fact is malformed in arity; the dangling endpoint is never reached
        let err = resolve_one(simple_template(), &["node(a)", "edge(a,zz)"]).unwrap_err();
        match err {
            GraphError::ArityMismatch {
                fact,
                actual,
                expected,
                ..
            } => {
                assert_eq!(fact, "edge(a,zz)");
                assert_eq!(actual, 2);
                assert_eq!(expected, 3);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_fact() {
        let err = resolve_one(simple_template(), &["node(a"]).unwrap_err();
        assert!(matches!(err, GraphError::MalformedFact(_)));
    }

    #[test]
    fn test_unrelated_facts_are_ignored() {
        let graph = resolve_one(
            simple_template(),
            &["node(a)", "cell(74,5)", "nodes(x,y)", "edge(a,a,1)"],
        )
        .unwrap();
        assert_eq!(graph.labels(), vec!["a"]);
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_node_templates_precede_in_order() {
        let template = Template::new(
            vec![
                NodeTemplate::new(AtomTemplate::new("city", ["label"])),
                NodeTemplate::new(AtomTemplate::new("town", ["label", "size"])),
            ],
            vec![],
        );
        let graph = resolve_one(template, &["town(t1,3)", "city(c1)", "town(t2,1)", "city(c2)"]).unwrap();
        assert_eq!(graph.labels(), vec!["c1", "c2", "t1", "t2"]);
        assert_eq!(graph.nodes[2].source_template_index, 1);
    }

    #[test]
    fn test_role_colors() {
        let template = Template::new(
            vec![NodeTemplate::new(AtomTemplate::new("node", ["label"])).with_colors(
                RoleColors::new()
                    .with_root("yellow")
                    .with_leaf("purple")
                    .with_non_root("blue"),
            )],
            vec![EdgeTemplate::new(AtomTemplate::new("edge", ["from", "to"]))],
        );
        let graph = resolve_one(
            template,
            &["node(a)", "node(b)", "node(c)", "node(d)", "edge(a,b)", "edge(b,c)"],
        )
        .unwrap();

        let color = |label| graph.node(label).and_then(|n| n.color.as_deref());
        assert_eq!(color("a"), Some("yellow"));
        assert_eq!(color("b"), Some("blue"));
        assert_eq!(color("c"), Some("purple"));
        // d is isolated: nothing points at it, so it is a root
        assert_eq!(color("d"), Some("yellow"));
        assert_eq!(color("e"), None);
    }

    #[test]
    fn test_fact_color_wins() {
        let template = Template::new(
            vec![NodeTemplate::new(AtomTemplate::new("node", ["label", "color"]))
                .with_colors(RoleColors::new().with_all("gray"))],
            vec![EdgeTemplate::new(AtomTemplate::new("edge", ["from", "to", "color"]))
                .with_color("green".into())],
        );
        let graph = resolve_one(
            template,
            &["node(a,red)", "node(b,blue)", "edge(a,b,black)"],
        )
        .unwrap();
        assert_eq!(graph.nodes[0].color.as_deref(), Some("red"));
        assert_eq!(graph.nodes[1].color.as_deref(), Some("blue"));
        assert_eq!(graph.edges[0].color.as_deref(), Some("black"));
    }

    #[test]
    fn test_conditional_edge_color() {
        let template: Template = validate_template(&json!({
            "nodes": [{"atom": {"name": "node", "variables": ["label"]}}],
            "edges": [{
                "atom": {"name": "edge", "variables": ["from", "to", "weight"]},
                "style": {"color": {"if": [{"variable": "weight", "gt": 50, "then": "red"}], "else": "blue"}}
            }]
        }))
        .unwrap();
        let graph = resolve_one(
            template,
            &["node(a)", "node(b)", "edge(a,b,51)", "edge(b,a,10)"],
        )
        .unwrap();
        assert_eq!(graph.edges[0].color.as_deref(), Some("red"));
        assert_eq!(graph.edges[1].color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_invalid_condition_surfaces() {
        let template: Template = validate_template(&json!({
            "nodes": [{
                "atom": {"name": "node", "variables": ["label"]},
                "style": {"color": {"all": {"if": [{"variable": "label", "then": "red"}], "else": "blue"}}}
            }],
            "edges": []
        }))
        .unwrap();
        let err = resolve_one(template, &["node(a)"]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidCondition(ExpressionError::InvalidCondition { .. })
        ));
    }

    #[test]
    fn test_ambiguous_or_unknown_operator_surfaces() {
        for condition in [
            json!({"variable": "label", "matches": "a", "lt": 3, "then": "red"}),
            json!({"variable": "label", "between": 3, "then": "red"}),
        ] {
            let template: Template = validate_template(&json!({
                "nodes": [{
                    "atom": {"name": "node", "variables": ["label"]},
                    "style": {"color": {"all": {"if": [condition], "else": "blue"}}}
                }],
                "edges": []
            }))
            .unwrap();
            let err = resolve_one(template, &["node(a)"]).unwrap_err();
            assert!(
                matches!(
                    err,
                    GraphError::InvalidCondition(ExpressionError::InvalidCondition { .. })
                ),
                "unexpected error {:?}",
                err
            );
        }
    }

    #[test]
    fn test_layout_is_carried_over() {
        let resolver = GraphResolver::new(
            simple_template().with_layout(Layout::Avsdf),
            vec![AnswerSet::new(["node(a)"]).with_cost("3@1")],
        )
        .unwrap();
        assert_eq!(resolver.template().layout, Layout::Avsdf);

        let graph = resolver.parse().unwrap().remove(0);
        assert_eq!(graph.layout, Layout::Avsdf);
        assert_eq!(graph.cost.as_deref(), Some("3@1"));
    }

    #[test]
    fn test_unstyled_entities_keep_no_color() {
        let graph = resolve_one(simple_template(), &["node(a)", "node(b)", "edge(a,b,1)"]).unwrap();
        assert!(graph.nodes.iter().all(|n| n.color.is_none()));
        assert!(graph.edges.iter().all(|e| e.color.is_none()));
    }

    #[test]
    fn test_new_rejects_missing_label() {
        let template = Template::new(
            vec![NodeTemplate::new(AtomTemplate::new("node", ["name"]))],
            vec![],
        );
        let err = GraphResolver::new(template, vec![AnswerSet::new(["node(a)"])]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidTemplate(TemplateError::MissingVariables { .. })
        ));
    }

    #[test]
    fn test_new_rejects_empty_answer_sets() {
        let err = GraphResolver::new(simple_template(), vec![]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidAnswerSets(AnswerSetError::EmptyAnswerSetList)
        ));
    }

    #[test]
    fn test_parse_each_isolates_failures() {
        let resolver = GraphResolver::new(
            simple_template(),
            vec![
                AnswerSet::new(["node(a)", "edge(a,b,1)"]),
                AnswerSet::new(["node(a)", "node(b)", "edge(a,b,1)"]),
            ],
        )
        .unwrap();

        let results = resolver.parse_each();
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
        assert!(resolver.parse().is_err());
    }

    #[test]
    fn test_roles() {
        let template = EdgeTemplate::new(AtomTemplate::new("edge", ["from", "to"]));
        let edges = vec![
            build_edge(&["a", "b"], &template, 0),
            build_edge(&["b", "c"], &template, 0),
        ];
        let roles = Roles::new(&edges);
        assert_eq!(roles.role_of("a"), Role::Root);
        assert_eq!(roles.role_of("b"), Role::NonRoot);
        assert_eq!(roles.role_of("c"), Role::Leaf);
    }
}
