//! Materialized mutation actions and the executor that applies them.
//!
//! Grounded on the teacher's `WriteableGraph` trait and its
//! `execute_create`/`execute_delete`/`execute_set` functions in
//! `executor.rs`: a write clause is lowered to a small set of concrete
//! mutation primitives before anything touches the graph, rather than
//! interpreting the AST node directly against storage. The rollback option
//! has no teacher counterpart — the teacher commits each write function
//! directly against a single `WriteTxn` and relies on the storage layer's
//! own transaction abort; `cygraph-query` has no storage-layer transaction
//! to lean on, so rollback here is the query engine replaying inverse
//! actions itself.

use crate::bindings::{Binding, BindingContext};
use crate::error::{Error, Result};
use cygraph_api::{Direction, EdgeRecord, Graph, NodeRecord, PropertyMap, Value};
use std::collections::HashSet;

/// One concrete mutation. Each variant knows how to validate itself against
/// the graph, apply itself, and (where supported) describe its own
/// inverse for rollback.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateNode {
        id: String,
        label: String,
        properties: PropertyMap,
    },
    CreateRelationship {
        source: String,
        target: String,
        label: String,
        properties: PropertyMap,
        /// The relationship's own bound name, e.g. `[r:KNOWS]`, if the
        /// pattern named one. `Executor`/`Action` itself never reads this —
        /// it exists so `lower()` can bind the created edge into `local`
        /// for a later clause in the same statement to reference.
        variable: Option<String>,
    },
    SetProperty {
        target_kind: TargetKind,
        key: String,
        value: Value,
    },
    Delete {
        target_kind: TargetKind,
        detach: bool,
    },
}

/// What a `SetProperty`/`Delete` action applies to: a node id, or the
/// `(source, target, label)` triple identifying an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    Node(String),
    Edge(String, String, String),
}

/// Inverse of an applied action, used for rollback. A `SetProperty` records
/// no prior value, so it has nothing to replay: its inverse is `None`, and
/// rollback simply leaves the overwritten property as the failed batch left
/// it.
#[derive(Debug, Clone)]
pub enum Inverse {
    RemoveNode(String),
    RemoveEdge(String, String, String),
    RecreateNode(NodeRecord),
    RecreateEdge(EdgeRecord),
    None,
}

impl Action {
    pub fn validate<G: Graph>(&self, graph: &G) -> Result<()> {
        match self {
            Action::CreateNode { id, .. } => {
                if graph.has_node(id) {
                    return Err(Error::Runtime(format!("node '{id}' already exists")));
                }
                Ok(())
            }
            Action::CreateRelationship {
                source,
                target,
                label,
                ..
            } => {
                if !graph.has_node(source) {
                    return Err(Error::Runtime(format!("node '{source}' does not exist")));
                }
                if !graph.has_node(target) {
                    return Err(Error::Runtime(format!("node '{target}' does not exist")));
                }
                if graph.has_edge(source, target, label) {
                    return Err(Error::Runtime(format!(
                        "relationship '{source}-[{label}]->{target}' already exists"
                    )));
                }
                Ok(())
            }
            Action::SetProperty { target_kind, .. } => match target_kind {
                TargetKind::Node(id) if !graph.has_node(id) => {
                    Err(Error::Runtime(format!("node '{id}' does not exist")))
                }
                TargetKind::Edge(s, t, l) if !graph.has_edge(s, t, l) => {
                    Err(Error::Runtime(format!("relationship '{s}-[{l}]->{t}' does not exist")))
                }
                _ => Ok(()),
            },
            Action::Delete { target_kind, detach } => match target_kind {
                TargetKind::Node(id) => {
                    if !graph.has_node(id) {
                        return Err(Error::Runtime(format!("node '{id}' does not exist")));
                    }
                    if !detach && !graph.get_edges_for_node(id, Direction::Both).is_empty() {
                        return Err(Error::Runtime(format!(
                            "node '{id}' still has relationships; use DETACH DELETE"
                        )));
                    }
                    Ok(())
                }
                TargetKind::Edge(s, t, l) if !graph.has_edge(s, t, l) => {
                    Err(Error::Runtime(format!("relationship '{s}-[{l}]->{t}' does not exist")))
                }
                TargetKind::Edge(..) => Ok(()),
            },
        }
    }

    /// Applies the action, returning its inverse and the set of nodes/edges
    /// it touched (for `ExecutionResult` aggregation).
    pub fn execute<G: Graph>(&self, graph: &mut G) -> Result<(Inverse, AffectedSet)> {
        self.validate(graph)?;
        match self {
            Action::CreateNode { id, label, properties } => {
                graph.add_node(id, label, properties.clone());
                Ok((
                    Inverse::RemoveNode(id.clone()),
                    AffectedSet::node(id.clone()),
                ))
            }
            Action::CreateRelationship {
                source,
                target,
                label,
                properties,
                ..
            } => {
                graph.add_edge(source, target, label, properties.clone());
                Ok((
                    Inverse::RemoveEdge(source.clone(), target.clone(), label.clone()),
                    AffectedSet::edge(source.clone(), target.clone(), label.clone()),
                ))
            }
            Action::SetProperty {
                target_kind,
                key,
                value,
            } => {
                match target_kind {
                    TargetKind::Node(id) => {
                        let mut data = graph.get_node(id).map(|n| n.data).unwrap_or_default();
                        data.insert(key.clone(), value.clone());
                        graph.update_node_data(id, data);
                        Ok((Inverse::None, AffectedSet::node(id.clone())))
                    }
                    TargetKind::Edge(s, t, l) => {
                        let mut data = graph.get_edge(s, t, l).map(|e| e.data).unwrap_or_default();
                        data.insert(key.clone(), value.clone());
                        graph.update_edge(s, t, l, data);
                        Ok((Inverse::None, AffectedSet::edge(s.clone(), t.clone(), l.clone())))
                    }
                }
            }
            Action::Delete { target_kind, detach } => match target_kind {
                TargetKind::Node(id) => {
                    let node = graph
                        .get_node(id)
                        .ok_or_else(|| Error::Runtime(format!("node '{id}' does not exist")))?;
                    let mut affected = AffectedSet::node(id.clone());
                    if *detach {
                        for edge in graph.get_edges_for_node(id, Direction::Both) {
                            graph.remove_edge(&edge.source, &edge.target, &edge.label);
                            affected.edges.push((edge.source, edge.target, edge.label));
                        }
                    }
                    graph.remove_node(id);
                    Ok((Inverse::RecreateNode(node), affected))
                }
                TargetKind::Edge(s, t, l) => {
                    let edge = graph
                        .get_edge(s, t, l)
                        .ok_or_else(|| Error::Runtime(format!("relationship '{s}-[{l}]->{t}' does not exist")))?;
                    graph.remove_edge(s, t, l);
                    Ok((
                        Inverse::RecreateEdge(edge),
                        AffectedSet::edge(s.clone(), t.clone(), l.clone()),
                    ))
                }
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Action::CreateNode { id, label, .. } => format!("CREATE ({id}:{label})"),
            Action::CreateRelationship {
                source,
                target,
                label,
                ..
            } => format!("CREATE ({source})-[:{label}]->({target})"),
            Action::SetProperty {
                target_kind, key, ..
            } => format!("SET {}.{key}", describe_target(target_kind)),
            Action::Delete {
                target_kind,
                detach,
            } => {
                let prefix = if *detach { "DETACH DELETE" } else { "DELETE" };
                format!("{prefix} {}", describe_target(target_kind))
            }
        }
    }
}

fn describe_target(target: &TargetKind) -> String {
    match target {
        TargetKind::Node(id) => id.clone(),
        TargetKind::Edge(s, t, l) => format!("{s}-[:{l}]->{t}"),
    }
}

/// Read-only view of a graph as it would look after a prefix of a batch's
/// actions applied, without mutating anything. `Action::validate` takes a
/// `&G: Graph` directly, so upfront validation of the whole batch (step 1 of
/// `Executor::run`) would otherwise check a later action (e.g. a
/// relationship to a node created earlier in the same CREATE clause)
/// against the graph as it was *before the batch started*, rejecting
/// perfectly valid statements. This overlay answers existence queries as if
/// the already-validated prefix had actually run; `graph` itself is never
/// touched until the real execution pass.
struct ExistenceOverlay<'g, G: Graph> {
    graph: &'g G,
    created_nodes: HashSet<String>,
    deleted_nodes: HashSet<String>,
    created_edges: HashSet<(String, String, String)>,
    deleted_edges: HashSet<(String, String, String)>,
}

impl<'g, G: Graph> ExistenceOverlay<'g, G> {
    fn new(graph: &'g G) -> Self {
        ExistenceOverlay {
            graph,
            created_nodes: HashSet::new(),
            deleted_nodes: HashSet::new(),
            created_edges: HashSet::new(),
            deleted_edges: HashSet::new(),
        }
    }

    /// Records the hypothetical effect of `action`, assuming it just passed
    /// validation against this overlay.
    fn apply(&mut self, action: &Action) {
        match action {
            Action::CreateNode { id, .. } => {
                self.deleted_nodes.remove(id);
                self.created_nodes.insert(id.clone());
            }
            Action::CreateRelationship {
                source,
                target,
                label,
                ..
            } => {
                let key = (source.clone(), target.clone(), label.clone());
                self.deleted_edges.remove(&key);
                self.created_edges.insert(key);
            }
            Action::SetProperty { .. } => {}
            Action::Delete { target_kind, detach } => match target_kind {
                TargetKind::Node(id) => {
                    if *detach {
                        for edge in self.get_edges_for_node(id, Direction::Both) {
                            let key = (edge.source, edge.target, edge.label);
                            self.created_edges.remove(&key);
                            self.deleted_edges.insert(key);
                        }
                    }
                    self.created_nodes.remove(id);
                    self.deleted_nodes.insert(id.clone());
                }
                TargetKind::Edge(s, t, l) => {
                    let key = (s.clone(), t.clone(), l.clone());
                    self.created_edges.remove(&key);
                    self.deleted_edges.insert(key);
                }
            },
        }
    }
}

impl<'g, G: Graph> Graph for ExistenceOverlay<'g, G> {
    fn get_node(&self, id: &str) -> Option<NodeRecord> {
        self.graph.get_node(id)
    }
    fn add_node(&mut self, _id: &str, _label: &str, _data: PropertyMap) -> NodeRecord {
        unreachable!("overlay is read-only; used for validation only")
    }
    fn update_node_data(&mut self, _id: &str, _data: PropertyMap) {
        unreachable!("overlay is read-only; used for validation only")
    }
    fn remove_node(&mut self, _id: &str) {
        unreachable!("overlay is read-only; used for validation only")
    }
    fn has_node(&self, id: &str) -> bool {
        if self.deleted_nodes.contains(id) {
            return false;
        }
        self.created_nodes.contains(id) || self.graph.has_node(id)
    }
    fn get_edge(&self, source: &str, target: &str, label: &str) -> Option<EdgeRecord> {
        self.graph.get_edge(source, target, label)
    }
    fn add_edge(&mut self, _source: &str, _target: &str, _label: &str, _data: PropertyMap) -> EdgeRecord {
        unreachable!("overlay is read-only; used for validation only")
    }
    fn update_edge(&mut self, _source: &str, _target: &str, _label: &str, _data: PropertyMap) {
        unreachable!("overlay is read-only; used for validation only")
    }
    fn remove_edge(&mut self, _source: &str, _target: &str, _label: &str) {
        unreachable!("overlay is read-only; used for validation only")
    }
    fn has_edge(&self, source: &str, target: &str, label: &str) -> bool {
        let key = (source.to_string(), target.to_string(), label.to_string());
        if self.deleted_edges.contains(&key) {
            return false;
        }
        self.created_edges.contains(&key) || self.graph.has_edge(source, target, label)
    }
    fn get_edges_for_node(&self, id: &str, direction: Direction) -> Vec<EdgeRecord> {
        let mut edges: Vec<EdgeRecord> = self
            .graph
            .get_edges_for_node(id, direction)
            .into_iter()
            .filter(|e| !self.deleted_edges.contains(&e.key()))
            .collect();
        for (s, t, l) in &self.created_edges {
            let matches = match direction {
                Direction::Out => s == id,
                Direction::In => t == id,
                Direction::Both => s == id || t == id,
            };
            if matches {
                edges.push(EdgeRecord {
                    source: s.clone(),
                    target: t.clone(),
                    label: l.clone(),
                    data: PropertyMap::new(),
                });
            }
        }
        edges
    }
    fn find_nodes(&self, pred: &dyn Fn(&NodeRecord) -> bool) -> Vec<NodeRecord> {
        self.graph.find_nodes(pred)
    }
    fn find_edges(&self, pred: &dyn Fn(&EdgeRecord) -> bool) -> Vec<EdgeRecord> {
        self.graph.find_edges(pred)
    }
    fn get_all_nodes(&self) -> Vec<NodeRecord> {
        self.graph.get_all_nodes()
    }
    fn get_all_edges(&self) -> Vec<EdgeRecord> {
        self.graph.get_all_edges()
    }
}

/// The nodes/edges an action (or a whole run) touched, deduplicated at the
/// `ExecutionResult` level.
#[derive(Debug, Clone, Default)]
pub struct AffectedSet {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String, String)>,
}

impl AffectedSet {
    fn node(id: String) -> Self {
        AffectedSet {
            nodes: vec![id],
            edges: Vec::new(),
        }
    }

    fn edge(source: String, target: String, label: String) -> Self {
        AffectedSet {
            nodes: Vec::new(),
            edges: vec![(source, target, label)],
        }
    }

    fn extend(&mut self, other: AffectedSet) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExecutorOptions {
    pub validate_before_execute: bool,
    pub rollback_on_failure: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        ExecutorOptions {
            validate_before_execute: true,
            rollback_on_failure: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct ExecutionResult {
    pub affected_nodes: Vec<String>,
    pub affected_edges: Vec<(String, String, String)>,
    pub actions_applied: usize,
}

pub struct Executor {
    options: ExecutorOptions,
}

impl Executor {
    pub fn new(options: ExecutorOptions) -> Self {
        Executor { options }
    }

    /// Applies `actions` in order against `graph`. On failure, if
    /// `rollback_on_failure` is set, every already-applied action with a
    /// known inverse is undone in reverse order; `SetProperty` actions are
    /// left as-is since they have none (`spec.md` §9).
    pub fn run<G: Graph>(&self, graph: &mut G, actions: &[Action]) -> Result<ExecutionResult> {
        if self.options.validate_before_execute {
            let mut overlay = ExistenceOverlay::new(&*graph);
            for action in actions {
                action.validate(&overlay)?;
                overlay.apply(action);
            }
        }

        let mut applied: Vec<Inverse> = Vec::new();
        let mut result = ExecutionResult::default();

        for action in actions {
            match action.execute(graph) {
                Ok((inverse, affected)) => {
                    applied.push(inverse);
                    result.actions_applied += 1;
                    result.affected_nodes.extend(affected.nodes);
                    result.affected_edges.extend(affected.edges);
                }
                Err(err) => {
                    if self.options.rollback_on_failure {
                        rollback(graph, &applied);
                    }
                    return Err(err);
                }
            }
        }

        dedup(&mut result.affected_nodes);
        dedup_edges(&mut result.affected_edges);
        Ok(result)
    }
}

fn rollback<G: Graph>(graph: &mut G, applied: &[Inverse]) {
    for inverse in applied.iter().rev() {
        match inverse {
            Inverse::RemoveNode(id) => graph.remove_node(id),
            Inverse::RemoveEdge(s, t, l) => graph.remove_edge(s, t, l),
            Inverse::RecreateNode(node) => {
                graph.add_node(&node.id, &node.label, node.data.clone());
            }
            Inverse::RecreateEdge(edge) => {
                graph.add_edge(&edge.source, &edge.target, &edge.label, edge.data.clone());
            }
            Inverse::None => {}
        }
    }
}

fn dedup(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

fn dedup_edges(items: &mut Vec<(String, String, String)>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

/// Resolves a bound variable in a binding context to a concrete node id,
/// used when lowering CREATE/SET/DELETE clauses to `Action`s.
pub fn resolve_node_id(bindings: &BindingContext, var: &str) -> Option<String> {
    match bindings.get(var) {
        Some(Binding::Node(n)) => Some(n.id.clone()),
        _ => None,
    }
}

pub fn resolve_edge_key(bindings: &BindingContext, var: &str) -> Option<(String, String, String)> {
    match bindings.get(var) {
        Some(Binding::Edge(e)) => Some(e.key()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TestGraph {
        nodes: HashMap<String, NodeRecord>,
        edges: Vec<EdgeRecord>,
    }

    impl TestGraph {
        fn new() -> Self {
            TestGraph {
                nodes: HashMap::new(),
                edges: Vec::new(),
            }
        }
    }

    impl Graph for TestGraph {
        fn get_node(&self, id: &str) -> Option<NodeRecord> {
            self.nodes.get(id).cloned()
        }
        fn add_node(&mut self, id: &str, label: &str, data: PropertyMap) -> NodeRecord {
            let n = NodeRecord {
                id: id.to_string(),
                label: label.to_string(),
                data,
            };
            self.nodes.insert(id.to_string(), n.clone());
            n
        }
        fn update_node_data(&mut self, id: &str, data: PropertyMap) {
            if let Some(n) = self.nodes.get_mut(id) {
                n.data = data;
            }
        }
        fn remove_node(&mut self, id: &str) {
            self.nodes.remove(id);
        }
        fn has_node(&self, id: &str) -> bool {
            self.nodes.contains_key(id)
        }
        fn get_edge(&self, source: &str, target: &str, label: &str) -> Option<EdgeRecord> {
            self.edges
                .iter()
                .find(|e| e.source == source && e.target == target && e.label == label)
                .cloned()
        }
        fn add_edge(&mut self, source: &str, target: &str, label: &str, data: PropertyMap) -> EdgeRecord {
            let e = EdgeRecord {
                source: source.to_string(),
                target: target.to_string(),
                label: label.to_string(),
                data,
            };
            self.edges.push(e.clone());
            e
        }
        fn update_edge(&mut self, source: &str, target: &str, label: &str, data: PropertyMap) {
            if let Some(e) = self
                .edges
                .iter_mut()
                .find(|e| e.source == source && e.target == target && e.label == label)
            {
                e.data = data;
            }
        }
        fn remove_edge(&mut self, source: &str, target: &str, label: &str) {
            self.edges
                .retain(|e| !(e.source == source && e.target == target && e.label == label));
        }
        fn has_edge(&self, source: &str, target: &str, label: &str) -> bool {
            self.edges
                .iter()
                .any(|e| e.source == source && e.target == target && e.label == label)
        }
        fn get_edges_for_node(&self, id: &str, direction: Direction) -> Vec<EdgeRecord> {
            self.edges
                .iter()
                .filter(|e| match direction {
                    Direction::Out => e.source == id,
                    Direction::In => e.target == id,
                    Direction::Both => e.source == id || e.target == id,
                })
                .cloned()
                .collect()
        }
        fn find_nodes(&self, pred: &dyn Fn(&NodeRecord) -> bool) -> Vec<NodeRecord> {
            self.nodes.values().filter(|n| pred(n)).cloned().collect()
        }
        fn find_edges(&self, pred: &dyn Fn(&EdgeRecord) -> bool) -> Vec<EdgeRecord> {
            self.edges.iter().filter(|e| pred(e)).cloned().collect()
        }
        fn get_all_nodes(&self) -> Vec<NodeRecord> {
            self.nodes.values().cloned().collect()
        }
        fn get_all_edges(&self) -> Vec<EdgeRecord> {
            self.edges.clone()
        }
    }

    #[test]
    fn rollback_undoes_create_on_later_failure() {
        let mut graph = TestGraph::new();
        let executor = Executor::new(ExecutorOptions {
            validate_before_execute: false,
            rollback_on_failure: true,
        });
        let actions = vec![
            Action::CreateNode {
                id: "a".to_string(),
                label: "Person".to_string(),
                properties: PropertyMap::new(),
            },
            Action::CreateRelationship {
                source: "a".to_string(),
                target: "missing".to_string(),
                label: "KNOWS".to_string(),
                properties: PropertyMap::new(),
                variable: None,
            },
        ];
        let result = executor.run(&mut graph, &actions);
        assert!(result.is_err());
        assert!(!graph.has_node("a"));
    }

    #[test]
    fn validate_before_execute_accounts_for_earlier_actions_in_the_same_batch() {
        let mut graph = TestGraph::new();
        let executor = Executor::new(ExecutorOptions::default());
        let actions = vec![
            Action::CreateNode {
                id: "x".to_string(),
                label: "Person".to_string(),
                properties: PropertyMap::new(),
            },
            Action::CreateRelationship {
                source: "x".to_string(),
                target: "x".to_string(),
                label: "KNOWS".to_string(),
                properties: PropertyMap::new(),
                variable: None,
            },
        ];
        let result = executor.run(&mut graph, &actions).unwrap();
        assert_eq!(result.actions_applied, 2);
        assert!(graph.has_edge("x", "x", "KNOWS"));
    }

    #[test]
    fn validate_before_execute_still_rejects_a_genuine_duplicate_within_the_batch() {
        let mut graph = TestGraph::new();
        graph.add_node("a", "Person", PropertyMap::new());
        graph.add_node("b", "Person", PropertyMap::new());
        let executor = Executor::new(ExecutorOptions::default());
        let actions = vec![
            Action::CreateRelationship {
                source: "a".to_string(),
                target: "b".to_string(),
                label: "KNOWS".to_string(),
                properties: PropertyMap::new(),
                variable: None,
            },
            Action::CreateRelationship {
                source: "a".to_string(),
                target: "b".to_string(),
                label: "KNOWS".to_string(),
                properties: PropertyMap::new(),
                variable: None,
            },
        ];
        let result = executor.run(&mut graph, &actions);
        assert!(result.is_err());
        assert!(!graph.has_edge("a", "b", "KNOWS"));
    }

    #[test]
    fn detach_delete_removes_incident_edges_first() {
        let mut graph = TestGraph::new();
        graph.add_node("a", "Person", PropertyMap::new());
        graph.add_node("b", "Person", PropertyMap::new());
        graph.add_edge("a", "b", "KNOWS", PropertyMap::new());
        let executor = Executor::new(ExecutorOptions::default());
        let actions = vec![Action::Delete {
            target_kind: TargetKind::Node("a".to_string()),
            detach: true,
        }];
        let result = executor.run(&mut graph, &actions).unwrap();
        assert!(!graph.has_node("a"));
        assert!(!graph.has_edge("a", "b", "KNOWS"));
        assert_eq!(result.affected_edges.len(), 1);
    }

    #[test]
    fn delete_without_detach_rejects_node_with_edges() {
        let mut graph = TestGraph::new();
        graph.add_node("a", "Person", PropertyMap::new());
        graph.add_node("b", "Person", PropertyMap::new());
        graph.add_edge("a", "b", "KNOWS", PropertyMap::new());
        let executor = Executor::new(ExecutorOptions::default());
        let actions = vec![Action::Delete {
            target_kind: TargetKind::Node("a".to_string()),
            detach: false,
        }];
        assert!(executor.run(&mut graph, &actions).is_err());
        assert!(graph.has_node("a"));
    }

    use proptest::prelude::*;

    proptest! {
        /// `spec.md` §8 "Rollback soundness": whatever prefix of a batch
        /// already succeeded, a later failing action must leave the graph
        /// exactly as it was before the batch ran.
        #[test]
        fn a_failing_batch_leaves_the_graph_exactly_as_it_started(
            prefix_len in 0usize..6,
        ) {
            let mut graph = TestGraph::new();
            let mut actions: Vec<Action> = (0..prefix_len)
                .map(|i| Action::CreateNode {
                    id: format!("n{i}"),
                    label: "Person".to_string(),
                    properties: PropertyMap::new(),
                })
                .collect();
            // Guaranteed to fail: a relationship to a node nothing in this
            // batch (or the graph) ever creates.
            actions.push(Action::CreateRelationship {
                source: "n0".to_string(),
                target: "does-not-exist".to_string(),
                label: "KNOWS".to_string(),
                properties: PropertyMap::new(),
                variable: None,
            });
            if prefix_len == 0 {
                // No "n0" exists yet either; still a guaranteed failure, just
                // for a different reason (missing source instead of target).
            }

            let executor = Executor::new(ExecutorOptions {
                validate_before_execute: false,
                rollback_on_failure: true,
            });
            let result = executor.run(&mut graph, &actions);

            prop_assert!(result.is_err());
            prop_assert_eq!(graph.get_all_nodes().len(), 0);
            prop_assert_eq!(graph.get_all_edges().len(), 0);
        }
    }
}
