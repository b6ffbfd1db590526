//! Node/edge/path matching: label and relationship-type caches, the
//! variable-length path BFS with cycle avoidance, and `execute_match`,
//! which drives a MATCH/WHERE pair with per-pattern pushdown before the
//! Cartesian product.
//!
//! Grounded on the teacher's `Expand`/`ExpandVariable` handling in its
//! executor, cross-checked against the BFS shape in
//! `other_examples/57657f6d_relateby-pattern-rs__crates-pattern-core-src-graph-graph_query.rs.rs`
//! for the cycle-avoidance rule. The label/rel-type caches have no teacher
//! counterpart (the teacher resolves labels through its own storage
//! layer's id tables).

use crate::ast::{NodePattern, PathPattern, RelDirection, RelationshipPattern};
use crate::bindings::{Binding, BindingContext};
use crate::error::{Error, Result};
use crate::evaluator::{self, evaluate_condition, free_variables, values_equal, EvaluatorOptions};
use cygraph_api::{Direction, EdgeRecord, Graph, NodeRecord, Value};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy)]
pub struct MatcherOptions {
    pub case_sensitive_labels: bool,
    pub enable_type_coercion: bool,
    pub max_path_depth: u32,
    pub max_path_results: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        MatcherOptions {
            case_sensitive_labels: false,
            enable_type_coercion: false,
            max_path_depth: 10,
            max_path_results: 1000,
        }
    }
}

/// One BFS result: the full node sequence traversed (intermediate hops of
/// a variable-length segment included) plus, per pattern segment, the
/// edges consumed and the index into `nodes` where that segment ends.
#[derive(Debug, Clone)]
pub struct MatchedPath {
    pub nodes: Vec<NodeRecord>,
    pub edge_segments: Vec<Vec<EdgeRecord>>,
    pub segment_end_index: Vec<usize>,
}

pub struct PatternMatcher {
    options: MatcherOptions,
    label_cache: HashMap<String, Vec<String>>,
    rel_type_cache: HashMap<String, Vec<(String, String, String)>>,
}

const BFS_ITERATION_CAP: u64 = 1_000_000;

impl PatternMatcher {
    pub fn new(options: MatcherOptions) -> Self {
        PatternMatcher {
            options,
            label_cache: HashMap::new(),
            rel_type_cache: HashMap::new(),
        }
    }

    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Drops both caches. The caller must call this whenever the
    /// underlying graph's set of labels/relationship types changes —
    /// property values are never cached, only ids, so this is the only
    /// staleness surface.
    pub fn clear_cache(&mut self) {
        self.label_cache.clear();
        self.rel_type_cache.clear();
    }

    fn normalize(&self, s: &str) -> String {
        if self.options.case_sensitive_labels {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }

    fn label_matches(&self, actual: &str, expected: &str) -> bool {
        if self.options.case_sensitive_labels {
            actual == expected
        } else {
            actual.to_lowercase() == expected.to_lowercase()
        }
    }

    fn get_nodes_by_label<G: Graph>(&mut self, graph: &G, label: &str) -> Vec<String> {
        let key = self.normalize(label);
        if let Some(ids) = self.label_cache.get(&key) {
            return ids.clone();
        }
        let case_sensitive = self.options.case_sensitive_labels;
        let label_owned = label.to_string();
        let ids: Vec<String> = graph
            .find_nodes(&|n: &NodeRecord| {
                if case_sensitive {
                    n.label == label_owned
                } else {
                    n.label.to_lowercase() == label_owned.to_lowercase()
                }
            })
            .into_iter()
            .map(|n| n.id)
            .collect();
        self.label_cache.insert(key, ids.clone());
        ids
    }

    fn get_edges_by_type<G: Graph>(&mut self, graph: &G, rel_type: &str) -> Vec<(String, String, String)> {
        let key = self.normalize(rel_type);
        if let Some(triples) = self.rel_type_cache.get(&key) {
            return triples.clone();
        }
        let case_sensitive = self.options.case_sensitive_labels;
        let type_owned = rel_type.to_string();
        let triples: Vec<(String, String, String)> = graph
            .find_edges(&|e: &EdgeRecord| {
                if case_sensitive {
                    e.label == type_owned
                } else {
                    e.label.to_lowercase() == type_owned.to_lowercase()
                }
            })
            .into_iter()
            .map(|e| e.key())
            .collect();
        self.rel_type_cache.insert(key, triples.clone());
        triples
    }

    pub fn matches_node_pattern(&self, node: &NodeRecord, pattern: &NodePattern) -> bool {
        if let Some(label) = pattern.label() {
            if !self.label_matches(&node.label, label) {
                return false;
            }
        }
        pattern.properties.iter().all(|(key, expected)| {
            node.data
                .get(key)
                .is_some_and(|actual| self.value_matches(actual, expected))
        })
    }

    pub fn find_matching_nodes<G: Graph>(&mut self, graph: &G, pattern: &NodePattern) -> Vec<NodeRecord> {
        let candidates = match pattern.label() {
            Some(label) => {
                let ids = self.get_nodes_by_label(graph, label);
                ids.iter().filter_map(|id| graph.get_node(id)).collect()
            }
            None => graph.get_all_nodes(),
        };
        candidates
            .into_iter()
            .filter(|n| self.matches_node_pattern(n, pattern))
            .collect()
    }

    pub fn matches_relationship_pattern(
        &self,
        edge: &EdgeRecord,
        pattern: &RelationshipPattern,
        src: Option<&str>,
        tgt: Option<&str>,
    ) -> bool {
        if let Some(rel_type) = &pattern.rel_type {
            if !self.label_matches(&edge.label, rel_type) {
                return false;
            }
        }
        if !pattern.properties.iter().all(|(key, expected)| {
            edge.data
                .get(key)
                .is_some_and(|actual| self.value_matches(actual, expected))
        }) {
            return false;
        }
        if let (Some(src), Some(tgt)) = (src, tgt) {
            let aligned = match pattern.direction {
                RelDirection::Out => edge.source == src && edge.target == tgt,
                RelDirection::In => edge.source == tgt && edge.target == src,
                RelDirection::Both => {
                    (edge.source == src && edge.target == tgt)
                        || (edge.source == tgt && edge.target == src)
                }
            };
            if !aligned {
                return false;
            }
        }
        true
    }

    pub fn find_matching_relationships<G: Graph>(
        &mut self,
        graph: &G,
        pattern: &RelationshipPattern,
        source: Option<&str>,
    ) -> Vec<EdgeRecord> {
        let candidates: Vec<EdgeRecord> = if let Some(src) = source {
            let direction = direction_of(pattern.direction);
            graph.get_edges_for_node(src, direction)
        } else if let Some(rel_type) = &pattern.rel_type {
            let triples = self.get_edges_by_type(graph, rel_type);
            triples
                .iter()
                .filter_map(|(s, t, l)| graph.get_edge(s, t, l))
                .collect()
        } else {
            graph.get_all_edges()
        };
        candidates
            .into_iter()
            .filter(|e| self.matches_relationship_pattern(e, pattern, None, None))
            .collect()
    }

    /// A scalar expected value matches a stored `List` if the list
    /// contains it (membership); otherwise strict equality, with optional
    /// coercion. List-vs-list comparison is unspecified and falls through
    /// to strict equality (`spec.md` §9, Open Questions).
    fn value_matches(&self, actual: &Value, expected: &Value) -> bool {
        if values_equal(actual, expected, self.options.enable_type_coercion) {
            return true;
        }
        if let Value::List(items) = actual {
            if !matches!(expected, Value::List(_)) {
                return items
                    .iter()
                    .any(|item| values_equal(item, expected, self.options.enable_type_coercion));
            }
        }
        false
    }

    /// Plain path matching with no pre-existing bindings to respect.
    pub fn find_matching_paths<G: Graph>(
        &mut self,
        graph: &G,
        pattern: &PathPattern,
        start_ids: Option<&[String]>,
    ) -> Result<Vec<MatchedPath>> {
        validate_pattern(pattern)?;
        self.bfs_paths(graph, pattern, start_ids, None)
    }

    /// `EXISTS`/`NOT EXISTS` evaluation: any pattern variable already bound
    /// in `bindings` constrains the search to that exact node, per
    /// `spec.md` §4.F.
    pub fn exists<G: Graph>(
        &mut self,
        graph: &G,
        pattern: &PathPattern,
        bindings: &BindingContext,
    ) -> Result<bool> {
        validate_pattern(pattern)?;
        let start_ids = bound_node_id(&pattern.start.variable, bindings).map(|id| vec![id]);
        let paths = self.bfs_paths(graph, pattern, start_ids.as_deref(), Some(bindings))?;
        Ok(!paths.is_empty())
    }

    fn bfs_paths<G: Graph>(
        &mut self,
        graph: &G,
        pattern: &PathPattern,
        start_ids: Option<&[String]>,
        outer: Option<&BindingContext>,
    ) -> Result<Vec<MatchedPath>> {
        let mut results = Vec::new();
        let mut starts = self.find_matching_nodes(graph, &pattern.start);
        if let Some(ids) = start_ids {
            let allowed: HashSet<&str> = ids.iter().map(String::as_str).collect();
            starts.retain(|n| allowed.contains(n.id.as_str()));
        }

        if pattern.segments.is_empty() {
            for node in starts {
                results.push(MatchedPath {
                    nodes: vec![node],
                    edge_segments: Vec::new(),
                    segment_end_index: Vec::new(),
                });
                if results.len() >= self.options.max_path_results {
                    break;
                }
            }
            return Ok(results);
        }

        let mut queue: VecDeque<PathState> = VecDeque::new();
        for node in starts {
            let mut visited = HashSet::new();
            visited.insert(node.id.clone());
            queue.push_back(PathState {
                nodes: vec![node],
                completed_segments: Vec::new(),
                segment_end_index: Vec::new(),
                current_segment_edges: Vec::new(),
                segment_index: 0,
                var_hop_count: 0,
                visited_in_path: visited,
            });
        }

        let mut iterations: u64 = 0;

        'bfs: while let Some(state) = queue.pop_front() {
            iterations += 1;
            if iterations > BFS_ITERATION_CAP || results.len() >= self.options.max_path_results {
                break;
            }

            let segment = &pattern.segments[state.segment_index];
            let rel_pattern = &segment.rel;
            let is_last_segment = state.segment_index + 1 == pattern.segments.len();
            let min = rel_pattern.min_hops;
            let max_traversal = rel_pattern
                .max_hops
                .unwrap_or(u32::MAX)
                .min(self.options.max_path_depth);

            let current = state.nodes.last().unwrap().clone();
            let candidate_edges = self.find_matching_relationships(graph, rel_pattern, Some(&current.id));

            for edge in candidate_edges {
                if results.len() >= self.options.max_path_results {
                    break 'bfs;
                }
                let neighbor_id = if edge.source == current.id {
                    edge.target.clone()
                } else {
                    edge.source.clone()
                };
                let Some(neighbor) = graph.get_node(&neighbor_id) else {
                    continue;
                };

                let hop_count = state.var_hop_count + 1;
                let is_revisit = state.visited_in_path.contains(&neighbor_id);
                let closes_to_start = is_revisit
                    && state
                        .nodes
                        .first()
                        .map(|n| n.id == neighbor_id)
                        .unwrap_or(false);
                if is_revisit && !closes_to_start {
                    continue;
                }

                let satisfies_node_pattern = self.matches_node_pattern(&neighbor, &segment.node)
                    && satisfies_bound_identity(&segment.node.variable, &neighbor.id, outer);

                if hop_count >= min && satisfies_node_pattern {
                    let mut nodes = state.nodes.clone();
                    nodes.push(neighbor.clone());
                    let mut finished_segment = state.current_segment_edges.clone();
                    finished_segment.push(edge.clone());
                    let mut completed = state.completed_segments.clone();
                    completed.push(finished_segment);
                    let mut ends = state.segment_end_index.clone();
                    ends.push(nodes.len() - 1);

                    if is_last_segment {
                        results.push(MatchedPath {
                            nodes,
                            edge_segments: completed,
                            segment_end_index: ends,
                        });
                    } else if !is_revisit {
                        queue.push_back(PathState {
                            nodes,
                            completed_segments: completed,
                            segment_end_index: ends,
                            current_segment_edges: Vec::new(),
                            segment_index: state.segment_index + 1,
                            var_hop_count: 0,
                            visited_in_path: extend_visited(&state.visited_in_path, &neighbor_id),
                        });
                    }
                }

                if is_revisit {
                    continue;
                }

                if rel_pattern.is_variable_length() && hop_count < max_traversal {
                    let mut nodes = state.nodes.clone();
                    nodes.push(neighbor.clone());
                    let mut current_segment_edges = state.current_segment_edges.clone();
                    current_segment_edges.push(edge.clone());
                    queue.push_back(PathState {
                        nodes,
                        completed_segments: state.completed_segments.clone(),
                        segment_end_index: state.segment_end_index.clone(),
                        current_segment_edges,
                        segment_index: state.segment_index,
                        var_hop_count: hop_count,
                        visited_in_path: extend_visited(&state.visited_in_path, &neighbor_id),
                    });
                }
            }
        }

        dedup_paths(&mut results);
        Ok(results)
    }

    /// `execute_match`: per-pattern pushdown, Cartesian product across
    /// comma-separated patterns, then the residual multi-variable filter.
    pub fn execute_match<G: Graph>(
        &mut self,
        graph: &G,
        patterns: &[PathPattern],
        where_clause: Option<&crate::ast::Expression>,
        options: &EvaluatorOptions,
    ) -> Result<Vec<BindingContext>> {
        for pattern in patterns {
            validate_pattern(pattern)?;
        }

        let declared: HashSet<String> = patterns.iter().flat_map(|p| p.variables()).collect();
        if let Some(cond) = where_clause {
            for v in free_variables(cond) {
                if !declared.contains(&v) {
                    return Err(Error::Semantic(format!(
                        "WHERE references undeclared variable '{v}'"
                    )));
                }
            }
        }

        let analysis = where_clause
            .map(evaluator::analyze_where)
            .unwrap_or_default();

        let mut per_pattern_bindings: Vec<Vec<BindingContext>> = Vec::new();
        for pattern in patterns {
            let pattern_var_set: HashSet<String> = pattern.variables().into_iter().collect();
            let relevant: Vec<&crate::ast::Expression> = analysis
                .single_var
                .iter()
                .filter(|(var, _)| pattern_var_set.contains(*var))
                .flat_map(|(_, exprs)| exprs.iter())
                .collect();

            let paths = self.bfs_paths(graph, pattern, None, None)?;
            let mut bindings_for_pattern = Vec::with_capacity(paths.len());
            for path in &paths {
                let ctx = path_to_bindings(pattern, path);
                let keep = relevant
                    .iter()
                    .all(|expr| evaluate_condition(graph, expr, &ctx, self, options));
                if keep {
                    bindings_for_pattern.push(ctx);
                }
            }
            if bindings_for_pattern.is_empty() {
                return Ok(Vec::new());
            }
            per_pattern_bindings.push(bindings_for_pattern);
        }

        let mut combined = cartesian_merge(per_pattern_bindings);

        let mut kept = Vec::with_capacity(combined.len());
        for ctx in combined.drain(..) {
            let ok = analysis
                .multi_var
                .iter()
                .all(|expr| evaluate_condition(graph, expr, &ctx, self, options));
            if ok {
                kept.push(ctx);
            }
        }

        let all_vars: Vec<String> = {
            let mut set: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
            for p in patterns {
                set.extend(p.variables());
            }
            set.into_iter().collect()
        };
        dedup_bindings(&mut kept, &all_vars);

        Ok(kept)
    }
}

fn direction_of(dir: RelDirection) -> Direction {
    match dir {
        RelDirection::Out => Direction::Out,
        RelDirection::In => Direction::In,
        RelDirection::Both => Direction::Both,
    }
}

fn extend_visited(visited: &HashSet<String>, id: &str) -> HashSet<String> {
    let mut next = visited.clone();
    next.insert(id.to_string());
    next
}

fn bound_node_id(var: &Option<String>, bindings: &BindingContext) -> Option<String> {
    let name = var.as_ref()?;
    bindings.get(name)?.as_node().map(|n| n.id.clone())
}

fn satisfies_bound_identity(var: &Option<String>, candidate_id: &str, outer: Option<&BindingContext>) -> bool {
    let (Some(var), Some(outer)) = (var, outer) else {
        return true;
    };
    match outer.get(var) {
        Some(Binding::Node(n)) => n.id == candidate_id,
        _ => true,
    }
}

fn validate_pattern(pattern: &PathPattern) -> Result<()> {
    let variable_length_segments = pattern
        .segments
        .iter()
        .filter(|s| s.rel.is_variable_length())
        .count();
    if variable_length_segments > 1 {
        return Err(Error::Semantic(
            "a path pattern may contain at most one variable-length relationship segment".to_string(),
        ));
    }
    Ok(())
}

fn path_to_bindings(pattern: &PathPattern, path: &MatchedPath) -> BindingContext {
    let mut ctx = BindingContext::new();
    if let Some(var) = &pattern.start.variable {
        ctx.set(var.clone(), Binding::Node(path.nodes[0].clone()));
    }
    for (i, segment) in pattern.segments.iter().enumerate() {
        if let Some(var) = &segment.rel.variable {
            let edges = &path.edge_segments[i];
            if segment.rel.is_variable_length() {
                ctx.set(var.clone(), Binding::EdgeList(edges.clone()));
            } else if let Some(edge) = edges.first() {
                ctx.set(var.clone(), Binding::Edge(edge.clone()));
            }
        }
        if let Some(var) = &segment.node.variable {
            let idx = path.segment_end_index[i];
            ctx.set(var.clone(), Binding::Node(path.nodes[idx].clone()));
        }
    }
    ctx
}

fn dedup_paths(paths: &mut Vec<MatchedPath>) {
    let mut seen = HashSet::new();
    paths.retain(|p| {
        let mut key = String::new();
        for n in &p.nodes {
            key.push_str("N:");
            key.push_str(&n.id);
            key.push(';');
        }
        for segment in &p.edge_segments {
            for e in segment {
                key.push_str("E:");
                key.push_str(&e.source);
                key.push(',');
                key.push_str(&e.target);
                key.push(',');
                key.push_str(&e.label);
                key.push(';');
            }
        }
        seen.insert(key)
    });
}

fn binding_key(ctx: &BindingContext, vars: &[String]) -> Vec<String> {
    vars.iter()
        .map(|v| match ctx.get(v) {
            Some(Binding::Node(n)) => format!("N:{}", n.id),
            Some(Binding::Edge(e)) => format!("E:{}:{}:{}", e.source, e.target, e.label),
            Some(Binding::EdgeList(edges)) => {
                let parts: Vec<String> = edges
                    .iter()
                    .map(|e| format!("{}:{}:{}", e.source, e.target, e.label))
                    .collect();
                format!("L:[{}]", parts.join(","))
            }
            Some(Binding::Value(v)) => format!("V:{v:?}"),
            None => "?".to_string(),
        })
        .collect()
}

fn dedup_bindings(bindings: &mut Vec<BindingContext>, vars: &[String]) {
    let mut seen = HashSet::new();
    bindings.retain(|ctx| seen.insert(binding_key(ctx, vars)));
}

fn cartesian_merge(lists: Vec<Vec<BindingContext>>) -> Vec<BindingContext> {
    let mut acc = vec![BindingContext::new()];
    for list in lists {
        let mut next = Vec::with_capacity(acc.len() * list.len().max(1));
        for a in &acc {
            for b in &list {
                let mut merged = a.clone();
                for name in b.variable_names() {
                    if let Some(binding) = b.get(&name) {
                        merged.set(name, binding.clone());
                    }
                }
                next.push(merged);
            }
        }
        acc = next;
    }
    acc
}

struct PathState {
    nodes: Vec<NodeRecord>,
    completed_segments: Vec<Vec<EdgeRecord>>,
    segment_end_index: Vec<usize>,
    current_segment_edges: Vec<EdgeRecord>,
    segment_index: usize,
    var_hop_count: u32,
    visited_in_path: HashSet<String>,
}
