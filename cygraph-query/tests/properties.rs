//! Randomized checks for the two testable invariants that are easiest to
//! state over an arbitrary-sized graph rather than one literal scenario:
//! Cartesian product growth across independent MATCH patterns, and the
//! unbound-variable guard rejecting a statement before it mutates anything.

mod support;

use cygraph_query::engine::QueryEngine;
use proptest::prelude::*;
use support::{prop, MemoryGraph};

fn build_bipartite(left: usize, right: usize) -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    for i in 0..left {
        graph = graph.with_node(&format!("l{i}"), "Left", prop(&[]));
    }
    for j in 0..right {
        graph = graph.with_node(&format!("r{j}"), "Right", prop(&[]));
    }
    graph
}

proptest! {
    /// `spec.md` §8 "Cartesian product": two comma-separated MATCH patterns
    /// over disjoint label sets produce exactly `|left| * |right|` paired
    /// bindings, with no predicate to cut the product down.
    #[test]
    fn comma_separated_patterns_multiply_their_match_counts(
        left in 0usize..5,
        right in 0usize..5,
    ) {
        let mut graph = build_bipartite(left, right);
        let engine = QueryEngine::default();
        let result = engine.execute_query(&mut graph, "MATCH (a:Left), (b:Right) RETURN a, b");

        prop_assert!(result.success, "{:?}", result.error);
        prop_assert_eq!(result.match_count, left * right);
        prop_assert_eq!(result.bindings.len(), left * right);
    }

    /// `spec.md` §8 "Unbound variable": a clause referencing a variable no
    /// MATCH pattern declares is a static error. Nothing it names should
    /// reach the graph.
    #[test]
    fn a_clause_referencing_an_undeclared_variable_never_mutates_the_graph(
        node_count in 0usize..4,
    ) {
        let mut graph = MemoryGraph::new();
        for i in 0..node_count {
            graph = graph.with_node(&format!("n{i}"), "Thing", prop(&[]));
        }
        let before_nodes = graph.get_all_nodes().len();
        let before_edges = graph.get_all_edges().len();

        let engine = QueryEngine::default();
        let result = engine.execute_query(
            &mut graph,
            "MATCH (a:Thing) SET phantom.flag = true",
        );

        prop_assert!(!result.success);
        prop_assert_eq!(graph.get_all_nodes().len(), before_nodes);
        prop_assert_eq!(graph.get_all_edges().len(), before_edges);
    }
}

#[test]
fn sanity_cartesian_product_of_two_and_three_is_six() {
    let mut graph = build_bipartite(2, 3);
    let engine = QueryEngine::default();
    let result = engine.execute_query(&mut graph, "MATCH (a:Left), (b:Right) RETURN a, b");
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.match_count, 6);
}
