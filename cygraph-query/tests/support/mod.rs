//! In-memory `Graph` implementation for driving integration tests.
//! Grounded on the `DbSnapshot` test adapter pattern in
//! `nervusdb-v2-query/tests/create_test.rs`: a small hand-written impl of
//! the graph trait that exists purely to drive tests, not shipped as
//! production storage.

#![allow(dead_code)]

use cygraph_api::{Direction, EdgeRecord, Graph, NodeRecord, PropertyMap};
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryGraph {
    nodes: HashMap<String, NodeRecord>,
    edges: Vec<EdgeRecord>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        MemoryGraph::default()
    }

    pub fn with_node(mut self, id: &str, label: &str, data: PropertyMap) -> Self {
        self.add_node(id, label, data);
        self
    }

    pub fn with_edge(mut self, source: &str, target: &str, label: &str, data: PropertyMap) -> Self {
        self.add_edge(source, target, label, data);
        self
    }
}

impl Graph for MemoryGraph {
    fn get_node(&self, id: &str) -> Option<NodeRecord> {
        self.nodes.get(id).cloned()
    }

    fn add_node(&mut self, id: &str, label: &str, data: PropertyMap) -> NodeRecord {
        let node = NodeRecord {
            id: id.to_string(),
            label: label.to_string(),
            data,
        };
        self.nodes.insert(id.to_string(), node.clone());
        node
    }

    fn update_node_data(&mut self, id: &str, data: PropertyMap) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.data = data;
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
        let edge = EdgeRecord {
            source: source.to_string(),
            target: target.to_string(),
            label: label.to_string(),
            data,
        };
        self.edges.push(edge.clone());
        edge
    }

    fn update_edge(&mut self, source: &str, target: &str, label: &str, data: PropertyMap) {
        if let Some(edge) = self
            .edges
            .iter_mut()
            .find(|e| e.source == source && e.target == target && e.label == label)
        {
            edge.data = data;
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

pub fn prop(pairs: &[(&str, cygraph_api::Value)]) -> PropertyMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}
