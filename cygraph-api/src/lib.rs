//! Public API for cygraph: the [`Graph`] trait consumed by the query engine
//! and the value/record types that cross that boundary.
//!
//! This crate intentionally does not provide a `Graph` implementation.
//! `cygraph-query` is a query engine over *some* labeled property graph;
//! callers bring their own storage and implement [`Graph`] against it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A property value. Property maps only ever hold these shapes; lists are
/// read back from storage as-is and are never constructed by the query
/// language itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

pub type PropertyMap = BTreeMap<String, Value>;

/// A node as read from the graph: an opaque id, a single label, and its
/// property map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub data: PropertyMap,
}

/// An edge as read from the graph. Multi-edges between the same pair of
/// nodes are disambiguated by `(source, target, label)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub label: String,
    pub data: PropertyMap,
}

impl EdgeRecord {
    /// The `(source, target, label)` triple that uniquely identifies this
    /// edge among parallel edges connecting the same two nodes.
    pub fn key(&self) -> (String, String, String) {
        (self.source.clone(), self.target.clone(), self.label.clone())
    }
}

/// Direction relative to a given node, used when listing incident edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    Both,
}

/// The graph container the query engine is embedded over.
///
/// Implementations are free to back this however they like (in-memory maps,
/// an mmapped store, a remote service); the engine only ever calls through
/// this trait and never assumes anything about the underlying storage.
pub trait Graph {
    fn get_node(&self, id: &str) -> Option<NodeRecord>;
    fn add_node(&mut self, id: &str, label: &str, data: PropertyMap) -> NodeRecord;
    fn update_node_data(&mut self, id: &str, data: PropertyMap);
    fn remove_node(&mut self, id: &str);
    fn has_node(&self, id: &str) -> bool;

    fn get_edge(&self, source: &str, target: &str, label: &str) -> Option<EdgeRecord>;
    fn add_edge(&mut self, source: &str, target: &str, label: &str, data: PropertyMap) -> EdgeRecord;
    fn update_edge(&mut self, source: &str, target: &str, label: &str, data: PropertyMap);
    fn remove_edge(&mut self, source: &str, target: &str, label: &str);
    fn has_edge(&self, source: &str, target: &str, label: &str) -> bool;

    /// Edges incident to `id` in the given direction. `Direction::Both`
    /// returns each edge once, regardless of orientation.
    fn get_edges_for_node(&self, id: &str, direction: Direction) -> Vec<EdgeRecord>;

    fn find_nodes(&self, pred: &dyn Fn(&NodeRecord) -> bool) -> Vec<NodeRecord>;
    fn find_edges(&self, pred: &dyn Fn(&EdgeRecord) -> bool) -> Vec<EdgeRecord>;

    fn get_all_nodes(&self) -> Vec<NodeRecord>;
    fn get_all_edges(&self) -> Vec<EdgeRecord>;
}
