//! Hierarchical binding contexts. A child context is a lookup *view* over
//! its parent, not a copy: reads fall back to the parent chain, writes only
//! ever land in the topmost frame. See `spec.md` §3, §9 "Hierarchical
//! bindings".

use cygraph_api::{EdgeRecord, NodeRecord, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Anything a variable name can resolve to mid-statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(Value),
    Node(NodeRecord),
    Edge(EdgeRecord),
    /// The edges consumed by a variable-length relationship segment, in
    /// traversal order.
    EdgeList(Vec<EdgeRecord>),
}

impl Binding {
    /// The node this binding names, for matcher/executor code that needs a
    /// concrete `NodeRecord` (e.g. a CREATE endpoint).
    pub fn as_node(&self) -> Option<&NodeRecord> {
        match self {
            Binding::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&EdgeRecord> {
        match self {
            Binding::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// A value usable for equality/inequality comparison of the binding
    /// itself, as opposed to one of its properties: a plain value compares
    /// as itself, a node or edge compares by graph identity (id, or the
    /// source/target/label triple) rather than its data. This is what lets
    /// a bare `a <> b` between two pattern variables work (`spec.md` §8's
    /// NOT EXISTS guard scenario pairs it with `a <> b` to exclude
    /// self-pairs). `EdgeList` (a variable-length segment) has no single
    /// identity to compare.
    pub fn identity(&self) -> Option<Value> {
        match self {
            Binding::Value(v) => Some(v.clone()),
            Binding::Node(n) => Some(Value::String(format!("node:{}", n.id))),
            Binding::Edge(e) => Some(Value::String(format!(
                "edge:{}|{}|{}",
                e.source, e.target, e.label
            ))),
            Binding::EdgeList(_) => None,
        }
    }

    /// Property access resolves against a node, an edge, or — for a
    /// variable-length relationship — is undefined (`None`) since there is
    /// no single edge to read from.
    pub fn property(&self, name: &str) -> Option<Value> {
        match self {
            Binding::Node(n) => n.data.get(name).cloned(),
            Binding::Edge(e) => e.data.get(name).cloned(),
            Binding::Value(_) | Binding::EdgeList(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BindingContext {
    parent: Option<Rc<BindingContext>>,
    local: HashMap<String, Binding>,
}

impl BindingContext {
    pub fn new() -> Self {
        BindingContext {
            parent: None,
            local: HashMap::new(),
        }
    }

    /// Returns a child view: reads of names not set in the child fall back
    /// to this context, but nothing the child writes is visible here.
    pub fn create_child_context(&self) -> BindingContext {
        BindingContext {
            parent: Some(Rc::new(self.clone())),
            local: HashMap::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Binding) {
        self.local.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.local
            .get(name)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(name)))
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All variable names visible from this context, parent chain
    /// included.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names: std::collections::BTreeSet<String> = self.local.keys().cloned().collect();
        if let Some(parent) = &self.parent {
            names.extend(parent.variable_names());
        }
        names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_reads_fall_back_to_parent() {
        let mut parent = BindingContext::new();
        parent.set("a", Binding::Value(Value::Number(1.0)));
        let child = parent.create_child_context();
        assert_eq!(child.get("a"), Some(&Binding::Value(Value::Number(1.0))));
    }

    #[test]
    fn child_writes_do_not_mutate_parent() {
        let parent = BindingContext::new();
        let mut child = parent.create_child_context();
        child.set("b", Binding::Value(Value::Bool(true)));
        assert!(!parent.has("b"));
        assert!(child.has("b"));
    }

    #[test]
    fn child_shadows_parent() {
        let mut parent = BindingContext::new();
        parent.set("a", Binding::Value(Value::Number(1.0)));
        let mut child = parent.create_child_context();
        child.set("a", Binding::Value(Value::Number(2.0)));
        assert_eq!(child.get("a"), Some(&Binding::Value(Value::Number(2.0))));
        assert_eq!(parent.get("a"), Some(&Binding::Value(Value::Number(1.0))));
    }

    #[test]
    fn node_identity_compares_by_id_not_data() {
        let same_id_different_data = Binding::Node(NodeRecord {
            id: "a".to_string(),
            label: "Person".to_string(),
            data: [("name".to_string(), Value::String("Ann".to_string()))]
                .into_iter()
                .collect(),
        });
        let other_node = Binding::Node(NodeRecord {
            id: "a".to_string(),
            label: "Person".to_string(),
            data: cygraph_api::PropertyMap::new(),
        });
        assert_eq!(same_id_different_data.identity(), other_node.identity());

        let different_id = Binding::Node(NodeRecord {
            id: "b".to_string(),
            label: "Person".to_string(),
            data: cygraph_api::PropertyMap::new(),
        });
        assert_ne!(same_id_different_data.identity(), different_id.identity());
    }

    #[test]
    fn edge_list_has_no_single_identity() {
        assert_eq!(Binding::EdgeList(Vec::new()).identity(), None);
    }

    #[test]
    fn variable_names_spans_parent_chain() {
        let mut parent = BindingContext::new();
        parent.set("a", Binding::Value(Value::Null));
        let mut child = parent.create_child_context();
        child.set("b", Binding::Value(Value::Null));
        let mut names = child.variable_names();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
