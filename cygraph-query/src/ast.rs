//! AST produced by the parser. Tagged sum types throughout, per
//! `spec.md` §3 and the "tagged variants over class hierarchies" design
//! note (§9).

use cygraph_api::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statement {
    pub r#match: Option<MatchClause>,
    pub r#where: Option<WhereClause>,
    pub create: Option<CreateClause>,
    pub set: Option<SetClause>,
    pub delete: Option<DeleteClause>,
    pub r#return: Option<ReturnClause>,
}

impl Statement {
    pub fn empty() -> Self {
        Statement {
            r#match: None,
            r#where: None,
            create: None,
            set: None,
            delete: None,
            r#return: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchClause {
    pub patterns: Vec<PathPattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhereClause {
    pub condition: Expression,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateClause {
    pub items: Vec<CreateItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CreateItem {
    Node(NodePattern),
    Rel {
        from: String,
        rel: RelationshipPattern,
        to: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetClause {
    pub settings: Vec<SetItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetItem {
    pub target: String,
    pub property: String,
    pub value: Expression,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteClause {
    pub detach: bool,
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnClause {
    pub items: Vec<ReturnItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnItem {
    pub expr: ReturnExpr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ReturnExpr {
    Variable(String),
    Property { object: String, name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodePattern {
    pub variable: Option<String>,
    pub labels: Vec<String>,
    pub properties: Vec<(String, Value)>,
}

impl NodePattern {
    pub fn anonymous() -> Self {
        NodePattern {
            variable: None,
            labels: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.labels.first().map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RelDirection {
    Out,
    In,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipPattern {
    pub variable: Option<String>,
    pub rel_type: Option<String>,
    pub properties: Vec<(String, Value)>,
    pub direction: RelDirection,
    pub min_hops: u32,
    pub max_hops: Option<u32>,
}

impl RelationshipPattern {
    /// A non-variable-length hop: exactly one edge.
    pub fn single_hop(
        variable: Option<String>,
        rel_type: Option<String>,
        properties: Vec<(String, Value)>,
        direction: RelDirection,
    ) -> Self {
        RelationshipPattern {
            variable,
            rel_type,
            properties,
            direction,
            min_hops: 1,
            max_hops: Some(1),
        }
    }

    pub fn is_variable_length(&self) -> bool {
        !(self.min_hops == 1 && self.max_hops == Some(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathSegment {
    pub rel: RelationshipPattern,
    pub node: NodePattern,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathPattern {
    pub start: NodePattern,
    pub segments: Vec<PathSegment>,
}

impl PathPattern {
    /// All variable names (node and relationship) declared anywhere in
    /// this pattern.
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(v) = &self.start.variable {
            out.push(v.clone());
        }
        for seg in &self.segments {
            if let Some(v) = &seg.rel.variable {
                out.push(v.clone());
            }
            if let Some(v) = &seg.node.variable {
                out.push(v.clone());
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Expression {
    Literal(Value),
    Variable(String),
    Property {
        object: String,
        name: String,
    },
    Comparison {
        left: Box<Expression>,
        op: ComparisonOp,
        right: Box<Expression>,
    },
    Logical {
        op: LogicalOp,
        operands: Vec<Expression>,
    },
    Exists {
        positive: bool,
        pattern: PathPattern,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
    Xor,
}
