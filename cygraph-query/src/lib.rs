//! A small, embeddable query engine for an in-memory labeled property
//! graph: a Cypher-shaped subset (MATCH/WHERE/CREATE/SET/DELETE/RETURN)
//! over whatever storage implements [`cygraph_api::Graph`].
//!
//! Pipeline: [`lexer`] → [`parser`] → [`matcher`] (with [`evaluator`]
//! predicate pushdown) → [`actions`] → [`engine`]. [`bindings`] is the
//! shared variable-binding state threaded through all of them.

pub mod actions;
pub mod ast;
pub mod bindings;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod matcher;
pub mod parser;

pub use actions::{Action, ExecutionResult, Executor, ExecutorOptions, TargetKind};
pub use bindings::{Binding, BindingContext};
pub use engine::{EngineOptions, QueryEngine, QueryResult};
pub use error::{Error, Result};
pub use matcher::{MatcherOptions, MatchedPath, PatternMatcher};
