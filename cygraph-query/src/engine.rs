//! Top-level query engine: tokenize, parse, match, lower to actions,
//! execute, aggregate. Grounded on the teacher's `query_api::execute`
//! entry point, which sequences its own lex/parse/plan/execute pipeline
//! behind one function callers embed against.

use crate::actions::{self, Action, ExecutionResult, Executor, ExecutorOptions, TargetKind};
use crate::ast::{CreateItem, DeleteClause, ReturnExpr, SetClause, Statement};
use crate::bindings::{Binding, BindingContext};
use crate::error::{Error, Result};
use crate::evaluator::{evaluate_expression, EvaluatorOptions};
use crate::matcher::{MatcherOptions, PatternMatcher};
use crate::parser::Parser;
use cygraph_api::{EdgeRecord, Graph, NodeRecord, PropertyMap, Value};

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub case_sensitive_labels: bool,
    pub enable_type_coercion: bool,
    pub max_path_depth: u32,
    pub max_path_results: usize,
    pub validate_before_execute: bool,
    pub rollback_on_failure: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            case_sensitive_labels: false,
            enable_type_coercion: false,
            max_path_depth: 10,
            max_path_results: 1000,
            validate_before_execute: true,
            rollback_on_failure: true,
        }
    }
}

impl EngineOptions {
    fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            case_sensitive_labels: self.case_sensitive_labels,
            enable_type_coercion: self.enable_type_coercion,
            max_path_depth: self.max_path_depth,
            max_path_results: self.max_path_results,
        }
    }

    fn evaluator_options(&self) -> EvaluatorOptions {
        EvaluatorOptions {
            enable_type_coercion: self.enable_type_coercion,
        }
    }

    fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            validate_before_execute: self.validate_before_execute,
            rollback_on_failure: self.rollback_on_failure,
        }
    }
}

/// Outcome of a single `execute_query` call.
#[derive(Debug, Default)]
pub struct QueryResult {
    pub success: bool,
    pub match_count: usize,
    pub bindings: Vec<BindingContext>,
    pub actions_applied: usize,
    pub affected_nodes: Vec<String>,
    pub affected_edges: Vec<(String, String, String)>,
    pub parse_errors: Vec<String>,
    pub error: Option<String>,
}

pub struct QueryEngine {
    options: EngineOptions,
}

impl Default for QueryEngine {
    fn default() -> Self {
        QueryEngine::new(EngineOptions::default())
    }
}

impl QueryEngine {
    pub fn new(options: EngineOptions) -> Self {
        QueryEngine { options }
    }

    /// Runs the full pipeline: tokenize (implicitly, inside `Parser::parse`)
    /// → parse → match (if a MATCH clause is present) → lower CREATE/SET/
    /// DELETE to `Action`s per binding context → execute → aggregate.
    pub fn execute_query<G: Graph>(&self, graph: &mut G, text: &str) -> QueryResult {
        let (statement, parse_errors) = Parser::parse(text);
        if !parse_errors.is_empty() {
            return QueryResult {
                success: false,
                parse_errors,
                error: Some("query could not be parsed".to_string()),
                ..Default::default()
            };
        }

        let mut matcher = PatternMatcher::new(self.options.matcher_options());
        let eval_options = self.options.evaluator_options();

        let binding_contexts = match &statement.r#match {
            Some(clause) => {
                let condition = statement.r#where.as_ref().map(|w| &w.condition);
                match matcher.execute_match(graph, &clause.patterns, condition, &eval_options) {
                    Ok(contexts) => contexts,
                    Err(err) => {
                        return QueryResult {
                            success: false,
                            parse_errors,
                            error: Some(err.to_string()),
                            ..Default::default()
                        };
                    }
                }
            }
            None => vec![BindingContext::new()],
        };

        // Variable declarations are a property of the query's static shape
        // (which variables MATCH/CREATE introduce), not of how many rows it
        // happened to match, so this runs even when `binding_contexts` is
        // empty: a zero-match MATCH still catches a SET/DELETE/RETURN that
        // references a variable the query never declares.
        if let Err(err) = self.validate_variables(&statement, &binding_contexts) {
            return QueryResult {
                success: false,
                parse_errors,
                error: Some(err.to_string()),
                ..Default::default()
            };
        }

        if binding_contexts.is_empty() && statement.r#match.is_some() {
            return QueryResult {
                success: true,
                match_count: 0,
                parse_errors,
                ..Default::default()
            };
        }

        let executor = Executor::new(self.options.executor_options());
        let mut total = ExecutionResult::default();
        let mut anon_counter = 0usize;

        for ctx in &binding_contexts {
            let actions = match self.lower(graph, &statement, ctx, &mut matcher, &eval_options, &mut anon_counter) {
                Ok(actions) => actions,
                Err(err) => {
                    return QueryResult {
                        success: false,
                        match_count: binding_contexts.len(),
                        bindings: binding_contexts,
                        parse_errors,
                        error: Some(err.to_string()),
                        ..Default::default()
                    };
                }
            };
            if actions.is_empty() {
                continue;
            }
            match executor.run(graph, &actions) {
                Ok(result) => {
                    total.actions_applied += result.actions_applied;
                    total.affected_nodes.extend(result.affected_nodes);
                    total.affected_edges.extend(result.affected_edges);
                }
                Err(err) => {
                    return QueryResult {
                        success: false,
                        match_count: binding_contexts.len(),
                        bindings: binding_contexts,
                        actions_applied: total.actions_applied,
                        affected_nodes: total.affected_nodes,
                        affected_edges: total.affected_edges,
                        parse_errors,
                        error: Some(err.to_string()),
                    };
                }
            }
        }

        dedup(&mut total.affected_nodes);
        dedup_edges(&mut total.affected_edges);

        QueryResult {
            success: true,
            match_count: binding_contexts.len(),
            actions_applied: total.actions_applied,
            affected_nodes: total.affected_nodes,
            affected_edges: total.affected_edges,
            bindings: binding_contexts,
            parse_errors,
            error: None,
        }
    }

    /// Every variable referenced by WHERE/SET/DELETE/RETURN must already be
    /// declared by MATCH or CREATE before it is executed, per `spec.md` §3
    /// Invariants.
    fn validate_variables(&self, statement: &Statement, contexts: &[BindingContext]) -> Result<()> {
        let declared = |name: &str| -> bool {
            if let Some(clause) = &statement.r#match {
                if clause.patterns.iter().any(|p| p.variables().iter().any(|v| v == name)) {
                    return true;
                }
            }
            if let Some(create) = &statement.create {
                for item in &create.items {
                    match item {
                        CreateItem::Node(n) => {
                            if n.variable.as_deref() == Some(name) {
                                return true;
                            }
                        }
                        CreateItem::Rel { from, to, rel } => {
                            if from == name || to == name {
                                return true;
                            }
                            if rel.variable.as_deref() == Some(name) {
                                return true;
                            }
                        }
                    }
                }
            }
            contexts.iter().any(|c| c.has(name))
        };

        if let Some(SetClause { settings }) = &statement.set {
            for item in settings {
                if !declared(&item.target) {
                    return Err(Error::Semantic(format!(
                        "SET references undeclared variable '{}'",
                        item.target
                    )));
                }
            }
        }
        if let Some(DeleteClause { vars, .. }) = &statement.delete {
            for var in vars {
                if !declared(var) {
                    return Err(Error::Semantic(format!(
                        "DELETE references undeclared variable '{var}'"
                    )));
                }
            }
        }
        if let Some(clause) = &statement.r#return {
            for item in &clause.items {
                let name = match &item.expr {
                    ReturnExpr::Variable(v) => v,
                    ReturnExpr::Property { object, .. } => object,
                };
                if !declared(name) {
                    return Err(Error::Semantic(format!(
                        "RETURN references undeclared variable '{name}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Lowers CREATE/SET/DELETE for one binding context into a concrete
    /// action list, in CREATE-then-SET-then-DELETE order (`spec.md` §5).
    fn lower<G: Graph>(
        &self,
        graph: &G,
        statement: &Statement,
        ctx: &BindingContext,
        matcher: &mut PatternMatcher,
        eval_options: &EvaluatorOptions,
        anon_counter: &mut usize,
    ) -> Result<Vec<Action>> {
        let mut actions = Vec::new();
        let mut local = ctx.create_child_context();

        if let Some(create) = &statement.create {
            for item in &create.items {
                match item {
                    CreateItem::Node(pattern) => {
                        match &pattern.variable {
                            Some(var) if local.has(var) => {
                                actions::resolve_node_id(&local, var)
                                    .ok_or_else(|| Error::Runtime(format!("'{var}' is not a node")))?;
                            }
                            Some(var) => {
                                let id = synthesize_id(graph, anon_counter);
                                let label = pattern.label().unwrap_or("").to_string();
                                let properties = props_to_map(&pattern.properties);
                                actions.push(Action::CreateNode {
                                    id: id.clone(),
                                    label: label.clone(),
                                    properties: properties.clone(),
                                });
                                local.set(
                                    var.clone(),
                                    Binding::Node(NodeRecord {
                                        id: id.clone(),
                                        label,
                                        data: properties,
                                    }),
                                );
                            }
                            None => {
                                let id = synthesize_id(graph, anon_counter);
                                let label = pattern.label().unwrap_or("").to_string();
                                let properties = props_to_map(&pattern.properties);
                                actions.push(Action::CreateNode {
                                    id: id.clone(),
                                    label,
                                    properties,
                                });
                            }
                        }
                    }
                    CreateItem::Rel { from, rel, to } => {
                        let source = actions::resolve_node_id(&local, from)
                            .ok_or_else(|| Error::Semantic(format!("'{from}' is not a bound node")))?;
                        let target = actions::resolve_node_id(&local, to)
                            .ok_or_else(|| Error::Semantic(format!("'{to}' is not a bound node")))?;
                        let label = rel.rel_type.clone().unwrap_or_default();
                        let properties = props_to_map(&rel.properties);
                        actions.push(Action::CreateRelationship {
                            source: source.clone(),
                            target: target.clone(),
                            label: label.clone(),
                            properties: properties.clone(),
                            variable: rel.variable.clone(),
                        });
                        if let Some(var) = &rel.variable {
                            local.set(
                                var.clone(),
                                Binding::Edge(EdgeRecord {
                                    source,
                                    target,
                                    label,
                                    data: properties,
                                }),
                            );
                        }
                    }
                }
            }
        }

        if let Some(SetClause { settings }) = &statement.set {
            for item in settings {
                let value = evaluate_expression(graph, &item.value, &local, matcher, eval_options)
                    .ok_or_else(|| {
                        Error::Runtime(format!("SET value for '{}' is unbound", item.property))
                    })?;
                let target = if let Some(id) = actions::resolve_node_id(&local, &item.target) {
                    TargetKind::Node(id)
                } else if let Some(key) = actions::resolve_edge_key(&local, &item.target) {
                    TargetKind::Edge(key.0, key.1, key.2)
                } else {
                    return Err(Error::Semantic(format!(
                        "'{}' is not a bound node or relationship",
                        item.target
                    )));
                };
                actions.push(Action::SetProperty {
                    target_kind: target,
                    key: item.property.clone(),
                    value,
                });
            }
        }

        if let Some(DeleteClause { detach, vars }) = &statement.delete {
            for var in vars {
                let target = if let Some(id) = actions::resolve_node_id(&local, var) {
                    TargetKind::Node(id)
                } else if let Some(key) = actions::resolve_edge_key(&local, var) {
                    TargetKind::Edge(key.0, key.1, key.2)
                } else {
                    return Err(Error::Semantic(format!(
                        "'{var}' is not a bound node or relationship"
                    )));
                };
                actions.push(Action::Delete {
                    target_kind: target,
                    detach: *detach,
                });
            }
        }

        Ok(actions)
    }
}

/// Mints an id no node in `graph` currently holds. `counter` only needs to
/// avoid collisions within this statement (ids minted earlier in the same
/// CREATE are not in `graph` yet); the `has_node` check is what keeps ids
/// unique across separate `execute_query` calls against one persistent
/// graph, where a fresh `counter` starting back at 0 would otherwise repeat
/// an id an earlier call already used.
fn synthesize_id<G: Graph>(graph: &G, counter: &mut usize) -> String {
    loop {
        *counter += 1;
        let id = format!("_anon{counter}");
        if !graph.has_node(&id) {
            return id;
        }
    }
}

fn props_to_map(props: &[(String, Value)]) -> PropertyMap {
    props.iter().cloned().collect()
}

fn dedup(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

fn dedup_edges(items: &mut Vec<(String, String, String)>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
