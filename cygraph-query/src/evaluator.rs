//! Expression evaluation and predicate-pushdown analysis.
//!
//! `evaluate_expression` mirrors the teacher's
//! `evaluate_expression_value`/`evaluate_expression_bool` split: one
//! function produces a `Value`, a thin wrapper coerces it to a `bool` for
//! clause guards. `analyze_where` has no teacher counterpart — it is built
//! directly from the free-variable walk in `spec.md` §4.F.

use crate::ast::{ComparisonOp, Expression, LogicalOp, PathPattern};
use crate::bindings::{Binding, BindingContext};
use crate::matcher::PatternMatcher;
use cygraph_api::{Graph, Value};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy)]
pub struct EvaluatorOptions {
    pub enable_type_coercion: bool,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        EvaluatorOptions {
            enable_type_coercion: false,
        }
    }
}

/// Evaluates an expression to a `Value`, or `None` when a variable or
/// property is unbound/absent.
pub fn evaluate_expression<G: Graph>(
    graph: &G,
    expr: &Expression,
    bindings: &BindingContext,
    matcher: &mut PatternMatcher,
    options: &EvaluatorOptions,
) -> Option<Value> {
    match expr {
        Expression::Literal(value) => Some(value.clone()),
        Expression::Variable(name) => bindings.get(name).and_then(Binding::identity),
        Expression::Property { object, name } => bindings.get(object)?.property(name),
        Expression::Comparison { left, op, right } => {
            let l = evaluate_expression(graph, left, bindings, matcher, options);
            let r = evaluate_expression(graph, right, bindings, matcher, options);
            Some(Value::Bool(compare(*op, l, r, options.enable_type_coercion)))
        }
        Expression::Logical { op, operands } => Some(Value::Bool(evaluate_logical(
            graph, op, operands, bindings, matcher, options,
        ))),
        Expression::Exists { positive, pattern } => {
            let found = matcher.exists(graph, pattern, bindings).unwrap_or(false);
            Some(Value::Bool(*positive == found))
        }
    }
}

/// The boolean-coerced form clause guards use: `None`/`Null`/falsy values
/// become `false`, never propagate as missing.
pub fn evaluate_condition<G: Graph>(
    graph: &G,
    expr: &Expression,
    bindings: &BindingContext,
    matcher: &mut PatternMatcher,
    options: &EvaluatorOptions,
) -> bool {
    match evaluate_expression(graph, expr, bindings, matcher, options) {
        Some(v) => truthy(&v),
        None => false,
    }
}

fn evaluate_logical<G: Graph>(
    graph: &G,
    op: &LogicalOp,
    operands: &[Expression],
    bindings: &BindingContext,
    matcher: &mut PatternMatcher,
    options: &EvaluatorOptions,
) -> bool {
    match op {
        LogicalOp::And => operands
            .iter()
            .all(|e| evaluate_condition(graph, e, bindings, matcher, options)),
        LogicalOp::Or => operands
            .iter()
            .any(|e| evaluate_condition(graph, e, bindings, matcher, options)),
        LogicalOp::Not => !evaluate_condition(graph, &operands[0], bindings, matcher, options),
        LogicalOp::Xor => {
            let trues = operands
                .iter()
                .filter(|e| evaluate_condition(graph, e, bindings, matcher, options))
                .count();
            trues % 2 == 1
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::List(items) => !items.is_empty(),
    }
}

fn compare(op: ComparisonOp, left: Option<Value>, right: Option<Value>, coerce: bool) -> bool {
    if matches!(op, ComparisonOp::IsNull | ComparisonOp::IsNotNull) {
        let is_null = matches!(left, None | Some(Value::Null));
        return if op == ComparisonOp::IsNull {
            is_null
        } else {
            !is_null
        };
    }
    let (Some(l), Some(r)) = (left, right) else {
        return false;
    };
    match op {
        ComparisonOp::Eq => values_equal(&l, &r, coerce),
        ComparisonOp::Ne => !values_equal(&l, &r, coerce),
        ComparisonOp::Lt | ComparisonOp::Le | ComparisonOp::Gt | ComparisonOp::Ge => {
            ordering(op, &l, &r, coerce)
        }
        ComparisonOp::In => in_op(&l, &r, coerce),
        ComparisonOp::Contains => contains_op(&l, &r),
        ComparisonOp::StartsWith => {
            matches!((&l, &r), (Value::String(a), Value::String(b)) if a.starts_with(b.as_str()))
        }
        ComparisonOp::EndsWith => {
            matches!((&l, &r), (Value::String(a), Value::String(b)) if a.ends_with(b.as_str()))
        }
        ComparisonOp::IsNull | ComparisonOp::IsNotNull => unreachable!(),
    }
}

pub(crate) fn values_equal(a: &Value, b: &Value, coerce: bool) -> bool {
    if a == b {
        return true;
    }
    if coerce {
        if let (Some(x), Some(y)) = (coerce_number(a), coerce_number(b)) {
            return x == y;
        }
        if let (Some(x), Some(y)) = (coerce_bool(a), coerce_bool(b)) {
            return x == y;
        }
    }
    false
}

pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) if *n == 0.0 => Some(false),
        Value::Number(n) if *n == 1.0 => Some(true),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

fn ordering(op: ComparisonOp, l: &Value, r: &Value, coerce: bool) -> bool {
    let as_number = |v: &Value| match v {
        Value::Number(n) => Some(*n),
        Value::String(s) if coerce => s.parse::<f64>().ok(),
        _ => None,
    };
    if let (Some(a), Some(b)) = (as_number(l), as_number(r)) {
        return match op {
            ComparisonOp::Lt => a < b,
            ComparisonOp::Le => a <= b,
            ComparisonOp::Gt => a > b,
            ComparisonOp::Ge => a >= b,
            _ => false,
        };
    }
    if let (Value::String(a), Value::String(b)) = (l, r) {
        return match op {
            ComparisonOp::Lt => a < b,
            ComparisonOp::Le => a <= b,
            ComparisonOp::Gt => a > b,
            ComparisonOp::Ge => a >= b,
            _ => false,
        };
    }
    false
}

fn in_op(l: &Value, r: &Value, coerce: bool) -> bool {
    match r {
        Value::List(items) => items.iter().any(|v| values_equal(l, v, coerce)),
        other => values_equal(l, other, coerce),
    }
}

fn contains_op(l: &Value, r: &Value) -> bool {
    match l {
        Value::String(s) => matches!(r, Value::String(sub) if s.contains(sub.as_str())),
        Value::List(items) => items.iter().any(|v| v == r),
        _ => false,
    }
}

/// The result of partitioning a WHERE condition for pushdown: predicates
/// whose free variables are a single name, and everything else (evaluated
/// only after the per-pattern Cartesian product).
#[derive(Debug, Clone, Default)]
pub struct PredicateAnalysis {
    pub single_var: HashMap<String, Vec<Expression>>,
    pub multi_var: Vec<Expression>,
}

pub fn analyze_where(cond: &Expression) -> PredicateAnalysis {
    let mut analysis = PredicateAnalysis::default();
    collect(cond, &mut analysis);
    analysis
}

fn collect(expr: &Expression, analysis: &mut PredicateAnalysis) {
    if let Expression::Logical {
        op: LogicalOp::And,
        operands,
    } = expr
    {
        for operand in operands {
            collect(operand, analysis);
        }
        return;
    }
    let vars = free_variables(expr);
    if vars.len() == 1 {
        let var = vars.into_iter().next().unwrap();
        analysis.single_var.entry(var).or_default().push(expr.clone());
    } else {
        analysis.multi_var.push(expr.clone());
    }
}

/// The free variables of an expression: a property access contributes its
/// object, EXISTS contributes every variable its pattern declares.
pub fn free_variables(expr: &Expression) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    walk_free_variables(expr, &mut out);
    out
}

fn walk_free_variables(expr: &Expression, out: &mut BTreeSet<String>) {
    match expr {
        Expression::Literal(_) => {}
        Expression::Variable(name) => {
            out.insert(name.clone());
        }
        Expression::Property { object, .. } => {
            out.insert(object.clone());
        }
        Expression::Comparison { left, right, .. } => {
            walk_free_variables(left, out);
            walk_free_variables(right, out);
        }
        Expression::Logical { operands, .. } => {
            for operand in operands {
                walk_free_variables(operand, out);
            }
        }
        Expression::Exists { pattern, .. } => {
            out.extend(path_pattern_variables(pattern));
        }
    }
}

fn path_pattern_variables(pattern: &PathPattern) -> Vec<String> {
    pattern.variables()
}
