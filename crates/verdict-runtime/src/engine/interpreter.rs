//! Expression interpreter
//!
//! Evaluates `Expression` trees against a scope. The scope carries the root
//! context, the unary subject `$`, earlier node outputs (`$nodes`) and the
//! current closure element (`#`).

use super::functions;
use super::operators::{execute_arithmetic, execute_compare, execute_membership, execute_unary_op};
use crate::config::ZeroDivisionPolicy;
use crate::error::{Result, RuntimeError};
use verdict_core::ast::{Expression, Operator};
use verdict_core::types::Map;
use verdict_core::Value;

const SUBJECT: &str = "$";
const NODES: &str = "$nodes";

/// Names visible to an expression
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    root: &'a Value,
    subject: Option<&'a Value>,
    nodes: Option<&'a Value>,
    item: Option<&'a Value>,
}

impl<'a> Scope<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            subject: None,
            nodes: None,
            item: None,
        }
    }

    /// Bind `$`
    pub fn with_subject(mut self, subject: &'a Value) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Bind `$nodes`
    pub fn with_nodes(mut self, nodes: Option<&'a Value>) -> Self {
        self.nodes = nodes;
        self
    }

    pub(crate) fn with_item<'b>(self, item: &'b Value) -> Scope<'b>
    where
        'a: 'b,
    {
        Scope {
            root: self.root,
            subject: self.subject,
            nodes: self.nodes,
            item: Some(item),
        }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    fn lookup(&self, name: &str) -> Option<&'a Value> {
        match name {
            SUBJECT if self.subject.is_some() => self.subject,
            NODES if self.nodes.is_some() => self.nodes,
            _ => self.root.as_object().and_then(|map| map.get(name)),
        }
    }
}

/// Expression interpreter
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter {
    zero_division: ZeroDivisionPolicy,
}

impl Interpreter {
    pub fn new(zero_division: ZeroDivisionPolicy) -> Self {
        Self { zero_division }
    }

    /// Evaluate an expression to a value
    pub fn evaluate(&self, expr: &Expression, scope: Scope<'_>) -> Result<Value> {
        match expr {
            Expression::Literal { value, .. } => Ok(value.clone()),

            Expression::Identifier { name, position } => scope.lookup(name).cloned().ok_or_else(|| {
                RuntimeError::expression(*position, format!("Undefined variable '{}'", name))
            }),

            Expression::ClosureItem { position } => scope.item.cloned().ok_or_else(|| {
                RuntimeError::expression(*position, "'#' used outside of a closure")
            }),

            Expression::Member { object, property, .. } => {
                let object = self.evaluate(object, scope)?;
                Ok(member(&object, property))
            }

            Expression::Index { object, index, position } => {
                let object = self.evaluate(object, scope)?;
                let index = self.evaluate(index, scope)?;
                self.index(&object, &index, *position)
            }

            Expression::Binary { left, op, right, position } => {
                self.binary(left, *op, right, *position, scope)
            }

            Expression::Unary { op, operand, position } => {
                let operand = self.evaluate(operand, scope)?;
                execute_unary_op(&operand, *op, *position)
            }

            Expression::FunctionCall { name, args, position } => {
                functions::call(self, name, args, *position, scope)
            }

            Expression::Ternary {
                condition,
                true_expr,
                false_expr,
                ..
            } => {
                if self.evaluate_condition(condition, scope)? {
                    self.evaluate(true_expr, scope)
                } else {
                    self.evaluate(false_expr, scope)
                }
            }

            Expression::Array { items, .. } => items
                .iter()
                .map(|item| self.evaluate(item, scope))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),

            Expression::Object { entries, .. } => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), self.evaluate(value, scope)?);
                }
                Ok(Value::Object(map))
            }

            Expression::Interval {
                left,
                right,
                left_closed,
                right_closed,
                position,
            } => {
                let left = self.evaluate(left, scope)?;
                let right = self.evaluate(right, scope)?;
                interval_values(&left, &right, *left_closed, *right_closed, *position)
            }
        }
    }

    /// Evaluate an expression expected to be a boolean; `null` is false
    pub fn evaluate_condition(&self, expr: &Expression, scope: Scope<'_>) -> Result<bool> {
        match self.evaluate(expr, scope)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(RuntimeError::expression(
                expr.position(),
                format!("Expected a boolean condition, got {}", other.type_name()),
            )),
        }
    }

    /// Evaluate a parsed unary expression; the scope must bind `$`
    pub fn evaluate_unary(&self, expr: &Expression, scope: Scope<'_>) -> Result<bool> {
        if scope.subject.is_none() {
            return Err(RuntimeError::MissingSubject);
        }
        match self.evaluate(expr, scope)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::UnaryExpression(format!(
                "expected a boolean result, got {}",
                other.type_name()
            ))),
        }
    }

    fn binary(
        &self,
        left: &Expression,
        op: Operator,
        right: &Expression,
        position: usize,
        scope: Scope<'_>,
    ) -> Result<Value> {
        match op {
            Operator::And => {
                let result = self.evaluate_condition(left, scope)? && self.evaluate_condition(right, scope)?;
                Ok(Value::Bool(result))
            }
            Operator::Or => {
                let result = self.evaluate_condition(left, scope)? || self.evaluate_condition(right, scope)?;
                Ok(Value::Bool(result))
            }
            Operator::Coalesce => match self.evaluate(left, scope)? {
                Value::Null => self.evaluate(right, scope),
                value => Ok(value),
            },
            Operator::In | Operator::NotIn => {
                let needle = self.evaluate(left, scope)?;
                let found = match right {
                    Expression::Interval {
                        left: low,
                        right: high,
                        left_closed,
                        right_closed,
                        position,
                    } => {
                        let low = self.evaluate(low, scope)?;
                        let high = self.evaluate(high, scope)?;
                        in_interval(&needle, &low, &high, *left_closed, *right_closed, *position)?
                    }
                    other => {
                        let haystack = self.evaluate(other, scope)?;
                        execute_membership(&needle, &haystack, position)?
                    }
                };
                Ok(Value::Bool(if op == Operator::In { found } else { !found }))
            }
            op if op.is_comparison() => {
                let left = self.evaluate(left, scope)?;
                let right = self.evaluate(right, scope)?;
                execute_compare(&left, op, &right, position).map(Value::Bool)
            }
            op => {
                let left = self.evaluate(left, scope)?;
                let right = self.evaluate(right, scope)?;
                execute_arithmetic(&left, op, &right, self.zero_division, position)
            }
        }
    }

    fn index(&self, object: &Value, index: &Value, position: usize) -> Result<Value> {
        match (object, index) {
            (Value::Null, _) => Ok(Value::Null),
            (Value::Object(map), Value::String(key)) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
            (Value::Array(items), Value::Number(_)) => {
                let i = normalize_index(index, items.len(), position)?;
                Ok(i.and_then(|i| items.get(i)).cloned().unwrap_or(Value::Null))
            }
            (Value::String(text), Value::Number(_)) => {
                let chars: Vec<char> = text.chars().collect();
                let i = normalize_index(index, chars.len(), position)?;
                Ok(i.and_then(|i| chars.get(i))
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Null))
            }
            _ => Err(RuntimeError::expression(
                position,
                format!("Cannot index {} with {}", object.type_name(), index.type_name()),
            )),
        }
    }
}

fn member(object: &Value, property: &str) -> Value {
    match object {
        Value::Object(map) => map.get(property).cloned().unwrap_or(Value::Null),
        Value::Array(items) => property
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Resolve a possibly negative index; out of range yields `None`
fn normalize_index(index: &Value, len: usize, position: usize) -> Result<Option<usize>> {
    let Some(i) = index.as_integer() else {
        return Err(RuntimeError::expression(position, format!("Index {} is not an integer", index)));
    };
    let resolved = if i < 0 { len as i64 + i } else { i };
    Ok((0..len as i64).contains(&resolved).then_some(resolved as usize))
}

fn in_interval(
    needle: &Value,
    low: &Value,
    high: &Value,
    left_closed: bool,
    right_closed: bool,
    position: usize,
) -> Result<bool> {
    if needle.is_null() {
        return Ok(false);
    }
    let lower = if left_closed { Operator::Ge } else { Operator::Gt };
    let upper = if right_closed { Operator::Le } else { Operator::Lt };
    Ok(execute_compare(needle, lower, low, position)? && execute_compare(needle, upper, high, position)?)
}

/// Upper bound on the integers an interval may expand to
const MAX_INTERVAL_VALUES: i64 = 100_000;

/// An interval used as a value expands to the integers it contains
fn interval_values(low: &Value, high: &Value, left_closed: bool, right_closed: bool, position: usize) -> Result<Value> {
    let (Some(mut start), Some(mut end)) = (low.as_integer(), high.as_integer()) else {
        return Err(RuntimeError::expression(
            position,
            "Interval bounds must be integers to be used as a value",
        ));
    };
    if !left_closed {
        start = start.saturating_add(1);
    }
    if !right_closed {
        end = end.saturating_sub(1);
    }
    if end.saturating_sub(start) >= MAX_INTERVAL_VALUES {
        return Err(RuntimeError::expression(
            position,
            format!("Interval expands to more than {} values", MAX_INTERVAL_VALUES),
        ));
    }
    Ok(Value::Array((start..=end).map(|n| Value::Number(n as f64)).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_parser::{ExpressionParser, UnaryParser};

    fn eval(source: &str, context: serde_json::Value) -> Result<Value> {
        let expr = ExpressionParser::parse(source).unwrap();
        let context = Value::from(context);
        Interpreter::default().evaluate(&expr, Scope::new(&context))
    }

    fn unary(source: &str, subject: serde_json::Value) -> Result<bool> {
        let expr = UnaryParser::parse(source).unwrap().unwrap();
        let context = Value::object();
        let subject = Value::from(subject);
        Interpreter::default().evaluate_unary(&expr, Scope::new(&context).with_subject(&subject))
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        assert_eq!(eval("1 + 2 * 3", json!({})).unwrap(), Value::from(7));
        assert_eq!(eval("(1 + 2) * 3", json!({})).unwrap(), Value::from(9));
        assert_eq!(eval("2 ^ 3 ^ 2", json!({})).unwrap(), Value::from(512));
        assert_eq!(eval("-a + 10", json!({"a": 4})).unwrap(), Value::from(6));
    }

    #[test]
    fn test_member_and_index() {
        let ctx = json!({"customer": {"tags": ["a", "b", "c"], "age": 30}});
        assert_eq!(eval("customer.age", ctx.clone()).unwrap(), Value::from(30));
        assert_eq!(eval("customer.tags[-1]", ctx.clone()).unwrap(), Value::from("c"));
        assert_eq!(eval("customer['age']", ctx.clone()).unwrap(), Value::from(30));
        assert_eq!(eval("customer.missing.deeper", ctx.clone()).unwrap(), Value::Null);
        assert_eq!(eval("customer.tags[10]", ctx).unwrap(), Value::Null);
    }

    #[test]
    fn test_undefined_variable() {
        let err = eval("1 + missing", json!({})).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::Expression {
                position: 4,
                message: "Undefined variable 'missing'".to_string()
            }
        );
    }

    #[test]
    fn test_logic_short_circuits() {
        assert_eq!(eval("false and missing", json!({})).unwrap(), Value::Bool(false));
        assert_eq!(eval("true or missing", json!({})).unwrap(), Value::Bool(true));
        assert!(eval("1 and true", json!({})).is_err());
    }

    #[test]
    fn test_membership_and_intervals() {
        assert_eq!(eval("5 in [1..5]", json!({})).unwrap(), Value::Bool(true));
        assert_eq!(eval("5 in [1..5)", json!({})).unwrap(), Value::Bool(false));
        assert_eq!(eval("'b' not in ['a', 'b']", json!({})).unwrap(), Value::Bool(false));
        assert_eq!(eval("'k' in {k: 1}", json!({})).unwrap(), Value::Bool(true));
        assert_eq!(
            eval("(0..3]", json!({})).unwrap(),
            Value::Array(vec![Value::from(1), Value::from(2), Value::from(3)])
        );
    }

    #[test]
    fn test_interval_value_is_bounded() {
        let largest = eval("[1..100000]", json!({})).unwrap();
        assert_eq!(largest.as_array().map(Vec::len), Some(100_000));

        let err = eval("[0..1000000000000000]", json!({})).unwrap_err();
        assert!(matches!(err, RuntimeError::Expression { .. }));
        assert!(eval("[0..100000]", json!({})).is_err());
    }

    #[test]
    fn test_ternary_and_coalesce() {
        assert_eq!(eval("a > 1 ? 'big' : 'small'", json!({"a": 3})).unwrap(), Value::from("big"));
        assert_eq!(eval("a.b ?? 'fallback'", json!({"a": {}})).unwrap(), Value::from("fallback"));
    }

    #[test]
    fn test_object_literal() {
        assert_eq!(
            eval("{total: a * 2, label: 'x'}", json!({"a": 2})).unwrap(),
            Value::from(json!({"total": 4, "label": "x"}))
        );
    }

    #[test]
    fn test_division_policy() {
        let expr = ExpressionParser::parse("1 / 0").unwrap();
        let ctx = Value::object();
        assert!(Interpreter::default().evaluate(&expr, Scope::new(&ctx)).is_err());
        assert_eq!(
            Interpreter::new(ZeroDivisionPolicy::Null)
                .evaluate(&expr, Scope::new(&ctx))
                .unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_unary_evaluation() {
        assert!(unary("'FR', 'ES', 'GB'", json!("GB")).unwrap());
        assert!(!unary("'FR', 'ES', 'GB'", json!("DE")).unwrap());
        assert!(unary("[10..20]", json!(15)).unwrap());
        assert!(unary("> 10 and < 20", json!(12)).unwrap());
        assert!(!unary("not in [1, 2]", json!(2)).unwrap());
        assert!(unary("$ > 1 and $ < 5", json!(3)).unwrap());
    }

    #[test]
    fn test_unary_requires_subject() {
        let expr = UnaryParser::parse("> 1").unwrap().unwrap();
        let ctx = Value::object();
        assert_eq!(
            Interpreter::default().evaluate_unary(&expr, Scope::new(&ctx)),
            Err(RuntimeError::MissingSubject)
        );
    }

    #[test]
    fn test_nodes_scope() {
        let expr = ExpressionParser::parse("$nodes.Pricing.fee + 1").unwrap();
        let ctx = Value::object();
        let nodes = Value::from(json!({"Pricing": {"fee": 2}}));
        let value = Interpreter::default()
            .evaluate(&expr, Scope::new(&ctx).with_nodes(Some(&nodes)))
            .unwrap();
        assert_eq!(value, Value::from(3));
    }
}
