//! Built-in functions
//!
//! Closure functions (`all`, `some`, `none`, `one`, `map`, `filter`, `count`,
//! `flatMap`) receive their second argument unevaluated and run it once per
//! element with `#` bound to that element.
//!
//! Date functions take a unix timestamp in seconds or a date string and
//! return timestamps, so dates compare and subtract like any other number.

use super::dates::{self, DateUnit};
use super::interpreter::{Interpreter, Scope};
use crate::error::{Result, RuntimeError};
use chrono::{Datelike, NaiveDateTime, Timelike};
use regex::Regex;
use std::cmp::Ordering;
use verdict_core::ast::Expression;
use verdict_core::Value;

pub(crate) fn call(
    interpreter: &Interpreter,
    name: &str,
    args: &[Expression],
    position: usize,
    scope: Scope<'_>,
) -> Result<Value> {
    let call = Call {
        interpreter,
        name,
        args,
        position,
        scope,
    };

    match name {
        "all" | "some" | "none" | "one" | "map" | "filter" | "flatMap" => call.closure(),
        "count" if args.len() == 2 => call.closure(),
        _ => {
            let values = args
                .iter()
                .map(|arg| interpreter.evaluate(arg, scope))
                .collect::<Result<Vec<_>>>()?;
            call.eager(&values)
        }
    }
}

struct Call<'a> {
    interpreter: &'a Interpreter,
    name: &'a str,
    args: &'a [Expression],
    position: usize,
    scope: Scope<'a>,
}

impl Call<'_> {
    fn error(&self, message: impl std::fmt::Display) -> RuntimeError {
        RuntimeError::expression(self.position, format!("{}(): {}", self.name, message))
    }

    fn arity(&self, count: usize, min: usize, max: usize) -> Result<()> {
        if count < min || count > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{} to {}", min, max)
            };
            return Err(self.error(format!("expected {} arguments, got {}", expected, count)));
        }
        Ok(())
    }

    fn array<'v>(&self, value: &'v Value) -> Result<&'v [Value]> {
        match value {
            Value::Array(items) => Ok(items),
            other => Err(self.error(format!("expected an array, got {}", other.type_name()))),
        }
    }

    fn string<'v>(&self, value: &'v Value) -> Result<&'v str> {
        value
            .as_str()
            .ok_or_else(|| self.error(format!("expected a string, got {}", value.type_name())))
    }

    fn number(&self, value: &Value) -> Result<f64> {
        value
            .as_f64()
            .ok_or_else(|| self.error(format!("expected a number, got {}", value.type_name())))
    }

    fn date(&self, value: &Value) -> Result<NaiveDateTime> {
        dates::to_date_time(value).map_err(|e| self.error(e))
    }

    fn numbers(&self, values: &[Value]) -> Result<Vec<f64>> {
        let items = match values {
            [Value::Array(items)] => items.as_slice(),
            other => other,
        };
        items.iter().map(|v| self.number(v)).collect()
    }

    fn closure(&self) -> Result<Value> {
        self.arity(self.args.len(), 2, 2)?;
        let source = self.interpreter.evaluate(&self.args[0], self.scope)?;
        let items = match &source {
            Value::Null => &[][..],
            other => self.array(other)?,
        };
        let body = &self.args[1];

        let predicate = |item: &Value| -> Result<bool> {
            match self.interpreter.evaluate(body, self.scope.with_item(item))? {
                Value::Bool(b) => Ok(b),
                Value::Null => Ok(false),
                other => Err(self.error(format!("closure must return a boolean, got {}", other.type_name()))),
            }
        };

        let result = match self.name {
            "all" => Value::Bool(try_all(items, &predicate)?),
            "some" => Value::Bool(try_count(items, &predicate)? > 0),
            "none" => Value::Bool(try_count(items, &predicate)? == 0),
            "one" => Value::Bool(try_count(items, &predicate)? == 1),
            "count" => Value::from(try_count(items, &predicate)?),
            "filter" => {
                let mut kept = Vec::new();
                for item in items {
                    if predicate(item)? {
                        kept.push(item.clone());
                    }
                }
                Value::Array(kept)
            }
            "map" => Value::Array(
                items
                    .iter()
                    .map(|item| self.interpreter.evaluate(body, self.scope.with_item(item)))
                    .collect::<Result<Vec<_>>>()?,
            ),
            "flatMap" => {
                let mut flat = Vec::new();
                for item in items {
                    match self.interpreter.evaluate(body, self.scope.with_item(item))? {
                        Value::Array(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                Value::Array(flat)
            }
            _ => return Err(self.error("unknown function")),
        };
        Ok(result)
    }

    fn eager(&self, values: &[Value]) -> Result<Value> {
        let n = values.len();
        let result = match self.name {
            // Aggregates
            "sum" => {
                self.arity(n, 1, usize::MAX)?;
                Value::Number(self.numbers(values)?.iter().sum())
            }
            "avg" => {
                self.arity(n, 1, usize::MAX)?;
                let numbers = self.numbers(values)?;
                if numbers.is_empty() {
                    Value::Null
                } else {
                    Value::Number(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
            }
            "min" | "max" => {
                self.arity(n, 1, usize::MAX)?;
                let numbers = self.numbers(values)?;
                let pick = if self.name == "min" { f64::min } else { f64::max };
                numbers
                    .into_iter()
                    .reduce(pick)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            "median" => {
                self.arity(n, 1, usize::MAX)?;
                let mut numbers = self.numbers(values)?;
                numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                match numbers.len() {
                    0 => Value::Null,
                    len if len % 2 == 1 => Value::Number(numbers[len / 2]),
                    len => Value::Number((numbers[len / 2 - 1] + numbers[len / 2]) / 2.0),
                }
            }
            "count" | "len" => {
                self.arity(n, 1, 1)?;
                match &values[0] {
                    Value::Array(items) => Value::from(items.len()),
                    Value::String(text) => Value::from(text.chars().count()),
                    Value::Object(map) => Value::from(map.len()),
                    Value::Null => Value::from(0),
                    other => return Err(self.error(format!("cannot measure {}", other.type_name()))),
                }
            }
            "flatten" => {
                self.arity(n, 1, 1)?;
                let mut flat = Vec::new();
                for item in self.array(&values[0])? {
                    match item {
                        Value::Array(inner) => flat.extend(inner.iter().cloned()),
                        other => flat.push(other.clone()),
                    }
                }
                Value::Array(flat)
            }

            // Strings
            "upper" => {
                self.arity(n, 1, 1)?;
                Value::String(self.string(&values[0])?.to_uppercase())
            }
            "lower" => {
                self.arity(n, 1, 1)?;
                Value::String(self.string(&values[0])?.to_lowercase())
            }
            "trim" => {
                self.arity(n, 1, 1)?;
                Value::String(self.string(&values[0])?.trim().to_string())
            }
            "contains" => {
                self.arity(n, 2, 2)?;
                match (&values[0], &values[1]) {
                    (Value::String(text), Value::String(part)) => Value::Bool(text.contains(part.as_str())),
                    (Value::Array(items), needle) => Value::Bool(items.contains(needle)),
                    (Value::Null, _) => Value::Bool(false),
                    (other, _) => return Err(self.error(format!("cannot search {}", other.type_name()))),
                }
            }
            "startsWith" => {
                self.arity(n, 2, 2)?;
                Value::Bool(self.string(&values[0])?.starts_with(self.string(&values[1])?))
            }
            "endsWith" => {
                self.arity(n, 2, 2)?;
                Value::Bool(self.string(&values[0])?.ends_with(self.string(&values[1])?))
            }
            "matches" => {
                self.arity(n, 2, 2)?;
                let pattern = Regex::new(self.string(&values[1])?)
                    .map_err(|e| self.error(format!("invalid pattern: {}", e)))?;
                Value::Bool(pattern.is_match(self.string(&values[0])?))
            }
            "extract" => {
                self.arity(n, 2, 2)?;
                let pattern = Regex::new(self.string(&values[1])?)
                    .map_err(|e| self.error(format!("invalid pattern: {}", e)))?;
                let captures = pattern
                    .captures(self.string(&values[0])?)
                    .map(|groups| groups.iter().flatten().map(|m| Value::from(m.as_str())).collect())
                    .unwrap_or_default();
                Value::Array(captures)
            }
            "split" => {
                self.arity(n, 2, 2)?;
                let separator = self.string(&values[1])?;
                Value::Array(
                    self.string(&values[0])?
                        .split(separator)
                        .map(Value::from)
                        .collect(),
                )
            }
            "join" => {
                self.arity(n, 2, 2)?;
                let separator = self.string(&values[1])?;
                let parts: Vec<String> = self.array(&values[0])?.iter().map(|v| v.to_string()).collect();
                Value::String(parts.join(separator))
            }

            // Numbers
            "abs" => {
                self.arity(n, 1, 1)?;
                Value::Number(self.number(&values[0])?.abs())
            }
            "floor" => {
                self.arity(n, 1, 1)?;
                Value::Number(self.number(&values[0])?.floor())
            }
            "ceil" => {
                self.arity(n, 1, 1)?;
                Value::Number(self.number(&values[0])?.ceil())
            }
            "round" => {
                self.arity(n, 1, 2)?;
                let x = self.number(&values[0])?;
                let places = match values.get(1) {
                    Some(p) => self.number(p)?,
                    None => 0.0,
                };
                let factor = 10f64.powi(places as i32);
                Value::Number((x * factor).round() / factor)
            }
            "number" => {
                self.arity(n, 1, 1)?;
                match &values[0] {
                    Value::Number(x) => Value::Number(*x),
                    Value::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
                    Value::String(text) => text
                        .trim()
                        .parse::<f64>()
                        .map(Value::Number)
                        .map_err(|_| self.error(format!("'{}' is not a number", text)))?,
                    other => return Err(self.error(format!("cannot convert {} to a number", other.type_name()))),
                }
            }
            "isNumeric" => {
                self.arity(n, 1, 1)?;
                Value::Bool(match &values[0] {
                    Value::Number(_) => true,
                    Value::String(text) => text.trim().parse::<f64>().is_ok(),
                    _ => false,
                })
            }

            // Dates
            "date" => {
                self.arity(n, 1, 1)?;
                let date = self.date(&values[0])?;
                dates::timestamp(date)
            }
            "time" => {
                self.arity(n, 1, 1)?;
                match &values[0] {
                    Value::Number(seconds) => Value::Number(*seconds),
                    other => {
                        let time = dates::parse_time(self.string(other)?).map_err(|e| self.error(e))?;
                        Value::from(time.num_seconds_from_midnight() as i64)
                    }
                }
            }
            "duration" => {
                self.arity(n, 1, 1)?;
                match &values[0] {
                    Value::Number(seconds) => Value::Number(*seconds),
                    other => {
                        let seconds = dates::parse_duration(self.string(other)?).map_err(|e| self.error(e))?;
                        Value::Number(seconds as f64)
                    }
                }
            }
            "year" | "monthOfYear" | "dayOfMonth" | "dayOfWeek" | "dayOfYear" | "weekOfYear" => {
                self.arity(n, 1, 1)?;
                let date = self.date(&values[0])?;
                let part = match self.name {
                    "year" => date.year(),
                    "monthOfYear" => date.month() as i32,
                    "dayOfMonth" => date.day() as i32,
                    "dayOfWeek" => date.weekday().number_from_monday() as i32,
                    "dayOfYear" => date.ordinal() as i32,
                    _ => date.iso_week().week() as i32,
                };
                Value::from(part)
            }
            "monthString" => {
                self.arity(n, 1, 1)?;
                Value::String(self.date(&values[0])?.format("%b").to_string())
            }
            "weekdayString" => {
                self.arity(n, 1, 1)?;
                Value::String(self.date(&values[0])?.weekday().to_string())
            }
            "dateString" => {
                self.arity(n, 1, 1)?;
                Value::String(self.date(&values[0])?.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            "startOf" | "endOf" => {
                self.arity(n, 2, 2)?;
                let date = self.date(&values[0])?;
                let unit_name = self.string(&values[1])?;
                let unit = DateUnit::parse(unit_name)
                    .ok_or_else(|| self.error(format!("unknown date unit '{}'", unit_name)))?;
                let bound = if self.name == "startOf" {
                    dates::start_of(date, unit)
                } else {
                    dates::end_of(date, unit)
                };
                dates::timestamp(bound.ok_or_else(|| self.error("date is out of range"))?)
            }

            // Conversions and inspection
            "string" => {
                self.arity(n, 1, 1)?;
                Value::String(values[0].to_string())
            }
            "bool" => {
                self.arity(n, 1, 1)?;
                match &values[0] {
                    Value::String(text) if text.eq_ignore_ascii_case("false") => Value::Bool(false),
                    Value::String(text) if text.eq_ignore_ascii_case("true") => Value::Bool(true),
                    other => Value::Bool(other.is_truthy()),
                }
            }
            "type" => {
                self.arity(n, 1, 1)?;
                Value::from(values[0].type_name())
            }
            "keys" => {
                self.arity(n, 1, 1)?;
                match &values[0] {
                    Value::Object(map) => Value::Array(map.keys().map(|k| Value::from(k.as_str())).collect()),
                    Value::Array(items) => Value::Array((0..items.len()).map(Value::from).collect()),
                    other => return Err(self.error(format!("cannot list keys of {}", other.type_name()))),
                }
            }
            "values" => {
                self.arity(n, 1, 1)?;
                match &values[0] {
                    Value::Object(map) => Value::Array(map.values().cloned().collect()),
                    other => return Err(self.error(format!("cannot list values of {}", other.type_name()))),
                }
            }

            _ => {
                return Err(RuntimeError::expression(
                    self.position,
                    format!("Unknown function '{}'", self.name),
                ))
            }
        };

        if let Value::Number(x) = &result {
            if !x.is_finite() {
                return Err(self.error(format!("result {} is not a finite number", x)));
            }
        }

        tracing::debug!(function = self.name, "evaluated built-in");
        Ok(result)
    }
}

fn try_all(items: &[Value], predicate: &impl Fn(&Value) -> Result<bool>) -> Result<bool> {
    for item in items {
        if !predicate(item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn try_count(items: &[Value], predicate: &impl Fn(&Value) -> Result<bool>) -> Result<usize> {
    let mut count = 0;
    for item in items {
        if predicate(item)? {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_parser::ExpressionParser;

    fn eval(source: &str, context: serde_json::Value) -> Result<Value> {
        let expr = ExpressionParser::parse(source).unwrap();
        let context = Value::from(context);
        Interpreter::default().evaluate(&expr, Scope::new(&context))
    }

    fn ok(source: &str, context: serde_json::Value) -> serde_json::Value {
        eval(source, context).unwrap().into()
    }

    #[test]
    fn test_aggregates() {
        let ctx = json!({"a": [1, 2, 3, 4]});
        assert_eq!(ok("sum(a)", ctx.clone()), json!(10));
        assert_eq!(ok("avg(a)", ctx.clone()), json!(2.5));
        assert_eq!(ok("min(a)", ctx.clone()), json!(1));
        assert_eq!(ok("max(3, 9, 4)", json!({})), json!(9));
        assert_eq!(ok("median(a)", ctx.clone()), json!(2.5));
        assert_eq!(ok("count(a)", ctx), json!(4));
        assert_eq!(ok("sum([])", json!({})), json!(0));
        assert_eq!(ok("avg([])", json!({})), json!(null));
    }

    #[test]
    fn test_closures() {
        let ctx = json!({"items": [{"qty": 2, "price": 5}, {"qty": 0, "price": 7}, {"qty": 1, "price": 3}]});
        assert_eq!(ok("map(filter(items, #.qty > 0), #.qty * #.price)", ctx.clone()), json!([10, 3]));
        assert_eq!(ok("all(items, #.price > 1)", ctx.clone()), json!(true));
        assert_eq!(ok("some(items, #.qty == 0)", ctx.clone()), json!(true));
        assert_eq!(ok("none(items, #.price > 100)", ctx.clone()), json!(true));
        assert_eq!(ok("one(items, #.qty == 2)", ctx.clone()), json!(true));
        assert_eq!(ok("count(items, #.qty > 0)", ctx), json!(2));
        assert_eq!(ok("flatMap([[1, 2], [3]], #)", json!({})), json!([1, 2, 3]));
    }

    #[test]
    fn test_closure_item_outside_closure() {
        assert!(eval("# + 1", json!({})).is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(ok("upper('abc')", json!({})), json!("ABC"));
        assert_eq!(ok("len('héllo')", json!({})), json!(5));
        assert_eq!(ok("contains('hello', 'ell')", json!({})), json!(true));
        assert_eq!(ok("startsWith(code, 'US')", json!({"code": "US-1"})), json!(true));
        assert_eq!(ok("matches('abc123', '^[a-z]+\\\\d+$')", json!({})), json!(true));
        assert_eq!(ok("split('a,b', ',')", json!({})), json!(["a", "b"]));
        assert_eq!(ok("join([1, 'x'], '-')", json!({})), json!("1-x"));
    }

    #[test]
    fn test_numbers_and_conversions() {
        assert_eq!(ok("round(2.345, 2)", json!({})), json!(2.35));
        assert_eq!(ok("round(2.5)", json!({})), json!(3));
        assert_eq!(ok("number('42')", json!({})), json!(42));
        assert_eq!(ok("isNumeric('4x')", json!({})), json!(false));
        assert_eq!(ok("string(10)", json!({})), json!("10"));
        assert_eq!(ok("bool('false')", json!({})), json!(false));
        assert_eq!(ok("type([])", json!({})), json!("array"));
        assert_eq!(ok("keys({b: 1, a: 2})", json!({})), json!(["a", "b"]));
    }

    #[test]
    fn test_extract_captures() {
        assert_eq!(
            ok("extract('2024-03-05', '(\\\\d+)-(\\\\d+)-(\\\\d+)')", json!({})),
            json!(["2024-03-05", "2024", "03", "05"])
        );
        assert_eq!(ok("extract('abc', '\\\\d+')", json!({})), json!([]));
    }

    #[test]
    fn test_dates() {
        let ctx = json!({"opened": "2024-02-14 15:45:10"});
        assert_eq!(ok("date('2024-01-01')", json!({})), json!(1704067200));
        assert_eq!(ok("date(1704067200.9)", json!({})), json!(1704067200));
        assert_eq!(ok("year(opened)", ctx.clone()), json!(2024));
        assert_eq!(ok("monthOfYear(opened)", ctx.clone()), json!(2));
        assert_eq!(ok("dayOfWeek(opened)", ctx.clone()), json!(3));
        assert_eq!(ok("dayOfYear(opened)", ctx.clone()), json!(45));
        assert_eq!(ok("weekOfYear(opened)", ctx.clone()), json!(7));
        assert_eq!(ok("monthString(opened)", ctx.clone()), json!("Feb"));
        assert_eq!(ok("weekdayString(opened)", ctx.clone()), json!("Wed"));
        assert_eq!(ok("dateString(startOf(opened, 'month'))", ctx.clone()), json!("2024-02-01 00:00:00"));
        assert_eq!(ok("dateString(endOf(opened, 'day'))", ctx), json!("2024-02-14 23:59:59"));
    }

    #[test]
    fn test_date_arithmetic_and_comparison() {
        let ctx = json!({"start": "2024-01-01", "end": "2024-01-03 12:00:00"});
        assert_eq!(ok("date(end) - date(start) > duration('2d')", ctx.clone()), json!(true));
        assert_eq!(ok("date(start) + duration('36h') < date(end)", ctx.clone()), json!(true));
        assert_eq!(ok("dateString(date(start) + duration('1h 30m'))", ctx), json!("2024-01-01 01:30:00"));
        assert_eq!(ok("time('08:30') >= time('08:00')", json!({})), json!(true));
        assert_eq!(ok("time('08:30')", json!({})), json!(30600));
    }

    #[test]
    fn test_date_errors() {
        assert!(eval("date('yesterday-ish')", json!({})).is_err());
        assert!(eval("date(true)", json!({})).is_err());
        assert!(eval("startOf('2024-01-01', 'fortnight')", json!({})).is_err());
        assert!(eval("duration('3 parsecs')", json!({})).is_err());
    }

    #[test]
    fn test_non_finite_results_are_errors() {
        let err = eval("round(1.5, 400)", json!({})).unwrap_err();
        assert!(err.to_string().contains("round(): result NaN is not a finite number"));

        let err = eval("sum(a)", json!({"a": [1.7e308, 1.7e308]})).unwrap_err();
        assert!(matches!(err, RuntimeError::Expression { .. }));
        assert!(eval("avg(a)", json!({"a": [1.7e308, 1.7e308]})).is_err());
    }

    #[test]
    fn test_errors() {
        let err = eval("nope(1)", json!({})).unwrap_err();
        assert!(err.to_string().contains("Unknown function 'nope'"));

        let err = eval("upper('a', 'b')", json!({})).unwrap_err();
        assert!(err.to_string().contains("expected 1 arguments, got 2"));

        assert!(eval("sum(['a'])", json!({})).is_err());
        assert!(eval("matches('a', '(')", json!({})).is_err());
    }
}
