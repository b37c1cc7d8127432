//! Template rendering
//!
//! `{{ expr }}` placeholders are evaluated with the interpreter. A template
//! that is exactly one placeholder yields the expression's own value; any
//! other template yields a string.

use crate::engine::{Interpreter, Scope};
use crate::error::Result;
use verdict_core::Value;
use verdict_parser::{Template, TemplateSegment};

/// Render a parsed template against a scope
pub fn render(template: &Template, interpreter: &Interpreter, scope: Scope<'_>) -> Result<Value> {
    if let Some(single) = template.single_expression() {
        return interpreter.evaluate(&single.expression, scope);
    }

    let mut rendered = String::new();
    for segment in &template.segments {
        match segment {
            TemplateSegment::Text(text) => rendered.push_str(text),
            TemplateSegment::Expression(expr) => match interpreter.evaluate(&expr.expression, scope)? {
                Value::Null => {}
                value => rendered.push_str(&value.to_string()),
            },
        }
    }
    Ok(Value::String(rendered))
}
