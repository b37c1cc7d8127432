//! Parser for `{{ expression }}` string templates

use crate::error::{ParseError, Result};
use crate::expression_parser::ExpressionParser;
use verdict_core::ir::SourceExpression;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A piece of a parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    Text(String),
    Expression(SourceExpression),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// The expression when the template is exactly one placeholder and
    /// nothing else, in which case rendering keeps the native value
    pub fn single_expression(&self) -> Option<&SourceExpression> {
        match self.segments.as_slice() {
            [TemplateSegment::Expression(expression)] => Some(expression),
            _ => None,
        }
    }

    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, TemplateSegment::Expression(_)))
    }
}

pub struct TemplateParser;

impl TemplateParser {
    pub fn parse(source: &str) -> Result<Template> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(TemplateSegment::Text(rest[..start].to_string()));
            }

            let body_start = start + OPEN.len();
            let Some(body_len) = rest[body_start..].find(CLOSE) else {
                return Err(ParseError::UnterminatedPlaceholder {
                    position: offset + start,
                });
            };

            let body = &rest[body_start..body_start + body_len];
            let leading = body.len() - body.trim_start().len();
            let trimmed = body.trim();
            let expression = ExpressionParser::parse(trimmed)
                .map_err(|e| e.offset(offset + body_start + leading))?;
            segments.push(TemplateSegment::Expression(SourceExpression::new(
                trimmed, expression,
            )));

            let consumed = body_start + body_len + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(TemplateSegment::Text(rest.to_string()));
        }

        Ok(Template { segments })
    }
}
