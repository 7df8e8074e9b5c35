//! Content templates for file bodies.
//!
//! Tag grammar, EJS-flavored:
//!
//! - `<%= path %>` — interpolate a model value; a missing or null path is an
//!   evaluation error.
//! - `<% if path %> … <% else %> … <% endif %>` — conditional; a missing path
//!   is simply falsy (conditionals are presence tests).
//! - `<% for var in path %> … <% endfor %>` — iterate an array, binding each
//!   element to `var` for the loop body.
//!
//! Compilation parses the source once into an AST; rendering walks the AST
//! against a [`Scope`] and performs no I/O.

use crate::error::RenderError;
use crate::model::{self, Scope};
use serde_json::Value;

const TAG_OPEN: &str = "<%";
const TAG_CLOSE: &str = "%>";

#[derive(Debug, Clone, PartialEq)]
enum Ast {
    Text(String),
    Interpolate(String),
    If {
        path: String,
        then_body: Vec<Ast>,
        else_body: Vec<Ast>,
    },
    For {
        var: String,
        path: String,
        body: Vec<Ast>,
    },
}

#[derive(Debug)]
enum Token {
    Text(String),
    /// Tag contents with surrounding whitespace trimmed, `<%`/`%>` stripped.
    Tag(String),
}

/// A compiled file-content template.
#[derive(Debug, Clone)]
pub struct ContentTemplate {
    raw: String,
    body: Vec<Ast>,
}

fn syntax_error(raw: &str, detail: impl Into<String>) -> RenderError {
    RenderError::TemplateSyntax {
        raw: raw.to_string(),
        detail: detail.into(),
    }
}

fn tokenize(raw: &str) -> Result<Vec<Token>, RenderError> {
    let mut tokens = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find(TAG_OPEN) {
        if open > 0 {
            tokens.push(Token::Text(rest[..open].to_string()));
        }
        let after_open = &rest[open + TAG_OPEN.len()..];
        let close = after_open
            .find(TAG_CLOSE)
            .ok_or_else(|| syntax_error(raw, "unterminated tag: missing %>"))?;
        tokens.push(Token::Tag(after_open[..close].trim().to_string()));
        rest = &after_open[close + TAG_CLOSE.len()..];
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    Ok(tokens)
}

/// Parse a body until one of the given closing keywords (or end of input
/// when `terminators` is empty). Returns the body and the terminator hit.
fn parse_body(
    raw: &str,
    tokens: &mut std::vec::IntoIter<Token>,
    terminators: &[&str],
) -> Result<(Vec<Ast>, Option<String>), RenderError> {
    let mut body = Vec::new();
    while let Some(token) = tokens.next() {
        match token {
            Token::Text(text) => body.push(Ast::Text(text)),
            Token::Tag(tag) => {
                if let Some(path) = tag.strip_prefix('=') {
                    let path = path.trim();
                    if path.is_empty() {
                        return Err(syntax_error(raw, "empty interpolation tag"));
                    }
                    body.push(Ast::Interpolate(path.to_string()));
                    continue;
                }
                let mut words = tag.split_whitespace();
                match words.next() {
                    Some("if") => {
                        let path = words
                            .next()
                            .ok_or_else(|| syntax_error(raw, "if tag without a model path"))?;
                        if words.next().is_some() {
                            return Err(syntax_error(raw, "if tag takes a single model path"));
                        }
                        let (then_body, terminator) =
                            parse_body(raw, tokens, &["else", "endif"])?;
                        let else_body = match terminator.as_deref() {
                            Some("else") => {
                                let (else_body, terminator) =
                                    parse_body(raw, tokens, &["endif"])?;
                                if terminator.is_none() {
                                    return Err(syntax_error(raw, "else without closing endif"));
                                }
                                else_body
                            }
                            Some("endif") => Vec::new(),
                            _ => return Err(syntax_error(raw, "if without closing endif")),
                        };
                        body.push(Ast::If {
                            path: path.to_string(),
                            then_body,
                            else_body,
                        });
                    }
                    Some("for") => {
                        let var = words
                            .next()
                            .ok_or_else(|| syntax_error(raw, "for tag without a loop variable"))?;
                        if words.next() != Some("in") {
                            return Err(syntax_error(raw, "for tag missing `in`"));
                        }
                        let path = words
                            .next()
                            .ok_or_else(|| syntax_error(raw, "for tag without a model path"))?;
                        if words.next().is_some() {
                            return Err(syntax_error(raw, "trailing tokens in for tag"));
                        }
                        let (loop_body, terminator) = parse_body(raw, tokens, &["endfor"])?;
                        if terminator.is_none() {
                            return Err(syntax_error(raw, "for without closing endfor"));
                        }
                        body.push(Ast::For {
                            var: var.to_string(),
                            path: path.to_string(),
                            body: loop_body,
                        });
                    }
                    Some(keyword) if terminators.contains(&keyword) => {
                        return Ok((body, Some(keyword.to_string())));
                    }
                    Some(closer @ ("else" | "endif" | "endfor")) => {
                        return Err(syntax_error(raw, format!("stray closing tag {closer:?}")));
                    }
                    Some(other) => {
                        return Err(syntax_error(raw, format!("unknown tag {other:?}")));
                    }
                    None => return Err(syntax_error(raw, "empty tag")),
                }
            }
        }
    }
    Ok((body, None))
}

fn eval<'a>(body: &'a [Ast], scope: &mut Scope<'a>, out: &mut String) -> Result<(), RenderError> {
    for node in body {
        match node {
            Ast::Text(text) => out.push_str(text),
            Ast::Interpolate(path) => {
                let value = scope
                    .lookup(path)
                    .ok_or_else(|| RenderError::TemplateEvaluation { path: path.clone() })?;
                out.push_str(&model::to_text(value));
            }
            Ast::If {
                path,
                then_body,
                else_body,
            } => {
                let truthy = scope.lookup(path).map(model::is_truthy).unwrap_or(false);
                if truthy {
                    eval(then_body, scope, out)?;
                } else {
                    eval(else_body, scope, out)?;
                }
            }
            Ast::For { var, path, body } => {
                let value = scope
                    .lookup(path)
                    .ok_or_else(|| RenderError::TemplateEvaluation { path: path.clone() })?;
                let items = match value {
                    Value::Array(items) => items,
                    _ => {
                        return Err(RenderError::TemplateEvaluation { path: path.clone() });
                    }
                };
                for item in items {
                    scope.push(var, item);
                    let result = eval(body, scope, out);
                    scope.pop();
                    result?;
                }
            }
        }
    }
    Ok(())
}

impl ContentTemplate {
    /// Compile a raw file body into a content template.
    pub fn compile(raw: &str) -> Result<Self, RenderError> {
        let tokens = tokenize(raw)?;
        let mut stream = tokens.into_iter();
        let (body, _) = parse_body(raw, &mut stream, &[])?;
        Ok(ContentTemplate {
            raw: raw.to_string(),
            body,
        })
    }

    /// The original source this template was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Evaluate the template against a model.
    pub fn render(&self, model: &Value) -> Result<String, RenderError> {
        let mut out = String::new();
        let mut scope = Scope::new(model);
        eval(&self.body, &mut scope, &mut out)?;
        Ok(out)
    }
}
