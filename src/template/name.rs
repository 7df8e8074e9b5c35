//! Name templates for file and directory names.
//!
//! The grammar is narrow on purpose: only `[model.path]` with a plain
//! identifier path is a placeholder. Brackets around anything else stay
//! literal, so ordinary filename punctuation never triggers templating.
//! An unresolved placeholder aborts the render — there is no fallback to
//! the literal placeholder text.

use crate::error::RenderError;
use crate::model;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled file/directory name template.
#[derive(Debug, Clone)]
pub struct NameTemplate {
    raw: String,
    segments: Vec<Segment>,
}

fn is_path_ident(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.split('.').all(|seg| {
            !seg.is_empty()
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

impl NameTemplate {
    /// Compile a raw path segment into a name template.
    ///
    /// Fails only on an empty placeholder (`[]`), which can never evaluate;
    /// bracket pairs whose contents are not an identifier path are kept as
    /// literal text.
    pub fn compile(raw: &str) -> Result<Self, RenderError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(open) = rest.find('[') {
            let (before, bracketed) = rest.split_at(open);
            literal.push_str(before);
            match bracketed[1..].find(']') {
                Some(close) => {
                    let inner = &bracketed[1..1 + close];
                    if inner.is_empty() {
                        return Err(RenderError::TemplateSyntax {
                            raw: raw.to_string(),
                            detail: "empty name placeholder".to_string(),
                        });
                    }
                    if is_path_ident(inner) {
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Placeholder(inner.to_string()));
                    } else {
                        // Not an identifier path; the brackets are literal.
                        literal.push_str(&bracketed[..close + 2]);
                    }
                    rest = &bracketed[close + 2..];
                }
                None => {
                    // Unterminated bracket stays literal.
                    literal.push_str(bracketed);
                    rest = "";
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(NameTemplate {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The original segment text this template was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True if the name contains at least one placeholder.
    pub fn is_parameterized(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(_)))
    }

    /// Evaluate the template against a model.
    pub fn render(&self, model: &Value) -> Result<String, RenderError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(path) => {
                    let value = model::lookup(model, path).ok_or_else(|| {
                        RenderError::TemplateEvaluation { path: path.clone() }
                    })?;
                    out.push_str(&model::to_text(value));
                }
            }
        }
        Ok(out)
    }
}
