//! Dynamic model path lookup.
//!
//! Templates reference values in the caller-supplied data model by dotted
//! path (`author.name`, `deps.0`). Lookup is an explicit recursive accessor
//! over `serde_json::Value`; traversal failure yields `None` rather than
//! panicking, and the "missing" case is mapped to
//! [`RenderError::TemplateEvaluation`](crate::error::RenderError) at the
//! template-evaluation boundary, not here.

use serde_json::Value;

/// Resolve a dotted path against a model value.
///
/// Object segments index by key, array segments by parsed integer. A path
/// that lands on `null` is treated the same as a missing path.
pub fn lookup<'a>(model: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = model;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Render a model value as template output text.
///
/// Strings render without surrounding quotes; everything else uses its JSON
/// serialization.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truthiness for conditional tags: empty strings/arrays, zero, `false` and
/// `null` are false; objects are always true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Lexical scope used during content-template evaluation.
///
/// Loop variables are pushed as frames on top of the model; the first path
/// segment checks frames innermost-first before falling back to the model
/// root, so a loop variable shadows a model field of the same name.
pub struct Scope<'a> {
    model: &'a Value,
    frames: Vec<(&'a str, &'a Value)>,
}

impl<'a> Scope<'a> {
    pub fn new(model: &'a Value) -> Self {
        Scope {
            model,
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &'a str, value: &'a Value) {
        self.frames.push((name, value));
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Resolve a dotted path, consulting loop frames before the model root.
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        let head = path.split('.').next().unwrap_or(path);
        for (name, value) in self.frames.iter().rev() {
            if *name == head {
                return match path.strip_prefix(head).and_then(|r| r.strip_prefix('.')) {
                    Some(rest) => lookup(value, rest),
                    None => {
                        if value.is_null() {
                            None
                        } else {
                            Some(value)
                        }
                    }
                };
            }
        }
        lookup(self.model, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_nested_object_path() {
        let model = json!({"a": {"b": {"c": "deep"}}});
        assert_eq!(lookup(&model, "a.b.c"), Some(&json!("deep")));
    }

    #[test]
    fn lookup_array_index_segment() {
        let model = json!({"deps": ["serde", "tokio"]});
        assert_eq!(lookup(&model, "deps.1"), Some(&json!("tokio")));
    }

    #[test]
    fn lookup_missing_path_is_none() {
        let model = json!({"a": 1});
        assert_eq!(lookup(&model, "a.b"), None);
        assert_eq!(lookup(&model, "missing"), None);
    }

    #[test]
    fn lookup_null_counts_as_missing() {
        let model = json!({"a": null});
        assert_eq!(lookup(&model, "a"), None);
    }

    #[test]
    fn to_text_strips_string_quotes() {
        assert_eq!(to_text(&json!("acme")), "acme");
        assert_eq!(to_text(&json!(42)), "42");
        assert_eq!(to_text(&json!(true)), "true");
    }

    #[test]
    fn scope_frame_shadows_model_root() {
        let model = json!({"item": "outer", "items": [{"name": "inner"}]});
        let mut scope = Scope::new(&model);
        let bound = lookup(&model, "items.0").unwrap();
        scope.push("item", bound);
        assert_eq!(scope.lookup("item.name"), Some(&json!("inner")));
        scope.pop();
        assert_eq!(scope.lookup("item"), Some(&json!("outer")));
    }

    #[test]
    fn truthiness_of_empty_values() {
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!({"any": 1})));
        assert!(is_truthy(&json!("x")));
    }
}
