// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expression evaluation for diagnostic-context values.
//!
//! Diagnostic-context declarations carry a value *expression*.  Method-level expressions are
//! evaluated with no receiver; parameter-level ones with the argument as receiver.  The
//! [`ExpressionEvaluator`] contract is deliberately forgiving: malformed input evaluates to the
//! literal text, and a missing receiver yields `None` without evaluating anything.
//!
//! The default [`TemplateEvaluator`] understands literal text with `#{...}` placeholders:
//!
//! | placeholder      | value                                                     |
//! |------------------|-----------------------------------------------------------|
//! | `#{this}`        | the receiver (`Display`, else JSON, else `Debug`)         |
//! | `#{this.a.b}`    | a field path into a `Serialize` receiver                  |
//! | `#{thread.name}` | name of the current thread                                |
//! | `#{uuid}`        | a fresh random UUID, handy for correlation ids            |

use crate::value::Value;
use std::fmt::Debug;

pub trait ExpressionEvaluator: Debug + Send + Sync {
    /// Evaluates without a receiver.  Falls back to the literal text.
    fn evaluate(&self, expression: &str) -> Option<String>;

    /// Evaluates against `receiver`.  `None` for a `None` receiver; otherwise falls back to the literal text.
    fn evaluate_with(&self, expression: &str, receiver: Option<&Value>) -> Option<String>;
}

/**
The default evaluator.

```
use methodlog::expression::{ExpressionEvaluator, TemplateEvaluator};
use methodlog::Value;

let eval = TemplateEvaluator;
assert_eq!(eval.evaluate("static"), Some("static".to_string()));
assert_eq!(eval.evaluate_with("user-#{this}", Some(&Value::from(42))), Some("user-42".to_string()));
assert_eq!(eval.evaluate_with("#{this}", None), None);
assert_eq!(eval.evaluate("#{broken"), Some("#{broken".to_string()));
```
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TemplateEvaluator;

impl ExpressionEvaluator for TemplateEvaluator {
    fn evaluate(&self, expression: &str) -> Option<String> {
        Some(render(expression, None).unwrap_or_else(|| expression.to_string()))
    }

    fn evaluate_with(&self, expression: &str, receiver: Option<&Value>) -> Option<String> {
        let receiver = receiver?;
        Some(render(expression, Some(receiver)).unwrap_or_else(|| expression.to_string()))
    }
}

/// `None` means the template could not be evaluated.
fn render(template: &str, receiver: Option<&Value>) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("#{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}')?;
        out.push_str(&placeholder(after[..end].trim(), receiver)?);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Some(out)
}

fn placeholder(name: &str, receiver: Option<&Value>) -> Option<String> {
    match name {
        "this" => receiver.map(receiver_text),
        "thread.name" => Some(
            std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
        ),
        "uuid" => Some(uuid::Uuid::new_v4().to_string()),
        _ => {
            let path = name.strip_prefix("this.")?;
            let json = receiver?.to_json()?.ok()?;
            let mut node = &json;
            for segment in path.split('.') {
                node = match node {
                    serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                    other => other.get(segment)?,
                };
            }
            Some(json_text(node))
        }
    }
}

fn receiver_text(value: &Value) -> String {
    if let Some(text) = value.display_string() {
        return text;
    }
    match value.to_json() {
        Some(Ok(json)) => json_text(&json),
        _ => value.debug_string(),
    }
}

fn json_text(node: &serde_json::Value) -> String {
    match node {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
