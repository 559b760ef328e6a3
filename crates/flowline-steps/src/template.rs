//! Placeholder resolution against runtime data.
//!
//! Templates use single-brace `{field}` placeholders. A placeholder whose
//! identifier exists in the runtime data is replaced with the value's
//! string representation; unknown identifiers are left verbatim so a run
//! never fails on a missing interpolation field. There is no escaping
//! syntax; a bare `{` passes through unchanged.

use regex::Regex;
use std::collections::HashMap;

use crate::context::{value_to_string, RunContext};

/// Resolves `{field}` placeholders in strings.
pub struct TemplateResolver {
    pattern: Regex,
}

impl TemplateResolver {
    /// Create a new resolver.
    pub fn new() -> Self {
        Self {
            // Identifiers follow the usual `[A-Za-z_][A-Za-z0-9_]*` shape.
            pattern: Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")
                .expect("placeholder pattern is valid"),
        }
    }

    /// Resolve a template against a run context.
    pub fn resolve(&self, template: &str, ctx: &RunContext) -> String {
        self.resolve_with(template, &ctx.data)
    }

    /// Resolve a template against a raw field mapping.
    pub fn resolve_with(
        &self,
        template: &str,
        data: &HashMap<String, serde_json::Value>,
    ) -> String {
        self.pattern
            .replace_all(template, |caps: &regex::Captures| match data.get(&caps[1]) {
                Some(value) => value_to_string(value),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Resolve every string leaf of a JSON value.
    ///
    /// Used for structured payloads such as request bodies; non-string
    /// leaves are returned unchanged.
    pub fn resolve_value(
        &self,
        value: &serde_json::Value,
        data: &HashMap<String, serde_json::Value>,
    ) -> serde_json::Value {
        match value {
            serde_json::Value::String(s) => {
                serde_json::Value::String(self.resolve_with(s, data))
            }
            serde_json::Value::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), self.resolve_value(v, data)))
                    .collect(),
            ),
            serde_json::Value::Array(arr) => serde_json::Value::Array(
                arr.iter().map(|v| self.resolve_value(v, data)).collect(),
            ),
            _ => value.clone(),
        }
    }
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_simple_substitution() {
        let resolver = TemplateResolver::new();
        let ctx = data(&[("x", serde_json::json!("v"))]);

        assert_eq!(resolver.resolve_with("{x}", &ctx), "v");
        assert_eq!(resolver.resolve_with("Hello, {x}!", &ctx), "Hello, v!");
    }

    #[test]
    fn test_missing_key_left_verbatim() {
        let resolver = TemplateResolver::new();
        let ctx = data(&[("x", serde_json::json!("v"))]);

        assert_eq!(resolver.resolve_with("{y}", &ctx), "{y}");
        assert_eq!(resolver.resolve_with("{x} and {y}", &ctx), "v and {y}");
    }

    #[test]
    fn test_no_placeholders_idempotent() {
        let resolver = TemplateResolver::new();
        let ctx = data(&[("x", serde_json::json!("v"))]);

        assert_eq!(resolver.resolve_with("plain text", &ctx), "plain text");
        assert_eq!(resolver.resolve_with("", &ctx), "");
    }

    #[test]
    fn test_repeated_placeholder() {
        let resolver = TemplateResolver::new();
        let ctx = data(&[("name", serde_json::json!("Ada"))]);

        assert_eq!(
            resolver.resolve_with("{name}{name} {name}", &ctx),
            "AdaAda Ada"
        );
    }

    #[test]
    fn test_adjacent_placeholders() {
        let resolver = TemplateResolver::new();
        let ctx = data(&[("a", serde_json::json!(1)), ("b", serde_json::json!(2))]);

        assert_eq!(resolver.resolve_with("{a}{b}", &ctx), "12");
    }

    #[test]
    fn test_bare_brace_passes_through() {
        let resolver = TemplateResolver::new();
        let ctx = data(&[("x", serde_json::json!("v"))]);

        assert_eq!(resolver.resolve_with("a { b", &ctx), "a { b");
        assert_eq!(resolver.resolve_with("{not closed", &ctx), "{not closed");
        assert_eq!(resolver.resolve_with("{1bad}", &ctx), "{1bad}");
    }

    #[test]
    fn test_non_string_values() {
        let resolver = TemplateResolver::new();
        let ctx = data(&[
            ("count", serde_json::json!(7)),
            ("flag", serde_json::json!(false)),
            ("obj", serde_json::json!({"k": "v"})),
        ]);

        assert_eq!(
            resolver.resolve_with("{count}/{flag}/{obj}", &ctx),
            "7/false/{\"k\":\"v\"}"
        );
    }

    #[test]
    fn test_resolve_value_recurses() {
        let resolver = TemplateResolver::new();
        let ctx = data(&[("user", serde_json::json!("Ada"))]);

        let body = serde_json::json!({
            "greeting": "hi {user}",
            "nested": {"again": "{user}"},
            "list": ["{user}", 1],
            "number": 42
        });

        let resolved = resolver.resolve_value(&body, &ctx);
        assert_eq!(resolved["greeting"], serde_json::json!("hi Ada"));
        assert_eq!(resolved["nested"]["again"], serde_json::json!("Ada"));
        assert_eq!(resolved["list"][0], serde_json::json!("Ada"));
        assert_eq!(resolved["number"], serde_json::json!(42));
    }
}
