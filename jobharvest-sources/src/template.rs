//! Placeholder substitution for request templates.
//!
//! Templates reference `{page}`, `{offset}`, `{size}` (listing) and `{id}`
//! (detail). Unknown placeholders are left as written.

use serde_json::{Value, json};
use url::form_urlencoded;

use jobharvest_core::{Identifier, PageRequest};

/// Placeholder values for one request.
pub(crate) struct Vars(Vec<(&'static str, Value)>);

impl Vars {
    pub(crate) fn page(page: &PageRequest) -> Self {
        Self(vec![
            ("page", json!(page.index)),
            ("offset", json!(page.offset)),
            ("size", json!(page.size)),
        ])
    }

    pub(crate) fn item(id: &Identifier) -> Self {
        let value = match id {
            Identifier::Number(n) => json!(n),
            Identifier::Text(s) => json!(s),
        };
        Self(vec![("id", value)])
    }
}

/// How substituted values are escaped.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Escape {
    /// Percent-encoded, safe in a path segment or query value.
    Url,
    /// `application/x-www-form-urlencoded`.
    Form,
}

/// Returns true if the template mentions `{name}`.
pub(crate) fn mentions(template: &str, name: &str) -> bool {
    template.contains(&format!("{{{name}}}"))
}

/// Substitutes every known placeholder in a text template.
pub(crate) fn render_text(template: &str, vars: &Vars, escape: Escape) -> String {
    let mut out = template.to_string();
    for (name, value) in &vars.0 {
        let key = format!("{{{name}}}");
        if out.contains(&key) {
            out = out.replace(&key, &escape_value(&scalar_text(value), escape));
        }
    }
    out
}

/// Substitutes placeholders in every string of a JSON template.
///
/// A string that is exactly one placeholder takes the value's JSON type,
/// so `"{page}"` becomes a number.
pub(crate) fn render_json(template: &Value, vars: &Vars) -> Value {
    match template {
        Value::String(s) => {
            for (name, value) in &vars.0 {
                if s.len() == name.len() + 2 && mentions(s, name) {
                    return value.clone();
                }
            }
            let mut out = s.clone();
            for (name, value) in &vars.0 {
                out = out.replace(&format!("{{{name}}}"), &scalar_text(value));
            }
            Value::String(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| render_json(v, vars)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_json(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Returns true if any string in a JSON template mentions `{name}`.
pub(crate) fn json_mentions(template: &Value, name: &str) -> bool {
    match template {
        Value::String(s) => mentions(s, name),
        Value::Array(items) => items.iter().any(|v| json_mentions(v, name)),
        Value::Object(map) => map.values().any(|v| json_mentions(v, name)),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_value(text: &str, escape: Escape) -> String {
    let encoded: String = form_urlencoded::byte_serialize(text.as_bytes()).collect();
    match escape {
        Escape::Url => encoded.replace('+', "%20"),
        Escape::Form => encoded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobharvest_core::PageIndexBase;

    #[test]
    fn test_render_page_url() {
        let vars = Vars::page(&PageRequest::new(3, 10, PageIndexBase::Zero));
        let url = render_text(
            "https://example.com/search.json?offset={offset}&result_limit={size}&p={page}",
            &vars,
            Escape::Url,
        );
        assert_eq!(url, "https://example.com/search.json?offset=30&result_limit=10&p=3");
    }

    #[test]
    fn test_render_id_is_escaped() {
        let vars = Vars::item(&Identifier::from("a b/c+d"));
        assert_eq!(
            render_text("https://example.com/job/{id}", &vars, Escape::Url),
            "https://example.com/job/a%20b%2Fc%2Bd"
        );
        assert_eq!(render_text("id={id}", &vars, Escape::Form), "id=a+b%2Fc%2Bd");
    }

    #[test]
    fn test_unknown_placeholder_left_alone() {
        let vars = Vars::item(&Identifier::from(5));
        assert_eq!(
            render_text("/job/{id}?lang={lang}", &vars, Escape::Url),
            "/job/5?lang={lang}"
        );
    }

    #[test]
    fn test_render_json_keeps_types() {
        let vars = Vars::page(&PageRequest::new(2, 20, PageIndexBase::One));
        let body = render_json(
            &json!({
                "page": "{page}",
                "label": "page {page} of size {size}",
                "filters": [{ "from": "{offset}" }],
                "flag": true
            }),
            &vars,
        );
        assert_eq!(
            body,
            json!({
                "page": 2,
                "label": "page 2 of size 20",
                "filters": [{ "from": 20 }],
                "flag": true
            })
        );
        assert!(json_mentions(&json!({ "a": ["{page}"] }), "page"));
        assert!(!json_mentions(&json!({ "a": 1 }), "page"));
    }
}
