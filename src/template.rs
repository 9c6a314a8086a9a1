//! Minimal `<%= %>` / `<%- %>` template interpolation for service-provided markup.
//!
//! Expressions are property paths (`name`, `stats.armor`, `tags[0]`,
//! `locale["Armor"]`). A path whose root or an intermediate segment is missing
//! fails the render; a missing final property renders as empty, as it would in
//! a browser template.
//!
//! Evaluate blocks (`<% ... %>`) are not supported: templates using control
//! flow such as `<% if (...) { %>` or `<% _.forEach(...) %>` fail to compile
//! with [`TemplateError::UnsupportedBlock`] and the panel shows "Display error".

use crate::error::TemplateError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<%([=-]?)(.*?)%>").unwrap());
static IDENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*").unwrap());

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Raw(Path),
    Escaped(Path),
}

#[derive(Debug, Clone, PartialEq)]
struct Path {
    source: String,
    segments: Vec<Segment>,
}

/// A compiled template, reusable across renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut cursor = 0;

        for caps in TAG_REGEX.captures_iter(source) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            push_text(&mut parts, &source[cursor..whole.start]);
            cursor = whole.end;

            let expr = caps.get(2).map_or("", |m| m.as_str()).trim();
            match caps.get(1).map_or("", |m| m.as_str()) {
                "=" => parts.push(Part::Raw(parse_path(expr)?)),
                "-" => parts.push(Part::Escaped(parse_path(expr)?)),
                _ => return Err(TemplateError::UnsupportedBlock(expr.to_string())),
            }
        }

        let tail = &source[cursor..];
        if let Some(pos) = tail.find("<%") {
            return Err(TemplateError::Unterminated(cursor + pos));
        }
        push_text(&mut parts, tail);
        Ok(Self { parts })
    }

    pub fn render(&self, context: &Value) -> Result<String, TemplateError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Raw(path) => out.push_str(&display(lookup(context, path)?)),
                Part::Escaped(path) => out.push_str(&escape(&display(lookup(context, path)?))),
            }
        }
        Ok(out)
    }
}

/// Compile and render in one go.
pub fn render(source: &str, context: &Value) -> Result<String, TemplateError> {
    Template::compile(source)?.render(context)
}

/// HTML-escape the five characters that matter inside markup and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_text(parts: &mut Vec<Part>, text: &str) {
    if !text.is_empty() {
        parts.push(Part::Text(text.to_string()));
    }
}

fn parse_path(expr: &str) -> Result<Path, TemplateError> {
    let invalid = || TemplateError::InvalidExpression(expr.to_string());
    let mut segments = Vec::new();

    let root = IDENT_REGEX.find(expr).ok_or_else(invalid)?;
    segments.push(Segment::Key(root.as_str().to_string()));
    let mut rest = &expr[root.end()..];

    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            let ident = IDENT_REGEX.find(after_dot).ok_or_else(invalid)?;
            segments.push(Segment::Key(ident.as_str().to_string()));
            rest = &after_dot[ident.end()..];
        } else if let Some(after_bracket) = rest.strip_prefix('[') {
            let close = after_bracket.find(']').ok_or_else(invalid)?;
            let inner = after_bracket[..close].trim();
            let quoted = inner
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')));
            let segment = match quoted {
                Some(key) => Segment::Key(key.to_string()),
                None => Segment::Index(inner.parse().map_err(|_| invalid())?),
            };
            segments.push(segment);
            rest = &after_bracket[close + 1..];
        } else {
            return Err(invalid());
        }
    }

    Ok(Path {
        source: expr.to_string(),
        segments,
    })
}

fn lookup<'a>(context: &'a Value, path: &Path) -> Result<&'a Value, TemplateError> {
    static NULL: Value = Value::Null;
    let missing = || TemplateError::MissingField(path.source.clone());
    let last = path.segments.len() - 1;
    let mut current = context;

    for (i, segment) in path.segments.iter().enumerate() {
        let next = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            (Segment::Key(key), Value::Array(items)) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            (_, Value::Null) => return Err(missing()),
            _ => None,
        };
        current = match next {
            Some(value) => value,
            // The root must exist; a trailing property may be absent
            None if i == last && i > 0 => &NULL,
            None => return Err(missing()),
        };
    }
    Ok(current)
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interpolates_nested_paths() {
        let data = json!({
            "name": "Infinity Edge",
            "gold": { "total": 3400 },
            "tags": ["Damage", "CriticalStrike"],
            "locale": { "Armor": "Armure" },
        });
        let out = render(
            r#"<b><%= name %></b> <%= gold.total %>g <%= tags[1] %> <%= locale["Armor"] %>"#,
            &data,
        )
        .unwrap();

        assert_eq!(out, "<b>Infinity Edge</b> 3400g CriticalStrike Armure");
    }

    #[test]
    fn escaped_tag_encodes_markup() {
        let data = json!({ "description": "<stats>+50 \"AD\" & more</stats>" });
        let out = render("<%- description %>", &data).unwrap();
        assert_eq!(out, "&lt;stats&gt;+50 &quot;AD&quot; &amp; more&lt;/stats&gt;");
    }

    #[test]
    fn raw_tag_keeps_markup() {
        let data = json!({ "description": "<br>" });
        assert_eq!(render("<%=description%>", &data).unwrap(), "<br>");
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = render("<%= title %>", &json!({ "name": "Ahri" })).unwrap_err();
        assert_eq!(err, TemplateError::MissingField("title".into()));
    }

    #[test]
    fn missing_intermediate_is_an_error() {
        let err = render("<%= stats.armor.flat %>", &json!({ "stats": {} })).unwrap_err();
        assert_eq!(err, TemplateError::MissingField("stats.armor.flat".into()));
    }

    #[test]
    fn missing_trailing_property_renders_empty() {
        let out = render("[<%= stats.armor %>]", &json!({ "stats": {} })).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn null_renders_empty_and_scalars_as_text() {
        let data = json!({ "a": null, "b": true, "c": 1.5 });
        assert_eq!(render("<%= a %>|<%= b %>|<%= c %>", &data).unwrap(), "|true|1.5");
    }

    #[test]
    fn code_blocks_are_rejected() {
        let err = Template::compile("<% if (free) { %>free<% } %>").unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedBlock(_)));
        let err = Template::compile("<% _.forEach(tags, function(tag) { %><%= tag %><% }) %>").unwrap_err();
        assert!(matches!(err, TemplateError::UnsupportedBlock(_)));
    }

    #[test]
    fn unterminated_tag_is_rejected() {
        let err = Template::compile("<p><%= name </p>").unwrap_err();
        assert_eq!(err, TemplateError::Unterminated(3));
    }

    #[test]
    fn invalid_expression_is_rejected() {
        assert!(matches!(
            Template::compile("<%= name + 1 %>"),
            Err(TemplateError::InvalidExpression(_))
        ));
        assert!(matches!(
            Template::compile("<%= %>"),
            Err(TemplateError::InvalidExpression(_))
        ));
    }

    #[test]
    fn compiled_template_renders_identically_twice() {
        let template = Template::compile("<%= name %>").unwrap();
        let data = json!({ "name": "Flash" });
        assert_eq!(template.render(&data), template.render(&data));
    }
}
