//! Template evaluation against JSON-shaped variables.
//!
//! Lookups are strict: a path segment missing from its object is an error,
//! never an empty string.

use serde_json::Value;
use std::fmt::Write;

use super::parse::{FieldPath, Node};

pub(crate) fn render(nodes: &[Node], dot: &Value) -> Result<String, String> {
    let mut out = String::new();
    render_into(&mut out, nodes, dot)?;
    Ok(out)
}

fn render_into(out: &mut String, nodes: &[Node], dot: &Value) -> Result<(), String> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Print(path) => {
                let value = lookup(dot, path)?;
                if value.is_null() {
                    out.push_str("<no value>");
                } else {
                    write_value(out, value);
                }
            }
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                let branch = if is_truthy(lookup(dot, cond)?) {
                    then
                } else {
                    otherwise
                };
                render_into(out, branch, dot)?;
            }
            Node::Range {
                over,
                body,
                otherwise,
            } => {
                let items: Vec<&Value> = match lookup(dot, over)? {
                    Value::Array(items) => items.iter().collect(),
                    Value::Object(map) => {
                        let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                        entries.sort_by(|a, b| a.0.cmp(b.0));
                        entries.into_iter().map(|(_, item)| item).collect()
                    }
                    Value::Null => Vec::new(),
                    other => {
                        return Err(format!(
                            "range can't iterate over {} at <{over}>",
                            type_name(other)
                        ));
                    }
                };
                if items.is_empty() {
                    render_into(out, otherwise, dot)?;
                }
                for item in items {
                    render_into(out, body, item)?;
                }
            }
        }
    }
    Ok(())
}

fn lookup<'a>(dot: &'a Value, path: &FieldPath) -> Result<&'a Value, String> {
    let mut current = dot;
    for segment in &path.0 {
        current = match current {
            Value::Object(map) => map
                .get(segment)
                .ok_or_else(|| format!("map has no entry for key \"{segment}\" at <{path}>"))?,
            Value::Null => {
                return Err(format!("nil value evaluating field {segment} at <{path}>"));
            }
            other => {
                return Err(format!(
                    "can't evaluate field {segment} in type {} at <{path}>",
                    type_name(other)
                ));
            }
        };
    }
    Ok(current)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("<nil>"),
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Number(n) => write_number(out, n),
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push_str("map[");
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(key);
                out.push(':');
                write_value(out, item);
            }
            out.push(']');
        }
    }
}

fn write_number(out: &mut String, n: &serde_json::Number) {
    match n.as_f64() {
        // Integral floats print without a fraction, like integers do.
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            let _ = write!(out, "{f:.0}");
        }
        _ => {
            let _ = write!(out, "{n}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse::parse;
    use serde_json::json;

    fn run(source: &str, vars: Value) -> Result<String, String> {
        render(&parse(source).unwrap(), &vars)
    }

    #[test]
    fn prints_scalars() {
        let vars = json!({"s": "x", "i": 3, "f": 1.5, "whole": 2.0, "b": true, "n": null});
        assert_eq!(
            run("{{.s}} {{.i}} {{.f}} {{.whole}} {{.b}} {{.n}}", vars).unwrap(),
            "x 3 1.5 2 true <no value>"
        );
    }

    #[test]
    fn prints_collections() {
        let vars = json!({"list": ["a", 1, null], "map": {"b": 2, "a": [true]}});
        assert_eq!(
            run("{{.list}} {{.map}}", vars).unwrap(),
            "[a 1 <nil>] map[a:[true] b:2]"
        );
    }

    #[test]
    fn nested_lookup() {
        let vars = json!({"db": {"tier": "db-n1-standard-1"}});
        assert_eq!(run("{{ .db.tier }}", vars).unwrap(), "db-n1-standard-1");
    }

    #[test]
    fn missing_key_fails() {
        let err = run("{{.name}} {{.missing}}", json!({"name": "svc"})).unwrap_err();
        assert!(err.contains("\"missing\""), "{err}");
    }

    #[test]
    fn missing_nested_key_fails() {
        let err = run("{{.db.zone}}", json!({"db": {"tier": "x"}})).unwrap_err();
        assert!(err.contains("<.db.zone>"), "{err}");
    }

    #[test]
    fn field_of_scalar_fails() {
        assert!(run("{{.name.first}}", json!({"name": "svc"})).is_err());
        assert!(run("{{.name.first}}", json!({"name": null})).is_err());
    }

    #[test]
    fn missing_key_in_condition_fails() {
        assert!(run("{{if .flag}}y{{end}}", json!({})).is_err());
    }

    #[test]
    fn if_uses_truthiness() {
        let source = "{{if .v}}yes{{else}}no{{end}}";
        for (v, expected) in [
            (json!(true), "yes"),
            (json!(false), "no"),
            (json!(0), "no"),
            (json!(0.5), "yes"),
            (json!(""), "no"),
            (json!("x"), "yes"),
            (json!([]), "no"),
            (json!({"a": 1}), "yes"),
            (json!(null), "no"),
        ] {
            assert_eq!(run(source, json!({ "v": v })).unwrap(), expected);
        }
    }

    #[test]
    fn range_rebinds_dot() {
        let vars = json!({"zones": [{"name": "a"}, {"name": "b"}]});
        assert_eq!(
            run("{{range .zones}}- {{.name}}\n{{end}}", vars).unwrap(),
            "- a\n- b\n"
        );
    }

    #[test]
    fn range_over_map_is_sorted() {
        let vars = json!({"labels": {"z": 1, "a": 2}});
        assert_eq!(run("{{range .labels}}{{.}},{{end}}", vars).unwrap(), "2,1,");
    }

    #[test]
    fn range_empty_uses_else() {
        let source = "{{range .items}}x{{else}}empty{{end}}";
        assert_eq!(run(source, json!({"items": []})).unwrap(), "empty");
        assert_eq!(run(source, json!({"items": null})).unwrap(), "empty");
    }

    #[test]
    fn range_over_scalar_fails() {
        assert!(run("{{range .n}}x{{end}}", json!({"n": 3})).is_err());
    }

    #[test]
    fn missing_key_inside_range_body_fails() {
        let vars = json!({"zones": [{"name": "a"}, {"other": "b"}]});
        assert!(run("{{range .zones}}{{.name}}{{end}}", vars).is_err());
    }
}
