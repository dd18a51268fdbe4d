//! Template parsing: `{{ ... }}` actions into a node tree.

use std::fmt;

/// Dotted field path. Empty means `.` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldPath(pub Vec<String>);

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        for segment in &self.0 {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Print(FieldPath),
    If {
        cond: FieldPath,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Range {
        over: FieldPath,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug)]
enum Token {
    Text(String),
    Action { line: usize, action: Action },
}

#[derive(Debug)]
enum Action {
    Comment,
    Print(FieldPath),
    If(FieldPath),
    Range(FieldPath),
    Else,
    End,
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

fn err(line: usize, message: impl Into<String>) -> ParseError {
    ParseError {
        line,
        message: message.into(),
    }
}

/// Split the source into text and actions, applying `{{-`/`-}}` trimming.
fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut trim_next = false;

    while !rest.is_empty() {
        let offset = source.len() - rest.len();
        let Some(start) = rest.find(OPEN) else {
            push_text(&mut tokens, rest, trim_next);
            break;
        };
        let line = line_at(source, offset + start);

        let mut inner = &rest[start + OPEN.len()..];
        let trim_left = inner.starts_with('-') && inner[1..].starts_with(is_space);
        if trim_left {
            inner = &inner[1..];
        }

        let mut text = &rest[..start];
        if trim_left {
            text = text.trim_end_matches(is_space);
        }
        push_text(&mut tokens, text, trim_next);

        let body_start = inner.trim_start_matches(is_space);
        let search_from = if body_start.starts_with("/*") {
            let end = body_start
                .find("*/")
                .ok_or_else(|| err(line, "unclosed comment"))?;
            inner.len() - body_start.len() + end + 2
        } else {
            0
        };
        let close = inner[search_from..]
            .find(CLOSE)
            .map(|i| i + search_from)
            .ok_or_else(|| err(line, "unclosed action"))?;

        let mut content = &inner[..close];
        let trim_right = content.ends_with('-') && content[..content.len() - 1].ends_with(is_space);
        if trim_right {
            content = &content[..content.len() - 1];
        }

        tokens.push(Token::Action {
            line,
            action: parse_action(content.trim_matches(is_space), line)?,
        });

        trim_next = trim_right;
        rest = &inner[close + CLOSE.len()..];
    }

    Ok(tokens)
}

fn push_text(tokens: &mut Vec<Token>, text: &str, trim_leading: bool) {
    let text = if trim_leading {
        text.trim_start_matches(is_space)
    } else {
        text
    };
    if !text.is_empty() {
        tokens.push(Token::Text(text.to_string()));
    }
}

fn parse_action(content: &str, line: usize) -> Result<Action, ParseError> {
    if content.starts_with("/*") {
        return if content.ends_with("*/") {
            Ok(Action::Comment)
        } else {
            Err(err(line, "comment must be the only content of an action"))
        };
    }

    let mut words = content.split(is_space).filter(|w| !w.is_empty());
    let Some(first) = words.next() else {
        return Err(err(line, "missing value for command"));
    };
    let argument = words.next();
    if let Some(extra) = words.next() {
        return Err(err(line, format!("unexpected \"{extra}\" in action")));
    }

    let single_path = |keyword: &str| -> Result<FieldPath, ParseError> {
        let path = argument.ok_or_else(|| err(line, format!("missing value for {keyword}")))?;
        parse_path(path, line)
    };

    match first {
        "if" => Ok(Action::If(single_path("if")?)),
        "range" => Ok(Action::Range(single_path("range")?)),
        "else" | "end" => match argument {
            Some(arg) => Err(err(line, format!("unexpected \"{arg}\" in {first}"))),
            None if first == "else" => Ok(Action::Else),
            None => Ok(Action::End),
        },
        path if path.starts_with('.') => match argument {
            Some(arg) => Err(err(line, format!("unexpected \"{arg}\" after {path}"))),
            None => Ok(Action::Print(parse_path(path, line)?)),
        },
        other => Err(err(line, format!("function \"{other}\" not defined"))),
    }
}

fn parse_path(raw: &str, line: usize) -> Result<FieldPath, ParseError> {
    if raw == "." {
        return Ok(FieldPath(Vec::new()));
    }
    let Some(fields) = raw.strip_prefix('.') else {
        return Err(err(line, format!("expected field path, found \"{raw}\"")));
    };

    let mut segments = Vec::new();
    for segment in fields.split('.') {
        let mut chars = segment.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(err(line, format!("bad field name in \"{raw}\"")));
        }
        segments.push(segment.to_string());
    }
    Ok(FieldPath(segments))
}

/// Where a block currently being filled stands.
struct Frame {
    line: usize,
    kind: FrameKind,
    primary: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

enum FrameKind {
    If(FieldPath),
    Range(FieldPath),
}

impl Frame {
    fn current(&mut self) -> &mut Vec<Node> {
        match &mut self.otherwise {
            Some(nodes) => nodes,
            None => &mut self.primary,
        }
    }

    fn into_node(self) -> Node {
        let otherwise = self.otherwise.unwrap_or_default();
        match self.kind {
            FrameKind::If(cond) => Node::If {
                cond,
                then: self.primary,
                otherwise,
            },
            FrameKind::Range(over) => Node::Range {
                over,
                body: self.primary,
                otherwise,
            },
        }
    }
}

/// Parse template source into a node tree.
pub(crate) fn parse(source: &str) -> Result<Vec<Node>, ParseError> {
    let mut root = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for token in tokenize(source)? {
        let (line, action) = match token {
            Token::Text(text) => {
                current(&mut root, &mut stack).push(Node::Text(text));
                continue;
            }
            Token::Action { line, action } => (line, action),
        };

        match action {
            Action::Comment => {}
            Action::Print(path) => current(&mut root, &mut stack).push(Node::Print(path)),
            Action::If(cond) => stack.push(Frame {
                line,
                kind: FrameKind::If(cond),
                primary: Vec::new(),
                otherwise: None,
            }),
            Action::Range(over) => stack.push(Frame {
                line,
                kind: FrameKind::Range(over),
                primary: Vec::new(),
                otherwise: None,
            }),
            Action::Else => {
                let frame = stack
                    .last_mut()
                    .ok_or_else(|| err(line, "unexpected {{else}}"))?;
                if frame.otherwise.is_some() {
                    return Err(err(line, "expected {{end}}, found second {{else}}"));
                }
                frame.otherwise = Some(Vec::new());
            }
            Action::End => {
                let frame = stack.pop().ok_or_else(|| err(line, "unexpected {{end}}"))?;
                let node = frame.into_node();
                current(&mut root, &mut stack).push(node);
            }
        }
    }

    if let Some(frame) = stack.last() {
        let keyword = match frame.kind {
            FrameKind::If(_) => "if",
            FrameKind::Range(_) => "range",
        };
        return Err(err(
            frame.line,
            format!("unexpected EOF: {{{{{keyword}}}}} has no matching {{{{end}}}}"),
        ));
    }

    Ok(root)
}

fn current<'a>(root: &'a mut Vec<Node>, stack: &'a mut [Frame]) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => frame.current(),
        None => root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> FieldPath {
        FieldPath(segments.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn text_and_fields() {
        let nodes = parse("replicas: {{.replicas}}\nname: {{ .meta.name }}").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("replicas: ".into()),
                Node::Print(path(&["replicas"])),
                Node::Text("\nname: ".into()),
                Node::Print(path(&["meta", "name"])),
            ]
        );
    }

    #[test]
    fn dot_alone_is_empty_path() {
        assert_eq!(parse("{{.}}").unwrap(), vec![Node::Print(path(&[]))]);
    }

    #[test]
    fn trim_markers_eat_whitespace() {
        let nodes = parse("a  \n {{- .x -}} \n  b").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("a".into()),
                Node::Print(path(&["x"])),
                Node::Text("b".into()),
            ]
        );
    }

    #[test]
    fn dash_without_space_is_not_a_trim_marker() {
        let err = parse("a {{-.x}}").unwrap_err();
        assert!(err.message.contains("not defined") || err.message.contains("expected"));
    }

    #[test]
    fn comments_are_dropped() {
        let nodes = parse("a{{/* ignore {{ me }} */}}b").unwrap();
        assert_eq!(nodes, vec![Node::Text("a".into()), Node::Text("b".into())]);
    }

    #[test]
    fn nested_blocks() {
        let nodes = parse("{{if .a}}{{range .items}}{{.}}{{else}}none{{end}}{{end}}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::If {
                cond: path(&["a"]),
                then: vec![Node::Range {
                    over: path(&["items"]),
                    body: vec![Node::Print(path(&[]))],
                    otherwise: vec![Node::Text("none".into())],
                }],
                otherwise: vec![],
            }]
        );
    }

    #[test]
    fn errors_report_line() {
        let err = parse("ok\nok\n{{ .x").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.message, "unclosed action");
        assert_eq!(err.to_string(), "line 3: unclosed action");
    }

    #[test]
    fn rejects_malformed_actions() {
        for source in [
            "{{}}",
            "{{ foo }}",
            "{{ .a b }}",
            "{{ .a..b }}",
            "{{ .a-b }}",
            "{{ end }}",
            "{{ else }}",
            "{{ if }}{{ end }}",
            "{{ if .a }}x",
            "{{ if .a }}{{ else }}{{ else }}{{ end }}",
            "{{/* open",
        ] {
            assert!(parse(source).is_err(), "expected parse error for {source:?}");
        }
    }

    #[test]
    fn field_path_display() {
        assert_eq!(path(&[]).to_string(), ".");
        assert_eq!(path(&["a", "b"]).to_string(), ".a.b");
    }
}
