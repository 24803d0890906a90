//! RFC 6570 URI templates (levels 1 through 4).
//!
//! A template is parsed once into literal and expression parts. Expansion
//! takes variable bindings as [`serde_json::Value`]s:
//!
//! | JSON value           | Template value                   |
//! |----------------------|----------------------------------|
//! | `null`               | undefined (expression skipped)   |
//! | string, number, bool | string                           |
//! | array                | list (empty list is undefined)   |
//! | object               | associative array                |
//!
//! Numbers are rendered with their JSON text, so a binding of `0` expands to
//! the literal `0` rather than disappearing.
//!
//! # Examples
//!
//! ```
//! use hal_navigator::template::UriTemplate;
//! use serde_json::json;
//!
//! let template = UriTemplate::parse("http://example.com/users{/id}{?page}").unwrap();
//! let bindings = json!({"id": 42, "page": 0});
//! let uri = template.expand(bindings.as_object().unwrap());
//! assert_eq!(uri, "http://example.com/users/42?page=0");
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::core::{NavigatorError, Result};

/// Matches a single template expression including its braces.
pub static EXPRESSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("expression pattern is a valid regex"));

const MAX_PREFIX_LENGTH: usize = 9999;

/// A parsed URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression {
        operator: Operator,
        specs: Vec<VarSpec>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VarSpec {
    name: String,
    modifier: Modifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    None,
    Prefix(usize),
    Explode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    Reserved,
    Fragment,
    Label,
    Path,
    PathParameter,
    Query,
    QueryContinuation,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Reserved),
            '#' => Some(Self::Fragment),
            '.' => Some(Self::Label),
            '/' => Some(Self::Path),
            ';' => Some(Self::PathParameter),
            '?' => Some(Self::Query),
            '&' => Some(Self::QueryContinuation),
            _ => None,
        }
    }

    const fn first(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => "",
            Self::Fragment => "#",
            Self::Label => ".",
            Self::Path => "/",
            Self::PathParameter => ";",
            Self::Query => "?",
            Self::QueryContinuation => "&",
        }
    }

    const fn separator(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved | Self::Fragment => ",",
            Self::Label => ".",
            Self::Path => "/",
            Self::PathParameter => ";",
            Self::Query | Self::QueryContinuation => "&",
        }
    }

    const fn named(self) -> bool {
        matches!(self, Self::PathParameter | Self::Query | Self::QueryContinuation)
    }

    const fn if_empty(self) -> &'static str {
        match self {
            Self::Query | Self::QueryContinuation => "=",
            _ => "",
        }
    }

    const fn allow_reserved(self) -> bool {
        matches!(self, Self::Reserved | Self::Fragment)
    }
}

enum TemplateValue {
    Scalar(String),
    List(Vec<String>),
    Assoc(Vec<(String, String)>),
}

impl TemplateValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) if items.is_empty() => None,
            Value::Array(items) => Some(Self::List(items.iter().map(scalar_text).collect())),
            Value::Object(map) if map.is_empty() => None,
            Value::Object(map) => {
                Some(Self::Assoc(map.iter().map(|(k, v)| (k.clone(), scalar_text(v))).collect()))
            }
            other => Some(Self::Scalar(scalar_text(other))),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl UriTemplate {
    /// Parse a template, failing on unbalanced braces or malformed expressions.
    pub fn parse(source: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find(['{', '}']) {
            if rest[open..].starts_with('}') {
                return Err(template_error(source, "unmatched '}'"));
            }
            if open > 0 {
                parts.push(Part::Literal(rest[..open].to_string()));
            }
            let close = rest[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| template_error(source, "unterminated expression"))?;
            parts.push(parse_expression(source, &rest[open + 1..close])?);
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }

    /// The template text this was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of every variable referenced by the template.
    pub fn variables(&self) -> BTreeSet<String> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Expression {
                    specs,
                    ..
                } => Some(specs.iter().map(|s| s.name.clone())),
                Part::Literal(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Expand the template. Unbound variables expand to nothing.
    pub fn expand(&self, bindings: &Map<String, Value>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(&encode(text, true)),
                Part::Expression {
                    operator,
                    specs,
                } => expand_expression(&mut out, *operator, specs, bindings),
            }
        }
        out
    }
}

fn template_error(source: &str, reason: &str) -> NavigatorError {
    NavigatorError::Template {
        template: source.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_expression(source: &str, body: &str) -> Result<Part> {
    let mut chars = body.chars();
    let (operator, list) = match chars.next() {
        None => return Err(template_error(source, "empty expression")),
        Some(c) if "=,!@|".contains(c) => {
            return Err(template_error(source, &format!("reserved operator '{c}'")));
        }
        Some(c) => match Operator::from_char(c) {
            Some(op) => (op, chars.as_str()),
            None => (Operator::Simple, body),
        },
    };

    let specs = list.split(',').map(|spec| parse_varspec(source, spec)).collect::<Result<Vec<_>>>()?;

    Ok(Part::Expression {
        operator,
        specs,
    })
}

fn parse_varspec(source: &str, spec: &str) -> Result<VarSpec> {
    let (name, modifier) = if let Some(name) = spec.strip_suffix('*') {
        (name, Modifier::Explode)
    } else if let Some((name, length)) = spec.split_once(':') {
        let length: usize = length
            .parse()
            .ok()
            .filter(|n| (1..=MAX_PREFIX_LENGTH).contains(n))
            .ok_or_else(|| template_error(source, &format!("invalid prefix length in '{spec}'")))?;
        (name, Modifier::Prefix(length))
    } else {
        (spec, Modifier::None)
    };

    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '%');
    if !valid {
        return Err(template_error(source, &format!("invalid variable name '{name}'")));
    }

    Ok(VarSpec {
        name: name.to_string(),
        modifier,
    })
}

fn expand_expression(out: &mut String, operator: Operator, specs: &[VarSpec], bindings: &Map<String, Value>) {
    let allow = operator.allow_reserved();
    let mut first = true;

    for spec in specs {
        let Some(value) = bindings.get(&spec.name).and_then(TemplateValue::from_json) else {
            continue;
        };

        out.push_str(if first {
            operator.first()
        } else {
            operator.separator()
        });
        first = false;

        match value {
            TemplateValue::Scalar(text) => {
                let text = match spec.modifier {
                    Modifier::Prefix(length) => text.chars().take(length).collect(),
                    _ => text,
                };
                if operator.named() {
                    out.push_str(&spec.name);
                    if text.is_empty() {
                        out.push_str(operator.if_empty());
                        continue;
                    }
                    out.push('=');
                }
                out.push_str(&encode(&text, allow));
            }
            TemplateValue::List(items) => {
                if spec.modifier == Modifier::Explode {
                    let joined: Vec<String> = items
                        .iter()
                        .map(|item| named_pair(operator, &spec.name, item, allow))
                        .collect();
                    out.push_str(&joined.join(operator.separator()));
                } else {
                    if operator.named() {
                        let _ = write!(out, "{}=", spec.name);
                    }
                    let joined: Vec<String> = items.iter().map(|item| encode(item, allow)).collect();
                    out.push_str(&joined.join(","));
                }
            }
            TemplateValue::Assoc(pairs) => {
                if spec.modifier == Modifier::Explode {
                    let joined: Vec<String> = pairs
                        .iter()
                        .map(|(k, v)| {
                            if v.is_empty() {
                                format!("{}{}", encode(k, allow), operator.if_empty())
                            } else {
                                format!("{}={}", encode(k, allow), encode(v, allow))
                            }
                        })
                        .collect();
                    out.push_str(&joined.join(operator.separator()));
                } else {
                    if operator.named() {
                        let _ = write!(out, "{}=", spec.name);
                    }
                    let joined: Vec<String> = pairs
                        .iter()
                        .flat_map(|(k, v)| [encode(k, allow), encode(v, allow)])
                        .collect();
                    out.push_str(&joined.join(","));
                }
            }
        }
    }
}

fn named_pair(operator: Operator, name: &str, item: &str, allow: bool) -> String {
    if !operator.named() {
        encode(item, allow)
    } else if item.is_empty() {
        format!("{name}{}", operator.if_empty())
    } else {
        format!("{name}={}", encode(item, allow))
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn is_reserved(b: u8) -> bool {
    matches!(
        b,
        b':' | b'/'
            | b'?'
            | b'#'
            | b'['
            | b']'
            | b'@'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'='
    )
}

fn encode(text: &str, allow_reserved: bool) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let pct_triplet = allow_reserved
            && b == b'%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        if pct_triplet {
            out.push_str(&text[i..i + 3]);
            i += 3;
            continue;
        }
        if is_unreserved(b) || (allow_reserved && is_reserved(b)) {
            out.push(b as char);
        } else {
            let _ = write!(out, "%{b:02X}");
        }
        i += 1;
    }
    out
}

/// Names of the variables referenced by `template`.
pub fn variables(template: &str) -> Result<BTreeSet<String>> {
    Ok(UriTemplate::parse(template)?.variables())
}

/// Expand `template` with `bindings`.
pub fn expand(template: &str, bindings: &Map<String, Value>) -> Result<String> {
    Ok(UriTemplate::parse(template)?.expand(bindings))
}
