//! Ballerina relative resource paths.
//!
//! A resource function such as `resource function get pets/[int id]/tags/[string... rest]`
//! declares its path as a sequence of literal identifiers and bracketed path parameters,
//! optionally ending in a rest parameter. The root path is written `.`.

use crate::error::{Error, Result};
use crate::types::parse::parse_type;
use crate::types::BalType;
use std::fmt;

/// A typed path parameter. The name may be omitted in Ballerina (`[int]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: Option<String>,
    /// For rest parameters this is the element type.
    pub ty: BalType,
}

/// A non-rest path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    Named(String),
    Param(PathParam),
}

/// The three shapes a resource path can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePath {
    /// `.`
    Dot,
    /// Literal and parameter segments with an optional trailing rest parameter.
    Segments {
        segments: Vec<PathNode>,
        rest: Option<PathParam>,
    },
    /// A bare rest parameter, e.g. `[string... path]`.
    Rest(PathParam),
}

/// Remove Ballerina identifier escapes: a leading `'` and backslash escapes.
pub fn unescape_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim();
    let body = trimmed.strip_prefix('\'').unwrap_or(trimmed);
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl ResourcePath {
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() || trimmed == "." {
            return Ok(ResourcePath::Dot);
        }

        let raw_segments = split_segments(trimmed).map_err(|message| Error::PathSyntax {
            path: path.to_string(),
            message,
        })?;

        let mut segments = Vec::new();
        let mut rest = None;
        let count = raw_segments.len();
        for (index, raw) in raw_segments.into_iter().enumerate() {
            if raw.is_empty() {
                return Err(Error::PathSyntax {
                    path: path.to_string(),
                    message: "empty path segment".to_string(),
                });
            }
            match raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                Some(inner) => {
                    let (param, is_rest) = parse_param(inner)?;
                    if is_rest {
                        if index + 1 != count {
                            return Err(Error::PathSyntax {
                                path: path.to_string(),
                                message: "rest parameter must be the last segment".to_string(),
                            });
                        }
                        rest = Some(param);
                    } else {
                        segments.push(PathNode::Param(param));
                    }
                }
                None => segments.push(PathNode::Named(unescape_identifier(&raw))),
            }
        }

        Ok(match (segments.is_empty(), rest) {
            (true, Some(rest)) => ResourcePath::Rest(rest),
            (_, rest) => ResourcePath::Segments { segments, rest },
        })
    }

    /// Path parameters in declaration order, the rest parameter last.
    pub fn params(&self) -> Vec<&PathParam> {
        match self {
            ResourcePath::Dot => Vec::new(),
            ResourcePath::Rest(rest) => vec![rest],
            ResourcePath::Segments { segments, rest } => segments
                .iter()
                .filter_map(|node| match node {
                    PathNode::Param(param) => Some(param),
                    PathNode::Named(_) => None,
                })
                .chain(rest.iter())
                .collect(),
        }
    }

    pub fn has_params(&self) -> bool {
        !self.params().is_empty()
    }

    pub fn has_rest(&self) -> bool {
        match self {
            ResourcePath::Rest(_) => true,
            ResourcePath::Segments { rest, .. } => rest.is_some(),
            ResourcePath::Dot => false,
        }
    }

    /// Tokens of the path: literal names and parameter names.
    pub fn tokens(&self) -> Vec<String> {
        let param_token = |param: &PathParam| param.name.clone().unwrap_or_default();
        match self {
            ResourcePath::Dot => Vec::new(),
            ResourcePath::Rest(rest) => vec![param_token(rest)],
            ResourcePath::Segments { segments, rest } => segments
                .iter()
                .map(|node| match node {
                    PathNode::Named(name) => name.clone(),
                    PathNode::Param(param) => param_token(param),
                })
                .chain(rest.iter().map(param_token))
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    /// The path in OpenAPI template form, e.g. `/pets/{id}`.
    pub fn to_openapi(&self) -> String {
        let template = |param: &PathParam| format!("{{{}}}", param.name.as_deref().unwrap_or("param"));
        let parts: Vec<String> = match self {
            ResourcePath::Dot => Vec::new(),
            ResourcePath::Rest(rest) => vec![template(rest)],
            ResourcePath::Segments { segments, rest } => segments
                .iter()
                .map(|node| match node {
                    PathNode::Named(name) => name.clone(),
                    PathNode::Param(param) => template(param),
                })
                .chain(rest.iter().map(template))
                .collect(),
        };
        format!("/{}", parts.join("/"))
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let param = |p: &PathParam, rest: bool| {
            let dots = if rest { "..." } else { "" };
            match &p.name {
                Some(name) => format!("[{}{} {}]", p.ty, dots, name),
                None => format!("[{}{}]", p.ty, dots),
            }
        };
        match self {
            ResourcePath::Dot => write!(f, "."),
            ResourcePath::Rest(rest) => write!(f, "{}", param(rest, true)),
            ResourcePath::Segments { segments, rest } => {
                let parts: Vec<String> = segments
                    .iter()
                    .map(|node| match node {
                        PathNode::Named(name) => name.clone(),
                        PathNode::Param(p) => param(p, false),
                    })
                    .chain(rest.iter().map(|p| param(p, true)))
                    .collect();
                write!(f, "{}", parts.join("/"))
            }
        }
    }
}

/// Split on `/` outside brackets and string literals.
fn split_segments(path: &str) -> std::result::Result<Vec<String>, String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in path.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '"' if depth > 0 => {
                in_string = !in_string;
                current.push(c);
            }
            '[' if !in_string => {
                depth += 1;
                current.push(c);
            }
            ']' if !in_string => {
                depth = depth.checked_sub(1).ok_or("unbalanced ']'")?;
                current.push(c);
            }
            '/' if depth == 0 => segments.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    if depth != 0 || in_string {
        return Err("unbalanced '['".to_string());
    }
    segments.push(current.trim().to_string());
    Ok(segments)
}

/// Parse the inside of `[...]`; returns the parameter and whether it is a rest parameter.
fn parse_param(inner: &str) -> Result<(PathParam, bool)> {
    let inner = inner.trim();
    if let Some(index) = inner.rfind("...") {
        let ty = parse_type(&inner[..index])?;
        let name = inner[index + 3..].trim();
        let name = (!name.is_empty()).then(|| unescape_identifier(name));
        return Ok((PathParam { name, ty }, true));
    }

    if let Some((head, tail)) = inner.rsplit_once(char::is_whitespace) {
        let tail = tail.trim();
        let looks_like_name = tail
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '\'' || c == '\\');
        if looks_like_name && !head.trim().is_empty() && !tail.is_empty() {
            if let Ok(ty) = parse_type(head) {
                return Ok((
                    PathParam {
                        name: Some(unescape_identifier(tail)),
                        ty,
                    },
                    false,
                ));
            }
        }
    }

    Ok((
        PathParam {
            name: None,
            ty: parse_type(inner)?,
        },
        false,
    ))
}
