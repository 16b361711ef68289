//! Parser for Ballerina type expressions as they appear in the service model.
//!
//! Supported grammar:
//!
//! ```text
//! union   := postfix ('|' postfix)*
//! postfix := primary ('[]' | '?')*
//! primary := '(' ')' | '(' union ')' | string-literal | number | ident (':' ident)?
//! ```
//!
//! Module-qualified names with the `http` prefix denote library objects (`http:Caller`,
//! `http:NextService`, status-code responses) and become [`BalType::Object`]; every other
//! non built-in name is a [`BalType::Named`] reference resolved later through the registry.

use super::{BalType, Literal, TypeName};
use crate::error::{Error, Result};

/// Module prefix of the Ballerina HTTP library.
pub const HTTP_PREFIX: &str = "http";

/// Parse a type expression.
pub fn parse_type(input: &str) -> Result<BalType> {
    let mut parser = TypeParser {
        input,
        chars: input.char_indices().collect(),
        pos: 0,
    };
    let ty = parser.parse_union()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(ty)
}

struct TypeParser<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or(self.input.len())
    }

    fn error(&self, message: &str) -> Error {
        Error::TypeSyntax {
            input: self.input.to_string(),
            position: self.offset(),
            message: message.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_union(&mut self) -> Result<BalType> {
        let mut members = vec![self.parse_postfix()?];
        while self.eat('|') {
            members.push(self.parse_postfix()?);
        }
        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        let mut flat = Vec::new();
        for member in members {
            match member {
                BalType::Union(parts) => flat.extend(parts),
                other => flat.push(other),
            }
        }
        Ok(BalType::Union(flat))
    }

    fn parse_postfix(&mut self) -> Result<BalType> {
        let mut ty = self.parse_primary()?;
        loop {
            if self.eat('[') {
                if !self.eat(']') {
                    return Err(self.error("expected ']'"));
                }
                ty = BalType::Array(Box::new(ty));
            } else if self.eat('?') {
                ty = match ty {
                    BalType::Union(mut members) => {
                        if !members.contains(&BalType::Nil) {
                            members.push(BalType::Nil);
                        }
                        BalType::Union(members)
                    }
                    BalType::Nil => BalType::Nil,
                    other => BalType::optional(other),
                };
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<BalType> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                if self.eat(')') {
                    return Ok(BalType::Nil);
                }
                let inner = self.parse_union()?;
                if !self.eat(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            Some('"') => self.parse_string_literal(),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' || c == '\'' => self.parse_reference(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("expected a type")),
        }
    }

    fn parse_string_literal(&mut self) -> Result<BalType> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.pos += 1;
                    return Ok(BalType::Singleton(Literal::String(value)));
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => {
                            value.push(c);
                            self.pos += 1;
                        }
                        None => return Err(self.error("unterminated escape")),
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }

    fn parse_number(&mut self) -> Result<BalType> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().map(|(_, c)| c).collect();
        if text.contains('.') {
            if text.parse::<f64>().is_err() {
                return Err(self.error("invalid float literal"));
            }
            return Ok(BalType::Singleton(Literal::Float(text)));
        }
        text.parse::<i64>()
            .map(|i| BalType::Singleton(Literal::Int(i)))
            .map_err(|_| self.error("invalid int literal"))
    }

    fn parse_identifier(&mut self) -> Result<String> {
        self.skip_whitespace();
        if self.peek() == Some('\'') {
            self.pos += 1;
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().map(|(_, c)| c).collect())
    }

    fn parse_reference(&mut self) -> Result<BalType> {
        let first = self.parse_identifier()?;
        if self.peek() == Some(':') {
            self.pos += 1;
            let name = self.parse_identifier()?;
            if first == HTTP_PREFIX {
                return Ok(BalType::Object(format!("{}:{}", first, name)));
            }
            return Ok(BalType::Named(TypeName::qualified(&first, &name)));
        }

        let ty = match first.as_str() {
            "int" | "byte" => BalType::Int,
            "float" => BalType::Float,
            "decimal" => BalType::Decimal,
            "boolean" => BalType::Boolean,
            "string" => BalType::String,
            "anydata" | "json" => BalType::Anydata,
            "any" => BalType::Any,
            "error" => BalType::Error(None),
            "true" => BalType::Singleton(Literal::Boolean(true)),
            "false" => BalType::Singleton(Literal::Boolean(false)),
            "null" => BalType::Nil,
            _ => BalType::Named(TypeName::new(&first)),
        };
        Ok(ty)
    }
}
