//! Ballerina type model and the subtype lattice used by path matching and interceptor merging.
//!
//! The compiler's semantic model is replaced by two pieces:
//!
//! - [`BalType`], a structural description of the subset of Ballerina types an HTTP service
//!   signature can mention (simple types, singletons, unions, arrays, records, errors and
//!   non-data objects such as `http:Caller`), with [`BalType::Named`] references to type
//!   definitions.
//! - the [`TypeLattice`] trait, which answers subtype queries. [`TypeRegistry`] implements it
//!   over the type definitions loaded from the service model.
//!
//! Type expressions in Ballerina surface syntax are parsed by [`parse::parse_type`].

pub mod parse;

use crate::constraint::ConstraintAnnotation;
use crate::extension::ModuleId;
use indexmap::IndexSet;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Recursion limit for subtype checks through named references.
const MAX_SUBTYPE_DEPTH: usize = 32;

/// Object type returned by request interceptors to continue the chain.
pub const NEXT_SERVICE: &str = "http:NextService";

/// Literal value of a singleton type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    /// Kept in source form so the literal stays hashable.
    Float(String),
    Boolean(bool),
}

impl Literal {
    /// The simple type this literal belongs to.
    pub fn base_type(&self) -> BalType {
        match self {
            Literal::String(_) => BalType::String,
            Literal::Int(_) => BalType::Int,
            Literal::Float(_) => BalType::Float,
            Literal::Boolean(_) => BalType::Boolean,
        }
    }

    /// The value as it appears in a request path (string quotes stripped).
    pub fn value(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => f.clone(),
            Literal::Boolean(b) => b.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Literal::String(s) => serde_json::Value::String(s.clone()),
            Literal::Int(i) => serde_json::Value::from(*i),
            Literal::Float(f) => f
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.clone())),
            Literal::Boolean(b) => serde_json::Value::Bool(*b),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other.value()),
        }
    }
}

/// Reference to a type definition, optionally qualified by a module prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub prefix: Option<String>,
    pub name: String,
}

impl TypeName {
    pub fn new(name: &str) -> Self {
        Self {
            prefix: None,
            name: name.to_string(),
        }
    }

    pub fn qualified(prefix: &str, name: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordField {
    pub name: String,
    pub ty: BalType,
    pub optional: bool,
    pub constraint: Option<ConstraintAnnotation>,
    pub description: Option<String>,
}

/// An (open) record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordType {
    pub fields: Vec<RecordField>,
}

impl RecordType {
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A Ballerina type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BalType {
    Int,
    Float,
    Decimal,
    Boolean,
    String,
    Nil,
    Anydata,
    Any,
    Singleton(Literal),
    Union(Vec<BalType>),
    Array(Box<BalType>),
    Record(RecordType),
    Named(TypeName),
    /// `error`, or a named error type.
    Error(Option<String>),
    /// Non-data object types such as `http:Caller` or `http:NextService`.
    Object(String),
}

impl BalType {
    pub fn named(name: &str) -> Self {
        BalType::Named(TypeName::new(name))
    }

    pub fn optional(inner: BalType) -> Self {
        BalType::Union(vec![inner, BalType::Nil])
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, BalType::Nil)
    }
}

impl fmt::Display for BalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BalType::Int => write!(f, "int"),
            BalType::Float => write!(f, "float"),
            BalType::Decimal => write!(f, "decimal"),
            BalType::Boolean => write!(f, "boolean"),
            BalType::String => write!(f, "string"),
            BalType::Nil => write!(f, "()"),
            BalType::Anydata => write!(f, "anydata"),
            BalType::Any => write!(f, "any"),
            BalType::Singleton(literal) => write!(f, "{}", literal),
            BalType::Union(members) => {
                let parts: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "{}", parts.join("|"))
            }
            BalType::Array(inner) => match inner.as_ref() {
                BalType::Union(_) => write!(f, "({})[]", inner),
                _ => write!(f, "{}[]", inner),
            },
            BalType::Record(record) => {
                let fields: Vec<String> = record
                    .fields
                    .iter()
                    .map(|field| {
                        let marker = if field.optional { "?" } else { "" };
                        format!("{} {}{};", field.ty, field.name, marker)
                    })
                    .collect();
                write!(f, "record {{{}}}", fields.join(" "))
            }
            BalType::Named(name) => write!(f, "{}", name),
            BalType::Error(Some(name)) => write!(f, "{}", name),
            BalType::Error(None) => write!(f, "error"),
            BalType::Object(name) => write!(f, "{}", name),
        }
    }
}

/// A named type declared in a module.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub name: String,
    pub module: ModuleId,
    pub ty: BalType,
    pub constraint: Option<ConstraintAnnotation>,
    pub description: Option<String>,
}

/// Subtype queries over Ballerina types.
///
/// Only `is_subtype`, `resolve` and `lookup` need an implementation; the rest is derived.
pub trait TypeLattice {
    /// `sub <: sup`
    fn is_subtype(&self, sub: &BalType, sup: &BalType) -> bool;

    /// Strip named references until a structural type is reached.
    /// Unknown names resolve to themselves.
    fn resolve<'a>(&'a self, ty: &'a BalType) -> &'a BalType;

    /// Find the definition behind a named reference.
    fn lookup(&self, name: &TypeName) -> Option<&TypeDefinition>;

    fn is_anydata(&self, ty: &BalType) -> bool {
        self.is_subtype(ty, &BalType::Anydata)
    }

    fn is_union(&self, ty: &BalType) -> bool {
        matches!(self.resolve(ty), BalType::Union(_))
    }

    /// Members of a union, or the type itself.
    fn union_members(&self, ty: &BalType) -> Vec<BalType> {
        match self.resolve(ty) {
            BalType::Union(members) => members.clone(),
            _ => vec![ty.clone()],
        }
    }

    /// Union of `members`, flattening nested unions and dropping duplicates.
    /// Returns `None` for an empty list and the member itself for a single one.
    fn union_of(&self, members: &[BalType]) -> Option<BalType> {
        let mut flat: IndexSet<BalType> = IndexSet::new();
        for member in members {
            match member {
                BalType::Union(parts) => flat.extend(parts.iter().cloned()),
                other => {
                    flat.insert(other.clone());
                }
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(BalType::Union(flat.into_iter().collect())),
        }
    }

    fn is_singleton(&self, ty: &BalType) -> bool {
        matches!(self.resolve(ty), BalType::Singleton(_))
    }

    fn singleton_literal<'a>(&'a self, ty: &'a BalType) -> Option<&'a Literal> {
        match self.resolve(ty) {
            BalType::Singleton(literal) => Some(literal),
            _ => None,
        }
    }

    /// Literals of a type made only of singletons, looking through references and unions.
    /// `None` as soon as any member is not a singleton.
    fn singleton_literals(&self, ty: &BalType) -> Option<Vec<Literal>> {
        match self.resolve(ty) {
            BalType::Singleton(literal) => Some(vec![literal.clone()]),
            BalType::Union(members) => {
                let mut literals = Vec::new();
                for member in members {
                    literals.extend(self.singleton_literals(member)?);
                }
                Some(literals)
            }
            _ => None,
        }
    }
}

/// Type definitions of all loaded modules.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    definitions: HashMap<String, Vec<TypeDefinition>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: TypeDefinition) {
        debug!(
            "Registering type {}:{}",
            definition.module.module, definition.name
        );
        self.definitions
            .entry(definition.name.clone())
            .or_default()
            .push(definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Lookup by full module coordinates.
    pub fn lookup_qualified(
        &self,
        org: &str,
        module: &str,
        version: &str,
        name: &str,
    ) -> Option<&TypeDefinition> {
        self.definitions.get(name)?.iter().find(|d| {
            d.module.org == org && d.module.module == module && d.module.version == version
        })
    }

    fn subtype(&self, sub: &BalType, sup: &BalType, depth: usize) -> bool {
        if depth > MAX_SUBTYPE_DEPTH {
            debug!("Subtype check {} <: {} exceeded depth limit", sub, sup);
            return false;
        }
        if sub == sup {
            return true;
        }

        match (sub, sup) {
            (BalType::Named(a), BalType::Named(b)) if a.name == b.name => {
                self.lookup(a).map(|d| &d.module) == self.lookup(b).map(|d| &d.module)
                    || self.subtype(self.resolve(sub), self.resolve(sup), depth + 1)
            }
            (BalType::Named(_), BalType::Anydata) => self.anydata(sub, &mut HashSet::new()),
            (BalType::Named(_), _) => {
                let resolved = self.resolve(sub);
                resolved != sub && self.subtype(resolved, sup, depth + 1)
            }
            (_, BalType::Named(_)) => {
                let resolved = self.resolve(sup);
                resolved != sup && self.subtype(sub, resolved, depth + 1)
            }
            (BalType::Union(members), _) => {
                members.iter().all(|m| self.subtype(m, sup, depth + 1))
            }
            (_, BalType::Union(members)) => {
                members.iter().any(|m| self.subtype(sub, m, depth + 1))
            }
            (_, BalType::Any) => !matches!(sub, BalType::Error(_)),
            (_, BalType::Anydata) => self.anydata(sub, &mut HashSet::new()),
            (BalType::Singleton(literal), _) => &literal.base_type() == sup,
            (BalType::Array(a), BalType::Array(b)) => self.subtype(a, b, depth + 1),
            (BalType::Record(a), BalType::Record(b)) => b.fields.iter().all(|wanted| {
                match a.field(&wanted.name) {
                    Some(found) => {
                        (!found.optional || wanted.optional)
                            && self.subtype(&found.ty, &wanted.ty, depth + 1)
                    }
                    None => wanted.optional,
                }
            }),
            (BalType::Error(_), BalType::Error(None)) => true,
            _ => false,
        }
    }

    /// `ty <: anydata`. `visiting` holds the named types on the current path; a name seen
    /// again is a recursive reference and is taken as anydata.
    fn anydata<'a>(&'a self, ty: &'a BalType, visiting: &mut HashSet<&'a TypeName>) -> bool {
        match ty {
            BalType::Int
            | BalType::Float
            | BalType::Decimal
            | BalType::Boolean
            | BalType::String
            | BalType::Nil
            | BalType::Anydata
            | BalType::Singleton(_) => true,
            BalType::Any | BalType::Error(_) | BalType::Object(_) => false,
            BalType::Union(members) => members.iter().all(|m| self.anydata(m, visiting)),
            BalType::Array(inner) => self.anydata(inner, visiting),
            BalType::Record(record) => record.fields.iter().all(|f| self.anydata(&f.ty, visiting)),
            BalType::Named(name) => {
                if !visiting.insert(name) {
                    return true;
                }
                let resolved = self.resolve(ty);
                let result = resolved != ty && self.anydata(resolved, visiting);
                visiting.remove(name);
                result
            }
        }
    }
}

impl TypeLattice for TypeRegistry {
    fn is_subtype(&self, sub: &BalType, sup: &BalType) -> bool {
        self.subtype(sub, sup, 0)
    }

    fn resolve<'a>(&'a self, ty: &'a BalType) -> &'a BalType {
        let mut current = ty;
        for _ in 0..MAX_SUBTYPE_DEPTH {
            match current {
                BalType::Named(name) => match self.lookup(name) {
                    Some(definition) => current = &definition.ty,
                    None => return current,
                },
                _ => return current,
            }
        }
        current
    }

    fn lookup(&self, name: &TypeName) -> Option<&TypeDefinition> {
        let candidates = self.definitions.get(&name.name)?;
        match &name.prefix {
            Some(prefix) => candidates
                .iter()
                .find(|d| d.module.prefix() == prefix)
                .or_else(|| candidates.first()),
            None => candidates.first(),
        }
    }
}
