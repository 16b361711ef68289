use crate::types::{BalType, TypeLattice};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Pattern a literal segment must match to be accepted by an untyped parameter.
pub const ANY_SEGMENT_PATTERN: &str = "[^/]+";

const INT_PATTERN: &str = r"\d+";
const FLOAT_PATTERN: &str = r"\d+\.\d+";
const BOOLEAN_PATTERN: &str = "true|false";

fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{})$", pattern)).expect("segment patterns are valid")
}

static INT_SEGMENT: LazyLock<Regex> = LazyLock::new(|| anchored(INT_PATTERN));
static FLOAT_SEGMENT: LazyLock<Regex> = LazyLock::new(|| anchored(FLOAT_PATTERN));
static BOOLEAN_SEGMENT: LazyLock<Regex> = LazyLock::new(|| anchored(BOOLEAN_PATTERN));
static ANY_SEGMENT: LazyLock<Regex> = LazyLock::new(|| anchored(ANY_SEGMENT_PATTERN));

/// One node of a resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// The root path `.`; only ever the sole segment.
    Dot,
    /// A literal token such as `pets`.
    Named(String),
    /// A typed path parameter.
    Parameter(BalType),
    /// A trailing rest parameter, holding its element type.
    RestParameter(BalType),
}

impl PathSegment {
    pub fn is_rest(&self) -> bool {
        matches!(self, PathSegment::RestParameter(_))
    }

    /// Whether this (target) segment is accepted where `other` (reference) is declared.
    ///
    /// A rest segment compares like a parameter of its element type.
    pub fn matches(&self, other: &PathSegment, lattice: &dyn TypeLattice) -> bool {
        match (self, other) {
            (PathSegment::Dot, PathSegment::Dot) => true,
            (PathSegment::Named(name), PathSegment::Named(other_name)) => name == other_name,
            (
                PathSegment::Named(name),
                PathSegment::Parameter(ty) | PathSegment::RestParameter(ty),
            ) => literal_matches_type(name, ty, lattice),
            (
                PathSegment::Parameter(ty) | PathSegment::RestParameter(ty),
                PathSegment::Parameter(other_ty) | PathSegment::RestParameter(other_ty),
            ) => {
                lattice.is_subtype(&BalType::String, other_ty) || lattice.is_subtype(ty, other_ty)
            }
            _ => false,
        }
    }
}

/// Regular expression a literal path token must fully match to bind to a parameter of `ty`.
pub fn parameter_pattern(ty: &BalType, lattice: &dyn TypeLattice) -> String {
    match lattice.resolve(ty) {
        BalType::Int => INT_PATTERN.to_string(),
        BalType::Float | BalType::Decimal => FLOAT_PATTERN.to_string(),
        BalType::Boolean => BOOLEAN_PATTERN.to_string(),
        _ => match lattice.singleton_literals(ty) {
            Some(literals) if !literals.is_empty() => literals
                .iter()
                .map(|literal| regex::escape(&literal.value()))
                .collect::<Vec<_>>()
                .join("|"),
            _ => ANY_SEGMENT_PATTERN.to_string(),
        },
    }
}

fn literal_matches_type(literal: &str, ty: &BalType, lattice: &dyn TypeLattice) -> bool {
    let regex: &Regex = match lattice.resolve(ty) {
        BalType::Int => &*INT_SEGMENT,
        BalType::Float | BalType::Decimal => &*FLOAT_SEGMENT,
        BalType::Boolean => &*BOOLEAN_SEGMENT,
        _ => match lattice.singleton_literals(ty) {
            Some(literals) if !literals.is_empty() => {
                let matched = literals.iter().any(|l| l.value() == literal);
                debug!("Segment '{}' against literals of {}: {}", literal, ty, matched);
                return matched;
            }
            _ => &*ANY_SEGMENT,
        },
    };
    let matched = regex.is_match(literal);
    debug!("Segment '{}' against /{}/: {}", literal, regex.as_str(), matched);
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ModuleId;
    use crate::types::{Literal, TypeDefinition, TypeRegistry};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDefinition {
            name: "Kind".into(),
            module: ModuleId::new("acme", "store", "store", "1.0.0"),
            ty: BalType::Union(vec![
                BalType::Singleton(Literal::String("cat".into())),
                BalType::Singleton(Literal::String("dog.v2".into())),
            ]),
            constraint: None,
            description: None,
        });
        registry
    }

    fn named(name: &str) -> PathSegment {
        PathSegment::Named(name.to_string())
    }

    #[test]
    fn test_named_against_int_parameter() {
        let r = registry();
        assert!(named("42").matches(&PathSegment::Parameter(BalType::Int), &r));
        assert!(!named("abc").matches(&PathSegment::Parameter(BalType::Int), &r));
        assert!(!named("4a2").matches(&PathSegment::Parameter(BalType::Int), &r));
    }

    #[test]
    fn test_named_against_boolean_and_float() {
        let r = registry();
        assert!(named("true").matches(&PathSegment::Parameter(BalType::Boolean), &r));
        assert!(!named("yes").matches(&PathSegment::Parameter(BalType::Boolean), &r));
        assert!(named("1.5").matches(&PathSegment::Parameter(BalType::Decimal), &r));
        assert!(!named("15").matches(&PathSegment::Parameter(BalType::Float), &r));
    }

    #[test]
    fn test_named_against_singleton_union() {
        let r = registry();
        let kind = PathSegment::Parameter(BalType::named("Kind"));
        assert!(named("cat").matches(&kind, &r));
        assert!(named("dog.v2").matches(&kind, &r));
        assert!(!named("dogxv2").matches(&kind, &r));
        assert!(!named("cow").matches(&kind, &r));
    }

    #[test]
    fn test_named_against_string_parameter() {
        let r = registry();
        assert!(named("anything").matches(&PathSegment::Parameter(BalType::String), &r));
        assert!(named("x").matches(&PathSegment::RestParameter(BalType::String), &r));
    }

    #[test]
    fn test_parameter_against_parameter_is_directional() {
        let r = registry();
        let int = PathSegment::Parameter(BalType::Int);
        let string = PathSegment::Parameter(BalType::String);
        assert!(int.matches(&string, &r));
        assert!(!string.matches(&int, &r));
        assert!(int.matches(&int, &r));
    }

    #[test]
    fn test_mixed_kinds_do_not_match() {
        let r = registry();
        assert!(PathSegment::Dot.matches(&PathSegment::Dot, &r));
        assert!(!PathSegment::Dot.matches(&named("pets"), &r));
        assert!(!named("pets").matches(&PathSegment::Dot, &r));
        assert!(!PathSegment::Parameter(BalType::String).matches(&named("pets"), &r));
        assert!(!PathSegment::Dot.matches(&PathSegment::Parameter(BalType::String), &r));
    }

    #[test]
    fn test_fixed_patterns_are_compiled_anchored() {
        assert_eq!(INT_SEGMENT.as_str(), r"^(?:\d+)$");
        assert_eq!(ANY_SEGMENT.as_str(), "^(?:[^/]+)$");
        assert!(FLOAT_SEGMENT.is_match("0.25"));
        assert!(!BOOLEAN_SEGMENT.is_match("truefalse"));
        assert!(!ANY_SEGMENT.is_match("a/b"));
    }

    #[test]
    fn test_patterns() {
        let r = registry();
        assert_eq!(parameter_pattern(&BalType::Int, &r), r"\d+");
        assert_eq!(parameter_pattern(&BalType::Boolean, &r), "true|false");
        assert_eq!(parameter_pattern(&BalType::named("Kind"), &r), r"cat|dog\.v2");
        assert_eq!(parameter_pattern(&BalType::String, &r), ANY_SEGMENT_PATTERN);
        assert_eq!(
            parameter_pattern(&BalType::Union(vec![BalType::Int, BalType::String]), &r),
            ANY_SEGMENT_PATTERN
        );
    }
}
