//! Resource path matching.
//!
//! Interceptor services declare resource paths too, and an interceptor only runs for a
//! request when its path accepts everything the target resource's path accepts. Both paths
//! are turned into a sequence of [`PathSegment`]s and compared segment by segment:
//!
//! - literal segments compare by equality,
//! - a literal against a typed parameter must fully match the parameter type's pattern,
//! - a parameter against a parameter compares types through the [`TypeLattice`],
//! - a rest parameter at the end of the reference accepts any remaining target suffix.
//!
//! Matching is directional: `matches(target, reference)` asks whether the reference path
//! can receive requests destined for the target path.

pub mod resource;
pub mod segment;

pub use resource::ResourceMatcher;
pub use segment::PathSegment;

use crate::resource_path::{PathNode, ResourcePath};
use crate::types::TypeLattice;
use log::debug;

/// The segments of one resource path. Only the last segment may be a rest parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegments {
    segments: Vec<PathSegment>,
}

impl PathSegments {
    pub fn build(path: &ResourcePath) -> Self {
        let segments = match path {
            ResourcePath::Dot => vec![PathSegment::Dot],
            ResourcePath::Rest(rest) => vec![PathSegment::RestParameter(rest.ty.clone())],
            ResourcePath::Segments { segments, rest } => segments
                .iter()
                .map(|node| match node {
                    PathNode::Named(name) => PathSegment::Named(name.clone()),
                    PathNode::Param(param) => PathSegment::Parameter(param.ty.clone()),
                })
                .chain(rest.iter().map(|r| PathSegment::RestParameter(r.ty.clone())))
                .collect(),
        };
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `reference` accepts every request `target` accepts.
    pub fn matches(target: &PathSegments, reference: &PathSegments, lattice: &dyn TypeLattice) -> bool {
        let mut index = 0;
        loop {
            match (target.segments.get(index), reference.segments.get(index)) {
                (None, None) => return true,
                (None, Some(next)) => {
                    // An empty suffix still satisfies a trailing rest parameter.
                    return next.is_rest() && index + 1 == reference.len();
                }
                (Some(_), None) => return false,
                (Some(current), Some(expected)) => {
                    if !current.matches(expected, lattice) {
                        debug!("Segment {:?} rejected by {:?}", current, expected);
                        return false;
                    }
                    // A reference rest parameter absorbs the rest of the target, including a
                    // target rest parameter, whose element type is not compared any further.
                    if expected.is_rest() {
                        return true;
                    }
                }
            }
            index += 1;
        }
    }

    /// Convenience form of [`PathSegments::matches`] with `self` as the target.
    pub fn matched_by(&self, reference: &PathSegments, lattice: &dyn TypeLattice) -> bool {
        Self::matches(self, reference, lattice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRegistry;

    fn segments(path: &str) -> PathSegments {
        PathSegments::build(&ResourcePath::parse(path).unwrap())
    }

    fn matches(target: &str, reference: &str) -> bool {
        PathSegments::matches(&segments(target), &segments(reference), &TypeRegistry::new())
    }

    #[test]
    fn test_build_shapes() {
        assert_eq!(segments(".").segments(), &[PathSegment::Dot]);
        let built = segments("pets/[int id]/[string... rest]");
        assert_eq!(built.len(), 3);
        assert_eq!(built.first(), Some(&PathSegment::Named("pets".into())));
        assert!(built.last().unwrap().is_rest());
        assert!(segments("[string... rest]").first().unwrap().is_rest());
    }

    #[test]
    fn test_identical_paths_match() {
        assert!(matches(".", "."));
        assert!(matches("pets", "pets"));
        assert!(matches("pets/[int id]", "pets/[int id]"));
        assert!(!matches("pets", "owners"));
        assert!(!matches(".", "pets"));
    }

    #[test]
    fn test_string_parameter_accepts_specific_parameter() {
        assert!(matches("pets/[int id]", "pets/[string name]"));
        assert!(!matches("pets/[string name]", "pets/[int id]"));
    }

    #[test]
    fn test_literal_target_against_typed_reference() {
        assert!(matches("pets/42", "pets/[int id]"));
        assert!(!matches("pets/abc", "pets/[int id]"));
        assert!(matches("flags/true", "flags/[boolean flag]"));
    }

    #[test]
    fn test_reference_rest_accepts_longer_target() {
        assert!(matches("pets/anything/else", "pets/[string... rest]"));
        assert!(matches("pets/[int id]/tags", "[string... path]"));
        assert!(matches("pets", "pets/[string... rest]"));
        assert!(!matches("owners/x", "pets/[string... rest]"));
    }

    #[test]
    fn test_target_rest_against_fixed_reference() {
        assert!(!matches("pets/[string... rest]", "pets/anything/else"));
        assert!(!matches("pets/[string... rest]", "pets/[string name]/else"));
    }

    #[test]
    fn test_rest_against_rest_short_circuits() {
        assert!(matches("pets/[int... ids]", "pets/[string... rest]"));
        assert!(matches("[string... a]", "[string... b]"));
    }

    #[test]
    fn test_length_mismatch_without_rest() {
        assert!(!matches("pets/[int id]", "pets"));
        assert!(!matches("pets", "pets/[int id]"));
    }

    #[test]
    fn test_matched_by_delegates() {
        let target = segments("pets/[int id]");
        let reference = segments("pets/[string id]");
        assert!(target.matched_by(&reference, &TypeRegistry::new()));
    }
}
