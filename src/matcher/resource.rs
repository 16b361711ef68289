use super::PathSegments;
use crate::resource_path::unescape_identifier;
use crate::service::{ResourceFunction, DEFAULT_METHOD};
use crate::types::TypeLattice;
use log::debug;

/// Decides whether one resource function receives the requests of another.
pub struct ResourceMatcher;

impl ResourceMatcher {
    /// True when `reference` (an interceptor's resource) handles requests for `target`.
    ///
    /// The methods must agree (case-insensitively) unless the reference is the `default`
    /// accessor; the paths are then compared with [`PathSegments::matches`].
    pub fn matches(
        reference: &ResourceFunction,
        target: &ResourceFunction,
        lattice: &dyn TypeLattice,
    ) -> bool {
        let reference_method = unescape_identifier(&reference.method);
        let target_method = unescape_identifier(&target.method);

        if !reference_method.eq_ignore_ascii_case(DEFAULT_METHOD)
            && !reference_method.eq_ignore_ascii_case(&target_method)
        {
            debug!(
                "Method {} does not accept {}",
                reference_method, target_method
            );
            return false;
        }

        PathSegments::matches(
            &PathSegments::build(&target.path),
            &PathSegments::build(&reference.path),
            lattice,
        )
    }
}
