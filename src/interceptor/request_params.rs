use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::service::ResourceParam;
use crate::types::{BalType, TypeLattice};
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;

/// A parameter exposed by the interceptor chain and the stage it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameter {
    pub param: ResourceParam,
    pub origin: String,
}

impl RequestParameter {
    pub fn ty(&self) -> &BalType {
        &self.param.ty
    }
}

/// Outcome of merging one parameter into [`RequestParameterInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterMerge {
    /// Recorded; carries the type now in effect.
    Merged(BalType),
    /// Unrelated types, settled in favour of the target resource.
    Defaulted(BalType, Diagnostic),
    /// Unrelated types from an interceptor; the existing entry is kept.
    Rejected(Diagnostic),
}

/// Data-bound parameters of an interceptor chain, by name.
#[derive(Debug, Clone, Default)]
pub struct RequestParameterInfo {
    params: IndexMap<String, RequestParameter>,
}

impl RequestParameterInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `param`, seen in the stage `origin`.
    ///
    /// The more specific of two related types wins. Unrelated types are resolved in favour
    /// of the target resource when `from_target` is set and rejected otherwise.
    pub fn update(
        &mut self,
        param: &ResourceParam,
        origin: &str,
        from_target: bool,
        lattice: &dyn TypeLattice,
    ) -> ParameterMerge {
        let incoming = RequestParameter {
            param: param.clone(),
            origin: origin.to_string(),
        };

        let existing = match self.params.entry(param.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
                return ParameterMerge::Merged(param.ty.clone());
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        if lattice.is_subtype(&param.ty, existing.ty()) {
            debug!(
                "Parameter {}: {} narrows {}",
                param.name,
                param.ty,
                existing.ty()
            );
            *existing = incoming;
            return ParameterMerge::Merged(param.ty.clone());
        }
        if lattice.is_subtype(existing.ty(), &param.ty) {
            return ParameterMerge::Merged(existing.ty().clone());
        }

        if from_target {
            let diagnostic = Diagnostic::warning(DiagnosticKind::DefaultedToTargetType {
                param: param.name.clone(),
                ty: param.ty.to_string(),
            });
            *existing = incoming;
            return ParameterMerge::Defaulted(param.ty.clone(), diagnostic);
        }

        ParameterMerge::Rejected(Diagnostic::warning(
            DiagnosticKind::IncompatibleParameterType {
                param: param.name.clone(),
                existing: existing.ty().to_string(),
                incoming: param.ty.to_string(),
            },
        ))
    }

    pub fn get(&self, name: &str) -> Option<&RequestParameter> {
        self.params.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestParameter> {
        self.params.values()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
