use crate::types::{BalType, TypeLattice};
use indexmap::IndexSet;

/// Return types collected along an interceptor chain.
///
/// Both sets keep insertion order and ignore duplicates, so a union built from them lists
/// members in declaration order of the interceptors and the resource.
#[derive(Debug, Clone, Default)]
pub struct ResponseInfo {
    return_types_from_interceptors: IndexSet<BalType>,
    return_types_from_target_resource: IndexSet<BalType>,
    has_unhandled_data_binding_errors: bool,
}

impl ResponseInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_interceptor_return_type(&mut self, ty: BalType) {
        self.return_types_from_interceptors.insert(ty);
    }

    pub fn add_target_return_type(&mut self, ty: BalType) {
        self.return_types_from_target_resource.insert(ty);
    }

    pub fn return_types_from_interceptors(&self) -> &IndexSet<BalType> {
        &self.return_types_from_interceptors
    }

    pub fn return_types_from_target_resource(&self) -> &IndexSet<BalType> {
        &self.return_types_from_target_resource
    }

    /// A stage with data binding may fail before the target runs.
    pub fn mark_data_binding_error(&mut self) {
        self.has_unhandled_data_binding_errors = true;
    }

    /// An error interceptor further down the chain turns pending binding errors into
    /// its own responses.
    pub fn mark_data_binding_error_handled(&mut self) {
        self.has_unhandled_data_binding_errors = false;
    }

    pub fn has_unhandled_data_binding_errors(&self) -> bool {
        self.has_unhandled_data_binding_errors
    }

    pub fn interceptor_return_type(&self, lattice: &dyn TypeLattice) -> Option<BalType> {
        Self::build_type_from_list(&self.return_types_from_interceptors, lattice)
    }

    pub fn target_return_type(&self, lattice: &dyn TypeLattice) -> Option<BalType> {
        Self::build_type_from_list(&self.return_types_from_target_resource, lattice)
    }

    /// `None` for no types, the type itself for one, their union otherwise.
    pub fn build_type_from_list(
        types: &IndexSet<BalType>,
        lattice: &dyn TypeLattice,
    ) -> Option<BalType> {
        match types.len() {
            0 => None,
            1 => types.first().cloned(),
            _ => lattice.union_of(&types.iter().cloned().collect::<Vec<_>>()),
        }
    }
}
