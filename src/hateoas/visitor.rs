use super::{extract_resource_registry, HateoasContext};
use crate::service::Service;

/// Records the named resources of each visited service in a shared [`HateoasContext`].
pub struct HateoasMetadataVisitor<'a> {
    context: &'a HateoasContext,
}

impl<'a> HateoasMetadataVisitor<'a> {
    pub fn new(context: &'a HateoasContext) -> Self {
        Self { context }
    }

    pub fn visit(&self, service: &Service) {
        let registry = extract_resource_registry(service);
        for (name, resources) in registry.resource_mapping {
            for resource in resources {
                self.context
                    .update_hateoas_resource(service.symbol_id, &name, resource);
            }
        }
    }
}
