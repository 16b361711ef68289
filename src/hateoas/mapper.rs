use super::links::parse_linked_to;
use super::registry::LINKED_TO;
use super::{extract_resource_registry, Service as ResourceRegistry};
use crate::openapi_builder::{Link, OpenApiDocument};
use crate::service::{Service, RESOURCE_CONFIG};
use indexmap::IndexMap;
use log::{debug, warn};

/// Adds OpenAPI links for `linkedTo` references to a built document.
pub struct HateoasMapper;

impl HateoasMapper {
    pub fn set_open_api_links(service: &Service, document: &mut OpenApiDocument) {
        let registry = extract_resource_registry(service);
        if registry.is_empty() {
            return;
        }

        for resource in &service.resources {
            let Some(raw) = resource.annotation_field(RESOURCE_CONFIG, LINKED_TO) else {
                continue;
            };
            let links = Self::resolve_links(&registry, raw);
            if links.is_empty() {
                continue;
            }

            let path = service.openapi_path(resource);
            let method = resource.method_name();
            let Some(operation) = document.operation_mut(&path, &method) else {
                debug!("No operation for {} {}, links skipped", method, path);
                continue;
            };
            for (status, response) in operation.responses.iter_mut() {
                let successful = status
                    .parse::<u16>()
                    .map(|code| (200..300).contains(&code))
                    .unwrap_or(false);
                if successful {
                    response
                        .links
                        .get_or_insert_with(IndexMap::new)
                        .extend(links.clone());
                }
            }
        }
    }

    fn resolve_links(registry: &ResourceRegistry, raw: &str) -> IndexMap<String, Link> {
        let mut links = IndexMap::new();
        for descriptor in parse_linked_to(raw) {
            match registry.find(&descriptor.resource_name, descriptor.resource_method.as_deref()) {
                Some(target) => {
                    links.insert(
                        descriptor.relation,
                        Link {
                            operation_id: target.operation_id.clone(),
                        },
                    );
                }
                None => warn!(
                    "Linked resource '{}' ({}) not found",
                    descriptor.resource_name,
                    descriptor.resource_method.as_deref().unwrap_or("any method")
                ),
            }
        }
        links
    }
}
