use super::{Resource, Service};
use crate::service::{self, ResourceFunction, RESOURCE_CONFIG};
use log::debug;

/// `http:ResourceConfig` field naming a resource.
pub const RESOURCE_NAME: &str = "name";

/// `http:ResourceConfig` field listing the resources a resource links to.
pub const LINKED_TO: &str = "linkedTo";

/// Operation id of a resource: the method followed by its path tokens, camel-cased.
///
/// `get pets/[int id]` becomes `getPetsId`; a resource on `.` gets the bare method.
pub fn operation_id(resource: &ResourceFunction) -> String {
    let mut id = resource.method_name();
    for token in resource.path.tokens() {
        let sanitized: String = token.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        let mut chars = sanitized.chars();
        if let Some(first) = chars.next() {
            id.push(first.to_ascii_uppercase());
            id.extend(chars);
        }
    }
    id
}

/// A raw annotation string value without its quotes.
fn string_value(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

/// Collect the named resources of `service`.
pub fn extract_resource_registry(service: &service::Service) -> Service {
    let mut registry = Service::new(service.symbol_id);
    for resource in &service.resources {
        let Some(name) = resource.annotation_field(RESOURCE_CONFIG, RESOURCE_NAME) else {
            continue;
        };
        let name = string_value(name);
        if name.is_empty() {
            continue;
        }
        let entry = Resource::new(&resource.method_name(), &operation_id(resource));
        debug!(
            "Registered resource '{}' as {} ({})",
            name, entry.operation_id, service.name
        );
        registry.add_resource(name, entry);
    }
    registry
}
