//! HATEOAS link resolution.
//!
//! Resources name themselves through the `name` field of their `http:ResourceConfig`
//! annotation and point at other resources through its `linkedTo` field. Once a service's
//! document is built, [`HateoasMapper`] turns those references into OpenAPI links on
//! every successful response of the linking operation.
//!
//! [`HateoasMetadataVisitor`] records the named resources of every service in a
//! [`HateoasContext`] owned by the caller, so the registry of a whole run can be inspected
//! after generation.

mod links;
mod mapper;
mod registry;
mod visitor;

pub use links::{parse_linked_to, LinkDescriptor, DEFAULT_RELATION};
pub use mapper::HateoasMapper;
pub use registry::{extract_resource_registry, operation_id, LINKED_TO, RESOURCE_NAME};
pub use visitor::HateoasMetadataVisitor;

use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// A named resource: its HTTP method and the id of the operation it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub method: String,
    pub operation_id: String,
}

impl Resource {
    pub fn new(method: &str, operation_id: &str) -> Self {
        Self {
            method: method.to_string(),
            operation_id: operation_id.to_string(),
        }
    }
}

/// Named resources of one service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Service {
    pub service_id: u64,
    /// Resource name to the resources registered under it, in declaration order.
    pub resource_mapping: IndexMap<String, Vec<Resource>>,
}

impl Service {
    pub fn new(service_id: u64) -> Self {
        Self {
            service_id,
            resource_mapping: IndexMap::new(),
        }
    }

    pub fn add_resource(&mut self, name: &str, resource: Resource) {
        self.resource_mapping
            .entry(name.to_string())
            .or_default()
            .push(resource);
    }

    pub fn is_empty(&self) -> bool {
        self.resource_mapping.is_empty()
    }

    /// The resource registered as `name` with `method`, or the first one under `name`
    /// when no method is given.
    pub fn find(&self, name: &str, method: Option<&str>) -> Option<&Resource> {
        let candidates = self.resource_mapping.get(name)?;
        match method {
            Some(method) => candidates
                .iter()
                .find(|r| r.method.eq_ignore_ascii_case(method)),
            None => candidates.first(),
        }
    }
}

/// Named resources of every service seen in a generation run, by service symbol id.
#[derive(Debug, Default)]
pub struct HateoasContext {
    services: Mutex<HashMap<u64, Service>>,
}

impl HateoasContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_hateoas_resource(&self, service_id: u64, resource_name: &str, resource: Resource) {
        let mut services = self.services.lock().unwrap_or_else(PoisonError::into_inner);
        services
            .entry(service_id)
            .or_insert_with(|| Service::new(service_id))
            .add_resource(resource_name, resource);
    }

    pub fn get_service(&self, service_id: u64) -> Option<Service> {
        let services = self.services.lock().unwrap_or_else(PoisonError::into_inner);
        services.get(&service_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
