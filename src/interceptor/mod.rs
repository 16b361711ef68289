//! Interceptor chains and the type information they contribute to a resource.
//!
//! A Ballerina HTTP service can be wrapped by interceptor services. Request interceptors run
//! before the target resource and may answer the request themselves; error interceptors turn
//! earlier failures into responses; response interceptors post-process whatever the chain
//! produced. For documentation this means a resource's advertised responses and parameters
//! depend on every interceptor that applies to it. [`InterceptorPipeline`] computes that.

mod pipeline;
mod request_params;
mod response_info;

pub use pipeline::{InterceptorPipeline, PipelineAnalysis};
pub use request_params::{ParameterMerge, RequestParameter, RequestParameterInfo};
pub use response_info::ResponseInfo;

use crate::matcher::ResourceMatcher;
use crate::service::ResourceFunction;
use crate::types::{BalType, TypeLattice, NEXT_SERVICE};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterceptorKind {
    Request,
    RequestError,
    Response,
    ResponseError,
}

impl InterceptorKind {
    /// Request-side interceptors run before the target, in declaration order.
    pub fn is_request_side(&self) -> bool {
        matches!(self, InterceptorKind::Request | InterceptorKind::RequestError)
    }

    pub fn handles_errors(&self) -> bool {
        matches!(
            self,
            InterceptorKind::RequestError | InterceptorKind::ResponseError
        )
    }
}

/// One interceptor service.
///
/// Request-side interceptors expose a single resource function; response-side ones a
/// remote function of which only the return type matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interceptor {
    pub name: String,
    pub kind: InterceptorKind,
    pub resource: Option<ResourceFunction>,
    pub remote_return_type: Option<BalType>,
}

impl Interceptor {
    pub fn with_resource(name: &str, kind: InterceptorKind, resource: ResourceFunction) -> Self {
        Self {
            name: name.to_string(),
            kind,
            resource: Some(resource),
            remote_return_type: None,
        }
    }

    pub fn with_remote(name: &str, kind: InterceptorKind, return_type: Option<BalType>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            resource: None,
            remote_return_type: return_type,
        }
    }

    pub fn return_type(&self) -> Option<&BalType> {
        match &self.resource {
            Some(resource) => resource.return_type.as_ref(),
            None => self.remote_return_type.as_ref(),
        }
    }

    /// Whether this interceptor runs for requests to `target`.
    ///
    /// Interceptors without a resource function apply to every resource.
    pub fn is_invokable(&self, target: &ResourceFunction, lattice: &dyn TypeLattice) -> bool {
        match &self.resource {
            Some(resource) => ResourceMatcher::matches(resource, target, lattice),
            None => true,
        }
    }

    /// Return-type members that become responses: `http:NextService` and `()` only
    /// continue the chain.
    pub fn response_types(&self, lattice: &dyn TypeLattice) -> Vec<BalType> {
        let Some(return_type) = self.return_type() else {
            return Vec::new();
        };
        lattice
            .union_members(return_type)
            .into_iter()
            .filter(|ty| !ty.is_nil() && *ty != BalType::Object(NEXT_SERVICE.to_string()))
            .collect()
    }

    pub fn has_data_binding(&self, lattice: &dyn TypeLattice) -> bool {
        self.resource
            .as_ref()
            .map(|r| r.has_data_binding(lattice))
            .unwrap_or(false)
    }
}

/// The resource function being documented.
#[derive(Debug, Clone, Copy)]
pub struct TargetResource<'a> {
    resource: &'a ResourceFunction,
}

impl<'a> TargetResource<'a> {
    pub fn new(resource: &'a ResourceFunction) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &'a ResourceFunction {
        self.resource
    }

    /// The declared return type, `()` when none is declared.
    pub fn effective_return_type(&self) -> BalType {
        self.resource.return_type.clone().unwrap_or(BalType::Nil)
    }

    pub fn has_data_binding(&self, lattice: &dyn TypeLattice) -> bool {
        self.resource.has_data_binding(lattice)
    }

    /// `get pets/[int id]`
    pub fn label(&self) -> String {
        format!("{} {}", self.resource.method_name(), self.resource.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_path::ResourcePath;
    use crate::types::parse::parse_type;
    use crate::types::TypeRegistry;

    fn resource(method: &str, path: &str, returns: Option<&str>) -> ResourceFunction {
        ResourceFunction {
            method: method.to_string(),
            path: ResourcePath::parse(path).unwrap(),
            params: Vec::new(),
            return_type: returns.map(|r| parse_type(r).unwrap()),
            annotations: Vec::new(),
            description: None,
        }
    }

    #[test]
    fn test_response_types_drop_next_service_and_nil() {
        let registry = TypeRegistry::new();
        let interceptor = Interceptor::with_resource(
            "Auth",
            InterceptorKind::Request,
            resource("default", "[string... path]", Some("http:NextService|http:Unauthorized|error?")),
        );
        assert_eq!(
            interceptor.response_types(&registry),
            vec![BalType::Object("http:Unauthorized".into()), BalType::Error(None)]
        );
    }

    #[test]
    fn test_remote_interceptor_applies_everywhere() {
        let registry = TypeRegistry::new();
        let interceptor = Interceptor::with_remote(
            "Headers",
            InterceptorKind::Response,
            Some(parse_type("http:NextService?").unwrap()),
        );
        assert!(interceptor.is_invokable(&resource("get", "pets", None), &registry));
        assert!(interceptor.response_types(&registry).is_empty());
        assert!(!interceptor.has_data_binding(&registry));
    }

    #[test]
    fn test_target_effective_return_type_defaults_to_nil() {
        let declared = resource("get", "pets", Some("Pet[]"));
        let none = resource("post", "pets", None);
        assert_eq!(
            TargetResource::new(&declared).effective_return_type(),
            BalType::Array(Box::new(BalType::named("Pet")))
        );
        assert_eq!(TargetResource::new(&none).effective_return_type(), BalType::Nil);
        assert_eq!(TargetResource::new(&declared).label(), "get pets");
    }

    #[test]
    fn test_kind_sides() {
        assert!(InterceptorKind::Request.is_request_side());
        assert!(InterceptorKind::RequestError.is_request_side());
        assert!(!InterceptorKind::Response.is_request_side());
        assert!(InterceptorKind::ResponseError.handles_errors());
        assert!(!InterceptorKind::Request.handles_errors());
    }
}
