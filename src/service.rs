//! Resolved HTTP services and resource functions.
//!
//! These are the typed counterparts of the declarations in [`crate::model`], produced by
//! [`crate::resolver::ModelResolver`]. Everything downstream (matching, interceptor merging,
//! OpenAPI building, HATEOAS) works on these types.

use crate::extension::ModuleId;
use crate::interceptor::Interceptor;
use crate::resource_path::{unescape_identifier, ResourcePath};
use crate::types::{BalType, TypeLattice};
use indexmap::IndexMap;
use serde::Deserialize;

/// Annotation attached to a resource function to configure it.
pub const RESOURCE_CONFIG: &str = "http:ResourceConfig";

/// Method name of the wildcard resource accessor.
pub const DEFAULT_METHOD: &str = "default";

/// Where a data-bound parameter comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Declared in the resource path; never written in the model.
    #[serde(skip)]
    Path,
    #[default]
    Query,
    Header,
    Payload,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Path => "path",
            ParamKind::Query => "query",
            ParamKind::Header => "header",
            ParamKind::Payload => "payload",
        }
    }
}

/// A resource function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceParam {
    pub name: String,
    pub ty: BalType,
    pub kind: ParamKind,
    pub has_default: bool,
    pub description: Option<String>,
}

/// An annotation with its fields as raw source strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotation {
    pub name: String,
    pub fields: IndexMap<String, String>,
}

/// A resource function of a service (or of an interceptor service).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFunction {
    /// Accessor name as written, possibly escaped (`'default`).
    pub method: String,
    pub path: ResourcePath,
    pub params: Vec<ResourceParam>,
    pub return_type: Option<BalType>,
    pub annotations: Vec<Annotation>,
    pub description: Option<String>,
}

impl ResourceFunction {
    /// The accessor name without escapes, lower-cased.
    pub fn method_name(&self) -> String {
        unescape_identifier(&self.method).to_ascii_lowercase()
    }

    pub fn is_default_method(&self) -> bool {
        self.method_name() == DEFAULT_METHOD
    }

    /// Raw value of `field` in the annotation `annotation`, if both are present.
    pub fn annotation_field(&self, annotation: &str, field: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.name == annotation)
            .and_then(|a| a.fields.get(field))
            .map(String::as_str)
    }

    /// Parameters whose type is a subtype of `anydata`, path parameters first.
    ///
    /// Callers, requests and other non-data parameters are left out.
    pub fn data_params(&self, lattice: &dyn TypeLattice) -> Vec<ResourceParam> {
        let path_params = self.path.params().into_iter().filter_map(|param| {
            param.name.as_ref().map(|name| ResourceParam {
                name: name.clone(),
                ty: param.ty.clone(),
                kind: ParamKind::Path,
                has_default: false,
                description: None,
            })
        });
        path_params
            .chain(self.params.iter().cloned())
            .filter(|param| lattice.is_anydata(&param.ty))
            .collect()
    }

    /// True when the resource binds request data: path parameters or data-typed
    /// query, header or payload parameters.
    pub fn has_data_binding(&self, lattice: &dyn TypeLattice) -> bool {
        self.path.has_params() || self.params.iter().any(|p| lattice.is_anydata(&p.ty))
    }
}

/// The listener a service is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Listener {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

impl Listener {
    pub fn url(&self, base_path: &str) -> String {
        let scheme = if self.port == 443 { "https" } else { "http" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, base_path)
    }
}

/// An HTTP service declaration.
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    /// Absolute base path, `/` for the root.
    pub base_path: String,
    pub listener: Option<Listener>,
    pub module: ModuleId,
    pub resources: Vec<ResourceFunction>,
    /// Interceptors in declaration order.
    pub interceptors: Vec<Interceptor>,
    /// Stable identity of the service symbol.
    pub symbol_id: u64,
    pub description: Option<String>,
}

impl Service {
    /// OpenAPI path key of a resource in this service.
    pub fn openapi_path(&self, resource: &ResourceFunction) -> String {
        let relative = resource.path.to_openapi();
        let base = self.base_path.trim_end_matches('/');
        if relative == "/" {
            if base.is_empty() {
                "/".to_string()
            } else {
                base.to_string()
            }
        } else {
            format!("{}{}", base, relative)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRegistry;

    fn resource(method: &str, path: &str, params: Vec<ResourceParam>) -> ResourceFunction {
        ResourceFunction {
            method: method.to_string(),
            path: ResourcePath::parse(path).unwrap(),
            params,
            return_type: None,
            annotations: Vec::new(),
            description: None,
        }
    }

    fn param(name: &str, ty: BalType, kind: ParamKind) -> ResourceParam {
        ResourceParam {
            name: name.to_string(),
            ty,
            kind,
            has_default: false,
            description: None,
        }
    }

    fn service(base_path: &str) -> Service {
        Service {
            name: "svc".into(),
            base_path: base_path.into(),
            listener: None,
            module: ModuleId::new("acme", "store", "store", "1.0.0"),
            resources: Vec::new(),
            interceptors: Vec::new(),
            symbol_id: 1,
            description: None,
        }
    }

    #[test]
    fn test_method_name_unescapes() {
        assert_eq!(resource("'default", ".", vec![]).method_name(), "default");
        assert!(resource("'default", ".", vec![]).is_default_method());
        assert_eq!(resource("GET", ".", vec![]).method_name(), "get");
    }

    #[test]
    fn test_data_params_skip_non_data_types() {
        let registry = TypeRegistry::new();
        let r = resource(
            "get",
            "pets/[int id]",
            vec![
                param("caller", BalType::Object("http:Caller".into()), ParamKind::Query),
                param("limit", BalType::Int, ParamKind::Query),
            ],
        );
        let names: Vec<_> = r.data_params(&registry).into_iter().map(|p| (p.name, p.kind)).collect();
        assert_eq!(
            names,
            vec![("id".to_string(), ParamKind::Path), ("limit".to_string(), ParamKind::Query)]
        );
        assert!(r.has_data_binding(&registry));
    }

    #[test]
    fn test_no_data_binding_for_caller_only() {
        let registry = TypeRegistry::new();
        let r = resource(
            "get",
            "health",
            vec![param("caller", BalType::Object("http:Caller".into()), ParamKind::Query)],
        );
        assert!(!r.has_data_binding(&registry));
    }

    #[test]
    fn test_openapi_path_joins_base_path() {
        let r = resource("get", "pets/[int id]", vec![]);
        assert_eq!(service("/petstore").openapi_path(&r), "/petstore/pets/{id}");
        assert_eq!(service("/").openapi_path(&r), "/pets/{id}");
        let root = resource("get", ".", vec![]);
        assert_eq!(service("/petstore").openapi_path(&root), "/petstore");
        assert_eq!(service("/").openapi_path(&root), "/");
    }

    #[test]
    fn test_listener_url() {
        let listener = Listener {
            host: "localhost".into(),
            port: 9090,
        };
        assert_eq!(listener.url("/petstore"), "http://localhost:9090/petstore");
    }
}
