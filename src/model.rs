//! Service model declarations as written in model files.
//!
//! One model file describes one Ballerina module: its package coordinates, the type
//! definitions it declares, its interceptor services and its HTTP services. Type
//! expressions and resource paths are kept as Ballerina source strings here and parsed
//! by [`crate::resolver::ModelResolver`].
//!
//! ```yaml
//! package: { org: acme, name: petstore, version: 1.0.0 }
//! types:
//!   - name: Pet
//!     fields:
//!       - { name: id, type: int }
//!       - { name: name, type: string, constraint: { minLength: "1" } }
//! interceptors:
//!   - name: AuthInterceptor
//!     kind: request
//!     resource: { method: default, path: "[string... path]", returns: "http:NextService|http:Unauthorized" }
//! services:
//!   - name: petstore
//!     base_path: /petstore
//!     listener: { port: 9090 }
//!     interceptors: [AuthInterceptor]
//!     resources:
//!       - method: get
//!         path: pets/[int id]
//!         returns: Pet|http:NotFound
//!         resource_config: { name: petById }
//! ```

use crate::constraint::ConstraintAnnotation;
use crate::interceptor::InterceptorKind;
use crate::service::{Listener, ParamKind};
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDecl {
    pub package: PackageDecl,
    #[serde(default)]
    pub types: Vec<TypeDefDecl>,
    #[serde(default)]
    pub interceptors: Vec<InterceptorDecl>,
    #[serde(default)]
    pub services: Vec<ServiceDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageDecl {
    pub org: String,
    pub name: String,
    pub version: String,
    /// Module name; the package's default module when absent.
    #[serde(default)]
    pub module: Option<String>,
}

impl PackageDecl {
    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(&self.name)
    }
}

/// A type definition: a record (`fields`), an error type (`error: true`) or any other
/// type expression (`type`).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDefDecl {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_expr: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<FieldDecl>>,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub constraint: Option<ConstraintAnnotation>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub constraint: Option<ConstraintAnnotation>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An interceptor service. Request-side kinds declare `resource`; response-side kinds
/// declare the return type of their remote function in `returns`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterceptorDecl {
    pub name: String,
    pub kind: InterceptorKind,
    #[serde(default)]
    pub resource: Option<ResourceDecl>,
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDecl {
    pub name: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default)]
    pub listener: Option<Listener>,
    /// Interceptor names in pipeline order.
    #[serde(default)]
    pub interceptors: Vec<String>,
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_base_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDecl {
    pub method: String,
    #[serde(default = "default_resource_path")]
    pub path: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
    /// Shorthand for an `http:ResourceConfig` annotation.
    #[serde(default)]
    pub resource_config: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_resource_path() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub kind: ParamKind,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationDecl {
    pub name: String,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_module() {
        let yaml = r#"
package: { org: acme, name: petstore, version: 1.0.0 }
types:
  - name: Pet
    fields:
      - { name: id, type: int }
      - { name: tag, type: string, optional: true, constraint: { maxLength: "10" } }
  - name: Status
    type: '"on"|"off"'
interceptors:
  - name: Headers
    kind: response
    returns: http:NextService?
services:
  - name: petstore
    base_path: /petstore
    listener: { port: 9090 }
    interceptors: [Headers]
    resources:
      - method: get
        path: pets/[int id]
        params:
          - { name: verbose, type: boolean, default: true }
        returns: Pet
        resource_config: { name: petById }
      - method: post
"#;
        let module: ModuleDecl = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(module.package.module_name(), "petstore");
        assert_eq!(module.types.len(), 2);
        assert_eq!(
            module.types[0].fields.as_ref().unwrap()[1].constraint.as_ref().unwrap().max_length(),
            Some("10")
        );
        assert_eq!(module.interceptors[0].kind, InterceptorKind::Response);

        let service = &module.services[0];
        assert_eq!(service.listener.as_ref().unwrap().host, "localhost");
        assert_eq!(service.resources[0].params[0].kind, ParamKind::Query);
        assert!(service.resources[0].params[0].default);
        assert_eq!(service.resources[1].path, ".");
        assert_eq!(
            service.resources[0].resource_config.as_ref().unwrap()["name"],
            "petById"
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let yaml = "package: { org: acme, name: p, version: 1.0.0, flavour: x }";
        assert!(serde_yaml::from_str::<ModuleDecl>(yaml).is_err());
    }

    #[test]
    fn test_path_kind_is_not_writable() {
        let yaml = "{ name: id, type: int, kind: path }";
        assert!(serde_yaml::from_str::<ParamDecl>(yaml).is_err());
    }
}
