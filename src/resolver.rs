use crate::error::{Error, Result};
use crate::extension::ModuleId;
use crate::interceptor::Interceptor;
use crate::model::{InterceptorDecl, ModuleDecl, ResourceDecl, ServiceDecl, TypeDefDecl};
use crate::parser::ParsedModule;
use crate::resource_path::ResourcePath;
use crate::service::{Annotation, ResourceFunction, ResourceParam, Service, RESOURCE_CONFIG};
use crate::types::parse::parse_type;
use crate::types::{BalType, RecordField, RecordType, TypeDefinition, TypeLattice, TypeName, TypeRegistry};
use log::{debug, info};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// All services of a model, with the registry their types resolve against.
#[derive(Debug)]
pub struct Project {
    pub registry: TypeRegistry,
    pub services: Vec<Service>,
}

/// Turns parsed model declarations into typed services.
///
/// Resolution runs in two phases so declarations may reference each other across
/// modules regardless of file order: every type definition of every module is registered
/// first, then interceptors and services are resolved and their type references checked
/// against the complete registry.
pub struct ModelResolver;

impl ModelResolver {
    pub fn resolve(modules: &[ParsedModule]) -> Result<Project> {
        let mut registry = TypeRegistry::new();
        for parsed in modules {
            let module_id = module_id(&parsed.module);
            for decl in &parsed.module.types {
                let definition = resolve_type_definition(decl, &module_id)
                    .map_err(|e| in_file(&parsed.path, e))?;
                registry.register(definition);
            }
        }
        for parsed in modules {
            for decl in &parsed.module.types {
                let definition = registry
                    .lookup_qualified(
                        &parsed.module.package.org,
                        parsed.module.package.module_name(),
                        &parsed.module.package.version,
                        &decl.name,
                    )
                    .ok_or_else(|| Error::UnknownType(decl.name.clone()))?;
                check_references(&definition.ty, &registry).map_err(|e| in_file(&parsed.path, e))?;
            }
        }

        let mut interceptors: Vec<(ModuleId, Interceptor)> = Vec::new();
        for parsed in modules {
            let module_id = module_id(&parsed.module);
            for decl in &parsed.module.interceptors {
                let interceptor = resolve_interceptor(decl, &registry).map_err(|e| in_file(&parsed.path, e))?;
                interceptors.push((module_id.clone(), interceptor));
            }
        }

        let mut services = Vec::new();
        for parsed in modules {
            let module_id = module_id(&parsed.module);
            for decl in &parsed.module.services {
                let service = resolve_service(decl, &module_id, &interceptors, &registry)
                    .map_err(|e| in_file(&parsed.path, e))?;
                services.push(service);
            }
        }

        info!(
            "Resolved {} type definitions, {} interceptors and {} services",
            registry.len(),
            interceptors.len(),
            services.len()
        );
        Ok(Project { registry, services })
    }
}

fn in_file(path: &Path, error: Error) -> Error {
    match error {
        Error::ParseError { .. } => error,
        other => Error::ParseError {
            file: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

fn module_id(module: &ModuleDecl) -> ModuleId {
    let package = &module.package;
    ModuleId::new(&package.org, &package.name, package.module_name(), &package.version)
}

fn resolve_type_definition(decl: &TypeDefDecl, module: &ModuleId) -> Result<TypeDefinition> {
    let ty = match (&decl.fields, &decl.type_expr, decl.error) {
        (Some(fields), None, false) => {
            let fields = fields
                .iter()
                .map(|field| {
                    Ok(RecordField {
                        name: field.name.clone(),
                        ty: parse_type(&field.type_expr)?,
                        optional: field.optional,
                        constraint: field.constraint.clone(),
                        description: field.description.clone(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            BalType::Record(RecordType { fields })
        }
        (None, Some(expr), false) => parse_type(expr)?,
        (None, None, true) => BalType::Error(Some(decl.name.clone())),
        _ => {
            return Err(Error::InvalidArgument(format!(
                "type '{}' must declare exactly one of 'fields', 'type' or 'error'",
                decl.name
            )))
        }
    };
    debug!("Resolved type {}:{} = {}", module.prefix(), decl.name, ty);
    Ok(TypeDefinition {
        name: decl.name.clone(),
        module: module.clone(),
        ty,
        constraint: decl.constraint.clone(),
        description: decl.description.clone(),
    })
}

/// Every named reference in `ty` must resolve.
fn check_references(ty: &BalType, registry: &TypeRegistry) -> Result<()> {
    let mut names: Vec<&TypeName> = Vec::new();
    collect_names(ty, &mut names);
    match names.into_iter().find(|name| registry.lookup(name).is_none()) {
        Some(name) => Err(Error::UnknownType(name.to_string())),
        None => Ok(()),
    }
}

fn collect_names<'a>(ty: &'a BalType, names: &mut Vec<&'a TypeName>) {
    match ty {
        BalType::Named(name) => names.push(name),
        BalType::Union(members) => members.iter().for_each(|m| collect_names(m, names)),
        BalType::Array(inner) => collect_names(inner, names),
        BalType::Record(record) => record.fields.iter().for_each(|f| collect_names(&f.ty, names)),
        _ => {}
    }
}

fn resolve_resource(decl: &ResourceDecl, registry: &TypeRegistry) -> Result<ResourceFunction> {
    let path = ResourcePath::parse(&decl.path)?;
    for param in path.params() {
        check_references(&param.ty, registry)?;
    }

    let params = decl
        .params
        .iter()
        .map(|param| {
            let ty = parse_type(&param.type_expr)?;
            check_references(&ty, registry)?;
            Ok(ResourceParam {
                name: param.name.clone(),
                ty,
                kind: param.kind,
                has_default: param.default,
                description: param.description.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let return_type = decl.returns.as_deref().map(parse_type).transpose()?;
    if let Some(ty) = &return_type {
        check_references(ty, registry)?;
    }

    let mut annotations: Vec<Annotation> = decl
        .annotations
        .iter()
        .map(|a| Annotation {
            name: a.name.clone(),
            fields: a.fields.clone(),
        })
        .collect();
    if let Some(fields) = &decl.resource_config {
        match annotations.iter_mut().find(|a| a.name == RESOURCE_CONFIG) {
            Some(existing) => existing.fields.extend(fields.clone()),
            None => annotations.push(Annotation {
                name: RESOURCE_CONFIG.to_string(),
                fields: fields.clone(),
            }),
        }
    }

    Ok(ResourceFunction {
        method: decl.method.clone(),
        path,
        params,
        return_type,
        annotations,
        description: decl.description.clone(),
    })
}

fn resolve_interceptor(decl: &InterceptorDecl, registry: &TypeRegistry) -> Result<Interceptor> {
    if decl.kind.is_request_side() {
        let resource = decl.resource.as_ref().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "request interceptor '{}' must declare a resource",
                decl.name
            ))
        })?;
        return Ok(Interceptor::with_resource(
            &decl.name,
            decl.kind,
            resolve_resource(resource, registry)?,
        ));
    }

    if decl.resource.is_some() {
        return Err(Error::InvalidArgument(format!(
            "response interceptor '{}' cannot declare a resource",
            decl.name
        )));
    }
    let return_type = decl.returns.as_deref().map(parse_type).transpose()?;
    if let Some(ty) = &return_type {
        check_references(ty, registry)?;
    }
    Ok(Interceptor::with_remote(&decl.name, decl.kind, return_type))
}

/// Interceptor references may be qualified by module prefix (`auth:AuthInterceptor`).
/// Unqualified names prefer the service's own module.
fn find_interceptor<'a>(
    reference: &str,
    owner: &ModuleId,
    interceptors: &'a [(ModuleId, Interceptor)],
) -> Option<&'a Interceptor> {
    let (prefix, name) = match reference.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, reference),
    };
    let mut candidates = interceptors.iter().filter(|(_, i)| i.name == name);
    match prefix {
        Some(prefix) => candidates.find(|(m, _)| m.prefix() == prefix),
        None => {
            let all: Vec<_> = candidates.collect();
            all.iter()
                .find(|(m, _)| m == owner)
                .or_else(|| all.first())
                .copied()
        }
    }
    .map(|(_, interceptor)| interceptor)
}

fn resolve_service(
    decl: &ServiceDecl,
    module: &ModuleId,
    interceptors: &[(ModuleId, Interceptor)],
    registry: &TypeRegistry,
) -> Result<Service> {
    let chain = decl
        .interceptors
        .iter()
        .map(|reference| {
            find_interceptor(reference, module, interceptors)
                .cloned()
                .ok_or_else(|| Error::UnknownInterceptor {
                    service: decl.name.clone(),
                    interceptor: reference.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let resources = decl
        .resources
        .iter()
        .map(|resource| resolve_resource(resource, registry))
        .collect::<Result<Vec<_>>>()?;

    let base_path = normalize_base_path(&decl.base_path);
    let symbol_id = symbol_id(module, &decl.name, &base_path);
    debug!(
        "Resolved service {} at {} ({} resources, {} interceptors)",
        decl.name,
        base_path,
        resources.len(),
        chain.len()
    );

    Ok(Service {
        name: decl.name.clone(),
        base_path,
        listener: decl.listener.clone(),
        module: module.clone(),
        resources,
        interceptors: chain,
        symbol_id,
        description: decl.description.clone(),
    })
}

/// `petstore/` becomes `/petstore`.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    format!("/{}", trimmed)
}

/// Stable identity of a service symbol within one run.
fn symbol_id(module: &ModuleId, name: &str, base_path: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    module.hash(&mut hasher);
    name.hash(&mut hasher);
    base_path.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::InterceptorKind;

    fn parsed(name: &str, yaml: &str) -> ParsedModule {
        ParsedModule::from_content(Path::new(name), yaml).unwrap()
    }

    const TYPES: &str = r#"
package: { org: acme, name: petstore, version: 1.0.0, module: petstore.types }
types:
  - name: Pet
    fields:
      - { name: id, type: int }
      - { name: owner, type: Owner, optional: true }
  - name: Owner
    fields:
      - { name: name, type: string }
  - name: NotFound
    error: true
interceptors:
  - name: Auth
    kind: request
    resource: { method: default, path: "[string... path]", returns: "http:NextService|http:Unauthorized" }
"#;

    const SERVICE: &str = r#"
package: { org: acme, name: petstore, version: 1.0.0 }
interceptors:
  - name: Headers
    kind: response
    returns: http:NextService?
services:
  - name: petstore
    base_path: petstore/
    interceptors: [types:Auth, Headers]
    resources:
      - method: get
        path: pets/[int id]
        returns: types:Pet|types:NotFound
        resource_config: { name: '"petById"' }
"#;

    #[test]
    fn test_resolve_across_modules_in_any_order() {
        let project =
            ModelResolver::resolve(&[parsed("service.yaml", SERVICE), parsed("types.yaml", TYPES)]).unwrap();
        assert_eq!(project.registry.len(), 3);

        let service = &project.services[0];
        assert_eq!(service.base_path, "/petstore");
        assert_eq!(service.module.module, "petstore");
        let kinds: Vec<_> = service.interceptors.iter().map(|i| (i.name.as_str(), i.kind)).collect();
        assert_eq!(
            kinds,
            vec![("Auth", InterceptorKind::Request), ("Headers", InterceptorKind::Response)]
        );

        let resource = &service.resources[0];
        assert_eq!(resource.annotation_field(RESOURCE_CONFIG, "name"), Some("\"petById\""));
        assert!(project.registry.is_subtype(
            resource.return_type.as_ref().unwrap(),
            &BalType::Union(vec![BalType::Anydata, BalType::Error(None)])
        ));
    }

    #[test]
    fn test_symbol_ids_are_stable_and_distinct() {
        let module = ModuleId::new("acme", "petstore", "petstore", "1.0.0");
        assert_eq!(symbol_id(&module, "a", "/a"), symbol_id(&module, "a", "/a"));
        assert_ne!(symbol_id(&module, "a", "/a"), symbol_id(&module, "a", "/b"));
    }

    #[test]
    fn test_unknown_type_is_reported_with_file() {
        let yaml = r#"
package: { org: acme, name: petstore, version: 1.0.0 }
services:
  - name: petstore
    resources:
      - { method: get, path: pets, returns: "Missing[]" }
"#;
        let err = ModelResolver::resolve(&[parsed("broken.yaml", yaml)]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken.yaml"), "{}", message);
        assert!(message.contains("unknown type: Missing"), "{}", message);
    }

    #[test]
    fn test_unknown_interceptor() {
        let yaml = r#"
package: { org: acme, name: petstore, version: 1.0.0 }
services:
  - name: petstore
    interceptors: [Ghost]
"#;
        let err = ModelResolver::resolve(&[parsed("svc.yaml", yaml)]).unwrap_err();
        assert!(err.to_string().contains("unknown interceptor 'Ghost'"));
    }

    #[test]
    fn test_ambiguous_type_definition_is_rejected() {
        let yaml = r#"
package: { org: acme, name: petstore, version: 1.0.0 }
types:
  - { name: Id, type: int, error: true }
"#;
        assert!(ModelResolver::resolve(&[parsed("types.yaml", yaml)]).is_err());
    }

    #[test]
    fn test_request_interceptor_requires_resource() {
        let yaml = r#"
package: { org: acme, name: petstore, version: 1.0.0 }
interceptors:
  - { name: Auth, kind: request, returns: "http:NextService" }
"#;
        assert!(ModelResolver::resolve(&[parsed("i.yaml", yaml)]).is_err());
    }
}
