//! Drives document generation for a resolved project.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::extension::{BallerinaExtensionLevel, BallerinaTypeExtensioner};
use crate::hateoas::{HateoasContext, HateoasMapper, HateoasMetadataVisitor};
use crate::interceptor::InterceptorPipeline;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::resolver::{normalize_base_path, Project};
use crate::schema_generator::SchemaGenerator;
use crate::service::Service;
use log::{debug, info};

/// Options for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Only document the service mounted at this base path.
    pub service: Option<String>,
    pub extension_level: BallerinaExtensionLevel,
}

/// The document of one service.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub service_name: String,
    pub base_path: String,
    pub document: OpenApiDocument,
}

/// Everything a generation run produced.
#[derive(Debug, Default)]
pub struct GenerationResult {
    pub documents: Vec<GeneratedDocument>,
    pub diagnostics: Vec<Diagnostic>,
    /// Named resources of every service in the project.
    pub hateoas: HateoasContext,
}

pub struct OpenApiGenerator;

impl OpenApiGenerator {
    pub fn generate(project: &Project, options: &GeneratorOptions) -> GenerationResult {
        let mut result = GenerationResult::default();

        let visitor = HateoasMetadataVisitor::new(&result.hateoas);
        for service in &project.services {
            visitor.visit(service);
        }
        debug!("Registered named resources of {} service(s)", result.hateoas.len());

        let filter = options.service.as_deref().map(normalize_base_path);
        for service in &project.services {
            if let Some(base_path) = &filter {
                if &service.base_path != base_path {
                    debug!("Skipping service {} at {}", service.name, service.base_path);
                    continue;
                }
            }
            info!("Generating document for service {} ({})", service.name, service.base_path);
            let (document, diagnostics) = Self::generate_service(project, service, options);
            result.diagnostics.extend(diagnostics);
            result.documents.push(GeneratedDocument {
                service_name: service.name.clone(),
                base_path: service.base_path.clone(),
                document,
            });
        }
        result
    }

    fn generate_service(
        project: &Project,
        service: &Service,
        options: &GeneratorOptions,
    ) -> (OpenApiDocument, Vec<Diagnostic>) {
        let lattice = &project.registry;
        let pipeline = InterceptorPipeline::new(&service.interceptors);
        let mut builder = OpenApiBuilder::new(service, lattice);
        let mut schema_gen = SchemaGenerator::new(lattice);
        let mut diagnostics = Vec::new();

        for resource in &service.resources {
            let label = format!("{} {}", resource.method_name(), resource.path);
            let path = service.openapi_path(resource);
            if resource.is_default_method() {
                diagnostics.push(
                    Diagnostic::warning(DiagnosticKind::DefaultMethodNotSupported { path })
                        .at(label),
                );
                continue;
            }
            if resource.path.has_rest() {
                diagnostics.push(
                    Diagnostic::warning(DiagnosticKind::RestParameterNotSupported { path })
                        .at(label),
                );
                continue;
            }

            let analysis = pipeline.analyze(resource, lattice);
            diagnostics.extend(analysis.diagnostics.iter().cloned());
            if let Err(e) = builder.add_resource(resource, &analysis, &mut schema_gen) {
                diagnostics.push(
                    Diagnostic::error(DiagnosticKind::ResourceAnalysisFailed {
                        resource: label.clone(),
                        message: e.to_string(),
                    })
                    .at(label),
                );
            }
        }

        let (mut document, schema_diagnostics) = builder.build(schema_gen);
        diagnostics.extend(schema_diagnostics);

        HateoasMapper::set_open_api_links(service, &mut document);
        BallerinaTypeExtensioner::remove_extensions(
            document.components.as_mut(),
            options.extension_level,
            &service.module,
        );
        (document, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedModule;
    use crate::resolver::ModelResolver;
    use std::path::Path;

    const MODEL: &str = r#"
package: { org: acme, name: store, version: 1.0.0 }
types:
  - name: Pet
    fields:
      - { name: id, type: int }
      - { name: name, type: string }
services:
  - name: petstore
    base_path: /petstore
    resources:
      - method: get
        path: "pets/[int id]"
        returns: "Pet|error"
        resource_config: { name: '"petById"' }
      - method: "'default"
        path: "[string... rest]"
        returns: "json"
      - method: get
        path: "files/[string... parts]"
        returns: "string"
  - name: admin
    base_path: /admin
    resources:
      - method: get
        path: health
        returns: "string"
"#;

    fn project() -> Project {
        let module = ParsedModule::from_content(Path::new("store.yaml"), MODEL).unwrap();
        ModelResolver::resolve(&[module]).unwrap()
    }

    #[test]
    fn test_generates_one_document_per_service() {
        let result = OpenApiGenerator::generate(&project(), &GeneratorOptions::default());
        assert_eq!(result.documents.len(), 2);
        let petstore = &result.documents[0].document;
        assert!(petstore.operation("/petstore/pets/{id}", "get").is_some());
        assert_eq!(petstore.paths.len(), 1);
        assert_eq!(result.hateoas.len(), 1);
    }

    #[test]
    fn test_skipped_resources_become_diagnostics() {
        let result = OpenApiGenerator::generate(&project(), &GeneratorOptions::default());
        let codes: Vec<_> = result.diagnostics.iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec!["BAL_OAS_202", "BAL_OAS_201"]);
    }

    #[test]
    fn test_service_filter() {
        let options = GeneratorOptions {
            service: Some("admin".to_string()),
            ..Default::default()
        };
        let result = OpenApiGenerator::generate(&project(), &options);
        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.documents[0].service_name, "admin");
    }
}
