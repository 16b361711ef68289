use crate::error::{Error, Result};
use crate::hateoas::operation_id;
use crate::interceptor::PipelineAnalysis;
use crate::diagnostics::Diagnostic;
use crate::schema_generator::{Schema, SchemaGenerator};
use crate::service::{ParamKind, ResourceFunction, Service};
use crate::types::{BalType, TypeLattice};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

pub const OPENAPI_VERSION: &str = "3.0.1";

const JSON: &str = "application/json";
const TEXT: &str = "text/plain";

/// OpenAPI document builder for one service
pub struct OpenApiBuilder<'a> {
    service: &'a Service,
    lattice: &'a dyn TypeLattice,
    info: Info,
    servers: Option<Vec<Server>>,
    /// Paths collection (URL path -> PathItem), in resource order
    paths: IndexMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: &str) -> Option<&mut Option<Operation>> {
        match method {
            "get" => Some(&mut self.get),
            "post" => Some(&mut self.post),
            "put" => Some(&mut self.put),
            "delete" => Some(&mut self.delete),
            "patch" => Some(&mut self.patch),
            "options" => Some(&mut self.options),
            "head" => Some(&mut self.head),
            _ => None,
        }
    }

    pub fn is_supported_method(method: &str) -> bool {
        PathItem::default().slot(method).is_some()
    }

    /// The operation for a lower-case HTTP method.
    pub fn operation_mut(&mut self, method: &str) -> Option<&mut Operation> {
        self.slot(method)?.as_mut()
    }

    pub fn operation(&self, method: &str) -> Option<&Operation> {
        match method {
            "get" => self.get.as_ref(),
            "post" => self.post.as_ref(),
            "put" => self.put.as_ref(),
            "delete" => self.delete.as_ref(),
            "patch" => self.patch.as_ref(),
            "options" => self.options.as_ref(),
            "head" => self.head.as_ref(),
            _ => None,
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code
    pub responses: IndexMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<IndexMap<String, Link>>,
}

/// OpenAPI Link object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub operation_id: String,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, Schema>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    pub paths: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiDocument {
    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths.get(path)?.operation(method)
    }

    pub fn operation_mut(&mut self, path: &str, method: &str) -> Option<&mut Operation> {
        self.paths.get_mut(path)?.operation_mut(method)
    }
}

/// Status code and reason phrase of the `http` status-code response types.
fn status_code_response(object: &str) -> Option<(u16, &'static str)> {
    let name = object.strip_prefix("http:")?;
    let status = match name {
        "Continue" => (100, "Continue"),
        "SwitchingProtocols" => (101, "SwitchingProtocols"),
        "Ok" => (200, "Ok"),
        "Created" => (201, "Created"),
        "Accepted" => (202, "Accepted"),
        "NonAuthoritativeInformation" => (203, "NonAuthoritativeInformation"),
        "NoContent" => (204, "NoContent"),
        "ResetContent" => (205, "ResetContent"),
        "PartialContent" => (206, "PartialContent"),
        "MultipleChoices" => (300, "MultipleChoices"),
        "MovedPermanently" => (301, "MovedPermanently"),
        "Found" => (302, "Found"),
        "SeeOther" => (303, "SeeOther"),
        "NotModified" => (304, "NotModified"),
        "TemporaryRedirect" => (307, "TemporaryRedirect"),
        "PermanentRedirect" => (308, "PermanentRedirect"),
        "BadRequest" => (400, "BadRequest"),
        "Unauthorized" => (401, "Unauthorized"),
        "PaymentRequired" => (402, "PaymentRequired"),
        "Forbidden" => (403, "Forbidden"),
        "NotFound" => (404, "NotFound"),
        "MethodNotAllowed" => (405, "MethodNotAllowed"),
        "NotAcceptable" => (406, "NotAcceptable"),
        "RequestTimeout" => (408, "RequestTimeout"),
        "Conflict" => (409, "Conflict"),
        "Gone" => (410, "Gone"),
        "PreconditionFailed" => (412, "PreconditionFailed"),
        "PayloadTooLarge" => (413, "PayloadTooLarge"),
        "UnsupportedMediaType" => (415, "UnsupportedMediaType"),
        "UnprocessableEntity" => (422, "UnprocessableEntity"),
        "TooManyRequests" => (429, "TooManyRequests"),
        "InternalServerError" => (500, "InternalServerError"),
        "NotImplemented" => (501, "NotImplemented"),
        "BadGateway" => (502, "BadGateway"),
        "ServiceUnavailable" => (503, "ServiceUnavailable"),
        "GatewayTimeout" => (504, "GatewayTimeout"),
        _ => return None,
    };
    Some(status)
}

fn reason_phrase(status: &str) -> &'static str {
    match status {
        "200" => "Ok",
        "201" => "Created",
        "202" => "Accepted",
        "400" => "BadRequest",
        "500" => "InternalServerError",
        _ => "Any Response",
    }
}

/// Responses of one status code while they are being collected.
struct ResponseGroup {
    description: &'static str,
    content: IndexMap<String, Vec<Schema>>,
}

fn add_response(
    groups: &mut IndexMap<String, ResponseGroup>,
    status: &str,
    description: &'static str,
    body: Option<(&str, Schema)>,
) {
    let group = groups
        .entry(status.to_string())
        .or_insert_with(|| ResponseGroup {
            description,
            content: IndexMap::new(),
        });
    if let Some((media, schema)) = body {
        let schemas = group.content.entry(media.to_string()).or_default();
        if !schemas.contains(&schema) {
            schemas.push(schema);
        }
    }
}

impl<'a> OpenApiBuilder<'a> {
    pub fn new(service: &'a Service, lattice: &'a dyn TypeLattice) -> Self {
        debug!("Initializing OpenApiBuilder for service {}", service.name);
        let servers = service.listener.as_ref().map(|listener| {
            vec![Server {
                url: listener.url(&service.base_path),
            }]
        });
        Self {
            service,
            lattice,
            info: Info {
                title: service_title(service),
                version: service.module.version.clone(),
                description: service.description.clone(),
            },
            servers,
            paths: IndexMap::new(),
        }
    }

    /// Add the operation for `resource`, as seen through its interceptor chain.
    pub fn add_resource(
        &mut self,
        resource: &ResourceFunction,
        analysis: &PipelineAnalysis,
        schema_gen: &mut SchemaGenerator,
    ) -> Result<()> {
        let method = resource.method_name();
        if !PathItem::is_supported_method(&method) {
            return Err(Error::InvalidArgument(format!(
                "unsupported HTTP method '{}'",
                method
            )));
        }
        let path = self.service.openapi_path(resource);
        debug!("Adding operation: {} {}", method, path);

        let (parameters, request_body) = self.parameters(resource, analysis, schema_gen);
        let operation = Operation {
            summary: resource.description.clone(),
            operation_id: Some(operation_id(resource)),
            parameters: (!parameters.is_empty()).then_some(parameters),
            request_body,
            responses: self.responses(&method, analysis, schema_gen),
        };

        let item = self.paths.entry(path.clone()).or_default();
        match item.slot(&method) {
            Some(slot) if slot.is_some() => Err(Error::InvalidArgument(format!(
                "duplicate operation {} {}",
                method, path
            ))),
            Some(slot) => {
                *slot = Some(operation);
                Ok(())
            }
            None => Err(Error::InvalidArgument(format!(
                "unsupported HTTP method '{}'",
                method
            ))),
        }
    }

    fn parameters(
        &self,
        resource: &ResourceFunction,
        analysis: &PipelineAnalysis,
        schema_gen: &mut SchemaGenerator,
    ) -> (Vec<Parameter>, Option<RequestBody>) {
        let declared: Vec<&str> = resource
            .path
            .params()
            .into_iter()
            .filter_map(|p| p.name.as_deref())
            .collect();

        let mut parameters = Vec::new();
        let mut request_body = None;
        for merged in analysis.parameters.iter() {
            let param = &merged.param;
            let nullable = self.lattice.is_subtype(&BalType::Nil, &param.ty);
            match param.kind {
                ParamKind::Path => {
                    if !declared.contains(&param.name.as_str()) {
                        debug!("Skipping path parameter {} from {}", param.name, merged.origin);
                        continue;
                    }
                    parameters.push(Parameter {
                        name: param.name.clone(),
                        location: param.kind.as_str().to_string(),
                        required: true,
                        schema: schema_gen.generate_schema(&param.ty),
                        description: param.description.clone(),
                    });
                }
                ParamKind::Query | ParamKind::Header => parameters.push(Parameter {
                    name: param.name.clone(),
                    location: param.kind.as_str().to_string(),
                    required: !nullable && !param.has_default,
                    schema: schema_gen.generate_schema(&param.ty),
                    description: param.description.clone(),
                }),
                ParamKind::Payload => {
                    let mut content = IndexMap::new();
                    content.insert(
                        self.media_type(&param.ty).to_string(),
                        MediaType {
                            schema: schema_gen.generate_schema(&param.ty),
                        },
                    );
                    request_body = Some(RequestBody {
                        description: param.description.clone(),
                        required: !nullable,
                        content,
                    });
                }
            }
        }
        (parameters, request_body)
    }

    fn media_type(&self, ty: &BalType) -> &'static str {
        match self.lattice.resolve(ty) {
            BalType::String => TEXT,
            _ => JSON,
        }
    }

    fn responses(
        &self,
        method: &str,
        analysis: &PipelineAnalysis,
        schema_gen: &mut SchemaGenerator,
    ) -> IndexMap<String, Response> {
        let return_type = analysis
            .effective_return_type(self.lattice)
            .unwrap_or(BalType::Nil);
        let success = if method == "post" { "201" } else { "200" };

        let mut groups: IndexMap<String, ResponseGroup> = IndexMap::new();
        for member in self.lattice.union_members(&return_type) {
            match self.lattice.resolve(&member) {
                BalType::Nil => add_response(&mut groups, "202", reason_phrase("202"), None),
                BalType::Error(_) => add_response(
                    &mut groups,
                    "500",
                    reason_phrase("500"),
                    Some((JSON, schema_gen.error_payload())),
                ),
                BalType::Object(name) => match status_code_response(name) {
                    Some((code, reason)) => {
                        add_response(&mut groups, &code.to_string(), reason, None)
                    }
                    None => add_response(&mut groups, "default", reason_phrase("default"), None),
                },
                _ => {
                    let media = self.media_type(&member);
                    add_response(
                        &mut groups,
                        success,
                        reason_phrase(success),
                        Some((media, schema_gen.generate_schema(&member))),
                    )
                }
            }
        }

        if analysis.response.has_unhandled_data_binding_errors() && !groups.contains_key("400") {
            add_response(
                &mut groups,
                "400",
                reason_phrase("400"),
                Some((JSON, schema_gen.error_payload())),
            );
        }

        groups
            .into_iter()
            .map(|(status, group)| {
                let content: IndexMap<String, MediaType> = group
                    .content
                    .into_iter()
                    .map(|(media, mut schemas)| {
                        let schema = if schemas.len() == 1 {
                            schemas.remove(0)
                        } else {
                            Schema {
                                one_of: Some(schemas),
                                ..Default::default()
                            }
                        };
                        (media, MediaType { schema })
                    })
                    .collect();
                let response = Response {
                    description: group.description.to_string(),
                    content: (!content.is_empty()).then_some(content),
                    links: None,
                };
                (status, response)
            })
            .collect()
    }

    /// Build the final OpenAPI document
    pub fn build(self, schema_gen: SchemaGenerator) -> (OpenApiDocument, Vec<Diagnostic>) {
        debug!("Building OpenAPI document for service {}", self.service.name);
        let (schemas, diagnostics) = schema_gen.finish();
        let components = (!schemas.is_empty()).then(|| Components {
            schemas: Some(schemas),
        });
        let document = OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            servers: self.servers,
            paths: self.paths,
            components,
        };
        (document, diagnostics)
    }
}

/// `/pet-store/v1` becomes `Pet-store V1`; the root path falls back to the service name.
fn service_title(service: &Service) -> String {
    let words: Vec<String> = service
        .base_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect();
    if words.is_empty() {
        capitalize(&service.name)
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
