use crate::constraint::ConstraintAnnotation;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::extension::{BallerinaPackage, BallerinaTypeExtensioner};
use crate::types::{BalType, Literal, TypeDefinition, TypeLattice};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashSet;

/// Component under which the body of error responses is described.
pub const ERROR_PAYLOAD: &str = "ErrorPayload";

const COMPONENT_PREFIX: &str = "#/components/schemas/";

/// Schema generator - converts Ballerina types to OpenAPI schemas
pub struct SchemaGenerator<'a> {
    lattice: &'a dyn TypeLattice,
    /// Component schemas generated so far, keyed by type name
    schemas: IndexMap<String, Schema>,
    /// Components currently being generated, to stop recursion through references
    in_progress: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Vendor extensions (`x-...`)
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Schema {
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    pub fn object() -> Self {
        Self::typed("object")
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array")
        }
    }

    pub fn reference(component: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", COMPONENT_PREFIX, component)),
            ..Default::default()
        }
    }

    /// Name of the referenced component, if this is a reference.
    pub fn component_name(&self) -> Option<&str> {
        self.reference.as_deref()?.strip_prefix(COMPONENT_PREFIX)
    }

    /// Whether this schema accepts `null`.
    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true)
    }
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(lattice: &'a dyn TypeLattice) -> Self {
        debug!("Initializing SchemaGenerator");
        Self {
            lattice,
            schemas: IndexMap::new(),
            in_progress: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Generate the schema of `ty`. Named types become references to component schemas,
    /// which are generated on first use.
    pub fn generate_schema(&mut self, ty: &BalType) -> Schema {
        match ty {
            BalType::Int => Schema {
                format: Some("int64".to_string()),
                ..Schema::typed("integer")
            },
            BalType::Float => Schema {
                format: Some("float".to_string()),
                ..Schema::typed("number")
            },
            BalType::Decimal => Schema {
                format: Some("double".to_string()),
                ..Schema::typed("number")
            },
            BalType::Boolean => Schema::typed("boolean"),
            BalType::String => Schema::typed("string"),
            BalType::Nil => Schema {
                nullable: Some(true),
                ..Default::default()
            },
            BalType::Anydata | BalType::Any | BalType::Object(_) => Schema::default(),
            BalType::Singleton(literal) => self.enum_schema(std::slice::from_ref(literal)),
            BalType::Union(members) => self.union_schema(members),
            BalType::Array(inner) => Schema::array(self.generate_schema(inner)),
            BalType::Record(record) => {
                let mut properties = IndexMap::new();
                let mut required = Vec::new();
                for field in &record.fields {
                    let mut schema = self.generate_schema(&field.ty);
                    if let Some(constraint) = &field.constraint {
                        schema = self.constrained(schema, constraint, &field.name);
                    }
                    if field.description.is_some() {
                        schema.description = field.description.clone();
                    }
                    properties.insert(field.name.clone(), schema);
                    if !field.optional {
                        required.push(field.name.clone());
                    }
                }
                Schema {
                    properties: Some(properties),
                    required: (!required.is_empty()).then_some(required),
                    ..Schema::object()
                }
            }
            BalType::Error(_) => self.error_payload(),
            BalType::Named(name) => {
                let lattice = self.lattice;
                match lattice.lookup(name) {
                    Some(definition) => self.component(definition),
                    None => {
                        debug!("Unknown type {}, using an unconstrained schema", name);
                        Schema::default()
                    }
                }
            }
        }
    }

    /// Reference to the schema describing error response bodies.
    pub fn error_payload(&mut self) -> Schema {
        if !self.schemas.contains_key(ERROR_PAYLOAD) {
            let mut properties = IndexMap::new();
            for (name, ty) in [
                ("timestamp", "string"),
                ("status", "integer"),
                ("reason", "string"),
                ("message", "string"),
                ("path", "string"),
                ("method", "string"),
            ] {
                properties.insert(name.to_string(), Schema::typed(ty));
            }
            let required = properties.keys().cloned().collect();
            self.schemas.insert(
                ERROR_PAYLOAD.to_string(),
                Schema {
                    properties: Some(properties),
                    required: Some(required),
                    ..Schema::object()
                },
            );
        }
        Schema::reference(ERROR_PAYLOAD)
    }

    /// Register the component for `definition` if needed and return a reference to it.
    fn component(&mut self, definition: &TypeDefinition) -> Schema {
        if matches!(self.lattice.resolve(&definition.ty), BalType::Error(_)) {
            return self.error_payload();
        }
        let name = definition.name.clone();
        if self.schemas.contains_key(&name) || self.in_progress.contains(&name) {
            return Schema::reference(&name);
        }

        debug!("Generating component schema for: {}", name);
        self.in_progress.insert(name.clone());
        let mut schema = self.generate_schema(&definition.ty);
        self.in_progress.remove(&name);

        if let Some(constraint) = &definition.constraint {
            schema = self.constrained(schema, constraint, &name);
        }
        if definition.description.is_some() {
            schema.description = definition.description.clone();
        }
        BallerinaTypeExtensioner::add_extension(
            &mut schema,
            &BallerinaPackage::of(&definition.module, &name),
        );
        self.schemas.insert(name.clone(), schema);
        Schema::reference(&name)
    }

    fn union_schema(&mut self, members: &[BalType]) -> Schema {
        let nullable = members.iter().any(|m| self.lattice.resolve(m).is_nil());
        let rest: Vec<&BalType> = members
            .iter()
            .filter(|m| !self.lattice.resolve(m).is_nil())
            .collect();

        let mut schema = match rest.as_slice() {
            [] => Schema::default(),
            [single] => self.generate_schema(single),
            many => {
                let literals = many
                    .iter()
                    .map(|m| self.lattice.singleton_literals(m))
                    .collect::<Option<Vec<_>>>();
                match literals {
                    Some(literals) => {
                        let literals: Vec<Literal> = literals.into_iter().flatten().collect();
                        self.enum_schema(&literals)
                    }
                    None => Schema {
                        one_of: Some(many.iter().map(|m| self.generate_schema(m)).collect()),
                        ..Default::default()
                    },
                }
            }
        };

        if nullable {
            if schema.reference.is_some() {
                schema = Schema {
                    all_of: Some(vec![schema]),
                    ..Default::default()
                };
            }
            schema.nullable = Some(true);
        }
        schema
    }

    /// A schema listing `literals`, typed when they share a base type.
    fn enum_schema(&mut self, literals: &[Literal]) -> Schema {
        let mut schema = match literals.first().map(Literal::base_type) {
            Some(base) if literals.iter().all(|l| l.base_type() == base) => {
                self.generate_schema(&base)
            }
            _ => Schema::default(),
        };
        schema.enum_values = Some(literals.iter().map(Literal::to_json).collect());
        schema
    }

    /// Apply constraint facets to `schema`. References are wrapped in `allOf` so the
    /// facets are not ignored next to `$ref`.
    pub fn constrained(
        &mut self,
        schema: Schema,
        constraint: &ConstraintAnnotation,
        type_name: &str,
    ) -> Schema {
        if !constraint.has_constraints() {
            return schema;
        }
        let mut schema = if schema.reference.is_some() {
            Schema {
                all_of: Some(vec![schema]),
                ..Default::default()
            }
        } else {
            schema
        };
        let is_array = schema.schema_type.as_deref() == Some("array");

        if let Some(value) = self.number("minValue", constraint.min_value(), type_name) {
            schema.minimum = Some(value);
        }
        if let Some(value) = self.number("maxValue", constraint.max_value(), type_name) {
            schema.maximum = Some(value);
        }
        if let Some(value) =
            self.number("minValueExclusive", constraint.min_value_exclusive(), type_name)
        {
            schema.minimum = Some(value);
            schema.exclusive_minimum = Some(true);
        }
        if let Some(value) =
            self.number("maxValueExclusive", constraint.max_value_exclusive(), type_name)
        {
            schema.maximum = Some(value);
            schema.exclusive_maximum = Some(true);
        }

        let length = self.count("length", constraint.length(), type_name);
        let min = self
            .count("minLength", constraint.min_length(), type_name)
            .or(length);
        let max = self
            .count("maxLength", constraint.max_length(), type_name)
            .or(length);
        if is_array {
            schema.min_items = min.or(schema.min_items);
            schema.max_items = max.or(schema.max_items);
        } else {
            schema.min_length = min.or(schema.min_length);
            schema.max_length = max.or(schema.max_length);
        }

        if let Some(pattern) = constraint.pattern() {
            schema.pattern = Some(pattern.trim_matches('/').to_string());
        }
        schema
    }

    fn number(&mut self, facet: &str, value: Option<&str>, type_name: &str) -> Option<Number> {
        let raw = value?.trim();
        let parsed = raw
            .parse::<i64>()
            .ok()
            .map(Number::from)
            .or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64));
        if parsed.is_none() {
            self.invalid(facet, raw, type_name);
        }
        parsed
    }

    fn count(&mut self, facet: &str, value: Option<&str>, type_name: &str) -> Option<u64> {
        let raw = value?.trim();
        let parsed = raw.parse::<u64>().ok();
        if parsed.is_none() {
            self.invalid(facet, raw, type_name);
        }
        parsed
    }

    fn invalid(&mut self, facet: &str, value: &str, type_name: &str) {
        self.diagnostics
            .push(Diagnostic::warning(DiagnosticKind::InvalidConstraintValue {
                facet: facet.to_string(),
                value: value.to_string(),
                type_name: type_name.to_string(),
            }));
    }

    /// Get all generated component schemas
    pub fn get_schemas(&self) -> &IndexMap<String, Schema> {
        &self.schemas
    }

    /// Components and the diagnostics raised while generating them.
    pub fn finish(self) -> (IndexMap<String, Schema>, Vec<Diagnostic>) {
        (self.schemas, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ModuleId;
    use crate::types::parse::parse_type;
    use crate::types::{RecordField, RecordType, TypeRegistry};
    use pretty_assertions::assert_eq;

    fn field(name: &str, ty: &str, optional: bool) -> RecordField {
        RecordField {
            name: name.to_string(),
            ty: parse_type(ty).unwrap(),
            optional,
            constraint: None,
            description: None,
        }
    }

    fn define(registry: &mut TypeRegistry, name: &str, ty: BalType, constraint: Option<ConstraintAnnotation>) {
        registry.register(TypeDefinition {
            name: name.to_string(),
            module: ModuleId::new("acme", "petstore", "petstore", "1.0.0"),
            ty,
            constraint,
            description: None,
        });
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        let mut tag = field("tag", "string", true);
        tag.constraint = Some(ConstraintAnnotation::builder().max_length("10").build());
        define(
            &mut registry,
            "Pet",
            BalType::Record(RecordType {
                fields: vec![field("id", "int", false), field("owner", "Owner?", false), tag],
            }),
            None,
        );
        define(
            &mut registry,
            "Owner",
            BalType::Record(RecordType {
                fields: vec![field("name", "string", false), field("pets", "Pet[]", true)],
            }),
            None,
        );
        define(
            &mut registry,
            "Age",
            BalType::Int,
            Some(ConstraintAnnotation::builder().min_value("0").max_value_exclusive("150").build()),
        );
        define(&mut registry, "Missing", BalType::Error(Some("Missing".into())), None);
        registry
    }

    #[test]
    fn test_simple_types() {
        let registry = registry();
        let mut generator = SchemaGenerator::new(&registry);

        let schema = generator.generate_schema(&BalType::Int);
        assert_eq!(schema.schema_type.as_deref(), Some("integer"));
        assert_eq!(schema.format.as_deref(), Some("int64"));
        assert_eq!(generator.generate_schema(&BalType::String), Schema::typed("string"));
        assert_eq!(
            generator.generate_schema(&parse_type("string[]").unwrap()),
            Schema::array(Schema::typed("string"))
        );
        assert!(generator.get_schemas().is_empty());
    }

    #[test]
    fn test_record_components_and_recursion() {
        let registry = registry();
        let mut generator = SchemaGenerator::new(&registry);

        let schema = generator.generate_schema(&BalType::named("Pet"));
        assert_eq!(schema.component_name(), Some("Pet"));

        let (schemas, diagnostics) = generator.finish();
        assert!(diagnostics.is_empty());
        assert_eq!(schemas.keys().collect::<Vec<_>>(), vec!["Owner", "Pet"]);

        let pet = &schemas["Pet"];
        assert_eq!(pet.required, Some(vec!["id".to_string(), "owner".to_string()]));
        let properties = pet.properties.as_ref().unwrap();
        let owner = &properties["owner"];
        assert!(owner.is_nullable());
        assert_eq!(owner.all_of.as_ref().unwrap()[0].component_name(), Some("Owner"));
        assert_eq!(properties["tag"].max_length, Some(10));

        let owner_pets = &schemas["Owner"].properties.as_ref().unwrap()["pets"];
        assert_eq!(owner_pets.items.as_ref().unwrap().component_name(), Some("Pet"));
        assert!(BallerinaTypeExtensioner::get_extension(pet).is_some());
    }

    #[test]
    fn test_type_constraints() {
        let registry = registry();
        let mut generator = SchemaGenerator::new(&registry);
        generator.generate_schema(&BalType::named("Age"));

        let age = &generator.get_schemas()["Age"];
        assert_eq!(age.minimum, Some(Number::from(0)));
        assert_eq!(age.maximum, Some(Number::from(150)));
        assert_eq!(age.exclusive_maximum, Some(true));
        assert_eq!(age.exclusive_minimum, None);
    }

    #[test]
    fn test_invalid_constraint_value_is_reported() {
        let registry = registry();
        let mut generator = SchemaGenerator::new(&registry);
        let constraint = ConstraintAnnotation::builder()
            .min_length("short")
            .pattern("/[a-z]+/")
            .build();
        let schema = generator.constrained(Schema::typed("string"), &constraint, "Name");

        assert_eq!(schema.min_length, None);
        assert_eq!(schema.pattern.as_deref(), Some("[a-z]+"));
        let (_, diagnostics) = generator.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code(), "BAL_OAS_301");
    }

    #[test]
    fn test_length_applies_to_array_items() {
        let registry = registry();
        let mut generator = SchemaGenerator::new(&registry);
        let constraint = ConstraintAnnotation::builder().length("3").build();
        let schema = generator.constrained(Schema::array(Schema::typed("int")), &constraint, "Triple");
        assert_eq!((schema.min_items, schema.max_items), (Some(3), Some(3)));
        assert_eq!(schema.min_length, None);
    }

    #[test]
    fn test_unions() {
        let registry = registry();
        let mut generator = SchemaGenerator::new(&registry);

        let status = generator.generate_schema(&parse_type("\"on\"|\"off\"").unwrap());
        assert_eq!(status.schema_type.as_deref(), Some("string"));
        assert_eq!(
            status.enum_values,
            Some(vec![Value::from("on"), Value::from("off")])
        );

        let mixed = generator.generate_schema(&parse_type("int|string?").unwrap());
        assert_eq!(mixed.one_of.as_ref().map(Vec::len), Some(2));
        assert!(mixed.is_nullable());

        let optional = generator.generate_schema(&parse_type("string?").unwrap());
        assert_eq!(optional.schema_type.as_deref(), Some("string"));
        assert!(optional.is_nullable());
    }

    #[test]
    fn test_errors_share_the_error_payload() {
        let registry = registry();
        let mut generator = SchemaGenerator::new(&registry);
        assert_eq!(
            generator.generate_schema(&BalType::named("Missing")).component_name(),
            Some(ERROR_PAYLOAD)
        );
        assert_eq!(
            generator.generate_schema(&BalType::Error(None)).component_name(),
            Some(ERROR_PAYLOAD)
        );
        assert_eq!(generator.get_schemas().len(), 1);
    }

    #[test]
    fn test_extensions_serialize_inline() {
        let mut schema = Schema::object();
        schema.extensions.insert("x-test".into(), Value::Bool(true));
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json, serde_json::json!({"type": "object", "x-test": true}));
    }
}
