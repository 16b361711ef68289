//! Origin tags for generated schemas.
//!
//! Every component schema generated from a named Ballerina type can carry an
//! `x-ballerina-type` extension recording where the type was declared. After a document
//! is built, [`BallerinaTypeExtensioner::remove_extensions`] strips the tags the configured
//! [`BallerinaExtensionLevel`] does not want to expose, relative to the module that owns
//! the service being documented.

use crate::openapi_builder::Components;
use crate::schema_generator::Schema;
use log::debug;
use serde::{Deserialize, Serialize};

/// Extension key under which the origin tag is stored.
pub const BALLERINA_TYPE_EXTENSION: &str = "x-ballerina-type";

/// Identity of a Ballerina module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub org: String,
    pub package: String,
    pub module: String,
    pub version: String,
}

impl ModuleId {
    pub fn new(org: &str, package: &str, module: &str, version: &str) -> Self {
        Self {
            org: org.to_string(),
            package: package.to_string(),
            module: module.to_string(),
            version: version.to_string(),
        }
    }

    /// The default import prefix: the last dot-separated part of the module name.
    pub fn prefix(&self) -> &str {
        self.module.rsplit('.').next().unwrap_or(&self.module)
    }
}

/// Origin tag of a generated schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallerinaPackage {
    org_name: String,
    pkg_name: String,
    module_name: String,
    version: String,
    module_prefix: String,
    name: String,
}

impl BallerinaPackage {
    pub fn builder() -> BallerinaPackageBuilder {
        BallerinaPackageBuilder::default()
    }

    /// Tag for the type `name` declared in `module`.
    pub fn of(module: &ModuleId, name: &str) -> Self {
        Self::builder()
            .org_name(&module.org)
            .pkg_name(&module.package)
            .module_name(&module.module)
            .version(&module.version)
            .module_prefix(module.prefix())
            .name(name)
            .build()
    }

    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    pub fn pkg_name(&self) -> &str {
        &self.pkg_name
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn module_prefix(&self) -> &str {
        &self.module_prefix
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Default)]
pub struct BallerinaPackageBuilder {
    inner: BallerinaPackage,
}

impl BallerinaPackageBuilder {
    pub fn org_name(mut self, value: &str) -> Self {
        self.inner.org_name = value.to_string();
        self
    }

    pub fn pkg_name(mut self, value: &str) -> Self {
        self.inner.pkg_name = value.to_string();
        self
    }

    pub fn module_name(mut self, value: &str) -> Self {
        self.inner.module_name = value.to_string();
        self
    }

    pub fn version(mut self, value: &str) -> Self {
        self.inner.version = value.to_string();
        self
    }

    pub fn module_prefix(mut self, value: &str) -> Self {
        self.inner.module_prefix = value.to_string();
        self
    }

    pub fn name(mut self, value: &str) -> Self {
        self.inner.name = value.to_string();
        self
    }

    pub fn build(self) -> BallerinaPackage {
        self.inner
    }
}

/// Which origin tags survive in the final document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BallerinaExtensionLevel {
    /// Strip every tag.
    Disabled,
    /// Keep tags of types declared outside the consuming package.
    #[default]
    ExternalPackageTypes,
    /// Also keep tags of types from other modules of the consuming package.
    SamePackageDifferentModuleTypes,
    /// Keep every tag.
    AllReferencedTypes,
}

impl BallerinaExtensionLevel {
    /// Whether a tag with origin `tag` is kept for a document owned by `consumer`.
    pub fn keeps(&self, tag: &BallerinaPackage, consumer: &ModuleId) -> bool {
        let external_package = tag.org_name() != consumer.org || tag.pkg_name() != consumer.package;
        match self {
            BallerinaExtensionLevel::Disabled => false,
            BallerinaExtensionLevel::ExternalPackageTypes => external_package,
            BallerinaExtensionLevel::SamePackageDifferentModuleTypes => {
                external_package || tag.module_name() != consumer.module
            }
            BallerinaExtensionLevel::AllReferencedTypes => true,
        }
    }
}

/// Adds, reads and strips the `x-ballerina-type` extension.
pub struct BallerinaTypeExtensioner;

impl BallerinaTypeExtensioner {
    pub fn add_extension(schema: &mut Schema, package: &BallerinaPackage) {
        match serde_json::to_value(package) {
            Ok(value) => {
                schema
                    .extensions
                    .insert(BALLERINA_TYPE_EXTENSION.to_string(), value);
            }
            Err(e) => debug!("Could not encode origin tag for {}: {}", package.name(), e),
        }
    }

    pub fn get_extension(schema: &Schema) -> Option<BallerinaPackage> {
        schema
            .extensions
            .get(BALLERINA_TYPE_EXTENSION)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Strip tags from every component schema according to `level`.
    ///
    /// A missing components section or schema map is left alone.
    pub fn remove_extensions(
        components: Option<&mut Components>,
        level: BallerinaExtensionLevel,
        consumer: &ModuleId,
    ) {
        let Some(schemas) = components.and_then(|c| c.schemas.as_mut()) else {
            return;
        };

        for (name, schema) in schemas.iter_mut() {
            let Some(tag) = Self::get_extension(schema) else {
                continue;
            };
            if !level.keeps(&tag, consumer) {
                debug!("Removing {} from schema {}", BALLERINA_TYPE_EXTENSION, name);
                schema.extensions.shift_remove(BALLERINA_TYPE_EXTENSION);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn consumer() -> ModuleId {
        ModuleId::new("acme", "store", "store", "1.0.0")
    }

    fn tagged(module: &ModuleId, name: &str) -> Schema {
        let mut schema = Schema::object();
        BallerinaTypeExtensioner::add_extension(&mut schema, &BallerinaPackage::of(module, name));
        schema
    }

    fn components() -> Components {
        let mut schemas = IndexMap::new();
        schemas.insert("Local".to_string(), tagged(&consumer(), "Local"));
        schemas.insert(
            "Sibling".to_string(),
            tagged(&ModuleId::new("acme", "store", "store.types", "1.0.0"), "Sibling"),
        );
        schemas.insert(
            "Foreign".to_string(),
            tagged(&ModuleId::new("other", "lib", "lib", "2.1.0"), "Foreign"),
        );
        schemas.insert("Plain".to_string(), Schema::object());
        Components {
            schemas: Some(schemas),
        }
    }

    fn kept(components: &Components) -> Vec<String> {
        components
            .schemas
            .as_ref()
            .unwrap()
            .iter()
            .filter(|(_, s)| BallerinaTypeExtensioner::get_extension(s).is_some())
            .map(|(n, _)| n.clone())
            .collect()
    }

    #[test]
    fn test_extension_round_trip_through_schema() {
        let module = ModuleId::new("acme", "store", "store.types", "1.0.0");
        let schema = tagged(&module, "Pet");
        let tag = BallerinaTypeExtensioner::get_extension(&schema).unwrap();
        assert_eq!(tag.org_name(), "acme");
        assert_eq!(tag.module_prefix(), "types");
        assert_eq!(tag.name(), "Pet");
    }

    #[test]
    fn test_levels_strip_by_origin() {
        let cases = [
            (BallerinaExtensionLevel::Disabled, vec![]),
            (BallerinaExtensionLevel::ExternalPackageTypes, vec!["Foreign"]),
            (
                BallerinaExtensionLevel::SamePackageDifferentModuleTypes,
                vec!["Sibling", "Foreign"],
            ),
            (
                BallerinaExtensionLevel::AllReferencedTypes,
                vec!["Local", "Sibling", "Foreign"],
            ),
        ];
        for (level, expected) in cases {
            let mut components = components();
            BallerinaTypeExtensioner::remove_extensions(Some(&mut components), level, &consumer());
            assert_eq!(kept(&components), expected, "level {:?}", level);
        }
    }

    #[test]
    fn test_missing_components_is_noop() {
        BallerinaTypeExtensioner::remove_extensions(
            None,
            BallerinaExtensionLevel::Disabled,
            &consumer(),
        );
        let mut empty = Components { schemas: None };
        BallerinaTypeExtensioner::remove_extensions(
            Some(&mut empty),
            BallerinaExtensionLevel::Disabled,
            &consumer(),
        );
        assert!(empty.schemas.is_none());
    }
}
