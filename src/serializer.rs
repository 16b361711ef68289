//! Serialization of OpenAPI documents to YAML or JSON and writing them out.
//!
//! A run can produce one document per service. On stdout the documents are printed one
//! after the other; in an output directory each gets its own file named after the
//! service's base path (`/petstore` becomes `petstore_openapi.yaml`).

use crate::cli::OutputFormat;
use crate::generator::GeneratedDocument;
use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

pub fn serialize(doc: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serialize_yaml(doc),
        OutputFormat::Json => serialize_json(doc),
    }
}

/// Writes string content to a file, creating parent directories as needed.
///
/// Overwrites the file if it exists.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// File stem for a service: its base path with separators flattened, or the service
/// name for the root path.
pub fn file_stem(service_name: &str, base_path: &str) -> String {
    let stem: String = base_path
        .trim_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        service_name.to_string()
    } else {
        stem
    }
}

/// `<stem>_openapi.<ext>`, numbered `_1`, `_2`, ... when the name is already taken.
fn unique_file_name(stem: &str, format: OutputFormat, taken: &mut HashSet<String>) -> String {
    let extension = format.extension();
    let mut name = format!("{}_openapi.{}", stem, extension);
    let mut counter = 1;
    while taken.contains(&name) {
        name = format!("{}_openapi_{}.{}", stem, counter, extension);
        counter += 1;
    }
    taken.insert(name.clone());
    name
}

/// Serialize every document and write it into `output_dir`.
///
/// Returns the written paths in document order.
pub fn write_documents(
    documents: &[GeneratedDocument],
    output_dir: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    let mut taken = HashSet::new();
    let mut written = Vec::with_capacity(documents.len());
    for generated in documents {
        let stem = file_stem(&generated.service_name, &generated.base_path);
        let path = output_dir.join(unique_file_name(&stem, format, &mut taken));
        let content = serialize(&generated.document, format)
            .with_context(|| format!("Failed to serialize service {}", generated.service_name))?;
        write_to_file(&content, &path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi_builder::Info;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_document() -> OpenApiDocument {
        OpenApiDocument {
            openapi: "3.0.1".to_string(),
            info: Info {
                title: "Petstore".to_string(),
                version: "1.0.0".to_string(),
                description: Some("Pets for sale".to_string()),
            },
            servers: None,
            paths: IndexMap::new(),
            components: None,
        }
    }

    fn generated(name: &str, base_path: &str) -> GeneratedDocument {
        GeneratedDocument {
            service_name: name.to_string(),
            base_path: base_path.to_string(),
            document: create_test_document(),
        }
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi: 3.0.1"));
        assert!(yaml.contains("title: Petstore"));
        assert!(yaml.contains("description: Pets for sale"));
        assert!(yaml.contains("paths: {}"));
        assert!(!yaml.contains("servers"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.lines().count() > 5);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["openapi"], "3.0.1");
        assert_eq!(parsed["info"]["title"], "Petstore");
        assert!(parsed.get("components").is_none());
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("test.yaml");

        write_to_file("first", &file_path).unwrap();
        write_to_file("second", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "second");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("petstore", "/pet-store/v1"), "pet-store_v1");
        assert_eq!(file_stem("root", "/"), "root");
    }

    #[test]
    fn test_write_documents_numbers_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let documents = vec![
            generated("petstore", "/petstore"),
            generated("petstore", "/petstore"),
            generated("admin", "/"),
        ];

        let written = write_documents(&documents, temp_dir.path(), OutputFormat::Json).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["petstore_openapi.json", "petstore_openapi_1.json", "admin_openapi.json"]
        );

        let content = fs::read_to_string(&written[2]).unwrap();
        let doc: OpenApiDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(doc, create_test_document());
    }
}
