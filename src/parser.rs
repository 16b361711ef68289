use crate::model::ModuleDecl;
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser for service model files.
///
/// A model file is YAML (`.yaml`, `.yml`) or JSON (`.json`) and describes one Ballerina
/// module. The format is chosen by file extension.
///
/// # Example
///
/// ```no_run
/// use ballerina_openapi::parser::ModelParser;
/// use std::path::Path;
///
/// let parsed = ModelParser::parse_file(Path::new("model/petstore.yaml")).unwrap();
/// println!("Parsed {} services", parsed.module.services.len());
/// ```
pub struct ModelParser;

/// A successfully parsed model file.
#[derive(Debug, Clone)]
pub struct ParsedModule {
    /// Path to the model file
    pub path: PathBuf,
    /// The module declarations it contains
    pub module: ModuleDecl,
}

impl ParsedModule {
    /// Parse model content already in memory. `path` only selects the format and labels
    /// errors.
    pub fn from_content(path: &Path, content: &str) -> Result<Self> {
        let module = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(content)
                .with_context(|| format!("Failed to parse YAML model: {}", path.display()))?,
            Some("json") => serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON model: {}", path.display()))?,
            _ => bail!("Unsupported model file type: {}", path.display()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            module,
        })
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

impl ModelParser {
    /// Parses a single model file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file is not valid YAML/JSON or does not describe a module
    pub fn parse_file(path: &Path) -> Result<ParsedModule> {
        debug!("Parsing model file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let parsed = ParsedModule::from_content(path, &content)?;

        debug!(
            "Parsed module {}/{} from {}",
            parsed.module.package.org,
            parsed.module.package.module_name(),
            path.display()
        );
        Ok(parsed)
    }

    /// Parses multiple model files, continuing even if some fail.
    ///
    /// Failures are logged as warnings and returned in place so the caller can decide
    /// whether a partial model is good enough.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedModule>> {
        debug!("Parsing {} model files", paths.len());

        let results: Vec<Result<ParsedModule>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).map_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    const MINIMAL_YAML: &str = "package: { org: acme, name: petstore, version: 1.0.0 }\n";

    #[test]
    fn test_parse_yaml_and_json() {
        let temp_dir = TempDir::new().unwrap();
        let yaml = create_temp_file(&temp_dir, "a.yaml", MINIMAL_YAML);
        let json = create_temp_file(
            &temp_dir,
            "b.JSON",
            r#"{"package": {"org": "acme", "name": "inventory", "version": "2.0.0"}, "services": []}"#,
        );

        assert_eq!(ModelParser::parse_file(&yaml).unwrap().module.package.name, "petstore");
        let parsed = ModelParser::parse_file(&json).unwrap();
        assert_eq!(parsed.module.package.version, "2.0.0");
        assert_eq!(parsed.path, json);
    }

    #[test]
    fn test_parse_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_temp_file(&temp_dir, "broken.yaml", "package: [not, a, package]");

        let err_msg = format!("{:#}", ModelParser::parse_file(&file_path).unwrap_err());
        assert!(err_msg.contains("Failed to parse YAML model"));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let err_msg = ModelParser::parse_file(Path::new("/nonexistent/model.yaml"))
            .unwrap_err()
            .to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ParsedModule::from_content(Path::new("model.toml"), MINIMAL_YAML).unwrap_err();
        assert!(err.to_string().contains("Unsupported model file type"));
    }

    #[test]
    fn test_parse_files_batch() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_temp_file(&temp_dir, "good.yml", MINIMAL_YAML);
        let bad = create_temp_file(&temp_dir, "bad.json", "{");

        let results = ModelParser::parse_files(&[good.clone(), bad]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().path, good);
        assert!(results[1].is_err());
        assert!(ModelParser::parse_files(&[]).is_empty());
    }
}
