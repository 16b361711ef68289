use anyhow::{bail, Result};
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions of service model files.
const MODEL_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// File scanner for locating service model files.
///
/// The `FileScanner` recursively walks an input directory to find every model file. It
/// skips `target` and hidden directories (those starting with `.`). A single file given
/// as the input is returned as-is, whatever its extension.
///
/// # Example
///
/// ```no_run
/// use ballerina_openapi::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./model"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} model files", result.model_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a scan.
pub struct ScanResult {
    /// Discovered model files, in directory-walk order
    pub model_files: Vec<PathBuf>,
    /// Warning messages for inaccessible entries
    pub warnings: Vec<String>,
}

pub fn is_model_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| MODEL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects all model files below the root path.
    ///
    /// Entries that cannot be accessed are logged and recorded as warnings; scanning
    /// continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.exists() {
            bail!("Input path does not exist: {}", self.root_path.display());
        }
        if self.root_path.is_file() {
            return Ok(ScanResult {
                model_files: vec![self.root_path.clone()],
                warnings: Vec::new(),
            });
        }

        let mut model_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_model_file(path) {
                        model_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            model_files,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(result: &ScanResult) -> Vec<String> {
        result
            .model_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("petstore.yaml"), "").unwrap();
        fs::write(root.join("orders.yml"), "").unwrap();
        fs::write(root.join("inventory.JSON"), "").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();
        fs::write(root.join("main.bal"), "service / on ep {}").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();
        assert_eq!(names(&result), vec!["inventory.JSON", "orders.yml", "petstore.yaml"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_nested_skips_hidden_and_target() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("modules/types")).unwrap();
        fs::create_dir(root.join("target")).unwrap();
        fs::create_dir(root.join(".cache")).unwrap();
        fs::write(root.join("modules/types/types.yaml"), "").unwrap();
        fs::write(root.join("target/generated.yaml"), "").unwrap();
        fs::write(root.join(".cache/old.yaml"), "").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();
        assert_eq!(names(&result), vec!["types.yaml"]);
    }

    #[test]
    fn test_scan_single_file_input() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("service.model");
        fs::write(&file, "").unwrap();

        let result = FileScanner::new(file.clone()).scan().unwrap();
        assert_eq!(result.model_files, vec![file]);
    }

    #[test]
    fn test_scan_missing_input() {
        let err = FileScanner::new(PathBuf::from("/nonexistent/model")).scan();
        assert!(err.is_err());
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::new(temp_dir.path().to_path_buf()).scan().unwrap();
        assert!(result.model_files.is_empty());
    }
}
