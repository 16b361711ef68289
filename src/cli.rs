use crate::diagnostics::Severity;
use crate::extension::BallerinaExtensionLevel;
use crate::generator::{GeneratorOptions, OpenApiGenerator};
use crate::parser::{ModelParser, ParsedModule};
use crate::resolver::ModelResolver;
use crate::scanner::FileScanner;
use crate::serializer::{serialize, write_documents};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Ballerina OpenAPI Generator - Generate OpenAPI documents from Ballerina HTTP service models
#[derive(Parser, Debug)]
#[command(name = "bal-openapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Service model file or directory of model files
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output directory (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only generate the service mounted at this base path
    #[arg(short = 's', long = "service", value_name = "BASE_PATH")]
    pub service: Option<String>,

    /// Which x-ballerina-type tags to keep on component schemas
    #[arg(long = "extension-level", value_enum, default_value = "external-package-types")]
    pub extension_level: ExtensionLevel,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExtensionLevel {
    Disabled,
    ExternalPackageTypes,
    SamePackageDifferentModuleTypes,
    AllReferencedTypes,
}

impl From<ExtensionLevel> for BallerinaExtensionLevel {
    fn from(level: ExtensionLevel) -> Self {
        match level {
            ExtensionLevel::Disabled => BallerinaExtensionLevel::Disabled,
            ExtensionLevel::ExternalPackageTypes => BallerinaExtensionLevel::ExternalPackageTypes,
            ExtensionLevel::SamePackageDifferentModuleTypes => {
                BallerinaExtensionLevel::SamePackageDifferentModuleTypes
            }
            ExtensionLevel::AllReferencedTypes => BallerinaExtensionLevel::AllReferencedTypes,
        }
    }
}

impl CliArgs {
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            service: self.service.clone(),
            extension_level: self.extension_level.into(),
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }

    if let Some(ref output) = args.output_dir {
        if output.is_file() {
            anyhow::bail!("Output path is a file, expected a directory: {}", output.display());
        }
    }

    info!("Input: {}", args.input.display());
    info!("Output format: {:?}", args.output_format);
    match args.output_dir {
        Some(ref output) => info!("Output directory: {}", output.display()),
        None => info!("Output: stdout"),
    }
    if let Some(ref service) = args.service {
        info!("Service: {}", service);
    }
    debug!("Extension level: {:?}", args.extension_level);

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    // Step 1: Find model files
    let scanner = FileScanner::new(args.input.clone());
    let scan_result = scanner.scan()?;
    info!("Found {} model files", scan_result.model_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    if scan_result.model_files.is_empty() {
        anyhow::bail!("No model files found in {}", args.input.display());
    }

    // Step 2: Parse them
    let parsed: Vec<ParsedModule> = ModelParser::parse_files(&scan_result.model_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {:#}", e);
                None
            }
        })
        .collect();
    info!("Successfully parsed {} files", parsed.len());
    if parsed.is_empty() {
        anyhow::bail!("No model files could be parsed successfully");
    }

    // Step 3: Resolve types, interceptors and services
    let project = ModelResolver::resolve(&parsed).context("Failed to resolve service model")?;
    info!(
        "Resolved {} services and {} type definitions",
        project.services.len(),
        project.registry.len()
    );

    // Step 4: Generate
    let result = OpenApiGenerator::generate(&project, &args.generator_options());
    for diagnostic in &result.diagnostics {
        match diagnostic.severity {
            Severity::Error => log::error!("{}", diagnostic),
            _ => warn!("{}", diagnostic),
        }
    }
    if result.documents.is_empty() {
        match args.service {
            Some(ref service) => anyhow::bail!("No service found at base path {}", service),
            None => anyhow::bail!("No HTTP services found in the model"),
        }
    }

    // Step 5: Output to directory or stdout
    if let Some(output_dir) = &args.output_dir {
        let written = write_documents(&result.documents, output_dir, args.output_format)?;
        info!("Wrote {} documents to {}", written.len(), output_dir.display());
    } else {
        for generated in &result.documents {
            println!("{}", serialize(&generated.document, args.output_format)?);
        }
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.model_files.len());
    info!("  - Services documented: {}", result.documents.len());
    info!("  - Diagnostics: {}", result.diagnostics.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["bal-openapi", "model.yaml"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Yaml);
        assert_eq!(args.extension_level, ExtensionLevel::ExternalPackageTypes);
        assert!(args.output_dir.is_none());
        assert_eq!(
            args.generator_options().extension_level,
            BallerinaExtensionLevel::ExternalPackageTypes
        );
    }

    #[test]
    fn test_all_options() {
        let args = CliArgs::try_parse_from([
            "bal-openapi",
            "models",
            "-f",
            "json",
            "-o",
            "out",
            "-s",
            "/petstore",
            "--extension-level",
            "same-package-different-module-types",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert!(args.verbose);
        let options = args.generator_options();
        assert_eq!(options.service.as_deref(), Some("/petstore"));
        assert_eq!(
            options.extension_level,
            BallerinaExtensionLevel::SamePackageDifferentModuleTypes
        );
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let args = CliArgs::try_parse_from(["bal-openapi", "/definitely/not/here.yaml"]).unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }
}
