//! Ballerina OpenAPI Generator - OpenAPI 3.0 documents from Ballerina HTTP service models.
//!
//! The compiler front end that reads Ballerina sources is not part of this crate. Instead a
//! service model (one YAML or JSON file per module) describes the type definitions,
//! interceptor services and HTTP services of a project. From that model the crate builds
//! one OpenAPI document per service, taking into account everything a request passes
//! through before and after reaching the resource function.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Finds model files in a directory
//! 2. [`parser`] / [`model`] - Deserializes model files into declarations
//! 3. [`resolver`] - Resolves declarations into typed [`service`]s and a [`types`] registry
//! 4. [`matcher`] - Decides which interceptor resources can handle a target resource path
//! 5. [`interceptor`] - Merges parameters and return types along an interceptor chain
//! 6. [`schema_generator`] - Converts Ballerina types to OpenAPI schemas, applying
//!    [`constraint`]s and origin [`extension`] tags
//! 7. [`openapi_builder`] - Constructs the OpenAPI document of one service
//! 8. [`hateoas`] - Turns `linkedTo` references into OpenAPI links
//! 9. [`generator`] - Runs the steps above for every service
//! 10. [`serializer`] - Serializes documents to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use ballerina_openapi::{
//!     generator::{GeneratorOptions, OpenApiGenerator},
//!     parser::ModelParser,
//!     resolver::ModelResolver,
//!     scanner::FileScanner,
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//!
//! let scan_result = FileScanner::new(PathBuf::from("./model")).scan().unwrap();
//! let parsed: Vec<_> = ModelParser::parse_files(&scan_result.model_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//! let project = ModelResolver::resolve(&parsed).unwrap();
//!
//! let result = OpenApiGenerator::generate(&project, &GeneratorOptions::default());
//! for diagnostic in &result.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! for generated in &result.documents {
//!     println!("{}", serialize_yaml(&generated.document).unwrap());
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod scanner;
pub mod parser;
pub mod model;
pub mod resolver;
pub mod types;
pub mod resource_path;
pub mod service;
pub mod matcher;
pub mod interceptor;
pub mod constraint;
pub mod extension;
pub mod diagnostics;
pub mod schema_generator;
pub mod openapi_builder;
pub mod hateoas;
pub mod generator;
pub mod serializer;
pub mod error;
