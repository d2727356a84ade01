//! OpenAPI from comments - OpenAPI documents from annotated doc comments.
//!
//! Operations are declared in doc comments made of `OpenAPI` sections. Every type an
//! operation references is looked up in the project's source, together with everything
//! those types reference in turn, and emitted as a component schema.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into Abstract Syntax Trees (AST)
//! 3. [`package_index`] - Indexes modules and the names they import
//! 4. [`annotation`] - Extracts and parses annotation blocks; [`detector`] sorts them by kind
//! 5. [`type_ref`] - Classifies textual type references
//! 6. [`locator`] and [`reference_resolver`] - Find the declaration behind a type name
//! 7. [`engine`] - Resolves the closure of referenced types into a [`definitions::DefinitionStore`]
//! 8. [`schema_generator`] - Converts resolved types to OpenAPI schemas
//! 9. [`openapi_builder`] - Constructs the complete OpenAPI document
//! 10. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_comments::{
//!     annotation::{collect_comment_blocks, parse_operation},
//!     detector::BlockDetector,
//!     engine::resolve_operations,
//!     locator::SourceTypeLocator,
//!     openapi_builder::OpenApiBuilder,
//!     package_index::PackageIndex,
//!     parser::AstParser,
//!     scanner::FileScanner,
//!     schema_generator::{Naming, SchemaGenerator},
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//!
//! let scanner = FileScanner::new(PathBuf::from("./my-project"));
//! let scan_result = scanner.scan().unwrap();
//!
//! let parsed_files: Vec<_> = AstParser::parse_files(&scan_result.source_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//! let index = PackageIndex::from_files(&parsed_files);
//! let locator = SourceTypeLocator::new(&parsed_files, &index);
//!
//! let blocks = collect_comment_blocks(&parsed_files, |_| false);
//! let detection = BlockDetector::detect(&blocks);
//! let mut operations: Vec<_> = detection
//!     .operation_blocks
//!     .iter()
//!     .filter_map(|block| parse_operation(block))
//!     .collect();
//!
//! let store = resolve_operations(&index, &locator, &mut operations).unwrap();
//! let schema_gen = SchemaGenerator::new(&store, Naming::Full);
//! let mut builder = OpenApiBuilder::new();
//! for operation in &operations {
//!     builder.add_operation(operation, &schema_gen);
//! }
//! let document = builder.build(schema_gen.get_schemas());
//!
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod annotation;
pub mod cli;
pub mod definitions;
pub mod detector;
pub mod engine;
pub mod enums;
pub mod error;
pub mod locator;
pub mod openapi_builder;
pub mod package_index;
pub mod parser;
pub mod reference_resolver;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_ref;
