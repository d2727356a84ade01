use crate::annotation::{
    collect_comment_blocks, parse_api_info, parse_operation, parse_tags, Operation, Tag,
};
use crate::detector::BlockDetector;
use crate::engine::resolve_operations;
use crate::locator::SourceTypeLocator;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::package_index::PackageIndex;
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::FileScanner;
use crate::schema_generator::{Naming, SchemaGenerator};
use crate::serializer::{serialize, write_to_file};
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

pub use crate::serializer::OutputFormat;

/// OpenAPI from comments - generate OpenAPI documents from annotated doc comments in Rust projects
#[derive(Parser, Debug)]
#[command(name = "openapi-from-comments")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// How schema names are qualified
    #[arg(short = 'n', long = "naming", value_enum, default_value = "full")]
    pub naming: Naming,

    /// Modules whose comments are not scanned, e.g. `legacy,crate::internal`
    #[arg(short = 'i', long = "ignore", value_name = "MODULES", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// Ignored modules as absolute module paths
    pub fn ignored_modules(&self) -> Vec<String> {
        self.ignore
            .iter()
            .map(|module| module.trim().trim_matches(':').to_string())
            .filter(|module| !module.is_empty())
            .map(|module| {
                if module == "crate" || module.starts_with("crate::") {
                    module
                } else {
                    format!("crate::{}", module)
                }
            })
            .collect()
    }
}

/// Whether `module` is one of `ignored` or nested inside one
fn is_ignored(ignored: &[String], module: &str) -> bool {
    ignored.iter().any(|ignored| {
        module == ignored
            || module
                .strip_prefix(ignored.as_str())
                .map(|rest| rest.starts_with("::"))
                .unwrap_or(false)
    })
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    // Validate project path exists
    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    // Validate project path is a directory
    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    info!("Schema naming: {:?}", args.naming);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if !args.ignore.is_empty() {
        info!("Ignored modules: {:?}", args.ignored_modules());
    }

    Ok(args)
}

/// Scan, parse and resolve the project into an OpenAPI document
pub fn generate(args: &CliArgs) -> Result<OpenApiDocument> {
    // Step 1: Scan directory for Rust files
    info!("Scanning project directory...");
    let scanner = FileScanner::new(args.project_path.clone());
    let scan_result = scanner.scan()?;

    info!("Found {} Rust files", scan_result.source_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    if scan_result.source_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Parse files into AST
    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.source_files)
        .into_iter()
        .filter_map(|result| match result {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping file due to parse error: {:#}", e);
                None
            }
        })
        .collect();

    info!("Successfully parsed {} files", parsed_files.len());
    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    // Step 3: Index modules and their imports
    let index = PackageIndex::from_files(&parsed_files);
    info!("Indexed {} modules", index.len());
    let locator = SourceTypeLocator::new(&parsed_files, &index);

    // Step 4: Collect and classify annotation blocks
    let ignored = args.ignored_modules();
    let blocks = collect_comment_blocks(&parsed_files, |module| is_ignored(&ignored, module));
    let detection = BlockDetector::detect(&blocks);

    let api_info = parse_api_info(&detection.api_blocks);
    let tags: Vec<Tag> = detection
        .tag_blocks
        .iter()
        .flat_map(|block| parse_tags(block))
        .collect();
    let mut operations: Vec<Operation> = detection
        .operation_blocks
        .iter()
        .filter_map(|block| parse_operation(block))
        .collect();

    info!("Found {} operations", operations.len());
    if operations.is_empty() {
        warn!("No operations found in the project");
    }

    // Step 5: Resolve every referenced type
    info!("Resolving types...");
    let store = resolve_operations(&index, &locator, &mut operations)
        .context("Failed to resolve the types referenced by the operations")?;

    // Step 6: Build OpenAPI document
    info!("Building OpenAPI document...");
    let schema_gen = SchemaGenerator::new(&store, args.naming);
    let mut builder = OpenApiBuilder::new().with_api_info(&api_info);
    builder.add_tags(&tags);
    for operation in &operations {
        builder.add_operation(operation, &schema_gen);
    }

    let document = builder.build(schema_gen.get_schemas());
    info!("OpenAPI document built successfully");

    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.source_files.len());
    info!("  - Files parsed: {}", parsed_files.len());
    info!("  - Operations: {}", operations.len());
    info!("  - Schemas: {}", store.len());

    Ok(document)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");
    let document = generate(&args)?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = serialize(&document, args.output_format)?;

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    Ok(())
}
