use crate::scanner::SourceFile;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// AST (Abstract Syntax Tree) parser for Rust source files.
///
/// The `AstParser` uses the `syn` crate to parse Rust source code into an abstract syntax tree,
/// which is then searched for annotated doc comments, `use` declarations and type definitions.
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/models.rs"), "crate::models").unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Module path the file defines
    pub module_path: String,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

/// One module inside a parsed file: the file module itself or an inline `mod x { .. }`.
#[derive(Debug, Clone)]
pub struct ModuleSource<'a> {
    pub module_path: String,
    /// Attributes of the module, including `//!` docs
    pub attrs: &'a [syn::Attribute],
    pub items: &'a [syn::Item],
}

impl ParsedFile {
    /// All modules defined in this file, outermost first.
    pub fn modules(&self) -> Vec<ModuleSource<'_>> {
        let mut modules = Vec::new();
        collect_modules(
            &self.module_path,
            &self.syntax_tree.attrs,
            &self.syntax_tree.items,
            &mut modules,
        );
        modules
    }
}

fn collect_modules<'a>(
    module_path: &str,
    attrs: &'a [syn::Attribute],
    items: &'a [syn::Item],
    modules: &mut Vec<ModuleSource<'a>>,
) {
    modules.push(ModuleSource {
        module_path: module_path.to_string(),
        attrs,
        items,
    });

    for item in items {
        if let syn::Item::Mod(item_mod) = item {
            if let Some((_, content)) = &item_mod.content {
                let child_path = format!("{}::{}", module_path, item_mod.ident);
                collect_modules(&child_path, &item_mod.attrs, content, modules);
            }
        }
    }
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// This method reads the file content and uses `syn::parse_file` to parse it into
    /// a syntax tree.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the Rust source file to parse
    /// * `module_path` - Module the file defines, e.g. `crate::models`
    ///
    /// # Returns
    ///
    /// Returns a `ParsedFile` containing the file path, module path and syntax tree.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(path: &Path, module_path: &str) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = syn::parse_file(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.to_path_buf(),
            module_path: module_path.to_string(),
            syntax_tree,
        })
    }

    /// Parses in-memory source text as the module `module_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid Rust syntax.
    pub fn parse_source(module_path: &str, content: &str) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content)
            .with_context(|| format!("Failed to parse Rust syntax for module {}", module_path))?;

        Ok(ParsedFile {
            path: PathBuf::from(format!("<{}>", module_path)),
            module_path: module_path.to_string(),
            syntax_tree,
        })
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings, but parsing continues for remaining
    /// files, so documentation can still be generated for the rest of the project.
    ///
    /// # Arguments
    ///
    /// * `files` - Scanned source files with their module paths
    ///
    /// # Returns
    ///
    /// Returns one `Result<ParsedFile>` per input file, in input order.
    pub fn parse_files(files: &[SourceFile]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", files.len());

        let results: Vec<Result<ParsedFile>> = files
            .iter()
            .map(|file| match Self::parse_file(&file.path, &file.module_path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {}", file.path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        let failure_count = results.len() - success_count;

        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count, failure_count
        );

        results
    }
}
