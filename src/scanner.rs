use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks the module root of a project to find all Rust source
/// files and works out which module each of them defines. When the project has a `src`
/// directory that is the module root, otherwise the project directory itself is.
/// `target` and hidden directories (those starting with `.`) are skipped.
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// for file in &result.source_files {
///     println!("{} -> {}", file.path.display(), file.module_path);
/// }
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// A Rust source file together with the module path it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path to the `.rs` file
    pub path: PathBuf,
    /// Module path such as `crate::models::user`
    pub module_path: String,
}

/// Result of directory scanning operation.
///
/// Contains the discovered source files and any warnings encountered during scanning.
pub struct ScanResult {
    /// All discovered `.rs` files, sorted by path
    pub source_files: Vec<SourceFile>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified project directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// The directory module paths are computed from
    pub fn module_root(&self) -> PathBuf {
        let src = self.root_path.join("src");
        if src.is_dir() {
            src
        } else {
            self.root_path.clone()
        }
    }

    /// Scans the module root and collects all `.rs` files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the project directory cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        std::fs::metadata(&self.root_path)
            .with_context(|| format!("Failed to access project: {}", self.root_path.display()))?;

        let module_root = self.module_root();
        debug!("Scanning module root {}", module_root.display());

        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&module_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == module_root {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("rs") {
                        continue;
                    }

                    match module_path_for(&module_root, path) {
                        Some(module_path) => {
                            debug!("{} defines {}", path.display(), module_path);
                            source_files.push(SourceFile {
                                path: path.to_path_buf(),
                                module_path,
                            });
                        }
                        None => {
                            let warning = format!("Cannot derive module path for {}", path.display());
                            warn!("{}", warning);
                            warnings.push(warning);
                        }
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
            source_files,
            warnings,
        })
    }
}

/// Compute the module path of `file` relative to the module root.
///
/// `lib.rs` and `main.rs` at the root define `crate`, `a/mod.rs` defines `crate::a` and
/// `a/b.rs` defines `crate::a::b`.
pub fn module_path_for(module_root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(module_root).ok()?;
    let mut segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().replace('-', "_"))
        .collect();

    let file_name = segments.pop()?;
    let stem = file_name.strip_suffix(".rs")?;
    match stem {
        "mod" => {}
        "lib" | "main" if segments.is_empty() => {}
        other => segments.push(other.to_string()),
    }

    let mut module_path = String::from("crate");
    for segment in segments {
        module_path.push_str("::");
        module_path.push_str(&segment);
    }
    Some(module_path)
}
