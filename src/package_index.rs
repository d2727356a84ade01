//! Package index: every module of the analyzed tree with the names it imports.
//!
//! The index is built once from the parsed files and then only read. Import tables keep
//! discovery order so ambiguous aliases are tried in a stable order.

use crate::parser::ParsedFile;
use indexmap::IndexMap;
use log::debug;
use syn::{Item, UseTree};

/// Alias recorded for glob imports (`use crate::models::*;`)
pub const GLOB_ALIAS: &str = "*";

/// One module of the analyzed tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Absolute module path, e.g. `crate::models`
    pub import_path: String,
    /// Last path segment
    pub name: String,
    /// Imported path -> aliases it is visible under, in discovery order
    pub imports: IndexMap<String, Vec<String>>,
}

impl PackageInfo {
    pub fn new(import_path: impl Into<String>) -> Self {
        let import_path = import_path.into();
        let name = package_name(&import_path).to_string();
        Self {
            import_path,
            name,
            imports: IndexMap::new(),
        }
    }

    /// Register `import_path` under `alias`, ignoring duplicates
    pub fn add_import(&mut self, import_path: impl Into<String>, alias: impl Into<String>) {
        let alias = alias.into();
        let aliases = self.imports.entry(import_path.into()).or_default();
        if !aliases.contains(&alias) {
            aliases.push(alias);
        }
    }

    /// Every imported path visible under `alias`, in discovery order
    pub fn import_paths_for(&self, alias: &str) -> Vec<&str> {
        self.imports
            .iter()
            .filter(|(_, aliases)| aliases.iter().any(|a| a == alias))
            .map(|(path, _)| path.as_str())
            .collect()
    }

    /// Paths pulled in with `*`
    pub fn glob_imports(&self) -> Vec<&str> {
        self.import_paths_for(GLOB_ALIAS)
    }
}

/// Last segment of a module path
pub fn package_name(import_path: &str) -> &str {
    import_path.rsplit("::").next().unwrap_or(import_path)
}

/// Parent module path, `None` for the crate root
pub fn parent_path(import_path: &str) -> Option<&str> {
    import_path.rsplit_once("::").map(|(parent, _)| parent)
}

/// Read-only table of all packages, keyed by import path
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: IndexMap<String, PackageInfo>,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index for every module found in `files`.
    pub fn from_files(files: &[ParsedFile]) -> Self {
        let mut index = PackageIndex::new();

        // First pass: every module must be known before `use` paths are normalized.
        for file in files {
            for module in file.modules() {
                index.ensure(&module.module_path);
                for item in module.items {
                    if let Item::Mod(item_mod) = item {
                        index.ensure(&format!("{}::{}", module.module_path, item_mod.ident));
                    }
                }
            }
        }

        // Child modules are in scope under their own name.
        let paths: Vec<String> = index.packages.keys().cloned().collect();
        for path in &paths {
            if let Some(parent) = parent_path(path) {
                if let Some(parent_info) = index.packages.get_mut(parent) {
                    parent_info.add_import(path.clone(), package_name(path));
                }
            }
        }

        for file in files {
            for module in file.modules() {
                let mut entries = Vec::new();
                for item in module.items {
                    if let Item::Use(item_use) = item {
                        let mut prefix = Vec::new();
                        if item_use.leading_colon.is_some() {
                            // `use ::serde::Serialize;` always names an external crate
                            prefix.push(String::new());
                        }
                        collect_use_tree(&item_use.tree, &mut prefix, &mut entries);
                    }
                }

                for (segments, alias) in entries {
                    match index.normalize_use_path(&module.module_path, &segments) {
                        Some(import_path) => {
                            debug!("{} imports {} as {}", module.module_path, import_path, alias);
                            if let Some(info) = index.packages.get_mut(&module.module_path) {
                                info.add_import(import_path, alias);
                            }
                        }
                        None => debug!(
                            "Ignoring use path {} in {}",
                            segments.join("::"),
                            module.module_path
                        ),
                    }
                }
            }
        }

        debug!("Indexed {} packages", index.len());
        index
    }

    fn ensure(&mut self, import_path: &str) {
        if !self.packages.contains_key(import_path) {
            self.packages
                .insert(import_path.to_string(), PackageInfo::new(import_path));
        }
    }

    /// Add or replace a package
    pub fn insert(&mut self, info: PackageInfo) {
        self.packages.insert(info.import_path.clone(), info);
    }

    pub fn get(&self, import_path: &str) -> Option<&PackageInfo> {
        self.packages.get(import_path)
    }

    pub fn contains(&self, import_path: &str) -> bool {
        self.packages.contains_key(import_path)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageInfo> {
        self.packages.values()
    }

    /// Turn the segments of a `use` path into an absolute path.
    ///
    /// `crate`, `self` and `super` are resolved against `current`; a first segment naming
    /// a child of `current` is relative, anything else names an external crate.
    fn normalize_use_path(&self, current: &str, segments: &[String]) -> Option<String> {
        let (first, rest) = segments.split_first()?;

        let base = match first.as_str() {
            "" => return Some(rest.join("::")),
            "crate" => "crate".to_string(),
            "self" => current.to_string(),
            "super" => {
                let mut base = parent_path(current)?.to_string();
                let mut rest = rest;
                while let Some((next, remaining)) = rest.split_first() {
                    if next != "super" {
                        break;
                    }
                    base = parent_path(&base)?.to_string();
                    rest = remaining;
                }
                return Some(join_path(&base, rest));
            }
            child if self.contains(&format!("{}::{}", current, child)) => {
                format!("{}::{}", current, child)
            }
            _ => return Some(segments.join("::")),
        };

        Some(join_path(&base, rest))
    }
}

/// Append `rest` to `base` with `::` separators
pub fn join_path(base: &str, rest: &[String]) -> String {
    let mut path = base.to_string();
    for segment in rest {
        path.push_str("::");
        path.push_str(segment);
    }
    path
}

/// Flatten a `use` tree into (path segments, alias) pairs
fn collect_use_tree(tree: &UseTree, prefix: &mut Vec<String>, entries: &mut Vec<(Vec<String>, String)>) {
    match tree {
        UseTree::Path(use_path) => {
            prefix.push(use_path.ident.to_string());
            collect_use_tree(&use_path.tree, prefix, entries);
            prefix.pop();
        }
        UseTree::Name(use_name) => {
            let ident = use_name.ident.to_string();
            if ident == "self" {
                if let Some(last) = prefix.last() {
                    entries.push((prefix.clone(), last.clone()));
                }
            } else {
                let mut segments = prefix.clone();
                segments.push(ident.clone());
                entries.push((segments, ident));
            }
        }
        UseTree::Rename(use_rename) => {
            let alias = use_rename.rename.to_string();
            if alias == "_" {
                return;
            }
            let mut segments = prefix.clone();
            if use_rename.ident != "self" {
                segments.push(use_rename.ident.to_string());
            }
            entries.push((segments, alias));
        }
        UseTree::Glob(_) => {
            entries.push((prefix.clone(), GLOB_ALIAS.to_string()));
        }
        UseTree::Group(group) => {
            for item in &group.items {
                collect_use_tree(item, prefix, entries);
            }
        }
    }
}
