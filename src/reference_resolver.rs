use crate::error::{ResolutionError, Result};
use crate::package_index::{join_path, parent_path, PackageInfo};
use crate::type_ref::TypePath;

/// Import paths that could declare `path` as seen from `package`, in the order to try them.
///
/// An unqualified name can only come from the referring package itself. A path qualifier
/// (`crate::`, `self::`, `super::`) is absolute and yields exactly one candidate. Any other
/// qualifier is an alias and yields every import registered under it.
pub fn candidate_import_paths(package: &PackageInfo, path: &TypePath) -> Result<Vec<String>> {
    let Some((alias, rest)) = path.qualifier.split_first() else {
        return Ok(vec![package.import_path.clone()]);
    };

    match alias.as_str() {
        "crate" => Ok(vec![join_path("crate", rest)]),
        "self" => Ok(vec![join_path(&package.import_path, rest)]),
        "super" => {
            let mut base = package.import_path.as_str();
            let mut rest = rest;
            loop {
                base = parent_path(base).ok_or_else(|| ResolutionError::UnresolvedAlias {
                    alias: "super".to_string(),
                    package: package.import_path.clone(),
                })?;
                match rest.split_first() {
                    Some((next, remaining)) if next == "super" => rest = remaining,
                    _ => break,
                }
            }
            Ok(vec![join_path(base, rest)])
        }
        _ => {
            let candidates: Vec<String> = package
                .import_paths_for(alias)
                .into_iter()
                .map(|import_path| join_path(import_path, rest))
                .collect();

            if candidates.is_empty() {
                return Err(ResolutionError::UnresolvedAlias {
                    alias: alias.clone(),
                    package: package.import_path.clone(),
                });
            }
            Ok(candidates)
        }
    }
}
