//! Resolution engine: computes the closure of named types reachable from the operations.
//!
//! Seeding resolves every root type reference of every operation. Expanding then rescans
//! the store for the first member whose type still has an unresolved named leaf, resolves
//! it and starts over, until a full scan finds nothing left to do. The first lookup that
//! fails aborts the run.

use crate::annotation::Operation;
use crate::definitions::{
    DefinitionKey, DefinitionKind, DefinitionRecord, DefinitionStore, MemberRecord, TypeSlot,
};
use crate::enums::enum_values;
use crate::error::{ResolutionError, Result};
use crate::locator::{LocatedMember, LocatedShape, LocatedType, TypeLocator};
use crate::package_index::{PackageIndex, PackageInfo};
use crate::reference_resolver::candidate_import_paths;
use crate::type_ref::{TypePath, TypeRef};
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Phase of a resolution run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Seeding,
    Expanding,
    Converged,
    Failed,
}

/// Outcome of searching the candidate packages for a name
enum Lookup {
    /// Already built, in the store or the flattening cache
    Known(DefinitionKey),
    /// Located but not built yet
    Found(LocatedType),
}

/// The first member found with an unresolved named leaf
struct Pending {
    owner: DefinitionKey,
    slot: TypeSlot,
    referring: String,
    path: TypePath,
    site: String,
}

/// Resolves type references into a [`DefinitionStore`].
///
/// One engine serves one run; the store is handed out by [`ResolutionEngine::into_store`].
pub struct ResolutionEngine<'a> {
    index: &'a PackageIndex,
    locator: &'a dyn TypeLocator,
    store: DefinitionStore,
    /// Records built only to be flattened into an owner; promoted into the store
    /// if the type is later referenced on its own
    flattened: IndexMap<DefinitionKey, DefinitionRecord>,
    /// (candidate package, name) -> home of the type found there
    located: HashMap<(String, String), DefinitionKey>,
    /// Records being assembled, innermost last
    embedding: Vec<DefinitionKey>,
    state: EngineState,
}

impl<'a> ResolutionEngine<'a> {
    pub fn new(index: &'a PackageIndex, locator: &'a dyn TypeLocator) -> Self {
        Self {
            index,
            locator,
            store: DefinitionStore::new(),
            flattened: IndexMap::new(),
            located: HashMap::new(),
            embedding: Vec::new(),
            state: EngineState::Seeding,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn store(&self) -> &DefinitionStore {
        &self.store
    }

    pub fn into_store(self) -> DefinitionStore {
        self.store
    }

    /// Resolve the root type references of every operation, back-filling them in place.
    pub fn seed(&mut self, operations: &mut [Operation]) -> Result<()> {
        self.state = EngineState::Seeding;

        for operation in operations.iter_mut() {
            let label = operation.label();
            let package = operation.package_path.clone();
            debug!("Seeding from {} in {}", label, package);

            for (site, type_ref) in operation.type_refs_mut() {
                if let Err(error) = self.resolve(&package, type_ref) {
                    return Err(self.fail(error.in_context(format!("{} of {}", site, label))));
                }
            }
        }

        debug!("Seeded {} definitions", self.store.len());
        Ok(())
    }

    /// Resolve every unresolved named leaf of `type_ref` as seen from `referring`.
    ///
    /// Primitives and `()` need no definition and yield nothing. Containers are never
    /// stored; only the named types inside them are. Returns the keys of the definitions
    /// the leaves resolved to.
    pub fn resolve(&mut self, referring: &str, type_ref: &mut TypeRef) -> Result<Vec<DefinitionKey>> {
        if referring.is_empty() {
            return Err(ResolutionError::InvalidReference {
                type_name: type_ref.to_string(),
            });
        }

        let mut keys = Vec::new();
        for path in type_ref.unresolved_paths() {
            let key = self.resolve_named(referring, &path)?;
            type_ref.backfill(&path, &key);
            keys.push(key);
        }
        Ok(keys)
    }

    /// Run the rescan loop to a fixed point. Returns how many definitions were added.
    pub fn expand(&mut self) -> Result<usize> {
        self.state = EngineState::Expanding;
        let before = self.store.len();
        let mut rescans = 0usize;

        while let Some(pending) = self.next_unresolved() {
            rescans += 1;
            let key = match self.resolve_named(&pending.referring, &pending.path) {
                Ok(key) => key,
                Err(error) => {
                    return Err(self.fail(error.in_context(format!("{} of {}", pending.site, pending.owner))))
                }
            };
            if let Some(record) = self.store.get_mut(&pending.owner) {
                record.backfill(pending.slot, &pending.path, &key);
            }
        }

        self.state = EngineState::Converged;
        let added = self.store.len() - before;
        debug!("Converged after {} rescans, {} definitions added", rescans, added);
        Ok(added)
    }

    fn fail(&mut self, error: ResolutionError) -> ResolutionError {
        self.state = EngineState::Failed;
        error
    }

    fn next_unresolved(&self) -> Option<Pending> {
        for (key, record) in self.store.iter() {
            for (slot, type_ref) in record.type_refs() {
                let Some(path) = type_ref.unresolved_paths().into_iter().next() else {
                    continue;
                };
                let site = match slot {
                    TypeSlot::Member(index) => match record.members.get(index) {
                        Some(member) => format!("member `{}`", member.exported_name),
                        None => "member".to_string(),
                    },
                    TypeSlot::AliasTarget => "target".to_string(),
                };
                return Some(Pending {
                    owner: key.clone(),
                    slot,
                    referring: record.referring_package(slot).to_string(),
                    path,
                    site,
                });
            }
        }
        None
    }

    /// Resolve one name into the store, building its record if needed
    fn resolve_named(&mut self, referring: &str, path: &TypePath) -> Result<DefinitionKey> {
        match self.lookup(referring, path)? {
            Lookup::Known(key) => {
                self.promote(&key);
                Ok(key)
            }
            Lookup::Found(located) => {
                let record = self.build_record(located)?;
                let key = record.key();
                self.store.insert(record);
                Ok(key)
            }
        }
    }

    /// Resolve the type of a flattened member without storing it
    fn resolve_embedded(
        &mut self,
        owner: &str,
        referring: &str,
        path: &TypePath,
    ) -> Result<DefinitionRecord> {
        let unresolved = || ResolutionError::UnresolvedEmbeddedType {
            name: path.to_string(),
            owner: owner.to_string(),
            package: referring.to_string(),
        };

        let lookup = self.lookup(referring, path).map_err(|error| match error {
            ResolutionError::UnresolvedType { .. } | ResolutionError::UnresolvedAlias { .. } => {
                unresolved()
            }
            other => other,
        })?;

        match lookup {
            Lookup::Known(key) => self
                .store
                .get(&key)
                .or_else(|| self.flattened.get(&key))
                .cloned()
                .ok_or_else(unresolved),
            Lookup::Found(located) => {
                let record = self.build_record(located)?;
                self.flattened.insert(record.key(), record.clone());
                Ok(record)
            }
        }
    }

    fn lookup(&mut self, referring: &str, path: &TypePath) -> Result<Lookup> {
        let candidates = match self.index.get(referring) {
            Some(package) => candidate_import_paths(package, path)?,
            None => candidate_import_paths(&PackageInfo::new(referring), path)?,
        };
        if candidates.len() > 1 {
            warn!(
                "`{}` in {} is ambiguous between {}; using the first that declares it",
                path,
                referring,
                candidates.join(", ")
            );
        }

        for candidate in &candidates {
            let direct = DefinitionKey::new(candidate.clone(), path.name.clone());
            if self.is_known(&direct) {
                return Ok(Lookup::Known(direct));
            }

            let memo = (candidate.clone(), path.name.clone());
            if let Some(home) = self.located.get(&memo) {
                if self.is_known(home) {
                    return Ok(Lookup::Known(home.clone()));
                }
            }

            match self.locator.locate(candidate, &path.name) {
                Some(located) => {
                    let home = located.key();
                    debug!("Located `{}` from {} as {}", path, referring, home);
                    self.located.insert(memo, home.clone());
                    if self.is_known(&home) {
                        return Ok(Lookup::Known(home));
                    }
                    return Ok(Lookup::Found(located));
                }
                None => debug!("`{}` is not in {}", path.name, candidate),
            }
        }

        Err(ResolutionError::UnresolvedType {
            name: path.to_string(),
            package: referring.to_string(),
        })
    }

    fn is_known(&self, key: &DefinitionKey) -> bool {
        self.store.contains(key) || self.flattened.contains_key(key)
    }

    /// Move a record built for flattening into the store
    fn promote(&mut self, key: &DefinitionKey) {
        if let Some(record) = self.flattened.shift_remove(key) {
            debug!("{} is referenced on its own; storing it", key);
            self.store.insert(record);
        }
    }

    fn build_record(&mut self, located: LocatedType) -> Result<DefinitionRecord> {
        let key = located.key();
        if self.embedding.contains(&key) {
            let owner = self
                .embedding
                .last()
                .map(|owner| owner.to_string())
                .unwrap_or_default();
            return Err(ResolutionError::CircularEmbedding {
                name: key.to_string(),
                owner,
            });
        }

        self.embedding.push(key);
        let result = self.assemble(located);
        self.embedding.pop();
        result
    }

    fn assemble(&mut self, located: LocatedType) -> Result<DefinitionRecord> {
        let LocatedType {
            package_path,
            package_name,
            name,
            description,
            shape,
            is_enum_candidate,
        } = located;

        let (kind, members) = match shape {
            LocatedShape::Object(members) => (DefinitionKind::Object, members),
            LocatedShape::Scalar(primitive) => (DefinitionKind::Scalar(primitive), Vec::new()),
            LocatedShape::Alias(target) => (DefinitionKind::Alias(target), Vec::new()),
        };

        let mut record = DefinitionRecord::new(package_path, package_name, name, kind);
        record.description = description;

        for member in members {
            if member.embedded {
                self.flatten_embedded(&mut record, member)?;
            } else {
                record.members.push(MemberRecord {
                    exported_name: member.name,
                    serialized_name: member.serialized_name,
                    type_ref: member.type_ref,
                    optional: member.optional,
                    is_embedded: false,
                    override_package_path: None,
                    description: member.description,
                });
            }
        }

        if is_enum_candidate {
            let groups = self.locator.constant_groups(&record.package_path);
            let values = enum_values(&groups, &record.name);
            if values.is_empty() {
                debug!("{} has no enumerated values", record.key());
            } else {
                record.enum_values = Some(values);
            }
        }

        Ok(record)
    }

    /// Promote the members of an embedded type into `record`
    fn flatten_embedded(&mut self, record: &mut DefinitionRecord, member: LocatedMember) -> Result<()> {
        let TypeRef::Named(named) = &member.type_ref else {
            warn!(
                "Flattened member `{}` of {} is not a named type ({}); dropping it",
                member.name,
                record.key(),
                member.type_ref
            );
            return Ok(());
        };

        let embedded = self.resolve_embedded(&record.name, &record.package_path, &named.path)?;
        if embedded.members.is_empty() {
            warn!(
                "Flattened member `{}` of {} has no members to promote",
                member.name,
                record.key()
            );
        }

        for mut promoted in embedded.members {
            if promoted.override_package_path.is_none() {
                promoted.override_package_path = Some(embedded.package_path.clone());
            }
            promoted.optional |= member.optional;
            promoted.is_embedded = true;
            record.members.push(promoted);
        }
        record.embedded_type_names.push(embedded.name);
        Ok(())
    }
}

/// Resolve every type the operations reference, directly or through other types.
///
/// Root references of `operations` are back-filled with the keys they resolved to.
pub fn resolve_operations(
    index: &PackageIndex,
    locator: &dyn TypeLocator,
    operations: &mut [Operation],
) -> Result<DefinitionStore> {
    let mut engine = ResolutionEngine::new(index, locator);
    engine.seed(operations)?;
    let seeded = engine.store().len();
    let added = engine.expand()?;

    info!(
        "Resolved {} definitions ({} from operations, {} reachable through members)",
        seeded + added,
        seeded,
        added
    );
    Ok(engine.into_store())
}
