use crate::enums::EnumValue;
use crate::type_ref::{PrimitiveType, TypePath, TypeRef};
use indexmap::IndexMap;
use log::debug;
use std::fmt;

/// Identity of a definition: its home package and bare name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionKey {
    pub package_path: String,
    pub name: String,
}

impl DefinitionKey {
    pub fn new(package_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}::{}", self.package_path, self.name)
    }
}

/// The shape a definition serializes as
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionKind {
    /// Named members, serialized as an object
    Object,
    /// A scalar, optionally restricted to enumerated values
    Scalar(PrimitiveType),
    /// Serialized exactly like the target type (newtypes, type aliases)
    Alias(TypeRef),
}

/// One member of a definition
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    /// Field name in source
    pub exported_name: String,
    /// Property name after serde renaming
    pub serialized_name: String,
    pub type_ref: TypeRef,
    /// `Option<T>` or `#[serde(default)]`
    pub optional: bool,
    /// Promoted from a flattened member
    pub is_embedded: bool,
    /// Home package of the embedded type this member was promoted from
    pub override_package_path: Option<String>,
    pub description: Option<String>,
}

impl MemberRecord {
    /// Package against which this member's type references resolve
    pub fn referring_package<'a>(&'a self, owner_package: &'a str) -> &'a str {
        self.override_package_path.as_deref().unwrap_or(owner_package)
    }
}

/// Where in a definition a type reference lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSlot {
    Member(usize),
    AliasTarget,
}

/// Canonical resolved shape of one named type
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionRecord {
    pub name: String,
    pub package_path: String,
    pub package_name: String,
    pub description: Option<String>,
    pub kind: DefinitionKind,
    pub members: Vec<MemberRecord>,
    /// Types whose members were flattened into this one
    pub embedded_type_names: Vec<String>,
    pub enum_values: Option<Vec<EnumValue>>,
}

impl DefinitionRecord {
    pub fn new(
        package_path: impl Into<String>,
        package_name: impl Into<String>,
        name: impl Into<String>,
        kind: DefinitionKind,
    ) -> Self {
        Self {
            name: name.into(),
            package_path: package_path.into(),
            package_name: package_name.into(),
            description: None,
            kind,
            members: Vec::new(),
            embedded_type_names: Vec::new(),
            enum_values: None,
        }
    }

    pub fn key(&self) -> DefinitionKey {
        DefinitionKey::new(self.package_path.clone(), self.name.clone())
    }

    /// Find a member by its source name
    pub fn member(&self, exported_name: &str) -> Option<&MemberRecord> {
        self.members
            .iter()
            .find(|member| member.exported_name == exported_name)
    }

    /// Every type reference held by this definition, with its location
    pub fn type_refs(&self) -> Vec<(TypeSlot, &TypeRef)> {
        let mut refs: Vec<(TypeSlot, &TypeRef)> = self
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| (TypeSlot::Member(index), &member.type_ref))
            .collect();
        if let DefinitionKind::Alias(target) = &self.kind {
            refs.push((TypeSlot::AliasTarget, target));
        }
        refs
    }

    /// Package that references in `slot` resolve against
    pub fn referring_package(&self, slot: TypeSlot) -> &str {
        match slot {
            TypeSlot::Member(index) => match self.members.get(index) {
                Some(member) => member.referring_package(&self.package_path),
                None => &self.package_path,
            },
            TypeSlot::AliasTarget => &self.package_path,
        }
    }

    /// Back-fill the resolved location of `path` inside `slot`
    pub fn backfill(&mut self, slot: TypeSlot, path: &TypePath, key: &DefinitionKey) {
        match slot {
            TypeSlot::Member(index) => {
                if let Some(member) = self.members.get_mut(index) {
                    member.type_ref.backfill(path, key);
                }
            }
            TypeSlot::AliasTarget => {
                if let DefinitionKind::Alias(target) = &mut self.kind {
                    target.backfill(path, key);
                }
            }
        }
    }
}

/// De-duplicated collection of resolved definitions keyed by (package, name)
#[derive(Debug, Clone, Default)]
pub struct DefinitionStore {
    definitions: IndexMap<DefinitionKey, DefinitionRecord>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &DefinitionKey) -> bool {
        self.definitions.contains_key(key)
    }

    pub fn get(&self, key: &DefinitionKey) -> Option<&DefinitionRecord> {
        self.definitions.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &DefinitionKey) -> Option<&mut DefinitionRecord> {
        self.definitions.get_mut(key)
    }

    /// Insert a record unless its key is already taken.
    ///
    /// Returns `false` (keeping the existing record) for a duplicate key.
    pub fn insert(&mut self, record: DefinitionRecord) -> bool {
        let key = record.key();
        if self.definitions.contains_key(&key) {
            debug!("Definition {} already stored", key);
            return false;
        }
        debug!("Storing definition {}", key);
        self.definitions.insert(key, record);
        true
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &DefinitionKey> {
        self.definitions.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DefinitionKey, &DefinitionRecord)> {
        self.definitions.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &DefinitionRecord> {
        self.definitions.values()
    }
}
