//! Type references as written in annotations and field declarations.
//!
//! Every textual type is classified exactly once into a [`TypeRef`]. Later stages only
//! match on the variant instead of re-inspecting the text.

use crate::definitions::DefinitionKey;
use log::debug;
use std::fmt;

/// Primitive types supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Bool,
    Char,
    /// Free-form JSON (`serde_json::Value`)
    Any,
}

impl PrimitiveType {
    /// Parse a primitive type name
    pub fn from_name(type_name: &str) -> Option<Self> {
        match type_name {
            "String" | "str" => Some(PrimitiveType::String),
            "i8" => Some(PrimitiveType::I8),
            "i16" => Some(PrimitiveType::I16),
            "i32" => Some(PrimitiveType::I32),
            "i64" => Some(PrimitiveType::I64),
            "i128" => Some(PrimitiveType::I128),
            "isize" => Some(PrimitiveType::Isize),
            "u8" => Some(PrimitiveType::U8),
            "u16" => Some(PrimitiveType::U16),
            "u32" => Some(PrimitiveType::U32),
            "u64" => Some(PrimitiveType::U64),
            "u128" => Some(PrimitiveType::U128),
            "usize" => Some(PrimitiveType::Usize),
            "f32" => Some(PrimitiveType::F32),
            "f64" => Some(PrimitiveType::F64),
            "bool" => Some(PrimitiveType::Bool),
            "char" => Some(PrimitiveType::Char),
            _ => None,
        }
    }

    /// The Rust spelling of this primitive
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::String => "String",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::I128 => "i128",
            PrimitiveType::Isize => "isize",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::U128 => "u128",
            PrimitiveType::Usize => "usize",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::Any => "serde_json::Value",
        }
    }

    /// The serialization kind: OpenAPI `type` and `format`.
    ///
    /// [`PrimitiveType::Any`] has no type at all.
    pub fn schema_kind(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            PrimitiveType::String | PrimitiveType::Char => (Some("string"), None),
            PrimitiveType::I8 | PrimitiveType::I16 | PrimitiveType::I32 => {
                (Some("integer"), Some("int32"))
            }
            PrimitiveType::U8 | PrimitiveType::U16 | PrimitiveType::U32 => {
                (Some("integer"), Some("int32"))
            }
            PrimitiveType::I64
            | PrimitiveType::I128
            | PrimitiveType::Isize
            | PrimitiveType::U64
            | PrimitiveType::U128
            | PrimitiveType::Usize => (Some("integer"), Some("int64")),
            PrimitiveType::F32 => (Some("number"), Some("float")),
            PrimitiveType::F64 => (Some("number"), Some("double")),
            PrimitiveType::Bool => (Some("boolean"), None),
            PrimitiveType::Any => (None, None),
        }
    }

    /// Whether values of this primitive are integers
    pub fn is_integer(&self) -> bool {
        matches!(self.schema_kind().0, Some("integer"))
    }
}

/// A possibly-qualified type name, e.g. `models::User` or `User`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePath {
    /// Leading path segments (`["models"]` for `models::User`)
    pub qualifier: Vec<String>,
    /// The bare type name
    pub name: String,
}

impl TypePath {
    pub fn new(qualifier: Vec<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier,
            name: name.into(),
        }
    }

    /// Split a `::`-separated path into qualifier and name.
    pub fn parse(text: &str) -> Self {
        let mut segments: Vec<String> = text
            .split("::")
            .map(|segment| segment.trim().to_string())
            .filter(|segment| !segment.is_empty())
            .collect();
        let name = segments.pop().unwrap_or_default();
        Self::new(segments, name)
    }

    pub fn is_qualified(&self) -> bool {
        !self.qualifier.is_empty()
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for segment in &self.qualifier {
            write!(f, "{}::", segment)?;
        }
        write!(f, "{}", self.name)
    }
}

/// A reference to a user-defined type.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    /// The path exactly as written at the referring site
    pub path: TypePath,
    /// Generic arguments (`Page<User>` carries `User`)
    pub args: Vec<TypeRef>,
    /// Canonical location, back-filled once the name has been resolved
    pub resolved: Option<DefinitionKey>,
}

impl NamedType {
    pub fn new(path: TypePath) -> Self {
        Self {
            path,
            args: Vec::new(),
            resolved: None,
        }
    }
}

/// Classified type reference.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// The `()` sentinel: no body, no response content
    Unit,
    /// Built-in scalar
    Primitive(PrimitiveType),
    /// Sequence of the element type
    Sequence(Box<TypeRef>),
    /// Associative map from key type to value type
    Map(Box<TypeRef>, Box<TypeRef>),
    /// User-defined type that has to be looked up
    Named(NamedType),
    /// Generic parameter of the declaring type
    Param(String),
}

/// Classify a textual type reference.
///
/// Text that is not valid Rust type syntax falls back to a named reference.
pub fn classify(type_name: &str) -> TypeRef {
    let trimmed = type_name.trim();
    if trimmed.is_empty() || trimmed == "()" {
        return TypeRef::Unit;
    }

    match syn::parse_str::<syn::Type>(trimmed) {
        Ok(ty) => TypeRef::from_syn(&ty, &[]),
        Err(e) => {
            debug!("Treating `{}` as a named type: {}", trimmed, e);
            TypeRef::Named(NamedType::new(TypePath::parse(trimmed)))
        }
    }
}

/// Whether a declared field type is wrapped in `Option<T>`
pub fn is_option(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == "Option")
            .unwrap_or(false),
        syn::Type::Group(group) => is_option(&group.elem),
        syn::Type::Paren(paren) => is_option(&paren.elem),
        _ => false,
    }
}

/// Qualifiers under which standard containers and scalars are recognized
fn is_library_qualifier(qualifier: &[String]) -> bool {
    match qualifier.first() {
        None => true,
        Some(first) => matches!(
            first.as_str(),
            "std" | "core" | "alloc" | "indexmap" | "serde_json"
        ),
    }
}

impl TypeRef {
    /// Convert a parsed `syn::Type`. `params` are the generic parameters in scope.
    pub fn from_syn(ty: &syn::Type, params: &[String]) -> Self {
        match ty {
            syn::Type::Tuple(tuple) if tuple.elems.is_empty() => TypeRef::Unit,
            syn::Type::Reference(reference) => Self::from_syn(&reference.elem, params),
            syn::Type::Paren(paren) => Self::from_syn(&paren.elem, params),
            syn::Type::Group(group) => Self::from_syn(&group.elem, params),
            syn::Type::Slice(slice) => {
                TypeRef::Sequence(Box::new(Self::from_syn(&slice.elem, params)))
            }
            syn::Type::Array(array) => {
                TypeRef::Sequence(Box::new(Self::from_syn(&array.elem, params)))
            }
            syn::Type::Path(type_path) if type_path.qself.is_none() => {
                Self::from_path(&type_path.path, params)
            }
            other => {
                debug!("Unsupported type syntax, using free-form value: {:?}", other);
                TypeRef::Primitive(PrimitiveType::Any)
            }
        }
    }

    fn from_path(path: &syn::Path, params: &[String]) -> Self {
        let mut segments: Vec<String> = path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        let Some(last) = path.segments.last() else {
            return TypeRef::Primitive(PrimitiveType::Any);
        };
        let name = segments.pop().unwrap_or_default();

        let mut args = Vec::new();
        if let syn::PathArguments::AngleBracketed(angle) = &last.arguments {
            for arg in &angle.args {
                if let syn::GenericArgument::Type(inner_ty) = arg {
                    args.push(Self::from_syn(inner_ty, params));
                }
            }
        }

        if segments.is_empty() && params.contains(&name) {
            return TypeRef::Param(name);
        }

        if is_library_qualifier(&segments) {
            match (name.as_str(), args.len()) {
                ("Option" | "Box" | "Rc" | "Arc" | "Cow", 1) => {
                    return args.remove(0);
                }
                ("Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "IndexSet", 1) => {
                    return TypeRef::Sequence(Box::new(args.remove(0)));
                }
                ("HashMap" | "BTreeMap" | "IndexMap", 2) => {
                    let value = args.remove(1);
                    let key = args.remove(0);
                    return TypeRef::Map(Box::new(key), Box::new(value));
                }
                ("Value", 0) if segments.first().map(String::as_str) == Some("serde_json") => {
                    return TypeRef::Primitive(PrimitiveType::Any);
                }
                _ => {}
            }
            if args.is_empty() {
                if let Some(primitive) = PrimitiveType::from_name(&name) {
                    return TypeRef::Primitive(primitive);
                }
            }
        }

        TypeRef::Named(NamedType {
            path: TypePath::new(segments, name),
            args,
            resolved: None,
        })
    }

    /// Component types one decomposition level down.
    ///
    /// Primitives yield nothing, a sequence its element, a map its key and value,
    /// and a named type itself.
    pub fn component_types(&self) -> Vec<&TypeRef> {
        match self {
            TypeRef::Unit | TypeRef::Primitive(_) | TypeRef::Param(_) => Vec::new(),
            TypeRef::Sequence(element) => vec![element.as_ref()],
            TypeRef::Map(key, value) => vec![key.as_ref(), value.as_ref()],
            TypeRef::Named(_) => vec![self],
        }
    }

    /// Every named type reachable through containers and generic arguments.
    pub fn named_leaves(&self) -> Vec<&NamedType> {
        let mut leaves = Vec::new();
        self.collect_named(&mut leaves);
        leaves
    }

    fn collect_named<'a>(&'a self, leaves: &mut Vec<&'a NamedType>) {
        match self {
            TypeRef::Named(named) => {
                leaves.push(named);
                for arg in &named.args {
                    arg.collect_named(leaves);
                }
            }
            other => {
                for component in other.component_types() {
                    component.collect_named(leaves);
                }
            }
        }
    }

    /// Named leaves that have not been back-filled yet
    pub fn unresolved_paths(&self) -> Vec<TypePath> {
        let mut paths: Vec<TypePath> = Vec::new();
        for leaf in self.named_leaves() {
            if leaf.resolved.is_none() && !paths.contains(&leaf.path) {
                paths.push(leaf.path.clone());
            }
        }
        paths
    }

    /// Visit every named leaf mutably
    pub fn for_each_named_mut<F: FnMut(&mut NamedType)>(&mut self, f: &mut F) {
        match self {
            TypeRef::Sequence(element) => element.for_each_named_mut(f),
            TypeRef::Map(key, value) => {
                key.for_each_named_mut(f);
                value.for_each_named_mut(f);
            }
            TypeRef::Named(named) => {
                f(named);
                for arg in named.args.iter_mut() {
                    arg.for_each_named_mut(f);
                }
            }
            TypeRef::Unit | TypeRef::Primitive(_) | TypeRef::Param(_) => {}
        }
    }

    /// Record the canonical location of every unresolved leaf written as `path`.
    pub fn backfill(&mut self, path: &TypePath, key: &DefinitionKey) {
        self.for_each_named_mut(&mut |named: &mut NamedType| {
            if named.resolved.is_none() && &named.path == path {
                named.resolved = Some(key.clone());
            }
        });
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, TypeRef::Unit)
    }

    /// Whether this reference is a scalar that needs no schema definition
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeRef::Unit => write!(f, "()"),
            TypeRef::Primitive(primitive) => write!(f, "{}", primitive.name()),
            TypeRef::Sequence(element) => write!(f, "Vec<{}>", element),
            TypeRef::Map(key, value) => write!(f, "HashMap<{}, {}>", key, value),
            TypeRef::Param(name) => write!(f, "{}", name),
            TypeRef::Named(named) => {
                match &named.resolved {
                    Some(key) => write!(f, "{}", key)?,
                    None => write!(f, "{}", named.path)?,
                }
                if !named.args.is_empty() {
                    let args: Vec<String> = named.args.iter().map(|a| a.to_string()).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
        }
    }
}
