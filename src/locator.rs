//! Type lookup over the parsed source tree.
//!
//! [`TypeLocator`] is the seam between the resolution engine and the source code: given an
//! import path and a bare type name it returns the declaration shape of the type, and given
//! an import path it returns the constant groups declared there.

use crate::annotation::comments::doc_text;
use crate::definitions::DefinitionKey;
use crate::enums::{ConstEntry, ConstGroup, ConstValue, EnumValue};
use crate::package_index::{package_name, PackageIndex};
use crate::parser::{ModuleSource, ParsedFile};
use crate::type_ref::{is_option, PrimitiveType, TypeRef};
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;
use syn::meta::ParseNestedMeta;
use syn::{Expr, Fields, ImplItem, Item, Lit, LitStr, Token, UnOp};

/// Looks up type declarations by home package and name
pub trait TypeLocator {
    /// Find `name` as visible in the package `import_path`.
    ///
    /// Returns `None` when the package does not declare or import the type.
    fn locate(&self, import_path: &str, name: &str) -> Option<LocatedType>;

    /// Constant groups declared in the package `import_path`
    fn constant_groups(&self, import_path: &str) -> Vec<ConstGroup>;
}

/// Declaration shape of a located type
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedType {
    /// Package that actually declares the type
    pub package_path: String,
    pub package_name: String,
    pub name: String,
    pub description: Option<String>,
    pub shape: LocatedShape,
    /// A scalar whose legal values are enumerated by constants
    pub is_enum_candidate: bool,
}

impl LocatedType {
    pub fn key(&self) -> DefinitionKey {
        DefinitionKey::new(self.package_path.clone(), self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocatedShape {
    Object(Vec<LocatedMember>),
    Scalar(PrimitiveType),
    Alias(TypeRef),
}

/// A field as declared, before any flattening
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedMember {
    pub name: String,
    pub serialized_name: String,
    pub type_ref: TypeRef,
    pub optional: bool,
    pub embedded: bool,
    pub description: Option<String>,
}

/// [`TypeLocator`] over the modules of a parsed source tree.
///
/// Names a module brings into scope with `use` (renamed or through a glob) are followed to
/// the module that declares them.
pub struct SourceTypeLocator<'a> {
    index: &'a PackageIndex,
    modules: IndexMap<String, ModuleSource<'a>>,
}

impl<'a> SourceTypeLocator<'a> {
    pub fn new(files: &'a [ParsedFile], index: &'a PackageIndex) -> Self {
        let mut modules = IndexMap::new();
        for file in files {
            for module in file.modules() {
                modules.entry(module.module_path.clone()).or_insert(module);
            }
        }
        debug!("Type locator covers {} modules", modules.len());
        Self { index, modules }
    }

    /// Look `name` up in `import_path`, then through its item and glob imports.
    ///
    /// Each (module, name) pair is visited at most once, so import cycles end the search.
    fn locate_within(
        &self,
        import_path: &str,
        name: &str,
        visited: &mut HashSet<(String, String)>,
    ) -> Option<LocatedType> {
        if !visited.insert((import_path.to_string(), name.to_string())) {
            return None;
        }
        let module = self.modules.get(import_path)?;
        if let Some(located) = self.declared(module, name) {
            return Some(located);
        }
        let package = self.index.get(import_path)?;

        for imported in package.import_paths_for(name) {
            if let Some((module_path, item_name)) = imported.rsplit_once("::") {
                if self.modules.contains_key(module_path) {
                    debug!("Following import of {} to {}", name, imported);
                    if let Some(located) = self.locate_within(module_path, item_name, visited) {
                        return Some(located);
                    }
                }
            }
        }

        for glob in package.glob_imports() {
            if let Some(located) = self.locate_within(glob, name, visited) {
                return Some(located);
            }
        }

        None
    }

    fn declared(&self, module: &ModuleSource<'a>, name: &str) -> Option<LocatedType> {
        for item in module.items {
            let located = match item {
                Item::Struct(item_struct) if item_struct.ident == name => {
                    self.struct_type(module, item_struct)
                }
                Item::Enum(item_enum) if item_enum.ident == name => enum_type(module, item_enum),
                Item::Type(item_type) if item_type.ident == name => {
                    let params = type_params(&item_type.generics);
                    let shape = match TypeRef::from_syn(&item_type.ty, &params) {
                        TypeRef::Primitive(primitive) => LocatedShape::Scalar(primitive),
                        other => LocatedShape::Alias(other),
                    };
                    self.with_candidacy(module, name, doc_text(&item_type.attrs), shape)
                }
                _ => continue,
            };
            debug!("Found {} in {}", name, module.module_path);
            return Some(located);
        }
        None
    }

    fn struct_type(&self, module: &ModuleSource<'a>, item: &syn::ItemStruct) -> LocatedType {
        let name = item.ident.to_string();
        let params = type_params(&item.generics);
        let serde = SerdeAttributes::parse(&item.attrs);

        let shape = match &item.fields {
            Fields::Named(named) => {
                let members: Vec<LocatedMember> = named
                    .named
                    .iter()
                    .filter_map(|field| located_member(field, &params, &serde))
                    .collect();
                if serde.transparent && members.len() == 1 {
                    newtype_shape(members[0].type_ref.clone())
                } else {
                    LocatedShape::Object(members)
                }
            }
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                newtype_shape(TypeRef::from_syn(&unnamed.unnamed[0].ty, &params))
            }
            // Tuple structs serialize as arrays of mixed values
            Fields::Unnamed(_) => LocatedShape::Alias(TypeRef::Sequence(Box::new(
                TypeRef::Primitive(PrimitiveType::Any),
            ))),
            Fields::Unit => LocatedShape::Object(Vec::new()),
        };

        self.with_candidacy(module, &name, doc_text(&item.attrs), shape)
    }

    /// Scalars become enum candidates when the module declares constants of their type.
    fn with_candidacy(
        &self,
        module: &ModuleSource<'a>,
        name: &str,
        description: Option<String>,
        shape: LocatedShape,
    ) -> LocatedType {
        let is_enum_candidate = matches!(shape, LocatedShape::Scalar(_))
            && module_const_group(module)
                .entries
                .iter()
                .any(|entry| entry.type_name.as_deref() == Some(name));

        LocatedType {
            package_path: module.module_path.clone(),
            package_name: package_name(&module.module_path).to_string(),
            name: name.to_string(),
            description,
            shape,
            is_enum_candidate,
        }
    }
}

impl TypeLocator for SourceTypeLocator<'_> {
    fn locate(&self, import_path: &str, name: &str) -> Option<LocatedType> {
        self.locate_within(import_path, name, &mut HashSet::new())
    }

    fn constant_groups(&self, import_path: &str) -> Vec<ConstGroup> {
        let Some(module) = self.modules.get(import_path) else {
            return Vec::new();
        };

        let mut groups: Vec<ConstGroup> = module
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Enum(item_enum) => Some(enum_group(item_enum)),
                _ => None,
            })
            .collect();

        let consts = module_const_group(module);
        if !consts.entries.is_empty() {
            groups.push(consts);
        }
        groups
    }
}

fn newtype_shape(target: TypeRef) -> LocatedShape {
    match target {
        TypeRef::Primitive(primitive) => LocatedShape::Scalar(primitive),
        other => LocatedShape::Alias(other),
    }
}

fn type_params(generics: &syn::Generics) -> Vec<String> {
    generics
        .type_params()
        .map(|param| param.ident.to_string())
        .collect()
}

fn located_member(
    field: &syn::Field,
    params: &[String],
    container: &SerdeAttributes,
) -> Option<LocatedMember> {
    let ident = field.ident.as_ref()?.to_string();
    let name = ident.trim_start_matches("r#").to_string();
    let serde = SerdeAttributes::parse(&field.attrs);
    if serde.skip {
        debug!("Skipping field {}", name);
        return None;
    }

    let serialized_name = match (&serde.rename, container.rename_all) {
        (Some(rename), _) => rename.clone(),
        (None, Some(rule)) => rule.apply_to_field(&name),
        (None, None) => name.clone(),
    };

    Some(LocatedMember {
        serialized_name,
        type_ref: TypeRef::from_syn(&field.ty, params),
        optional: is_option(&field.ty) || serde.default || container.default,
        embedded: serde.flatten,
        description: doc_text(&field.attrs),
        name,
    })
}

fn enum_type(module: &ModuleSource<'_>, item: &syn::ItemEnum) -> LocatedType {
    let all_unit = !item.variants.is_empty()
        && item
            .variants
            .iter()
            .all(|variant| matches!(variant.fields, Fields::Unit));

    // A data variant serializes as an object, so the values cannot be enumerated
    let (shape, is_enum_candidate) = if all_unit {
        let scalar = repr_primitive(&item.attrs).unwrap_or(PrimitiveType::String);
        (LocatedShape::Scalar(scalar), true)
    } else {
        debug!("Enum {} has data variants; using a free-form schema", item.ident);
        (LocatedShape::Scalar(PrimitiveType::Any), false)
    };

    LocatedType {
        package_path: module.module_path.clone(),
        package_name: package_name(&module.module_path).to_string(),
        name: item.ident.to_string(),
        description: doc_text(&item.attrs),
        shape,
        is_enum_candidate,
    }
}

/// Integer representation from `#[repr(u8)]` and friends
fn repr_primitive(attrs: &[syn::Attribute]) -> Option<PrimitiveType> {
    let mut primitive = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("repr")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.get_ident() {
                if let Some(found) = PrimitiveType::from_name(&ident.to_string()) {
                    if found.is_integer() {
                        primitive = Some(found);
                    }
                }
            }
            skip_meta(&meta)
        });
    }
    primitive
}

/// One group per enum body: unit variants in declaration order.
///
/// Variants of `#[repr(int)]` enums count from their discriminants; other unit variants
/// contribute their serialized names.
fn enum_group(item: &syn::ItemEnum) -> ConstGroup {
    let enum_name = item.ident.to_string();
    let container = SerdeAttributes::parse(&item.attrs);
    let repr = repr_primitive(&item.attrs);

    let mut entries = Vec::new();
    for variant in &item.variants {
        let variant_name = variant.ident.to_string();
        let serde = SerdeAttributes::parse(&variant.attrs);
        if serde.skip && repr.is_none() {
            continue;
        }

        let values = if !matches!(variant.fields, Fields::Unit) {
            vec![ConstValue::Unsupported(format!("variant {} carries data", variant_name))]
        } else if repr.is_some() {
            match &variant.discriminant {
                None => Vec::new(),
                Some((_, expr)) => match literal_value(expr) {
                    Some(EnumValue::Int(start)) => vec![ConstValue::Restart(start)],
                    Some(other) => vec![ConstValue::Literal(other)],
                    None => vec![ConstValue::Unsupported(format!(
                        "discriminant of {} is not a literal",
                        variant_name
                    ))],
                },
            }
        } else {
            let serialized = match (&serde.rename, container.rename_all) {
                (Some(rename), _) => rename.clone(),
                (None, Some(rule)) => rule.apply_to_variant(&variant_name),
                (None, None) => variant_name.clone(),
            };
            vec![ConstValue::Literal(EnumValue::Str(serialized))]
        };

        entries.push(ConstEntry::new(variant_name, Some(&enum_name), values));
    }

    ConstGroup::new(entries)
}

/// Module-level `const` items plus associated consts of inherent impls, as one group
fn module_const_group(module: &ModuleSource<'_>) -> ConstGroup {
    let mut entries = Vec::new();

    for item in module.items {
        match item {
            Item::Const(item_const) => entries.push(const_entry(
                &item_const.ident,
                &item_const.ty,
                &item_const.expr,
                None,
            )),
            Item::Impl(item_impl) if item_impl.trait_.is_none() => {
                let self_name = type_name(&item_impl.self_ty, None);
                for impl_item in &item_impl.items {
                    if let ImplItem::Const(impl_const) = impl_item {
                        entries.push(const_entry(
                            &impl_const.ident,
                            &impl_const.ty,
                            &impl_const.expr,
                            Some(&self_name),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    ConstGroup::new(entries)
}

fn const_entry(ident: &syn::Ident, ty: &syn::Type, expr: &Expr, self_name: Option<&str>) -> ConstEntry {
    let type_name = type_name(ty, self_name);
    let value = match literal_value(expr) {
        Some(value) => ConstValue::Literal(value),
        None => ConstValue::Unsupported(format!("{} is not a literal", ident)),
    };
    ConstEntry::new(ident.to_string(), Some(&type_name), vec![value])
}

/// Last path segment of a declared type; empty for types without a name
fn type_name(ty: &syn::Type, self_name: Option<&str>) -> String {
    match ty {
        syn::Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) if segment.ident == "Self" => self_name.unwrap_or_default().to_string(),
            Some(segment) => segment.ident.to_string(),
            None => String::new(),
        },
        syn::Type::Group(group) => type_name(&group.elem, self_name),
        syn::Type::Paren(paren) => type_name(&paren.elem, self_name),
        _ => String::new(),
    }
}

/// Evaluate a literal expression: numbers, strings, negation and newtype constructors
fn literal_value(expr: &Expr) -> Option<EnumValue> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Int(int) => int.base10_parse::<i64>().ok().map(EnumValue::Int),
            Lit::Float(float) => float.base10_parse::<f64>().ok().map(EnumValue::Float),
            Lit::Str(string) => Some(EnumValue::Str(string.value())),
            _ => None,
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match literal_value(&unary.expr)? {
            EnumValue::Int(value) => Some(EnumValue::Int(-value)),
            EnumValue::Float(value) => Some(EnumValue::Float(-value)),
            EnumValue::Str(_) => None,
        },
        Expr::Paren(paren) => literal_value(&paren.expr),
        Expr::Group(group) => literal_value(&group.expr),
        Expr::Call(call) if call.args.len() == 1 => {
            let Expr::Path(func) = call.func.as_ref() else {
                return None;
            };
            let constructor = func.path.segments.last()?.ident.to_string();
            if constructor.starts_with(char::is_uppercase) {
                literal_value(&call.args[0])
            } else {
                None
            }
        }
        _ => None,
    }
}

/// The serde attributes that change the serialized shape
#[derive(Debug, Clone, Default, PartialEq)]
struct SerdeAttributes {
    rename: Option<String>,
    rename_all: Option<RenameRule>,
    skip: bool,
    flatten: bool,
    default: bool,
    transparent: bool,
}

impl SerdeAttributes {
    fn parse(attrs: &[syn::Attribute]) -> Self {
        let mut serde = SerdeAttributes::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    serde.rename = serialize_name(&meta)?;
                } else if meta.path.is_ident("rename_all") {
                    serde.rename_all = serialize_name(&meta)?.as_deref().and_then(RenameRule::parse);
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    serde.skip = true;
                } else if meta.path.is_ident("flatten") {
                    serde.flatten = true;
                } else if meta.path.is_ident("transparent") {
                    serde.transparent = true;
                } else if meta.path.is_ident("default") || meta.path.is_ident("skip_serializing_if") {
                    serde.default = true;
                    skip_meta(&meta)?;
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            });

            if let Err(e) = result {
                debug!("Ignoring malformed serde attribute: {}", e);
            }
        }

        serde
    }
}

/// `name = "x"` or `name(serialize = "x", ..)`
fn serialize_name(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        let value: LitStr = meta.value()?.parse()?;
        return Ok(Some(value.value()));
    }

    let mut serialize = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            let value: LitStr = inner.value()?.parse()?;
            serialize = Some(value.value());
        } else {
            skip_meta(&inner)?;
        }
        Ok(())
    })?;
    Ok(serialize)
}

/// Consume the value or nested list of a meta item we do not interpret
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

/// Case conventions of `#[serde(rename_all = "...")]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        match rule {
            "lowercase" => Some(RenameRule::Lower),
            "UPPERCASE" => Some(RenameRule::Upper),
            "PascalCase" => Some(RenameRule::Pascal),
            "camelCase" => Some(RenameRule::Camel),
            "snake_case" => Some(RenameRule::Snake),
            "SCREAMING_SNAKE_CASE" => Some(RenameRule::ScreamingSnake),
            "kebab-case" => Some(RenameRule::Kebab),
            "SCREAMING-KEBAB-CASE" => Some(RenameRule::ScreamingKebab),
            _ => None,
        }
    }

    /// Rename a `snake_case` field
    fn apply_to_field(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => {
                let mut pascal = String::new();
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            RenameRule::Camel => lower_first(&RenameRule::Pascal.apply_to_field(field)),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }

    /// Rename a `PascalCase` variant
    fn apply_to_variant(self, variant: &str) -> String {
        match self {
            RenameRule::Pascal => variant.to_string(),
            RenameRule::Lower => variant.to_ascii_lowercase(),
            RenameRule::Upper => variant.to_ascii_uppercase(),
            RenameRule::Camel => lower_first(variant),
            RenameRule::Snake => {
                let mut snake = String::new();
                for (i, ch) in variant.char_indices() {
                    if i > 0 && ch.is_uppercase() {
                        snake.push('_');
                    }
                    snake.push(ch.to_ascii_lowercase());
                }
                snake
            }
            RenameRule::ScreamingSnake => RenameRule::Snake.apply_to_variant(variant).to_ascii_uppercase(),
            RenameRule::Kebab => RenameRule::Snake.apply_to_variant(variant).replace('_', "-"),
            RenameRule::ScreamingKebab => RenameRule::ScreamingSnake
                .apply_to_variant(variant)
                .replace('_', "-"),
        }
    }
}

fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::enum_values;
    use crate::parser::AstParser;
    use crate::type_ref::classify;
    use pretty_assertions::assert_eq;

    fn parse_all(sources: &[(&str, &str)]) -> Vec<ParsedFile> {
        sources
            .iter()
            .map(|(module_path, code)| AstParser::parse_source(module_path, code).unwrap())
            .collect()
    }

    fn members(located: &LocatedType) -> &[LocatedMember] {
        match &located.shape {
            LocatedShape::Object(members) => members,
            other => panic!("Expected an object, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_struct_with_serde_attributes() {
        let files = parse_all(&[(
            "crate::models",
            r#"
            /// A registered user
            #[derive(Serialize)]
            #[serde(rename_all = "camelCase")]
            pub struct User {
                /// Unique id
                pub user_id: u64,
                #[serde(rename = "mail")]
                pub email: String,
                pub nick_name: Option<String>,
                #[serde(skip)]
                pub password_hash: String,
                #[serde(default, skip_serializing_if = "Vec::is_empty")]
                pub roles: Vec<Role>,
                #[serde(flatten)]
                pub audit: Audit,
            }
            "#,
        )]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        let user = locator.locate("crate::models", "User").unwrap();
        assert_eq!(user.package_path, "crate::models");
        assert_eq!(user.package_name, "models");
        assert_eq!(user.description.as_deref(), Some("A registered user"));
        assert!(!user.is_enum_candidate);

        let fields = members(&user);
        let names: Vec<&str> = fields.iter().map(|m| m.serialized_name.as_str()).collect();
        assert_eq!(names, vec!["userId", "mail", "nickName", "roles", "audit"]);

        assert_eq!(fields[0].description.as_deref(), Some("Unique id"));
        assert!(!fields[0].optional);
        assert!(fields[2].optional);
        assert!(fields[3].optional);
        assert_eq!(fields[3].type_ref, classify("Vec<Role>"));
        assert!(fields[4].embedded);
    }

    #[test]
    fn test_locate_follows_renamed_import() {
        let files = parse_all(&[
            ("crate", "pub mod models; pub mod handlers;"),
            ("crate::models", "pub struct User { pub id: u64 }"),
            ("crate::handlers", "use crate::models::User as Account;"),
        ]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        let located = locator.locate("crate::handlers", "Account").unwrap();
        assert_eq!(located.key(), DefinitionKey::new("crate::models", "User"));
    }

    #[test]
    fn test_locate_follows_glob_import() {
        let files = parse_all(&[
            ("crate", "pub mod models; pub mod handlers;"),
            ("crate::models", "pub struct Order { pub id: u64 }"),
            ("crate::handlers", "use crate::models::*;"),
        ]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        let located = locator.locate("crate::handlers", "Order").unwrap();
        assert_eq!(located.package_path, "crate::models");
        assert!(locator.locate("crate::handlers", "Missing").is_none());
    }

    #[test]
    fn test_locate_ignores_cyclic_globs() {
        let files = parse_all(&[
            ("crate", "pub mod a; pub mod b;"),
            ("crate::a", "pub use crate::b::*;"),
            ("crate::b", "pub use crate::a::*;"),
        ]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        assert!(locator.locate("crate::a", "Nowhere").is_none());
    }

    #[test]
    fn test_locate_through_densely_globbed_modules() {
        let count = 9;
        let mut root = String::new();
        let mut sources = Vec::new();
        for i in 0..count {
            root.push_str(&format!("pub mod m{}; ", i));
            let globs: String = (0..count)
                .filter(|j| *j != i)
                .map(|j| format!("pub use crate::m{}::*;\n", j))
                .collect();
            sources.push((format!("crate::m{}", i), globs));
        }
        sources[count - 1].1.push_str("pub struct Deep { pub id: u64 }\n");
        sources.push(("crate".to_string(), root));

        let borrowed: Vec<(&str, &str)> = sources
            .iter()
            .map(|(module, code)| (module.as_str(), code.as_str()))
            .collect();
        let files = parse_all(&borrowed);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        let started = std::time::Instant::now();
        assert!(locator.locate("crate::m0", "Missing").is_none());
        assert!(started.elapsed() < std::time::Duration::from_secs(2));

        let deep = locator.locate("crate::m0", "Deep").unwrap();
        assert_eq!(deep.package_path, "crate::m8");
    }

    #[test]
    fn test_newtypes_and_aliases() {
        let files = parse_all(&[(
            "crate::ids",
            r#"
            pub struct UserId(pub u64);
            pub struct Tags(Vec<String>);
            pub type Users = Vec<User>;
            pub type Score = f64;
            #[serde(transparent)]
            pub struct Token { value: String }
            "#,
        )]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        assert_eq!(
            locator.locate("crate::ids", "UserId").unwrap().shape,
            LocatedShape::Scalar(PrimitiveType::U64)
        );
        assert_eq!(
            locator.locate("crate::ids", "Tags").unwrap().shape,
            LocatedShape::Alias(classify("Vec<String>"))
        );
        assert_eq!(
            locator.locate("crate::ids", "Users").unwrap().shape,
            LocatedShape::Alias(classify("Vec<User>"))
        );
        assert_eq!(
            locator.locate("crate::ids", "Score").unwrap().shape,
            LocatedShape::Scalar(PrimitiveType::F64)
        );
        assert_eq!(
            locator.locate("crate::ids", "Token").unwrap().shape,
            LocatedShape::Scalar(PrimitiveType::String)
        );
    }

    #[test]
    fn test_unit_enum_values() {
        let files = parse_all(&[(
            "crate::models",
            r#"
            #[serde(rename_all = "snake_case")]
            pub enum OrderStatus {
                Pending,
                InTransit,
                #[serde(rename = "done")]
                Delivered,
            }
            "#,
        )]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        let status = locator.locate("crate::models", "OrderStatus").unwrap();
        assert!(status.is_enum_candidate);
        assert_eq!(status.shape, LocatedShape::Scalar(PrimitiveType::String));

        let values = enum_values(&locator.constant_groups("crate::models"), "OrderStatus");
        assert_eq!(
            values,
            vec![
                EnumValue::Str("pending".to_string()),
                EnumValue::Str("in_transit".to_string()),
                EnumValue::Str("done".to_string()),
            ]
        );
    }

    #[test]
    fn test_repr_enum_discriminants() {
        let files = parse_all(&[(
            "crate::models",
            r#"
            #[repr(u8)]
            pub enum Priority {
                Low,
                Normal,
                High = 10,
                Urgent,
            }
            "#,
        )]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        let priority = locator.locate("crate::models", "Priority").unwrap();
        assert_eq!(priority.shape, LocatedShape::Scalar(PrimitiveType::U8));

        let values = enum_values(&locator.constant_groups("crate::models"), "Priority");
        assert_eq!(
            values,
            vec![
                EnumValue::Int(0),
                EnumValue::Int(1),
                EnumValue::Int(10),
                EnumValue::Int(11)
            ]
        );
    }

    #[test]
    fn test_typed_constants_make_enum_candidates() {
        let files = parse_all(&[(
            "crate::models",
            r#"
            pub type Level = i32;
            pub const LEVEL_LOW: Level = 1;
            pub const LEVEL_HIGH: Level = -1;
            pub const MAX_USERS: u32 = 100;

            pub struct Color(pub String);
            impl Color {
                pub const RED: Color = Color("red");
                pub const BLUE: Self = Color("blue");
            }

            pub type Unused = u8;
            "#,
        )]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);
        let groups = locator.constant_groups("crate::models");

        assert!(locator.locate("crate::models", "Level").unwrap().is_enum_candidate);
        assert!(locator.locate("crate::models", "Color").unwrap().is_enum_candidate);
        assert!(!locator.locate("crate::models", "Unused").unwrap().is_enum_candidate);

        assert_eq!(
            enum_values(&groups, "Level"),
            vec![EnumValue::Int(1), EnumValue::Int(-1)]
        );
        assert_eq!(
            enum_values(&groups, "Color"),
            vec![
                EnumValue::Str("red".to_string()),
                EnumValue::Str("blue".to_string())
            ]
        );
    }

    #[test]
    fn test_data_enum_is_free_form() {
        let files = parse_all(&[(
            "crate::models",
            "pub enum Shape { Circle { radius: f64 }, Square(f64) }",
        )]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        let shape = locator.locate("crate::models", "Shape").unwrap();
        assert_eq!(shape.shape, LocatedShape::Scalar(PrimitiveType::Any));
        assert!(!shape.is_enum_candidate);
    }

    #[test]
    fn test_mixed_enum_is_free_form() {
        let files = parse_all(&[(
            "crate::models",
            "pub enum Event { Started, Stopped, Failed { reason: String } }",
        )]);
        let index = PackageIndex::from_files(&files);
        let locator = SourceTypeLocator::new(&files, &index);

        let event = locator.locate("crate::models", "Event").unwrap();
        assert_eq!(event.shape, LocatedShape::Scalar(PrimitiveType::Any));
        assert!(!event.is_enum_candidate);
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::Camel.apply_to_field("created_at"), "createdAt");
        assert_eq!(RenameRule::Pascal.apply_to_field("created_at"), "CreatedAt");
        assert_eq!(RenameRule::ScreamingKebab.apply_to_field("created_at"), "CREATED-AT");
        assert_eq!(RenameRule::Snake.apply_to_variant("InTransit"), "in_transit");
        assert_eq!(RenameRule::Kebab.apply_to_variant("InTransit"), "in-transit");
        assert_eq!(RenameRule::Camel.apply_to_variant("InTransit"), "inTransit");
        assert_eq!(RenameRule::Upper.apply_to_variant("InTransit"), "INTRANSIT");
        assert_eq!(RenameRule::parse("weird"), None);
    }
}
