use super::inline::ROUTER_MARKER;
use crate::parser::{ModuleSource, ParsedFile};
use log::debug;
use syn::{Attribute, Expr, ImplItem, Item, Lit, Meta};

/// Marker a doc comment must contain to be considered an annotation block
const ANNOTATION_MARKER: &str = "OpenAPI";

/// The doc comment of one item, with the package it was written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub package_path: String,
    /// Item carrying the comment; `None` for module docs
    pub item_name: Option<String>,
    pub text: String,
}

/// Raw lines of the doc comments in `attrs`, in order.
///
/// `///` and `//!` comments carry a leading space which is kept here.
pub fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(name_value) = &attr.meta {
            if let Expr::Lit(expr_lit) = &name_value.value {
                if let Lit::Str(text) = &expr_lit.lit {
                    lines.extend(text.value().lines().map(str::to_string));
                }
            }
        }
    }
    lines
}

/// Doc comment text with the comment-marker space removed, or `None` when there is none.
pub fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines = doc_lines(attrs);
    let text = lines
        .iter()
        .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end())
        .collect::<Vec<&str>>()
        .join("\n")
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Collect the annotation blocks of every module in `files`.
///
/// Module docs, item docs and the docs of inherent and trait impl methods are considered.
/// Modules for which `is_ignored` returns true are skipped entirely.
pub fn collect_comment_blocks<F>(files: &[ParsedFile], is_ignored: F) -> Vec<CommentBlock>
where
    F: Fn(&str) -> bool,
{
    let mut blocks = Vec::new();

    for file in files {
        for module in file.modules() {
            if is_ignored(&module.module_path) {
                debug!("Skipping comments of ignored module {}", module.module_path);
                continue;
            }
            collect_module(&module, &mut blocks);
        }
    }

    debug!("Found {} annotation blocks", blocks.len());
    blocks
}

fn collect_module(module: &ModuleSource<'_>, blocks: &mut Vec<CommentBlock>) {
    push_block(module, None, module.attrs, blocks);

    for item in module.items {
        match item {
            Item::Fn(item_fn) => push_block(module, Some(item_fn.sig.ident.to_string()), &item_fn.attrs, blocks),
            Item::Struct(item) => push_block(module, Some(item.ident.to_string()), &item.attrs, blocks),
            Item::Enum(item) => push_block(module, Some(item.ident.to_string()), &item.attrs, blocks),
            Item::Const(item) => push_block(module, Some(item.ident.to_string()), &item.attrs, blocks),
            Item::Static(item) => push_block(module, Some(item.ident.to_string()), &item.attrs, blocks),
            Item::Type(item) => push_block(module, Some(item.ident.to_string()), &item.attrs, blocks),
            Item::Trait(item) => push_block(module, Some(item.ident.to_string()), &item.attrs, blocks),
            // Inline modules carry their docs as module attributes
            Item::Mod(item) if item.content.is_none() => {
                push_block(module, Some(item.ident.to_string()), &item.attrs, blocks)
            }
            Item::Impl(item_impl) => {
                push_block(module, None, &item_impl.attrs, blocks);
                for impl_item in &item_impl.items {
                    if let ImplItem::Fn(method) = impl_item {
                        push_block(module, Some(method.sig.ident.to_string()), &method.attrs, blocks);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_block(
    module: &ModuleSource<'_>,
    item_name: Option<String>,
    attrs: &[Attribute],
    blocks: &mut Vec<CommentBlock>,
) {
    let text = doc_lines(attrs).join("\n");
    if !text.contains(ANNOTATION_MARKER) && !text.to_lowercase().contains(ROUTER_MARKER) {
        return;
    }
    blocks.push(CommentBlock {
        package_path: module.module_path.clone(),
        item_name,
        text,
    });
}
