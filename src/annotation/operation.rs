use super::comments::CommentBlock;
use super::inline::InlineDirectives;
use super::section::{parse_sections, Section};
use super::{HttpMethod, Operation, Parameter, ParameterLocation, Response};
use crate::type_ref::{classify, PrimitiveType, TypeRef};
use log::{debug, warn};

/// Parse an operation block.
///
/// Only scrapes what the block says; no type is looked up. Returns `None` (after a warning)
/// when the block lacks a path or names an unknown method. Inline `@` directives are applied
/// after the sections.
pub fn parse_operation(block: &CommentBlock) -> Option<Operation> {
    let sections = parse_sections(&block.text);
    let directives = InlineDirectives::parse(&block.text);

    let mut path = None;
    let mut method = None;
    for section in &sections {
        match section.key().as_str() {
            "path" => path = section.line(0).map(normalize_path),
            "method" => method = section.line(0).map(str::to_string),
            _ => {}
        }
    }
    if let Some((router_path, router_method)) = &directives.router {
        path = Some(router_path.clone());
        method = Some(router_method.clone());
    }

    let location = block.item_name.as_deref().unwrap_or("module docs");
    let Some(path) = path else {
        warn!("Operation block on {} in {} has no path; skipping it", location, block.package_path);
        return None;
    };
    let method_name = method.unwrap_or_default();
    let Some(method) = HttpMethod::parse(&method_name) else {
        warn!(
            "Operation {} in {} has unknown method `{}`; skipping it",
            path, block.package_path, method_name
        );
        return None;
    };

    let mut operation = Operation::new(block.package_path.clone(), path, method);
    operation.operation_id = block.item_name.clone();

    for section in &sections {
        match section.key().as_str() {
            "path" | "method" => {}
            "summary" => operation.summary = section.line(0).map(str::to_string),
            "description" => operation.description = section.text(),
            "tags" => operation.tags.extend(comma_separated(section)),
            "content type" => operation
                .content_types
                .extend(comma_separated(section).into_iter().map(expand_content_type)),
            "query string parameters" => {
                operation.parameters.extend(parse_parameters(section, ParameterLocation::Query))
            }
            "path parameters" => {
                operation.parameters.extend(parse_parameters(section, ParameterLocation::Path))
            }
            "header parameters" => {
                operation.parameters.extend(parse_parameters(section, ParameterLocation::Header))
            }
            "request body" => {
                operation.request_body = section
                    .line(0)
                    .map(classify)
                    .filter(|type_ref| !type_ref.is_unit());
            }
            "responses" => operation.responses.extend(parse_responses(section)),
            other => debug!("Ignoring section `{}` of {}", other, operation.label()),
        }
    }

    directives.apply(&mut operation);
    add_implicit_path_parameters(&mut operation);
    debug!("Parsed operation {}", operation.label());
    Some(operation)
}

/// Convert `:param` segments to the OpenAPI `{param}` form
pub fn normalize_path(path: &str) -> String {
    path.trim()
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<String>>()
        .join("/")
}

/// Names of the `{param}` segments of a path template
fn path_template_names(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .collect()
}

/// Every templated segment must be a declared path parameter; undeclared ones are strings.
fn add_implicit_path_parameters(operation: &mut Operation) {
    let path = operation.path.clone();
    for name in path_template_names(&path) {
        let declared = operation
            .parameters
            .iter()
            .any(|p| p.location == ParameterLocation::Path && p.name == name);
        if !declared {
            debug!("Adding implicit path parameter {} to {}", name, operation.label());
            operation.parameters.push(Parameter {
                name: name.to_string(),
                location: ParameterLocation::Path,
                type_ref: TypeRef::Primitive(PrimitiveType::String),
                required: true,
                description: None,
            });
        }
    }
}

fn comma_separated(section: &Section) -> Vec<String> {
    section
        .lines()
        .iter()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

pub(super) fn expand_content_type(content_type: String) -> String {
    let lowered = content_type.to_lowercase();
    match lowered.as_str() {
        "json" => "application/json".to_string(),
        "xml" => "application/xml".to_string(),
        _ => lowered,
    }
}

/// Lines of `name type required|optional description`
fn parse_parameters(section: &Section, location: ParameterLocation) -> Vec<Parameter> {
    let mut parameters = Vec::new();

    for line in section.lines() {
        let (fields, description) = split_fields(line, 3);
        let [name, type_name, requirement] = fields.as_slice() else {
            warn!("Malformed {} parameter line `{}`; skipping it", location.as_str(), line);
            continue;
        };

        let required = match requirement.to_ascii_lowercase().as_str() {
            "required" => true,
            "optional" => false,
            other => {
                warn!("Parameter {} is neither required nor optional (`{}`); treating it as optional", name, other);
                false
            }
        };

        parameters.push(Parameter {
            name: name.to_string(),
            location,
            type_ref: classify(type_name),
            // Path parameters are always required
            required: required || location == ParameterLocation::Path,
            description: non_empty(description),
        });
    }

    parameters
}

/// Lines of `status type description`
fn parse_responses(section: &Section) -> Vec<Response> {
    let mut responses = Vec::new();

    for line in section.lines() {
        let (fields, description) = split_fields(line, 2);
        let [status, type_name] = fields.as_slice() else {
            warn!("Malformed response line `{}`; skipping it", line);
            continue;
        };
        let Ok(status) = status.parse::<u16>() else {
            warn!("Response status `{}` is not a number; skipping it", status);
            continue;
        };

        responses.push(Response {
            status,
            type_ref: classify(type_name),
            description: non_empty(description).unwrap_or_else(|| default_description(status)),
        });
    }

    responses
}

pub(super) fn default_description(status: u16) -> String {
    match status {
        200..=299 => "Successful response".to_string(),
        _ => format!("Response {}", status),
    }
}

pub(super) fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim().trim_matches('"').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split the first `count` whitespace-separated fields off `line`, returning them and the rest.
///
/// Whitespace inside `<>`, `[]` or `()` does not separate fields, so `HashMap<String, User>`
/// stays one field.
pub fn split_fields(line: &str, count: usize) -> (Vec<&str>, &str) {
    let mut fields = Vec::new();
    let mut rest = line.trim_start();

    while fields.len() < count && !rest.is_empty() {
        let mut depth = 0i32;
        let mut end = rest.len();
        for (index, ch) in rest.char_indices() {
            match ch {
                '<' | '[' | '(' => depth += 1,
                '>' | ']' | ')' => depth -= 1,
                c if c.is_whitespace() && depth <= 0 => {
                    end = index;
                    break;
                }
                _ => {}
            }
        }
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }

    (fields, rest)
}
