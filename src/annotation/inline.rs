//! Single-line `@` directives, accepted alongside `OpenAPI` sections:
//!
//! ```text
//! @Title       List villages
//! @Description Every village of a world
//! @Router      /worlds/{world}/villages [get]
//! @Accept      json, xml
//! @Param       world  path   u64             true   "World id"
//! @Success     200    {array} models::Village       "The villages"
//! @Failure     404    {object} ()                   "No such world"
//! ```
//!
//! Directives are applied after the sections, so they win where both say the same thing.

use super::operation::{default_description, expand_content_type, non_empty, normalize_path};
use super::{Operation, Parameter, ParameterLocation, Response};
use crate::type_ref::{classify, TypeRef};
use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

/// Marker of a block that declares its operation with a directive
pub const ROUTER_MARKER: &str = "@router";

struct Patterns {
    accept: Regex,
    description: Regex,
    parameter: Regex,
    response: Regex,
    router: Regex,
    title: Regex,
}

impl Patterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            accept: Regex::new(r"@Accept\s+(.+)")?,
            description: Regex::new(r"@Description\s+(.+)")?,
            parameter: Regex::new(r#"@Param\s+([\w-]+)\s+(\w+)\s+(\S+)\s+(\w+)(?:\s+"(.*)")?"#)?,
            response: Regex::new(r#"@(Success|Failure)\s+(\d+)\s+\{(\w+)\}\s+(\S+)(?:\s+"(.*)")?"#)?,
            router: Regex::new(r"@Router\s+(\S+)\s+\[(\w+)\]")?,
            title: Regex::new(r"@Title\s+(.+)")?,
        })
    }
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| match Patterns::new() {
            Ok(patterns) => Some(patterns),
            Err(e) => {
                warn!("Inline directive patterns failed to compile: {}", e);
                None
            }
        })
        .as_ref()
}

/// Everything the directives of one block declare
#[derive(Debug, Default, PartialEq)]
pub struct InlineDirectives {
    /// Path and method from `@Router`
    pub router: Option<(String, String)>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content_types: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<TypeRef>,
    pub responses: Vec<Response>,
}

impl InlineDirectives {
    /// Scan every line of `text` for directives; later lines override earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut directives = Self::default();
        let Some(patterns) = patterns() else {
            return directives;
        };

        for line in text.lines() {
            if let Some(caps) = patterns.accept.captures(line) {
                directives.content_types.extend(
                    caps[1]
                        .split(',')
                        .map(str::trim)
                        .filter(|value| !value.is_empty())
                        .map(|value| expand_content_type(value.to_string())),
                );
            } else if let Some(caps) = patterns.description.captures(line) {
                directives.description = non_empty(&caps[1]);
            } else if let Some(caps) = patterns.parameter.captures(line) {
                directives.add_parameter(&caps);
            } else if let Some(caps) = patterns.response.captures(line) {
                directives.add_response(&caps);
            } else if let Some(caps) = patterns.router.captures(line) {
                directives.router = Some((normalize_path(&caps[1]), caps[2].to_string()));
            } else if let Some(caps) = patterns.title.captures(line) {
                directives.title = non_empty(&caps[1]);
            } else if line.trim_start().starts_with('@') {
                debug!("Ignoring unrecognised directive `{}`", line.trim());
            }
        }

        directives
    }

    /// `@Param name location type required "description"`; a `body` parameter is the request body
    fn add_parameter(&mut self, caps: &regex::Captures<'_>) {
        let name = &caps[1];
        let type_ref = classify(&caps[3]);
        let required = caps[4].eq_ignore_ascii_case("true");
        let description = caps.get(5).and_then(|text| non_empty(text.as_str()));

        let location = match caps[2].to_ascii_lowercase().as_str() {
            "path" => ParameterLocation::Path,
            "query" => ParameterLocation::Query,
            "header" => ParameterLocation::Header,
            "body" => {
                self.request_body = Some(type_ref).filter(|type_ref| !type_ref.is_unit());
                return;
            }
            other => {
                warn!("Parameter {} is read from unsupported location `{}`; skipping it", name, other);
                return;
            }
        };

        self.parameters.push(Parameter {
            name: name.to_string(),
            location,
            type_ref,
            required: required || location == ParameterLocation::Path,
            description,
        });
    }

    /// `@Success status {meta} type "description"`; an `{array}` meta wraps the type in a sequence
    fn add_response(&mut self, caps: &regex::Captures<'_>) {
        let Ok(status) = caps[2].parse::<u16>() else {
            warn!("Response status `{}` is out of range; skipping it", &caps[2]);
            return;
        };

        let mut type_ref = classify(&caps[4]);
        if caps[3].eq_ignore_ascii_case("array") && !matches!(type_ref, TypeRef::Sequence(_)) {
            type_ref = TypeRef::Sequence(Box::new(type_ref));
        }

        self.responses.push(Response {
            status,
            type_ref,
            description: caps
                .get(5)
                .and_then(|text| non_empty(text.as_str()))
                .unwrap_or_else(|| default_description(status)),
        });
    }

    /// Merge the directives into `operation`
    pub fn apply(self, operation: &mut Operation) {
        if self.title.is_some() {
            operation.summary = self.title;
        }
        if self.description.is_some() {
            operation.description = self.description;
        }
        operation.content_types.extend(self.content_types);
        operation.parameters.extend(self.parameters);
        if self.request_body.is_some() {
            operation.request_body = self.request_body;
        }
        operation.responses.extend(self.responses);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_ref::PrimitiveType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_every_directive() {
        let directives = InlineDirectives::parse(
            r#"
 @Title List villages
 @Description Every village of a world
 @Router /worlds/:world/villages [get]
 @Accept json, XML
 @Param world path u64 true "World id"
 @Param limit query u32 false
 @Param form body models::VillageForm true "The new village"
 @Success 200 {array} models::Village "The villages"
 @Failure 404 {object} () "No such world"
"#,
        );

        assert_eq!(
            directives.router,
            Some(("/worlds/{world}/villages".to_string(), "get".to_string()))
        );
        assert_eq!(directives.title.as_deref(), Some("List villages"));
        assert_eq!(directives.description.as_deref(), Some("Every village of a world"));
        assert_eq!(
            directives.content_types,
            vec!["application/json".to_string(), "application/xml".to_string()]
        );

        assert_eq!(directives.parameters.len(), 2);
        assert_eq!(directives.parameters[0].location, ParameterLocation::Path);
        assert!(directives.parameters[0].required);
        assert_eq!(directives.parameters[1].name, "limit");
        assert!(!directives.parameters[1].required);
        assert_eq!(directives.parameters[1].description, None);
        assert_eq!(directives.request_body, Some(classify("models::VillageForm")));

        assert_eq!(directives.responses[0].status, 200);
        assert_eq!(directives.responses[0].type_ref, classify("Vec<models::Village>"));
        assert_eq!(directives.responses[0].description, "The villages");
        assert_eq!(directives.responses[1].type_ref, TypeRef::Unit);
    }

    #[test]
    fn test_array_meta_does_not_double_wrap() {
        let directives = InlineDirectives::parse(r#"@Success 200 {array} Vec<String> "Names""#);

        assert_eq!(
            directives.responses[0].type_ref,
            TypeRef::Sequence(Box::new(TypeRef::Primitive(PrimitiveType::String)))
        );
    }

    #[test]
    fn test_unsupported_parameter_location_is_skipped() {
        let directives = InlineDirectives::parse(r#"@Param avatar formData String true "Upload""#);

        assert!(directives.parameters.is_empty());
        assert!(directives.request_body.is_none());
    }

    #[test]
    fn test_text_without_directives() {
        assert_eq!(
            InlineDirectives::parse("OpenAPI Path:\n  /health"),
            InlineDirectives::default()
        );
    }
}
