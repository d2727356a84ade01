//! Annotations scraped from doc comments.
//!
//! Doc comments containing `OpenAPI` sections describe the API, its tags and its operations:
//!
//! ```text
//! /// OpenAPI Path:
//! ///     /users/{id}
//! ///
//! /// OpenAPI Method:
//! ///     GET
//! ///
//! /// OpenAPI Responses:
//! ///     200  models::User  The user
//! ///     404  ()            No such user
//! ```
//!
//! Nothing in this module looks up types; type references stay unresolved [`TypeRef`]s
//! carrying the package they were written in.

pub mod api;
pub mod comments;
pub mod inline;
pub mod operation;
pub mod section;

pub use api::{parse_api_info, parse_tags, ApiInfo, Tag};
pub use comments::{collect_comment_blocks, CommentBlock};
pub use operation::parse_operation;

use crate::type_ref::TypeRef;
use std::fmt;

/// One API operation declared in a comment block
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Package the comment was found in; its types resolve from here
    pub package_path: String,
    /// Name of the item carrying the comment
    pub operation_id: Option<String>,
    /// OpenAPI path template, e.g. `/users/{id}`
    pub path: String,
    pub method: HttpMethod,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Media types consumed and produced
    pub content_types: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<TypeRef>,
    pub responses: Vec<Response>,
}

impl Operation {
    pub fn new(package_path: impl Into<String>, path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            package_path: package_path.into(),
            operation_id: None,
            path: path.into(),
            method,
            summary: None,
            description: None,
            tags: Vec::new(),
            content_types: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
        }
    }

    /// `GET /users/{id}`
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Every root type reference of this operation, labelled by where it occurs
    pub fn type_refs_mut(&mut self) -> Vec<(String, &mut TypeRef)> {
        let mut refs: Vec<(String, &mut TypeRef)> = Vec::new();
        for parameter in &mut self.parameters {
            refs.push((format!("parameter `{}`", parameter.name), &mut parameter.type_ref));
        }
        if let Some(body) = &mut self.request_body {
            refs.push(("request body".to_string(), body));
        }
        for response in &mut self.responses {
            refs.push((format!("response {}", response.status), &mut response.type_ref));
        }
        refs
    }
}

/// A path, query or header parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub type_ref: TypeRef,
    pub required: bool,
    pub description: Option<String>,
}

/// Where a parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
        }
    }
}

/// One documented response; a `()` type means no content
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub type_ref: TypeRef,
    pub description: String,
}

/// HTTP methods an operation can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Parse a method name, ignoring case
    pub fn parse(method: &str) -> Option<Self> {
        match method.trim().to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
