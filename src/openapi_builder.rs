use crate::annotation::{ApiInfo, HttpMethod, Operation as AnnotatedOperation, Tag as AnnotatedTag};
use crate::schema_generator::{ParameterSchema, Schema, SchemaGenerator};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const DEFAULT_TITLE: &str = "Generated API";
const DEFAULT_VERSION: &str = "1.0.0";
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    servers: Vec<Server>,
    tags: Vec<Tag>,
    /// Paths collection (URL path -> PathItem), in declaration order
    paths: IndexMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    /// Parameters (path, query, header)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterSchema>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: IndexMap<String, Response>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, Schema>>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub servers: Vec<Server>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
    /// API paths
    pub paths: IndexMap<String, PathItem>,
    /// Components (schemas, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: DEFAULT_TITLE.to_string(),
                version: DEFAULT_VERSION.to_string(),
                description: None,
            },
            servers: Vec::new(),
            tags: Vec::new(),
            paths: IndexMap::new(),
        }
    }

    /// Take title, version, description and base path from the API annotation.
    ///
    /// Missing values keep their defaults.
    pub fn with_api_info(mut self, api: &ApiInfo) -> Self {
        if let Some(title) = &api.title {
            self.info.title = title.clone();
        }
        if let Some(version) = &api.version {
            self.info.version = version.clone();
        }
        if api.description.is_some() {
            self.info.description = api.description.clone();
        }
        if let Some(base_path) = &api.base_path {
            self.servers = vec![Server {
                url: base_path.clone(),
            }];
        }
        self
    }

    /// Declare tags; a name declared twice keeps its first declaration
    pub fn add_tags(&mut self, tags: &[AnnotatedTag]) {
        for tag in tags {
            if self.tags.iter().any(|existing| existing.name == tag.name) {
                warn!("Tag {} is declared more than once; keeping the first", tag.name);
                continue;
            }
            self.tags.push(Tag {
                name: tag.name.clone(),
                description: tag.description.clone(),
            });
        }
    }

    /// Add an annotated operation to the OpenAPI document
    pub fn add_operation(&mut self, operation: &AnnotatedOperation, schema_gen: &SchemaGenerator) {
        debug!("Adding operation: {}", operation.label());

        let content_types: Vec<String> = if operation.content_types.is_empty() {
            vec![DEFAULT_CONTENT_TYPE.to_string()]
        } else {
            operation.content_types.clone()
        };
        let content = |schema: Schema| -> IndexMap<String, MediaType> {
            content_types
                .iter()
                .map(|content_type| {
                    (
                        content_type.clone(),
                        MediaType {
                            schema: schema.clone(),
                        },
                    )
                })
                .collect()
        };

        let parameters = if operation.parameters.is_empty() {
            None
        } else {
            let params: Vec<ParameterSchema> = operation
                .parameters
                .iter()
                .map(|param| {
                    if !param.type_ref.is_primitive() {
                        warn!(
                            "{} parameter `{}` of {} is not a primitive type ({})",
                            param.location.as_str(),
                            param.name,
                            operation.label(),
                            param.type_ref
                        );
                    }
                    schema_gen.generate_parameter_schema(param)
                })
                .collect();
            Some(params)
        };

        let request_body = operation.request_body.as_ref().map(|type_ref| RequestBody {
            description: None,
            required: true,
            content: content(schema_gen.generate_schema(type_ref)),
        });

        let mut responses = IndexMap::new();
        for response in &operation.responses {
            let status = response.status.to_string();
            if responses.contains_key(&status) {
                warn!(
                    "{} documents response {} more than once; keeping the first",
                    operation.label(),
                    status
                );
                continue;
            }
            let body = if response.type_ref.is_unit() {
                None
            } else {
                Some(content(schema_gen.generate_schema(&response.type_ref)))
            };
            responses.insert(
                status,
                Response {
                    description: response.description.clone(),
                    content: body,
                },
            );
        }
        if responses.is_empty() {
            responses.insert(
                "200".to_string(),
                Response {
                    description: "Successful response".to_string(),
                    content: None,
                },
            );
        }

        let built = Operation {
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            operation_id: operation.operation_id.clone(),
            tags: operation.tags.clone(),
            parameters,
            request_body,
            responses,
        };

        let slot = self
            .paths
            .entry(operation.path.clone())
            .or_default()
            .slot(operation.method);
        if slot.is_some() {
            warn!("{} is declared more than once; keeping the last", operation.label());
        }
        *slot = Some(built);
    }

    /// Build the final OpenAPI document
    pub fn build(self, schemas: IndexMap<String, Schema>) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let components = if schemas.is_empty() {
            None
        } else {
            Some(Components {
                schemas: Some(schemas),
            })
        };

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            servers: self.servers,
            tags: self.tags,
            paths: self.paths,
            components,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
