//! Serialization of OpenAPI documents to YAML or JSON.
//!
//! Documents are rendered to strings and then either printed or written to a file.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use clap::ValueEnum;
use log::debug;
use std::fs;
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    #[default]
    Yaml,
    /// JSON format
    Json,
}

/// Serializes an OpenAPI document in the requested format.
///
/// # Arguments
///
/// * `doc` - The OpenAPI document to serialize
/// * `format` - YAML or JSON
///
/// # Returns
///
/// Returns the document rendered as a string.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use indexmap::IndexMap;
/// use openapi_from_comments::openapi_builder::OpenApiBuilder;
/// use openapi_from_comments::serializer::{serialize, OutputFormat};
///
/// let doc = OpenApiBuilder::new().build(IndexMap::new());
/// let yaml = serialize(&doc, OutputFormat::Yaml).unwrap();
/// assert!(yaml.contains("3.0.0"));
/// ```
pub fn serialize(doc: &OpenApiDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serialize_yaml(doc),
        OutputFormat::Json => serialize_json(doc),
    }
}

/// Serializes an OpenAPI document to YAML format.
///
/// The output is standard YAML, suitable for OpenAPI tools and documentation generators.
///
/// # Arguments
///
/// * `doc` - The OpenAPI document to serialize
///
/// # Returns
///
/// Returns the YAML string representation of the document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
///
/// The output is indented for human review and version control.
///
/// # Arguments
///
/// * `doc` - The OpenAPI document to serialize
///
/// # Returns
///
/// Returns the JSON string representation of the document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// An existing file is overwritten.
///
/// # Arguments
///
/// * `content` - The serialized document
/// * `path` - Destination file
///
/// # Errors
///
/// Returns an error if a parent directory cannot be created or the file cannot be written.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{ApiInfo, HttpMethod, Operation};
    use crate::definitions::{DefinitionKind, DefinitionRecord, DefinitionStore};
    use crate::enums::EnumValue;
    use crate::openapi_builder::OpenApiBuilder;
    use crate::schema_generator::{Naming, SchemaGenerator};
    use crate::type_ref::PrimitiveType;
    use tempfile::TempDir;

    /// A document with one operation and one enum schema
    fn create_test_document() -> OpenApiDocument {
        let mut store = DefinitionStore::new();
        let mut status = DefinitionRecord::new(
            "crate::models",
            "models",
            "Status",
            DefinitionKind::Scalar(PrimitiveType::I32),
        );
        status.enum_values = Some(vec![EnumValue::Int(0), EnumValue::Int(1)]);
        store.insert(status);

        let schema_gen = SchemaGenerator::new(&store, Naming::Simple);
        let mut builder = OpenApiBuilder::new().with_api_info(&ApiInfo {
            title: Some("Test API".to_string()),
            version: Some("1.0.0".to_string()),
            description: Some("A test API".to_string()),
            base_path: None,
        });
        builder.add_operation(
            &Operation::new("crate::handlers", "/users/{id}", HttpMethod::Get),
            &schema_gen,
        );
        builder.build(schema_gen.get_schemas())
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi:"));
        assert!(yaml.contains("3.0.0"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("description: A test API"));
        assert!(yaml.contains("/users/{id}"));
        assert!(yaml.contains("Status:"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        // Pretty printed
        assert!(json.lines().count() > 5);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["openapi"], "3.0.0");
        assert_eq!(parsed["info"]["title"], "Test API");
        assert!(parsed["paths"]["/users/{id}"]["get"].is_object());
        assert_eq!(
            parsed["components"]["schemas"]["Status"]["enum"],
            serde_json::json!([0, 1])
        );
    }

    #[test]
    fn test_serialize_by_format() {
        let doc = create_test_document();
        assert_eq!(serialize(&doc, OutputFormat::Json).unwrap(), serialize_json(&doc).unwrap());
        assert_eq!(serialize(&doc, OutputFormat::Yaml).unwrap(), serialize_yaml(&doc).unwrap());
    }

    #[test]
    fn test_roundtrip_yaml_serialization() {
        let doc = create_test_document();
        let yaml = serialize_yaml(&doc).unwrap();

        let deserialized: OpenApiDocument = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(deserialized.openapi, doc.openapi);
        assert_eq!(deserialized.info.title, doc.info.title);
        assert_eq!(deserialized.info.description, doc.info.description);
        assert_eq!(deserialized.paths.len(), 1);
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("test.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.yaml");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_write_json_file_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.json");

        let json = serialize_json(&create_test_document()).unwrap();
        write_to_file(&json, &file_path).unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        let deserialized: OpenApiDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(deserialized.info.title, "Test API");
    }
}
