use crate::annotation::Parameter;
use crate::definitions::{DefinitionKey, DefinitionKind, DefinitionRecord, DefinitionStore};
use crate::enums::EnumValue;
use crate::package_index::package_name;
use crate::type_ref::{PrimitiveType, TypeRef};
use clap::ValueEnum;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How schema names are derived from definition keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Naming {
    /// Full module path: `crate.models.User`
    #[default]
    Full,
    /// Declaring module and name: `models.User`
    Partial,
    /// Bare type name: `User`
    Simple,
}

/// Schema generator - converts resolved type references and definitions to OpenAPI schemas
pub struct SchemaGenerator<'a> {
    store: &'a DefinitionStore,
    naming: Naming,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types, in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Value schema for map types
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    /// Enum values for enum-backed scalars
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumValue>>,
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    fn typed(schema_type: &str) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            ..Schema::default()
        }
    }

    fn reference(name: &str) -> Self {
        Schema {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Schema::default()
        }
    }

    /// Attach a description; `$ref` schemas take no siblings and are left alone
    fn described(mut self, description: Option<&String>) -> Self {
        if self.reference.is_none() {
            self.description = description.cloned();
        }
        self
    }
}

/// Parameter schema for OpenAPI parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schema for the parameter
    pub schema: Schema,
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(store: &'a DefinitionStore, naming: Naming) -> Self {
        debug!("Initializing SchemaGenerator with {:?} naming", naming);
        Self { store, naming }
    }

    /// Name of the component schema for `key`
    pub fn schema_name(&self, key: &DefinitionKey) -> String {
        match self.naming {
            Naming::Full => format!("{}.{}", key.package_path.replace("::", "."), key.name),
            Naming::Partial => format!("{}.{}", package_name(&key.package_path), key.name),
            Naming::Simple => key.name.clone(),
        }
    }

    /// Generate a schema for a type reference; resolved named types become `$ref`s
    pub fn generate_schema(&self, type_ref: &TypeRef) -> Schema {
        match type_ref {
            TypeRef::Unit => Schema::default(),
            TypeRef::Primitive(primitive) => primitive_to_schema(*primitive),
            TypeRef::Sequence(element) => Schema {
                items: Some(Box::new(self.generate_schema(element))),
                ..Schema::typed("array")
            },
            TypeRef::Map(key, value) => {
                if !matches!(key.as_ref(), TypeRef::Primitive(PrimitiveType::String)) {
                    debug!("Map key {} is serialized as a string", key);
                }
                Schema {
                    additional_properties: Some(Box::new(self.generate_schema(value))),
                    ..Schema::typed("object")
                }
            }
            TypeRef::Named(named) => match &named.resolved {
                Some(key) => Schema::reference(&self.schema_name(key)),
                None => {
                    warn!("Type {} was never resolved, using object placeholder", named.path);
                    Schema::typed("object")
                }
            },
            // Generic parameters can hold any value
            TypeRef::Param(name) => {
                debug!("Generic parameter {} has a free-form schema", name);
                Schema::default()
            }
        }
    }

    /// Component schema of one stored definition
    pub fn definition_schema(&self, record: &DefinitionRecord) -> Schema {
        let mut schema = match &record.kind {
            DefinitionKind::Object => {
                let mut properties = IndexMap::new();
                let mut required = Vec::new();

                for member in &record.members {
                    let property = self
                        .generate_schema(&member.type_ref)
                        .described(member.description.as_ref());
                    if properties.insert(member.serialized_name.clone(), property).is_some() {
                        warn!(
                            "{} has more than one property named {}; keeping the last",
                            record.key(),
                            member.serialized_name
                        );
                        required.retain(|name| name != &member.serialized_name);
                    }
                    if !member.optional {
                        required.push(member.serialized_name.clone());
                    }
                }

                Schema {
                    properties: Some(properties),
                    required: if required.is_empty() {
                        None
                    } else {
                        Some(required)
                    },
                    ..Schema::typed("object")
                }
            }
            DefinitionKind::Scalar(primitive) => primitive_to_schema(*primitive),
            DefinitionKind::Alias(target) => self.generate_schema(target),
        };

        if let Some(values) = &record.enum_values {
            schema.enum_values = Some(values.clone());
        }
        schema.described(record.description.as_ref())
    }

    /// Get all definition schemas, keyed by schema name.
    ///
    /// Definitions whose names collide under the chosen naming keep the first one.
    pub fn get_schemas(&self) -> IndexMap<String, Schema> {
        let mut schemas = IndexMap::new();

        for (key, record) in self.store.iter() {
            let name = self.schema_name(key);
            if schemas.contains_key(&name) {
                warn!(
                    "Schema name {} of {} is already taken; keeping the first definition",
                    name, key
                );
                continue;
            }
            schemas.insert(name, self.definition_schema(record));
        }

        debug!("Generated {} component schemas", schemas.len());
        schemas
    }

    /// Generate a parameter schema from a Parameter
    pub fn generate_parameter_schema(&self, param: &Parameter) -> ParameterSchema {
        debug!("Generating parameter schema for: {}", param.name);

        ParameterSchema {
            name: param.name.clone(),
            location: param.location.as_str().to_string(),
            required: param.required,
            description: param.description.clone(),
            schema: self.generate_schema(&param.type_ref),
        }
    }
}

/// Convert a primitive type to an OpenAPI schema
fn primitive_to_schema(primitive: PrimitiveType) -> Schema {
    let (schema_type, format) = primitive.schema_kind();
    Schema {
        schema_type: schema_type.map(str::to_string),
        format: format.map(str::to_string),
        ..Schema::default()
    }
}
