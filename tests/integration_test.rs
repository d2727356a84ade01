use clap::Parser;
use openapi_from_comments::{
    annotation::{collect_comment_blocks, parse_api_info, parse_operation, Operation},
    cli::{self, CliArgs},
    definitions::DefinitionKey,
    detector::BlockDetector,
    engine::resolve_operations,
    locator::SourceTypeLocator,
    openapi_builder::OpenApiBuilder,
    package_index::PackageIndex,
    parser::AstParser,
    scanner::FileScanner,
    schema_generator::{Naming, SchemaGenerator},
    serializer::{serialize_json, serialize_yaml},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn store_project() -> TempDir {
    create_test_project(vec![
        ("src/lib.rs", include_str!("fixtures/store_project/lib.rs")),
        ("src/audit.rs", include_str!("fixtures/store_project/audit.rs")),
        ("src/handlers.rs", include_str!("fixtures/store_project/handlers.rs")),
        ("src/models.rs", include_str!("fixtures/store_project/models.rs")),
    ])
}

fn cli_args(temp_dir: &TempDir, extra: &[&str]) -> CliArgs {
    let path = temp_dir.path().to_string_lossy().to_string();
    let mut argv = vec!["openapi-from-comments", path.as_str()];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("Failed to parse arguments")
}

fn generate_json(temp_dir: &TempDir, extra: &[&str]) -> Value {
    let document = cli::generate(&cli_args(temp_dir, extra)).expect("Failed to generate document");
    serde_json::from_str(&serialize_json(&document).unwrap()).unwrap()
}

#[test]
fn test_store_project_step_by_step() {
    let temp_dir = store_project();

    // Step 1: Scan directory
    let scanner = FileScanner::new(temp_dir.path().to_path_buf());
    let scan_result = scanner.scan().expect("Failed to scan directory");
    assert_eq!(scan_result.source_files.len(), 4);

    // Step 2: Parse files
    let parsed_files: Vec<_> = AstParser::parse_files(&scan_result.source_files)
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(parsed_files.len(), 4, "Every fixture file should parse");

    // Step 3: Index modules
    let index = PackageIndex::from_files(&parsed_files);
    for module in ["crate", "crate::audit", "crate::handlers", "crate::models", "crate::legacy"] {
        assert!(index.contains(module), "Should index {}", module);
    }

    // Step 4: Detect and parse annotation blocks, skipping the legacy module
    let blocks = collect_comment_blocks(&parsed_files, |module| module == "crate::legacy");
    let detection = BlockDetector::detect(&blocks);
    assert_eq!(detection.api_blocks.len(), 1);
    assert_eq!(detection.tag_blocks.len(), 1);

    let api_info = parse_api_info(&detection.api_blocks);
    assert_eq!(api_info.title.as_deref(), Some("Village Store"));
    assert_eq!(api_info.base_path.as_deref(), Some("/api"));

    let mut operations: Vec<Operation> = detection
        .operation_blocks
        .iter()
        .filter_map(|block| parse_operation(block))
        .collect();
    assert_eq!(operations.len(), 4);

    // Step 5: Resolve
    let locator = SourceTypeLocator::new(&parsed_files, &index);
    let store = resolve_operations(&index, &locator, &mut operations).expect("Failed to resolve");

    let village = DefinitionKey::new("crate::models", "Village");
    assert!(store.contains(&village));
    assert!(store.contains(&DefinitionKey::new("crate::audit", "Timestamp")));
    assert!(
        !store.contains(&DefinitionKey::new("crate::audit", "Stamp")),
        "Embedded-only types are not stored"
    );

    // Every named leaf in the operations points at a stored definition
    let show = operations
        .iter()
        .find(|operation| operation.operation_id.as_deref() == Some("show_village"))
        .unwrap();
    let leaves = show.responses[0].type_ref.named_leaves();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].resolved.as_ref(), Some(&village));

    // Members promoted from the embedded stamp remember where they came from
    let record = store.get(&village).unwrap();
    let created_at = record.member("created_at").expect("Promoted member");
    assert!(created_at.is_embedded);
    assert_eq!(created_at.override_package_path.as_deref(), Some("crate::audit"));
    assert!(record.member("cache_key").is_none(), "Skipped fields are not members");

    // Step 6: Build the document
    let schema_gen = SchemaGenerator::new(&store, Naming::Simple);
    let mut builder = OpenApiBuilder::new().with_api_info(&api_info);
    for operation in &operations {
        builder.add_operation(operation, &schema_gen);
    }
    let document = builder.build(schema_gen.get_schemas());

    let yaml = serialize_yaml(&document).expect("Failed to serialize to YAML");
    assert!(yaml.contains("Village Store"));
    assert!(yaml.contains("/villages/{id}"));
}

#[test]
fn test_store_project_document() {
    let temp_dir = store_project();
    let json = generate_json(&temp_dir, &["--ignore", "legacy"]);

    assert_eq!(json["openapi"], "3.0.0");
    assert_eq!(json["info"]["title"], "Village Store");
    assert_eq!(json["info"]["version"], "2.1.0");
    assert_eq!(json["info"]["description"], "Buy and sell villages.");
    assert_eq!(json["servers"], json!([{ "url": "/api" }]));
    assert_eq!(json["tags"][0]["name"], "Villages");
    assert!(json["paths"].get("/old").is_none(), "Ignored modules contribute nothing");

    let list = &json["paths"]["/villages"]["get"];
    assert_eq!(list["operationId"], "list_villages");
    assert_eq!(list["tags"], json!(["Villages"]));
    assert_eq!(
        list["parameters"][0]["schema"]["$ref"],
        "#/components/schemas/crate.models.Status"
    );
    assert_eq!(list["parameters"][1]["schema"]["type"], "integer");
    assert_eq!(
        list["responses"]["200"]["content"]["application/json"]["schema"]["items"]["$ref"],
        "#/components/schemas/crate.models.Village"
    );

    // The renamed import resolves to the same schema as the qualified path
    let show = &json["paths"]["/villages/{id}"]["get"];
    assert_eq!(show["parameters"][0]["name"], "id");
    assert_eq!(show["parameters"][0]["in"], "path");
    assert_eq!(
        show["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/crate.models.Village"
    );
    assert!(show["responses"]["404"].get("content").is_none());

    let create = &json["paths"]["/villages"]["post"];
    let body = &create["requestBody"]["content"];
    assert_eq!(
        body["application/json"]["schema"]["$ref"],
        "#/components/schemas/crate.models.VillageForm"
    );
    assert!(body["application/xml"].is_object());

    // Declared with inline directives instead of sections
    let withdraw = &json["paths"]["/villages/{id}"]["delete"];
    assert_eq!(withdraw["operationId"], "withdraw_village");
    assert_eq!(withdraw["responses"]["204"]["description"], "Withdrawn");
    assert!(withdraw["responses"]["204"].get("content").is_none());

    let schemas = json["components"]["schemas"].as_object().unwrap();
    let mut names: Vec<&str> = schemas.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "crate.audit.Timestamp",
            "crate.models.Level",
            "crate.models.Owner",
            "crate.models.Price",
            "crate.models.Status",
            "crate.models.Tag",
            "crate.models.Village",
            "crate.models.VillageForm",
        ]
    );

    let village = &schemas["crate.models.Village"];
    assert_eq!(village["type"], "object");
    assert_eq!(village["properties"]["displayName"]["type"], "string");
    assert_eq!(
        village["properties"]["owner"]["$ref"],
        "#/components/schemas/crate.models.Owner"
    );
    assert_eq!(
        village["properties"]["prices"]["additionalProperties"]["$ref"],
        "#/components/schemas/crate.models.Price"
    );
    assert_eq!(
        village["properties"]["createdAt"]["$ref"],
        "#/components/schemas/crate.audit.Timestamp"
    );
    assert_eq!(village["properties"]["createdBy"]["type"], "string");
    assert!(village["properties"].get("stamp").is_none());
    assert!(village["properties"].get("cacheKey").is_none());

    let required: Vec<&str> = village["required"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(required.contains(&"displayName"));
    assert!(!required.contains(&"owner"));

    assert_eq!(schemas["crate.models.Status"]["type"], "string");
    assert_eq!(schemas["crate.models.Status"]["enum"], json!(["for_sale", "sold"]));
    assert_eq!(schemas["crate.models.Level"]["type"], "integer");
    assert_eq!(schemas["crate.models.Level"]["enum"], json!([1, 5]));
    assert_eq!(schemas["crate.models.Price"]["type"], "number");

    let form_required = schemas["crate.models.VillageForm"]["required"].as_array().unwrap();
    assert!(!form_required.contains(&json!("tags")));
}

#[test]
fn test_store_project_naming_strategies() {
    let temp_dir = store_project();

    let partial = generate_json(&temp_dir, &["-i", "legacy", "-n", "partial"]);
    assert!(partial["components"]["schemas"]["models.Village"].is_object());
    assert!(partial["components"]["schemas"]["audit.Timestamp"].is_object());

    let simple = generate_json(&temp_dir, &["-i", "legacy", "-n", "simple"]);
    assert!(simple["components"]["schemas"]["Village"].is_object());
    assert_eq!(
        simple["paths"]["/villages"]["post"]["responses"]["201"]["content"]["application/json"]
            ["schema"]["$ref"],
        "#/components/schemas/Village"
    );
}

#[test]
fn test_unresolvable_type_fails_generation() {
    let temp_dir = store_project();

    // Without ignoring the legacy module its `Ghost` response cannot be found
    let error = cli::generate(&cli_args(&temp_dir, &[])).unwrap_err();
    let message = format!("{:#}", error);

    assert!(message.contains("Failed to resolve"), "{}", message);
    assert!(message.contains("Ghost"), "{}", message);
}

#[test]
fn test_cross_module_aliases_and_reexports() {
    let temp_dir = create_test_project(vec![
        (
            "src/lib.rs",
            r#"
            pub mod api;
            pub mod v2;
            pub use crate::v2::model::Account;
            "#,
        ),
        (
            "src/api.rs",
            r#"
            use crate::v2::model as m;

            /// OpenAPI Path:
            ///     /accounts/:id
            ///
            /// OpenAPI Method:
            ///     GET
            ///
            /// OpenAPI Responses:
            ///     200  m::Account  The account
            pub fn show() {}

            /// OpenAPI Path:
            ///     /accounts
            ///
            /// OpenAPI Method:
            ///     GET
            ///
            /// OpenAPI Responses:
            ///     200  Vec<crate::Account>  Every account
            pub fn list() {}
            "#,
        ),
        ("src/v2/mod.rs", "pub mod model;"),
        (
            "src/v2/model.rs",
            r#"
            pub struct Account {
                pub id: AccountId,
                pub parent: Option<Box<Account>>,
            }

            pub type AccountId = String;
            "#,
        ),
    ]);

    let json = generate_json(&temp_dir, &[]);
    let schemas = json["components"]["schemas"].as_object().unwrap();

    // The alias and the re-export both land on the home definition
    assert_eq!(schemas.len(), 2, "{:?}", schemas.keys().collect::<Vec<_>>());
    let account = &schemas["crate.v2.model.Account"];
    assert_eq!(
        account["properties"]["parent"]["$ref"],
        "#/components/schemas/crate.v2.model.Account"
    );
    assert_eq!(schemas["crate.v2.model.AccountId"]["type"], "string");
    assert_eq!(
        json["paths"]["/accounts"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"]["items"]["$ref"],
        "#/components/schemas/crate.v2.model.Account"
    );
}

#[test]
fn test_run_writes_yaml_output() {
    let temp_dir = store_project();
    let output = temp_dir.path().join("docs/openapi.yaml");

    cli::run(cli_args(&temp_dir, &["-i", "legacy", "-o", output.to_str().unwrap()]))
        .expect("Failed to run generation");

    let content = std::fs::read_to_string(&output).expect("Output file should exist");
    let parsed: Value = serde_yaml::from_str(&content).expect("Output should be valid YAML");
    assert_eq!(parsed["info"]["title"], "Village Store");
    assert!(parsed["paths"]["/villages"]["post"].is_object());
}
