use std::sync::Arc;

use apollo_schema_builder::model::OperationRoot;
use apollo_schema_builder::{
    DataObjectCatalog, DataObjectModel, ErrorCode, ModelType, ObjectType, OperationRegistry,
    ResolverRegistry, SchemaModel,
};
use indexmap::IndexMap;
use serde_json::{json, Map as JsonMap};

fn catalog() -> Arc<DataObjectCatalog> {
    let catalog: DataObjectCatalog = serde_json::from_value(json!({
        "App\\Model\\SiteTree": {
            "db": { "Title": "Varchar", "Content": "HTMLText", "Sort": "Int" },
        },
        "App\\Blog\\BlogPost": {
            "parent": "App\\Model\\SiteTree",
            "db": { "PublishDate": "Datetime", "Featured": "Boolean", "Price": "Currency" },
            "has_one": { "Author": "App\\Security\\Member" },
            "has_many": { "Comments": "App\\Blog\\Comment" },
        },
        "App\\Security\\Member": {
            "db": { "Email": "Varchar" },
        },
        "App\\Blog\\Comment": {},
    }))
    .unwrap();
    Arc::new(catalog)
}

fn model(class: &str) -> DataObjectModel {
    DataObjectModel::new(class, catalog(), Arc::new(OperationRegistry::default())).unwrap()
}

#[test]
fn default_fields_are_only_the_id() {
    let expected = IndexMap::from([("id".to_owned(), "ID".to_owned())]);
    for class in ["App\\Model\\SiteTree", "App\\Blog\\BlogPost", "App\\Blog\\Comment"] {
        assert_eq!(model(class).default_fields(), expected);
    }
}

#[test]
fn unknown_classes_are_not_data_objects() {
    let err = DataObjectModel::new(
        "App\\Controller",
        catalog(),
        Arc::new(OperationRegistry::default()),
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotADataObject);
}

#[test]
fn model_exposes_inherited_and_relation_fields() {
    let post = model("App\\Blog\\BlogPost");
    assert_eq!(post.type_name(), "BlogPost");
    let fields = post.all_fields();
    assert_eq!(fields["title"], "String");
    assert_eq!(fields["sort"], "Int");
    assert_eq!(fields["featured"], "Boolean");
    assert_eq!(fields["price"], "Float");
    assert_eq!(fields["authorID"], "ID");
    assert_eq!(fields["author"], "Member");
    assert_eq!(fields["comments"], "[Comment]");
    assert!(post.has_field("PublishDate"));
    assert!(!model("App\\Model\\SiteTree").has_field("author"));
}

#[test]
fn model_type_builds_a_complete_schema() {
    let resolvers = Arc::new(ResolverRegistry::default());
    let mut post = ModelType::new(Arc::new(model("App\\Blog\\BlogPost")), resolvers.clone()).unwrap();
    post.add_fields(["title", "author", "comments"])
        .unwrap()
        .add_field("excerpt(length: Int = 100)", "String")
        .unwrap();
    post.add_operation("read", &JsonMap::new())
        .unwrap()
        .add_operation(
            "delete",
            json!({ "name": "removePosts", "description": "Deletes posts" })
                .as_object()
                .unwrap(),
        )
        .unwrap();

    let sdl = post.build().unwrap().to_sdl();
    assert!(sdl.contains("type BlogPost"));
    assert!(sdl.contains("id: ID"));
    assert!(sdl.contains("author: Member"));
    assert!(sdl.contains("comments: [Comment]"));
    assert!(sdl.contains("excerpt(length: Int = 100): String"));

    let mut query = ObjectType::new("Query", resolvers.clone());
    let mut mutation = ObjectType::new("Mutation", resolvers);
    post.apply_operations(&mut query, &mut mutation);
    assert_eq!(post.operations(OperationRoot::Mutation).count(), 1);

    let query_sdl = query.build().unwrap().to_sdl();
    assert!(query_sdl.contains("readBlogPosts(limit: Int, offset: Int): [BlogPost!]!"));
    let mutation_sdl = mutation.build().unwrap().to_sdl();
    assert!(mutation_sdl.contains("\"Deletes posts\""));
    assert!(mutation_sdl.contains("removePosts(ids: [ID!]!): [ID]!"));
}

#[test]
fn operation_creator_failures_surface() {
    let mut registry = OperationRegistry::default();
    registry.register_class("App\\Operations\\Legacy", None);
    let model = DataObjectModel::new("App\\Blog\\Comment", catalog(), Arc::new(registry)).unwrap();

    let err = model
        .get_operation_creator_by_identifier(
            "read",
            json!({ "creator": "App\\Operations\\Legacy" }).as_object().unwrap(),
        )
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownOperationCreator);
    assert!(model
        .get_operation_creator_by_identifier("publish", &JsonMap::new())
        .is_err());
}
