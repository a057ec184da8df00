use std::sync::Arc;

use apollo_schema_builder::resolver::registry::ResolverTier;
use apollo_schema_builder::{
    default_field_resolver, CallableRegistry, ErrorCode, Field, FieldConfig, ObjectType,
    ResolveInfo, ResolverPair, ResolverReference, ResolverRegistry, SourceValue,
};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

fn callables() -> CallableRegistry {
    let mut callables = CallableRegistry::default();
    callables
        .register("PostResolver", "resolvePostTitle", |_, _, _, _| {
            SourceValue::Json(json!("convention"))
        })
        .register("PostResolver", "resolvePost", |_, _, _, _| {
            SourceValue::Json(json!("type default"))
        })
        .register("Explicit", "title", |_, _, _, _| SourceValue::Json(json!("explicit")))
        .register("Field", "fallback", |_, _, _, _| SourceValue::Json(json!("field default")))
        .register("Context", "echo", |_, _, _, info| {
            SourceValue::Json(json!(info.resolver_context))
        });
    callables
}

fn reference(class: &str, method: &str, callables: &CallableRegistry) -> ResolverReference {
    ResolverReference::new(class, method, callables).unwrap()
}

#[test]
fn references_round_trip_between_string_and_pair() {
    let callables = callables();
    let parsed = ResolverReference::parse("PostResolver::resolvePost", &callables).unwrap();
    assert_eq!(parsed.to_array(), ["PostResolver", "resolvePost"]);
    let reparsed = ResolverReference::parse(&parsed.to_string(), &callables).unwrap();
    assert_eq!(reparsed.to_array(), parsed.to_array());
    let from_pair = ResolverReference::from_pair(&ResolverPair::from(&parsed), &callables).unwrap();
    assert_eq!(from_pair, parsed);
}

#[test]
fn invalid_references_fail() {
    let callables = callables();
    for text in ["PostResolver", "PostResolver::", "::resolvePost", "A::b::c", "Nope::resolve"] {
        let err = ResolverReference::parse(text, &callables).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnresolvableCallable, "{text}");
    }
}

#[test]
fn explicit_beats_field_default_beats_global() {
    let callables = Arc::new(callables());
    let mut registry = ResolverRegistry::new(callables.clone());
    let field_default = reference("Field", "fallback", &callables);

    let (tier, found) = registry
        .find_resolver_with_tier("Post", "title", None)
        .unwrap();
    assert_eq!(tier, ResolverTier::GlobalDefault);
    assert_eq!(found.to_string(), "DefaultResolver::defaultFieldResolver");

    let (tier, found) = registry
        .find_resolver_with_tier("Post", "title", Some(&field_default))
        .unwrap();
    assert_eq!(tier, ResolverTier::FieldDefault);
    assert_eq!(found, field_default);

    registry.register_callable("Post", "title", "Explicit::title").unwrap();
    let (tier, found) = registry
        .find_resolver_with_tier("Post", "title", Some(&field_default))
        .unwrap();
    assert_eq!(tier, ResolverTier::Explicit);
    assert_eq!(found.to_string(), "Explicit::title");
}

#[test]
fn resolver_classes_and_type_defaults_are_consulted() {
    let callables = Arc::new(callables());
    let mut registry = ResolverRegistry::new(callables.clone());
    registry.add_resolver_class("PostResolver");

    let found = registry.find_resolver("Post", "title", None).unwrap();
    assert_eq!(found.to_string(), "PostResolver::resolvePostTitle");
    let (tier, found) = registry
        .find_resolver_with_tier("Post", "body", None)
        .unwrap();
    assert_eq!(tier, ResolverTier::TypeDefault);
    assert_eq!(found.to_string(), "PostResolver::resolvePost");
}

#[test]
fn exhausting_every_tier_fails() {
    let mut registry = ResolverRegistry::new(Arc::new(CallableRegistry::empty()));
    registry.set_global_default(None);
    let err = registry.find_resolver("Post", "title", None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoResolverFound);
    assert_eq!(err.to_string(), "No resolver found for \"Post.title\"");
}

#[test]
fn default_resolver_reads_keys_and_invokes_callables() {
    let info = ResolveInfo::new("Member", "name");
    let args = JsonMap::new();
    let context = JsonValue::Null;

    let source = SourceValue::Json(json!({ "name": "Sam" }));
    let value = default_field_resolver(&source, &args, &context, &info);
    assert_eq!(value.as_json(), Some(&json!("Sam")));

    let missing = ResolveInfo::new("Member", "email");
    assert!(default_field_resolver(&source, &args, &context, &missing).is_null());

    let lazy = SourceValue::Map(
        [(
            "name".to_owned(),
            SourceValue::callable(|_, _, _, info| SourceValue::Json(json!(info.field_name))),
        )]
        .into_iter()
        .collect(),
    );
    let value = default_field_resolver(&lazy, &args, &context, &info);
    assert_eq!(value.as_json(), Some(&json!("name")));
}

#[test]
fn built_resolvers_carry_context_into_invocation() {
    let callables = Arc::new(callables());
    let registry = Arc::new(ResolverRegistry::new(callables.clone()));
    let config = json!({
        "type": "String",
        "resolver": ["Context", "echo"],
        "resolverContext": { "table": "Post", "limit": 5 },
    });
    let mut post = ObjectType::new("Post", registry.clone());
    post.add_field(
        Field::new(
            "title",
            FieldConfig::from_json(config).unwrap(),
            registry,
        )
        .unwrap(),
    );
    let built = post.build().unwrap();
    let resolver = built.resolver("title").unwrap();
    let value = resolver
        .invoke(
            &callables,
            &SourceValue::null(),
            &JsonMap::new(),
            &JsonValue::Null,
            "Post",
            "title",
        )
        .unwrap();
    assert_eq!(value.as_json(), Some(&json!({ "table": "Post", "limit": 5 })));
}
