use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

pub mod callable;
pub mod reference;
pub mod registry;

pub use callable::CallableRegistry;
pub use reference::{ResolverPair, ResolverReference};
pub use registry::ResolverRegistry;

/// Class and method under which [`default_field_resolver`] is registered in every
/// [`CallableRegistry`].
pub const DEFAULT_RESOLVER_CLASS: &str = "DefaultResolver";
pub const DEFAULT_RESOLVER_METHOD: &str = "defaultFieldResolver";

/// Signature shared by every resolver: parent value, field arguments, request context and
/// information about the field being resolved.
pub type ResolverFn = Arc<
    dyn Fn(&SourceValue, &JsonMap<String, JsonValue>, &JsonValue, &ResolveInfo) -> SourceValue
        + Send
        + Sync,
>;

/// Something that exposes named properties, e.g. a record loaded by the data layer.
pub trait PropertySource: Send + Sync {
    fn property(&self, name: &str) -> Option<SourceValue>;
}

/// A value flowing through resolvers. Besides plain JSON data, parents may be mappings of further
/// source values, objects with properties, or callables that compute the value lazily.
#[derive(Clone)]
pub enum SourceValue {
    Json(JsonValue),
    Map(IndexMap<String, SourceValue>),
    Object(Arc<dyn PropertySource>),
    Callable(ResolverFn),
}

impl SourceValue {
    pub fn null() -> Self {
        SourceValue::Json(JsonValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SourceValue::Json(JsonValue::Null))
    }

    pub fn callable(
        f: impl Fn(&SourceValue, &JsonMap<String, JsonValue>, &JsonValue, &ResolveInfo) -> SourceValue
            + Send
            + Sync
            + 'static,
    ) -> Self {
        SourceValue::Callable(Arc::new(f))
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            SourceValue::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Looks up a same-named entry or property. Absence is `None`, never an error.
    fn get(&self, name: &str) -> Option<SourceValue> {
        match self {
            SourceValue::Json(JsonValue::Object(map)) => map.get(name).cloned().map(SourceValue::Json),
            SourceValue::Json(JsonValue::Array(items)) => name
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .cloned()
                .map(SourceValue::Json),
            SourceValue::Json(_) => None,
            SourceValue::Map(map) => map.get(name).cloned(),
            SourceValue::Object(object) => object.property(name),
            SourceValue::Callable(_) => None,
        }
    }
}

impl Debug for SourceValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceValue::Json(value) => f.debug_tuple("Json").field(value).finish(),
            SourceValue::Map(map) => f.debug_tuple("Map").field(map).finish(),
            SourceValue::Object(_) => f.write_str("Object(..)"),
            SourceValue::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl From<JsonValue> for SourceValue {
    fn from(value: JsonValue) -> Self {
        SourceValue::Json(value)
    }
}

/// What a resolver knows about the field it is resolving.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveInfo {
    pub parent_type: String,
    pub field_name: String,
    /// Context entries attached to the field's resolver at build time.
    pub resolver_context: IndexMap<String, JsonValue>,
}

impl ResolveInfo {
    pub fn new(parent_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            parent_type: parent_type.into(),
            field_name: field_name.into(),
            resolver_context: IndexMap::new(),
        }
    }
}

/// Resolves a field by reading the same-named key or property of the parent. If that value is
/// itself callable, it is called with the same arguments and its result is returned instead.
pub fn default_field_resolver(
    source: &SourceValue,
    args: &JsonMap<String, JsonValue>,
    context: &JsonValue,
    info: &ResolveInfo,
) -> SourceValue {
    match source.get(&info.field_name) {
        Some(SourceValue::Callable(f)) => f(source, args, context, info),
        Some(value) => value,
        None => SourceValue::null(),
    }
}
