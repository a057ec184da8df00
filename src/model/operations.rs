use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::error::{SchemaBuildError, SingleSchemaBuildError};
use crate::model::SchemaModel;
use crate::resolver::ResolverRegistry;
use crate::schema::field::{Field, FieldConfig};

pub const OPERATION_CONFIG_KEYS: &[&str] = &["name", "resolver", "description", "creator"];

/// The root type an operation field belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
pub enum OperationRoot {
    Query,
    Mutation,
}

/// Creates the root field for one kind of operation on a model.
pub trait OperationCreator: Debug + Send + Sync {
    fn root(&self) -> OperationRoot;

    fn create_operation(
        &self,
        model: &dyn SchemaModel,
        config: &JsonMap<String, JsonValue>,
        resolvers: Arc<ResolverRegistry>,
    ) -> Result<Field, SchemaBuildError>;
}

/// Maps operation identifiers (`read`, `delete`, ...) to the classes that create them.
///
/// A class may be registered without a creator, which makes lookups through it fail instead of
/// silently falling back.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    identifiers: IndexMap<String, String>,
    classes: IndexMap<String, Option<Arc<dyn OperationCreator>>>,
}

impl OperationRegistry {
    pub fn empty() -> Self {
        Self {
            identifiers: IndexMap::new(),
            classes: IndexMap::new(),
        }
    }

    pub fn register_class(
        &mut self,
        class: impl Into<String>,
        creator: Option<Arc<dyn OperationCreator>>,
    ) -> &mut Self {
        self.classes.insert(class.into(), creator);
        self
    }

    pub fn register(&mut self, identifier: impl Into<String>, class: impl Into<String>) -> &mut Self {
        self.identifiers.insert(identifier.into(), class.into());
        self
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.identifiers.keys().map(String::as_str)
    }

    /// Finds the creator for `identifier`, which must be registered. A `creator` entry in
    /// `config` names a class to use instead of the registered one.
    pub fn get_operation_creator_by_identifier(
        &self,
        identifier: &str,
        config: &JsonMap<String, JsonValue>,
    ) -> Result<Arc<dyn OperationCreator>, SingleSchemaBuildError> {
        let unknown = |message: String| SingleSchemaBuildError::UnknownOperationCreator {
            identifier: identifier.to_owned(),
            message,
        };
        let registered = self
            .identifiers
            .get(identifier)
            .ok_or_else(|| unknown("no operation is registered under this identifier".to_owned()))?;
        // "creator" swaps the class of a registered operation, it never registers a new one
        let class = match config.get("creator") {
            Some(JsonValue::String(class)) => class.as_str(),
            Some(_) => return Err(unknown("\"creator\" must be a class name".to_owned())),
            None => registered.as_str(),
        };
        match self.classes.get(class) {
            Some(Some(creator)) => Ok(creator.clone()),
            Some(None) => Err(unknown(format!(
                "class \"{class}\" is not an operation creator"
            ))),
            None => Err(unknown(format!("class \"{class}\" does not exist"))),
        }
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register_class("ReadCreator", Some(Arc::new(ReadCreator)))
            .register_class("ReadOneCreator", Some(Arc::new(ReadOneCreator)))
            .register_class("DeleteCreator", Some(Arc::new(DeleteCreator)))
            .register("read", "ReadCreator")
            .register("readOne", "ReadOneCreator")
            .register("delete", "DeleteCreator");
        registry
    }
}

/// `read<Type>s(limit: Int, offset: Int): [<Type>!]!`
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadCreator;

impl OperationCreator for ReadCreator {
    fn root(&self) -> OperationRoot {
        OperationRoot::Query
    }

    fn create_operation(
        &self,
        model: &dyn SchemaModel,
        config: &JsonMap<String, JsonValue>,
        resolvers: Arc<ResolverRegistry>,
    ) -> Result<Field, SchemaBuildError> {
        let type_name = model.type_name();
        operation_field(
            "read",
            config,
            format!("read{type_name}s"),
            "(limit: Int, offset: Int)",
            format!("[{type_name}!]!"),
            resolvers,
        )
    }
}

/// `read<Type>One(id: ID!): <Type>`
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOneCreator;

impl OperationCreator for ReadOneCreator {
    fn root(&self) -> OperationRoot {
        OperationRoot::Query
    }

    fn create_operation(
        &self,
        model: &dyn SchemaModel,
        config: &JsonMap<String, JsonValue>,
        resolvers: Arc<ResolverRegistry>,
    ) -> Result<Field, SchemaBuildError> {
        let type_name = model.type_name();
        operation_field(
            "readOne",
            config,
            format!("read{type_name}One"),
            "(id: ID!)",
            type_name,
            resolvers,
        )
    }
}

/// `delete<Type>s(ids: [ID!]!): [ID]!`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteCreator;

impl OperationCreator for DeleteCreator {
    fn root(&self) -> OperationRoot {
        OperationRoot::Mutation
    }

    fn create_operation(
        &self,
        model: &dyn SchemaModel,
        config: &JsonMap<String, JsonValue>,
        resolvers: Arc<ResolverRegistry>,
    ) -> Result<Field, SchemaBuildError> {
        operation_field(
            "delete",
            config,
            format!("delete{}s", model.type_name()),
            "(ids: [ID!]!)",
            "[ID]!".to_owned(),
            resolvers,
        )
    }
}

fn operation_field(
    identifier: &str,
    config: &JsonMap<String, JsonValue>,
    default_name: String,
    arguments: &str,
    ty: String,
    resolvers: Arc<ResolverRegistry>,
) -> Result<Field, SchemaBuildError> {
    let location = format!("operation \"{identifier}\"");
    if let Some(key) = config
        .keys()
        .find(|key| !OPERATION_CONFIG_KEYS.contains(&key.as_str()))
    {
        return Err(SingleSchemaBuildError::UnrecognizedConfigKey {
            location,
            key: key.clone(),
            expected: OPERATION_CONFIG_KEYS.iter().join(", "),
        }
        .into());
    }
    let name = match config.get("name") {
        None | Some(JsonValue::Null) => default_name,
        Some(JsonValue::String(name)) => name.clone(),
        Some(_) => {
            return Err(SingleSchemaBuildError::InvalidConfigValue {
                location,
                key: "name".to_owned(),
                message: "expected a string".to_owned(),
            }
            .into())
        }
    };

    let mut field_config = JsonMap::new();
    field_config.insert("type".to_owned(), json!(ty));
    for key in ["resolver", "description"] {
        if let Some(value) = config.get(key) {
            field_config.insert(key.to_owned(), value.clone());
        }
    }
    Field::new(
        &format!("{name}{arguments}"),
        FieldConfig::Map(field_config),
        resolvers,
    )
}
