//! Adapters that expose data-layer classes as schema metadata.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::SingleSchemaBuildError;
use crate::resolver::{ResolverPair, DEFAULT_RESOLVER_CLASS, DEFAULT_RESOLVER_METHOD};

pub mod catalog;
pub mod operations;

pub use catalog::{DataObjectCatalog, DataObjectClass, DbFieldType, FieldAccessor};
pub use operations::{OperationCreator, OperationRegistry, OperationRoot};

/// What schema assembly needs to know about the class backing a type.
pub trait SchemaModel: Debug + Send + Sync {
    fn has_field(&self, field: &str) -> bool;

    fn type_for_field(&self, field: &str) -> Option<String>;

    fn all_fields(&self) -> IndexMap<String, String>;

    fn default_resolver(&self) -> ResolverPair;

    fn source_class(&self) -> &str;

    fn type_name(&self) -> String;

    fn default_fields(&self) -> IndexMap<String, String>;

    fn operation_creator(
        &self,
        identifier: &str,
        config: &JsonMap<String, JsonValue>,
    ) -> Result<Arc<dyn OperationCreator>, SingleSchemaBuildError>;
}

/// A [`SchemaModel`] for one data object class.
#[derive(Debug, Clone)]
pub struct DataObjectModel {
    class: String,
    accessor: Arc<dyn FieldAccessor>,
    operations: Arc<OperationRegistry>,
    default_resolver: ResolverPair,
}

impl DataObjectModel {
    pub fn new(
        class: impl Into<String>,
        accessor: Arc<dyn FieldAccessor>,
        operations: Arc<OperationRegistry>,
    ) -> Result<Self, SingleSchemaBuildError> {
        let class = class.into();
        if !accessor.is_data_object(&class) {
            return Err(SingleSchemaBuildError::NotADataObject { class_name: class });
        }
        Ok(Self {
            class,
            accessor,
            operations,
            default_resolver: ResolverPair::new(DEFAULT_RESOLVER_CLASS, DEFAULT_RESOLVER_METHOD),
        })
    }

    pub fn with_default_resolver(mut self, resolver: ResolverPair) -> Self {
        self.default_resolver = resolver;
        self
    }

    pub fn get_operation_creator_by_identifier(
        &self,
        identifier: &str,
        config: &JsonMap<String, JsonValue>,
    ) -> Result<Arc<dyn OperationCreator>, SingleSchemaBuildError> {
        self.operations
            .get_operation_creator_by_identifier(identifier, config)
    }
}

impl SchemaModel for DataObjectModel {
    fn has_field(&self, field: &str) -> bool {
        self.accessor.has_field(&self.class, field)
    }

    fn type_for_field(&self, field: &str) -> Option<String> {
        self.accessor.type_for_field(&self.class, field)
    }

    fn all_fields(&self) -> IndexMap<String, String> {
        self.accessor.all_fields(&self.class)
    }

    fn default_resolver(&self) -> ResolverPair {
        self.default_resolver.clone()
    }

    fn source_class(&self) -> &str {
        &self.class
    }

    fn type_name(&self) -> String {
        class_basename(&self.class).to_owned()
    }

    fn default_fields(&self) -> IndexMap<String, String> {
        IndexMap::from([("id".to_owned(), "ID".to_owned())])
    }

    fn operation_creator(
        &self,
        identifier: &str,
        config: &JsonMap<String, JsonValue>,
    ) -> Result<Arc<dyn OperationCreator>, SingleSchemaBuildError> {
        self.get_operation_creator_by_identifier(identifier, config)
    }
}

/// The class name without its namespace: `App\Model\BlogPost` becomes `BlogPost`.
pub fn class_basename(class: &str) -> &str {
    class.rsplit('\\').next().unwrap_or(class)
}
