use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{MultipleSchemaBuildErrors, SchemaBuildError};
use crate::model::{OperationRoot, SchemaModel};
use crate::resolver::ResolverRegistry;
use crate::schema::field::{Field, FieldConfig};
use crate::schema::object_type::{BuiltObjectType, ObjectType};

/// An object type whose fields come from a [`SchemaModel`].
///
/// Fields added here get their type from the model when the configuration leaves it out, and
/// fall back to the model's default resolver. The model's default fields are always present.
/// Operations (`read`, `delete`, ...) produce root fields that are kept apart from the type's own
/// fields and can be added to the query and mutation types.
#[derive(Debug, Clone)]
pub struct ModelType {
    model: Arc<dyn SchemaModel>,
    object_type: ObjectType,
    operations: IndexMap<String, (OperationRoot, Field)>,
}

impl ModelType {
    pub fn new(
        model: Arc<dyn SchemaModel>,
        resolvers: Arc<ResolverRegistry>,
    ) -> Result<Self, SchemaBuildError> {
        let mut model_type = Self {
            object_type: ObjectType::new(model.type_name(), resolvers),
            model,
            operations: IndexMap::new(),
        };
        for (name, ty) in model_type.model.default_fields() {
            model_type.add_field(&name, ty)?;
        }
        Ok(model_type)
    }

    pub fn model(&self) -> &dyn SchemaModel {
        self.model.as_ref()
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    pub fn object_type_mut(&mut self) -> &mut ObjectType {
        &mut self.object_type
    }

    /// Adds a field, filling in its type from the model when the configuration leaves it out.
    /// The model's default resolver is installed unless the configuration has a
    /// `defaultResolver` entry, an explicit `null` included.
    pub fn add_field(
        &mut self,
        definition: &str,
        config: impl Into<FieldConfig>,
    ) -> Result<&mut Self, SchemaBuildError> {
        let config = config.into();
        let explicit_default =
            matches!(&config, FieldConfig::Map(map) if map.contains_key("defaultResolver"));
        let mut field = Field::new(definition, config, self.object_type.resolvers().clone())?;
        if field.ty().map_or(true, |ty| ty.is_empty()) {
            if let Some(ty) = self.model.type_for_field(field.name()) {
                field.set_type(ty);
            }
        }
        if !explicit_default && field.default_resolver().is_none() {
            field.set_default_resolver(Some(self.model.default_resolver()));
        }
        self.object_type.add_field(field);
        Ok(self)
    }

    /// Adds fields by name, reporting all failures together.
    pub fn add_fields<'a>(
        &mut self,
        definitions: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, SchemaBuildError> {
        let errors = definitions
            .into_iter()
            .filter_map(|definition| self.add_field(definition, FieldConfig::default()).err())
            .collect::<MultipleSchemaBuildErrors>();
        errors.into_result()?;
        Ok(self)
    }

    /// Adds every field the model knows a type for that is not already present.
    pub fn add_all_fields(&mut self) -> Result<&mut Self, SchemaBuildError> {
        let missing = self
            .model
            .all_fields()
            .into_iter()
            .filter(|(name, _)| !self.object_type.has_field(name))
            .collect::<Vec<_>>();
        for (name, ty) in missing {
            self.add_field(&name, ty)?;
        }
        Ok(self)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        self.object_type.remove_field(name)
    }

    /// Creates the root field for an operation through the model's operation creators.
    pub fn add_operation(
        &mut self,
        identifier: &str,
        config: &JsonMap<String, JsonValue>,
    ) -> Result<&mut Self, SchemaBuildError> {
        let creator = self.model.operation_creator(identifier, config)?;
        let field = creator.create_operation(
            self.model.as_ref(),
            config,
            self.object_type.resolvers().clone(),
        )?;
        tracing::debug!(
            "Added {} operation {} for {}",
            creator.root(),
            field.name(),
            self.object_type.name()
        );
        self.operations
            .insert(identifier.to_owned(), (creator.root(), field));
        Ok(self)
    }

    pub fn operation(&self, identifier: &str) -> Option<&Field> {
        self.operations.get(identifier).map(|(_, field)| field)
    }

    pub fn operations(&self, root: OperationRoot) -> impl Iterator<Item = &Field> {
        self.operations
            .values()
            .filter(move |(field_root, _)| *field_root == root)
            .map(|(_, field)| field)
    }

    /// Adds the operation fields to the root types they belong on.
    pub fn apply_operations(&self, query: &mut ObjectType, mutation: &mut ObjectType) {
        for (root, field) in self.operations.values() {
            match root {
                OperationRoot::Query => query.add_field(field.clone()),
                OperationRoot::Mutation => mutation.add_field(field.clone()),
            };
        }
    }

    pub fn build(&self) -> Result<BuiltObjectType, SchemaBuildError> {
        self.object_type.build()
    }
}
