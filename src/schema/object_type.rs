use std::sync::Arc;

use apollo_compiler::ast::{Definition, Document, ObjectTypeDefinition};
use apollo_compiler::Name;
use apollo_compiler::Node;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{MultipleSchemaBuildErrors, SchemaBuildError, SingleSchemaBuildError};
use crate::resolver::ResolverRegistry;
use crate::schema::encoded::EncodedResolver;
use crate::schema::field::{Field, FieldConfig};

/// Collects the fields of one object type and turns them into a type definition plus the resolver
/// bound to each field.
#[derive(Debug, Clone)]
pub struct ObjectType {
    name: String,
    description: Option<String>,
    fields: IndexMap<String, Field>,
    resolvers: Arc<ResolverRegistry>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>, resolvers: Arc<ResolverRegistry>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            resolvers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self
    }

    pub fn resolvers(&self) -> &Arc<ResolverRegistry> {
        &self.resolvers
    }

    /// Adds a field. If a field with the same name exists, the new field's arguments are merged
    /// into it instead.
    pub fn add_field(&mut self, field: Field) -> &mut Self {
        match self.fields.entry(field.name().to_owned()) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().merge_with(&field);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(field);
            }
        }
        self
    }

    pub fn create_field(
        &mut self,
        definition: &str,
        config: impl Into<FieldConfig>,
    ) -> Result<&mut Self, SchemaBuildError> {
        let field = Field::new(definition, config, self.resolvers.clone())?;
        Ok(self.add_field(field))
    }

    /// Adds every entry of a `definition -> config` mapping, reporting all failures together.
    pub fn add_fields_from_json(
        &mut self,
        fields: &JsonMap<String, JsonValue>,
    ) -> Result<&mut Self, SchemaBuildError> {
        let mut errors = MultipleSchemaBuildErrors::new();
        for (definition, config) in fields {
            let Some(config) = FieldConfig::from_json(config.clone()) else {
                errors.push(
                    SingleSchemaBuildError::InvalidConfigValue {
                        location: self.location(),
                        key: definition.clone(),
                        message: "expected a type string or a mapping".to_owned(),
                    }
                    .into(),
                );
                continue;
            };
            if let Err(err) = self.create_field(definition, config) {
                errors.push(err);
            }
        }
        errors.into_result()?;
        Ok(self)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        self.fields.shift_remove(name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Validates and encodes every field. Nothing is returned unless all fields succeed; every
    /// failure is included in the error.
    pub fn build(&self) -> Result<BuiltObjectType, SchemaBuildError> {
        let mut errors = MultipleSchemaBuildErrors::new();
        let name = Name::new(&self.name).map_err(|_| SingleSchemaBuildError::InvalidConfigValue {
            location: self.location(),
            key: "name".to_owned(),
            message: format!("\"{}\" is not a valid type name", self.name),
        });
        if let Err(err) = &name {
            errors.push(err.clone().into());
        }
        if self.fields.is_empty() {
            errors.push(
                SingleSchemaBuildError::InvalidConfigValue {
                    location: self.location(),
                    key: "fields".to_owned(),
                    message: "an object type needs at least one field".to_owned(),
                }
                .into(),
            );
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        let mut resolvers = IndexMap::with_capacity(self.fields.len());
        for field in self.fields.values() {
            let built = field.to_field_definition().and_then(|definition| {
                Ok((definition, field.encoded_resolver(&self.name)?))
            });
            match built {
                Ok((definition, resolver)) => {
                    fields.push(Node::new(definition));
                    resolvers.insert(field.name().to_owned(), resolver);
                }
                Err(err) => errors.push(err),
            }
        }
        errors.into_result()?;
        let name = name?;

        tracing::debug!("Built object type {} with {} field(s)", self.name, fields.len());
        Ok(BuiltObjectType {
            definition: ObjectTypeDefinition {
                description: self.description.as_deref().map(Node::new_str),
                name,
                implements_interfaces: Vec::new(),
                directives: Default::default(),
                fields,
            },
            resolvers,
        })
    }

    fn location(&self) -> String {
        format!("type \"{}\"", self.name)
    }
}

/// The encoded form of an [`ObjectType`].
#[derive(Debug, Clone)]
pub struct BuiltObjectType {
    pub definition: ObjectTypeDefinition,
    /// Field name to resolver, in field order.
    pub resolvers: IndexMap<String, EncodedResolver>,
}

impl BuiltObjectType {
    pub fn resolver(&self, field_name: &str) -> Option<&EncodedResolver> {
        self.resolvers.get(field_name)
    }

    pub fn to_sdl(&self) -> String {
        let mut document = Document::new();
        document
            .definitions
            .push(Definition::ObjectTypeDefinition(Node::new(self.definition.clone())));
        document.to_string()
    }
}
