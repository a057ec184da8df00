use std::sync::Arc;

use apollo_compiler::ast::FieldDefinition;
use apollo_compiler::Name;
use apollo_compiler::Node;
use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{MultipleSchemaBuildErrors, SchemaBuildError, SingleSchemaBuildError};
use crate::parser;
use crate::resolver::{ResolverPair, ResolverReference, ResolverRegistry};
use crate::schema::argument::{Argument, ArgumentConfig};
use crate::schema::encoded::{EncodedResolver, EncodedType};
use crate::schema::type_reference::FieldType;

pub const FIELD_CONFIG_KEYS: &[&str] = &[
    "type",
    "args",
    "description",
    "resolver",
    "resolverContext",
    "defaultResolver",
];

/// The configuration a field is created from.
#[derive(Debug, Clone)]
pub enum FieldConfig {
    /// Shorthand for a mapping with only `type` set.
    Type(FieldType),
    /// A mapping with any of [`FIELD_CONFIG_KEYS`].
    Map(JsonMap<String, JsonValue>),
    /// Another field whose arguments are merged into the new one.
    Template(Box<Field>),
}

impl FieldConfig {
    /// Interprets a configuration value: `null` is an empty mapping, a string is a type and an
    /// object is a mapping. Anything else is not a field configuration.
    pub fn from_json(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => Some(FieldConfig::default()),
            JsonValue::String(ty) => Some(FieldConfig::Type(ty.into())),
            JsonValue::Object(map) => Some(FieldConfig::Map(map)),
            _ => None,
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig::Map(JsonMap::new())
    }
}

impl From<&str> for FieldConfig {
    fn from(value: &str) -> Self {
        FieldConfig::Type(value.into())
    }
}

impl From<String> for FieldConfig {
    fn from(value: String) -> Self {
        FieldConfig::Type(value.into())
    }
}

impl From<FieldType> for FieldConfig {
    fn from(value: FieldType) -> Self {
        FieldConfig::Type(value)
    }
}

impl From<EncodedType> for FieldConfig {
    fn from(value: EncodedType) -> Self {
        FieldConfig::Type(value.into())
    }
}

impl From<JsonMap<String, JsonValue>> for FieldConfig {
    fn from(value: JsonMap<String, JsonValue>) -> Self {
        FieldConfig::Map(value)
    }
}

impl From<Field> for FieldConfig {
    fn from(value: Field) -> Self {
        FieldConfig::Template(Box::new(value))
    }
}

/// A single field of an object type: its name, type, arguments and how it gets resolved.
///
/// Fields are created from a compact definition (`posts` or `posts(limit: Int, offset: Int)`) plus
/// configuration, may be adjusted and merged while the schema is being assembled, and are then
/// validated and encoded.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    definition: String,
    args: IndexMap<String, Argument>,
    ty: Option<FieldType>,
    description: Option<String>,
    resolver: Option<ResolverPair>,
    default_resolver: Option<ResolverPair>,
    resolver_context: IndexMap<String, JsonValue>,
    resolvers: Arc<ResolverRegistry>,
}

impl Field {
    pub fn new(
        definition: &str,
        config: impl Into<FieldConfig>,
        resolvers: Arc<ResolverRegistry>,
    ) -> Result<Self, SchemaBuildError> {
        let (name, args) = Self::parse_name(definition)?;
        let mut field = Self {
            name,
            definition: definition.to_owned(),
            args,
            ty: None,
            description: None,
            resolver: None,
            default_resolver: None,
            resolver_context: IndexMap::new(),
            resolvers,
        };
        field.apply_config(config.into())?;
        tracing::debug!(
            "Built field {} from \"{definition}\" with {} argument(s)",
            field.name,
            field.args.len()
        );
        Ok(field)
    }

    /// Splits a compact definition into the field name and its inline arguments.
    pub fn parse_name(
        definition: &str,
    ) -> Result<(String, IndexMap<String, Argument>), SingleSchemaBuildError> {
        let (name, arguments) = parser::parse_field_definition(definition).map_err(|err| {
            SingleSchemaBuildError::MalformedDefinition {
                definition: definition.to_owned(),
                message: err.to_string(),
            }
        })?;
        let args = arguments
            .into_iter()
            .map(|argument| (argument.name.to_string(), Argument::from(argument)))
            .collect();
        Ok((name.to_string(), args))
    }

    pub fn apply_config(&mut self, config: FieldConfig) -> Result<&mut Self, SchemaBuildError> {
        match config {
            FieldConfig::Type(ty) => {
                self.ty = Some(ty);
            }
            FieldConfig::Template(template) => {
                self.merge_with(&template);
            }
            FieldConfig::Map(map) => {
                self.apply_config_map(&map)?;
            }
        }
        Ok(self)
    }

    fn apply_config_map(&mut self, map: &JsonMap<String, JsonValue>) -> Result<(), SchemaBuildError> {
        let location = self.location();
        MultipleSchemaBuildErrors::from_iter(
            map.keys()
                .filter(|key| !FIELD_CONFIG_KEYS.contains(&key.as_str()))
                .map(|key| SingleSchemaBuildError::UnrecognizedConfigKey {
                    location: location.clone(),
                    key: key.clone(),
                    expected: FIELD_CONFIG_KEYS.iter().join(", "),
                }),
        )
        .into_result()?;

        let invalid = |key: &str, message: &str| -> SchemaBuildError {
            SingleSchemaBuildError::InvalidConfigValue {
                location: location.clone(),
                key: key.to_owned(),
                message: message.to_owned(),
            }
            .into()
        };
        let mut errors = MultipleSchemaBuildErrors::new();
        for (key, value) in map {
            let result = match (key.as_str(), value) {
                ("type", JsonValue::String(ty)) => {
                    self.ty = Some(ty.as_str().into());
                    Ok(())
                }
                ("type", _) => Err(invalid(key, "expected a type string")),
                ("args", JsonValue::Object(args)) => self.apply_args(args),
                ("args", JsonValue::Null) => Ok(()),
                ("args", _) => Err(invalid(key, "expected a mapping of argument names")),
                ("description", JsonValue::String(description)) => {
                    self.description = Some(description.clone());
                    Ok(())
                }
                ("description", JsonValue::Null) => {
                    self.description = None;
                    Ok(())
                }
                ("description", _) => Err(invalid(key, "expected a string")),
                ("resolver", value) => self
                    .resolver_pair(key, value)
                    .map(|pair| self.resolver = pair),
                ("defaultResolver", value) => self
                    .resolver_pair(key, value)
                    .map(|pair| self.default_resolver = pair),
                ("resolverContext", JsonValue::Object(context)) => {
                    for (context_key, context_value) in context {
                        self.add_resolver_context(context_key.as_str(), context_value.clone());
                    }
                    Ok(())
                }
                ("resolverContext", JsonValue::Null) => Ok(()),
                ("resolverContext", _) => Err(invalid(key, "expected a mapping")),
                _ => Ok(()),
            };
            if let Err(err) = result {
                errors.push(err);
            }
        }
        errors.into_result()
    }

    fn resolver_pair(
        &self,
        key: &str,
        value: &JsonValue,
    ) -> Result<Option<ResolverPair>, SchemaBuildError> {
        ResolverPair::from_json(value).map_err(|message| {
            SingleSchemaBuildError::InvalidResolverShape {
                field: self.name.clone(),
                key: key.to_owned(),
                message,
            }
            .into()
        })
    }

    /// Applies an `args` mapping. A value of `false` removes the argument, any other value adds it
    /// or updates the existing argument of that name.
    pub fn apply_args(&mut self, args: &JsonMap<String, JsonValue>) -> Result<(), SchemaBuildError> {
        let mut errors = MultipleSchemaBuildErrors::new();
        for (name, value) in args {
            let config = match value {
                JsonValue::Bool(false) => {
                    self.args.shift_remove(name);
                    continue;
                }
                JsonValue::String(ty) => ArgumentConfig::Type(ty.as_str().into()),
                JsonValue::Object(map) => ArgumentConfig::Map(map.clone()),
                _ => {
                    errors.push(
                        SingleSchemaBuildError::InvalidConfigValue {
                            location: self.location(),
                            key: "args".to_owned(),
                            message: format!(
                                "argument \"{name}\" must be a type string, a mapping or false"
                            ),
                        }
                        .into(),
                    );
                    continue;
                }
            };
            if let Err(err) = self.add_arg(name, config) {
                errors.push(err.into());
            }
        }
        errors.into_result()
    }

    /// Adds an argument, or updates the existing one with the same name.
    pub fn add_arg(
        &mut self,
        name: &str,
        config: impl Into<ArgumentConfig>,
    ) -> Result<&mut Self, SingleSchemaBuildError> {
        if !parser::is_valid_name(name) {
            return Err(SingleSchemaBuildError::InvalidConfigValue {
                location: self.location(),
                key: "args".to_owned(),
                message: format!("\"{name}\" is not a valid argument name"),
            });
        }
        match self.args.get_mut(name) {
            Some(existing) => existing.apply_config(config.into(), &self.name)?,
            None => {
                let argument = Argument::from_config(name, config.into(), &self.name)?;
                self.args.insert(name.to_owned(), argument);
            }
        }
        Ok(self)
    }

    /// Adds an argument, replacing any existing one with the same name.
    pub fn add_argument(&mut self, argument: Argument) -> &mut Self {
        self.args.insert(argument.name().to_owned(), argument);
        self
    }

    pub fn remove_arg(&mut self, name: &str) -> Option<Argument> {
        self.args.shift_remove(name)
    }

    /// Takes over all arguments of `other`, replacing same-named ones. Type, description and
    /// resolvers are left alone.
    pub fn merge_with(&mut self, other: &Field) -> &mut Self {
        for (name, argument) in &other.args {
            self.args.insert(name.clone(), argument.clone());
        }
        self
    }

    /// Checks everything needed to encode the field, reporting every problem found. A field type
    /// that cannot be encoded, unparsable strings included, is reported as a missing type.
    pub fn validate(&self) -> Result<(), SchemaBuildError> {
        let mut errors = MultipleSchemaBuildErrors::new();
        match self.encoded_type() {
            Ok(_) => {}
            Err(SingleSchemaBuildError::InvalidTypeSyntax {
                type_string,
                message,
                ..
            }) => errors.push(
                SingleSchemaBuildError::MissingType {
                    location: self.location(),
                    reason: Some(format!("\"{type_string}\" does not parse, {message}")),
                }
                .into(),
            ),
            Err(err) => errors.push(err.into()),
        }
        for argument in self.args.values() {
            if let Err(err) = argument.to_input_value_definition(&self.name) {
                errors.push(err.into());
            }
        }
        for pair in [&self.resolver, &self.default_resolver].into_iter().flatten() {
            if let Err(err) = ResolverReference::from_pair(pair, self.resolvers.callables()) {
                errors.push(err.into());
            }
        }
        errors.into_result()
    }

    pub fn encoded_type(&self) -> Result<EncodedType, SingleSchemaBuildError> {
        match &self.ty {
            Some(ty) => ty.encode(&self.location()),
            None => Err(SingleSchemaBuildError::MissingType {
                location: self.location(),
                reason: None,
            }),
        }
    }

    /// The resolver for this field on `owner_type`, carrying the field's resolver context. An
    /// explicitly set resolver is used directly, otherwise the resolver registry decides.
    pub fn encoded_resolver(&self, owner_type: &str) -> Result<EncodedResolver, SingleSchemaBuildError> {
        let callables = self.resolvers.callables();
        let reference = match &self.resolver {
            Some(pair) => ResolverReference::from_pair(pair, callables)?,
            None => {
                let field_default = self
                    .default_resolver
                    .as_ref()
                    .map(|pair| ResolverReference::from_pair(pair, callables))
                    .transpose()?;
                self.resolvers
                    .find_resolver(owner_type, &self.name, field_default.as_ref())?
            }
        };
        let mut encoded = EncodedResolver::new(reference);
        for (key, value) in &self.resolver_context {
            encoded.add_context(key.as_str(), value.clone());
        }
        Ok(encoded)
    }

    pub fn to_field_definition(&self) -> Result<FieldDefinition, SchemaBuildError> {
        self.validate()?;
        let name = Name::new(&self.name).map_err(|_| SingleSchemaBuildError::MalformedDefinition {
            definition: self.definition.clone(),
            message: format!("\"{}\" is not a valid field name", self.name),
        })?;
        let arguments = self
            .args
            .values()
            .map(|argument| argument.to_input_value_definition(&self.name).map(Node::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldDefinition {
            description: self.description.as_deref().map(Node::new_str),
            name,
            arguments,
            ty: self.encoded_type()?.into_inner(),
            directives: Default::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compact definition the field was created from.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn args(&self) -> &IndexMap<String, Argument> {
        &self.args
    }

    pub fn arg_list(&self) -> Vec<&Argument> {
        self.args.values().collect()
    }

    pub fn arg(&self, name: &str) -> Option<&Argument> {
        self.args.get(name)
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    pub fn ty(&self) -> Option<&FieldType> {
        self.ty.as_ref()
    }

    pub fn set_type(&mut self, ty: impl Into<FieldType>) -> &mut Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self
    }

    pub fn resolver(&self) -> Option<&ResolverPair> {
        self.resolver.as_ref()
    }

    pub fn set_resolver(&mut self, resolver: Option<ResolverPair>) -> &mut Self {
        self.resolver = resolver;
        self
    }

    pub fn default_resolver(&self) -> Option<&ResolverPair> {
        self.default_resolver.as_ref()
    }

    pub fn set_default_resolver(&mut self, resolver: Option<ResolverPair>) -> &mut Self {
        self.default_resolver = resolver;
        self
    }

    pub fn resolver_context(&self) -> &IndexMap<String, JsonValue> {
        &self.resolver_context
    }

    pub fn add_resolver_context(&mut self, key: impl Into<String>, value: JsonValue) -> &mut Self {
        self.resolver_context.insert(key.into(), value);
        self
    }

    pub fn resolvers(&self) -> &Arc<ResolverRegistry> {
        &self.resolvers
    }

    fn location(&self) -> String {
        format!("field \"{}\"", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::resolver::{CallableRegistry, SourceValue};
    use serde_json::json;

    fn registry() -> Arc<ResolverRegistry> {
        let mut callables = CallableRegistry::default();
        callables
            .register("Posts", "resolve", |_, _, _, _| SourceValue::null())
            .register("Posts", "fallback", |_, _, _, _| SourceValue::null());
        Arc::new(ResolverRegistry::new(Arc::new(callables)))
    }

    fn config(value: JsonValue) -> FieldConfig {
        FieldConfig::from_json(value).unwrap()
    }

    #[test]
    fn parse_name_yields_inline_arguments() {
        let (name, args) = Field::parse_name("posts(limit: Int!)").unwrap();
        assert_eq!(name, "posts");
        let limit = args.get("limit").unwrap();
        assert!(matches!(limit.ty(), Some(FieldType::Encoded(_))));
        assert_eq!(limit.encoded_type("posts").unwrap().to_string(), "Int!");
    }

    #[test]
    fn malformed_definitions_name_the_source() {
        let err = Field::new("posts(limit Int)", "String", registry()).unwrap_err();
        assert!(err.has_code(ErrorCode::MalformedDefinition));
        assert_eq!(
            err.to_string(),
            "Malformed field definition \"posts(limit Int)\": unexpected \"I\" at column 13"
        );
    }

    #[test]
    fn type_name_config_is_shorthand() {
        let field = Field::new("title", "String!", registry()).unwrap();
        assert_eq!(field.encoded_type().unwrap().to_string(), "String!");
        assert!(field.validate().is_ok());
    }

    #[test]
    fn full_config_is_applied() {
        let field = Field::new(
            "posts",
            config(json!({
                "type": "[Post]",
                "args": { "limit": "Int", "sort": { "type": "String", "defaultValue": "title" } },
                "description": "All posts",
                "resolver": ["Posts", "resolve"],
                "resolverContext": { "table": "posts" },
            })),
            registry(),
        )
        .unwrap();
        assert_eq!(field.description(), Some("All posts"));
        assert_eq!(field.arg_list().len(), 2);
        assert_eq!(field.resolver(), Some(&ResolverPair::new("Posts", "resolve")));
        let resolver = field.encoded_resolver("Query").unwrap();
        assert_eq!(resolver.to_string(), "Posts::resolve");
        assert_eq!(resolver.context().get("table"), Some(&json!("posts")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Field::new("posts", config(json!({ "typpo": "String" })), registry()).unwrap_err();
        assert_eq!(err.codes(), vec![ErrorCode::UnrecognizedConfigKey]);
    }

    #[test]
    fn resolver_shapes_are_checked() {
        for resolver in [json!(["Posts"]), json!("Posts::resolve"), json!(["Posts", "a", "b"])] {
            let err = Field::new(
                "posts",
                config(json!({ "type": "String", "resolver": resolver })),
                registry(),
            )
            .unwrap_err();
            assert_eq!(err.codes(), vec![ErrorCode::InvalidResolverShape]);
        }
        let err = Field::new(
            "posts",
            config(json!({ "type": "String", "defaultResolver": 1 })),
            registry(),
        )
        .unwrap_err();
        assert_eq!(err.codes(), vec![ErrorCode::InvalidResolverShape]);
        let field = Field::new(
            "posts",
            config(json!({ "type": "String", "resolver": null })),
            registry(),
        )
        .unwrap();
        assert!(field.resolver().is_none());
    }

    #[test]
    fn false_removes_arguments() {
        let mut field = Field::new("posts(limit: Int, offset: Int)", "[Post]", registry()).unwrap();
        let args = json!({ "limit": false, "filter": "String" });
        field.apply_args(args.as_object().unwrap()).unwrap();
        let names = field.args().keys().cloned().collect::<Vec<_>>();
        assert_eq!(names, ["offset", "filter"]);
    }

    #[test]
    fn add_arg_upserts() {
        let mut field = Field::new("posts", "[Post]", registry()).unwrap();
        field.add_arg("limit", "Int").unwrap();
        field.add_arg("limit", "Int!").unwrap();
        assert_eq!(field.arg_list().len(), 1);
        assert_eq!(
            field.arg("limit").unwrap().encoded_type("posts").unwrap().to_string(),
            "Int!"
        );
        assert!(field.add_arg("not valid", "Int").is_err());
    }

    #[test]
    fn merge_overwrites_overlapping_arguments() {
        let mut target = Field::new("posts(b: Int, c: Int)", "[Post]", registry()).unwrap();
        let other = Field::new("posts(a: String, b: String)", "[Page]", registry()).unwrap();
        target.merge_with(&other);
        let mut names = target.args().keys().cloned().collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(
            target.arg("b").unwrap().encoded_type("posts").unwrap().to_string(),
            "String"
        );
        // the type is not merged
        assert_eq!(target.encoded_type().unwrap().to_string(), "[Post]");
    }

    #[test]
    fn template_config_merges_arguments_only() {
        let template = Field::new("posts(limit: Int)", "[Post]", registry()).unwrap();
        let field = Field::new("posts(offset: Int)", template, registry()).unwrap();
        assert!(field.has_arg("limit"));
        assert!(field.has_arg("offset"));
        assert!(field.ty().is_none());
    }

    #[test]
    fn validate_reports_missing_and_invalid_types() {
        let field = Field::new("posts", FieldConfig::default(), registry()).unwrap();
        let err = field.validate().unwrap_err();
        assert_eq!(err.codes(), vec![ErrorCode::MissingType]);

        let field = Field::new("posts", "", registry()).unwrap();
        assert_eq!(field.validate().unwrap_err().codes(), vec![ErrorCode::MissingType]);

        let field = Field::new("posts", "[Post", registry()).unwrap();
        assert_eq!(
            field.encoded_type().unwrap_err().code(),
            ErrorCode::InvalidTypeSyntax
        );
        let err = field.validate().unwrap_err();
        assert_eq!(err.codes(), vec![ErrorCode::MissingType]);
        assert!(err.to_string().contains("\"[Post\" does not parse"));
    }

    #[test]
    fn validate_checks_resolver_targets() {
        let field = Field::new(
            "posts",
            config(json!({
                "type": "[Post]",
                "resolver": ["Posts", "missing"],
                "defaultResolver": ["Nope", "resolve"],
            })),
            registry(),
        )
        .unwrap();
        let err = field.validate().unwrap_err();
        assert_eq!(
            err.codes(),
            vec![ErrorCode::UnresolvableCallable, ErrorCode::UnresolvableCallable]
        );
    }

    #[test]
    fn resolver_precedence_without_explicit_resolver() {
        let mut field = Field::new("posts", "[Post]", registry()).unwrap();
        assert_eq!(
            field.encoded_resolver("Query").unwrap().to_string(),
            "DefaultResolver::defaultFieldResolver"
        );
        field.set_default_resolver(Some(ResolverPair::new("Posts", "fallback")));
        assert_eq!(
            field.encoded_resolver("Query").unwrap().to_string(),
            "Posts::fallback"
        );
        field.set_resolver(Some(ResolverPair::new("Posts", "resolve")));
        assert_eq!(
            field.encoded_resolver("Query").unwrap().to_string(),
            "Posts::resolve"
        );
    }

    #[test]
    fn resolver_context_is_kept_in_insertion_order() {
        let mut field = Field::new("posts", "[Post]", registry()).unwrap();
        field
            .add_resolver_context("b", json!(1))
            .add_resolver_context("a", json!(2));
        let resolver = field.encoded_resolver("Query").unwrap();
        let keys = resolver.context().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn encodes_field_definition() {
        let field = Field::new(
            "posts(limit: Int = 10)",
            config(json!({ "type": "[Post!]!", "description": "All posts" })),
            registry(),
        )
        .unwrap();
        let definition = field.to_field_definition().unwrap();
        assert_eq!(definition.name.as_str(), "posts");
        assert_eq!(definition.ty.to_string(), "[Post!]!");
        assert_eq!(definition.arguments.len(), 1);
        assert_eq!(definition.arguments[0].name.as_str(), "limit");
        assert!(definition.arguments[0].default_value.is_some());
    }
}
