use apollo_compiler::ast::{FloatValue, InputValueDefinition, IntValue, Value};
use apollo_compiler::Name;
use apollo_compiler::Node;
use itertools::Itertools;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::SingleSchemaBuildError;
use crate::parser::ArgumentDefinition;
use crate::schema::encoded::EncodedType;
use crate::schema::type_reference::FieldType;

pub const ARGUMENT_CONFIG_KEYS: &[&str] = &["type", "defaultValue", "description"];

/// How an argument is configured: just a type, or a mapping with any of
/// [`ARGUMENT_CONFIG_KEYS`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentConfig {
    Type(FieldType),
    Map(JsonMap<String, JsonValue>),
}

impl From<&str> for ArgumentConfig {
    fn from(value: &str) -> Self {
        ArgumentConfig::Type(value.into())
    }
}

impl From<FieldType> for ArgumentConfig {
    fn from(value: FieldType) -> Self {
        ArgumentConfig::Type(value)
    }
}

impl From<EncodedType> for ArgumentConfig {
    fn from(value: EncodedType) -> Self {
        ArgumentConfig::Type(value.into())
    }
}

impl From<JsonMap<String, JsonValue>> for ArgumentConfig {
    fn from(value: JsonMap<String, JsonValue>) -> Self {
        ArgumentConfig::Map(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    name: String,
    ty: Option<FieldType>,
    default_value: Option<Value>,
    description: Option<String>,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty.into()),
            default_value: None,
            description: None,
        }
    }

    /// Builds an argument from configuration. `field` is the owning field's name and only used to
    /// give errors a location.
    pub fn from_config(
        name: &str,
        config: ArgumentConfig,
        field: &str,
    ) -> Result<Self, SingleSchemaBuildError> {
        let mut argument = Self {
            name: name.to_owned(),
            ty: None,
            default_value: None,
            description: None,
        };
        argument.apply_config(config, field)?;
        Ok(argument)
    }

    /// Applies configuration on top of what is already set. Keys absent from a mapping leave the
    /// corresponding attribute untouched.
    pub fn apply_config(
        &mut self,
        config: ArgumentConfig,
        field: &str,
    ) -> Result<(), SingleSchemaBuildError> {
        let map = match config {
            ArgumentConfig::Type(ty) => {
                self.ty = Some(ty);
                return Ok(());
            }
            ArgumentConfig::Map(map) => map,
        };
        let location = self.location(field);
        if let Some(key) = map
            .keys()
            .find(|key| !ARGUMENT_CONFIG_KEYS.contains(&key.as_str()))
        {
            return Err(SingleSchemaBuildError::UnrecognizedConfigKey {
                location,
                key: key.clone(),
                expected: ARGUMENT_CONFIG_KEYS.iter().join(", "),
            });
        }
        let invalid = |key: &str, message: String| SingleSchemaBuildError::InvalidConfigValue {
            location: location.clone(),
            key: key.to_owned(),
            message,
        };
        for (key, value) in &map {
            match (key.as_str(), value) {
                ("type", JsonValue::String(ty)) => self.ty = Some(ty.as_str().into()),
                ("type", _) => return Err(invalid(key, "expected a type string".to_owned())),
                ("defaultValue", JsonValue::Null) => self.default_value = None,
                ("defaultValue", value) => {
                    self.default_value = Some(json_to_value(value).map_err(|m| invalid(key, m))?)
                }
                ("description", JsonValue::String(description)) => {
                    self.description = Some(description.clone())
                }
                ("description", JsonValue::Null) => self.description = None,
                ("description", _) => return Err(invalid(key, "expected a string".to_owned())),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> Option<&FieldType> {
        self.ty.as_ref()
    }

    pub fn set_type(&mut self, ty: impl Into<FieldType>) -> &mut Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn set_default_value(&mut self, default_value: Option<Value>) -> &mut Self {
        self.default_value = default_value;
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self
    }

    pub fn encoded_type(&self, field: &str) -> Result<EncodedType, SingleSchemaBuildError> {
        let location = self.location(field);
        match &self.ty {
            Some(ty) => ty.encode(&location),
            None => Err(SingleSchemaBuildError::MissingType {
                location,
                reason: None,
            }),
        }
    }

    pub fn to_input_value_definition(
        &self,
        field: &str,
    ) -> Result<InputValueDefinition, SingleSchemaBuildError> {
        let ty = self.encoded_type(field)?;
        let name = Name::new(&self.name).map_err(|_| SingleSchemaBuildError::InvalidConfigValue {
            location: format!("field \"{field}\""),
            key: "args".to_owned(),
            message: format!("\"{}\" is not a valid argument name", self.name),
        })?;
        Ok(InputValueDefinition {
            description: self.description.as_deref().map(Node::new_str),
            name,
            ty: Node::new(ty.into_inner()),
            default_value: self.default_value.clone().map(Node::new),
            directives: Default::default(),
        })
    }

    fn location(&self, field: &str) -> String {
        format!("argument \"{}\" of field \"{field}\"", self.name)
    }
}

impl From<ArgumentDefinition> for Argument {
    fn from(definition: ArgumentDefinition) -> Self {
        Self {
            name: definition.name.to_string(),
            ty: Some(FieldType::Encoded(EncodedType::new(definition.ty))),
            default_value: definition.default_value,
            description: None,
        }
    }
}

/// Converts a JSON default into a GraphQL constant value. Strings stay strings; there is no way to
/// spell an enum literal in JSON.
pub(crate) fn json_to_value(value: &JsonValue) -> Result<Value, String> {
    Ok(match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) if n.is_f64() => Value::Float(FloatValue::new_parsed(&n.to_string())),
        JsonValue::Number(n) => Value::Int(IntValue::new_parsed(&n.to_string())),
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(
            items
                .iter()
                .map(|item| json_to_value(item).map(Node::new))
                .collect::<Result<_, _>>()?,
        ),
        JsonValue::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| -> Result<(Name, Node<Value>), String> {
                    let name = Name::new(key)
                        .map_err(|_| format!("\"{key}\" is not a valid input field name"))?;
                    Ok((name, Node::new(json_to_value(item)?)))
                })
                .collect::<Result<_, _>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn map(value: JsonValue) -> ArgumentConfig {
        match value {
            JsonValue::Object(map) => ArgumentConfig::Map(map),
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn builds_from_type_string() {
        let argument = Argument::from_config("limit", "Int".into(), "posts").unwrap();
        assert_eq!(argument.encoded_type("posts").unwrap().to_string(), "Int");
        assert!(argument.default_value().is_none());
    }

    #[test]
    fn builds_from_mapping() {
        let argument = Argument::from_config(
            "sort",
            map(json!({ "type": "[String!]", "defaultValue": ["title"], "description": "Sort order" })),
            "posts",
        )
        .unwrap();
        assert_eq!(argument.description(), Some("Sort order"));
        assert_eq!(
            argument.default_value(),
            Some(&Value::List(vec![Node::new(Value::String("title".to_owned()))]))
        );
        let definition = argument.to_input_value_definition("posts").unwrap();
        assert_eq!(definition.name.as_str(), "sort");
        assert_eq!(definition.ty.to_string(), "[String!]");
    }

    #[test]
    fn partial_mapping_keeps_existing_type() {
        let mut argument = Argument::new("limit", "Int");
        argument
            .apply_config(map(json!({ "defaultValue": 10 })), "posts")
            .unwrap();
        assert_eq!(argument.encoded_type("posts").unwrap().to_string(), "Int");
        assert_eq!(
            argument.default_value(),
            Some(&Value::Int(IntValue::new_parsed("10")))
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Argument::from_config("limit", map(json!({ "typ": "Int" })), "posts").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnrecognizedConfigKey);
        assert_eq!(
            err.to_string(),
            "Unrecognized config key \"typ\" for argument \"limit\" of field \"posts\" (expected one of: type, defaultValue, description)"
        );
    }

    #[test]
    fn missing_type_is_reported_on_encode() {
        let argument =
            Argument::from_config("limit", map(json!({ "description": "How many" })), "posts")
                .unwrap();
        let err = argument.encoded_type("posts").unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingType);
        assert_eq!(
            err.to_string(),
            "Missing type for argument \"limit\" of field \"posts\""
        );
    }

    #[test]
    fn converts_json_defaults() {
        assert_eq!(json_to_value(&json!(true)).unwrap(), Value::Boolean(true));
        assert!(matches!(json_to_value(&json!(1.5)).unwrap(), Value::Float(_)));
        assert!(matches!(
            json_to_value(&json!({ "a": [1, null] })).unwrap(),
            Value::Object(fields) if fields.len() == 1
        ));
        assert!(json_to_value(&json!({ "not valid": 1 })).is_err());
    }
}
