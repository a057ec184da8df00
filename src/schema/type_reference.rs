use apollo_compiler::ast::Type;

use crate::error::SingleSchemaBuildError;
use crate::parser::{self, ParseError};
use crate::schema::encoded::EncodedType;

/// A type written in GraphQL syntax, e.g. `[String!]!`, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    type_string: String,
}

impl TypeReference {
    pub fn new(type_string: impl Into<String>) -> Self {
        Self {
            type_string: type_string.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.type_string
    }

    pub fn is_empty(&self) -> bool {
        self.type_string.trim().is_empty()
    }

    /// Parses the type string. Non-null binds tightest, so `[String!]!` is a non-null list of
    /// non-null `String`s.
    pub fn to_ast(&self) -> Result<Type, ParseError> {
        parser::parse_type(&self.type_string)
    }

    /// Parses the type string, reporting failures against `location` (e.g. `field "posts"`).
    pub fn encode(&self, location: &str) -> Result<EncodedType, SingleSchemaBuildError> {
        self.to_ast()
            .map(EncodedType::new)
            .map_err(|err| SingleSchemaBuildError::InvalidTypeSyntax {
                location: location.to_owned(),
                type_string: self.type_string.clone(),
                message: err.to_string(),
            })
    }
}

impl From<&str> for TypeReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A field or argument type as configured: either a type string still to be parsed, or an
/// already encoded type that is used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Named(String),
    Encoded(EncodedType),
}

impl FieldType {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldType::Named(type_string) => type_string.trim().is_empty(),
            FieldType::Encoded(_) => false,
        }
    }

    pub fn encode(&self, location: &str) -> Result<EncodedType, SingleSchemaBuildError> {
        match self {
            FieldType::Encoded(encoded) => Ok(encoded.clone()),
            FieldType::Named(_) if self.is_empty() => Err(SingleSchemaBuildError::MissingType {
                location: location.to_owned(),
                reason: None,
            }),
            FieldType::Named(type_string) => TypeReference::new(type_string.as_str()).encode(location),
        }
    }
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        FieldType::Named(value.to_owned())
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        FieldType::Named(value)
    }
}

impl From<EncodedType> for FieldType {
    fn from(value: EncodedType) -> Self {
        FieldType::Encoded(value)
    }
}

impl From<Type> for FieldType {
    fn from(value: Type) -> Self {
        FieldType::Encoded(EncodedType::new(value))
    }
}
