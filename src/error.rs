use std::fmt::{Display, Formatter, Write};

// Stable machine-readable names for each kind of build error. Kept separate from the error enum so
// callers can group or filter errors without matching on every struct variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MalformedDefinition,
    UnrecognizedConfigKey,
    InvalidConfigValue,
    InvalidResolverShape,
    MissingType,
    InvalidTypeSyntax,
    UnresolvableCallable,
    NoResolverFound,
    NotADataObject,
    UnknownOperationCreator,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SingleSchemaBuildError {
    #[error("Malformed field definition \"{definition}\": {message}")]
    MalformedDefinition { definition: String, message: String },
    #[error("Unrecognized config key \"{key}\" for {location} (expected one of: {expected})")]
    UnrecognizedConfigKey {
        location: String,
        key: String,
        expected: String,
    },
    #[error("Invalid value for config key \"{key}\" of {location}: {message}")]
    InvalidConfigValue {
        location: String,
        key: String,
        message: String,
    },
    #[error("Invalid \"{key}\" for field \"{field}\": {message}")]
    InvalidResolverShape {
        field: String,
        key: String,
        message: String,
    },
    #[error(
        "Missing type for {location}{}",
        .reason.as_deref().map(|reason| format!(": {reason}")).unwrap_or_default()
    )]
    MissingType {
        location: String,
        reason: Option<String>,
    },
    #[error("Invalid type \"{type_string}\" for {location}: {message}")]
    InvalidTypeSyntax {
        location: String,
        type_string: String,
        message: String,
    },
    #[error("Callable \"{callable}\" cannot be resolved: {message}")]
    UnresolvableCallable { callable: String, message: String },
    #[error("No resolver found for \"{type_name}.{field_name}\"")]
    NoResolverFound {
        type_name: String,
        field_name: String,
    },
    #[error("Class \"{class_name}\" is not a data object")]
    NotADataObject { class_name: String },
    #[error("Unknown operation creator \"{identifier}\": {message}")]
    UnknownOperationCreator { identifier: String, message: String },
}

impl SingleSchemaBuildError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SingleSchemaBuildError::MalformedDefinition { .. } => ErrorCode::MalformedDefinition,
            SingleSchemaBuildError::UnrecognizedConfigKey { .. } => {
                ErrorCode::UnrecognizedConfigKey
            }
            SingleSchemaBuildError::InvalidConfigValue { .. } => ErrorCode::InvalidConfigValue,
            SingleSchemaBuildError::InvalidResolverShape { .. } => ErrorCode::InvalidResolverShape,
            SingleSchemaBuildError::MissingType { .. } => ErrorCode::MissingType,
            SingleSchemaBuildError::InvalidTypeSyntax { .. } => ErrorCode::InvalidTypeSyntax,
            SingleSchemaBuildError::UnresolvableCallable { .. } => ErrorCode::UnresolvableCallable,
            SingleSchemaBuildError::NoResolverFound { .. } => ErrorCode::NoResolverFound,
            SingleSchemaBuildError::NotADataObject { .. } => ErrorCode::NotADataObject,
            SingleSchemaBuildError::UnknownOperationCreator { .. } => {
                ErrorCode::UnknownOperationCreator
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
pub struct MultipleSchemaBuildErrors {
    pub errors: Vec<SingleSchemaBuildError>,
}

impl MultipleSchemaBuildErrors {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    pub fn push(&mut self, error: SchemaBuildError) {
        match error {
            SchemaBuildError::Single(error) => self.errors.push(error),
            SchemaBuildError::Multiple(errors) => self.errors.extend(errors.errors),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `Ok(())` when nothing was collected, otherwise the collected errors. A single
    /// collected error is returned unwrapped.
    pub fn into_result(mut self) -> Result<(), SchemaBuildError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0).into()),
            _ => Err(SchemaBuildError::Multiple(self)),
        }
    }
}

impl Display for MultipleSchemaBuildErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "The following errors occurred:")?;
        for error in &self.errors {
            write!(f, "\n\n  - ")?;
            for c in error.to_string().chars() {
                if c == '\n' {
                    write!(f, "\n    ")?;
                } else {
                    f.write_char(c)?;
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<SingleSchemaBuildError> for MultipleSchemaBuildErrors {
    fn from_iter<T: IntoIterator<Item = SingleSchemaBuildError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<SchemaBuildError> for MultipleSchemaBuildErrors {
    fn from_iter<T: IntoIterator<Item = SchemaBuildError>>(iter: T) -> Self {
        let mut errors = MultipleSchemaBuildErrors::new();
        for error in iter {
            errors.push(error);
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaBuildError {
    #[error(transparent)]
    Single(#[from] SingleSchemaBuildError),
    #[error(transparent)]
    Multiple(#[from] MultipleSchemaBuildErrors),
}

impl SchemaBuildError {
    pub fn errors(&self) -> Vec<&SingleSchemaBuildError> {
        match self {
            SchemaBuildError::Single(error) => vec![error],
            SchemaBuildError::Multiple(errors) => errors.errors.iter().collect(),
        }
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors().into_iter().map(|e| e.code()).collect()
    }

    /// True if any of the underlying errors has the given code.
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors().into_iter().any(|e| e.code() == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_render_in_screaming_snake_case() {
        let codes = ErrorCode::iter().map(|c| c.to_string()).collect::<Vec<_>>();
        assert!(codes.contains(&"MALFORMED_DEFINITION".to_owned()));
        assert!(codes.contains(&"NO_RESOLVER_FOUND".to_owned()));
        assert_eq!(codes.len(), 10);
    }

    #[test]
    fn into_result_unwraps_single_error() {
        let errors = MultipleSchemaBuildErrors::from_iter([SingleSchemaBuildError::MissingType {
            location: "field \"posts\"".to_owned(),
            reason: None,
        }]);
        let err = errors.into_result().unwrap_err();
        assert!(matches!(
            err,
            SchemaBuildError::Single(SingleSchemaBuildError::MissingType { .. })
        ));
        assert!(MultipleSchemaBuildErrors::new().into_result().is_ok());
    }

    #[test]
    fn multiple_errors_are_flattened_and_listed() {
        let mut errors = MultipleSchemaBuildErrors::new();
        errors.push(
            SingleSchemaBuildError::MissingType {
                location: "field \"a\"".to_owned(),
                reason: None,
            }
            .into(),
        );
        errors.push(
            MultipleSchemaBuildErrors::from_iter([
                SingleSchemaBuildError::MissingType {
                    location: "field \"b\"".to_owned(),
                    reason: None,
                },
                SingleSchemaBuildError::NotADataObject {
                    class_name: "Foo".to_owned(),
                },
            ])
            .into(),
        );
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.errors().len(), 3);
        assert!(err.has_code(ErrorCode::NotADataObject));
        insta::assert_snapshot!(err, @r###"
        The following errors occurred:

          - Missing type for field "a"

          - Missing type for field "b"

          - Class "Foo" is not a data object
        "###);
    }
}
