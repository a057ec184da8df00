use serde_json::Value as JsonValue;

use crate::error::SingleSchemaBuildError;
use crate::resolver::CallableRegistry;

const SEPARATOR: &str = "::";

/// A `[class, method]` pair exactly as it appeared in configuration. Nothing is known about whether
/// it names a real callable until it is turned into a [`ResolverReference`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolverPair {
    pub class: String,
    pub method: String,
}

impl ResolverPair {
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Accepts `null` (no resolver) or an array of exactly two strings. The error is a description
    /// of what was wrong with the shape.
    pub fn from_json(value: &JsonValue) -> Result<Option<Self>, String> {
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::Array(items) => match items.as_slice() {
                [JsonValue::String(class), JsonValue::String(method)] => {
                    Ok(Some(Self::new(class.as_str(), method.as_str())))
                }
                [_, _] => Err("both elements must be strings".to_owned()),
                _ => Err(format!(
                    "expected exactly two elements, found {}",
                    items.len()
                )),
            },
            other => Err(format!(
                "expected null or a [class, method] pair, found {}",
                json_kind(other)
            )),
        }
    }
}

impl From<&ResolverReference> for ResolverPair {
    fn from(reference: &ResolverReference) -> Self {
        Self::new(reference.class.as_str(), reference.method.as_str())
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// A verified pointer to a callable in a [`CallableRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
#[display(fmt = "{}::{}", class, method)]
pub struct ResolverReference {
    class: String,
    method: String,
}

impl ResolverReference {
    pub fn new(
        class: &str,
        method: &str,
        callables: &CallableRegistry,
    ) -> Result<Self, SingleSchemaBuildError> {
        let callable = format!("{class}{SEPARATOR}{method}");
        if class.is_empty() || method.is_empty() {
            return Err(SingleSchemaBuildError::UnresolvableCallable {
                callable,
                message: "class and method must both be non-empty".to_owned(),
            });
        }
        if class.contains(SEPARATOR) || method.contains(SEPARATOR) {
            return Err(SingleSchemaBuildError::UnresolvableCallable {
                callable,
                message: format!("class and method must not contain \"{SEPARATOR}\""),
            });
        }
        if !callables.contains(class, method) {
            let message = if callables.has_class(class) {
                format!("class \"{class}\" has no callable method \"{method}\"")
            } else {
                format!("class \"{class}\" does not exist")
            };
            return Err(SingleSchemaBuildError::UnresolvableCallable { callable, message });
        }
        Ok(Self {
            class: class.to_owned(),
            method: method.to_owned(),
        })
    }

    /// Parses the `Class::method` form.
    pub fn parse(
        callable: &str,
        callables: &CallableRegistry,
    ) -> Result<Self, SingleSchemaBuildError> {
        let parts = callable.split(SEPARATOR).collect::<Vec<_>>();
        match parts.as_slice() {
            [class, method] if !class.is_empty() && !method.is_empty() => {
                Self::new(class, method, callables)
            }
            _ => Err(SingleSchemaBuildError::UnresolvableCallable {
                callable: callable.to_owned(),
                message: format!("expected the form \"Class{SEPARATOR}method\""),
            }),
        }
    }

    pub fn from_pair(
        pair: &ResolverPair,
        callables: &CallableRegistry,
    ) -> Result<Self, SingleSchemaBuildError> {
        Self::new(&pair.class, &pair.method, callables)
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn to_array(&self) -> [String; 2] {
        [self.class.clone(), self.method.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::resolver::SourceValue;
    use serde_json::json;

    fn callables() -> CallableRegistry {
        let mut callables = CallableRegistry::default();
        callables.register("App\\Resolvers", "resolvePosts", |_, _, _, _| {
            SourceValue::null()
        });
        callables
    }

    #[test]
    fn string_and_array_forms_round_trip() {
        let callables = callables();
        let reference = ResolverReference::new("App\\Resolvers", "resolvePosts", &callables).unwrap();
        assert_eq!(reference.to_string(), "App\\Resolvers::resolvePosts");
        let reparsed = ResolverReference::parse(&reference.to_string(), &callables).unwrap();
        assert_eq!(reparsed.to_array(), reference.to_array());
        let [class, method] = reference.to_array();
        assert_eq!(
            ResolverReference::new(&class, &method, &callables)
                .unwrap()
                .to_string(),
            reference.to_string()
        );
    }

    #[test]
    fn rejects_malformed_strings() {
        let callables = callables();
        for input in ["resolvePosts", "::resolvePosts", "App::", "A::b::c", ""] {
            let err = ResolverReference::parse(input, &callables).unwrap_err();
            assert_eq!(err.code(), ErrorCode::UnresolvableCallable, "{input}");
        }
    }

    #[test]
    fn rejects_unknown_callables() {
        let callables = callables();
        let err = ResolverReference::new("App\\Resolvers", "nope", &callables).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Callable \"App\\Resolvers::nope\" cannot be resolved: class \"App\\Resolvers\" has no callable method \"nope\""
        );
        let err = ResolverReference::parse("Missing::resolve", &callables).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Callable \"Missing::resolve\" cannot be resolved: class \"Missing\" does not exist"
        );
    }

    #[test]
    fn pair_shapes_from_config() {
        assert_eq!(ResolverPair::from_json(&json!(null)), Ok(None));
        assert_eq!(
            ResolverPair::from_json(&json!(["A", "b"])),
            Ok(Some(ResolverPair::new("A", "b")))
        );
        assert!(ResolverPair::from_json(&json!(["A"])).is_err());
        assert!(ResolverPair::from_json(&json!(["A", "b", "c"])).is_err());
        assert!(ResolverPair::from_json(&json!(["A", 1])).is_err());
        assert!(ResolverPair::from_json(&json!("A::b")).is_err());
    }
}
