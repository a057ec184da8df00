use std::fmt::{Display, Formatter};

use apollo_compiler::ast::Type;
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::SingleSchemaBuildError;
use crate::resolver::{CallableRegistry, ResolveInfo, ResolverReference, SourceValue};

/// A type reference that has already been parsed and can be embedded into a schema as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedType(Type);

impl EncodedType {
    pub fn new(ty: Type) -> Self {
        Self(ty)
    }

    pub fn ty(&self) -> &Type {
        &self.0
    }

    pub fn into_inner(self) -> Type {
        self.0
    }

    /// The innermost named type, with all list and non-null wrappers removed.
    pub fn named_type(&self) -> &str {
        self.0.inner_named_type().as_str()
    }

    pub fn is_non_null(&self) -> bool {
        self.0.is_non_null()
    }

    pub fn is_list(&self) -> bool {
        self.0.is_list()
    }
}

impl Display for EncodedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Type> for EncodedType {
    fn from(ty: Type) -> Self {
        Self(ty)
    }
}

/// A resolver binding ready for execution: the verified callable plus the context entries that
/// are handed to it on every invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedResolver {
    reference: ResolverReference,
    context: IndexMap<String, JsonValue>,
}

impl EncodedResolver {
    pub fn new(reference: ResolverReference) -> Self {
        Self {
            reference,
            context: IndexMap::new(),
        }
    }

    pub fn reference(&self) -> &ResolverReference {
        &self.reference
    }

    pub fn context(&self) -> &IndexMap<String, JsonValue> {
        &self.context
    }

    pub fn add_context(&mut self, key: impl Into<String>, value: JsonValue) -> &mut Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Calls the bound callable for one field of one parent value.
    pub fn invoke(
        &self,
        callables: &CallableRegistry,
        source: &SourceValue,
        args: &JsonMap<String, JsonValue>,
        context: &JsonValue,
        parent_type: &str,
        field_name: &str,
    ) -> Result<SourceValue, SingleSchemaBuildError> {
        let Some(callable) = callables.get(self.reference.class(), self.reference.method()) else {
            return Err(SingleSchemaBuildError::UnresolvableCallable {
                callable: self.reference.to_string(),
                message: "not present in the callable registry used for execution".to_owned(),
            });
        };
        let info = ResolveInfo {
            parent_type: parent_type.to_owned(),
            field_name: field_name.to_owned(),
            resolver_context: self.context.clone(),
        };
        Ok(callable(source, args, context, &info))
    }
}

impl Display for EncodedResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reference)
    }
}
