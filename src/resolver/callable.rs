use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::resolver::{
    default_field_resolver, ResolveInfo, ResolverFn, SourceValue, DEFAULT_RESOLVER_CLASS,
    DEFAULT_RESOLVER_METHOD,
};

/// The set of callables a schema may bind its fields to, keyed by class and method.
///
/// Resolver references are only ever constructed against this registry, so a reference that
/// exists always names something that can be invoked.
#[derive(Clone)]
pub struct CallableRegistry {
    callables: IndexMap<(String, String), ResolverFn>,
}

impl CallableRegistry {
    /// An empty registry. Note that most callers want [`CallableRegistry::default`], which has
    /// the default field resolver registered.
    pub fn empty() -> Self {
        Self {
            callables: IndexMap::new(),
        }
    }

    pub fn register(
        &mut self,
        class: impl Into<String>,
        method: impl Into<String>,
        callable: impl Fn(&SourceValue, &JsonMap<String, JsonValue>, &JsonValue, &ResolveInfo) -> SourceValue
            + Send
            + Sync
            + 'static,
    ) -> &mut Self {
        self.callables
            .insert((class.into(), method.into()), Arc::new(callable));
        self
    }

    pub fn get(&self, class: &str, method: &str) -> Option<&ResolverFn> {
        self.callables.get(&(class.to_owned(), method.to_owned()))
    }

    pub fn contains(&self, class: &str, method: &str) -> bool {
        self.get(class, method).is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.callables.keys().any(|(c, _)| c == class)
    }
}

impl Default for CallableRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            DEFAULT_RESOLVER_CLASS,
            DEFAULT_RESOLVER_METHOD,
            default_field_resolver,
        );
        registry
    }
}

impl Debug for CallableRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(
                self.callables
                    .keys()
                    .map(|(class, method)| format!("{class}::{method}")),
            )
            .finish()
    }
}
