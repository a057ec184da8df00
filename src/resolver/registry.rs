use std::sync::Arc;

use enum_dispatch::enum_dispatch;
use indexmap::IndexMap;

use crate::error::SingleSchemaBuildError;
use crate::resolver::{
    CallableRegistry, ResolverReference, DEFAULT_RESOLVER_CLASS, DEFAULT_RESOLVER_METHOD,
};
use crate::utils::upper_first;

/// The question asked of the registry for a single field.
#[derive(Debug, Clone, Copy)]
pub struct ResolverLookup<'a> {
    pub type_name: &'a str,
    pub field_name: &'a str,
    /// The field's own default resolver, if it has one.
    pub field_default: Option<&'a ResolverReference>,
}

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
pub enum ResolverTier {
    #[strum(to_string = "explicit")]
    Explicit,
    #[strum(to_string = "convention")]
    Convention,
    #[strum(to_string = "field default")]
    FieldDefault,
    #[strum(to_string = "type default")]
    TypeDefault,
    #[strum(to_string = "global default")]
    GlobalDefault,
}

#[derive(Debug, Clone, Default)]
struct RegistryTables {
    fields: IndexMap<(String, String), ResolverReference>,
    types: IndexMap<String, ResolverReference>,
    resolver_classes: Vec<String>,
    global_default: Option<ResolverReference>,
}

#[enum_dispatch]
trait ResolverStrategy {
    fn tier(&self) -> ResolverTier;

    fn lookup(
        &self,
        lookup: &ResolverLookup<'_>,
        tables: &RegistryTables,
        callables: &CallableRegistry,
    ) -> Option<ResolverReference>;
}

#[derive(Debug, Clone)]
struct ExplicitFieldStrategy;

impl ResolverStrategy for ExplicitFieldStrategy {
    fn tier(&self) -> ResolverTier {
        ResolverTier::Explicit
    }

    fn lookup(
        &self,
        lookup: &ResolverLookup<'_>,
        tables: &RegistryTables,
        _callables: &CallableRegistry,
    ) -> Option<ResolverReference> {
        tables
            .fields
            .get(&(lookup.type_name.to_owned(), lookup.field_name.to_owned()))
            .cloned()
    }
}

/// Looks for `resolve<Type><Field>` and then `resolve<Field>` on each resolver class, in
/// registration order.
#[derive(Debug, Clone)]
struct ConventionStrategy;

impl ResolverStrategy for ConventionStrategy {
    fn tier(&self) -> ResolverTier {
        ResolverTier::Convention
    }

    fn lookup(
        &self,
        lookup: &ResolverLookup<'_>,
        tables: &RegistryTables,
        callables: &CallableRegistry,
    ) -> Option<ResolverReference> {
        let candidates = [
            format!(
                "resolve{}{}",
                upper_first(lookup.type_name),
                upper_first(lookup.field_name)
            ),
            format!("resolve{}", upper_first(lookup.field_name)),
        ];
        find_on_resolver_classes(&candidates, tables, callables)
    }
}

#[derive(Debug, Clone)]
struct FieldDefaultStrategy;

impl ResolverStrategy for FieldDefaultStrategy {
    fn tier(&self) -> ResolverTier {
        ResolverTier::FieldDefault
    }

    fn lookup(
        &self,
        lookup: &ResolverLookup<'_>,
        _tables: &RegistryTables,
        _callables: &CallableRegistry,
    ) -> Option<ResolverReference> {
        lookup.field_default.cloned()
    }
}

/// An explicit per-type registration, then `resolve<Type>` on the resolver classes.
#[derive(Debug, Clone)]
struct TypeDefaultStrategy;

impl ResolverStrategy for TypeDefaultStrategy {
    fn tier(&self) -> ResolverTier {
        ResolverTier::TypeDefault
    }

    fn lookup(
        &self,
        lookup: &ResolverLookup<'_>,
        tables: &RegistryTables,
        callables: &CallableRegistry,
    ) -> Option<ResolverReference> {
        if let Some(reference) = tables.types.get(lookup.type_name) {
            return Some(reference.clone());
        }
        let candidates = [format!("resolve{}", upper_first(lookup.type_name))];
        find_on_resolver_classes(&candidates, tables, callables)
    }
}

#[derive(Debug, Clone)]
struct GlobalDefaultStrategy;

impl ResolverStrategy for GlobalDefaultStrategy {
    fn tier(&self) -> ResolverTier {
        ResolverTier::GlobalDefault
    }

    fn lookup(
        &self,
        _lookup: &ResolverLookup<'_>,
        tables: &RegistryTables,
        _callables: &CallableRegistry,
    ) -> Option<ResolverReference> {
        tables.global_default.clone()
    }
}

#[enum_dispatch(ResolverStrategy)]
#[derive(Debug, Clone)]
enum ResolverStrategyEnum {
    ExplicitFieldStrategy,
    ConventionStrategy,
    FieldDefaultStrategy,
    TypeDefaultStrategy,
    GlobalDefaultStrategy,
}

fn find_on_resolver_classes(
    methods: &[String],
    tables: &RegistryTables,
    callables: &CallableRegistry,
) -> Option<ResolverReference> {
    tables.resolver_classes.iter().find_map(|class| {
        methods
            .iter()
            .find_map(|method| ResolverReference::new(class, method, callables).ok())
    })
}

/// Maps `(type, field)` to the resolver that computes the field's value.
///
/// Lookups walk a fixed list of tiers and the first hit wins:
/// 1. a resolver registered for exactly this type and field;
/// 2. a conventionally named method on a registered resolver class
///    (`resolve<Type><Field>`, then `resolve<Field>`);
/// 3. the field's own default resolver;
/// 4. a default registered for the type, or `resolve<Type>` on a resolver class;
/// 5. the registry-wide default, which starts out as the default field resolver.
///
/// Registration happens while the registry is being set up. Fields only ever read from it.
#[derive(Debug, Clone)]
pub struct ResolverRegistry {
    callables: Arc<CallableRegistry>,
    tables: RegistryTables,
    strategies: Vec<ResolverStrategyEnum>,
}

impl ResolverRegistry {
    pub fn new(callables: Arc<CallableRegistry>) -> Self {
        let global_default =
            ResolverReference::new(DEFAULT_RESOLVER_CLASS, DEFAULT_RESOLVER_METHOD, &callables)
                .ok();
        Self {
            callables,
            tables: RegistryTables {
                global_default,
                ..Default::default()
            },
            strategies: vec![
                ExplicitFieldStrategy.into(),
                ConventionStrategy.into(),
                FieldDefaultStrategy.into(),
                TypeDefaultStrategy.into(),
                GlobalDefaultStrategy.into(),
            ],
        }
    }

    pub fn callables(&self) -> &CallableRegistry {
        &self.callables
    }

    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        reference: ResolverReference,
    ) -> &mut Self {
        self.tables
            .fields
            .insert((type_name.into(), field_name.into()), reference);
        self
    }

    /// Registers a resolver given in `Class::method` form.
    pub fn register_callable(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        callable: &str,
    ) -> Result<&mut Self, SingleSchemaBuildError> {
        let reference = ResolverReference::parse(callable, &self.callables)?;
        Ok(self.register(type_name, field_name, reference))
    }

    pub fn register_type_default(
        &mut self,
        type_name: impl Into<String>,
        reference: ResolverReference,
    ) -> &mut Self {
        self.tables.types.insert(type_name.into(), reference);
        self
    }

    /// Adds a class whose conventionally named methods are considered during lookup. Classes are
    /// consulted in the order they were added.
    pub fn add_resolver_class(&mut self, class: impl Into<String>) -> &mut Self {
        let class = class.into();
        if !self.tables.resolver_classes.contains(&class) {
            self.tables.resolver_classes.push(class);
        }
        self
    }

    pub fn set_global_default(&mut self, reference: Option<ResolverReference>) -> &mut Self {
        self.tables.global_default = reference;
        self
    }

    pub fn global_default(&self) -> Option<&ResolverReference> {
        self.tables.global_default.as_ref()
    }

    pub fn find_resolver(
        &self,
        type_name: &str,
        field_name: &str,
        field_default: Option<&ResolverReference>,
    ) -> Result<ResolverReference, SingleSchemaBuildError> {
        self.find_resolver_with_tier(type_name, field_name, field_default)
            .map(|(_, reference)| reference)
    }

    /// Same as [`ResolverRegistry::find_resolver`], also reporting which tier matched.
    pub fn find_resolver_with_tier(
        &self,
        type_name: &str,
        field_name: &str,
        field_default: Option<&ResolverReference>,
    ) -> Result<(ResolverTier, ResolverReference), SingleSchemaBuildError> {
        let lookup = ResolverLookup {
            type_name,
            field_name,
            field_default,
        };
        for strategy in &self.strategies {
            match strategy.lookup(&lookup, &self.tables, &self.callables) {
                Some(reference) => {
                    tracing::debug!(
                        "Resolved {type_name}.{field_name} to {reference} ({} tier)",
                        strategy.tier()
                    );
                    return Ok((strategy.tier(), reference));
                }
                None => {
                    tracing::trace!(
                        "No {} resolver for {type_name}.{field_name}",
                        strategy.tier()
                    );
                }
            }
        }
        Err(SingleSchemaBuildError::NoResolverFound {
            type_name: type_name.to_owned(),
            field_name: field_name.to_owned(),
        })
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new(Arc::new(CallableRegistry::default()))
    }
}
