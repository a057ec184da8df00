//! Builds GraphQL object types from compact field definitions and configuration.
//!
//! A [`Field`] is created from a definition such as `posts(limit: Int = 10)` plus configuration
//! naming its type, extra arguments and resolver. Fields are collected into an [`ObjectType`]
//! (or a [`ModelType`] backed by data-layer metadata) and built into an
//! `apollo_compiler` type definition together with the resolver bound to each field.
//!
//! ```
//! use std::sync::Arc;
//! use apollo_schema_builder::{ObjectType, ResolverRegistry};
//!
//! let mut post = ObjectType::new("Post", Arc::new(ResolverRegistry::default()));
//! post.create_field("title", "String!").unwrap();
//! post.create_field("comments(limit: Int = 10)", "[Comment!]!").unwrap();
//! let built = post.build().unwrap();
//! assert!(built.to_sdl().contains("comments(limit: Int = 10): [Comment!]!"));
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod schema;
pub(crate) mod utils;

pub use error::{ErrorCode, MultipleSchemaBuildErrors, SchemaBuildError, SingleSchemaBuildError};
pub use model::{DataObjectCatalog, DataObjectModel, OperationRegistry, SchemaModel};
pub use resolver::{
    default_field_resolver, CallableRegistry, ResolveInfo, ResolverPair, ResolverReference,
    ResolverRegistry, SourceValue,
};
pub use schema::{
    Argument, ArgumentConfig, BuiltObjectType, EncodedResolver, EncodedType, Field, FieldConfig,
    FieldType, ModelType, ObjectType, TypeReference,
};
