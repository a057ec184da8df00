use std::collections::HashSet;
use std::fmt::Debug;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::model::class_basename;
use crate::utils::upper_first;

/// Read access to data-layer metadata: which classes are data objects and which fields they
/// expose. Field names may be given in their data-layer spelling (`Title`) or their GraphQL
/// spelling (`title`).
pub trait FieldAccessor: Debug + Send + Sync {
    fn is_data_object(&self, class: &str) -> bool;

    fn has_field(&self, class: &str, field: &str) -> bool;

    /// The GraphQL type of a field, or `None` if the field is unknown or has no GraphQL
    /// counterpart.
    fn type_for_field(&self, class: &str, field: &str) -> Option<String>;

    /// Every field with a known GraphQL type, keyed by GraphQL field name.
    fn all_fields(&self, class: &str) -> IndexMap<String, String>;
}

/// Storage type of a database column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, strum_macros::Display)]
pub enum DbFieldType {
    Varchar,
    Text,
    #[serde(rename = "HTMLText")]
    #[strum(serialize = "HTMLText")]
    HtmlText,
    Enum,
    Date,
    Datetime,
    Time,
    Int,
    BigInt,
    Boolean,
    Float,
    Decimal,
    Currency,
    PrimaryKey,
    ForeignKey,
    /// A column type defined by the application, exposed as `graphql_type` if set.
    Custom {
        #[serde(default)]
        graphql_type: Option<String>,
    },
}

impl DbFieldType {
    pub fn graphql_type(&self) -> Option<&str> {
        Some(match self {
            DbFieldType::Varchar
            | DbFieldType::Text
            | DbFieldType::HtmlText
            | DbFieldType::Enum
            | DbFieldType::Date
            | DbFieldType::Datetime
            | DbFieldType::Time => "String",
            DbFieldType::Int | DbFieldType::BigInt => "Int",
            DbFieldType::Boolean => "Boolean",
            DbFieldType::Float | DbFieldType::Decimal | DbFieldType::Currency => "Float",
            DbFieldType::PrimaryKey | DbFieldType::ForeignKey => "ID",
            DbFieldType::Custom { graphql_type } => return graphql_type.as_deref(),
        })
    }
}

/// Metadata of one data object class. Fields of `parent` are inherited.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataObjectClass {
    pub parent: Option<String>,
    pub db: IndexMap<String, DbFieldType>,
    pub has_one: IndexMap<String, String>,
    pub has_many: IndexMap<String, String>,
}

impl DataObjectClass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn db(mut self, name: impl Into<String>, ty: DbFieldType) -> Self {
        self.db.insert(name.into(), ty);
        self
    }

    pub fn has_one(mut self, name: impl Into<String>, class: impl Into<String>) -> Self {
        self.has_one.insert(name.into(), class.into());
        self
    }

    pub fn has_many(mut self, name: impl Into<String>, class: impl Into<String>) -> Self {
        self.has_many.insert(name.into(), class.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CatalogField {
    Column(DbFieldType),
    HasOne(String),
    HasMany(String),
}

impl CatalogField {
    fn graphql_type(&self) -> Option<String> {
        match self {
            CatalogField::Column(ty) => ty.graphql_type().map(str::to_owned),
            CatalogField::HasOne(class) => Some(class_basename(class).to_owned()),
            CatalogField::HasMany(class) => Some(format!("[{}]", class_basename(class))),
        }
    }
}

/// In-memory [`FieldAccessor`] over a set of class definitions, typically deserialized from JSON.
///
/// Every data object implicitly has `ID`, `ClassName`, `Created` and `LastEdited` columns, and
/// every `has_one` relation `Foo` implies a `FooID` foreign key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DataObjectCatalog {
    classes: IndexMap<String, DataObjectClass>,
}

impl DataObjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, name: impl Into<String>, class: DataObjectClass) -> &mut Self {
        self.classes.insert(name.into(), class);
        self
    }

    pub fn class(&self, name: &str) -> Option<&DataObjectClass> {
        self.classes.get(name)
    }

    /// The class and its ancestors, root first. Unknown parents end the chain.
    fn ancestry(&self, name: &str) -> Vec<&DataObjectClass> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name);
        while let Some(name) = current {
            if !seen.insert(name) {
                break;
            }
            let Some(class) = self.classes.get(name) else {
                break;
            };
            chain.push(class);
            current = class.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// All fields of a class in data-layer spelling, implicit ones first.
    fn fields(&self, name: &str) -> IndexMap<String, CatalogField> {
        let mut fields = IndexMap::new();
        if !self.classes.contains_key(name) {
            return fields;
        }
        fields.insert("ID".to_owned(), CatalogField::Column(DbFieldType::PrimaryKey));
        fields.insert("ClassName".to_owned(), CatalogField::Column(DbFieldType::Varchar));
        fields.insert("Created".to_owned(), CatalogField::Column(DbFieldType::Datetime));
        fields.insert("LastEdited".to_owned(), CatalogField::Column(DbFieldType::Datetime));
        for class in self.ancestry(name) {
            for (column, ty) in &class.db {
                fields.insert(column.clone(), CatalogField::Column(ty.clone()));
            }
            for (relation, related) in &class.has_one {
                fields.insert(format!("{relation}ID"), CatalogField::Column(DbFieldType::ForeignKey));
                fields.insert(relation.clone(), CatalogField::HasOne(related.clone()));
            }
            for (relation, related) in &class.has_many {
                fields.insert(relation.clone(), CatalogField::HasMany(related.clone()));
            }
        }
        fields
    }

    fn find_field(&self, class: &str, field: &str) -> Option<CatalogField> {
        let wanted = upper_first(field);
        self.fields(class)
            .into_iter()
            .find(|(name, _)| name == field || *name == wanted || graphql_field_name(name) == field)
            .map(|(_, field)| field)
    }
}

impl FieldAccessor for DataObjectCatalog {
    fn is_data_object(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    fn has_field(&self, class: &str, field: &str) -> bool {
        self.find_field(class, field).is_some()
    }

    fn type_for_field(&self, class: &str, field: &str) -> Option<String> {
        self.find_field(class, field)?.graphql_type()
    }

    fn all_fields(&self, class: &str) -> IndexMap<String, String> {
        self.fields(class)
            .into_iter()
            .filter_map(|(name, field)| Some((graphql_field_name(&name), field.graphql_type()?)))
            .collect()
    }
}

/// The GraphQL spelling of a data-layer field name: `Title` becomes `title`, a leading acronym
/// is lower-cased as a whole so `ID` becomes `id` and `URLSegment` becomes `urlSegment`.
pub fn graphql_field_name(name: &str) -> String {
    let chars = name.chars().collect::<Vec<_>>();
    let capitals = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lowered = match chars.get(capitals) {
        // the acronym's last capital starts the next word
        Some(next) if capitals > 1 && next.is_lowercase() => capitals - 1,
        _ => capitals,
    };
    chars[..lowered]
        .iter()
        .flat_map(|c| c.to_lowercase())
        .chain(chars[lowered..].iter().copied())
        .collect()
}
