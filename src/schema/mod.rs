pub mod argument;
pub mod encoded;
pub mod field;
pub mod model_type;
pub mod object_type;
pub mod type_reference;

pub use argument::{Argument, ArgumentConfig};
pub use encoded::{EncodedResolver, EncodedType};
pub use field::{Field, FieldConfig};
pub use model_type::ModelType;
pub use object_type::{BuiltObjectType, ObjectType};
pub use type_reference::{FieldType, TypeReference};
