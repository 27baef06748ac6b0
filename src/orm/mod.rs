//! Declarative mapping of typed records onto tables.
//!
//! - field: column descriptors and their defaults
//! - schema: declarations, validated schemas and statement templates
//! - find: query options and the SQL built from them
//! - entity: the CRUD trait every mapped record implements

pub mod entity;
pub mod field;
pub mod find;
pub mod schema;

pub use entity::Entity;
pub use field::{FieldDefault, FieldDescriptor, FieldKind};
pub use find::{FindOptions, Limit};
pub use schema::{EntityDeclaration, EntitySchema, quote_ident, register};
