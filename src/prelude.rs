//! Convenient imports for common functionality.
//!
//! This module re-exports the types most callers need to declare entities
//! and run them against a pool.

pub use crate::config::{PoolConfig, Settings};
pub use crate::error::OrmError;
pub use crate::orm::{
    Entity, EntityDeclaration, EntitySchema, FieldDefault, FieldDescriptor, FieldKind,
    FindOptions, Limit, register,
};
pub use crate::pool::Database;
pub use crate::results::{DbRow, ResultSet};
pub use crate::translation::{PlaceholderStyle, translate_placeholders};
pub use crate::types::{DatabaseType, SqlValue};
