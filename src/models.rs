//! The blog's persisted records: users, blog posts and comments.

use std::sync::OnceLock;

use chrono::Utc;
use uuid::Uuid;

use crate::error::OrmError;
use crate::orm::{Entity, EntityDeclaration, EntitySchema, FieldDescriptor};
use crate::types::SqlValue;

/// A 50-character id: 15-digit epoch milliseconds, a v4 UUID in hex, `000`.
///
/// Ids minted in later milliseconds sort after earlier ones.
#[must_use]
pub fn next_id() -> String {
    format!(
        "{:015}{}000",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

fn next_id_value() -> SqlValue {
    SqlValue::Text(next_id())
}

/// Seconds since the epoch, with millisecond precision.
#[allow(clippy::cast_precision_loss)]
fn now_value() -> SqlValue {
    SqlValue::Float(Utc::now().timestamp_millis() as f64 / 1000.0)
}

fn id_field() -> FieldDescriptor {
    FieldDescriptor::string()
        .primary_key()
        .ddl("varchar(50)")
        .default_with(next_id_value)
}

fn created_at_field() -> FieldDescriptor {
    FieldDescriptor::float().default_with(now_value)
}

fn unknown_field<E: Entity>(attribute: &str) -> OrmError {
    OrmError::SchemaError(format!(
        "{} has no field {attribute}",
        std::any::type_name::<E>()
    ))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: Option<String>,
    pub email: Option<String>,
    pub passwd: Option<String>,
    pub admin: Option<bool>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub created_at: Option<f64>,
}

impl Entity for User {
    fn declare() -> EntityDeclaration {
        EntityDeclaration::new("User")
            .table("users")
            .field("id", id_field())
            .field("email", FieldDescriptor::string().ddl("varchar(50)"))
            .field("passwd", FieldDescriptor::string().ddl("varchar(50)"))
            .field("admin", FieldDescriptor::boolean())
            .field("name", FieldDescriptor::string().ddl("varchar(50)"))
            .field("image", FieldDescriptor::string().ddl("varchar(500)"))
            .field("created_at", created_at_field())
    }

    fn schema_cell() -> &'static OnceLock<EntitySchema> {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        &SCHEMA
    }

    fn value(&self, attribute: &str) -> Option<SqlValue> {
        match attribute {
            "id" => self.id.clone().map(SqlValue::from),
            "email" => self.email.clone().map(SqlValue::from),
            "passwd" => self.passwd.clone().map(SqlValue::from),
            "admin" => self.admin.map(SqlValue::from),
            "name" => self.name.clone().map(SqlValue::from),
            "image" => self.image.clone().map(SqlValue::from),
            "created_at" => self.created_at.map(SqlValue::from),
            _ => None,
        }
    }

    fn set_value(&mut self, attribute: &str, value: SqlValue) -> Result<(), OrmError> {
        match attribute {
            "id" => self.id = value.into_opt_text()?,
            "email" => self.email = value.into_opt_text()?,
            "passwd" => self.passwd = value.into_opt_text()?,
            "admin" => self.admin = value.into_opt_bool()?,
            "name" => self.name = value.into_opt_text()?,
            "image" => self.image = value.into_opt_text()?,
            "created_at" => self.created_at = value.into_opt_float()?,
            _ => return Err(unknown_field::<Self>(attribute)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blog {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<f64>,
}

impl Entity for Blog {
    fn declare() -> EntityDeclaration {
        EntityDeclaration::new("Blog")
            .table("blogs")
            .field("id", id_field())
            .field("user_id", FieldDescriptor::string().ddl("varchar(50)"))
            .field("user_name", FieldDescriptor::string().ddl("varchar(50)"))
            .field("user_image", FieldDescriptor::string().ddl("varchar(500)"))
            .field("name", FieldDescriptor::string().ddl("varchar(50)"))
            .field("summary", FieldDescriptor::string().ddl("varchar(200)"))
            .field("content", FieldDescriptor::text())
            .field("created_at", created_at_field())
    }

    fn schema_cell() -> &'static OnceLock<EntitySchema> {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        &SCHEMA
    }

    fn value(&self, attribute: &str) -> Option<SqlValue> {
        match attribute {
            "id" => self.id.clone().map(SqlValue::from),
            "user_id" => self.user_id.clone().map(SqlValue::from),
            "user_name" => self.user_name.clone().map(SqlValue::from),
            "user_image" => self.user_image.clone().map(SqlValue::from),
            "name" => self.name.clone().map(SqlValue::from),
            "summary" => self.summary.clone().map(SqlValue::from),
            "content" => self.content.clone().map(SqlValue::from),
            "created_at" => self.created_at.map(SqlValue::from),
            _ => None,
        }
    }

    fn set_value(&mut self, attribute: &str, value: SqlValue) -> Result<(), OrmError> {
        match attribute {
            "id" => self.id = value.into_opt_text()?,
            "user_id" => self.user_id = value.into_opt_text()?,
            "user_name" => self.user_name = value.into_opt_text()?,
            "user_image" => self.user_image = value.into_opt_text()?,
            "name" => self.name = value.into_opt_text()?,
            "summary" => self.summary = value.into_opt_text()?,
            "content" => self.content = value.into_opt_text()?,
            "created_at" => self.created_at = value.into_opt_float()?,
            _ => return Err(unknown_field::<Self>(attribute)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub id: Option<String>,
    pub blog_id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<f64>,
}

impl Entity for Comment {
    fn declare() -> EntityDeclaration {
        EntityDeclaration::new("Comment")
            .table("comments")
            .field("id", id_field())
            .field("blog_id", FieldDescriptor::string().ddl("varchar(50)"))
            .field("user_id", FieldDescriptor::string().ddl("varchar(50)"))
            .field("user_name", FieldDescriptor::string().ddl("varchar(50)"))
            .field("user_image", FieldDescriptor::string().ddl("varchar(500)"))
            .field("content", FieldDescriptor::text())
            .field("created_at", created_at_field())
    }

    fn schema_cell() -> &'static OnceLock<EntitySchema> {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        &SCHEMA
    }

    fn value(&self, attribute: &str) -> Option<SqlValue> {
        match attribute {
            "id" => self.id.clone().map(SqlValue::from),
            "blog_id" => self.blog_id.clone().map(SqlValue::from),
            "user_id" => self.user_id.clone().map(SqlValue::from),
            "user_name" => self.user_name.clone().map(SqlValue::from),
            "user_image" => self.user_image.clone().map(SqlValue::from),
            "content" => self.content.clone().map(SqlValue::from),
            "created_at" => self.created_at.map(SqlValue::from),
            _ => None,
        }
    }

    fn set_value(&mut self, attribute: &str, value: SqlValue) -> Result<(), OrmError> {
        match attribute {
            "id" => self.id = value.into_opt_text()?,
            "blog_id" => self.blog_id = value.into_opt_text()?,
            "user_id" => self.user_id = value.into_opt_text()?,
            "user_name" => self.user_name = value.into_opt_text()?,
            "user_image" => self.user_image = value.into_opt_text()?,
            "content" => self.content = value.into_opt_text()?,
            "created_at" => self.created_at = value.into_opt_float()?,
            _ => return Err(unknown_field::<Self>(attribute)),
        }
        Ok(())
    }
}

/// Register every blog model. Call once at startup, before any query.
///
/// # Errors
/// Returns `OrmError::SchemaError` if a declaration is invalid.
pub fn register_all() -> Result<(), OrmError> {
    crate::orm::register::<User>()?;
    crate::orm::register::<Blog>()?;
    crate::orm::register::<Comment>()?;
    Ok(())
}

/// DDL creating every blog table.
///
/// # Errors
/// Returns `OrmError::SchemaError` if the models were not registered.
pub fn create_tables_sql() -> Result<String, OrmError> {
    Ok([
        User::schema()?.create_table_sql(),
        Blog::schema()?.create_table_sql(),
        Comment::schema()?.create_table_sql(),
    ]
    .join(";\n"))
}

/// DDL dropping every blog table.
///
/// # Errors
/// Returns `OrmError::SchemaError` if the models were not registered.
pub fn drop_tables_sql() -> Result<String, OrmError> {
    Ok([
        Comment::schema()?.drop_table_sql(),
        Blog::schema()?.drop_table_sql(),
        User::schema()?.drop_table_sql(),
    ]
    .join(";\n"))
}
