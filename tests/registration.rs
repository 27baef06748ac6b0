#![cfg(feature = "sqlite")]

use std::sync::OnceLock;

use blog_orm::prelude::*;
use tempfile::tempdir;

#[derive(Debug, Default, Clone, PartialEq)]
struct Tag {
    id: Option<i64>,
    label: Option<String>,
}

impl Entity for Tag {
    fn declare() -> EntityDeclaration {
        EntityDeclaration::new("Tag")
            .table("tags")
            .field("id", FieldDescriptor::integer().primary_key())
            .field("label", FieldDescriptor::string().named("tag_label"))
    }

    fn schema_cell() -> &'static OnceLock<EntitySchema> {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        &SCHEMA
    }

    fn value(&self, attribute: &str) -> Option<SqlValue> {
        match attribute {
            "id" => self.id.map(SqlValue::from),
            "label" => self.label.clone().map(SqlValue::from),
            _ => None,
        }
    }

    fn set_value(&mut self, attribute: &str, value: SqlValue) -> Result<(), OrmError> {
        match attribute {
            "id" => self.id = value.into_opt_int()?,
            "label" => self.label = value.into_opt_text()?,
            _ => return Err(OrmError::SchemaError(format!("Tag has no field {attribute}"))),
        }
        Ok(())
    }
}

/// Maps the same table as `Tag`.
#[derive(Debug, Default)]
struct Label {
    id: Option<i64>,
}

impl Entity for Label {
    fn declare() -> EntityDeclaration {
        EntityDeclaration::new("Label")
            .table("tags")
            .field("id", FieldDescriptor::integer().primary_key())
    }

    fn schema_cell() -> &'static OnceLock<EntitySchema> {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        &SCHEMA
    }

    fn value(&self, attribute: &str) -> Option<SqlValue> {
        (attribute == "id").then_some(self.id.map(SqlValue::from)).flatten()
    }

    fn set_value(&mut self, attribute: &str, value: SqlValue) -> Result<(), OrmError> {
        if attribute != "id" {
            return Err(OrmError::SchemaError(format!("Label has no field {attribute}")));
        }
        self.id = value.into_opt_int()?;
        Ok(())
    }
}

/// Declares no primary key.
#[derive(Debug, Default)]
struct Keyless;

impl Entity for Keyless {
    fn declare() -> EntityDeclaration {
        EntityDeclaration::new("Keyless").field("note", FieldDescriptor::text())
    }

    fn schema_cell() -> &'static OnceLock<EntitySchema> {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        &SCHEMA
    }

    fn value(&self, _attribute: &str) -> Option<SqlValue> {
        None
    }

    fn set_value(&mut self, attribute: &str, _value: SqlValue) -> Result<(), OrmError> {
        Err(OrmError::SchemaError(format!("Keyless has no field {attribute}")))
    }
}

async fn sqlite_db(prefix: &str) -> Result<Database, OrmError> {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    let config = PoolConfig::new(DatabaseType::Sqlite, "u", "p", path.to_string_lossy());
    Database::create_pool(&config).await
}

#[tokio::test(flavor = "multi_thread")]
async fn registration_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let db = sqlite_db("registration").await?;

    // not registered yet: no deferred registration on first use
    let err = Tag::find(&db, 1_i64).await.unwrap_err();
    assert!(matches!(err, OrmError::SchemaError(_)));

    let schema = register::<Tag>()?;
    assert_eq!(schema.table_name(), "tags");
    assert!(std::ptr::eq(schema, register::<Tag>()?));

    // a second type may not take over the table
    let err = register::<Label>().unwrap_err();
    assert!(matches!(err, OrmError::SchemaError(ref m) if m.contains("already mapped")));
    assert!(matches!(Label::schema(), Err(OrmError::SchemaError(_))));

    let err = register::<Keyless>().unwrap_err();
    assert!(matches!(err, OrmError::SchemaError(ref m) if m == "primary key not found"));

    // column name override is used for reads and writes
    db.execute_batch(&schema.create_table_sql()).await?;
    let mut tag = Tag {
        id: Some(7),
        label: Some("rust".into()),
    };
    tag.save(&db).await?;
    let rs = db.select(r#"SELECT "tag_label" FROM "tags""#, &[], None).await?;
    assert_eq!(rs.results[0].get("tag_label"), Some(&SqlValue::from("rust")));
    assert_eq!(Tag::find(&db, 7_i64).await?, Some(tag));
    Ok(())
}
