use std::sync::OnceLock;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::find::{FindOptions, find_all_sql, find_number_sql, find_sql};
use super::schema::{EntityDeclaration, EntitySchema};
use crate::error::OrmError;
use crate::pool::Database;
use crate::results::DbRow;
use crate::types::SqlValue;

/// A typed record mapped to one table.
///
/// Implementors hold one `Option` per declared field (`None` = unset) and
/// expose them by attribute name through [`value`](Entity::value) and
/// [`set_value`](Entity::set_value). The type must be registered with
/// [`register`](super::register) before any operation runs.
#[async_trait]
pub trait Entity: Default + Send + Sync + Sized + 'static {
    /// The static field list this type maps.
    fn declare() -> EntityDeclaration;

    /// Storage for the registered schema; one `static` per implementing type.
    fn schema_cell() -> &'static OnceLock<EntitySchema>;

    /// Current value of `attribute`, `None` when unset or unknown.
    fn value(&self, attribute: &str) -> Option<SqlValue>;

    /// Assign `attribute`; `SqlValue::Null` unsets it.
    ///
    /// # Errors
    /// Returns an error for an unknown attribute or a value of the wrong type.
    fn set_value(&mut self, attribute: &str, value: SqlValue) -> Result<(), OrmError>;

    /// The registered schema.
    ///
    /// # Errors
    /// Returns `OrmError::SchemaError` if the type was never registered.
    fn schema() -> Result<&'static EntitySchema, OrmError> {
        Self::schema_cell().get().ok_or_else(|| {
            OrmError::SchemaError(format!(
                "entity {} is not registered",
                std::any::type_name::<Self>()
            ))
        })
    }

    /// Materialise an instance from a result row; NULL columns stay unset.
    ///
    /// # Errors
    /// Returns an error if a column value does not fit its field.
    fn from_row(row: &DbRow) -> Result<Self, OrmError> {
        let schema = Self::schema()?;
        let mut entity = Self::default();
        for (attribute, _) in schema.mappings() {
            if let Some(value) = row.get(schema.column(attribute))
                && !value.is_null()
            {
                entity.set_value(attribute, value.clone())?;
            }
        }
        Ok(entity)
    }

    /// Current value, or NULL when unset.
    fn current_value(&self, attribute: &str) -> SqlValue {
        self.value(attribute).unwrap_or(SqlValue::Null)
    }

    /// Current value, or the field's default, which is then kept on the instance.
    ///
    /// # Errors
    /// Returns an error if the type is unregistered or `attribute` is unknown.
    fn value_or_default(&mut self, attribute: &str) -> Result<SqlValue, OrmError> {
        if let Some(value) = self.value(attribute) {
            return Ok(value);
        }
        let schema = Self::schema()?;
        let descriptor = schema.descriptor(attribute).ok_or_else(|| {
            OrmError::SchemaError(format!("{} has no field {attribute}", schema.type_name()))
        })?;
        let value = descriptor.default().resolve();
        if !value.is_null() {
            debug!("using default value for {attribute}: {value:?}");
            self.set_value(attribute, value.clone())?;
        }
        Ok(value)
    }

    /// Look up one row by primary key; `None` when no row matches.
    ///
    /// # Errors
    /// Returns schema or execution errors.
    async fn find<K>(db: &Database, pk: K) -> Result<Option<Self>, OrmError>
    where
        K: Into<SqlValue> + Send,
    {
        let schema = Self::schema()?;
        let (sql, args) = find_sql(schema, pk.into());
        let result_set = db.select(&sql, &args, Some(1)).await?;
        result_set.results.first().map(Self::from_row).transpose()
    }

    /// Every row matching `options`, in the order the database returns them.
    ///
    /// # Errors
    /// Returns `OrmError::ValidationError` for an invalid limit, or schema and
    /// execution errors.
    async fn find_all(db: &Database, options: FindOptions) -> Result<Vec<Self>, OrmError> {
        let schema = Self::schema()?;
        let (sql, args) = find_all_sql(schema, options, db.placeholder_style())?;
        let result_set = db.select(&sql, &args, None).await?;
        result_set.results.iter().map(Self::from_row).collect()
    }

    /// A single aggregate such as `count(*)`; `None` when no row comes back
    /// or the aggregate is NULL.
    ///
    /// # Errors
    /// Returns schema or execution errors.
    async fn find_number(
        db: &Database,
        select_expr: &str,
        where_clause: Option<&str>,
        args: Vec<SqlValue>,
    ) -> Result<Option<SqlValue>, OrmError> {
        let schema = Self::schema()?;
        let sql = find_number_sql(schema, select_expr, where_clause);
        let result_set = db.select(&sql, &args, Some(1)).await?;
        Ok(result_set
            .results
            .into_iter()
            .next()
            .and_then(|row| row.into_values().into_iter().next())
            .filter(|value| !value.is_null()))
    }

    /// Insert this instance. Unset fields (the key included) take their defaults.
    ///
    /// A row count other than one is logged, not returned as an error.
    ///
    /// # Errors
    /// Returns schema or execution errors.
    async fn save(&mut self, db: &Database) -> Result<(), OrmError> {
        let schema = Self::schema()?;
        let mut args = Vec::with_capacity(schema.fields().len() + 1);
        for field in schema.fields() {
            args.push(self.value_or_default(field)?);
        }
        args.push(self.value_or_default(schema.primary_key())?);
        let rows = db
            .execute(schema.insert_stmt(), &args, db.autocommit())
            .await?;
        if rows != 1 {
            warn!("failed to insert record: affected rows: {rows}");
        }
        Ok(())
    }

    /// Write every field's current value; unset fields become NULL.
    ///
    /// A row count other than one is logged, not returned as an error.
    ///
    /// # Errors
    /// Returns schema or execution errors.
    async fn update(&self, db: &Database) -> Result<(), OrmError> {
        let schema = Self::schema()?;
        let mut args: Vec<SqlValue> = schema
            .fields()
            .iter()
            .map(|field| self.current_value(field))
            .collect();
        args.push(self.current_value(schema.primary_key()));
        let rows = db
            .execute(schema.update_stmt(), &args, db.autocommit())
            .await?;
        if rows != 1 {
            warn!("failed to update by primary key: affected rows: {rows}");
        }
        Ok(())
    }

    /// Delete the row with this instance's primary key.
    ///
    /// A row count other than one is logged, not returned as an error.
    ///
    /// # Errors
    /// Returns schema or execution errors.
    async fn remove(&self, db: &Database) -> Result<(), OrmError> {
        let schema = Self::schema()?;
        let args = [self.current_value(schema.primary_key())];
        let rows = db
            .execute(schema.delete_stmt(), &args, db.autocommit())
            .await?;
        if rows != 1 {
            warn!("failed to remove by primary key: affected rows: {rows}");
        }
        Ok(())
    }
}
