use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::OrmError;

/// Values that can be stored in a mapped column or bound as a statement parameter.
///
/// The same enum is used by every driver, so entity code never branches on driver types:
/// ```rust
/// use blog_orm::prelude::*;
///
/// let args = vec![
///     SqlValue::from("alice@example.com"),
///     SqlValue::from(true),
///     SqlValue::Null,
/// ];
/// # let _ = args;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Booleans come back from `SQLite` as 0/1 integers, so both shapes are accepted.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(value) => Some(*value),
            SqlValue::Int(1) => Some(true),
            SqlValue::Int(0) => Some(false),
            _ => None,
        }
    }

    /// Integers widen to floats; `SQLite` hands back whole `REAL` values unchanged but
    /// aggregates such as `SUM` over integer columns arrive as integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SqlValue::Float(value) => Some(*value),
            SqlValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Decode into an optional string field; NULL maps to `None`.
    ///
    /// # Errors
    /// Returns `OrmError::ParameterError` when the value is neither NULL nor text.
    pub fn into_opt_text(self) -> Result<Option<String>, OrmError> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Text(s) => Ok(Some(s)),
            other => Err(mismatch("text", &other)),
        }
    }

    /// Decode into an optional boolean field; NULL maps to `None`.
    ///
    /// # Errors
    /// Returns `OrmError::ParameterError` when the value is not NULL, a boolean or 0/1.
    pub fn into_opt_bool(self) -> Result<Option<bool>, OrmError> {
        if self.is_null() {
            return Ok(None);
        }
        self.as_bool()
            .map(Some)
            .ok_or_else(|| mismatch("boolean", &self))
    }

    /// Decode into an optional integer field; NULL maps to `None`.
    ///
    /// # Errors
    /// Returns `OrmError::ParameterError` when the value is neither NULL nor an integer.
    pub fn into_opt_int(self) -> Result<Option<i64>, OrmError> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Int(i) => Ok(Some(i)),
            other => Err(mismatch("integer", &other)),
        }
    }

    /// Decode into an optional float field; NULL maps to `None`.
    ///
    /// # Errors
    /// Returns `OrmError::ParameterError` when the value is not NULL or numeric.
    pub fn into_opt_float(self) -> Result<Option<f64>, OrmError> {
        if self.is_null() {
            return Ok(None);
        }
        self.as_float()
            .map(Some)
            .ok_or_else(|| mismatch("float", &self))
    }
}

fn mismatch(expected: &str, got: &SqlValue) -> OrmError {
    OrmError::ParameterError(format!("expected {expected} value, got {got:?}"))
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// The database engine behind a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// `PostgreSQL` database
    #[cfg(feature = "postgres")]
    Postgres,
    /// `SQLite` database
    #[cfg(feature = "sqlite")]
    Sqlite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_integers_decode_as_booleans() {
        assert_eq!(SqlValue::Int(1).into_opt_bool().unwrap(), Some(true));
        assert_eq!(SqlValue::Int(0).into_opt_bool().unwrap(), Some(false));
        assert_eq!(SqlValue::Null.into_opt_bool().unwrap(), None);
        assert!(SqlValue::Int(7).into_opt_bool().is_err());
    }

    #[test]
    fn text_decoding_rejects_numbers() {
        assert_eq!(
            SqlValue::from("x").into_opt_text().unwrap(),
            Some("x".to_string())
        );
        let err = SqlValue::Int(3).into_opt_text().unwrap_err();
        assert!(matches!(err, OrmError::ParameterError(_)));
    }

    #[test]
    fn optional_values_map_none_to_null() {
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(2_i64)), SqlValue::Int(2));
    }

    #[test]
    fn float_accepts_integer_storage() {
        assert_eq!(SqlValue::Int(2).into_opt_float().unwrap(), Some(2.0));
        assert_eq!(SqlValue::Float(1.5).as_float(), Some(1.5));
    }
}
