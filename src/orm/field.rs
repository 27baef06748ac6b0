use std::fmt;

use crate::types::SqlValue;

/// The column kinds an entity field can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Float,
    Text,
}

impl FieldKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::String => "StringField",
            FieldKind::Boolean => "BooleanField",
            FieldKind::Integer => "IntegerField",
            FieldKind::Float => "FloatField",
            FieldKind::Text => "TextField",
        }
    }

    #[must_use]
    pub fn default_column_type(self) -> &'static str {
        match self {
            FieldKind::String => "varchar(100)",
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "bigint",
            FieldKind::Float => "double precision",
            FieldKind::Text => "text",
        }
    }

    /// Booleans and free text never identify a row.
    #[must_use]
    pub fn may_be_primary(self) -> bool {
        !matches!(self, FieldKind::Boolean | FieldKind::Text)
    }

    fn default_value(self) -> FieldDefault {
        match self {
            FieldKind::Boolean => FieldDefault::Value(SqlValue::Bool(false)),
            FieldKind::Integer => FieldDefault::Value(SqlValue::Int(0)),
            FieldKind::Float => FieldDefault::Value(SqlValue::Float(0.0)),
            FieldKind::String | FieldKind::Text => FieldDefault::Absent,
        }
    }
}

/// What an unset field resolves to when a row is written.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    Absent,
    Value(SqlValue),
    /// Called anew for every resolution, e.g. id or timestamp generators.
    Producer(fn() -> SqlValue),
}

impl FieldDefault {
    #[must_use]
    pub fn resolve(&self) -> SqlValue {
        match self {
            FieldDefault::Absent => SqlValue::Null,
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Producer(produce) => produce(),
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldDefault::Absent)
    }
}

/// Metadata for one mapped column.
///
/// ```rust
/// use blog_orm::orm::FieldDescriptor;
///
/// let email = FieldDescriptor::string().ddl("varchar(50)").named("email");
/// assert_eq!(email.to_string(), "<StringField, varchar(50):email>");
/// ```
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    kind: FieldKind,
    name: Option<String>,
    column_type: String,
    primary_key: bool,
    default: FieldDefault,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            name: None,
            column_type: kind.default_column_type().to_string(),
            primary_key: false,
            default: kind.default_value(),
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    #[must_use]
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    #[must_use]
    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    #[must_use]
    pub fn text() -> Self {
        Self::new(FieldKind::Text)
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Override the column type. Written verbatim into DDL.
    #[must_use]
    pub fn ddl(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = column_type.into();
        self
    }

    /// Map to a column whose name differs from the attribute name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<SqlValue>) -> Self {
        self.default = FieldDefault::Value(value.into());
        self
    }

    #[must_use]
    pub fn default_with(mut self, producer: fn() -> SqlValue) -> Self {
        self.default = FieldDefault::Producer(producer);
        self
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn column_type(&self) -> &str {
        &self.column_type
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub fn default(&self) -> &FieldDefault {
        &self.default
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}, {}:{}>",
            self.kind.label(),
            self.column_type,
            self.name.as_deref().unwrap_or("unnamed")
        )
    }
}
