use serde_json::Value as JsonValue;

use super::schema::{EntitySchema, quote_ident};
use crate::error::OrmError;
use crate::translation::PlaceholderStyle;
use crate::types::SqlValue;

/// Row limit for [`Entity::find_all`](super::Entity::find_all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most `n` rows.
    Count(i64),
    /// Skip `offset` rows, then at most `count` rows.
    Range { offset: i64, count: i64 },
}

fn invalid_limit() -> OrmError {
    OrmError::ValidationError("invalid limit value".to_string())
}

fn count(n: i64) -> Result<Limit, OrmError> {
    if n < 0 {
        return Err(invalid_limit());
    }
    Ok(Limit::Count(n))
}

fn range(offset: i64, count: i64) -> Result<Limit, OrmError> {
    if offset < 0 || count < 0 {
        return Err(invalid_limit());
    }
    Ok(Limit::Range { offset, count })
}

macro_rules! limit_from_int {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for Limit {
                type Error = OrmError;

                fn try_from(n: $ty) -> Result<Self, Self::Error> {
                    count(i64::from(n))
                }
            }

            impl TryFrom<($ty, $ty)> for Limit {
                type Error = OrmError;

                fn try_from((offset, n): ($ty, $ty)) -> Result<Self, Self::Error> {
                    range(i64::from(offset), i64::from(n))
                }
            }
        )*
    };
}

limit_from_int!(i32, i64);

/// Limits that arrive as loosely typed values (for instance from a request):
/// an integer is a count, a two-element integer array an offset/count pair.
impl TryFrom<SqlValue> for Limit {
    type Error = OrmError;

    fn try_from(value: SqlValue) -> Result<Self, Self::Error> {
        match value {
            SqlValue::Int(n) => count(n),
            SqlValue::JSON(JsonValue::Number(n)) => n.as_i64().map_or_else(|| Err(invalid_limit()), count),
            SqlValue::JSON(JsonValue::Array(pair)) => match pair.as_slice() {
                [offset, n] => match (offset.as_i64(), n.as_i64()) {
                    (Some(offset), Some(n)) => range(offset, n),
                    _ => Err(invalid_limit()),
                },
                _ => Err(invalid_limit()),
            },
            _ => Err(invalid_limit()),
        }
    }
}

/// Filters for [`Entity::find_all`](super::Entity::find_all).
///
/// `where` and `order_by` are raw SQL fragments; `where` may use `?`
/// placeholders bound from `args`.
#[derive(Debug, Default)]
pub struct FindOptions {
    where_clause: Option<String>,
    args: Vec<SqlValue>,
    order_by: Option<String>,
    limit: Option<Result<Limit, OrmError>>,
}

impl FindOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, where_clause: impl Into<String>, args: Vec<SqlValue>) -> Self {
        self.where_clause = Some(where_clause.into());
        self.args = args;
        self
    }

    #[must_use]
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// An unusable limit is reported when the query is built.
    #[must_use]
    pub fn limit<L>(mut self, limit: L) -> Self
    where
        L: TryInto<Limit, Error = OrmError>,
    {
        self.limit = Some(limit.try_into());
        self
    }
}

/// SQL and arguments for `find`: the select template keyed on the primary key.
#[must_use]
pub fn find_sql(schema: &EntitySchema, pk: SqlValue) -> (String, Vec<SqlValue>) {
    let sql = format!(
        "{} WHERE {}=?",
        schema.select_stmt(),
        quote_ident(schema.column(schema.primary_key()))
    );
    (sql, vec![pk])
}

/// SQL and arguments for `find_all`, with the limit rendered for `style`.
///
/// # Errors
/// Returns `OrmError::ValidationError` if the options carry an invalid limit.
pub fn find_all_sql(
    schema: &EntitySchema,
    options: FindOptions,
    style: PlaceholderStyle,
) -> Result<(String, Vec<SqlValue>), OrmError> {
    let mut sql = schema.select_stmt().to_string();
    let mut args = options.args;
    if let Some(where_clause) = options.where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(&where_clause);
    }
    if let Some(order_by) = options.order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by);
    }
    match options.limit.transpose()? {
        None => {}
        Some(Limit::Count(n)) => {
            sql.push_str(" LIMIT ?");
            args.push(SqlValue::Int(n));
        }
        Some(Limit::Range { offset, count }) => {
            sql.push_str(match style {
                PlaceholderStyle::Sqlite => " LIMIT ?, ?",
                PlaceholderStyle::Postgres => " OFFSET ? LIMIT ?",
            });
            args.push(SqlValue::Int(offset));
            args.push(SqlValue::Int(count));
        }
    }
    Ok((sql, args))
}

/// SQL for `find_number`: `SELECT <expr> AS "_num_" FROM <table> [WHERE ...]`.
#[must_use]
pub fn find_number_sql(schema: &EntitySchema, select_expr: &str, where_clause: Option<&str>) -> String {
    let mut sql = format!(
        "SELECT {select_expr} AS \"_num_\" FROM {}",
        quote_ident(schema.table_name())
    );
    if let Some(where_clause) = where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(where_clause);
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::{EntityDeclaration, FieldDescriptor};

    fn schema() -> EntitySchema {
        EntitySchema::from_declaration(
            EntityDeclaration::new("Blog")
                .table("blogs")
                .field("id", FieldDescriptor::string().primary_key())
                .field("name", FieldDescriptor::string()),
        )
        .unwrap()
    }

    #[test]
    fn find_filters_on_primary_key() {
        let (sql, args) = find_sql(&schema(), SqlValue::from("b1"));
        assert_eq!(sql, r#"SELECT "id", "name" FROM "blogs" WHERE "id"=?"#);
        assert_eq!(args, [SqlValue::from("b1")]);
    }

    #[test]
    fn count_limit_adds_one_placeholder() {
        let options = FindOptions::new()
            .filter(r#""name"=?"#, vec![SqlValue::from("x")])
            .order_by(r#""id" desc"#)
            .limit(5);
        let (sql, args) = find_all_sql(&schema(), options, PlaceholderStyle::Sqlite).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "id", "name" FROM "blogs" WHERE "name"=? ORDER BY "id" desc LIMIT ?"#
        );
        assert_eq!(args, [SqlValue::from("x"), SqlValue::Int(5)]);
    }

    #[test]
    fn range_limit_pushes_offset_then_count() {
        let (sql, args) =
            find_all_sql(&schema(), FindOptions::new().limit((10, 5)), PlaceholderStyle::Sqlite)
                .unwrap();
        assert!(sql.ends_with(" LIMIT ?, ?"));
        assert_eq!(args, [SqlValue::Int(10), SqlValue::Int(5)]);

        let (sql, args) =
            find_all_sql(&schema(), FindOptions::new().limit((10, 5)), PlaceholderStyle::Postgres)
                .unwrap();
        assert!(sql.ends_with(" OFFSET ? LIMIT ?"));
        assert_eq!(args, [SqlValue::Int(10), SqlValue::Int(5)]);
    }

    #[test]
    fn malformed_limits_fail_validation() {
        for options in [
            FindOptions::new().limit(SqlValue::from("x")),
            FindOptions::new().limit(-1),
            FindOptions::new().limit(SqlValue::JSON(serde_json::json!([1, 2, 3]))),
        ] {
            let err = find_all_sql(&schema(), options, PlaceholderStyle::Sqlite).unwrap_err();
            assert!(matches!(err, OrmError::ValidationError(ref m) if m == "invalid limit value"));
        }
    }

    #[test]
    fn loosely_typed_limits_are_accepted() {
        assert_eq!(Limit::try_from(SqlValue::Int(3)).unwrap(), Limit::Count(3));
        assert_eq!(
            Limit::try_from(SqlValue::JSON(serde_json::json!([20, 10]))).unwrap(),
            Limit::Range { offset: 20, count: 10 }
        );
    }

    #[test]
    fn find_number_aliases_the_expression() {
        assert_eq!(
            find_number_sql(&schema(), "count(\"id\")", Some(r#""name"=?"#)),
            r#"SELECT count("id") AS "_num_" FROM "blogs" WHERE "name"=?"#
        );
        assert_eq!(
            find_number_sql(&schema(), "count(*)", None),
            r#"SELECT count(*) AS "_num_" FROM "blogs""#
        );
    }
}
