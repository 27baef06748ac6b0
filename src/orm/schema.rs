use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::info;

use super::entity::Entity;
use super::field::FieldDescriptor;
use crate::error::OrmError;

/// Static description of an entity type: its name, optional table name and
/// fields in declaration order.
///
/// ```rust
/// use blog_orm::orm::{EntityDeclaration, EntitySchema, FieldDescriptor};
///
/// let decl = EntityDeclaration::new("Tag")
///     .table("tags")
///     .field("id", FieldDescriptor::string().primary_key().ddl("varchar(50)"))
///     .field("label", FieldDescriptor::string());
/// let schema = EntitySchema::from_declaration(decl).unwrap();
/// assert_eq!(schema.select_stmt(), r#"SELECT "id", "label" FROM "tags""#);
/// ```
#[derive(Debug, Clone)]
pub struct EntityDeclaration {
    type_name: String,
    table: Option<String>,
    fields: Vec<(String, FieldDescriptor)>,
}

impl EntityDeclaration {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    /// Table name; defaults to the type name.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn field(mut self, attribute: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.push((attribute.into(), descriptor));
        self
    }
}

/// The mapping of one entity type, with its four statement templates.
///
/// Templates use the portable `?` placeholder; argument order is the order
/// the entity operations push values in (ordinary fields, then the key).
#[derive(Debug, Clone)]
pub struct EntitySchema {
    type_name: String,
    table_name: String,
    mappings: Vec<(String, FieldDescriptor)>,
    primary_key: String,
    fields: Vec<String>,
    select_stmt: String,
    insert_stmt: String,
    update_stmt: String,
    delete_stmt: String,
}

impl EntitySchema {
    /// Partition the declaration into its primary key and ordinary fields and
    /// build the statement templates.
    ///
    /// # Errors
    /// Returns `OrmError::SchemaError` when there is no primary key, more than
    /// one, a key on a kind that cannot be one, or a repeated attribute.
    pub fn from_declaration(decl: EntityDeclaration) -> Result<Self, OrmError> {
        let table_name = decl.table.unwrap_or_else(|| decl.type_name.clone());
        info!("found model: {} (table: {table_name})", decl.type_name);

        let mut mappings: Vec<(String, FieldDescriptor)> = Vec::with_capacity(decl.fields.len());
        let mut primary_key: Option<String> = None;
        let mut fields = Vec::new();

        for (attribute, descriptor) in decl.fields {
            if mappings.iter().any(|(existing, _)| *existing == attribute) {
                return Err(OrmError::SchemaError(format!(
                    "duplicate field: {attribute}"
                )));
            }
            // unnamed descriptors take their attribute's name as column name
            let descriptor = match descriptor.name() {
                Some(_) => descriptor,
                None => descriptor.named(attribute.clone()),
            };
            info!("found mapping: {attribute} ==> {descriptor}");

            if descriptor.is_primary_key() {
                if primary_key.is_some() {
                    return Err(OrmError::SchemaError(format!(
                        "duplicate primary key for field: {attribute}"
                    )));
                }
                if !descriptor.kind().may_be_primary() {
                    return Err(OrmError::SchemaError(format!(
                        "{} cannot be a primary key: {attribute}",
                        descriptor.kind().label()
                    )));
                }
                primary_key = Some(attribute.clone());
            } else {
                fields.push(attribute.clone());
            }
            mappings.push((attribute, descriptor));
        }

        let primary_key =
            primary_key.ok_or_else(|| OrmError::SchemaError("primary key not found".to_string()))?;

        let mut schema = Self {
            type_name: decl.type_name,
            table_name,
            mappings,
            primary_key,
            fields,
            select_stmt: String::new(),
            insert_stmt: String::new(),
            update_stmt: String::new(),
            delete_stmt: String::new(),
        };
        schema.build_templates();
        Ok(schema)
    }

    fn build_templates(&mut self) {
        let table = quote_ident(&self.table_name);
        let pk = quote_ident(self.column(&self.primary_key));
        let columns: Vec<String> = self
            .fields
            .iter()
            .map(|f| quote_ident(self.column(f)))
            .collect();

        let mut select_list = vec![pk.clone()];
        select_list.extend(columns.iter().cloned());
        self.select_stmt = format!("SELECT {} FROM {table}", select_list.join(", "));

        let mut insert_list = columns.clone();
        insert_list.push(pk.clone());
        self.insert_stmt = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            insert_list.join(", "),
            vec!["?"; insert_list.len()].join(", ")
        );

        let assignments: Vec<String> = columns.iter().map(|c| format!("{c}=?")).collect();
        self.update_stmt = format!(
            "UPDATE {table} SET {} WHERE {pk}=?",
            assignments.join(", ")
        );

        self.delete_stmt = format!("DELETE FROM {table} WHERE {pk}=?");
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Every mapped attribute with its descriptor, in declaration order.
    #[must_use]
    pub fn mappings(&self) -> &[(String, FieldDescriptor)] {
        &self.mappings
    }

    #[must_use]
    pub fn descriptor(&self, attribute: &str) -> Option<&FieldDescriptor> {
        self.mappings
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, descriptor)| descriptor)
    }

    /// Column name of `attribute`; the attribute name itself when unmapped.
    #[must_use]
    pub fn column<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.descriptor(attribute)
            .and_then(FieldDescriptor::name)
            .unwrap_or(attribute)
    }

    /// Attribute name of the primary key.
    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Attribute names of the ordinary fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn select_stmt(&self) -> &str {
        &self.select_stmt
    }

    #[must_use]
    pub fn insert_stmt(&self) -> &str {
        &self.insert_stmt
    }

    #[must_use]
    pub fn update_stmt(&self) -> &str {
        &self.update_stmt
    }

    #[must_use]
    pub fn delete_stmt(&self) -> &str {
        &self.delete_stmt
    }

    /// `CREATE TABLE IF NOT EXISTS` for this entity, columns in declaration order.
    #[must_use]
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self
            .mappings
            .iter()
            .map(|(attribute, descriptor)| {
                let column = quote_ident(self.column(attribute));
                if descriptor.is_primary_key() {
                    format!("  {column} {} NOT NULL PRIMARY KEY", descriptor.column_type())
                } else {
                    format!("  {column} {}", descriptor.column_type())
                }
            })
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            quote_ident(&self.table_name),
            columns.join(",\n")
        )
    }

    #[must_use]
    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table_name))
    }
}

/// Quote an identifier with `"`, doubling any embedded quote.
#[must_use]
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// table name -> (owning type, its name for messages)
type Catalog = HashMap<String, (TypeId, &'static str)>;

fn catalog() -> &'static Mutex<Catalog> {
    static CATALOG: OnceLock<Mutex<Catalog>> = OnceLock::new();
    CATALOG.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Build, validate and cache the schema of `E`.
///
/// Registering the same type again returns the cached schema. A second type
/// mapping a table that is already claimed is rejected.
///
/// # Errors
/// Returns `OrmError::SchemaError` if the declaration is invalid or its table
/// belongs to another entity type.
pub fn register<E: Entity>() -> Result<&'static EntitySchema, OrmError> {
    if let Some(schema) = E::schema_cell().get() {
        return Ok(schema);
    }
    let schema = EntitySchema::from_declaration(E::declare())?;

    {
        let mut tables = catalog().lock().unwrap_or_else(PoisonError::into_inner);
        match tables.entry(schema.table_name.clone()) {
            Entry::Occupied(owner) if owner.get().0 != TypeId::of::<E>() => {
                return Err(OrmError::SchemaError(format!(
                    "table {} is already mapped by {}",
                    schema.table_name,
                    owner.get().1
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert((TypeId::of::<E>(), std::any::type_name::<E>()));
            }
        }
    }

    Ok(E::schema_cell().get_or_init(|| schema))
}
