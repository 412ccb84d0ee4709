//! Model registration: field partitioning and CRUD statement precompilation.
//!
//! Registration runs once per model type and yields an immutable [`Schema`]
//! behind an `Arc`. The four canonical statements are fixed strings reused by
//! every instance of the type, so the reflection cost is paid once rather
//! than per query.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::field::Field;

/// Immutable description of one model type: table mapping, partitioned
/// fields, and the precompiled select/insert/update/delete statements in the
/// portable dialect (`?` placeholders, backtick identifiers).
#[derive(Debug)]
pub struct Schema {
    model: String,
    table: String,
    pk_attr: String,
    pk_column: String,
    /// `pk_column=?` with the column quoted, shared by find/update/delete.
    pk_predicate: String,
    /// All attributes in declaration order, primary key included.
    attrs: Vec<String>,
    /// Non-key attributes in declaration order.
    other_attrs: Vec<String>,
    fields: HashMap<String, Field>,
    attr_by_column: HashMap<String, String>,
    select_sql: String,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
}

impl Schema {
    pub fn builder(model: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            model: model.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Attribute name of the primary key.
    pub fn primary_key(&self) -> &str {
        &self.pk_attr
    }

    /// Column name of the primary key (unquoted).
    pub fn primary_key_column(&self) -> &str {
        &self.pk_column
    }

    /// Non-key attributes in declaration order.
    pub fn other_attrs(&self) -> &[String] {
        &self.other_attrs
    }

    /// All attributes in declaration order, primary key included.
    pub fn attrs(&self) -> &[String] {
        &self.attrs
    }

    pub fn field(&self, attr: &str) -> Option<&Field> {
        self.fields.get(attr)
    }

    pub fn has_attr(&self, attr: &str) -> bool {
        self.fields.contains_key(attr)
    }

    pub(crate) fn attr_for_column(&self, column: &str) -> Option<&str> {
        self.attr_by_column.get(column).map(String::as_str)
    }

    pub(crate) fn pk_predicate(&self) -> &str {
        &self.pk_predicate
    }

    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }
}

/// Registers one model type. Field order is declaration order and flows
/// through to every generated statement.
pub struct SchemaBuilder {
    model: String,
    table: Option<String>,
    fields: Vec<(String, Field)>,
}

impl SchemaBuilder {
    /// Override the table name (defaults to the model name).
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    pub fn field(mut self, attr: impl Into<String>, field: Field) -> Self {
        self.fields.push((attr.into(), field));
        self
    }

    pub fn build(self) -> Result<Arc<Schema>> {
        let model = self.model;
        let table = self.table.unwrap_or_else(|| model.clone());
        check_identifier(&model, &table)?;

        let mut pk: Option<(String, String)> = None;
        let mut attrs = Vec::with_capacity(self.fields.len());
        let mut other_attrs = Vec::new();
        let mut other_columns = Vec::new();
        let mut fields = HashMap::with_capacity(self.fields.len());
        let mut attr_by_column = HashMap::with_capacity(self.fields.len());

        for (attr, field) in self.fields {
            if fields.contains_key(&attr) {
                return Err(Error::schema(&model, format!("duplicate field '{attr}'")));
            }
            let column = field.column_override().unwrap_or(&attr).to_string();
            check_identifier(&model, &column)?;
            if attr_by_column.contains_key(&column) {
                return Err(Error::schema(&model, format!("duplicate column '{column}'")));
            }

            if field.is_primary_key() {
                if !field.kind().key_capable() {
                    return Err(Error::schema(
                        &model,
                        format!("{} field '{attr}' cannot be a primary key", field.kind()),
                    ));
                }
                if pk.is_some() {
                    return Err(Error::schema(&model, "multiple primary key fields declared"));
                }
                pk = Some((attr.clone(), column.clone()));
            } else {
                other_attrs.push(attr.clone());
                other_columns.push(column.clone());
            }

            attrs.push(attr.clone());
            attr_by_column.insert(column, attr.clone());
            fields.insert(attr, field);
        }

        let (pk_attr, pk_column) =
            pk.ok_or_else(|| Error::schema(&model, "no primary key field declared"))?;
        if other_attrs.is_empty() {
            return Err(Error::schema(&model, "at least one non-key field is required"));
        }

        let quoted_table = quote(&table);
        let quoted_pk = quote(&pk_column);
        let quoted_others: Vec<String> = other_columns.iter().map(|c| quote(c)).collect();
        let pk_predicate = format!("{quoted_pk}=?");

        let select_sql = format!(
            "select {}, {} from {}",
            quoted_pk,
            quoted_others.join(", "),
            quoted_table
        );

        let mut insert_columns = quoted_others.clone();
        insert_columns.push(quoted_pk.clone());
        let insert_sql = format!(
            "insert into {} ({}) values ({})",
            quoted_table,
            insert_columns.join(", "),
            placeholders(insert_columns.len())
        );

        let assignments: Vec<String> = quoted_others.iter().map(|c| format!("{c}=?")).collect();
        let update_sql = format!(
            "update {} set {} where {}",
            quoted_table,
            assignments.join(", "),
            pk_predicate
        );

        let delete_sql = format!("delete from {quoted_table} where {pk_predicate}");

        debug!(
            model = %model,
            table = %table,
            primary_key = %pk_attr,
            fields = attrs.len(),
            "registered model schema"
        );

        Ok(Arc::new(Schema {
            model,
            table,
            pk_attr,
            pk_column,
            pk_predicate,
            attrs,
            other_attrs,
            fields,
            attr_by_column,
            select_sql,
            insert_sql,
            update_sql,
            delete_sql,
        }))
    }
}

fn quote(identifier: &str) -> String {
    format!("`{identifier}`")
}

/// Identifiers land between backticks; a backtick inside one would break out
/// of the quoting, so registration rejects it outright.
fn check_identifier(model: &str, identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(Error::schema(model, "empty identifier"));
    }
    if identifier.contains('`') {
        return Err(Error::schema(
            model,
            format!("identifier '{identifier}' contains a backtick"),
        ));
    }
    Ok(())
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
