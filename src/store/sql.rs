//! Compiles translated list queries into parameterised `PostgreSQL` SQL.
//!
//! Field paths and values are always bound as parameters; only table names
//! (static strings) and operator keywords are interpolated.

use crate::query::domain::{Condition, Filter, SortSpec};
use crate::query::{Document, RecordQuery};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::sql_types::{Array, BigInt, Jsonb, Text};
use serde_json::Value;

/// A value bound to a positional SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlBind {
    /// `text` parameter.
    Text(String),
    /// `text[]` parameter.
    TextArray(Vec<String>),
    /// `jsonb` parameter.
    Json(Value),
    /// `bigint` parameter.
    BigInt(i64),
}

/// SQL text with its ordered parameter values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledSql {
    /// Statement text using `$n` placeholders.
    pub sql: String,
    /// Parameter values in placeholder order.
    pub binds: Vec<SqlBind>,
}

impl CompiledSql {
    fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    fn bind(&mut self, value: SqlBind) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }

    fn field(&mut self, path: &str) -> String {
        let segments = path.split('.').map(str::to_owned).collect();
        let placeholder = self.bind(SqlBind::TextArray(segments));
        format!("(document #> {placeholder})")
    }

    fn json(&mut self, value: &Value) -> String {
        let placeholder = self.bind(SqlBind::Json(value.clone()));
        format!("{placeholder}::jsonb")
    }
}

#[derive(diesel::QueryableByName)]
struct DocumentRow {
    #[diesel(sql_type = Jsonb)]
    document: Value,
}

#[derive(diesel::QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Builds the `SELECT` for a record query against `table`.
///
/// Projection is not compiled; callers apply it to the loaded documents.
#[must_use]
pub fn select_documents(table: &'static str, query: &RecordQuery) -> CompiledSql {
    let mut compiled = CompiledSql::default();
    compiled.push("SELECT document FROM ");
    compiled.push(table);
    compiled.push(" WHERE ");
    compile_filter(&mut compiled, &query.filter);
    compile_order(&mut compiled, &query.sort);
    if query.skip > 0 {
        let placeholder = compiled.bind(SqlBind::BigInt(saturating_i64(query.skip)));
        compiled.push(&format!(" OFFSET {placeholder}"));
    }
    if let Some(limit) = query.limit {
        let placeholder = compiled.bind(SqlBind::BigInt(saturating_i64(limit)));
        compiled.push(&format!(" LIMIT {placeholder}"));
    }
    compiled
}

/// Builds the `SELECT COUNT(*)` for a filter against `table`.
#[must_use]
pub fn count_documents(table: &'static str, filter: &Filter) -> CompiledSql {
    let mut compiled = CompiledSql::default();
    compiled.push("SELECT COUNT(*) AS count FROM ");
    compiled.push(table);
    compiled.push(" WHERE ");
    compile_filter(&mut compiled, filter);
    compiled
}

/// Converts an `execute` row count into the repository count type.
#[must_use]
pub fn affected_rows(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn compile_order(compiled: &mut CompiledSql, sort: &SortSpec) {
    compiled.push(" ORDER BY ");
    for key in sort.keys() {
        let field = compiled.field(&key.field);
        let direction = key.direction.as_sql();
        compiled.push(&format!(
            "{rank} {direction}, {text} {direction}, {value} {direction}, ",
            rank = type_rank(&field),
            text = string_key(&field),
            value = value_key(&field),
        ));
    }
    compiled.push("seq ASC");
}

/// Cross-type rank of a field: missing and `null` first, then numbers,
/// strings, objects, arrays and booleans.
fn type_rank(field: &str) -> String {
    format!(
        "(CASE COALESCE(jsonb_typeof({field}), 'null') \
         WHEN 'null' THEN 0 WHEN 'number' THEN 1 WHEN 'string' THEN 2 \
         WHEN 'object' THEN 3 WHEN 'array' THEN 4 ELSE 5 END)"
    )
}

/// Byte-ordered text of a string field; `NULL` for every other type.
fn string_key(field: &str) -> String {
    format!("(CASE WHEN jsonb_typeof({field}) = 'string' THEN {field} #>> '{{}}' END) COLLATE \"C\"")
}

/// Native value of a non-string, non-null field; `NULL` otherwise.
fn value_key(field: &str) -> String {
    format!("(CASE WHEN jsonb_typeof({field}) NOT IN ('null', 'string') THEN {field} END)")
}

fn compile_group(compiled: &mut CompiledSql, children: &[Filter], joiner: &str, empty: &str) {
    if children.is_empty() {
        compiled.push(empty);
        return;
    }
    compiled.push("(");
    for (index, child) in children.iter().enumerate() {
        if index > 0 {
            compiled.push(joiner);
        }
        compile_filter(compiled, child);
    }
    compiled.push(")");
}

fn compile_filter(compiled: &mut CompiledSql, filter: &Filter) {
    match filter {
        Filter::All => compiled.push("TRUE"),
        Filter::And(children) => compile_group(compiled, children, " AND ", "TRUE"),
        Filter::Or(children) => compile_group(compiled, children, " OR ", "FALSE"),
        Filter::Nor(children) => {
            compiled.push("NOT COALESCE(");
            compile_group(compiled, children, " OR ", "FALSE");
            compiled.push(", FALSE)");
        }
        Filter::Field { path, condition } => compile_condition(compiled, path, condition),
    }
}

fn compile_condition(compiled: &mut CompiledSql, path: &str, condition: &Condition) {
    match condition {
        Condition::Eq(value) => compile_equality(compiled, path, value),
        Condition::Ne(value) => {
            compiled.push("NOT COALESCE(");
            compile_equality(compiled, path, value);
            compiled.push(", FALSE)");
        }
        Condition::Gt(value) => compile_range(compiled, path, ">", value),
        Condition::Gte(value) => compile_range(compiled, path, ">=", value),
        Condition::Lt(value) => compile_range(compiled, path, "<", value),
        Condition::Lte(value) => compile_range(compiled, path, "<=", value),
        Condition::In(values) => compile_membership(compiled, path, values),
        Condition::Nin(values) => {
            compiled.push("NOT COALESCE(");
            compile_membership(compiled, path, values);
            compiled.push(", FALSE)");
        }
        Condition::Exists(expected) => {
            let field = compiled.field(path);
            let test = if *expected { "IS NOT NULL" } else { "IS NULL" };
            compiled.push(&format!("({field} {test})"));
        }
    }
}

fn compile_membership(compiled: &mut CompiledSql, path: &str, values: &[Value]) {
    if values.is_empty() {
        compiled.push("FALSE");
        return;
    }
    compiled.push("(");
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            compiled.push(" OR ");
        }
        compile_equality(compiled, path, value);
    }
    compiled.push(")");
}

fn compile_equality(compiled: &mut CompiledSql, path: &str, value: &Value) {
    let field = compiled.field(path);
    if value.is_null() {
        compiled.push(&format!("({field} IS NULL OR {field} = 'null'::jsonb)"));
        return;
    }
    let operand = compiled.json(value);
    if value.is_array() {
        compiled.push(&format!("({field} = {operand})"));
    } else {
        compiled.push(&format!(
            "({field} = {operand} OR (jsonb_typeof({field}) = 'array' \
             AND {field} @> jsonb_build_array({operand})))"
        ));
    }
}

fn compile_range(compiled: &mut CompiledSql, path: &str, operator: &str, value: &Value) {
    let field = compiled.field(path);
    if let Value::String(text) = value {
        let operand = compiled.bind(SqlBind::Text(text.clone()));
        compiled.push(&format!(
            "(jsonb_typeof({field}) = 'string' AND \
             ({field} #>> '{{}}') COLLATE \"C\" {operator} {operand}::text COLLATE \"C\")"
        ));
        return;
    }
    let operand = compiled.json(value);
    compiled.push(&format!(
        "(jsonb_typeof({field}) = jsonb_typeof({operand}) AND {field} {operator} {operand})"
    ));
}

/// Executes a compiled `SELECT document` statement.
///
/// # Errors
///
/// Returns the Diesel error raised by the database.
pub fn load_documents(
    connection: &mut PgConnection,
    compiled: CompiledSql,
) -> QueryResult<Vec<Document>> {
    let rows = bind_all(compiled).load::<DocumentRow>(connection)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| match row.document {
            Value::Object(document) => Some(document),
            _ => None,
        })
        .collect())
}

/// Executes a compiled `SELECT COUNT(*)` statement.
///
/// # Errors
///
/// Returns the Diesel error raised by the database.
pub fn load_count(connection: &mut PgConnection, compiled: CompiledSql) -> QueryResult<u64> {
    let row = bind_all(compiled).get_result::<CountRow>(connection)?;
    Ok(u64::try_from(row.count).unwrap_or(0))
}

fn bind_all(compiled: CompiledSql) -> diesel::query_builder::BoxedSqlQuery<'static, Pg, diesel::query_builder::SqlQuery> {
    let CompiledSql { sql, binds } = compiled;
    let mut query = diesel::sql_query(sql).into_boxed::<Pg>();
    for value in binds {
        query = match value {
            SqlBind::Text(text) => query.bind::<Text, _>(text),
            SqlBind::TextArray(items) => query.bind::<Array<Text>, _>(items),
            SqlBind::Json(json) => query.bind::<Jsonb, _>(json),
            SqlBind::BigInt(number) => query.bind::<BigInt, _>(number),
        };
    }
    query
}
