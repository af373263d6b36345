//! Table-scoped select builder.
//!
//! Covers the query shapes the practice screens issue against the store:
//! column projection, equality / case-insensitive substring / range filters,
//! ordering and a row limit. Table and column names are `'static`
//! identifiers chosen by the caller; every value is bound as a parameter.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

use super::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
enum Filter {
    Eq(&'static str, Value),
    ILike(&'static str, String),
    Gte(&'static str, Value),
    Lte(&'static str, Value),
}

/// A `SELECT` against one table.
#[derive(Debug, Clone)]
pub struct Select {
    table: &'static str,
    columns: &'static [&'static str],
    filters: Vec<Filter>,
    order: Vec<(&'static str, Direction)>,
    limit: Option<u32>,
}

impl Select {
    pub fn from(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    /// Case-insensitive substring match (`%term%`). Wildcards inside the
    /// term are matched literally.
    pub fn ilike(mut self, column: &'static str, term: &str) -> Self {
        self.filters
            .push(Filter::ILike(column, format!("%{}%", escape_like(term))));
        self
    }

    pub fn gte(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gte(column, value.into()));
        self
    }

    pub fn lte(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Lte(column, value.into()));
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order.push((column, direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the statement and its bound parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        let mut values = Vec::with_capacity(self.filters.len() + 1);

        let mut clauses = Vec::with_capacity(self.filters.len());
        for filter in &self.filters {
            let n = values.len() + 1;
            match filter {
                Filter::Eq(col, v) => {
                    clauses.push(format!("{col} = ?{n}"));
                    values.push(v.clone());
                }
                Filter::ILike(col, pattern) => {
                    clauses.push(format!("unicode_lower({col}) LIKE unicode_lower(?{n}) ESCAPE '\\'"));
                    values.push(Value::Text(pattern.clone()));
                }
                Filter::Gte(col, v) => {
                    clauses.push(format!("{col} >= ?{n}"));
                    values.push(v.clone());
                }
                Filter::Lte(col, v) => {
                    clauses.push(format!("{col} <= ?{n}"));
                    values.push(v.clone());
                }
            }
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(col, dir)| format!("{col} {}", dir.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT ?{}", values.len() + 1));
            values.push(Value::Integer(i64::from(limit)));
        }

        (sql, values)
    }

    /// Run the select, mapping each row with `map`.
    pub fn fetch<T, F>(&self, conn: &Connection, map: F) -> Result<Vec<T>, DatabaseError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let (sql, values) = self.to_sql();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), map)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)
    }

    /// Run the select and return the first row, if any.
    pub fn fetch_optional<T, F>(
        &self,
        conn: &Connection,
        map: F,
    ) -> Result<Option<T>, DatabaseError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut rows = self.clone().limit(1).fetch(conn, map)?;
        Ok(rows.pop())
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
