//! Composition of parameterized SELECT statements.
//!
//! A [`SelectBuilder`] holds a base query and an ordered list of predicates.
//! Each predicate carries its own bound values, so the parameter list is always
//! in the same order as the `?` markers in the rendered SQL. Placeholders are
//! written dialect-neutral as `?` and numbered (`$1`, `$2`, ...) at render time
//! for PostgreSQL.

use std::fmt::Write as _;

/// SQL flavour used when rendering placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl rusqlite::ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        match self {
            SqlParam::Int(v) => rusqlite::ToSql::to_sql(v),
            SqlParam::Text(s) => rusqlite::ToSql::to_sql(s),
        }
    }
}

/// A rendered statement ready to be executed by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

#[derive(Debug, Clone)]
struct Predicate {
    sql: String,
    params: Vec<SqlParam>,
}

#[derive(Debug, Clone)]
pub struct SelectBuilder {
    base: String,
    predicates: Vec<Predicate>,
    order_by: Option<String>,
    limit: Option<u32>,
}

impl SelectBuilder {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim().to_string(),
            predicates: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Add a predicate. `sql` must contain exactly one `?` per entry of `params`.
    pub fn filter(mut self, sql: &str, params: Vec<SqlParam>) -> Self {
        debug_assert_eq!(sql.matches('?').count(), params.len());
        self.predicates.push(Predicate { sql: sql.to_string(), params });
        self
    }

    /// Add a predicate containing an `IN (...)` list. The `{}` in `template`
    /// is replaced by one `?` per value. `values` must not be empty.
    pub fn filter_in<T: Into<SqlParam>>(self, template: &str, values: impl IntoIterator<Item = T>) -> Self {
        let params: Vec<SqlParam> = values.into_iter().map(Into::into).collect();
        let sql = template.replacen("{}", &placeholders(params.len()), 1);
        self.filter(&sql, params)
    }

    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_by = Some(clause.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self, dialect: Dialect) -> Statement {
        let mut sql = self.base;
        let mut params = Vec::new();

        for (i, predicate) in self.predicates.into_iter().enumerate() {
            sql.push_str(if i == 0 { "\nWHERE " } else { "\n  AND " });
            sql.push_str(&predicate.sql);
            params.extend(predicate.params);
        }
        if let Some(order_by) = self.order_by {
            let _ = write!(sql, "\nORDER BY {}", order_by);
        }
        if let Some(limit) = self.limit {
            let _ = write!(sql, "\nLIMIT {}", limit);
        }

        Statement {
            sql: render_placeholders(&sql, dialect),
            params,
        }
    }
}

/// `n` comma separated `?` markers.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Number `?` markers for PostgreSQL. SQLite keeps them as they are.
pub fn render_placeholders(sql: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::Sqlite => sql.to_string(),
        Dialect::Postgres => {
            let mut out = String::with_capacity(sql.len() + 8);
            let mut n = 0;
            for c in sql.chars() {
                if c == '?' {
                    n += 1;
                    let _ = write!(out, "${}", n);
                } else {
                    out.push(c);
                }
            }
            out
        }
    }
}
