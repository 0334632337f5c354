//! Search statement construction
//!
//! Every optional criterion either contributes a predicate (a fragment of
//! SQL plus the values for its placeholders) or nothing. Predicates are
//! collected in order and joined with `AND`. Caller-supplied values only
//! ever travel as bound parameters; the statement text itself is built from
//! fixed fragments, column names chosen by [`OrderBy`], and placeholder
//! counts.
//!
//! Article tag intersection uses the group-and-count idiom:
//!
//! ```text
//! SELECT a.ID, a.Name, a.URL, a.Description
//! FROM articles a
//! INNER JOIN article_to_tag l ON l.ArticleID = a.ID
//! INNER JOIN tags t ON t.ID = l.TagID
//! WHERE t.Name IN (?, ?)
//! GROUP BY a.ID
//! HAVING COUNT(DISTINCT t.ID) = ?      -- number of required tags
//! ```
//!
//! An article survives only if it is linked to every required tag. A
//! required tag missing from the store keeps the count short, so the
//! result is empty rather than an error.

use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

use crate::models::{ArticleSearch, Criteria, OrderBy, TagSearch};

/// A value bound to one placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Text(String),
    Int(i64),
}

/// A finished statement: SQL text plus its parameters in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<Param>,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Prepare the statement with every parameter bound.
    pub fn query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        self.params
            .iter()
            .fold(sqlx::query(&self.sql), |q, param| match param {
                Param::Text(s) => q.bind(s.as_str()),
                Param::Int(i) => q.bind(*i),
            })
    }
}

/// One predicate fragment and the values its placeholders bind
#[derive(Debug, Clone)]
struct Predicate {
    fragment: String,
    params: Vec<Param>,
}

impl Predicate {
    /// `column IN (?, ?, ...)`; `values` must be non-empty.
    fn in_list(column: &str, values: &[String]) -> Self {
        Self {
            fragment: format!("{} IN ({})", column, placeholders(values.len())),
            params: values.iter().cloned().map(Param::Text).collect(),
        }
    }

    /// `(c1 LIKE ? ESCAPE '\' OR c2 LIKE ? ESCAPE '\' ...)`
    ///
    /// The needle matches literally: `%` and `_` in it are escaped.
    fn contains_any(columns: &[&str], needle: &str) -> Self {
        let pattern = format!("%{}%", escape_like(needle));
        let fragment = columns
            .iter()
            .map(|c| format!("{c} LIKE ? ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        Self {
            fragment: format!("({fragment})"),
            params: columns.iter().map(|_| Param::Text(pattern.clone())).collect(),
        }
    }
}

/// Accumulates statement text and parameters side by side
#[derive(Debug, Default)]
struct StatementBuilder {
    sql: String,
    params: Vec<Param>,
}

impl StatementBuilder {
    fn new(head: &str) -> Self {
        Self {
            sql: head.to_owned(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    fn push_param(&mut self, text: &str, param: Param) -> &mut Self {
        self.sql.push_str(text);
        self.params.push(param);
        self
    }

    /// ` WHERE p1 AND p2 ...`, or nothing when there are no predicates.
    fn push_where(&mut self, predicates: Vec<Predicate>) -> &mut Self {
        for (i, predicate) in predicates.into_iter().enumerate() {
            self.sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            self.sql.push_str(&predicate.fragment);
            self.params.extend(predicate.params);
        }
        self
    }

    /// ` ORDER BY col dir[, ID dir]`; the ID tie-breaker keeps pages stable.
    fn push_order(&mut self, alias: Option<&str>, order_by: OrderBy, descending: bool) -> &mut Self {
        let dir = if descending { "DESC" } else { "ASC" };
        let qualified = |column: &str| match alias {
            Some(a) => format!("{a}.{column}"),
            None => column.to_owned(),
        };
        self.sql
            .push_str(&format!(" ORDER BY {} {dir}", qualified(order_by.column())));
        if order_by != OrderBy::Id {
            self.sql
                .push_str(&format!(", {} {dir}", qualified(OrderBy::Id.column())));
        }
        self
    }

    /// ` LIMIT ?[ OFFSET ?]`; offset is only emitted alongside a limit.
    fn push_window(&mut self, criteria: &Criteria) -> &mut Self {
        if let Some(limit) = criteria.page.limit() {
            self.push_param(" LIMIT ?", Param::Int(i64::from(limit)));
            if let Some(offset) = criteria.page.offset() {
                self.push_param(" OFFSET ?", Param::Int(i64::from(offset)));
            }
        }
        self
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Build the article search statement.
///
/// Selects `ID, Name, URL, Description`; tags are populated separately.
pub fn article_search(search: &ArticleSearch) -> Statement {
    let criteria = &search.criteria;
    let mut predicates = Vec::new();
    let mut builder = StatementBuilder::new("SELECT a.ID, a.Name, a.URL, a.Description FROM articles a");

    let required = distinct(&search.required_tags);
    if !required.is_empty() {
        builder.push(
            " INNER JOIN article_to_tag l ON l.ArticleID = a.ID INNER JOIN tags t ON t.ID = l.TagID",
        );
        predicates.push(Predicate::in_list("t.Name", &required));
    }
    if let Some(needle) = &criteria.substring {
        predicates.push(Predicate::contains_any(&["a.Name", "a.Description"], needle));
    }
    builder.push_where(predicates);

    if !required.is_empty() {
        builder.push(" GROUP BY a.ID");
        builder.push_param(
            " HAVING COUNT(DISTINCT t.ID) = ?",
            Param::Int(required.len() as i64),
        );
    }

    builder
        .push_order(Some("a"), criteria.order_by, criteria.descending)
        .push_window(criteria);
    builder.finish()
}

/// Names in first-seen order with repeats dropped; the HAVING count must
/// match the number of distinct tags.
fn distinct(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

/// Build the tag search statement.
///
/// Selects `ID, Name, Description`.
pub fn tag_search(search: &TagSearch) -> Statement {
    let criteria = &search.criteria;
    let mut predicates = Vec::new();
    let mut builder = StatementBuilder::new("SELECT ID, Name, Description FROM tags");

    if !search.names.is_empty() {
        predicates.push(Predicate::in_list("Name", &search.names));
    }
    if let Some(needle) = &criteria.substring {
        predicates.push(Predicate::contains_any(&["Name", "Description"], needle));
    }

    builder
        .push_where(predicates)
        .push_order(None, criteria.order_by, criteria.descending)
        .push_window(criteria);
    builder.finish()
}

/// Tag names for a batch of articles, one row per link.
///
/// Selects `ArticleID, Name` ordered by article, then tag name.
pub fn tag_names_for_articles(article_ids: &[i64]) -> Statement {
    let mut builder = StatementBuilder::new(
        "SELECT l.ArticleID, t.Name FROM article_to_tag l INNER JOIN tags t ON t.ID = l.TagID",
    );
    builder.push(&format!(" WHERE l.ArticleID IN ({})", placeholders(article_ids.len())));
    builder.params.extend(article_ids.iter().copied().map(Param::Int));
    builder.push(" ORDER BY l.ArticleID, t.Name");
    builder.finish()
}

/// Resolve tag names to IDs: selects `ID, Name` for every name that exists.
pub fn tag_ids_by_name(names: &[String]) -> Statement {
    let mut builder = StatementBuilder::new("SELECT ID, Name FROM tags");
    builder.push_where(vec![Predicate::in_list("Name", names)]);
    builder.finish()
}

/// Multi-row link insert; pairs that already exist are left alone.
pub fn insert_links(article_id: i64, tag_ids: &[i64]) -> Statement {
    let mut builder = StatementBuilder::new("INSERT OR IGNORE INTO article_to_tag (ArticleID, TagID) VALUES ");
    let rows = vec!["(?, ?)"; tag_ids.len()].join(", ");
    builder.push(&rows);
    for tag_id in tag_ids {
        builder.params.push(Param::Int(article_id));
        builder.params.push(Param::Int(*tag_id));
    }
    builder.finish()
}

/// `?, ?, ?` with `n` placeholders.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Escape LIKE wildcards so the needle matches literally (escape char `\`).
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
