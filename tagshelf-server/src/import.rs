//! CSV bulk import
//!
//! Article rows are `name,url,description,tags` with `tags` itself a
//! comma-separated list (quote the field). Tag rows are `name,description`.
//! A leading header row naming those columns is recognized and skipped.
//!
//! Import is best-effort: a row with the wrong field count, invalid values,
//! or a duplicate name is logged and counted as skipped. Unknown tag names
//! on an article are dropped rather than failing the row. Only a store
//! failure aborts the import.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{ArticleRepo, DbError, TagRepo, UnknownTagPolicy};
use crate::models::{NewArticle, NewTag, ValidationError};

const ARTICLE_COLUMNS: [&str; 4] = ["name", "url", "description", "tags"];
const TAG_COLUMNS: [&str; 2] = ["name", "description"];

/// Outcome of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: u64,
    pub skipped: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Why a single row was skipped
#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Import article rows, linking the tags that exist.
pub async fn import_articles<R: std::io::Read>(
    pool: &SqlitePool,
    input: R,
) -> Result<ImportSummary, ImportError> {
    let rows = read_rows(input, &ARTICLE_COLUMNS)?;
    let repo = ArticleRepo::new(pool);
    let mut summary = ImportSummary::default();

    for (line, record) in rows {
        let article = match parse_article(&record) {
            Ok(article) => article,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping article row");
                summary.skipped += 1;
                continue;
            }
        };
        match repo.create(&article, UnknownTagPolicy::Skip).await {
            Ok(_) => summary.inserted += 1,
            Err(e) => skip_or_abort(e, line, &mut summary)?,
        }
    }

    tracing::info!(inserted = summary.inserted, skipped = summary.skipped, "article import finished");
    Ok(summary)
}

/// Import tag rows.
pub async fn import_tags<R: std::io::Read>(
    pool: &SqlitePool,
    input: R,
) -> Result<ImportSummary, ImportError> {
    let rows = read_rows(input, &TAG_COLUMNS)?;
    let repo = TagRepo::new(pool);
    let mut summary = ImportSummary::default();

    for (line, record) in rows {
        let tag = match parse_tag(&record) {
            Ok(tag) => tag,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping tag row");
                summary.skipped += 1;
                continue;
            }
        };
        match repo.create(&tag).await {
            Ok(_) => summary.inserted += 1,
            Err(e) => skip_or_abort(e, line, &mut summary)?,
        }
    }

    tracing::info!(inserted = summary.inserted, skipped = summary.skipped, "tag import finished");
    Ok(summary)
}

/// Rows that lost to a duplicate or a missing reference are skipped;
/// store failures end the import.
fn skip_or_abort(err: DbError, line: u64, summary: &mut ImportSummary) -> Result<(), ImportError> {
    match err {
        DbError::Sqlx(_) | DbError::Password(_) => Err(err.into()),
        other => {
            tracing::warn!(line, error = %other, "skipping row");
            summary.skipped += 1;
            Ok(())
        }
    }
}

/// Read every record with its line number, dropping a leading header row.
fn read_rows<R: std::io::Read>(
    input: R,
    header: &[&str],
) -> Result<Vec<(u64, csv::StringRecord)>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(input);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index == 0 && is_header(&record, header) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(index as u64 + 1);
        rows.push((line, record));
    }
    Ok(rows)
}

fn is_header(record: &csv::StringRecord, columns: &[&str]) -> bool {
    record.len() == columns.len()
        && record
            .iter()
            .zip(columns)
            .all(|(field, column)| field.trim().eq_ignore_ascii_case(column))
}

fn parse_article(record: &csv::StringRecord) -> Result<NewArticle, RowError> {
    let [name, url, description, tags] = fields::<4>(record)?;
    let tags: Vec<String> = tags.split(',').map(str::to_owned).collect();
    Ok(NewArticle::new(name, Some(url), Some(description), &tags)?)
}

fn parse_tag(record: &csv::StringRecord) -> Result<NewTag, RowError> {
    let [name, description] = fields::<2>(record)?;
    Ok(NewTag::new(name, Some(description))?)
}

/// Exactly `N` fields, or a field-count error.
fn fields<const N: usize>(record: &csv::StringRecord) -> Result<[&str; N], RowError> {
    let found: Vec<&str> = record.iter().collect();
    found
        .try_into()
        .map_err(|found: Vec<&str>| RowError::FieldCount {
            expected: N,
            found: found.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, schema};
    use crate::models::{ArticleSearch, TagSearch};

    async fn setup() -> SqlitePool {
        let pool = create_memory_pool().await.unwrap();
        schema::init(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn imports_tags_and_skips_bad_rows() {
        let pool = setup().await;
        let csv = "name,description\n\
                   frogs,amphibians\n\
                   search_engine,\n\
                   too,many,fields\n\
                   frogs,duplicate\n\
                   ,empty name\n";

        let summary = import_tags(&pool, csv.as_bytes()).await.unwrap();
        assert_eq!(summary, ImportSummary { inserted: 2, skipped: 3 });

        let tags = TagRepo::new(&pool).search(&TagSearch::default()).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].description, None);
    }

    #[tokio::test]
    async fn imports_articles_with_known_tags() {
        let pool = setup().await;
        import_tags(&pool, "frogs,\nsearch_engine,\n".as_bytes())
            .await
            .unwrap();

        let csv = "google,google.com,a popular search engine,\"search_engine,frogs,unknown\"\n\
                   kermit,,,frogs\n\
                   broken,row\n";
        let summary = import_articles(&pool, csv.as_bytes()).await.unwrap();
        assert_eq!(summary, ImportSummary { inserted: 2, skipped: 1 });

        let found = ArticleRepo::new(&pool)
            .search(&ArticleSearch::with_tags(["frogs", "search_engine"]))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "google");
        assert_eq!(found[0].tags, vec!["frogs", "search_engine"]);
    }

    #[test]
    fn header_detection_is_case_insensitive() {
        let record = csv::StringRecord::from(vec!["Name", " URL", "Description", "tags"]);
        assert!(is_header(&record, &ARTICLE_COLUMNS));

        let record = csv::StringRecord::from(vec!["google", "google.com", "", ""]);
        assert!(!is_header(&record, &ARTICLE_COLUMNS));
    }

    #[test]
    fn field_count_is_exact() {
        let record = csv::StringRecord::from(vec!["a", "b", "c"]);
        let err = fields::<2>(&record).unwrap_err();
        assert!(matches!(err, RowError::FieldCount { expected: 2, found: 3 }));
    }
}
