//! Article repository
//!
//! Handles article CRUD with:
//! - Tag-intersection search, tags populated in one batched query
//! - Transactional insert/replace/delete spanning articles and links
//! - A policy for tag names that do not resolve

use sqlx::{SqliteConnection, SqlitePool};

use super::links::{clear_article_links, insert_links};
use super::tags::resolve_tag_ids;
use crate::db::mapper::{attach_tags, map_rows, Article, Tag};
use crate::db::pool::begin_write;
use crate::db::{query, DbError};
use crate::models::{ArticleSearch, NewArticle};

/// Largest ID batch per tag-population query
const POPULATE_BATCH: usize = 500;

/// What to do with referenced tag names that have no tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownTagPolicy {
    /// Fail the whole write with `DbError::UnknownTags`
    #[default]
    Reject,
    /// Link the tags that exist and log the rest
    Skip,
}

/// Article repository
pub struct ArticleRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ArticleRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Run an article search and populate tags on every result.
    ///
    /// A required tag that does not exist yields an empty result.
    pub async fn search(&self, search: &ArticleSearch) -> Result<Vec<Article>, DbError> {
        let stmt = query::article_search(search);
        tracing::debug!(sql = stmt.sql(), "article search");
        let rows = stmt.query().fetch_all(self.pool).await?;

        let mut articles: Vec<Article> = map_rows(&rows, "article");
        self.populate_tags(&mut articles).await?;
        Ok(articles)
    }

    /// Get a single article with its tags.
    pub async fn get(&self, id: i64) -> Result<Article, DbError> {
        let article: Article =
            sqlx::query_as("SELECT ID, Name, URL, Description FROM articles WHERE ID = ?")
                .bind(id)
                .fetch_optional(self.pool)
                .await?
                .ok_or_else(|| DbError::not_found("article", id))?;

        let mut articles = vec![article];
        self.populate_tags(&mut articles).await?;
        Ok(articles.remove(0))
    }

    /// Tags linked to one article, sorted by name.
    pub async fn tags(&self, id: i64) -> Result<Vec<Tag>, DbError> {
        let mut conn = self.pool.acquire().await?;
        ensure_exists(&mut conn, id).await?;

        let rows = sqlx::query(
            r#"
            SELECT t.ID, t.Name, t.Description
            FROM tags t
            INNER JOIN article_to_tag l ON l.TagID = t.ID
            WHERE l.ArticleID = ?
            ORDER BY t.Name
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(map_rows(&rows, "tag"))
    }

    /// Insert an article and link its tags. Returns the new ID.
    pub async fn create(
        &self,
        article: &NewArticle,
        policy: UnknownTagPolicy,
    ) -> Result<i64, DbError> {
        let mut tx = begin_write(self.pool).await?;

        let tag_ids = resolve_for_write(&mut tx, article, policy).await?;
        let result =
            sqlx::query("INSERT INTO articles (Name, URL, Description) VALUES (?, ?, ?)")
                .bind(article.name.as_str())
                .bind(article.url.as_deref())
                .bind(article.description.as_deref())
                .execute(&mut *tx)
                .await?;
        let id = result.last_insert_rowid();
        insert_links(&mut tx, id, &tag_ids).await?;

        tx.commit().await?;
        tracing::info!(id, name = article.name.as_str(), tags = tag_ids.len(), "article created");
        Ok(id)
    }

    /// Replace every field of an article. Links are untouched.
    pub async fn update(&self, id: i64, article: &NewArticle) -> Result<(), DbError> {
        let mut conn = self.pool.acquire().await?;
        update_fields(&mut conn, id, article).await
    }

    /// Delete the article row only.
    pub async fn remove(&self, id: i64) -> Result<(), DbError> {
        let mut conn = self.pool.acquire().await?;
        remove_article_row(&mut conn, id).await
    }

    /// Update fields and swap the tag set in one transaction.
    pub async fn replace(
        &self,
        id: i64,
        article: &NewArticle,
        policy: UnknownTagPolicy,
    ) -> Result<(), DbError> {
        let mut tx = begin_write(self.pool).await?;

        let tag_ids = resolve_for_write(&mut tx, article, policy).await?;
        update_fields(&mut tx, id, article).await?;
        clear_article_links(&mut tx, id).await?;
        insert_links(&mut tx, id, &tag_ids).await?;

        tx.commit().await?;
        tracing::info!(id, tags = tag_ids.len(), "article replaced");
        Ok(())
    }

    /// Delete an article and its links.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = begin_write(self.pool).await?;

        remove_article_row(&mut tx, id).await?;
        clear_article_links(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!(id, "article deleted");
        Ok(())
    }

    /// Fill `tags` on each article from the link table.
    pub async fn populate_tags(&self, articles: &mut [Article]) -> Result<(), DbError> {
        let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        for batch in ids.chunks(POPULATE_BATCH) {
            let stmt = query::tag_names_for_articles(batch);
            let rows = stmt.query().fetch_all(self.pool).await?;
            attach_tags(articles, &rows);
        }
        Ok(())
    }
}

/// Resolve an article's tag names under the given policy.
async fn resolve_for_write(
    conn: &mut SqliteConnection,
    article: &NewArticle,
    policy: UnknownTagPolicy,
) -> Result<Vec<i64>, DbError> {
    let resolved = resolve_tag_ids(conn, &article.tags).await?;
    if !resolved.missing.is_empty() {
        match policy {
            UnknownTagPolicy::Reject => return Err(DbError::UnknownTags(resolved.missing)),
            UnknownTagPolicy::Skip => tracing::warn!(
                article = article.name.as_str(),
                missing = ?resolved.missing,
                "skipping unknown tags"
            ),
        }
    }
    Ok(resolved.ids)
}

async fn update_fields(
    conn: &mut SqliteConnection,
    id: i64,
    article: &NewArticle,
) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE articles SET Name = ?, URL = ?, Description = ? WHERE ID = ?")
        .bind(article.name.as_str())
        .bind(article.url.as_deref())
        .bind(article.description.as_deref())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::not_found("article", id));
    }
    Ok(())
}

async fn remove_article_row(conn: &mut SqliteConnection, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM articles WHERE ID = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::not_found("article", id));
    }
    Ok(())
}

async fn ensure_exists(conn: &mut SqliteConnection, id: i64) -> Result<(), DbError> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM articles WHERE ID = ?)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if !exists {
        return Err(DbError::not_found("article", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::TagRepo;
    use crate::db::{pool::create_memory_pool, schema};
    use crate::models::NewTag;

    async fn setup() -> SqlitePool {
        let pool = create_memory_pool().await.unwrap();
        schema::init(&pool).await.unwrap();
        let tags = TagRepo::new(&pool);
        for name in ["search_engine", "frogs"] {
            tags.create(&NewTag::new(name, None).unwrap()).await.unwrap();
        }
        pool
    }

    fn article(name: &str, description: Option<&str>, tags: &[&str]) -> NewArticle {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        NewArticle::new(name, None, description, &tags).unwrap()
    }

    async fn link_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM article_to_tag")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn create_links_tags() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);

        let id = repo
            .create(&article("google", None, &["search_engine", "frogs"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();
        let found = repo.get(id).await.unwrap();
        assert_eq!(found.tags, vec!["frogs", "search_engine"]);
    }

    #[tokio::test]
    async fn reject_policy_writes_nothing() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);

        let err = repo
            .create(&article("google", None, &["frogs", "nope"]), UnknownTagPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownTags(ref names) if names == &["nope"]));

        assert!(repo.search(&ArticleSearch::default()).await.unwrap().is_empty());
        assert_eq!(link_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn skip_policy_links_known_tags() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);

        let id = repo
            .create(&article("google", None, &["frogs", "nope"]), UnknownTagPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(repo.get(id).await.unwrap().tags, vec!["frogs"]);
    }

    #[tokio::test]
    async fn empty_optionals_round_trip_as_absent() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);

        let input = NewArticle::new("google", Some(""), Some(""), &[]).unwrap();
        let id = repo.create(&input, UnknownTagPolicy::Reject).await.unwrap();
        let found = repo.get(id).await.unwrap();
        assert_eq!(found.url, None);
        assert_eq!(found.description, None);

        let input = NewArticle::new("google", Some("google.com"), Some("engine"), &[]).unwrap();
        repo.update(id, &input).await.unwrap();
        let found = repo.get(id).await.unwrap();
        assert_eq!(found.url.as_deref(), Some("google.com"));
        assert_eq!(found.description.as_deref(), Some("engine"));
    }

    #[tokio::test]
    async fn tag_intersection_example() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);
        repo.create(
            &article("google", Some("a popular search engine"), &["search_engine", "frogs"]),
            UnknownTagPolicy::Reject,
        )
        .await
        .unwrap();
        repo.create(&article("kermit", None, &["frogs"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();

        let both = repo
            .search(&ArticleSearch::with_tags(["search_engine", "frogs"]))
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].name, "google");

        let unknown = repo
            .search(&ArticleSearch::with_tags(["search_engine", "nonexistent"]))
            .await
            .unwrap();
        assert!(unknown.is_empty());

        let mut by_text = ArticleSearch::default();
        by_text.criteria.substring = Some("OOGLE".into());
        let found = repo.search(&by_text).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tags, vec!["frogs", "search_engine"]);
    }

    #[tokio::test]
    async fn replace_swaps_tag_set() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);
        let id = repo
            .create(&article("google", None, &["search_engine"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();

        repo.replace(id, &article("google", Some("renamed"), &["frogs"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();

        let found = repo.get(id).await.unwrap();
        assert_eq!(found.description.as_deref(), Some("renamed"));
        assert_eq!(found.tags, vec!["frogs"]);
    }

    #[tokio::test]
    async fn failed_replace_leaves_article_untouched() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);
        let id = repo
            .create(&article("google", None, &["frogs"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();

        let err = repo
            .replace(id, &article("other", None, &["missing"]), UnknownTagPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownTags(_)));

        let found = repo.get(id).await.unwrap();
        assert_eq!(found.name, "google");
        assert_eq!(found.tags, vec!["frogs"]);
    }

    #[tokio::test]
    async fn update_keeps_links() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);
        let id = repo
            .create(&article("google", None, &["frogs"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();

        repo.update(id, &article("bing", None, &[])).await.unwrap();
        let found = repo.get(id).await.unwrap();
        assert_eq!(found.name, "bing");
        assert_eq!(found.tags, vec!["frogs"]);
    }

    #[tokio::test]
    async fn delete_removes_row_and_links() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);
        let id = repo
            .create(&article("google", None, &["frogs", "search_engine"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();

        repo.delete(id).await.unwrap();
        assert!(matches!(repo.get(id).await, Err(DbError::NotFound { .. })));
        assert_eq!(link_count(&pool).await, 0);

        assert!(matches!(repo.delete(id).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn article_tags_lookup() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);
        let id = repo
            .create(&article("google", None, &["search_engine", "frogs"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();

        let names: Vec<_> = repo.tags(id).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["frogs", "search_engine"]);
        assert!(matches!(repo.tags(999).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn deleting_tag_keeps_articles() {
        let pool = setup().await;
        let repo = ArticleRepo::new(&pool);
        let id = repo
            .create(&article("google", None, &["frogs"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();
        let tag_id = TagRepo::new(&pool).name_exists("frogs").await.unwrap().unwrap();

        TagRepo::new(&pool).delete(tag_id).await.unwrap();

        let found = repo.get(id).await.unwrap();
        assert!(found.tags.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_on_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("catalog.db").display());
        let pool = crate::db::create_pool(&url).await.unwrap();
        schema::init(&pool).await.unwrap();
        TagRepo::new(&pool)
            .create(&NewTag::new("frogs", None).unwrap())
            .await
            .unwrap();
        let first = ArticleRepo::new(&pool)
            .create(&article("kermit", None, &["frogs"]), UnknownTagPolicy::Reject)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..40 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                let repo = ArticleRepo::new(&pool);
                let input = article(&format!("frog {i}"), None, &["frogs"]);
                if i % 4 == 0 {
                    repo.replace(first, &input, UnknownTagPolicy::Reject).await.map(|_| first)
                } else {
                    repo.create(&input, UnknownTagPolicy::Reject).await
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 31);
        assert_eq!(link_count(&pool).await, 31);
    }
}
