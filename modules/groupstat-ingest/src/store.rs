// Postgres persistence for scraped posts.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::Result;
use crate::normalize::NormalizedPost;

/// What happened to a post handed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    /// A row with this id was already stored; nothing was written.
    AlreadyPresent,
}

/// Bookkeeping for one completed import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRun {
    pub group_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub posts_processed: i64,
    pub posts_inserted: i64,
}

/// A row from the posts table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredPost {
    pub id: String,
    pub text: String,
    pub author: String,
    pub author_id: String,
    pub link_name: String,
    #[sqlx(rename = "type")]
    pub post_type: String,
    pub link: String,
    pub published: NaiveDateTime,
    pub reactions: i64,
    pub comments: i64,
    pub shares: i64,
    pub likes: i64,
    pub loves: i64,
    pub wows: i64,
    pub hahas: i64,
    pub sads: i64,
    pub angrys: i64,
}

#[derive(Clone)]
pub struct PostStore {
    pool: PgPool,
}

impl PostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }

    /// Insert-or-ignore keyed on the post id. Only the primary-key conflict is
    /// absorbed; every other database error is returned.
    pub async fn insert_or_ignore(&self, post: &NormalizedPost) -> Result<SaveOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts
                (id, text, author, author_id, link_name, "type", link, published,
                 reactions, comments, shares,
                 likes, loves, wows, hahas, sads, angrys)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&post.id)
        .bind(&post.text)
        .bind(&post.author)
        .bind(&post.author_id)
        .bind(&post.link_name)
        .bind(&post.post_type)
        .bind(&post.link)
        .bind(post.published)
        .bind(post.reactions)
        .bind(post.comments)
        .bind(post.shares)
        .bind(post.by_type.likes)
        .bind(post.by_type.loves)
        .bind(post.by_type.wows)
        .bind(post.by_type.hahas)
        .bind(post.by_type.sads)
        .bind(post.by_type.angrys)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() == 0 {
            SaveOutcome::AlreadyPresent
        } else {
            SaveOutcome::Inserted
        })
    }

    pub async fn insert_run(&self, run: &ImportRun) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO import_runs (group_id, started_at, finished_at, posts_processed, posts_inserted)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&run.group_id)
        .bind(run.started_at)
        .bind(run.finished_at)
        .bind(run.posts_processed)
        .bind(run.posts_inserted)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Finish time of the most recent import, if any ran.
    pub async fn last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        let row: Option<(DateTime<Utc>,)> =
            sqlx::query_as("SELECT finished_at FROM import_runs ORDER BY finished_at DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(ts,)| ts))
    }

    pub async fn get(&self, id: &str) -> Result<Option<StoredPost>> {
        let row = sqlx::query_as::<_, StoredPost>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn count(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT count(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
