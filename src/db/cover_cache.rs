//! Persisted cover resolution results.
//!
//! Keys are `kind:path` strings built by the cover loader. A row with no
//! `cover_path` records that the search found nothing.

use sqlx::sqlite::SqlitePool;

use super::now;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CoverCacheRow {
    pub cover_path: Option<String>,
    pub source_type: i64,
}

pub async fn get(pool: &SqlitePool, cache_key: &str) -> sqlx::Result<Option<CoverCacheRow>> {
    sqlx::query_as::<_, CoverCacheRow>(
        "SELECT cover_path, source_type FROM cover_cache WHERE cache_key = ?",
    )
    .bind(cache_key)
    .fetch_optional(pool)
    .await
}

pub async fn save(
    pool: &SqlitePool,
    cache_key: &str,
    cover_path: Option<&str>,
    source_type: i64,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO cover_cache (cache_key, cover_path, source_type, cached_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(cache_key) DO UPDATE SET
            cover_path = excluded.cover_path,
            source_type = excluded.source_type,
            cached_at = excluded.cached_at
        "#,
    )
    .bind(cache_key)
    .bind(cover_path)
    .bind(source_type)
    .bind(now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove(pool: &SqlitePool, cache_key: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM cover_cache WHERE cache_key = ?")
        .bind(cache_key)
        .execute(pool)
        .await?;
    Ok(())
}

/// Drop every persisted entry. Returns the number of rows removed.
pub async fn clear(pool: &SqlitePool) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM cover_cache").execute(pool).await?;
    Ok(result.rows_affected())
}
