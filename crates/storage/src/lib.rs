use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{TokenId, TokenRecord};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// All tokens in creation order.
    pub async fn list_tokens(&self) -> Result<Vec<TokenRecord>> {
        let rows = sqlx::query("SELECT id, name, symbol, total_supply FROM tokens ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("failed to list tokens")?;
        rows.iter().map(token_from_row).collect()
    }

    pub async fn get_token(&self, token_id: TokenId) -> Result<Option<TokenRecord>> {
        let row = sqlx::query("SELECT id, name, symbol, total_supply FROM tokens WHERE id = ?")
            .bind(token_id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load token {token_id}"))?;
        row.as_ref().map(token_from_row).transpose()
    }

    pub async fn create_token(&self, name: &str, symbol: &str, total_supply: u64) -> Result<TokenId> {
        let rec = sqlx::query(
            "INSERT INTO tokens (name, symbol, total_supply) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(symbol)
        .bind(supply_to_column(total_supply)?)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert token")?;
        let token_id = TokenId(rec.get::<i64, _>(0));
        tracing::debug!(token_id = token_id.0, %symbol, "token row inserted");
        Ok(token_id)
    }

    /// Returns `false` when no token has this id.
    pub async fn update_token(
        &self,
        token_id: TokenId,
        name: &str,
        symbol: &str,
        total_supply: u64,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE tokens
             SET name = ?, symbol = ?, total_supply = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
        )
        .bind(name)
        .bind(symbol)
        .bind(supply_to_column(total_supply)?)
        .bind(token_id.0)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update token {token_id}"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` when no token has this id.
    pub async fn delete_token(&self, token_id: TokenId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tokens WHERE id = ?")
            .bind(token_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete token {token_id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn token_from_row(row: &SqliteRow) -> Result<TokenRecord> {
    let total_supply: i64 = row.try_get("total_supply")?;
    Ok(TokenRecord {
        token_id: TokenId(row.try_get("id")?),
        name: row.try_get("name")?,
        symbol: row.try_get("symbol")?,
        total_supply: Some(
            u64::try_from(total_supply)
                .with_context(|| format!("negative total_supply {total_supply} in tokens table"))?,
        ),
    })
}

fn supply_to_column(total_supply: u64) -> Result<i64> {
    i64::try_from(total_supply)
        .with_context(|| format!("total supply {total_supply} exceeds sqlite integer range"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
