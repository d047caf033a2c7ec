// src/db.rs
use crate::error::AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Abre o pool SQLite e deixa o esquema em dia (migrações em ./migrations).
pub async fn create_db_pool() -> AppResult<SqlitePool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    tracing::info!("Ligando à base de dados: {}", database_url);

    // FKs ativas: o esquema conta com os ON DELETE CASCADE (apagar uma
    // turma leva as inscrições e presenças junto). WAL para os relatórios
    // não bloquearem a gravação das chamadas.
    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Executando migrações da base de dados...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrações concluídas.");

    Ok(pool)
}
