use crate::models::{TradeAction, TradeRecord};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

/// Append-only journal of completed decision cycles
///
/// Single writer (the orchestrator), arbitrarily many readers (the dashboard).
/// WAL mode keeps readers from ever observing a partial row; rows are never
/// updated or deleted.
#[derive(Clone)]
pub struct TradeJournal {
    pool: SqlitePool,
}

impl TradeJournal {
    /// Open (creating if absent) the journal at the given path
    pub async fn open(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let journal = Self { pool };
        journal.init_schema().await?;

        tracing::info!("Trade journal ready at {}", path);

        Ok(journal)
    }

    /// In-memory journal for tests
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let journal = Self { pool };
        journal.init_schema().await?;
        Ok(journal)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                decision TEXT NOT NULL,
                percentage INTEGER NOT NULL,
                reason TEXT NOT NULL,
                btc_balance REAL NOT NULL,
                usd_balance REAL NOT NULL,
                btc_avg_buy_price REAL NOT NULL,
                btc_usd_price REAL NOT NULL,
                reflection TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append one record; returns its assigned id
    pub async fn append(&self, record: &TradeRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO trades
                (timestamp, decision, percentage, reason, btc_balance, usd_balance,
                 btc_avg_buy_price, btc_usd_price, reflection)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.timestamp.to_rfc3339())
        .bind(record.decision.as_str())
        .bind(record.percentage)
        .bind(&record.reason)
        .bind(record.btc_balance)
        .bind(record.usd_balance)
        .bind(record.btc_avg_buy_price)
        .bind(record.btc_usd_price)
        .bind(&record.reflection)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!("Journaled trade {} ({})", id, record.decision);

        Ok(id)
    }

    /// Records from the last `days` days, newest first
    pub async fn recent(&self, days: i64) -> Result<Vec<TradeRecord>> {
        let cutoff = (Utc::now() - Duration::days(days)).to_rfc3339();

        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, decision, percentage, reason, btc_balance,
                   usd_balance, btc_avg_buy_price, btc_usd_price, reflection
            FROM trades
            WHERE timestamp > ?
            ORDER BY timestamp DESC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_record).collect()
    }

    /// Fetch a single record by id
    pub async fn get(&self, id: i64) -> Result<Option<TradeRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, timestamp, decision, percentage, reason, btc_balance,
                   usd_balance, btc_avg_buy_price, btc_usd_price, reflection
            FROM trades
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_record).transpose()
    }
}

fn row_to_record(row: sqlx::sqlite::SqliteRow) -> Result<TradeRecord> {
    let timestamp_str: String = row.get("timestamp");
    let decision_str: String = row.get("decision");

    Ok(TradeRecord {
        id: Some(row.get("id")),
        timestamp: DateTime::parse_from_rfc3339(&timestamp_str)?.with_timezone(&Utc),
        decision: decision_str.parse::<TradeAction>()?,
        percentage: row.get("percentage"),
        reason: row.get("reason"),
        btc_balance: row.get("btc_balance"),
        usd_balance: row.get("usd_balance"),
        btc_avg_buy_price: row.get("btc_avg_buy_price"),
        btc_usd_price: row.get("btc_usd_price"),
        reflection: row.get("reflection"),
    })
}
