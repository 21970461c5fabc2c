//! PostgreSQL connection pool and schema using sqlx

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use super::postgres::PgTx;
use super::{LedgerStore, LedgerTx, StoreResult};

const SCHEMA: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id          BIGSERIAL PRIMARY KEY,
            login       TEXT NOT NULL UNIQUE,
            talent_id   BIGINT,
            sponsor_id  BIGINT
        )
        "#,
    ),
    (
        "sponsors",
        r#"
        CREATE TABLE IF NOT EXISTS sponsors (
            id             BIGSERIAL PRIMARY KEY,
            first_name     TEXT,
            last_name      TEXT,
            image          TEXT,
            kudos_balance  BIGINT NOT NULL DEFAULT 0 CHECK (kudos_balance >= 0)
        )
        "#,
    ),
    (
        "talents",
        r#"
        CREATE TABLE IF NOT EXISTS talents (
            id          BIGSERIAL PRIMARY KEY,
            first_name  TEXT,
            last_name   TEXT
        )
        "#,
    ),
    (
        "proofs",
        r#"
        CREATE TABLE IF NOT EXISTS proofs (
            id          BIGSERIAL PRIMARY KEY,
            talent_id   BIGINT NOT NULL REFERENCES talents (id),
            status      TEXT NOT NULL CHECK (status IN ('DRAFT', 'PUBLISHED', 'HIDDEN')),
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "skills",
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id     BIGSERIAL PRIMARY KEY,
            skill  TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "proof_skills",
        r#"
        CREATE TABLE IF NOT EXISTS proof_skills (
            id        BIGSERIAL PRIMARY KEY,
            proof_id  BIGINT NOT NULL REFERENCES proofs (id) ON DELETE CASCADE,
            skill_id  BIGINT NOT NULL REFERENCES skills (id),
            UNIQUE (proof_id, skill_id)
        )
        "#,
    ),
    (
        "kudos",
        r#"
        CREATE TABLE IF NOT EXISTS kudos (
            id              BIGSERIAL PRIMARY KEY,
            sponsor_id      BIGINT NOT NULL REFERENCES sponsors (id),
            proof_skill_id  BIGINT NOT NULL REFERENCES proof_skills (id) ON DELETE CASCADE,
            amount          BIGINT NOT NULL CHECK (amount > 0),
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
];

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, String> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await
            .map_err(|e| format!("Failed to connect to PostgreSQL: {}", e))?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), String> {
        info!("Initializing database schema...");

        for &(table, ddl) in SCHEMA {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| format!("Failed to create {} table: {}", table, e))?;
        }

        info!("Database schema initialized");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn LedgerTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx::new(tx)))
    }
}
