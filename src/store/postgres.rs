//! PostgreSQL transaction using sqlx
//!
//! Lookups used for read-modify-write take `FOR UPDATE` row locks, so two
//! awards against one sponsor, or two skill edits on one proof, queue behind
//! each other until the first commits.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};
use std::collections::BTreeSet;
use tracing::debug;

use super::{LedgerTx, StoreResult};
use crate::models::{
    KudosRecord, NewKudos, Proof, ProofSkill, Skill, Sponsor, Talent, UserInfo,
};

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

impl PgTx {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

fn sponsor_from_row(row: &PgRow) -> Sponsor {
    Sponsor {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        image: row.get("image"),
        kudos_balance: row.get("kudos_balance"),
    }
}

fn proof_from_row(row: &PgRow) -> StoreResult<Proof> {
    let status: String = row.get("status");
    Ok(Proof {
        id: row.get("id"),
        talent_id: row.get("talent_id"),
        status: status.parse()?,
        created_at: row.get("created_at"),
    })
}

fn kudos_from_row(row: &PgRow) -> KudosRecord {
    KudosRecord {
        id: row.get("id"),
        sponsor_id: row.get("sponsor_id"),
        proof_skill_id: row.get("proof_skill_id"),
        amount: row.get("amount"),
        created_at: row.get("created_at"),
    }
}

fn skill_from_row(row: &PgRow) -> Skill {
    Skill {
        id: row.get("id"),
        name: row.get("skill"),
    }
}

/// Escape LIKE metacharacters so the filter matches literally
fn like_pattern(filter: &str) -> String {
    let escaped = filter
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl LedgerTx for PgTx {
    async fn user_by_login(&mut self, login: &str) -> StoreResult<Option<UserInfo>> {
        let row = sqlx::query("SELECT id, login, talent_id, sponsor_id FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|row| UserInfo {
            id: row.get("id"),
            login: row.get("login"),
            talent_id: row.get("talent_id"),
            sponsor_id: row.get("sponsor_id"),
        }))
    }

    async fn sponsor(&mut self, sponsor_id: i64) -> StoreResult<Option<Sponsor>> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, image, kudos_balance FROM sponsors WHERE id = $1",
        )
        .bind(sponsor_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.as_ref().map(sponsor_from_row))
    }

    async fn sponsor_for_update(&mut self, sponsor_id: i64) -> StoreResult<Option<Sponsor>> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, image, kudos_balance
            FROM sponsors
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(sponsor_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.as_ref().map(sponsor_from_row))
    }

    async fn sponsors(&mut self, sponsor_ids: &BTreeSet<i64>) -> StoreResult<Vec<Sponsor>> {
        let ids: Vec<i64> = sponsor_ids.iter().copied().collect();
        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, image, kudos_balance
            FROM sponsors
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.iter().map(sponsor_from_row).collect())
    }

    async fn talent(&mut self, talent_id: i64) -> StoreResult<Option<Talent>> {
        let row = sqlx::query("SELECT id, first_name, last_name FROM talents WHERE id = $1")
            .bind(talent_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|row| Talent {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
        }))
    }

    async fn proof(&mut self, proof_id: i64) -> StoreResult<Option<Proof>> {
        let row = sqlx::query("SELECT id, talent_id, status, created_at FROM proofs WHERE id = $1")
            .bind(proof_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(proof_from_row).transpose()
    }

    async fn proof_for_update(&mut self, proof_id: i64) -> StoreResult<Option<Proof>> {
        let row = sqlx::query(
            "SELECT id, talent_id, status, created_at FROM proofs WHERE id = $1 FOR UPDATE",
        )
        .bind(proof_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(proof_from_row).transpose()
    }

    async fn proof_skills(&mut self, proof_id: i64) -> StoreResult<Vec<ProofSkill>> {
        let rows = sqlx::query(
            r#"
            SELECT ps.id, ps.proof_id, s.id AS skill_id, s.skill
            FROM proof_skills ps
            JOIN skills s ON s.id = ps.skill_id
            WHERE ps.proof_id = $1
            ORDER BY ps.id
            "#,
        )
        .bind(proof_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProofSkill {
                id: row.get("id"),
                proof_id: row.get("proof_id"),
                skill: Skill {
                    id: row.get("skill_id"),
                    name: row.get("skill"),
                },
            })
            .collect())
    }

    async fn kudos_for_proof(&mut self, proof_id: i64) -> StoreResult<Vec<KudosRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT k.id, k.sponsor_id, k.proof_skill_id, k.amount, k.created_at
            FROM kudos k
            JOIN proof_skills ps ON ps.id = k.proof_skill_id
            WHERE ps.proof_id = $1
            ORDER BY k.id
            "#,
        )
        .bind(proof_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.iter().map(kudos_from_row).collect())
    }

    async fn skills(&mut self, skill_ids: &BTreeSet<i64>) -> StoreResult<Vec<Skill>> {
        let ids: Vec<i64> = skill_ids.iter().copied().collect();
        let rows = sqlx::query("SELECT id, skill FROM skills WHERE id = ANY($1) ORDER BY id")
            .bind(&ids)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows.iter().map(skill_from_row).collect())
    }

    async fn search_skills(&mut self, filter: &str) -> StoreResult<Vec<Skill>> {
        let rows = sqlx::query("SELECT id, skill FROM skills WHERE skill ILIKE $1 ORDER BY id")
            .bind(like_pattern(filter))
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows.iter().map(skill_from_row).collect())
    }

    async fn insert_proof_skills(
        &mut self,
        proof_id: i64,
        skills: &[Skill],
    ) -> StoreResult<Vec<ProofSkill>> {
        let mut inserted = Vec::with_capacity(skills.len());
        for skill in skills {
            let row = sqlx::query(
                "INSERT INTO proof_skills (proof_id, skill_id) VALUES ($1, $2) RETURNING id",
            )
            .bind(proof_id)
            .bind(skill.id)
            .fetch_one(&mut *self.tx)
            .await?;

            inserted.push(ProofSkill {
                id: row.get("id"),
                proof_id,
                skill: skill.clone(),
            });
        }

        debug!(proof_id = %proof_id, count = inserted.len(), "Proof skills inserted");
        Ok(inserted)
    }

    async fn delete_proof_skill(&mut self, proof_id: i64, skill_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM proof_skills WHERE proof_id = $1 AND skill_id = $2")
            .bind(proof_id)
            .bind(skill_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn update_sponsor_balance(&mut self, sponsor_id: i64, balance: i64) -> StoreResult<()> {
        sqlx::query("UPDATE sponsors SET kudos_balance = $2 WHERE id = $1")
            .bind(sponsor_id)
            .bind(balance)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn insert_kudos(&mut self, records: &[NewKudos]) -> StoreResult<Vec<KudosRecord>> {
        let mut inserted = Vec::with_capacity(records.len());
        for record in records {
            let row = sqlx::query(
                r#"
                INSERT INTO kudos (sponsor_id, proof_skill_id, amount)
                VALUES ($1, $2, $3)
                RETURNING id, sponsor_id, proof_skill_id, amount, created_at
                "#,
            )
            .bind(record.sponsor_id)
            .bind(record.proof_skill_id)
            .bind(record.amount)
            .fetch_one(&mut *self.tx)
            .await?;

            inserted.push(kudos_from_row(&row));
        }

        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
