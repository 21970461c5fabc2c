//! Transactional Storage
//!
//! Every public ledger operation runs inside exactly one transaction:
//! `begin` -> operation body -> `commit`, or `rollback` on any failure.
//!
//! Two backends:
//! - `MemoryStore` - in-process, fully serialized (tests, local runs)
//! - `PgStore`     - PostgreSQL via sqlx with row-level locks

pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::warn;

use crate::error::LedgerError;
use crate::models::{
    KudosRecord, NewKudos, Proof, ProofSkill, Skill, Sponsor, Talent, UserInfo,
};

pub use memory::MemoryStore;
pub use pool::PgStore;
pub use postgres::PgTx;

pub type StoreResult<T> = Result<T, LedgerError>;

/// Source of transactions
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn LedgerTx>>;
}

/// One open transaction against the backing store.
///
/// The `*_for_update` lookups take a row lock held until commit or rollback;
/// callers use them for read-modify-write sequences.
#[async_trait]
pub trait LedgerTx: Send {
    async fn user_by_login(&mut self, login: &str) -> StoreResult<Option<UserInfo>>;

    async fn sponsor(&mut self, sponsor_id: i64) -> StoreResult<Option<Sponsor>>;

    async fn sponsor_for_update(&mut self, sponsor_id: i64) -> StoreResult<Option<Sponsor>>;

    async fn sponsors(&mut self, sponsor_ids: &BTreeSet<i64>) -> StoreResult<Vec<Sponsor>>;

    async fn talent(&mut self, talent_id: i64) -> StoreResult<Option<Talent>>;

    async fn proof(&mut self, proof_id: i64) -> StoreResult<Option<Proof>>;

    async fn proof_for_update(&mut self, proof_id: i64) -> StoreResult<Option<Proof>>;

    /// Skills attached to a proof, ordered by association id
    async fn proof_skills(&mut self, proof_id: i64) -> StoreResult<Vec<ProofSkill>>;

    /// All kudos records on all skills of a proof, ordered by record id
    async fn kudos_for_proof(&mut self, proof_id: i64) -> StoreResult<Vec<KudosRecord>>;

    /// Catalogue entries for the ids that exist; unknown ids are skipped
    async fn skills(&mut self, skill_ids: &BTreeSet<i64>) -> StoreResult<Vec<Skill>>;

    /// Catalogue entries whose name contains `filter`, case-insensitive
    async fn search_skills(&mut self, filter: &str) -> StoreResult<Vec<Skill>>;

    async fn insert_proof_skills(
        &mut self,
        proof_id: i64,
        skills: &[Skill],
    ) -> StoreResult<Vec<ProofSkill>>;

    /// Returns the number of associations removed (0 or 1)
    async fn delete_proof_skill(&mut self, proof_id: i64, skill_id: i64) -> StoreResult<u64>;

    async fn update_sponsor_balance(&mut self, sponsor_id: i64, balance: i64) -> StoreResult<()>;

    async fn insert_kudos(&mut self, records: &[NewKudos]) -> StoreResult<Vec<KudosRecord>>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Close a transaction according to the outcome of its body.
///
/// A failed rollback is logged and the original error is returned.
pub async fn finish<T>(tx: Box<dyn LedgerTx>, outcome: StoreResult<T>) -> StoreResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
