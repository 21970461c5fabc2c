//! In-memory ledger store
//!
//! A transaction takes the store lock for its whole lifetime and works on a
//! private copy of the state. Commit swaps the copy in; rollback drops it.
//! This serializes all transactions, which trivially covers the sponsor
//! balance and proof skill-set races.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LedgerStore, LedgerTx, StoreResult};
use crate::error::LedgerError;
use crate::models::{
    KudosRecord, NewKudos, Proof, ProofSkill, ProofStatus, Skill, Sponsor, Talent, UserInfo,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<i64, UserInfo>,
    sponsors: BTreeMap<i64, Sponsor>,
    talents: BTreeMap<i64, Talent>,
    proofs: BTreeMap<i64, Proof>,
    skills: BTreeMap<i64, Skill>,
    proof_skills: BTreeMap<i64, ProofSkill>,
    kudos: BTreeMap<i64, KudosRecord>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn attach(&mut self, proof_id: i64, skill: Skill) -> ProofSkill {
        let proof_skill = ProofSkill {
            id: self.next_id(),
            proof_id,
            skill,
        };
        self.proof_skills.insert(proof_skill.id, proof_skill.clone());
        proof_skill
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding and lifecycle hooks. These stand in for the collaborators that
    // own accounts, the catalogue and proof publication.

    pub async fn insert_user(&self, user: UserInfo) {
        self.state.lock().await.users.insert(user.id, user);
    }

    pub async fn insert_sponsor(&self, sponsor: Sponsor) {
        self.state.lock().await.sponsors.insert(sponsor.id, sponsor);
    }

    pub async fn insert_talent(&self, talent: Talent) {
        self.state.lock().await.talents.insert(talent.id, talent);
    }

    pub async fn insert_proof(&self, proof: Proof) {
        self.state.lock().await.proofs.insert(proof.id, proof);
    }

    pub async fn insert_skill(&self, skill: Skill) {
        self.state.lock().await.skills.insert(skill.id, skill);
    }

    /// Attach a catalogue skill to a proof regardless of its status
    pub async fn attach_skill(
        &self,
        proof_id: i64,
        skill_id: i64,
    ) -> Result<ProofSkill, LedgerError> {
        let mut state = self.state.lock().await;
        let skill = state.skills.get(&skill_id).cloned().ok_or_else(|| {
            LedgerError::not_found(format!("no such skill with id = {}", skill_id))
        })?;
        Ok(state.attach(proof_id, skill))
    }

    pub async fn set_proof_status(
        &self,
        proof_id: i64,
        status: ProofStatus,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        let proof = state.proofs.get_mut(&proof_id).ok_or_else(|| {
            LedgerError::not_found(format!("proof with id = {} not found", proof_id))
        })?;
        proof.status = status;
        Ok(())
    }

    pub async fn sponsor_balance(&self, sponsor_id: i64) -> Option<i64> {
        self.state
            .lock()
            .await
            .sponsors
            .get(&sponsor_id)
            .map(|s| s.kudos_balance)
    }

    pub async fn attached_skills(&self, proof_id: i64) -> Vec<ProofSkill> {
        self.state
            .lock()
            .await
            .proof_skills
            .values()
            .filter(|ps| ps.proof_id == proof_id)
            .cloned()
            .collect()
    }

    pub async fn kudos_records(&self) -> Vec<KudosRecord> {
        self.state.lock().await.kudos.values().cloned().collect()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn LedgerTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn user_by_login(&mut self, login: &str) -> StoreResult<Option<UserInfo>> {
        Ok(self.working.users.values().find(|u| u.login == login).cloned())
    }

    async fn sponsor(&mut self, sponsor_id: i64) -> StoreResult<Option<Sponsor>> {
        Ok(self.working.sponsors.get(&sponsor_id).cloned())
    }

    async fn sponsor_for_update(&mut self, sponsor_id: i64) -> StoreResult<Option<Sponsor>> {
        self.sponsor(sponsor_id).await
    }

    async fn sponsors(&mut self, sponsor_ids: &BTreeSet<i64>) -> StoreResult<Vec<Sponsor>> {
        Ok(sponsor_ids
            .iter()
            .filter_map(|id| self.working.sponsors.get(id).cloned())
            .collect())
    }

    async fn talent(&mut self, talent_id: i64) -> StoreResult<Option<Talent>> {
        Ok(self.working.talents.get(&talent_id).cloned())
    }

    async fn proof(&mut self, proof_id: i64) -> StoreResult<Option<Proof>> {
        Ok(self.working.proofs.get(&proof_id).cloned())
    }

    async fn proof_for_update(&mut self, proof_id: i64) -> StoreResult<Option<Proof>> {
        self.proof(proof_id).await
    }

    async fn proof_skills(&mut self, proof_id: i64) -> StoreResult<Vec<ProofSkill>> {
        Ok(self
            .working
            .proof_skills
            .values()
            .filter(|ps| ps.proof_id == proof_id)
            .cloned()
            .collect())
    }

    async fn kudos_for_proof(&mut self, proof_id: i64) -> StoreResult<Vec<KudosRecord>> {
        let proof_skill_ids: BTreeSet<i64> = self
            .working
            .proof_skills
            .values()
            .filter(|ps| ps.proof_id == proof_id)
            .map(|ps| ps.id)
            .collect();

        Ok(self
            .working
            .kudos
            .values()
            .filter(|k| proof_skill_ids.contains(&k.proof_skill_id))
            .cloned()
            .collect())
    }

    async fn skills(&mut self, skill_ids: &BTreeSet<i64>) -> StoreResult<Vec<Skill>> {
        Ok(skill_ids
            .iter()
            .filter_map(|id| self.working.skills.get(id).cloned())
            .collect())
    }

    async fn search_skills(&mut self, filter: &str) -> StoreResult<Vec<Skill>> {
        let needle = filter.to_lowercase();
        Ok(self
            .working
            .skills
            .values()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn insert_proof_skills(
        &mut self,
        proof_id: i64,
        skills: &[Skill],
    ) -> StoreResult<Vec<ProofSkill>> {
        let mut inserted = Vec::with_capacity(skills.len());
        for skill in skills {
            let duplicate = self
                .working
                .proof_skills
                .values()
                .any(|ps| ps.proof_id == proof_id && ps.skill.id == skill.id);
            if duplicate {
                return Err(LedgerError::Storage(format!(
                    "unique violation: skill {} already on proof {}",
                    skill.id, proof_id
                )));
            }
            inserted.push(self.working.attach(proof_id, skill.clone()));
        }
        Ok(inserted)
    }

    async fn delete_proof_skill(&mut self, proof_id: i64, skill_id: i64) -> StoreResult<u64> {
        let before = self.working.proof_skills.len();
        self.working
            .proof_skills
            .retain(|_, ps| !(ps.proof_id == proof_id && ps.skill.id == skill_id));
        Ok((before - self.working.proof_skills.len()) as u64)
    }

    async fn update_sponsor_balance(&mut self, sponsor_id: i64, balance: i64) -> StoreResult<()> {
        if balance < 0 {
            return Err(LedgerError::Storage(format!(
                "check violation: negative balance for sponsor {}",
                sponsor_id
            )));
        }
        let sponsor = self.working.sponsors.get_mut(&sponsor_id).ok_or_else(|| {
            LedgerError::Storage(format!("sponsor {} vanished during update", sponsor_id))
        })?;
        sponsor.kudos_balance = balance;
        Ok(())
    }

    async fn insert_kudos(&mut self, records: &[NewKudos]) -> StoreResult<Vec<KudosRecord>> {
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(records.len());
        for record in records {
            if record.amount <= 0 {
                return Err(LedgerError::Storage(format!(
                    "check violation: kudos amount {} must be positive",
                    record.amount
                )));
            }
            let kudos = KudosRecord {
                id: self.working.next_id(),
                sponsor_id: record.sponsor_id,
                proof_skill_id: record.proof_skill_id,
                amount: record.amount,
                created_at: now,
            };
            self.working.kudos.insert(kudos.id, kudos.clone());
            inserted.push(kudos);
        }
        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
