//! Proof <-> skill association, gated by proof status

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use super::{owns, proof_not_found, require_talent, user_for};
use crate::auth::Principal;
use crate::error::LedgerError;
use crate::models::{Proof, ProofSkillSet, ProofStatus, Skill, UserInfo};
use crate::store::{finish, LedgerStore, LedgerTx};

fn ensure_own_talent(user: &UserInfo, talent_id: i64) -> Result<(), LedgerError> {
    if user.talent_id != Some(talent_id) {
        return Err(LedgerError::conflict("you can't change another talent"));
    }
    Ok(())
}

fn ensure_proof_of(proof: &Proof, talent_id: i64) -> Result<(), LedgerError> {
    if proof.talent_id != talent_id {
        return Err(LedgerError::bad_request(format!(
            "talentId with id = {} and proofId with id = {} do not match",
            talent_id, proof.id
        )));
    }
    Ok(())
}

pub struct ProofSkillGraph {
    store: Arc<dyn LedgerStore>,
}

impl ProofSkillGraph {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    async fn load_set(
        tx: &mut dyn LedgerTx,
        proof_id: i64,
    ) -> Result<ProofSkillSet, LedgerError> {
        let proof = tx
            .proof_for_update(proof_id)
            .await?
            .ok_or_else(|| proof_not_found(proof_id))?;
        let attached = tx.proof_skills(proof_id).await?;
        Ok(ProofSkillSet::new(proof, attached))
    }

    /// Attach catalogue skills to a draft proof. Either every requested skill
    /// is attached or none is; an empty request attaches nothing.
    pub async fn attach_skills(
        &self,
        talent_id: i64,
        proof_id: i64,
        skill_ids: &BTreeSet<i64>,
        principal: &Principal,
    ) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        let outcome =
            Self::attach_skills_in(&mut *tx, talent_id, proof_id, skill_ids, principal).await;
        let attached = finish(tx, outcome).await?;

        debug!(
            talent_id = %talent_id,
            proof_id = %proof_id,
            count = attached,
            "Skills attached to proof"
        );
        Ok(())
    }

    async fn attach_skills_in(
        tx: &mut dyn LedgerTx,
        talent_id: i64,
        proof_id: i64,
        skill_ids: &BTreeSet<i64>,
        principal: &Principal,
    ) -> Result<usize, LedgerError> {
        require_talent(tx, talent_id).await?;
        let user = user_for(tx, principal).await?;
        let mut set = Self::load_set(tx, proof_id).await?;

        set.ensure_editable()?;
        ensure_own_talent(&user, talent_id)?;
        ensure_proof_of(set.proof(), talent_id)?;

        let found = tx.skills(skill_ids).await?;
        let found_ids: BTreeSet<i64> = found.iter().map(|s| s.id).collect();
        if let Some(missing) = skill_ids.difference(&found_ids).next() {
            return Err(LedgerError::not_found(format!(
                "no such skill with id = {}",
                missing
            )));
        }

        set.add(found)?;
        let inserted = tx.insert_proof_skills(proof_id, set.added()).await?;
        Ok(inserted.len())
    }

    /// Skills claimed on a proof. Published proofs are public; anything else
    /// is visible to its owning talent only.
    pub async fn list_skills(
        &self,
        proof_id: i64,
        principal: Option<&Principal>,
    ) -> Result<BTreeSet<Skill>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let outcome = Self::list_skills_in(&mut *tx, proof_id, principal).await;
        finish(tx, outcome).await
    }

    async fn list_skills_in(
        tx: &mut dyn LedgerTx,
        proof_id: i64,
        principal: Option<&Principal>,
    ) -> Result<BTreeSet<Skill>, LedgerError> {
        let proof = tx
            .proof(proof_id)
            .await?
            .ok_or_else(|| proof_not_found(proof_id))?;

        if proof.status != ProofStatus::Published {
            let hidden = || {
                LedgerError::permission_denied("you can't see proofs in DRAFT and HIDDEN status")
            };
            let principal = principal.ok_or_else(hidden)?;
            let user = user_for(tx, principal).await?;
            if !owns(&user, &proof) {
                return Err(hidden());
            }
        }

        let attached = tx.proof_skills(proof_id).await?;
        Ok(attached.into_iter().map(|ps| ps.skill).collect())
    }

    /// Detach one skill from a draft proof. Detaching a skill that is not on
    /// the proof succeeds without changes.
    pub async fn detach_skill(
        &self,
        talent_id: i64,
        proof_id: i64,
        skill_id: i64,
        principal: &Principal,
    ) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        let outcome =
            Self::detach_skill_in(&mut *tx, talent_id, proof_id, skill_id, principal).await;
        let removed = finish(tx, outcome).await?;

        debug!(
            talent_id = %talent_id,
            proof_id = %proof_id,
            skill_id = %skill_id,
            removed = removed,
            "Skill detached from proof"
        );
        Ok(())
    }

    async fn detach_skill_in(
        tx: &mut dyn LedgerTx,
        talent_id: i64,
        proof_id: i64,
        skill_id: i64,
        principal: &Principal,
    ) -> Result<bool, LedgerError> {
        let user = user_for(tx, principal).await?;
        ensure_own_talent(&user, talent_id)?;
        require_talent(tx, talent_id).await?;
        let mut set = Self::load_set(tx, proof_id).await?;

        set.ensure_editable()?;
        ensure_proof_of(set.proof(), talent_id)?;

        match set.remove(skill_id)? {
            Some(_) => {
                tx.delete_proof_skill(proof_id, skill_id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Catalogue skills whose name contains `filter`; an empty filter lists all
    pub async fn search_catalogue(&self, filter: &str) -> Result<Vec<Skill>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let outcome = tx.search_skills(filter.trim()).await;
        finish(tx, outcome).await
    }
}
