//! Kudos balances, awards and per-proof summaries

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use super::{owns, proof_not_found, user_for};
use crate::auth::Principal;
use crate::error::LedgerError;
use crate::models::{
    BreakdownMode, KudosRecord, NewKudos, ProofKudosSummary, ProofSkill, ProofStatus,
    SkillBreakdown, Sponsor, SponsorKudos, SponsorView,
};
use crate::store::{finish, LedgerStore, LedgerTx};

/// Per-skill share of an award.
///
/// The total must split evenly across the proof's skills; there is no
/// rounding and no remainder.
pub fn split_award(amount: i64, skill_count: usize) -> Result<i64, LedgerError> {
    if skill_count == 0 {
        return Err(LedgerError::invalid_argument(
            "proof has no skills to receive kudos",
        ));
    }
    let skill_count = skill_count as i64;
    if amount % skill_count != 0 {
        return Err(LedgerError::invalid_argument(format!(
            "amount of kudos ({}) must be a multiple of the number of skills on the proof ({})",
            amount, skill_count
        )));
    }
    Ok(amount / skill_count)
}

fn breakdown_for(
    mode: BreakdownMode,
    records: &[&KudosRecord],
    sponsors: &HashMap<i64, SponsorView>,
) -> SkillBreakdown {
    let view = |record: &KudosRecord| {
        sponsors
            .get(&record.sponsor_id)
            .cloned()
            .unwrap_or_default()
    };

    match mode {
        BreakdownMode::PerRecord => SkillBreakdown::PerRecord(
            records
                .iter()
                .map(|record| SponsorKudos {
                    kudos_id: record.id,
                    amount: record.amount,
                    sponsor: view(record),
                })
                .collect(),
        ),
        // Records arrive in id order, so the latest sponsor for an amount wins
        BreakdownMode::ByAmount => SkillBreakdown::ByAmount(
            records
                .iter()
                .map(|record| (record.amount, view(record)))
                .collect(),
        ),
    }
}

pub struct KudosLedger {
    store: Arc<dyn LedgerStore>,
    breakdown: BreakdownMode,
}

impl KudosLedger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            breakdown: BreakdownMode::default(),
        }
    }

    pub fn with_breakdown_mode(mut self, mode: BreakdownMode) -> Self {
        self.breakdown = mode;
        self
    }

    pub fn breakdown_mode(&self) -> BreakdownMode {
        self.breakdown
    }

    /// Kudos left in a sponsor's wallet. Only the wallet's owner may look.
    pub async fn sponsor_balance(
        &self,
        sponsor_id: i64,
        principal: &Principal,
    ) -> Result<i64, LedgerError> {
        let mut tx = self.store.begin().await?;
        let outcome = Self::sponsor_balance_in(&mut *tx, sponsor_id, principal).await;
        finish(tx, outcome).await
    }

    async fn sponsor_balance_in(
        tx: &mut dyn LedgerTx,
        sponsor_id: i64,
        principal: &Principal,
    ) -> Result<i64, LedgerError> {
        let user = user_for(tx, principal).await?;
        if user.sponsor_id != Some(sponsor_id) {
            return Err(LedgerError::permission_denied(
                "only the account owner can view the number of kudos",
            ));
        }

        let sponsor = tx.sponsor(sponsor_id).await?.ok_or_else(|| {
            LedgerError::not_found(format!("sponsor with id = {} not found", sponsor_id))
        })?;
        Ok(sponsor.kudos_balance)
    }

    /// Total kudos on a proof, plus a per-skill sponsor breakdown when the
    /// caller's talent owns the proof.
    pub async fn proof_kudos_summary(
        &self,
        proof_id: i64,
        principal: &Principal,
    ) -> Result<ProofKudosSummary, LedgerError> {
        let mut tx = self.store.begin().await?;
        let outcome = self
            .proof_kudos_summary_in(&mut *tx, proof_id, principal)
            .await;
        finish(tx, outcome).await
    }

    async fn proof_kudos_summary_in(
        &self,
        tx: &mut dyn LedgerTx,
        proof_id: i64,
        principal: &Principal,
    ) -> Result<ProofKudosSummary, LedgerError> {
        let user = user_for(tx, principal).await?;
        if let Some(talent_id) = user.talent_id {
            if tx.talent(talent_id).await?.is_none() {
                return Err(LedgerError::not_found(format!(
                    "talent with login = {} not found",
                    principal.login
                )));
            }
        }
        let proof = tx.proof(proof_id).await?.ok_or_else(|| proof_not_found(proof_id))?;

        let records = tx.kudos_for_proof(proof_id).await?;
        let total_kudos: i64 = records.iter().map(|k| k.amount).sum();

        if !owns(&user, &proof) {
            return Ok(ProofKudosSummary {
                total_kudos,
                by_sponsor_per_skill: None,
            });
        }

        let proof_skills = tx.proof_skills(proof_id).await?;
        let sponsor_ids: BTreeSet<i64> = records.iter().map(|k| k.sponsor_id).collect();
        let sponsors: HashMap<i64, SponsorView> = tx
            .sponsors(&sponsor_ids)
            .await?
            .iter()
            .map(|s| (s.id, SponsorView::from(s)))
            .collect();

        let mut by_skill = BTreeMap::new();
        for proof_skill in &proof_skills {
            let skill_records: Vec<&KudosRecord> = records
                .iter()
                .filter(|k| k.proof_skill_id == proof_skill.id)
                .collect();
            by_skill.insert(
                proof_skill.skill.name.clone(),
                breakdown_for(self.breakdown, &skill_records, &sponsors),
            );
        }

        Ok(ProofKudosSummary {
            total_kudos,
            by_sponsor_per_skill: Some(by_skill),
        })
    }

    /// Spend `amount` of the caller's sponsor balance on a published proof,
    /// split evenly across its skills.
    pub async fn award(
        &self,
        proof_id: i64,
        amount: i64,
        principal: &Principal,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::invalid_argument(format!(
                "amount of kudos must be positive, got {}",
                amount
            )));
        }

        let mut tx = self.store.begin().await?;
        let outcome = Self::award_in(&mut *tx, proof_id, amount, principal).await;
        let (sponsor, share, skill_count) = finish(tx, outcome).await?;

        info!(
            sponsor_id = %sponsor.id,
            proof_id = %proof_id,
            amount = amount,
            share = share,
            skills = skill_count,
            "Kudos awarded"
        );
        Ok(())
    }

    async fn award_in(
        tx: &mut dyn LedgerTx,
        proof_id: i64,
        amount: i64,
        principal: &Principal,
    ) -> Result<(Sponsor, i64, usize), LedgerError> {
        let user = user_for(tx, principal).await?;
        let sponsor_not_found = || {
            LedgerError::not_found(format!(
                "sponsor with login = {} not found",
                principal.login
            ))
        };
        let sponsor_id = user.sponsor_id.ok_or_else(sponsor_not_found)?;
        let sponsor = tx
            .sponsor_for_update(sponsor_id)
            .await?
            .ok_or_else(sponsor_not_found)?;

        let proof = tx
            .proof(proof_id)
            .await?
            .ok_or_else(|| proof_not_found(proof_id))?;
        if proof.status != ProofStatus::Published {
            return Err(LedgerError::permission_denied(
                "only published proofs may be kudosed",
            ));
        }

        if amount > sponsor.kudos_balance {
            return Err(LedgerError::permission_denied(format!(
                "insufficient balance: sponsor has {} kudos, {} requested",
                sponsor.kudos_balance, amount
            )));
        }

        let proof_skills: Vec<ProofSkill> = tx.proof_skills(proof_id).await?;
        let share = split_award(amount, proof_skills.len())?;

        tx.update_sponsor_balance(sponsor.id, sponsor.kudos_balance - amount)
            .await?;

        let records: Vec<NewKudos> = proof_skills
            .iter()
            .map(|ps| NewKudos {
                sponsor_id: sponsor.id,
                proof_skill_id: ps.id,
                amount: share,
            })
            .collect();
        let inserted = tx.insert_kudos(&records).await?;

        debug!(
            proof_id = %proof_id,
            records = inserted.len(),
            "Kudos records appended"
        );
        Ok((sponsor, share, proof_skills.len()))
    }
}
