//! Proof and skill models
//!
//! A proof moves DRAFT -> PUBLISHED -> HIDDEN through an external lifecycle.
//! The skill set attached to a proof is only editable while it is a DRAFT.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProofStatus {
    Draft,
    Published,
    Hidden,
}

impl ProofStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofStatus::Draft => "DRAFT",
            ProofStatus::Published => "PUBLISHED",
            ProofStatus::Hidden => "HIDDEN",
        }
    }
}

impl fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProofStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ProofStatus::Draft),
            "PUBLISHED" => Ok(ProofStatus::Published),
            "HIDDEN" => Ok(ProofStatus::Hidden),
            other => Err(LedgerError::Storage(format!("unknown proof status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub id: i64,
    pub talent_id: i64,
    pub status: ProofStatus,
    pub created_at: DateTime<Utc>,
}

/// Catalogue entry. Referenced by proofs, never owned by them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    #[serde(rename = "skill")]
    pub name: String,
}

/// One skill claimed on one proof; the unit kudos are accounted against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSkill {
    pub id: i64,
    pub proof_id: i64,
    pub skill: Skill,
}

/// The skill set of a single proof, loaded for the duration of one transaction.
///
/// All edits go through `add` and `remove`, which enforce that the proof is a
/// DRAFT and that a skill appears at most once. Skills added here are pending
/// until the caller persists them.
#[derive(Debug, Clone)]
pub struct ProofSkillSet {
    proof: Proof,
    attached: Vec<ProofSkill>,
    added: Vec<Skill>,
}

impl ProofSkillSet {
    pub fn new(proof: Proof, attached: Vec<ProofSkill>) -> Self {
        Self {
            proof,
            attached,
            added: Vec::new(),
        }
    }

    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    /// Persisted associations, in insertion order
    pub fn attached(&self) -> &[ProofSkill] {
        &self.attached
    }

    /// Skills added in this transaction and not yet persisted
    pub fn added(&self) -> &[Skill] {
        &self.added
    }

    pub fn len(&self) -> usize {
        self.attached.len() + self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, skill_id: i64) -> bool {
        self.attached.iter().any(|ps| ps.skill.id == skill_id)
            || self.added.iter().any(|s| s.id == skill_id)
    }

    pub fn ensure_editable(&self) -> Result<(), LedgerError> {
        if self.proof.status != ProofStatus::Draft {
            return Err(LedgerError::conflict("proof status must be DRAFT"));
        }
        Ok(())
    }

    /// Add every skill or none of them.
    pub fn add(&mut self, skills: impl IntoIterator<Item = Skill>) -> Result<(), LedgerError> {
        self.ensure_editable()?;

        let skills: BTreeSet<Skill> = skills.into_iter().collect();
        if let Some(duplicate) = skills.iter().find(|s| self.contains(s.id)) {
            return Err(LedgerError::conflict(format!(
                "skill with id = {} already on proof",
                duplicate.id
            )));
        }

        let mut seen = BTreeSet::new();
        for skill in skills {
            if seen.insert(skill.id) {
                self.added.push(skill);
            }
        }
        Ok(())
    }

    /// Remove the association for `skill_id`. Absent ids are a no-op.
    pub fn remove(&mut self, skill_id: i64) -> Result<Option<ProofSkill>, LedgerError> {
        self.ensure_editable()?;

        self.added.retain(|s| s.id != skill_id);
        match self.attached.iter().position(|ps| ps.skill.id == skill_id) {
            Some(index) => Ok(Some(self.attached.remove(index))),
            None => Ok(None),
        }
    }
}
