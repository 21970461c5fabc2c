//! Kudos models
//!
//! Kudos records are immutable, append-only facts. Summaries are derived
//! from them on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::account::Sponsor;

/// One sponsor's endorsement of one proof skill. `amount` is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KudosRecord {
    pub id: i64,
    pub sponsor_id: i64,
    pub proof_skill_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Record to be appended by an award
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewKudos {
    pub sponsor_id: i64,
    pub proof_skill_id: i64,
    pub amount: i64,
}

/// Public face of a sponsor inside a kudos breakdown.
/// Empty when the sponsor behind a record no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorView {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
}

impl From<&Sponsor> for SponsorView {
    fn from(sponsor: &Sponsor) -> Self {
        Self {
            id: Some(sponsor.id),
            first_name: sponsor.first_name.clone(),
            last_name: sponsor.last_name.clone(),
            image: sponsor.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorKudos {
    pub kudos_id: i64,
    pub amount: i64,
    pub sponsor: SponsorView,
}

/// How the per-skill breakdown of a proof summary is keyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownMode {
    /// One entry per kudos record
    #[default]
    PerRecord,
    /// Keyed by amount; sponsors awarding equal amounts to a skill collapse
    /// into the last one seen
    ByAmount,
}

impl FromStr for BreakdownMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "record" | "per_record" => Ok(BreakdownMode::PerRecord),
            "amount" | "by_amount" => Ok(BreakdownMode::ByAmount),
            other => Err(format!("unknown breakdown mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillBreakdown {
    ByAmount(BTreeMap<i64, SponsorView>),
    PerRecord(Vec<SponsorKudos>),
}

impl SkillBreakdown {
    pub fn len(&self) -> usize {
        match self {
            SkillBreakdown::ByAmount(entries) => entries.len(),
            SkillBreakdown::PerRecord(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofKudosSummary {
    pub total_kudos: i64,
    /// Skill name -> breakdown. Only present for the proof's owner.
    pub by_sponsor_per_skill: Option<BTreeMap<String, SkillBreakdown>>,
}
