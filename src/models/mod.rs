//! Ledger data models
//!
//! Contains the entities the core reads and mutates:
//! - Accounts (users, sponsors, talents)
//! - Proofs, the skill catalogue and the proof-skill association
//! - Kudos records and the summary views built from them

pub mod account;
pub mod kudos;
pub mod proof;

pub use account::{Sponsor, Talent, UserInfo};
pub use kudos::{
    BreakdownMode, KudosRecord, NewKudos, ProofKudosSummary, SkillBreakdown, SponsorKudos,
    SponsorView,
};
pub use proof::{Proof, ProofSkill, ProofSkillSet, ProofStatus, Skill};
