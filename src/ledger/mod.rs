//! Kudos Ledger Core
//!
//! Two services sharing one store:
//!
//! ```text
//! ┌──────────────────┐  reads skills of  ┌──────────────────┐
//! │   KudosLedger    │──────────────────►│ ProofSkillGraph  │
//! │ balances, awards │                   │ proof <-> skills │
//! └────────┬─────────┘                   └────────┬─────────┘
//!          │        one transaction per call       │
//!          └──────────────►  LedgerStore  ◄────────┘
//! ```
//!
//! Every operation validates all of its preconditions before the first
//! mutation and runs as a single transaction.

mod kudos;
mod proof_skills;

pub use kudos::{split_award, KudosLedger};
pub use proof_skills::ProofSkillGraph;

use crate::auth::Principal;
use crate::error::LedgerError;
use crate::models::{Proof, UserInfo};
use crate::store::LedgerTx;

async fn user_for(tx: &mut dyn LedgerTx, principal: &Principal) -> Result<UserInfo, LedgerError> {
    tx.user_by_login(&principal.login).await?.ok_or_else(|| {
        LedgerError::not_found(format!("user with login = {} not found", principal.login))
    })
}

async fn require_talent(tx: &mut dyn LedgerTx, talent_id: i64) -> Result<(), LedgerError> {
    match tx.talent(talent_id).await? {
        Some(_) => Ok(()),
        None => Err(LedgerError::not_found(format!(
            "talent with id = {} not found",
            talent_id
        ))),
    }
}

fn proof_not_found(proof_id: i64) -> LedgerError {
    LedgerError::not_found(format!("proof with id = {} not found", proof_id))
}

fn owns(user: &UserInfo, proof: &Proof) -> bool {
    user.talent_id == Some(proof.talent_id)
}
