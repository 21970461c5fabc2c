//! HTTP API for the kudos ledger
//!
//! Thin boundary over the ledger core:
//! - Kudos endpoints (sponsor balance, proof summary, award)
//! - Proof skill endpoints (attach, list, detach, catalogue search)
//! - Principal middleware (bearer token -> `Principal`)
//! - `LedgerError` -> status code + JSON body

pub mod error;
pub mod kudos;
pub mod middleware;
pub mod skills;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::PrincipalResolver;
use crate::ledger::{KudosLedger, ProofSkillGraph};

pub use error::ErrorBody;
pub use middleware::{principal_middleware, security_headers_middleware, Caller, MaybeCaller};

/// Shared state for ledger endpoints
#[derive(Clone)]
pub struct LedgerApiState {
    pub kudos: Arc<KudosLedger>,
    pub skills: Arc<ProofSkillGraph>,
}

/// Create the ledger API router
pub fn create_router(state: LedgerApiState, resolver: Arc<dyn PrincipalResolver>) -> Router {
    Router::new()
        .route("/sponsors/{sponsor_id}/kudos", get(kudos::get_sponsor_kudos))
        .route(
            "/proofs/{proof_id}/kudos",
            get(kudos::get_proof_kudos).post(kudos::award_kudos),
        )
        .route("/proofs/{proof_id}/skills", get(skills::list_proof_skills))
        .route(
            "/talents/{talent_id}/proofs/{proof_id}/skills",
            post(skills::attach_skills),
        )
        .route(
            "/talents/{talent_id}/proofs/{proof_id}/skills/{skill_id}",
            delete(skills::detach_skill),
        )
        .route("/skills", get(skills::search_skills))
        .layer(from_fn_with_state(resolver, principal_middleware))
        .with_state(state)
}
