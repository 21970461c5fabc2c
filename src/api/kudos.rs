//! Kudos endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{Caller, LedgerApiState};
use crate::error::LedgerError;
use crate::models::ProofKudosSummary;

#[derive(Debug, Serialize, Deserialize)]
pub struct KudosAmountResponse {
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AwardKudosRequest {
    pub amount: i64,
}

/// GET /sponsors/{sponsor_id}/kudos - Sponsor's remaining kudos
pub async fn get_sponsor_kudos(
    State(state): State<LedgerApiState>,
    Path(sponsor_id): Path<i64>,
    Caller(principal): Caller,
) -> Result<Json<KudosAmountResponse>, LedgerError> {
    let amount = state.kudos.sponsor_balance(sponsor_id, &principal).await?;
    Ok(Json(KudosAmountResponse { amount }))
}

/// GET /proofs/{proof_id}/kudos - Kudos summary of a proof
pub async fn get_proof_kudos(
    State(state): State<LedgerApiState>,
    Path(proof_id): Path<i64>,
    Caller(principal): Caller,
) -> Result<Json<ProofKudosSummary>, LedgerError> {
    let summary = state.kudos.proof_kudos_summary(proof_id, &principal).await?;
    Ok(Json(summary))
}

/// POST /proofs/{proof_id}/kudos - Award kudos to a published proof
pub async fn award_kudos(
    State(state): State<LedgerApiState>,
    Path(proof_id): Path<i64>,
    Caller(principal): Caller,
    Json(req): Json<AwardKudosRequest>,
) -> Result<StatusCode, LedgerError> {
    state.kudos.award(proof_id, req.amount, &principal).await?;
    Ok(StatusCode::OK)
}
