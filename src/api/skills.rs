//! Proof skill endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Caller, LedgerApiState, MaybeCaller};
use crate::error::LedgerError;
use crate::models::Skill;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProofSkillsRequest {
    pub skills: BTreeSet<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillsOnProofResponse {
    pub skills: BTreeSet<Skill>,
}

#[derive(Debug, Deserialize)]
pub struct SkillFilterQuery {
    #[serde(rename = "filter-by", default)]
    pub filter_by: String,
}

/// POST /talents/{talent_id}/proofs/{proof_id}/skills - Attach skills to a draft proof
pub async fn attach_skills(
    State(state): State<LedgerApiState>,
    Path((talent_id, proof_id)): Path<(i64, i64)>,
    Caller(principal): Caller,
    Json(req): Json<ProofSkillsRequest>,
) -> Result<StatusCode, LedgerError> {
    state
        .skills
        .attach_skills(talent_id, proof_id, &req.skills, &principal)
        .await?;
    Ok(StatusCode::OK)
}

/// GET /proofs/{proof_id}/skills - Skills on a proof
pub async fn list_proof_skills(
    State(state): State<LedgerApiState>,
    Path(proof_id): Path<i64>,
    MaybeCaller(principal): MaybeCaller,
) -> Result<Json<SkillsOnProofResponse>, LedgerError> {
    let skills = state.skills.list_skills(proof_id, principal.as_ref()).await?;
    Ok(Json(SkillsOnProofResponse { skills }))
}

/// DELETE /talents/{talent_id}/proofs/{proof_id}/skills/{skill_id} - Detach a skill
pub async fn detach_skill(
    State(state): State<LedgerApiState>,
    Path((talent_id, proof_id, skill_id)): Path<(i64, i64, i64)>,
    Caller(principal): Caller,
) -> Result<StatusCode, LedgerError> {
    state
        .skills
        .detach_skill(talent_id, proof_id, skill_id, &principal)
        .await?;
    Ok(StatusCode::OK)
}

/// GET /skills?filter-by= - Search the skill catalogue
pub async fn search_skills(
    State(state): State<LedgerApiState>,
    Query(query): Query<SkillFilterQuery>,
) -> Result<Json<Vec<Skill>>, LedgerError> {
    let skills = state.skills.search_catalogue(&query.filter_by).await?;
    Ok(Json(skills))
}
