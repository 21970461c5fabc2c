//! Account models
//!
//! A user account links to at most one talent profile and at most one
//! sponsor wallet. The ledger never creates accounts; it only resolves them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub login: String,
    pub talent_id: Option<i64>,
    pub sponsor_id: Option<i64>,
}

/// Sponsor wallet. `kudos_balance` is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub kudos_balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talent {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
