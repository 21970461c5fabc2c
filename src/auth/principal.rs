use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Authenticated caller. The linked talent and sponsor are looked up from the
/// user record by `login` inside each operation's transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub login: String,
}

impl Principal {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

/// Turns a bearer token into a principal
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Fails with `AuthenticationRequired` when the token is unknown
    async fn resolve(&self, token: &str) -> Result<Principal, LedgerError>;
}
