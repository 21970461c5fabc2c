//! Static token table
//!
//! Tokens are configured as `login:token` pairs. Only SHA-256 digests of the
//! tokens are kept in memory.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::debug;

use super::{Principal, PrincipalResolver};
use crate::config::sanitize_for_logging;
use crate::error::LedgerError;

type TokenDigest = [u8; 32];

fn digest(token: &str) -> TokenDigest {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

#[derive(Debug, Clone, Default)]
pub struct TokenResolver {
    logins: HashMap<TokenDigest, String>,
}

impl TokenResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, login: impl Into<String>, token: &str) -> Self {
        self.insert(login, token);
        self
    }

    pub fn insert(&mut self, login: impl Into<String>, token: &str) {
        self.logins.insert(digest(token), login.into());
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a (String, String)>) -> Self {
        let mut resolver = Self::new();
        for (login, token) in pairs {
            resolver.insert(login.clone(), token);
        }
        resolver
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }
}

#[async_trait]
impl PrincipalResolver for TokenResolver {
    async fn resolve(&self, token: &str) -> Result<Principal, LedgerError> {
        match self.logins.get(&digest(token)) {
            Some(login) => {
                debug!(login = %login, "Token resolved");
                Ok(Principal::new(login.clone()))
            }
            None => {
                debug!(token = %sanitize_for_logging(token), "Unknown token");
                Err(LedgerError::AuthenticationRequired(
                    "invalid authentication token".to_string(),
                ))
            }
        }
    }
}
