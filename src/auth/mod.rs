//! Caller identity
//!
//! A `Principal` is the resolved identity of the caller for one request. It
//! is passed explicitly into every ledger operation; nothing in the crate
//! keeps an ambient "current user".

mod principal;
mod token;

pub use principal::{Principal, PrincipalResolver};
pub use token::TokenResolver;
