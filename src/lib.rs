//! Kudos Ledger
//!
//! Talents publish proofs of their skills; sponsors spend a scarce point
//! currency (kudos) to endorse those proofs. Each award is split evenly
//! across the skills claimed on the proof.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs      - Crate root with re-exports
//! ├── main.rs     - Server entrypoint
//! ├── config.rs   - Configuration management
//! ├── error.rs    - Failure kinds and status mapping
//! ├── auth/       - Principal and token resolution
//! ├── models/     - Accounts, proofs, skills, kudos records
//! ├── ledger/     - Core services
//! │   ├── kudos.rs        - Balances, awards, proof summaries
//! │   └── proof_skills.rs - Skill attach/detach gated by proof status
//! ├── store/      - Transactional storage
//! │   ├── memory.rs   - In-process store
//! │   ├── pool.rs     - PostgreSQL pool and schema
//! │   └── postgres.rs - PostgreSQL transaction
//! └── api/        - HTTP endpoints
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use api::{create_router, LedgerApiState};
pub use auth::{Principal, PrincipalResolver, TokenResolver};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use ledger::{split_award, KudosLedger, ProofSkillGraph};
pub use models::{
    BreakdownMode, KudosRecord, Proof, ProofKudosSummary, ProofSkill, ProofSkillSet, ProofStatus,
    Skill, SkillBreakdown, Sponsor, SponsorKudos, SponsorView, Talent, UserInfo,
};
pub use store::{LedgerStore, LedgerTx, MemoryStore, PgStore};
