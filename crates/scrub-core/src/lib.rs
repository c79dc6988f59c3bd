//! Core domain models for scrub
//!
//! This crate contains:
//! - Detection models (Span, Match, MatchSet)
//! - The audit event schema (DetectionEvent)
//! - The Vault of literal secrets and named patterns
//! - The error taxonomy shared by the other crates

pub mod error;
pub mod event;
pub mod matches;
pub mod vault;

pub use error::{AuditWriteError, DetectorError, LoadError, PatternError};
pub use event::{DetectionEvent, OverlapPolicy, Phase, preview};
pub use matches::{Match, MatchKind, MatchSet, Span};
pub use vault::{FileVaultLoader, StaticVaultLoader, Vault, VaultBuilder, VaultLoader};
