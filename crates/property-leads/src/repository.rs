//! Storage abstractions shared by the lead and authentication services.
//!
//! Every operation is async and may suspend while the store is consulted. Uniqueness of agent
//! codes and emails is enforced by the store itself.

use std::future::Future;

use crate::agents::{AgentCode, AgentId, AgentRecord};
use crate::leads::domain::{Lead, LeadChanges, LeadFilter, LeadId, LeadWithAgent, NewLead};

/// Read access to agent records.
pub trait AgentDirectory: Send + Sync {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<AgentRecord>, RepositoryError>> + Send;

    fn find_by_id(
        &self,
        id: &AgentId,
    ) -> impl Future<Output = Result<Option<AgentRecord>, RepositoryError>> + Send;

    fn find_by_code(
        &self,
        code: &AgentCode,
    ) -> impl Future<Output = Result<Option<AgentRecord>, RepositoryError>> + Send;

    /// Cheap round trip used by the health probe.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Persistence for lead rows.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, lead: NewLead) -> impl Future<Output = Result<Lead, RepositoryError>> + Send;

    /// Matching leads, newest first, each joined with its agent's contact details.
    fn list(
        &self,
        filter: &LeadFilter,
    ) -> impl Future<Output = Result<Vec<LeadWithAgent>, RepositoryError>> + Send;

    fn fetch(
        &self,
        id: &LeadId,
    ) -> impl Future<Output = Result<Option<LeadWithAgent>, RepositoryError>> + Send;

    /// Apply `changes` and return the updated row, or `None` when no lead has `id`.
    fn update(
        &self,
        id: &LeadId,
        changes: LeadChanges,
    ) -> impl Future<Output = Result<Option<Lead>, RepositoryError>> + Send;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected store response: {0}")]
    Decode(String),
}
