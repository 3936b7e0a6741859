//! Lead intake, scoring, and the agent-facing lead pipeline.

pub mod domain;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    BudgetBand, FinancingStatus, Lead, LeadChanges, LeadFilter, LeadId, LeadQuery, LeadReceipt,
    LeadStatus, LeadSubmission, LeadUpdate, LeadWithAgent, NewLead, UrgencyWindow,
};
pub use router::{lead_router, LeadPayload};
pub use scoring::{score_lead, ScoreBand, ScoreBreakdown, ScoreComponent, ScoreFactor};
pub use service::{CreatedLead, LeadService, LeadServiceError};
