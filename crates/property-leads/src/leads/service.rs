use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    Lead, LeadChanges, LeadFilter, LeadId, LeadQuery, LeadStatus, LeadSubmission, LeadUpdate,
    LeadWithAgent, NewLead,
};
use super::scoring::{self, ScoreBand};
use crate::agents::{AgentCode, AgentRecord};
use crate::notify::{notify_new_lead, LeadNotifier};
use crate::repository::{AgentDirectory, LeadRepository, RepositoryError};

pub const DEFAULT_SOURCE: &str = "web_form";

/// Lead persisted by [`LeadService::create`] together with its owning agent.
#[derive(Debug, Clone)]
pub struct CreatedLead {
    pub lead: Lead,
    pub agent: AgentRecord,
}

/// Service composing the agent directory, lead store, and notifier.
pub struct LeadService<R, D, N> {
    leads: Arc<R>,
    agents: Arc<D>,
    notifier: Arc<N>,
}

impl<R, D, N> LeadService<R, D, N>
where
    R: LeadRepository + 'static,
    D: AgentDirectory + 'static,
    N: LeadNotifier + 'static,
{
    pub fn new(leads: Arc<R>, agents: Arc<D>, notifier: Arc<N>) -> Self {
        Self {
            leads,
            agents,
            notifier,
        }
    }

    /// Validate, score, and store a lead form, then alert the agent in the background.
    ///
    /// `query_agent` is consulted only when the form carries no agent code.
    pub async fn create(
        &self,
        submission: LeadSubmission,
        query_agent: Option<String>,
    ) -> Result<CreatedLead, LeadServiceError> {
        let submission = normalize(submission);

        let (Some(customer_name), Some(phone)) =
            (submission.customer_name.clone(), submission.phone.clone())
        else {
            return Err(LeadServiceError::MissingContact);
        };

        let code = submission
            .agent_id
            .clone()
            .or_else(|| non_blank(query_agent))
            .map(AgentCode)
            .ok_or(LeadServiceError::MissingAgentCode)?;

        let agent = self
            .agents
            .find_by_code(&code)
            .await?
            .ok_or_else(|| LeadServiceError::AgentNotFound(code.clone()))?;

        let lead_score = scoring::score_lead(&submission);

        let new_lead = NewLead {
            agent_id: agent.id.clone(),
            customer_name,
            phone,
            email: submission.email,
            budget: submission.budget,
            location: submission.location,
            urgency: submission.urgency,
            financing_status: submission.financing_status,
            property_type: submission.property_type,
            lead_score,
            status: LeadStatus::New,
            source: submission
                .source
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        };

        let lead = self
            .leads
            .insert(new_lead)
            .await
            .map_err(LeadServiceError::SaveFailed)?;
        info!(
            lead_id = %lead.id.0,
            agent = %agent.code,
            score = lead.lead_score,
            band = ScoreBand::from_score(lead.lead_score).label(),
            "lead created"
        );

        let notifier = Arc::clone(&self.notifier);
        let alert_lead = lead.clone();
        let alert_agent = agent.clone();
        tokio::spawn(async move {
            notify_new_lead(notifier.as_ref(), &alert_lead, &alert_agent).await;
        });

        Ok(CreatedLead { lead, agent })
    }

    /// Leads matching every supplied filter, newest first.
    ///
    /// An agent code that resolves to no agent yields an empty list.
    pub async fn list(&self, query: LeadQuery) -> Result<Vec<LeadWithAgent>, LeadServiceError> {
        let agent_id = match query.agent {
            Some(code) => match self.agents.find_by_code(&code).await? {
                Some(agent) => Some(agent.id),
                None => {
                    warn!(agent = %code, "lead listing requested for unknown agent");
                    return Ok(Vec::new());
                }
            },
            None => None,
        };

        let filter = LeadFilter {
            agent_id,
            status: query.status,
            min_score: query.min_score,
        };
        Ok(self.leads.list(&filter).await?)
    }

    pub async fn get(&self, id: &LeadId) -> Result<LeadWithAgent, LeadServiceError> {
        self.leads
            .fetch(id)
            .await?
            .ok_or(LeadServiceError::LeadNotFound)
    }

    /// Apply a partial status/notes update, stamping `updated_at` and, for contact statuses,
    /// `last_contact`.
    pub async fn update(&self, id: &LeadId, update: LeadUpdate) -> Result<Lead, LeadServiceError> {
        let status = match non_blank(update.status) {
            Some(raw) => {
                let status = LeadStatus::from(raw);
                if !status.is_recognized() {
                    return Err(LeadServiceError::InvalidStatus(status.label().to_string()));
                }
                Some(status)
            }
            None => None,
        };

        let now = Utc::now();
        let last_contact = status
            .as_ref()
            .filter(|status| status.marks_contact())
            .map(|_| now);

        let changes = LeadChanges {
            status,
            notes: update.notes,
            updated_at: now,
            last_contact,
        };

        let lead = self
            .leads
            .update(id, changes)
            .await?
            .ok_or(LeadServiceError::LeadNotFound)?;
        info!(lead_id = %lead.id.0, status = lead.status.label(), "lead updated");
        Ok(lead)
    }
}

/// Error raised by the lead service. Display strings are the messages shown to clients.
#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error("Customer name and phone are required")]
    MissingContact,
    #[error("Agent ID is required")]
    MissingAgentCode,
    #[error("Agent not found with ID: {0}")]
    AgentNotFound(AgentCode),
    #[error("Lead not found")]
    LeadNotFound,
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Failed to save lead: {0}")]
    SaveFailed(#[source] RepositoryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LeadServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LeadServiceError::MissingContact
            | LeadServiceError::MissingAgentCode
            | LeadServiceError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            LeadServiceError::AgentNotFound(_) | LeadServiceError::LeadNotFound => {
                StatusCode::NOT_FOUND
            }
            LeadServiceError::SaveFailed(_) | LeadServiceError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the caller. Store failures carry the store's own message.
    pub fn public_message(&self) -> String {
        self.to_string()
    }
}

/// Trim free-text fields and drop blank values so they are stored as null.
fn normalize(submission: LeadSubmission) -> LeadSubmission {
    LeadSubmission {
        agent_id: non_blank(submission.agent_id),
        customer_name: non_blank(submission.customer_name),
        phone: non_blank(submission.phone),
        email: non_blank(submission.email),
        budget: non_blank(submission.budget.map(String::from)).map(Into::into),
        location: non_blank(submission.location),
        urgency: non_blank(submission.urgency.map(String::from)).map(Into::into),
        financing_status: non_blank(submission.financing_status.map(String::from))
            .map(Into::into),
        property_type: non_blank(submission.property_type),
        source: non_blank(submission.source),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
