//! New-lead email alerts for agents.
//!
//! Delivery is best-effort: [`notify_new_lead`] never fails, it reports a
//! [`NotificationOutcome`] and logs what happened.

pub mod mailer;
pub mod template;

use std::future::Future;

use tracing::{info, warn};

use crate::agents::AgentRecord;
use crate::leads::domain::Lead;

pub use mailer::{Mailer, SmtpMailer};
pub use template::{render_new_lead_email, OutboundEmail};

/// Outbound transport for rendered alerts.
pub trait LeadNotifier: Send + Sync {
    fn send(&self, email: OutboundEmail) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("mail transport disabled")]
    Disabled,
    #[error("invalid mailbox '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// Result of a single alert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Delivered,
    Skipped,
    Failed(String),
}

/// Render and send the new-lead alert to the owning agent.
pub async fn notify_new_lead<N>(notifier: &N, lead: &Lead, agent: &AgentRecord) -> NotificationOutcome
where
    N: LeadNotifier,
{
    let email = render_new_lead_email(lead, agent);

    match notifier.send(email).await {
        Ok(()) => {
            info!(lead_id = %lead.id.0, to = %agent.email, "new lead alert sent");
            NotificationOutcome::Delivered
        }
        Err(NotifyError::Disabled) => {
            info!(lead_id = %lead.id.0, "mail transport disabled; new lead alert skipped");
            NotificationOutcome::Skipped
        }
        Err(err) => {
            warn!(lead_id = %lead.id.0, to = %agent.email, error = %err, "new lead alert failed");
            NotificationOutcome::Failed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentCode, AgentId, AgentStatus};
    use crate::leads::domain::{LeadId, LeadStatus};
    use chrono::Utc;

    struct RefusingRelay;

    impl LeadNotifier for RefusingRelay {
        async fn send(&self, _email: OutboundEmail) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("535 authentication failed".to_string()))
        }
    }

    struct AcceptingRelay;

    impl LeadNotifier for AcceptingRelay {
        async fn send(&self, _email: OutboundEmail) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn agent() -> AgentRecord {
        AgentRecord {
            id: AgentId("agent-1".to_string()),
            code: AgentCode("AG001".to_string()),
            name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            password_hash: String::new(),
            status: AgentStatus::Active,
            package: None,
        }
    }

    fn lead() -> Lead {
        Lead {
            id: LeadId("lead-1".to_string()),
            agent_id: AgentId("agent-1".to_string()),
            customer_name: "Tunde".to_string(),
            phone: "+2348012345678".to_string(),
            email: None,
            budget: None,
            location: None,
            urgency: None,
            financing_status: None,
            property_type: None,
            lead_score: 20,
            status: LeadStatus::New,
            notes: None,
            source: "web_form".to_string(),
            created_at: Utc::now(),
            updated_at: None,
            last_contact: None,
        }
    }

    #[tokio::test]
    async fn outcomes_reflect_transport_result() {
        assert_eq!(
            notify_new_lead(&AcceptingRelay, &lead(), &agent()).await,
            NotificationOutcome::Delivered
        );
        assert_eq!(
            notify_new_lead(&Mailer::Disabled, &lead(), &agent()).await,
            NotificationOutcome::Skipped
        );
        assert_eq!(
            notify_new_lead(&RefusingRelay, &lead(), &agent()).await,
            NotificationOutcome::Failed(
                "mail transport unavailable: 535 authentication failed".to_string()
            )
        );
    }
}
