use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::agents::{AgentCode, AgentId, AgentRecord, AgentStatus};
use crate::leads::domain::{Lead, LeadChanges, LeadFilter, LeadId, LeadWithAgent, NewLead};
use crate::repository::{AgentDirectory, LeadRepository, RepositoryError};

/// In-process store used by tests and local demos.
///
/// Leads are joined with their agent on read, the same shape the hosted store returns.
#[derive(Debug, Default)]
pub struct MemoryStore {
    agents: Mutex<Vec<AgentRecord>>,
    leads: Mutex<Vec<Lead>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: impl IntoIterator<Item = AgentRecord>) -> Self {
        Self {
            agents: Mutex::new(agents.into_iter().collect()),
            leads: Mutex::default(),
        }
    }

    /// Change an agent's status in place. Returns `false` when no agent has `id`.
    pub fn set_agent_status(
        &self,
        id: &AgentId,
        status: AgentStatus,
    ) -> Result<bool, RepositoryError> {
        let mut agents = lock(&self.agents)?;
        Ok(match agents.iter_mut().find(|agent| &agent.id == id) {
            Some(agent) => {
                agent.status = status;
                true
            }
            None => false,
        })
    }

    pub fn lead_count(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.leads)?.len())
    }

    fn find_agent<F>(&self, predicate: F) -> Result<Option<AgentRecord>, RepositoryError>
    where
        F: Fn(&AgentRecord) -> bool,
    {
        Ok(lock(&self.agents)?.iter().find(|agent| predicate(agent)).cloned())
    }

    fn with_agent(&self, lead: Lead) -> Result<LeadWithAgent, RepositoryError> {
        let agents = self.find_agent(|agent| agent.id == lead.agent_id)?;
        Ok(LeadWithAgent {
            agents: agents.map(|agent| agent.contact()),
            lead,
        })
    }
}

impl AgentDirectory for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AgentRecord>, RepositoryError> {
        self.find_agent(|agent| agent.email == email)
    }

    async fn find_by_id(&self, id: &AgentId) -> Result<Option<AgentRecord>, RepositoryError> {
        self.find_agent(|agent| &agent.id == id)
    }

    async fn find_by_code(&self, code: &AgentCode) -> Result<Option<AgentRecord>, RepositoryError> {
        self.find_agent(|agent| &agent.code == code)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        lock(&self.agents).map(|_| ())
    }
}

impl LeadRepository for MemoryStore {
    async fn insert(&self, lead: NewLead) -> Result<Lead, RepositoryError> {
        let stored = Lead {
            id: LeadId(uuid::Uuid::new_v4().to_string()),
            agent_id: lead.agent_id,
            customer_name: lead.customer_name,
            phone: lead.phone,
            email: lead.email,
            budget: lead.budget,
            location: lead.location,
            urgency: lead.urgency,
            financing_status: lead.financing_status,
            property_type: lead.property_type,
            lead_score: lead.lead_score,
            status: lead.status,
            notes: None,
            source: lead.source,
            created_at: Utc::now(),
            updated_at: None,
            last_contact: None,
        };
        lock(&self.leads)?.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, filter: &LeadFilter) -> Result<Vec<LeadWithAgent>, RepositoryError> {
        let mut matching: Vec<Lead> = lock(&self.leads)?
            .iter()
            .rev()
            .filter(|lead| filter.matches(lead))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        matching
            .into_iter()
            .map(|lead| self.with_agent(lead))
            .collect()
    }

    async fn fetch(&self, id: &LeadId) -> Result<Option<LeadWithAgent>, RepositoryError> {
        let lead = lock(&self.leads)?.iter().find(|lead| &lead.id == id).cloned();
        lead.map(|lead| self.with_agent(lead)).transpose()
    }

    async fn update(
        &self,
        id: &LeadId,
        changes: LeadChanges,
    ) -> Result<Option<Lead>, RepositoryError> {
        let mut leads = lock(&self.leads)?;
        let Some(lead) = leads.iter_mut().find(|lead| &lead.id == id) else {
            return Ok(None);
        };

        if let Some(status) = changes.status {
            lead.status = status;
        }
        if let Some(notes) = changes.notes {
            lead.notes = notes;
        }
        if let Some(last_contact) = changes.last_contact {
            lead.last_contact = Some(last_contact);
        }
        lead.updated_at = Some(changes.updated_at);

        Ok(Some(lead.clone()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
}
