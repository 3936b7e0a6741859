use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::agents::{AgentCode, AgentId, AgentRecord, AgentStatus};
use crate::leads::domain::{
    BudgetBand, FinancingStatus, Lead, LeadChanges, LeadFilter, LeadId, LeadSubmission,
    LeadWithAgent, NewLead, UrgencyWindow,
};
use crate::leads::{lead_router, LeadService};
use crate::notify::{LeadNotifier, NotifyError, OutboundEmail};
use crate::repository::{AgentDirectory, LeadRepository, RepositoryError};
use crate::store::MemoryStore;

pub(super) type MemoryLeadService = LeadService<MemoryStore, MemoryStore, RecordingNotifier>;

pub(super) fn agent() -> AgentRecord {
    AgentRecord {
        id: AgentId("0b8f3c2e-1d4a-4f6b-9c7e-5a2d1e0f9b31".to_string()),
        code: AgentCode("AG001".to_string()),
        name: "Ada Obi".to_string(),
        email: "ada@example.com".to_string(),
        phone: Some("+2348030000001".to_string()),
        password_hash: String::new(),
        status: AgentStatus::Active,
        package: Some("premium".to_string()),
    }
}

pub(super) fn second_agent() -> AgentRecord {
    AgentRecord {
        id: AgentId("7e21a9d4-6c3b-4e85-8f1a-2b9c0d4e6f72".to_string()),
        code: AgentCode("AG002".to_string()),
        name: "Bayo Lawal".to_string(),
        email: "bayo@example.com".to_string(),
        phone: None,
        password_hash: String::new(),
        status: AgentStatus::Active,
        package: None,
    }
}

/// Form that scores 100: top budget, urgency, and financing plus an email.
pub(super) fn hot_submission() -> LeadSubmission {
    LeadSubmission {
        agent_id: Some("AG001".to_string()),
        customer_name: Some("Tunde Bakare".to_string()),
        phone: Some("+2348012345678".to_string()),
        email: Some("tunde@example.com".to_string()),
        budget: Some(BudgetBand::AboveFiftyMillion),
        location: Some("Lekki Phase 1".to_string()),
        urgency: Some(UrgencyWindow::WithinOneMonth),
        financing_status: Some(FinancingStatus::CashBuyer),
        property_type: Some("Duplex".to_string()),
        source: None,
    }
}

/// Form with only the required fields; scores 20.
pub(super) fn bare_submission(name: &str) -> LeadSubmission {
    LeadSubmission {
        agent_id: Some("AG001".to_string()),
        customer_name: Some(name.to_string()),
        phone: Some("+2348099999999".to_string()),
        ..LeadSubmission::default()
    }
}

pub(super) fn build_service() -> (MemoryLeadService, Arc<MemoryStore>, Arc<RecordingNotifier>) {
    let store = Arc::new(MemoryStore::with_agents([agent(), second_agent()]));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = LeadService::new(store.clone(), store.clone(), notifier.clone());
    (service, store, notifier)
}

pub(super) fn lead_router_with_service(service: MemoryLeadService) -> axum::Router {
    lead_router(Arc::new(service))
}

#[derive(Debug, Default)]
pub(super) struct RecordingNotifier {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingNotifier {
    pub(super) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

impl LeadNotifier for RecordingNotifier {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotifyError> {
        self.sent.lock().expect("notifier lock").push(email);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(super) struct FailingNotifier;

impl LeadNotifier for FailingNotifier {
    async fn send(&self, _email: OutboundEmail) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

/// Yield to the runtime until the background alert has been recorded.
pub(super) async fn wait_for_alerts(notifier: &RecordingNotifier, count: usize) -> Vec<OutboundEmail> {
    for _ in 0..100 {
        let sent = notifier.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    notifier.sent()
}

/// Store whose every call fails as if the database were offline.
#[derive(Debug, Default)]
pub(super) struct UnavailableStore;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

impl AgentDirectory for UnavailableStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<AgentRecord>, RepositoryError> {
        Err(offline())
    }

    async fn find_by_id(&self, _id: &AgentId) -> Result<Option<AgentRecord>, RepositoryError> {
        Err(offline())
    }

    async fn find_by_code(&self, _code: &AgentCode) -> Result<Option<AgentRecord>, RepositoryError> {
        Err(offline())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(offline())
    }
}

impl LeadRepository for UnavailableStore {
    async fn insert(&self, _lead: NewLead) -> Result<Lead, RepositoryError> {
        Err(offline())
    }

    async fn list(&self, _filter: &LeadFilter) -> Result<Vec<LeadWithAgent>, RepositoryError> {
        Err(offline())
    }

    async fn fetch(&self, _id: &LeadId) -> Result<Option<LeadWithAgent>, RepositoryError> {
        Err(offline())
    }

    async fn update(
        &self,
        _id: &LeadId,
        _changes: LeadChanges,
    ) -> Result<Option<Lead>, RepositoryError> {
        Err(offline())
    }
}

/// Lead table that refuses every write and read, behind a working agent directory.
#[derive(Debug, Default)]
pub(super) struct RejectingLeads;

pub(super) fn missing_column() -> RepositoryError {
    RepositoryError::Rejected {
        status: 400,
        message: "column leads.lead_score does not exist".to_string(),
    }
}

impl LeadRepository for RejectingLeads {
    async fn insert(&self, _lead: NewLead) -> Result<Lead, RepositoryError> {
        Err(missing_column())
    }

    async fn list(&self, _filter: &LeadFilter) -> Result<Vec<LeadWithAgent>, RepositoryError> {
        Err(missing_column())
    }

    async fn fetch(&self, _id: &LeadId) -> Result<Option<LeadWithAgent>, RepositoryError> {
        Err(missing_column())
    }

    async fn update(
        &self,
        _id: &LeadId,
        _changes: LeadChanges,
    ) -> Result<Option<Lead>, RepositoryError> {
        Err(missing_column())
    }
}

pub(super) fn rejecting_service(
) -> LeadService<RejectingLeads, MemoryStore, RecordingNotifier> {
    LeadService::new(
        Arc::new(RejectingLeads),
        Arc::new(MemoryStore::with_agents([agent()])),
        Arc::new(RecordingNotifier::default()),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
