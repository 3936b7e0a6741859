use std::fmt;

use serde::{Deserialize, Serialize};

/// Internal identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

/// Human-facing agent code such as `AG001`, used on lead forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentCode(pub String);

impl fmt::Display for AgentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account status. Anything other than `active` blocks login and session verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentStatus {
    Active,
    Inactive,
    Other(String),
}

impl AgentStatus {
    pub fn label(&self) -> &str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
            AgentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for AgentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => AgentStatus::Active,
            "inactive" => AgentStatus::Inactive,
            _ => AgentStatus::Other(value),
        }
    }
}

impl From<AgentStatus> for String {
    fn from(value: AgentStatus) -> Self {
        match value {
            AgentStatus::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

/// Agent row as held by the store, including the password hash.
#[derive(Clone, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    #[serde(rename = "agent_id")]
    pub code: AgentCode,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub password_hash: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub package: Option<String>,
}

impl fmt::Debug for AgentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRecord")
            .field("id", &self.id)
            .field("code", &self.code)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("status", &self.status)
            .field("package", &self.package)
            .finish_non_exhaustive()
    }
}

impl AgentRecord {
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    pub fn profile(&self) -> AgentProfile {
        AgentProfile {
            id: self.id.clone(),
            agent_id: self.code.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            package: self.package.clone(),
        }
    }

    pub fn contact(&self) -> AgentContact {
        AgentContact {
            agent_id: self.code.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Sanitized projection returned to authenticated clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    pub id: AgentId,
    pub agent_id: AgentCode,
    pub name: String,
    pub email: String,
    pub package: Option<String>,
}

/// Agent details embedded alongside each lead in list and detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContact {
    pub agent_id: AgentCode,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}
