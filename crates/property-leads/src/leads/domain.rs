use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::agents::{AgentCode, AgentContact, AgentId};

/// Identifier wrapper for stored leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

/// Budget bands offered on the lead form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BudgetBand {
    AboveFiftyMillion,
    TwentyToFiftyMillion,
    FiveToTwentyMillion,
    UnderFiveMillion,
    Other(String),
}

impl BudgetBand {
    pub fn label(&self) -> &str {
        match self {
            BudgetBand::AboveFiftyMillion => "Above ₦50 million",
            BudgetBand::TwentyToFiftyMillion => "₦20 - 50 million",
            BudgetBand::FiveToTwentyMillion => "₦5 - 20 million",
            BudgetBand::UnderFiveMillion => "Under ₦5 million",
            BudgetBand::Other(raw) => raw,
        }
    }
}

impl From<String> for BudgetBand {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Above ₦50 million" => BudgetBand::AboveFiftyMillion,
            "₦20 - 50 million" => BudgetBand::TwentyToFiftyMillion,
            "₦5 - 20 million" => BudgetBand::FiveToTwentyMillion,
            "Under ₦5 million" => BudgetBand::UnderFiveMillion,
            _ => BudgetBand::Other(value),
        }
    }
}

impl From<BudgetBand> for String {
    fn from(value: BudgetBand) -> Self {
        match value {
            BudgetBand::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

/// How soon the prospect intends to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UrgencyWindow {
    WithinOneMonth,
    OneToThreeMonths,
    ThreeToSixMonths,
    JustBrowsing,
    Other(String),
}

impl UrgencyWindow {
    pub fn label(&self) -> &str {
        match self {
            UrgencyWindow::WithinOneMonth => "Within 1 month (Urgent!)",
            UrgencyWindow::OneToThreeMonths => "1-3 months",
            UrgencyWindow::ThreeToSixMonths => "3-6 months",
            UrgencyWindow::JustBrowsing => "Just browsing for now",
            UrgencyWindow::Other(raw) => raw,
        }
    }
}

impl From<String> for UrgencyWindow {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Within 1 month (Urgent!)" => UrgencyWindow::WithinOneMonth,
            "1-3 months" => UrgencyWindow::OneToThreeMonths,
            "3-6 months" => UrgencyWindow::ThreeToSixMonths,
            "Just browsing for now" => UrgencyWindow::JustBrowsing,
            _ => UrgencyWindow::Other(value),
        }
    }
}

impl From<UrgencyWindow> for String {
    fn from(value: UrgencyWindow) -> Self {
        match value {
            UrgencyWindow::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

/// Financing readiness declared by the prospect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinancingStatus {
    ReadyToPay,
    CashBuyer,
    AwaitingMortgageApproval,
    NeedsFinancingHelp,
    NotSure,
    Other(String),
}

impl FinancingStatus {
    pub fn label(&self) -> &str {
        match self {
            FinancingStatus::ReadyToPay => "Ready to pay (cash/approved loan)",
            FinancingStatus::CashBuyer => "Cash buyer (no loan needed)",
            FinancingStatus::AwaitingMortgageApproval => "Working on mortgage/loan approval",
            FinancingStatus::NeedsFinancingHelp => "Need help with financing options",
            FinancingStatus::NotSure => "Not sure yet",
            FinancingStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for FinancingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Ready to pay (cash/approved loan)" => FinancingStatus::ReadyToPay,
            "Cash buyer (no loan needed)" => FinancingStatus::CashBuyer,
            "Working on mortgage/loan approval" => FinancingStatus::AwaitingMortgageApproval,
            "Need help with financing options" => FinancingStatus::NeedsFinancingHelp,
            "Not sure yet" => FinancingStatus::NotSure,
            _ => FinancingStatus::Other(value),
        }
    }
}

impl From<FinancingStatus> for String {
    fn from(value: FinancingStatus) -> Self {
        match value {
            FinancingStatus::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

/// Pipeline status tracked for each lead.
///
/// `Other` only appears when reading rows written outside this service; updates must name one
/// of the recognized values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeadStatus {
    New,
    Contacted,
    SiteVisitBooked,
    Negotiating,
    ClosedWon,
    ClosedLost,
    Other(String),
}

impl LeadStatus {
    pub fn label(&self) -> &str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::SiteVisitBooked => "site_visit_booked",
            LeadStatus::Negotiating => "negotiating",
            LeadStatus::ClosedWon => "closed_won",
            LeadStatus::ClosedLost => "closed_lost",
            LeadStatus::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, LeadStatus::Other(_))
    }

    /// Statuses that record a conversation with the prospect and stamp `last_contact`.
    pub fn marks_contact(&self) -> bool {
        matches!(self, LeadStatus::Contacted | LeadStatus::SiteVisitBooked)
    }
}

impl From<String> for LeadStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "new" => LeadStatus::New,
            "contacted" => LeadStatus::Contacted,
            "site_visit_booked" => LeadStatus::SiteVisitBooked,
            "negotiating" => LeadStatus::Negotiating,
            "closed_won" => LeadStatus::ClosedWon,
            "closed_lost" => LeadStatus::ClosedLost,
            _ => LeadStatus::Other(value),
        }
    }
}

impl From<LeadStatus> for String {
    fn from(value: LeadStatus) -> Self {
        match value {
            LeadStatus::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

/// Raw lead form as posted by the public website.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LeadSubmission {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Accepts a JSON number as well as text; widgets sometimes post digits unquoted.
    #[serde(default, deserialize_with = "deserialize_phone")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub budget: Option<BudgetBand>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub urgency: Option<UrgencyWindow>,
    #[serde(default)]
    pub financing_status: Option<FinancingStatus>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Row inserted for a freshly scored lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLead {
    pub agent_id: AgentId,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub budget: Option<BudgetBand>,
    pub location: Option<String>,
    pub urgency: Option<UrgencyWindow>,
    pub financing_status: Option<FinancingStatus>,
    pub property_type: Option<String>,
    pub lead_score: u8,
    pub status: LeadStatus,
    pub source: String,
}

/// Stored lead row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub agent_id: AgentId,
    pub customer_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub budget: Option<BudgetBand>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub urgency: Option<UrgencyWindow>,
    #[serde(default)]
    pub financing_status: Option<FinancingStatus>,
    #[serde(default)]
    pub property_type: Option<String>,
    pub lead_score: u8,
    pub status: LeadStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_contact: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn receipt(&self) -> LeadReceipt {
        LeadReceipt {
            id: self.id.clone(),
            customer_name: self.customer_name.clone(),
            lead_score: self.lead_score,
            status: self.status.clone(),
        }
    }
}

/// Lead row joined with its owning agent's contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadWithAgent {
    #[serde(flatten)]
    pub lead: Lead,
    #[serde(default)]
    pub agents: Option<AgentContact>,
}

/// Minimal public projection returned after a lead is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadReceipt {
    pub id: LeadId,
    pub customer_name: String,
    pub lead_score: u8,
    pub status: LeadStatus,
}

/// Partial update requested by an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LeadUpdate {
    #[serde(default)]
    pub status: Option<String>,
    /// `Some(None)` clears the notes, `None` leaves them untouched.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub notes: Option<Option<String>>,
}

/// Column changes applied by the store for a [`LeadUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
}

/// Filters accepted by the lead listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadQuery {
    pub agent: Option<AgentCode>,
    pub status: Option<LeadStatus>,
    pub min_score: Option<i32>,
}

/// Store-level filter once the agent code has been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub agent_id: Option<AgentId>,
    pub status: Option<LeadStatus>,
    pub min_score: Option<i32>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        self.agent_id
            .as_ref()
            .map_or(true, |agent_id| &lead.agent_id == agent_id)
            && self
                .status
                .as_ref()
                .map_or(true, |status| &lead.status == status)
            && self
                .min_score
                .map_or(true, |min| i32::from(lead.lead_score) >= min)
    }
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn deserialize_phone<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PhoneValue {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<PhoneValue>::deserialize(deserializer)?.map(|value| match value {
            PhoneValue::Text(text) => text,
            PhoneValue::Number(number) => number.to_string(),
        }),
    )
}
