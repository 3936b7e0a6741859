//! Hosted Postgres store reached through its PostgREST interface.
//!
//! Tables: `agents` and `leads`. Lead reads embed the owning agent through the
//! `agents(agent_id,name,email,phone)` resource embedding.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::agents::{AgentCode, AgentId, AgentRecord};
use crate::config::StoreConfig;
use crate::leads::domain::{Lead, LeadChanges, LeadFilter, LeadId, LeadWithAgent, NewLead};
use crate::repository::{AgentDirectory, LeadRepository, RepositoryError};

const AGENTS_TABLE: &str = "agents";
const LEADS_TABLE: &str = "leads";
const LEAD_SELECT: &str = "*,agents(agent_id,name,email,phone)";

#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: Client,
    base: String,
}

impl PostgrestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, RepositoryError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| RepositoryError::Unavailable(format!("invalid api key header: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| RepositoryError::Unavailable(format!("invalid auth header: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| RepositoryError::Unavailable(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base: config.url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, RepositoryError> {
        Url::parse(&format!("{}/rest/v1/{table}", self.base))
            .map_err(|e| RepositoryError::Unavailable(format!("invalid store url: {e}")))
    }

    async fn find_agent(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<AgentRecord>, RepositoryError> {
        let request = self
            .client
            .get(self.table_url(AGENTS_TABLE)?)
            .query(&[
                ("select", "*".to_string()),
                (column, format!("eq.{value}")),
                ("limit", "1".to_string()),
            ]);
        let rows: Vec<AgentRecord> = fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }
}

impl AgentDirectory for PostgrestStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AgentRecord>, RepositoryError> {
        self.find_agent("email", email).await
    }

    async fn find_by_id(&self, id: &AgentId) -> Result<Option<AgentRecord>, RepositoryError> {
        if !is_row_id(&id.0) {
            return Ok(None);
        }
        self.find_agent("id", &id.0).await
    }

    async fn find_by_code(&self, code: &AgentCode) -> Result<Option<AgentRecord>, RepositoryError> {
        self.find_agent("agent_id", &code.0).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        let request = self
            .client
            .get(self.table_url(AGENTS_TABLE)?)
            .query(&[("select", "id"), ("limit", "1")]);
        let _: Vec<serde_json::Value> = fetch_rows(request).await?;
        Ok(())
    }
}

impl LeadRepository for PostgrestStore {
    async fn insert(&self, lead: NewLead) -> Result<Lead, RepositoryError> {
        let request = self
            .client
            .post(self.table_url(LEADS_TABLE)?)
            .header("Prefer", "return=representation")
            .json(&lead);
        let rows: Vec<Lead> = fetch_rows(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Decode("insert returned no rows".to_string()))
    }

    async fn list(&self, filter: &LeadFilter) -> Result<Vec<LeadWithAgent>, RepositoryError> {
        let request = self
            .client
            .get(self.table_url(LEADS_TABLE)?)
            .query(&lead_list_params(filter));
        fetch_rows(request).await
    }

    async fn fetch(&self, id: &LeadId) -> Result<Option<LeadWithAgent>, RepositoryError> {
        if !is_row_id(&id.0) {
            return Ok(None);
        }
        let request = self
            .client
            .get(self.table_url(LEADS_TABLE)?)
            .query(&[
                ("select", LEAD_SELECT.to_string()),
                ("id", format!("eq.{}", id.0)),
            ]);
        let rows: Vec<LeadWithAgent> = fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn update(
        &self,
        id: &LeadId,
        changes: LeadChanges,
    ) -> Result<Option<Lead>, RepositoryError> {
        if !is_row_id(&id.0) {
            return Ok(None);
        }
        let request = self
            .client
            .patch(self.table_url(LEADS_TABLE)?)
            .query(&[("id", format!("eq.{}", id.0))])
            .header("Prefer", "return=representation")
            .json(&changes);
        let rows: Vec<Lead> = fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }
}

/// Query parameters for a filtered, newest-first lead listing.
pub(crate) fn lead_list_params(filter: &LeadFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", LEAD_SELECT.to_string())];
    if let Some(agent_id) = &filter.agent_id {
        params.push(("agent_id", format!("eq.{}", agent_id.0)));
    }
    if let Some(status) = &filter.status {
        params.push(("status", format!("eq.{}", status.label())));
    }
    if let Some(min_score) = filter.min_score {
        params.push(("lead_score", format!("gte.{min_score}")));
    }
    params.push(("order", "created_at.desc".to_string()));
    params
}

/// Row ids are UUIDs; anything else cannot match and would be rejected by the store.
fn is_row_id(raw: &str) -> bool {
    uuid::Uuid::parse_str(raw).is_ok()
}

#[derive(Debug, Default, Deserialize)]
struct StoreFailure {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

async fn fetch_rows<T>(request: RequestBuilder) -> Result<Vec<T>, RepositoryError>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let failure: StoreFailure = serde_json::from_str(&body).unwrap_or_default();
        debug!(status = status.as_u16(), code = ?failure.code, "store rejected request");
        return Err(RepositoryError::Rejected {
            status: status.as_u16(),
            message: failure.message.unwrap_or(body),
        });
    }

    response
        .json::<Vec<T>>()
        .await
        .map_err(|e| RepositoryError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::leads::domain::LeadStatus;

    fn config(url: &str) -> StoreConfig {
        StoreConfig {
            url: Url::parse(url).expect("valid url"),
            api_key: "anon-key".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    #[test]
    fn table_url_tolerates_trailing_slash() {
        let store = PostgrestStore::new(&config("https://demo.supabase.co/")).expect("builds");
        assert_eq!(
            store.table_url(LEADS_TABLE).expect("url").as_str(),
            "https://demo.supabase.co/rest/v1/leads"
        );
    }

    #[test]
    fn unfiltered_listing_only_selects_and_orders() {
        let params = lead_list_params(&LeadFilter::default());
        assert_eq!(
            params,
            vec![
                ("select", LEAD_SELECT.to_string()),
                ("order", "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn filters_compose_into_postgrest_operators() {
        let filter = LeadFilter {
            agent_id: Some(AgentId("3f2a".to_string())),
            status: Some(LeadStatus::SiteVisitBooked),
            min_score: Some(70),
        };

        let params = lead_list_params(&filter);
        assert!(params.contains(&("agent_id", "eq.3f2a".to_string())));
        assert!(params.contains(&("status", "eq.site_visit_booked".to_string())));
        assert!(params.contains(&("lead_score", "gte.70".to_string())));
        assert_eq!(params.last(), Some(&("order", "created_at.desc".to_string())));
    }

    #[test]
    fn only_uuid_ids_reach_the_store() {
        assert!(is_row_id("6f1c5e1e-3b0a-4c61-9d0f-2f4e8f7e9a10"));
        assert!(!is_row_id("lead-1"));
    }

    #[test]
    fn rejects_api_keys_that_are_not_header_safe() {
        let mut config = config("https://demo.supabase.co");
        config.api_key = "bad\nkey".to_string();
        assert!(matches!(
            PostgrestStore::new(&config),
            Err(RepositoryError::Unavailable(_))
        ));
    }
}
