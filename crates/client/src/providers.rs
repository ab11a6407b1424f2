//! Read-side sources of group records.
//!
//! Providers hand back raw records only. Qualification (settlement
//! cutoffs, share validation) belongs to the engine, so every source stays
//! a dumb fetch.

use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use engine::{Expense, Group, GroupMember, Settlement};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

pub trait GroupDataSource {
    fn group(&self, group_id: Uuid) -> impl Future<Output = Result<Group>> + Send;
    fn members(&self, group_id: Uuid) -> impl Future<Output = Result<Vec<GroupMember>>> + Send;
    fn expenses(&self, group_id: Uuid) -> impl Future<Output = Result<Vec<Expense>>> + Send;
    fn settlements(&self, group_id: Uuid) -> impl Future<Output = Result<Vec<Settlement>>> + Send;
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Provider backed by the hosted backend's JSON API.
#[derive(Debug, Clone)]
pub struct HttpGroupSource {
    base_url: Url,
    api_key: String,
    http: reqwest::Client,
}

impl HttpGroupSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            http: reqwest::Client::new(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(format!("{path}: {err}")))?;

        let res = self
            .http
            .get(endpoint)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(res.json::<T>().await?);
        }

        let status = res.status();
        let message = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        Err(match status.as_u16() {
            401 | 403 => ClientError::Unauthorized,
            404 => ClientError::NotFound(path.to_string()),
            _ => ClientError::Provider {
                status: status.as_u16(),
                message,
            },
        })
    }
}

impl GroupDataSource for HttpGroupSource {
    async fn group(&self, group_id: Uuid) -> Result<Group> {
        self.get_json(&format!("groups/{group_id}")).await
    }

    async fn members(&self, group_id: Uuid) -> Result<Vec<GroupMember>> {
        self.get_json(&format!("groups/{group_id}/members")).await
    }

    async fn expenses(&self, group_id: Uuid) -> Result<Vec<Expense>> {
        self.get_json(&format!("groups/{group_id}/expenses")).await
    }

    async fn settlements(&self, group_id: Uuid) -> Result<Vec<Settlement>> {
        self.get_json(&format!("groups/{group_id}/settlements")).await
    }
}

/// Fixture provider for tests and offline use.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    group: Group,
    members: Vec<GroupMember>,
    expenses: Vec<Expense>,
    settlements: Vec<Settlement>,
}

impl InMemorySource {
    #[must_use]
    pub fn new(group: Group) -> Self {
        Self {
            group,
            members: Vec::new(),
            expenses: Vec::new(),
            settlements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_members(mut self, members: Vec<GroupMember>) -> Self {
        self.members = members;
        self
    }

    #[must_use]
    pub fn with_expenses(mut self, expenses: Vec<Expense>) -> Self {
        self.expenses = expenses;
        self
    }

    #[must_use]
    pub fn with_settlements(mut self, settlements: Vec<Settlement>) -> Self {
        self.settlements = settlements;
        self
    }

    fn check(&self, group_id: Uuid) -> Result<()> {
        if group_id != self.group.id {
            return Err(ClientError::NotFound(format!("group {group_id}")));
        }
        Ok(())
    }
}

impl GroupDataSource for InMemorySource {
    async fn group(&self, group_id: Uuid) -> Result<Group> {
        self.check(group_id)?;
        Ok(self.group.clone())
    }

    async fn members(&self, group_id: Uuid) -> Result<Vec<GroupMember>> {
        self.check(group_id)?;
        Ok(self.members.clone())
    }

    async fn expenses(&self, group_id: Uuid) -> Result<Vec<Expense>> {
        self.check(group_id)?;
        Ok(self.expenses.clone())
    }

    async fn settlements(&self, group_id: Uuid) -> Result<Vec<Settlement>> {
        self.check(group_id)?;
        Ok(self.settlements.clone())
    }
}
