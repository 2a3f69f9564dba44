//! `Backend` over the JSON HTTP API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use cylinder_inventory::{BatchAction, Company, CylinderGroup, CylinderRecord, Product};
use cylinder_workflows::{Backend, BackendError, EligibleQuery};

use crate::session::AppSession;

/// Every request carries the signed-in user's bearer token; without one the
/// request is not sent.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    session: AppSession,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, session: AppSession) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, session: AppSession) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<String, BackendError> {
        self.session.token().ok_or(BackendError::Unauthenticated)
    }

    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let token = self.token()?;
        tracing::debug!(path, "GET");
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let resp = ensure_success(resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %body, "API request failed");
    Err(BackendError::Status(status.as_u16(), body))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_companies(&self) -> Result<Vec<Company>, BackendError> {
        self.get_json("/companies", &[]).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.get_json("/products", &[]).await
    }

    async fn list_cylinders(&self, query: &EligibleQuery) -> Result<Vec<CylinderRecord>, BackendError> {
        match query {
            EligibleQuery::Available { product, quantity } => {
                let params = [("product", product.to_string()), ("quantity", quantity.to_string())];
                self.get_json("/available-cylinders", &params).await
            }
            EligibleQuery::Dispatched { company } => {
                self.get_json("/dispatched-cylinders", &[("companyId", company.to_string())])
                    .await
            }
            EligibleQuery::Empty => {
                let groups: Vec<CylinderGroup> = self.get_json("/empty-cylinders-grouped", &[]).await?;
                Ok(CylinderGroup::flatten(groups))
            }
            EligibleQuery::Refilling => self.get_json("/refilling-cylinders", &[]).await,
        }
    }

    async fn submit(&self, action: &BatchAction) -> Result<(), BackendError> {
        let token = self.token()?;
        let body = action
            .body()
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        tracing::info!(
            endpoint = action.endpoint(),
            action_type = action.kind().action_type(),
            count = action.serials().len(),
            "POST batch action"
        );
        let resp = self
            .client
            .post(self.url(action.endpoint()))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        ensure_success(resp).await?;
        Ok(())
    }
}
