use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::types::{Collection, Config, Environment, Host, Service, Stack};

const API_VERSION_PATH: &str = "/v2-beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("cannot build rancher client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("cannot decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{0} unavailable")]
    Unavailable(String),
}

/// Source of the resources the checks evaluate.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn list_environments(&self) -> Result<Vec<Environment>, ProviderError>;
    async fn list_hosts(&self) -> Result<Vec<Host>, ProviderError>;
    async fn list_stacks(&self) -> Result<Vec<Stack>, ProviderError>;
    async fn list_services(&self) -> Result<Vec<Service>, ProviderError>;
    async fn get_environment(&self, id: &str) -> Result<Environment, ProviderError>;
    async fn get_stack(&self, id: &str) -> Result<Stack, ProviderError>;
}

/// Client for the Rancher v2-beta API using access/secret key basic auth.
pub struct RancherClient {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
    secret_key: String,
}

impl RancherClient {
    pub fn new(url: &str, access_key: &str, secret_key: &str) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::Client)?;
        Ok(Self {
            http,
            base_url: api_base_url(url),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ProviderError> {
        Self::new(&cfg.rancher_url, &cfg.access_key, &cfg.secret_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);
        let res = self
            .http
            .get(&url)
            .basic_auth(&self.access_key, Some(&self.secret_key))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ProviderError::Transport { url: url.clone(), source })?;
        if !res.status().is_success() {
            return Err(ProviderError::Status {
                url,
                status: res.status().as_u16(),
            });
        }
        res.json::<T>()
            .await
            .map_err(|source| ProviderError::Decode { url, source })
    }

    async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, ProviderError> {
        let list: Collection<T> = self.get_json(collection).await?;
        Ok(list.data)
    }
}

#[async_trait]
impl ResourceProvider for RancherClient {
    async fn list_environments(&self) -> Result<Vec<Environment>, ProviderError> {
        self.list("projects").await
    }

    async fn list_hosts(&self) -> Result<Vec<Host>, ProviderError> {
        self.list("hosts").await
    }

    async fn list_stacks(&self) -> Result<Vec<Stack>, ProviderError> {
        self.list("stacks").await
    }

    async fn list_services(&self) -> Result<Vec<Service>, ProviderError> {
        self.list("services").await
    }

    async fn get_environment(&self, id: &str) -> Result<Environment, ProviderError> {
        self.get_json(&format!("projects/{}", id)).await
    }

    async fn get_stack(&self, id: &str) -> Result<Stack, ProviderError> {
        self.get_json(&format!("stacks/{}", id)).await
    }
}

/// Appends the API version path unless the URL already ends with it.
pub fn api_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with(API_VERSION_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_VERSION_PATH)
    }
}

/// In-memory provider for tests and dry runs. Counts single-resource lookups
/// so callers can observe cache behaviour.
#[derive(Debug, Default)]
pub struct MockProvider {
    environments: Vec<Environment>,
    hosts: Vec<Host>,
    stacks: Vec<Stack>,
    services: Vec<Service>,
    unavailable: Vec<&'static str>,
    environment_fetches: AtomicUsize,
    stack_fetches: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(mut self, env: Environment) -> Self {
        self.environments.push(env);
        self
    }

    pub fn with_host(mut self, host: Host) -> Self {
        self.hosts.push(host);
        self
    }

    pub fn with_stack(mut self, stack: Stack) -> Self {
        self.stacks.push(stack);
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    /// Makes every call touching `collection` ("projects", "hosts", "stacks"
    /// or "services") fail.
    pub fn with_unavailable(mut self, collection: &'static str) -> Self {
        self.unavailable.push(collection);
        self
    }

    pub fn environment_fetches(&self) -> usize {
        self.environment_fetches.load(Ordering::SeqCst)
    }

    pub fn stack_fetches(&self) -> usize {
        self.stack_fetches.load(Ordering::SeqCst)
    }

    fn ensure_available(&self, collection: &'static str) -> Result<(), ProviderError> {
        if self.unavailable.contains(&collection) {
            return Err(ProviderError::Unavailable(collection.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceProvider for MockProvider {
    async fn list_environments(&self) -> Result<Vec<Environment>, ProviderError> {
        self.ensure_available("projects")?;
        Ok(self.environments.clone())
    }

    async fn list_hosts(&self) -> Result<Vec<Host>, ProviderError> {
        self.ensure_available("hosts")?;
        Ok(self.hosts.clone())
    }

    async fn list_stacks(&self) -> Result<Vec<Stack>, ProviderError> {
        self.ensure_available("stacks")?;
        Ok(self.stacks.clone())
    }

    async fn list_services(&self) -> Result<Vec<Service>, ProviderError> {
        self.ensure_available("services")?;
        Ok(self.services.clone())
    }

    async fn get_environment(&self, id: &str) -> Result<Environment, ProviderError> {
        self.environment_fetches.fetch_add(1, Ordering::SeqCst);
        self.ensure_available("projects")?;
        self.environments
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound { kind: "environment", id: id.to_string() })
    }

    async fn get_stack(&self, id: &str) -> Result<Stack, ProviderError> {
        self.stack_fetches.fetch_add(1, Ordering::SeqCst);
        self.ensure_available("stacks")?;
        self.stacks
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound { kind: "stack", id: id.to_string() })
    }
}
