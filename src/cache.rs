use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::rancher::{ProviderError, ResourceProvider};
use crate::types::{Environment, Stack};

/// Memoizes lookups by identifier. Entries are never evicted; a cache lives
/// for one check run.
#[derive(Debug)]
pub struct LookupCache<T> {
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Default for LookupCache<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> LookupCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, id: &str) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached entry for `id`, calling `fetch` on a miss. Errors are
    /// returned as-is and nothing is stored. When two callers race on the same
    /// id, the first stored value wins and both get it.
    pub async fn get_or_fetch<F, Fut>(&self, id: &str, fetch: F) -> Result<Arc<T>, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        if let Some(hit) = self.cached(id) {
            return Ok(hit);
        }
        let fetched = Arc::new(fetch().await?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(id.to_string()).or_insert(fetched).clone())
    }
}

/// The two caches a check run resolves ownership through.
#[derive(Debug, Default)]
pub struct Lookups {
    pub environments: LookupCache<Environment>,
    pub stacks: LookupCache<Stack>,
}

impl Lookups {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn environment(
        &self,
        provider: &dyn ResourceProvider,
        id: &str,
    ) -> Result<Arc<Environment>, ProviderError> {
        self.environments
            .get_or_fetch(id, || async {
                debug!("environment {} not cached, fetching", id);
                provider.get_environment(id).await
            })
            .await
    }

    pub async fn stack(&self, provider: &dyn ResourceProvider, id: &str) -> Result<Arc<Stack>, ProviderError> {
        self.stacks
            .get_or_fetch(id, || async {
                debug!("stack {} not cached, fetching", id);
                provider.get_stack(id).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rancher::MockProvider;

    fn provider() -> MockProvider {
        MockProvider::new()
            .with_environment(Environment { id: "1a5".to_string(), name: "Default".to_string(), ..Default::default() })
            .with_stack(Stack { id: "1st5".to_string(), name: "app".to_string(), account_id: "1a5".to_string(), ..Default::default() })
    }

    #[tokio::test]
    async fn test_repeated_lookup_hits_cache() {
        let provider = provider();
        let lookups = Lookups::new();

        let first = lookups.environment(&provider, "1a5").await.unwrap();
        let second = lookups.environment(&provider, "1a5").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.environment_fetches(), 1);
        assert_eq!(lookups.environments.len(), 1);
    }

    #[tokio::test]
    async fn test_caches_are_independent() {
        let provider = provider();
        let lookups = Lookups::new();

        let stack = lookups.stack(&provider, "1st5").await.unwrap();
        assert_eq!(stack.name, "app");
        assert_eq!(provider.stack_fetches(), 1);
        assert_eq!(provider.environment_fetches(), 0);
        assert!(lookups.environments.is_empty());
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let provider = provider();
        let lookups = Lookups::new();

        assert!(lookups.environment(&provider, "missing").await.is_err());
        assert!(lookups.environment(&provider, "missing").await.is_err());

        assert_eq!(provider.environment_fetches(), 2);
        assert!(lookups.environments.cached("missing").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_entry() {
        let provider = provider();
        let lookups = Lookups::new();

        let (a, b) = tokio::join!(
            lookups.environment(&provider, "1a5"),
            lookups.environment(&provider, "1a5"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(lookups.environments.len(), 1);
        assert!(Arc::ptr_eq(&a, &lookups.environments.cached("1a5").unwrap()));
    }

    #[test]
    fn test_get_or_fetch_blocking() {
        let cache: LookupCache<String> = LookupCache::new();
        let value = tokio_test::block_on(cache.get_or_fetch("x", || async { Ok("value".to_string()) })).unwrap();
        assert_eq!(*value, "value");

        // A cached value short-circuits the fetch
        let again = tokio_test::block_on(cache.get_or_fetch("x", || async {
            Err(ProviderError::Unavailable("should not be called".to_string()))
        }))
        .unwrap();
        assert!(Arc::ptr_eq(&value, &again));
    }
}
