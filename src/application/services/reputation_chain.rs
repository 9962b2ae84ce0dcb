//! Ordered IP reputation lookups.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::classifiers::{Reputation, ReputationProvider};
use crate::domain::entities::Settings;

/// Runs every enabled provider in order; the last successful answer replaces
/// any earlier one wholesale.
///
/// Providers are consulted only when [`ReputationProvider::credentials`]
/// yields a key. Failures are logged and leave the previous answer in place.
#[derive(Clone, Default)]
pub struct ReputationChain {
    providers: Vec<Arc<dyn ReputationProvider>>,
}

impl ReputationChain {
    pub fn new(providers: Vec<Arc<dyn ReputationProvider>>) -> Self {
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn evaluate(&self, ip: &str, settings: &Settings) -> Option<Reputation> {
        let mut result = None;

        for provider in &self.providers {
            let Some(api_key) = provider.credentials(settings) else {
                continue;
            };

            match provider.check(ip, &api_key).await {
                Ok(reputation) => {
                    debug!(
                        provider = provider.name(),
                        ip,
                        vpn = reputation.is_vpn,
                        tor = reputation.is_tor,
                        proxy = reputation.is_proxy,
                        bot = reputation.is_bot,
                        "Reputation lookup succeeded"
                    );
                    result = Some(reputation);
                }
                Err(e) => {
                    warn!(provider = provider.name(), ip, "Reputation lookup failed: {}", e);
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classifiers::ClassifierError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        name: &'static str,
        enabled: bool,
        answer: Option<Reputation>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, enabled: bool, answer: Option<Reputation>) -> Arc<Self> {
            Arc::new(Self {
                name,
                enabled,
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReputationProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn credentials(&self, _: &Settings) -> Option<String> {
            self.enabled.then(|| "key".to_string())
        }

        async fn check(&self, _: &str, _: &str) -> Result<Reputation, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone().ok_or_else(|| ClassifierError::Request {
                provider: self.name,
                message: "timeout".to_string(),
            })
        }
    }

    fn chain(providers: &[&Arc<FakeProvider>]) -> ReputationChain {
        ReputationChain::new(
            providers
                .iter()
                .map(|p| Arc::clone(*p) as Arc<dyn ReputationProvider>)
                .collect(),
        )
    }

    fn reputation(provider: &str, country: &str, vpn: bool) -> Reputation {
        Reputation {
            is_vpn: vpn,
            country_code: country.to_string(),
            provider: provider.to_string(),
            ..Reputation::default()
        }
    }

    #[tokio::test]
    async fn test_later_provider_overrides_earlier() {
        let first = FakeProvider::new("proxycheck", true, Some(reputation("proxycheck", "NL", true)));
        let second = FakeProvider::new(
            "ipqualityscore",
            true,
            Some(reputation("ipqualityscore", "US", false)),
        );
        let chain = chain(&[&first, &second]);

        let rep = chain.evaluate("1.2.3.4", &Settings::default()).await.unwrap();
        assert_eq!(rep.provider, "ipqualityscore");
        assert_eq!(rep.country_code, "US");
        // Override, not merge.
        assert!(!rep.is_vpn);
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_answer() {
        let first = FakeProvider::new("proxycheck", true, Some(reputation("proxycheck", "NL", true)));
        let second = FakeProvider::new("ipqualityscore", true, None);
        let chain = chain(&[&first, &second]);

        let rep = chain.evaluate("1.2.3.4", &Settings::default()).await.unwrap();
        assert_eq!(rep.provider, "proxycheck");
        assert!(rep.is_vpn);
    }

    #[tokio::test]
    async fn test_disabled_providers_are_skipped() {
        let first = FakeProvider::new("proxycheck", false, Some(reputation("proxycheck", "NL", true)));
        let chain = chain(&[&first]);

        assert_eq!(chain.evaluate("1.2.3.4", &Settings::default()).await, None);
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let chain = ReputationChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.evaluate("1.2.3.4", &Settings::default()).await, None);
    }
}
