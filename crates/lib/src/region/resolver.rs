//! Ordered chain of region strategies.

use crate::config::StrategyKind;
use crate::llm::CompletionBackend;
use crate::region::{AiRegionExtractor, LexiconStrategy};
use async_trait::async_trait;
use std::sync::Arc;

/// One way of finding a region in user text.
#[async_trait]
pub trait RegionStrategy: Send + Sync {
    /// Short name used in logs and CLI output (e.g. "lexicon").
    fn name(&self) -> &str;
    /// A region, or None to let the next strategy try.
    async fn resolve(&self, text: &str) -> Option<String>;
}

/// A resolved region and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub region: String,
    pub strategy: String,
}

/// Tries strategies in order until one yields a region.
#[derive(Clone, Default)]
pub struct RegionResolver {
    strategies: Vec<Arc<dyn RegionStrategy>>,
}

impl RegionResolver {
    pub fn new(strategies: Vec<Arc<dyn RegionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Build the chain from config order. Duplicate kinds are kept once, at their first position.
    pub fn from_kinds(kinds: &[StrategyKind], backend: Arc<dyn CompletionBackend>) -> Self {
        let mut seen: Vec<StrategyKind> = Vec::new();
        let mut strategies: Vec<Arc<dyn RegionStrategy>> = Vec::new();
        for kind in kinds {
            if seen.contains(kind) {
                continue;
            }
            seen.push(*kind);
            let strategy: Arc<dyn RegionStrategy> = match kind {
                StrategyKind::Lexicon => Arc::new(LexiconStrategy),
                StrategyKind::Ai => Arc::new(AiRegionExtractor::new(backend.clone())),
            };
            strategies.push(strategy);
        }
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, text: &str) -> Option<Resolution> {
        for s in &self.strategies {
            if let Some(region) = s.resolve(text).await {
                log::debug!("region resolved by {}: {}", s.name(), region);
                return Some(Resolution {
                    region,
                    strategy: s.name().to_string(),
                });
            }
        }
        None
    }
}
