//! Completion-service fallback: ask the model which region the text refers to.

use crate::llm::{ChatMessage, CompletionBackend, LlmError};
use crate::region::RegionStrategy;
use async_trait::async_trait;
use std::sync::Arc;

const PROMPT_PREFIX: &str = "請從這句話找出查詢的台灣地區名稱：";

/// Length filter for model answers: strictly between 1 and 10 characters after trimming.
/// This only rejects obvious non-answers (empty, single glyph, full sentences).
pub fn is_plausible_region(candidate: &str) -> bool {
    let n = candidate.trim().chars().count();
    n > 1 && n < 10
}

/// Asks a completion backend for the region name referenced in a sentence.
#[derive(Clone)]
pub struct AiRegionExtractor {
    backend: Arc<dyn CompletionBackend>,
}

impl AiRegionExtractor {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    fn prompt(text: &str) -> String {
        format!("{}{}", PROMPT_PREFIX, text)
    }

    /// `Ok(None)` when the model answered with something that fails the length filter.
    pub async fn extract(&self, text: &str) -> Result<Option<String>, LlmError> {
        let answer = self
            .backend
            .complete(vec![ChatMessage::user(Self::prompt(text))])
            .await?;
        let candidate = answer.trim();
        if is_plausible_region(candidate) {
            Ok(Some(candidate.to_string()))
        } else {
            log::debug!("ai region: rejected candidate of {} chars", candidate.chars().count());
            Ok(None)
        }
    }
}

#[async_trait]
impl RegionStrategy for AiRegionExtractor {
    fn name(&self) -> &str {
        "ai"
    }

    /// Any backend failure counts as "no region".
    async fn resolve(&self, text: &str) -> Option<String> {
        match self.extract(text).await {
            Ok(region) => region,
            Err(e) => {
                log::debug!("ai region: completion failed: {}", e);
                None
            }
        }
    }
}
