//! Message pipeline: resolve region, fetch air quality, decide the reply.
//! External calls run one after another; nothing is shared between messages.

use crate::air_quality::{AirQualityClient, AirQualitySource};
use crate::config::{self, Config, Secrets};
use crate::llm::OpenAiClient;
use crate::region::RegionResolver;
use crate::reply::{Outcome, ReplyMessage};
use std::sync::Arc;

/// Resolver plus air-quality source; built once at startup and cloned into handlers.
#[derive(Clone)]
pub struct Pipeline {
    resolver: RegionResolver,
    air_quality: Arc<dyn AirQualitySource>,
}

impl Pipeline {
    pub fn new(resolver: RegionResolver, air_quality: Arc<dyn AirQualitySource>) -> Self {
        Self {
            resolver,
            air_quality,
        }
    }

    /// Wire real clients from config: OpenAI-compatible backend for the AI strategy and the
    /// HTTP air-quality client.
    pub fn from_config(config: &Config, secrets: &Secrets) -> Self {
        let llm = OpenAiClient::new(
            Some(config.ai.base_url.clone()),
            secrets.ai_api_key.clone(),
            Some(config.ai.model.clone()),
        );
        let resolver = RegionResolver::from_kinds(&config.resolution.strategies, Arc::new(llm));
        let air_quality = AirQualityClient::new(
            config.air_quality.base_url.clone(),
            config::resolve_air_quality_token(config),
        );
        Self::new(resolver, Arc::new(air_quality))
    }

    pub fn resolver(&self) -> &RegionResolver {
        &self.resolver
    }

    pub fn air_quality(&self) -> &Arc<dyn AirQualitySource> {
        &self.air_quality
    }

    /// Run one message through resolution and lookup.
    pub async fn run(&self, text: &str) -> Outcome {
        let Some(resolution) = self.resolver.resolve(text).await else {
            log::debug!("pipeline: no region in message");
            return Outcome::RegionNotFound;
        };
        let region = resolution.region;
        match self.air_quality.fetch(&region).await {
            Ok(reading) => Outcome::Report { region, reading },
            Err(error) => Outcome::NoData { region, error },
        }
    }

    /// `run` followed by the reply mapping.
    pub async fn reply_for(&self, text: &str) -> ReplyMessage {
        self.run(text).await.into_reply()
    }
}
