//! HTTP client for the score simulation service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{ScoreSimulationDao, SimulationRequest, SimulationResult};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::ruleset::Ruleset;

/// Posts simulation requests as JSON to `{base_url}/simulate/{ruleset}`.
///
/// Failed requests are retried with a fixed delay. A 404 means the beatmap is
/// unknown to the service and is not retried.
#[derive(Debug, Clone)]
pub struct HttpSimulationDao {
    client: Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpSimulationDao {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    pub fn endpoint(&self, ruleset: Ruleset) -> String {
        format!("{}/simulate/{}", self.base_url, ruleset.short_name())
    }

    async fn post(&self, request: &SimulationRequest) -> Result<Option<SimulationResult>> {
        let response = self
            .client
            .post(self.endpoint(request.ruleset))
            .json(request)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let result = response
            .error_for_status()?
            .json::<SimulationResult>()
            .await?;
        Ok(Some(result))
    }
}

#[async_trait]
impl ScoreSimulationDao for HttpSimulationDao {
    async fn simulate(&self, request: &SimulationRequest) -> Option<SimulationResult> {
        let attempts = self.max_retries + 1;

        for attempt in 1..=attempts {
            match self.post(request).await {
                Ok(Some(result)) => return Some(result),
                Ok(None) => {
                    tracing::debug!(
                        "Simulation service does not know beatmap {}",
                        request.beatmap_id
                    );
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        "Simulation of beatmap {} failed (attempt {}/{}): {}",
                        request.beatmap_id,
                        attempt,
                        attempts,
                        e
                    );
                    if attempt < attempts {
                        tracing::debug!("Retrying simulation in {:?}", self.retry_delay);
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        None
    }
}
