//! HTTP client for the road ratings and alerts REST API.
//!
//! Every response uses the `{success, data, error}` envelope. Failures map to
//! [`RoadSafetyError::Network`]; a missing resource is an empty result.
//!
//! Background sync is fire-and-forget: [`SafetyApiClient::spawn_rating_sync`]
//! posts on a tokio task and reports only a [`Notification`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures::future::join_all;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::alerts::{sort_recent_first, NewAlert, RoadAlert};
use crate::error::{Result, RoadSafetyError};
use crate::ratings::{RatingSubmission, RoadRatingSummary};
use crate::session::Notification;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_CONCURRENCY: usize = 8;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server root, without the `/api` prefix
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    fn into_data(self) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(RoadSafetyError::Network {
                message: self.error.unwrap_or_else(|| "request was not successful".to_string()),
                status_code: None,
            })
        }
    }
}

impl From<reqwest::Error> for RoadSafetyError {
    fn from(e: reqwest::Error) -> Self {
        RoadSafetyError::Network {
            message: e.to_string(),
            status_code: e.status().map(|s| s.as_u16()),
        }
    }
}

/// Flatten the `{roadId: summary}` listing, using the key when a summary
/// has no road id of its own.
fn summaries_from_listing(listing: HashMap<String, RoadRatingSummary>) -> Vec<RoadRatingSummary> {
    let mut summaries: Vec<RoadRatingSummary> = listing
        .into_iter()
        .map(|(road_id, mut summary)| {
            if summary.road_id.is_empty() {
                summary.road_id = road_id;
            }
            summary
        })
        .collect();
    summaries.sort_by(|a, b| a.road_id.cmp(&b.road_id));
    summaries
}

/// REST client for ratings and alerts.
#[derive(Debug, Clone)]
pub struct SafetyApiClient {
    client: Client,
    base_url: Url,
}

impl SafetyApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RoadSafetyError::validation("baseUrl", format!("'{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RoadSafetyError::validation(
                "baseUrl",
                format!("'{}' cannot be a base URL", config.base_url),
            ));
        }

        let client = Client::builder()
            .pool_max_idle_per_host(MAX_CONCURRENCY)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// `<base>/api/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// Decode a response; every non-2xx status is a `Network` error.
    async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>> {
        let status = response.status();
        if !status.is_success() {
            // Error bodies use the same envelope when the server produced them
            let message = response
                .json::<ApiEnvelope<serde_json::Value>>()
                .await
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(RoadSafetyError::Network {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        response.json::<ApiEnvelope<T>>().await?.into_data()
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>> {
        let url = self.endpoint(segments);
        debug!("[SafetyApiClient] GET {}", url);
        let response = self.client.get(url).send().await?;
        // A missing resource is an empty result for reads only
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::read_envelope(response).await
    }

    async fn post<B: Serialize>(&self, segments: &[&str], body: &B) -> Result<()> {
        let url = self.endpoint(segments);
        debug!("[SafetyApiClient] POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        Self::read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// `GET /api/road-ratings`: every rated road, sorted by road id.
    pub async fn fetch_road_ratings(&self) -> Result<Vec<RoadRatingSummary>> {
        let start = Instant::now();
        let listing: HashMap<String, RoadRatingSummary> =
            self.get(&["road-ratings"]).await?.unwrap_or_default();
        let summaries = summaries_from_listing(listing);
        info!(
            "[SafetyApiClient] Fetched ratings for {} roads in {:.2}s",
            summaries.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(summaries)
    }

    /// `GET /api/road-ratings/:roadId`; `None` when the road has no ratings.
    pub async fn fetch_road_rating(&self, road_id: &str) -> Result<Option<RoadRatingSummary>> {
        let summary: Option<RoadRatingSummary> = self.get(&["road-ratings", road_id]).await?;
        Ok(summary.map(|mut s| {
            if s.road_id.is_empty() {
                s.road_id = road_id.to_string();
            }
            s
        }))
    }

    /// `POST /api/road-ratings`.
    pub async fn submit_road_rating(&self, submission: &RatingSubmission) -> Result<()> {
        submission.validate()?;
        self.post(&["road-ratings"], submission).await
    }

    /// `GET /api/road-alerts/:roadId`, newest first.
    pub async fn fetch_alerts(&self, road_id: &str) -> Result<Vec<RoadAlert>> {
        let mut alerts: Vec<RoadAlert> = self
            .get(&["road-alerts", road_id])
            .await?
            .unwrap_or_default();
        sort_recent_first(&mut alerts);
        Ok(alerts)
    }

    /// Fetch alerts for several roads concurrently.
    pub async fn fetch_alerts_many(&self, road_ids: &[String]) -> Vec<(String, Result<Vec<RoadAlert>>)> {
        let mut results = Vec::with_capacity(road_ids.len());
        for chunk in road_ids.chunks(MAX_CONCURRENCY) {
            let fetched = join_all(chunk.iter().map(|id| self.fetch_alerts(id))).await;
            results.extend(chunk.iter().cloned().zip(fetched));
        }

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            warn!(
                "[SafetyApiClient] {}/{} alert fetches failed",
                failed,
                results.len()
            );
        }
        results
    }

    /// `POST /api/road-alerts`.
    pub async fn submit_alert(&self, alert: &NewAlert) -> Result<()> {
        alert.validate()?;
        self.post(&["road-alerts"], alert).await
    }

    /// Post a rating on a background task. The outcome is only reported on
    /// `notifications`; a closed receiver is ignored.
    pub fn spawn_rating_sync(
        &self,
        submission: RatingSubmission,
        notifications: UnboundedSender<Notification>,
    ) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let result = client.submit_road_rating(&submission).await;
            if let Err(e) = &result {
                warn!(
                    "[SafetyApiClient] Rating sync for {} failed: {}",
                    submission.road_id, e
                );
            }
            let _ = notifications.send(Notification::from_rating_sync(&submission.road_id, &result));
        })
    }

    /// Post an alert on a background task, reporting only a notification.
    pub fn spawn_alert_sync(
        &self,
        alert: NewAlert,
        notifications: UnboundedSender<Notification>,
    ) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            let result = client.submit_alert(&alert).await;
            if let Err(e) = &result {
                warn!("[SafetyApiClient] Alert sync for {} failed: {}", alert.road_id, e);
            }
            let _ = notifications.send(Notification::from_alert_sync(&alert.road_id, &result));
        })
    }
}
