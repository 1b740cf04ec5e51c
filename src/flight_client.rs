//! Client for the upstream flight-offers endpoint.
//!
//! `ureq` is blocking, so each call runs on tokio's blocking pool and the
//! request handlers never stall a runtime worker.

use async_trait::async_trait;
use log::debug;
use std::time::Duration;

use crate::criteria::FlightOffersRequest;
use crate::flight_offer::{FlightOffer, FlightOffersResponse};

#[derive(Debug, thiserror::Error)]
pub enum FlightClientError {
    #[error("Flight offers request failed: {0}")]
    Transport(String),
    #[error("Flight offers endpoint answered with status {0}")]
    Status(u16),
    #[error("Invalid flight offers JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Flight offers worker failed: {0}")]
    Worker(String),
}

pub type FlightClientResult<T> = Result<T, FlightClientError>;

/// Seam between the search page and the upstream service.
#[async_trait]
pub trait FlightOffersApi: Send + Sync {
    async fn search(&self, request: &FlightOffersRequest) -> FlightClientResult<Vec<FlightOffer>>;
}

#[derive(Debug, Clone)]
pub struct UreqFlightClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl UreqFlightClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            // Non-2xx statuses are mapped to FlightClientError::Status below.
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FlightOffersApi for UreqFlightClient {
    async fn search(&self, request: &FlightOffersRequest) -> FlightClientResult<Vec<FlightOffer>> {
        let body = serde_json::to_vec(request)?;
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();

        debug!(
            "Requesting flight offers {} -> {} from {}",
            request.departure_airport, request.destination_airport, endpoint
        );

        let payload = tokio::task::spawn_blocking(move || post_json(&agent, &endpoint, &body))
            .await
            .map_err(|e| FlightClientError::Worker(e.to_string()))??;

        let response: FlightOffersResponse = serde_json::from_str(&payload)?;
        Ok(response.data)
    }
}

fn post_json(agent: &ureq::Agent, endpoint: &str, body: &[u8]) -> FlightClientResult<String> {
    let mut response = agent
        .post(endpoint)
        .header("content-type", "application/json")
        .header("accept", "*/*")
        .send(body)
        .map_err(|e| FlightClientError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FlightClientError::Status(status.as_u16()));
    }

    response
        .body_mut()
        .read_to_string()
        .map_err(|e| FlightClientError::Transport(e.to_string()))
}
