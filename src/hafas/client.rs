//! Blocking HTTP client for the BVG HAFAS gate.

use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::{Value, json};

use super::{Departure, DepartureSource, Location, decode_departures, decode_location};
use crate::error::FetchError;

pub const DEFAULT_ENDPOINT: &str = "https://bvg-apps-ext.hafas.de/gate";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:147.0) Gecko/20100101 Firefox/147.0";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_RETRIES: u32 = 5;
const RETRY_BACKOFF: Duration = Duration::from_millis(100);
const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// All transport products (bitmask).
const ALL_PRODUCTS: u32 = 127;

/// HAFAS client speaking the BVG web app protocol.
///
/// Transient failures (connection errors, timeouts and 5xx gateway statuses)
/// are retried with exponential backoff before an error is reported.
pub struct HafasClient {
    http: Client,
    endpoint: String,
}

impl HafasClient {
    pub fn new() -> Result<Self, FetchError> { Self::with_endpoint(DEFAULT_ENDPOINT) }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// POST one service request and return the raw response body.
    fn request(
        &self,
        service: Value,
    ) -> Result<String, FetchError> {
        let body = envelope(service);

        let mut attempt = 0;
        loop {
            let result = self.http.post(&self.endpoint).json(&body).send();

            let retryable = match &result {
                Ok(response) => RETRY_STATUSES.contains(&response.status()),
                Err(err) => err.is_connect() || err.is_timeout(),
            };
            if retryable && attempt < MAX_RETRIES {
                let backoff = RETRY_BACKOFF * 2u32.pow(attempt);
                attempt += 1;
                tracing::debug!(attempt, backoff_ms = backoff.as_millis() as u64, "Retrying HAFAS request");
                thread::sleep(backoff);
                continue;
            }

            let response = result?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            return Ok(response.text()?);
        }
    }
}

impl DepartureSource for HafasClient {
    fn search_location(
        &self,
        query: &str,
    ) -> Result<Option<Location>, FetchError> {
        let body = self.request(json!({
            "meth": "LocMatch",
            "req": { "input": { "field": "S", "loc": { "name": query, "type": "S" } } },
        }))?;
        decode_location(&body)
    }

    fn list_departures(
        &self,
        location_id: &str,
        top: u32,
        now_minutes: i32,
    ) -> Result<Vec<Departure>, FetchError> {
        let body = self.request(json!({
            "meth": "StationBoard",
            "req": {
                "jnyFltrL": [{ "type": "PROD", "mode": "INC", "value": ALL_PRODUCTS }],
                "stbLoc": { "lid": location_id },
                "type": "DEP",
                "sort": "PT",
                "maxJny": top,
            },
        }))?;
        decode_departures(&body, now_minutes)
    }
}

/// Wrap a service request in the client identification HAFAS expects.
fn envelope(service: Value) -> Value {
    json!({
        "id": "724muxsmmmsph34k",
        "ver": "1.72",
        "lang": "deu",
        "auth": { "type": "AID", "aid": "dVg4TZbW8anjx9ztPwe2uk4LVRi9wO" },
        "client": { "id": "VBB", "type": "WEB", "name": "webapp", "l": "vs_webapp", "v": 10004 },
        "formatted": false,
        "svcReqL": [service],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wraps_single_request() {
        let body = envelope(json!({ "meth": "LocMatch" }));
        assert_eq!(body["svcReqL"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["svcReqL"][0]["meth"], "LocMatch");
        assert_eq!(body["auth"]["type"], "AID");
        assert_eq!(body["client"]["id"], "VBB");
    }

    #[test]
    fn test_client_builds() {
        let client = HafasClient::with_endpoint("http://127.0.0.1:9/gate").unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:9/gate");
    }
}
