use std::time::Duration;

use reqwest::{header::ACCEPT, Client};
use serde::Serialize;
use serde_json::Value;
use workout_tracker_lib::{
    services::SessionStore, SessionRecord, StoredSessionId, TrackerError,
};

use crate::{config::ApiConfig, RUNS_PATH};

/// Saves finished sessions to the remote "runs" collection.
///
/// One POST per call, no retries: a failure goes straight back to the caller.
#[derive(Clone)]
pub struct RunStore {
    client: Client,
    config: ApiConfig,
}

#[derive(Serialize)]
struct Envelope<'a> {
    data: &'a SessionRecord,
}

impl RunStore {
    pub fn new(config: ApiConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TrackerError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl SessionStore for RunStore {
    async fn save(&self, record: &SessionRecord) -> Result<StoredSessionId, TrackerError> {
        let url = self.config.endpoint(RUNS_PATH);
        tracing::debug!("POST {} ({} points)", url, record.trajectory.len());

        let mut request = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&Envelope { data: record });
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TrackerError::Transport(format!("POST {url}: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TrackerError::Transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::error!("Run rejected with {}: {}", status, message);
            return Err(TrackerError::RemoteRejected {
                status: status.as_u16(),
                message,
            });
        }

        parse_created(&body)
    }
}

/// Pulls the human readable message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message"))
        .and_then(Value::as_str)
    {
        return message.to_string();
    }

    match body.trim() {
        "" => "empty response".to_string(),
        text => text.to_string(),
    }
}

/// Accepts both `{ "data": { .. } }` and a bare entity.
fn parse_created(body: &str) -> Result<StoredSessionId, TrackerError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TrackerError::Transport(format!("Response is not JSON: {e}")))?;

    let entity = match value.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ => value,
    };

    serde_json::from_value(entity)
        .map_err(|e| TrackerError::Transport(format!("Response has no run id: {e}")))
}
