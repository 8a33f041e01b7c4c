use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use watios_common::UsageRecord;

use super::{post_json, DispatchResult};

#[derive(Serialize)]
struct UsagePayload<'a> {
    details: &'a UsageRecord,
    passkey: &'a str,
}

/// Sends success and error records to the usage-tracking endpoint.
#[derive(Clone)]
pub struct StatsReporter {
    client: Client,
    endpoint: String,
    passkey: String,
}

impl std::fmt::Debug for StatsReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsReporter")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl StatsReporter {
    pub fn new(client: Client, endpoint: impl Into<String>, passkey: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            passkey: passkey.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn report(&self, record: &UsageRecord) -> DispatchResult<Value> {
        let payload = UsagePayload {
            details: record,
            passkey: &self.passkey,
        };

        post_json(&self.client, &self.endpoint, &payload).await
    }
}
