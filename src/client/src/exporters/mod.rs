//! Side channels that receive formatted records: the messaging endpoint
//! (alerts) and the usage-tracking endpoint (stats).
//!
//! Both are plain JSON POSTs with no retry. Callers never await them on the
//! request path; see [`crate::alerter::Alerter`].

mod error;
mod notifier;
mod stats;

pub use error::{DispatchError, DispatchResult};
pub use notifier::{render_alert, Notifier};
pub use stats::StatsReporter;

use std::time::Instant;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use watios_common::types::response::body_to_value;

/// POSTs `payload` as JSON and returns the endpoint's body.
async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    endpoint: &str,
    payload: &T,
) -> DispatchResult<Value> {
    let start_time = Instant::now();

    let response = client.post(endpoint).json(payload).send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(DispatchError::server_error(
            status.as_u16(),
            String::from_utf8_lossy(&body).into_owned(),
        ));
    }

    debug!(
        "Delivered payload to {} with status {}, elapsed: {:?}",
        endpoint,
        status,
        start_time.elapsed()
    );

    Ok(body_to_value(&body))
}
