//! The error pipeline shared by the client's response hooks and the
//! standalone [`Alerter::alert`] entry point.
//!
//! Formatting and the dedup decision happen inline. Deliveries to the
//! messaging and stats endpoints run as detached tasks tracked by a
//! [`TaskTracker`]; their failures are logged and never reach the caller.
//! Outside a tokio runtime they run on a shared single-worker background
//! runtime instead.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::Client;
use serde_json::Value;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};
use watios_common::config::Config;
use watios_common::{
    format_error, format_success, DedupGate, ErrorRecord, Failure, Response, SuccessRecord,
    UsageRecord, WatiosResult,
};

use crate::exporters::{DispatchResult, Notifier, StatsReporter};

static BACKGROUND_RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Runtime for deliveries raised from sync code. Built on first use and
/// kept for the life of the process.
fn background_handle() -> std::io::Result<Handle> {
    BACKGROUND_RUNTIME
        .get_or_try_init(|| {
            Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("watios-dispatch")
                .enable_all()
                .build()
        })
        .map(|runtime| runtime.handle().clone())
}

pub struct Alerter {
    recipient: String,
    gate: Arc<DedupGate>,
    notifier: Arc<Notifier>,
    stats: Arc<StatsReporter>,
    tasks: TaskTracker,
}

impl Alerter {
    pub fn new(
        recipient: impl Into<String>,
        gate: Arc<DedupGate>,
        notifier: Notifier,
        stats: StatsReporter,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            gate,
            notifier: Arc::new(notifier),
            stats: Arc::new(stats),
            tasks: TaskTracker::new(),
        }
    }

    /// Builds an alerter whose side channels point at the configured
    /// endpoints.
    pub fn from_config(
        recipient: impl Into<String>,
        passkey: impl Into<String>,
        config: &Config,
        gate: Arc<DedupGate>,
    ) -> WatiosResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self::new(
            recipient,
            gate,
            Notifier::new(client.clone(), config.messaging_endpoint()),
            StatsReporter::new(client, config.stats_endpoint(), passkey),
        ))
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn gate(&self) -> &Arc<DedupGate> {
        &self.gate
    }

    /// Reports an arbitrary failure outside the request path.
    ///
    /// Safe to call from sync code: with no current tokio runtime the
    /// deliveries go to a shared background runtime. [`Alerter::pending`]
    /// tracks them either way.
    pub fn alert(&self, failure: impl Into<Failure>) -> ErrorRecord {
        self.capture_error(&failure.into())
    }

    /// Formats `failure`, notifies unless it is a recent duplicate, and
    /// always reports it to stats.
    pub fn capture_error(&self, failure: &Failure) -> ErrorRecord {
        let record = format_error(failure);

        if self.gate.should_notify(&record) {
            let notifier = self.notifier.clone();
            let recipient = self.recipient.clone();
            let alert = record.clone();
            self.dispatch("alert", async move { notifier.send_alert(&recipient, &alert).await });
        } else {
            debug!(
                "Suppressed duplicate alert for {} {} {} within {:?}",
                record.error_code,
                record.method,
                record.url,
                self.gate.window()
            );
        }

        self.report(UsageRecord::Error(record.clone()));

        warn!("Watios captured: {}", record);
        record
    }

    pub fn capture_success(&self, response: &Response) -> SuccessRecord {
        let record = format_success(response);
        debug!(
            "Success response {} {} -> {}",
            record.method, record.url, record.status
        );

        self.report(UsageRecord::Success(record.clone()));
        record
    }

    /// Number of deliveries still in flight.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every delivery spawned so far.
    pub async fn flush(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Like [`Alerter::flush`] but gives up after `timeout`. Returns whether
    /// everything was delivered in time.
    pub async fn flush_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.flush()).await.is_ok()
    }

    fn report(&self, record: UsageRecord) {
        let stats = self.stats.clone();
        self.dispatch("stats", async move { stats.report(&record).await });
    }

    fn dispatch<F>(&self, channel: &'static str, delivery: F)
    where
        F: Future<Output = DispatchResult<Value>> + Send + 'static,
    {
        let handle = match Handle::try_current().or_else(|_| background_handle()) {
            Ok(handle) => handle,
            Err(e) => {
                error!(
                    "No async runtime available, dropping {} delivery: {}",
                    channel, e
                );
                return;
            }
        };

        self.tasks.spawn_on(
            async move {
                match delivery.await {
                    Ok(_) => debug!("Delivered {}", channel),
                    Err(e) => error!("{} ({} delivery): {}", e.user_message(), channel, e),
                }
            },
            &handle,
        );
    }
}

impl std::fmt::Debug for Alerter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alerter")
            .field("recipient", &self.recipient)
            .field("notifier", &self.notifier.endpoint())
            .field("stats", &self.stats.endpoint())
            .field("pending", &self.tasks.len())
            .finish()
    }
}
