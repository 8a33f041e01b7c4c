// src/watios_client.rs
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use tracing::info;
use typed_builder::TypedBuilder;
use url::Url;
use watios_common::config::Config;
use watios_common::{
    DedupGate, ErrorRecord, Failure, Response, WatiosError, WatiosResult,
};

use crate::alerter::Alerter;
use crate::interceptor::ResponseInterceptor;
use crate::request::WatiosRequest;

#[derive(Debug, Clone, TypedBuilder)]
pub struct ClientOptions {
    /// Who receives alert messages
    #[builder(setter(into))]
    pub recipient_address: String,

    /// Must match the configured passkey; also tags every stats report
    #[builder(setter(into))]
    pub access_credential: String,

    /// Relative request paths are resolved against this
    #[builder(default, setter(strip_option, into))]
    pub base_url: Option<String>,

    /// Falls back to `Config::timeout_ms`
    #[builder(default, setter(strip_option))]
    pub timeout: Option<Duration>,

    #[builder(default)]
    pub default_headers: HeaderMap,

    /// Share one suppression table between clients; a fresh gate otherwise
    #[builder(default, setter(strip_option))]
    pub dedup_gate: Option<Arc<DedupGate>>,
}

/// HTTP client whose responses and failures feed the alert pipeline.
///
/// Cloning is cheap and clones share the pipeline and suppression window.
#[derive(Clone)]
pub struct WatiosClient {
    http: Client,
    base_url: Option<Url>,
    alerter: Arc<Alerter>,
    interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl WatiosClient {
    /// Validates the credential and builds the client. Credential problems
    /// are returned here, before any request can be made.
    pub fn new(options: ClientOptions, config: &Config) -> WatiosResult<Self> {
        validate_passkey(&options.access_credential, config)?;

        let base_url = options
            .base_url
            .map(|url| match Url::parse(&url) {
                Ok(parsed) => Ok(parsed),
                Err(source) => Err(WatiosError::InvalidBaseUrl { url, source }),
            })
            .transpose()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.default_headers);

        let timeout = options.timeout.unwrap_or_else(|| config.timeout());
        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let gate = options
            .dedup_gate
            .unwrap_or_else(|| Arc::new(DedupGate::with_window(config.dedup_window())));

        let alerter = Alerter::from_config(
            options.recipient_address,
            options.access_credential,
            config,
            gate,
        )?;

        info!(
            "Initialized Watios client with timeout {:?}, alerts to {}",
            timeout,
            alerter.recipient()
        );

        Ok(Self {
            http,
            base_url,
            alerter: Arc::new(alerter),
            interceptors: Vec::new(),
        })
    }

    /// Registers a hook that sees every response and formatted failure.
    pub fn with_interceptor(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// The pipeline behind this client, for reporting failures by hand.
    pub fn alerter(&self) -> Arc<Alerter> {
        self.alerter.clone()
    }

    pub fn request(&self, method: Method, url: &str) -> WatiosRequest {
        let target = self.resolve_url(url);
        let builder = self.http.request(method.clone(), target);
        WatiosRequest::new(self.clone(), method, url.to_string(), builder)
    }

    pub fn get(&self, url: &str) -> WatiosRequest {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> WatiosRequest {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> WatiosRequest {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: &str) -> WatiosRequest {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: &str) -> WatiosRequest {
        self.request(Method::DELETE, url)
    }

    /// Waits for outstanding alert and stats deliveries.
    pub async fn flush(&self) {
        self.alerter.flush().await
    }

    pub(crate) fn resolve(&self, response: &Response) {
        self.alerter.capture_success(response);
        for interceptor in &self.interceptors {
            interceptor.on_response(response);
        }
    }

    pub(crate) fn reject(&self, failure: Failure) -> ErrorRecord {
        let record = self.alerter.capture_error(&failure);
        for interceptor in &self.interceptors {
            interceptor.on_error(&record);
        }
        record
    }

    // Relative targets are appended to the base path, never resolved per RFC 3986,
    // so a base of `/v1` keeps its prefix.
    fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if Url::parse(url).is_err() => combine_urls(base.as_str(), url),
            _ => url.to_string(),
        }
    }
}

fn combine_urls(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

fn validate_passkey(provided: &str, config: &Config) -> WatiosResult<()> {
    let expected = config.expected_passkey()?;
    if provided == expected {
        Ok(())
    } else {
        Err(WatiosError::InvalidCredential)
    }
}
