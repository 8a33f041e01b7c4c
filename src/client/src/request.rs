use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Body, Method};
use serde::Serialize;
use watios_common::types::response::body_to_value;
use watios_common::{ErrorRecord, Failure, Response};

use crate::watios_client::WatiosClient;

/// A request being assembled on a [`WatiosClient`]. Sending it runs the alert
/// pipeline on the outcome.
#[must_use = "requests do nothing until `send` is awaited"]
pub struct WatiosRequest {
    client: WatiosClient,
    method: Method,
    url: String,
    builder: reqwest::RequestBuilder,
}

impl WatiosRequest {
    pub(crate) fn new(
        client: WatiosClient,
        method: Method,
        url: String,
        builder: reqwest::RequestBuilder,
    ) -> Self {
        Self {
            client,
            method,
            url,
            builder,
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.builder = self.builder.headers(headers);
        self
    }

    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.builder = self.builder.json(json);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.builder = self.builder.timeout(timeout);
        self
    }

    /// Sends the request. Non-2xx statuses are failures, and every failure
    /// comes back as the formatted record rather than the transport error.
    pub async fn send(self) -> Result<Response, ErrorRecord> {
        let method = self.method.as_str().to_lowercase();

        let response = match self.builder.send().await {
            Ok(response) => response,
            Err(e) => {
                return Err(self
                    .client
                    .reject(Failure::from_reqwest(&e, &method, &self.url)))
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                let failure =
                    Failure::from_reqwest(&e, &method, &self.url).with_status(status.as_u16());
                return Err(self.client.reject(failure));
            }
        };

        if !status.is_success() {
            return Err(self.client.reject(Failure::from_status(
                status.as_u16(),
                &method,
                &self.url,
                body_to_value(&body),
            )));
        }

        let response = Response {
            status,
            headers,
            url: self.url,
            method,
            body,
        };
        self.client.resolve(&response);

        Ok(response)
    }
}
