//! Raw failures as they reach the alert pipeline, before formatting.
//!
//! Every field is optional: a failure may be observed half-built (no response,
//! no request target) and the formatter decides what to fill in.

use std::error::Error as StdError;
use std::io;

use serde_json::Value;

/// A failure surfaced while issuing a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportFailure {
    pub code: Option<String>,
    pub message: Option<String>,
    pub url: Option<String>,
    pub method: Option<String>,
    pub status: Option<u16>,
    pub response_data: Option<Value>,
}

/// Any other error raised by application code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeFailure {
    pub name: Option<String>,
    pub message: Option<String>,
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    Transport(TransportFailure),
    Runtime(RuntimeFailure),
}

impl Failure {
    pub fn is_transport(&self) -> bool {
        matches!(self, Failure::Transport(_))
    }

    /// Builds a transport failure from a `reqwest` error raised while sending
    /// `method url`.
    pub fn from_reqwest(error: &reqwest::Error, method: &str, url: &str) -> Self {
        let status = error.status().map(|s| s.as_u16());
        Failure::Transport(TransportFailure {
            code: Some(transport_code(error).to_string()),
            message: Some(error.to_string()),
            url: Some(url.to_string()),
            method: Some(method.to_string()),
            status,
            response_data: None,
        })
    }

    /// Records the status line that was received before the transport
    /// failed, e.g. when the body could not be read. Runtime failures are
    /// returned unchanged.
    pub fn with_status(mut self, status: u16) -> Self {
        if let Failure::Transport(transport) = &mut self {
            transport.status = Some(status);
        }
        self
    }

    /// Builds a transport failure from a response that came back with a
    /// non-2xx status.
    pub fn from_status(status: u16, method: &str, url: &str, response_data: Value) -> Self {
        let code = if (400..500).contains(&status) {
            "ERR_BAD_REQUEST"
        } else {
            "ERR_BAD_RESPONSE"
        };

        Failure::Transport(TransportFailure {
            code: Some(code.to_string()),
            message: Some(format!("Request failed with status code {}", status)),
            url: Some(url.to_string()),
            method: Some(method.to_string()),
            status: Some(status),
            response_data: Some(response_data),
        })
    }

    /// Builds a runtime failure from any error, rendering its cause chain as
    /// the stack.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        let name = std::any::type_name_of_val(error)
            .rsplit("::")
            .next()
            .unwrap_or("Error")
            .to_string();

        let mut stack = format!("{}: {}", name, error);
        let mut source = error.source();
        while let Some(cause) = source {
            stack.push_str(&format!("\n    caused by: {}", cause));
            source = cause.source();
        }

        Failure::Runtime(RuntimeFailure {
            name: Some(name),
            message: Some(error.to_string()),
            stack: Some(stack),
        })
    }

    /// Interprets an arbitrary JSON value.
    ///
    /// Objects carrying a `config` object and a truthy `isAxiosError` or
    /// `isRequestError` flag take the transport path; anything else is a
    /// runtime failure. A bare string becomes the runtime message.
    pub fn from_value(value: &Value) -> Self {
        let is_transport = value.get("config").is_some_and(Value::is_object)
            && ["isAxiosError", "isRequestError"]
                .iter()
                .any(|flag| value.get(flag).and_then(Value::as_bool).unwrap_or(false));

        if is_transport {
            let config = &value["config"];
            let response = value.get("response");
            return Failure::Transport(TransportFailure {
                code: string_field(value, "code"),
                message: string_field(value, "message"),
                url: string_field(config, "url"),
                method: string_field(config, "method"),
                status: response
                    .and_then(|r| r.get("status"))
                    .and_then(Value::as_u64)
                    .and_then(|s| u16::try_from(s).ok()),
                response_data: response.and_then(|r| r.get("data")).cloned(),
            });
        }

        if let Some(message) = value.as_str() {
            return Failure::Runtime(RuntimeFailure {
                message: Some(message.to_string()),
                ..Default::default()
            });
        }

        Failure::Runtime(RuntimeFailure {
            name: string_field(value, "name"),
            message: string_field(value, "message"),
            stack: string_field(value, "stack"),
        })
    }
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        let mut failure = Failure::from_error(AsRef::<dyn StdError>::as_ref(&error));
        if let Failure::Runtime(runtime) = &mut failure {
            runtime.name = Some("Error".to_string());
            runtime.stack = Some(format!("{:?}", error));
        }
        failure
    }
}

impl From<TransportFailure> for Failure {
    fn from(failure: TransportFailure) -> Self {
        Failure::Transport(failure)
    }
}

impl From<RuntimeFailure> for Failure {
    fn from(failure: RuntimeFailure) -> Self {
        Failure::Runtime(failure)
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Maps a `reqwest` error onto the transport error codes the message table
/// understands.
fn transport_code(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        return "ECONNABORTED";
    }

    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            match io_error.kind() {
                io::ErrorKind::ConnectionRefused => return "ECONNREFUSED",
                io::ErrorKind::TimedOut => return "ETIMEDOUT",
                _ => {}
            }
        }
        let text = cause.to_string();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return "ENOTFOUND";
        }
        source = cause.source();
    }

    if error.is_connect() {
        "ECONNREFUSED"
    } else {
        "ERR_NETWORK"
    }
}
